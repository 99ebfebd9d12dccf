pub mod banks;
pub mod hasher;
pub mod mailer;
pub mod tokener;
