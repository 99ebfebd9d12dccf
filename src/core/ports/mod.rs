pub mod bank_files;
pub mod hasher;
pub mod mailer;
pub mod repository;
pub mod roles;
pub mod tokener;
