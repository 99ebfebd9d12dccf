pub mod attempt;
pub mod bank;
pub mod common;
pub mod notification;
pub mod reset_token;
pub mod subject;
pub mod ticket;
pub mod user;
