pub mod admin;
pub mod jwt;
pub mod rate_limit;
