pub mod email;
pub mod models;
pub mod normalize;
pub mod ports;
pub mod profanity;
pub mod ranking;
pub mod scoring;
pub mod services;
pub mod streak;
