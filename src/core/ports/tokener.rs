use serde::{Deserialize, Serialize};

use crate::core::models::user::Claim;
use crate::error::Error;

pub trait Payload: Serialize + for<'d> Deserialize<'d> {
    fn user(&self) -> &str;
}

impl Payload for Claim {
    fn user(&self) -> &str {
        &self.user
    }
}

pub trait Tokener<P: Payload> {
    fn gen_token(&self, payload: &P) -> Result<String, Error>;
    fn verify_token(&self, token: &str) -> Result<P, Error>;
}
