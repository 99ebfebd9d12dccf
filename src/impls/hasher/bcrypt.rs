use crate::core::ports::hasher::Hasher;
use crate::error::Error;

pub struct Bcrypt {
    cost: u32,
}

impl Bcrypt {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Hasher for Bcrypt {
    fn hash_password(&self, password: &str) -> Result<String, Error> {
        Ok(::bcrypt::hash(password, self.cost)?)
    }

    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, Error> {
        Ok(::bcrypt::verify(password, hash)?)
    }
}
