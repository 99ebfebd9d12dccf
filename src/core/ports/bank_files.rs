use serde_json::Value;

use crate::error::Error;

/// Read-only source of banks kept outside the database.
pub trait BankFiles {
    fn load(&self, name: &str) -> Result<Option<Value>, Error>;
}
