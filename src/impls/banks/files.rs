use serde_json::Value;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::core::ports::bank_files::BankFiles;
use crate::error::Error;

/// Banks stored as `<dir>/<name>.json`.
pub struct LocalBanks {
    path: PathBuf,
}

impl LocalBanks {
    pub fn new(path: &str) -> Self {
        Self { path: Path::new(path).to_owned() }
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && name.chars().all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
}

impl BankFiles for LocalBanks {
    fn load(&self, name: &str) -> Result<Option<Value>, Error> {
        if !is_plain_name(name) || name.contains("..") {
            return Ok(None);
        }
        let mut file = match File::open(self.path.join(format!("{}.json", name))) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(Some(serde_json::from_slice(&content)?))
    }
}
