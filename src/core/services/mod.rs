pub mod attempt;
pub mod bank;
pub mod notification;
pub mod subject;
pub mod ticket;
pub mod user;

#[cfg(test)]
pub(crate) mod mem;

use crate::error::Error;

pub(crate) fn require(value: &str, field: &str, max_len: usize) -> Result<String, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::BusinessError(format!("{} is required", field)));
    }
    if value.chars().count() > max_len {
        return Err(Error::BusinessError(format!("{} is longer than {} characters", field, max_len)));
    }
    Ok(value.to_owned())
}

pub(crate) fn require_email(email: &str) -> Result<String, Error> {
    let email = require(email, "email", 255)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') => Ok(email),
        _ => Err(Error::BusinessError(format!("invalid email({})", email))),
    }
}

pub(crate) fn found(affected: u64, what: &str) -> Result<u64, Error> {
    if affected == 0 {
        return Err(Error::NotFound(what.into()));
    }
    Ok(affected)
}
