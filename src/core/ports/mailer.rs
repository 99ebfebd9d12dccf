use crate::core::email::Email;
use crate::error::Error;

pub trait Mailer {
    async fn send(&self, email: Email) -> Result<(), Error>;
}

/// Sends `email`, logging instead of failing the caller when delivery fails.
pub async fn deliver<M: Mailer>(mailer: &M, email: Email) {
    let to = email.to.clone();
    if let Err(e) = mailer.send(email).await {
        log::warn!("failed to send email to {}: {}", to, e);
    }
}
