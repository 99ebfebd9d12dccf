use crate::core::email::Email;
use crate::core::ports::mailer::Mailer;
use crate::error::Error;

/// Used when no SMTP account is configured.
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), Error> {
        log::info!("email to {} ({}):\n{}", email.to, email.subject, email.text);
        Ok(())
    }
}
