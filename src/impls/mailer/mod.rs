pub mod logger;
pub mod smtp;

use crate::config::EmailConfig;
use crate::core::email::Email;
use crate::core::ports::mailer::Mailer;
use crate::error::Error;

pub enum AnyMailer {
    Smtp(smtp::SmtpMailer),
    Log(logger::LogMailer),
}

impl AnyMailer {
    pub fn from_config(config: Option<&EmailConfig>) -> Result<Self, Error> {
        match config {
            Some(c) => Ok(Self::Smtp(smtp::SmtpMailer::new(c)?)),
            None => Ok(Self::Log(logger::LogMailer)),
        }
    }
}

impl Mailer for AnyMailer {
    async fn send(&self, email: Email) -> Result<(), Error> {
        match self {
            Self::Smtp(m) => m.send(email).await,
            Self::Log(m) => m.send(email).await,
        }
    }
}
