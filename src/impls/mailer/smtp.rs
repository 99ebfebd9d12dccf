use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::core::email::Email;
use crate::core::ports::mailer::Mailer;
use crate::error::Error;

fn mail_error<E: std::fmt::Display>(e: E) -> Error {
    Error::MailError(e.to_string())
}

pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(mail_error)?
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();
        Ok(Self {
            from: config.from.parse().map_err(mail_error)?,
            transport,
        })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), Error> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse().map_err(mail_error)?)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(mail_error)?;
        self.transport.send(message).await.map_err(mail_error)?;
        Ok(())
    }
}
