//! Outgoing email messages. Every template renders a plain-text body and a
//! minimal HTML alternative.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn layout(title: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", escape(p))).collect();
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif\"><h2>{}</h2>{}</body></html>",
        escape(title),
        body
    )
}

fn build(to: &str, subject: &str, paragraphs: Vec<String>) -> Email {
    Email {
        to: to.to_owned(),
        subject: subject.to_owned(),
        text: paragraphs.join("\n\n"),
        html: layout(subject, &paragraphs),
    }
}

pub fn welcome(to: &str, name: &str) -> Email {
    build(
        to,
        "Welcome to Quizhall",
        vec![
            format!("Hi {},", name),
            "Your account is ready. Pick a question bank and start practising.".to_owned(),
        ],
    )
}

pub fn password_reset(to: &str, name: &str, app_url: &str, token: &str, ttl_minutes: i64) -> Email {
    build(
        to,
        "Reset your password",
        vec![
            format!("Hi {},", name),
            format!("Use the link below to choose a new password. It expires in {} minutes.", ttl_minutes),
            format!("{}/reset-password?token={}", app_url.trim_end_matches('/'), token),
            "If you did not ask for this, ignore this email.".to_owned(),
        ],
    )
}

pub fn ticket_reply(to: &str, name: &str, subject: &str, reply: &str, status: &str) -> Email {
    build(
        to,
        &format!("Re: {}", subject),
        vec![format!("Hi {},", name), reply.to_owned(), format!("Ticket status: {}", status)],
    )
}

pub fn notification(to: &str, name: &str, title: &str, message: &str) -> Email {
    build(to, title, vec![format!("Hi {},", name), message.to_owned()])
}
