//! Outbound email over a fixed SMTP relay.
//!
//! Sends are synchronous; handlers run them on the blocking pool via
//! `web::block`. Failures keep their category (bad address, message
//! assembly, transport) so the server log says what actually went wrong,
//! even though the HTTP response is a plain 500 either way.

use crate::config::Config;
use crate::models::student::Student;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not assemble message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// The templated notices the service sends.
#[derive(Debug)]
pub enum Notice<'a> {
    Registered(&'a Student),
    Ready(&'a Student),
}

impl Notice<'_> {
    /// Renders to (to, subject, body).
    pub fn render(&self) -> (String, String, String) {
        match self {
            Notice::Registered(student) => {
                let subject = "Document Request Received".to_string();
                let body = format!(
                    "Hello {},\n\n\
                    We have received your {} request. You will be notified \
                    by email as soon as it is ready for collection.\n\n\
                    Regards,\n\
                    The Registrar's Office",
                    student.name,
                    student.request_type.label()
                );
                (student.email.clone(), subject, body)
            }
            Notice::Ready(student) => {
                let subject = "Your document is ready".to_string();
                let body = format!(
                    "Hello {},\n\n\
                    Your {} is ready. You can collect it from the \
                    registrar's office.\n\n\
                    Regards,\n\
                    The Registrar's Office",
                    student.name,
                    student.request_type.label()
                );
                (student.email.clone(), subject, body)
            }
        }
    }
}

#[derive(Clone)]
pub struct Mailer {
    transport: SmtpTransport,
    from: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let transport = if config.mail_user.is_empty() {
            // No authentication (local development SMTP servers).
            SmtpTransport::builder_dangerous(&config.mail_host)
                .port(config.mail_port)
                .build()
        } else {
            let creds = Credentials::new(config.mail_user.clone(), config.mail_password.clone());

            SmtpTransport::relay(&config.mail_host)?
                .credentials(creds)
                .port(config.mail_port)
                .build()
        };

        Ok(Mailer {
            transport,
            from: config.mail_from.clone(),
        })
    }

    pub fn notify(&self, notice: &Notice) -> Result<(), MailError> {
        let (to, subject, body) = notice.render();
        self.send(&to, &subject, &body)
    }

    pub fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(&email)?;
        Ok(())
    }
}
