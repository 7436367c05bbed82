// src/alert/mod.rs
mod dispatcher;
mod message;
mod smtp;

pub use dispatcher::{AlertDispatcher, AlertError, AlertOutcome, MailTransport};
pub use message::AlertMessage;
pub use smtp::SmtpMailer;
