//! Error types for report email delivery

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid email configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("Email config file error: {0}")]
    ConfigFile(String),

    #[error("Email dispatcher is not initialized")]
    NotInitialized,

    #[error("SMTP verification failed: {0}")]
    Verify(String),

    #[error("SMTP send failed: {0}")]
    Send(String),

    #[error("Message build error: {0}")]
    Message(String),

    #[error("No reports found for sending")]
    NoReport,
}

pub type MailResult<T> = Result<T, MailError>;
