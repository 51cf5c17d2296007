//! Tourbook report mailer
//!
//! Sends the generated run report over SMTP:
//! - Configuration from `SMTP_*`/`EMAIL_*` variables with a JSON file fallback
//! - A verify / send-with-retry / cleanup dispatcher over a swappable transport
//! - Report composition with up to ten inline screenshots
//!
//! A failed delivery is reported as a [`DeliveryResult`], never as a panic or
//! an error that would change the outcome of the test run.

pub mod compose;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod transport;

pub use compose::{
    collect_screenshots, compose_report_email, connectivity_test_email, EmailContent,
    InlineAttachment, ReportSources, MAX_ATTACHMENTS,
};
pub use config::{EmailConfig, SmtpAuth, DEFAULT_CONFIG_FILE};
pub use dispatcher::{
    DeliveryResult, DispatcherState, EmailDispatcher, Pause, RetryPolicy, TokioPause,
};
pub use error::{MailError, MailResult};
pub use transport::{MailTransport, SmtpTransport};
