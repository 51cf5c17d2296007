//! Email Commands

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use tourbook_mailer::{
    compose_report_email, connectivity_test_email, DeliveryResult, EmailConfig, EmailContent,
    EmailDispatcher, ReportSources, RetryPolicy, SmtpTransport, DEFAULT_CONFIG_FILE,
};
use tourbook_report::ReportPaths;

use crate::output::{print_error, print_item, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum EmailCommands {
    /// Mail the latest generated report
    Send {
        #[command(flatten)]
        delivery: DeliveryArgs,

        /// Extra text placed above the report in the plain-text body
        #[arg(short, long)]
        message: Option<String>,

        /// Text report to send (defaults to the newest parsed-log under logs/txt)
        #[arg(long)]
        text_report: Option<PathBuf>,
    },

    /// Send a small message to check SMTP settings
    Test {
        #[command(flatten)]
        delivery: DeliveryArgs,
    },
}

#[derive(Args)]
pub struct DeliveryArgs {
    /// JSON config consulted when SMTP_USER, SMTP_PASS or EMAIL_TO are missing
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Delivery attempts before giving up
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,
}

impl DeliveryArgs {
    fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.attempts,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

/// The fixed-name text report if present, otherwise the newest timestamped one
pub fn latest_text_report(paths: &ReportPaths) -> PathBuf {
    let fixed = paths.fixed_text_report();
    if fixed.exists() {
        return fixed;
    }

    let newest = fixed.parent().and_then(|dir| std::fs::read_dir(dir).ok()).and_then(|entries| {
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy())
                    .is_some_and(|n| n.starts_with("parsed-log_") && n.ends_with(".txt"))
            })
            .max()
    });

    newest.unwrap_or(fixed)
}

/// Verify, send with retry, and always clean up
async fn deliver(
    config: &EmailConfig,
    content: &EmailContent,
    policy: RetryPolicy,
) -> Result<DeliveryResult> {
    let transport = SmtpTransport::from_config(config)?;
    let mut dispatcher = EmailDispatcher::new(transport);

    let result = match dispatcher.initialize().await {
        Ok(()) => Ok(dispatcher.send_with_retry(content, policy).await),
        Err(e) => Err(e),
    };

    dispatcher.cleanup().await;
    result.map_err(Into::into)
}

fn report(result: &DeliveryResult, format: OutputFormat) {
    print_item(result, format);
    match (&result.message_id, &result.error) {
        (Some(id), _) => print_success(&format!("Email sent, message id {}", id)),
        (None, Some(e)) => print_error(&format!("Email not sent: {}", e)),
        (None, None) => print_error("Email not sent"),
    }
}

pub async fn execute(cmd: EmailCommands, root: &Path, format: OutputFormat) -> Result<()> {
    let (config, content) = match &cmd {
        EmailCommands::Send {
            delivery,
            message,
            text_report,
        } => {
            let config = load_config(root, delivery)?;
            let paths = ReportPaths::under(root);
            let sources = ReportSources {
                html_report: paths.html_report.clone(),
                text_report: text_report
                    .as_ref()
                    .map(|p| root.join(p))
                    .unwrap_or_else(|| latest_text_report(&paths)),
                screenshots_dir: paths.screenshots_dir.clone(),
            };
            debug!("Composing email from {}", sources.text_report.display());

            let content = compose_report_email(
                &sources,
                &config.subject,
                message.as_deref(),
                Local::now().naive_local(),
            )
            .context("Cannot compose report email")?;
            (config, content)
        }
        EmailCommands::Test { delivery } => {
            let config = load_config(root, delivery)?;
            let content = connectivity_test_email(&config.subject, Utc::now());
            (config, content)
        }
    };

    let policy = match &cmd {
        EmailCommands::Send { delivery, .. } | EmailCommands::Test { delivery } => {
            delivery.policy()
        }
    };

    let result = deliver(&config, &content, policy).await?;
    report(&result, format);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(root: &Path, delivery: &DeliveryArgs) -> Result<EmailConfig> {
    let path = root.join(&delivery.config);
    EmailConfig::load(&path).context("Email configuration is incomplete")
}
