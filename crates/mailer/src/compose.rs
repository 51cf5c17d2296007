//! Report email composition
//!
//! Reads the generated text and HTML artifacts and picks the screenshots to
//! attach inline.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::error::{MailError, MailResult};

pub const MAX_ATTACHMENTS: usize = 10;
pub const REPORT_HEADING: &str = "Tour Booking Web Service Test Report";
pub const HTML_FALLBACK: &str = "<p>HTML report is not available</p>";
pub const TEXT_FALLBACK: &str = "Text report is not available";

/// An image referenced from the HTML body by `cid:<content_id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAttachment {
    pub filename: String,
    pub content_id: String,
    pub path: PathBuf,
}

/// One message, independent of the transport that sends it
#[derive(Debug, Clone, Default)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
    pub attachments: Vec<InlineAttachment>,
}

/// Where the report artifacts for one run live
#[derive(Debug, Clone)]
pub struct ReportSources {
    pub html_report: PathBuf,
    pub text_report: PathBuf,
    pub screenshots_dir: PathBuf,
}

/// PNG files directly under `dir`, sorted by name, capped at `limit`.
///
/// A missing or unreadable directory yields no attachments.
pub fn collect_screenshots(dir: &Path, limit: usize) -> Vec<InlineAttachment> {
    if !dir.is_dir() {
        debug!("No screenshots directory at {}", dir.display());
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".png"))
        .take(limit)
        .enumerate()
        .map(|(i, entry)| InlineAttachment {
            filename: entry.file_name().to_string_lossy().into_owned(),
            content_id: format!("screenshot_{}", i),
            path: entry.into_path(),
        })
        .collect()
}

fn read_report(path: &Path, kind: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            error!("Error reading {} report {}: {}", kind, path.display(), e);
            None
        }
    }
}

/// Build the report email from the artifacts on disk.
///
/// Fails with [`MailError::NoReport`] only when neither report can be read.
pub fn compose_report_email(
    sources: &ReportSources,
    subject: &str,
    additional_text: Option<&str>,
    now: NaiveDateTime,
) -> MailResult<EmailContent> {
    let html = read_report(&sources.html_report, "HTML");
    let text = read_report(&sources.text_report, "text");

    if html.is_none() && text.is_none() {
        return Err(MailError::NoReport);
    }

    let attachments = collect_screenshots(&sources.screenshots_dir, MAX_ATTACHMENTS);
    debug!("Attaching {} screenshot(s)", attachments.len());

    let body = format!(
        "{}\nDate: {}\n\n{}\n\n{}\n",
        REPORT_HEADING,
        now.format("%Y-%m-%d %H:%M:%S"),
        additional_text.unwrap_or_default(),
        text.as_deref().unwrap_or(TEXT_FALLBACK),
    );

    Ok(EmailContent {
        subject: subject.to_string(),
        text: body,
        html: html.unwrap_or_else(|| HTML_FALLBACK.to_string()),
        attachments,
    })
}

/// Small message used to check SMTP settings end to end
pub fn connectivity_test_email(subject: &str, now: DateTime<Utc>) -> EmailContent {
    let stamp = now.to_rfc3339();
    EmailContent {
        subject: format!("{} (connection test)", subject),
        text: format!("SMTP connection test sent at {}", stamp),
        html: format!(
            "<h1>SMTP connection test</h1><p>Sent at {}. If you can read this, report emails will arrive.</p>",
            stamp
        ),
        attachments: Vec::new(),
    }
}
