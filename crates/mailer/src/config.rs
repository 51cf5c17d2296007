//! SMTP and message configuration
//!
//! Values come from the environment first. When credentials or recipients are
//! missing, `email-config.json` fills the gaps; an environment value always
//! wins over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{MailError, MailResult};

pub const DEFAULT_CONFIG_FILE: &str = "email-config.json";
pub const DEFAULT_SUBJECT: &str = "Tour Booking Web Service Test Report";

/// Email configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP server host
    pub host: String,

    /// SMTP server port
    pub port: u16,

    /// Implicit TLS from the first byte; otherwise STARTTLS is required
    pub secure: bool,

    pub auth: SmtpAuth,

    /// Sender address
    pub from: String,

    /// Recipient addresses
    pub to: Vec<String>,

    pub subject: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmtpAuth {
    pub user: String,
    pub pass: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            secure: false,
            auth: SmtpAuth::default(),
            from: "automated-tests@example.com".to_string(),
            to: Vec::new(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

/// Shape of `email-config.json`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEmailConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub auth: Option<FileAuth>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<Vec<String>>,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileAuth {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pass: Option<String>,
}

impl FileEmailConfig {
    pub fn from_file(path: &Path) -> MailResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MailError::ConfigFile(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| MailError::ConfigFile(format!("{}: {}", path.display(), e)))
    }
}

/// Split a comma separated recipient list, dropping blanks
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw values read from the environment, before defaults are applied
#[derive(Debug, Clone, Default)]
struct EnvValues {
    host: Option<String>,
    port: Option<String>,
    secure: Option<String>,
    user: Option<String>,
    pass: Option<String>,
    from: Option<String>,
    to: Option<String>,
    subject: Option<String>,
}

impl EnvValues {
    fn read<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            host: get("SMTP_HOST"),
            port: get("SMTP_PORT"),
            secure: get("SMTP_SECURE"),
            user: get("SMTP_USER"),
            pass: get("SMTP_PASS"),
            from: get("EMAIL_FROM"),
            to: get("EMAIL_TO"),
            subject: get("EMAIL_SUBJECT"),
        }
    }
}

fn parse_port(raw: &str) -> u16 {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!("Ignoring invalid SMTP_PORT value {:?}", raw);
        0
    })
}

impl EmailConfig {
    /// Load from the process environment with `config_file` as fallback, then
    /// validate
    pub fn load(config_file: &Path) -> MailResult<Self> {
        Self::load_with(|key| std::env::var(key).ok(), config_file)
    }

    pub fn load_with<F>(lookup: F, config_file: &Path) -> MailResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvValues::read(lookup);
        let mut config = Self::merge(env.clone(), None);

        if !config.has_credentials_and_recipients() {
            if config_file.exists() {
                match FileEmailConfig::from_file(config_file) {
                    Ok(file) => {
                        debug!("Merging email config from {}", config_file.display());
                        config = Self::merge(env, Some(file));
                    }
                    Err(e) => warn!("⚠️ Failed to load email configuration from file: {}", e),
                }
            } else {
                debug!("No email config file at {}", config_file.display());
            }
        }

        let problems = config.validate();
        if !problems.is_empty() {
            return Err(MailError::InvalidConfig(problems));
        }
        Ok(config)
    }

    fn merge(env: EnvValues, file: Option<FileEmailConfig>) -> Self {
        let defaults = Self::default();
        let file = file.unwrap_or_default();
        let file_auth = file.auth.unwrap_or_default();

        Self {
            host: env.host.or(file.host).unwrap_or(defaults.host),
            port: env
                .port
                .as_deref()
                .map(parse_port)
                .or(file.port)
                .unwrap_or(defaults.port),
            secure: env
                .secure
                .map(|v| v == "true")
                .or(file.secure)
                .unwrap_or(defaults.secure),
            auth: SmtpAuth {
                user: env.user.or(file_auth.user).unwrap_or_default(),
                pass: env.pass.or(file_auth.pass).unwrap_or_default(),
            },
            from: env.from.or(file.from).unwrap_or(defaults.from),
            to: env
                .to
                .as_deref()
                .map(parse_recipients)
                .or(file.to)
                .unwrap_or_default(),
            subject: env.subject.or(file.subject).unwrap_or(defaults.subject),
        }
    }

    fn has_credentials_and_recipients(&self) -> bool {
        !self.auth.user.is_empty() && !self.auth.pass.is_empty() && !self.to.is_empty()
    }

    /// Every problem with this configuration; empty when usable
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.host.trim().is_empty() {
            problems.push("SMTP host is empty".to_string());
        }
        if self.port == 0 {
            problems.push("SMTP port must be between 1 and 65535".to_string());
        }
        if self.auth.user.is_empty() {
            problems.push("SMTP_USER is not set".to_string());
        }
        if self.auth.pass.is_empty() {
            problems.push("SMTP_PASS is not set".to_string());
        }
        if !looks_like_address(&self.from) {
            problems.push(format!("Sender address {:?} is not valid", self.from));
        }
        if self.to.is_empty() {
            problems.push("EMAIL_TO has no recipients".to_string());
        }
        for recipient in self.to.iter().filter(|r| !looks_like_address(r)) {
            problems.push(format!("Recipient address {:?} is not valid", recipient));
        }

        problems
    }
}

fn looks_like_address(addr: &str) -> bool {
    match addr.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
