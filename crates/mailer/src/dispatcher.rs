//! Email dispatcher
//!
//! Drives a [`MailTransport`] through verify, bounded-retry send and close.
//!
//! ```text
//! Uninitialized ──initialize──▶ Verified ──send──▶ Sending ──ok──▶ Verified
//!       │                          ▲                 │
//!       │ verify error             └──── RetryWait ◀─┘ error, attempts left
//!       ▼                                            │ error, budget spent
//!     Failed ◀───────────────────────────────────────┘
//!
//! cleanup(): any state ──▶ Closed (Failed stays Failed)
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::compose::EmailContent;
use crate::error::{MailError, MailResult};
use crate::transport::MailTransport;

/// Waits between delivery attempts
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Real timer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherState {
    Uninitialized,
    Verified,
    Sending,
    RetryWait,
    Closed,
    Failed,
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatcherState::Uninitialized => "uninitialized",
            DispatcherState::Verified => "verified",
            DispatcherState::Sending => "sending",
            DispatcherState::RetryWait => "retry_wait",
            DispatcherState::Closed => "closed",
            DispatcherState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Attempt budget for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Outcome of `send_with_retry`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: u32,
}

impl DeliveryResult {
    fn delivered(message_id: String, attempts: u32) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            error: None,
            attempts,
        }
    }

    fn failed(error: impl Into<String>, attempts: u32) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
            attempts,
        }
    }
}

pub struct EmailDispatcher<T: MailTransport, P: Pause = TokioPause> {
    transport: T,
    pause: P,
    state: DispatcherState,
    transport_open: bool,
}

impl<T: MailTransport> EmailDispatcher<T, TokioPause> {
    pub fn new(transport: T) -> Self {
        Self::with_pause(transport, TokioPause)
    }
}

impl<T: MailTransport, P: Pause> EmailDispatcher<T, P> {
    pub fn with_pause(transport: T, pause: P) -> Self {
        Self {
            transport,
            pause,
            state: DispatcherState::Uninitialized,
            transport_open: true,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Verify the transport. A failure is final: the dispatcher moves to
    /// `Failed` and is not retried.
    pub async fn initialize(&mut self) -> MailResult<()> {
        match self.state {
            DispatcherState::Verified => return Ok(()),
            DispatcherState::Uninitialized => {}
            _ => return Err(MailError::NotInitialized),
        }

        match self.transport.verify().await {
            Ok(()) => {
                info!("✅ SMTP connection verified");
                self.state = DispatcherState::Verified;
                Ok(())
            }
            Err(e) => {
                error!("❌ SMTP verification failed: {}", e);
                self.state = DispatcherState::Failed;
                Err(match e {
                    MailError::Verify(_) => e,
                    other => MailError::Verify(other.to_string()),
                })
            }
        }
    }

    /// Try to deliver `content` up to `policy.max_attempts` times, pausing
    /// `policy.delay` between attempts. Never returns an error; the outcome is
    /// in the result.
    pub async fn send_with_retry(
        &mut self,
        content: &EmailContent,
        policy: RetryPolicy,
    ) -> DeliveryResult {
        if self.state != DispatcherState::Verified {
            warn!("Refusing to send from state {}", self.state);
            return DeliveryResult::failed(MailError::NotInitialized.to_string(), 0);
        }

        let max_attempts = policy.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            self.state = DispatcherState::Sending;
            match self.transport.send(content).await {
                Ok(message_id) => {
                    info!(
                        "✅ Report successfully sent via email ({}), attempt {}/{}",
                        message_id, attempt, max_attempts
                    );
                    self.state = DispatcherState::Verified;
                    return DeliveryResult::delivered(message_id, attempt);
                }
                Err(e) => {
                    warn!("Send attempt {}/{} failed: {}", attempt, max_attempts, e);
                    last_error = e.to_string();
                }
            }

            if attempt < max_attempts {
                self.state = DispatcherState::RetryWait;
                self.pause.pause(policy.delay).await;
            }
        }

        error!(
            "❌ Error sending report via email after {} attempt(s): {}",
            max_attempts, last_error
        );
        self.state = DispatcherState::Failed;
        DeliveryResult::failed(last_error, max_attempts)
    }

    /// Close the transport. Safe to call more than once; close errors are
    /// logged and dropped.
    pub async fn cleanup(&mut self) {
        if self.transport_open {
            if let Err(e) = self.transport.close().await {
                warn!("Error closing SMTP transport: {}", e);
            }
            self.transport_open = false;
        }

        if self.state != DispatcherState::Failed {
            self.state = DispatcherState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Transport that fails the first `failures` sends
    #[derive(Default)]
    struct ScriptedTransport {
        failures: u32,
        reject_verify: bool,
        fail_close: bool,
        sends: AtomicU32,
        closes: AtomicU32,
    }

    #[async_trait]
    impl MailTransport for ScriptedTransport {
        async fn verify(&self) -> MailResult<()> {
            if self.reject_verify {
                Err(MailError::Verify("535 authentication failed".to_string()))
            } else {
                Ok(())
            }
        }

        async fn send(&self, _content: &EmailContent) -> MailResult<String> {
            let n = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(MailError::Send(format!("421 try again ({})", n)))
            } else {
                Ok(format!("<msg-{}@example.org>", n))
            }
        }

        async fn close(&mut self) -> MailResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                Err(MailError::Send("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    /// Records requested pauses without sleeping
    #[derive(Default)]
    struct RecordingPause {
        pauses: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Pause for RecordingPause {
        async fn pause(&self, duration: Duration) {
            self.pauses.lock().unwrap().push(duration);
        }
    }

    fn dispatcher(
        transport: ScriptedTransport,
    ) -> EmailDispatcher<ScriptedTransport, RecordingPause> {
        EmailDispatcher::with_pause(transport, RecordingPause::default())
    }

    #[tokio::test]
    async fn test_send_before_initialize_is_refused() {
        let mut d = dispatcher(ScriptedTransport::default());
        let result = d.send_with_retry(&EmailContent::default(), RetryPolicy::default()).await;

        assert!(!result.success);
        assert_eq!(result.attempts, 0);
        assert_eq!(d.transport().sends.load(Ordering::SeqCst), 0);
        assert_eq!(d.state(), DispatcherState::Uninitialized);
    }

    #[tokio::test]
    async fn test_verify_failure_is_final() {
        let mut d = dispatcher(ScriptedTransport {
            reject_verify: true,
            ..Default::default()
        });

        assert!(matches!(d.initialize().await, Err(MailError::Verify(_))));
        assert_eq!(d.state(), DispatcherState::Failed);
        assert!(matches!(d.initialize().await, Err(MailError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failure() {
        let mut d = dispatcher(ScriptedTransport {
            failures: 1,
            ..Default::default()
        });
        d.initialize().await.unwrap();

        let result = d.send_with_retry(&EmailContent::default(), RetryPolicy::default()).await;
        assert!(result.success);
        assert_eq!(result.attempts, 2);
        assert_eq!(result.message_id.as_deref(), Some("<msg-2@example.org>"));
        assert_eq!(d.state(), DispatcherState::Verified);
        assert_eq!(*d.pause.pauses.lock().unwrap(), vec![Duration::from_millis(1000)]);
    }

    #[tokio::test]
    async fn test_exhausted_budget_reports_last_error() {
        let mut d = dispatcher(ScriptedTransport {
            failures: u32::MAX,
            ..Default::default()
        });
        d.initialize().await.unwrap();

        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(250),
        };
        let result = d.send_with_retry(&EmailContent::default(), policy).await;

        assert!(!result.success);
        assert_eq!(result.attempts, 3);
        assert!(result.message_id.is_none());
        assert!(result.error.unwrap().contains("(3)"));
        assert_eq!(d.transport().sends.load(Ordering::SeqCst), 3);
        assert_eq!(d.pause.pauses.lock().unwrap().len(), 2);
        assert_eq!(d.state(), DispatcherState::Failed);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let mut d = dispatcher(ScriptedTransport::default());
        d.initialize().await.unwrap();

        let policy = RetryPolicy {
            max_attempts: 0,
            delay: Duration::ZERO,
        };
        let result = d.send_with_retry(&EmailContent::default(), policy).await;
        assert!(result.success);
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent_and_swallows_errors() {
        let mut d = dispatcher(ScriptedTransport {
            fail_close: true,
            ..Default::default()
        });
        d.initialize().await.unwrap();

        d.cleanup().await;
        d.cleanup().await;
        assert_eq!(d.state(), DispatcherState::Closed);
        assert_eq!(d.transport().closes.load(Ordering::SeqCst), 1);

        let result = d.send_with_retry(&EmailContent::default(), RetryPolicy::default()).await;
        assert!(!result.success);
    }
}
