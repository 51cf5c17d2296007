//! Dispatcher behaviour against a transport that never delivers

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;

use tourbook_mailer::{
    compose_report_email, DispatcherState, EmailContent, EmailDispatcher, MailError,
    MailResult, MailTransport, ReportSources, RetryPolicy,
};

#[derive(Default)]
struct DownTransport {
    sends: AtomicU32,
}

#[async_trait]
impl MailTransport for DownTransport {
    async fn verify(&self) -> MailResult<()> {
        Ok(())
    }

    async fn send(&self, _content: &EmailContent) -> MailResult<String> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        Err(MailError::Send("Connection refused".to_string()))
    }

    async fn close(&mut self) -> MailResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn always_failing_transport_exhausts_budget() {
    let delay = Duration::from_millis(40);
    let mut dispatcher = EmailDispatcher::new(DownTransport::default());
    dispatcher.initialize().await.unwrap();

    let started = Instant::now();
    let result = dispatcher
        .send_with_retry(
            &EmailContent::default(),
            RetryPolicy {
                max_attempts: 3,
                delay,
            },
        )
        .await;
    let elapsed = started.elapsed();

    assert!(!result.success);
    assert_eq!(result.attempts, 3);
    assert!(result.error.is_some());
    assert_eq!(dispatcher.transport().sends.load(Ordering::SeqCst), 3);
    assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);

    dispatcher.cleanup().await;
    assert_eq!(dispatcher.state(), DispatcherState::Failed);
}

#[tokio::test]
async fn composed_report_is_offered_to_transport() {
    let dir = TempDir::new().unwrap();
    let sources = ReportSources {
        html_report: dir.path().join("html-report/index.html"),
        text_report: dir.path().join("logs/txt/parsed-log.txt"),
        screenshots_dir: dir.path().join("test-results"),
    };
    std::fs::create_dir_all(sources.html_report.parent().unwrap()).unwrap();
    std::fs::write(&sources.html_report, "<h1>Test Report</h1>").unwrap();

    let content = compose_report_email(
        &sources,
        "Tour Booking Web Service Test Report",
        None,
        chrono::Local::now().naive_local(),
    )
    .unwrap();

    let mut dispatcher = EmailDispatcher::new(DownTransport::default());
    dispatcher.initialize().await.unwrap();
    let result = dispatcher
        .send_with_retry(
            &content,
            RetryPolicy {
                max_attempts: 1,
                delay: Duration::ZERO,
            },
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.attempts, 1);
    assert_eq!(content.html, "<h1>Test Report</h1>");
}
