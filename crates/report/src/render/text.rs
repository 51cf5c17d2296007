//! Plain-text report

use crate::clean::clean_error_message;
use crate::render::{RenderOptions, ReportRenderer, ReportView};
use crate::results::{format_secs, TestRecord};
use crate::status::FinalStatus;

const WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    pub options: RenderOptions,
}

impl TextRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn render_test(&self, report: &mut String, record: &TestRecord) {
        let rule = "─".repeat(WIDTH);

        report.push_str(&format!("{} {}\n", record.status.glyph(), record.id.title()));
        report.push_str(&format!("Status: {}\n", record.status));
        report.push_str(&format!("Duration: {}s\n", format_secs(record.duration_ms)));

        if record.status == FinalStatus::Flaky {
            report.push_str("Flaky: true\n");
            report.push_str(&format!("Retries: {}\n", record.retry_count));
        }

        if self.options.include_errors {
            if let Some(error) = &record.error {
                report.push_str(&format!("Error: {}\n", clean_error_message(&error.message)));
            }
        }

        if self.options.include_screenshots {
            if let Some(path) = &record.screenshot_path {
                report.push_str("Screenshot:\n");
                report.push_str(&format!("- {}\n", path));
            }
        }

        report.push('\n');
        report.push_str(&rule);
        report.push_str("\n\n");
    }
}

impl ReportRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn render(&self, view: &ReportView<'_>) -> String {
        let summary = view.summary;
        let mut report = String::new();

        report.push_str("Test Report\n");
        report.push_str(&format!("Generated on: {}\n\n", view.generated_label()));

        report.push_str("Summary:\n");
        report.push_str(&format!("Total: {}\n", summary.total));
        report.push_str(&format!("Passed: {}\n", summary.passed));
        report.push_str(&format!("Failed: {}\n", summary.failed));
        report.push_str(&format!("Flaky: {}\n", summary.flaky));
        report.push_str(&format!("Skipped: {}\n", summary.skipped));
        report.push_str(&format!("Duration: {}s\n\n", summary.duration_secs()));

        if !self.options.include_details {
            return report;
        }

        report.push_str("Test Details\n");
        report.push_str(&"═".repeat(WIDTH));
        report.push_str("\n\n");

        for (category, tests) in view.grouped() {
            report.push_str(&format!("📁 {}\n", category));
            report.push_str(&"─".repeat(WIDTH));
            report.push_str("\n\n");

            for record in tests {
                self.render_test(&mut report, record);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::TestId;
    use crate::results::{AttemptOutcome, ResultsManager};
    use crate::status::RawStatus;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    }

    fn sample() -> ResultsManager {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let mut manager = ResultsManager::with_start(start);
        manager.record_attempt(
            &TestId::new("Search", "finds winter tours"),
            AttemptOutcome::new(RawStatus::Passed, 1200, 0),
        );
        manager.record_attempt(
            &TestId::new("Booking", "pays by card"),
            AttemptOutcome::new(RawStatus::Failed, 3400, 0)
                .with_error(
                    "\u{1b}[31mError: card declined\u{1b}[39m\n    at booking.spec.ts:40",
                    None,
                )
                .with_screenshot("test-results/booking-pays.png"),
        );
        manager.record_attempt(
            &TestId::new("Search", "filters by price"),
            AttemptOutcome::new(RawStatus::Passed, 900, 1),
        );
        manager.finalize_at(start + chrono::Duration::milliseconds(6500));
        manager
    }

    #[test]
    fn test_render_full_report() {
        let manager = sample();
        let report = TextRenderer::default().render(&ReportView::new(&manager, generated()));

        let thin = "─".repeat(80);
        let expected = format!(
            "Test Report\n\
             Generated on: 2026-03-01 10:15:00\n\
             \n\
             Summary:\n\
             Total: 3\n\
             Passed: 1\n\
             Failed: 1\n\
             Flaky: 1\n\
             Skipped: 0\n\
             Duration: 6.50s\n\
             \n\
             Test Details\n\
             {thick}\n\
             \n\
             📁 Search\n\
             {thin}\n\
             \n\
             ✅ finds winter tours\n\
             Status: passed\n\
             Duration: 1.20s\n\
             \n\
             {thin}\n\
             \n\
             🔁 filters by price\n\
             Status: flaky\n\
             Duration: 0.90s\n\
             Flaky: true\n\
             Retries: 1\n\
             \n\
             {thin}\n\
             \n\
             📁 Booking\n\
             {thin}\n\
             \n\
             ❌ pays by card\n\
             Status: failed\n\
             Duration: 3.40s\n\
             Error: card declined\n\
             Screenshot:\n\
             - test-results/booking-pays.png\n\
             \n\
             {thin}\n\
             \n",
            thick = "═".repeat(80),
            thin = thin,
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn test_options_hide_sections() {
        let manager = sample();
        let view = ReportView::new(&manager, generated());

        let no_details = TextRenderer::new(RenderOptions {
            include_details: false,
            ..Default::default()
        })
        .render(&view);
        assert!(no_details.ends_with("Duration: 6.50s\n\n"));
        assert!(!no_details.contains("Test Details"));

        let quiet = TextRenderer::new(RenderOptions {
            include_errors: false,
            include_screenshots: false,
            ..Default::default()
        })
        .render(&view);
        assert!(!quiet.contains("Error:"));
        assert!(!quiet.contains("Screenshot:"));
        assert!(quiet.contains("pays by card"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let manager = sample();
        let view = ReportView::new(&manager, generated());
        let renderer = TextRenderer::default();
        assert_eq!(renderer.render(&view), renderer.render(&view));
    }

    #[test]
    fn test_key_without_separator_still_rendered() {
        let mut manager = ResultsManager::new();
        manager.record_attempt(
            &TestId::from_key("loose"),
            AttemptOutcome::new(RawStatus::Skipped, 0, 0),
        );
        manager.finalize();

        let report = TextRenderer::default().render(&ReportView::new(&manager, generated()));
        assert!(report.contains("📁 loose\n"));
        assert!(report.contains("⏩ Unknown Test\n"));
    }
}
