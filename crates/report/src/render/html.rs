//! Self-contained HTML report
//!
//! Test titles and error messages come from user-authored specs and exception
//! text, so every interpolated value goes through `escape_html`.

use crate::clean::{escape_html, strip_ansi};
use crate::render::{ReportRenderer, ReportView};
use crate::results::{format_secs, TestRecord};
use crate::status::FinalStatus;

const STYLE: &str = r#"
    body {
      font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
      line-height: 1.6;
      color: #333;
      max-width: 1200px;
      margin: 0 auto;
      padding: 20px;
      background-color: #f5f5f5;
    }
    pre { margin: 0; padding: 0; white-space: pre-wrap; }
    h4 { margin: 0; }
    .header {
      background-color: #4CAF50;
      color: white;
      padding: 5px 20px;
      text-align: center;
      border-radius: 5px;
      margin-bottom: 20px;
      box-shadow: 0 2px 5px rgba(0,0,0,0.3);
    }
    .summary { display: flex; justify-content: space-between; flex-wrap: wrap; gap: 15px; margin-bottom: 10px; }
    .summary-card {
      flex: 1;
      min-width: 150px;
      background-color: white;
      border-radius: 5px;
      padding: 10px;
      text-align: center;
      box-shadow: 0 2px 5px rgba(0,0,0,0.1);
    }
    .summary-card.passed { border-top: 5px solid #4CAF50; }
    .summary-card.failed { border-top: 5px solid #f44336; }
    .summary-card.skipped { border-top: 5px solid #ff9800; }
    .summary-card.time { border-top: 5px solid #2196F3; }
    .category { margin: 25px 0 55px 0; }
    .category-header {
      background-color: #2196F3;
      color: white;
      padding: 10px 15px;
      font-weight: bold;
      text-transform: uppercase;
      border-radius: 5px;
      cursor: pointer;
      box-shadow: 0 2px 5px rgba(0,0,0,0.3);
    }
    .test-list { padding: 0; margin: 0; list-style: none; }
    .test-item { padding: 15px; margin: 7px auto; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.2); }
    .test-item.passed { background-color: #f1f8e9; }
    .test-item.failed { background-color: #ffebee; }
    .test-item.skipped { background-color: #fff3e0; }
    .test-item.flaky { background-color: #fffde7; }
    .test-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 10px; }
    .test-title { font-weight: bold; flex: 1; }
    .test-status { padding: 4px 8px; border-radius: 4px; font-size: 0.9em; color: white; }
    .test-status.passed { background-color: #4CAF50; }
    .test-status.failed { background-color: #f44336; }
    .test-status.skipped { background-color: #ff9800; }
    .test-status.flaky { background-color: #fbc02d; }
    .test-duration { color: #666; font-size: 0.9em; }
    .test-error { padding: 0 10px; background-color: #ffebee; border-radius: 4px; font-family: monospace; }
    .chart-container {
      background-color: white;
      border-radius: 5px;
      padding: 20px;
      margin-bottom: 30px;
      box-shadow: 0 2px 5px rgba(0,0,0,0.1);
    }
    .emoji { font-family: "Noto Color Emoji", "Apple Color Emoji", "Segoe UI Emoji", sans-serif; }
"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn render_summary(&self, html: &mut String, view: &ReportView<'_>) {
        let summary = view.summary;
        html.push_str(&format!(
            r#"
    <div class="summary">
      <div class="summary-card passed">
        <h4>Passed</h4>
        <p><span class="emoji">✅</span> {passed}</p>
      </div>
      <div class="summary-card failed">
        <h4>Failed</h4>
        <p><span class="emoji">❌</span> {failed}</p>
      </div>
      <div class="summary-card skipped">
        <h4>Skipped</h4>
        <p><span class="emoji">⏩</span> {skipped}</p>
      </div>
      <div class="summary-card time">
        <h4>Duration</h4>
        <p><span class="emoji">⏱️</span> {duration}s</p>
      </div>
    </div>
"#,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            duration = summary.duration_secs(),
        ));
    }

    fn render_test(&self, html: &mut String, record: &TestRecord) {
        let status = record.status.as_str();
        html.push_str(&format!(
            r#"
        <li class="test-item {status}">
          <div class="test-header">
            <div class="test-title">{title}</div>
            <div class="test-status {status}">{label}</div>
          </div>
          <div class="test-duration"><span class="emoji">{glyph}</span> Duration: {duration}s</div>
"#,
            status = status,
            title = escape_html(record.id.title()),
            label = status.to_uppercase(),
            glyph = record.status.glyph(),
            duration = format_secs(record.duration_ms),
        ));

        if record.status == FinalStatus::Failed {
            if let Some(error) = &record.error {
                html.push_str(&format!(
                    r#"          <div class="test-error">
            <pre><span class="emoji">{glyph}</span> Error: {message}</pre>
          </div>
"#,
                    glyph = record.status.glyph(),
                    message = escape_html(&strip_ansi(&error.message)),
                ));
            }
        }

        html.push_str("        </li>\n");
    }

    fn render_chart(&self, html: &mut String, view: &ReportView<'_>) {
        let summary = view.summary;
        html.push_str(&format!(
            r#"
    <div class="chart-container">
      <canvas id="results-chart"></canvas>
    </div>

    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <script>
      document.addEventListener('DOMContentLoaded', function() {{
        const ctx = document.getElementById('results-chart').getContext('2d');
        new Chart(ctx, {{
          type: 'bar',
          data: {{
            labels: ['{passed} Passed', '{failed} Failed', '{skipped} Skipped'],
            datasets: [{{
              data: [{passed}, {failed}, {skipped}],
              backgroundColor: ['#4CAF50', '#f44336', '#ff9800']
            }}]
          }},
          options: {{
            responsive: true,
            plugins: {{
              legend: {{ display: false }},
              title: {{ display: true, text: 'Test Results Distribution', font: {{ size: 18, weight: 'bold' }} }}
            }}
          }}
        }});
      }});
    </script>
"#,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
        ));
    }
}

impl ReportRenderer for HtmlRenderer {
    fn name(&self) -> &'static str {
        "html"
    }

    fn render(&self, view: &ReportView<'_>) -> String {
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Test Report</title>
    <style>"#,
        );
        html.push_str(STYLE);
        html.push_str("    </style>\n  </head>\n  <body>\n");

        html.push_str(&format!(
            r#"    <div class="header">
      <h1>Test Report</h1>
      <p>Generated on: {}</p>
    </div>
"#,
            escape_html(&view.generated_label())
        ));

        self.render_summary(&mut html, view);

        for (category, tests) in view.grouped() {
            html.push_str(&format!(
                r#"
    <details class="category" open>
      <summary class="category-header"><span class="emoji">📁</span> {}</summary>
      <ul class="test-list">
"#,
                escape_html(category)
            ));
            for record in tests {
                self.render_test(&mut html, record);
            }
            html.push_str("      </ul>\n    </details>\n");
        }

        self.render_chart(&mut html, view);

        html.push_str("  </body>\n</html>\n");
        html
    }
}
