//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use tourbook_mailer::DeliveryResult;
use tourbook_report::{ArtifactStatus, Summary};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for Summary {
    fn headers() -> Vec<&'static str> {
        vec!["Total", "Passed", "Failed", "Flaky", "Skipped", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.total.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.flaky.to_string(),
            self.skipped.to_string(),
            format!("{}s", self.duration_secs()),
        ]
    }
}

impl TableDisplay for ArtifactStatus {
    fn headers() -> Vec<&'static str> {
        vec!["Artifact", "Path", "Status"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.kind.to_string(),
            self.path.display().to_string(),
            match &self.error {
                None => "written".to_string(),
                Some(e) => format!("failed: {}", e),
            },
        ]
    }
}

impl TableDisplay for DeliveryResult {
    fn headers() -> Vec<&'static str> {
        vec!["Delivered", "Attempts", "Message ID / Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            if self.success { "yes" } else { "no" }.to_string(),
            self.attempts.to_string(),
            self.message_id
                .clone()
                .or_else(|| self.error.clone())
                .unwrap_or_default(),
        ]
    }
}

fn table<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", table(std::slice::from_ref(item))),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items found.");
            } else {
                println!("{}", table(items));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}
