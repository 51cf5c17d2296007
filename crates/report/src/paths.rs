//! Locations of generated artifacts

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the text report file is named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextReportNaming {
    /// Always `parsed-log.txt`, overwritten each run
    #[default]
    Fixed,
    /// `parsed-log_<YYYY-MM-DD>_<HH-MM-SS>.txt`, one file per run
    Timestamped,
}

/// Where a run writes its artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPaths {
    /// Root for generated reports
    pub reports_dir: PathBuf,

    /// Root for text and JSON logs
    pub logs_dir: PathBuf,

    /// Directory the runner stores screenshots in
    pub screenshots_dir: PathBuf,

    /// HTML report
    pub html_report: PathBuf,

    /// JSON raw data dump
    pub json_report: PathBuf,

    /// Naming scheme for the text report
    pub text_naming: TextReportNaming,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self::under(Path::new("."))
    }
}

impl ReportPaths {
    /// Default layout relative to a project root
    pub fn under(root: &Path) -> Self {
        let logs_dir = root.join("logs");
        Self {
            reports_dir: root.join("reports"),
            screenshots_dir: root.join("test-results"),
            html_report: root.join("html-report").join("index.html"),
            json_report: logs_dir.join("json").join("test-report.json"),
            logs_dir,
            text_naming: TextReportNaming::Fixed,
        }
    }

    /// The fixed-name text report, also the file cleared before a run
    pub fn fixed_text_report(&self) -> PathBuf {
        self.logs_dir.join("txt").join("parsed-log.txt")
    }

    /// Text report path for a run generated at `now`
    pub fn text_report(&self, now: NaiveDateTime) -> PathBuf {
        match self.text_naming {
            TextReportNaming::Fixed => self.fixed_text_report(),
            TextReportNaming::Timestamped => timestamped_text_report(&self.logs_dir, now),
        }
    }

    /// Directories created before a run
    pub fn directories(&self) -> Vec<&Path> {
        vec![
            self.reports_dir.as_path(),
            self.logs_dir.as_path(),
            self.screenshots_dir.as_path(),
        ]
    }
}

/// `<logs>/txt/parsed-log_<YYYY-MM-DD>_<HH-MM-SS>.txt`
pub fn timestamped_text_report(logs_dir: &Path, now: NaiveDateTime) -> PathBuf {
    let file_name = format!("parsed-log_{}.txt", now.format("%Y-%m-%d_%H-%M-%S"));
    logs_dir.join("txt").join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(7, 3, 9)
            .unwrap()
    }

    #[test]
    fn test_timestamped_name_is_zero_padded() {
        let path = timestamped_text_report(Path::new("logs"), at());
        assert_eq!(path, Path::new("logs/txt/parsed-log_2026-01-05_07-03-09.txt"));
    }

    #[test]
    fn test_naming_switch() {
        let mut paths = ReportPaths::under(Path::new("/proj"));
        assert_eq!(paths.text_report(at()), Path::new("/proj/logs/txt/parsed-log.txt"));

        paths.text_naming = TextReportNaming::Timestamped;
        assert_eq!(
            paths.text_report(at()),
            Path::new("/proj/logs/txt/parsed-log_2026-01-05_07-03-09.txt")
        );
        assert_eq!(paths.html_report, Path::new("/proj/html-report/index.html"));
        assert_eq!(paths.json_report, Path::new("/proj/logs/json/test-report.json"));
    }
}
