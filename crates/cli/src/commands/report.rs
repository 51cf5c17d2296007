//! Report Commands

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use tourbook_report::playwright::RunnerReport;
use tourbook_report::{
    ArtifactStatus, RenderOptions, ReportPaths, Reporter, Summary, TextReportNaming,
};

use crate::output::{print_item, print_list, print_warning, OutputFormat};

#[derive(Args)]
pub struct ReportArgs {
    /// Runner JSON output to ingest, relative to the project root
    #[arg(long, default_value = "logs/test-report.json")]
    pub results: PathBuf,

    /// Write the text report to a new timestamped file instead of parsed-log.txt
    #[arg(long)]
    pub timestamped: bool,

    /// Summary only, no per-test section in the text report
    #[arg(long)]
    pub no_details: bool,

    /// Leave error messages out of the text report
    #[arg(long)]
    pub no_errors: bool,

    /// Leave screenshot paths out of the text report
    #[arg(long)]
    pub no_screenshots: bool,

    /// Exit with status 1 when any test failed
    #[arg(long)]
    pub fail_on_failures: bool,
}

impl ReportArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            include_details: !self.no_details,
            include_errors: !self.no_errors,
            include_screenshots: !self.no_screenshots,
        }
    }

    fn paths(&self, root: &Path) -> ReportPaths {
        let mut paths = ReportPaths::under(root);
        if self.timestamped {
            paths.text_naming = TextReportNaming::Timestamped;
        }
        paths
    }
}

/// Replay the runner output through a fresh reporter
pub fn generate(args: &ReportArgs, root: &Path) -> Result<(Summary, Vec<ArtifactStatus>)> {
    let input = root.join(&args.results);
    let runner = RunnerReport::from_file(&input)
        .with_context(|| format!("Failed to load runner output from {}", input.display()))?;

    let mut reporter = Reporter::new(args.paths(root), args.options())
        .starting_at(runner.started_at().unwrap_or_else(Utc::now));
    let attempts = runner.replay(&mut reporter);
    info!("Processed {} attempt(s) from {}", attempts, input.display());

    Ok((*reporter.summary(), reporter.artifacts().to_vec()))
}

pub async fn execute(args: ReportArgs, root: &Path, format: OutputFormat) -> Result<()> {
    let (summary, artifacts) = generate(&args, root)?;

    print_item(&summary, format);
    print_list(&artifacts, format);

    let failed_writes = artifacts.iter().filter(|a| !a.is_written()).count();
    if failed_writes > 0 {
        print_warning(&format!("{} artifact(s) could not be written", failed_writes));
    }

    if args.fail_on_failures && summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
