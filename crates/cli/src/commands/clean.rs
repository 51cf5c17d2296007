//! Clean Command

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

use tourbook_report::sink::delete_if_exists;
use tourbook_report::ReportPaths;

use crate::output::{print_success, print_warning};

/// Generated artifacts removed by `clean`
fn targets(paths: &ReportPaths) -> Vec<PathBuf> {
    vec![
        paths.fixed_text_report(),
        paths.html_report.clone(),
        paths.json_report.clone(),
    ]
}

/// Remove the previous run's artifacts. Returns how many could not be removed.
pub fn remove_artifacts(root: &Path) -> usize {
    let paths = ReportPaths::under(root);
    targets(&paths)
        .iter()
        .filter(|path| match delete_if_exists(path) {
            Ok(()) => false,
            Err(e) => {
                warn!("Could not remove {}: {}", path.display(), e);
                true
            }
        })
        .count()
}

pub async fn execute(root: &Path) -> Result<()> {
    match remove_artifacts(root) {
        0 => print_success("Removed previous report artifacts"),
        n => print_warning(&format!("{} artifact(s) could not be removed", n)),
    }
    Ok(())
}
