//! Filesystem output for generated artifacts
//!
//! Every operation reports failure through its result and carries the target
//! path, so the reporter can log one failed artifact and keep writing the rest.

use std::path::Path;
use tracing::debug;

use crate::error::{ReportError, ReportResult};
use crate::paths::ReportPaths;

/// Destination for rendered artifacts
pub trait ArtifactSink {
    fn ensure_directory(&self, path: &Path) -> ReportResult<()>;
    fn write_artifact(&self, path: &Path, content: &str) -> ReportResult<()>;
    fn delete_if_exists(&self, path: &Path) -> ReportResult<()>;
}

/// Writes artifacts to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl ArtifactSink for FsSink {
    fn ensure_directory(&self, path: &Path) -> ReportResult<()> {
        ensure_directory(path)
    }

    fn write_artifact(&self, path: &Path, content: &str) -> ReportResult<()> {
        write_artifact(path, content)
    }

    fn delete_if_exists(&self, path: &Path) -> ReportResult<()> {
        delete_if_exists(path)
    }
}

/// Create a directory and its parents. Succeeds if it already exists.
pub fn ensure_directory(path: &Path) -> ReportResult<()> {
    std::fs::create_dir_all(path).map_err(|e| ReportError::filesystem(path, e))
}

/// Write `content` to `path`, creating the parent directory and replacing any
/// existing file
pub fn write_artifact(path: &Path, content: &str) -> ReportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    std::fs::write(path, content).map_err(|e| ReportError::filesystem(path, e))?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Remove a file if present; a missing file is not an error
pub fn delete_if_exists(path: &Path) -> ReportResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ReportError::filesystem(path, e)),
    }
}

/// Create the report, log and screenshot roots. One result per directory.
pub fn initialize_report_directories<S: ArtifactSink + ?Sized>(
    sink: &S,
    paths: &ReportPaths,
) -> Vec<ReportResult<()>> {
    paths
        .directories()
        .into_iter()
        .map(|dir| sink.ensure_directory(dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_missing_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/nested/report.txt");

        write_artifact(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");

        write_artifact(&path, "first run with more text").unwrap();
        write_artifact(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_ensure_directory_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b");
        ensure_directory(&path).unwrap();
        ensure_directory(&path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn test_ensure_directory_reports_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();

        let err = ensure_directory(&file.join("child")).unwrap_err();
        match err {
            ReportError::Filesystem { path, .. } => assert!(path.ends_with("occupied/child")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_delete_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stale.txt");

        delete_if_exists(&path).unwrap();
        std::fs::write(&path, "old").unwrap();
        delete_if_exists(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_initialize_report_directories() {
        let dir = TempDir::new().unwrap();
        let paths = ReportPaths::under(dir.path());

        let results = initialize_report_directories(&FsSink, &paths);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_ok()));
        assert!(paths.logs_dir.is_dir());
        assert!(paths.screenshots_dir.is_dir());
    }
}
