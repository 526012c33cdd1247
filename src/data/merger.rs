// ============================================================
// Layer 4 — Log Merger
// ============================================================
// Concatenates every per-run log file in a directory into one
// merged log file. The merge runs exactly once per dataset
// location: if the merged file already exists it is left alone —
// there is no freshness check, so delete the file to force a
// re-merge after new runs are recorded.
//
// Rules:
//   - only direct children of the log directory are considered
//   - dot-prefixed names (".DS_Store", ".hidden") are excluded
//   - files are concatenated in lexicographic filename order, so
//     the merged line order is reproducible across platforms
//   - source files are never modified or deleted
//
// A crash mid-merge leaves a truncated merged file behind; there is
// no recovery marker. Deleting the file and re-running repairs it.
//
// Reference: Rust Book §12 (I/O and File Handling)

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::domain::error::DatasetError;

/// Name of the merged log artifact inside the work directory.
pub const MERGED_LOG_FILE_NAME: &str = "merged_log_file.txt";

/// Concatenate all non-hidden files of `log_dir` into `output_path`.
/// Returns without touching anything if `output_path` already exists.
pub fn merge_logs(log_dir: &Path, output_path: &Path) -> Result<(), DatasetError> {
    if !log_dir.is_dir() {
        return Err(DatasetError::PathNotFound(log_dir.to_path_buf()));
    }

    // The merger creates one file, never directories, so the parent of
    // the output must already exist. An empty parent means the output
    // is relative to the current directory.
    match output_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() || parent.is_dir() => {}
        Some(parent) => return Err(DatasetError::PathNotFound(parent.to_path_buf())),
        None => return Err(DatasetError::PathNotFound(output_path.to_path_buf())),
    }

    if output_path.exists() {
        tracing::info!(
            "Merged log '{}' already exists, skipping merge",
            output_path.display()
        );
        return Ok(());
    }

    let mut sources: Vec<_> = fs::read_dir(log_dir)
        .map_err(|e| DatasetError::io(log_dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && !is_hidden(path))
        .collect();

    // Directory iteration order is platform-dependent; sorting by name
    // makes two merges of the same directory agree.
    sources.sort();

    let mut merged = File::create(output_path).map_err(|e| DatasetError::io(output_path, e))?;
    for source in &sources {
        let mut log_file = File::open(source).map_err(|e| DatasetError::io(source, e))?;
        io::copy(&mut log_file, &mut merged).map_err(|e| DatasetError::io(source, e))?;
    }

    tracing::info!(
        "Merged {} log files into '{}'",
        sources.len(),
        output_path.display()
    );
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_merges_all_visible_files_and_skips_hidden() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logging_data");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("log_0.txt"), "a 1\nb 2\n").unwrap();
        fs::write(logs.join(".hidden"), "x 9\n").unwrap();
        fs::write(logs.join("log_1.txt"), "c 3\nd 4\ne 5\n").unwrap();

        let merged = dir.path().join(MERGED_LOG_FILE_NAME);
        merge_logs(&logs, &merged).unwrap();

        let content = fs::read_to_string(&merged).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(!content.contains("x 9"));
    }

    #[test]
    fn test_files_are_concatenated_in_name_order() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        // Written in reverse order on purpose
        fs::write(logs.join("b.txt"), "second\n").unwrap();
        fs::write(logs.join("a.txt"), "first\n").unwrap();

        let merged = dir.path().join("merged.txt");
        merge_logs(&logs, &merged).unwrap();

        assert_eq!(fs::read_to_string(&merged).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_existing_output_short_circuits_the_merge() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("log_0.txt"), "fresh line\n").unwrap();

        let merged = dir.path().join("merged.txt");
        fs::write(&merged, "already merged\n").unwrap();

        merge_logs(&logs, &merged).unwrap();
        assert_eq!(fs::read_to_string(&merged).unwrap(), "already merged\n");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(logs.join("log_0.txt"), "a 1\nb 2\n").unwrap();

        let merged = dir.path().join("merged.txt");
        merge_logs(&logs, &merged).unwrap();
        let first = fs::read_to_string(&merged).unwrap();

        merge_logs(&logs, &merged).unwrap();
        assert_eq!(fs::read_to_string(&merged).unwrap(), first);
    }

    #[test]
    fn test_missing_log_dir_fails() {
        let dir = tempdir().unwrap();
        let err = merge_logs(&dir.path().join("nope"), &dir.path().join("merged.txt")).unwrap_err();
        assert!(matches!(err, DatasetError::PathNotFound(_)));
    }

    #[test]
    fn test_missing_output_parent_fails() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();

        let err = merge_logs(&logs, &dir.path().join("missing/merged.txt")).unwrap_err();
        assert!(matches!(err, DatasetError::PathNotFound(_)));
    }

    #[test]
    fn test_subdirectories_are_not_merged() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir_all(logs.join("nested")).unwrap();
        fs::write(logs.join("nested").join("inner.txt"), "nested line\n").unwrap();
        fs::write(logs.join("log_0.txt"), "top line\n").unwrap();

        let merged = dir.path().join("merged.txt");
        merge_logs(&logs, &merged).unwrap();

        assert_eq!(fs::read_to_string(&merged).unwrap(), "top line\n");
    }
}
