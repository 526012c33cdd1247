// ============================================================
// Layer 4 — Line-Indexed Log Accessor
// ============================================================
// Random access into the merged log by record number. The merged
// log is immutable once written, so a byte-offset table built at
// construction turns every later access into a single seek plus one
// line read instead of a scan from byte 0.
//
// The index holds no open file handle: each record_at call opens,
// seeks, reads and closes, so a dataset shared across data-loader
// workers needs no locking and no shared state beyond the path and
// the offset table.
//
// The offsets describe the file as it was when the index was built;
// editing the merged log underneath a live index is not supported.
//
// Reference: Rust Book §12 (I/O), std::io::Seek

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::domain::error::DatasetError;
use crate::domain::record::LogRecord;
use crate::domain::traits::RecordSource;

/// Byte-offset index over the lines of a merged log file.
#[derive(Debug)]
pub struct LogIndex {
    path: PathBuf,
    offsets: Vec<u64>,
}

impl LogIndex {
    /// Scan the merged log once, recording the byte offset of every line.
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        if !path.is_file() {
            return Err(DatasetError::PathNotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut offsets = Vec::new();
        let mut position = 0u64;
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| DatasetError::io(path, e))?;
            if read == 0 {
                break;
            }
            offsets.push(position);
            position += read as u64;
        }

        tracing::debug!("Indexed {} records in '{}'", offsets.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            offsets,
        })
    }

    /// Number of records in the merged log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if the merged log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Read and parse the record at `index` (0-based line number).
    pub fn record_at(&self, index: usize) -> Result<LogRecord, DatasetError> {
        let offset = *self
            .offsets
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.offsets.len(),
            })?;

        let mut file = File::open(&self.path).map_err(|e| DatasetError::io(&self.path, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| DatasetError::io(&self.path, e))?;

        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .map_err(|e| DatasetError::io(&self.path, e))?;

        LogRecord::parse(line.trim_end(), index)
    }

    /// Path of the indexed merged log.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for LogIndex {
    fn len(&self) -> usize {
        self.offsets.len()
    }

    fn record_at(&self, index: usize) -> Result<LogRecord, DatasetError> {
        LogIndex::record_at(self, index)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_log(lines: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged_log_file.txt");
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_length_matches_line_count() {
        let (_dir, path) = write_log(&[
            "t0 f0 l0 r0 451",
            "t1 f1 l1 r1 512",
            "t2 f2 l2 r2 573",
            "t3 f3 l3 r3 500",
            "t4 f4 l4 r4 470",
        ]);
        let index = LogIndex::open(&path).unwrap();
        assert_eq!(index.len(), 5);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_record_at_returns_the_matching_line() {
        let (_dir, path) = write_log(&[
            "t0 f0 l0 r0 451",
            "t1 front_1 left_1 right_1 512",
            "t2 f2 l2 r2 573",
        ]);
        let index = LogIndex::open(&path).unwrap();

        let record = index.record_at(1).unwrap();
        assert_eq!(record.timestamp, "t1");
        assert_eq!(record.front_ref, "front_1");
        assert_eq!(record.steering_raw, 512);
    }

    #[test]
    fn test_offsets_survive_uneven_line_lengths() {
        let (_dir, path) = write_log(&[
            "t0 a/very/long/front/reference left right 451 trailing junk",
            "t1 f l r 512",
            "t2 front left right 573",
        ]);
        let index = LogIndex::open(&path).unwrap();
        assert_eq!(index.record_at(0).unwrap().steering_raw, 451);
        assert_eq!(index.record_at(2).unwrap().steering_raw, 573);
    }

    #[test]
    fn test_index_past_the_end_fails() {
        let (_dir, path) = write_log(&["t0 f l r 451"]);
        let index = LogIndex::open(&path).unwrap();

        let err = index.record_at(1).unwrap_err();
        match err {
            DatasetError::IndexOutOfRange { index, len } => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_merged_log_fails() {
        let dir = tempdir().unwrap();
        let err = LogIndex::open(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, DatasetError::PathNotFound(_)));
    }

    #[test]
    fn test_malformed_line_surfaces_its_line_number() {
        let (_dir, path) = write_log(&["t0 f l r 451", "garbage"]);
        let index = LogIndex::open(&path).unwrap();

        let err = index.record_at(1).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_empty_log_has_no_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("merged_log_file.txt");
        fs::write(&path, "").unwrap();

        let index = LogIndex::open(&path).unwrap();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }
}
