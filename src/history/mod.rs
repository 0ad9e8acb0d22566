//! Bounded, newest-first history of committed predictions.
//!
//! The in-memory log is authoritative for the running process. It is
//! rewritten to a JSON file after every mutation, best-effort: read failures
//! yield an empty log and write failures are logged and dropped.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod models;
pub use models::*;

/// Default number of predictions kept.
pub const HISTORY_CAPACITY: usize = 8;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A history index that no longer refers to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("history entry {index} not found ({len} entries)")]
pub struct HistoryIndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

/// Ordered log of predictions, index 0 being the most recent
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLog {
    records: VecDeque<PredictionRecord>,
    capacity: usize,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        HistoryLog {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Build a log from newest-first records, dropping any beyond capacity.
    pub fn from_records(records: Vec<PredictionRecord>, capacity: usize) -> Self {
        let mut log = HistoryLog::new(capacity);
        log.records.extend(records.into_iter().take(log.capacity));
        log
    }

    /// Insert at the front, evicting the oldest entries past capacity.
    pub fn push_front(&mut self, record: PredictionRecord) {
        self.records.push_front(record);
        while self.records.len() > self.capacity {
            self.records.pop_back();
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, index: usize) -> Result<&PredictionRecord, HistoryIndexOutOfRange> {
        self.records.get(index).ok_or(HistoryIndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.records.iter()
    }

    pub fn to_vec(&self) -> Vec<PredictionRecord> {
        self.records.iter().cloned().collect()
    }
}

/// Read a history file. Never fails: problems are reported in the outcome
/// alongside an empty log.
pub fn read_log(path: &Path, capacity: usize) -> (HistoryLog, LoadOutcome) {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return (HistoryLog::new(capacity), LoadOutcome::Absent);
        }
        Err(e) => {
            return (
                HistoryLog::new(capacity),
                LoadOutcome::Corrupt(e.to_string()),
            );
        }
    };

    match serde_json::from_str::<Vec<PredictionRecord>>(&text) {
        Ok(records) => {
            let log = HistoryLog::from_records(records, capacity);
            let kept = log.len();
            (log, LoadOutcome::Loaded(kept))
        }
        Err(e) => (
            HistoryLog::new(capacity),
            LoadOutcome::Corrupt(e.to_string()),
        ),
    }
}

/// File-backed history store
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    log: HistoryLog,
    last_load: LoadOutcome,
}

impl HistoryStore {
    /// Open the store at `path`, loading whatever history is already there.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let (log, last_load) = read_log(&path, capacity);
        log_outcome(&path, &last_load);
        HistoryStore {
            path,
            log,
            last_load,
        }
    }

    /// Re-read the backing file, replacing the in-memory log.
    pub fn load(&mut self) -> &HistoryLog {
        let (log, outcome) = read_log(&self.path, self.log.capacity());
        log_outcome(&self.path, &outcome);
        self.log = log;
        self.last_load = outcome;
        &self.log
    }

    /// Record a new prediction as the most recent entry.
    pub fn append(&mut self, record: PredictionRecord) {
        debug!(
            "History append: {} v {} → {}",
            record.batting_team, record.bowling_team, record.predicted_score
        );
        self.log.push_front(record);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.persist();
    }

    pub fn get(&self, index: usize) -> Result<&PredictionRecord, HistoryIndexOutOfRange> {
        self.log.get(index)
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn last_load(&self) -> &LoadOutcome {
        &self.last_load
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full log to disk via a sibling temp file and rename.
    pub fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&self.log.to_vec())?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(
                "Failed to persist history to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn log_outcome(path: &Path, outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded(n) => info!("Loaded {} history entries from {}", n, path.display()),
        LoadOutcome::Absent => info!("No history file at {}, starting empty", path.display()),
        LoadOutcome::Corrupt(reason) => warn!(
            "History file {} unreadable, starting empty: {}",
            path.display(),
            reason
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cricket::{City, Team};
    use tempfile::tempdir;

    fn record(predicted_score: i32) -> PredictionRecord {
        PredictionRecord {
            batting_team: Team::India,
            bowling_team: Team::Pakistan,
            city: City::Dubai,
            current_score: 60 + predicted_score as u32 % 40,
            overs: 8.3,
            wickets: 2,
            last_five: 38,
            predicted_score,
            timestamp: "19:45".into(),
        }
    }

    #[test]
    fn test_log_evicts_oldest_past_capacity() {
        let mut log = HistoryLog::new(8);
        for i in 0..12 {
            log.push_front(record(150 + i));
        }
        assert_eq!(log.len(), 8);
        let scores: Vec<i32> = log.iter().map(|r| r.predicted_score).collect();
        assert_eq!(scores, vec![161, 160, 159, 158, 157, 156, 155, 154]);
    }

    #[test]
    fn test_get_out_of_range_is_not_found() {
        let mut log = HistoryLog::new(8);
        log.push_front(record(170));
        assert_eq!(log.get(0).unwrap().predicted_score, 170);
        assert_eq!(log.get(1), Err(HistoryIndexOutOfRange { index: 1, len: 1 }));
    }

    #[test]
    fn test_open_missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json"), HISTORY_CAPACITY);
        assert!(store.log().is_empty());
        assert_eq!(store.last_load(), &LoadOutcome::Absent);
    }

    #[test]
    fn test_open_malformed_file_is_corrupt_and_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();
        let store = HistoryStore::open(&path, HISTORY_CAPACITY);
        assert!(store.log().is_empty());
        assert!(matches!(store.last_load(), LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path, HISTORY_CAPACITY);
        for i in 0..5 {
            store.append(record(140 + i));
        }
        let saved = store.log().clone();

        let reopened = HistoryStore::open(&path, HISTORY_CAPACITY);
        assert_eq!(reopened.log(), &saved);
        assert_eq!(reopened.last_load(), &LoadOutcome::Loaded(5));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_clear_then_load_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::open(&path, HISTORY_CAPACITY);
        store.append(record(180));
        store.append(record(181));
        store.clear();

        let log = store.load();
        assert!(log.is_empty());
        assert_eq!(store.last_load(), &LoadOutcome::Loaded(0));
    }

    #[test]
    fn test_reads_files_written_by_earlier_versions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(
            &path,
            r#"[{"batting_team": "New Zealand", "bowling_team": "Sri Lanka", "city": "Mount Maunganui",
                 "current_score": 50, "overs": 8.0, "wickets": 2, "last_five": 35,
                 "predicted_score": 171, "timestamp": "14:05"}]"#,
        )
        .unwrap();
        let store = HistoryStore::open(&path, HISTORY_CAPACITY);
        let entry = store.get(0).unwrap();
        assert_eq!(entry.batting_team, Team::NewZealand);
        assert_eq!(entry.city, City::MountMaunganui);
        assert_eq!(entry.predicted_score, 171);
    }

    #[test]
    fn test_oversized_file_is_truncated_to_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        let records: Vec<PredictionRecord> = (0..10).map(|i| record(200 - i)).collect();
        fs::write(&path, serde_json::to_string(&records).unwrap()).unwrap();

        let store = HistoryStore::open(&path, 4);
        assert_eq!(store.log().len(), 4);
        assert_eq!(store.get(0).unwrap().predicted_score, 200);
        assert_eq!(store.get(3).unwrap().predicted_score, 197);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let path = blocker.join("history.json");

        let mut store = HistoryStore::open(&path, HISTORY_CAPACITY);
        assert!(matches!(store.last_load(), LoadOutcome::Corrupt(_)));
        store.append(record(165));
        assert_eq!(store.log().len(), 1);
        assert!(store.save().is_err());
        store.clear();
        assert!(store.log().is_empty());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        // A non-empty directory at the target path makes the rename fail
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();

        let mut store = HistoryStore::open(&path, HISTORY_CAPACITY);
        store.append(record(150));
        assert!(store.save().is_err());
        assert!(!temp_path(&path).exists());
        assert!(path.join("keep").exists());
        assert_eq!(store.log().len(), 1);
    }
}
