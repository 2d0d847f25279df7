//! Dispatch ledger: the date of the last successful daily dispatch.
//!
//! Stored as a single `YYYY-MM-DD` line in a plain text file. A missing or
//! blank file means "never sent". This record alone decides whether today's
//! dispatch has already happened, so it is written only after delivery
//! succeeds and always through an atomic replace.

use crate::error::{HeraldError, Result};
use crate::io;
use crate::paths;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct DispatchLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DispatchLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Ledger at the default `last_sent.txt` location inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(paths::ledger_path(data_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_completed_date(&self) -> Result<Option<NaiveDate>> {
        let Some(data) = io::read_optional(&self.path)? else {
            return Ok(None);
        };
        let trimmed = data.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(Some)
            .map_err(|e| HeraldError::CorruptState {
                path: self.path.clone(),
                reason: format!("'{trimmed}' is not a YYYY-MM-DD date: {e}"),
            })
    }

    pub fn was_completed_on(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.last_completed_date()? == Some(date))
    }

    pub fn mark_completed(&self, date: NaiveDate) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| HeraldError::LockPoisoned("ledger"))?;
        let line = date.format(DATE_FORMAT).to_string();
        io::atomic_write(&self.path, line.as_bytes())?;
        tracing::debug!(date = %line, "dispatch ledger updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_ledger_has_no_date() {
        let dir = TempDir::new().unwrap();
        let ledger = DispatchLedger::in_dir(dir.path());
        assert_eq!(ledger.last_completed_date().unwrap(), None);
        assert!(!ledger.was_completed_on(date(2026, 10, 16)).unwrap());
    }

    #[test]
    fn mark_then_check() {
        let dir = TempDir::new().unwrap();
        let ledger = DispatchLedger::in_dir(&dir.path().join("bot_data"));
        let today = date(2026, 10, 16);
        ledger.mark_completed(today).unwrap();

        assert!(ledger.was_completed_on(today).unwrap());
        assert!(!ledger.was_completed_on(date(2026, 10, 17)).unwrap());
        assert!(!ledger.was_completed_on(date(2026, 10, 15)).unwrap());
        assert_eq!(
            std::fs::read_to_string(ledger.path()).unwrap(),
            "2026-10-16"
        );
    }

    #[test]
    fn later_mark_replaces_earlier() {
        let dir = TempDir::new().unwrap();
        let ledger = DispatchLedger::in_dir(dir.path());
        ledger.mark_completed(date(2026, 10, 16)).unwrap();
        ledger.mark_completed(date(2026, 10, 17)).unwrap();
        assert_eq!(ledger.last_completed_date().unwrap(), Some(date(2026, 10, 17)));
        assert!(!ledger.was_completed_on(date(2026, 10, 16)).unwrap());
    }

    #[test]
    fn tolerates_trailing_newline_and_blank_file() {
        let dir = TempDir::new().unwrap();
        let ledger = DispatchLedger::in_dir(dir.path());
        std::fs::write(ledger.path(), "2026-01-02\n").unwrap();
        assert_eq!(ledger.last_completed_date().unwrap(), Some(date(2026, 1, 2)));

        std::fs::write(ledger.path(), "  \n").unwrap();
        assert_eq!(ledger.last_completed_date().unwrap(), None);
    }

    #[test]
    fn garbage_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let ledger = DispatchLedger::in_dir(dir.path());
        std::fs::write(ledger.path(), "yesterday").unwrap();
        let err = ledger.last_completed_date().unwrap_err();
        assert!(err.is_storage(), "got: {err}");
    }

    #[test]
    fn interrupted_write_leaves_prior_date() {
        let dir = TempDir::new().unwrap();
        let ledger = DispatchLedger::in_dir(dir.path());
        ledger.mark_completed(date(2026, 10, 15)).unwrap();

        let mut orphan = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        std::io::Write::write_all(&mut orphan, b"2026-10-").unwrap();
        let _ = orphan.keep().unwrap();

        assert_eq!(
            DispatchLedger::in_dir(dir.path()).last_completed_date().unwrap(),
            Some(date(2026, 10, 15))
        );
    }
}
