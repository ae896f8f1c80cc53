//! In-process mirror target.
//!
//! Behaves like a one-sheet spreadsheet: a header row plus data rows keyed by
//! column A. Used when no spreadsheet is configured, and by tests, which can
//! inject failures with [`MemoryMirror::fail_next`].

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::MirrorClient;
use crate::error::SyncError;
use crate::row::header_row;

#[derive(Debug, Default)]
struct Sheet {
    header: Option<Vec<String>>,
    rows: Vec<(String, Vec<String>)>,
    init_calls: usize,
    failures_remaining: usize,
}

#[derive(Debug, Default)]
pub struct MemoryMirror {
    sheet: Mutex<Sheet>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    fn sheet(&self) -> MutexGuard<'_, Sheet> {
        self.sheet.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make the next `count` calls (of any kind) fail.
    pub fn fail_next(&self, count: usize) {
        self.sheet().failures_remaining = count;
    }

    /// Number of times `ensure_initialized` was called.
    pub fn init_calls(&self) -> usize {
        self.sheet().init_calls
    }

    pub fn header(&self) -> Option<Vec<String>> {
        self.sheet().header.clone()
    }

    /// Row keys in sheet order.
    pub fn ids(&self) -> Vec<String> {
        self.sheet().rows.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn row(&self, id: &str) -> Option<Vec<String>> {
        self.sheet()
            .rows
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, row)| row.clone())
    }

    fn take_failure(sheet: &mut Sheet) -> Result<(), SyncError> {
        if sheet.failures_remaining > 0 {
            sheet.failures_remaining -= 1;
            return Err(SyncError::Unavailable("injected failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MirrorClient for MemoryMirror {
    async fn ensure_initialized(&self) -> Result<(), SyncError> {
        let mut sheet = self.sheet();
        sheet.init_calls += 1;
        Self::take_failure(&mut sheet)?;
        if sheet.header.is_none() {
            sheet.header = Some(header_row());
        }
        Ok(())
    }

    async fn upsert_row(&self, id: &str, row: &[String]) -> Result<(), SyncError> {
        let mut sheet = self.sheet();
        Self::take_failure(&mut sheet)?;
        match sheet.rows.iter().position(|(key, _)| key == id) {
            Some(index) => sheet.rows[index].1 = row.to_vec(),
            None => sheet.rows.push((id.to_string(), row.to_vec())),
        }
        Ok(())
    }

    async fn delete_row(&self, id: &str) -> Result<(), SyncError> {
        let mut sheet = self.sheet();
        Self::take_failure(&mut sheet)?;
        sheet.rows.retain(|(key, _)| key != id);
        Ok(())
    }
}
