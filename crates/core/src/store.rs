//! Immutable, in-memory record store.

use std::collections::HashSet;

use tracing::debug;

use crate::{error::StoreError, models::GameRecord};

/// Read-only snapshot of every record loaded for a session.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<GameRecord>,
}

impl RecordStore {
    /// Build a store, rejecting records that break the data-model invariants.
    pub fn new(records: Vec<GameRecord>) -> Result<Self, StoreError> {
        for (index, record) in records.iter().enumerate() {
            validate(index, record)?;
        }
        debug!(records = records.len(), "Record store built");
        Ok(Self { records })
    }

    /// A store with no records.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All records in load order.
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Iterate over records in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, GameRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-empty hardware values in order of first appearance.
    pub fn hardware_values(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.hardware.as_str())
            .filter(|hardware| !hardware.is_empty())
            .filter(|hardware| seen.insert(*hardware))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a GameRecord;
    type IntoIter = std::slice::Iter<'a, GameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn validate(index: usize, record: &GameRecord) -> Result<(), StoreError> {
    if record.hardware.trim().is_empty() {
        return Err(StoreError::invalid(index, &record.title, "hardware is empty"));
    }
    if record.title.trim().is_empty() {
        return Err(StoreError::invalid(index, &record.title, "title is empty"));
    }
    if record.keyword.trim().is_empty() {
        return Err(StoreError::invalid(index, &record.title, "keyword is empty"));
    }
    if !record.playtime.is_finite() || record.playtime < 0.0 {
        return Err(StoreError::invalid(
            index,
            &record.title,
            format!("playtime must be a non-negative number, got {}", record.playtime),
        ));
    }
    Ok(())
}
