//! Static dataset loading.

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::info;

use crate::{models::GameRecord, store::RecordStore};

/// Release date as written in the dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawReleaseDate {
    Millis(i64),
    Text(String),
}

/// One entry of the bundled `games.json`.
#[derive(Debug, Clone, Deserialize)]
struct RawGameEntry {
    hardware: String,
    title: String,
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    achievement: Option<String>,
    #[serde(default)]
    playtime: f64,
    #[serde(default)]
    archive_url: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    release_date: RawReleaseDate,
}

/// Reads a JSON dataset into a [`RecordStore`].
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load and validate the dataset at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<RecordStore> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        let store = Self::from_json(&contents)
            .with_context(|| format!("failed to load dataset {}", path.display()))?;
        info!(records = store.len(), path = %path.display(), "Dataset loaded");
        Ok(store)
    }

    /// Parse and validate an in-memory JSON dataset.
    pub fn from_json(contents: &str) -> Result<RecordStore> {
        let entries: Vec<RawGameEntry> =
            serde_json::from_str(contents).context("failed to parse dataset JSON")?;
        let records = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                build_record(entry).with_context(|| format!("invalid dataset entry #{index}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordStore::new(records)?)
    }
}

fn build_record(entry: RawGameEntry) -> Result<GameRecord> {
    let release_date = match &entry.release_date {
        RawReleaseDate::Millis(millis) => *millis,
        RawReleaseDate::Text(text) => parse_release_date(text)
            .ok_or_else(|| anyhow!("unrecognised release_date {text:?} for {}", entry.title))?,
    };
    let title = entry.title.trim().to_string();
    let keyword = trimmed(entry.keyword).unwrap_or_else(|| title.clone());

    Ok(GameRecord {
        hardware: entry.hardware.trim().to_string(),
        title,
        keyword,
        completed: entry.completed,
        achievement: trimmed(entry.achievement),
        playtime: entry.playtime,
        archive_url: trimmed(entry.archive_url),
        notes: trimmed(entry.notes),
        release_date,
    })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Convert a human-readable date to epoch milliseconds (UTC midnight).
///
/// Accepts RFC 3339 timestamps and `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY-MM`
/// or bare `YYYY` dates.
pub fn parse_release_date(input: &str) -> Option<i64> {
    let input = input.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.timestamp_millis());
    }

    let date = ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .or_else(|| partial_date(input))?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

fn partial_date(input: &str) -> Option<NaiveDate> {
    let mut parts = input.splitn(2, ['-', '/']);
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(month) => month.parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}
