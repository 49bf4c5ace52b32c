//! Shared domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged game-play entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Platform code (e.g. `SFC`, `PS4`).
    pub hardware: String,
    /// Display title.
    pub title: String,
    /// Search key, may carry readings that are not part of the title.
    pub keyword: String,
    /// Whether the game was finished.
    pub completed: bool,
    /// Notable accomplishment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievement: Option<String>,
    /// Hours played.
    pub playtime: f64,
    /// Link to a stream archive. An empty string means no link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
    /// Short free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Release date as epoch milliseconds.
    pub release_date: i64,
}

impl GameRecord {
    /// Archive link, treating an empty value the same as a missing one.
    pub fn archive_url(&self) -> Option<&str> {
        non_blank(self.archive_url.as_deref())
    }

    /// Achievement text, if present and not blank.
    pub fn achievement(&self) -> Option<&str> {
        non_blank(self.achievement.as_deref())
    }

    /// Notes text, if present and not blank.
    pub fn notes(&self) -> Option<&str> {
        non_blank(self.notes.as_deref())
    }

    /// Release date as a UTC timestamp, `None` if out of chrono's range.
    pub fn released_on(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.release_date)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}


#[cfg(test)]
mod tests {
    use super::fixtures::record;

    #[test]
    fn empty_archive_url_reads_as_absent() {
        let mut game = record("SFC", "Sample", "さんぷる");
        game.archive_url = Some(String::new());
        assert_eq!(game.archive_url(), None);

        game.archive_url = Some("https://example.com/live/1".to_string());
        assert_eq!(game.archive_url(), Some("https://example.com/live/1"));
    }

    #[test]
    fn release_date_converts_to_utc() {
        let mut game = record("SFC", "Sample", "さんぷる");
        game.release_date = 764_035_200_000;
        let released = game.released_on().expect("timestamp in range");
        assert_eq!(released.format("%Y-%m-%d").to_string(), "1994-03-19");
    }
}
