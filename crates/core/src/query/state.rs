//! Caller-owned query controls.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::QueryError, models::GameRecord};

/// Key used by every selector for "no restriction".
pub const ALL_KEY: &str = "all";

/// Current combination of search text, filters and ordering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryState {
    /// Free-form search text, matched against normalized keywords.
    pub text: String,
    /// Platform restriction.
    pub hardware: HardwareFilter,
    /// Cleared/uncleared restriction.
    pub completion: CompletionFilter,
    /// Result ordering.
    pub sort: SortKey,
}

impl QueryState {
    /// Whether any control differs from its default, ignoring the sort key.
    pub fn has_filters(&self) -> bool {
        !self.text.trim().is_empty()
            || self.hardware != HardwareFilter::All
            || self.completion != CompletionFilter::All
    }

    /// Reset text and filters, keeping the chosen sort key.
    pub fn clear_filters(&mut self) {
        self.text.clear();
        self.hardware = HardwareFilter::All;
        self.completion = CompletionFilter::All;
    }
}

/// Platform restriction: everything, or one exact hardware value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HardwareFilter {
    /// Every platform.
    #[default]
    All,
    /// Only records whose hardware equals this value.
    Only(String),
}

impl HardwareFilter {
    /// Parse a selector key; `"all"` is the sentinel, anything else is a platform.
    pub fn from_key(key: &str) -> Self {
        if key == ALL_KEY {
            Self::All
        } else {
            Self::Only(key.to_string())
        }
    }

    /// Selector key for this filter.
    pub fn as_key(&self) -> &str {
        match self {
            Self::All => ALL_KEY,
            Self::Only(hardware) => hardware,
        }
    }

    /// Whether `record` passes the filter.
    pub fn matches(&self, record: &GameRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(hardware) => record.hardware == *hardware,
        }
    }

    /// Step through `All` followed by `options`, wrapping at both ends.
    ///
    /// A filter naming a value missing from `options` restarts at `All`.
    pub fn cycle(&self, options: &[String], forward: bool) -> Self {
        let slots = options.len() + 1;
        let current = match self {
            Self::All => 0,
            Self::Only(hardware) => match options.iter().position(|opt| opt == hardware) {
                Some(idx) => idx + 1,
                None => return Self::All,
            },
        };
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        match next {
            0 => Self::All,
            idx => Self::Only(options[idx - 1].clone()),
        }
    }
}

impl From<String> for HardwareFilter {
    fn from(key: String) -> Self {
        Self::from_key(&key)
    }
}

impl From<HardwareFilter> for String {
    fn from(filter: HardwareFilter) -> Self {
        filter.as_key().to_string()
    }
}

impl fmt::Display for HardwareFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Tri-state completion filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionFilter {
    /// Cleared and uncleared games.
    #[default]
    All,
    /// Only cleared games.
    Done,
    /// Only uncleared games.
    Todo,
}

impl CompletionFilter {
    /// Every variant in selector order.
    pub const VARIANTS: [CompletionFilter; 3] = [Self::All, Self::Done, Self::Todo];

    /// Lenient parse: unknown keys fall back to [`CompletionFilter::All`].
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or_else(|err| {
            warn!("{err}; showing all records");
            Self::All
        })
    }

    /// Selector key (`all`, `done`, `todo`).
    pub fn as_key(self) -> &'static str {
        match self {
            Self::All => ALL_KEY,
            Self::Done => "done",
            Self::Todo => "todo",
        }
    }

    /// Whether `record` passes the filter.
    pub fn matches(self, record: &GameRecord) -> bool {
        match self {
            Self::All => true,
            Self::Done => record.completed,
            Self::Todo => !record.completed,
        }
    }

    /// Next variant, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            Self::All => Self::Done,
            Self::Done => Self::Todo,
            Self::Todo => Self::All,
        }
    }
}

impl FromStr for CompletionFilter {
    type Err = QueryError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|filter| filter.as_key() == key)
            .ok_or_else(|| QueryError::UnknownKey {
                kind: "completion",
                key: key.to_string(),
            })
    }
}

impl fmt::Display for CompletionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SortKey {
    /// Oldest release first.
    #[default]
    ReleaseDateAsc,
    /// Newest release first.
    ReleaseDateDesc,
    /// Title A to Z.
    TitleAsc,
    /// Title Z to A.
    TitleDesc,
    /// Shortest playtime first.
    PlaytimeAsc,
    /// Longest playtime first.
    PlaytimeDesc,
    /// Leave records in store order.
    StoreOrder,
}

impl SortKey {
    /// Selectable keys in menu order. [`SortKey::StoreOrder`] is not offered.
    pub const SELECTABLE: [SortKey; 6] = [
        Self::ReleaseDateDesc,
        Self::ReleaseDateAsc,
        Self::PlaytimeDesc,
        Self::PlaytimeAsc,
        Self::TitleAsc,
        Self::TitleDesc,
    ];

    /// Lenient parse: unknown keys leave results in store order.
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or_else(|err| {
            warn!("{err}; keeping store order");
            Self::StoreOrder
        })
    }

    /// Selector key, e.g. `releaseDate_asc`.
    pub fn as_key(self) -> &'static str {
        match self {
            Self::ReleaseDateAsc => "releaseDate_asc",
            Self::ReleaseDateDesc => "releaseDate_desc",
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
            Self::PlaytimeAsc => "playtime_asc",
            Self::PlaytimeDesc => "playtime_desc",
            Self::StoreOrder => "store",
        }
    }

    /// Short human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ReleaseDateAsc => "Release (oldest)",
            Self::ReleaseDateDesc => "Release (newest)",
            Self::TitleAsc => "Title A-Z",
            Self::TitleDesc => "Title Z-A",
            Self::PlaytimeAsc => "Playtime (least)",
            Self::PlaytimeDesc => "Playtime (most)",
            Self::StoreOrder => "Unsorted",
        }
    }

    /// Step through [`SortKey::SELECTABLE`], wrapping at both ends.
    pub fn cycle(self, forward: bool) -> Self {
        let len = Self::SELECTABLE.len();
        let next = match Self::SELECTABLE.iter().position(|key| *key == self) {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None => 0,
        };
        Self::SELECTABLE[next]
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::SELECTABLE
            .into_iter()
            .chain([Self::StoreOrder])
            .find(|sort| sort.as_key() == key)
            .ok_or_else(|| QueryError::UnknownKey {
                kind: "sort",
                key: key.to_string(),
            })
    }
}

impl From<String> for SortKey {
    fn from(key: String) -> Self {
        Self::from_key(&key)
    }
}

impl From<SortKey> for String {
    fn from(sort: SortKey) -> Self {
        sort.as_key().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}
