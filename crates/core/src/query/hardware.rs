//! Platform display ordering.

use std::cmp::Ordering;

use crate::store::RecordStore;

/// Platform codes in the order the selector lists them.
pub const DEFAULT_HARDWARE_PRIORITY: &[&str] = &[
    "SFC", "GB", "GBA", "GC", "DS", "3DS", "PS", "PS2", "PS3", "PS4", "PS5", "PSP", "Switch",
    "PC", "Steam", "Mobile",
];

/// Ranks hardware values for display.
///
/// Known platforms come first in list order; anything else follows,
/// sorted lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwarePriority {
    order: Vec<String>,
}

impl Default for HardwarePriority {
    fn default() -> Self {
        Self::new(DEFAULT_HARDWARE_PRIORITY.iter().copied())
    }
}

impl HardwarePriority {
    /// Build a priority list. Later duplicates are ignored.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into();
            if !order.contains(&code) {
                order.push(code);
            }
        }
        Self { order }
    }

    /// Known platform codes in priority order.
    pub fn codes(&self) -> &[String] {
        &self.order
    }

    /// Position of `hardware` in the list, if known.
    pub fn rank(&self, hardware: &str) -> Option<usize> {
        self.order.iter().position(|code| code == hardware)
    }

    /// Total order used by [`HardwarePriority::sort`].
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.rank(a), self.rank(b)) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }

    /// Distinct, non-empty hardware values present in `store`, in display order.
    pub fn sort(&self, store: &RecordStore) -> Vec<String> {
        let mut values = store.hardware_values();
        values.sort_by(|a, b| self.compare(a, b));
        values.into_iter().map(str::to_string).collect()
    }
}

/// Hardware values present in `store`, ordered by the built-in priority list.
pub fn list_hardware(store: &RecordStore) -> Vec<String> {
    HardwarePriority::default().sort(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn store_with(hardware: &[&str]) -> RecordStore {
        let records = hardware
            .iter()
            .enumerate()
            .map(|(idx, hw)| record(hw, &format!("Game {idx}"), "kw"))
            .collect();
        RecordStore::new(records).expect("valid records")
    }

    #[test]
    fn known_platforms_first_then_unknown_alphabetically() {
        let store = store_with(&["Switch", "SFC", "Vectrex", "PS5"]);
        assert_eq!(list_hardware(&store), vec!["SFC", "PS5", "Switch", "Vectrex"]);
    }

    #[test]
    fn duplicates_collapse_and_unknowns_sort_among_themselves() {
        let store = store_with(&["Saturn", "GB", "Amiga", "GB", "PC", "Saturn"]);
        assert_eq!(list_hardware(&store), vec!["GB", "PC", "Amiga", "Saturn"]);
    }

    #[test]
    fn custom_priority_overrides_default() {
        let store = store_with(&["PS5", "Switch", "SFC"]);
        let priority = HardwarePriority::new(["Switch", "PS5", "Switch"]);
        assert_eq!(priority.codes().len(), 2);
        assert_eq!(priority.sort(&store), vec!["Switch", "PS5", "SFC"]);
    }

    #[test]
    fn ordering_is_stable_across_calls() {
        let store = store_with(&["Mobile", "3DS", "Steam", "Dreamcast", "DS"]);
        let first = list_hardware(&store);
        assert_eq!(first, list_hardware(&store));
        assert_eq!(first, vec!["DS", "3DS", "Steam", "Mobile", "Dreamcast"]);
    }

    #[test]
    fn empty_store_lists_nothing() {
        assert!(list_hardware(&RecordStore::empty()).is_empty());
    }
}
