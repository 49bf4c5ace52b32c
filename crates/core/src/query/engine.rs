//! Filtering, ordering and aggregation over a [`RecordStore`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    hardware::HardwarePriority,
    normalize::normalize_search_text,
    state::{QueryState, SortKey},
};
use crate::{models::GameRecord, store::RecordStore};

/// Optional record fields the search text is matched against.
///
/// The keyword is always searched. Every other field is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchScope {
    /// Also match the achievement text.
    pub include_achievement: bool,
    /// Also match the notes text.
    pub include_notes: bool,
    /// Also match the hardware code.
    pub include_hardware: bool,
}

impl SearchScope {
    /// Keyword-only matching.
    pub fn keyword_only() -> Self {
        Self::default()
    }

    fn matches(&self, record: &GameRecord, needle: &str) -> bool {
        let contains = |haystack: &str| normalize_search_text(haystack).contains(needle);
        contains(&record.keyword)
            || (self.include_achievement && record.achievement().is_some_and(contains))
            || (self.include_notes && record.notes().is_some_and(contains))
            || (self.include_hardware && contains(&record.hardware))
    }
}

/// Ordered, filtered records plus their aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView<'a> {
    /// Matching records in the requested order.
    pub records: Vec<&'a GameRecord>,
    /// Sum of `playtime` over `records`, in hours.
    pub total_playtime: f64,
    /// Number of matching records.
    pub count: usize,
}

impl<'a> QueryView<'a> {
    fn new(records: Vec<&'a GameRecord>) -> Self {
        let total_playtime = records
            .iter()
            .fold(0.0, |total, record| total + record.playtime);
        let count = records.len();
        Self {
            records,
            total_playtime,
            count,
        }
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over matching records in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a GameRecord> + '_ {
        self.records.iter().copied()
    }

    /// Aggregates without the records themselves.
    pub fn summary(&self) -> Summary {
        Summary {
            count: self.count,
            total_playtime: self.total_playtime,
        }
    }
}

/// Count and playtime total for a view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Matching records.
    pub count: usize,
    /// Hours across matching records.
    pub total_playtime: f64,
}

/// Stateless query engine carrying its display and search settings.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    priority: HardwarePriority,
    scope: SearchScope,
}

impl QueryEngine {
    /// Engine with explicit settings.
    pub fn new(priority: HardwarePriority, scope: SearchScope) -> Self {
        Self { priority, scope }
    }

    /// Platform ordering in use.
    pub fn priority(&self) -> &HardwarePriority {
        &self.priority
    }

    /// Searched fields in use.
    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Distinct hardware values present in `store`, in display order.
    pub fn list_hardware(&self, store: &RecordStore) -> Vec<String> {
        self.priority.sort(store)
    }

    /// Filter, order and aggregate `store` according to `state`.
    pub fn query_records<'a>(&self, store: &'a RecordStore, state: &QueryState) -> QueryView<'a> {
        let needle = normalize_search_text(state.text.trim());

        let mut records: Vec<&GameRecord> = store
            .iter()
            .filter(|record| state.hardware.matches(record))
            .filter(|record| state.completion.matches(record))
            .filter(|record| needle.is_empty() || self.scope.matches(record, &needle))
            .collect();

        sort_records(&mut records, state.sort);

        let view = QueryView::new(records);
        debug!(
            matched = view.count,
            total = store.len(),
            sort = %state.sort,
            "Query evaluated"
        );
        view
    }
}

/// Query `store` with the built-in hardware priority and keyword-only search.
pub fn query_records<'a>(store: &'a RecordStore, state: &QueryState) -> QueryView<'a> {
    QueryEngine::default().query_records(store, state)
}

fn sort_records(records: &mut [&GameRecord], sort: SortKey) {
    match sort {
        SortKey::ReleaseDateAsc => records.sort_by(|a, b| a.release_date.cmp(&b.release_date)),
        SortKey::ReleaseDateDesc => records.sort_by(|a, b| b.release_date.cmp(&a.release_date)),
        SortKey::TitleAsc => records.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::TitleDesc => records.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortKey::PlaytimeAsc => records.sort_by(|a, b| compare_playtime(a.playtime, b.playtime)),
        SortKey::PlaytimeDesc => records.sort_by(|a, b| compare_playtime(b.playtime, a.playtime)),
        SortKey::StoreOrder => {}
    }
}

/// Numeric order where `-0.0` and `0.0` tie. Store playtimes are finite.
fn compare_playtime(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Case- and kana-insensitive title order, falling back to code points.
fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    normalize_search_text(title).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::fixtures::record,
        query::state::{CompletionFilter, HardwareFilter},
    };

    fn game(
        hardware: &str,
        title: &str,
        keyword: &str,
        completed: bool,
        playtime: f64,
        release_date: i64,
    ) -> GameRecord {
        GameRecord {
            completed,
            playtime,
            release_date,
            ..record(hardware, title, keyword)
        }
    }

    fn library() -> RecordStore {
        RecordStore::new(vec![
            game("PS4", "Bloodborne", "ぶらっどぼーん", true, 80.0, 1_427_328_000_000),
            game("SFC", "Chrono Trigger", "クロノトリガー", true, 40.0, 794_620_800_000),
            game("Switch", "Astral Chain", "あすとらるちぇいん", false, 12.5, 1_567_123_200_000),
            game("SFC", "Kenka Bancho", "ケンカばんちょう", false, 40.0, 794_620_800_000),
            game("PS4", "Ape Escape", "さるげっちゅ", true, 0.0, 1_427_328_000_000),
        ])
        .expect("valid library")
    }

    fn titles(view: &QueryView<'_>) -> Vec<String> {
        view.iter().map(|record| record.title.clone()).collect()
    }

    fn state(text: &str, hardware: &str, completion: &str, sort: &str) -> QueryState {
        QueryState {
            text: text.to_string(),
            hardware: HardwareFilter::from_key(hardware),
            completion: CompletionFilter::from_key(completion),
            sort: SortKey::from_key(sort),
        }
    }

    #[test]
    fn end_to_end_done_by_playtime() {
        let store = RecordStore::new(vec![
            game("PS4", "Alpha", "あるふぁ", true, 20.0, 1000),
            game("Switch", "Beta", "べーた", false, 5.0, 2000),
        ])
        .expect("valid records");
        let view = query_records(&store, &state("", "all", "done", "playtime_desc"));
        assert_eq!(titles(&view), vec!["Alpha"]);
        assert_eq!(view.count, 1);
        assert_eq!(view.total_playtime, 20.0);
    }

    #[test]
    fn filter_keeps_exactly_records_passing_every_predicate() {
        let store = library();
        let states = [
            state("", "all", "all", "store"),
            state("", "SFC", "all", "store"),
            state("", "all", "todo", "store"),
            state("ちぇいん", "all", "all", "store"),
            state("ケン", "SFC", "todo", "store"),
            state("ぼーん", "SFC", "all", "store"),
            state("", "Vectrex", "all", "store"),
        ];
        for query in &states {
            let view = query_records(&store, query);
            let needle = normalize_search_text(query.text.trim());
            let expected: Vec<&GameRecord> = store
                .iter()
                .filter(|r| query.hardware.matches(r))
                .filter(|r| query.completion.matches(r))
                .filter(|r| needle.is_empty() || normalize_search_text(&r.keyword).contains(&needle))
                .collect();
            assert_eq!(view.records, expected, "state {query:?}");
        }
    }

    #[test]
    fn kana_search_matches_either_script() {
        let store = library();
        let view = query_records(&store, &state("けん", "all", "all", "store"));
        assert_eq!(titles(&view), vec!["Kenka Bancho"]);

        let view = query_records(&store, &state(" クロノ ", "all", "all", "store"));
        assert_eq!(titles(&view), vec!["Chrono Trigger"]);

        let view = query_records(&store, &state("ｸﾛﾉ", "all", "all", "store"));
        assert_eq!(titles(&view), vec!["Chrono Trigger"]);
    }

    #[test]
    fn search_ignores_title_in_keyword_only_scope() {
        let store = library();
        let view = query_records(&store, &state("bloodborne", "all", "all", "store"));
        assert!(view.is_empty());
        assert_eq!(view.count, 0);
        assert_eq!(view.total_playtime, 0.0);
        assert!(view.total_playtime.is_sign_positive());
    }

    #[test]
    fn empty_or_blank_text_never_excludes() {
        let store = library();
        for text in ["", "   ", "\u{3000}"] {
            let view = query_records(&store, &state(text, "all", "all", "store"));
            assert_eq!(view.count, store.len(), "text {text:?}");
        }
    }

    #[test]
    fn aggregates_match_records_for_every_state() {
        let store = library();
        for sort in SortKey::SELECTABLE {
            for completion in CompletionFilter::VARIANTS {
                for hardware in ["all", "SFC", "PS4"] {
                    let query = QueryState {
                        text: String::new(),
                        hardware: HardwareFilter::from_key(hardware),
                        completion,
                        sort,
                    };
                    let view = query_records(&store, &query);
                    assert_eq!(view.count, view.records.len());
                    let sum: f64 = view.iter().map(|r| r.playtime).sum();
                    assert_eq!(view.total_playtime, sum);
                    assert!(view.total_playtime >= 0.0);
                }
            }
        }
    }

    #[test]
    fn empty_store_yields_empty_view() {
        let store = RecordStore::empty();
        let view = query_records(&store, &QueryState::default());
        assert!(view.records.is_empty());
        assert_eq!(view.summary(), Summary::default());
    }

    #[test]
    fn release_date_sorts_are_stable() {
        let store = library();
        let asc = query_records(&store, &state("", "all", "all", "releaseDate_asc"));
        assert_eq!(
            titles(&asc),
            vec!["Chrono Trigger", "Kenka Bancho", "Bloodborne", "Ape Escape", "Astral Chain"]
        );
        let desc = query_records(&store, &state("", "all", "all", "releaseDate_desc"));
        assert_eq!(
            titles(&desc),
            vec!["Astral Chain", "Bloodborne", "Ape Escape", "Chrono Trigger", "Kenka Bancho"]
        );
    }

    #[test]
    fn playtime_sorts_are_monotonic_and_stable() {
        let store = library();
        let asc = query_records(&store, &state("", "all", "all", "playtime_asc"));
        assert!(asc.records.windows(2).all(|w| w[0].playtime <= w[1].playtime));
        assert_eq!(
            titles(&asc),
            vec!["Ape Escape", "Astral Chain", "Chrono Trigger", "Kenka Bancho", "Bloodborne"]
        );
        let desc = query_records(&store, &state("", "all", "all", "playtime_desc"));
        assert!(desc.records.windows(2).all(|w| w[0].playtime >= w[1].playtime));
        assert_eq!(
            titles(&desc),
            vec!["Bloodborne", "Chrono Trigger", "Kenka Bancho", "Astral Chain", "Ape Escape"]
        );
    }

    #[test]
    fn signed_zero_playtimes_keep_store_order() {
        let store = RecordStore::new(vec![
            game("PC", "First", "a", false, 0.0, 0),
            game("PC", "Second", "b", false, -0.0, 0),
            game("PC", "Third", "c", false, 0.0, 0),
        ])
        .expect("valid store");
        for sort in ["playtime_asc", "playtime_desc"] {
            let view = query_records(&store, &state("", "all", "all", sort));
            assert_eq!(titles(&view), vec!["First", "Second", "Third"], "sort {sort}");
        }
    }

    #[test]
    fn composed_and_decomposed_search_text_match() {
        let store = RecordStore::new(vec![game("PC", "Ring", "\u{1E98}", false, 1.0, 0)])
            .expect("valid store");
        let view = query_records(&store, &state("W\u{30A}", "all", "all", "store"));
        assert_eq!(titles(&view), vec!["Ring"]);
    }

    #[test]
    fn title_sorts_ignore_case() {
        let store = RecordStore::new(vec![
            game("PC", "banjo", "a", false, 1.0, 0),
            game("PC", "Zelda", "b", false, 1.0, 0),
            game("PC", "Axiom", "c", false, 1.0, 0),
            game("PC", "Banjo", "d", false, 1.0, 0),
        ])
        .expect("valid records");
        let asc = query_records(&store, &state("", "all", "all", "title_asc"));
        assert_eq!(titles(&asc), vec!["Axiom", "Banjo", "banjo", "Zelda"]);
        let desc = query_records(&store, &state("", "all", "all", "title_desc"));
        assert_eq!(titles(&desc), vec!["Zelda", "banjo", "Banjo", "Axiom"]);
    }

    #[test]
    fn equal_titles_keep_store_order() {
        let store = RecordStore::new(vec![
            game("SFC", "Tetris", "first", false, 1.0, 0),
            game("GB", "Tetris", "second", false, 2.0, 0),
        ])
        .expect("valid records");
        for sort in ["title_asc", "title_desc"] {
            let view = query_records(&store, &state("", "all", "all", sort));
            let keywords: Vec<&str> = view.iter().map(|r| r.keyword.as_str()).collect();
            assert_eq!(keywords, vec!["first", "second"], "sort {sort}");
        }
    }

    #[test]
    fn unknown_sort_key_keeps_store_order() {
        let store = library();
        let view = query_records(&store, &state("", "all", "all", "rating_desc"));
        let expected: Vec<String> = store.iter().map(|r| r.title.clone()).collect();
        assert_eq!(titles(&view), expected);
    }

    #[test]
    fn wider_scope_searches_optional_fields() {
        let mut with_notes = game("GB", "Tetris", "てとりす", true, 3.0, 0);
        with_notes.notes = Some("ラインを消す".to_string());
        with_notes.achievement = Some("Level 29".to_string());
        let store = RecordStore::new(vec![with_notes]).expect("valid records");

        let narrow = QueryEngine::default();
        assert!(narrow
            .query_records(&store, &state("らいん", "all", "all", "store"))
            .is_empty());

        let wide = QueryEngine::new(
            HardwarePriority::default(),
            SearchScope {
                include_achievement: true,
                include_notes: true,
                include_hardware: true,
            },
        );
        assert_eq!(wide.query_records(&store, &state("らいん", "all", "all", "store")).count, 1);
        assert_eq!(wide.query_records(&store, &state("level", "all", "all", "store")).count, 1);
        assert_eq!(wide.query_records(&store, &state("gb", "all", "all", "store")).count, 1);
    }
}
