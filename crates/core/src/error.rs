//! Typed errors surfaced by the store and the query selectors.

use thiserror::Error;

/// Rejections raised while building a [`crate::store::RecordStore`].
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// A record violates one of the data-model invariants.
    #[error("record #{index} ({title:?}) is invalid: {reason}")]
    InvalidRecord {
        /// Position of the offending record in the input.
        index: usize,
        /// Title of the offending record, possibly empty.
        title: String,
        /// Which invariant failed.
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn invalid(index: usize, title: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            title: title.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when parsing query selector keys strictly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The key does not name any known selector value.
    #[error("unknown {kind} key: {key:?}")]
    UnknownKey {
        /// Selector being parsed (`sort`, `completion`).
        kind: &'static str,
        /// Offending input.
        key: String,
    },
}
