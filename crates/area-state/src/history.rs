//! History entries and backends
//!
//! A committed navigation is recorded as a [`HistoryEntry`] holding the area,
//! the mounted tag and the percent-encoded state and params. Where the entry
//! goes is up to the [`HistoryBackend`]; [`MemoryHistory`] keeps it in memory,
//! a browser adapter would forward to `window.history`.

use area_core::codec;
use area_core::route::{RouteParams, RouteState};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The backend refused the entry
    #[error("History backend rejected entry: {0}")]
    Rejected(String),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Persisted layout of one navigation
///
/// A missing field means "unset", not "empty".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique entry key
    pub id: String,
    /// Area the navigation targeted
    pub area: String,
    /// Tag of the mounted component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Percent-encoded JSON state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_state: Option<String>,
    /// Percent-encoded JSON params
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_params: Option<String>,
}

impl HistoryEntry {
    /// Create an entry for `area` with a fresh id
    pub fn new(area: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            area: area.into(),
            tag: None,
            encoded_state: None,
            encoded_params: None,
        }
    }

    /// Record the mounted tag
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Encode and record state; an empty map stays unset
    pub fn with_state(mut self, state: &RouteState) -> Self {
        self.encoded_state = (!state.is_empty()).then(|| codec::encode(state));
        self
    }

    /// Encode and record params; an empty map stays unset
    pub fn with_params(mut self, params: &RouteParams) -> Self {
        self.encoded_params = (!params.is_empty()).then(|| codec::encode(params));
        self
    }

    /// Decoded state (empty when unset or malformed)
    pub fn state(&self) -> RouteState {
        self.encoded_state.as_deref().map(codec::decode).unwrap_or_default()
    }

    /// Decoded params (empty when unset or malformed)
    pub fn params(&self) -> RouteParams {
        self.encoded_params.as_deref().map(codec::decode).unwrap_or_default()
    }
}

/// Destination for history entries
#[cfg_attr(test, mockall::automock)]
pub trait HistoryBackend: Send + Sync {
    /// Add a new entry on top of the history
    fn push_entry(&self, entry: HistoryEntry) -> Result<()>;

    /// Overwrite the current entry
    fn replace_entry(&self, entry: HistoryEntry) -> Result<()>;

    /// The current entry
    fn current(&self) -> Option<HistoryEntry>;

    /// Number of entries
    fn len(&self) -> usize;

    /// Whether there are no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory history
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all entries, oldest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().clone()
    }
}

impl HistoryBackend for MemoryHistory {
    fn push_entry(&self, entry: HistoryEntry) -> Result<()> {
        self.entries.lock().push(entry);
        Ok(())
    }

    fn replace_entry(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.entries.lock();
        match entries.last_mut() {
            Some(last) => *last = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.entries.lock().last().cloned()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
