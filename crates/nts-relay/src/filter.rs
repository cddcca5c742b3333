//! Query descriptors for selecting stored events.

use crate::MAX_QUERY_LIMIT;
use crate::event::Event;

/// A subset of NIP-01 filter fields.
///
/// Empty lists leave the field unconstrained. All non-empty fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Event IDs (hex).
    pub ids: Vec<String>,
    /// Kind numbers.
    pub kinds: Vec<u16>,
    /// Author public keys (hex).
    pub authors: Vec<String>,
    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

impl Filter {
    /// Create an empty filter matching every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a single event ID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Restrict to a kind.
    pub fn kind(mut self, kind: u16) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Restrict to an author.
    pub fn author(mut self, pubkey: impl Into<String>) -> Self {
        self.authors.push(pubkey.into());
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Limit actually applied by the store: the requested limit clamped to
    /// [`MAX_QUERY_LIMIT`], which is also the default.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .filter(|l| *l > 0)
            .map_or(MAX_QUERY_LIMIT, |l| l.min(MAX_QUERY_LIMIT))
    }

    /// Check whether an event satisfies every non-empty field.
    ///
    /// `limit` is not considered here; it applies to result sets.
    pub fn matches(&self, event: &Event) -> bool {
        (self.ids.is_empty() || self.ids.iter().any(|id| *id == event.id))
            && (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && (self.authors.is_empty() || self.authors.iter().any(|a| *a == event.pubkey))
    }
}
