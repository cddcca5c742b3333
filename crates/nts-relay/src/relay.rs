//! The relay interface consumed by the web front-end.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::event::{self, Event};
use crate::filter::Filter;

/// A finite, non-restartable sequence of query results.
///
/// Consumers must drain it to observe the full result set. Dropping it early
/// tells the producer to stop.
pub type EventStream = BoxStream<'static, Event>;

/// What happened to an event accepted by [`Relay::add_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Persisted. `replaced` counts older replaceable versions removed.
    Stored { replaced: usize },
    /// Ephemeral kind: accepted but not persisted.
    Ephemeral,
}

/// Event storage and query engine.
///
/// Implementations own validation beyond the web layer's own checks
/// (IDs, signatures, replaceable semantics) and any concurrency control.
/// A call whose future is dropped is considered cancelled.
#[async_trait]
pub trait Relay: Send + Sync + 'static {
    /// Store one event.
    async fn add_event(&self, event: Event) -> Result<AddOutcome>;

    /// Start a query, returning its results as a stream.
    async fn query_events(&self, filter: Filter) -> Result<EventStream>;
}

/// Relay metadata shown on the landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayInfo {
    /// Human-readable relay name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Operator public key (hex).
    pub pubkey: String,
}

impl RelayInfo {
    /// Bech32 form of the operator key, if set and valid.
    pub fn npub(&self) -> Option<String> {
        event::npub(&self.pubkey)
    }
}
