//! nts-relay - event storage and query engine behind the nts web front-end.
//!
//! This crate provides:
//! - The Nostr [`Event`] model and NIP-01 kind classification
//! - [`Filter`] query descriptors
//! - The [`Relay`] trait the web layer depends on
//! - [`SqliteRelay`], a SQLite-backed implementation with NIP-01 id/signature
//!   verification and replaceable-event handling

mod error;
mod event;
mod filter;
mod relay;
pub mod sqlite;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Upper bound on the number of events a single query may return.
/// Also used when a filter carries no limit.
pub const MAX_QUERY_LIMIT: usize = 500;

pub use error::{RelayError, Result};
pub use event::Event;
pub use filter::Filter;
pub use relay::{AddOutcome, EventStream, Relay, RelayInfo};
pub use sqlite::SqliteRelay;
