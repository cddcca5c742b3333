//! SQLite-backed [`Relay`] implementation.
//!
//! The `SqliteRelay` is responsible for:
//! - Optional NIP-01 ID and signature verification on write
//! - Rejecting duplicates and honouring replaceable/addressable semantics
//! - Streaming query results to the caller through a bounded channel
//!
//! All SQLite work happens on the blocking pool behind a single mutex-guarded
//! connection, so writes are serialized and each write is one transaction.

pub mod schema;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{RelayError, Result};
use crate::event::Event;
use crate::filter::Filter;
use crate::relay::{AddOutcome, EventStream, Relay};

/// Rows buffered between the query worker and the consumer.
const STREAM_BUFFER: usize = 64;

/// Event store over a single SQLite connection.
#[derive(Clone)]
pub struct SqliteRelay {
    /// SQLite connection (protected by mutex for thread safety).
    conn: Arc<Mutex<Connection>>,
    /// Verify IDs and signatures before storing.
    verify_signatures: bool,
}

impl SqliteRelay {
    /// Open or create a store at `path`.
    pub fn open(path: impl AsRef<Path>, verify_signatures: bool) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        schema::init_schema(&conn)?;

        tracing::info!(
            path = %path.display(),
            verify_signatures,
            "event store opened"
        );

        Ok(Self::from_connection(conn, verify_signatures))
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(verify_signatures: bool) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self::from_connection(conn, verify_signatures))
    }

    fn from_connection(conn: Connection, verify_signatures: bool) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            verify_signatures,
        }
    }

    /// Number of stored events.
    pub async fn count(&self) -> Result<usize> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = conn.lock();
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await?
    }
}

#[async_trait]
impl Relay for SqliteRelay {
    async fn add_event(&self, event: Event) -> Result<AddOutcome> {
        if self.verify_signatures {
            event.verify()?;
        } else if event.id.is_empty() {
            return Err(RelayError::Invalid("missing event id".to_string()));
        }

        if event.is_ephemeral() {
            tracing::debug!(id = %event.id, kind = event.kind, "ephemeral event not stored");
            return Ok(AddOutcome::Ephemeral);
        }

        let conn = Arc::clone(&self.conn);
        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            insert_event(&mut conn, &event)
        })
        .await??;

        Ok(outcome)
    }

    async fn query_events(&self, filter: Filter) -> Result<EventStream> {
        let (sql, params) = build_query(&filter);
        let conn = Arc::clone(&self.conn);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();

            let mut stmt = match conn.prepare(&sql) {
                Ok(stmt) => stmt,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
            };
            let mut rows = match stmt.query(params_from_iter(params.iter())) {
                Ok(rows) => rows,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));

            loop {
                match rows.next() {
                    Ok(Some(row)) => match event_from_row(row) {
                        Ok(event) => {
                            if tx.blocking_send(event).is_err() {
                                tracing::debug!("query consumer dropped, stopping");
                                break;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "skipping unreadable event row"),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "query aborted mid-stream");
                        break;
                    }
                }
            }
        });

        ready_rx
            .await
            .map_err(|_| RelayError::Worker("query worker exited before starting".to_string()))??;

        Ok(ReceiverStream::new(rx).boxed())
    }
}

/// Insert an event in one transaction, applying duplicate and
/// replaceable-event rules.
fn insert_event(conn: &mut Connection, event: &Event) -> Result<AddOutcome> {
    // SQLite integers are signed; larger timestamps would wrap and sort as oldest
    let created_at = i64::try_from(event.created_at).map_err(|_| {
        RelayError::Invalid(format!("created_at {} out of range", event.created_at))
    })?;

    let tx = conn.transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1)",
        [&event.id],
        |row| row.get(0),
    )?;
    if exists {
        return Err(RelayError::Duplicate(event.id.clone()));
    }

    let d_tag = stored_d_tag(event);
    let mut replaced = 0;

    if event.is_replaceable() || event.is_addressable() {
        let previous: Vec<(String, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT id, created_at FROM events WHERE pubkey = ?1 AND kind = ?2 AND d_tag = ?3",
            )?;
            let rows = stmt
                .query_map(params![event.pubkey, event.kind, d_tag], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<rusqlite::Result<_>>()?;
            rows
        };

        if let Some((newer, _)) = previous
            .iter()
            .find(|(id, ts)| supersedes(*ts, id, created_at, &event.id))
        {
            return Err(RelayError::Rejected(format!(
                "a newer version ({newer}) is already stored"
            )));
        }

        for (id, _) in &previous {
            tx.execute("DELETE FROM events WHERE id = ?1", [id])?;
        }
        replaced = previous.len();
    }

    let tags = serde_json::to_string(&event.tags)?;
    tx.execute(
        "INSERT INTO events (id, pubkey, created_at, kind, tags, content, sig, d_tag)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id,
            event.pubkey,
            created_at,
            event.kind,
            tags,
            event.content,
            event.sig,
            d_tag,
        ],
    )?;
    tx.commit()?;

    if replaced > 0 {
        tracing::debug!(id = %event.id, replaced, "replaced older versions");
    }

    Ok(AddOutcome::Stored { replaced })
}

/// The `d` tag only identifies addressable events; everything else stores ''.
fn stored_d_tag(event: &Event) -> &str {
    if event.is_addressable() {
        event.d_tag()
    } else {
        ""
    }
}

/// NIP-01: the stored version wins if it is newer, or equally old with the
/// lower ID.
fn supersedes(stored_at: i64, stored_id: &str, new_at: i64, new_id: &str) -> bool {
    stored_at > new_at || (stored_at == new_at && stored_id < new_id)
}

/// Build the SELECT for a filter, returning SQL and positional parameters.
fn build_query(filter: &Filter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if !filter.ids.is_empty() {
        clauses.push(format!("id IN ({})", placeholders(filter.ids.len())));
        params.extend(filter.ids.iter().cloned().map(Value::Text));
    }
    if !filter.kinds.is_empty() {
        clauses.push(format!("kind IN ({})", placeholders(filter.kinds.len())));
        params.extend(filter.kinds.iter().map(|k| Value::Integer(i64::from(*k))));
    }
    if !filter.authors.is_empty() {
        clauses.push(format!("pubkey IN ({})", placeholders(filter.authors.len())));
        params.extend(filter.authors.iter().cloned().map(Value::Text));
    }

    let mut sql =
        String::from("SELECT id, pubkey, created_at, kind, tags, content, sig FROM events");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id ASC LIMIT ?");
    params.push(Value::Integer(filter.effective_limit() as i64));

    (sql, params)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn event_from_row(row: &rusqlite::Row<'_>) -> Result<Event> {
    let tags: String = row.get(4)?;
    Ok(Event {
        id: row.get(0)?,
        pubkey: row.get(1)?,
        created_at: row.get::<_, i64>(2)? as u64,
        kind: row.get(3)?,
        tags: serde_json::from_str(&tags)?,
        content: row.get(5)?,
        sig: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_QUERY_LIMIT;
    use crate::fixtures::{signed_event, signed_event_with};

    fn event(id: &str, pubkey: &str, kind: u16, created_at: u64) -> Event {
        Event {
            id: id.into(),
            pubkey: pubkey.into(),
            created_at,
            kind,
            tags: vec![vec!["title".into(), format!("note {id}")]],
            content: format!("content of {id}"),
            sig: String::new(),
        }
    }

    async fn collect(relay: &SqliteRelay, filter: Filter) -> Vec<Event> {
        relay.query_events(filter).await.unwrap().collect().await
    }

    #[tokio::test]
    async fn test_add_and_query_by_author_and_kind() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("aa", "p1", 1, 1)).await.unwrap();
        relay.add_event(event("bb", "p1", 2, 2)).await.unwrap();
        relay.add_event(event("cc", "p2", 1, 3)).await.unwrap();

        let found = collect(&relay, Filter::new().kind(1).author("p1")).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "aa");
        assert_eq!(found[0].title(), Some("note aa"));
        assert_eq!(found[0].content, "content of aa");
    }

    #[tokio::test]
    async fn test_query_orders_newest_first_then_id() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("bb", "p1", 1, 5)).await.unwrap();
        relay.add_event(event("aa", "p1", 1, 5)).await.unwrap();
        relay.add_event(event("cc", "p1", 1, 9)).await.unwrap();

        let ids: Vec<_> = collect(&relay, Filter::new())
            .await
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["cc", "aa", "bb"]);
    }

    #[tokio::test]
    async fn test_repeated_query_is_stable() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        for i in 0..10u64 {
            relay
                .add_event(event(&format!("id{i}"), "p1", 1, i % 3))
                .await
                .unwrap();
        }
        let first = collect(&relay, Filter::new().author("p1")).await;
        let second = collect(&relay, Filter::new().author("p1")).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_limit_applied() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        for i in 0..30u64 {
            relay
                .add_event(event(&format!("id{i:02}"), "p1", 1, i))
                .await
                .unwrap();
        }
        let found = collect(&relay, Filter::new().limit(20)).await;
        assert_eq!(found.len(), 20);
        assert_eq!(found[0].id, "id29");
    }

    #[tokio::test]
    async fn test_query_by_id_no_match() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("aa", "p1", 1, 1)).await.unwrap();
        assert!(collect(&relay, Filter::new().id("zz")).await.is_empty());
        assert_eq!(collect(&relay, Filter::new().id("aa")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("aa", "p1", 1, 1)).await.unwrap();
        let err = relay.add_event(event("aa", "p1", 1, 1)).await.unwrap_err();
        assert!(matches!(err, RelayError::Duplicate(id) if id == "aa"));
        assert_eq!(relay.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_id_rejected_without_verification() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        let err = relay.add_event(event("", "p1", 1, 1)).await.unwrap_err();
        assert!(matches!(err, RelayError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp_rejected() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("aa", "p1", 30_000, 10)).await.unwrap();

        let far_future = event("bb", "p1", 30_000, u64::MAX);
        let err = relay.add_event(far_future).await.unwrap_err();
        assert!(matches!(err, RelayError::Invalid(_)));

        let stored = collect(&relay, Filter::new().author("p1")).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "aa");
    }

    #[tokio::test]
    async fn test_ephemeral_not_stored() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        let outcome = relay.add_event(event("aa", "p1", 20_001, 1)).await.unwrap();
        assert_eq!(outcome, AddOutcome::Ephemeral);
        assert_eq!(relay.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_addressable_newer_replaces_older() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        let mut old = event("aa", "p1", 31234, 1);
        old.tags.push(vec!["d".into(), "slug".into()]);
        let mut new = event("bb", "p1", 31234, 2);
        new.tags.push(vec!["d".into(), "slug".into()]);
        let mut other = event("cc", "p1", 31234, 1);
        other.tags.push(vec!["d".into(), "other".into()]);

        relay.add_event(old).await.unwrap();
        relay.add_event(other).await.unwrap();
        let outcome = relay.add_event(new).await.unwrap();
        assert_eq!(outcome, AddOutcome::Stored { replaced: 1 });

        let ids: Vec<_> = collect(&relay, Filter::new().kind(31234))
            .await
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["bb", "cc"]);
    }

    #[tokio::test]
    async fn test_addressable_older_rejected() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("bb", "p1", 31234, 5)).await.unwrap();
        let err = relay
            .add_event(event("aa", "p1", 31234, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Rejected(_)));
        assert_eq!(relay.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replaceable_same_timestamp_lower_id_wins() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("bb", "p1", 0, 5)).await.unwrap();
        // Lower id at the same timestamp replaces.
        let outcome = relay.add_event(event("aa", "p1", 0, 5)).await.unwrap();
        assert_eq!(outcome, AddOutcome::Stored { replaced: 1 });
        // Higher id at the same timestamp is refused.
        let err = relay.add_event(event("cc", "p1", 0, 5)).await.unwrap_err();
        assert!(matches!(err, RelayError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_regular_kinds_are_not_replaced() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        relay.add_event(event("aa", "p1", 1, 1)).await.unwrap();
        relay.add_event(event("bb", "p1", 1, 2)).await.unwrap();
        assert_eq!(relay.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_verification_accepts_signed_event() {
        let relay = SqliteRelay::open_in_memory(true).unwrap();
        let ev = signed_event(31234, "hello");
        relay.add_event(ev.clone()).await.unwrap();
        let found = collect(&relay, Filter::new().id(ev.id.clone())).await;
        assert_eq!(found, vec![ev]);
    }

    #[tokio::test]
    async fn test_verification_rejects_unsigned_event() {
        let relay = SqliteRelay::open_in_memory(true).unwrap();
        let err = relay
            .add_event(event("aa", "p1", 31234, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Invalid(_)));
        assert_eq!(relay.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signed_addressable_replacement() {
        let relay = SqliteRelay::open_in_memory(true).unwrap();
        let keys = nostr::Keys::generate();
        let v1 = signed_event_with(&keys, 31234, "first", 1_700_000_000, Some("note"));
        let v2 = signed_event_with(&keys, 31234, "second", 1_700_000_100, Some("note"));
        relay.add_event(v1).await.unwrap();
        relay.add_event(v2.clone()).await.unwrap();
        let found = collect(&relay, Filter::new().author(v2.pubkey.clone())).await;
        assert_eq!(found, vec![v2]);
    }

    #[tokio::test]
    async fn test_dropped_stream_stops_producer() {
        let relay = SqliteRelay::open_in_memory(false).unwrap();
        for i in 0..(STREAM_BUFFER as u64 * 3) {
            relay
                .add_event(event(&format!("id{i:04}"), "p1", 1, i))
                .await
                .unwrap();
        }
        let mut stream = relay.query_events(Filter::new()).await.unwrap();
        assert!(stream.next().await.is_some());
        drop(stream);

        // The connection must become available again once the worker notices.
        let count = relay.count().await.unwrap();
        assert_eq!(count, STREAM_BUFFER * 3);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("events.db");
        let relay = SqliteRelay::open(&path, false).unwrap();
        relay.add_event(event("aa", "p1", 1, 1)).await.unwrap();
        assert!(path.exists());

        drop(relay);
        let reopened = SqliteRelay::open(&path, false).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[test]
    fn test_build_query_empty_filter() {
        let (sql, params) = build_query(&Filter::new());
        assert_eq!(
            sql,
            "SELECT id, pubkey, created_at, kind, tags, content, sig FROM events \
             ORDER BY created_at DESC, id ASC LIMIT ?"
        );
        assert_eq!(params, vec![Value::Integer(MAX_QUERY_LIMIT as i64)]);
    }

    #[test]
    fn test_build_query_all_fields() {
        let filter = Filter::new().id("aa").kind(1).kind(2).author("p1").limit(20);
        let (sql, params) = build_query(&filter);
        assert!(sql.contains("WHERE id IN (?) AND kind IN (?, ?) AND pubkey IN (?)"));
        assert_eq!(params.len(), 5);
        assert_eq!(params[4], Value::Integer(20));
    }

    #[test]
    fn test_supersedes() {
        assert!(supersedes(2, "b", 1, "a"));
        assert!(supersedes(1, "a", 1, "b"));
        assert!(!supersedes(1, "b", 1, "a"));
        assert!(!supersedes(1, "a", 2, "b"));
    }
}
