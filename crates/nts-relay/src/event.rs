//! Nostr event model and NIP-01 helpers.
//!
//! Events arrive as JSON from browsers and are handed to the store verbatim.
//! Verification of the ID hash and Schnorr signature is delegated to the
//! nostr crate.

use nostr::JsonUtil; // Required for Event::from_json()
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// A Nostr event as received over HTTP and persisted by the store.
///
/// ```json
/// {
///   "id": "4ff2...",
///   "pubkey": "35e4...",
///   "created_at": 1758468146,
///   "kind": 31234,
///   "tags": [["d", "draft-1"], ["title", "My Note"]],
///   "content": "hello",
///   "sig": "95da..."
/// }
/// ```
///
/// Missing fields decode to their zero value so that an incomplete body
/// surfaces as a validation failure rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Event ID (hex SHA-256 of the canonical serialization).
    pub id: String,
    /// Author public key (hex).
    pub pubkey: String,
    /// Unix timestamp of creation.
    pub created_at: u64,
    /// Kind number.
    pub kind: u16,
    /// Tags as nested string arrays.
    pub tags: Vec<Vec<String>>,
    /// Text body.
    pub content: String,
    /// Schnorr signature over the ID (hex).
    pub sig: String,
}

impl Event {
    /// First value of the tag named `name`, if any.
    ///
    /// Tags with no value (a bare `["title"]`) are skipped.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.len() >= 2 && t[0] == name)
            .map(|t| t[1].as_str())
    }

    /// Value of the `title` tag.
    pub fn title(&self) -> Option<&str> {
        self.tag_value("title")
    }

    /// Value of the `d` tag, empty when absent (NIP-01 addressable identifier).
    pub fn d_tag(&self) -> &str {
        self.tag_value("d").unwrap_or("")
    }

    /// Bech32 `npub` form of the author key, if `pubkey` is valid hex.
    pub fn author_npub(&self) -> Option<String> {
        npub(&self.pubkey)
    }

    /// Kinds where only the latest event per `(pubkey, kind)` is kept.
    pub fn is_replaceable(&self) -> bool {
        matches!(self.kind, 0 | 3 | 10_000..20_000)
    }

    /// Kinds that are relayed but never stored.
    pub fn is_ephemeral(&self) -> bool {
        (20_000..30_000).contains(&self.kind)
    }

    /// Kinds where only the latest event per `(pubkey, kind, d)` is kept.
    pub fn is_addressable(&self) -> bool {
        (30_000..40_000).contains(&self.kind)
    }

    /// Verify the event ID and signature per NIP-01.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Invalid`] if:
    /// - a field has the wrong hex length or encoding
    /// - the ID doesn't match the computed hash
    /// - the signature is invalid
    pub fn verify(&self) -> Result<()> {
        let json = serde_json::to_string(self)?;
        let event =
            nostr::Event::from_json(&json).map_err(|e| RelayError::Invalid(e.to_string()))?;

        if !event.verify_id() {
            return Err(RelayError::Invalid(format!(
                "event id {} does not match its content",
                self.id
            )));
        }
        if !event.verify_signature() {
            return Err(RelayError::Invalid(
                "signature verification failed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Encode a hex public key as `npub`. Returns `None` for malformed keys.
pub fn npub(pubkey_hex: &str) -> Option<String> {
    nostr::PublicKey::from_hex(pubkey_hex)
        .ok()
        .and_then(|pk| nostr::ToBech32::to_bech32(&pk).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn event_with_tags(tags: Vec<Vec<&str>>) -> Event {
        Event {
            tags: tags
                .into_iter()
                .map(|t| t.into_iter().map(String::from).collect())
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_full_event() {
        let json = r#"{"id":"aa11","pubkey":"p1","created_at":1700000000,"kind":31234,"tags":[["title","Hi"]],"content":"hello","sig":"ff"}"#;
        let ev: Event = serde_json::from_str(json).unwrap();
        assert_eq!(ev.id, "aa11");
        assert_eq!(ev.kind, 31234);
        assert_eq!(ev.created_at, 1_700_000_000);
        assert_eq!(ev.title(), Some("Hi"));
    }

    #[test]
    fn test_decode_missing_fields_default() {
        let ev: Event = serde_json::from_str(r#"{"kind":31234,"content":"hello","pubkey":"abc"}"#)
            .unwrap();
        assert_eq!(ev.pubkey, "abc");
        assert!(ev.id.is_empty());
        assert!(ev.tags.is_empty());
        assert_eq!(ev.created_at, 0);
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        assert!(serde_json::from_str::<Event>(r#"{"kind":"note"}"#).is_err());
        assert!(serde_json::from_str::<Event>(r#"{"kind":70000}"#).is_err());
        assert!(serde_json::from_str::<Event>("\"note\"").is_err());
    }

    #[test]
    fn test_title_first_match() {
        let ev = event_with_tags(vec![vec!["title", "One"], vec!["title", "Two"]]);
        assert_eq!(ev.title(), Some("One"));
    }

    #[test]
    fn test_title_skips_bare_tag() {
        let ev = event_with_tags(vec![vec!["title"], vec!["title", "Real"]]);
        assert_eq!(ev.title(), Some("Real"));
    }

    #[test]
    fn test_title_absent() {
        let ev = event_with_tags(vec![vec!["t", "news"]]);
        assert_eq!(ev.title(), None);
    }

    #[test]
    fn test_d_tag_default_empty() {
        assert_eq!(Event::default().d_tag(), "");
        let ev = event_with_tags(vec![vec!["d", "slug"]]);
        assert_eq!(ev.d_tag(), "slug");
    }

    #[test]
    fn test_kind_classes() {
        let kind = |kind| Event {
            kind,
            ..Default::default()
        };
        assert!(kind(0).is_replaceable());
        assert!(kind(3).is_replaceable());
        assert!(kind(10_002).is_replaceable());
        assert!(!kind(1).is_replaceable());
        assert!(kind(20_001).is_ephemeral());
        assert!(!kind(30_000).is_ephemeral());
        assert!(kind(31_234).is_addressable());
        assert!(!kind(40_000).is_addressable());
    }

    #[test]
    fn test_npub_invalid_hex() {
        assert_eq!(npub("abc"), None);
        assert_eq!(npub(""), None);
    }

    #[test]
    fn test_npub_valid_key() {
        let ev = fixtures::signed_event(31234, "hello");
        let encoded = ev.author_npub().unwrap();
        assert!(encoded.starts_with("npub1"));
    }

    #[test]
    fn test_verify_signed_event() {
        let ev = fixtures::signed_event(31234, "hello");
        assert!(ev.verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_content() {
        let mut ev = fixtures::signed_event(31234, "hello");
        ev.content = "tampered".to_string();
        assert!(matches!(ev.verify(), Err(RelayError::Invalid(_))));
    }

    #[test]
    fn test_verify_rejects_malformed_fields() {
        let ev = Event {
            id: "aa11".into(),
            pubkey: "abc".into(),
            kind: 31234,
            content: "hello".into(),
            ..Default::default()
        };
        assert!(matches!(ev.verify(), Err(RelayError::Invalid(_))));
    }
}
