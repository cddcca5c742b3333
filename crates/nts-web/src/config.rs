//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Context;
use nts_relay::RelayInfo;

/// Default accepted note kind (addressable, so edits replace older versions).
pub const DEFAULT_NOTE_KIND: u16 = 31234;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay display name. Also used as the site name in page titles.
    pub relay_name: String,

    /// Free-form relay description shown on the home page.
    pub relay_description: String,

    /// Relay operator public key (hex).
    pub relay_pubkey: String,

    /// SQLite database path.
    pub database_url: String,

    /// Server bind address (e.g., "0.0.0.0:8081").
    pub bind_addr: String,

    /// The single event kind accepted by `/save-note` and listed by `/fetch-notes`.
    pub note_kind: u16,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,

    /// Verify event IDs and signatures before storing.
    pub verify_signatures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_name: "nts".to_string(),
            relay_description: String::new(),
            relay_pubkey: String::new(),
            database_url: "nts.db".to_string(),
            bind_addr: "0.0.0.0:8081".to_string(),
            note_kind: DEFAULT_NOTE_KIND,
            static_dir: PathBuf::from("static"),
            verify_signatures: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `RELAY_NAME`: Relay and site name (default: "nts")
    /// - `RELAY_DESCRIPTION`: Relay description (default: empty)
    /// - `RELAY_PUBKEY`: Operator pubkey, hex (default: empty)
    /// - `DATABASE_URL`: SQLite path (default: "nts.db")
    /// - `BIND_HOST`: Listen host (default: "0.0.0.0")
    /// - `PORT`: Listen port (default: 8081)
    /// - `NOTE_KIND`: Accepted note kind (default: 31234)
    /// - `STATIC_DIR`: Static asset directory (default: "static")
    /// - `VERIFY_SIGNATURES`: Verify event signatures (default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let relay_name = std::env::var("RELAY_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.relay_name);

        let relay_description = std::env::var("RELAY_DESCRIPTION").unwrap_or_default();

        let relay_pubkey = std::env::var("RELAY_PUBKEY")
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.database_url);

        let host = std::env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value {raw:?}"))?,
            Err(_) => 8081,
        };
        let bind_addr = format!("{host}:{port}");

        let note_kind: u16 = match std::env::var("NOTE_KIND") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid NOTE_KIND value {raw:?}"))?,
            Err(_) => DEFAULT_NOTE_KIND,
        };

        let static_dir = std::env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let verify_signatures = match std::env::var("VERIFY_SIGNATURES") {
            Ok(raw) => parse_bool(&raw)
                .with_context(|| format!("invalid VERIFY_SIGNATURES value {raw:?}"))?,
            Err(_) => true,
        };

        tracing::info!(
            relay_name = %relay_name,
            database_url = %database_url,
            bind_addr = %bind_addr,
            note_kind,
            static_dir = %static_dir.display(),
            verify_signatures,
            "configuration loaded"
        );

        Ok(Self {
            relay_name,
            relay_description,
            relay_pubkey,
            database_url,
            bind_addr,
            note_kind,
            static_dir,
            verify_signatures,
        })
    }

    /// Relay metadata shown on the home page.
    pub fn relay_info(&self) -> RelayInfo {
        RelayInfo {
            name: self.relay_name.clone(),
            description: self.relay_description.clone(),
            pubkey: self.relay_pubkey.clone(),
        }
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
