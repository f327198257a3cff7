use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

/// Slot holding the full ordered conversation log.
pub const SLOT_CHAT_MESSAGES: &str = "chat_messages";
/// Slot holding the all-time tracking counters.
pub const SLOT_ALL_TIME_TRACKING: &str = "all_time_tracking";

/// Durable named-slot store backed by sqlite. Reads fall back to a default
/// on any problem; writes are best-effort and never fail the caller — the
/// in-memory value stays authoritative for the session either way.
pub struct StateStore {
    conn: Mutex<Connection>,
}

impl StateStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open state database at {:?}", path))?;
        Self::init(conn)
    }

    /// Volatile store, used when opening the on-disk database fails and in
    /// tests. Behaves identically apart from durability.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory state store")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS app_state (
                slot TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create app_state table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Load the value stored under `slot`, or `default` when the slot is
    /// absent or its contents do not parse. Stored snapshots are untrusted
    /// input: a present-but-mismatched value also yields `default`.
    pub fn load<T: DeserializeOwned>(&self, slot: &str, default: T) -> T {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        let raw: Option<String> = match conn
            .query_row(
                "SELECT value FROM app_state WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read slot '{}': {}", slot, e);
                return default;
            }
        };
        let Some(raw) = raw else {
            tracing::debug!("Slot '{}' is empty, using default", slot);
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Slot '{}' holds a malformed value ({}), using default", slot, e);
                default
            }
        }
    }

    /// Best-effort durable write. Failures (quota, locked file, serialization)
    /// are logged and swallowed.
    pub fn save<T: Serialize>(&self, slot: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize slot '{}': {}", slot, e);
                return;
            }
        };
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = conn.execute(
            "INSERT INTO app_state (slot, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![slot, raw, Utc::now().to_rfc3339()],
        ) {
            tracing::warn!("Failed to persist slot '{}': {}", slot, e);
        }
    }

    pub fn clear(&self, slot: &str) {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = conn.execute("DELETE FROM app_state WHERE slot = ?1", params![slot]) {
            tracing::warn!("Failed to clear slot '{}': {}", slot, e);
        }
    }
}
