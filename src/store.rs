// 🗄️ Storage - key-value persistence + audit trail
//
// Values are JSON strings under a handful of fixed keys. SQLite in WAL mode
// for the app, an in-memory map for tests.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const FUNDS_KEY: &str = "funds";
pub const LAST_SAVED_KEY: &str = "lastSavedDate";
pub const GOALS_KEY: &str = "goals";

// ============================================================================
// EVENT (audit trail)
// ============================================================================

/// Every change is an event
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value.to_string())])
    }

    /// Write every entry or none of them
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()>;

    fn append_event(&mut self, event: &Event) -> Result<()>;

    /// Most recent first
    fn recent_events(&self, limit: usize) -> Result<Vec<Event>>;
}

// ============================================================================
// MEMORY STORE
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    events: Vec<Event>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write fail (to exercise error paths)
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("write rejected for {} key(s)", entries.len()));
        }
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    fn append_event(&mut self, event: &Event) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("event write rejected"));
        }
        self.events.push(event.clone());
        Ok(())
    }

    fn recent_events(&self, limit: usize) -> Result<Vec<Event>> {
        Ok(self.events.iter().rev().take(limit).cloned().collect())
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Events for a specific entity, most recent first
    pub fn events_for_entity(&self, entity_type: &str, entity_id: &str) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
             FROM events
             WHERE entity_type = ?1 AND entity_id = ?2
             ORDER BY id DESC",
        )?;

        let events = stmt
            .query_map(params![entity_type, entity_id], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery (in-memory databases answer "memory")
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let timestamp_str: String = row.get(1)?;
    let data_json: String = row.get(5)?;

    Ok(Event {
        event_id: row.get(0)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|_| rusqlite::Error::InvalidQuery)?
            .with_timezone(&Utc),
        event_type: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        data: serde_json::from_str(&data_json).map_err(|_| rusqlite::Error::InvalidQuery)?,
        actor: row.get(6)?,
    })
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read key '{}'", key))?;

        Ok(value)
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        // Dropping the transaction without commit rolls everything back
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .with_context(|| format!("Failed to write key '{}'", key))?;
        }
        tx.commit().context("Failed to commit write")?;

        Ok(())
    }

    fn append_event(&mut self, event: &Event) -> Result<()> {
        let data_json = serde_json::to_string(&event.data)?;

        self.conn.execute(
            "INSERT INTO events (
                event_id, timestamp, event_type, entity_type, entity_id, data, actor
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.event_id,
                event.timestamp.to_rfc3339(),
                event.event_type,
                event.entity_type,
                event.entity_id,
                data_json,
                event.actor,
            ],
        )?;

        Ok(())
    }

    fn recent_events(&self, limit: usize) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
             FROM events
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let events = stmt
            .query_map([limit as i64], row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_get_set() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        assert_eq!(store.get(GOALS_KEY).unwrap(), None);

        store.set(GOALS_KEY, "[]").unwrap();
        store.set(GOALS_KEY, "[{\"x\":1}]").unwrap();

        assert_eq!(store.get(GOALS_KEY).unwrap().as_deref(), Some("[{\"x\":1}]"));
    }

    #[test]
    fn test_sqlite_set_many_writes_pair() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        store
            .set_many(&[
                (FUNDS_KEY, "{\"gym\":1.0}".to_string()),
                (LAST_SAVED_KEY, "2025-03-01".to_string()),
            ])
            .unwrap();

        assert!(store.get(FUNDS_KEY).unwrap().is_some());
        assert_eq!(store.get(LAST_SAVED_KEY).unwrap().as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_sqlite_set_many_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.set(FUNDS_KEY, "old").unwrap();

        // Writing the last-saved date fails from here on
        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER reject_date BEFORE INSERT ON kv
                 WHEN NEW.key = 'lastSavedDate'
                 BEGIN SELECT RAISE(ABORT, 'no'); END;",
            )
            .unwrap();

        let result = store.set_many(&[
            (FUNDS_KEY, "new".to_string()),
            (LAST_SAVED_KEY, "2025-03-01".to_string()),
        ]);

        assert!(result.is_err());
        assert_eq!(store.get(FUNDS_KEY).unwrap().as_deref(), Some("old"));
        assert_eq!(store.get(LAST_SAVED_KEY).unwrap(), None);
    }

    #[test]
    fn test_event_log() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        for i in 0..3 {
            let event = Event::new(
                "goal_deposit",
                "goal",
                "goal_123",
                serde_json::json!({ "amount": i }),
                "test_actor",
            );
            store.append_event(&event).unwrap();
        }
        store
            .append_event(&Event::new("funds_deposited", "funds", "funds", serde_json::json!({}), "test_actor"))
            .unwrap();

        let events = store.events_for_entity("goal", "goal_123").unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].data["amount"], 2);
        assert_eq!(events[0].actor, "test_actor");

        let recent = store.recent_events(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].event_type, "funds_deposited");
    }

    #[test]
    fn test_memory_store_failure_switch() {
        let mut store = MemoryStore::new();
        store.set(GOALS_KEY, "[]").unwrap();

        store.set_fail_writes(true);
        assert!(store.set(GOALS_KEY, "[1]").is_err());
        assert_eq!(store.get(GOALS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_open_file_database() {
        let path = std::env::temp_dir().join(format!("savings-{}.db", uuid::Uuid::new_v4()));

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set(GOALS_KEY, "[]").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get(GOALS_KEY).unwrap().as_deref(), Some("[]"));

        drop(store);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
