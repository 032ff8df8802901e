//! SQLite-backed event and claim log stores.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reward_types::{
    ClaimLog, ClaimLogStore, ClaimLogStoreError, ClaimOutcome, Event, EventStore, EventStoreError,
    ProcessResult, RejectReason, UpdateEventRequest,
};
use std::path::Path;

// Fixed-width UTC timestamps at full precision: TEXT order matches time order
// and values read back equal the ones written.
fn ts(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_ts(idx: usize, s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn parse_json(idx: usize, s: &str) -> Result<serde_json::Value, rusqlite::Error> {
    serde_json::from_str(s).map_err(|e| conversion_err(idx, e))
}

#[derive(Debug)]
struct BadColumn(String);

impl std::fmt::Display for BadColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BadColumn {}

fn open(path: impl AsRef<Path>, schema: &str) -> Result<rusqlite::Connection, String> {
    let conn = rusqlite::Connection::open(path).map_err(|e| e.to_string())?;
    conn.execute_batch(schema).map_err(|e| e.to_string())?;
    Ok(conn)
}

const EVENT_COLUMNS: &str = "id, description, desired_condition, reward, start_date, end_date, is_enabled, created_by, created_at, updated_at";

/// SQLite-backed EventStore.
pub struct SqliteEventStore {
    conn: std::sync::Mutex<rusqlite::Connection>,
}

impl SqliteEventStore {
    /// Open (or create) the store at `path`. `":memory:"` gives a private in-memory database.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, EventStoreError> {
        let conn = open(
            path,
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                desired_condition TEXT NOT NULL,
                reward TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                is_enabled INTEGER NOT NULL,
                created_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_created ON events(created_at);
            "#,
        )
        .map_err(EventStoreError::Other)?;
        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, EventStoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EventStoreError::Other(format!("failed to acquire lock: {}", e)))?;
        f(&conn).map_err(|e| EventStoreError::Other(e.to_string()))
    }

    fn row_to_event(row: &rusqlite::Row<'_>) -> Result<Event, rusqlite::Error> {
        let desired_condition: String = row.get(2)?;
        let reward: String = row.get(3)?;
        let start_date: String = row.get(4)?;
        let end_date: String = row.get(5)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;
        Ok(Event {
            id: row.get(0)?,
            description: row.get(1)?,
            desired_condition: parse_json(2, &desired_condition)?,
            reward: parse_json(3, &reward)?,
            start_date: parse_ts(4, &start_date)?,
            end_date: parse_ts(5, &end_date)?,
            is_enabled: row.get(6)?,
            created_by: row.get(7)?,
            created_at: parse_ts(8, &created_at)?,
            updated_at: parse_ts(9, &updated_at)?,
        })
    }

    fn get_in(conn: &rusqlite::Connection, id: &str) -> Result<Option<Event>, rusqlite::Error> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS))?;
        let mut rows = stmt.query_map(rusqlite::params![id], Self::row_to_event)?;
        rows.next().transpose()
    }

    fn write_in(conn: &rusqlite::Connection, sql: &str, event: &Event) -> Result<usize, rusqlite::Error> {
        let condition = serde_json::to_string(&event.desired_condition)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let reward = serde_json::to_string(&event.reward)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        conn.execute(
            sql,
            rusqlite::params![
                event.id,
                event.description,
                condition,
                reward,
                ts(&event.start_date),
                ts(&event.end_date),
                event.is_enabled,
                event.created_by,
                ts(&event.created_at),
                ts(&event.updated_at),
            ],
        )
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn insert(&self, event: Event) -> Result<(), EventStoreError> {
        self.with_conn(|conn| {
            Self::write_in(
                conn,
                "INSERT INTO events (id, description, desired_condition, reward, start_date, end_date, is_enabled, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                &event,
            )
        })?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Event>, EventStoreError> {
        self.with_conn(|conn| Self::get_in(conn, id))
    }

    async fn list_all(&self) -> Result<Vec<Event>, EventStoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM events ORDER BY created_at DESC, id ASC",
                EVENT_COLUMNS
            ))?;
            let rows = stmt.query_map([], Self::row_to_event)?;
            rows.collect()
        })
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventStoreError> {
        let now = ts(&now);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM events WHERE is_enabled = 1 AND start_date <= ?1 AND end_date >= ?1 ORDER BY created_at DESC, id ASC",
                EVENT_COLUMNS
            ))?;
            let rows = stmt.query_map(rusqlite::params![now], Self::row_to_event)?;
            rows.collect()
        })
    }

    async fn update(
        &self,
        id: &str,
        patch: &UpdateEventRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, EventStoreError> {
        let checked = self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let Some(mut event) = Self::get_in(&tx, id)? else {
                return Ok(Ok(None));
            };
            patch.apply(&mut event, now);
            if let Err(reason) = event.check() {
                return Ok(Err(reason));
            }
            Self::write_in(
                &tx,
                "UPDATE events SET description = ?2, desired_condition = ?3, reward = ?4, start_date = ?5, end_date = ?6, is_enabled = ?7, created_by = ?8, created_at = ?9, updated_at = ?10 WHERE id = ?1",
                &event,
            )?;
            tx.commit()?;
            Ok(Ok(Some(event)))
        })?;
        checked.map_err(EventStoreError::Invalid)
    }
}

/// SQLite-backed ClaimLogStore. Rows are only ever inserted.
pub struct SqliteClaimLogStore {
    conn: std::sync::Mutex<rusqlite::Connection>,
}

impl SqliteClaimLogStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ClaimLogStoreError> {
        let conn = open(
            path,
            r#"
            CREATE TABLE IF NOT EXISTS claim_logs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                event_id TEXT NOT NULL,
                process_result TEXT NOT NULL,
                rejected_reason TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_claim_logs_user ON claim_logs(user_id);
            CREATE INDEX IF NOT EXISTS idx_claim_logs_created ON claim_logs(created_at);
            "#,
        )
        .map_err(ClaimLogStoreError::Other)?;
        Ok(Self {
            conn: std::sync::Mutex::new(conn),
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, ClaimLogStoreError>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ClaimLogStoreError::Other(format!("failed to acquire lock: {}", e)))?;
        f(&conn).map_err(|e| ClaimLogStoreError::Other(e.to_string()))
    }

    fn row_to_log(row: &rusqlite::Row<'_>) -> Result<ClaimLog, rusqlite::Error> {
        let result: String = row.get(3)?;
        let reason: Option<String> = row.get(4)?;
        let created_at: String = row.get(5)?;
        let result = result.parse::<ProcessResult>().map_err(|e| conversion_err(3, BadColumn(e)))?;
        let reason = reason
            .map(|r| r.parse::<RejectReason>().map_err(|e| conversion_err(4, BadColumn(e))))
            .transpose()?;
        let outcome = ClaimOutcome::from_parts(result, reason).ok_or_else(|| {
            conversion_err(4, BadColumn("rejected_reason does not match process_result".to_string()))
        })?;
        Ok(ClaimLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            event_id: row.get(2)?,
            outcome,
            created_at: parse_ts(5, &created_at)?,
        })
    }
}

#[async_trait]
impl ClaimLogStore for SqliteClaimLogStore {
    async fn append(&self, log: ClaimLog) -> Result<(), ClaimLogStoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO claim_logs (id, user_id, event_id, process_result, rejected_reason, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    log.id,
                    log.user_id,
                    log.event_id,
                    log.process_result().as_str(),
                    log.rejected_reason().map(|r| r.as_str()),
                    ts(&log.created_at),
                ],
            )
        })?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ClaimLog>, ClaimLogStoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, event_id, process_result, rejected_reason, created_at FROM claim_logs ORDER BY created_at DESC, seq DESC",
            )?;
            let rows = stmt.query_map([], Self::row_to_log)?;
            rows.collect()
        })
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ClaimLog>, ClaimLogStoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, event_id, process_result, rejected_reason, created_at FROM claim_logs WHERE user_id = ?1 ORDER BY created_at DESC, seq DESC",
            )?;
            let rows = stmt.query_map(rusqlite::params![user_id], Self::row_to_log)?;
            rows.collect()
        })
    }
}
