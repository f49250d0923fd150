//! SQLite-backed reminder storage.

use crate::error::{AssistantError, Result};
use chrono::NaiveTime;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// A stored reminder.
#[derive(Debug, Clone)]
pub struct Reminder {
    /// Row id.
    pub id: i64,
    /// Announcement time in `HH:MM`.
    pub time: String,
    /// Message spoken when the reminder fires.
    pub message: String,
    /// Whether the reminder repeats every day.
    pub repeat_daily: bool,
    /// Timestamp of the last announcement, if any.
    pub last_announced: Option<String>,
}

/// Reminder store over a SQLite database.
///
/// The connection is owned by a single task (the scheduler); the store
/// does no internal locking.
pub struct ReminderStore {
    conn: Connection,
}

impl ReminderStore {
    /// Open (creating if needed) the store at the given path.
    ///
    /// # Errors
    ///
    /// Returns a store error if the database cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| AssistantError::Store(format!("cannot open {}: {e}", path.display())))?;
        let store = Self { conn };
        store.init()?;
        info!("reminder store ready: {}", path.display());
        Ok(store)
    }

    /// Open an in-memory store (tests).
    ///
    /// # Errors
    ///
    /// Returns a store error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AssistantError::Store(format!("cannot open in-memory db: {e}")))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS reminders (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    time TEXT NOT NULL,
                    message TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    repeat_daily INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    last_announced TEXT
                );",
            )
            .map_err(|e| AssistantError::Store(format!("cannot create schema: {e}")))
    }

    /// Add a reminder. `time` must be `HH:MM` (24-hour).
    ///
    /// # Errors
    ///
    /// Returns a store error for a malformed time or a failed insert.
    pub fn add(&self, time: &str, message: &str, repeat_daily: bool) -> Result<i64> {
        if NaiveTime::parse_from_str(time, "%H:%M").is_err() {
            return Err(AssistantError::Store(format!(
                "invalid reminder time '{time}', expected HH:MM"
            )));
        }
        if message.trim().is_empty() {
            return Err(AssistantError::Store("reminder message is empty".into()));
        }

        self.conn
            .execute(
                "INSERT INTO reminders (time, message, repeat_daily) VALUES (?1, ?2, ?3)",
                rusqlite::params![time, message, repeat_daily],
            )
            .map_err(|e| AssistantError::Store(format!("insert failed: {e}")))?;

        let id = self.conn.last_insert_rowid();
        info!("added reminder {id}: {time} - {message}");
        Ok(id)
    }

    /// All active reminders, ordered by time.
    ///
    /// # Errors
    ///
    /// Returns a store error on query failure.
    pub fn active(&self) -> Result<Vec<Reminder>> {
        self.query(
            "SELECT id, time, message, repeat_daily, last_announced
             FROM reminders WHERE is_active = 1 ORDER BY time",
            [],
        )
    }

    /// Active reminders due at the given `HH:MM`.
    ///
    /// One-shot reminders that have already been announced are excluded.
    ///
    /// # Errors
    ///
    /// Returns a store error on query failure.
    pub fn due(&self, now_hhmm: &str) -> Result<Vec<Reminder>> {
        self.query(
            "SELECT id, time, message, repeat_daily, last_announced
             FROM reminders
             WHERE is_active = 1
               AND time = ?1
               AND (repeat_daily = 1 OR last_announced IS NULL)
             ORDER BY id",
            [now_hhmm],
        )
    }

    /// Record that a reminder was just announced.
    ///
    /// # Errors
    ///
    /// Returns a store error on update failure.
    pub fn mark_announced(&self, id: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE reminders SET last_announced = CURRENT_TIMESTAMP WHERE id = ?1",
                [id],
            )
            .map_err(|e| AssistantError::Store(format!("update failed: {e}")))?;
        Ok(())
    }

    /// Soft-delete a reminder. Returns whether a row was affected.
    ///
    /// # Errors
    ///
    /// Returns a store error on update failure.
    pub fn deactivate(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("UPDATE reminders SET is_active = 0 WHERE id = ?1", [id])
            .map_err(|e| AssistantError::Store(format!("update failed: {e}")))?;
        Ok(changed > 0)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| AssistantError::Store(format!("prepare failed: {e}")))?;

        let rows = stmt
            .query_map(params, |row| {
                Ok(Reminder {
                    id: row.get(0)?,
                    time: row.get(1)?,
                    message: row.get(2)?,
                    repeat_daily: row.get(3)?,
                    last_announced: row.get(4)?,
                })
            })
            .map_err(|e| AssistantError::Store(format!("query failed: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| AssistantError::Store(format!("row read failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn add_and_list_reminders() {
        let store = ReminderStore::open_in_memory().unwrap();
        store.add("08:00", "Time for your morning medicine", true).unwrap();
        store.add("12:30", "Lunch time", true).unwrap();

        let all = store.active().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].time, "08:00");
        assert_eq!(all[1].time, "12:30");
    }

    #[test]
    fn invalid_time_is_rejected() {
        let store = ReminderStore::open_in_memory().unwrap();
        assert!(store.add("25:00", "bad hour", true).is_err());
        assert!(store.add("8am", "bad format", true).is_err());
        assert!(store.add("08:00", "   ", true).is_err());
    }

    #[test]
    fn due_matches_exact_minute() {
        let store = ReminderStore::open_in_memory().unwrap();
        store.add("08:00", "morning", true).unwrap();
        store.add("20:00", "evening", true).unwrap();

        let due = store.due("08:00").unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message, "morning");
        assert!(store.due("09:00").unwrap().is_empty());
    }

    #[test]
    fn one_shot_reminder_fires_once() {
        let store = ReminderStore::open_in_memory().unwrap();
        let id = store.add("08:00", "doctor appointment", false).unwrap();

        assert_eq!(store.due("08:00").unwrap().len(), 1);
        store.mark_announced(id).unwrap();
        assert!(store.due("08:00").unwrap().is_empty());
    }

    #[test]
    fn daily_reminder_keeps_firing_after_announcement() {
        let store = ReminderStore::open_in_memory().unwrap();
        let id = store.add("08:00", "medicine", true).unwrap();

        store.mark_announced(id).unwrap();
        assert_eq!(store.due("08:00").unwrap().len(), 1);
    }

    #[test]
    fn deactivated_reminders_are_hidden() {
        let store = ReminderStore::open_in_memory().unwrap();
        let id = store.add("08:00", "medicine", true).unwrap();

        assert!(store.deactivate(id).unwrap());
        assert!(store.active().unwrap().is_empty());
        assert!(store.due("08:00").unwrap().is_empty());
        assert!(!store.deactivate(9999).unwrap());
    }
}
