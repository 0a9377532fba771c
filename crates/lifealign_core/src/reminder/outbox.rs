//! Durable reminder outbox backed by SQLite.
//!
//! # Responsibility
//! - Persist arranged reminders in `reminder_outbox` so a platform notifier
//!   (or the CLI `due` command) can deliver them later.
//!
//! # Invariants
//! - One row per outstanding handle; voiding or delivering deletes the row.
//! - `fire_at` is stored as `%Y-%m-%dT%H:%M:%S`, so text order is time order.

use crate::db::DbError;
use crate::model::reminder::{ReminderHandle, ReminderInstant};
use crate::reminder::facility::{FacilityError, FacilityResult, ReminderFacility};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::info;
use rusqlite::{params, Connection};
use std::sync::Mutex;
use uuid::Uuid;

const FIRE_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DUE_SQL: &str = "SELECT handle, fire_at, message FROM reminder_outbox
     WHERE fire_at <= ?1
     ORDER BY fire_at ASC, handle ASC;";

/// Reminder facility that writes to a SQLite outbox table.
pub struct SqliteReminderOutbox {
    conn: Mutex<Connection>,
}

impl SqliteReminderOutbox {
    /// Wraps a migrated connection from `db::open_db`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Outstanding reminders with `fire_at <= now`, earliest first. Rows stay
    /// in the outbox; see `take_due` for delivery.
    pub fn due(&self, now: NaiveDateTime) -> FacilityResult<Vec<(ReminderHandle, ReminderInstant)>> {
        let conn = self.lock()?;
        query_rows(&conn, DUE_SQL, Some(now))
    }

    /// Removes and returns every reminder with `fire_at <= now`, earliest
    /// first. Each row is handed out once; the owning task keeps the handle,
    /// so reminder actions and later voids still resolve it.
    pub fn take_due(
        &self,
        now: NaiveDateTime,
    ) -> FacilityResult<Vec<(ReminderHandle, ReminderInstant)>> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let delivered = query_rows(&tx, DUE_SQL, Some(now))?;
        for (handle, _) in &delivered {
            tx.execute(
                "DELETE FROM reminder_outbox WHERE handle = ?1;",
                [handle.as_str()],
            )?;
        }
        tx.commit()?;

        info!(
            "event=reminder_deliver module=outbox status=ok delivered={}",
            delivered.len()
        );
        Ok(delivered)
    }

    /// Every outstanding reminder, earliest first.
    pub fn pending(&self) -> FacilityResult<Vec<(ReminderHandle, ReminderInstant)>> {
        let conn = self.lock()?;
        query_rows(
            &conn,
            "SELECT handle, fire_at, message FROM reminder_outbox
             ORDER BY fire_at ASC, handle ASC;",
            None,
        )
    }

    fn lock(&self) -> FacilityResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FacilityError::Db(DbError::Poisoned))
    }
}

fn query_rows(
    conn: &Connection,
    sql: &str,
    bound: Option<NaiveDateTime>,
) -> FacilityResult<Vec<(ReminderHandle, ReminderInstant)>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match bound {
        Some(now) => stmt.query([now.format(FIRE_AT_FORMAT).to_string()])?,
        None => stmt.query([])?,
    };

    let mut reminders = Vec::new();
    while let Some(row) = rows.next()? {
        let handle: String = row.get("handle")?;
        let fire_at_text: String = row.get("fire_at")?;
        let fire_at = NaiveDateTime::parse_from_str(&fire_at_text, FIRE_AT_FORMAT).map_err(|_| {
            FacilityError::Rejected(format!(
                "invalid fire_at `{fire_at_text}` in reminder_outbox.fire_at"
            ))
        })?;
        reminders.push((
            ReminderHandle::new(handle),
            ReminderInstant {
                fire_at,
                message: row.get("message")?,
            },
        ));
    }
    Ok(reminders)
}

#[async_trait]
impl ReminderFacility for SqliteReminderOutbox {
    async fn arrange(
        &self,
        fire_at: NaiveDateTime,
        message: &str,
    ) -> FacilityResult<ReminderHandle> {
        let handle = ReminderHandle::new(format!("outbox-{}", Uuid::new_v4()));
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reminder_outbox (handle, fire_at, message) VALUES (?1, ?2, ?3);",
            params![
                handle.as_str(),
                fire_at.format(FIRE_AT_FORMAT).to_string(),
                message
            ],
        )?;
        Ok(handle)
    }

    async fn void(&self, handle: &ReminderHandle) -> FacilityResult<()> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM reminder_outbox WHERE handle = ?1;",
            [handle.as_str()],
        )?;
        if removed == 0 {
            info!("event=reminder_void module=outbox status=skip reason=unknown_handle");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteReminderOutbox;
    use crate::db::open_db_in_memory;
    use crate::reminder::facility::ReminderFacility;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn arranged_rows_are_listed_until_voided() {
        let outbox = SqliteReminderOutbox::new(open_db_in_memory().unwrap());
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let nine = day.and_hms_opt(9, 0, 0).unwrap();
        let ten = day.and_hms_opt(10, 0, 0).unwrap();

        let first = outbox.arrange(ten, "later").await.unwrap();
        let second = outbox.arrange(nine, "sooner").await.unwrap();

        let pending = outbox.pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].0, second);
        assert_eq!(pending[0].1.message, "sooner");

        let due = outbox.due(nine).unwrap();
        assert_eq!(due.len(), 1);

        outbox.void(&first).await.unwrap();
        outbox.void(&first).await.unwrap();
        assert_eq!(outbox.pending().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn taken_reminders_are_delivered_once() {
        let outbox = SqliteReminderOutbox::new(open_db_in_memory().unwrap());
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let eight = day.and_hms_opt(8, 0, 0).unwrap();
        let nine = day.and_hms_opt(9, 0, 0).unwrap();
        let noon = day.and_hms_opt(12, 0, 0).unwrap();

        let early = outbox.arrange(eight, "early").await.unwrap();
        let on_time = outbox.arrange(nine, "on time").await.unwrap();
        let later = outbox.arrange(noon, "later").await.unwrap();

        let delivered = outbox.take_due(nine).unwrap();
        let handles: Vec<_> = delivered.iter().map(|(handle, _)| handle.clone()).collect();
        assert_eq!(handles, vec![early.clone(), on_time]);
        assert_eq!(delivered[0].1.message, "early");

        assert!(outbox.take_due(nine).unwrap().is_empty());
        let pending = outbox.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, later);

        outbox.void(&early).await.unwrap();
        assert_eq!(outbox.pending().unwrap().len(), 1);
    }
}
