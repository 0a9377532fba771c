//! SQLite persistence shared by the task store and the reminder outbox.
//!
//! # Responsibility
//! - Hand out connections whose schema carries `kv_entries` (the task list
//!   and deleted history as JSON values) and `reminder_outbox`.
//! - Surface schema drift, failed schema steps and poisoned connection locks
//!   as `DbError`.
//!
//! # Invariants
//! - A connection is handed out only once its schema is current.
//! - A file written by a newer LifeAlign build is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was last written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// One schema step failed; nothing from that upgrade run was kept.
    SchemaStep {
        version: u32,
        file: &'static str,
        source: rusqlite::Error,
    },
    /// A connection mutex was poisoned by a panicking writer.
    Poisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "lifealign database is at schema {db_version}, this build reads up to {latest_supported}"
            ),
            Self::SchemaStep {
                version,
                file,
                source,
            } => write!(f, "schema step {version} ({file}) failed: {source}"),
            Self::Poisoned => write!(f, "lifealign database connection lock poisoned"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::SchemaStep { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Poisoned => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
