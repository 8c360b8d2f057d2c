//! Curation store access.
//!
//! The store is written by the external indexer and by the one-time
//! bootstrap at startup. Trace requests only ever read it.
//!
//! # Invariants
//! - The schema generation lives in `PRAGMA user_version`.
//! - Every connection handed out can evaluate `area_within(...)`.
//! - Read-only connections require a store already at the latest schema.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod functions;
pub mod migrations;
mod open;

pub use functions::AREA_WITHIN_FN;
pub use open::{open_db, open_db_in_memory, open_db_read_only};

pub type DbResult<T> = Result<T, DbError>;

/// Store open or schema failure.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The store was written by a newer tracer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A read-only open found a store that was never bootstrapped.
    SchemaBehind { db_version: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "curation store: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "curation store uses schema {db_version}, this build reads up to {latest_supported}"
            ),
            Self::SchemaBehind {
                db_version,
                expected,
            } => write!(
                f,
                "curation store is at schema {db_version}, expected {expected}; bootstrap it first"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
