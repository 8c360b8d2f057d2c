//! Schema migrations for the canvas/curation store.
//!
//! # Responsibility
//! - Register schema steps for `canvases`, `curations` and
//!   `curation_elements` in strictly increasing order.
//! - Bring a connection up to the latest schema inside one transaction.
//!
//! # Invariants
//! - Step versions are monotonic and never reused.
//! - The applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, Transaction};

/// One schema step, applied at most once per database.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the newest schema version this build understands.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Applies every pending schema step on the provided connection.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer
///   build; nothing is modified in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let recorded = schema_version(conn)?;
    let latest = latest_version();

    if recorded > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: latest,
        });
    }
    if recorded == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > recorded)
        .try_for_each(|step| apply_step(&tx, step))?;
    tx.commit()?;

    Ok(())
}

fn apply_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    Ok(())
}
