//! Connection bootstrap utilities for the tracer store.
//!
//! # Responsibility
//! - Open writable file or in-memory stores and migrate them.
//! - Open read-only connections for trace requests.
//! - Configure pragmas and geometry functions required by region queries.
//!
//! # Invariants
//! - Writable connections have `foreign_keys=ON` and migrations applied.
//! - Read-only connections never create, migrate or journal-switch a store.

use super::functions::register_geometry_functions;
use super::migrations::{apply_migrations, latest_version, schema_version};
use super::{DbError, DbResult};
use log::{debug, error};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the store file and applies pending migrations.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path), configure_writable(true))
}

/// Opens an in-memory store and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory, configure_writable(false))
}

/// Opens an existing, fully migrated store for reading.
///
/// Called once per request, so success is logged at `debug`.
///
/// # Errors
/// - SQLite open error when the file does not exist.
/// - `DbError::SchemaBehind` when the store was never bootstrapped.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    bootstrap(
        "read_only",
        || Connection::open_with_flags(path, flags),
        configure_read_only,
    )
}

fn bootstrap(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
    configure: impl FnOnce(&mut Connection) -> DbResult<()>,
) -> DbResult<Connection> {
    let started_at = Instant::now();

    let mut conn = open().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={err}",
            started_at.elapsed().as_millis()
        );
        err
    })?;

    if let Err(err) = configure(&mut conn) {
        error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
            started_at.elapsed().as_millis()
        );
        return Err(err);
    }

    debug!(
        "event=db_open module=db status=ok mode={mode} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn configure_writable(use_wal: bool) -> impl FnOnce(&mut Connection) -> DbResult<()> {
    move |conn: &mut Connection| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        if use_wal {
            // Readers keep working while the indexer rewrites the store.
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
        }
        register_geometry_functions(conn)?;
        apply_migrations(conn)?;
        Ok(())
    }
}

fn configure_read_only(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let db_version = schema_version(conn)?;
    let latest = latest_version();
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }
    if db_version < latest {
        return Err(DbError::SchemaBehind {
            db_version,
            expected: latest,
        });
    }
    register_geometry_functions(conn)?;
    Ok(())
}
