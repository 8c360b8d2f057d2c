//! Application context shared by request handlers.
//!
//! # Responsibility
//! - Hold everything a trace needs besides the request itself: settings,
//!   the query token generator and the store location.
//! - Bootstrap the store once at startup.
//! - Open a fresh read-only store connection per trace.
//!
//! # Invariants
//! - Built once at startup and only read afterwards.
//! - Request handling never writes to the store.

use crate::config::TracerConfig;
use crate::db::{open_db, open_db_read_only, DbResult};
use crate::model::document::CurationDocument;
use crate::refresh::CommandRefresher;
use crate::repo::canvas_repo::{RepoError, SqliteCanvasRepository};
use crate::service::document_builder::DocumentSettings;
use crate::service::identifier::QueryTokenGenerator;
use crate::service::trace_service::{
    log_trace_outcome, TraceError, TraceRequest, TraceResult, TraceService,
};
use log::info;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Read-only state handed to every trace.
#[derive(Debug, Clone)]
pub struct AppContext {
    db_path: PathBuf,
    crawl_interval: Duration,
    crawl_command: Option<Vec<String>>,
    public_base_url: Option<String>,
    settings: DocumentSettings,
    tokens: QueryTokenGenerator,
}

impl AppContext {
    pub fn new(config: &TracerConfig) -> Self {
        let tokens = if config.stable_identifiers {
            QueryTokenGenerator::fixed()
        } else {
            QueryTokenGenerator::per_process()
        };
        Self {
            db_path: config.db_path.clone(),
            crawl_interval: Duration::from_secs(config.crawl_interval_hours * SECONDS_PER_HOUR),
            crawl_command: config.crawl_command.clone(),
            public_base_url: config.public_base_url.clone(),
            settings: config.document_settings(),
            tokens,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.public_base_url.as_deref()
    }

    pub fn tokens(&self) -> &QueryTokenGenerator {
        &self.tokens
    }

    pub fn crawl_interval(&self) -> Duration {
        self.crawl_interval
    }

    /// Creates the store file if needed and applies pending migrations.
    ///
    /// Runs once before serving; traces only open the store read-only.
    pub fn bootstrap_store(&self) -> DbResult<()> {
        open_db(&self.db_path)?;
        info!(
            "event=store_bootstrap module=context status=ok db_path={}",
            self.db_path.display()
        );
        Ok(())
    }

    /// Runs one trace on a read-only connection opened for this call.
    ///
    /// Parameters are validated before the store is opened; rejected
    /// requests are logged like any other trace outcome.
    pub fn trace(&self, request: &TraceRequest) -> TraceResult<CurationDocument> {
        let started_at = Instant::now();
        if let Err(err) = request.validate() {
            let rejected: TraceResult<CurationDocument> = Err(err);
            log_trace_outcome(&rejected, started_at);
            return rejected;
        }

        let conn = match open_db_read_only(&self.db_path) {
            Ok(conn) => conn,
            Err(err) => {
                let failed: TraceResult<CurationDocument> =
                    Err(TraceError::Repo(RepoError::from(err)));
                log_trace_outcome(&failed, started_at);
                return failed;
            }
        };
        let service = TraceService::new(
            SqliteCanvasRepository::new(&conn),
            &self.tokens,
            &self.settings,
        );
        service.trace(request)
    }

    /// Indexer job for the refresh schedule; `None` without a crawl command.
    pub fn refresh_job(&self) -> Option<CommandRefresher> {
        let job = self
            .crawl_command
            .as_deref()
            .and_then(|argv| CommandRefresher::from_argv(argv, &self.db_path));
        if job.is_none() {
            info!("event=refresh_schedule module=refresh status=disabled reason=no_crawl_command");
        }
        job
    }
}
