//! Store refresh jobs.
//!
//! # Responsibility
//! - Define the job seam the serving layer schedules periodically.
//! - Run the external indexer against the store.
//!
//! # Invariants
//! - A job shares nothing with request handling but the store file.
//! - A job blocks until the indexer exits.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::Command;

/// Environment variable carrying the store path to the indexer program.
pub const DB_PATH_ENV: &str = "TRACER_DB_PATH";

/// Refresh run failure.
#[derive(Debug)]
pub enum RefreshError {
    Spawn { program: String, source: std::io::Error },
    ExitStatus { program: String, code: Option<i32> },
    Failed(String),
}

impl Display for RefreshError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn { program, source } => {
                write!(f, "failed to start indexer `{program}`: {source}")
            }
            Self::ExitStatus { program, code } => match code {
                Some(code) => write!(f, "indexer `{program}` exited with status {code}"),
                None => write!(f, "indexer `{program}` was terminated by a signal"),
            },
            Self::Failed(message) => write!(f, "refresh failed: {message}"),
        }
    }
}

impl Error for RefreshError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One store refresh job.
pub trait StoreRefresher: Send + 'static {
    fn refresh(&mut self) -> Result<(), RefreshError>;
}

impl<F> StoreRefresher for F
where
    F: FnMut() -> Result<(), RefreshError> + Send + 'static,
{
    fn refresh(&mut self) -> Result<(), RefreshError> {
        self()
    }
}

/// Runs an external indexer program that rewrites the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRefresher {
    program: String,
    args: Vec<String>,
    db_path: PathBuf,
}

impl CommandRefresher {
    /// Builds a refresher from `argv`; `None` when `argv` is empty.
    pub fn from_argv(argv: &[String], db_path: impl Into<PathBuf>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            db_path: db_path.into(),
        })
    }
}

impl StoreRefresher for CommandRefresher {
    fn refresh(&mut self) -> Result<(), RefreshError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .env(DB_PATH_ENV, &self.db_path)
            .status()
            .map_err(|source| RefreshError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RefreshError::ExitStatus {
                program: self.program.clone(),
                code: status.code(),
            })
        }
    }
}
