//! Trace use-case: canvas query in, curation document out.
//!
//! # Responsibility
//! - Run validate -> resolve canvas -> match -> aggregate -> build.
//! - Map failures to client, not-found and store errors.
//!
//! # Invariants
//! - The first failing step aborts; no partial document is returned.
//! - Data anomalies are logged and never abort the pipeline.

use crate::model::document::CurationDocument;
use crate::model::geometry::{Rect, RectParseError};
use crate::repo::canvas_repo::{CanvasRepository, RepoError};
use crate::service::backlink_aggregator::aggregate_backlinks;
use crate::service::document_builder::{build_document, DocumentInput, DocumentSettings};
use crate::service::identifier::QueryTokenGenerator;
use crate::service::region_matcher::{match_regions, resolve_canvas};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type TraceResult<T> = Result<T, TraceError>;

/// Trace pipeline failure.
#[derive(Debug)]
pub enum TraceError {
    /// `canvas` parameter missing or empty.
    MissingCanvas,
    /// `xywh` present but not four non-negative integers.
    InvalidArea(RectParseError),
    /// Canvas URI not registered in the store.
    CanvasNotFound(String),
    /// Store connection or query failure.
    Repo(RepoError),
}

impl TraceError {
    /// Whether the caller sent a bad request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingCanvas | Self::InvalidArea(_))
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MissingCanvas => "missing_canvas",
            Self::InvalidArea(_) => "invalid_area",
            Self::CanvasNotFound(_) => "canvas_not_found",
            Self::Repo(_) => "store_failed",
        }
    }
}

impl Display for TraceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCanvas => write!(f, "missing required parameter `canvas`"),
            Self::InvalidArea(err) => write!(f, "{err}"),
            Self::CanvasNotFound(uri) => write!(f, "canvas not found: {uri}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TraceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArea(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::MissingCanvas | Self::CanvasNotFound(_) => None,
        }
    }
}

impl From<RepoError> for TraceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RectParseError> for TraceError {
    fn from(value: RectParseError) -> Self {
        Self::InvalidArea(value)
    }
}

/// One incoming trace query, already decoded by the serving layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceRequest {
    /// Canvas URI; `None` or empty is a client error.
    pub canvas: Option<String>,
    /// Raw `x,y,w,h`; `None` or empty means the whole canvas.
    pub xywh: Option<String>,
    /// Canonical request URL, query string included.
    pub request_url: String,
    /// Request URL without query string.
    pub base_url: String,
}

/// Validated form of a [`TraceRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrace<'a> {
    pub canvas_uri: &'a str,
    pub area: Option<Rect>,
}

impl TraceRequest {
    /// Checks parameters without touching the store.
    pub fn validate(&self) -> TraceResult<ValidatedTrace<'_>> {
        let canvas_uri = self
            .canvas
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or(TraceError::MissingCanvas)?;
        let area = match self.xywh.as_deref() {
            Some(raw) if !raw.is_empty() => Some(Rect::parse_xywh(raw)?),
            _ => None,
        };
        Ok(ValidatedTrace { canvas_uri, area })
    }
}

/// Trace facade over a canvas repository.
pub struct TraceService<'a, R: CanvasRepository> {
    repo: R,
    tokens: &'a QueryTokenGenerator,
    settings: &'a DocumentSettings,
}

impl<'a, R: CanvasRepository> TraceService<'a, R> {
    pub fn new(repo: R, tokens: &'a QueryTokenGenerator, settings: &'a DocumentSettings) -> Self {
        Self {
            repo,
            tokens,
            settings,
        }
    }

    /// Runs the full pipeline for `request`.
    ///
    /// Emits one `trace_request` event with status and duration.
    pub fn trace(&self, request: &TraceRequest) -> TraceResult<CurationDocument> {
        let started_at = Instant::now();
        let result = self.run(request);
        log_trace_outcome(&result, started_at);
        result
    }

    fn run(&self, request: &TraceRequest) -> TraceResult<CurationDocument> {
        let query = request.validate()?;
        let canvas = resolve_canvas(&self.repo, query.canvas_uri)?;
        let regions = match_regions(&self.repo, &canvas, query.area.as_ref())?;
        let groups = aggregate_backlinks(regions);

        let token = self.tokens.token(&request.request_url);
        let input = DocumentInput {
            canvas_uri: query.canvas_uri,
            manifest_uri: &canvas.manifest_jsonld_id,
            request_url: &request.request_url,
            base_url: &request.base_url,
            token: &token,
        };
        Ok(build_document(&input, groups, self.settings))
    }
}

/// Emits the `trace_request` event for a finished or rejected trace.
pub(crate) fn log_trace_outcome(result: &TraceResult<CurationDocument>, started_at: Instant) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(document) => info!(
            "event=trace_request module=trace status=ok duration_ms={} annotations={}",
            duration_ms,
            document.annotation_count()
        ),
        Err(err) if matches!(err, TraceError::Repo(_)) => error!(
            "event=trace_request module=trace status=error duration_ms={} error_code={} error={}",
            duration_ms,
            err.code(),
            err
        ),
        Err(err) => info!(
            "event=trace_request module=trace status=rejected duration_ms={} error_code={}",
            duration_ms,
            err.code()
        ),
    }
}
