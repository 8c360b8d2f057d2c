//! HTTP route handlers and router configuration.

use crate::error::ServerError;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Uri};
use axum::routing::get;
use axum::{Json, Router};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracer_core::{AppContext, CurationDocument, TraceRequest};

/// Build the application router.
pub fn build_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(trace))
        .route("/health", get(health))
        .with_state(context)
}

#[derive(Debug, Deserialize)]
pub struct TraceParams {
    canvas: Option<String>,
    xywh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: tracer_core::core_version(),
    })
}

/// `GET /?canvas=<uri>&xywh=<x,y,w,h>`
async fn trace(
    State(context): State<Arc<AppContext>>,
    headers: HeaderMap,
    uri: Uri,
    Query(params): Query<TraceParams>,
) -> Result<Json<CurationDocument>, ServerError> {
    let base_url = request_base_url(&context, &headers, &uri);
    let request_url = match uri.query() {
        Some(query) => format!("{base_url}?{query}"),
        None => base_url.clone(),
    };
    let request = TraceRequest {
        // Tolerates canvas URIs that were encoded twice by the caller.
        canvas: params
            .canvas
            .map(|canvas| percent_decode_str(&canvas).decode_utf8_lossy().into_owned()),
        xywh: params.xywh,
        request_url,
        base_url,
    };

    let document = tokio::task::spawn_blocking(move || context.trace(&request))
        .await
        .map_err(|err| ServerError::TaskFailed(err.to_string()))??;
    Ok(Json(document))
}

/// Scheme, host and path of the request, without query string.
fn request_base_url(context: &AppContext, headers: &HeaderMap, uri: &Uri) -> String {
    if let Some(public) = context.public_base_url() {
        return public.to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost");
    let scheme = uri.scheme_str().unwrap_or("http");
    format!("{scheme}://{host}{}", uri.path())
}
