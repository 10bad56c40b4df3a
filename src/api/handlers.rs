use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::enricher::BatchEnricher;
use crate::error::ValidationError;

use super::models::{WebApiRequest, WebApiResponse};

pub async fn search_handler(
    State(enricher): State<Arc<BatchEnricher>>,
    body: Bytes,
) -> Result<Json<WebApiResponse>, (StatusCode, String)> {
    let start = Instant::now();

    // Anything that does not decode is the same schema failure as a `null` body.
    let request: Option<WebApiRequest> = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::warn!("undecodable request body: {}", e);
        None
    });

    // Cancels in-flight searches if the caller goes away and this future is dropped.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let response = enricher
        .process(request, &cancel)
        .await
        .map_err(bad_request)?;

    tracing::info!(
        records = response.values.len(),
        processing_time_ms = %start.elapsed().as_millis(),
        "batch complete"
    );
    Ok(Json(response))
}

pub async fn health_handler() -> &'static str {
    "ok"
}

fn bad_request(e: ValidationError) -> (StatusCode, String) {
    tracing::warn!("rejected request: {}", e);
    (StatusCode::BAD_REQUEST, e.to_string())
}
