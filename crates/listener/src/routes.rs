//! HTTP handlers.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use intake::SUCCESS_MESSAGE;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{client::client_key, response::SuccessBody, ApiError, AppState};

/// `POST /api/contact`
///
/// The body is read raw so that malformed JSON is reported through the same
/// validation response as a wrongly-shaped object, after the rate check.
pub async fn submit_contact(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessBody>, ApiError> {
    let client = client_key(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        state.trust_forwarded_for,
    );
    let payload = parse_payload(&body);

    let receipt = state.intake.submit(&client, &payload).await?;
    debug!(
        submission_id = %receipt.submission_id,
        delivered_at = %receipt.delivered_at.to_iso8601(),
        "contact submission accepted"
    );

    Ok(Json(SuccessBody::new(SUCCESS_MESSAGE)))
}

fn parse_payload(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "request body is not valid JSON");
        Value::Null
    })
}
