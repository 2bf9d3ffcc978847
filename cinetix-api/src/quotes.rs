use axum::{extract::State, routing::post, Json, Router};

use cinetix_pricing::{PriceQuoteRequest, PriceQuoteResponse};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/quotes", post(calculate_quote))
}

/// POST /v1/quotes
/// Price a prospective basket without touching seat state.
async fn calculate_quote(
    State(state): State<AppState>,
    Json(req): Json<PriceQuoteRequest>,
) -> Result<Json<PriceQuoteResponse>, AppError> {
    let quote = state.pricing.calculate_quote(&req).await?;
    Ok(Json(quote))
}
