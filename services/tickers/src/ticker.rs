//! Ticker operations: check, reserve, register, cancel, lookup and listing

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::Instrument as _;

use crate::api::AppState;
use crate::error::{RegistryError, RegistryResult};
use crate::record::{TickerRecord, normalize};
use crate::service::{Availability, Outcome, RegistryStats};

/// Create router for ticker endpoints
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/ticker/check/{symbol}", get(check_ticker))
        .route("/ticker/reserve", post(reserve_ticker))
        .route("/ticker/register", post(register_ticker))
        .route("/ticker/cancel", post(cancel_reservation))
        .route("/ticker/info/{symbol}", get(ticker_info))
        .route("/ticker/search", get(search_tickers))
        .route("/ticker/all", get(all_tickers))
}

#[derive(Debug, Serialize)]
struct CheckResponse {
    symbol: String,
    #[serde(flatten)]
    availability: Availability,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReserveRequest {
    symbol: String,
    creator_wallet: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    symbol: String,
    collection_name: String,
    collection_address: String,
    creator_wallet: String,
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<TickerRecord>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct AllResponse {
    tickers: Vec<TickerRecord>,
    stats: RegistryStats,
}

/// Refused claims are conflicts; the body is the same either way.
fn outcome_response(outcome: Outcome) -> Response {
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(outcome)).into_response()
}

/// GET /ticker/check/{symbol}
async fn check_ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> RegistryResult<Json<CheckResponse>> {
    let availability = state.service.check_availability(&symbol).await?;
    Ok(Json(CheckResponse {
        symbol: normalize(&symbol),
        availability,
    }))
}

/// POST /ticker/reserve
async fn reserve_ticker(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> RegistryResult<Response> {
    let outcome = state
        .service
        .reserve_ticker(&request.symbol, &request.creator_wallet)
        .await?;
    Ok(outcome_response(outcome))
}

/// POST /ticker/register
///
/// On success the record is also sent to the mirror, if one is configured,
/// without waiting for it.
async fn register_ticker(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> RegistryResult<Response> {
    let outcome = state
        .service
        .register_ticker(
            &request.symbol,
            &request.collection_name,
            &request.collection_address,
            &request.creator_wallet,
        )
        .await?;

    if let (Some(mirror), Some(record)) = (state.mirror.clone(), outcome.record().cloned()) {
        let span = tracing::info_span!("mirror", mirror = mirror.name(), symbol = %record.symbol);
        tokio::spawn(
            async move {
                match mirror.register(&record).await {
                    Ok(()) => tracing::debug!("Mirrored registration"),
                    Err(error) => tracing::warn!(%error, "Mirror registration failed"),
                }
            }
            .instrument(span),
        );
    }

    Ok(outcome_response(outcome))
}

/// POST /ticker/cancel
async fn cancel_reservation(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> RegistryResult<Json<CancelResponse>> {
    let success = state
        .service
        .cancel_reservation(&request.symbol, &request.creator_wallet)
        .await?;
    Ok(Json(CancelResponse { success }))
}

/// GET /ticker/info/{symbol}
async fn ticker_info(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> RegistryResult<Json<TickerRecord>> {
    match state.service.ticker_info(&symbol).await? {
        Some(record) => Ok(Json(record)),
        None => Err(RegistryError::TickerNotFound(normalize(&symbol))),
    }
}

/// GET /ticker/search?q=
async fn search_tickers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> RegistryResult<Json<SearchResponse>> {
    let results = state.service.search_tickers(&query.q).await?;
    Ok(Json(SearchResponse {
        query: query.q,
        count: results.len(),
        results,
    }))
}

/// GET /ticker/all
async fn all_tickers(State(state): State<AppState>) -> RegistryResult<Json<AllResponse>> {
    let tickers = state.service.all_tickers().await?;
    let stats = state.service.get_stats().await?;
    Ok(Json(AllResponse { tickers, stats }))
}
