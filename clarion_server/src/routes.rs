use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use clarion_core::{AssembledVerdict, TrendingItem};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::{AppState, ServerError};

type AppStateArc = Arc<AppState>;

#[derive(Debug, Serialize)]
struct Success<T> {
    status: &'static str,
    data: T,
}

impl<T> Success<T> {
    const fn new(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FactCheckRequest {
    pub claim: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    pub country: Option<String>,
}

pub fn api_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(health))
        .route("/api/trending", get(trending))
        .route("/trending", get(trending))
        .route("/api/fact-check", post(fact_check))
        .route("/fact-check", post(fact_check))
}

async fn health() -> Json<Value> {
    Json(json!({
        "message": "Project Clarion API is running",
        "status": "healthy",
    }))
}

async fn trending(
    State(state): State<AppStateArc>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Success<Vec<TrendingItem>>>, ServerError> {
    let country = params
        .country
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.trending_country.clone());
    info!("Trending requested for {country}");

    let items = state
        .trending
        .trending(&country, state.trending_max_results)
        .await?;
    Ok(Success::new(items))
}

async fn fact_check(
    State(state): State<AppStateArc>,
    payload: Result<Json<FactCheckRequest>, JsonRejection>,
) -> Result<Json<Success<AssembledVerdict>>, ServerError> {
    let Json(request) = payload?;
    let claim = request.claim.trim();
    if claim.is_empty() {
        return Err(ServerError::BadRequest("Claim must not be empty".to_string()));
    }
    info!("Fact-check requested: {claim:?}");

    let cancel = state.shutdown.child_token();
    let verdict = state.assembler.assemble(claim, &cancel).await;
    Ok(Success::new(verdict))
}
