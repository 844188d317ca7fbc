//! HTTP prediction API.
//!
//! Read-only presenter over the prediction manager: the poll loop owns
//! every mutation, handlers only take read locks and format. All label
//! and percentage formatting lives here; the engine exposes only the
//! side enum and a raw confidence float.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::EnsembleConfig;
use crate::engine::PredictionManager;
use crate::types::{OutcomeRecord, Prediction};


/// Number of rounds exposed by the history endpoint
const HISTORY_LIMIT: usize = 200;

pub struct AppState {
    pub manager: RwLock<PredictionManager>,
}

impl AppState {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            manager: RwLock::new(PredictionManager::new(config)),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/predict", get(predict))
        .route("/api/history", get(history))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PredictResponse {
    previous_session: Option<u64>,
    dice: Option<[u8; 3]>,
    total: Option<u8>,
    outcome: Option<&'static str>,
    next_session: Option<u64>,
    prediction: String,
    magnitude: String,
    confidence: String,
    generated_at: DateTime<Utc>,
}

fn predict_response(
    latest: Option<&OutcomeRecord>,
    prediction: Option<&Prediction>,
) -> PredictResponse {
    let (prediction_label, magnitude, confidence) = match prediction {
        Some(p) => (
            p.side.label().to_string(),
            p.magnitude.map(|t| t.to_string()).join("-"),
            format!("{:.0}%", p.confidence * 100.0),
        ),
        None => ("waiting for data".to_string(), "n/a".to_string(), "0%".to_string()),
    };

    PredictResponse {
        previous_session: latest.map(|r| r.session),
        dice: latest.map(|r| r.dice),
        total: latest.map(|r| r.total),
        outcome: latest.map(|r| r.category.label()),
        next_session: latest.map(|r| r.session + 1),
        prediction: prediction_label,
        magnitude,
        confidence,
        generated_at: Utc::now(),
    }
}

async fn predict(State(state): State<Arc<AppState>>) -> Json<PredictResponse> {
    let manager = state.manager.read().await;
    let prediction = manager.current_prediction();
    Json(predict_response(manager.latest(), prediction.as_ref()))
}

async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<OutcomeRecord>> {
    let manager = state.manager.read().await;
    let rounds = manager.history();
    let newest_first: Vec<OutcomeRecord> = rounds
        .iter()
        .rev()
        .take(HISTORY_LIMIT)
        .copied()
        .collect();
    Json(newest_first)
}
