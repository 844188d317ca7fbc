//! Sic Bo Outcome Prediction Service
//!
//! Polls an upstream results feed, learns from the outcome history, and
//! serves a prediction for the next round over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! Feed (poll) → PredictionManager ──────────────→ HTTP API (axum)
//!                    │
//!                    ├─ FeatureExtractor (runs, entropy, totals)
//!                    ├─ PredictorPanel (8 heuristics)
//!                    ├─ EnsembleWeighting (calibrated + online EMA)
//!                    └─ MagnitudePredictor (ranked total triple)
//! ```
//!
//! The engine is synchronous and deterministic; all state lives in
//! memory and is rebuilt from the feed history on restart.

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod server;
pub mod types;
