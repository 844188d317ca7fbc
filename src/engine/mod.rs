//! The prediction engine.
//!
//! Data flows one way through the core:
//!
//! ```text
//! raw records → features → predictor panel → weighted ensemble
//!                                   → categorical winner → magnitude → Prediction
//! ```
//!
//! Everything here is synchronous, bounded and deterministic; the
//! [`manager::PredictionManager`] at the top is the single entry point
//! for the feed and the HTTP presenter.

pub mod ensemble;
pub mod features;
pub mod magnitude;
pub mod manager;
pub mod panel;

#[cfg(test)]
mod tests;

pub use ensemble::EnsembleWeighting;
pub use features::{extract_features, FeatureSet, Run};
pub use magnitude::predict_magnitude;
pub use manager::PredictionManager;
pub use panel::{default_panel, Heuristic};
