//! Orchestrator owning the live history, the ensemble and the cached
//! prediction.
//!
//! The manager is the only component the feed and the HTTP presenter
//! talk to. Callers must serialize `load_initial`/`push_record`; the
//! history and weight table are mutated in place and are not safe under
//! concurrent mutation.

use super::ensemble::EnsembleWeighting;
use super::magnitude::predict_magnitude;
use super::panel::default_panel;
use crate::config::EnsembleConfig;
use crate::types::{Category, OutcomeRecord, Prediction};

/// Rounds skipped before the online-update replay starts
const REPLAY_START: usize = 10;
/// Minimum non-Edge prefix required before a live online update
const MIN_UPDATE_PREFIX: usize = 3;

pub struct PredictionManager {
    history: Vec<OutcomeRecord>,
    ensemble: EnsembleWeighting,
    prediction: Option<Prediction>,
}

impl PredictionManager {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            history: Vec::new(),
            ensemble: EnsembleWeighting::new(default_panel(), config),
            prediction: None,
        }
    }

    /// Adopt a full history: calibrate weights, replay online updates
    /// across the loaded rounds, then cache the first prediction.
    /// Empty input is a no-op.
    pub fn load_initial(&mut self, records: Vec<OutcomeRecord>) {
        if records.is_empty() {
            return;
        }
        self.history = records;
        self.ensemble.fit_initial(&self.history);

        let filtered: Vec<OutcomeRecord> = self
            .history
            .iter()
            .filter(|r| r.category != Category::Edge)
            .copied()
            .collect();
        for i in REPLAY_START..filtered.len() {
            self.ensemble
                .update_with_outcome(&filtered[..i], filtered[i].category);
        }

        self.refresh();
        tracing::info!(rounds = self.history.len(), "history loaded, engine ready");
        self.log_prediction();
    }

    /// Append one realized round, adapt the weights against it, and
    /// re-cache the prediction.
    pub fn push_record(&mut self, record: OutcomeRecord) {
        self.history.push(record);

        let prefix: Vec<OutcomeRecord> = self.history[..self.history.len() - 1]
            .iter()
            .filter(|r| r.category != Category::Edge)
            .copied()
            .collect();
        if prefix.len() >= MIN_UPDATE_PREFIX {
            self.ensemble.update_with_outcome(&prefix, record.category);
        }

        self.refresh();
        tracing::info!(
            session = record.session,
            outcome = record.category.label(),
            "round settled"
        );
        self.log_prediction();
    }

    /// The cached prediction; never recomputes on read
    pub fn current_prediction(&self) -> Option<Prediction> {
        self.prediction
    }

    pub fn latest(&self) -> Option<&OutcomeRecord> {
        self.history.last()
    }

    pub fn history(&self) -> &[OutcomeRecord] {
        &self.history
    }

    /// (id, weight) pairs of the live weight table
    pub fn weight_table(&self) -> Vec<(&'static str, f64)> {
        self.ensemble
            .predictor_ids()
            .into_iter()
            .zip(self.ensemble.weights().iter().copied())
            .collect()
    }

    fn refresh(&mut self) {
        let (side, confidence) = self.ensemble.predict(&self.history);
        let magnitude = predict_magnitude(&self.history, side);
        self.prediction = Some(Prediction {
            side,
            confidence,
            magnitude,
        });
    }

    fn log_prediction(&self) {
        if let (Some(prediction), Some(last)) = (&self.prediction, self.history.last()) {
            tracing::info!(
                next_session = last.session + 1,
                call = prediction.side.label(),
                confidence = prediction.confidence,
                magnitude = ?prediction.magnitude,
                "prediction updated"
            );
        }
    }
}
