//! Adaptively weighted ensemble over the predictor panel.
//!
//! One scalar weight per predictor. Calibration replays the historical
//! window and scores each predictor's hit count; online adaptation nudges
//! weights after every realized round with an EMA toward a
//! reward-scaled target. The weighting scheme is deliberately ad-hoc and
//! is preserved as-is rather than replaced with a calibrated model.

use super::panel::{freq_rebalance, Heuristic};
use crate::config::EnsembleConfig;
use crate::types::{Category, OutcomeRecord, Side, SideTally};

pub struct EnsembleWeighting {
    panel: Vec<Box<dyn Heuristic>>,
    weights: Vec<f64>,
    ema_alpha: f64,
    min_weight: f64,
    history_window: usize,
}

impl EnsembleWeighting {
    /// New ensemble with uniform weight 1 per predictor
    pub fn new(panel: Vec<Box<dyn Heuristic>>, config: &EnsembleConfig) -> Self {
        let weights = vec![1.0; panel.len()];
        Self {
            panel,
            weights,
            ema_alpha: config.ema_alpha,
            min_weight: config.min_weight,
            history_window: config.history_window,
        }
    }

    /// Current weight table, aligned with the panel order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn predictor_ids(&self) -> Vec<&'static str> {
        self.panel.iter().map(|a| a.id()).collect()
    }

    /// Calibrate weights by replaying the trailing window of the
    /// Edge-filtered history. Each prefix is fed to every predictor and
    /// a hit is scored when its opinion matches the realized category.
    /// Final weights are Laplace-smoothed hit counts, normalized, then
    /// floored at `min_weight`.
    pub fn fit_initial(&mut self, history: &[OutcomeRecord]) {
        let filtered: Vec<OutcomeRecord> = history
            .iter()
            .filter(|r| r.category != Category::Edge)
            .copied()
            .collect();
        let start = filtered.len().saturating_sub(self.history_window);
        let window = &filtered[start..];
        if window.len() < 10 {
            return;
        }

        let mut hits = vec![0u32; self.panel.len()];
        for i in 3..window.len() {
            let Some(actual) = window[i].category.side() else {
                continue;
            };
            let prefix = &window[..i];
            for (idx, alg) in self.panel.iter().enumerate() {
                if alg.evaluate(prefix).side() == Some(actual) {
                    hits[idx] += 1;
                }
            }
        }

        let total: f64 = hits.iter().map(|&h| f64::from(h) + 1.0).sum();
        for (weight, &h) in self.weights.iter_mut().zip(&hits) {
            *weight = ((f64::from(h) + 1.0) / total).max(self.min_weight);
        }
        tracing::info!(
            predictors = self.panel.len(),
            replayed = window.len(),
            "calibrated ensemble weights"
        );
    }

    /// Online adaptation after one realized round. `prefix` is the
    /// Edge-filtered history preceding it. Edge outcomes are skipped
    /// entirely; they train nothing.
    pub fn update_with_outcome(&mut self, prefix: &[OutcomeRecord], actual: Category) {
        if actual == Category::Edge {
            return;
        }
        let actual_side = actual.side();

        for (idx, alg) in self.panel.iter().enumerate() {
            let correct = actual_side.is_some() && alg.evaluate(prefix).side() == actual_side;
            let reward = if correct { 1.05 } else { 0.95 };
            let current = self.weights[idx];
            let target = current * reward;
            let updated = self.ema_alpha * target + (1.0 - self.ema_alpha) * current;
            self.weights[idx] = updated.max(self.min_weight);
        }

        let sum: f64 = self.weights.iter().sum();
        let sum = if sum > 0.0 { sum } else { 1.0 };
        for weight in &mut self.weights {
            *weight /= sum;
        }
    }

    /// Weighted vote across the panel. Abstentions contribute nothing.
    /// When every predictor abstains, falls back to the
    /// frequency-rebalance rule (default High) at confidence 0.5;
    /// otherwise confidence is the winner's share of the cast weight,
    /// clamped to [0.51, 0.99].
    pub fn predict(&self, history: &[OutcomeRecord]) -> (Side, f64) {
        let mut votes = SideTally::default();
        for (idx, alg) in self.panel.iter().enumerate() {
            if let Some(side) = alg.evaluate(history).side() {
                votes.add(side, self.weights[idx]);
            }
        }

        if votes.total() <= 0.0 {
            let side = freq_rebalance(history).side().unwrap_or(Side::High);
            return (side, 0.5);
        }

        // Equal buckets resolve toward High, same as the abstain default
        let winner = votes.majority().unwrap_or(Side::High);
        let confidence = (votes.get(winner) / votes.total()).clamp(0.51, 0.99);
        (winner, confidence)
    }
}
