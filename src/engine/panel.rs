//! The predictor panel: eight independent, stateless heuristics.
//!
//! Every predictor receives the full raw history and internally derives
//! the Edge-filtered category sequence. All of them are total functions:
//! insufficient data or a tied internal vote yields `Opinion::NoOpinion`,
//! never a failure.

use std::collections::HashMap;

use super::features::{category_sequence, extract_features, similarity};
use crate::types::{Category, Opinion, OutcomeRecord, SideTally};

/// Uniform contract for a panel heuristic
pub trait Heuristic: Send + Sync {
    /// Stable identifier for logging and weight inspection
    fn id(&self) -> &'static str;

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion;
}

/// The fixed panel, assembled once at startup. Order is part of the
/// weight-table layout and must stay stable.
pub fn default_panel() -> Vec<Box<dyn Heuristic>> {
    vec![
        Box::new(FreqRebalance),
        Box::new(Markov),
        Box::new(Ngram),
        Box::new(NeoPattern),
        Box::new(SuperDeepAnalysis),
        Box::new(Transformer),
        Box::new(SuperBridge),
        Box::new(AdaptiveMarkov),
    ]
}

/// Minority call when one side's count leads by more than 2.
///
/// Also serves as the ensemble's fallback when every predictor abstains.
pub fn freq_rebalance(history: &[OutcomeRecord]) -> Opinion {
    let mut low = 0usize;
    let mut high = 0usize;
    for category in category_sequence(history) {
        match category {
            Category::Low => low += 1,
            Category::High => high += 1,
            _ => {}
        }
    }
    if high > low + 2 {
        Opinion::Low
    } else if low > high + 2 {
        Opinion::High
    } else {
        Opinion::NoOpinion
    }
}

pub struct FreqRebalance;

impl Heuristic for FreqRebalance {
    fn id(&self) -> &'static str {
        "freq_rebalance"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        freq_rebalance(history)
    }
}

/// Transition table keyed by the trailing `order`-window, looked up for
/// the live window. `None` when the sequence is too short or the window
/// was never seen.
fn markov_lookup(seq: &[Category], order: usize) -> Option<SideTally> {
    if seq.len() < order + 1 {
        return None;
    }
    let mut table: HashMap<&[Category], SideTally> = HashMap::new();
    for i in 0..=seq.len() - order - 1 {
        if let Some(next) = seq[i + order].side() {
            table.entry(&seq[i..i + order]).or_default().add(next, 1.0);
        }
    }
    table.get(&seq[seq.len() - order..]).copied()
}

/// Order-3 Markov chain over the category sequence
pub struct Markov;

impl Markov {
    const ORDER: usize = 3;
}

impl Heuristic for Markov {
    fn id(&self) -> &'static str {
        "markov"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        let seq = category_sequence(history);
        match markov_lookup(&seq, Self::ORDER).and_then(|t| t.majority()) {
            Some(side) => side.into(),
            None => Opinion::NoOpinion,
        }
    }
}

/// Exact-repeat matching of the trailing 4-gram
pub struct Ngram;

impl Ngram {
    const ORDER: usize = 4;
}

impl Heuristic for Ngram {
    fn id(&self) -> &'static str {
        "ngram"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        let seq = category_sequence(history);
        let k = Self::ORDER;
        if seq.len() < k + 1 {
            return Opinion::NoOpinion;
        }
        let tail = &seq[seq.len() - k..];
        let mut tally = SideTally::default();
        for i in 0..=seq.len() - k - 1 {
            if &seq[i..i + k] == tail {
                if let Some(next) = seq[i + k].side() {
                    tally.add(next, 1.0);
                }
            }
        }
        match tally.majority() {
            Some(side) => side.into(),
            None => Opinion::NoOpinion,
        }
    }
}

/// Fuzzy pattern matching: tallies successors of past windows at least
/// 75% similar to the trailing window, trying lengths 4 and 6 and
/// keeping the length with the larger usable tally.
pub struct NeoPattern;

impl NeoPattern {
    const MIN_SAMPLES: usize = 20;
    const PATTERN_LENGTHS: [usize; 2] = [4, 6];
    const MIN_SIMILARITY: f64 = 0.75;
}

impl Heuristic for NeoPattern {
    fn id(&self) -> &'static str {
        "neo_pattern"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        let seq = category_sequence(history);
        let len = seq.len();
        if len < Self::MIN_SAMPLES {
            return Opinion::NoOpinion;
        }

        let mut best = Opinion::NoOpinion;
        let mut max_matches = -1.0f64;
        for pat_len in Self::PATTERN_LENGTHS {
            if len < pat_len * 2 + 1 {
                continue;
            }
            let tail = &seq[len - pat_len..];
            let mut tally = SideTally::default();
            for i in 0..=len - pat_len - 1 {
                if similarity(&seq[i..i + pat_len], tail) >= Self::MIN_SIMILARITY {
                    if let Some(next) = seq[i + pat_len].side() {
                        tally.add(next, 1.0);
                    }
                }
            }
            if let Some(side) = tally.majority() {
                if tally.total() > max_matches {
                    max_matches = tally.total();
                    best = side.into();
                }
            }
        }
        best
    }
}

/// Total-mean and entropy analysis over a long window
pub struct SuperDeepAnalysis;

impl SuperDeepAnalysis {
    const MIN_SAMPLES: usize = 70;
    const RECENT_WINDOW: usize = 20;
}

impl Heuristic for SuperDeepAnalysis {
    fn id(&self) -> &'static str {
        "super_deep_analysis"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        if history.len() < Self::MIN_SAMPLES {
            return Opinion::NoOpinion;
        }
        let features = extract_features(history);
        let recent_start = features.totals.len().saturating_sub(Self::RECENT_WINDOW);
        let recent_avg =
            super::features::mean(features.totals[recent_start..].iter().map(|&t| f64::from(t)));

        if recent_avg > 13.0 && features.mean_total > 11.5 {
            return Opinion::High;
        }
        if recent_avg < 8.0 && features.mean_total < 10.5 {
            return Opinion::Low;
        }
        // High entropy: bet against the most recent category
        if features.entropy > 0.98 {
            if let Some(last) = features.categories.last().and_then(|c| c.side()) {
                return last.opposite().into();
            }
        }
        Opinion::NoOpinion
    }
}

/// Similarity-weighted voting over trailing 10-windows, with recency
/// scaling: closer matches to the end of the history count more.
pub struct Transformer;

impl Transformer {
    const MIN_SAMPLES: usize = 100;
    const WINDOW: usize = 10;
    const MIN_SIMILARITY: f64 = 0.6;
}

impl Heuristic for Transformer {
    fn id(&self) -> &'static str {
        "transformer"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        let seq = category_sequence(history);
        let len = seq.len();
        if len < Self::MIN_SAMPLES {
            return Opinion::NoOpinion;
        }

        let tail = &seq[len - Self::WINDOW..];
        let mut tally = SideTally::default();
        let mut total_weight = 0.0;
        for i in 0..=len - Self::WINDOW - 1 {
            let score = similarity(&seq[i..i + Self::WINDOW], tail);
            if score > Self::MIN_SIMILARITY {
                let weight = score * (1.0 / (len - i) as f64);
                if let Some(next) = seq[i + Self::WINDOW].side() {
                    tally.add(next, weight);
                }
                total_weight += weight;
            }
        }
        if total_weight > 0.0 {
            if let Some(side) = tally.majority() {
                return side.into();
            }
        }
        Opinion::NoOpinion
    }
}

/// Run-length ("bridge") reading: ride a streak of 4+, fade a strictly
/// alternating stretch.
pub struct SuperBridge;

impl Heuristic for SuperBridge {
    fn id(&self) -> &'static str {
        "super_bridge"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        let features = extract_features(history);
        let runs = &features.runs;
        if runs.len() < 2 {
            return Opinion::NoOpinion;
        }
        let last = runs[runs.len() - 1];
        let Some(last_side) = last.category.side() else {
            return Opinion::NoOpinion;
        };

        if last.len >= 4 {
            return last_side.into();
        }
        if runs.len() >= 4 {
            let alternating = runs[runs.len() - 4..].iter().all(|r| r.len == 1);
            if alternating || last.len >= 6 {
                return last_side.opposite().into();
            }
        }
        Opinion::NoOpinion
    }
}

/// Markov over orders 2-4, keeping the order with the most decisive
/// lookup.
pub struct AdaptiveMarkov;

impl AdaptiveMarkov {
    const MIN_SAMPLES: usize = 20;
    const ORDERS: std::ops::RangeInclusive<usize> = 2..=4;
}

impl Heuristic for AdaptiveMarkov {
    fn id(&self) -> &'static str {
        "adaptive_markov"
    }

    fn evaluate(&self, history: &[OutcomeRecord]) -> Opinion {
        let seq = category_sequence(history);
        if seq.len() < Self::MIN_SAMPLES {
            return Opinion::NoOpinion;
        }

        let mut best = Opinion::NoOpinion;
        let mut max_confidence = -1.0f64;
        for order in Self::ORDERS {
            let Some(tally) = markov_lookup(&seq, order) else {
                continue;
            };
            let Some(side) = tally.majority() else {
                continue;
            };
            let confidence = (tally.high - tally.low).abs() / tally.total();
            if confidence > max_confidence {
                max_confidence = confidence;
                best = side.into();
            }
        }
        best
    }
}
