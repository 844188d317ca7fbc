//! Core domain types for sic bo outcome prediction

use serde::Serialize;

/// Classification of a round's total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Total 4-10
    Low,
    /// Total 11-17
    High,
    /// Total 3 or 18 (triple territory, rare)
    Edge,
    /// Anything else (malformed upstream data)
    Unknown,
}

impl Category {
    /// Classify a round total
    pub fn from_total(total: u8) -> Self {
        match total {
            4..=10 => Category::Low,
            11..=17 => Category::High,
            3 | 18 => Category::Edge,
            _ => Category::Unknown,
        }
    }

    /// The binary side of this category, if it has one
    pub fn side(self) -> Option<Side> {
        match self {
            Category::Low => Some(Side::Low),
            Category::High => Some(Side::High),
            Category::Edge | Category::Unknown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Low => "low",
            Category::High => "high",
            Category::Edge => "edge",
            Category::Unknown => "unknown",
        }
    }
}

/// The binary call the engine predicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Low,
    High,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Low => Side::High,
            Side::High => Side::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Low => "low",
            Side::High => "high",
        }
    }
}

/// A single predictor's verdict on the next round.
///
/// Abstention is a first-class value, not an error: every heuristic
/// returns `NoOpinion` when its data is insufficient or its internal
/// vote is tied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opinion {
    Low,
    High,
    NoOpinion,
}

impl Opinion {
    pub fn side(self) -> Option<Side> {
        match self {
            Opinion::Low => Some(Side::Low),
            Opinion::High => Some(Side::High),
            Opinion::NoOpinion => None,
        }
    }
}

impl From<Side> for Opinion {
    fn from(side: Side) -> Self {
        match side {
            Side::Low => Opinion::Low,
            Side::High => Opinion::High,
        }
    }
}

/// Fixed two-bucket vote accumulator keyed by [`Side`].
///
/// Replaces ad-hoc sparse maps for transition and vote tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideTally {
    pub low: f64,
    pub high: f64,
}

impl SideTally {
    pub fn add(&mut self, side: Side, weight: f64) {
        match side {
            Side::Low => self.low += weight,
            Side::High => self.high += weight,
        }
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Low => self.low,
            Side::High => self.high,
        }
    }

    pub fn total(&self) -> f64 {
        self.low + self.high
    }

    /// The side with the strictly larger bucket; `None` on a tie
    pub fn majority(&self) -> Option<Side> {
        if self.high > self.low {
            Some(Side::High)
        } else if self.low > self.high {
            Some(Side::Low)
        } else {
            None
        }
    }
}

/// One settled round from the upstream feed. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    /// Upstream round id, strictly increasing across the history
    pub session: u64,
    pub dice: [u8; 3],
    pub total: u8,
    pub category: Category,
}

impl OutcomeRecord {
    pub fn from_parts(session: u64, dice: [u8; 3], total: u8) -> Self {
        Self {
            session,
            dice,
            total,
            category: Category::from_total(total),
        }
    }
}

/// The engine's current call for the next round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub side: Side,
    /// In [0.51, 0.99], or exactly 0.5 when every predictor abstained
    pub confidence: f64,
    /// Three most likely totals within the predicted side's domain,
    /// most likely first
    pub magnitude: [u8; 3],
}
