//! Feature extraction over the outcome history
//!
//! Pure functions of a history slice: same input always yields the same
//! bundle, empty input yields zero/degenerate values rather than errors.
//! Edge rounds are dropped before any sequence is derived; they stay in
//! the raw history but are invisible to every predictor.

use crate::types::{Category, OutcomeRecord};

/// A maximal sub-sequence of consecutive equal categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub category: Category,
    pub len: usize,
}

/// Per-category frequency counts over the Edge-filtered sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub low: usize,
    pub high: usize,
    pub unknown: usize,
}

/// Derived feature bundle, recomputed on demand and never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    /// Edge-filtered category sequence
    pub categories: Vec<Category>,
    /// Totals of the same filtered rounds
    pub totals: Vec<u8>,
    pub freq: CategoryCounts,
    pub runs: Vec<Run>,
    pub max_run_len: usize,
    pub mean_total: f64,
    /// Population standard deviation of the filtered totals
    pub std_total: f64,
    /// Shannon entropy (base 2) of the category distribution
    pub entropy: f64,
}

/// Edge-filtered category sequence of a history slice
pub fn category_sequence(history: &[OutcomeRecord]) -> Vec<Category> {
    history
        .iter()
        .filter(|r| r.category != Category::Edge)
        .map(|r| r.category)
        .collect()
}

pub fn extract_features(history: &[OutcomeRecord]) -> FeatureSet {
    let filtered: Vec<&OutcomeRecord> = history
        .iter()
        .filter(|r| r.category != Category::Edge)
        .collect();
    let categories: Vec<Category> = filtered.iter().map(|r| r.category).collect();
    let totals: Vec<u8> = filtered.iter().map(|r| r.total).collect();

    let mut freq = CategoryCounts::default();
    for category in &categories {
        match category {
            Category::Low => freq.low += 1,
            Category::High => freq.high += 1,
            _ => freq.unknown += 1,
        }
    }

    let runs = segment_runs(&categories);
    let max_run_len = runs.iter().map(|r| r.len).max().unwrap_or(0);

    let mean_total = mean(totals.iter().map(|&t| f64::from(t)));
    let std_total = mean(totals.iter().map(|&t| (f64::from(t) - mean_total).powi(2))).sqrt();
    let entropy = entropy(&freq, categories.len());

    FeatureSet {
        categories,
        totals,
        freq,
        runs,
        max_run_len,
        mean_total,
        std_total,
        entropy,
    }
}

/// Linear scan segmenting the sequence into runs
fn segment_runs(categories: &[Category]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut iter = categories.iter();
    let Some(&first) = iter.next() else {
        return runs;
    };
    let mut current = first;
    let mut len = 1;
    for &category in iter {
        if category == current {
            len += 1;
        } else {
            runs.push(Run { category: current, len });
            current = category;
            len = 1;
        }
    }
    runs.push(Run { category: current, len });
    runs
}

fn entropy(freq: &CategoryCounts, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let mut e = 0.0;
    for count in [freq.low, freq.high, freq.unknown] {
        if count > 0 {
            let p = count as f64 / n as f64;
            e -= p * p.log2();
        }
    }
    e
}

/// Fraction of positions at which two windows agree; 0 on length mismatch
pub fn similarity(a: &[Category], b: &[Category]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let matches = a.iter().zip(b).filter(|(x, y)| x == y).count();
    matches as f64 / a.len() as f64
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
