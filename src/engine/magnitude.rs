//! Magnitude predictor: ranks the three most likely totals within the
//! predicted side's domain.
//!
//! Scans the last 100 adjacent-pair transitions of the raw history
//! (Edge rounds included) where the earlier round landed on the winning
//! side, and votes for the later round's total with linear time decay.
//! Thin histories backfill from the domain by proximity to its midpoint.

use crate::types::{OutcomeRecord, Side};

const LOOKBACK: usize = 100;
const DOMAIN_SIZE: usize = 7;

fn domain(side: Side) -> [u8; DOMAIN_SIZE] {
    match side {
        Side::Low => [4, 5, 6, 7, 8, 9, 10],
        Side::High => [11, 12, 13, 14, 15, 16, 17],
    }
}

pub fn predict_magnitude(history: &[OutcomeRecord], side: Side) -> [u8; 3] {
    let domain = domain(side);
    let start = domain[0];
    let mut weighted = [0.0f64; DOMAIN_SIZE];

    let n = history.len();
    let lookback = n.min(LOOKBACK);
    if n >= 2 {
        for i in n.saturating_sub(lookback)..=n - 2 {
            if history[i].category.side() != Some(side) {
                continue;
            }
            let total = history[i + 1].total;
            if !(start..start + DOMAIN_SIZE as u8).contains(&total) {
                continue;
            }
            let age = n - 1 - i;
            let decay = 1.0 - age as f64 / lookback as f64;
            weighted[usize::from(total - start)] += decay;
        }
    }

    // Voted totals first, heaviest weight first; the stable sort keeps
    // equal weights in ascending total order
    let mut ranked: Vec<(u8, f64)> = domain
        .iter()
        .enumerate()
        .filter(|(idx, _)| weighted[*idx] > 0.0)
        .map(|(idx, &total)| (total, weighted[idx]))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut picks: Vec<u8> = ranked.iter().take(3).map(|(total, _)| *total).collect();

    if picks.len() < 3 {
        let center = f64::from(domain[0] + domain[DOMAIN_SIZE - 1]) / 2.0;
        let mut remaining: Vec<u8> = domain
            .iter()
            .copied()
            .filter(|t| !picks.contains(t))
            .collect();
        remaining.sort_by(|a, b| {
            (f64::from(*a) - center)
                .abs()
                .total_cmp(&(f64::from(*b) - center).abs())
        });
        picks.extend(remaining.into_iter().take(3 - picks.len()));
    }

    match picks[..] {
        [a, b, c, ..] => [a, b, c],
        _ => [domain[0], domain[1], domain[2]],
    }
}
