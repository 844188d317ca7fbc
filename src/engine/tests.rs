//! Engine tests

use super::*;
use crate::config::EnsembleConfig;
use crate::engine::panel::{
    freq_rebalance, AdaptiveMarkov, Markov, NeoPattern, Ngram, SuperBridge, SuperDeepAnalysis,
    Transformer,
};
use crate::types::{Category, Opinion, OutcomeRecord, Side};

/// Build a history from a compact letter pattern: H → total 14,
/// L → total 7, E → total 18. Sessions are sequential from 1.
fn seq(letters: &str) -> Vec<OutcomeRecord> {
    letters
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let total = match c {
                'H' => 14,
                'L' => 7,
                'E' => 18,
                other => panic!("unexpected letter {other}"),
            };
            OutcomeRecord::from_parts(i as u64 + 1, [0, 0, 0], total)
        })
        .collect()
}

fn from_totals(totals: &[u8]) -> Vec<OutcomeRecord> {
    totals
        .iter()
        .enumerate()
        .map(|(i, &t)| OutcomeRecord::from_parts(i as u64 + 1, [0, 0, 0], t))
        .collect()
}

// ---------- features ----------

#[test]
fn test_run_segmentation() {
    let features = extract_features(&seq("HHLLLH"));
    let shape: Vec<(Category, usize)> = features.runs.iter().map(|r| (r.category, r.len)).collect();
    assert_eq!(
        shape,
        vec![(Category::High, 2), (Category::Low, 3), (Category::High, 1)]
    );
    assert_eq!(features.max_run_len, 3);
}

#[test]
fn test_entropy_bounds() {
    let alternating = extract_features(&seq(&"HL".repeat(10)));
    assert!((alternating.entropy - 1.0).abs() < 1e-9);

    let constant = extract_features(&seq(&"H".repeat(10)));
    assert_eq!(constant.entropy, 0.0);
}

#[test]
fn test_mean_and_population_std() {
    let features = extract_features(&from_totals(&[4, 6, 8]));
    assert!((features.mean_total - 6.0).abs() < 1e-9);
    assert!((features.std_total - (8.0f64 / 3.0).sqrt()).abs() < 1e-9);
}

#[test]
fn test_empty_history_degrades_without_error() {
    let features = extract_features(&[]);
    assert!(features.categories.is_empty());
    assert!(features.runs.is_empty());
    assert_eq!(features.max_run_len, 0);
    assert_eq!(features.mean_total, 0.0);
    assert_eq!(features.std_total, 0.0);
    assert_eq!(features.entropy, 0.0);
}

#[test]
fn test_features_are_deterministic() {
    let history = seq(&"HHLHLLHHLH".repeat(4));
    assert_eq!(extract_features(&history), extract_features(&history));
}

// ---------- panel ----------

#[test]
fn test_freq_rebalance_calls_minority() {
    assert_eq!(freq_rebalance(&seq("HHHH")), Opinion::Low);
    assert_eq!(freq_rebalance(&seq("LLLL")), Opinion::High);
    // Lead of exactly 2 is not enough
    assert_eq!(freq_rebalance(&seq("HHHLL")), Opinion::NoOpinion);
    assert_eq!(freq_rebalance(&seq("HLLH")), Opinion::NoOpinion);
}

#[test]
fn test_markov_recovers_repeated_rule() {
    // "after HHL always comes H", repeated well past 10 times
    let history = seq(&format!("{}HHL", "HHLH".repeat(10)));
    assert_eq!(Markov.evaluate(&history), Opinion::High);
}

#[test]
fn test_markov_abstains_on_unseen_window_and_tie() {
    // Trailing window LLH never appears with a successor
    assert_eq!(Markov.evaluate(&seq("HLLH")), Opinion::NoOpinion);
    // LLH is followed once by H and once by L
    assert_eq!(Markov.evaluate(&seq("LLHHLLHLLLH")), Opinion::NoOpinion);
}

#[test]
fn test_ngram_recovers_exact_repeats() {
    let history = seq(&"HHLH".repeat(10));
    assert_eq!(Ngram.evaluate(&history), Opinion::High);
    assert_eq!(Ngram.evaluate(&seq("HHLH")), Opinion::NoOpinion);
}

#[test]
fn test_neo_pattern_minimum_and_alternation() {
    assert_eq!(NeoPattern.evaluate(&seq(&"HL".repeat(9))), Opinion::NoOpinion);
    // Strictly alternating history: every aligned window matches exactly
    assert_eq!(NeoPattern.evaluate(&seq(&"HL".repeat(12))), Opinion::High);
}

#[test]
fn test_super_deep_analysis_total_means() {
    let hot = from_totals(&[14; 80]);
    assert_eq!(SuperDeepAnalysis.evaluate(&hot), Opinion::High);

    let cold = from_totals(&[7; 80]);
    assert_eq!(SuperDeepAnalysis.evaluate(&cold), Opinion::Low);

    assert_eq!(SuperDeepAnalysis.evaluate(&from_totals(&[14; 69])), Opinion::NoOpinion);
}

#[test]
fn test_super_deep_analysis_entropy_flip() {
    // Balanced totals, maximal entropy: bets against the latest category
    let history = seq(&"HL".repeat(40));
    assert_eq!(SuperDeepAnalysis.evaluate(&history), Opinion::High);
}

#[test]
fn test_transformer_minimum_and_alternation() {
    assert_eq!(Transformer.evaluate(&seq(&"HL".repeat(49))), Opinion::NoOpinion);
    assert_eq!(Transformer.evaluate(&seq(&"HL".repeat(60))), Opinion::High);
}

#[test]
fn test_bridge_continues_long_run() {
    let history = seq("LLHHHH");
    assert_eq!(SuperBridge.evaluate(&history), Opinion::High);
}

#[test]
fn test_bridge_fades_alternating_singletons() {
    // Last four runs are all length 1: fade the latest side
    let history = seq("HHLHLH");
    assert_eq!(SuperBridge.evaluate(&history), Opinion::Low);
}

#[test]
fn test_bridge_needs_two_runs() {
    assert_eq!(SuperBridge.evaluate(&seq("HHHH")), Opinion::NoOpinion);
}

#[test]
fn test_adaptive_markov_recovers_pattern() {
    let history = seq(&"HHLH".repeat(6));
    assert_eq!(AdaptiveMarkov.evaluate(&history), Opinion::High);
    assert_eq!(AdaptiveMarkov.evaluate(&seq(&"HHLH".repeat(4))), Opinion::NoOpinion);
}

// ---------- ensemble ----------

#[test]
fn test_fallback_confidence_is_half() {
    // Four balanced rounds: every predictor abstains, frequency
    // rebalance has no lead either, so the default side applies
    let ensemble = EnsembleWeighting::new(default_panel(), &EnsembleConfig::default());
    let (side, confidence) = ensemble.predict(&seq("HLLH"));
    assert_eq!(side, Side::High);
    assert_eq!(confidence, 0.5);
}

fn assert_weight_invariant(weights: &[f64], min_weight: f64) {
    let sum: f64 = weights.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6, "weights sum to {sum}");
    for &w in weights {
        assert!(w >= min_weight, "weight {w} below floor");
    }
}

#[test]
fn test_weight_invariant_after_calibration_and_updates() {
    let config = EnsembleConfig::default();
    let history = seq(&"HHLHLLHHLH".repeat(6));
    let mut ensemble = EnsembleWeighting::new(default_panel(), &config);

    ensemble.fit_initial(&history);
    assert_weight_invariant(ensemble.weights(), config.min_weight);

    for i in 40..history.len() {
        ensemble.update_with_outcome(&history[..i], history[i].category);
        assert_weight_invariant(ensemble.weights(), config.min_weight);
    }
}

#[test]
fn test_calibration_favors_accurate_predictor() {
    // Deterministic period-4 pattern: markov recovers it almost every
    // round, frequency rebalance is right only on the minority rounds
    let history = seq(&"HHLH".repeat(30));
    let mut ensemble = EnsembleWeighting::new(default_panel(), &EnsembleConfig::default());
    ensemble.fit_initial(&history);

    let ids = ensemble.predictor_ids();
    let markov = ids.iter().position(|&id| id == "markov").unwrap();
    let freq = ids.iter().position(|&id| id == "freq_rebalance").unwrap();
    assert!(ensemble.weights()[markov] > ensemble.weights()[freq]);
}

#[test]
fn test_online_update_rewards_correct_opinion() {
    let history = seq(&format!("{}HHL", "HHLH".repeat(10)));
    let mut ensemble = EnsembleWeighting::new(default_panel(), &EnsembleConfig::default());

    // markov calls High here; realize a High round
    ensemble.update_with_outcome(&history, Category::High);

    let ids = ensemble.predictor_ids();
    let markov = ids.iter().position(|&id| id == "markov").unwrap();
    let freq = ids.iter().position(|&id| id == "freq_rebalance").unwrap();
    assert!(ensemble.weights()[markov] > ensemble.weights()[freq]);
    assert_weight_invariant(ensemble.weights(), EnsembleConfig::default().min_weight);
}

#[test]
fn test_edge_outcome_trains_nothing() {
    let history = seq(&"HHLH".repeat(10));
    let mut ensemble = EnsembleWeighting::new(default_panel(), &EnsembleConfig::default());
    ensemble.fit_initial(&history);
    let before = ensemble.weights().to_vec();

    ensemble.update_with_outcome(&history, Category::Edge);
    assert_eq!(before, ensemble.weights());
}

#[test]
fn test_confidence_stays_in_band() {
    let history = seq(&"HHLH".repeat(30));
    let mut ensemble = EnsembleWeighting::new(default_panel(), &EnsembleConfig::default());
    ensemble.fit_initial(&history);
    let (_, confidence) = ensemble.predict(&history);
    assert!((0.51..=0.99).contains(&confidence));
}

// ---------- magnitude ----------

#[test]
fn test_magnitude_ranks_dominant_total_first() {
    // Every transition into High lands on 14
    let triple = predict_magnitude(&from_totals(&[14; 50]), Side::High);
    assert_eq!(triple, [14, 13, 15]);
}

#[test]
fn test_magnitude_weighs_votes_over_backfill() {
    // 14 gathers more decayed weight than 12; 13 backfills at the center
    let triple = predict_magnitude(&from_totals(&[14, 14, 14, 14, 12]), Side::High);
    assert_eq!(triple, [14, 12, 13]);
}

#[test]
fn test_magnitude_backfills_from_midpoint_on_empty_history() {
    assert_eq!(predict_magnitude(&[], Side::High), [14, 13, 15]);
    assert_eq!(predict_magnitude(&[], Side::Low), [7, 6, 8]);
}

// ---------- the Edge asymmetry is intentional ----------

#[test]
fn test_edge_rounds_are_invisible_to_panel_but_not_magnitude() {
    // Panel side: an interleaved Edge round changes nothing
    let with_edge = seq("LLHHEHH");
    let without = seq("LLHHHH");
    assert_eq!(SuperBridge.evaluate(&with_edge), SuperBridge.evaluate(&without));
    assert_eq!(Markov.evaluate(&with_edge), Markov.evaluate(&without));
    assert_eq!(SuperBridge.evaluate(&with_edge), Opinion::High);

    // Magnitude side: the same Edge round occupies a transition slot,
    // so the raw and filtered histories rank differently
    let raw = from_totals(&[14, 13, 18, 11]);
    let filtered = from_totals(&[14, 13, 11]);
    assert_eq!(predict_magnitude(&raw, Side::High), [13, 14, 15]);
    assert_eq!(predict_magnitude(&filtered, Side::High), [11, 13, 14]);
}

// ---------- manager ----------

#[test]
fn test_manager_load_initial_caches_prediction() {
    let mut manager = PredictionManager::new(&EnsembleConfig::default());
    assert!(manager.current_prediction().is_none());

    manager.load_initial(seq(&"HHLH".repeat(10)));
    let prediction = manager.current_prediction().expect("prediction cached");
    assert!(prediction.confidence == 0.5 || (0.51..=0.99).contains(&prediction.confidence));

    // Reads never recompute: two reads observe the same value
    assert_eq!(manager.current_prediction(), manager.current_prediction());
}

#[test]
fn test_manager_push_record_refreshes_cache() {
    let mut manager = PredictionManager::new(&EnsembleConfig::default());
    manager.load_initial(seq(&"HHLH".repeat(10)));

    let next_session = manager.latest().unwrap().session + 1;
    manager.push_record(OutcomeRecord::from_parts(next_session, [5, 5, 4], 14));

    assert_eq!(manager.latest().unwrap().session, next_session);
    let prediction = manager.current_prediction().expect("prediction cached");
    let domain = match prediction.side {
        Side::Low => 4..=10,
        Side::High => 11..=17,
    };
    for total in prediction.magnitude {
        assert!(domain.contains(&total));
    }
}

#[test]
fn test_manager_is_deterministic() {
    let records = seq(&"HHLHLLHHLHHLLH".repeat(10));
    let mut a = PredictionManager::new(&EnsembleConfig::default());
    let mut b = PredictionManager::new(&EnsembleConfig::default());
    a.load_initial(records.clone());
    b.load_initial(records);
    assert_eq!(a.current_prediction(), b.current_prediction());
    assert_eq!(a.weight_table(), b.weight_table());
}

#[test]
fn test_manager_ignores_empty_load() {
    let mut manager = PredictionManager::new(&EnsembleConfig::default());
    manager.load_initial(Vec::new());
    assert!(manager.current_prediction().is_none());
    assert!(manager.latest().is_none());
}
