//! Feed parsing tests

use super::*;
use crate::types::Category;

#[test]
fn test_parse_envelope_sorts_ascending() {
    let payload = r##"{
        "data": {
            "resultList": [
                { "gameNum": "#2319260", "score": 14, "facesList": [5, 4, 5] },
                { "gameNum": "#2319258", "score": 7, "facesList": [2, 2, 3] },
                { "gameNum": "#2319259", "score": 18, "facesList": [6, 6, 6] }
            ]
        }
    }"##;
    let envelope: HistoryEnvelope = serde_json::from_str(payload).unwrap();
    let records = parse_envelope(&envelope);

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].session, 2319258);
    assert_eq!(records[1].session, 2319259);
    assert_eq!(records[2].session, 2319260);

    assert_eq!(records[0].category, Category::Low);
    assert_eq!(records[1].category, Category::Edge);
    assert_eq!(records[2].category, Category::High);
    assert_eq!(records[2].dice, [5, 4, 5]);
}

#[test]
fn test_parse_round_key_r_fallback() {
    let payload = r##"{
        "data": {
            "resultList": [
                { "gameNum": "#100", "score": 11, "keyR": "3-6-2" },
                { "gameNum": "#101", "score": 9 }
            ]
        }
    }"##;
    let envelope: HistoryEnvelope = serde_json::from_str(payload).unwrap();
    let records = parse_envelope(&envelope);

    assert_eq!(records[0].dice, [3, 6, 2]);
    assert_eq!(records[1].dice, [0, 0, 0]);
    assert_eq!(records[1].total, 9);
}

#[test]
fn test_parse_envelope_without_data_is_empty() {
    let envelope: HistoryEnvelope = serde_json::from_str("{}").unwrap();
    assert!(parse_envelope(&envelope).is_empty());

    let envelope: HistoryEnvelope =
        serde_json::from_str(r##"{ "data": { "resultList": [] } }"##).unwrap();
    assert!(parse_envelope(&envelope).is_empty());
}

#[test]
fn test_unparseable_rounds_are_dropped() {
    let payload = r##"{
        "data": {
            "resultList": [
                { "gameNum": "#abc", "score": 10 },
                { "gameNum": "#200", "score": 10, "facesList": [4, 3, 3] }
            ]
        }
    }"##;
    let envelope: HistoryEnvelope = serde_json::from_str(payload).unwrap();
    let records = parse_envelope(&envelope);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session, 200);
}

fn round(session: u64, total: u8) -> OutcomeRecord {
    OutcomeRecord::from_parts(session, [0, 0, 0], total)
}

#[test]
fn test_fresh_rounds_first_batch_passes_through() {
    let batch = vec![round(100, 7), round(101, 14), round(102, 9)];
    let fresh = fresh_rounds(batch, None);
    assert_eq!(fresh.len(), 3);
    assert_eq!(fresh[0].session, 100);
}

#[test]
fn test_fresh_rounds_pushes_only_newer_sessions_in_order() {
    let batch = vec![
        round(100, 7),
        round(101, 14),
        round(102, 9),
        round(103, 11),
        round(104, 8),
    ];
    let fresh = fresh_rounds(batch, Some(102));
    let sessions: Vec<u64> = fresh.iter().map(|r| r.session).collect();
    assert_eq!(sessions, vec![103, 104]);
}

#[test]
fn test_fresh_rounds_empty_when_nothing_newer() {
    let batch = vec![round(100, 7), round(101, 14), round(102, 9)];
    assert!(fresh_rounds(batch.clone(), Some(102)).is_empty());
    assert!(fresh_rounds(batch, Some(500)).is_empty());
}

#[test]
fn test_out_of_range_score_maps_to_unknown() {
    let payload = r##"{
        "data": {
            "resultList": [
                { "gameNum": "#300", "score": 9999 }
            ]
        }
    }"##;
    let envelope: HistoryEnvelope = serde_json::from_str(payload).unwrap();
    let records = parse_envelope(&envelope);
    assert_eq!(records[0].category, Category::Unknown);
}
