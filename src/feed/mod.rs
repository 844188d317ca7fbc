//! Upstream results feed adapter.
//!
//! Polls the game history endpoint, parses settled rounds into
//! [`OutcomeRecord`]s sorted by ascending session id, and drives the
//! prediction manager: the first non-empty batch seeds it, later
//! batches push only sessions newer than the last one seen. Fetch
//! failures are logged and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::FeedConfig;
use crate::error::{OracleError, Result};
use crate::server::AppState;
use crate::types::OutcomeRecord;

#[cfg(test)]
mod tests;

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    data: Option<ResultPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultPage {
    #[serde(default)]
    result_list: Vec<RawRound>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRound {
    /// Round id prefixed with '#', e.g. "#2319259"
    game_num: String,
    /// Round total
    score: i64,
    #[serde(default)]
    faces_list: Option<Vec<u8>>,
    /// Legacy dice encoding, e.g. "3-6-2"
    #[serde(default)]
    key_r: Option<String>,
}

fn parse_round(raw: &RawRound) -> Option<OutcomeRecord> {
    let session = raw.game_num.trim_start_matches('#').parse().ok()?;
    let dice = parse_dice(raw);
    let total = u8::try_from(raw.score).unwrap_or(0);
    Some(OutcomeRecord::from_parts(session, dice, total))
}

fn parse_dice(raw: &RawRound) -> [u8; 3] {
    if let Some(faces) = &raw.faces_list {
        if let [a, b, c] = faces[..] {
            return [a, b, c];
        }
    }
    if let Some(key) = &raw.key_r {
        let faces: Vec<u8> = key.split('-').filter_map(|p| p.parse().ok()).collect();
        if let [a, b, c] = faces[..] {
            return [a, b, c];
        }
    }
    [0, 0, 0]
}

/// Rounds of an upstream payload, oldest first. Rounds that cannot be
/// parsed are dropped rather than failing the batch.
fn parse_envelope(envelope: &HistoryEnvelope) -> Vec<OutcomeRecord> {
    let Some(page) = &envelope.data else {
        return Vec::new();
    };
    let mut records: Vec<OutcomeRecord> = page.result_list.iter().filter_map(parse_round).collect();
    records.sort_by_key(|r| r.session);
    records
}

pub struct FeedClient {
    http: Client,
    url: String,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            http: Client::new(),
            url: config.url.clone(),
        }
    }

    /// Fetch and parse the latest history batch
    pub async fn fetch_latest(&self) -> Result<Vec<OutcomeRecord>> {
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let envelope: HistoryEnvelope = serde_json::from_str(&body)
            .map_err(|e| OracleError::MalformedFeed(e.to_string()))?;
        Ok(parse_envelope(&envelope))
    }
}

/// Rounds of a sorted batch strictly newer than the last session seen.
/// With nothing seen yet the whole batch is fresh.
fn fresh_rounds(batch: Vec<OutcomeRecord>, last_seen: Option<u64>) -> Vec<OutcomeRecord> {
    match last_seen {
        None => batch,
        Some(seen) => batch.into_iter().filter(|r| r.session > seen).collect(),
    }
}

/// Poll loop feeding the prediction manager. This task is the single
/// writer to the manager; handlers only read.
pub async fn run_feed(client: FeedClient, poll_interval: Duration, state: Arc<AppState>) {
    let mut interval = tokio::time::interval(poll_interval);
    let mut last_session: Option<u64> = None;

    loop {
        interval.tick().await;

        let batch = match client.fetch_latest().await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("feed fetch failed: {e}");
                continue;
            }
        };
        let Some(newest) = batch.last().map(|r| r.session) else {
            tracing::debug!("empty history batch from feed");
            continue;
        };

        let seeded = last_session.is_some();
        let fresh = fresh_rounds(batch, last_session);
        if fresh.is_empty() {
            tracing::debug!(last = newest, "no new rounds");
            continue;
        }

        let count = fresh.len();
        let mut manager = state.manager.write().await;
        if seeded {
            for record in fresh {
                manager.push_record(record);
            }
            tracing::info!(rounds = count, last = newest, "new rounds ingested");
        } else {
            manager.load_initial(fresh);
            tracing::info!(rounds = count, last = newest, "initial history loaded");
        }
        last_session = Some(newest);
    }
}
