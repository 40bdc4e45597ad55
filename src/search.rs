use crate::geocoder::{GeocodeCandidate, Geocoder};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "suggestions", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Query shorter than the minimum; nothing was searched.
    TooShort,
    /// A newer submission arrived before this one fired.
    Superseded,
    Suggestions(Vec<GeocodeCandidate>),
}

/// Each submission cancels the one still waiting out the delay. A search
/// already sent to the geocoder runs to completion.
pub struct SearchDebouncer {
    delay: Duration,
    min_chars: usize,
    pending: Mutex<Option<CancellationToken>>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration, min_chars: usize) -> Self {
        Self {
            delay,
            min_chars,
            pending: Mutex::new(None),
        }
    }

    pub async fn submit<G: Geocoder>(&self, geocoder: &G, query: &str) -> SearchOutcome {
        let query = query.trim();
        let too_short = query.chars().count() < self.min_chars;

        let token = {
            let mut pending = self.pending.lock().await;
            if let Some(previous) = pending.take() {
                previous.cancel();
            }
            if too_short {
                return SearchOutcome::TooShort;
            }
            let token = CancellationToken::new();
            *pending = Some(token.clone());
            token
        };

        tokio::select! {
            _ = token.cancelled() => {
                debug!(query, "Search superseded before firing");
                return SearchOutcome::Superseded;
            }
            _ = tokio::time::sleep(self.delay) => {}
        }

        match geocoder.autocomplete(query).await {
            Ok(candidates) => SearchOutcome::Suggestions(candidates),
            Err(e) => {
                warn!(query, error = %e, "Error searching locations");
                SearchOutcome::Suggestions(Vec::new())
            }
        }
    }
}
