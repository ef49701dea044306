use serde::{Deserialize, Serialize};

use crate::batch::{BatchOutcome, SlotStatus};

/// Name of the repeated query parameter carrying the searches.
pub const QUERY_PARAM: &str = "q";
pub const DIAGNOSTICS_PARAM: &str = "diagnostics";

/// A `/search` query string, kept as ordered pairs so repeated `q` survive.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(pub Vec<(String, String)>);

impl SearchParams {
    /// All `q` values in the order they were given, empty ones included.
    pub fn queries(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, _)| key == QUERY_PARAM)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn wants_diagnostics(&self) -> bool {
        self.0
            .iter()
            .any(|(key, value)| key == DIAGNOSTICS_PARAM && matches!(value.as_str(), "1" | "true"))
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub video_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<SlotStatus>>,
}

impl SearchResponse {
    pub fn from_outcome(outcome: BatchOutcome, diagnostics: bool) -> Self {
        SearchResponse {
            video_ids: outcome.identifiers(),
            statuses: diagnostics.then_some(outcome.statuses),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
