use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;

use crate::fetcher::{Fetch, FetchError};

/// What happened to a single query, reported next to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Found,
    NotFound,
    Failed,
    TimedOut,
}

/// Result of a batch. `slots[i]` and `statuses[i]` belong to query `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub slots: Vec<Option<String>>,
    pub statuses: Vec<SlotStatus>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn found(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Slots flattened for the wire, misses become empty strings.
    pub fn identifiers(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| s.clone().unwrap_or_default())
            .collect()
    }
}

/// Runs one fetch per query in parallel and puts the results back in order.
pub struct BatchCoordinator<F> {
    fetcher: Arc<F>,
    fetch_timeout: Option<Duration>,
}

impl<F> Clone for BatchCoordinator<F> {
    fn clone(&self) -> Self {
        BatchCoordinator {
            fetcher: self.fetcher.clone(),
            fetch_timeout: self.fetch_timeout,
        }
    }
}

impl<F: Fetch> BatchCoordinator<F> {
    pub fn new(fetcher: F) -> Self {
        Self::from_shared(Arc::new(fetcher))
    }

    pub fn from_shared(fetcher: Arc<F>) -> Self {
        BatchCoordinator {
            fetcher,
            fetch_timeout: None,
        }
    }

    /// Deadline applied to every fetch. A fetch that runs past it is dropped
    /// and its slot left empty.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    pub async fn run_batch(&self, queries: &[String]) -> BatchOutcome {
        let start = Instant::now();

        let handles = queries
            .iter()
            .cloned()
            .map(|query| {
                let fetcher = self.fetcher.clone();
                let timeout = self.fetch_timeout;
                tokio::spawn(async move { fetch_one(fetcher.as_ref(), &query, timeout).await })
            })
            .collect::<Vec<_>>();

        // join_all hands results back in dispatch order, so index i is query i
        let finished = join_all(handles).await;

        let mut slots = Vec::with_capacity(queries.len());
        let mut statuses = Vec::with_capacity(queries.len());
        for (index, joined) in finished.into_iter().enumerate() {
            let (slot, status) = match joined {
                Ok(Ok(id)) => (Some(id), SlotStatus::Found),
                Ok(Err(FetchOutcomeError::Fetch(FetchError::NotFound))) => {
                    log::debug!("query #{index} {:?}: no match", queries[index]);
                    (None, SlotStatus::NotFound)
                }
                Ok(Err(FetchOutcomeError::Fetch(e))) => {
                    log::warn!("query #{index} {:?} failed: {:#}", queries[index], e);
                    (None, SlotStatus::Failed)
                }
                Ok(Err(FetchOutcomeError::TimedOut)) => {
                    log::warn!("query #{index} {:?} timed out", queries[index]);
                    (None, SlotStatus::TimedOut)
                }
                Err(e) => {
                    log::error!("fetch task for query #{index} died: {e}");
                    (None, SlotStatus::Failed)
                }
            };
            slots.push(slot);
            statuses.push(status);
        }

        let outcome = BatchOutcome { slots, statuses };
        log::info!(
            "batch of {} queries done in {:?}, {} found",
            outcome.len(),
            start.elapsed(),
            outcome.found()
        );
        outcome
    }
}

enum FetchOutcomeError {
    Fetch(FetchError),
    TimedOut,
}

async fn fetch_one<F: Fetch>(
    fetcher: &F,
    query: &str,
    timeout: Option<Duration>,
) -> Result<String, FetchOutcomeError> {
    let fetch = fetcher.fetch(query);
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fetch).await {
            Ok(res) => res.map_err(FetchOutcomeError::Fetch),
            Err(_) => Err(FetchOutcomeError::TimedOut),
        },
        None => fetch.await.map_err(FetchOutcomeError::Fetch),
    }
}
