//! Reactive trip queries.
//!
//! Storage ticks a broadcast channel on every committed mutation; a feed
//! re-runs its query on each tick and hands the full refreshed result set
//! to its observer. Observers never poll.

use anyhow::Result;
use tokio::sync::broadcast;

use shared::TripWithFuel;

use crate::storage::sqlite::TripRepository;
use crate::storage::traits::TripStorage;

/// A live view over the trip listing or a search, created through
/// [`TripRepository::watch`].
pub struct TripFeed {
    repository: TripRepository,
    query: Option<String>,
    changes: broadcast::Receiver<()>,
}

impl TripFeed {
    pub(crate) fn new(repository: TripRepository, query: Option<String>) -> Self {
        let changes = repository.db().subscribe_changes();
        Self {
            repository,
            query,
            changes,
        }
    }

    /// The current result set for this feed's query.
    pub async fn snapshot(&self) -> Result<Vec<TripWithFuel>> {
        match &self.query {
            Some(text) => self.repository.search_trips(text).await,
            None => self.repository.list_trips().await,
        }
    }

    /// Wait for the next committed mutation and return the refreshed result
    /// set. A lagged receiver refetches the full set, so no update is ever
    /// lost; `None` means the storage side has shut down.
    pub async fn next(&mut self) -> Option<Result<Vec<TripWithFuel>>> {
        match self.changes.recv().await {
            Ok(()) => Some(self.snapshot().await),
            Err(broadcast::error::RecvError::Lagged(_)) => Some(self.snapshot().await),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}
