use std::sync::Arc;

use log::warn;

use super::{
    client::FetchDepartures,
    error::{FeedError, Result},
    models::FeedSnapshot,
};

/// Holds the last successfully fetched and parsed feed snapshot.
///
/// The repository performs exactly one network fetch per
/// [`fetch_and_update`](Self::fetch_and_update) call and keeps no state
/// beyond the last good snapshot.
pub struct FeedRepository {
    fetcher: Box<dyn FetchDepartures>,
    current: Option<Arc<FeedSnapshot>>,
}

impl FeedRepository {
    pub fn new(fetcher: Box<dyn FetchDepartures>) -> Self {
        Self {
            fetcher,
            current: None,
        }
    }

    /// Attempts one fetch and returns the snapshot the caller should act on.
    ///
    /// - On success the stored snapshot is replaced; a partially parsed
    ///   document is never stored (the fetcher parses in full before
    ///   returning).
    /// - On a transport failure the previously stored snapshot is returned
    ///   unchanged, or [`FeedError::NoDataAvailable`] if there is none yet.
    /// - On a parse failure the stored snapshot is left untouched and the
    ///   error is surfaced, so the caller can skip the cycle instead of
    ///   acting on input that no longer parses.
    pub async fn fetch_and_update(&mut self) -> Result<Arc<FeedSnapshot>> {
        match self.fetcher.fetch().await {
            Ok(snapshot) => {
                self.current = Some(snapshot.clone());
                Ok(snapshot)
            }
            Err(e @ FeedError::Parse(_)) => {
                warn!("feed response unparseable, keeping stored snapshot: {e}");
                Err(e)
            }
            Err(e) => match &self.current {
                Some(previous) => {
                    warn!("feed fetch failed, using stored snapshot: {e}");
                    Ok(previous.clone())
                }
                None => Err(FeedError::NoDataAvailable),
            },
        }
    }

    /// Returns the last good snapshot without fetching, if any.
    pub fn last_snapshot(&self) -> Option<Arc<FeedSnapshot>> {
        self.current.clone()
    }
}
