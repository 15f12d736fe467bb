//! Asynchronous Open
//!
//! Replays the journal on Tokio's blocking pool and exposes the cache once
//! it is ready.

use std::io;

use tokio::sync::watch;
use tracing::debug;

use crate::cache::DiskCache;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

#[derive(Debug)]
enum OpenState {
    Pending,
    Ready(DiskCache),
    Failed(String),
}

// == Pending Cache ==
/// A cache whose journal replay is still running in the background.
///
/// Returned by [`DiskCache::open_async`]. [`PendingCache::try_get`] reports
/// [`CacheError::NotReady`] until the replay completes.
#[derive(Debug, Clone)]
pub struct PendingCache {
    state: watch::Receiver<OpenState>,
}

impl PendingCache {
    /// Returns the cache if the replay finished, `NotReady` otherwise.
    pub fn try_get(&self) -> Result<DiskCache> {
        Self::resolve(&self.state.borrow())
    }

    pub fn is_ready(&self) -> bool {
        !matches!(*self.state.borrow(), OpenState::Pending)
    }

    /// Waits for the replay to finish.
    pub async fn ready(&mut self) -> Result<DiskCache> {
        let state = self
            .state
            .wait_for(|state| !matches!(state, OpenState::Pending))
            .await
            .map_err(|_| io::Error::other("open task ended without a result"))?;
        Self::resolve(&state)
    }

    fn resolve(state: &OpenState) -> Result<DiskCache> {
        match state {
            OpenState::Pending => Err(CacheError::NotReady),
            OpenState::Ready(cache) => Ok(cache.clone()),
            OpenState::Failed(message) => Err(io::Error::other(message.clone()).into()),
        }
    }
}

/// Starts opening `config` on the blocking pool.
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn_open(config: CacheConfig) -> PendingCache {
    let (sender, receiver) = watch::channel(OpenState::Pending);

    tokio::task::spawn_blocking(move || {
        let state = match DiskCache::open(config) {
            Ok(cache) => OpenState::Ready(cache),
            Err(err) => OpenState::Failed(err.to_string()),
        };
        if sender.send(state).is_err() {
            debug!("Asynchronous open finished after its handle was dropped");
        }
    });

    PendingCache { state: receiver }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pending_reports_not_ready() {
        let (sender, receiver) = watch::channel(OpenState::Pending);
        let pending = PendingCache { state: receiver };

        assert!(!pending.is_ready());
        assert!(matches!(pending.try_get(), Err(CacheError::NotReady)));

        sender
            .send(OpenState::Failed("replay failed".to_string()))
            .unwrap();
        assert!(pending.is_ready());
        match pending.try_get() {
            Err(CacheError::Io(err)) => assert_eq!(err.to_string(), "replay failed"),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_ready_state_hands_out_cache() {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::open(CacheConfig::new(dir.path(), 1, 1, 1024)).unwrap();
        let (_sender, receiver) = watch::channel(OpenState::Ready(cache));
        let pending = PendingCache { state: receiver };

        let opened = pending.try_get().unwrap();
        assert_eq!(opened.directory(), dir.path());
        assert!(pending.clone().is_ready());
    }

    #[test]
    fn test_ready_fails_when_open_task_vanishes() {
        let (sender, receiver) = watch::channel(OpenState::Pending);
        let mut pending = PendingCache { state: receiver };
        drop(sender);

        let result = tokio_test::block_on(pending.ready());
        assert!(matches!(result, Err(CacheError::Io(_))));
    }
}
