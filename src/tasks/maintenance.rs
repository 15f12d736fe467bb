//! Maintenance Task
//!
//! Single background worker that trims the cache to size and rebuilds the
//! journal when it has accumulated too many redundant lines.
//!
//! Requests go through a channel with room for one pending request. While a
//! request is pending, further requests are collapsed into it, so a burst
//! of commits costs at most one extra pass.

use std::io;
use std::sync::Weak;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::cache::Inner;

const WORKER_NAME: &str = "journal-cache-maintenance";

// == Maintenance Queue ==
/// Sending half of the maintenance channel, owned by the cache.
#[derive(Debug)]
pub(crate) struct MaintenanceQueue {
    sender: Sender<()>,
}

impl MaintenanceQueue {
    /// Creates the queue and the receiver the worker consumes.
    pub(crate) fn new() -> (Self, Receiver<()>) {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        (Self { sender }, receiver)
    }

    /// Asks the worker for a pass. Never blocks.
    pub(crate) fn request(&self) {
        match self.sender.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                debug!("Maintenance already pending, request collapsed");
            }
            Err(TrySendError::Disconnected(())) => {
                debug!("Maintenance worker has exited");
            }
        }
    }
}

/// Spawns the worker thread serving `requests`.
///
/// The worker only holds a weak reference to the cache; it exits once the
/// cache is dropped and the channel disconnects.
pub(crate) fn spawn_maintenance_worker(
    cache: Weak<Inner>,
    requests: Receiver<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            debug!("Maintenance worker started");

            for () in requests.iter() {
                let Some(inner) = cache.upgrade() else {
                    break;
                };
                match inner.run_maintenance() {
                    Ok(report) if report.evicted > 0 || report.rebuilt => {
                        info!(
                            "Maintenance: evicted {} entries, journal rebuilt: {}",
                            report.evicted, report.rebuilt
                        );
                    }
                    Ok(_) => debug!("Maintenance: nothing to do"),
                    Err(err) => warn!("Maintenance pass failed: {}", err),
                }
            }

            debug!("Maintenance worker stopped");
        })
}
