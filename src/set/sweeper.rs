//! Background Expiry Sweeper
//!
//! The expiring set variant expires elements in two ways: lazily, when a
//! membership test reads a stale deadline, and actively, by this sweeper.
//! Lazy expiry alone would leave a slot occupied forever if its element is
//! never looked up again; the sweeper guarantees stale slots are reclaimed
//! even without traffic.
//!
//! ## Design
//!
//! Each expiring set owns one sweeper, started at creation:
//! 1. Sleep for a fixed period derived from the set's default timeout
//! 2. Wake up and reset every expired slot to unset
//! 3. Repeat until told to stop
//!
//! The period scales with the timeout (a third of it, clamped to one
//! second minimum and three minutes maximum), so short-lived elements are
//! reclaimed promptly while long-lived sets are scanned rarely.
//!
//! ## Shutdown
//!
//! Destroying a set must guarantee no sweep touches its storage afterwards,
//! so shutdown is cancel-and-join: signal through a watch channel, then
//! await the task itself. The task additionally holds only a [`Weak`]
//! reference to its set and exits when the set is gone, so a set dropped
//! without an explicit destroy does not keep sweeping either.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::set::engine::PortSet;

/// Shortest allowed sweep period in seconds.
const MIN_SWEEP_SECS: u32 = 1;

/// Longest allowed sweep period in seconds.
const MAX_SWEEP_SECS: u32 = 3 * 60;

/// Sweep period for a set with the given default timeout in seconds.
///
/// A third of the timeout, clamped to `[1s, 180s]`.
pub fn sweep_period(timeout_secs: u32) -> Duration {
    let secs = (timeout_secs / 3).clamp(MIN_SWEEP_SECS, MAX_SWEEP_SECS);
    Duration::from_secs(u64::from(secs))
}

/// A handle to one set's running expiry sweeper.
///
/// Obtained from [`ExpirySweeper::start`]; consumed by
/// [`ExpirySweeper::shutdown`], which joins the task. Dropping the handle
/// without a shutdown still signals the task to stop at its next wakeup.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Sender half of the shutdown signal.
    shutdown_tx: watch::Sender<bool>,
    /// The sweep task; taken by shutdown so it can be awaited.
    task: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    /// Starts the sweeper for `set`, firing every `period`.
    ///
    /// The task keeps only a weak reference: it never extends the set's
    /// lifetime and exits on its own once the set is dropped.
    pub fn start(set: Weak<PortSet>, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(sweep_loop(set, period, shutdown_rx));

        debug!(period_secs = period.as_secs(), "expiry sweeper started");

        Self {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Stops the sweeper and waits for any in-flight sweep to complete.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        debug!("expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// The sweep task body.
async fn sweep_loop(set: Weak<PortSet>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    trace!("expiry sweeper received shutdown signal");
                    return;
                }
                continue;
            }
        }

        // The set is gone; nothing left to sweep.
        let Some(set) = set.upgrade() else { return };
        set.sweep();
    }
}
