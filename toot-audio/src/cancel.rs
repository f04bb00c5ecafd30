//! Cooperative cancellation for blocking capture reads

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

struct Inner {
    cancelled: AtomicBool,
    /// Dropped on cancel, which disconnects every clone of `done_rx`
    done_tx: Mutex<Option<Sender<()>>>,
}

/// Cloneable cancellation flag.
///
/// Besides the flag, the token exposes a channel that disconnects once
/// cancelled, so a thread blocked in `select!` wakes immediately.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
    done_rx: Receiver<()>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (done_tx, done_rx) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                done_tx: Mutex::new(Some(done_tx)),
            }),
            done_rx,
        }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.done_tx.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Receiver that never yields a value and disconnects on cancel
    pub fn done(&self) -> &Receiver<()> {
        &self.done_rx
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
