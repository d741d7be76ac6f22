//! Ordered completion queue for asynchronous listeners.
//!
//! When a listener is marked asynchronous-tolerant, its work may run on a
//! worker task while the connection keeps reading. Forwarding order within
//! one connection/direction must still match submission order — no
//! reordering across packets even if completion times vary — so this is an
//! ordered queue with a completion barrier per packet, not a bare pool.
//!
//! Usage: the pipeline `submit`s each frame in arrival order, hands the
//! returned [`CompletionHandle`] to whatever task runs the listeners, and
//! consumes forwarded bytes from the output receiver. The forwarder task
//! awaits completions strictly FIFO: packet N+1's result is never emitted
//! before packet N's, no matter which finishes first.

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::pipeline::interceptor::Disposition;

struct Slot {
    original: Bytes,
    done: oneshot::Receiver<Disposition>,
}

/// Completes one submitted packet. Dropping the handle without calling
/// [`complete`](Self::complete) counts as "worker died" and forwards the
/// original bytes — an error in listener-land must never lose a frame.
pub struct CompletionHandle(oneshot::Sender<Disposition>);

impl CompletionHandle {
    pub fn complete(self, disposition: Disposition) {
        // receiver gone means the whole queue shut down; nothing to do
        let _ = self.0.send(disposition);
    }
}

/// Per-connection-direction ordered forwarder.
pub struct OrderedForwarder {
    slots: mpsc::UnboundedSender<Slot>,
}

impl OrderedForwarder {
    /// Spawns the forwarder task; forwarded frames arrive on the returned
    /// receiver in submission order.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (slot_tx, mut slot_rx) = mpsc::unbounded_channel::<Slot>();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(slot) = slot_rx.recv().await {
                let forwarded = match slot.done.await {
                    Ok(Disposition::Forward) => Some(slot.original),
                    Ok(Disposition::Replace(bytes)) => Some(bytes),
                    Ok(Disposition::Drop) => None,
                    Err(_) => {
                        warn!("listener worker dropped its completion, forwarding original");
                        Some(slot.original)
                    }
                };
                if let Some(bytes) = forwarded {
                    if out_tx.send(bytes).is_err() {
                        // consumer went away; connection is gone
                        break;
                    }
                }
            }
        });

        (Self { slots: slot_tx }, out_rx)
    }

    /// Reserves the next slot in forwarding order for `original`.
    pub fn submit(&self, original: Bytes) -> CompletionHandle {
        let (done_tx, done_rx) = oneshot::channel();
        let _ = self.slots.send(Slot {
            original,
            done: done_rx,
        });
        CompletionHandle(done_tx)
    }
}
