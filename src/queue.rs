use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::geometry::Geometry;

#[derive(Default)]
struct Shared {
    items: Mutex<VecDeque<Geometry>>,
    available: Condvar,
}

/// Unbounded FIFO of primitives between the input producer and the render
/// thread.
///
/// The queue is its own synchronization point: any number of handles may push
/// concurrently while one consumer drains. Producers are expected to push only
/// while the recorder state is `Recording`; anything pushed while paused is
/// drawn as soon as recording resumes.
#[derive(Clone, Default)]
pub struct DrawOperationQueue {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for DrawOperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawOperationQueue")
            .field("pending", &self.len())
            .finish()
    }
}

impl DrawOperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a primitive. Never blocks on the consumer and never fails.
    pub fn push(&self, geometry: Geometry) {
        self.shared.items.lock().push_back(geometry);
        self.shared.available.notify_one();
    }

    /// Take everything pending, oldest first, without waiting
    pub fn drain(&self) -> Vec<Geometry> {
        self.shared.items.lock().drain(..).collect()
    }

    /// Take everything pending, oldest first. If nothing is pending, sleep
    /// until a push, a [`wake`](Self::wake), or `timeout` elapses; the result
    /// may then be empty.
    pub fn drain_or_wait(&self, timeout: Duration) -> Vec<Geometry> {
        let deadline = Instant::now() + timeout;
        let mut items = self.shared.items.lock();
        if items.is_empty() {
            // A single wait: wakes and timeouts both hand control back
            let _ = self.shared.available.wait_until(&mut items, deadline);
        }
        items.drain(..).collect()
    }

    /// Rouse a consumer blocked in [`drain_or_wait`](Self::drain_or_wait)
    pub fn wake(&self) {
        self.shared.available.notify_all();
    }

    /// Drop everything pending, returning how many primitives were discarded
    pub fn clear(&self) -> usize {
        let mut items = self.shared.items.lock();
        let discarded = items.len();
        items.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.shared.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.items.lock().is_empty()
    }
}
