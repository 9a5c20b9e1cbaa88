// ── Device store ──
//
// Lock-free holder of the current `Snapshot`. Configuration loads swap
// the whole snapshot in one store; state updates go through `rcu` so a
// concurrent configuration swap is never partially overwritten.

mod snapshot;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::model::{DeviceId, DeviceState};

pub use snapshot::Snapshot;

/// Shared, atomically swapped device model.
#[derive(Debug, Default)]
pub struct DeviceStore {
    current: ArcSwapOption<Snapshot>,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, or `None` before the first configuration load.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Install a freshly loaded snapshot.
    ///
    /// Known states of devices that keep their id and type carry over.
    pub fn replace(&self, next: Snapshot) -> Arc<Snapshot> {
        let mut installed = None;
        self.current.rcu(|previous| {
            let built = Arc::new(match previous {
                Some(previous) => next.inherit_states(previous),
                None => next.clone(),
            });
            installed = Some(Arc::clone(&built));
            Some(built)
        });
        let installed = installed.unwrap_or_else(|| Arc::new(next));
        debug!(devices = installed.len(), "device snapshot replaced");
        installed
    }

    /// Apply several states at once. Returns how many devices were updated.
    pub fn apply_states(&self, updates: &[(DeviceId, DeviceState)]) -> usize {
        if updates.is_empty() {
            return 0;
        }
        let mut applied = 0;
        self.current.rcu(|current| {
            applied = 0;
            current.as_ref().map(|snapshot| {
                let (next, count) = snapshot.with_states(updates.iter().map(|(id, s)| (*id, s)));
                applied = count;
                Arc::new(next)
            })
        });
        applied
    }

    /// Set one device's state. Returns `false` if the id is not loaded.
    pub fn set_state(&self, id: DeviceId, state: DeviceState) -> bool {
        self.apply_states(&[(id, state)]) == 1
    }

    /// Drop the snapshot.
    pub fn clear(&self) {
        self.current.store(None);
    }
}
