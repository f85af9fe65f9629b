//! Connectivity signal
//!
//! Carries `Connectivity { is_online }` to any number of observers. Observers see
//! the current value immediately and are woken only on real transitions.

use chat_core::Connectivity;
use tokio::sync::watch;

/// Publisher side of the connectivity state
#[derive(Debug)]
pub struct ConnectivitySignal {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivitySignal {
    pub fn new(initial: Connectivity) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// New observer, holding the current state
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Connectivity {
        *self.tx.borrow()
    }

    /// Record the online state. Returns whether it changed.
    pub fn set_online(&self, is_online: bool) -> bool {
        let changed = self.tx.send_if_modified(|state| {
            if state.is_online == is_online {
                false
            } else {
                *state = Connectivity::from(is_online);
                true
            }
        });

        if changed {
            tracing::info!(is_online, "Connectivity changed");
        }
        changed
    }
}

impl Default for ConnectivitySignal {
    fn default() -> Self {
        Self::new(Connectivity::ONLINE)
    }
}
