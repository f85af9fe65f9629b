//! Subscription module
//!
//! Listeners, subscription handles, and the per-subscription delivery loop.

mod delivery;
mod handle;
mod listener;

pub(crate) use delivery::run_delivery;
pub use handle::{SubscriptionHandle, SubscriptionId, SubscriptionStatus};
pub use listener::{FnListener, ListenerResult, RoomListener};
