//! Delivery loop: drains one subscription's event channel into its listener

use super::{RoomListener, SubscriptionHandle};
use chat_core::RoomEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run until the subscription ends or its sink is detached.
///
/// Events arrive in the room's mutation order and are handed over one at a time,
/// so a listener never sees two callbacks of the same subscription concurrently.
/// When the store drops the sink because the listener fell too far behind, the
/// queued events are still delivered and the subscription then ends.
pub(crate) async fn run_delivery(
    handle: SubscriptionHandle,
    mut events: mpsc::Receiver<RoomEvent>,
    listener: Arc<dyn RoomListener>,
) {
    let mut delivered: u64 = 0;

    while let Some(event) = events.recv().await {
        if !handle.deliver(&event, listener.as_ref()) {
            break;
        }
        delivered += 1;
    }

    // Still active here means the store detached the sink on overflow
    if handle.unsubscribe() {
        tracing::warn!(
            subscription_id = %handle.id(),
            client_id = %handle.client(),
            room = %handle.room(),
            delivered,
            "Subscriber fell behind; subscription ended"
        );
    }

    tracing::trace!(
        subscription_id = %handle.id(),
        room = %handle.room(),
        delivered,
        "Delivery loop ended"
    );
}
