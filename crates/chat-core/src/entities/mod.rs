//! Domain entities - core chat objects

mod connectivity;
mod message;
mod presence;

pub use connectivity::Connectivity;
pub use message::Message;
pub use presence::{PresenceEntry, PresenceSnapshot};
