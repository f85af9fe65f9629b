//! # chat-store
//!
//! In-process channel store: one append-only message log and one typing-presence map
//! per room.
//!
//! ## Features
//!
//! - **Room logs**: monotonic per-room message IDs, bounded history, backfill snapshots
//! - **Typing presence**: heartbeat-refreshed entries with cancelable expiry
//! - **Event sinks**: every mutation is pushed, in order, to the sinks attached to its room
//! - **Schedulers**: a tokio-backed scheduler and a manually driven one for virtual time
//!
//! ## Example
//!
//! ```ignore
//! use chat_store::{ChannelStore, StoreConfig, TokioScheduler};
//!
//! let store = ChannelStore::new(
//!     StoreConfig::default(),
//!     Arc::new(SystemClock),
//!     Arc::new(TokioScheduler::current().unwrap()),
//! );
//!
//! let message = store.append(&room, &user, "hello")?;
//! store.set_typing(&room, &user, true);
//! ```

pub mod presence;
pub mod scheduler;
pub mod store;

// Re-export store types
pub use store::{ChannelStore, EventSink, SinkId, StoreConfig};

// Re-export presence types
pub use presence::TypingTracker;

// Re-export scheduler types
pub use scheduler::{ManualScheduler, TokioScheduler};
