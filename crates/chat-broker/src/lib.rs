//! # chat-broker
//!
//! Subscription broker and the `ChatCore` facade.
//!
//! ## Features
//!
//! - **Subscriptions**: backfill then live delivery, one delivery task per subscription
//! - **Room switching**: one subscription per client, the previous one torn down first
//! - **Failure isolation**: listener errors and panics are caught, logged, and counted
//! - **Backpressure**: bounded per-subscription buffers; a subscriber that falls behind is dropped
//! - **Connectivity**: a `watch` channel carrying the online/offline state
//! - **Client session**: `ChatClient` keeps a user's name, room, and subscription together
//!
//! ## Example
//!
//! ```ignore
//! use chat_broker::{ChatCore, FnListener};
//!
//! let core = ChatCore::builder().build()?;
//! let handle = core.subscribe(
//!     ClientId::generate(),
//!     &room,
//!     FnListener::new(
//!         |message| { println!("{}: {}", message.user, message.text); Ok(()) },
//!         |_presence| Ok(()),
//!     ),
//! )?;
//! core.append(&room, &user, "hello")?;
//! core.unsubscribe(&handle);
//! ```

pub mod broker;
pub mod client;
pub mod connectivity;
pub mod engine;
pub mod subscription;

// Re-export broker types
pub use broker::SubscriptionBroker;

// Re-export client types
pub use client::ChatClient;

// Re-export connectivity types
pub use connectivity::ConnectivitySignal;

// Re-export engine types
pub use engine::{ChatCore, ChatCoreBuilder};

// Re-export subscription types
pub use subscription::{
    FnListener, ListenerResult, RoomListener, SubscriptionHandle, SubscriptionId,
    SubscriptionStatus,
};
