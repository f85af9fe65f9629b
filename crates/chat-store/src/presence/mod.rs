//! Presence module.
//!
//! Tracks typing indicators and their expiry timers.

mod typing;

pub use typing::TypingTracker;
