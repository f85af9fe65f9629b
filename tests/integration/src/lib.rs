//! Integration test utilities for the chat core
//!
//! This crate provides helpers for driving a `ChatCore` end to end: a core on
//! virtual time, recording listeners, and bounded receive helpers.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
