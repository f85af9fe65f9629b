//! Engine module
//!
//! The `ChatCore` facade: the only surface a view layer talks to.

mod builder;
mod facade;

pub use builder::ChatCoreBuilder;
pub use facade::ChatCore;
