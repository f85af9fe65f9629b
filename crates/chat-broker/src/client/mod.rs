//! Client session module

mod session;

pub use session::ChatClient;
