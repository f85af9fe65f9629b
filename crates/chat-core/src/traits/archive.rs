//! Durable message storage collaborator
//!
//! The core never waits on the archive: appended messages are handed over after the
//! append has completed, and failures are reported but never retried.

use async_trait::async_trait;

use crate::entities::Message;
use crate::error::CoreResult;

#[async_trait]
pub trait MessageArchive: Send + Sync {
    /// Persist an appended message
    async fn persist(&self, message: &Message) -> CoreResult<()>;
}
