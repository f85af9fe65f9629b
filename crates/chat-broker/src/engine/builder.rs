//! ChatCore builder

use super::ChatCore;
use chat_common::ChatConfig;
use chat_core::{Clock, CoreResult, DomainError, MessageArchive, Scheduler, SystemClock};
use chat_store::{ManualScheduler, StoreConfig, TokioScheduler};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Builder for a `ChatCore`.
///
/// Unset collaborators default to the system clock and a tokio scheduler on the
/// runtime of the calling context.
#[derive(Default)]
pub struct ChatCoreBuilder {
    config: StoreConfig,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    archive: Option<Arc<dyn MessageArchive>>,
    runtime: Option<Handle>,
}

impl ChatCoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store limits
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Store limits taken from the application configuration
    pub fn chat_config(self, config: &ChatConfig) -> Self {
        self.config(StoreConfig::from(config))
    }

    /// Clock used for message and presence timestamps
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Scheduler used for typing expiry
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Drive both clock and expiry from virtual time
    pub fn manual_time(self, scheduler: &ManualScheduler) -> Self {
        self.clock(Arc::new(scheduler.clone()))
            .scheduler(Arc::new(scheduler.clone()))
    }

    /// Persist every appended message through `archive`
    pub fn archive(mut self, archive: Arc<dyn MessageArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Runtime for delivery tasks, archive writes, and the default scheduler
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the core.
    ///
    /// Fails with `InternalError` when no runtime was given and the caller is not
    /// inside one.
    pub fn build(self) -> CoreResult<ChatCore> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| {
                DomainError::InternalError(format!("no tokio runtime available: {e}"))
            })?,
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new(runtime.clone())));

        Ok(ChatCore::assemble(
            self.config,
            clock,
            scheduler,
            self.archive,
            runtime,
        ))
    }
}

impl std::fmt::Debug for ChatCoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCoreBuilder")
            .field("config", &self.config)
            .field("clock", &self.clock.is_some())
            .field("scheduler", &self.scheduler.is_some())
            .field("archive", &self.archive.is_some())
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}
