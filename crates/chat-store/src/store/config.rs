//! Channel store tuning

use chat_common::ChatConfig;
use std::time::Duration;

/// Limits applied by the channel store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Messages kept per room; also the backfill size
    pub history_limit: usize,
    /// Idle time before a typing entry expires
    pub typing_ttl: Duration,
    /// Longest accepted message, in characters after trimming
    pub max_message_length: usize,
    /// Live events a sink may hold beyond its backfill before it is detached
    pub sink_buffer: usize,
}

impl StoreConfig {
    /// Channel capacity for a new sink: a full backfill, the presence snapshot,
    /// and `sink_buffer` live events
    pub fn sink_capacity(&self) -> usize {
        self.history_limit + 1 + self.sink_buffer
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            typing_ttl: Duration::from_millis(1500),
            max_message_length: 2000,
            sink_buffer: 1024,
        }
    }
}

impl From<&ChatConfig> for StoreConfig {
    fn from(config: &ChatConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            typing_ttl: config.typing_ttl(),
            max_message_length: config.max_message_length,
            sink_buffer: config.sink_buffer,
        }
    }
}
