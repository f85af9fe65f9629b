//! Connectivity signal consumed by the view to enable or disable input

use serde::{Deserialize, Serialize};

/// Whether the core can currently accept and deliver traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connectivity {
    pub is_online: bool,
}

impl Connectivity {
    pub const ONLINE: Self = Self { is_online: true };
    pub const OFFLINE: Self = Self { is_online: false };

    /// Status label shown next to the indicator
    pub fn label(&self) -> &'static str {
        if self.is_online {
            "Online"
        } else {
            "Offline"
        }
    }
}

impl From<bool> for Connectivity {
    fn from(is_online: bool) -> Self {
        Self { is_online }
    }
}
