//! Trade aggregator configuration

use serde::{Deserialize, Serialize};
use stocks_common::constants::VOLUME_WINDOW_MILLIS;

/// Trade aggregator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Trailing window for the volume-weighted price, in milliseconds
    pub window_millis: i64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            window_millis: VOLUME_WINDOW_MILLIS,
        }
    }
}
