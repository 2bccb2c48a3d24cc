//! Common constants used across the stockdesk services
//!
//! Single source of truth for all magic numbers.

// Time constants
pub const MILLIS_PER_SEC: i64 = 1000;
pub const SECS_PER_MIN: i64 = 60;
pub const MILLIS_PER_MIN: i64 = MILLIS_PER_SEC * SECS_PER_MIN;

/// Trailing window over which the volume-weighted price is computed
pub const VOLUME_WINDOW_MILLIS: i64 = 15 * MILLIS_PER_MIN;

/// Required length of an instrument ticker (uppercase ASCII letters)
pub const TICKER_LEN: usize = 3;
