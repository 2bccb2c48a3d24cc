//! Core value types for the stockdesk platform

use crate::constants::TICKER_LEN;
use crate::errors::StockError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Timestamp in milliseconds since UNIX epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ts(pub i64);

impl Ts {
    /// Current wall-clock timestamp
    #[must_use]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| std::time::Duration::from_secs(0));
        // Milliseconds fit comfortably in i64 for any realistic date
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        Self(duration.as_millis() as i64)
    }

    /// Create timestamp from milliseconds
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Get timestamp as milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Timestamp shifted back by `millis` (saturating)
    #[must_use]
    pub const fn minus_millis(&self, millis: i64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

impl fmt::Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Side of a trade. Carried for audit only; aggregation ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buying operation
    Buy,
    /// A selling operation
    Sell,
}

impl FromStr for Side {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "b" => Ok(Self::Buy),
            "sell" | "s" => Ok(Self::Sell),
            other => Err(StockError::Validation(format!(
                "unrecognized side: {other}"
            ))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Instrument identifier: exactly three uppercase ASCII letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticker([u8; TICKER_LEN]);

impl Ticker {
    /// Parse and validate a ticker string
    pub fn parse(s: &str) -> Result<Self, StockError> {
        let bytes = s.as_bytes();
        if bytes.len() != TICKER_LEN || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(StockError::Validation(format!(
                "ticker must be {TICKER_LEN} uppercase letters, got {s:?}"
            )));
        }
        let mut buf = [0u8; TICKER_LEN];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// The ticker as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII uppercase
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Ticker {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Ticker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ticker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
