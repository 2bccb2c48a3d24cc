//! Validated trade records and the append-only trade log

use std::sync::Mutex;
use stocks_common::{Side, StockError, Ticker, Ts};
use trade_aggregator::{TimeProvider, Trade};

/// An immutable, validated record of an executed trade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRecord {
    ticker: Ticker,
    timestamp: Ts,
    quantity: u64,
    price_per_share: f64,
    side: Side,
}

impl TradeRecord {
    /// The instrument traded
    #[must_use]
    pub const fn ticker(&self) -> Ticker {
        self.ticker
    }

    /// Instant the trade was agreed
    #[must_use]
    pub const fn timestamp(&self) -> Ts {
        self.timestamp
    }

    /// Number of shares traded
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Price paid per share
    #[must_use]
    pub const fn price_per_share(&self) -> f64 {
        self.price_per_share
    }

    /// Buy or sell
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// The aggregator-facing view of this record
    #[must_use]
    pub const fn as_trade(&self) -> Trade {
        Trade {
            ticker: self.ticker,
            timestamp: self.timestamp,
            quantity: self.quantity,
            price_per_share: self.price_per_share,
            side: self.side,
        }
    }
}

/// Builder that validates every field before a [`TradeRecord`] exists
#[derive(Debug, Default)]
pub struct TradeRecordBuilder {
    ticker: Option<Ticker>,
    timestamp: Option<Ts>,
    quantity: Option<u64>,
    price_per_share: Option<f64>,
    side: Option<Side>,
}

impl TradeRecordBuilder {
    /// Start an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instrument
    #[must_use]
    pub fn ticker(mut self, ticker: Ticker) -> Self {
        self.ticker = Some(ticker);
        self
    }

    /// Set the trade timestamp
    #[must_use]
    pub fn timestamp(mut self, timestamp: Ts) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the traded quantity
    #[must_use]
    pub fn quantity(mut self, quantity: u64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the price per share
    #[must_use]
    pub fn price(mut self, price_per_share: f64) -> Self {
        self.price_per_share = Some(price_per_share);
        self
    }

    /// Set the trade side
    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    /// Validate and build the record. The clock bounds the timestamp:
    /// a trade can never be agreed in the future.
    pub fn build(self, clock: &dyn TimeProvider) -> Result<TradeRecord, StockError> {
        let ticker = self
            .ticker
            .ok_or_else(|| StockError::Validation("missing ticker".into()))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| StockError::Validation("missing timestamp".into()))?;
        let quantity = self
            .quantity
            .ok_or_else(|| StockError::Validation("missing quantity".into()))?;
        let price_per_share = self
            .price_per_share
            .ok_or_else(|| StockError::Validation("missing price".into()))?;
        let side = self
            .side
            .ok_or_else(|| StockError::Validation("missing side".into()))?;

        if timestamp.as_millis() <= 0 {
            return Err(StockError::Validation(
                "timestamp has to be positive".into(),
            ));
        }
        if timestamp > clock.now() {
            return Err(StockError::Validation(
                "timestamp cannot be set in the future".into(),
            ));
        }
        if quantity == 0 {
            return Err(StockError::Validation("quantity has to be positive".into()));
        }
        if price_per_share <= 0.0 || !price_per_share.is_finite() {
            return Err(StockError::Validation("price has to be positive".into()));
        }

        Ok(TradeRecord {
            ticker,
            timestamp,
            quantity,
            price_per_share,
            side,
        })
    }
}

/// Append-only in-memory store of recorded trades.
///
/// A persistence-layer stand-in, not a queryable history; aggregate
/// queries go through the aggregator.
#[derive(Debug, Default)]
pub struct TradeLog {
    records: Mutex<Vec<TradeRecord>>,
}

impl TradeLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record
    pub fn store(&self, record: TradeRecord) {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record);
    }

    /// Number of records stored so far
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
