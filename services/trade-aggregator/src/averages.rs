//! Per-instrument running price averages
//!
//! One accumulator per ticker, never evicted. Different tickers mutate
//! independently; the table lock is only held to look up or insert an
//! entry, never across an accumulation.

use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use stocks_common::{StockError, Ticker};
use tokio::sync::RwLock;
use tracing::warn;

/// Volume-weighted running average for a single instrument
#[derive(Debug, Default, Clone, Copy)]
pub struct RunningAverage {
    /// Cumulative price * quantity
    notional: f64,
    /// Cumulative quantity
    quantity: u64,
}

impl RunningAverage {
    /// Fold a trade into the accumulator. Commutative, so the final
    /// totals do not depend on arrival order.
    pub fn add_trade(&mut self, quantity: u64, price_per_share: f64) {
        #[allow(clippy::cast_precision_loss)]
        {
            self.notional += price_per_share * quantity as f64;
        }
        self.quantity += quantity;
    }

    /// Total traded quantity recorded so far
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Volume-weighted average price, or [`StockError::NoData`] when no
    /// trade has been recorded yet
    pub fn average(&self) -> Result<f64, StockError> {
        if self.quantity == 0 {
            return Err(StockError::NoData);
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(self.notional / self.quantity as f64)
    }
}

/// Table of per-ticker running averages with safe concurrent first-seen
/// insertion
#[derive(Debug, Default)]
pub struct AverageTable {
    entries: RwLock<FxHashMap<Ticker, Arc<Mutex<RunningAverage>>>>,
}

impl AverageTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table pre-seeded with the given tickers
    pub async fn with_tickers(tickers: impl IntoIterator<Item = Ticker>) -> Self {
        let table = Self::new();
        {
            let mut entries = table.entries.write().await;
            for ticker in tickers {
                entries.entry(ticker).or_default();
            }
        }
        table
    }

    /// Pre-register a ticker so the index snapshot knows about it even
    /// before its first trade
    pub async fn register(&self, ticker: Ticker) {
        let mut entries = self.entries.write().await;
        entries.entry(ticker).or_default();
    }

    /// Apply a trade to the ticker's accumulator, creating the entry on
    /// first use
    pub async fn add_trade(&self, ticker: Ticker, quantity: u64, price_per_share: f64) {
        let entry = {
            let entries = self.entries.read().await;
            entries.get(&ticker).map(Arc::clone)
        };

        let entry = match entry {
            Some(entry) => entry,
            None => {
                // First trade for an unregistered ticker
                let mut entries = self.entries.write().await;
                Arc::clone(entries.entry(ticker).or_default())
            }
        };

        match entry.lock() {
            Ok(mut avg) => avg.add_trade(quantity, price_per_share),
            Err(poisoned) => {
                // A panicked holder cannot leave a partial update here:
                // both fields are written before any code that can panic
                warn!(%ticker, "average entry lock poisoned, recovering");
                poisoned.into_inner().add_trade(quantity, price_per_share);
            }
        };
    }

    /// Running average for a single ticker
    pub async fn average(&self, ticker: Ticker) -> Result<f64, StockError> {
        let entries = self.entries.read().await;
        let entry = entries
            .get(&ticker)
            .ok_or_else(|| StockError::UnknownTicker(ticker.to_string()))?;
        let avg = entry.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        avg.average()
    }

    /// Snapshot of every accumulator that has recorded at least one trade
    pub async fn snapshot_with_data(&self) -> Vec<RunningAverage> {
        let entries = self.entries.read().await;
        entries
            .values()
            .map(|entry| {
                *entry
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
            })
            .filter(|avg| avg.quantity() > 0)
            .collect()
    }
}
