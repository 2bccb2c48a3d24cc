//! Trade capture: build, store, notify

use crate::stocks::StockRegistry;
use crate::trade::{TradeLog, TradeRecordBuilder};
use std::sync::Arc;
use stocks_common::{Side, StockError, Ticker, Ts};
use tracing::info;
use trade_aggregator::{TimeProvider, TradeAggregator};

/// Records validated trades: appends them to the trade log and notifies
/// the aggregator (fire-and-forget).
pub struct TradeService {
    registry: Arc<StockRegistry>,
    log: TradeLog,
    aggregator: Arc<TradeAggregator>,
    clock: Arc<dyn TimeProvider>,
}

impl TradeService {
    /// Wire the service to its collaborators
    #[must_use]
    pub fn new(
        registry: Arc<StockRegistry>,
        aggregator: Arc<TradeAggregator>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            registry,
            log: TradeLog::new(),
            aggregator,
            clock,
        }
    }

    /// Record a trade: resolve the ticker, validate and build the
    /// record, append it to the log, and notify the aggregator.
    ///
    /// Returns once the aggregation work is scheduled, not applied.
    pub async fn record_trade(
        &self,
        ticker: Ticker,
        timestamp: Ts,
        quantity: u64,
        side: Side,
        price_per_share: f64,
    ) -> Result<(), StockError> {
        // The ticker must resolve to a known instrument before anything
        // is stored
        let stock = self.registry.by_ticker(ticker)?;

        let record = TradeRecordBuilder::new()
            .ticker(stock.ticker())
            .timestamp(timestamp)
            .quantity(quantity)
            .price(price_per_share)
            .side(side)
            .build(self.clock.as_ref())?;

        self.log.store(record);
        self.aggregator.notify_trade(record.as_trade()).await;

        info!(
            %ticker,
            quantity,
            price = price_per_share,
            %side,
            "trade recorded"
        );
        Ok(())
    }

    /// Number of trades recorded so far
    pub fn recorded_trades(&self) -> usize {
        self.log.len()
    }
}
