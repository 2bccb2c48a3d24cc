//! Trade Aggregator Service
//!
//! Receives trade notifications asynchronously and answers two aggregate
//! queries over the concurrently-mutated state:
//! - trailing volume-weighted price over a fixed 15-minute window
//! - geometric-mean share index across all tracked instruments
//!
//! The notifying caller is never blocked by aggregation work: each
//! notification is dispatched to an unbounded task pool. This is a
//! deliberate, backpressure-free choice carried over from the original
//! design; under sustained high trade rates, outstanding aggregation
//! tasks can accumulate without bound.

pub mod averages;
pub mod clock;
pub mod config;
pub mod index;
pub mod window;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use stocks_common::{Side, StockError, Ticker, Ts};
use tokio::task::JoinSet;
use tracing::{debug, error};

pub use averages::{AverageTable, RunningAverage};
pub use clock::{ManualClock, SystemClock, TimeProvider};
pub use config::AggregatorConfig;
pub use index::share_index;
pub use window::{VolumeEntry, VolumeWindow};

/// A validated, immutable trade as consumed from the trading collaborator.
///
/// Validation (positive quantity and price, non-future timestamp, known
/// ticker) happens before this crate is invoked; it is not repeated here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    /// Instrument the trade refers to
    pub ticker: Ticker,
    /// Instant the trade was agreed
    pub timestamp: Ts,
    /// Number of shares traded
    pub quantity: u64,
    /// Price paid per share
    pub price_per_share: f64,
    /// Buy or sell; carried for audit only
    pub side: Side,
}

/// Fire-and-forget trade aggregation façade.
///
/// Owns the volume window and the per-instrument average table for the
/// process lifetime; constructed explicitly (no static state) so tests
/// build a fresh instance per case.
pub struct TradeAggregator {
    config: AggregatorConfig,
    clock: Arc<dyn TimeProvider>,
    window: Arc<VolumeWindow>,
    averages: Arc<AverageTable>,
    tasks: tokio::sync::Mutex<JoinSet<()>>,
    faults: AtomicU64,
}

impl TradeAggregator {
    /// Create an aggregator on the wall clock with the default window
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an aggregator with an injected time source
    #[must_use]
    pub fn with_clock(clock: Arc<dyn TimeProvider>) -> Self {
        Self::with_config(AggregatorConfig::default(), clock)
    }

    /// Create an aggregator with explicit configuration and time source
    #[must_use]
    pub fn with_config(config: AggregatorConfig, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            config,
            clock,
            window: Arc::new(VolumeWindow::new()),
            averages: Arc::new(AverageTable::new()),
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
            faults: AtomicU64::new(0),
        }
    }

    /// Pre-register tickers so their average entries exist before any
    /// trade arrives. Unseen tickers are still created on first use.
    pub async fn register_tickers(&self, tickers: impl IntoIterator<Item = Ticker>) {
        for ticker in tickers {
            self.averages.register(ticker).await;
        }
    }

    /// Schedule asynchronous aggregation of `trade` and return
    /// immediately.
    ///
    /// The spawned task admits the trade into the volume window (append
    /// then prune) and folds it into the ticker's running average.
    /// There is no synchronous-visibility guarantee: queries may not
    /// reflect this trade until the task has completed (see [`Self::drain`]).
    pub async fn notify_trade(&self, trade: Trade) {
        let window = Arc::clone(&self.window);
        let averages = Arc::clone(&self.averages);
        let clock = Arc::clone(&self.clock);
        let window_millis = self.config.window_millis;

        let mut tasks = self.tasks.lock().await;
        // Reap already-finished tasks so the set does not grow with the
        // total trade count
        while let Some(result) = tasks.try_join_next() {
            self.record_task_result(result);
        }
        tasks.spawn(async move {
            let processed_ts = clock.now();
            let entry = VolumeEntry::new(
                trade.quantity,
                trade.price_per_share,
                trade.timestamp,
                processed_ts,
            );
            window.append_and_prune(entry, processed_ts, window_millis);
            averages
                .add_trade(trade.ticker, trade.quantity, trade.price_per_share)
                .await;
            debug!(
                ticker = %trade.ticker,
                quantity = trade.quantity,
                price = trade.price_per_share,
                side = %trade.side,
                "aggregated trade"
            );
        });
    }

    /// Trailing volume-weighted price across all instruments, or
    /// [`StockError::NoData`] when no trade falls inside the window
    pub fn calculate_volume_weighted(&self) -> Result<f64, StockError> {
        self.window
            .volume_weighted_price(self.clock.now(), self.config.window_millis)
    }

    /// Geometric-mean share index over every instrument with at least
    /// one recorded trade, or [`StockError::NoData`] when none has any
    pub async fn calculate_share_index(&self) -> Result<f64, StockError> {
        share_index(self.averages.snapshot_with_data().await)
    }

    /// Await every aggregation task in flight when the call was made.
    ///
    /// Deterministic replacement for the original pool shutdown+join:
    /// after `drain` returns, all trades notified before it started are
    /// visible to the queries, and the aggregator keeps accepting new
    /// work. The task set is swapped out under the lock, so concurrent
    /// [`Self::notify_trade`] callers are never held up while the drain
    /// awaits; their tasks land in the fresh set for a later drain.
    pub async fn drain(&self) {
        let mut drained = {
            let mut tasks = self.tasks.lock().await;
            std::mem::take(&mut *tasks)
        };
        while let Some(result) = drained.join_next().await {
            self.record_task_result(result);
        }
    }

    /// Number of aggregation tasks that failed instead of applying their
    /// update. The caller was already told "scheduled", so failures are
    /// surfaced here rather than silently dropped.
    pub fn fault_count(&self) -> u64 {
        self.faults.load(Ordering::SeqCst)
    }

    fn record_task_result(&self, result: Result<(), tokio::task::JoinError>) {
        if let Err(err) = result {
            self.faults.fetch_add(1, Ordering::SeqCst);
            error!(error = %err, "aggregation task failed; update was dropped");
        }
    }
}

impl Default for TradeAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TradeAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeAggregator")
            .field("config", &self.config)
            .field("window", &self.window)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}
