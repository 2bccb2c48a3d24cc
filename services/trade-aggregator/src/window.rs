//! Rolling time-windowed cache of trade volume
//!
//! Entries are appended in processing order, so the head of the deque is
//! never younger than any other entry and eviction only ever removes a
//! prefix from the oldest end.

use std::collections::VecDeque;
use std::sync::Mutex;
use stocks_common::{StockError, Ts};
use tracing::trace;

/// One admitted trade's contribution to the volume window
#[derive(Debug, Clone, Copy)]
pub struct VolumeEntry {
    /// Traded quantity
    pub quantity: u64,
    /// Notional volume: price * quantity
    pub notional: f64,
    /// Timestamp the trade was agreed (carried on the trade itself)
    pub informed_ts: Ts,
    /// Instant the entry was admitted into the window
    pub processed_ts: Ts,
}

impl VolumeEntry {
    /// Build an entry from trade data, stamping it with the admission
    /// instant
    #[must_use]
    pub fn new(quantity: u64, price_per_share: f64, informed_ts: Ts, processed_ts: Ts) -> Self {
        #[allow(clippy::cast_precision_loss)]
        Self {
            quantity,
            notional: price_per_share * quantity as f64,
            informed_ts,
            processed_ts,
        }
    }
}

/// Append-ordered store of [`VolumeEntry`] with amortized head eviction
#[derive(Debug, Default)]
pub struct VolumeWindow {
    entries: Mutex<VecDeque<VolumeEntry>>,
}

impl VolumeWindow {
    /// Create an empty window
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<VolumeEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append `entry` at the tail, then evict every entry at the head
    /// whose processed timestamp has aged out of the trailing window.
    ///
    /// Eviction runs on the write path after every append rather than on
    /// a timer; the deque's lock makes one pruner at a time the rule.
    pub fn append_and_prune(&self, entry: VolumeEntry, now: Ts, window_millis: i64) {
        let mut entries = self.lock();
        entries.push_back(entry);
        Self::prune_locked(&mut entries, now, window_millis);
    }

    /// Evict expired entries from the head without appending
    pub fn prune_expired(&self, now: Ts, window_millis: i64) {
        let mut entries = self.lock();
        Self::prune_locked(&mut entries, now, window_millis);
    }

    fn prune_locked(entries: &mut VecDeque<VolumeEntry>, now: Ts, window_millis: i64) {
        let expired = now.minus_millis(window_millis);
        let mut evicted = 0usize;
        while let Some(oldest) = entries.front() {
            if oldest.processed_ts >= expired {
                // Head is the oldest processed entry; nothing behind it
                // can be expired either
                break;
            }
            entries.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            trace!(evicted, remaining = entries.len(), "pruned volume window");
        }
    }

    /// Volume-weighted price over entries inside the trailing window.
    ///
    /// The read filters on the trade's informed timestamp, mirroring the
    /// destructive prune's processed-timestamp policy only for storage:
    /// a backdated trade occupies a slot for as long as its admission
    /// time is recent, but stops contributing once its trade time falls
    /// out of the window.
    pub fn volume_weighted_price(&self, now: Ts, window_millis: i64) -> Result<f64, StockError> {
        let expired = now.minus_millis(window_millis);
        let (notional, quantity) = {
            let entries = self.lock();
            entries
                .iter()
                .filter(|entry| entry.informed_ts >= expired)
                .fold((0.0f64, 0u64), |(notional, quantity), entry| {
                    (notional + entry.notional, quantity + entry.quantity)
                })
        };

        if quantity == 0 {
            return Err(StockError::NoData);
        }
        if notional <= 0.0 {
            return Err(StockError::InvariantViolation(format!(
                "non-positive window notional {notional} with quantity {quantity}"
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(notional / quantity as f64)
    }

    /// Number of entries currently held (expired or not)
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when the window holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
