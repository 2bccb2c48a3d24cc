//! All-share index: geometric mean of the per-instrument running averages
//!
//! Computed in log space so that large instrument counts or extreme
//! price ratios cannot overflow or underflow the product.

use crate::averages::RunningAverage;
use stocks_common::StockError;

/// Geometric mean of the averages of every instrument with at least one
/// recorded trade: `exp(mean(ln(avg_i)))`.
///
/// Precondition: every contributing average is positive; quantity and
/// price invariants upstream guarantee this. A non-positive value
/// reaching this point is a programming error and is reported as
/// [`StockError::InvariantViolation`].
pub fn share_index<I>(averages: I) -> Result<f64, StockError>
where
    I: IntoIterator<Item = RunningAverage>,
{
    let mut log_sum = 0.0f64;
    let mut count = 0u32;

    for avg in averages {
        if avg.quantity() == 0 {
            continue;
        }
        let value = avg.average()?;
        debug_assert!(value > 0.0, "non-positive running average {value}");
        if value <= 0.0 {
            return Err(StockError::InvariantViolation(format!(
                "non-positive running average {value} in index input"
            )));
        }
        log_sum += value.ln();
        count += 1;
    }

    if count == 0 {
        return Err(StockError::NoData);
    }
    Ok((log_sum / f64::from(count)).exp())
}
