//! Tests for the geometric-mean share index

use anyhow::Result;
use approx::assert_relative_eq;
use stocks_common::StockError;
use trade_aggregator::{share_index, RunningAverage};

fn avg(quantity: u64, price: f64) -> RunningAverage {
    let mut a = RunningAverage::default();
    if quantity > 0 {
        a.add_trade(quantity, price);
    }
    a
}

#[test]
fn test_three_instrument_reference_value() -> Result<()> {
    // (2.0 * 4.5 * 3.0)^(1/3) = 3.0
    let index = share_index([avg(3, 2.0), avg(1, 4.5), avg(4, 3.0)])?;
    assert_relative_eq!(index, 3.0, max_relative = 1e-12);
    Ok(())
}

#[test]
fn test_single_instrument_index_is_its_average() -> Result<()> {
    let index = share_index([avg(7, 12.5)])?;
    assert_relative_eq!(index, 12.5, max_relative = 1e-12);
    Ok(())
}

#[test]
fn test_matches_log_space_definition() -> Result<()> {
    let averages = [avg(1, 0.5), avg(2, 17.25), avg(9, 101.0), avg(3, 3.75)];
    let expected = {
        let values = [0.5f64, 17.25, 101.0, 3.75];
        (values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64).exp()
    };
    assert_relative_eq!(share_index(averages)?, expected);
    Ok(())
}

#[test]
fn test_empty_input_is_no_data() {
    assert!(matches!(
        share_index(Vec::<RunningAverage>::new()),
        Err(StockError::NoData)
    ));
}

#[test]
fn test_zero_trade_instruments_never_change_the_result() -> Result<()> {
    let base = share_index([avg(3, 2.0), avg(1, 4.5)])?;
    let padded = share_index([avg(3, 2.0), avg(0, 0.0), avg(1, 4.5), avg(0, 99.0)])?;
    assert_relative_eq!(base, padded);
    Ok(())
}
