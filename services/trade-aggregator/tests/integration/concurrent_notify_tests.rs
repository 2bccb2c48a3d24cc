//! Integration tests for concurrent trade notification

use anyhow::Result;
use approx::assert_relative_eq;
use std::sync::Arc;
use stocks_common::{Side, Ticker, Ts};
use tokio::task::JoinSet;
use trade_aggregator::{ManualClock, TimeProvider, Trade, TradeAggregator};

fn trade(ticker: Ticker, quantity: u64, price: f64, timestamp: Ts) -> Trade {
    Trade {
        ticker,
        timestamp,
        quantity,
        price_per_share: price,
        side: if quantity % 2 == 0 { Side::Buy } else { Side::Sell },
    }
}

#[tokio::test]
async fn test_concurrent_single_instrument_notification() -> Result<()> {
    let clock = Arc::new(ManualClock::new(Ts::from_millis(1_700_000_000_000)));
    let aggregator = Arc::new(TradeAggregator::with_clock(clock.clone()));
    let ticker = Ticker::parse("TEA")?;

    let num_producers = 10u64;
    let trades_per_producer = 100u64;
    let mut join_set = JoinSet::new();

    for _ in 0..num_producers {
        let aggregator = Arc::clone(&aggregator);
        let clock = Arc::clone(&clock);
        join_set.spawn(async move {
            for i in 0..trades_per_producer {
                aggregator
                    .notify_trade(trade(ticker, 1 + i % 3, 10.0, clock.now()))
                    .await;
                if i % 10 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        });
    }
    while let Some(result) = join_set.join_next().await {
        result?;
    }
    aggregator.drain().await;

    // Every trade was at 10.0, so whatever the interleaving, both
    // aggregates must land exactly there
    assert_relative_eq!(aggregator.calculate_volume_weighted()?, 10.0);
    assert_relative_eq!(
        aggregator.calculate_share_index().await?,
        10.0,
        max_relative = 1e-9
    );
    assert_eq!(aggregator.fault_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_multi_instrument_notification() -> Result<()> {
    let clock = Arc::new(ManualClock::new(Ts::from_millis(1_700_000_000_000)));
    let aggregator = Arc::new(TradeAggregator::with_clock(clock.clone()));

    let instruments = [
        (Ticker::parse("TEA")?, 2.0f64),
        (Ticker::parse("POP")?, 4.5),
        (Ticker::parse("ALE")?, 3.0),
        (Ticker::parse("GIN")?, 8.0),
        (Ticker::parse("JOE")?, 1.25),
    ];
    let trades_per_instrument = 200u64;
    let mut join_set = JoinSet::new();

    for (ticker, price) in instruments {
        let aggregator = Arc::clone(&aggregator);
        let clock = Arc::clone(&clock);
        join_set.spawn(async move {
            for i in 0..trades_per_instrument {
                aggregator
                    .notify_trade(trade(ticker, 1 + i % 4, price, clock.now()))
                    .await;
            }
        });
    }
    while let Some(result) = join_set.join_next().await {
        result?;
    }
    aggregator.drain().await;

    // Each instrument traded at a single constant price, so its running
    // average is that price and the index is the geometric mean
    let expected_index = (instruments
        .iter()
        .map(|(_, price)| price.ln())
        .sum::<f64>()
        / instruments.len() as f64)
        .exp();
    assert_relative_eq!(
        aggregator.calculate_share_index().await?,
        expected_index,
        max_relative = 1e-9
    );
    assert_eq!(aggregator.fault_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_aggregator_accepts_work_after_drain() -> Result<()> {
    let clock = Arc::new(ManualClock::new(Ts::from_millis(1_700_000_000_000)));
    let aggregator = TradeAggregator::with_clock(clock.clone());
    let ticker = Ticker::parse("TEA")?;

    aggregator.notify_trade(trade(ticker, 2, 3.0, clock.now())).await;
    aggregator.drain().await;
    assert_relative_eq!(aggregator.calculate_volume_weighted()?, 3.0);

    // drain() is await-idle, not shutdown: further notifications work
    aggregator.notify_trade(trade(ticker, 2, 5.0, clock.now())).await;
    aggregator.drain().await;
    assert_relative_eq!(aggregator.calculate_volume_weighted()?, 4.0);
    Ok(())
}

#[tokio::test]
async fn test_no_visibility_guarantee_before_drain() -> Result<()> {
    // Queries before drain() must be well-formed even if the spawned
    // work has not completed: either NoData or a valid partial result
    let clock = Arc::new(ManualClock::new(Ts::from_millis(1_700_000_000_000)));
    let aggregator = TradeAggregator::with_clock(clock.clone());

    aggregator
        .notify_trade(trade(Ticker::parse("TEA")?, 3, 2.0, clock.now()))
        .await;

    match aggregator.calculate_volume_weighted() {
        Ok(value) => assert!(value > 0.0 && value.is_finite()),
        Err(err) => assert!(matches!(err, stocks_common::StockError::NoData)),
    }
    aggregator.drain().await;
    assert_relative_eq!(aggregator.calculate_volume_weighted()?, 2.0);
    Ok(())
}
