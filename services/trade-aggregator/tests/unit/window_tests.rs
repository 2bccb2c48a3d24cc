//! Tests for volume window admission order and eviction

use approx::assert_relative_eq;
use stocks_common::{StockError, Ts};
use trade_aggregator::{VolumeEntry, VolumeWindow};

const WINDOW: i64 = 15 * 60 * 1000;

fn entry(quantity: u64, price: f64, informed: i64, processed: i64) -> VolumeEntry {
    VolumeEntry::new(
        quantity,
        price,
        Ts::from_millis(informed),
        Ts::from_millis(processed),
    )
}

#[test]
fn test_backdated_trade_occupies_slot_by_admission_time() -> Result<(), StockError> {
    let now = 400 * WINDOW;
    let window = VolumeWindow::new();

    // A trade informed two hours ago but admitted just now is stored at
    // the tail and survives pruning, because eviction keys on the
    // processed timestamp
    window.append_and_prune(
        entry(2, 10.0, now - 2 * 60 * 60 * 1000, now),
        Ts::from_millis(now),
        WINDOW,
    );
    window.append_and_prune(entry(3, 10.0, now - 1_000, now), Ts::from_millis(now), WINDOW);
    assert_eq!(window.len(), 2);

    // The read-time filter still excludes it from the aggregate, since
    // its trade time is outside the trailing window
    let vwp = window.volume_weighted_price(Ts::from_millis(now), WINDOW)?;
    assert_relative_eq!(vwp, 10.0);
    Ok(())
}

#[test]
fn test_head_is_never_younger_than_any_other_entry() {
    let start = 400 * WINDOW;
    let window = VolumeWindow::new();

    // Admission order defines eviction order even when informed
    // timestamps arrive out of order
    for (offset, informed) in [(0i64, start - 5_000), (1_000, start - 90_000), (2_000, start)] {
        let processed = start + offset;
        window.append_and_prune(
            entry(1, 1.0, informed, processed),
            Ts::from_millis(processed),
            WINDOW,
        );
    }
    assert_eq!(window.len(), 3);

    // Advance far enough that only the last admission survives
    window.prune_expired(Ts::from_millis(start + 1_000 + WINDOW + 1), WINDOW);
    assert_eq!(window.len(), 1);
}

#[test]
fn test_repeated_prune_is_idempotent() {
    let now = 400 * WINDOW;
    let window = VolumeWindow::new();
    window.append_and_prune(entry(1, 2.0, now, now), Ts::from_millis(now), WINDOW);

    let later = Ts::from_millis(now + 2 * WINDOW);
    window.prune_expired(later, WINDOW);
    window.prune_expired(later, WINDOW);
    assert!(window.is_empty());
    assert!(matches!(
        window.volume_weighted_price(later, WINDOW),
        Err(StockError::NoData)
    ));
}

#[test]
fn test_concurrent_appends_all_admitted() {
    let now = 400 * WINDOW;
    let window = std::sync::Arc::new(VolumeWindow::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let window = std::sync::Arc::clone(&window);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    window.append_and_prune(
                        entry(1, 1.0, now, now),
                        Ts::from_millis(now),
                        WINDOW,
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("appender thread panicked");
    }

    assert_eq!(window.len(), 800);
}
