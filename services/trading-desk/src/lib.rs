//! Trading desk front-end
//!
//! The synchronous collaborators around the trade aggregator: the
//! instrument registry with its dividend and P/E arithmetic, validated
//! trade record construction, and the trade capture service that stores
//! records and notifies the aggregator.

pub mod service;
pub mod stocks;
pub mod trade;

pub use service::TradeService;
pub use stocks::{Stock, StockKind, StockRegistry};
pub use trade::{TradeLog, TradeRecord, TradeRecordBuilder};
