//! Instrument registry and per-instrument arithmetic
//!
//! Explicitly constructed and injectable: no static registry, tests
//! build a fresh one per case.

use rustc_hash::FxHashMap;
use stocks_common::{StockError, Ticker};

/// Dividend model of an instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StockKind {
    /// Dividend yield = last dividend / market price
    Common,
    /// Dividend yield = fixed dividend * par value / market price
    Preferred {
        /// The fixed dividend rate
        fixed_dividend: f64,
    },
}

/// A registered instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stock {
    ticker: Ticker,
    kind: StockKind,
    last_dividend: f64,
    par_value: f64,
}

impl Stock {
    /// The instrument's ticker
    #[must_use]
    pub const fn ticker(&self) -> Ticker {
        self.ticker
    }

    /// The instrument's dividend model
    #[must_use]
    pub const fn kind(&self) -> StockKind {
        self.kind
    }

    /// Dividend yield at the given market price
    pub fn dividend_yield(&self, market_price: f64) -> Result<f64, StockError> {
        if market_price <= 0.0 {
            return Err(StockError::Validation(format!(
                "market price must be positive, got {market_price}"
            )));
        }
        let yield_value = match self.kind {
            StockKind::Common => self.last_dividend / market_price,
            StockKind::Preferred { fixed_dividend } => {
                fixed_dividend * self.par_value / market_price
            }
        };
        Ok(yield_value)
    }

    /// P/E ratio at the given market price: price / last dividend.
    /// [`StockError::NoData`] for an instrument that pays no dividend.
    pub fn pe_ratio(&self, market_price: f64) -> Result<f64, StockError> {
        if market_price <= 0.0 {
            return Err(StockError::Validation(format!(
                "market price must be positive, got {market_price}"
            )));
        }
        if self.last_dividend == 0.0 {
            return Err(StockError::NoData);
        }
        Ok(market_price / self.last_dividend)
    }
}

/// Table of registered instruments keyed by ticker
#[derive(Debug, Default)]
pub struct StockRegistry {
    stocks: FxHashMap<Ticker, Stock>,
}

impl StockRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the reference instrument set
    pub fn with_seed_data() -> Result<Self, StockError> {
        let mut registry = Self::new();
        registry.register_common("TEA", 0.0, 100.0)?;
        registry.register_common("POP", 8.0, 100.0)?;
        registry.register_common("ALE", 23.0, 60.0)?;
        registry.register_preferred("GIN", 8.0, 2.0, 100.0)?;
        registry.register_common("JOE", 13.0, 250.0)?;
        Ok(registry)
    }

    /// Register a common stock
    pub fn register_common(
        &mut self,
        ticker: &str,
        last_dividend: f64,
        par_value: f64,
    ) -> Result<Ticker, StockError> {
        self.register(ticker, StockKind::Common, last_dividend, par_value)
    }

    /// Register a preferred stock with its fixed dividend rate
    pub fn register_preferred(
        &mut self,
        ticker: &str,
        last_dividend: f64,
        fixed_dividend: f64,
        par_value: f64,
    ) -> Result<Ticker, StockError> {
        if fixed_dividend < 0.0 {
            return Err(StockError::Validation(
                "fixed dividend cannot be below 0".into(),
            ));
        }
        self.register(
            ticker,
            StockKind::Preferred { fixed_dividend },
            last_dividend,
            par_value,
        )
    }

    fn register(
        &mut self,
        ticker: &str,
        kind: StockKind,
        last_dividend: f64,
        par_value: f64,
    ) -> Result<Ticker, StockError> {
        let ticker = Ticker::parse(ticker)?;
        if last_dividend < 0.0 {
            return Err(StockError::Validation(
                "last dividend cannot be below 0".into(),
            ));
        }
        if par_value < 0.0 {
            return Err(StockError::Validation("par value cannot be below 0".into()));
        }
        if self.stocks.contains_key(&ticker) {
            return Err(StockError::Validation(format!(
                "ticker {ticker} already exists"
            )));
        }
        self.stocks.insert(
            ticker,
            Stock {
                ticker,
                kind,
                last_dividend,
                par_value,
            },
        );
        Ok(ticker)
    }

    /// Look up an instrument by ticker
    pub fn by_ticker(&self, ticker: Ticker) -> Result<&Stock, StockError> {
        self.stocks
            .get(&ticker)
            .ok_or_else(|| StockError::UnknownTicker(ticker.to_string()))
    }

    /// All registered tickers
    pub fn tickers(&self) -> impl Iterator<Item = Ticker> + '_ {
        self.stocks.keys().copied()
    }

    /// All registered instruments
    pub fn all(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.values()
    }
}
