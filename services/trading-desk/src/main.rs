//! Trading desk console
//!
//! Interactive menu over the instrument registry, the trade capture
//! service and the aggregate queries.

use anyhow::Result;
use chrono::DateTime;
use clap::Parser;
use std::io::{BufRead, Write};
use std::sync::Arc;
use stocks_common::{Side, StockError, Ticker, Ts};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trade_aggregator::{AggregatorConfig, SystemClock, TimeProvider, TradeAggregator};
use trading_desk::{StockRegistry, TradeService};

const SERVICE_NAME: &str = "trading-desk";

/// Command-line options
#[derive(Debug, Parser)]
#[command(name = SERVICE_NAME, about = "Interactive stock trading console")]
struct Args {
    /// Override the volume-weighted price window, in minutes
    #[arg(long)]
    window_mins: Option<i64>,
}

struct Console<R, W> {
    input: R,
    output: W,
    registry: Arc<StockRegistry>,
    service: TradeService,
    aggregator: Arc<TradeAggregator>,
    clock: Arc<dyn TimeProvider>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    fn new(
        input: R,
        output: W,
        registry: Arc<StockRegistry>,
        aggregator: Arc<TradeAggregator>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        let service = TradeService::new(
            Arc::clone(&registry),
            Arc::clone(&aggregator),
            Arc::clone(&clock),
        );
        Self {
            input,
            output,
            registry,
            service,
            aggregator,
            clock,
        }
    }

    async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "------------------------------------")?;
            writeln!(self.output, "1. Calculate dividend yield")?;
            writeln!(self.output, "2. Calculate P/E ratio")?;
            writeln!(self.output, "3. Record trade")?;
            writeln!(self.output, "4. Calculate volume-weighted stock price")?;
            writeln!(self.output, "5. Calculate all-share index")?;
            writeln!(self.output, "6. Exit")?;
            let choice = self.prompt("Choose an option: ")?;

            let outcome = match choice.as_str() {
                "1" => self.dividend_yield(),
                "2" => self.pe_ratio(),
                "3" => self.record_trade().await,
                "4" => self.volume_weighted(),
                "5" => self.share_index().await,
                "6" => {
                    // Let in-flight aggregation finish before quitting
                    self.aggregator.drain().await;
                    writeln!(self.output, "Bye!!")?;
                    return Ok(());
                }
                other => {
                    writeln!(self.output, "Unrecognized option: {other}")?;
                    continue;
                }
            };

            if let Err(err) = outcome {
                match err.downcast_ref::<StockError>() {
                    Some(StockError::NoData) => writeln!(self.output, "No data yet")?,
                    Some(stock_err) => writeln!(self.output, "Error: {stock_err}")?,
                    None => return Err(err),
                }
            }
        }
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            anyhow::bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    fn prompt_ticker(&mut self) -> Result<Ticker> {
        let raw = self.prompt("Ticker? ")?;
        Ok(Ticker::parse(&raw.to_ascii_uppercase())?)
    }

    fn prompt_price(&mut self) -> Result<f64> {
        let raw = self.prompt("Price? ")?;
        raw.parse::<f64>()
            .map_err(|_| StockError::Validation(format!("not a price: {raw}")).into())
    }

    fn dividend_yield(&mut self) -> Result<()> {
        let ticker = self.prompt_ticker()?;
        let price = self.prompt_price()?;
        let stock = self.registry.by_ticker(ticker)?;
        let yield_value = stock.dividend_yield(price)?;
        writeln!(self.output, "Dividend yield for {ticker}: {yield_value}")?;
        Ok(())
    }

    fn pe_ratio(&mut self) -> Result<()> {
        let ticker = self.prompt_ticker()?;
        let price = self.prompt_price()?;
        let stock = self.registry.by_ticker(ticker)?;
        let ratio = stock.pe_ratio(price)?;
        writeln!(self.output, "P/E ratio for {ticker}: {ratio}")?;
        Ok(())
    }

    async fn record_trade(&mut self) -> Result<()> {
        let ticker = self.prompt_ticker()?;
        let timestamp = self.prompt_timestamp()?;
        let side: Side = self.prompt("Operation (Buy/Sell)? ")?.parse::<Side>()?;
        let quantity_raw = self.prompt("Quantity? ")?;
        let quantity = quantity_raw
            .parse::<u64>()
            .map_err(|_| StockError::Validation(format!("not a quantity: {quantity_raw}")))?;
        let price = self.prompt_price()?;

        self.service
            .record_trade(ticker, timestamp, quantity, side, price)
            .await?;
        writeln!(self.output, "Trade recorded")?;
        Ok(())
    }

    fn prompt_timestamp(&mut self) -> Result<Ts> {
        let raw = self.prompt("Timestamp (RFC 3339 or millis, empty for current)? ")?;
        if raw.is_empty() {
            return Ok(self.clock.now());
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Ts::from_millis(datetime.timestamp_millis()));
        }
        raw.parse::<i64>().map(Ts::from_millis).map_err(|_| {
            StockError::Validation(format!("not a timestamp: {raw}")).into()
        })
    }

    fn volume_weighted(&mut self) -> Result<()> {
        let price = self.aggregator.calculate_volume_weighted()?;
        writeln!(self.output, "Volume-weighted stock price: {price}")?;
        Ok(())
    }

    async fn share_index(&mut self) -> Result<()> {
        let index = self.aggregator.calculate_share_index().await?;
        writeln!(self.output, "All-share index: {index}")?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("{}=info", SERVICE_NAME.replace('-', "_")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = AggregatorConfig::default();
    if let Some(window_mins) = args.window_mins {
        anyhow::ensure!(window_mins > 0, "window must be positive");
        config.window_millis = window_mins * 60 * 1000;
    }

    let clock: Arc<dyn TimeProvider> = Arc::new(SystemClock);
    let registry = Arc::new(StockRegistry::with_seed_data()?);
    let aggregator = Arc::new(TradeAggregator::with_config(config, Arc::clone(&clock)));
    aggregator.register_tickers(registry.tickers()).await;

    info!(service = SERVICE_NAME, "starting console");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut console = Console::new(
        stdin.lock(),
        stdout.lock(),
        registry,
        aggregator,
        clock,
    );
    console.run().await
}
