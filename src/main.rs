use clap::{Parser, Subcommand};
use log::info;
use optionsim::{
    commands::{backtest, chart, snapshot},
    context::AppContext,
    models::Interval,
    signals::FusionMode,
};

#[derive(Parser)]
#[command(name = "optionsim")]
#[command(about = "An NSE index options paper-trading backtester")]
struct Cli {
    /// Use the synthetic random-walk candle source instead of live quotes
    #[arg(long, global = true)]
    paper: bool,
    /// Seed for the synthetic candle source
    #[arg(long, global = true, default_value_t = 7)]
    seed: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recent candles through the paper-trade engine and print the report
    Backtest {
        /// Index to trade (NIFTY, BANKNIFTY or FINNIFTY)
        symbol: String,
        /// How timeframes and strategies fuse into one tradable signal
        #[arg(long, value_enum, default_value_t = FusionMode::Agreement)]
        mode: FusionMode,
        /// Starting paper capital
        #[arg(long, default_value_t = 100_000.0)]
        capital: f64,
    },
    /// Print candles with indicator columns for one symbol
    Chart {
        /// Index to chart
        symbol: String,
        /// Candle interval
        #[arg(long, value_enum, default_value_t = Interval::M5)]
        interval: Interval,
        /// Keep only the most recent N rows instead of the last session day
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Latest five-minute indicator snapshot for every configured index
    Snapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Cli {
        paper,
        seed,
        command,
    } = cli;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting optionsim. Paper trading only. Not financial advice.");

    let app_context = AppContext::initialize(paper, seed)?;

    match command {
        Commands::Backtest {
            symbol,
            mode,
            capital,
        } => {
            backtest::run(&app_context, &symbol, mode, capital).await?;
        }
        Commands::Chart {
            symbol,
            interval,
            limit,
        } => {
            chart::run(&app_context, &symbol, interval, limit).await?;
        }
        Commands::Snapshot => {
            snapshot::run(&app_context).await?;
        }
    }

    Ok(())
}
