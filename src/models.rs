use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One OHLCV bar. Candles reaching the engine are finite and ordered
/// ascending by time; the ingestion boundary enforces both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Interval {
    #[serde(rename = "5m")]
    #[value(name = "5m")]
    M5,
    #[serde(rename = "15m")]
    #[value(name = "15m")]
    M15,
    #[serde(rename = "1d")]
    #[value(name = "1d")]
    D1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::D1 => "1d",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Interval::M5 => 5,
            Interval::M15 => 15,
            Interval::D1 => 24 * 60,
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Interval::D1)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-bar indicator values, attached 1:1 to a candle. A field is `None`
/// until enough lookback exists (RSI needs 14 prior deltas, Bollinger 20
/// bars) or when its defining ratio has no value for the bar.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub vwap: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    None,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::None => "NONE",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one strategy concluded for one bar. Never persisted beyond the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub signal: Signal,
    pub confidence: u8,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Ce,
    Pe,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Ce => "CE",
            OptionType::Pe => "PE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "SL HIT")]
    SlHit,
    #[serde(rename = "TARGET HIT")]
    TargetHit,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Open => "OPEN",
            TradeStatus::SlHit => "SL HIT",
            TradeStatus::TargetHit => "TARGET HIT",
        }
    }
}

/// The single synthetic option position. At most one exists per run and it
/// is owned by the backtest driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub symbol: String,
    pub expiry: String,
    pub strike: i64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub entry: f64,
    #[serde(rename = "sl")]
    pub stop_loss: f64,
    pub target: f64,
    #[serde(rename = "trail")]
    pub trailing_active: bool,
    pub status: TradeStatus,
}

/// Closed-trade snapshot. Append-only; the wire shape is the trade fields
/// plus exit and pnl, matching the journal rows the frontend consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntry {
    #[serde(flatten)]
    pub trade: Trade,
    pub exit: f64,
    pub pnl: f64,
}

/// Paper account for one run. Mutated only when a trade closes.
#[derive(Debug, Clone)]
pub struct Account {
    pub capital: f64,
}

impl Account {
    pub fn new(capital: f64) -> Self {
        Self { capital }
    }
}

/// One annotated bar of driver output.
#[derive(Debug, Clone, Serialize)]
pub struct BarRecord {
    pub time: DateTime<Utc>,
    pub spot: f64,
    pub premium: f64,
    pub signal: Signal,
    pub capital: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<Trade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketStatus {
    #[serde(rename = "MARKET LIVE")]
    MarketLive,
    #[serde(rename = "MARKET CLOSED")]
    MarketClosed,
    #[serde(rename = "NO DATA")]
    NoData,
}

impl MarketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::MarketLive => "MARKET LIVE",
            MarketStatus::MarketClosed => "MARKET CLOSED",
            MarketStatus::NoData => "NO DATA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataMode {
    #[serde(rename = "LIVE")]
    Live,
    #[serde(rename = "LAST ONE DAY DATA")]
    LastDay,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Live => "LIVE",
            DataMode::LastDay => "LAST ONE DAY DATA",
        }
    }
}

/// Full driver output for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub market_status: MarketStatus,
    pub data_mode: DataMode,
    pub last_data_time: Option<DateTime<Utc>>,
    pub capital: f64,
    pub journal: Vec<JournalEntry>,
    pub candles: Vec<BarRecord>,
}

/// Candle plus its indicator snapshot, the row shape of the chart and
/// snapshot commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub ema9: Option<f64>,
    pub ema21: Option<f64>,
    pub vwap: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub volume: f64,
}

impl SnapshotRow {
    pub fn new(candle: &Candle, snapshot: &IndicatorSnapshot) -> Self {
        Self {
            time: candle.time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            ema9: snapshot.ema9,
            ema21: snapshot.ema21,
            vwap: snapshot.vwap,
            macd: snapshot.macd,
            macd_signal: snapshot.macd_signal,
            macd_hist: snapshot.macd_hist,
            rsi: snapshot.rsi,
            bb_upper: snapshot.bb_upper,
            bb_lower: snapshot.bb_lower,
            volume: candle.volume,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("no usable candle data for {symbol} ({interval})")]
    NoData { symbol: String, interval: Interval },
    #[error("quote request failed: {0}")]
    QuoteHttp(#[from] reqwest::Error),
    #[error("quote response malformed: {0}")]
    QuoteDecode(String),
    #[error("no candle series supplied")]
    MissingSeries,
}

/// Numeric boundary contract: non-finite values become an explicit absent
/// marker instead of leaking NaN/Inf into indicator or report output.
pub fn sanitize_value(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
