use chrono::{TimeZone, Utc};
use futures::future::BoxFuture;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SymbolSpec;
use crate::models::{Candle, DataMode, EngineError, Interval};
use crate::provider::{build_candle, filter_session_candles, MarketDataProvider, MarketSeries};

const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) optionsim/0.1";
const INTRADAY_RANGE: &str = "7d";
const FALLBACK_INTERVAL: &str = "1d";
const FALLBACK_RANGE: &str = "2d";

/// Candle source backed by the Yahoo Finance chart endpoint. Intraday
/// windows come first; an empty or failed intraday fetch falls back to
/// daily candles before giving up.
pub struct YahooProvider {
    http: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, EngineError> {
        Self::with_base_url(CHART_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, EngineError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn fetch_window(
        &self,
        ticker: &str,
        interval: &str,
        range: &str,
    ) -> Result<Vec<Candle>, EngineError> {
        let url = format!("{}/{}", self.base_url, ticker);
        let response = self
            .http
            .get(&url)
            .query(&[("interval", interval), ("range", range)])
            .send()
            .await?
            .error_for_status()?;
        let payload: ChartResponse = response.json().await?;
        decode_chart(payload)
    }

    async fn fetch_series(
        &self,
        spec: &SymbolSpec,
        interval: Interval,
    ) -> Result<MarketSeries, EngineError> {
        let intraday = match self
            .fetch_window(&spec.ticker, interval.as_str(), INTRADAY_RANGE)
            .await
        {
            Ok(candles) => candles,
            Err(error) => {
                warn!(
                    "{} {} fetch failed, trying daily fallback: {}",
                    spec.symbol,
                    interval.as_str(),
                    error
                );
                Vec::new()
            }
        };

        let mut mode = DataMode::Live;
        let mut candles = filter_session_candles(interval, intraday);

        if candles.is_empty() {
            mode = DataMode::LastDay;
            candles = match self
                .fetch_window(&spec.ticker, FALLBACK_INTERVAL, FALLBACK_RANGE)
                .await
            {
                Ok(candles) => candles,
                Err(error) => {
                    warn!("{} daily fallback failed: {}", spec.symbol, error);
                    Vec::new()
                }
            };
        }

        if candles.is_empty() {
            return Err(EngineError::NoData {
                symbol: spec.symbol.clone(),
                interval,
            });
        }

        debug!(
            "{} {}: {} candles ({})",
            spec.symbol,
            interval.as_str(),
            candles.len(),
            mode.as_str()
        );
        Ok(MarketSeries {
            symbol: spec.symbol.clone(),
            interval,
            candles,
            mode,
        })
    }
}

impl MarketDataProvider for YahooProvider {
    fn fetch<'a>(
        &'a self,
        spec: &'a SymbolSpec,
        interval: Interval,
    ) -> BoxFuture<'a, Result<MarketSeries, EngineError>> {
        Box::pin(self.fetch_series(spec, interval))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: IndicatorsNode,
}

#[derive(Debug, Deserialize)]
struct IndicatorsNode {
    quote: Vec<QuoteNode>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteNode {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Flattens the chart payload into candles. Bars with any missing or
/// non-finite field are dropped, and the survivors are ordered and
/// de-duplicated by timestamp.
fn decode_chart(payload: ChartResponse) -> Result<Vec<Candle>, EngineError> {
    if let Some(error) = payload.chart.error {
        return Err(EngineError::QuoteDecode(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = payload
        .chart
        .result
        .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
        .ok_or_else(|| EngineError::QuoteDecode("empty chart result".to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .unwrap_or_default();

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(time) = Utc.timestamp_opt(ts, 0).single() else {
            debug!("skipping bar with invalid timestamp {}", ts);
            continue;
        };
        let fields = (
            opens.get(i).copied().flatten(),
            highs.get(i).copied().flatten(),
            lows.get(i).copied().flatten(),
            closes.get(i).copied().flatten(),
            volumes.get(i).copied().flatten(),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = fields else {
            debug!("skipping bar at {} with missing fields", time);
            continue;
        };
        if let Some(candle) = build_candle(time, open, high, low, close, volume) {
            candles.push(candle);
        }
    }

    candles.sort_by_key(|candle| candle.time);
    candles.dedup_by_key(|candle| candle.time);
    Ok(candles)
}
