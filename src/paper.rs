use chrono::{DateTime, Duration, DurationRound, Utc};
use futures::future::BoxFuture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SymbolSpec;
use crate::models::{Candle, DataMode, EngineError, Interval};
use crate::provider::{within_nse_session, MarketDataProvider, MarketSeries};

const INTRADAY_BARS: usize = 150;
const DAILY_BARS: usize = 60;
const BASE_PRICE_PER_STEP: f64 = 480.0;
const STEP_FRACTION: f64 = 0.0008;

/// Deterministic random-walk candle source for offline runs. The same
/// seed, symbol and interval always produce the same price path; only the
/// timestamps track the current clock.
pub struct PaperProvider {
    seed: u64,
}

impl PaperProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn series_rng(&self, spec: &SymbolSpec, interval: Interval) -> StdRng {
        let folded = spec
            .symbol
            .bytes()
            .fold(self.seed ^ interval.minutes() as u64, |acc, byte| {
                acc.rotate_left(8) ^ u64::from(byte)
            });
        StdRng::seed_from_u64(folded)
    }

    fn generate(&self, spec: &SymbolSpec, interval: Interval) -> Result<MarketSeries, EngineError> {
        let bars = if interval.is_intraday() {
            INTRADAY_BARS
        } else {
            DAILY_BARS
        };
        let times = session_times(Utc::now(), interval, bars);
        if times.is_empty() {
            return Err(EngineError::NoData {
                symbol: spec.symbol.clone(),
                interval,
            });
        }

        let mut rng = self.series_rng(spec, interval);
        let base = spec.strike_step as f64 * BASE_PRICE_PER_STEP;
        let step = base * STEP_FRACTION;

        let mut candles = Vec::with_capacity(times.len());
        let mut close = base;
        for time in times {
            let open = close;
            close = open + rng.gen_range(-step..step);
            let spread = rng.gen_range(0.0..step / 2.0);
            candles.push(Candle {
                time,
                open,
                high: open.max(close) + spread,
                low: open.min(close) - spread,
                close,
                volume: rng.gen_range(50_000.0..500_000.0),
            });
        }

        Ok(MarketSeries {
            symbol: spec.symbol.clone(),
            interval,
            candles,
            mode: DataMode::Live,
        })
    }
}

impl MarketDataProvider for PaperProvider {
    fn fetch<'a>(
        &'a self,
        spec: &'a SymbolSpec,
        interval: Interval,
    ) -> BoxFuture<'a, Result<MarketSeries, EngineError>> {
        Box::pin(async move { self.generate(spec, interval) })
    }
}

/// The most recent `count` bar timestamps at or before `now`, walking
/// backwards and keeping intraday stamps inside the NSE session.
fn session_times(now: DateTime<Utc>, interval: Interval, count: usize) -> Vec<DateTime<Utc>> {
    let step = Duration::minutes(interval.minutes());
    let mut cursor = now.duration_trunc(step).unwrap_or(now);
    let mut times = Vec::with_capacity(count);

    // Daily bars only need a fixed daily stamp; no session check applies.
    if !interval.is_intraday() {
        for i in 0..count {
            times.push(cursor - Duration::days(i as i64));
        }
        times.reverse();
        return times;
    }

    while times.len() < count {
        if within_nse_session(cursor) {
            times.push(cursor);
        }
        cursor = cursor - step;
    }
    times.reverse();
    times
}
