use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use futures::future::BoxFuture;

use crate::config::SymbolSpec;
use crate::models::{sanitize_value, Candle, DataMode, EngineError, Interval, MarketStatus};

/// Minutes without a fresh candle before the market is considered closed.
pub const STALE_AFTER_MINUTES: i64 = 20;

const IST_OFFSET_MINUTES: i64 = 330;
const SESSION_OPEN_MINUTE: u32 = 9 * 60 + 15;
const SESSION_CLOSE_MINUTE: u32 = 15 * 60 + 30;

/// One symbol's candles on one timeframe, as handed to the engine.
#[derive(Debug, Clone)]
pub struct MarketSeries {
    pub symbol: String,
    pub interval: Interval,
    pub candles: Vec<Candle>,
    pub mode: DataMode,
}

impl MarketSeries {
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.candles.last().map(|candle| candle.time)
    }
}

/// Market freshness derived from the primary series, stamped onto reports.
#[derive(Debug, Clone, Copy)]
pub struct MarketMeta {
    pub status: MarketStatus,
    pub mode: DataMode,
    pub last_data_time: Option<DateTime<Utc>>,
}

impl MarketMeta {
    pub fn evaluate(series: &MarketSeries, now: DateTime<Utc>) -> Self {
        let last_data_time = series.last_time();
        let status = market_status(last_data_time, now);
        let mode = if status == MarketStatus::MarketLive {
            series.mode
        } else {
            DataMode::LastDay
        };
        Self {
            status,
            mode,
            last_data_time,
        }
    }
}

pub trait MarketDataProvider: Send + Sync {
    fn fetch<'a>(
        &'a self,
        spec: &'a SymbolSpec,
        interval: Interval,
    ) -> BoxFuture<'a, Result<MarketSeries, EngineError>>;
}

pub fn market_status(last_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> MarketStatus {
    match last_time {
        None => MarketStatus::NoData,
        Some(last) if now - last > Duration::minutes(STALE_AFTER_MINUTES) => {
            MarketStatus::MarketClosed
        }
        Some(_) => MarketStatus::MarketLive,
    }
}

/// True inside the NSE cash session, 09:15 to 15:30 IST inclusive.
pub fn within_nse_session(time: DateTime<Utc>) -> bool {
    let ist = time + Duration::minutes(IST_OFFSET_MINUTES);
    let minute_of_day = ist.hour() * 60 + ist.minute();
    (SESSION_OPEN_MINUTE..=SESSION_CLOSE_MINUTE).contains(&minute_of_day)
}

/// Calendar date of a timestamp in exchange-local (IST) terms.
pub fn ist_date(time: DateTime<Utc>) -> NaiveDate {
    (time + Duration::minutes(IST_OFFSET_MINUTES)).date_naive()
}

/// Intraday frames keep session bars only; daily frames pass unchanged.
pub fn filter_session_candles(interval: Interval, candles: Vec<Candle>) -> Vec<Candle> {
    if !interval.is_intraday() {
        return candles;
    }
    candles
        .into_iter()
        .filter(|candle| within_nse_session(candle.time))
        .collect()
}

/// Assembles a candle from raw fields, dropping the whole bar when any
/// field is non-finite.
pub fn build_candle(
    time: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
) -> Option<Candle> {
    Some(Candle {
        time,
        open: sanitize_value(open)?,
        high: sanitize_value(high)?,
        low: sanitize_value(low)?,
        close: sanitize_value(close)?,
        volume: sanitize_value(volume)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_tracks_candle_freshness() {
        let now = Utc.with_ymd_and_hms(2025, 8, 22, 6, 0, 0).unwrap();
        assert_eq!(market_status(None, now), MarketStatus::NoData);
        assert_eq!(
            market_status(Some(now - Duration::minutes(5)), now),
            MarketStatus::MarketLive
        );
        assert_eq!(
            market_status(Some(now - Duration::minutes(20)), now),
            MarketStatus::MarketLive
        );
        assert_eq!(
            market_status(Some(now - Duration::minutes(21)), now),
            MarketStatus::MarketClosed
        );
    }

    #[test]
    fn session_window_is_ist_inclusive() {
        // 09:15 IST == 03:45 UTC, 15:30 IST == 10:00 UTC.
        let open = Utc.with_ymd_and_hms(2025, 8, 22, 3, 45, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2025, 8, 22, 10, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 8, 22, 3, 40, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 8, 22, 10, 5, 0).unwrap();

        assert!(within_nse_session(open));
        assert!(within_nse_session(close));
        assert!(!within_nse_session(before));
        assert!(!within_nse_session(after));
    }

    #[test]
    fn session_filter_leaves_daily_candles_alone() {
        let midnight = Utc.with_ymd_and_hms(2025, 8, 22, 0, 0, 0).unwrap();
        let candle = build_candle(midnight, 1.0, 2.0, 0.5, 1.5, 100.0).unwrap();

        let kept = filter_session_candles(Interval::D1, vec![candle.clone()]);
        assert_eq!(kept.len(), 1);

        let dropped = filter_session_candles(Interval::M5, vec![candle]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn ist_date_rolls_over_at_half_past_six_utc() {
        // 18:40 UTC is 00:10 IST the next day.
        let evening = Utc.with_ymd_and_hms(2025, 8, 22, 18, 40, 0).unwrap();
        let midday = Utc.with_ymd_and_hms(2025, 8, 22, 6, 0, 0).unwrap();

        assert_eq!(ist_date(evening).to_string(), "2025-08-23");
        assert_eq!(ist_date(midday).to_string(), "2025-08-22");
    }

    #[test]
    fn build_candle_drops_bars_with_holes() {
        let time = Utc.with_ymd_and_hms(2025, 8, 22, 4, 0, 0).unwrap();
        assert!(build_candle(time, 1.0, 2.0, 0.5, 1.5, 100.0).is_some());
        assert!(build_candle(time, f64::NAN, 2.0, 0.5, 1.5, 100.0).is_none());
        assert!(build_candle(time, 1.0, 2.0, 0.5, f64::INFINITY, 100.0).is_none());
        assert!(build_candle(time, 1.0, 2.0, 0.5, 1.5, f64::NAN).is_none());
    }

    #[test]
    fn meta_reuses_series_mode_only_while_live() {
        let now = Utc.with_ymd_and_hms(2025, 8, 22, 6, 0, 0).unwrap();
        let fresh = build_candle(now - Duration::minutes(4), 1.0, 2.0, 0.5, 1.5, 10.0).unwrap();
        let stale = build_candle(now - Duration::hours(14), 1.0, 2.0, 0.5, 1.5, 10.0).unwrap();

        let live = MarketSeries {
            symbol: "NIFTY".to_string(),
            interval: Interval::M5,
            candles: vec![fresh],
            mode: DataMode::Live,
        };
        let meta = MarketMeta::evaluate(&live, now);
        assert_eq!(meta.status, MarketStatus::MarketLive);
        assert_eq!(meta.mode, DataMode::Live);

        let old = MarketSeries {
            symbol: "NIFTY".to_string(),
            interval: Interval::M5,
            candles: vec![stale],
            mode: DataMode::Live,
        };
        let meta = MarketMeta::evaluate(&old, now);
        assert_eq!(meta.status, MarketStatus::MarketClosed);
        assert_eq!(meta.mode, DataMode::LastDay);

        let empty = MarketSeries {
            symbol: "NIFTY".to_string(),
            interval: Interval::M5,
            candles: Vec::new(),
            mode: DataMode::Live,
        };
        let meta = MarketMeta::evaluate(&empty, now);
        assert_eq!(meta.status, MarketStatus::NoData);
        assert!(meta.last_data_time.is_none());
    }
}
