use crate::models::{Candle, IndicatorSnapshot};

pub const EMA_FAST_PERIOD: usize = 9;
pub const EMA_SLOW_PERIOD: usize = 21;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const MACD_SIGNAL_PERIOD: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

pub fn calculate_ema(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema_values = Vec::new();
    ema_values.push(prices[0]);

    for i in 1..prices.len() {
        let ema = (prices[i] * multiplier) + (ema_values[i - 1] * (1.0 - multiplier));
        ema_values.push(ema);
    }

    ema_values
}

pub fn calculate_macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = calculate_ema(prices, fast_period);
    let slow_ema = calculate_ema(prices, slow_period);

    let mut macd_line = Vec::new();
    for i in 0..prices.len() {
        macd_line.push(fast_ema[i] - slow_ema[i]);
    }

    let signal_line = calculate_ema(&macd_line, signal_period);

    let mut histogram = Vec::new();
    for i in 0..macd_line.len() {
        histogram.push(macd_line[i] - signal_line[i]);
    }

    (macd_line, signal_line, histogram)
}

/// Rolling-mean RSI. A bar has a value once `period` deltas exist behind
/// it; a window with zero average loss has no value.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut rsi_values = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return rsi_values;
    }

    let mut gains = vec![0.0; prices.len()];
    let mut losses = vec![0.0; prices.len()];
    for i in 1..prices.len() {
        let delta = prices[i] - prices[i - 1];
        if delta >= 0.0 {
            gains[i] = delta;
        } else {
            losses[i] = -delta;
        }
    }

    let mut gain_sum: f64 = gains[1..=period].iter().sum();
    let mut loss_sum: f64 = losses[1..=period].iter().sum();
    for i in period..prices.len() {
        if i > period {
            gain_sum += gains[i] - gains[i - period];
            loss_sum += losses[i] - losses[i - period];
        }
        let average_loss = loss_sum / period as f64;
        if average_loss > 0.0 {
            let rs = (gain_sum / period as f64) / average_loss;
            rsi_values[i] = Some(100.0 - 100.0 / (1.0 + rs));
        }
    }

    rsi_values
}

/// Cumulative VWAP over the whole series, no per-day reset. Bars before
/// the first nonzero volume have no value.
pub fn calculate_vwap(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    volumes: &[f64],
) -> Vec<Option<f64>> {
    let mut vwap_values = Vec::with_capacity(closes.len());
    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;

    for i in 0..closes.len() {
        let typical_price = (highs[i] + lows[i] + closes[i]) / 3.0;
        cumulative_pv += typical_price * volumes[i];
        cumulative_volume += volumes[i];
        if cumulative_volume > 0.0 {
            vwap_values.push(Some(cumulative_pv / cumulative_volume));
        } else {
            vwap_values.push(None);
        }
    }

    vwap_values
}

/// Bollinger bands with sample standard deviation, aligned to the input:
/// the first `period - 1` slots have no value.
pub fn calculate_bollinger_bands(
    prices: &[f64],
    period: usize,
    width: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut upper = vec![None; prices.len()];
    let mut lower = vec![None; prices.len()];
    if period < 2 || prices.len() < period {
        return (upper, lower);
    }

    for i in (period - 1)..prices.len() {
        let window = &prices[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|value| (value - mean) * (value - mean))
            .sum::<f64>()
            / (period - 1) as f64;
        let deviation = variance.sqrt();
        upper[i] = Some(mean + width * deviation);
        lower[i] = Some(mean - width * deviation);
    }

    (upper, lower)
}

/// Computes every indicator once over the series and zips the results into
/// per-bar snapshots.
pub fn compute_snapshots(candles: &[Candle]) -> Vec<IndicatorSnapshot> {
    if candles.is_empty() {
        return Vec::new();
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    let ema_fast = calculate_ema(&closes, EMA_FAST_PERIOD);
    let ema_slow = calculate_ema(&closes, EMA_SLOW_PERIOD);
    let (macd, macd_signal, macd_hist) = calculate_macd(
        &closes,
        MACD_FAST_PERIOD,
        MACD_SLOW_PERIOD,
        MACD_SIGNAL_PERIOD,
    );
    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let vwap = calculate_vwap(&highs, &lows, &closes, &volumes);
    let (bb_upper, bb_lower) = calculate_bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_WIDTH);

    (0..candles.len())
        .map(|i| IndicatorSnapshot {
            close: closes[i],
            ema9: Some(ema_fast[i]),
            ema21: Some(ema_slow[i]),
            rsi: rsi[i],
            macd: Some(macd[i]),
            macd_signal: Some(macd_signal[i]),
            macd_hist: Some(macd_hist[i]),
            vwap: vwap[i],
            bb_upper: bb_upper[i],
            bb_lower: bb_lower[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2025, 8, 18, 4, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                time: start + Duration::minutes(5 * i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn ema_seeds_with_first_price() {
        let prices = [10.0, 11.0, 12.0];
        let ema = calculate_ema(&prices, 9);
        assert_eq!(ema[0], 10.0);
        // alpha = 0.2: 11 * 0.2 + 10 * 0.8
        assert!((ema[1] - 10.2).abs() < 1e-12);
        assert_eq!(ema.len(), 3);
    }

    #[test]
    fn rsi_needs_a_full_delta_window() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i % 3) as f64).collect();
        let rsi = calculate_rsi(&prices, 14);
        for value in rsi.iter().take(14) {
            assert!(value.is_none());
        }
        assert!(rsi[14].is_some());
    }

    #[test]
    fn rsi_has_no_value_without_losses() {
        // Strictly rising series: every delta window is all gains.
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let rsi = calculate_rsi(&prices, 14);
        assert!(rsi.iter().all(|value| value.is_none()));
    }

    #[test]
    fn rsi_is_zero_when_every_delta_is_a_loss() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let rsi = calculate_rsi(&prices, 14);
        let value = rsi[14].unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn rsi_matches_hand_computed_window() {
        // 13 losses of 0.05 then one gain of 4.0 inside the window.
        let mut prices: Vec<f64> = (0..21).map(|i| 100.0 - 0.05 * i as f64).collect();
        prices.push(103.0);
        let rsi = calculate_rsi(&prices, 14);
        let value = rsi[21].unwrap();
        let average_gain = 4.0 / 14.0;
        let average_loss = 0.65 / 14.0;
        let expected = 100.0 - 100.0 / (1.0 + average_gain / average_loss);
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn vwap_accumulates_typical_price() {
        let highs = [11.0, 21.0];
        let lows = [9.0, 19.0];
        let closes = [10.0, 20.0];
        let volumes = [100.0, 300.0];
        let vwap = calculate_vwap(&highs, &lows, &closes, &volumes);
        // (10 * 100 + 20 * 300) / 400
        assert!((vwap[1].unwrap() - 17.5).abs() < 1e-9);
    }

    #[test]
    fn vwap_is_absent_until_volume_appears() {
        let highs = [11.0, 11.0, 11.0];
        let lows = [9.0, 9.0, 9.0];
        let closes = [10.0, 10.0, 10.0];
        let volumes = [0.0, 0.0, 200.0];
        let vwap = calculate_vwap(&highs, &lows, &closes, &volumes);
        assert!(vwap[0].is_none());
        assert!(vwap[1].is_none());
        assert!((vwap[2].unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn bollinger_bands_start_at_the_twentieth_bar() {
        let prices: Vec<f64> = (0..25).map(|i| 100.0 + (i % 5) as f64).collect();
        let (upper, lower) = calculate_bollinger_bands(&prices, 20, 2.0);
        assert!(upper[18].is_none());
        assert!(upper[19].is_some());
        assert!(lower[19].is_some());
        assert!(upper[19].unwrap() > lower[19].unwrap());
    }

    #[test]
    fn bollinger_bands_are_symmetric_around_the_window_mean() {
        let prices: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 99.0 } else { 101.0 }).collect();
        let (upper, lower) = calculate_bollinger_bands(&prices, 20, 2.0);
        let mid = (upper[19].unwrap() + lower[19].unwrap()) / 2.0;
        assert!((mid - 100.0).abs() < 1e-9);
    }

    #[test]
    fn snapshots_align_with_candles() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 4) as f64).collect();
        let candles = candles_from_closes(&closes);
        let snapshots = compute_snapshots(&candles);

        assert_eq!(snapshots.len(), candles.len());
        assert!(snapshots[0].ema9.is_some());
        assert!(snapshots[0].rsi.is_none());
        assert!(snapshots[14].rsi.is_some());
        assert!(snapshots[18].bb_upper.is_none());
        assert!(snapshots[19].bb_upper.is_some());
        assert!(snapshots[0].vwap.is_some());
        assert_eq!(snapshots[7].close, candles[7].close);
    }
}
