use crate::models::{IndicatorSnapshot, Verdict};
use crate::strategy_utils::{buy_verdict, none_verdict, sell_verdict};

const TREND_CONFIDENCE: u8 = 80;
const RSI_MIDLINE: f64 = 50.0;

/// Trend-following composite: EMA alignment, price versus VWAP, RSI side
/// of the midline and MACD histogram direction must all line up.
pub struct EmaVwapStrategy;

impl super::Strategy for EmaVwapStrategy {
    fn name(&self) -> &'static str {
        "ema_vwap"
    }

    fn evaluate(&self, previous: &IndicatorSnapshot, current: &IndicatorSnapshot) -> Verdict {
        let (Some(fast), Some(slow), Some(vwap), Some(rsi), Some(hist), Some(prev_hist)) = (
            current.ema9,
            current.ema21,
            current.vwap,
            current.rsi,
            current.macd_hist,
            previous.macd_hist,
        ) else {
            return none_verdict("Insufficient data");
        };

        let close = current.close;
        if fast > slow && close > vwap && rsi > RSI_MIDLINE && hist > prev_hist {
            return buy_verdict(
                TREND_CONFIDENCE,
                "EMA9>EMA21, price above VWAP, RSI bullish, MACD rising",
            );
        }
        if fast < slow && close < vwap && rsi < RSI_MIDLINE && hist < prev_hist {
            return sell_verdict(
                TREND_CONFIDENCE,
                "EMA9<EMA21, price below VWAP, RSI bearish, MACD falling",
            );
        }

        none_verdict("Conditions not met")
    }
}
