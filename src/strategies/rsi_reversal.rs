use crate::models::{IndicatorSnapshot, Verdict};
use crate::strategy_utils::{buy_verdict, none_verdict, sell_verdict};

const REVERSAL_CONFIDENCE: u8 = 65;
const OVERSOLD_LEVEL: f64 = 30.0;
const OVERBOUGHT_LEVEL: f64 = 70.0;

/// Fires when RSI turns back from an extreme: previous bar beyond the
/// threshold, current bar moving against it.
pub struct RsiReversalStrategy;

impl super::Strategy for RsiReversalStrategy {
    fn name(&self) -> &'static str {
        "rsi_reversal"
    }

    fn evaluate(&self, previous: &IndicatorSnapshot, current: &IndicatorSnapshot) -> Verdict {
        let (Some(prev_rsi), Some(rsi)) = (previous.rsi, current.rsi) else {
            return none_verdict("Insufficient data");
        };

        if prev_rsi < OVERSOLD_LEVEL && rsi > prev_rsi {
            return buy_verdict(REVERSAL_CONFIDENCE, "RSI reversal from oversold");
        }
        if prev_rsi > OVERBOUGHT_LEVEL && rsi < prev_rsi {
            return sell_verdict(REVERSAL_CONFIDENCE, "RSI reversal from overbought");
        }

        none_verdict("RSI neutral")
    }
}
