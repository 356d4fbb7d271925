use crate::models::{IndicatorSnapshot, Verdict};
use crate::strategy_utils::{buy_verdict, none_verdict, sell_verdict};

const CROSSOVER_CONFIDENCE: u8 = 70;

/// Fires on the bar where EMA9 crosses EMA21. Both bars must carry both
/// averages; equality on the previous bar is not a crossover.
pub struct EmaCrossoverStrategy;

impl super::Strategy for EmaCrossoverStrategy {
    fn name(&self) -> &'static str {
        "ema_crossover"
    }

    fn evaluate(&self, previous: &IndicatorSnapshot, current: &IndicatorSnapshot) -> Verdict {
        let (Some(prev_fast), Some(prev_slow), Some(fast), Some(slow)) =
            (previous.ema9, previous.ema21, current.ema9, current.ema21)
        else {
            return none_verdict("Insufficient data");
        };

        if prev_fast < prev_slow && fast > slow {
            return buy_verdict(CROSSOVER_CONFIDENCE, "EMA9 crossed above EMA21");
        }
        if prev_fast > prev_slow && fast < slow {
            return sell_verdict(CROSSOVER_CONFIDENCE, "EMA9 crossed below EMA21");
        }

        none_verdict("No crossover")
    }
}

#[cfg(test)]
mod tests {
    use super::EmaCrossoverStrategy;
    use crate::models::{IndicatorSnapshot, Signal};
    use crate::strategy::Strategy;

    fn snapshot(ema9: f64, ema21: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema9: Some(ema9),
            ema21: Some(ema21),
            ..IndicatorSnapshot::default()
        }
    }

    #[test]
    fn detects_upward_crossover() {
        let verdict =
            EmaCrossoverStrategy.evaluate(&snapshot(99.8, 99.9), &snapshot(100.1, 100.0));
        assert_eq!(verdict.signal, Signal::Buy);
        assert_eq!(verdict.confidence, 70);
        assert_eq!(verdict.reason, "EMA9 crossed above EMA21");
    }

    #[test]
    fn detects_downward_crossover() {
        let verdict =
            EmaCrossoverStrategy.evaluate(&snapshot(100.2, 100.0), &snapshot(99.7, 99.9));
        assert_eq!(verdict.signal, Signal::Sell);
        assert_eq!(verdict.reason, "EMA9 crossed below EMA21");
    }

    #[test]
    fn no_signal_without_a_flip() {
        let verdict =
            EmaCrossoverStrategy.evaluate(&snapshot(100.2, 100.0), &snapshot(100.4, 100.1));
        assert_eq!(verdict.signal, Signal::None);
        assert_eq!(verdict.confidence, 0);
        assert_eq!(verdict.reason, "No crossover");
    }

    #[test]
    fn equal_previous_averages_are_not_a_crossover() {
        let verdict =
            EmaCrossoverStrategy.evaluate(&snapshot(100.0, 100.0), &snapshot(100.3, 100.1));
        assert_eq!(verdict.signal, Signal::None);
    }

    #[test]
    fn missing_averages_yield_insufficient_data() {
        let bare = IndicatorSnapshot::default();
        let verdict = EmaCrossoverStrategy.evaluate(&bare, &snapshot(100.1, 100.0));
        assert_eq!(verdict.signal, Signal::None);
        assert_eq!(verdict.reason, "Insufficient data");
    }
}
