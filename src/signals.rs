use clap::ValueEnum;

use crate::models::{IndicatorSnapshot, Signal, Verdict};
use crate::strategy::{EmaCrossoverStrategy, Strategy};
use crate::strategy_utils::none_verdict;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

const CORROBORATION_MIN_VOTES: usize = 2;
const VOTE_CONFIDENCE_STEP: usize = 30;

/// How per-strategy verdicts combine into the one signal the driver acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FusionMode {
    /// Same crossover signal required on every timeframe.
    Agreement,
    /// Two or more strategies must vote the same way on the primary frame.
    Corroboration,
}

impl FusionMode {
    pub fn label(&self) -> &'static str {
        match self {
            FusionMode::Agreement => "timeframe agreement",
            FusionMode::Corroboration => "strategy corroboration",
        }
    }
}

/// RSI extreme filter: oversold leans BUY, overbought leans SELL,
/// anything else (including an absent RSI) abstains.
pub fn rsi_threshold_signal(snapshot: &IndicatorSnapshot) -> Signal {
    match snapshot.rsi {
        Some(rsi) if rsi < RSI_OVERSOLD => Signal::Buy,
        Some(rsi) if rsi > RSI_OVERBOUGHT => Signal::Sell,
        _ => Signal::None,
    }
}

/// One timeframe's signal: the EMA crossover verdict, dropped when the RSI
/// filter actively points the other way. An abstaining filter never blocks.
pub fn timeframe_signal(previous: &IndicatorSnapshot, current: &IndicatorSnapshot) -> Verdict {
    let crossover = EmaCrossoverStrategy.evaluate(previous, current);
    if crossover.signal == Signal::None {
        return crossover;
    }

    let filter = rsi_threshold_signal(current);
    if filter != Signal::None && filter != crossover.signal {
        return none_verdict("RSI filter vetoed the crossover");
    }

    crossover
}

/// Final signal under timeframe agreement: the primary frame's verdict,
/// kept only when every frame produced the same signal.
pub fn agree_across_frames(frame_verdicts: &[Verdict]) -> Verdict {
    let Some(primary) = frame_verdicts.first() else {
        return none_verdict("No timeframes supplied");
    };

    if frame_verdicts
        .iter()
        .all(|verdict| verdict.signal == primary.signal)
    {
        *primary
    } else {
        none_verdict("Timeframes disagree")
    }
}

/// Final signal under corroboration: a side needs at least two votes, BUY
/// is checked before SELL, and confidence grows 30 points per vote.
pub fn corroborate(verdicts: &[Verdict]) -> Verdict {
    let buy_votes = verdicts
        .iter()
        .filter(|verdict| verdict.signal == Signal::Buy)
        .count();
    let sell_votes = verdicts
        .iter()
        .filter(|verdict| verdict.signal == Signal::Sell)
        .count();

    if buy_votes >= CORROBORATION_MIN_VOTES {
        return Verdict {
            signal: Signal::Buy,
            confidence: vote_confidence(buy_votes),
            reason: "Multiple strategies confirm BUY",
        };
    }
    if sell_votes >= CORROBORATION_MIN_VOTES {
        return Verdict {
            signal: Signal::Sell,
            confidence: vote_confidence(sell_votes),
            reason: "Multiple strategies confirm SELL",
        };
    }

    none_verdict("No strong confirmation")
}

/// Runs the whole strategy panel on one bar of the primary frame.
pub fn panel_verdicts(
    strategies: &[Box<dyn Strategy + Send + Sync>],
    previous: &IndicatorSnapshot,
    current: &IndicatorSnapshot,
) -> Vec<Verdict> {
    strategies
        .iter()
        .map(|strategy| strategy.evaluate(previous, current))
        .collect()
}

fn vote_confidence(votes: usize) -> u8 {
    (votes * VOTE_CONFIDENCE_STEP).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy_utils::{buy_verdict, sell_verdict};

    fn snapshot_with_rsi(rsi: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            ..IndicatorSnapshot::default()
        }
    }

    fn crossover_pair(up: bool) -> (IndicatorSnapshot, IndicatorSnapshot) {
        let previous = IndicatorSnapshot {
            ema9: Some(if up { 99.8 } else { 100.2 }),
            ema21: Some(100.0),
            ..IndicatorSnapshot::default()
        };
        let current = IndicatorSnapshot {
            ema9: Some(if up { 100.3 } else { 99.6 }),
            ema21: Some(100.1),
            ..IndicatorSnapshot::default()
        };
        (previous, current)
    }

    #[test]
    fn rsi_filter_thresholds_are_exclusive() {
        assert_eq!(
            rsi_threshold_signal(&snapshot_with_rsi(Some(29.9))),
            Signal::Buy
        );
        assert_eq!(
            rsi_threshold_signal(&snapshot_with_rsi(Some(30.0))),
            Signal::None
        );
        assert_eq!(
            rsi_threshold_signal(&snapshot_with_rsi(Some(70.0))),
            Signal::None
        );
        assert_eq!(
            rsi_threshold_signal(&snapshot_with_rsi(Some(70.1))),
            Signal::Sell
        );
        assert_eq!(rsi_threshold_signal(&snapshot_with_rsi(None)), Signal::None);
    }

    #[test]
    fn timeframe_signal_passes_crossover_when_filter_abstains() {
        let (previous, current) = crossover_pair(true);
        let verdict = timeframe_signal(&previous, &current);
        assert_eq!(verdict.signal, Signal::Buy);
        assert_eq!(verdict.confidence, 70);
    }

    #[test]
    fn timeframe_signal_is_vetoed_by_an_opposing_filter() {
        let (previous, mut current) = crossover_pair(true);
        current.rsi = Some(75.0);
        let verdict = timeframe_signal(&previous, &current);
        assert_eq!(verdict.signal, Signal::None);
        assert_eq!(verdict.reason, "RSI filter vetoed the crossover");
    }

    #[test]
    fn timeframe_signal_keeps_an_agreeing_filter() {
        let (previous, mut current) = crossover_pair(true);
        current.rsi = Some(25.0);
        assert_eq!(timeframe_signal(&previous, &current).signal, Signal::Buy);

        let (previous, mut current) = crossover_pair(false);
        current.rsi = Some(80.0);
        assert_eq!(timeframe_signal(&previous, &current).signal, Signal::Sell);
    }

    #[test]
    fn agreement_requires_every_frame() {
        let buy = buy_verdict(70, "EMA9 crossed above EMA21");
        let none = none_verdict("No crossover");

        let fused = agree_across_frames(&[buy, buy]);
        assert_eq!(fused.signal, Signal::Buy);
        assert_eq!(fused.confidence, 70);

        let fused = agree_across_frames(&[buy, none]);
        assert_eq!(fused.signal, Signal::None);
        assert_eq!(fused.reason, "Timeframes disagree");
    }

    #[test]
    fn agreement_on_no_signal_stays_quiet() {
        let none = none_verdict("No crossover");
        let fused = agree_across_frames(&[none, none]);
        assert_eq!(fused.signal, Signal::None);
        assert_eq!(fused.reason, "No crossover");
    }

    #[test]
    fn corroboration_needs_two_votes() {
        let buy = buy_verdict(70, "EMA9 crossed above EMA21");
        let sell = sell_verdict(80, "EMA9<EMA21, price below VWAP, RSI bearish, MACD falling");
        let none = none_verdict("RSI neutral");

        let fused = corroborate(&[buy, buy, sell]);
        assert_eq!(fused.signal, Signal::Buy);
        assert_eq!(fused.confidence, 60);
        assert_eq!(fused.reason, "Multiple strategies confirm BUY");

        let fused = corroborate(&[buy, none, sell]);
        assert_eq!(fused.signal, Signal::None);
        assert_eq!(fused.reason, "No strong confirmation");
    }

    #[test]
    fn corroboration_prefers_buy_on_a_split_panel() {
        let buy = buy_verdict(70, "EMA9 crossed above EMA21");
        let sell = sell_verdict(65, "RSI reversal from overbought");
        let fused = corroborate(&[buy, sell, buy, sell]);
        assert_eq!(fused.signal, Signal::Buy);
    }

    #[test]
    fn vote_confidence_is_capped() {
        assert_eq!(vote_confidence(2), 60);
        assert_eq!(vote_confidence(3), 90);
        assert_eq!(vote_confidence(4), 100);
    }
}
