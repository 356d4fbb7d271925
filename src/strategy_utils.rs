use crate::models::{Signal, Verdict};

/// Create a buy verdict with the given confidence
pub fn buy_verdict(confidence: u8, reason: &'static str) -> Verdict {
    Verdict {
        signal: Signal::Buy,
        confidence,
        reason,
    }
}

/// Create a sell verdict with the given confidence
pub fn sell_verdict(confidence: u8, reason: &'static str) -> Verdict {
    Verdict {
        signal: Signal::Sell,
        confidence,
        reason,
    }
}

/// Create a no-signal verdict (default when a strategy has nothing to say)
pub fn none_verdict(reason: &'static str) -> Verdict {
    Verdict {
        signal: Signal::None,
        confidence: 0,
        reason,
    }
}
