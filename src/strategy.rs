use crate::models::{IndicatorSnapshot, Verdict};

pub trait Strategy {
    fn name(&self) -> &'static str;
    /// Evaluate one bar given its snapshot and the previous bar's snapshot.
    /// Must return a NONE verdict when any required indicator is absent.
    fn evaluate(&self, previous: &IndicatorSnapshot, current: &IndicatorSnapshot) -> Verdict;
}

#[path = "strategies/ema_crossover.rs"]
pub mod ema_crossover;

pub use ema_crossover::EmaCrossoverStrategy;

#[path = "strategies/rsi_reversal.rs"]
pub mod rsi_reversal;

pub use rsi_reversal::RsiReversalStrategy;

#[path = "strategies/ema_vwap.rs"]
pub mod ema_vwap;

pub use ema_vwap::EmaVwapStrategy;

/// The fixed strategy panel consulted by the corroboration discipline.
pub fn corroboration_set() -> Vec<Box<dyn Strategy + Send + Sync>> {
    vec![
        Box::new(EmaCrossoverStrategy),
        Box::new(RsiReversalStrategy),
        Box::new(EmaVwapStrategy),
    ]
}
