pub mod backtest;
pub mod chart;
pub mod snapshot;
