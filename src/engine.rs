use log::{debug, info};

use crate::config::{EngineConfig, SymbolSpec};
use crate::indicators::compute_snapshots;
use crate::models::{
    Account, BacktestReport, BarRecord, EngineError, IndicatorSnapshot, Signal, Trade, TradeStatus,
    Verdict,
};
use crate::provider::{MarketMeta, MarketSeries};
use crate::signals::{agree_across_frames, corroborate, panel_verdicts, timeframe_signal, FusionMode};
use crate::strategy::{corroboration_set, Strategy};
use crate::trading_rules::{close_trade, manage_trade, open_trade, option_premium, EntryOutcome, EntryParams};

/// Bar-by-bar paper-trade driver. Holds the strategy panel and the run
/// configuration; all market data comes in per call.
pub struct Engine {
    config: EngineConfig,
    strategies: Vec<Box<dyn Strategy + Send + Sync>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            strategies: corroboration_set(),
        }
    }

    /// Replays the supplied frames in lockstep. The first frame is the
    /// primary one: it prices the synthetic option and stamps the records.
    pub fn run(
        &self,
        spec: &SymbolSpec,
        frames: &[MarketSeries],
        meta: MarketMeta,
    ) -> Result<BacktestReport, EngineError> {
        if frames.is_empty() {
            return Err(EngineError::MissingSeries);
        }

        let snapshots: Vec<Vec<IndicatorSnapshot>> = frames
            .iter()
            .map(|frame| compute_snapshots(&frame.candles))
            .collect();
        let bar_count = frames
            .iter()
            .map(|frame| frame.candles.len())
            .min()
            .unwrap_or(0);

        let mut account = Account::new(self.config.start_capital);
        let mut open_trade_slot: Option<Trade> = None;
        let mut journal = Vec::new();
        let mut records: Vec<BarRecord> = Vec::new();

        let primary = &frames[0];
        for i in 1..bar_count {
            let fused = self.fuse_bar(&snapshots, i);
            let candle = &primary.candles[i];
            let spot = candle.close;
            let premium = option_premium(spot, &self.config.rules);

            if open_trade_slot.is_none() && fused.signal != Signal::None {
                match open_trade(EntryParams {
                    symbol: &spec.symbol,
                    signal: fused.signal,
                    spot,
                    strike_step: spec.strike_step,
                    at: candle.time,
                    selection: self.config.strike_selection,
                    rules: &self.config.rules,
                }) {
                    EntryOutcome::Opened(trade) => {
                        info!(
                            "{} {} {} {} @ entry {:.2} ({})",
                            spec.symbol,
                            fused.signal,
                            trade.strike,
                            trade.option_type.as_str(),
                            trade.entry,
                            fused.reason
                        );
                        open_trade_slot = Some(trade);
                    }
                    EntryOutcome::Rejected { reason } => {
                        debug!("{} entry skipped at bar {}: {}", spec.symbol, i, reason);
                    }
                }
            }

            if let Some(mut trade) = open_trade_slot.take() {
                manage_trade(&mut trade, premium, &self.config.rules);
                if trade.status == TradeStatus::Open {
                    open_trade_slot = Some(trade);
                } else {
                    let status = trade.status;
                    let entry = close_trade(trade, premium);
                    account.capital += entry.pnl;
                    info!(
                        "{} {} exit {:.2} pnl {:.2} capital {:.2}",
                        spec.symbol,
                        status.as_str(),
                        entry.exit,
                        entry.pnl,
                        account.capital
                    );
                    journal.push(entry);
                }
            }

            records.push(BarRecord {
                time: candle.time,
                spot,
                premium,
                signal: fused.signal,
                capital: account.capital,
                trade: open_trade_slot.clone(),
            });
        }

        if records.len() > self.config.record_tail {
            let cut = records.len() - self.config.record_tail;
            records.drain(..cut);
        }

        Ok(BacktestReport {
            symbol: spec.symbol.clone(),
            market_status: meta.status,
            data_mode: meta.mode,
            last_data_time: meta.last_data_time,
            capital: account.capital,
            journal,
            candles: records,
        })
    }

    fn fuse_bar(&self, snapshots: &[Vec<IndicatorSnapshot>], index: usize) -> Verdict {
        match self.config.fusion_mode {
            FusionMode::Agreement => {
                let frame_verdicts: Vec<Verdict> = snapshots
                    .iter()
                    .map(|frame| timeframe_signal(&frame[index - 1], &frame[index]))
                    .collect();
                agree_across_frames(&frame_verdicts)
            }
            FusionMode::Corroboration => {
                let primary = &snapshots[0];
                let verdicts = panel_verdicts(&self.strategies, &primary[index - 1], &primary[index]);
                corroborate(&verdicts)
            }
        }
    }
}
