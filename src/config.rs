use anyhow::{bail, Result};

use crate::models::EngineError;
use crate::signals::FusionMode;
use crate::trading_rules::StrikeSelection;

/// One tradable index: display symbol, quote-provider ticker and the
/// strike grid spacing of its option chain.
#[derive(Debug, Clone)]
pub struct SymbolSpec {
    pub symbol: String,
    pub ticker: String,
    pub strike_step: i64,
}

impl SymbolSpec {
    fn new(symbol: &str, ticker: &str, strike_step: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            ticker: ticker.to_string(),
            strike_step,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: Vec<SymbolSpec>,
}

impl SymbolTable {
    /// The NSE index universe this engine trades.
    pub fn nse_indices() -> Self {
        Self {
            entries: vec![
                SymbolSpec::new("NIFTY", "^NSEI", 50),
                SymbolSpec::new("BANKNIFTY", "^NSEBANK", 100),
                SymbolSpec::new("FINNIFTY", "NIFTY_FIN_SERVICE.NS", 50),
            ],
        }
    }

    /// Case-insensitive lookup by display symbol.
    pub fn resolve(&self, symbol: &str) -> Result<&SymbolSpec, EngineError> {
        let wanted = symbol.to_uppercase();
        self.entries
            .iter()
            .find(|spec| spec.symbol == wanted)
            .ok_or(EngineError::UnknownSymbol(wanted))
    }

    pub fn specs(&self) -> &[SymbolSpec] {
        &self.entries
    }
}

/// Pricing and exit parameters of the synthetic option lifecycle. All
/// ratios are relative to the entry premium.
#[derive(Debug, Clone)]
pub struct TradeRules {
    pub premium_floor: f64,
    pub premium_rate: f64,
    pub stop_loss_ratio: f64,
    pub target_ratio: f64,
    pub breakeven_trigger_ratio: f64,
    pub trail_ratio: f64,
    pub min_delta: f64,
    pub call_delta: f64,
    pub put_delta: f64,
}

impl Default for TradeRules {
    fn default() -> Self {
        Self {
            premium_floor: 40.0,
            premium_rate: 0.004,
            stop_loss_ratio: 0.7,
            target_ratio: 1.5,
            breakeven_trigger_ratio: 1.1,
            trail_ratio: 0.95,
            min_delta: 0.4,
            call_delta: 0.55,
            put_delta: -0.55,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub start_capital: f64,
    pub fusion_mode: FusionMode,
    pub strike_selection: StrikeSelection,
    pub record_tail: usize,
    pub rules: TradeRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_capital: 100_000.0,
            fusion_mode: FusionMode::Agreement,
            strike_selection: StrikeSelection::Atm,
            record_tail: 120,
            rules: TradeRules::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("start_capital", self.start_capital)?;
        require_positive("premium_floor", self.rules.premium_floor)?;
        require_positive("premium_rate", self.rules.premium_rate)?;
        require_positive("trail_ratio", self.rules.trail_ratio)?;
        if self.rules.stop_loss_ratio <= 0.0 || self.rules.stop_loss_ratio >= 1.0 {
            bail!("Setting stop_loss_ratio must be between 0 and 1");
        }
        if self.rules.target_ratio <= 1.0 {
            bail!("Setting target_ratio must be greater than 1");
        }
        if self.rules.breakeven_trigger_ratio <= 1.0 {
            bail!("Setting breakeven_trigger_ratio must be greater than 1");
        }
        if self.record_tail == 0 {
            bail!("Setting record_tail must be at least 1");
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value <= 0.0 || !value.is_finite() {
        bail!("Setting {} must be a positive number", name);
    }
    Ok(())
}
