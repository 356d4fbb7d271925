use anyhow::{Context, Result};
use log::info;

use crate::config::SymbolTable;
use crate::paper::PaperProvider;
use crate::provider::MarketDataProvider;
use crate::yahoo::YahooProvider;

/// Shared command dependencies: the symbol universe and the candle source.
pub struct AppContext {
    pub symbols: SymbolTable,
    provider: Box<dyn MarketDataProvider>,
}

impl AppContext {
    pub fn initialize(paper: bool, seed: u64) -> Result<Self> {
        let provider: Box<dyn MarketDataProvider> = if paper {
            info!("Candle source: synthetic paper walk (seed {})", seed);
            Box::new(PaperProvider::new(seed))
        } else {
            Box::new(YahooProvider::new().context("failed to build quote HTTP client")?)
        };

        Ok(Self {
            symbols: SymbolTable::nse_indices(),
            provider,
        })
    }

    pub fn provider(&self) -> &dyn MarketDataProvider {
        self.provider.as_ref()
    }
}
