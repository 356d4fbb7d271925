use anyhow::Result;
use chrono::Utc;
use futures::future;
use log::info;

use crate::config::EngineConfig;
use crate::context::AppContext;
use crate::engine::Engine;
use crate::models::Interval;
use crate::provider::MarketMeta;
use crate::signals::FusionMode;

pub async fn run(app: &AppContext, symbol: &str, mode: FusionMode, capital: f64) -> Result<()> {
    let spec = app.symbols.resolve(symbol)?;
    info!(
        "Backtesting {} ({} fusion, {:.0} starting capital)",
        spec.symbol,
        mode.label(),
        capital
    );

    let provider = app.provider();
    let (primary, confirm) = future::try_join(
        provider.fetch(spec, Interval::M5),
        provider.fetch(spec, Interval::M15),
    )
    .await?;
    let meta = MarketMeta::evaluate(&primary, Utc::now());

    let config = EngineConfig {
        start_capital: capital,
        fusion_mode: mode,
        ..Default::default()
    };
    config.validate()?;

    let report = Engine::new(config).run(spec, &[primary, confirm], meta)?;
    info!(
        "{}: {} closed trade(s), final capital {:.2}, market {}",
        report.symbol,
        report.journal.len(),
        report.capital,
        report.market_status.as_str()
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
