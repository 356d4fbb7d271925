use anyhow::Result;
use futures::future;
use log::{info, warn};
use serde_json::{json, Map, Value};

use crate::context::AppContext;
use crate::indicators::compute_snapshots;
use crate::models::{Candle, Interval, SnapshotRow};

/// Latest five-minute bar with indicators for every configured index.
/// Symbols that fail to fetch degrade to an inline error object so the
/// rest of the map still renders.
pub async fn run(app: &AppContext) -> Result<()> {
    let specs = app.symbols.specs();
    let provider = app.provider();
    let results =
        future::join_all(specs.iter().map(|spec| provider.fetch(spec, Interval::M5))).await;

    let mut payload = Map::new();
    for (spec, result) in specs.iter().zip(results) {
        let value = match result {
            Ok(series) => match latest_row(&series.candles) {
                Some(row) => serde_json::to_value(row)?,
                None => json!({ "error": "no candles in session" }),
            },
            Err(error) => {
                warn!("{} snapshot failed: {}", spec.symbol, error);
                json!({ "error": error.to_string() })
            }
        };
        payload.insert(spec.symbol.clone(), value);
    }

    info!("Snapshot covers {} symbol(s)", payload.len());
    println!("{}", serde_json::to_string_pretty(&Value::Object(payload))?);
    Ok(())
}

fn latest_row(candles: &[Candle]) -> Option<SnapshotRow> {
    let snapshots = compute_snapshots(candles);
    let candle = candles.last()?;
    let snapshot = snapshots.last()?;
    Some(SnapshotRow::new(candle, snapshot))
}
