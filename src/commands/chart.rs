use anyhow::Result;
use log::info;
use serde_json::json;

use crate::context::AppContext;
use crate::indicators::compute_snapshots;
use crate::models::{Interval, SnapshotRow};
use crate::provider::ist_date;

pub async fn run(
    app: &AppContext,
    symbol: &str,
    interval: Interval,
    limit: Option<usize>,
) -> Result<()> {
    let spec = app.symbols.resolve(symbol)?;
    let series = app.provider().fetch(spec, interval).await?;
    let snapshots = compute_snapshots(&series.candles);

    let mut rows: Vec<SnapshotRow> = series
        .candles
        .iter()
        .zip(snapshots.iter())
        .map(|(candle, snapshot)| SnapshotRow::new(candle, snapshot))
        .collect();

    match limit {
        Some(count) => {
            if rows.len() > count {
                rows.drain(..rows.len() - count);
            }
        }
        None if interval.is_intraday() => {
            // Default intraday view is the latest session day on the tape.
            if let Some(last) = rows.last() {
                let day = ist_date(last.time);
                rows.retain(|row| ist_date(row.time) == day);
            }
        }
        None => {}
    }

    info!(
        "{} {} chart: {} row(s), data mode {}",
        spec.symbol,
        interval,
        rows.len(),
        series.mode.as_str()
    );

    let payload = json!({
        "symbol": spec.symbol,
        "interval": interval.as_str(),
        "data": rows,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
