use anyhow::{Context, Error, Result};
use chrono::Local;
use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::{
    app::{
        calc::macro_cumulative,
        utils::{parse_date, parse_decimal},
    },
    db::{
        Store,
        utils::{MACRO_ECONOMIC_DATA, MARKET_INDICES, PRECIOUS_METALS, metal_history_key},
    },
    models::{MacroCumulative, MacroEconomicData, MarketIndex, MetalBoard, PricePoint},
    services::MarketSource,
};

pub const MAX_HISTORY_POINTS: usize = 365;
pub const DEFAULT_MACRO_MONTHS: usize = 24;

/// Precious metals, market indices and macro data, each backed by the store
/// so the last good snapshot survives a failed refresh.
#[derive(Clone, Debug)]
pub struct Markets {
    store: Store,
}

impl Markets {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn cached_metals(&self) -> Option<MetalBoard> {
        self.store.read_or(PRECIOUS_METALS, None).await
    }

    pub async fn refresh_metals<S>(&self, source: &S) -> Result<MetalBoard>
    where
        S: MarketSource,
    {
        match source.get_gold_prices().await {
            Ok(board) => {
                self.store.write(PRECIOUS_METALS, &board).await?;
                self.record_history(&board).await?;
                Ok(board)
            }
            Err(e) => {
                warn!("Precious metal refresh failed, using cached board: {:?}", e);
                self.cached_metals()
                    .await
                    .map(MetalBoard::mark_stale)
                    .ok_or(e)
            }
        }
    }

    /// One point per series per day, newest replacing the same date.
    pub async fn record_history(&self, board: &MetalBoard) -> Result<()> {
        let date = board.synced_at().with_timezone(&Local).date_naive();

        for (series, value) in board.reference_prices() {
            let key = metal_history_key(series);
            let mut points: Vec<PricePoint> = self.store.read_or(&key, Vec::new()).await;

            points.retain(|p| *p.date() != date);
            points.push(PricePoint::new(series.to_string(), date, value));
            points.sort_by_key(|p| *p.date());
            if points.len() > MAX_HISTORY_POINTS {
                let excess = points.len() - MAX_HISTORY_POINTS;
                points.drain(..excess);
            }

            self.store.write(&key, &points).await?;
        }

        Ok(())
    }

    pub async fn metal_history(&self, series: &str) -> Vec<PricePoint> {
        self.store
            .read_or(&metal_history_key(series), Vec::new())
            .await
    }

    pub async fn cached_indices(&self) -> Vec<MarketIndex> {
        self.store.read_or(MARKET_INDICES, Vec::new()).await
    }

    pub async fn refresh_indices<S>(&self, source: &S) -> Result<Vec<MarketIndex>>
    where
        S: MarketSource,
    {
        match source.get_market_indices().await {
            Ok(indices) => {
                self.store.write(MARKET_INDICES, &indices).await?;
                Ok(indices)
            }
            Err(e) => {
                let cached = self.cached_indices().await;
                if cached.is_empty() {
                    return Err(e);
                }
                warn!("Market index refresh failed, using cached quotes: {:?}", e);
                Ok(cached)
            }
        }
    }

    pub async fn macro_data(&self) -> Vec<MacroEconomicData> {
        self.store.read_or(MACRO_ECONOMIC_DATA, Vec::new()).await
    }

    /// Merges rows from CSV into the stored series. Returns the row count read.
    pub async fn import_macro_csv(&self, path: &str) -> Result<usize> {
        let imported = read_macro_csv(path)?;
        let count = imported.len();

        let mut rows = self.macro_data().await;
        for row in imported {
            rows.retain(|r| r.date() != row.date());
            rows.push(row);
        }
        rows.sort_by_key(|r| *r.date());

        self.store.write(MACRO_ECONOMIC_DATA, &rows).await?;
        info!("Imported {} macro row(s) from {}", count, path);
        Ok(count)
    }

    /// The last `months + 1` rows, so `months` changes are visible.
    pub async fn macro_window(&self, months: usize) -> Vec<MacroEconomicData> {
        let rows = self.macro_data().await;
        let start = rows.len().saturating_sub(months.saturating_add(1));
        rows[start..].to_vec()
    }

    pub async fn macro_cumulative(&self, months: usize) -> Vec<MacroCumulative> {
        macro_cumulative(&self.macro_window(months).await)
    }
}

/// Reads monthly rows. A header row is skipped when its first column is not
/// a date.
pub fn read_macro_csv(path: &str) -> Result<Vec<MacroEconomicData>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file at path: {}", path))?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let rec = record
            .with_context(|| format!("Failed to read CSV record at row {}", row_idx + 1))?;

        if row_idx == 0 && rec.get(0).is_some_and(|c| parse_date(c).is_err()) {
            continue;
        }

        if rec.len() < 8 {
            return Err(Error::msg(format!(
                "Invalid CSV format at row {}: expected 8 columns, found {}",
                row_idx + 1,
                rec.len()
            )));
        }

        rows.push(MacroEconomicData::new(
            parse_date(&rec[0])?,
            parse_decimal(&rec[1], "m1")?,
            parse_decimal(&rec[2], "m1 change rate")?,
            parse_decimal(&rec[3], "m2")?,
            parse_decimal(&rec[4], "m2 change rate")?,
            parse_decimal(&rec[5], "gdp")?,
            parse_decimal(&rec[6], "gdp change rate")?,
            parse_decimal(&rec[7], "buffett indicator")?,
        ));
    }

    Ok(rows)
}
