use chrono::{DateTime, Local, NaiveDate};
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const SERIES_GOLD_BAR: &str = "gold_bar_avg";
pub const SERIES_GOLD_RECYCLE: &str = "gold_recycle";
pub const SERIES_PLATINUM: &str = "platinum_avg";

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct BankGoldBar {
    bank: String,
    price: Option<Decimal>,
}

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct GoldRecyclePrice {
    gold_type: String,
    recycle_price: Option<Decimal>,
    updated_date: String,
}

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct BrandPrice {
    brand: String,
    bullion_price: Option<Decimal>,
    gold_price: Option<Decimal>,
    platinum_price: Option<Decimal>,
    updated_date: String,
}

/// One snapshot of the precious metal price board.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct MetalBoard {
    bank_gold_bars: Vec<BankGoldBar>,
    recycle_prices: Vec<GoldRecyclePrice>,
    brand_prices: Vec<BrandPrice>,
    synced_at: DateTime<Local>,
    #[serde(default)]
    #[new(default)]
    stale: bool,
}

impl MetalBoard {
    pub fn mark_stale(mut self) -> Self {
        self.stale = true;
        self
    }

    /// Reference prices recorded into history on every successful refresh.
    pub fn reference_prices(&self) -> Vec<(&'static str, Decimal)> {
        let mut prices = Vec::new();

        if let Some(avg) = average(self.bank_gold_bars.iter().filter_map(|b| b.price)) {
            prices.push((SERIES_GOLD_BAR, avg));
        }
        if let Some(first) = self.recycle_prices.iter().find_map(|r| r.recycle_price) {
            prices.push((SERIES_GOLD_RECYCLE, first));
        }
        if let Some(avg) = average(self.brand_prices.iter().filter_map(|b| b.platinum_price)) {
            prices.push((SERIES_PLATINUM, avg));
        }

        prices
    }
}

fn average(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values.fold((Decimal::ZERO, 0u32), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        None
    } else {
        Some((sum / Decimal::from(count)).round_dp(2))
    }
}

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct PricePoint {
    series: String,
    date: NaiveDate,
    value: Decimal,
}
