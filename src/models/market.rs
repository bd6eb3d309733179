use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct MarketIndex {
    code: String,
    name: String,
    value: Option<Decimal>,
    change_rate: Option<Decimal>,
}

impl MarketIndex {
    pub fn is_up(&self) -> bool {
        self.change_rate.is_some_and(|rate| rate > Decimal::ZERO)
    }
}

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct MacroEconomicData {
    date: NaiveDate,
    m1: Decimal,
    m1_change_rate: Decimal,
    m2: Decimal,
    m2_change_rate: Decimal,
    gdp: Decimal,
    gdp_change_rate: Decimal,
    buffett_indicator: Decimal,
}

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct MacroCumulative {
    date: NaiveDate,
    cumulative_change: Decimal,
}
