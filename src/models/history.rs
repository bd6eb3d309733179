use chrono::NaiveDate;
use clap::ValueEnum;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct FundHistoryPoint {
    date: NaiveDate,
    value: Decimal,
}

#[derive(Clone, Copy, Debug, Default, Display, EnumIter, PartialEq, ValueEnum)]
pub enum TimeRange {
    #[value(name = "1w")]
    #[strum(to_string = "1W")]
    OneWeek,
    #[default]
    #[value(name = "1m")]
    #[strum(to_string = "1M")]
    OneMonth,
    #[value(name = "3m")]
    #[strum(to_string = "3M")]
    ThreeMonths,
    #[value(name = "1y")]
    #[strum(to_string = "1Y")]
    OneYear,
}

impl TimeRange {
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::OneWeek => 7,
            TimeRange::OneMonth => 30,
            TimeRange::ThreeMonths => 90,
            TimeRange::OneYear => 365,
        }
    }
}
