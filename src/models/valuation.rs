use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Intraday estimate for a tracked fund.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct FundValuation {
    code: String,
    name: String,
    net_value: Decimal,
    estimated_value: Decimal,
    change_rate: Decimal,
    nav_date: Option<NaiveDate>,
    update_time: Option<NaiveDateTime>,
}

impl FundValuation {
    pub fn is_up(&self) -> bool {
        self.change_rate > Decimal::ZERO
    }
}
