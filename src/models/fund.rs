use chrono::NaiveDate;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fund as returned by the search endpoint.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
pub struct Fund {
    code: String,
    name: String,
    fund_type: String,
    company: Option<String>,
    manager: Option<String>,
    latest_nav: Option<Decimal>,
    nav_date: Option<NaiveDate>,
    industry_info: String,
}

impl Fund {
    /// The first industry listed, used to bucket holdings.
    pub fn primary_industry(&self) -> &str {
        primary_industry(&self.industry_info)
    }
}

pub fn primary_industry(industry_info: &str) -> &str {
    industry_info
        .split(',')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNKNOWN)
}

pub const UNKNOWN: &str = "Unknown";
