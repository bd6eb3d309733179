use derive_getters::Getters;
use derive_new::new;
use serde::Deserialize;

use crate::{
    app::utils::{parse_date, parse_decimal, parse_minute_time},
    models::FundValuation,
};
use anyhow::Result;

/// Payload of `jsonpgz(...)`; every value arrives as a string.
#[derive(Debug, Deserialize, Getters, new)]
pub struct FundgzValuationDto {
    fundcode: String,
    name: String,
    jzrq: String,
    dwjz: String,
    gsz: String,
    gszzl: String,
    gztime: String,
}

impl FundgzValuationDto {
    pub fn to_valuation(&self) -> Result<FundValuation> {
        Ok(FundValuation::new(
            self.fundcode.clone(),
            self.name.clone(),
            parse_decimal(&self.dwjz, "net value")?,
            parse_decimal(&self.gsz, "estimated value")?,
            parse_decimal(&self.gszzl, "change rate")?,
            parse_date(&self.jzrq).ok(),
            parse_minute_time(&self.gztime).ok(),
        ))
    }
}
