use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::utils::lenient_decimal,
    app::utils::parse_date,
    models::{Fund, FundHistoryPoint, MarketIndex, fund::UNKNOWN},
};

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "PascalCase")]
pub struct FundSearchResponseDto {
    err_code: i64,
    err_msg: Option<String>,
    #[serde(default)]
    datas: Vec<FundSearchDto>,
}

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "UPPERCASE")]
pub struct FundSearchDto {
    code: String,
    name: String,
    #[serde(default)]
    categorydesc: Option<String>,
    #[serde(rename = "FundBaseInfo", default)]
    fund_base_info: Option<FundBaseInfoDto>,
    #[serde(rename = "ZTJJInfo", default)]
    ztjj_info: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "UPPERCASE")]
pub struct FundBaseInfoDto {
    #[serde(default)]
    ftype: Option<String>,
    #[serde(default)]
    jjgs: Option<String>,
    #[serde(default)]
    jjjl: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    dwjz: Option<Decimal>,
    #[serde(default)]
    fsrq: Option<String>,
}

impl FundSearchDto {
    pub fn to_fund(&self) -> Fund {
        let base = self.fund_base_info.as_ref();
        let fund_type = base
            .and_then(|b| b.ftype.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| self.categorydesc.clone().filter(|c| !c.is_empty()))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Fund::new(
            self.code.clone(),
            self.name.clone(),
            fund_type,
            base.and_then(|b| b.jjgs.clone()),
            base.and_then(|b| b.jjjl.clone()),
            base.and_then(|b| b.dwjz),
            base.and_then(|b| b.fsrq.as_deref())
                .and_then(|d| parse_date(d).ok()),
            self.industry_info(),
        )
    }

    pub fn industry_info(&self) -> String {
        let names: Vec<String> = self
            .ztjj_info
            .iter()
            .flatten()
            .filter_map(|item| {
                ["INDUSTRY", "name", "TTYPENAME", "industry"]
                    .iter()
                    .find_map(|key| item.get(key).and_then(Value::as_str))
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect();

        if names.is_empty() {
            UNKNOWN.to_string()
        } else {
            names.join(", ")
        }
    }
}

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "PascalCase")]
pub struct FundHistoryResponseDto {
    data: Option<FundHistoryDataDto>,
    err_code: i64,
    err_msg: Option<String>,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct FundHistoryDataDto {
    #[serde(rename = "LSJZList", default)]
    lsjz_list: Vec<FundNavDto>,
}

#[derive(Debug, Deserialize, Getters, new)]
#[serde(rename_all = "UPPERCASE")]
pub struct FundNavDto {
    fsrq: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    dwjz: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    jzzzl: Option<Decimal>,
}

impl FundNavDto {
    pub fn to_history_point(&self) -> Option<FundHistoryPoint> {
        let date = parse_date(&self.fsrq).ok()?;
        Some(FundHistoryPoint::new(date, self.dwjz?))
    }
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct QuoteListResponseDto {
    data: Option<QuoteListDataDto>,
}

#[derive(Debug, Deserialize, Getters, new)]
pub struct QuoteListDataDto {
    #[serde(default)]
    diff: Vec<IndexQuoteDto>,
}

/// Field numbers follow the push2 quote API: f2 price, f3 change %, f12 code, f14 name.
#[derive(Debug, Deserialize, Getters, new)]
pub struct IndexQuoteDto {
    #[serde(default, deserialize_with = "lenient_decimal")]
    f2: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    f3: Option<Decimal>,
    f12: String,
    f14: String,
}

impl IndexQuoteDto {
    pub fn to_market_index(&self) -> MarketIndex {
        MarketIndex::new(self.f12.clone(), self.f14.clone(), self.f2, self.f3)
    }
}
