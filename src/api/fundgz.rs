use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;

use crate::{
    api::{
        fundgz_dto::FundgzValuationDto,
        utils::{make_request, parse_jsonp, parse_response_object},
    },
    models::FundValuation,
};

const BASE_URL: &str = "https://fundgz.1234567.com.cn/js";

pub async fn get_valuation(code: &str, client: &Client) -> Result<FundValuation> {
    let url = format!("{}/{}.js?rt={}", BASE_URL, code, Utc::now().timestamp_millis());
    let text = make_request(client, &url, None).await?;
    parse_valuation(&text).with_context(|| format!("Fund valuation ({})", code))
}

pub fn parse_valuation(text: &str) -> Result<FundValuation> {
    let data = parse_jsonp(text).with_context(|| "No valuation available")?;
    let dto = parse_response_object::<FundgzValuationDto>(data, "Failed to parse fund valuation")?;
    dto.to_valuation()
}
