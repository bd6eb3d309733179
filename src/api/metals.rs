use anyhow::{Context, Error, Result};
use reqwest::Client;
use serde_json::Value;

use crate::{
    api::{
        metals_dto::GoldPriceResponseDto,
        utils::{make_json_request, parse_response_object},
    },
    models::MetalBoard,
};

const GOLD_PRICE_URL: &str = "https://v2.xxapi.cn/api/goldprice";

pub async fn get_gold_prices(client: &Client) -> Result<MetalBoard> {
    let data = make_json_request(client, GOLD_PRICE_URL, None).await?;
    parse_gold_prices(data).with_context(|| "Precious metal prices")
}

pub fn parse_gold_prices(data: Value) -> Result<MetalBoard> {
    let res = parse_response_object::<GoldPriceResponseDto>(data, "Failed to parse gold prices")?;

    if *res.code() != 200 {
        return Err(Error::msg(format!(
            "Gold price API returned {}: {}",
            res.code(),
            res.msg().as_deref().unwrap_or("unknown error")
        )));
    }

    let data = res
        .data()
        .as_ref()
        .with_context(|| "Failed to get 'data' in response")?;

    Ok(data.to_board())
}
