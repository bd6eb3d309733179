use anyhow::{Context, Error, Result};
use chrono::Utc;
use reqwest::Client;

use crate::{
    api::{
        eastmoney_dto::{FundHistoryResponseDto, FundSearchResponseDto, QuoteListResponseDto},
        utils::{make_json_request, make_request, parse_jsonp, parse_response_object},
    },
    models::{Fund, FundHistoryPoint, MarketIndex},
};

const SEARCH_URL: &str = "https://fundsuggest.eastmoney.com/FundSearch/api/FundSearchAPI.ashx";
const HISTORY_URL: &str = "https://api.fund.eastmoney.com/f10/lsjz";
const HISTORY_REFERER: &str = "https://fundf10.eastmoney.com/";
const QUOTE_LIST_URL: &str = "https://push2.eastmoney.com/api/qt/ulist.np/get";

/// Shanghai Composite, Shenzhen Component, ChiNext and Hang Seng.
pub const INDEX_SECIDS: &str = "1.000001,0.399001,0.399006,100.HSI";

pub async fn search_fund(code: &str, client: &Client) -> Result<Option<Fund>> {
    let ts = Utc::now().timestamp_millis();
    let url = format!(
        "{}?m=1&key={}&callback=SuggestData_{}&_={}",
        SEARCH_URL, code, ts, ts
    );
    let text = make_request(client, &url, None).await?;
    parse_search(&text).with_context(|| format!("Fund search ({})", code))
}

pub fn parse_search(text: &str) -> Result<Option<Fund>> {
    let data = parse_jsonp(text)?;
    let res = parse_response_object::<FundSearchResponseDto>(data, "Failed to parse fund search")?;

    if *res.err_code() != 0 {
        return Err(Error::msg(
            res.err_msg()
                .clone()
                .unwrap_or_else(|| format!("Search failed with code {}", res.err_code())),
        ));
    }

    Ok(res.datas().first().map(|d| d.to_fund()))
}

pub async fn get_fund_history(
    code: &str,
    days: u32,
    client: &Client,
) -> Result<Vec<FundHistoryPoint>> {
    let url = format!(
        "{}?fundCode={}&pageIndex=1&pageSize={}",
        HISTORY_URL, code, days
    );
    let data = make_json_request(client, &url, Some(HISTORY_REFERER)).await?;
    parse_history(data).with_context(|| format!("Fund history ({})", code))
}

pub fn parse_history(data: serde_json::Value) -> Result<Vec<FundHistoryPoint>> {
    let res =
        parse_response_object::<FundHistoryResponseDto>(data, "Failed to parse fund history")?;

    if *res.err_code() != 0 {
        return Err(Error::msg(
            res.err_msg()
                .clone()
                .unwrap_or_else(|| format!("History failed with code {}", res.err_code())),
        ));
    }

    let mut points: Vec<FundHistoryPoint> = res
        .data()
        .as_ref()
        .map(|d| d.lsjz_list().iter().filter_map(|n| n.to_history_point()).collect())
        .unwrap_or_default();

    points.sort_by_key(|p| *p.date());
    Ok(points)
}

pub async fn get_market_indices(client: &Client) -> Result<Vec<MarketIndex>> {
    let url = format!(
        "{}?fltt=2&fields=f2,f3,f12,f14&secids={}",
        QUOTE_LIST_URL, INDEX_SECIDS
    );
    let data = make_json_request(client, &url, None).await?;
    parse_market_indices(data)
}

pub fn parse_market_indices(data: serde_json::Value) -> Result<Vec<MarketIndex>> {
    let res = parse_response_object::<QuoteListResponseDto>(data, "Failed to parse index quotes")?;
    let indices: Vec<MarketIndex> = res
        .data()
        .as_ref()
        .map(|d| d.diff().iter().map(|q| q.to_market_index()).collect())
        .unwrap_or_default();

    if indices.is_empty() {
        return Err(Error::msg("No index quotes in response"));
    }
    Ok(indices)
}
