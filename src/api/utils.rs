use std::sync::LazyLock;

use anyhow::{Context, Error, Result};
use regex::Regex;
use reqwest::{Client, header::REFERER};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static JSONP_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*[\w$.]+\((.*)\)\s*;?\s*$").expect("Invalid regex pattern"));

pub async fn make_request(client: &Client, url: &str, referer: Option<&str>) -> Result<String> {
    let mut req = client.get(url);
    if let Some(referer) = referer {
        req = req.header(REFERER, referer);
    }
    let res = req.send().await?;

    if !res.status().is_success() {
        return Err(Error::msg(format!("Request failed: {}", res.status())));
    }

    Ok(res.text().await?)
}

pub async fn make_json_request(client: &Client, url: &str, referer: Option<&str>) -> Result<Value> {
    let text = make_request(client, url, referer).await?;
    let data = serde_json::from_str::<Value>(&text)
        .with_context(|| format!("Unexpected response from {}", url))?;

    Ok(data)
}

/// Strips a `callback(...)` wrapper and returns the inner payload.
pub fn unwrap_jsonp(text: &str) -> Result<&str> {
    JSONP_WRAPPER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .with_context(|| "Invalid response format: expected JSONP")
}

pub fn parse_jsonp(text: &str) -> Result<Value> {
    let inner = unwrap_jsonp(text)?;
    if inner.is_empty() {
        return Err(Error::msg("Empty JSONP payload"));
    }
    serde_json::from_str::<Value>(inner).with_context(|| "Failed to parse JSONP payload")
}

pub fn parse_response_object<T>(data: Value, error_msg: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    match data {
        Value::Object(obj) => serde_json::from_value(Value::Object(obj))
            .with_context(|| error_msg.to_string()),
        _ => Err(Error::msg("Unexpected API response format: not an object")),
    }
}

/// Accepts a number, a numeric string, `"-"`, `""` or null.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%');
            if s.is_empty() || s == "-" {
                None
            } else {
                s.parse::<Decimal>().ok()
            }
        }
        _ => None,
    }
}
