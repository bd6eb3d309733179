use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;

use crate::errors::ValidationError;

static FUND_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("Invalid regex pattern"));

pub fn parse_date(field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(field.trim(), "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date '{}'", field))
}

/// Parses `2024-05-10 14:55` as sent by the valuation feed.
pub fn parse_minute_time(field: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(field.trim(), "%Y-%m-%d %H:%M")
        .with_context(|| format!("Failed to parse time '{}'", field))
}

pub fn parse_decimal(field: &str, field_name: &str) -> Result<Decimal> {
    field
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("Failed to parse {} '{}'", field_name, field))
}

pub fn parse_amount(field: &str) -> Result<Decimal, ValidationError> {
    field
        .trim()
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidNumber(field.to_string()))
}

pub fn is_valid_fund_code(code: &str) -> bool {
    FUND_CODE.is_match(code)
}

pub fn validate_fund_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_fund_code(code) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFundCode(code.to_string()))
    }
}

/// Splits user input on ASCII or full-width commas, dropping blanks.
pub fn split_codes(input: &str) -> Vec<String> {
    input
        .replace('，', ",")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_amount(value: &Decimal) -> String {
    format!("{:.2}", value)
}

pub fn format_nav(value: &Decimal) -> String {
    format!("{:.4}", value)
}

pub fn format_percentage(value: &Decimal) -> String {
    if *value > Decimal::ZERO {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

pub fn format_optional(value: &Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}
