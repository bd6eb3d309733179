use std::collections::HashSet;

use anyhow::{Context, Error, Result};
use csv::ReaderBuilder;
use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::{
    app::utils::{is_valid_fund_code, parse_amount},
    errors::{PortfolioError, ValidationError},
    models::Fund,
    services::fund_service::FundLookup,
};

pub const MAX_BATCH_ITEMS: usize = 10;
pub const MAX_HOLDING_AMOUNT: Decimal = dec!(1000000);

#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct BatchAddItem {
    code: String,
    holding_amount: Decimal,
    holding_profit: Decimal,
}

#[derive(Debug, Getters)]
pub struct BatchAddResult {
    item: BatchAddItem,
    outcome: Result<Fund, String>,
}

impl BatchAddResult {
    fn ok(item: &BatchAddItem, fund: Fund) -> Self {
        Self {
            item: item.clone(),
            outcome: Ok(fund),
        }
    }

    fn failed(item: &BatchAddItem, error: impl ToString) -> Self {
        Self {
            item: item.clone(),
            outcome: Err(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn code(&self) -> &str {
        self.item.code()
    }
}

/// Bounds shared by every path that stores a holding.
pub fn validate_holding_amounts(amount: Decimal, profit: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(amount));
    }
    if amount > MAX_HOLDING_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            amount,
            max: MAX_HOLDING_AMOUNT,
        });
    }
    if profit.abs() > MAX_HOLDING_AMOUNT {
        return Err(ValidationError::ProfitOutOfRange {
            profit,
            max: MAX_HOLDING_AMOUNT,
        });
    }
    Ok(())
}

/// Checks a batch before any lookup is made. An empty or oversized batch
/// reports only that; otherwise every problem is collected.
pub fn validate_batch_items(items: &[BatchAddItem]) -> Vec<String> {
    let mut errors = Vec::new();

    if items.is_empty() {
        errors.push("Add at least one holding".to_string());
        return errors;
    }

    if items.len() > MAX_BATCH_ITEMS {
        errors.push(format!("At most {} holdings per batch", MAX_BATCH_ITEMS));
        return errors;
    }

    let unique: HashSet<&str> = items.iter().map(|i| i.code.as_str()).collect();
    if unique.len() != items.len() {
        errors.push("Duplicate fund codes in batch".to_string());
    }

    for (idx, item) in items.iter().enumerate() {
        if !is_valid_fund_code(&item.code) {
            let err = ValidationError::InvalidFundCode(item.code.clone());
            errors.push(format!("Item {}: {}", idx + 1, err));
        }
        if item.holding_amount < Decimal::ZERO {
            let err = ValidationError::NegativeAmount(item.holding_amount);
            errors.push(format!("Item {}: {}", idx + 1, err));
        }
    }

    errors
}

/// Looks up every item, at most `MAX_BATCH_ITEMS` of them, and reports each
/// outcome separately.
pub async fn batch_add<L>(lookup: &L, items: &[BatchAddItem]) -> Vec<BatchAddResult>
where
    L: FundLookup,
{
    let mut results = Vec::new();

    for item in items.iter().take(MAX_BATCH_ITEMS) {
        if !is_valid_fund_code(&item.code) {
            results.push(BatchAddResult::failed(
                item,
                ValidationError::InvalidFundCode(item.code.clone()),
            ));
            continue;
        }

        if let Err(e) = validate_holding_amounts(item.holding_amount, item.holding_profit) {
            results.push(BatchAddResult::failed(item, e));
            continue;
        }

        match lookup.search_fund(&item.code).await {
            Ok(Some(fund)) => results.push(BatchAddResult::ok(item, fund)),
            Ok(None) => {
                results.push(BatchAddResult::failed(
                    item,
                    PortfolioError::FundNotFound(item.code.clone()),
                ));
            }
            Err(e) => {
                warn!("Lookup for {} failed: {:?}", item.code, e);
                results.push(BatchAddResult::failed(item, format!("Add failed: {}", e)));
            }
        }
    }

    results
}

/// Reads `code,amount[,profit]` rows. A header row is skipped when its first
/// column is not a number.
pub fn read_batch_csv(path: &str) -> Result<Vec<BatchAddItem>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file at path: {}", path))?;

    let mut items = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let rec = record
            .with_context(|| format!("Failed to read CSV record at row {}", row_idx + 1))?;

        if row_idx == 0 && rec.get(0).is_some_and(|c| c.parse::<u64>().is_err()) {
            continue;
        }

        if rec.len() < 2 {
            return Err(Error::msg(format!(
                "Invalid CSV format at row {}: expected at least 2 columns, found {}",
                row_idx + 1,
                rec.len()
            )));
        }

        let amount = parse_amount(&rec[1])
            .with_context(|| format!("Invalid amount at row {}", row_idx + 1))?;
        let profit = match rec.get(2).filter(|p| !p.is_empty()) {
            Some(p) => parse_amount(p)
                .with_context(|| format!("Invalid profit at row {}", row_idx + 1))?,
            None => Decimal::ZERO,
        };

        items.push(BatchAddItem::new(rec[0].to_string(), amount, profit));
    }

    Ok(items)
}
