use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{
    Holding, IndustryShare, MacroCumulative, MacroEconomicData, WalletSummary,
    holding::profit_rate,
};

pub fn summarize(wallet_id: &str, holdings: &[Holding]) -> WalletSummary {
    let (total_amount, total_profit) = holdings
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(amount, profit), h| {
            (
                amount.saturating_add(*h.holding_amount()),
                profit.saturating_add(*h.holding_profit()),
            )
        });

    WalletSummary::new(
        wallet_id.to_string(),
        holdings.len(),
        total_amount,
        total_profit,
        profit_rate(total_amount, total_profit),
    )
}

/// Merges holdings of the same fund code, keeping first-seen order and
/// first-seen descriptive fields.
pub fn aggregate_by_code(holdings: &[Holding], wallet_id: &str) -> Vec<Holding> {
    let mut merged: Vec<Holding> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for holding in holdings {
        match index.get(holding.code().as_str()) {
            Some(&i) => merged[i].absorb(holding),
            None => {
                index.insert(holding.code().as_str(), merged.len());
                merged.push(holding.clone().with_wallet(wallet_id));
            }
        }
    }

    merged
}

/// Amount share per primary industry, largest first.
pub fn industry_breakdown(holdings: &[Holding]) -> Vec<IndustryShare> {
    let total = holdings
        .iter()
        .fold(Decimal::ZERO, |sum, h| sum.saturating_add(*h.holding_amount()));

    let mut order: Vec<&str> = Vec::new();
    let mut buckets: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for holding in holdings {
        let industry = holding.primary_industry();
        let entry = buckets.entry(industry).or_insert_with(|| {
            order.push(industry);
            (Decimal::ZERO, 0)
        });
        entry.0 = entry.0.saturating_add(*holding.holding_amount());
        entry.1 += 1;
    }

    let mut shares: Vec<IndustryShare> = order
        .into_iter()
        .map(|industry| {
            let (amount, count) = buckets[industry];
            let proportion = if total > Decimal::ZERO {
                amount
                    .checked_div(total)
                    .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                    .map(|r| r.round_dp(2))
                    .unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };
            IndustryShare::new(industry.to_string(), proportion, count)
        })
        .collect();

    shares.sort_by(|a, b| b.proportion().cmp(a.proportion()));
    shares
}

/// Running sum of month-over-month M1 growth in percent.
pub fn macro_cumulative(rows: &[MacroEconomicData]) -> Vec<MacroCumulative> {
    let mut cumulative = Decimal::ZERO;
    let mut result = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            let prev = *rows[i - 1].m1();
            let change = row
                .m1()
                .checked_sub(prev)
                .and_then(|d| d.checked_div(prev))
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED));
            if let Some(change) = change {
                cumulative = cumulative.saturating_add(change);
            }
        }
        result.push(MacroCumulative::new(*row.date(), cumulative.round_dp(2)));
    }

    result
}

/// Change from the first to the last value in percent.
pub fn history_change_rate(values: &[Decimal]) -> Decimal {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() >= 2 && !first.is_zero() => {
            last.checked_sub(*first)
                .and_then(|d| d.checked_div(*first))
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                .map(|r| r.round_dp(2))
                .unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}
