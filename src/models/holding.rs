use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fund::primary_industry;

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    code: String,
    fund_name: String,
    holding_amount: Decimal,
    holding_profit: Decimal,
    fund_type: String,
    industry_info: String,
    wallet_id: String,
}

impl Holding {
    /// Profit relative to the cost basis (`amount - profit`), in percent.
    pub fn profit_rate(&self) -> Decimal {
        profit_rate(self.holding_amount, self.holding_profit)
    }

    pub fn primary_industry(&self) -> &str {
        primary_industry(&self.industry_info)
    }

    pub fn set_amounts(&mut self, amount: Decimal, profit: Decimal) {
        self.holding_amount = amount;
        self.holding_profit = profit;
    }

    pub(crate) fn absorb(&mut self, other: &Holding) {
        self.holding_amount = self.holding_amount.saturating_add(other.holding_amount);
        self.holding_profit = self.holding_profit.saturating_add(other.holding_profit);
    }

    pub(crate) fn with_wallet(mut self, wallet_id: &str) -> Self {
        self.wallet_id = wallet_id.to_string();
        self
    }
}

/// 0 when the cost basis is not positive or the result does not fit.
pub fn profit_rate(amount: Decimal, profit: Decimal) -> Decimal {
    match amount.checked_sub(profit) {
        Some(cost) if cost > Decimal::ZERO => profit
            .checked_div(cost)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .map(|r| r.round_dp(2))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}
