use derive_getters::Getters;
use derive_new::new;
use rust_decimal::Decimal;

#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct WalletSummary {
    wallet_id: String,
    holding_count: usize,
    total_amount: Decimal,
    total_profit: Decimal,
    profit_rate: Decimal,
}

/// Share of a wallet's amount held in one industry.
#[derive(Clone, Debug, Getters, PartialEq, new)]
pub struct IndustryShare {
    industry: String,
    proportion: Decimal,
    count: usize,
}
