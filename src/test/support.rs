use std::collections::HashMap;

use anyhow::{Error, Result};
use rust_decimal::Decimal;

use crate::{
    models::{Fund, FundValuation, MarketIndex, MetalBoard},
    services::{FundLookup, MarketSource, ValuationSource},
};

pub fn fund(code: &str, name: &str, industry: &str) -> Fund {
    Fund::new(
        code.to_string(),
        name.to_string(),
        "Hybrid".to_string(),
        Some("Test Fund Co.".to_string()),
        None,
        None,
        None,
        industry.to_string(),
    )
}

pub fn valuation(code: &str, name: &str, estimate: Decimal, change: Decimal) -> FundValuation {
    FundValuation::new(
        code.to_string(),
        name.to_string(),
        estimate,
        estimate,
        change,
        None,
        None,
    )
}

/// Serves canned funds, valuations and market data. Anything not canned fails.
#[derive(Default)]
pub struct StubSource {
    pub funds: HashMap<String, Fund>,
    pub valuations: HashMap<String, FundValuation>,
    pub metals: Option<MetalBoard>,
    pub indices: Vec<MarketIndex>,
}

impl StubSource {
    pub fn with_valuations(valuations: Vec<FundValuation>) -> Self {
        Self {
            valuations: valuations
                .into_iter()
                .map(|v| (v.code().clone(), v))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_funds(funds: Vec<Fund>) -> Self {
        Self {
            funds: funds.into_iter().map(|f| (f.code().clone(), f)).collect(),
            ..Default::default()
        }
    }

    pub fn with_market(metals: MetalBoard, indices: Vec<MarketIndex>) -> Self {
        Self {
            metals: Some(metals),
            indices,
            ..Default::default()
        }
    }
}

impl FundLookup for StubSource {
    async fn search_fund(&self, code: &str) -> Result<Option<Fund>> {
        if code == "999999" {
            return Err(Error::msg("connection reset"));
        }
        Ok(self.funds.get(code).cloned())
    }
}

impl ValuationSource for StubSource {
    async fn get_valuations(&self, codes: &[String]) -> Vec<(String, Result<FundValuation>)> {
        codes
            .iter()
            .map(|code| {
                let result = self
                    .valuations
                    .get(code)
                    .cloned()
                    .ok_or_else(|| Error::msg(format!("no valuation for {}", code)));
                (code.clone(), result)
            })
            .collect()
    }
}

impl MarketSource for StubSource {
    async fn get_gold_prices(&self) -> Result<MetalBoard> {
        self.metals
            .clone()
            .ok_or_else(|| Error::msg("gold price service unavailable"))
    }

    async fn get_market_indices(&self) -> Result<Vec<MarketIndex>> {
        if self.indices.is_empty() {
            return Err(Error::msg("No index quotes in response"));
        }
        Ok(self.indices.clone())
    }
}
