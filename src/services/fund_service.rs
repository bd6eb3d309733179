use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::task::JoinSet;
use tracing::warn;

use crate::{
    api::{eastmoney, fundgz, metals, utils::USER_AGENT},
    models::{Fund, FundHistoryPoint, FundValuation, MarketIndex, MetalBoard},
};

/// Resolves a fund code to its search record.
pub trait FundLookup {
    fn search_fund(&self, code: &str) -> impl Future<Output = Result<Option<Fund>>> + Send;
}

/// Fetches realtime valuations, one result per requested code in order.
pub trait ValuationSource {
    fn get_valuations(
        &self,
        codes: &[String],
    ) -> impl Future<Output = Vec<(String, Result<FundValuation>)>> + Send;
}

/// Precious metal and index quotes.
pub trait MarketSource {
    fn get_gold_prices(&self) -> impl Future<Output = Result<MetalBoard>> + Send;

    fn get_market_indices(&self) -> impl Future<Output = Result<Vec<MarketIndex>>> + Send;
}

#[derive(Clone, Debug)]
pub struct FundService {
    client: Client,
}

impl FundService {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| "Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub async fn get_valuation(&self, code: &str) -> Result<FundValuation> {
        fundgz::get_valuation(code, &self.client).await
    }

    pub async fn search(&self, code: &str) -> Result<Option<Fund>> {
        eastmoney::search_fund(code, &self.client).await
    }

    async fn fetch_valuations(&self, codes: &[String]) -> Vec<(String, Result<FundValuation>)> {
        let mut set = JoinSet::new();
        for (idx, code) in codes.iter().enumerate() {
            let client = self.client.clone();
            let code = code.clone();
            set.spawn(async move {
                let result = fundgz::get_valuation(&code, &client).await;
                (idx, code, result)
            });
        }

        let mut results = Vec::with_capacity(codes.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(e) => warn!("Valuation task failed: {}", e),
            }
        }

        results.sort_by_key(|(idx, _, _)| *idx);
        results
            .into_iter()
            .map(|(_, code, result)| (code, result))
            .collect()
    }

    pub async fn get_fund_history(&self, code: &str, days: u32) -> Result<Vec<FundHistoryPoint>> {
        eastmoney::get_fund_history(code, days, &self.client).await
    }
}

impl FundLookup for FundService {
    async fn search_fund(&self, code: &str) -> Result<Option<Fund>> {
        self.search(code).await
    }
}

impl ValuationSource for FundService {
    async fn get_valuations(&self, codes: &[String]) -> Vec<(String, Result<FundValuation>)> {
        self.fetch_valuations(codes).await
    }
}

impl MarketSource for FundService {
    async fn get_gold_prices(&self) -> Result<MetalBoard> {
        metals::get_gold_prices(&self.client).await
    }

    async fn get_market_indices(&self) -> Result<Vec<MarketIndex>> {
        eastmoney::get_market_indices(&self.client).await
    }
}
