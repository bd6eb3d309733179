use std::cmp::Ordering;

use anyhow::{Error, Result};
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::{
    app::utils::{is_valid_fund_code, split_codes},
    db::{Store, utils::TRACKED_FUNDS},
    errors::ValidationError,
    models::{FundSort, FundValuation, SortField, SortOrder},
    services::ValuationSource,
};

/// Outcome of adding codes to the tracked list.
#[derive(Clone, Debug, PartialEq)]
pub struct AddOutcome {
    pub added: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct FundTracker {
    store: Store,
    funds: Vec<FundValuation>,
    last_refresh: Option<DateTime<Local>>,
}

impl FundTracker {
    pub async fn load(store: Store) -> Self {
        let funds = store.read_or(TRACKED_FUNDS, Vec::new()).await;
        Self {
            store,
            funds,
            last_refresh: None,
        }
    }

    pub fn funds(&self) -> &[FundValuation] {
        &self.funds
    }

    pub fn codes(&self) -> Vec<String> {
        self.funds.iter().map(|f| f.code().clone()).collect()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Local>> {
        self.last_refresh
    }

    pub fn is_tracked(&self, code: &str) -> bool {
        self.funds.iter().any(|f| f.code() == code)
    }

    /// Accepts a comma separated list, ASCII or full-width commas.
    pub async fn add_codes<S>(&mut self, source: &S, input: &str) -> Result<AddOutcome>
    where
        S: ValuationSource,
    {
        let valid: Vec<String> = split_codes(input)
            .into_iter()
            .filter(|c| is_valid_fund_code(c))
            .collect();
        if valid.is_empty() {
            return Err(ValidationError::NoValidCodes.into());
        }

        let mut fresh: Vec<String> = Vec::new();
        for code in valid {
            if !self.is_tracked(&code) && !fresh.contains(&code) {
                fresh.push(code);
            }
        }
        if fresh.is_empty() {
            return Err(ValidationError::AllCodesTracked.into());
        }

        let mut outcome = AddOutcome {
            added: Vec::new(),
            failed: Vec::new(),
        };
        for (code, result) in source.get_valuations(&fresh).await {
            match result {
                Ok(valuation) => {
                    outcome.added.push(code);
                    self.funds.push(valuation);
                }
                Err(e) => {
                    warn!("Failed to fetch valuation for {}: {:?}", code, e);
                    outcome.failed.push(code);
                }
            }
        }

        if outcome.added.is_empty() {
            return Err(Error::msg(format!(
                "Failed to fetch any of: {}",
                outcome.failed.join(", ")
            )));
        }

        info!("Tracking {} new fund(s)", outcome.added.len());
        self.save().await?;
        Ok(outcome)
    }

    pub async fn remove(&mut self, code: &str) -> Result<bool> {
        let before = self.funds.len();
        self.funds.retain(|f| f.code() != code);
        let removed = self.funds.len() != before;
        if removed {
            self.save().await?;
        }
        Ok(removed)
    }

    /// Re-fetches every tracked fund. A fund that fails keeps its previous
    /// snapshot. Returns the number of failures.
    pub async fn refresh<S>(&mut self, source: &S) -> Result<usize>
    where
        S: ValuationSource,
    {
        if self.funds.is_empty() {
            self.last_refresh = Some(Local::now());
            return Ok(0);
        }

        let mut failures = 0;
        for (code, result) in source.get_valuations(&self.codes()).await {
            match result {
                Ok(valuation) => {
                    if let Some(slot) = self.funds.iter_mut().find(|f| *f.code() == code) {
                        *slot = valuation;
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!("Keeping previous valuation for {}: {:?}", code, e);
                }
            }
        }

        self.last_refresh = Some(Local::now());
        self.save().await?;
        Ok(failures)
    }

    pub fn sorted(&self, sort: FundSort) -> Vec<FundValuation> {
        let mut funds = self.funds.clone();
        sort_valuations(&mut funds, sort);
        funds
    }

    /// Sorted view narrowed by `query`.
    pub fn view(&self, sort: FundSort, query: &str) -> Vec<FundValuation> {
        let mut funds = filter_valuations(&self.funds, query);
        sort_valuations(&mut funds, sort);
        funds
    }

    async fn save(&self) -> Result<()> {
        self.store.write(TRACKED_FUNDS, &self.funds).await
    }
}

pub fn sort_valuations(funds: &mut [FundValuation], sort: FundSort) {
    funds.sort_by(|a, b| {
        let ord = compare(a, b, sort.field);
        match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn compare(a: &FundValuation, b: &FundValuation, field: SortField) -> Ordering {
    match field {
        SortField::ChangeRate => a.change_rate().cmp(b.change_rate()),
        SortField::EstimatedValue => a.estimated_value().cmp(b.estimated_value()),
        SortField::NetValue => a.net_value().cmp(b.net_value()),
        SortField::Name => a.name().cmp(b.name()),
        SortField::Code => a.code().cmp(b.code()),
    }
}

/// Case-insensitive match on name or substring match on code.
pub fn filter_valuations(funds: &[FundValuation], query: &str) -> Vec<FundValuation> {
    let query = query.trim().to_lowercase();
    funds
        .iter()
        .filter(|f| {
            query.is_empty()
                || f.name().to_lowercase().contains(&query)
                || f.code().contains(&query)
        })
        .cloned()
        .collect()
}
