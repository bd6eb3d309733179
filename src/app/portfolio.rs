use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::{
    app::{
        calc::{aggregate_by_code, industry_breakdown, summarize},
        utils::validate_fund_code,
    },
    db::{
        Store,
        utils::{USER_HOLDINGS, WALLETS},
    },
    errors::{PortfolioError, ValidationError},
    models::{DEFAULT_WALLET_ID, Fund, Holding, IndustryShare, SUMMARY_WALLET_ID, Wallet, WalletSummary},
    services::batch::{BatchAddResult, validate_holding_amounts},
};

/// Wallets and the holdings they partition.
///
/// Only real wallets are persisted. The summary wallet is synthesized on
/// every read by merging holdings across wallets by fund code.
#[derive(Clone, Debug)]
pub struct Portfolio {
    store: Store,
    wallets: Vec<Wallet>,
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub async fn load(store: Store) -> Result<Self> {
        let mut wallets: Vec<Wallet> = store
            .read_or(WALLETS, vec![Wallet::default_wallet()])
            .await;
        wallets.retain(|w| !w.is_summary());
        if !wallets.iter().any(|w| w.id() == DEFAULT_WALLET_ID) {
            wallets.insert(0, Wallet::default_wallet());
        }

        let holdings: Vec<Holding> = store.read_or(USER_HOLDINGS, Vec::new()).await;

        Ok(Self {
            store,
            wallets,
            holdings,
        })
    }

    /// The summary wallet followed by the persisted wallets.
    pub fn wallets(&self) -> Vec<Wallet> {
        let mut wallets = Vec::with_capacity(self.wallets.len() + 1);
        wallets.push(Wallet::summary());
        wallets.extend(self.wallets.iter().cloned());
        wallets
    }

    pub fn wallet(&self, id: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id() == id)
    }

    pub fn create_wallet(&mut self, name: &str) -> Result<Wallet> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyWalletName.into());
        }

        let wallet = Wallet::new(Uuid::new_v4().to_string(), name.to_string(), Local::now());
        self.wallets.push(wallet.clone());
        self.save_wallets()?;

        info!("Created wallet '{}' ({})", wallet.name(), wallet.id());
        Ok(wallet)
    }

    pub fn rename_wallet(&mut self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyWalletName.into());
        }
        if id == SUMMARY_WALLET_ID {
            return Err(PortfolioError::SummaryWalletReadOnly.into());
        }

        let wallet = self
            .wallets
            .iter_mut()
            .find(|w| w.id() == id)
            .ok_or_else(|| PortfolioError::WalletNotFound(id.to_string()))?;
        wallet.rename(name);

        self.save_wallets()
    }

    /// Removes the wallet together with its holdings.
    pub fn delete_wallet(&mut self, id: &str) -> Result<()> {
        match id {
            SUMMARY_WALLET_ID => return Err(PortfolioError::SummaryWalletReadOnly.into()),
            DEFAULT_WALLET_ID => return Err(PortfolioError::DefaultWalletProtected.into()),
            _ => {}
        }
        self.require_wallet(id)?;

        self.wallets.retain(|w| w.id() != id);
        let before = self.holdings.len();
        self.holdings.retain(|h| h.wallet_id() != id);

        info!(
            "Deleted wallet {} and {} holding(s)",
            id,
            before - self.holdings.len()
        );

        self.save_wallets()?;
        self.save_holdings()
    }

    pub fn add_holding(
        &mut self,
        wallet_id: &str,
        fund: &Fund,
        amount: Decimal,
        profit: Decimal,
    ) -> Result<()> {
        self.require_writable_wallet(wallet_id)?;
        validate_fund_code(fund.code())?;
        validate_holding_amounts(amount, profit)?;

        if self.find_holding(wallet_id, fund.code()).is_some() {
            return Err(PortfolioError::DuplicateHolding {
                code: fund.code().clone(),
                wallet_id: wallet_id.to_string(),
            }
            .into());
        }

        self.holdings.push(Holding::new(
            fund.code().clone(),
            fund.name().clone(),
            amount,
            profit,
            fund.fund_type().clone(),
            fund.industry_info().clone(),
            wallet_id.to_string(),
        ));

        self.save_holdings()
    }

    /// Adds every successful batch result. Returns how many were added.
    pub fn add_batch(&mut self, wallet_id: &str, results: &[BatchAddResult]) -> Result<usize> {
        self.require_writable_wallet(wallet_id)?;

        let mut added = 0;
        for result in results {
            let Ok(fund) = result.outcome() else {
                continue;
            };
            let item = result.item();
            if validate_holding_amounts(*item.holding_amount(), *item.holding_profit()).is_err() {
                continue;
            }
            if self.find_holding(wallet_id, fund.code()).is_some() {
                continue;
            }
            self.holdings.push(Holding::new(
                fund.code().clone(),
                fund.name().clone(),
                *item.holding_amount(),
                *item.holding_profit(),
                fund.fund_type().clone(),
                fund.industry_info().clone(),
                wallet_id.to_string(),
            ));
            added += 1;
        }

        if added > 0 {
            self.save_holdings()?;
        }
        Ok(added)
    }

    pub fn edit_holding(
        &mut self,
        wallet_id: &str,
        code: &str,
        amount: Decimal,
        profit: Decimal,
    ) -> Result<()> {
        self.require_writable_wallet(wallet_id)?;
        validate_fund_code(code)?;
        validate_holding_amounts(amount, profit)?;

        let holding = self
            .holdings
            .iter_mut()
            .find(|h| h.wallet_id() == wallet_id && h.code() == code)
            .ok_or_else(|| PortfolioError::HoldingNotFound {
                code: code.to_string(),
                wallet_id: wallet_id.to_string(),
            })?;
        holding.set_amounts(amount, profit);

        self.save_holdings()
    }

    pub fn delete_holding(&mut self, wallet_id: &str, code: &str) -> Result<()> {
        self.require_writable_wallet(wallet_id)?;
        if self.find_holding(wallet_id, code).is_none() {
            return Err(PortfolioError::HoldingNotFound {
                code: code.to_string(),
                wallet_id: wallet_id.to_string(),
            }
            .into());
        }
        self.batch_delete(wallet_id, &[code.to_string()])?;
        Ok(())
    }

    /// Drops every listed code from the wallet. Returns how many were removed.
    pub fn batch_delete(&mut self, wallet_id: &str, codes: &[String]) -> Result<usize> {
        self.require_writable_wallet(wallet_id)?;

        let before = self.holdings.len();
        self.holdings
            .retain(|h| h.wallet_id() != wallet_id || !codes.contains(h.code()));
        let removed = before - self.holdings.len();

        if removed > 0 {
            self.save_holdings()?;
        }
        Ok(removed)
    }

    pub fn holdings_for(&self, wallet_id: &str) -> Vec<Holding> {
        if wallet_id == SUMMARY_WALLET_ID {
            return aggregate_by_code(&self.holdings, SUMMARY_WALLET_ID);
        }
        self.holdings
            .iter()
            .filter(|h| h.wallet_id() == wallet_id)
            .cloned()
            .collect()
    }

    pub fn summary_for(&self, wallet_id: &str) -> WalletSummary {
        summarize(wallet_id, &self.holdings_for(wallet_id))
    }

    pub fn industry_breakdown(&self, wallet_id: &str) -> Vec<IndustryShare> {
        industry_breakdown(&self.holdings_for(wallet_id))
    }

    pub fn holds(&self, wallet_id: &str, code: &str) -> bool {
        self.find_holding(wallet_id, code).is_some()
    }

    pub async fn flush(&self) {
        self.store.flush().await;
    }

    fn find_holding(&self, wallet_id: &str, code: &str) -> Option<&Holding> {
        self.holdings
            .iter()
            .find(|h| h.wallet_id() == wallet_id && h.code() == code)
    }

    fn require_wallet(&self, id: &str) -> Result<(), PortfolioError> {
        self.wallet(id)
            .map(|_| ())
            .ok_or_else(|| PortfolioError::WalletNotFound(id.to_string()))
    }

    fn require_writable_wallet(&self, id: &str) -> Result<(), PortfolioError> {
        if id == SUMMARY_WALLET_ID {
            return Err(PortfolioError::SummaryWalletReadOnly);
        }
        self.require_wallet(id)
    }

    fn save_wallets(&self) -> Result<()> {
        self.store.save_debounced(WALLETS, &self.wallets)
    }

    fn save_holdings(&self) -> Result<()> {
        self.store.save_debounced(USER_HOLDINGS, &self.holdings)
    }
}
