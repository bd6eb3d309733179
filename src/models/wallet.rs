use chrono::{DateTime, Local};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

pub const SUMMARY_WALLET_ID: &str = "summary";
pub const SUMMARY_WALLET_NAME: &str = "Summary";
pub const DEFAULT_WALLET_ID: &str = "default";
pub const DEFAULT_WALLET_NAME: &str = "Default";

#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    id: String,
    name: String,
    created_at: DateTime<Local>,
}

impl Wallet {
    pub fn summary() -> Self {
        Self::new(
            SUMMARY_WALLET_ID.to_string(),
            SUMMARY_WALLET_NAME.to_string(),
            Local::now(),
        )
    }

    pub fn default_wallet() -> Self {
        Self::new(
            DEFAULT_WALLET_ID.to_string(),
            DEFAULT_WALLET_NAME.to_string(),
            Local::now(),
        )
    }

    pub fn is_summary(&self) -> bool {
        self.id == SUMMARY_WALLET_ID
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }
}
