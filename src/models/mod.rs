pub mod fund;
pub mod history;
pub mod holding;
pub mod market;
pub mod metal;
pub mod settings;
pub mod sort;
pub mod valuation;
pub mod wallet;
pub mod wallet_summary;

pub use fund::Fund;
pub use history::{FundHistoryPoint, TimeRange};
pub use holding::Holding;
pub use market::{MacroCumulative, MacroEconomicData, MarketIndex};
pub use metal::{BankGoldBar, BrandPrice, GoldRecyclePrice, MetalBoard, PricePoint};
pub use settings::{ColorScheme, Settings};
pub use sort::{FundSort, SortField, SortOrder};
pub use valuation::FundValuation;
pub use wallet::{DEFAULT_WALLET_ID, SUMMARY_WALLET_ID, Wallet};
pub use wallet_summary::{IndustryShare, WalletSummary};
