pub mod batch;
pub mod fund_service;

pub use fund_service::{FundLookup, FundService, MarketSource, ValuationSource};
