//! Error types for fund-tracker-tui
//!
//! Domain errors surface directly in the dashboard popups and on the command
//! line, so their messages are written for the user.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors for user supplied fund codes and amounts.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid fund code format: '{0}' (expected 6 digits)")]
    InvalidFundCode(String),

    #[error("Holding amount cannot be negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("Holding amount cannot exceed {max}, got {amount}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("Holding profit cannot exceed {max} in either direction, got {profit}")]
    ProfitOutOfRange { profit: Decimal, max: Decimal },

    #[error("Invalid number format: '{0}'")]
    InvalidNumber(String),

    #[error("Wallet name cannot be empty")]
    EmptyWalletName,

    #[error("Enter valid 6-digit fund codes")]
    NoValidCodes,

    #[error("All codes are already tracked")]
    AllCodesTracked,
}

/// Errors raised by wallet and holding bookkeeping.
#[derive(Debug, Error, PartialEq)]
pub enum PortfolioError {
    #[error("Wallet '{0}' not found")]
    WalletNotFound(String),

    #[error("The summary wallet is read-only")]
    SummaryWalletReadOnly,

    #[error("The default wallet cannot be deleted")]
    DefaultWalletProtected,

    #[error("Fund {code} is already held in wallet '{wallet_id}'")]
    DuplicateHolding { code: String, wallet_id: String },

    #[error("Fund {code} is not held in wallet '{wallet_id}'")]
    HoldingNotFound { code: String, wallet_id: String },

    #[error("Fund {0} not found")]
    FundNotFound(String),
}
