use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::{ColorScheme, SortField, TimeRange};

pub const DATABASE_FILE_NAME: &str = "fund-tracker.db";

#[derive(Debug, Parser)]
#[command(name = "fund-tracker", version, about = "Track fund valuations, wallets and market data")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Directory holding the database and logs
    #[arg(long, env = "FUND_TRACKER_HOME", default_value = "~/.fund-tracker", global = true)]
    pub home: String,

    /// Seconds between automatic refreshes during trading hours
    #[arg(long, env = "FUND_TRACKER_REFRESH_SECS", default_value_t = 300, global = true)]
    pub refresh_secs: u64,

    /// First hour (local time) of the trading window
    #[arg(long, env = "FUND_TRACKER_TRADING_START", default_value_t = 10, global = true)]
    pub trading_start: u32,

    /// Hour (local time) at which the trading window closes
    #[arg(long, env = "FUND_TRACKER_TRADING_END", default_value_t = 15, global = true)]
    pub trading_end: u32,

    /// HTTP request timeout in seconds
    #[arg(long, env = "FUND_TRACKER_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn home_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.home).into_owned())
    }

    pub fn database_path(&self) -> PathBuf {
        self.home_dir().join(DATABASE_FILE_NAME)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive dashboard (default)
    Tui,
    /// Manage tracked funds
    #[command(subcommand)]
    Track(TrackCommand),
    /// Manage wallets
    #[command(subcommand)]
    Wallet(WalletCommand),
    /// Manage holdings
    #[command(subcommand)]
    Holding(HoldingCommand),
    /// Show fund details and net value history
    Fund {
        code: String,
        #[arg(long, value_enum, default_value_t = TimeRange::OneMonth)]
        range: TimeRange,
    },
    /// Show precious metal prices
    Metals,
    /// Show market indices and the M1 cumulative change
    Market,
    /// Manage macro-economic data
    #[command(subcommand)]
    Macro(MacroCommand),
    /// Show or change display settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum TrackCommand {
    /// Track one or more comma separated fund codes
    Add { codes: String },
    Remove { code: String },
    List {
        #[arg(long, value_enum, default_value_t = SortField::ChangeRate)]
        sort: SortField,
        #[arg(long)]
        asc: bool,
        #[arg(long)]
        filter: Option<String>,
    },
    Refresh,
    /// Poll valuations during trading hours until interrupted
    Watch,
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    List,
    Create { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum HoldingCommand {
    List {
        #[arg(long, default_value = "summary")]
        wallet: String,
    },
    Add {
        code: String,
        amount: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        profit: String,
        #[arg(long, default_value = "default")]
        wallet: String,
    },
    Edit {
        code: String,
        amount: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        profit: String,
        #[arg(long, default_value = "default")]
        wallet: String,
    },
    Remove {
        #[arg(required = true)]
        codes: Vec<String>,
        #[arg(long, default_value = "default")]
        wallet: String,
    },
    /// Import holdings from a `code,amount[,profit]` CSV file
    Import {
        path: String,
        #[arg(long, default_value = "default")]
        wallet: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum MacroCommand {
    /// Import monthly rows from CSV
    Import { path: String },
    Show {
        #[arg(long, default_value_t = 24)]
        months: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long, value_enum)]
        color_scheme: Option<ColorScheme>,
        #[arg(long)]
        metal_per_row: Option<u8>,
        #[arg(long)]
        market_per_row: Option<u8>,
    },
}
