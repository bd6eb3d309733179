use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use fund_tracker_tui::{
    app::{App, commands, schedule::RefreshSchedule},
    config::{Cli, Command},
    db::Store,
    logging::setup_logging,
    services::FundService,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config;

    let home = config.home_dir();
    let _guard = setup_logging(&home)?;

    let store = Store::connect(&config.database_path()).await?;
    let service = FundService::new(Duration::from_secs(config.timeout_secs))?;
    let schedule = RefreshSchedule::from_config(&config);

    info!("Using data directory {}", home.display());

    let result = match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let mut app = App::load(store.clone(), service, schedule).await?;
            app.run().await
        }
        Command::Track(cmd) => commands::track(cmd, &store, &service, schedule).await,
        Command::Wallet(cmd) => commands::wallet(cmd, &store).await,
        Command::Holding(cmd) => commands::holding(cmd, &store, &service).await,
        Command::Fund { code, range } => commands::fund(&code, range, &service).await,
        Command::Metals => commands::metals(&store, &service).await,
        Command::Market => commands::market(&store, &service).await,
        Command::Macro(cmd) => commands::macro_data(cmd, &store).await,
        Command::Settings(cmd) => commands::settings(cmd, &store).await,
    };

    store.flush().await;
    result
}
