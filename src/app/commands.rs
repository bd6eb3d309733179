use std::time::Instant;

use anyhow::{Error, Result};
use chrono::Local;
use rust_decimal::Decimal;
use tokio_stream::{StreamExt, wrappers::IntervalStream};
use tracing::info;

use crate::{
    app::{
        FundTracker, Markets, Portfolio,
        calc::history_change_rate,
        markets::DEFAULT_MACRO_MONTHS,
        schedule::{CHECK_INTERVAL, RefreshSchedule},
        settings::{apply_settings, load_settings, save_settings},
        utils::{
            format_amount, format_nav, format_optional, format_percentage, parse_amount,
            validate_fund_code,
        },
    },
    config::{HoldingCommand, MacroCommand, SettingsCommand, TrackCommand, WalletCommand},
    db::Store,
    errors::PortfolioError,
    models::{FundSort, FundValuation, SortOrder, TimeRange},
    services::{
        FundService,
        batch::{batch_add, read_batch_csv, validate_batch_items},
    },
};

pub async fn track(
    command: TrackCommand,
    store: &Store,
    service: &FundService,
    schedule: RefreshSchedule,
) -> Result<()> {
    let mut tracker = FundTracker::load(store.clone()).await;

    match command {
        TrackCommand::Add { codes } => {
            let outcome = tracker.add_codes(service, &codes).await?;
            println!("Added: {}", outcome.added.join(", "));
            if !outcome.failed.is_empty() {
                println!("Failed: {}", outcome.failed.join(", "));
            }
        }
        TrackCommand::Remove { code } => {
            if tracker.remove(&code).await? {
                println!("Stopped tracking {}", code);
            } else {
                println!("{} is not tracked", code);
            }
        }
        TrackCommand::List { sort, asc, filter } => {
            let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
            let funds = tracker.view(FundSort::new(sort, order), filter.as_deref().unwrap_or(""));
            print_valuations(&funds);
        }
        TrackCommand::Refresh => {
            let failures = tracker.refresh(service).await?;
            print_valuations(&tracker.sorted(FundSort::default()));
            if failures > 0 {
                println!("{} fund(s) kept their previous valuation", failures);
            }
        }
        TrackCommand::Watch => watch(&mut tracker, service, schedule).await?,
    }

    Ok(())
}

/// Re-checks the schedule every minute and refreshes when due.
async fn watch(
    tracker: &mut FundTracker,
    service: &FundService,
    mut schedule: RefreshSchedule,
) -> Result<()> {
    if tracker.funds().is_empty() {
        return Err(Error::msg("No tracked funds. Use `track add` first."));
    }

    println!(
        "Watching {} fund(s), refreshing every {}s during trading hours. Ctrl-C to stop.",
        tracker.funds().len(),
        schedule.interval().as_secs()
    );

    let mut ticks = IntervalStream::new(tokio::time::interval(CHECK_INTERVAL));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            tick = ticks.next() => {
                if tick.is_none() {
                    break;
                }
                if !schedule.is_due(Instant::now(), &Local::now()) {
                    continue;
                }
                let failures = tracker.refresh(service).await?;
                schedule.mark_refreshed(Instant::now());
                info!("Watch refresh finished with {} failure(s)", failures);
                println!("-- {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
                print_valuations(&tracker.sorted(FundSort::default()));
            }
        }
    }

    Ok(())
}

fn print_valuations(funds: &[FundValuation]) {
    if funds.is_empty() {
        println!("No tracked funds.");
        return;
    }
    println!(
        "{:<8} {:<28} {:>10} {:>10} {:>9}  {}",
        "Code", "Name", "Net Value", "Estimate", "Change", "Updated"
    );
    for f in funds {
        println!(
            "{:<8} {:<28} {:>10} {:>10} {:>9}  {}",
            f.code(),
            f.name(),
            format_nav(f.net_value()),
            format_nav(f.estimated_value()),
            format_percentage(f.change_rate()),
            f.update_time()
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

pub async fn wallet(command: WalletCommand, store: &Store) -> Result<()> {
    let mut portfolio = Portfolio::load(store.clone()).await?;

    match command {
        WalletCommand::List => {
            for w in portfolio.wallets() {
                let summary = portfolio.summary_for(w.id());
                println!(
                    "{:<38} {:<16} {:>3} holding(s)  amount {:>12}  profit {:>10}",
                    w.id(),
                    w.name(),
                    summary.holding_count(),
                    format_amount(summary.total_amount()),
                    format_amount(summary.total_profit())
                );
            }
        }
        WalletCommand::Create { name } => {
            let wallet = portfolio.create_wallet(&name)?;
            println!("Created wallet {} ({})", wallet.name(), wallet.id());
        }
        WalletCommand::Rename { id, name } => {
            portfolio.rename_wallet(&id, &name)?;
            println!("Renamed wallet {}", id);
        }
        WalletCommand::Delete { id } => {
            portfolio.delete_wallet(&id)?;
            println!("Deleted wallet {}", id);
        }
    }

    portfolio.flush().await;
    Ok(())
}

pub async fn holding(command: HoldingCommand, store: &Store, service: &FundService) -> Result<()> {
    let mut portfolio = Portfolio::load(store.clone()).await?;

    match command {
        HoldingCommand::List { wallet } => print_holdings(&portfolio, &wallet),
        HoldingCommand::Add {
            code,
            amount,
            profit,
            wallet,
        } => {
            validate_fund_code(&code)?;
            let amount = parse_amount(&amount)?;
            let profit = parse_amount(&profit)?;
            let fund = service
                .search(&code)
                .await?
                .ok_or_else(|| PortfolioError::FundNotFound(code.clone()))?;
            portfolio.add_holding(&wallet, &fund, amount, profit)?;
            println!("Added {} {} to {}", fund.code(), fund.name(), wallet);
        }
        HoldingCommand::Edit {
            code,
            amount,
            profit,
            wallet,
        } => {
            portfolio.edit_holding(&wallet, &code, parse_amount(&amount)?, parse_amount(&profit)?)?;
            println!("Updated {} in {}", code, wallet);
        }
        HoldingCommand::Remove { codes, wallet } => {
            let removed = portfolio.batch_delete(&wallet, &codes)?;
            println!("Removed {} holding(s) from {}", removed, wallet);
        }
        HoldingCommand::Import { path, wallet } => {
            let items = read_batch_csv(&shellexpand::tilde(&path))?;

            let mut errors = validate_batch_items(&items);
            for (idx, item) in items.iter().enumerate() {
                if portfolio.holds(&wallet, item.code()) {
                    errors.push(format!("Item {}: {} is already held", idx + 1, item.code()));
                }
            }
            if !errors.is_empty() {
                return Err(Error::msg(errors.join("\n")));
            }

            let results = batch_add(service, &items).await;
            let added = portfolio.add_batch(&wallet, &results)?;
            for r in results.iter().filter(|r| !r.is_success()) {
                if let Err(e) = r.outcome() {
                    println!("{}: {}", r.code(), e);
                }
            }
            println!("Imported {} of {} holding(s) into {}", added, items.len(), wallet);
        }
    }

    portfolio.flush().await;
    Ok(())
}

fn print_holdings(portfolio: &Portfolio, wallet_id: &str) {
    let holdings = portfolio.holdings_for(wallet_id);
    if holdings.is_empty() {
        println!("No holdings in {}", wallet_id);
        return;
    }

    println!(
        "{:<8} {:<28} {:>12} {:>10} {:>9}  {}",
        "Code", "Name", "Amount", "Profit", "Rate", "Industry"
    );
    for h in &holdings {
        println!(
            "{:<8} {:<28} {:>12} {:>10} {:>9}  {}",
            h.code(),
            h.fund_name(),
            format_amount(h.holding_amount()),
            format_amount(h.holding_profit()),
            format_percentage(&h.profit_rate()),
            h.industry_info()
        );
    }

    let summary = portfolio.summary_for(wallet_id);
    println!(
        "Total: {} holding(s), amount {}, profit {} ({})",
        summary.holding_count(),
        format_amount(summary.total_amount()),
        format_amount(summary.total_profit()),
        format_percentage(summary.profit_rate())
    );
    for share in portfolio.industry_breakdown(wallet_id) {
        println!(
            "  {:<16} {:>6}%  ({})",
            share.industry(),
            share.proportion(),
            share.count()
        );
    }
}

pub async fn fund(code: &str, range: TimeRange, service: &FundService) -> Result<()> {
    validate_fund_code(code)?;
    let fund = service
        .search(code)
        .await?
        .ok_or_else(|| PortfolioError::FundNotFound(code.to_string()))?;

    println!("{} {}", fund.code(), fund.name());
    println!("Type:     {}", fund.fund_type());
    println!("Company:  {}", fund.company().as_deref().unwrap_or("-"));
    println!("Manager:  {}", fund.manager().as_deref().unwrap_or("-"));
    println!(
        "NAV:      {} ({})",
        format_optional(fund.latest_nav()),
        fund.nav_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Industry: {}", fund.industry_info());

    let history = service.get_fund_history(code, range.days()).await?;
    let values: Vec<Decimal> = history.iter().map(|p| *p.value()).collect();
    println!(
        "{} history: {} point(s), change {}",
        range,
        history.len(),
        format_percentage(&history_change_rate(&values))
    );
    for point in &history {
        println!("  {}  {}", point.date(), format_nav(point.value()));
    }

    Ok(())
}

pub async fn metals(store: &Store, service: &FundService) -> Result<()> {
    let markets = Markets::new(store.clone());
    let board = markets.refresh_metals(service).await?;

    if *board.stale() {
        println!("(cached, synced {})", board.synced_at().format("%Y-%m-%d %H:%M"));
    }
    println!("Bank gold bars:");
    for b in board.bank_gold_bars() {
        println!("  {:<24} {:>10}", b.bank(), format_optional(b.price()));
    }
    println!("Recycle prices:");
    for r in board.recycle_prices() {
        println!(
            "  {:<24} {:>10}  {}",
            r.gold_type(),
            format_optional(r.recycle_price()),
            r.updated_date()
        );
    }
    println!("Brand prices (bullion / gold / platinum):");
    for p in board.brand_prices() {
        println!(
            "  {:<24} {:>10} {:>10} {:>10}  {}",
            p.brand(),
            format_optional(p.bullion_price()),
            format_optional(p.gold_price()),
            format_optional(p.platinum_price()),
            p.updated_date()
        );
    }

    Ok(())
}

pub async fn market(store: &Store, service: &FundService) -> Result<()> {
    let markets = Markets::new(store.clone());
    for index in markets.refresh_indices(service).await? {
        println!(
            "{:<8} {:<12} {:>10} {:>9}",
            index.code(),
            index.name(),
            format_optional(index.value()),
            index
                .change_rate()
                .as_ref()
                .map(format_percentage)
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let cumulative = markets.macro_cumulative(DEFAULT_MACRO_MONTHS).await;
    if let Some(latest) = cumulative.last() {
        println!(
            "M1 cumulative change since window start: {} (as of {})",
            format_percentage(latest.cumulative_change()),
            latest.date()
        );
    }

    Ok(())
}

pub async fn macro_data(command: MacroCommand, store: &Store) -> Result<()> {
    let markets = Markets::new(store.clone());

    match command {
        MacroCommand::Import { path } => {
            let count = markets.import_macro_csv(&shellexpand::tilde(&path)).await?;
            println!("Imported {} row(s)", count);
        }
        MacroCommand::Show { months } => {
            let rows = markets.macro_window(months).await;
            if rows.is_empty() {
                println!("No macro-economic data. Use `macro import` first.");
                return Ok(());
            }
            let cumulative = markets.macro_cumulative(months).await;
            println!(
                "{:<10} {:>12} {:>8} {:>12} {:>8} {:>12} {:>8} {:>8} {:>9}",
                "Date", "M1", "M1 %", "M2", "M2 %", "GDP", "GDP %", "Buffett", "M1 cum."
            );
            for (row, cum) in rows.iter().zip(cumulative.iter()) {
                println!(
                    "{:<10} {:>12} {:>8} {:>12} {:>8} {:>12} {:>8} {:>8} {:>9}",
                    row.date().to_string(),
                    row.m1(),
                    row.m1_change_rate(),
                    row.m2(),
                    row.m2_change_rate(),
                    row.gdp(),
                    row.gdp_change_rate(),
                    row.buffett_indicator(),
                    format_percentage(cum.cumulative_change())
                );
            }
        }
    }

    Ok(())
}

pub async fn settings(command: SettingsCommand, store: &Store) -> Result<()> {
    let mut settings = load_settings(store).await;

    if let SettingsCommand::Set {
        color_scheme,
        metal_per_row,
        market_per_row,
    } = command
    {
        apply_settings(&mut settings, color_scheme, metal_per_row, market_per_row);
        save_settings(store, &settings)?;
        store.flush().await;
    }

    println!("Color scheme:          {}", settings.color_scheme());
    println!("Metal cards per row:   {}", settings.metal_items_per_row());
    println!("Market cards per row:  {}", settings.market_items_per_row());

    Ok(())
}
