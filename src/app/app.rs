use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    widgets::TableState,
};
use rust_decimal::Decimal;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{error, info};

use crate::{
    app::{
        FundTracker, Markets, Portfolio,
        markets::DEFAULT_MACRO_MONTHS,
        schedule::RefreshSchedule,
        settings::{load_settings, save_settings},
        ui,
        utils::{parse_amount, validate_fund_code},
    },
    db::Store,
    errors::PortfolioError,
    models::{
        FundSort, FundValuation, Holding, MacroCumulative, MarketIndex, MetalBoard, PricePoint,
        SUMMARY_WALLET_ID, Settings, SortField, Wallet, metal::SERIES_GOLD_BAR,
    },
    services::FundService,
};

const TICK: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, Default, Display, EnumIter, PartialEq)]
pub enum Tab {
    #[default]
    Tracker,
    Holdings,
    Metals,
    Market,
    Settings,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PromptKind {
    TrackCodes,
    Filter,
    AddHolding,
    EditHolding(String),
    NewWallet,
    RenameWallet(String),
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            PromptKind::TrackCodes => "Track fund codes (comma separated)".to_string(),
            PromptKind::Filter => "Filter by name or code".to_string(),
            PromptKind::AddHolding => "Add holding: code amount [profit]".to_string(),
            PromptKind::EditHolding(code) => format!("Edit {}: amount profit", code),
            PromptKind::NewWallet => "New wallet name".to_string(),
            PromptKind::RenameWallet(_) => "Rename wallet".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

pub struct App {
    store: Store,
    service: FundService,
    pub(crate) tracker: FundTracker,
    pub(crate) portfolio: Portfolio,
    markets: Markets,
    pub(crate) settings: Settings,
    pub(crate) schedule: RefreshSchedule,
    pub(crate) tab: Tab,
    pub(crate) sort: FundSort,
    pub(crate) filter: String,
    pub(crate) wallet_index: usize,
    pub(crate) tracker_state: TableState,
    pub(crate) holdings_state: TableState,
    pub(crate) metals: Option<MetalBoard>,
    pub(crate) gold_history: Vec<PricePoint>,
    pub(crate) indices: Vec<MarketIndex>,
    pub(crate) cumulative: Vec<MacroCumulative>,
    pub(crate) prompt: Option<Prompt>,
    pub(crate) popup_message: Option<String>,
    pub(crate) error_popup: Option<String>,
    pub(crate) status: Option<String>,
}

impl App {
    pub async fn load(store: Store, service: FundService, schedule: RefreshSchedule) -> Result<Self> {
        let tracker = FundTracker::load(store.clone()).await;
        let portfolio = Portfolio::load(store.clone()).await?;
        let markets = Markets::new(store.clone());
        let settings = load_settings(&store).await;

        let metals = markets.cached_metals().await;
        let gold_history = markets.metal_history(SERIES_GOLD_BAR).await;
        let indices = markets.cached_indices().await;
        let cumulative = markets.macro_cumulative(DEFAULT_MACRO_MONTHS).await;

        Ok(Self {
            store,
            service,
            tracker,
            portfolio,
            markets,
            settings,
            schedule,
            tab: Tab::default(),
            sort: FundSort::default(),
            filter: String::new(),
            wallet_index: 0,
            tracker_state: TableState::default(),
            holdings_state: TableState::default(),
            metals,
            gold_history,
            indices,
            cumulative,
            prompt: None,
            popup_message: None,
            error_popup: None,
            status: None,
        })
    }

    fn show_popup(&mut self, message: &str) {
        self.popup_message = Some(message.to_string());
    }

    fn clear_popup(&mut self) {
        self.popup_message = None;
    }

    fn show_error_popup(&mut self, message: &str) {
        self.error_popup = Some(message.to_string());
    }

    fn clear_error_popup(&mut self) {
        self.error_popup = None;
    }

    pub(crate) fn tracked_view(&self) -> Vec<FundValuation> {
        self.tracker.view(self.sort, &self.filter)
    }

    pub(crate) fn current_wallet(&self) -> Wallet {
        let wallets = self.portfolio.wallets();
        let idx = self.wallet_index.min(wallets.len().saturating_sub(1));
        wallets
            .get(idx)
            .cloned()
            .unwrap_or_else(Wallet::summary)
    }

    pub(crate) fn current_holdings(&self) -> Vec<Holding> {
        self.portfolio.holdings_for(self.current_wallet().id())
    }

    pub(crate) fn auto_refresh_active(&self) -> bool {
        self.schedule
            .auto_refresh_active(self.tracker.funds().len(), &Local::now())
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal).await;

        self.store.flush().await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|frame| ui::render(frame, self))?;
        Ok(())
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if !self.tracker.funds().is_empty() {
            self.refresh_tracked(terminal).await?;
        }

        loop {
            self.draw(terminal)?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key, terminal).await? {
                        return Ok(());
                    }
                }
            }

            if self.schedule.is_due(Instant::now(), &Local::now())
                && !self.tracker.funds().is_empty()
            {
                info!("Auto refresh of tracked funds");
                self.refresh_tracked(terminal).await?;
            }
        }
    }

    /// Returns `true` when the app should quit.
    async fn handle_key<B: Backend>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
    ) -> Result<bool> {
        if self.error_popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.clear_error_popup();
            }
            return Ok(false);
        }

        if self.prompt.is_some() {
            self.handle_prompt_key(key, terminal).await?;
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Esc => {
                self.status = None;
                self.tracker_state.select(None);
                self.holdings_state.select(None);
            }
            KeyCode::Tab => self.select_tab(self.tab_index() + 1),
            KeyCode::BackTab => self.select_tab(self.tab_index() + Tab::iter().len() - 1),
            KeyCode::Char(c @ '1'..='5') => {
                self.select_tab(c as usize - '1' as usize);
            }
            KeyCode::Down => self.move_selection(1),
            KeyCode::Up => self.move_selection(-1),
            _ => match self.tab {
                Tab::Tracker => self.handle_tracker_key(key, terminal).await?,
                Tab::Holdings => self.handle_holdings_key(key)?,
                Tab::Metals => self.handle_metals_key(key, terminal).await?,
                Tab::Market => self.handle_market_key(key, terminal).await?,
                Tab::Settings => self.handle_settings_key(key)?,
            },
        }

        Ok(false)
    }

    fn tab_index(&self) -> usize {
        Tab::iter().position(|t| t == self.tab).unwrap_or(0)
    }

    fn select_tab(&mut self, index: usize) {
        let count = Tab::iter().len();
        self.tab = Tab::iter().nth(index % count).unwrap_or_default();
    }

    fn move_selection(&mut self, step: isize) {
        let (len, state) = match self.tab {
            Tab::Tracker => (self.tracked_view().len(), &mut self.tracker_state),
            Tab::Holdings => (self.current_holdings().len(), &mut self.holdings_state),
            _ => return,
        };
        if len == 0 {
            return;
        }

        let i = match state.selected() {
            Some(i) if step > 0 => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        state.select(Some(i));
    }

    fn open_prompt(&mut self, kind: PromptKind, input: String) {
        self.prompt = Some(Prompt { kind, input });
    }

    async fn handle_prompt_key<B: Backend>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };

        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(c) => prompt.input.push(c),
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    if let Err(e) = self.submit_prompt(prompt, terminal).await {
                        error!("{:?}", e);
                        self.show_error_popup(&format!("{:#}", e));
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    async fn submit_prompt<B: Backend>(
        &mut self,
        prompt: Prompt,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        let input = prompt.input.trim().to_string();

        match prompt.kind {
            PromptKind::TrackCodes => {
                self.show_popup("Fetching valuations...");
                self.draw(terminal)?;
                let result = self.tracker.add_codes(&self.service, &input).await;
                self.clear_popup();
                let outcome = result?;
                self.status = Some(if outcome.failed.is_empty() {
                    format!("Added {} fund(s)", outcome.added.len())
                } else {
                    format!(
                        "Added {} fund(s), failed: {}",
                        outcome.added.len(),
                        outcome.failed.join(", ")
                    )
                });
            }
            PromptKind::Filter => {
                self.filter = input;
                self.tracker_state.select(None);
            }
            PromptKind::AddHolding => {
                let wallet = self.current_wallet();
                self.show_popup("Looking up fund...");
                self.draw(terminal)?;
                let result = self.add_holding_from_input(wallet.id(), &input).await;
                self.clear_popup();
                result?;
            }
            PromptKind::EditHolding(code) => {
                let wallet = self.current_wallet();
                let (amount, profit) = parse_amount_pair(&input)?;
                self.portfolio
                    .edit_holding(wallet.id(), &code, amount, profit)?;
                self.status = Some(format!("Updated {}", code));
            }
            PromptKind::NewWallet => {
                let wallet = self.portfolio.create_wallet(&input)?;
                self.wallet_index = self
                    .portfolio
                    .wallets()
                    .iter()
                    .position(|w| w.id() == wallet.id())
                    .unwrap_or(0);
                self.holdings_state.select(None);
            }
            PromptKind::RenameWallet(id) => {
                self.portfolio.rename_wallet(&id, &input)?;
            }
        }

        Ok(())
    }

    async fn add_holding_from_input(&mut self, wallet_id: &str, input: &str) -> Result<()> {
        let mut parts = input.split_whitespace();
        let code = parts.next().unwrap_or_default().to_string();
        validate_fund_code(&code)?;
        let amount = parse_amount(parts.next().unwrap_or("0"))?;
        let profit = parse_amount(parts.next().unwrap_or("0"))?;

        if self.portfolio.holds(wallet_id, &code) {
            return Err(PortfolioError::DuplicateHolding {
                code,
                wallet_id: wallet_id.to_string(),
            }
            .into());
        }

        let fund = self
            .service
            .search(&code)
            .await?
            .ok_or_else(|| PortfolioError::FundNotFound(code.clone()))?;

        self.portfolio.add_holding(wallet_id, &fund, amount, profit)?;
        self.status = Some(format!("Added {} {}", fund.code(), fund.name()));
        Ok(())
    }

    async fn refresh_tracked<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.show_popup("Updating valuations...");
        self.draw(terminal)?;

        let result = self.tracker.refresh(&self.service).await;
        self.schedule.mark_refreshed(Instant::now());

        self.clear_popup();
        match result {
            Ok(0) => self.status = None,
            Ok(failures) => {
                self.status = Some(format!("{} fund(s) kept their previous valuation", failures))
            }
            Err(e) => self.show_error_popup(&format!("Error updating valuations: {:#}", e)),
        }
        Ok(())
    }

    async fn handle_tracker_key<B: Backend>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        match key.code {
            KeyCode::Char('a') => self.open_prompt(PromptKind::TrackCodes, String::new()),
            KeyCode::Char('/') => self.open_prompt(PromptKind::Filter, self.filter.clone()),
            KeyCode::Char('r') | KeyCode::F(5) => self.refresh_tracked(terminal).await?,
            KeyCode::Char('s') => {
                let fields: Vec<SortField> = SortField::iter().collect();
                let pos = fields.iter().position(|f| *f == self.sort.field).unwrap_or(0);
                self.sort.toggle(fields[(pos + 1) % fields.len()]);
            }
            KeyCode::Char('o') => self.sort.toggle(self.sort.field),
            KeyCode::Char('d') => self.remove_selected_fund().await,
            _ => {}
        }
        Ok(())
    }

    /// Stops tracking the selected fund. Store errors end up in the error popup.
    pub(crate) async fn remove_selected_fund(&mut self) {
        let view = self.tracked_view();
        let Some(code) = self
            .tracker_state
            .selected()
            .and_then(|i| view.get(i))
            .map(|f| f.code().clone())
        else {
            return;
        };

        match self.tracker.remove(&code).await {
            Ok(_) => {
                self.tracker_state.select(None);
                self.status = Some(format!("Stopped tracking {}", code));
            }
            Err(e) => {
                error!("{:?}", e);
                self.show_error_popup(&format!("Error removing {}: {:#}", code, e));
            }
        }
    }

    fn handle_holdings_key(&mut self, key: KeyEvent) -> Result<()> {
        let wallet_count = self.portfolio.wallets().len();
        let wallet = self.current_wallet();

        let result = match key.code {
            KeyCode::Char(']') => {
                self.wallet_index = (self.wallet_index + 1) % wallet_count;
                self.holdings_state.select(None);
                Ok(())
            }
            KeyCode::Char('[') => {
                self.wallet_index = (self.wallet_index + wallet_count - 1) % wallet_count;
                self.holdings_state.select(None);
                Ok(())
            }
            KeyCode::Char('w') => {
                self.open_prompt(PromptKind::NewWallet, String::new());
                Ok(())
            }
            KeyCode::Char('a') => self.writable(&wallet).map(|_| {
                self.open_prompt(PromptKind::AddHolding, String::new());
            }),
            KeyCode::Char('n') => self.writable(&wallet).map(|_| {
                self.open_prompt(PromptKind::RenameWallet(wallet.id().clone()), wallet.name().clone());
            }),
            KeyCode::Char('x') => self.portfolio.delete_wallet(wallet.id()).map(|_| {
                self.wallet_index = 0;
                self.holdings_state.select(None);
            }),
            KeyCode::Char('e') => match self.selected_holding() {
                Some(h) => self.writable(&wallet).map(|_| {
                    let input = format!("{} {}", h.holding_amount(), h.holding_profit());
                    self.open_prompt(PromptKind::EditHolding(h.code().clone()), input);
                }),
                None => Ok(()),
            },
            KeyCode::Char('d') => match self.selected_holding() {
                Some(h) => self.portfolio.delete_holding(wallet.id(), h.code()).map(|_| {
                    self.holdings_state.select(None);
                }),
                None => Ok(()),
            },
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.show_error_popup(&format!("{:#}", e));
        }
        Ok(())
    }

    fn writable(&self, wallet: &Wallet) -> Result<()> {
        if wallet.id() == SUMMARY_WALLET_ID {
            return Err(PortfolioError::SummaryWalletReadOnly.into());
        }
        Ok(())
    }

    fn selected_holding(&self) -> Option<Holding> {
        let holdings = self.current_holdings();
        self.holdings_state
            .selected()
            .and_then(|i| holdings.get(i).cloned())
    }

    async fn handle_metals_key<B: Backend>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        if matches!(key.code, KeyCode::Char('r') | KeyCode::F(5)) {
            self.show_popup("Updating precious metal prices...");
            self.draw(terminal)?;
            let result = self.markets.refresh_metals(&self.service).await;
            self.clear_popup();

            match result {
                Ok(board) => {
                    self.metals = Some(board);
                    self.gold_history = self.markets.metal_history(SERIES_GOLD_BAR).await;
                }
                Err(e) => self.show_error_popup(&format!("Error updating metals: {:#}", e)),
            }
        }
        Ok(())
    }

    async fn handle_market_key<B: Backend>(
        &mut self,
        key: KeyEvent,
        terminal: &mut Terminal<B>,
    ) -> Result<()> {
        if matches!(key.code, KeyCode::Char('r') | KeyCode::F(5)) {
            self.show_popup("Updating market indices...");
            self.draw(terminal)?;
            let result = self.markets.refresh_indices(&self.service).await;
            self.cumulative = self.markets.macro_cumulative(DEFAULT_MACRO_MONTHS).await;
            self.clear_popup();

            match result {
                Ok(indices) => self.indices = indices,
                Err(e) => self.show_error_popup(&format!("Error updating indices: {:#}", e)),
            }
        }
        Ok(())
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<()> {
        let metal = *self.settings.metal_items_per_row();
        let market = *self.settings.market_items_per_row();

        match key.code {
            KeyCode::Char('c') => {
                let scheme = self.settings.color_scheme().toggled();
                self.settings.set_color_scheme(scheme);
            }
            KeyCode::Char('+') => self.settings.set_metal_items_per_row(metal.saturating_add(1)),
            KeyCode::Char('-') => self.settings.set_metal_items_per_row(metal.saturating_sub(1)),
            KeyCode::Char('>') => self.settings.set_market_items_per_row(market.saturating_add(1)),
            KeyCode::Char('<') => self.settings.set_market_items_per_row(market.saturating_sub(1)),
            _ => return Ok(()),
        }

        save_settings(&self.store, &self.settings).with_context(|| "Failed to save settings")
    }
}

fn parse_amount_pair(input: &str) -> Result<(Decimal, Decimal)> {
    let mut parts = input.split_whitespace();
    let amount = parse_amount(parts.next().unwrap_or("0"))?;
    let profit = parse_amount(parts.next().unwrap_or("0"))?;
    Ok((amount, profit))
}
