use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table, Tabs, Wrap},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use strum::IntoEnumIterator;

use crate::{
    app::{
        App,
        app::Tab,
        calc::history_change_rate,
        utils::{format_amount, format_nav, format_optional, format_percentage},
    },
    models::ColorScheme,
};

/// Color for a signed change under the configured scheme.
pub fn change_color(value: &Decimal, scheme: ColorScheme) -> Color {
    let (gain, loss) = match scheme {
        ColorScheme::RedUp => (Color::Red, Color::Green),
        ColorScheme::RedDown => (Color::Green, Color::Red),
    };
    if *value > Decimal::ZERO {
        gain
    } else if *value < Decimal::ZERO {
        loss
    } else {
        Color::Gray
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.tab {
        Tab::Tracker => render_tracker(frame, app, chunks[1]),
        Tab::Holdings => render_holdings(frame, app, chunks[1]),
        Tab::Metals => render_metals(frame, app, chunks[1]),
        Tab::Market => render_market(frame, app, chunks[1]),
        Tab::Settings => render_settings(frame, app, chunks[1]),
    }

    render_help(frame, app, chunks[2]);

    if let Some(prompt) = &app.prompt {
        let area = centered_rect(60, 3, frame.area());
        let input = Paragraph::new(format!("{}_", prompt.input)).block(
            Block::default()
                .title(prompt.kind.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(input, area);
    }

    if let Some(message) = &app.popup_message {
        let area = centered_rect(40, 3, frame.area());
        let popup = Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }

    if let Some(message) = &app.error_popup {
        let area = centered_rect(60, 6, frame.area());
        let popup = Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("Error (Enter to close)")
                    .borders(Borders::ALL),
            );
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<String> = Tab::iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t))
        .collect();
    let selected = Tab::iter().position(|t| t == app.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(
            Block::default()
                .title("Fund Tracker")
                .borders(Borders::ALL),
        );

    frame.render_widget(tabs, area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let keys = match app.tab {
        Tab::Tracker => "a add  d remove  r refresh  s sort  o order  / filter",
        Tab::Holdings => "[ ] wallet  a add  e edit  d delete  w new wallet  n rename  x delete wallet",
        Tab::Metals | Tab::Market => "r refresh",
        Tab::Settings => "c colors  +/- metal cards  >/< market cards",
    };
    let status = app.status.clone().unwrap_or_default();
    let help = Paragraph::new(format!("q quit  Tab switch  {}   {}", keys, status))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

fn header(cells: &[&str]) -> Row<'static> {
    let cells: Vec<Cell> = cells
        .iter()
        .map(|h| Cell::from(h.to_string()).style(Style::default().fg(Color::Yellow)))
        .collect();
    Row::new(cells).height(1)
}

fn empty_state(frame: &mut Frame, area: Rect, message: &str) {
    let empty_message = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(empty_message, area);
}

fn render_tracker(frame: &mut Frame, app: &mut App, area: Rect) {
    let funds = app.tracked_view();
    let scheme = *app.settings.color_scheme();

    let refreshed = app
        .tracker
        .last_refresh()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let auto = if app.auto_refresh_active() { " (auto)" } else { "" };
    let filter = if app.filter.is_empty() {
        String::new()
    } else {
        format!("  filter: {}", app.filter)
    };
    let title = format!(
        "Tracked funds  sort: {} {}  updated: {}{}{}",
        app.sort.field, app.sort.order, refreshed, auto, filter
    );

    if funds.is_empty() {
        empty_state(frame, area, "No tracked funds. Press 'a' to add fund codes.");
        return;
    }

    let rows = funds.iter().map(|fund| {
        let color = change_color(fund.change_rate(), scheme);
        let cells = [
            Cell::from(fund.code().clone()),
            Cell::from(fund.name().clone()),
            Cell::from(format_nav(fund.net_value())),
            Cell::from(format_nav(fund.estimated_value())).style(Style::default().fg(color)),
            Cell::from(format_percentage(fund.change_rate())).style(Style::default().fg(color)),
            Cell::from(
                fund.update_time()
                    .map(|t| t.format("%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ];
        Row::new(cells).height(1)
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Min(24),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header(&["Code", "Name", "Net Value", "Estimate", "Change", "Updated"]))
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, &mut app.tracker_state);
}

fn render_holdings(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(6),
        ])
        .split(area);

    let current = app.current_wallet();
    let wallet_titles: Vec<Span> = app
        .portfolio
        .wallets()
        .iter()
        .map(|w| {
            let style = if w.id() == current.id() {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(Color::Cyan)
            };
            Span::styled(format!(" {} ", w.name()), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(wallet_titles)), chunks[0]);

    let scheme = *app.settings.color_scheme();
    let holdings = app.current_holdings();

    if holdings.is_empty() {
        empty_state(frame, chunks[1], "No holdings in this wallet. Press 'a' to add one.");
    } else {
        let rows = holdings.iter().map(|h| {
            let profit_color = change_color(h.holding_profit(), scheme);
            let rate = h.profit_rate();
            let cells = [
                Cell::from(h.code().clone()),
                Cell::from(h.fund_name().clone()),
                Cell::from(h.fund_type().clone()),
                Cell::from(format_amount(h.holding_amount())),
                Cell::from(format_amount(h.holding_profit())).style(Style::default().fg(profit_color)),
                Cell::from(format_percentage(&rate)).style(Style::default().fg(change_color(&rate, scheme))),
                Cell::from(h.primary_industry().to_string()),
            ];
            Row::new(cells).height(1)
        });

        let widths = [
            Constraint::Length(8),
            Constraint::Min(24),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(14),
        ];

        let table = Table::new(rows, widths)
            .header(header(&["Code", "Name", "Type", "Amount", "Profit", "Rate", "Industry"]))
            .block(Block::default().title(format!("Holdings: {}", current.name())).borders(Borders::ALL))
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        frame.render_stateful_widget(table, chunks[1], &mut app.holdings_state);
    }

    let summary = app.portfolio.summary_for(current.id());
    let summary_line = Line::from(vec![
        Span::raw(format!(
            "{} holding(s)  Amount: {}  Profit: ",
            summary.holding_count(),
            format_amount(summary.total_amount())
        )),
        Span::styled(
            format_amount(summary.total_profit()),
            Style::default().fg(change_color(summary.total_profit(), scheme)),
        ),
        Span::raw("  Rate: "),
        Span::styled(
            format_percentage(summary.profit_rate()),
            Style::default().fg(change_color(summary.profit_rate(), scheme)),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(summary_line).block(Block::default().title("Summary").borders(Borders::ALL)),
        chunks[2],
    );

    let industries: Vec<Line> = app
        .portfolio
        .industry_breakdown(current.id())
        .iter()
        .map(|s| Line::from(format!("{:<16} {:>6.2}%  ({})", s.industry(), s.proportion(), s.count())))
        .collect();
    frame.render_widget(
        Paragraph::new(industries).block(Block::default().title("Industries").borders(Borders::ALL)),
        chunks[3],
    );
}

/// Splits `area` into rows of `per_row` cards, each `height` tall.
fn grid(area: Rect, count: usize, per_row: usize, height: u16) -> Vec<Rect> {
    let per_row = per_row.max(1);
    let rows = count.div_ceil(per_row);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(height); rows])
        .split(area);

    row_areas
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
                .split(*row)
                .to_vec()
        })
        .take(count)
        .collect()
}

fn card(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White)),
    );
    frame.render_widget(widget, area);
}

/// Shifts values so the minimum maps to zero; sparklines take unsigned bars.
fn sparkline_data(values: &[Decimal]) -> Vec<u64> {
    let min = values.iter().min().copied().unwrap_or(Decimal::ZERO);
    values
        .iter()
        .map(|v| ((*v - min) * Decimal::ONE_HUNDRED).to_u64().unwrap_or(0))
        .collect()
}

fn render_metals(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(board) = app.metals.clone() else {
        empty_state(frame, area, "No precious metal prices yet. Press 'r' to refresh.");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8), Constraint::Length(6)])
        .split(area);

    let per_row = *app.settings.metal_items_per_row() as usize;
    let mut cards: Vec<(String, Vec<Line>)> = board
        .bank_gold_bars()
        .iter()
        .map(|b| (b.bank().clone(), vec![Line::from(format!("Gold bar  {}", format_optional(b.price())))]))
        .collect();
    cards.extend(board.brand_prices().iter().map(|p| {
        (
            p.brand().clone(),
            vec![
                Line::from(format!("Bullion   {}", format_optional(p.bullion_price()))),
                Line::from(format!("Gold      {}", format_optional(p.gold_price()))),
                Line::from(format!("Platinum  {}", format_optional(p.platinum_price()))),
            ],
        )
    }));

    let stale = if *board.stale() { " (cached)" } else { "" };
    let title = format!("Prices synced {}{}", board.synced_at().format("%Y-%m-%d %H:%M"), stale);
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    for (rect, (title, lines)) in grid(inner, cards.len(), per_row, 5).into_iter().zip(cards) {
        card(frame, rect, &title, lines);
    }

    let rows = board.recycle_prices().iter().map(|r| {
        Row::new([
            Cell::from(r.gold_type().clone()),
            Cell::from(format_optional(r.recycle_price())),
            Cell::from(r.updated_date().clone()),
        ])
    });
    let table = Table::new(
        rows,
        [Constraint::Min(16), Constraint::Length(12), Constraint::Length(12)],
    )
    .header(header(&["Recycle", "Price", "Date"]))
    .block(Block::default().title("Recycle prices").borders(Borders::ALL));
    frame.render_widget(table, chunks[1]);

    let values: Vec<Decimal> = app.gold_history.iter().map(|p| *p.value()).collect();
    let data = sparkline_data(&values);
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(format!(
                    "Gold bar average ({} days, {})",
                    values.len(),
                    format_percentage(&history_change_rate(&values))
                ))
                .borders(Borders::ALL),
        )
        .data(&data)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(sparkline, chunks[2]);
}

fn render_market(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(area);

    let scheme = *app.settings.color_scheme();

    if app.indices.is_empty() {
        empty_state(frame, chunks[0], "No market indices yet. Press 'r' to refresh.");
    } else {
        let per_row = *app.settings.market_items_per_row() as usize;
        let block = Block::default().title("Market indices").borders(Borders::ALL);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);

        for (rect, index) in grid(inner, app.indices.len(), per_row, 4)
            .into_iter()
            .zip(app.indices.iter())
        {
            let rate = index.change_rate().unwrap_or(Decimal::ZERO);
            let color = change_color(&rate, scheme);
            card(
                frame,
                rect,
                index.name(),
                vec![Line::from(vec![
                    Span::styled(format_optional(index.value()), Style::default().fg(color)),
                    Span::raw("  "),
                    Span::styled(
                        index
                            .change_rate()
                            .as_ref()
                            .map(format_percentage)
                            .unwrap_or_else(|| "-".to_string()),
                        Style::default().fg(color),
                    ),
                ])],
            );
        }
    }

    let values: Vec<Decimal> = app.cumulative.iter().map(|c| *c.cumulative_change()).collect();
    let data = sparkline_data(&values);
    let latest = values.last().copied().unwrap_or(Decimal::ZERO);
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(format!(
                    "M1 cumulative change ({} months, {})",
                    values.len().saturating_sub(1),
                    format_percentage(&latest)
                ))
                .borders(Borders::ALL),
        )
        .data(&data)
        .style(Style::default().fg(change_color(&latest, scheme)));
    frame.render_widget(sparkline, chunks[1]);
}

fn render_settings(frame: &mut Frame, app: &mut App, area: Rect) {
    let settings = &app.settings;
    let scheme = *settings.color_scheme();
    let lines = vec![
        Line::from(vec![
            Span::raw("Color scheme:          "),
            Span::styled("up ", Style::default().fg(change_color(&Decimal::ONE, scheme))),
            Span::styled("down", Style::default().fg(change_color(&Decimal::NEGATIVE_ONE, scheme))),
            Span::raw(format!("  ({})", scheme)),
        ]),
        Line::from(format!("Metal cards per row:   {}", settings.metal_items_per_row())),
        Line::from(format!("Market cards per row:  {}", settings.market_items_per_row())),
        Line::from(format!(
            "Auto refresh:          every {}s during trading hours",
            app.schedule.interval().as_secs()
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title("Settings").borders(Borders::ALL)),
        area,
    );
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
