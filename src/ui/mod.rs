pub mod close_account;
pub mod select_account;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use std::sync::OnceLock;

use crate::app::{App, Popup, Section};
use crate::ledger::{format_balance, AccountCategory};
use crate::theme::Theme;

// Load theme colors from system (Omarchy/Hyprland) once at startup
static THEME: OnceLock<Theme> = OnceLock::new();

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::load)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }
fn category_color(category: AccountCategory) -> Color { theme().category_color(category) }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(6),    // Accounts table + detail panel
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_main_area(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::SelectAccount => {
            if let Some(modal) = &app.select_account {
                select_account::draw(f, modal, &app.accounts);
            }
        }
        Popup::CloseAccount => {
            if let Some(modal) = &app.close_account {
                close_account::draw(f, modal);
            }
        }
        Popup::Confirm => draw_confirm_popup(f, app),
        Popup::Help => draw_help_popup(f),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status, Style::default().fg(warning())))
    } else {
        Line::from(vec![
            Span::styled(
                format!("󰃬 {}", app.store.path().display()),
                Style::default().fg(text_dim()),
            ),
            Span::styled(" │ ", Style::default().fg(inactive())),
            Span::styled(
                format!("{} accounts", app.accounts.len()),
                Style::default().fg(text_dim()),
            ),
            Span::styled(" │ ", Style::default().fg(inactive())),
            Span::styled(
                format!("{} closeable", app.closeable_count()),
                Style::default().fg(success()),
            ),
            Span::styled(" │ ", Style::default().fg(inactive())),
            Span::styled(
                format!("{} closed", app.closed_count()),
                Style::default().fg(text_dim()),
            ),
        ])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_main_area(f: &mut Frame, app: &App, area: Rect) {
    // Narrow terminals get the table only
    if area.width < 70 {
        draw_accounts_box(f, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // Accounts table
            Constraint::Percentage(40), // Detail panel
        ])
        .split(area);

    draw_accounts_box(f, app, chunks[0]);
    draw_detail_box(f, app, chunks[1]);
}

fn draw_accounts_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Accounts;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let block = Block::default()
        .title(Span::styled(" Chart of Accounts ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let table_header = Row::new(vec![
        Span::styled("Number", Style::default().fg(header())),
        Span::styled("Name", Style::default().fg(header())),
        Span::styled("Category", Style::default().fg(header())),
        Span::styled("Balance", Style::default().fg(header())),
        Span::styled("Status", Style::default().fg(header())),
    ]);

    let visible = app.visible_accounts();
    let rows: Vec<Row> = if visible.is_empty() {
        vec![
            Row::new(vec![Span::styled(
                "  No accounts in ledger",
                Style::default().fg(text_dim()),
            )]),
            Row::new(vec![Span::styled(
                "  Run 'motocho --seed' to create a starter chart",
                Style::default().fg(accent()),
            )]),
        ]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(i, account)| {
                let dim = account.is_closed || !account.is_active;
                let name_color = if dim { text_dim() } else { text() };
                let status_color = if account.is_closed { danger() } else { success() };

                let row_style = if i == app.selected_account && is_active {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };

                Row::new(vec![
                    Span::styled(account.account_number.clone(), Style::default().fg(name_color)),
                    Span::styled(account.account_name.clone(), Style::default().fg(name_color)),
                    Span::styled(
                        account.account_category.as_str(),
                        Style::default().fg(if dim {
                            text_dim()
                        } else {
                            category_color(account.account_category)
                        }),
                    ),
                    Span::styled(format_balance(&account.balance), Style::default().fg(name_color)),
                    Span::styled(account.status_str(), Style::default().fg(status_color)),
                ])
                .style(row_style)
            })
            .collect()
    };

    let widths = vec![
        Constraint::Length(8),
        Constraint::Percentage(40),
        Constraint::Length(11),
        Constraint::Percentage(22),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(table_header.style(Style::default()))
        .block(block);

    f.render_widget(table, area);
}

fn draw_detail_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Detail;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let block = Block::default()
        .title(Span::styled(" Account ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let Some(account) = app.current_account() else {
        let help = Paragraph::new("No account selected")
            .style(Style::default().fg(text_dim()))
            .block(block);
        f.render_widget(help, area);
        return;
    };

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("Number      ", Style::default().fg(text_dim())),
            Span::styled(account.account_number.clone(), Style::default().fg(text())),
        ]),
        Line::from(vec![
            Span::styled("Name        ", Style::default().fg(text_dim())),
            Span::styled(account.account_name.clone(), Style::default().fg(text())),
        ]),
        Line::from(vec![
            Span::styled("Category    ", Style::default().fg(text_dim())),
            Span::styled(
                account.account_category.label(),
                Style::default().fg(category_color(account.account_category)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Normal side ", Style::default().fg(text_dim())),
            Span::styled(account.normal_side.as_str(), Style::default().fg(text())),
        ]),
        Line::from(vec![
            Span::styled("Balance     ", Style::default().fg(text_dim())),
            Span::styled(format_balance(&account.balance), Style::default().fg(text())),
        ]),
        Line::from(vec![
            Span::styled("Status      ", Style::default().fg(text_dim())),
            Span::styled(
                account.status_str(),
                Style::default().fg(if account.is_closed { danger() } else { success() }),
            ),
        ]),
    ];

    if let Some(ref reason) = account.closure_reason {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Closure reason",
            Style::default().fg(header()),
        )));
        lines.push(Line::from(Span::styled(
            reason.clone(),
            Style::default().fg(text()),
        )));
    }

    if !account.account_description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Description",
            Style::default().fg(header()),
        )));
        lines.push(Line::from(Span::styled(
            account.account_description.clone(),
            Style::default().fg(text_dim()),
        )));
    }

    // Slice visible lines by the scroll offset
    let inner_height = area.height.saturating_sub(2) as usize;
    let start = app.detail_scroll.min(lines.len().saturating_sub(1));
    let end = (start + inner_height).min(lines.len());
    let visible_lines: Vec<Line> = lines[start..end].to_vec();

    let content = Paragraph::new(visible_lines)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(content, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Accounts => vec![
            ("↑↓", "Nav"),
            ("x", "Close acct"),
            ("z", "Closed"),
            ("R", "Reload"),
            ("Tab", "Detail"),
            ("h", "Help"),
        ],
        Section::Detail => vec![
            ("j/k", "Scroll"),
            ("Tab", "Accounts"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 {
        4
    } else if area.width < 80 {
        5
    } else {
        hints.len()
    };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 35 { 95 } else { 75 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Navigation ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Tab       ", Style::default().fg(accent())),
            Span::raw("Switch between the table and the detail panel"),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", Style::default().fg(accent())),
            Span::raw("Move in the table / scroll the detail panel"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Closing Accounts ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  x         ", Style::default().fg(accent())),
            Span::raw("Pick a zero-balance account to close"),
        ]),
        Line::from(vec![
            Span::raw("            Only active accounts with a $0.00 balance qualify."),
        ]),
        Line::from(vec![
            Span::raw("            A closure reason is always required."),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Ledger ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  R         ", Style::default().fg(accent())),
            Span::raw("Reload the ledger file from disk"),
        ]),
        Line::from(vec![
            Span::styled("  z         ", Style::default().fg(accent())),
            Span::raw("Show/hide closed accounts"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Quick Start ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  motocho                         ", Style::default().fg(accent())),
            Span::raw("Launch this TUI"),
        ]),
        Line::from(vec![
            Span::styled("  motocho --seed                  ", Style::default().fg(accent())),
            Span::raw("Create a starter chart of accounts"),
        ]),
        Line::from(vec![
            Span::styled("  motocho --status                ", Style::default().fg(accent())),
            Span::raw("JSON summary for scripts"),
        ]),
        Line::from(vec![
            Span::styled("  motocho --close 1400 --reason … ", Style::default().fg(accent())),
            Span::raw("Close an account headlessly"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("h", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" 󰋖 motocho Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(40, 20, f.area());

    f.render_widget(Clear, popup_area);

    let message = app.status_message.as_deref().unwrap_or("Confirm?");

    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center);

    f.render_widget(confirm, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
