//! Close-account popup: confirm the details and capture a closure reason.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ledger::{format_balance, Account};

use super::{accent, centered_rect, danger, header, inactive, success, text, text_dim, warning};

/// What a keystroke did to the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseAccountOutcome {
    /// Still editing.
    Pending,
    /// User backed out; discard the typed reason.
    Cancelled,
    /// Reason accepted; the owner should ask for final confirmation.
    Submitted,
}

#[derive(Debug)]
pub struct CloseAccountModal {
    pub account: Account,
    pub reason: String,
    pub error: Option<String>,
}

impl CloseAccountModal {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            reason: String::new(),
            error: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> CloseAccountOutcome {
        match key.code {
            KeyCode::Esc => CloseAccountOutcome::Cancelled,
            KeyCode::Enter => {
                if self.reason.trim().is_empty() {
                    self.error = Some("Closure reason is required".to_string());
                    CloseAccountOutcome::Pending
                } else {
                    CloseAccountOutcome::Submitted
                }
            }
            KeyCode::Backspace => {
                self.reason.pop();
                CloseAccountOutcome::Pending
            }
            KeyCode::Char(c) => {
                self.reason.push(c);
                self.error = None;
                CloseAccountOutcome::Pending
            }
            _ => CloseAccountOutcome::Pending,
        }
    }
}

pub fn draw(f: &mut Frame, modal: &CloseAccountModal) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 90 { 90 } else { 60 },
        if area.height < 30 { 85 } else { 65 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Close Account ", Style::default().fg(danger())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(danger()));

    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(6), // account details
            Constraint::Length(1), // error line
            Constraint::Length(3), // reason input
            Constraint::Min(2),    // warning banner
            Constraint::Length(1), // key hints
        ])
        .split(popup_area);

    let account = &modal.account;
    let details = Paragraph::new(vec![
        Line::from(Span::styled(
            "Account Details",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        detail_line("Account Number:  ", account.account_number.clone()),
        detail_line("Account Name:    ", account.account_name.clone()),
        detail_line("Category:        ", account.account_category.as_str()),
        detail_line("Current Balance: ", format_balance(&account.balance)),
    ])
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(inactive())));
    f.render_widget(details, inner[0]);

    if let Some(ref error) = modal.error {
        let error_line = Paragraph::new(Span::styled(
            error.as_str(),
            Style::default().fg(danger()).add_modifier(Modifier::BOLD),
        ));
        f.render_widget(error_line, inner[1]);
    }

    let reason_input = Paragraph::new(format!("{}_", modal.reason))
        .style(Style::default().fg(text()))
        .block(
            Block::default()
                .title(Span::styled(" Closure Reason * ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        );
    f.render_widget(reason_input, inner[2]);

    let banner = Paragraph::new(Line::from(vec![
        Span::styled("⚠ Important: ", Style::default().fg(warning()).add_modifier(Modifier::BOLD)),
        Span::styled(
            "Closing an account will make it inactive and prevent it from being used in new journal entries. This action cannot be undone.",
            Style::default().fg(warning()),
        ),
    ]))
    .wrap(Wrap { trim: true });
    f.render_widget(banner, inner[3]);

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
        Span::raw(" close account │ "),
        Span::styled("Esc", Style::default().fg(danger())),
        Span::raw(" cancel"),
    ]))
    .alignment(Alignment::Center)
    .style(Style::default().fg(text_dim()));
    f.render_widget(hints, inner[4]);
}

fn detail_line(label: &'static str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(text_dim())),
        Span::styled(value.into(), Style::default().fg(text())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountCategory, NormalSide};
    use crossterm::event::KeyModifiers;

    fn modal() -> CloseAccountModal {
        CloseAccountModal::new(Account {
            id: 7,
            account_number: "4000".to_string(),
            account_name: "Service Revenue".to_string(),
            account_description: String::new(),
            normal_side: NormalSide::Credit,
            account_category: AccountCategory::Revenue,
            balance: "0.00".to_string(),
            is_active: true,
            is_closed: false,
            closure_reason: None,
        })
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn submit_without_a_reason_shows_the_required_error() {
        let mut popup = modal();
        let outcome = popup.handle_key(key(KeyCode::Enter));
        assert_eq!(outcome, CloseAccountOutcome::Pending);
        assert_eq!(popup.error.as_deref(), Some("Closure reason is required"));

        // Whitespace alone doesn't count either
        popup.reason = "   ".to_string();
        assert_eq!(popup.handle_key(key(KeyCode::Enter)), CloseAccountOutcome::Pending);
    }

    #[test]
    fn typing_clears_the_error_and_submit_goes_through() {
        let mut popup = modal();
        popup.handle_key(key(KeyCode::Enter));
        assert!(popup.error.is_some());

        for c in "Dormant".chars() {
            popup.handle_key(key(KeyCode::Char(c)));
        }
        assert!(popup.error.is_none());
        assert_eq!(popup.handle_key(key(KeyCode::Enter)), CloseAccountOutcome::Submitted);
        assert_eq!(popup.reason, "Dormant");
    }

    #[test]
    fn escape_cancels() {
        let mut popup = modal();
        popup.reason = "half-typed".to_string();
        assert_eq!(popup.handle_key(key(KeyCode::Esc)), CloseAccountOutcome::Cancelled);
    }

    #[test]
    fn backspace_edits_the_reason() {
        let mut popup = modal();
        popup.reason = "abc".to_string();
        popup.handle_key(key(KeyCode::Backspace));
        assert_eq!(popup.reason, "ab");
    }
}
