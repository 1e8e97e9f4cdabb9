//! Account-selection popup: pick a zero-balance account to close.
//!
//! The popup owns only its category filter and list cursor. The list of
//! eligible accounts is derived from the host's chart on every keystroke and
//! every draw, never stored. Effects flow through [`SelectAccountHost`], a
//! capability the owner injects; the popup itself never mutates the chart.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::ledger::{close_eligible, Account, CategoryFilter};

use super::{accent, bg_selected, centered_rect, danger, inactive, text, text_dim, warning};

/// What the popup can ask of its owner. Selecting an account notifies the
/// host; dismissal asks the host to close the popup. The host decides what
/// actually happens in both cases.
pub trait SelectAccountHost {
    fn notify_selected(&mut self, account: &Account);
    fn request_close(&mut self);
}

#[derive(Debug, Default)]
pub struct SelectAccountModal {
    pub filter: CategoryFilter,
    pub selected: usize,
}

impl SelectAccountModal {
    /// The accounts currently offered for closing: active, not closed,
    /// balance parses to exactly zero, narrowed by the category filter.
    pub fn filtered<'a>(&self, accounts: &'a [Account]) -> Vec<&'a Account> {
        close_eligible(accounts, self.filter)
    }

    fn cursor(&self, len: usize) -> usize {
        self.selected.min(len.saturating_sub(1))
    }

    pub fn highlighted<'a>(&self, accounts: &'a [Account]) -> Option<&'a Account> {
        let filtered = self.filtered(accounts);
        filtered.get(self.cursor(filtered.len())).copied()
    }

    pub fn move_down(&mut self, accounts: &[Account]) {
        let len = self.filtered(accounts).len();
        if len > 0 {
            self.selected = (self.cursor(len) + 1) % len;
        }
    }

    pub fn move_up(&mut self, accounts: &[Account]) {
        let len = self.filtered(accounts).len();
        if len > 0 {
            self.selected = self.cursor(len).checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// Changing the category resets the cursor; the filtered list is
    /// recomputed on the next use.
    pub fn cycle_category_next(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
    }

    pub fn cycle_category_prev(&mut self) {
        self.filter = self.filter.prev();
        self.selected = 0;
    }

    /// Picker path: resolve an entry by identifier equality after string
    /// coercion and notify the host. Does NOT request close -- the host
    /// decides what follows a selection.
    pub fn choose_by_id(
        &self,
        accounts: &[Account],
        id: &str,
        host: &mut dyn SelectAccountHost,
    ) {
        if id.is_empty() {
            return;
        }
        if let Some(account) = self.filtered(accounts).into_iter().find(|a| a.id.to_string() == id) {
            host.notify_selected(account);
        }
    }

    /// Generic selection helper: notify, then request close, in that order.
    pub fn choose(&self, account: &Account, host: &mut dyn SelectAccountHost) {
        host.notify_selected(account);
        host.request_close();
    }

    /// Confirm the highlighted entry through the picker path.
    pub fn select_highlighted(&self, accounts: &[Account], host: &mut dyn SelectAccountHost) {
        if let Some(account) = self.highlighted(accounts) {
            let id = account.id.to_string();
            self.choose_by_id(accounts, &id, host);
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        accounts: &[Account],
        host: &mut dyn SelectAccountHost,
    ) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => host.request_close(),
            KeyCode::Char('j') | KeyCode::Down => self.move_down(accounts),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(accounts),
            KeyCode::Tab | KeyCode::Right => self.cycle_category_next(),
            KeyCode::BackTab | KeyCode::Left => self.cycle_category_prev(),
            KeyCode::Enter => self.select_highlighted(accounts, host),
            KeyCode::Char(' ') => {
                // Second selection surface: the generic helper, which also
                // dismisses the popup
                if let Some(account) = self.highlighted(accounts) {
                    self.choose(account, host);
                }
            }
            _ => {}
        }
    }

    /// Prompt above the list, depending on whether anything qualifies.
    pub fn prompt_line(&self, accounts: &[Account]) -> &'static str {
        if self.filtered(accounts).is_empty() {
            "No accounts available to close (zero balance required)"
        } else {
            "Select an account to close..."
        }
    }

    /// Empty-state body text. Wording depends on whether a category is
    /// narrowing the list.
    pub fn empty_message(&self) -> &'static str {
        match self.filter {
            CategoryFilter::All => {
                "No accounts available to close (all accounts have non-zero balances or are already closed)"
            }
            CategoryFilter::Only(_) => "No accounts found in this category that can be closed",
        }
    }
}

pub fn draw(f: &mut Frame, modal: &SelectAccountModal, accounts: &[Account]) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 100 { 90 } else { 70 },
        if area.height < 30 { 85 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            " Select Account to Close ",
            Style::default().fg(accent()),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));

    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // category selector
            Constraint::Length(2), // zero-balance note
            Constraint::Min(4),    // account list / empty state
            Constraint::Length(1), // key hints
        ])
        .split(popup_area);

    let filtered = modal.filtered(accounts);

    let selector = Paragraph::new(Line::from(vec![
        Span::styled("Category: ", Style::default().fg(text_dim())),
        Span::styled("◂ ", Style::default().fg(accent())),
        Span::styled(
            modal.filter.label(),
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▸", Style::default().fg(accent())),
        Span::styled("   ", Style::default()),
        Span::styled(modal.prompt_line(accounts), Style::default().fg(text_dim())),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(inactive())));
    f.render_widget(selector, inner[0]);

    let note = Paragraph::new(Line::from(vec![
        Span::styled("⚠ Note: ", Style::default().fg(warning()).add_modifier(Modifier::BOLD)),
        Span::styled(
            "Only accounts with exactly $0.00 balance can be closed. Closed accounts cannot be used in new journal entries.",
            Style::default().fg(warning()),
        ),
    ]))
    .wrap(Wrap { trim: true });
    f.render_widget(note, inner[1]);

    if filtered.is_empty() {
        let empty = Paragraph::new(modal.empty_message())
            .style(Style::default().fg(text_dim()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, inner[2]);
    } else {
        let cursor = modal.cursor(filtered.len());
        let rows: Vec<Row> = filtered
            .iter()
            .enumerate()
            .map(|(i, account)| {
                let row_style = if i == cursor {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default().fg(text())
                };

                Row::new(vec![Span::styled(account.picker_label(), Style::default())])
                    .style(row_style)
            })
            .collect();

        let table = Table::new(rows, [Constraint::Percentage(100)]);
        f.render_widget(table, inner[2]);
    }

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("j/k", Style::default().fg(accent())),
        Span::raw(" nav │ "),
        Span::styled("Tab", Style::default().fg(accent())),
        Span::raw(" category │ "),
        Span::styled("Enter", Style::default().fg(accent())),
        Span::raw(" select │ "),
        Span::styled("Esc", Style::default().fg(danger())),
        Span::raw(" cancel"),
    ]))
    .alignment(Alignment::Center)
    .style(Style::default().fg(text_dim()));
    f.render_widget(hints, inner[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountCategory, NormalSide};
    use crossterm::event::KeyModifiers;

    #[derive(Debug, PartialEq)]
    enum HostEvent {
        Selected(u32),
        CloseRequested,
    }

    #[derive(Default)]
    struct RecordingHost {
        events: Vec<HostEvent>,
    }

    impl SelectAccountHost for RecordingHost {
        fn notify_selected(&mut self, account: &Account) {
            self.events.push(HostEvent::Selected(account.id));
        }

        fn request_close(&mut self) {
            self.events.push(HostEvent::CloseRequested);
        }
    }

    fn account(id: u32, category: AccountCategory, balance: &str) -> Account {
        Account {
            id,
            account_number: format!("{}00", id),
            account_name: format!("Account {}", id),
            account_description: String::new(),
            normal_side: NormalSide::Debit,
            account_category: category,
            balance: balance.to_string(),
            is_active: true,
            is_closed: false,
            closure_reason: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn picker_path_notifies_once_and_never_closes() {
        let accounts = vec![
            account(1, AccountCategory::Asset, "0.00"),
            account(2, AccountCategory::Expense, "0.00"),
        ];
        let modal = SelectAccountModal::default();
        let mut host = RecordingHost::default();

        modal.choose_by_id(&accounts, "2", &mut host);
        assert_eq!(host.events, vec![HostEvent::Selected(2)]);
    }

    #[test]
    fn picker_path_ignores_unknown_and_ineligible_ids() {
        let mut shut = account(2, AccountCategory::Asset, "0.00");
        shut.is_closed = true;
        let accounts = vec![account(1, AccountCategory::Asset, "0.00"), shut];
        let modal = SelectAccountModal::default();
        let mut host = RecordingHost::default();

        modal.choose_by_id(&accounts, "99", &mut host);
        modal.choose_by_id(&accounts, "2", &mut host);
        modal.choose_by_id(&accounts, "", &mut host);
        assert!(host.events.is_empty());
    }

    #[test]
    fn helper_path_notifies_then_closes_in_order() {
        let accounts = vec![account(1, AccountCategory::Asset, "0.00")];
        let modal = SelectAccountModal::default();
        let mut host = RecordingHost::default();

        modal.choose(&accounts[0], &mut host);
        assert_eq!(
            host.events,
            vec![HostEvent::Selected(1), HostEvent::CloseRequested]
        );
    }

    #[test]
    fn enter_selects_the_highlighted_account_without_closing() {
        let accounts = vec![
            account(1, AccountCategory::Asset, "0.00"),
            account(2, AccountCategory::Asset, "0.00"),
        ];
        let mut modal = SelectAccountModal::default();
        let mut host = RecordingHost::default();

        modal.handle_key(key(KeyCode::Down), &accounts, &mut host);
        modal.handle_key(key(KeyCode::Enter), &accounts, &mut host);
        assert_eq!(host.events, vec![HostEvent::Selected(2)]);
    }

    #[test]
    fn space_selects_through_the_helper_and_also_closes() {
        let accounts = vec![account(1, AccountCategory::Asset, "0.00")];
        let mut modal = SelectAccountModal::default();
        let mut host = RecordingHost::default();

        modal.handle_key(key(KeyCode::Char(' ')), &accounts, &mut host);
        assert_eq!(
            host.events,
            vec![HostEvent::Selected(1), HostEvent::CloseRequested]
        );
    }

    #[test]
    fn both_dismiss_keys_close_exactly_once_and_never_select() {
        let accounts = vec![account(1, AccountCategory::Asset, "0.00")];
        let mut modal = SelectAccountModal::default();

        for code in [KeyCode::Esc, KeyCode::Char('q')] {
            let mut host = RecordingHost::default();
            modal.handle_key(key(code), &accounts, &mut host);
            assert_eq!(host.events, vec![HostEvent::CloseRequested]);
        }
    }

    #[test]
    fn category_cycling_narrows_the_list_and_resets_the_cursor() {
        let accounts = vec![
            account(1, AccountCategory::Asset, "0.00"),
            account(2, AccountCategory::Asset, "0.00"),
            account(3, AccountCategory::Expense, "0.00"),
        ];
        let mut modal = SelectAccountModal::default();
        modal.selected = 2;

        modal.cycle_category_next();
        assert_eq!(modal.filter, CategoryFilter::Only(AccountCategory::Asset));
        assert_eq!(modal.selected, 0);
        assert_eq!(modal.filtered(&accounts).len(), 2);
    }

    #[test]
    fn empty_state_wording_depends_on_the_filter() {
        let mut modal = SelectAccountModal::default();
        let all_msg = modal.empty_message();

        modal.filter = CategoryFilter::Only(AccountCategory::Revenue);
        let narrowed_msg = modal.empty_message();

        assert_ne!(all_msg, narrowed_msg);
        assert!(all_msg.contains("non-zero balances"));
        assert!(narrowed_msg.contains("this category"));
    }

    #[test]
    fn prompt_reflects_whether_anything_qualifies() {
        let modal = SelectAccountModal::default();
        assert_eq!(
            modal.prompt_line(&[]),
            "No accounts available to close (zero balance required)"
        );
        assert_eq!(
            modal.prompt_line(&[account(1, AccountCategory::Asset, "0.00")]),
            "Select an account to close..."
        );
    }

    #[test]
    fn cursor_survives_the_list_shrinking() {
        let mut accounts = vec![
            account(1, AccountCategory::Asset, "0.00"),
            account(2, AccountCategory::Asset, "0.00"),
            account(3, AccountCategory::Asset, "0.00"),
        ];
        let mut modal = SelectAccountModal::default();
        modal.selected = 2;

        accounts.truncate(1);
        assert_eq!(modal.highlighted(&accounts).map(|a| a.id), Some(1));

        let mut host = RecordingHost::default();
        modal.select_highlighted(&accounts, &mut host);
        assert_eq!(host.events, vec![HostEvent::Selected(1)]);
    }
}
