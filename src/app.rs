use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::time::{Instant, SystemTime};

use crate::config::AppConfig;
use crate::ledger::store::Store;
use crate::ledger::{is_close_eligible, Account};
use crate::ui::close_account::{CloseAccountModal, CloseAccountOutcome};
use crate::ui::select_account::{SelectAccountHost, SelectAccountModal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Accounts,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    SelectAccount, // pick a zero-balance account to close
    CloseAccount,  // capture the closure reason
    Confirm,       // final y/n before the ledger is touched
    Help,
}

pub struct App {
    pub section: Section,
    pub popup: Popup,

    // Chart of accounts (main section)
    pub accounts: Vec<Account>,
    pub selected_account: usize,

    // Popup state, created when opened and dropped when dismissed
    pub select_account: Option<SelectAccountModal>,
    pub close_account: Option<CloseAccountModal>,

    // Config + persistence
    pub config: AppConfig,
    pub store: Store,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    // Detail panel scroll offset
    pub detail_scroll: usize,

    // External-edit detection for the ledger file
    ledger_modified: Option<SystemTime>,
    last_refresh_check: Instant,
}

/// Buffered requests from the select-account popup. The popup talks to this
/// capability; the app applies the effects after the borrow on the chart ends.
#[derive(Default)]
struct ModalEffects {
    selected: Option<Account>,
    close_requested: bool,
}

impl SelectAccountHost for ModalEffects {
    fn notify_selected(&mut self, account: &Account) {
        self.selected = Some(account.clone());
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }
}

impl App {
    pub async fn new(ledger_override: Option<PathBuf>) -> Result<Self> {
        let config = AppConfig::load().unwrap_or_default();
        let path = ledger_override
            .or_else(|| config.ledger_file.clone())
            .unwrap_or_else(Store::default_path);
        let store = Store::new(path);

        let accounts = store
            .load()
            .await
            .with_context(|| format!("Could not load ledger from {}", store.path().display()))?;
        let modified = store.modified().await;

        Ok(Self::from_parts(config, store, accounts, modified))
    }

    pub fn from_parts(
        config: AppConfig,
        store: Store,
        accounts: Vec<Account>,
        ledger_modified: Option<SystemTime>,
    ) -> Self {
        Self {
            section: Section::Accounts,
            popup: Popup::None,

            accounts,
            selected_account: 0,

            select_account: None,
            close_account: None,

            config,
            store,

            status_message: None,
            status_message_time: None,

            detail_scroll: 0,

            ledger_modified,
            last_refresh_check: Instant::now(),
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Accounts shown in the main table; closed ones are hidden unless
    /// the config says otherwise.
    pub fn visible_accounts(&self) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|a| self.config.show_closed || !a.is_closed)
            .collect()
    }

    pub fn current_account(&self) -> Option<&Account> {
        let visible = self.visible_accounts();
        visible.get(self.selected_account.min(visible.len().saturating_sub(1))).copied()
    }

    pub fn closeable_count(&self) -> usize {
        self.accounts.iter().filter(|a| is_close_eligible(a)).count()
    }

    pub fn closed_count(&self) -> usize {
        self.accounts.iter().filter(|a| a.is_closed).count()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key).await;
        }

        self.handle_normal_key(key).await
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Switch between the accounts table and the detail panel
            KeyCode::Tab | KeyCode::BackTab => {
                self.section = match self.section {
                    Section::Accounts => Section::Detail,
                    Section::Detail => Section::Accounts,
                };
            }

            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),

            // Open the close-account picker
            KeyCode::Char('x') => self.open_select_account(),

            // Toggle closed accounts in the table
            KeyCode::Char('z') => {
                self.config.show_closed = !self.config.show_closed;
                let _ = self.config.save();
                self.clamp_selection();
                self.set_status(if self.config.show_closed {
                    "Showing closed accounts"
                } else {
                    "Hiding closed accounts"
                });
            }

            // Reload the ledger from disk
            KeyCode::Char('R') => self.refresh().await,

            // Help (? or h)
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    async fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::SelectAccount => {
                self.handle_select_account_key(key);
                Ok(())
            }
            Popup::CloseAccount => {
                self.handle_close_account_key(key);
                Ok(())
            }
            Popup::Confirm => self.handle_confirm_key(key).await,
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc
                        | KeyCode::Char('?')
                        | KeyCode::Char('h')
                        | KeyCode::Enter
                        | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
                Ok(())
            }
            Popup::None => Ok(()),
        }
    }

    fn open_select_account(&mut self) {
        self.select_account = Some(SelectAccountModal::default());
        self.popup = Popup::SelectAccount;
    }

    fn handle_select_account_key(&mut self, key: KeyEvent) {
        let mut effects = ModalEffects::default();
        if let Some(modal) = self.select_account.as_mut() {
            modal.handle_key(key, &self.accounts, &mut effects);
        }

        if let Some(account) = effects.selected {
            // Selection notified: hand the account to the close flow. The
            // picker itself stays out of what happens next.
            self.select_account = None;
            self.close_account = Some(CloseAccountModal::new(account));
            self.popup = Popup::CloseAccount;
        } else if effects.close_requested {
            self.select_account = None;
            self.popup = Popup::None;
        }
    }

    fn handle_close_account_key(&mut self, key: KeyEvent) {
        let outcome = match self.close_account.as_mut() {
            Some(modal) => modal.handle_key(key),
            None => return,
        };

        match outcome {
            CloseAccountOutcome::Pending => {}
            CloseAccountOutcome::Cancelled => {
                self.close_account = None;
                self.popup = Popup::None;
            }
            CloseAccountOutcome::Submitted => {
                if let Some(modal) = self.close_account.as_ref() {
                    self.set_status(format!(
                        "Close '{}'? (y/n)",
                        modal.account.account_name
                    ));
                }
                self.popup = Popup::Confirm;
            }
        }
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.perform_close().await;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                // Back to the reason popup, typed text intact
                self.popup = Popup::CloseAccount;
            }
            _ => {}
        }
        Ok(())
    }

    async fn perform_close(&mut self) {
        let Some(modal) = self.close_account.take() else {
            self.popup = Popup::None;
            return;
        };
        self.popup = Popup::None;

        match self
            .store
            .close_account(&modal.account.account_number, &modal.reason)
            .await
        {
            Ok(_) => {
                self.set_status("✓ Account closed successfully!");
                self.refresh_silent().await;
            }
            Err(e) => {
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    fn move_down(&mut self) {
        match self.section {
            Section::Accounts => {
                let len = self.visible_accounts().len();
                if len > 0 {
                    self.selected_account = (self.selected_account + 1) % len;
                    self.detail_scroll = 0;
                }
            }
            Section::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
        }
    }

    fn move_up(&mut self) {
        match self.section {
            Section::Accounts => {
                let len = self.visible_accounts().len();
                if len > 0 {
                    self.selected_account =
                        self.selected_account.checked_sub(1).unwrap_or(len - 1);
                    self.detail_scroll = 0;
                }
            }
            Section::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_accounts().len();
        if self.selected_account >= len {
            self.selected_account = len.saturating_sub(1);
        }
    }

    async fn refresh(&mut self) {
        self.refresh_silent().await;
        self.set_status("Ledger reloaded");
    }

    async fn refresh_silent(&mut self) {
        match self.store.load().await {
            Ok(accounts) => {
                self.accounts = accounts;
                self.clamp_selection();
                self.ledger_modified = self.store.modified().await;
            }
            Err(e) => {
                self.set_status(format!("Reload failed: {}", e));
            }
        }
    }

    pub async fn tick(&mut self) -> Result<()> {
        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        // Pick up external edits to the ledger file (rate-limited)
        if self.last_refresh_check.elapsed().as_secs() >= self.config.refresh_secs.max(1) {
            self.last_refresh_check = Instant::now();
            let modified = self.store.modified().await;
            if modified != self.ledger_modified {
                tracing::info!("Ledger file changed on disk, reloading");
                self.ledger_modified = modified;
                self.refresh_silent().await;
                self.set_status("Ledger changed on disk - reloaded");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::store::starter_chart;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn temp_app(name: &str, accounts: Vec<Account>) -> App {
        let path = std::env::temp_dir().join(format!(
            "motocho-app-test-{}-{}.json",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&path);
        App::from_parts(AppConfig::default(), Store::new(path), accounts, None)
    }

    #[tokio::test]
    async fn x_opens_the_picker_and_esc_drops_its_state() {
        let mut app = temp_app("picker", starter_chart());

        app.handle_key(key(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(app.popup, Popup::SelectAccount);
        assert!(app.select_account.is_some());

        app.handle_key(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.popup, Popup::None);
        assert!(app.select_account.is_none());
    }

    #[tokio::test]
    async fn full_close_flow_marks_the_account_closed() {
        let mut app = temp_app("flow", starter_chart());
        app.store.save(&app.accounts).await.unwrap();

        // Open the picker; first eligible entry is Prepaid Insurance (1400)
        app.handle_key(key(KeyCode::Char('x'))).await.unwrap();
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.popup, Popup::CloseAccount);
        let picked = app.close_account.as_ref().unwrap().account.clone();
        assert_eq!(picked.account_number, "1400");

        // Type a reason, submit, confirm
        for c in "Policy expired".chars() {
            app.handle_key(key(KeyCode::Char(c))).await.unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.popup, Popup::Confirm);
        app.handle_key(key(KeyCode::Char('y'))).await.unwrap();

        assert_eq!(app.popup, Popup::None);
        let account = app
            .accounts
            .iter()
            .find(|a| a.account_number == "1400")
            .unwrap();
        assert!(account.is_closed);
        assert!(!account.is_active);
        assert_eq!(account.closure_reason.as_deref(), Some("Policy expired"));

        let _ = std::fs::remove_file(app.store.path());
    }

    #[tokio::test]
    async fn declining_the_confirm_returns_to_the_reason_popup() {
        let mut app = temp_app("decline", starter_chart());
        app.store.save(&app.accounts).await.unwrap();

        app.handle_key(key(KeyCode::Char('x'))).await.unwrap();
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        for c in "Oops".chars() {
            app.handle_key(key(KeyCode::Char(c))).await.unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.popup, Popup::Confirm);

        app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
        assert_eq!(app.popup, Popup::CloseAccount);
        assert_eq!(app.close_account.as_ref().unwrap().reason, "Oops");

        let _ = std::fs::remove_file(app.store.path());
    }

    #[tokio::test]
    async fn hiding_closed_accounts_shrinks_the_table() {
        let mut chart = starter_chart();
        chart[0].is_closed = true;
        let total = chart.len();
        let mut app = temp_app("hidden", chart);

        assert_eq!(app.visible_accounts().len(), total);
        app.config.show_closed = false;
        app.clamp_selection();
        assert_eq!(app.visible_accounts().len(), total - 1);
        assert!(app.visible_accounts().iter().all(|a| !a.is_closed));
    }

    #[tokio::test]
    async fn selection_wraps_around_the_visible_list() {
        let mut app = temp_app("wrap", starter_chart());
        let len = app.visible_accounts().len();

        app.handle_key(key(KeyCode::Up)).await.unwrap();
        assert_eq!(app.selected_account, len - 1);
        app.handle_key(key(KeyCode::Down)).await.unwrap();
        assert_eq!(app.selected_account, 0);
    }
}
