//! Ledger file persistence and the close-account operation.
//!
//! The chart of accounts lives in a single JSON file. A missing file is an
//! empty chart, not an error; a file that exists but won't parse is surfaced
//! so the user doesn't silently lose their data.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use super::{balance_is_zero, Account, AccountCategory, NormalSide};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("cannot access ledger file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no account with number {0}")]
    NotFound(String),
    #[error("account {0} is already closed")]
    AlreadyClosed(String),
    #[error("cannot close an account with a non-zero balance")]
    NonZeroBalance,
    #[error("closure reason is required")]
    ReasonRequired,
}

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default ledger location: ~/.local/share/motocho/ledger.json
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("motocho")
            .join("ledger.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the chart of accounts. A missing file is an empty chart.
    pub async fn load(&self) -> Result<Vec<Account>, LedgerError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("No ledger file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| LedgerError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    pub async fn save(&self, accounts: &[Account]) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!("Could not create ledger directory: {}", e);
            }
        }

        let content = serde_json::to_string_pretty(accounts).map_err(|e| LedgerError::Parse {
            path: self.path.clone(),
            source: e,
        })?;

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| LedgerError::Io {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Close an account: requires a reason, a zero balance, and an account
    /// that isn't closed yet. Marks it closed and inactive, records the
    /// trimmed reason, and saves the ledger. Returns the updated account.
    pub async fn close_account(&self, number: &str, reason: &str) -> Result<Account, LedgerError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::ReasonRequired);
        }

        let mut accounts = self.load().await?;
        let account = accounts
            .iter_mut()
            .find(|a| a.account_number == number)
            .ok_or_else(|| LedgerError::NotFound(number.to_string()))?;

        if account.is_closed {
            return Err(LedgerError::AlreadyClosed(number.to_string()));
        }
        if !balance_is_zero(&account.balance) {
            return Err(LedgerError::NonZeroBalance);
        }

        account.is_closed = true;
        account.is_active = false;
        account.closure_reason = Some(reason.to_string());
        let closed = account.clone();

        self.save(&accounts).await?;
        tracing::info!("Closed account {} ({})", closed.account_number, closed.account_name);
        Ok(closed)
    }

    /// Write the starter chart if no ledger file exists yet.
    /// Returns false when a file was already there.
    pub async fn seed(&self) -> Result<bool, LedgerError> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(false);
        }
        self.save(&starter_chart()).await?;
        Ok(true)
    }

    /// Last modification time of the ledger file, for change detection.
    pub async fn modified(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
    }
}

/// A small typical-business chart of accounts to start from.
pub fn starter_chart() -> Vec<Account> {
    fn account(
        id: u32,
        number: &str,
        name: &str,
        description: &str,
        side: NormalSide,
        category: AccountCategory,
        balance: &str,
    ) -> Account {
        Account {
            id,
            account_number: number.to_string(),
            account_name: name.to_string(),
            account_description: description.to_string(),
            normal_side: side,
            account_category: category,
            balance: balance.to_string(),
            is_active: true,
            is_closed: false,
            closure_reason: None,
        }
    }

    vec![
        account(
            1,
            "1000",
            "Cash",
            "Primary operating cash account for daily transactions",
            NormalSide::Debit,
            AccountCategory::Asset,
            "50000.00",
        ),
        account(
            2,
            "1200",
            "Accounts Receivable",
            "Money owed to the company by customers for services rendered",
            NormalSide::Debit,
            AccountCategory::Asset,
            "25000.00",
        ),
        account(
            3,
            "1400",
            "Prepaid Insurance",
            "Insurance premiums paid in advance",
            NormalSide::Debit,
            AccountCategory::Asset,
            "0.00",
        ),
        account(
            4,
            "2000",
            "Accounts Payable",
            "Money owed to suppliers and vendors",
            NormalSide::Credit,
            AccountCategory::Liability,
            "15000.00",
        ),
        account(
            5,
            "2100",
            "Salaries Payable",
            "Accrued salaries and wages owed to employees",
            NormalSide::Credit,
            AccountCategory::Liability,
            "0.00",
        ),
        account(
            6,
            "3000",
            "Owner's Capital",
            "Owner's investment in the business",
            NormalSide::Credit,
            AccountCategory::Equity,
            "100000.00",
        ),
        account(
            7,
            "4000",
            "Service Revenue",
            "Income earned from services provided",
            NormalSide::Credit,
            AccountCategory::Revenue,
            "0.00",
        ),
        account(
            8,
            "5100",
            "Supplies Expense",
            "Office and operating supplies consumed",
            NormalSide::Debit,
            AccountCategory::Expense,
            "0.00",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> Store {
        let path = std::env::temp_dir().join(format!("motocho-test-{}-{}.json", std::process::id(), name));
        let _ = std::fs::remove_file(&path);
        Store::new(path)
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_chart() {
        let store = temp_store("missing");
        let accounts = store.load().await.unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn close_flips_flags_and_records_reason() {
        let store = temp_store("close");
        store.save(&starter_chart()).await.unwrap();

        let closed = store
            .close_account("2100", "  No longer accruing salaries  ")
            .await
            .unwrap();
        assert!(closed.is_closed);
        assert!(!closed.is_active);
        assert_eq!(closed.closure_reason.as_deref(), Some("No longer accruing salaries"));

        // Persisted, not just in memory
        let reloaded = store.load().await.unwrap();
        let account = reloaded.iter().find(|a| a.account_number == "2100").unwrap();
        assert!(account.is_closed);

        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn close_rejects_non_zero_balance() {
        let store = temp_store("nonzero");
        store.save(&starter_chart()).await.unwrap();

        let err = store.close_account("1000", "reason").await.unwrap_err();
        assert!(matches!(err, LedgerError::NonZeroBalance));

        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn close_rejects_second_attempt() {
        let store = temp_store("twice");
        store.save(&starter_chart()).await.unwrap();

        store.close_account("4000", "Year-end cleanup").await.unwrap();
        let err = store.close_account("4000", "again").await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyClosed(_)));

        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn close_requires_a_reason() {
        let store = temp_store("reason");
        store.save(&starter_chart()).await.unwrap();

        let err = store.close_account("2100", "   ").await.unwrap_err();
        assert!(matches!(err, LedgerError::ReasonRequired));

        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn unknown_account_number_is_not_found() {
        let store = temp_store("unknown");
        store.save(&starter_chart()).await.unwrap();

        let err = store.close_account("9999", "reason").await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));

        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn seed_never_overwrites_an_existing_ledger() {
        let store = temp_store("seed");
        store.save(&[]).await.unwrap();

        assert!(!store.seed().await.unwrap());
        assert!(store.load().await.unwrap().is_empty());

        let _ = std::fs::remove_file(store.path());
    }
}
