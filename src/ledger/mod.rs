pub mod store;

use serde::{Deserialize, Serialize};

/// The five top-level classifications of a ledger account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountCategory {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountCategory {
    pub const ALL: [AccountCategory; 5] = [
        AccountCategory::Asset,
        AccountCategory::Liability,
        AccountCategory::Equity,
        AccountCategory::Revenue,
        AccountCategory::Expense,
    ];

    /// Wire form, matches the stored ledger file ("ASSET", "LIABILITY", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::Asset => "ASSET",
            AccountCategory::Liability => "LIABILITY",
            AccountCategory::Equity => "EQUITY",
            AccountCategory::Revenue => "REVENUE",
            AccountCategory::Expense => "EXPENSE",
        }
    }

    /// Human label for selectors ("Assets", "Liabilities", ...)
    pub fn label(&self) -> &'static str {
        match self {
            AccountCategory::Asset => "Assets",
            AccountCategory::Liability => "Liabilities",
            AccountCategory::Equity => "Equity",
            AccountCategory::Revenue => "Revenue",
            AccountCategory::Expense => "Expenses",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalSide {
    Debit,
    Credit,
}

impl NormalSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalSide::Debit => "DEBIT",
            NormalSide::Credit => "CREDIT",
        }
    }
}

/// One entry in the chart of accounts.
///
/// `balance` is kept as the stored numeric string, not a parsed number: the
/// close-eligibility test parses it as f64 and compares to exactly zero, so
/// whatever precision quirks the stored form has are preserved as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: u32,
    pub account_number: String,
    pub account_name: String,
    #[serde(default)]
    pub account_description: String,
    pub normal_side: NormalSide,
    pub account_category: AccountCategory,
    pub balance: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure_reason: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Account {
    /// Picker entry text: "1000 - Cash (ASSET) - Balance: $0.00"
    pub fn picker_label(&self) -> String {
        format!(
            "{} - {} ({}) - Balance: {}",
            self.account_number,
            self.account_name,
            self.account_category.as_str(),
            format_balance(&self.balance),
        )
    }

    pub fn status_str(&self) -> &'static str {
        if self.is_closed {
            "CLOSED"
        } else if !self.is_active {
            "INACTIVE"
        } else {
            "OPEN"
        }
    }
}

/// Category narrowing for the account picker. Defaults to all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(AccountCategory),
}

impl CategoryFilter {
    pub fn matches(&self, account: &Account) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => account.account_category == *category,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "All Categories",
            CategoryFilter::Only(category) => category.label(),
        }
    }

    /// Cycle forward: All -> Assets -> ... -> Expenses -> All
    pub fn next(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(AccountCategory::ALL[0]),
            CategoryFilter::Only(category) => {
                let idx = AccountCategory::ALL.iter().position(|c| *c == category).unwrap_or(0);
                match AccountCategory::ALL.get(idx + 1) {
                    Some(next) => CategoryFilter::Only(*next),
                    None => CategoryFilter::All,
                }
            }
        }
    }

    /// Cycle backward: All -> Expenses -> ... -> Assets -> All
    pub fn prev(self) -> Self {
        match self {
            CategoryFilter::All => CategoryFilter::Only(AccountCategory::ALL[4]),
            CategoryFilter::Only(category) => {
                let idx = AccountCategory::ALL.iter().position(|c| *c == category).unwrap_or(0);
                match idx.checked_sub(1) {
                    Some(prev) => CategoryFilter::Only(AccountCategory::ALL[prev]),
                    None => CategoryFilter::All,
                }
            }
        }
    }
}

/// Zero test for a stored balance string.
///
/// Parses as f64 and compares to exactly zero, no epsilon. Malformed strings
/// fail the parse and count as non-zero, which silently excludes the account.
pub fn balance_is_zero(balance: &str) -> bool {
    balance.trim().parse::<f64>().map_or(false, |b| b == 0.0)
}

/// An account qualifies for closing when it is active, not already closed,
/// and its balance parses to exactly zero.
pub fn is_close_eligible(account: &Account) -> bool {
    account.is_active && !account.is_closed && balance_is_zero(&account.balance)
}

/// Accounts that can be closed, narrowed by the category filter.
pub fn close_eligible<'a>(accounts: &'a [Account], filter: CategoryFilter) -> Vec<&'a Account> {
    accounts
        .iter()
        .filter(|account| filter.matches(account) && is_close_eligible(account))
        .collect()
}

/// "$50000.00" for display; falls back to the raw string if it won't parse.
pub fn format_balance(balance: &str) -> String {
    match balance.trim().parse::<f64>() {
        Ok(value) => format!("${:.2}", value),
        Err(_) => balance.to_string(),
    }
}
