use portal_client::domain::AccountSummary;
use serde::Deserialize;

use crate::transform::normalize::parse_iso_date;

/// Response of the linked-accounts endpoint:
///
/// ```json
/// {
///   "linkedAccounts": [{
///     "customerAccountId": "XXXXXXXXXXXX",
///     "customerNumber": "XXXXXXXX",
///     "customerAccountBalance": {
///       "balanceAmount": 0.00,
///       "dueDate": "2025-12-29",
///       "pastDueAmount": 0.00,
///       "currentAmountDue": 0.00
///     },
///     "status": "Active",
///     "ldc": "OH"
///   }],
///   "count": 1
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccounts {
    #[serde(default)]
    pub linked_accounts: Vec<LinkedAccount>,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    customer_account_id: Option<String>,
    customer_number: Option<String>,
    #[serde(default)]
    customer_account_balance: AccountBalance,
    status: Option<String>,
    ldc: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountBalance {
    balance_amount: Option<f64>,
    current_amount_due: Option<f64>,
    past_due_amount: Option<f64>,
    due_date: Option<String>,
}

impl From<LinkedAccount> for AccountSummary {
    fn from(a: LinkedAccount) -> Self {
        let balance = a.customer_account_balance;
        let due_date = balance
            .due_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .and_then(|d| match parse_iso_date(d) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unparseable account due date");
                    None
                }
            });

        AccountSummary {
            account_id: a.customer_account_id,
            customer_number: a.customer_number,
            status: a.status,
            ldc: a.ldc,
            balance_usd: balance.balance_amount,
            current_amount_due_usd: balance.current_amount_due,
            past_due_usd: balance.past_due_amount,
            due_date,
        }
    }
}

impl LinkedAccounts {
    /// Summary of the first linked account; the login is assumed to own one.
    pub fn into_summary(self) -> Option<AccountSummary> {
        if self.linked_accounts.len() > 1 {
            tracing::debug!(
                accounts = self.linked_accounts.len(),
                "multiple linked accounts, using the first"
            );
        }
        self.linked_accounts.into_iter().next().map(AccountSummary::from)
    }
}
