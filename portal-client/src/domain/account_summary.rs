use time::Date;

/// Balance information for the first account linked to the portal login.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AccountSummary {
    pub account_id: Option<String>,
    pub customer_number: Option<String>,
    pub status: Option<String>,
    pub ldc: Option<String>,
    pub balance_usd: Option<f64>,
    pub current_amount_due_usd: Option<f64>,
    /// As reported by the portal; may be negative.
    pub past_due_usd: Option<f64>,
    pub due_date: Option<Date>,
}
