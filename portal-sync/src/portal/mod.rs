//! Authenticated session against a NiSource customer portal.

pub mod client;

pub use client::PortalClient;

pub const ENDPOINT_LOGIN: &str = "/login";
pub const ENDPOINT_USAGE_HISTORY_CSV: &str = "/UsageHistoryAllCsv/0";
pub const ENDPOINT_BILLING_HISTORY_CSV: &str = "/BillingHistoryAllCsv";
pub const ENDPOINT_PAYMENT_HISTORY_CSV: &str = "/PaymentHistoryAllCsv";
pub const ENDPOINT_ACCOUNT_SUMMARY: &str = "/api/LinkedAccounts/1.0";

#[derive(thiserror::Error, Debug)]
pub enum PortalError {
    /// Credentials rejected or session gone; retrying within a cycle won't help.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("portal returned {status} for {feed}: {message}")]
    Status {
        feed: &'static str,
        status: u16,
        message: String,
    },
    #[error("failed to decode {feed} feed: {reason}")]
    Decode { feed: &'static str, reason: String },
    #[error("portal client configuration error: {0}")]
    Config(String),
}

impl PortalError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}
