use std::time::Duration;

use reqwest::{header, redirect, Client, Response, StatusCode};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use portal_client::domain::AccountSummary;

use super::{
    PortalError, ENDPOINT_ACCOUNT_SUMMARY, ENDPOINT_BILLING_HISTORY_CSV, ENDPOINT_LOGIN,
    ENDPOINT_PAYMENT_HISTORY_CSV, ENDPOINT_USAGE_HISTORY_CSV,
};
use crate::config::PortalConfig;
use crate::sources::{csv_feed, CsvRow, LinkedAccounts};

/// Cookie-backed session for one portal login.
///
/// Redirects are never followed: a redirect is how the portal signals a
/// successful login, and on any other request it means the session is gone.
#[derive(Clone)]
pub struct PortalClient {
    base_url: String,
    state_code: String,
    username: String,
    password: String,
    client: Client,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url)
            .field("state_code", &self.state_code)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    pub fn new(
        base_url: impl Into<String>,
        state_code: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PortalError> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state_code: state_code.into(),
            username: username.into(),
            password: password.into(),
            client,
        })
    }

    pub fn from_config(cfg: &PortalConfig) -> Result<Self, PortalError> {
        let endpoint = cfg.endpoint().map_err(|e| PortalError::Config(e.to_string()))?;
        let password = cfg.password().map_err(|e| PortalError::Config(e.to_string()))?;
        info!(base_url = %endpoint.base_url, state = %endpoint.state_code, "configured portal client");
        Self::new(
            endpoint.base_url,
            endpoint.state_code,
            cfg.username.clone(),
            password,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Form login. Succeeds only when the portal answers with a redirect that
    /// sets a session cookie.
    pub async fn authenticate(&self) -> Result<(), PortalError> {
        let form = [
            ("ReturnUrl", ""),
            ("Username", self.username.as_str()),
            ("Password", self.password.as_str()),
            ("rememberme", "true"),
        ];

        let response = self.client.post(self.url(ENDPOINT_LOGIN)).form(&form).send().await?;
        let status = response.status();

        if !status.is_redirection() {
            warn!(%status, "portal login did not redirect");
            return Err(PortalError::Auth(format!(
                "login answered {status} instead of a redirect; check credentials"
            )));
        }

        if response.headers().get(header::SET_COOKIE).is_none() {
            warn!(%status, "portal login redirect carried no session cookie");
            return Err(PortalError::Auth("login redirect did not set a session cookie".to_string()));
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        debug!(location, "authenticated with portal");
        Ok(())
    }

    async fn check_status(response: Response, feed: &'static str) -> Result<Response, PortalError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.is_redirection() || status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, feed, "portal session rejected");
            return Err(PortalError::Auth(format!("{feed} request answered {status}; session expired")));
        }

        let message = response.text().await.unwrap_or_default();
        Err(PortalError::Status {
            feed,
            status: status.as_u16(),
            message,
        })
    }

    async fn get_csv(&self, endpoint: &str, feed: &'static str) -> Result<Vec<CsvRow>, PortalError> {
        let response = self.client.get(self.url(endpoint)).send().await?;
        let body = Self::check_status(response, feed).await?.text().await?;

        let rows = csv_feed::parse_feed(&body).map_err(|e| PortalError::Decode {
            feed,
            reason: e.to_string(),
        })?;
        debug!(feed, records = rows.len(), "retrieved CSV feed");
        Ok(rows)
    }

    /// Usage history, newest billing period first.
    pub async fn usage_history(&self) -> Result<Vec<CsvRow>, PortalError> {
        self.get_csv(ENDPOINT_USAGE_HISTORY_CSV, "usage history").await
    }

    pub async fn billing_history(&self) -> Result<Vec<CsvRow>, PortalError> {
        self.get_csv(ENDPOINT_BILLING_HISTORY_CSV, "billing history").await
    }

    pub async fn payment_history(&self) -> Result<Vec<CsvRow>, PortalError> {
        self.get_csv(ENDPOINT_PAYMENT_HISTORY_CSV, "payment history").await
    }

    /// Balance and due date of the first linked account, `None` when the login
    /// has no linked accounts.
    pub async fn account_summary(&self) -> Result<Option<AccountSummary>, PortalError> {
        let feed = "account summary";
        let diag_id = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string();

        let response = self
            .client
            .get(self.url(ENDPOINT_ACCOUNT_SUMMARY))
            .query(&[
                ("query", ""),
                ("limit", "10"),
                ("ascending", "1"),
                ("page", "1"),
                ("byColumn", "0"),
                ("diagId", diag_id.as_str()),
            ])
            .header("x-nis-ldc", &self.state_code)
            .header("adrum", "isAjax:true")
            .send()
            .await?;

        let body = Self::check_status(response, feed).await?.text().await?;
        let accounts: LinkedAccounts = serde_json::from_str(&body).map_err(|e| PortalError::Decode {
            feed,
            reason: e.to_string(),
        })?;
        debug!(accounts = accounts.count, "retrieved account summary");
        Ok(accounts.into_summary())
    }
}
