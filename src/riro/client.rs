// src/riro/client.rs
use reqwest::header;
use std::time::Duration;

use crate::riro::models::{DbInfo, LoginResponse};
use crate::utils::error::ClientError;

const DEFAULT_BASE_URL: &str = "https://kdd.riroschool.kr";
// Be gentle with the school's server between requests.
const DEFAULT_REQUEST_DELAY_MS: u64 = 150;

/// Anything that can hand back the raw HTML of one board page.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, path: &str, info: &DbInfo, page: usize) -> Result<String, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), request_delay_ms: DEFAULT_REQUEST_DELAY_MS }
    }
}

impl ClientConfig {
    /// Reads `RIRO_BASE_URL` and `RIRO_REQUEST_DELAY_MS`, keeping defaults
    /// for anything unset or unreadable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("RIRO_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(raw) = std::env::var("RIRO_REQUEST_DELAY_MS") {
            match raw.parse() {
                Ok(ms) => config.request_delay_ms = ms,
                Err(_) => tracing::warn!("Ignoring unreadable RIRO_REQUEST_DELAY_MS: {}", raw),
            }
        }
        config
    }
}

/// Session against one school's Riro site.
pub struct RiroClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: Option<String>,
}

impl RiroClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config, token: None })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn page_url(&self, path: &str, info: &DbInfo, page: usize) -> String {
        format!(
            "{}/{}.php?db={}&cate={}&t_doc={}&page={}",
            self.config.base_url,
            path,
            info.id.code(),
            info.category,
            info.category,
            page
        )
    }

    async fn pace(&self) {
        tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
    }

    /// Logs in with the student's id and password and keeps the session token.
    pub async fn login(&mut self, id: &str, password: &str) -> Result<(), ClientError> {
        let url = format!("{}/ajax.php", self.config.base_url);
        let form = [
            ("app", "user"),
            ("userType", "1"),
            ("mode", "login"),
            ("id", id),
            ("pw", password),
            ("deeplink", ""),
            ("redirect_link", ""),
        ];

        tracing::info!("Logging in as {}", id);
        self.pace().await;

        let response = self
            .http
            .post(&url)
            .header(header::ORIGIN, &self.config.base_url)
            .header(header::REFERER, format!("{}/user.php?action=signin", self.config.base_url))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Login request failed with status {}", status);
            return Err(ClientError::Login(format!("Login request failed with code {}", status)));
        }

        let body = response.text().await?;
        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(format!("login response: {}", e)))?;

        if !login.is_success() {
            tracing::warn!("Login rejected with code {}", login.code);
            return Err(ClientError::Login(login.message));
        }
        if login.data.locked {
            tracing::warn!("Account {} is locked", id);
        }

        self.token = Some(login.token);
        tracing::debug!("Login successful");
        Ok(())
    }
}

impl PageSource for RiroClient {
    async fn fetch_page(&self, path: &str, info: &DbInfo, page: usize) -> Result<String, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;
        let url = self.page_url(path, info, page);

        tracing::info!("Requesting table: {}", url);
        self.pace().await;

        let response = self
            .http
            .get(&url)
            .header(header::COOKIE, format!("cookie_token={}", token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(ClientError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
