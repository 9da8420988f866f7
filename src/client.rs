use tokio_util::sync::CancellationToken;

use crate::{
    fetch::{
        fetch_with_rate_limit, fetch_with_rate_limit_cancellable, fetch_with_rate_limit_server,
        fetch_with_rate_limit_server_cancellable,
    },
    FetchRequest, Notifier, Result, RetryConfig,
};

/// `reqwest`-backed HTTP client that retries rate-limited (`429`) responses.
///
/// Every call owns its own retry state, so one client can be shared by
/// any number of concurrent tasks.
#[derive(Clone, Debug, Default)]
pub struct RateLimitedFetchClient {
    http: reqwest::Client,
    config: RetryConfig,
}

impl RateLimitedFetchClient {
    /// Creates a client with a fresh `reqwest::Client` and default retry config.
    pub fn new() -> Self {
        Self::with_http(reqwest::Client::new())
    }

    /// Wraps an existing `reqwest::Client`, keeping its connection pool,
    /// TLS and default headers.
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            config: RetryConfig::default(),
        }
    }

    /// Creates a client whose retry config is read from the environment.
    ///
    /// See [`RetryConfig::from_env`] for the variables read.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clippymap_fetch::RateLimitedFetchClient;
    ///
    /// let client = RateLimitedFetchClient::from_env().expect("invalid CLIPPYMAP_FETCH_* vars");
    /// ```
    pub fn from_env() -> Result<Self> {
        Ok(Self::new().with_config(RetryConfig::from_env()?))
    }

    /// Replaces the default retry config used by every call.
    pub fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Default retry config used by this client.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Sends a `GET` to `url` without user notifications.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.fetch(url, &FetchRequest::get()).await
    }

    /// Sends `request` to `url` without user notifications.
    ///
    /// A final `429` is returned as a normal response; only transport
    /// failures become errors.
    pub async fn fetch(&self, url: &str, request: &FetchRequest) -> Result<reqwest::Response> {
        self.fetch_with_config(url, request, self.config.clone())
            .await
    }

    /// Like [`RateLimitedFetchClient::fetch`], with a per-call retry config.
    pub async fn fetch_with_config(
        &self,
        url: &str,
        request: &FetchRequest,
        config: RetryConfig,
    ) -> Result<reqwest::Response> {
        fetch_with_rate_limit_server(&self.http, url, request, Some(config)).await
    }

    /// Sends `request` to `url`, notifying `notifier` on each retry when
    /// `show_toast` is enabled.
    pub async fn fetch_with_notifier<N>(
        &self,
        url: &str,
        request: &FetchRequest,
        notifier: &N,
    ) -> Result<reqwest::Response>
    where
        N: Notifier + ?Sized,
    {
        fetch_with_rate_limit(&self.http, notifier, url, request, Some(self.config.clone())).await
    }

    /// Like [`RateLimitedFetchClient::fetch`], giving up with
    /// [`crate::FetchError::Cancelled`] once `cancel` fires.
    pub async fn fetch_cancellable(
        &self,
        url: &str,
        request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        fetch_with_rate_limit_server_cancellable(
            &self.http,
            url,
            request,
            Some(self.config.clone()),
            cancel,
        )
        .await
    }

    /// Interactive twin of [`RateLimitedFetchClient::fetch_cancellable`].
    pub async fn fetch_with_notifier_cancellable<N>(
        &self,
        url: &str,
        request: &FetchRequest,
        notifier: &N,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response>
    where
        N: Notifier + ?Sized,
    {
        fetch_with_rate_limit_cancellable(
            &self.http,
            notifier,
            url,
            request,
            Some(self.config.clone()),
            cancel,
        )
        .await
    }
}
