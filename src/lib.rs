//! `clippymap-fetch` is a rate-limit-aware async HTTP fetch client.
//!
//! Requests that come back `429 Too Many Requests` are retried after the
//! server's `Retry-After` hint (whole seconds) or the configured base delay
//! (milliseconds), up to a bounded number of retries:
//! - [`fetch_with_rate_limit`] for interactive contexts, with a [`Notifier`]
//! - [`fetch_with_rate_limit_server`] for contexts with no user channel
//! - [`RateLimitedFetchClient`] wrapping `reqwest` for both
//!
//! Any other status, including a final `429`, is returned unchanged.
//! Transport failures are never retried.

mod client;
mod config;
mod error;
mod fetch;
mod notify;
mod retry;
mod transport;

pub use client::RateLimitedFetchClient;
pub use config::{RetryConfig, ENV_BASE_DELAY_MS, ENV_MAX_RETRIES, ENV_SHOW_TOAST};
pub use error::{Cancelled, FetchError};
pub use fetch::{
    fetch_with_rate_limit, fetch_with_rate_limit_cancellable, fetch_with_rate_limit_server,
    fetch_with_rate_limit_server_cancellable,
};
pub use notify::{Notifier, SilentNotifier, RATE_LIMIT_MESSAGE};
pub use retry::{get_retry_delay, is_rate_limit_error, DEFAULT_RETRY_AFTER_SECS};
pub use transport::{FetchRequest, HttpResponse, Transport};

pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, FetchError>;
