//! The rate-limit retry loop and its public entry points.
//!
//! Two families of entry points share one loop:
//! - interactive ([`fetch_with_rate_limit`]) takes a [`Notifier`] and
//!   notifies on each retry when `show_toast` is set;
//! - server ([`fetch_with_rate_limit_server`]) takes no notifier at all.
//!
//! Each has a cancellable twin driven by a [`CancellationToken`].

use std::convert::Infallible;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    notify::RATE_LIMIT_MESSAGE,
    retry::{is_rate_limit_error, resolve_delay},
    Cancelled, FetchRequest, Notifier, RetryConfig, SilentNotifier, Transport,
};

/// Fetches `url`, retrying `429` responses up to `max_retries` times.
///
/// Before each retry the notifier receives [`RATE_LIMIT_MESSAGE`] if
/// `config.show_toast` is set. The last response is returned as-is, even
/// when it is still a `429`. Transport errors are returned immediately.
pub async fn fetch_with_rate_limit<T, N>(
    transport: &T,
    notifier: &N,
    url: &str,
    request: &FetchRequest,
    config: Option<RetryConfig>,
) -> Result<T::Response, T::Error>
where
    T: Transport,
    N: Notifier + ?Sized,
{
    let config = config.unwrap_or_default();
    run_retry_loop(transport, Some(notifier), url, request, &config, Uninterruptible)
        .await
        .map_err(Halt::into_transport)
}

/// Same retry policy as [`fetch_with_rate_limit`] without any
/// notification channel. `show_toast` is ignored.
pub async fn fetch_with_rate_limit_server<T>(
    transport: &T,
    url: &str,
    request: &FetchRequest,
    config: Option<RetryConfig>,
) -> Result<T::Response, T::Error>
where
    T: Transport,
{
    let config = config.unwrap_or_default();
    run_retry_loop(
        transport,
        None::<&SilentNotifier>,
        url,
        request,
        &config,
        Uninterruptible,
    )
    .await
    .map_err(Halt::into_transport)
}

/// [`fetch_with_rate_limit`] that stops when `cancel` fires.
///
/// The token is checked before every attempt and raced against every retry
/// delay. Once cancelled, no further request is issued.
pub async fn fetch_with_rate_limit_cancellable<T, N>(
    transport: &T,
    notifier: &N,
    url: &str,
    request: &FetchRequest,
    config: Option<RetryConfig>,
    cancel: &CancellationToken,
) -> Result<T::Response, T::Error>
where
    T: Transport,
    T::Error: From<Cancelled>,
    N: Notifier + ?Sized,
{
    let config = config.unwrap_or_default();
    run_retry_loop(transport, Some(notifier), url, request, &config, cancel)
        .await
        .map_err(Halt::into_error)
}

/// [`fetch_with_rate_limit_server`] that stops when `cancel` fires.
pub async fn fetch_with_rate_limit_server_cancellable<T>(
    transport: &T,
    url: &str,
    request: &FetchRequest,
    config: Option<RetryConfig>,
    cancel: &CancellationToken,
) -> Result<T::Response, T::Error>
where
    T: Transport,
    T::Error: From<Cancelled>,
{
    let config = config.unwrap_or_default();
    run_retry_loop(
        transport,
        None::<&SilentNotifier>,
        url,
        request,
        &config,
        cancel,
    )
    .await
    .map_err(Halt::into_error)
}

enum Halt<E, R> {
    Transport(E),
    Interrupted(R),
}

impl<E> Halt<E, Infallible> {
    fn into_transport(self) -> E {
        match self {
            Halt::Transport(err) => err,
            Halt::Interrupted(never) => match never {},
        }
    }
}

impl<E: From<Cancelled>> Halt<E, Cancelled> {
    fn into_error(self) -> E {
        match self {
            Halt::Transport(err) => err,
            Halt::Interrupted(cancelled) => E::from(cancelled),
        }
    }
}

/// Where the loop may be interrupted: before an attempt and during a delay.
trait Interrupt {
    type Reason;

    fn check(&self) -> Result<(), Self::Reason>;

    async fn wait(&self, delay: Duration) -> Result<(), Self::Reason>;
}

struct Uninterruptible;

impl Interrupt for Uninterruptible {
    type Reason = Infallible;

    fn check(&self) -> Result<(), Infallible> {
        Ok(())
    }

    async fn wait(&self, delay: Duration) -> Result<(), Infallible> {
        sleep(delay).await;
        Ok(())
    }
}

impl Interrupt for &CancellationToken {
    type Reason = Cancelled;

    fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    async fn wait(&self, delay: Duration) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Cancelled),
            _ = sleep(delay) => Ok(()),
        }
    }
}

async fn run_retry_loop<T, N, I>(
    transport: &T,
    notifier: Option<&N>,
    url: &str,
    request: &FetchRequest,
    config: &RetryConfig,
    interrupt: I,
) -> Result<T::Response, Halt<T::Error, I::Reason>>
where
    T: Transport,
    N: Notifier + ?Sized,
    I: Interrupt,
{
    let mut attempt = 0usize;
    loop {
        interrupt.check().map_err(Halt::Interrupted)?;

        let response = transport
            .send(url, request)
            .await
            .map_err(Halt::Transport)?;

        if !is_rate_limit_error(&response) {
            return Ok(response);
        }

        if attempt >= config.max_retries {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                url,
                attempts = attempt + 1,
                "rate limit persisted after retry budget was spent"
            );
            return Ok(response);
        }

        let delay = resolve_delay(&response, config);
        drop(response);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            url,
            attempt = attempt + 1,
            max_retries = config.max_retries,
            "rate limited, retrying after {} ms",
            delay.as_millis()
        );

        if config.show_toast {
            if let Some(notifier) = notifier {
                notifier.notify(RATE_LIMIT_MESSAGE);
            }
        }

        interrupt.wait(delay).await.map_err(Halt::Interrupted)?;
        attempt += 1;
    }
}
