use std::time::Duration;

use reqwest::{header, StatusCode};

use crate::{HttpResponse, RetryConfig};

/// Delay reported by [`get_retry_delay`] when the server gives no usable hint.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Returns `true` iff the response status is `429 Too Many Requests`.
pub fn is_rate_limit_error<R: HttpResponse + ?Sized>(response: &R) -> bool {
    response.status() == StatusCode::TOO_MANY_REQUESTS
}

/// Server-advised retry delay in whole seconds.
///
/// Reads `Retry-After` as delay-seconds: ASCII digits only, no sign.
/// Missing or malformed values (including HTTP-date forms) fall back to
/// [`DEFAULT_RETRY_AFTER_SECS`].
pub fn get_retry_delay<R: HttpResponse + ?Sized>(response: &R) -> u64 {
    retry_after_secs(response).unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn retry_after_secs<R: HttpResponse + ?Sized>(response: &R) -> Option<u64> {
    let raw = response.header(header::RETRY_AFTER.as_str())?.trim();
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Delay before the next attempt: `Retry-After` seconds when usable,
/// otherwise the configured `base_delay_ms`.
pub(crate) fn resolve_delay<R: HttpResponse + ?Sized>(
    response: &R,
    config: &RetryConfig,
) -> Duration {
    retry_after_secs(response)
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.base_delay())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;

    use super::{get_retry_delay, is_rate_limit_error, resolve_delay, DEFAULT_RETRY_AFTER_SECS};
    use crate::{HttpResponse, RetryConfig};

    struct Stub {
        status: StatusCode,
        retry_after: Option<&'static str>,
    }

    impl Stub {
        fn new(status: u16, retry_after: Option<&'static str>) -> Self {
            Self {
                status: StatusCode::from_u16(status).expect("valid status"),
                retry_after,
            }
        }
    }

    impl HttpResponse for Stub {
        fn status(&self) -> StatusCode {
            self.status
        }

        fn header(&self, name: &str) -> Option<&str> {
            if name.eq_ignore_ascii_case("retry-after") {
                self.retry_after
            } else {
                None
            }
        }
    }

    #[test]
    fn only_429_is_rate_limited() {
        assert!(is_rate_limit_error(&Stub::new(429, None)));
        for status in [200, 400, 404, 500, 503] {
            assert!(!is_rate_limit_error(&Stub::new(status, None)), "{status}");
        }
    }

    #[test]
    fn retry_delay_defaults_to_sixty_seconds() {
        assert_eq!(get_retry_delay(&Stub::new(429, None)), DEFAULT_RETRY_AFTER_SECS);
        assert_eq!(DEFAULT_RETRY_AFTER_SECS, 60);
    }

    #[test]
    fn retry_delay_reads_header_seconds() {
        assert_eq!(get_retry_delay(&Stub::new(429, Some("120"))), 120);
        assert_eq!(get_retry_delay(&Stub::new(429, Some(" 5 "))), 5);
        assert_eq!(get_retry_delay(&Stub::new(429, Some("0"))), 0);
    }

    #[test]
    fn retry_delay_falls_back_on_malformed_header() {
        for raw in ["soon", "-3", "+5", "1.5", "", "Wed, 21 Oct 2015 07:28:00 GMT"] {
            assert_eq!(
                get_retry_delay(&Stub::new(429, Some(raw))),
                DEFAULT_RETRY_AFTER_SECS,
                "{raw:?}"
            );
        }
    }

    #[test]
    fn resolve_delay_converts_header_seconds_and_base_millis() {
        let config = RetryConfig::default().base_delay_ms(250);
        assert_eq!(
            resolve_delay(&Stub::new(429, Some("2")), &config),
            Duration::from_secs(2)
        );
        assert_eq!(
            resolve_delay(&Stub::new(429, None), &config),
            Duration::from_millis(250)
        );
        assert_eq!(
            resolve_delay(&Stub::new(429, Some("later")), &config),
            Duration::from_millis(250)
        );
        assert_eq!(
            resolve_delay(&Stub::new(429, Some("+2")), &config),
            Duration::from_millis(250)
        );
    }
}
