use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode,
};

use crate::FetchError;

/// Response surface the retry policy needs: a status code and header lookup.
pub trait HttpResponse {
    /// HTTP status of the response.
    fn status(&self) -> StatusCode;

    /// Value of the named header, if present and valid UTF-8.
    ///
    /// Header names are matched case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;
}

impl HttpResponse for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }
}

/// Sends one request and yields one response.
///
/// The retry functions take a transport by reference and call
/// [`Transport::send`] exactly once per attempt, reusing the same
/// [`FetchRequest`].
pub trait Transport {
    /// Response produced by this transport.
    type Response: HttpResponse;
    /// Transport-level failure. Never retried.
    type Error;

    /// Issues `request` against `url`.
    fn send(
        &self,
        url: &str,
        request: &FetchRequest,
    ) -> impl Future<Output = std::result::Result<Self::Response, Self::Error>> + Send;
}

impl Transport for reqwest::Client {
    type Response = reqwest::Response;
    type Error = FetchError;

    fn send(
        &self,
        url: &str,
        request: &FetchRequest,
    ) -> impl Future<Output = std::result::Result<Self::Response, Self::Error>> + Send {
        let mut builder = self
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        async move { builder.send().await.map_err(FetchError::Transport) }
    }
}

/// Request options forwarded unchanged on every attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional raw request body.
    pub body: Option<Vec<u8>>,
    /// Optional per-attempt timeout.
    pub timeout: Option<Duration>,
}

impl FetchRequest {
    /// Builds a request with the given method and no headers or body.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// `GET` request.
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// `POST` request.
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Appends a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self::get()
    }
}

// Header values may carry credentials; only names are printed.
impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.keys().map(HeaderName::as_str).collect();
        f.debug_struct("FetchRequest")
            .field("method", &self.method)
            .field("headers", &header_names)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("timeout", &self.timeout)
            .finish()
    }
}
