// API client module: a small blocking HTTP client for the photo search
// endpoint. It builds one authenticated GET, classifies the response and
// hands typed results (or a typed error) back to the caller. Nothing in
// here prints, logs or exits; presentation is the `ui` module's job.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};

use crate::models::SearchResult;
use crate::rate_limit::RateLimitInfo;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How often a waiting request checks its cancel token.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Everything needed for one search call.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub api_key: String,
    pub base_url: String,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        SearchRequest {
            query: query.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Full `/search` URL with the query term encoded as a parameter.
    fn url(&self) -> Result<Url, SearchError> {
        let endpoint = format!("{}/search", self.base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, &[("query", self.query.as_str())])
            .map_err(|e| SearchError::InvalidInput(format!("base URL {:?}: {}", self.base_url, e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request failed: {0}")]
    Transport(#[source] BoxError),

    #[error("too many requests, please try again later")]
    RateLimited(RateLimitInfo),

    #[error("unexpected status code {status}")]
    UnexpectedStatus { status: u16, rate_limit: RateLimitInfo },

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    /// Rate-limit headers seen on the failing response, if one arrived.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        match self {
            SearchError::RateLimited(info) => Some(info),
            SearchError::UnexpectedStatus { rate_limit, .. } => Some(rate_limit),
            _ => None,
        }
    }
}

/// Shared flag used to abandon an in-flight request from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A response whose body has not been read yet.
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Box<dyn Read + Send>,
}

/// Why a transport could not produce a response.
#[derive(Debug)]
pub enum SendError {
    Cancelled,
    Failed(BoxError),
}

impl From<SendError> for SearchError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Cancelled => SearchError::Cancelled,
            SendError::Failed(cause) => SearchError::Transport(cause),
        }
    }
}

/// The network seam of the client. The default implementation is
/// [`HttpTransport`]; tests plug in their own.
pub trait Transport {
    fn get(
        &self,
        url: &Url,
        authorization: &HeaderValue,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, SendError>;
}

/// Blocking reqwest transport. Each request runs on a worker thread so the
/// caller can give up on it when the cancel token fires. The worker is
/// detached, not killed: after a cancel it lingers until reqwest's timeout,
/// which is fine for a one-shot CLI.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, SearchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::Transport(Box::new(e)))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &Url,
        authorization: &HeaderValue,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, SendError> {
        let request = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, authorization.clone());
        let res = wait_or_cancel(cancel, move || request.send())?
            .map_err(|e| SendError::Failed(Box::new(e)))?;

        Ok(HttpResponse {
            status: res.status(),
            headers: res.headers().clone(),
            body: Box::new(res),
        })
    }
}

/// Run `job` on a worker thread and wait for it, giving up as soon as
/// `cancel` fires. An abandoned worker is left to finish on its own; with
/// reqwest that means until the transport's timeout runs out.
fn wait_or_cancel<R, F>(cancel: &CancelToken, job: F) -> Result<R, SendError>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(SendError::Cancelled);
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone if the caller cancelled; nothing to do then.
        let _ = tx.send(job());
    });

    loop {
        match rx.recv_timeout(CANCEL_POLL) {
            Ok(out) => return Ok(out),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    return Err(SendError::Cancelled);
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(SendError::Failed("worker thread exited early".into()))
            }
        }
    }
}

/// Read the whole body off the worker thread so a stalled stream can still
/// be cancelled. Read failures are transport failures, not decode ones.
fn read_body(mut body: Box<dyn Read + Send>, cancel: &CancelToken) -> Result<Vec<u8>, SendError> {
    wait_or_cancel(cancel, move || {
        let mut buf = Vec::new();
        body.read_to_end(&mut buf).map(|_| buf)
    })?
    .map_err(|e| SendError::Failed(Box::new(e)))
}

/// Search client. Holds no per-call state, so one instance can serve any
/// number of callers.
#[derive(Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Client using the transport's default timeout.
    pub fn new() -> Result<Self, SearchError> {
        Ok(ApiClient::with_transport(HttpTransport::new(None)?))
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, SearchError> {
        Ok(ApiClient::with_transport(HttpTransport::new(Some(timeout))?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        ApiClient { transport }
    }

    /// Run one search and return the first page of results together with
    /// the rate-limit headers of the response.
    pub fn search(
        &self,
        req: &SearchRequest,
    ) -> Result<(SearchResult, RateLimitInfo), SearchError> {
        self.search_with_cancel(req, &CancelToken::new())
    }

    /// Like [`ApiClient::search`], but returns [`SearchError::Cancelled`]
    /// as soon as `cancel` fires.
    pub fn search_with_cancel(
        &self,
        req: &SearchRequest,
        cancel: &CancelToken,
    ) -> Result<(SearchResult, RateLimitInfo), SearchError> {
        if req.query.is_empty() {
            return Err(SearchError::InvalidInput("search query is empty".into()));
        }
        if req.api_key.is_empty() {
            return Err(SearchError::InvalidInput("API key is empty".into()));
        }
        let authorization = HeaderValue::from_str(&req.api_key).map_err(|_| {
            SearchError::InvalidInput("API key contains characters not allowed in a header".into())
        })?;
        let url = req.url()?;

        let res = self.transport.get(&url, &authorization, cancel)?;

        // Captured before the status check so error variants carry them too.
        let rate_limit = RateLimitInfo::from_headers(&res.headers);

        match res.status {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(SearchError::RateLimited(rate_limit)),
            status => {
                return Err(SearchError::UnexpectedStatus {
                    status: status.as_u16(),
                    rate_limit,
                })
            }
        }

        let body = read_body(res.body, cancel)?;
        let result: SearchResult = serde_json::from_slice(&body).map_err(SearchError::Decode)?;
        Ok((result, rate_limit))
    }
}
