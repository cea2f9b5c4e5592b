use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse};

use crate::error::{Error, Result};
use crate::request::Request;
use crate::timeout::TimeoutConfig;

/// Transport trait for HTTP operations
///
/// This trait abstracts the layer that puts a materialized [`Request`] on the
/// wire, so the executor can be driven by something other than reqwest in
/// tests or custom deployments.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response
    async fn send(&self, request: Request, config: &TransportConfig) -> Result<ReqwestResponse>;

    /// Get the transport name/type
    fn name(&self) -> &str;
}

/// Per-call transport settings
///
/// Cloned from the client defaults for every call and then adjusted by
/// request options, so one call never changes the settings of another.
/// Only the overall deadline is read per call; `connect_timeout` is fixed on
/// the connector when the client is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Timeouts for this call
    pub timeouts: TimeoutConfig,
}

impl TransportConfig {
    /// Create a transport config from timeouts
    pub fn new(timeouts: TimeoutConfig) -> Self {
        Self { timeouts }
    }

    /// The deadline for this call, if any
    pub fn deadline(&self) -> Option<Duration> {
        self.timeouts.deadline()
    }
}

/// Default HTTP transport implementation using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    connect_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a new HTTP transport around an existing reqwest client
    pub fn new(client: ReqwestClient) -> Self {
        Self {
            client,
            connect_timeout: None,
        }
    }

    /// Start configuring the underlying connection pool
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &ReqwestClient {
        &self.client
    }

    /// Get the connect timeout the connector was built with, if known
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        // Only fails when the TLS backend cannot initialize
        HttpTransportBuilder::new()
            .build()
            .unwrap_or_else(|_| Self::new(ReqwestClient::new()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request, config: &TransportConfig) -> Result<ReqwestResponse> {
        let deadline = config.deadline();
        let request = request.into_reqwest_request(deadline);

        self.client.execute(request).await.map_err(|e| match deadline {
            Some(duration) if e.is_timeout() => Error::timeout(duration),
            _ => Error::Network(e),
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

/// Builder for the connection settings of an [`HttpTransport`]
#[derive(Debug)]
pub struct HttpTransportBuilder {
    connect_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
    tcp_keep_alive: Option<Duration>,
    tcp_nodelay: bool,
    redirect: Policy,
}

impl HttpTransportBuilder {
    /// Create a new transport builder
    pub fn new() -> Self {
        Self {
            connect_timeout: TimeoutConfig::default().connect_timeout,
            pool_max_idle_per_host: usize::MAX,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            tcp_keep_alive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
            redirect: Policy::default(),
        }
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum idle connections kept per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set how long idle connections are kept
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set TCP keep-alive
    pub fn tcp_keep_alive(mut self, keep_alive: Option<Duration>) -> Self {
        self.tcp_keep_alive = keep_alive;
        self
    }

    /// Set TCP nodelay
    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.tcp_nodelay = nodelay;
        self
    }

    /// Set the redirect policy
    pub fn redirect(mut self, policy: Policy) -> Self {
        self.redirect = policy;
        self
    }

    /// Build the transport
    pub fn build(self) -> Result<HttpTransport> {
        let mut builder = ReqwestClient::builder()
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .tcp_keepalive(self.tcp_keep_alive)
            .tcp_nodelay(self.tcp_nodelay)
            .redirect(self.redirect);

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let client = builder.build().map_err(Error::Network)?;
        Ok(HttpTransport {
            client,
            connect_timeout: self.connect_timeout,
        })
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
