use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::HeaderMap;
use reqwest::redirect::Policy;
use url::Url;

use crate::error::Result;
use crate::executor::Executor;
use crate::hook::Hook;
use crate::option::{apply_all, RequestOption};
use crate::request::{parse_method, DraftRequest, RequestBuilder};
use crate::response::Response;
use crate::timeout::TimeoutConfig;
use crate::transport::{HttpTransport, HttpTransportBuilder, Transport, TransportConfig};

/// Main HTTP client for Requesty
///
/// A client is a session: it holds the transport, default headers, default
/// timeouts and hooks shared by every call made through it. Each call works
/// on its own copy of the transport settings, so clones of one client can be
/// used concurrently without coordination.
///
/// # Examples
///
/// ```rust,no_run
/// use requesty::{Client, RequestOption};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new();
///     let response = client
///         .request("get", "https://httpbin.org/get", vec![RequestOption::param("a", "1")])
///         .await?;
///     println!("Status: {}", response.status());
///
///     let response = client.post("https://httpbin.org/post").form("k", "v").send().await?;
///     println!("Body: {}", response.text());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    executor: Executor,
    default_headers: Arc<HeaderMap>,
    timeout_config: TimeoutConfig,
}

impl Client {
    /// Create a new client with default settings
    pub fn new() -> Self {
        let timeout_config = TimeoutConfig::default();
        let transport = HttpTransport::builder()
            .connect_timeout(timeout_config.connect_timeout)
            .build()
            .unwrap_or_default();
        Self {
            executor: Executor::new(Arc::new(transport)),
            default_headers: Arc::new(HeaderMap::new()),
            timeout_config,
        }
    }

    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Add a hook observing every call made through this client
    pub fn add_hook<H>(&mut self, hook: H)
    where
        H: Hook + 'static,
    {
        self.executor.add_hook(Arc::new(hook));
    }

    /// Perform one call
    ///
    /// The method is matched case-insensitively against GET, POST, PUT,
    /// DELETE, OPTIONS, PATCH and HEAD. Options are applied in order; any
    /// failure before dispatch aborts the call without network I/O.
    pub async fn request<I>(&self, method: &str, url: impl AsRef<str>, options: I) -> Result<Response>
    where
        I: IntoIterator<Item = RequestOption>,
    {
        let method = parse_method(method)?;
        let url = Url::parse(url.as_ref())?;

        let mut draft = DraftRequest::new(method, url);
        for name in self.default_headers.keys() {
            let headers = draft.headers_mut();
            headers.remove(name);
            for value in self.default_headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        let mut config = TransportConfig::new(self.timeout_config.clone());
        apply_all(options, &mut draft, &mut config)?;

        let request = draft.materialize()?;
        self.executor.execute(request, config).await
    }

    /// Create a GET request
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "GET", url)
    }

    /// Create a POST request
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "POST", url)
    }

    /// Create a PUT request
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "PUT", url)
    }

    /// Create a DELETE request
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "DELETE", url)
    }

    /// Create a PATCH request
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "PATCH", url)
    }

    /// Create a HEAD request
    pub fn head(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "HEAD", url)
    }

    /// Create an OPTIONS request
    pub fn options(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), "OPTIONS", url)
    }

    /// Get the default timeout configuration
    pub fn timeout_config(&self) -> &TimeoutConfig {
        &self.timeout_config
    }

    /// Get the default headers
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Get the transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        self.executor.transport()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("executor", &self.executor)
            .field("default_headers", &self.default_headers)
            .field("timeout_config", &self.timeout_config)
            .finish()
    }
}

/// Convenience methods for common JSON round trips
impl Client {
    /// Send a GET request and return JSON
    pub async fn get_json<T>(&self, url: impl Into<String>) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.get(url).send_json().await
    }

    /// Send a POST request with JSON body and return JSON
    pub async fn post_json<T, U>(&self, url: impl Into<String>, body: &T) -> Result<U>
    where
        T: serde::Serialize + ?Sized,
        U: serde::de::DeserializeOwned,
    {
        self.post(url).json(body)?.send_json().await
    }

    /// Send a PUT request with JSON body and return JSON
    pub async fn put_json<T, U>(&self, url: impl Into<String>, body: &T) -> Result<U>
    where
        T: serde::Serialize + ?Sized,
        U: serde::de::DeserializeOwned,
    {
        self.put(url).json(body)?.send_json().await
    }
}

/// Builder for creating HTTP clients with custom configuration
///
/// # Examples
///
/// ```rust
/// use requesty::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .timeout(Duration::from_secs(30))
///     .user_agent("MyApp/1.0")
///     .unwrap()
///     .max_redirects(3)
///     .build()
///     .unwrap();
/// # let _ = client;
/// ```
pub struct ClientBuilder {
    timeout_config: TimeoutConfig,
    default_headers: HeaderMap,
    transport_builder: HttpTransportBuilder,
    transport: Option<Arc<dyn Transport>>,
    hooks: Vec<Arc<dyn Hook>>,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self {
            timeout_config: TimeoutConfig::default(),
            default_headers: HeaderMap::new(),
            transport_builder: HttpTransportBuilder::new(),
            transport: None,
            hooks: Vec::new(),
        }
    }

    /// Set the default deadline for every call; zero means none
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_config = self.timeout_config.timeout(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_config = self.timeout_config.connect_timeout(timeout);
        self
    }

    /// Replace the whole timeout configuration
    pub fn timeout_config(mut self, config: TimeoutConfig) -> Self {
        self.timeout_config = config;
        self
    }

    /// Set a default header for all requests
    pub fn default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = name.parse::<HeaderName>()?;
        let value = value.parse::<HeaderValue>()?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.default_headers
            .insert(USER_AGENT, user_agent.parse::<HeaderValue>()?);
        Ok(self)
    }

    /// Set the redirect policy, including custom policies
    pub fn redirect(mut self, policy: Policy) -> Self {
        self.transport_builder = self.transport_builder.redirect(policy);
        self
    }

    /// Set the maximum redirects to follow
    pub fn max_redirects(self, max_redirects: usize) -> Self {
        self.redirect(Policy::limited(max_redirects))
    }

    /// Disable redirects
    pub fn no_redirect(self) -> Self {
        self.redirect(Policy::none())
    }

    /// Set the pool idle timeout
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transport_builder = self.transport_builder.pool_idle_timeout(timeout);
        self
    }

    /// Set the maximum number of idle connections per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.transport_builder = self.transport_builder.pool_max_idle_per_host(max);
        self
    }

    /// Add a hook observing every call
    pub fn hook<H>(mut self, hook: H) -> Self
    where
        H: Hook + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Use a custom transport instead of reqwest
    ///
    /// Redirect and pool settings only apply to the built-in transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                self.transport_builder
                    .connect_timeout(self.timeout_config.connect_timeout)
                    .build()?,
            ),
        };

        let mut executor = Executor::new(transport);
        for hook in self.hooks {
            executor.add_hook(hook);
        }

        Ok(Client {
            executor,
            default_headers: Arc::new(self.default_headers),
            timeout_config: self.timeout_config,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Perform one call with a fresh default client
pub async fn request<I>(method: &str, url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    Client::new().request(method, url, options).await
}

/// Perform a GET call with a fresh default client
pub async fn get<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("GET", url, options).await
}

/// Perform a POST call with a fresh default client
pub async fn post<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("POST", url, options).await
}

/// Perform a PUT call with a fresh default client
pub async fn put<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("PUT", url, options).await
}

/// Perform a DELETE call with a fresh default client
pub async fn delete<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("DELETE", url, options).await
}

/// Perform an OPTIONS call with a fresh default client
pub async fn options<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("OPTIONS", url, options).await
}

/// Perform a PATCH call with a fresh default client
pub async fn patch<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("PATCH", url, options).await
}

/// Perform a HEAD call with a fresh default client
pub async fn head<I>(url: impl AsRef<str>, options: I) -> Result<Response>
where
    I: IntoIterator<Item = RequestOption>,
{
    request("HEAD", url, options).await
}
