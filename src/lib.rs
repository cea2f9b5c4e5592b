//! Requesty - An ergonomic HTTP client for Rust
//!
//! Requests are assembled from composable [`RequestOption`] values (headers,
//! query params, JSON/form/multipart bodies, cookies, timeouts, gzip),
//! executed once through a pluggable [`Transport`] and returned as a fully
//! buffered [`Response`].
//!
//! ## Features
//!
//! - **Option composition** applied as an ordered, short-circuiting fold
//! - **Body exclusivity**: JSON never mixes with form or file parts, while
//!   form fields and files combine into one multipart body
//! - **Deadlines** raced against the transport call
//! - **Gzip** request bodies
//! - **Buffered responses** with switchable text encodings
//! - **Hooks** observing every call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use requesty::{Client, RequestOption};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let response = requesty::get(
//!         "https://httpbin.org/get",
//!         vec![RequestOption::param("q", "rust")],
//!     )
//!     .await?;
//!     println!("Status: {}", response.status());
//!
//!     let client = Client::new();
//!     let response = client
//!         .post("https://httpbin.org/post")
//!         .json(&serde_json::json!({"name": "requesty"}))?
//!         .send()
//!         .await?;
//!     println!("Body: {}", response.text());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod compression;
pub mod error;
pub mod executor;
pub mod hook;
pub mod multipart;
pub mod option;
pub mod request;
pub mod response;
pub mod timeout;
pub mod transport;

// Re-export main types for convenience
pub use client::{delete, get, head, options, patch, post, put, request, Client, ClientBuilder};
pub use error::{BodyKind, Error, Result, StatusError};
pub use executor::Executor;
pub use hook::{CustomHook, Hook, LoggingHook};
pub use multipart::{FilePart, FileSource};
pub use option::RequestOption;
pub use request::{DraftRequest, Request, RequestBuilder, DEFAULT_USER_AGENT};
pub use response::{Response, ResponseBuilder};
pub use timeout::TimeoutConfig;
pub use transport::{HttpTransport, HttpTransportBuilder, Transport, TransportConfig};

// Re-export common HTTP types
pub use http::{HeaderMap, HeaderValue, Method, StatusCode};

// Re-export the redirect hook
pub use reqwest::redirect::Policy as RedirectPolicy;

// Re-export JSON types
pub use serde_json::{Map as JsonMap, Value as JsonValue};

// Re-export URL types
pub use url::Url;

// Re-export common traits
pub use async_trait::async_trait;
