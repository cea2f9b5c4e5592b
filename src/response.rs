use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode, Version};
use reqwest::Response as ReqwestResponse;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result, StatusError};

/// HTTP response representation
///
/// The body is read from the transport exactly once when the response is
/// created and kept in memory. Text is decoded lazily from those raw bytes
/// under the current encoding, which defaults to UTF-8 whatever the
/// `Content-Type` charset says.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    version: Version,
    body: Bytes,
    encoding: &'static Encoding,
    text: OnceLock<String>,
}

impl Response {
    /// Buffer a reqwest response, releasing its stream
    pub async fn from_reqwest_response(response: ReqwestResponse) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let version = response.version();
        let body = response.bytes().await.map_err(Error::Network)?;

        tracing::trace!(status = status.as_u16(), body_len = body.len(), "buffered response body");

        Ok(Self::from_parts(status, headers, url, version, body))
    }

    /// Assemble a response from already buffered parts
    pub fn from_parts(
        status: StatusCode,
        headers: HeaderMap,
        url: Url,
        version: Version,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            headers,
            url,
            version,
            body: body.into(),
            encoding: UTF_8,
            text: OnceLock::new(),
        }
    }

    /// Create a response builder
    pub fn builder(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder::new(status)
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Get the content type
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Get the content length announced by the server
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
    }

    /// Get the final URL, after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Check if the response is successful (2xx status code)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response is a client error (4xx status code)
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if the response is a server error (5xx status code)
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Check if the response indicates a redirect
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Raise an error for 4xx and 5xx status codes
    pub fn error_for_status(self) -> Result<Self> {
        self.error_for_status_ref()?;
        Ok(self)
    }

    /// Raise an error for 4xx and 5xx status codes without consuming the response
    pub fn error_for_status_ref(&self) -> Result<&Self> {
        let status = self.status;
        if status.is_client_error() {
            return Err(StatusError::Client { status }.into());
        }
        if status.is_server_error() {
            return Err(StatusError::Server { status }.into());
        }
        Ok(self)
    }

    /// Get the raw response body
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get the body decoded under the current encoding
    ///
    /// Malformed sequences are replaced, never reported.
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| {
            let (text, _) = self.encoding.decode_with_bom_removal(&self.body);
            text.into_owned()
        })
    }

    /// Get the name of the current text encoding
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    /// Change the encoding used by [`Response::text`]
    ///
    /// Accepts any WHATWG label (`"gbk"`, `"latin1"`, `"utf-8"`, ...). The
    /// text is re-derived from the raw bytes on next access.
    pub fn set_encoding(&mut self, label: &str) -> Result<()> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::UnrecognizedEncoding(label.to_string()))?;
        self.encoding = encoding;
        self.text = OnceLock::new();
        Ok(())
    }

    /// Deserialize the body as JSON, whatever the declared content type
    pub fn json<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(&self.body).map_err(Error::Decode)
    }

    /// Write the raw body to a newly created file
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = tokio::fs::File::create(path.as_ref()).await?;
        file.write_all(&self.body).await?;
        file.flush().await?;
        Ok(())
    }

    /// Copy the raw body to a writer
    pub fn copy_to<W>(&self, writer: &mut W) -> Result<u64>
    where
        W: Write + ?Sized,
    {
        writer.write_all(&self.body)?;
        Ok(self.body.len() as u64)
    }

    /// Take the raw body, dropping the response
    pub fn into_bytes(self) -> Bytes {
        self.body
    }
}

/// Response builder for creating responses without a transport
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    url: Option<Url>,
    version: Version,
    body: Bytes,
}

impl ResponseBuilder {
    /// Create a new response builder
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url: None,
            version: Version::HTTP_11,
            body: Bytes::new(),
        }
    }

    /// Set a header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = name.parse::<http::header::HeaderName>()?;
        let value = value.parse::<HeaderValue>()?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the URL
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Set the HTTP version
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the response
    pub fn build(self) -> Result<Response> {
        let url = match self.url {
            Some(url) => url,
            None => Url::parse("http://localhost/")?,
        };
        Ok(Response::from_parts(
            self.status,
            self.headers,
            url,
            self.version,
            self.body,
        ))
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn response(body: impl Into<Bytes>) -> Response {
        Response::builder(StatusCode::OK).body(body).build().unwrap()
    }

    #[tokio::test]
    async fn test_from_reqwest_response() {
        let http_response = http::Response::builder()
            .status(201)
            .header("content-type", "application/json")
            .body(r#"{"ok":true}"#)
            .unwrap();
        let response = Response::from_reqwest_response(http_response.into())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.json::<Value>().unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_body_access_is_idempotent() {
        let response = response("hello");
        assert_eq!(response.bytes().as_ref(), b"hello");
        assert_eq!(response.bytes(), response.bytes());
        assert_eq!(response.text(), "hello");
        assert_eq!(response.text(), response.text());
        assert_eq!(response.encoding(), "UTF-8");
    }

    #[test]
    fn test_set_encoding_rederives_from_raw_bytes() {
        let (gbk, _, _) = encoding_rs::GBK.encode("你好");
        let mut response = response(gbk.into_owned());
        let as_utf8 = response.text().to_string();
        assert_ne!(as_utf8, "你好");

        response.set_encoding("gbk").unwrap();
        assert_eq!(response.encoding(), "GBK");
        assert_eq!(response.text(), "你好");

        response.set_encoding("utf-8").unwrap();
        assert_eq!(response.text(), as_utf8);
    }

    #[test]
    fn test_set_encoding_ascii_round_trip() {
        let mut response = response("plain ascii");
        response.set_encoding("latin1").unwrap();
        assert_eq!(response.text(), "plain ascii");
        response.set_encoding("UTF-8").unwrap();
        assert_eq!(response.text(), "plain ascii");
    }

    #[test]
    fn test_unrecognized_encoding() {
        let mut response = response("x");
        let err = response.set_encoding("klingon").unwrap_err();
        assert!(matches!(err, Error::UnrecognizedEncoding(label) if label == "klingon"));
        assert_eq!(response.encoding(), "UTF-8");
    }

    #[test]
    fn test_json_decode_error() {
        let response = response("not json");
        assert!(matches!(response.json::<Value>(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_error_for_status() {
        let ok = Response::builder(StatusCode::OK).build().unwrap();
        assert!(ok.error_for_status().is_ok());

        let not_found = Response::builder(StatusCode::NOT_FOUND).build().unwrap();
        assert!(not_found.is_client_error());
        match not_found.error_for_status() {
            Err(Error::Status(status)) => {
                assert!(status.is_client_error());
                assert_eq!(status.status(), StatusCode::NOT_FOUND);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let bad_gateway = Response::builder(StatusCode::BAD_GATEWAY).build().unwrap();
        assert!(matches!(
            bad_gateway.error_for_status_ref(),
            Err(Error::Status(StatusError::Server { .. }))
        ));
    }

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.bin");

        response(vec![0u8, 159, 146, 150]).save_to_file(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn test_save_to_file_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("body.bin");

        let err = response("x").save_to_file(&path).await.unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_copy_to() {
        let mut sink = Vec::new();
        let written = response("copied").copy_to(&mut sink).unwrap();
        assert_eq!(written, 6);
        assert_eq!(sink, b"copied");
    }
}
