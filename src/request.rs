use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use cookie::Cookie;
use http::header::{
    HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE, COOKIE, USER_AGENT,
};
use http::{HeaderMap, Method};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::client::Client;
use crate::compression::gzip_compress;
use crate::error::{BodyKind, Error, Result};
use crate::multipart::{FilePart, MultipartWriter};
use crate::option::RequestOption;
use crate::response::Response;

/// `User-Agent` sent unless a default header or an option overrides it
pub const DEFAULT_USER_AGENT: &str = concat!("requesty/", env!("CARGO_PKG_VERSION"));

/// Parse a verb case-insensitively into one of the supported methods
pub fn parse_method(method: &str) -> Result<Method> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "OPTIONS" => Ok(Method::OPTIONS),
        "PATCH" => Ok(Method::PATCH),
        "HEAD" => Ok(Method::HEAD),
        _ => Err(Error::InvalidMethod(method.to_string())),
    }
}

/// A staged JSON body
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// Merged from `Json` options
    Object(Map<String, Value>),
    /// Appended to by `JsonArray` options
    Array(Vec<Map<String, Value>>),
}

impl JsonBody {
    fn kind(&self) -> BodyKind {
        match self {
            JsonBody::Object(_) => BodyKind::Json,
            JsonBody::Array(_) => BodyKind::JsonArray,
        }
    }
}

/// Body descriptors staged on a draft, encoded once by `materialize`
#[derive(Debug, Default)]
struct StagedBody {
    json: Option<JsonBody>,
    form: Option<BTreeMap<String, String>>,
    files: Vec<FilePart>,
}

/// The mutable, in-progress form of an outbound call
///
/// Options mutate a draft; [`DraftRequest::materialize`] consumes it and
/// produces the wire-ready [`Request`].
#[derive(Debug)]
pub struct DraftRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    params: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    body: StagedBody,
    gzip: bool,
}

impl DraftRequest {
    /// Create a draft; the URL's own query string is kept as given
    pub fn new(method: Method, url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            method,
            url,
            headers,
            params: BTreeMap::new(),
            cookies: BTreeMap::new(),
            body: StagedBody::default(),
            gzip: false,
        }
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL as given, before params are encoded
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get mutable access to headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Get the staged query params
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Get the staged cookies
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// Get the staged JSON body, if any
    pub fn json(&self) -> Option<&JsonBody> {
        self.body.json.as_ref()
    }

    /// Get the staged form fields, if any
    pub fn form(&self) -> Option<&BTreeMap<String, String>> {
        self.body.form.as_ref()
    }

    /// Get the staged file parts
    pub fn files(&self) -> &[FilePart] {
        &self.body.files
    }

    /// Check if the body will be gzipped
    pub fn is_gzip(&self) -> bool {
        self.gzip
    }

    /// The body kind that will be materialized, if any
    pub fn body_kind(&self) -> Option<BodyKind> {
        if let Some(json) = &self.body.json {
            Some(json.kind())
        } else if !self.body.files.is_empty() {
            Some(BodyKind::Multipart)
        } else if self.body.form.is_some() {
            Some(BodyKind::Form)
        } else {
            None
        }
    }

    /// Merge query params, last write wins per key
    pub fn add_params(&mut self, params: impl IntoIterator<Item = (String, String)>) {
        self.params.extend(params);
    }

    /// Merge cookies, last write wins per name
    pub fn add_cookies(&mut self, cookies: impl IntoIterator<Item = (String, String)>) {
        self.cookies.extend(cookies);
    }

    /// Merge fields into the JSON object body
    pub fn stage_json(&mut self, fields: Map<String, Value>) -> Result<()> {
        self.ensure_json_allowed(BodyKind::Json)?;
        match &mut self.body.json {
            Some(JsonBody::Object(object)) => object.extend(fields),
            Some(JsonBody::Array(_)) => {
                return Err(Error::invalid_body_type(BodyKind::JsonArray, BodyKind::Json))
            }
            None => self.body.json = Some(JsonBody::Object(fields)),
        }
        Ok(())
    }

    /// Append elements to the JSON array body
    pub fn stage_json_array(&mut self, elements: Vec<Map<String, Value>>) -> Result<()> {
        self.ensure_json_allowed(BodyKind::JsonArray)?;
        match &mut self.body.json {
            Some(JsonBody::Array(array)) => array.extend(elements),
            Some(JsonBody::Object(_)) => {
                return Err(Error::invalid_body_type(BodyKind::Json, BodyKind::JsonArray))
            }
            None => self.body.json = Some(JsonBody::Array(elements)),
        }
        Ok(())
    }

    /// Merge form fields; they join file parts in a multipart body if any
    pub fn stage_form(&mut self, fields: BTreeMap<String, String>) -> Result<()> {
        if let Some(json) = &self.body.json {
            return Err(Error::invalid_body_type(json.kind(), BodyKind::Form));
        }
        self.body.form.get_or_insert_with(BTreeMap::new).extend(fields);
        Ok(())
    }

    /// Append a file part, opening its path source now
    pub fn stage_file(&mut self, part: FilePart) -> Result<()> {
        if let Some(json) = &self.body.json {
            return Err(Error::invalid_body_type(json.kind(), BodyKind::Multipart));
        }
        let part = part.prepare()?;
        self.body.files.push(part);
        Ok(())
    }

    /// Gzip the body at materialization
    pub fn enable_gzip(&mut self) {
        self.gzip = true;
    }

    fn ensure_json_allowed(&self, requested: BodyKind) -> Result<()> {
        if !self.body.files.is_empty() {
            return Err(Error::invalid_body_type(BodyKind::Multipart, requested));
        }
        if self.body.form.is_some() {
            return Err(Error::invalid_body_type(BodyKind::Form, requested));
        }
        Ok(())
    }

    /// Encode the staged state into the final request
    ///
    /// Staged params replace URL pairs with the same key and are appended
    /// key-sorted; without staged params the URL query is untouched. The body is encoded as JSON,
    /// multipart (files, then form fields) or an urlencoded form, in that
    /// order of precedence, and optionally gzipped.
    pub fn materialize(self) -> Result<Request> {
        let DraftRequest {
            method,
            mut url,
            mut headers,
            params,
            cookies,
            body,
            gzip,
        } = self;

        if !params.is_empty() {
            let query = merge_query(url.query(), &params);
            url.set_query(Some(&query));
        }

        if !cookies.is_empty() {
            let rendered = cookies
                .iter()
                .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).stripped().to_string())
                .collect::<Vec<_>>()
                .join("; ");
            let value = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(existing) => format!("{}; {}", existing, rendered),
                None => rendered,
            };
            headers.insert(COOKIE, HeaderValue::from_str(&value)?);
        }

        let encoded = if let Some(json) = body.json {
            let bytes = match &json {
                JsonBody::Object(object) => serde_json::to_vec(object),
                JsonBody::Array(array) => serde_json::to_vec(array),
            }
            .map_err(Error::InvalidJson)?;
            Some((bytes, "application/json".to_string()))
        } else if !body.files.is_empty() {
            let mut writer = MultipartWriter::new();
            for part in body.files {
                writer.write_file(part)?;
            }
            for (name, value) in body.form.iter().flatten() {
                writer.write_field(name, value)?;
            }
            Some(writer.finish())
        } else if let Some(form) = body.form {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(form.iter())
                .finish();
            Some((encoded.into_bytes(), "application/x-www-form-urlencoded".to_string()))
        } else {
            None
        };

        let body = match encoded {
            Some((mut bytes, content_type)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
                if gzip {
                    bytes = gzip_compress(&bytes)?;
                    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
                    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
                }
                Some(Bytes::from(bytes))
            }
            None => None,
        };

        tracing::trace!(
            method = %method,
            url = %url,
            body_len = body.as_ref().map_or(0, |b| b.len()),
            gzip,
            "materialized request"
        );

        Ok(Request {
            method,
            url,
            headers,
            body,
        })
    }
}

// Raw URL segments survive verbatim unless a staged key overrides them
fn merge_query(raw: Option<&str>, params: &BTreeMap<String, String>) -> String {
    let staged = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    let mut segments: Vec<&str> = raw
        .into_iter()
        .flat_map(|query| query.split('&'))
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            url::form_urlencoded::parse(segment.as_bytes())
                .next()
                .map_or(true, |(key, _)| !params.contains_key(&*key))
        })
        .collect();
    segments.push(&staged);
    segments.join("&")
}

/// A fully materialized request, ready for dispatch
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL, including the encoded query string
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the encoded body
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Get the content type
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Convert to a reqwest request with an optional native timeout
    pub fn into_reqwest_request(self, timeout: Option<Duration>) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        if let Some(body) = self.body {
            *request.body_mut() = Some(body.into());
        }
        *request.timeout_mut() = timeout;
        request
    }
}

/// Builder for creating HTTP requests
///
/// Collects [`RequestOption`]s for one call; nothing is validated against
/// the draft until [`RequestBuilder::send`].
#[derive(Debug)]
pub struct RequestBuilder {
    client: Client,
    method: String,
    url: String,
    options: Vec<RequestOption>,
}

impl RequestBuilder {
    /// Create a new request builder
    pub fn new(client: Client, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            client,
            method: method.into(),
            url: url.into(),
            options: Vec::new(),
        }
    }

    /// Get the HTTP method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the options collected so far
    pub fn options(&self) -> &[RequestOption] {
        &self.options
    }

    /// Add any option
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Set a header
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        name.parse::<HeaderName>()?;
        value.parse::<HeaderValue>()?;
        self.options.push(RequestOption::header(name, value));
        Ok(self)
    }

    /// Add a query parameter
    pub fn query(self, key: &str, value: &str) -> Self {
        self.option(RequestOption::param(key, value))
    }

    /// Merge fields into the JSON body
    pub fn json<T>(self, body: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.option(RequestOption::json(body)?))
    }

    /// Append elements to a JSON array body
    pub fn json_array<T>(self, elements: &[T]) -> Result<Self>
    where
        T: Serialize,
    {
        Ok(self.option(RequestOption::json_array(elements)?))
    }

    /// Add a form field
    pub fn form(self, key: &str, value: &str) -> Self {
        self.option(RequestOption::form([(key, value)]))
    }

    /// Add form fields from a flat serializable value
    pub fn form_from<T>(self, body: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.option(RequestOption::form_from(body)?))
    }

    /// Add a cookie
    pub fn cookie(self, name: &str, value: &str) -> Self {
        self.option(RequestOption::cookie(name, value))
    }

    /// Add a file part
    pub fn file(self, part: FilePart) -> Self {
        self.option(RequestOption::File(part))
    }

    /// Set the deadline for this call
    pub fn timeout(self, timeout: Duration) -> Self {
        self.option(RequestOption::Timeout(timeout))
    }

    /// Gzip the request body
    pub fn gzip(self) -> Self {
        self.option(RequestOption::Gzip)
    }

    /// Set basic authentication
    pub fn basic_auth(self, username: &str, password: Option<&str>) -> Self {
        self.option(RequestOption::basic_auth(username, password))
    }

    /// Set bearer token authentication
    pub fn bearer_auth(self, token: &str) -> Self {
        self.option(RequestOption::bearer_auth(token))
    }

    /// Send the request and return the response
    pub async fn send(self) -> Result<Response> {
        self.client
            .request(&self.method, &self.url, self.options)
            .await
    }

    /// Send the request and return JSON response
    pub async fn send_json<T>(self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.send().await?.json()
    }

    /// Send the request and return text response
    pub async fn send_text(self) -> Result<String> {
        Ok(self.send().await?.text().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::apply_all;
    use crate::transport::TransportConfig;
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::io::Read;

    fn materialize(url: &str, options: Vec<RequestOption>) -> Result<Request> {
        let mut draft = DraftRequest::new(Method::POST, url.parse().unwrap());
        let mut config = TransportConfig::default();
        apply_all(options, &mut draft, &mut config)?;
        draft.materialize()
    }

    fn body_text(request: &Request) -> String {
        String::from_utf8(request.body().unwrap().to_vec()).unwrap()
    }

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![vec![]];
        }
        let mut result = Vec::new();
        for rest in permutations(n - 1) {
            for i in 0..=rest.len() {
                let mut order = rest.clone();
                order.insert(i, n - 1);
                result.push(order);
            }
        }
        result
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Patch").unwrap(), Method::PATCH);
        assert_eq!(parse_method("OPTIONS").unwrap(), Method::OPTIONS);
        assert!(matches!(parse_method("TRACE"), Err(Error::InvalidMethod(m)) if m == "TRACE"));
        assert!(matches!(parse_method("connect"), Err(Error::InvalidMethod(_))));
    }

    #[test]
    fn test_default_user_agent() {
        let request = materialize("http://localhost/", vec![]).unwrap();
        assert_eq!(request.headers()[USER_AGENT], DEFAULT_USER_AGENT);
        assert!(request.body().is_none());
        assert_eq!(request.url().as_str(), "http://localhost/");

        let request = materialize(
            "http://localhost/",
            vec![RequestOption::header("User-Agent", "custom/1.0")],
        )
        .unwrap();
        assert_eq!(request.headers()[USER_AGENT], "custom/1.0");
    }

    #[test]
    fn test_params_sorted_last_write_wins() {
        let request = materialize(
            "http://localhost/get?z=0&a=old",
            vec![
                RequestOption::param("b", "2"),
                RequestOption::params([("a", "1"), ("c", "x y")]),
            ],
        )
        .unwrap();
        assert_eq!(request.url().query(), Some("z=0&a=1&b=2&c=x+y"));
    }

    #[test]
    fn test_url_query_kept_without_params() {
        let request = materialize("http://localhost/search?tag=a&tag=b&flag", vec![]).unwrap();
        assert_eq!(request.url().query(), Some("tag=a&tag=b&flag"));

        let request = DraftRequest::new(Method::GET, "http://localhost/get?".parse().unwrap())
            .materialize()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost/get?");
    }

    #[test]
    fn test_params_replace_only_named_keys() {
        let request = materialize(
            "http://localhost/search?tag=a&flag&tag=b&page=1",
            vec![RequestOption::param("page", "2")],
        )
        .unwrap();
        assert_eq!(request.url().query(), Some("tag=a&flag&tag=b&page=2"));

        let request = materialize(
            "http://localhost/search?tag=a&tag=b&flag",
            vec![RequestOption::param("tag", "c")],
        )
        .unwrap();
        assert_eq!(request.url().query(), Some("flag&tag=c"));
    }

    #[test]
    fn test_json_merges() {
        let request = materialize(
            "http://localhost/post",
            vec![
                RequestOption::json(&json!({"a": "1", "b": 2})).unwrap(),
                RequestOption::json(&json!({"b": "2"})).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(body_text(&request), r#"{"a":"1","b":"2"}"#);
    }

    #[test]
    fn test_empty_json_object() {
        let request = materialize(
            "http://localhost/post",
            vec![RequestOption::Json(Map::new())],
        )
        .unwrap();
        assert_eq!(body_text(&request), "{}");
    }

    #[test]
    fn test_json_array_appends() {
        let request = materialize(
            "http://localhost/post",
            vec![
                RequestOption::json_array(&[json!({"a": "1", "b": 2})]).unwrap(),
                RequestOption::json_array(&[json!({"c": 0})]).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(body_text(&request), r#"[{"a":"1","b":2},{"c":0}]"#);
    }

    #[test]
    fn test_json_and_json_array_conflict() {
        let err = materialize(
            "http://localhost/post",
            vec![
                RequestOption::json(&json!({"a": 1})).unwrap(),
                RequestOption::json_array(&[json!({"b": 2})]).unwrap(),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBodyType {
                staged: BodyKind::Json,
                requested: BodyKind::JsonArray
            }
        ));
    }

    #[test]
    fn test_json_and_file_conflict() {
        let err = materialize(
            "http://localhost/post",
            vec![
                RequestOption::File(FilePart::with_content("f", "a.txt", "x")),
                RequestOption::json(&json!({"a": 1})).unwrap(),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBodyType {
                staged: BodyKind::Multipart,
                requested: BodyKind::Json
            }
        ));

        let err = materialize(
            "http://localhost/post",
            vec![
                RequestOption::json(&json!({"a": 1})).unwrap(),
                RequestOption::File(FilePart::with_content("f", "a.txt", "x")),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBodyType {
                staged: BodyKind::Json,
                requested: BodyKind::Multipart
            }
        ));
    }

    #[test]
    fn test_form_body() {
        let request = materialize(
            "http://localhost/post",
            vec![
                RequestOption::form([("b", "2")]),
                RequestOption::form([("a", "1 & 2")]),
            ],
        )
        .unwrap();
        assert_eq!(
            request.content_type(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(body_text(&request), "a=1+%26+2&b=2");
    }

    #[test]
    fn test_form_and_files_become_multipart() {
        let request = materialize(
            "http://localhost/upload",
            vec![
                RequestOption::form([("fileField", "fc")]),
                RequestOption::File(FilePart::with_content("fc", "hi.text", "hi!")),
            ],
        )
        .unwrap();

        let content_type = request.content_type().unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = body_text(&request);
        assert!(body.starts_with(&format!("--{}\r\n", boundary)));
        assert!(body.ends_with(&format!("--{}--\r\n", boundary)));

        let file_at = body.find("filename=\"hi.text\"").unwrap();
        let field_at = body.find("name=\"fileField\"").unwrap();
        assert!(file_at < field_at);
        assert!(body.contains("\r\n\r\nhi!\r\n"));
        assert!(body.contains("\r\n\r\nfc\r\n"));
    }

    #[test]
    fn test_cookies_rendered() {
        let request = materialize(
            "http://localhost/",
            vec![
                RequestOption::header("Cookie", "session=abc"),
                RequestOption::cookie("b", "2"),
                RequestOption::cookies([("a", "1"), ("b", "3")]),
            ],
        )
        .unwrap();
        assert_eq!(request.headers()[COOKIE], "session=abc; a=1; b=3");
    }

    #[test]
    fn test_gzip_json() {
        let request = materialize(
            "http://localhost/post",
            vec![
                RequestOption::Gzip,
                RequestOption::json(&json!({"a": "1"})).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(request.headers()[CONTENT_ENCODING], "gzip");
        assert_eq!(request.headers()[ACCEPT_ENCODING], "gzip");
        assert_eq!(request.content_type(), Some("application/json"));

        let mut decoded = String::new();
        GzDecoder::new(request.body().unwrap().as_ref())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, r#"{"a":"1"}"#);
    }

    #[test]
    fn test_gzip_without_body() {
        let request = materialize("http://localhost/post", vec![RequestOption::Gzip]).unwrap();
        assert!(request.body().is_none());
        assert!(request.headers().get(CONTENT_ENCODING).is_none());
    }

    #[test]
    fn test_cumulative_options_are_order_independent() {
        fn options() -> Vec<RequestOption> {
            vec![
                RequestOption::header("X-One", "1"),
                RequestOption::param("p", "q"),
                RequestOption::form([("f", "v")]),
                RequestOption::cookie("c", "d"),
                RequestOption::header("X-Two", "2"),
            ]
        }

        let expected = materialize("http://localhost/post?z=1", options()).unwrap();
        for order in permutations(options().len()) {
            let mut slots: Vec<Option<RequestOption>> = options().into_iter().map(Some).collect();
            let ordered = order.iter().map(|&i| slots[i].take().unwrap()).collect();
            let request = materialize("http://localhost/post?z=1", ordered).unwrap();

            assert_eq!(request.url(), expected.url());
            assert_eq!(request.headers(), expected.headers());
            assert_eq!(request.body(), expected.body());
        }
    }

    #[test]
    fn test_json_order_independent() {
        let forward = materialize(
            "http://localhost/post",
            vec![
                RequestOption::json(&json!({"a": 1})).unwrap(),
                RequestOption::json(&json!({"b": 2})).unwrap(),
            ],
        )
        .unwrap();
        let backward = materialize(
            "http://localhost/post",
            vec![
                RequestOption::json(&json!({"b": 2})).unwrap(),
                RequestOption::json(&json!({"a": 1})).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(forward.body(), backward.body());
    }

    #[test]
    fn test_into_reqwest_request() {
        let request = materialize(
            "http://localhost/post",
            vec![RequestOption::form([("a", "1")])],
        )
        .unwrap();
        let reqwest_request = request.into_reqwest_request(Some(Duration::from_secs(2)));
        assert_eq!(reqwest_request.method(), &Method::POST);
        assert_eq!(reqwest_request.timeout(), Some(&Duration::from_secs(2)));
        assert_eq!(
            reqwest_request.body().and_then(|b| b.as_bytes()),
            Some(&b"a=1"[..])
        );
    }
}
