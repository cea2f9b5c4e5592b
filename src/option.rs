use std::collections::BTreeMap;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::multipart::FilePart;
use crate::request::DraftRequest;
use crate::transport::TransportConfig;

/// A single declarative change to a request or to its transport settings
///
/// Options are applied in order as a left fold. Headers, params, JSON
/// fields, form fields and cookies accumulate (the last value written for a
/// key wins); body kinds that cannot share a request fail with
/// [`Error::InvalidBodyType`].
///
/// ```rust
/// use requesty::RequestOption;
/// use std::time::Duration;
///
/// let options = vec![
///     RequestOption::header("X-Request-Id", "42"),
///     RequestOption::param("page", "2"),
///     RequestOption::form([("name", "requesty")]),
///     RequestOption::Timeout(Duration::from_secs(5)),
/// ];
/// # let _ = options;
/// ```
#[derive(Debug)]
pub enum RequestOption {
    /// Request headers, set per name
    Header(Vec<(String, String)>),
    /// Query string parameters
    Params(BTreeMap<String, String>),
    /// Fields of a JSON object body
    Json(Map<String, Value>),
    /// Elements of a JSON array body
    JsonArray(Vec<Map<String, Value>>),
    /// Fields of an urlencoded (or multipart) form body
    Form(BTreeMap<String, String>),
    /// Cookies sent in the `Cookie` header
    Cookie(Vec<(String, String)>),
    /// A file part of a multipart body
    File(FilePart),
    /// Deadline for this call; zero disables it
    Timeout(Duration),
    /// Gzip the request body
    Gzip,
    /// HTTP basic authentication
    BasicAuth {
        username: String,
        password: Option<String>,
    },
    /// Bearer token authentication
    BearerAuth(String),
}

impl RequestOption {
    /// A single header
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Header(vec![(name.into(), value.into())])
    }

    /// Several headers at once
    pub fn headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestOption::Header(
            headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// A single query parameter
    pub fn param(key: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Params(BTreeMap::from([(key.into(), value.into())]))
    }

    /// Several query parameters at once
    pub fn params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestOption::Params(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// JSON object fields from any serializable value.
    ///
    /// Fails with [`Error::InvalidJson`] if the value does not serialize to
    /// an object.
    pub fn json<T>(body: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(body).map_err(Error::InvalidJson)? {
            Value::Object(map) => Ok(RequestOption::Json(map)),
            other => Err(Error::invalid_json(format!(
                "json body must be an object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// JSON array elements; every element must serialize to an object
    pub fn json_array<T>(elements: &[T]) -> Result<Self>
    where
        T: Serialize,
    {
        let mut objects = Vec::with_capacity(elements.len());
        for element in elements {
            match serde_json::to_value(element).map_err(Error::InvalidJson)? {
                Value::Object(map) => objects.push(map),
                other => {
                    return Err(Error::invalid_json(format!(
                        "json array elements must be objects, got {}",
                        json_type(&other)
                    )))
                }
            }
        }
        Ok(RequestOption::JsonArray(objects))
    }

    /// Form fields from key/value pairs
    pub fn form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestOption::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Form fields from a flat serializable struct or map.
    ///
    /// Strings are used as-is, numbers and booleans are rendered, `null`
    /// becomes an empty value; nested arrays or objects fail with
    /// [`Error::InvalidForm`].
    pub fn form_from<T>(body: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let map = match serde_json::to_value(body).map_err(|e| Error::invalid_form(e.to_string()))? {
            Value::Object(map) => map,
            other => {
                return Err(Error::invalid_form(format!(
                    "form body must be a map, got {}",
                    json_type(&other)
                )))
            }
        };

        let mut fields = BTreeMap::new();
        for (key, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(Error::invalid_form(format!(
                        "field {:?} holds a nested {}",
                        key,
                        json_type(&other)
                    )))
                }
            };
            fields.insert(key, value);
        }
        Ok(RequestOption::Form(fields))
    }

    /// A single cookie
    pub fn cookie(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Cookie(vec![(name.into(), value.into())])
    }

    /// Several cookies at once
    pub fn cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestOption::Cookie(
            cookies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// A file part
    pub fn file(part: FilePart) -> Self {
        RequestOption::File(part)
    }

    /// Basic authentication
    pub fn basic_auth(username: impl Into<String>, password: Option<impl Into<String>>) -> Self {
        RequestOption::BasicAuth {
            username: username.into(),
            password: password.map(Into::into),
        }
    }

    /// Bearer token authentication
    pub fn bearer_auth(token: impl Into<String>) -> Self {
        RequestOption::BearerAuth(token.into())
    }

    /// Short name of the option kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            RequestOption::Header(_) => "header",
            RequestOption::Params(_) => "params",
            RequestOption::Json(_) => "json",
            RequestOption::JsonArray(_) => "json_array",
            RequestOption::Form(_) => "form",
            RequestOption::Cookie(_) => "cookie",
            RequestOption::File(_) => "file",
            RequestOption::Timeout(_) => "timeout",
            RequestOption::Gzip => "gzip",
            RequestOption::BasicAuth { .. } => "basic_auth",
            RequestOption::BearerAuth(_) => "bearer_auth",
        }
    }

    /// Apply this option to a draft request and the call's transport config
    pub fn apply(self, draft: &mut DraftRequest, config: &mut TransportConfig) -> Result<()> {
        match self {
            RequestOption::Header(headers) => {
                for (name, value) in headers {
                    let name = HeaderName::from_bytes(name.as_bytes())?;
                    let value = HeaderValue::from_str(&value)?;
                    draft.headers_mut().insert(name, value);
                }
                Ok(())
            }
            RequestOption::Params(params) => {
                draft.add_params(params);
                Ok(())
            }
            RequestOption::Json(fields) => draft.stage_json(fields),
            RequestOption::JsonArray(elements) => draft.stage_json_array(elements),
            RequestOption::Form(fields) => draft.stage_form(fields),
            RequestOption::Cookie(cookies) => {
                draft.add_cookies(cookies);
                Ok(())
            }
            RequestOption::File(part) => draft.stage_file(part),
            RequestOption::Timeout(timeout) => {
                config.timeouts.timeout = Some(timeout);
                Ok(())
            }
            RequestOption::Gzip => {
                draft.enable_gzip();
                Ok(())
            }
            RequestOption::BasicAuth { username, password } => {
                use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
                let credentials = format!("{}:{}", username, password.unwrap_or_default());
                let value = HeaderValue::from_str(&format!("Basic {}", BASE64.encode(credentials)))?;
                draft.headers_mut().insert(AUTHORIZATION, value);
                Ok(())
            }
            RequestOption::BearerAuth(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))?;
                draft.headers_mut().insert(AUTHORIZATION, value);
                Ok(())
            }
        }
    }
}

impl From<FilePart> for RequestOption {
    fn from(part: FilePart) -> Self {
        RequestOption::File(part)
    }
}

/// Apply options in order, stopping at the first failure
pub fn apply_all<I>(options: I, draft: &mut DraftRequest, config: &mut TransportConfig) -> Result<()>
where
    I: IntoIterator<Item = RequestOption>,
{
    options.into_iter().try_for_each(|option| {
        let kind = option.kind();
        option.apply(draft, config).map_err(|e| {
            tracing::debug!(option = kind, error = %e, "request option rejected");
            e
        })
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
