#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// One part of a multipart body as seen by the server
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: String,
}

/// Split a multipart body, taking the boundary from its first line
pub fn multipart_parts(body: &[u8]) -> Vec<Part> {
    let body = String::from_utf8_lossy(body);
    let Some(first_line) = body.lines().next() else {
        return Vec::new();
    };
    let delimiter = first_line.trim_end().to_string();

    body.split(delimiter.as_str())
        .filter_map(|chunk| {
            let chunk = chunk.strip_prefix("\r\n")?;
            let (head, content) = chunk.split_once("\r\n\r\n")?;
            let content = content.strip_suffix("\r\n").unwrap_or(content);

            let mut part = Part {
                name: String::new(),
                file_name: None,
                content_type: None,
                content: content.to_string(),
            };
            for line in head.split("\r\n") {
                if let Some(disposition) = line.strip_prefix("Content-Disposition: form-data") {
                    part.name = quoted(disposition, "name").unwrap_or_default();
                    part.file_name = quoted(disposition, "filename");
                } else if let Some(content_type) = line.strip_prefix("Content-Type: ") {
                    part.content_type = Some(content_type.to_string());
                }
            }
            Some(part)
        })
        .collect()
}

fn quoted(disposition: &str, key: &str) -> Option<String> {
    let marker = format!("; {}=\"", key);
    let start = disposition.find(&marker)? + marker.len();
    let end = disposition[start..].find('"')? + start;
    Some(disposition[start..end].to_string())
}

fn echo_body(request: &Request) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_bytes(request.body.clone())
}

fn echo_query(request: &Request) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(request.url.query().unwrap_or_default())
}

fn echo_gunzipped(request: &Request) -> ResponseTemplate {
    let mut decoded = Vec::new();
    match GzDecoder::new(request.body.as_slice()).read_to_end(&mut decoded) {
        Ok(_) => ResponseTemplate::new(200).set_body_bytes(decoded),
        Err(_) => ResponseTemplate::new(400),
    }
}

fn echo_file(request: &Request) -> ResponseTemplate {
    match multipart_parts(&request.body)
        .into_iter()
        .find(|part| part.name == "file")
    {
        Some(part) => ResponseTemplate::new(200).set_body_string(part.content),
        None => ResponseTemplate::new(400),
    }
}

fn echo_parts(request: &Request) -> ResponseTemplate {
    let parts: BTreeMap<String, String> = multipart_parts(&request.body)
        .into_iter()
        .map(|part| (part.name, part.content))
        .collect();
    ResponseTemplate::new(200).set_body_json(parts)
}

/// Start a server with the echo endpoints used across the suite
///
/// - `POST /echo`: the raw request body
/// - `GET /query`: the raw query string
/// - `POST /gzip`: the gunzipped request body
/// - `POST /upload`: the content of the multipart part named `file`
/// - `POST /parts`: every multipart part as a JSON object
/// - `GET /slow`: an empty 200 after three seconds
pub async fn echo_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(echo_body)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(echo_query)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/gzip"))
        .respond_with(echo_gunzipped)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(echo_file)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parts"))
        .respond_with(echo_parts)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    server
}
