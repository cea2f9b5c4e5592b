use std::sync::Arc;

use tracing::Level;

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;

/// Observer of call execution
///
/// Hooks run synchronously around every call made through a client: the
/// before hook once the request is materialized, the after hook once the
/// outcome is known. They see the call but never change its outcome, so a
/// hook must not block for long.
pub trait Hook: Send + Sync {
    /// Observe a request right before it is dispatched
    fn before_process(&self, _request: &Request) {}

    /// Observe the outcome of a call, successful or not
    fn after_process(&self, _request: &Request, _outcome: &Result<Response>) {}

    /// Get the name of this hook
    fn name(&self) -> &str {
        "Unknown"
    }
}

impl<H: Hook + ?Sized> Hook for Arc<H> {
    fn before_process(&self, request: &Request) {
        (**self).before_process(request)
    }

    fn after_process(&self, request: &Request, outcome: &Result<Response>) {
        (**self).after_process(request, outcome)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// `tracing` wants the level at compile time
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

/// Hook that logs one line per request and per outcome
#[derive(Debug, Clone)]
pub struct LoggingHook {
    level: Level,
    include_headers: bool,
}

impl LoggingHook {
    /// Create a new logging hook at `INFO`
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            include_headers: false,
        }
    }

    /// Set the log level
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Include headers in logs
    pub fn include_headers(mut self, include: bool) -> Self {
        self.include_headers = include;
        self
    }
}

impl Default for LoggingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl Hook for LoggingHook {
    fn before_process(&self, request: &Request) {
        log_at!(
            self.level,
            method = %request.method(),
            url = %request.url(),
            body_len = request.body().map_or(0, |b| b.len()),
            "sending request"
        );

        if self.include_headers {
            for (name, value) in request.headers() {
                log_at!(self.level, "  {}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
        }
    }

    fn after_process(&self, request: &Request, outcome: &Result<Response>) {
        match outcome {
            Ok(response) => {
                log_at!(
                    self.level,
                    method = %request.method(),
                    url = %request.url(),
                    status = response.status().as_u16(),
                    body_len = response.bytes().len(),
                    "received response"
                );

                if self.include_headers {
                    for (name, value) in response.headers() {
                        log_at!(self.level, "  {}: {}", name, value.to_str().unwrap_or("<binary>"));
                    }
                }
            }
            Err(error) => log_at!(
                self.level,
                method = %request.method(),
                url = %request.url(),
                error = %error,
                "request failed"
            ),
        }
    }

    fn name(&self) -> &str {
        "Logging"
    }
}

/// Hook built from a pair of closures
pub struct CustomHook<F, G> {
    before: F,
    after: G,
    name: String,
}

impl<F, G> CustomHook<F, G>
where
    F: Fn(&Request) + Send + Sync + 'static,
    G: Fn(&Request, std::result::Result<&Response, &Error>) + Send + Sync + 'static,
{
    /// Create a new custom hook
    pub fn new(before: F, after: G, name: &str) -> Self {
        Self {
            before,
            after,
            name: name.to_string(),
        }
    }
}

impl<F, G> Hook for CustomHook<F, G>
where
    F: Fn(&Request) + Send + Sync + 'static,
    G: Fn(&Request, std::result::Result<&Response, &Error>) + Send + Sync + 'static,
{
    fn before_process(&self, request: &Request) {
        (self.before)(request)
    }

    fn after_process(&self, request: &Request, outcome: &Result<Response>) {
        (self.after)(request, outcome.as_ref())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
