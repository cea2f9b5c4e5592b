use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::hook::Hook;
use crate::request::Request;
use crate::response::Response;
use crate::transport::{Transport, TransportConfig};

/// Runs materialized requests against a transport
///
/// Every call makes exactly one transport attempt. When the call has a
/// deadline, the transport work (send plus full body buffering) runs on a
/// spawned task raced against a timer; if the timer wins the task is
/// detached and its result discarded.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<dyn Transport>,
    hooks: Vec<Arc<dyn Hook>>,
}

impl Executor {
    /// Create an executor over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            hooks: Vec::new(),
        }
    }

    /// Add a hook observing every call
    pub fn add_hook(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Get the transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Get the registered hooks
    pub fn hooks(&self) -> &[Arc<dyn Hook>] {
        &self.hooks
    }

    /// Execute a request, observed by the hooks
    pub async fn execute(&self, request: Request, config: TransportConfig) -> Result<Response> {
        for hook in &self.hooks {
            hook.before_process(&request);
        }

        let outcome = self.dispatch(request.clone(), config).await;

        for hook in &self.hooks {
            hook.after_process(&request, &outcome);
        }
        outcome
    }

    async fn dispatch(&self, request: Request, config: TransportConfig) -> Result<Response> {
        let deadline = config.deadline();
        tracing::debug!(
            transport = self.transport.name(),
            method = %request.method(),
            url = %request.url(),
            deadline = ?deadline,
            "dispatching request"
        );

        let Some(deadline) = deadline else {
            return roundtrip(self.transport.clone(), request, config).await;
        };

        let task = tokio::spawn(roundtrip(self.transport.clone(), request, config));
        tokio::select! {
            joined = task => match joined {
                Ok(outcome) => outcome.map_err(|e| timeout_from_network(e, deadline)),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => Err(Error::custom(format!("transport task failed: {}", e))),
            },
            _ = tokio::time::sleep(deadline) => {
                tracing::warn!(?deadline, "request deadline elapsed, abandoning transport call");
                Err(Error::timeout(deadline))
            }
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("transport", &self.transport.name())
            .field(
                "hooks",
                &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

async fn roundtrip(
    transport: Arc<dyn Transport>,
    request: Request,
    config: TransportConfig,
) -> Result<Response> {
    let response = transport.send(request, &config).await?;
    Response::from_reqwest_response(response).await
}

// The native reqwest timeout can fire just ahead of our timer
fn timeout_from_network(error: Error, deadline: Duration) -> Error {
    match error {
        Error::Network(e) if e.is_timeout() => Error::timeout(deadline),
        other => other,
    }
}
