use std::time::Duration;

/// Configuration for the timeouts applied to a call
///
/// The overall `timeout` is the per-call deadline raced against the
/// transport; `connect_timeout` is handed to the underlying connector when
/// the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Overall request deadline
    pub timeout: Option<Duration>,
    /// Connection establishment timeout
    pub connect_timeout: Option<Duration>,
}

impl TimeoutConfig {
    /// Create a new timeout configuration with an overall deadline
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            connect_timeout: None,
        }
    }

    /// Set the overall request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// The deadline to race the transport against, if any.
    ///
    /// A zero timeout means "no deadline".
    pub fn deadline(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Some(Duration::from_secs(10)),
        }
    }
}
