use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    client::StatsdClient,
    forwarder::{self, Transport},
    recorder::BrubeckRecorder,
    sampling::{RandomSource, ThreadLocalRandom},
    telemetry::{DropHook, DropReason, Telemetry},
};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8125;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that could occur while installing a brubeck recorder.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to install the recorder due to an existing global recorder already being installed.
    #[error("failed to install exporter as global recorder")]
    FailedToInstall,
}

/// Builder for a brubeck client.
pub struct BrubeckBuilder {
    prefix: String,
    host: String,
    port: u16,
    disabled: bool,
    connect_timeout: Duration,
    random: Arc<dyn RandomSource>,
    drop_hook: Option<DropHook>,
    transport: Option<Box<dyn Transport>>,
}

impl BrubeckBuilder {
    /// Set the application prefix.
    ///
    /// Every metric is sent as `<namespace>.<prefix>.<stat>`, so the prefix must be unique to each application sending
    /// to the same server. It is not validated.
    ///
    /// Defaults to an empty prefix.
    #[must_use]
    pub fn with_prefix<P>(mut self, prefix: P) -> Self
    where
        P: Into<String>,
    {
        self.prefix = prefix.into();
        self
    }

    /// Set the host of the remote server.
    ///
    /// This can be either an IP address or a hostname, which is resolved when the client is built.
    ///
    /// Defaults to `127.0.0.1`.
    #[must_use]
    pub fn with_host<H>(mut self, host: H) -> Self
    where
        H: Into<String>,
    {
        self.host = host.into();
        self
    }

    /// Set the port of the remote server.
    ///
    /// Defaults to 8125.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets whether or not the client is disabled.
    ///
    /// A disabled client never opens a socket, and every emission is a no-op.
    ///
    /// Defaults to `false`.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the connect timeout.
    ///
    /// This bounds how long building the client may take to resolve the remote address and set up the socket. When the
    /// timeout is reached, the client is built without a destination and drops everything it emits.
    ///
    /// Defaults to 5 seconds.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the random source used for sampling.
    ///
    /// Defaults to [`ThreadLocalRandom`].
    #[must_use]
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Sets a hook to call whenever a metric line is dropped.
    ///
    /// Dropped lines are always counted in the client's telemetry, whether or not a hook is set. The hook is called
    /// inline on the emitting thread.
    #[must_use]
    pub fn with_drop_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(DropReason, &str) + Send + Sync + 'static,
    {
        self.drop_hook = Some(Arc::new(hook));
        self
    }

    /// Use a custom transport instead of connecting to the remote server over UDP.
    ///
    /// When set, the host, port and connect timeout are ignored. A disabled client never writes to the transport.
    #[must_use]
    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Builds the client.
    ///
    /// Unless the client is disabled, or a custom transport was given, this connects to the remote server, blocking for
    /// at most the connect timeout. Connection failures are logged and otherwise ignored.
    pub fn build(self) -> StatsdClient {
        let BrubeckBuilder { prefix, host, port, disabled, connect_timeout, random, drop_hook, transport } =
            self;

        let destination = if disabled {
            None
        } else if let Some(transport) = transport {
            Some(transport)
        } else {
            match forwarder::connect(&host, port, connect_timeout) {
                Ok(transport) => {
                    debug!(%host, port, "Connected to remote server.");
                    Some(Box::new(transport) as Box<dyn Transport>)
                }
                Err(e) => {
                    warn!(error = %e, %host, port, "Failed to connect to remote server. Metrics will be dropped.");
                    None
                }
            }
        };

        StatsdClient::from_parts(prefix, disabled, destination, random, Telemetry::new(drop_hook))
    }

    /// Builds the client and wraps it in a recorder for the [`metrics`] facade.
    ///
    /// The recorder must be manually installed by the caller.
    pub fn build_recorder(self) -> BrubeckRecorder {
        BrubeckRecorder::new(Arc::new(self.build()))
    }

    /// Builds the client and installs it as the global recorder.
    ///
    /// # Errors
    ///
    /// If a global recorder is already installed, an error will be returned.
    pub fn install(self) -> Result<(), BuildError> {
        let recorder = self.build_recorder();

        metrics::set_global_recorder(recorder).map_err(|_| BuildError::FailedToInstall)
    }
}

impl Default for BrubeckBuilder {
    fn default() -> Self {
        BrubeckBuilder {
            prefix: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            disabled: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            random: Arc::new(ThreadLocalRandom),
            drop_hook: None,
            transport: None,
        }
    }
}
