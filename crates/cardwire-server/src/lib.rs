//! Cardwire production server.
//!
//! Wires the sans-IO [`cardwire_core`] match engine to a TLS-over-TCP
//! transport: per connection, a handshake phase (login/resume) followed
//! by a synchronous play loop (read -> engine step -> write). The
//! session store is the only state shared across connections.
//!
//! # Components
//!
//! - [`TlsTransport`]: TLS-over-TCP listener and acceptor
//! - [`SessionStore`]: fixed-capacity in-process session registry
//! - [`Counters`]: connection/packet counters
//! - [`SystemEnv`]: production environment (real time, OS entropy)
//! - `worker`: per-connection handshake + play loop

pub mod counters;
pub mod error;
pub mod snapshot;
pub mod store;
mod system_env;
mod transport;
mod worker;

use std::sync::Arc;

pub use counters::Counters;
pub use error::ServerError;
pub use store::SessionStore;
pub use system_env::SystemEnv;
use tokio::task::JoinSet;
pub use transport::TlsTransport;

/// Runtime configuration for [`Server::bind`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to, e.g. `"0.0.0.0:9000"`.
    pub bind_address: String,
    /// Path to a PEM certificate. `None` falls back to a self-signed cert,
    /// which the binary never does by default — see [`Self::default`].
    pub cert_path: Option<String>,
    /// Path to the matching PEM private key.
    pub key_path: Option<String>,
}

impl Default for ServerConfig {
    /// Matches the protocol's fixed-filename default: `server.crt`/
    /// `server.key` from the working directory.
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9000".to_string(),
            cert_path: Some("server.crt".to_string()),
            key_path: Some("server.key".to_string()),
        }
    }
}

/// The bound, running server.
pub struct Server {
    transport: TlsTransport,
    store: Arc<SessionStore>,
    counters: Arc<Counters>,
    env: SystemEnv,
}

impl Server {
    /// Binds the listening socket and initializes the session store and
    /// counters.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] or [`ServerError::Transport`] if the bind
    /// address is invalid or the TLS context cannot be built.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let transport =
            TlsTransport::bind(&config.bind_address, config.cert_path.as_deref(), config.key_path.as_deref())
                .await?;

        Ok(Self { transport, store: Arc::new(SessionStore::new()), counters: Arc::new(Counters::new()), env: SystemEnv })
    }

    /// Local address the server is bound to.
    ///
    /// # Errors
    ///
    /// [`ServerError::Transport`] if the listener's local address cannot be
    /// read.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.transport.local_addr()
    }

    /// Accepts connections until SIGINT/SIGTERM, spawning one task per
    /// connection. Shutdown is cooperative: once the signal fires, the
    /// accept loop stops and in-flight workers are allowed to finish their
    /// current step before the function returns.
    pub async fn run(self) -> Result<(), ServerError> {
        let local_addr = self.local_addr()?;
        tracing::info!(%local_addr, "cardwire server listening");

        let mut workers = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.transport.accept() => {
                    match accepted {
                        Ok((stream, remote_addr)) => {
                            tracing::debug!(%remote_addr, "accepted connection");
                            let store = Arc::clone(&self.store);
                            let counters = Arc::clone(&self.counters);
                            let env = self.env.clone();
                            workers.spawn(async move {
                                worker::run_connection(stream, store, counters, env).await;
                            });
                        }
                        Err(err) => {
                            tracing::warn!(%err, "accept failed");
                        }
                    }
                }
                () = shutdown_signal() => {
                    tracing::info!("shutdown signal received, closing listener");
                    break;
                }
            }
        }

        while workers.join_next().await.is_some() {}

        tracing::info!(
            connections = self.counters.connections(),
            packets = self.counters.packets(),
            "cardwire server stopped"
        );

        Ok(())
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        #[allow(clippy::expect_used)]
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        #[allow(clippy::expect_used)]
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        #[allow(clippy::expect_used)]
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    }
}
