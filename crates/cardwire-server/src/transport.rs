//! TLS-over-TCP transport.
//!
//! Wraps a raw `TcpStream` with TLS before the first frame is exchanged —
//! no plaintext frame is ever permitted. The default, protocol-mandated
//! behavior is to load `server.crt`/`server.key` from the working
//! directory (see `main.rs`'s `Args` defaults); passing `None` for both
//! paths instead generates a self-signed certificate, which the binary
//! never does on its own but which callers (tests, embedders) may ask for
//! explicitly.
//!
//! # Security
//!
//! Self-signed certificates are only suitable for local testing. Production
//! deployments MUST supply `server.crt`/`server.key` from a trusted CA.

use std::{net::SocketAddr, sync::Arc};

use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::{TlsAcceptor, server::TlsStream};

use crate::error::ServerError;

/// Bound TCP listener plus the TLS acceptor used to wrap every connection.
pub struct TlsTransport {
    listener: TcpListener,
    acceptor: TlsAcceptor,
}

impl TlsTransport {
    /// Binds a listener and builds a TLS acceptor.
    ///
    /// If `cert_path` and `key_path` are both provided, they are used for
    /// TLS. Otherwise a self-signed certificate is generated — fine for
    /// local testing, never for production.
    pub async fn bind(address: &str, cert_path: Option<&str>, key_path: Option<&str>) -> Result<Self, ServerError> {
        let addr: SocketAddr =
            address.parse().map_err(|e| ServerError::Config(format!("invalid bind address '{address}': {e}")))?;

        let server_config = match (cert_path, key_path) {
            (Some(cert), Some(key)) => load_tls_config(cert, key)?,
            _ => generate_self_signed_config()?,
        };

        let listener = TcpListener::bind(addr).await?;
        let acceptor = TlsAcceptor::from(Arc::new(server_config));

        tracing::info!(%addr, "TLS transport bound");

        Ok(Self { listener, acceptor })
    }

    /// Accepts a raw connection and completes the TLS handshake.
    ///
    /// # Errors
    ///
    /// [`ServerError::Transport`] if the accept or the handshake fails.
    /// Per spec, handshake failures close the socket without a protocol
    /// message.
    pub async fn accept(&self) -> Result<(TlsStream<TcpStream>, SocketAddr), ServerError> {
        let (tcp_stream, remote_addr) =
            self.listener.accept().await.map_err(|e| ServerError::Transport(format!("accept failed: {e}")))?;

        let tls_stream = self
            .acceptor
            .accept(tcp_stream)
            .await
            .map_err(|e| ServerError::Transport(format!("TLS handshake failed: {e}")))?;

        Ok((tls_stream, remote_addr))
    }

    /// Local address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(|e| ServerError::Transport(format!("failed to get local address: {e}")))
    }
}

fn load_tls_config(cert_path: &str, key_path: &str) -> Result<rustls::ServerConfig, ServerError> {
    let cert_pem =
        std::fs::read(cert_path).map_err(|e| ServerError::Config(format!("failed to read cert '{cert_path}': {e}")))?;
    let key_pem =
        std::fs::read(key_path).map_err(|e| ServerError::Config(format!("failed to read key '{key_path}': {e}")))?;

    let certs = rustls_pemfile::certs(&mut &cert_pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Config(format!("failed to parse certificates: {e}")))?;

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|e| ServerError::Config(format!("failed to parse private key: {e}")))?
        .ok_or_else(|| ServerError::Config("no private key found".to_string()))?;

    rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Config(format!("invalid TLS config: {e}")))
}

fn generate_self_signed_config() -> Result<rustls::ServerConfig, ServerError> {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .map_err(|e| ServerError::Config(format!("failed to generate self-signed cert: {e}")))?;

    let cert_der = cert.cert.der().clone();
    let key_der = cert.key_pair.serialize_der();

    let cert_chain = vec![cert_der];
    let key = rustls::pki_types::PrivatePkcs8KeyDer::from(key_der);

    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key.into())
        .map_err(|e| ServerError::Config(format!("invalid TLS config: {e}")))?;

    tracing::warn!("using self-signed certificate - not for production use!");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_binds_with_self_signed() {
        let transport = TlsTransport::bind("127.0.0.1:0", None, None).await;
        assert!(transport.is_ok(), "transport should bind with self-signed cert");

        let transport = transport.expect("checked above");
        let addr = transport.local_addr().expect("should read local addr");
        assert_ne!(addr.port(), 0, "should have assigned a port");
    }

    #[tokio::test]
    async fn transport_rejects_invalid_address() {
        let result = TlsTransport::bind("invalid:address:format", None, None).await;
        assert!(result.is_err(), "should reject invalid address");
    }
}
