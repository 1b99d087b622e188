// Shared transport configuration for building reqwest::Client instances.
//
// The REST client and the realtime subscriber share TLS and timeout
// settings through this module, avoiding duplicated builder logic.
// The realtime connect call must be built WITHOUT a request timeout
// (the server holds the poll open), so two builders are exposed.

use std::path::PathBuf;
use std::time::Duration;

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for on-premise installs with self-signed certs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the configured timeout and
    /// additional default headers.
    ///
    /// Used by the REST client to inject the `Authorization` header.
    pub fn build_client_with_headers(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client, crate::error::Error> {
        self.builder_with_headers(headers, Some(self.timeout))
    }

    /// Build a `reqwest::Client` with default headers but NO request
    /// timeout.
    ///
    /// Used by the realtime subscriber: a long-poll connect call stays
    /// open until the server has data, which can legitimately exceed
    /// any sane request timeout.
    pub fn build_long_poll_client(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client, crate::error::Error> {
        self.builder_with_headers(headers, None)
    }

    fn builder_with_headers(
        &self,
        headers: reqwest::header::HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("cumulo/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| {
                    crate::error::Error::Tls(format!("failed to read CA cert: {e}"))
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| crate::error::Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
