// ── Runtime connection configuration ──
//
// These types describe *how* to connect to a tenant. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `PlatformConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

/// Credentials for a tenant user.
///
/// The platform uses HTTP Basic auth with an optional `tenant/` prefix
/// on the username; cloud tenants usually carry the tenant in the host
/// name, on-premise installs need it explicit.
#[derive(Debug, Clone)]
pub struct TenantCredentials {
    pub tenant: Option<String>,
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// System CA store (strict). Default — tenants are normally behind
    /// publicly trusted certificates.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed on-premise installs).
    DangerAcceptInvalid,
}

impl PartialEq for TlsVerification {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SystemDefaults, Self::SystemDefaults)
            | (Self::DangerAcceptInvalid, Self::DangerAcceptInvalid) => true,
            (Self::CustomCa(a), Self::CustomCa(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TlsVerification {}

/// Configuration for connecting to a single tenant.
///
/// Built by the CLI/UI layer, passed to `Platform` -- core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Tenant base URL (e.g., `https://acme.cumulocity.com`).
    pub url: Url,
    /// Basic-auth credentials.
    pub credentials: TenantCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout for REST calls. The realtime connect poll is
    /// exempt (it must outlive any sane request timeout).
    pub timeout: std::time::Duration,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Enable the realtime long-poll subscription.
    pub realtime_enabled: bool,
    /// Page size used when walking collection endpoints.
    pub page_size: i32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            url: "https://demo.cumulocity.com"
                .parse()
                .expect("static URL is valid"),
            credentials: TenantCredentials {
                tenant: None,
                username: "admin".into(),
                password: SecretString::from(String::new()),
            },
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
            refresh_interval_secs: 300,
            realtime_enabled: true,
            page_size: 200,
        }
    }
}
