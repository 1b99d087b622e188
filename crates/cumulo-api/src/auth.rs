// Basic authentication for the platform REST and realtime endpoints.
//
// Cumulocity uses HTTP Basic auth with an optional tenant prefix:
// `tenant/username:password`. The encoded header is injected as a
// default header on every request, marked sensitive so it never shows
// up in debug output.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Basic-auth credentials for a tenant.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Tenant ID, prefixed to the username when present
    /// (`tenant/username`). Cloud instances usually encode the tenant
    /// in the host name instead, so this is optional.
    pub tenant: Option<String>,
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(
        tenant: Option<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            tenant,
            username: username.into(),
            password,
        }
    }

    /// The `user` part of the Basic pair, with tenant prefix applied.
    pub fn qualified_username(&self) -> String {
        match &self.tenant {
            Some(tenant) => format!("{tenant}/{}", self.username),
            None => self.username.clone(),
        }
    }

    /// Build the `Authorization: Basic …` header value.
    pub fn authorization_header(&self) -> Result<HeaderValue, Error> {
        let raw = format!(
            "{}:{}",
            self.qualified_username(),
            self.password.expose_secret()
        );
        let encoded = BASE64.encode(raw.as_bytes());
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|e| {
            Error::Authentication {
                message: format!("invalid credential header value: {e}"),
            }
        })?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Default header map for a client authenticated as this user.
    pub fn default_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, self.authorization_header()?);
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_with_tenant_prefix() {
        let creds = Credentials::new(
            Some("t12345".into()),
            "alice",
            SecretString::from("s3cret".to_string()),
        );
        let header = creds.authorization_header().unwrap();
        // base64("t12345/alice:s3cret")
        assert_eq!(header.to_str().unwrap(), "Basic dDEyMzQ1L2FsaWNlOnMzY3JldA==");
        assert!(header.is_sensitive());
    }

    #[test]
    fn qualified_username_without_tenant() {
        let creds = Credentials::new(None, "alice", SecretString::from("pw".to_string()));
        assert_eq!(creds.qualified_username(), "alice");
    }

    #[test]
    fn default_headers_carry_accept_json() {
        let creds = Credentials::new(None, "alice", SecretString::from("pw".to_string()));
        let headers = creds.default_headers().unwrap();
        assert_eq!(
            headers.get(reqwest::header::ACCEPT).unwrap(),
            "application/json"
        );
        assert!(headers.contains_key(reqwest::header::AUTHORIZATION));
    }
}
