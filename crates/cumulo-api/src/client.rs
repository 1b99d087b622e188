// Hand-crafted async HTTP client for the Cumulocity REST API.
//
// Base path: the tenant root (e.g. https://tenant.cumulocity.com/)
// Auth: HTTP Basic via default Authorization header
//
// Resource endpoints (inventory, alarms, events, operations,
// measurements, identity, provisioning) are implemented as inherent
// methods in sibling files to keep this module focused on transport
// mechanics.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::auth::Credentials;
use crate::transport::TransportConfig;
use crate::types::Page;

// ── Error response shape from the platform ───────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    /// Error code in `"<domain>/<name>"` form, e.g. `"inventory/notFound"`.
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the platform REST API.
///
/// Uses Basic authentication and communicates via JSON bodies under the
/// tenant base URL. Cheap to clone — the inner `reqwest::Client` is an
/// `Arc` internally.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and transport config.
    ///
    /// Injects `Authorization: Basic …` as a default header on every
    /// request; the header is marked sensitive.
    pub fn from_credentials(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let headers = credentials.default_headers()?;
        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with a single `/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The tenant base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (shared by the realtime subscriber
    /// when no dedicated long-poll client is configured).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"inventory/managedObjects"`) onto the
    /// base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        // Endpoint paths are compile-time constants plus platform IDs,
        // but IDs come off the wire, so joins stay fallible.
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_no_content<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    pub(crate) async fn delete_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url} params={params:?}");

        let resp = self.http.delete(url).query(params).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: if raw.is_empty() {
                    "credentials rejected".into()
                } else {
                    envelope_message(&raw).unwrap_or(raw)
                },
            };
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Error::AccessDenied {
                message: envelope_message(&raw).unwrap_or_else(|| status.to_string()),
            };
        }

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                error: err.error,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                error: None,
            }
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect all pages of a collection into a single `Vec`.
    ///
    /// `fetch` receives `(current_page, page_size)` and is expected to
    /// request `withTotalPages=true`; walking stops on the first page
    /// shorter than `page_size` or once `totalPages` is reached.
    pub async fn paginate_all<C, F, Fut>(
        &self,
        page_size: i32,
        fetch: F,
    ) -> Result<Vec<C::Item>, Error>
    where
        C: Page,
        F: Fn(i32, i32) -> Fut,
        Fut: Future<Output = Result<C, Error>>,
    {
        let mut all = Vec::new();
        let mut current_page: i32 = 1;

        loop {
            let page = fetch(current_page, page_size).await?;
            let total_pages = page.statistics().total_pages;
            let items = page.into_items();
            let received = items.len();
            all.extend(items);

            let page_size_usize = usize::try_from(page_size).unwrap_or(0);
            let exhausted = match total_pages {
                Some(total) => current_page >= total,
                None => received < page_size_usize,
            };
            if exhausted || received == 0 {
                break;
            }

            current_page += 1;
        }

        Ok(all)
    }
}

/// Pull the `message` field out of a platform error envelope, if the
/// body is one.
fn envelope_message(raw: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(raw)
        .ok()
        .and_then(|e| e.message)
}

/// Standard query parameters for collection endpoints.
pub(crate) fn paging_params(current_page: i32, page_size: i32) -> Vec<(&'static str, String)> {
    vec![
        ("currentPage", current_page.to_string()),
        ("pageSize", page_size.to_string()),
        ("withTotalPages", "true".to_string()),
    ]
}
