// Omada API HTTP client
//
// Wraps `reqwest::Client` with base-URL discovery, session header
// injection and envelope unwrapping. Endpoint groups (clients, devices,
// alerts) are inherent methods in sibling modules so this file stays
// about transport mechanics.

use std::future::Future;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Session;
use crate::envelope::{decode_body, preview};
use crate::error::Error;
use crate::pager::{DEFAULT_PAGE_SIZE, Page, PageFetcher, PageQuery, Pager};
use crate::transport::TransportConfig;

/// Site used when the caller doesn't name one.
pub const DEFAULT_SITE: &str = "Default";

/// Redirect target header read during discovery.
const HEADER_LOCATION: &str = "Location";

/// HTTP client for one site on an Omada controller.
///
/// All request helpers return the unwrapped `result` payload; the
/// `{errorCode, msg, result}` envelope never reaches the caller.
pub struct OmadaClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
    page_size: u32,
    session: Session,
}

impl OmadaClient {
    /// Discover the API base URL of `host` and build a client for `site`.
    pub async fn connect(
        host: &str,
        site: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Self::discover_base_url(host, transport).await?;
        debug!("using base URL {base_url}");
        Self::new(base_url, site, transport)
    }

    /// Build a client for an already known API base URL
    /// (e.g. `https://controller:8043/<omadac-id>/api/v2`).
    ///
    /// A cookie jar is added if the transport doesn't carry one, since the
    /// controller's session cookie must survive between requests.
    pub fn new(
        base_url: Url,
        site: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::with_client(http, base_url, site))
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, site: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            site: site.into(),
            page_size: DEFAULT_PAGE_SIZE,
            session: Session::new(),
        }
    }

    /// Default page size for paged listings made through this client.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ── Discovery ────────────────────────────────────────────────────

    /// Ask the controller root where it lives.
    ///
    /// The root answers with a redirect to `<prefix>/login`; the API is
    /// served from `<prefix>/api/v2`. `host` may be a bare host[:port]
    /// (HTTPS assumed) or a full URL.
    pub async fn discover_base_url(host: &str, transport: &TransportConfig) -> Result<Url, Error> {
        let root = if host.contains("://") {
            Url::parse(host)?
        } else {
            Url::parse(&format!("https://{host}"))?
        };

        let http = transport.build_discovery_client()?;
        debug!("probing {root} for API base URL");
        let resp = http.get(root.clone()).send().await?;

        if !resp.status().is_redirection() {
            debug!(status = %resp.status(), "controller root did not redirect");
            return Err(Error::MissingRedirect {
                host: host.to_owned(),
            });
        }

        let location = resp
            .headers()
            .get(HEADER_LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::MissingRedirect {
                host: host.to_owned(),
            })?;

        let login = root.join(location)?;
        let prefix = login.as_str().trim_end_matches('/');
        let prefix = prefix.strip_suffix("/login").unwrap_or(prefix);
        Ok(Url::parse(&format!("{prefix}/api/v2"))?)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Full URL for an API path such as `/loginStatus`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    /// Path scoped to the client's site: `/sites/{site}{suffix}`.
    pub(crate) fn site_path(&self, suffix: &str) -> String {
        format!("/sites/{}{suffix}", self.site)
    }

    // ── Request primitives ───────────────────────────────────────────

    /// Perform one request and unwrap the response envelope.
    ///
    /// Non-2xx statuses fail as [`Error::Transport`] before the body is
    /// read. The HTML login page served after a lapsed session arrives as a
    /// 200 (redirects are followed) and decodes as [`Error::NotJson`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.api_url(path)?;
        debug!("{method} {url} params={params:?}");

        let mut builder = self.http.request(method, url.clone());
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = self.session.apply(builder).send().await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, "request to {url} failed");
        }
        let text = resp.error_for_status()?.text().await?;
        trace!(%status, "response from {url}: {text}");

        decode_body(url.as_str(), &text)
    }

    /// Like [`request`](Self::request), deserializing the payload into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let payload = self.request(method, path, params, body).await?;
        T::deserialize(&payload).map_err(|e| Error::Deserialization {
            message: format!("{e} (from {path})"),
            body: preview(&payload.to_string()),
        })
    }

    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, Error> {
        self.request(Method::GET, path, params, None).await
    }

    pub async fn get_as<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        self.request_as(Method::GET, path, params, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, Error> {
        self.request(Method::POST, path, &[], body).await
    }

    pub async fn post_as<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        self.request_as(Method::POST, path, &[], body).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, Error> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    // ── Paging ───────────────────────────────────────────────────────

    /// Describe a paged listing at `path`, falling back to the client's
    /// page size.
    pub fn page_query(
        &self,
        path: String,
        page_size: Option<u32>,
        params: Vec<(&'static str, String)>,
    ) -> PageQuery {
        PageQuery::new(path, page_size.unwrap_or(self.page_size)).with_params(params)
    }

    /// Pager over `query`, starting at `page` (default 1).
    pub fn pager<T>(&self, query: PageQuery, page: Option<u32>) -> Pager<'_, Self, T>
    where
        T: DeserializeOwned + Send,
    {
        Pager::new(self, query, page)
    }
}

impl<T> PageFetcher<T> for OmadaClient
where
    T: DeserializeOwned + Send,
{
    fn fetch_page(
        &self,
        query: &PageQuery,
        page: u32,
    ) -> impl Future<Output = Result<Page<T>, Error>> + Send {
        let params = query.params_for(page);
        let path = query.path().to_owned();
        async move { self.get_as(&path, &params).await }
    }
}
