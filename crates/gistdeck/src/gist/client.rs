//! HTTP-backed gist client.

use std::sync::Arc;
#[cfg(feature = "reqwest")]
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;
use url::Url;

use super::error::{GistError, Result, short_error_message};
use super::pagination::PageCursor;
use super::types::{AuthUser, CodeSearchResponse, Gist, GistPage, GistUpdate, NewGist};
use super::GistApi;
use crate::http::{HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::rate_limit::ApiRateLimiter;
use crate::retry::{RetryConfig, with_retry};
use crate::session::Session;
use crate::validate;

#[cfg(feature = "reqwest")]
use crate::http::reqwest_transport::ReqwestTransport;

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Code search hits resolved into gists per query.
pub const MAX_CONTENT_SEARCH_RESULTS: usize = 10;

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("gistdeck/", env!("CARGO_PKG_VERSION"));

/// Repository names in code search results look like `gist:<id>`.
const GIST_REPO_PREFIX: &str = "gist:";

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Fail with [`GistError::AuthRequired`] before sending if there is no token.
    Required,
    /// Send the token when there is one.
    IfAvailable,
}

/// Gist API client.
///
/// Holds no mutable state of its own: the base URL, the transport, the
/// session that supplies auth headers, and an optional shared rate limiter.
/// Cheap to clone.
#[derive(Clone)]
pub struct GistClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    session: Session,
    /// Optional rate limiter for pacing API requests.
    rate_limiter: Option<ApiRateLimiter>,
}

impl std::fmt::Debug for GistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GistClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}

impl GistClient {
    /// Create a client for api.github.com using the reqwest transport.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let session = Session::with_token("ghp_...", None);
    /// let client = GistClient::new(session)?;
    /// ```
    #[cfg(feature = "reqwest")]
    pub fn new(session: Session) -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL, session, None)
    }

    /// Create a client for another API root (GitHub Enterprise, a proxy).
    #[cfg(feature = "reqwest")]
    pub fn with_base_url(
        base_url: &str,
        session: Session,
        rate_limiter: Option<ApiRateLimiter>,
    ) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(GistError::from)?;

        Ok(Self::new_with_transport(
            base_url,
            session,
            rate_limiter,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        base_url: &str,
        session: Session,
        rate_limiter: Option<ApiRateLimiter>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            rate_limiter,
        }
    }

    /// Get the API root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wait for rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// Build an absolute URL from path segments and query pairs.
    ///
    /// Segments are percent-encoded, so a literal id such as `a/b` stays a
    /// single path segment.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GistError::validation(format!("invalid API URL {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| GistError::validation(format!("invalid API URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.into())
    }

    fn headers(&self, auth: Auth, has_body: bool) -> Result<HttpHeaders> {
        let mut headers: HttpHeaders = vec![
            ("Accept".to_string(), ACCEPT.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
        ];
        if has_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        match (self.session.auth_header(), auth) {
            (Some(value), _) => headers.push(("Authorization".to_string(), value)),
            (None, Auth::Required) => return Err(GistError::AuthRequired),
            (None, Auth::IfAvailable) => {}
        }

        Ok(headers)
    }

    /// Send a request and return the raw response, whatever its status.
    ///
    /// Auth is resolved before anything else, so a missing token never
    /// reaches the transport.
    async fn send(
        &self,
        method: HttpMethod,
        url: String,
        auth: Auth,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let headers = self.headers(auth, body.is_some())?;
        self.wait_for_rate_limit().await;

        tracing::debug!("{} {}", method.as_str(), url);

        let request = HttpRequest {
            method,
            url,
            headers,
            body: body.unwrap_or_default(),
        };

        let response = self.transport.send(request).await?;
        tracing::debug!("-> {}", response.status);
        Ok(response)
    }

    async fn send_json<B: serde::Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        body: &B,
    ) -> Result<HttpResponse> {
        let body = serde_json::to_vec(body)?;
        self.send(method, url, Auth::Required, Some(body)).await
    }

    /// Map non-2xx responses to errors.
    fn expect_success(response: HttpResponse) -> Result<HttpResponse> {
        match response.status {
            s if (200..300).contains(&s) => Ok(response),
            401 => Err(GistError::AuthRequired),
            status => Err(GistError::Api {
                status,
                message: api_error_message(&response),
            }),
        }
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body).map_err(GistError::from)
    }

    async fn list_page(&self, segments: &[&str], page: u32, per_page: u32, auth: Auth) -> Result<GistPage> {
        let problems = validate::validate_pagination(page, per_page);
        if let Some(problem) = problems.into_iter().next() {
            return Err(GistError::Validation(problem));
        }

        let url = self.endpoint(
            segments,
            &[("page", page.to_string()), ("per_page", per_page.to_string())],
        )?;
        let response = Self::expect_success(self.send(HttpMethod::Get, url, auth, None).await?)?;

        let cursor = PageCursor::from_link_header(page, response.header("link"));
        let gists: Vec<Gist> = Self::decode(&response)?;

        Ok(GistPage { gists, cursor })
    }

    /// List public gists, newest first.
    pub async fn list_public_gists(&self, page: u32, per_page: u32) -> Result<GistPage> {
        self.list_page(&["gists", "public"], page, per_page, Auth::IfAvailable)
            .await
    }

    /// List a user's public gists.
    pub async fn list_user_gists(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GistPage> {
        let username = non_blank(username, "username")?;
        self.list_page(&["users", username, "gists"], page, per_page, Auth::IfAvailable)
            .await
    }

    /// List the signed-in user's gists, including secret ones.
    pub async fn list_authenticated_user_gists(&self, page: u32, per_page: u32) -> Result<GistPage> {
        self.list_page(&["gists"], page, per_page, Auth::Required)
            .await
    }

    /// Fetch a single gist. A 404 is `Ok(None)`.
    pub async fn get_gist(&self, id: &str) -> Result<Option<Gist>> {
        let id = non_blank(id, "gist id")?;
        let url = self.endpoint(&["gists", id], &[])?;
        let response = self.send(HttpMethod::Get, url, Auth::IfAvailable, None).await?;

        if response.status == 404 {
            tracing::debug!("Gist {} not found", id);
            return Ok(None);
        }

        let response = Self::expect_success(response)?;
        Ok(Some(Self::decode(&response)?))
    }

    /// [`Self::get_gist`] with retries on transient failures.
    pub async fn get_gist_with_retry(&self, id: &str, config: &RetryConfig) -> Result<Option<Gist>> {
        with_retry(
            || self.get_gist(id),
            config,
            GistError::is_retryable,
            short_error_message,
            "get_gist",
        )
        .await
    }

    /// Create a gist owned by the signed-in user.
    pub async fn create_gist(&self, gist: &NewGist) -> Result<Gist> {
        let problems = validate::validate_new_gist(gist);
        if !problems.is_empty() {
            return Err(GistError::Validation(problems.join("; ")));
        }

        let url = self.endpoint(&["gists"], &[])?;
        let response =
            Self::expect_success(self.send_json(HttpMethod::Post, url, gist).await?)?;
        let created: Gist = Self::decode(&response)?;
        tracing::info!("Created gist {}", created.id);
        Ok(created)
    }

    /// Update description and/or files. Ownership is enforced server-side.
    pub async fn update_gist(&self, id: &str, update: &GistUpdate) -> Result<Gist> {
        let id = non_blank(id, "gist id")?;
        if update.is_empty() {
            return Err(GistError::validation("nothing to update"));
        }
        if update.files.keys().any(|name| name.trim().is_empty()) {
            return Err(GistError::validation("Filename cannot be empty"));
        }

        let url = self.endpoint(&["gists", id], &[])?;
        let response =
            Self::expect_success(self.send_json(HttpMethod::Patch, url, update).await?)?;
        Self::decode(&response)
    }

    pub async fn delete_gist(&self, id: &str) -> Result<()> {
        let id = non_blank(id, "gist id")?;
        let url = self.endpoint(&["gists", id], &[])?;
        Self::expect_success(self.send(HttpMethod::Delete, url, Auth::Required, None).await?)?;
        tracing::info!("Deleted gist {}", id);
        Ok(())
    }

    /// Star a gist. The caller is responsible for not starring its own gists.
    pub async fn star_gist(&self, id: &str) -> Result<()> {
        let id = non_blank(id, "gist id")?;
        let url = self.endpoint(&["gists", id, "star"], &[])?;
        Self::expect_success(self.send(HttpMethod::Put, url, Auth::Required, None).await?)?;
        Ok(())
    }

    pub async fn unstar_gist(&self, id: &str) -> Result<()> {
        let id = non_blank(id, "gist id")?;
        let url = self.endpoint(&["gists", id, "star"], &[])?;
        Self::expect_success(self.send(HttpMethod::Delete, url, Auth::Required, None).await?)?;
        Ok(())
    }

    /// 204 means starred, 404 means not starred.
    pub async fn is_gist_starred(&self, id: &str) -> Result<bool> {
        let id = non_blank(id, "gist id")?;
        let url = self.endpoint(&["gists", id, "star"], &[])?;
        let response = self.send(HttpMethod::Get, url, Auth::Required, None).await?;

        match response.status {
            204 => Ok(true),
            404 => Ok(false),
            _ => Self::expect_success(response).map(|_| true),
        }
    }

    /// Fork a gist into the signed-in user's account.
    pub async fn fork_gist(&self, id: &str) -> Result<Gist> {
        let id = non_blank(id, "gist id")?;
        let url = self.endpoint(&["gists", id, "forks"], &[])?;
        let response =
            Self::expect_success(self.send(HttpMethod::Post, url, Auth::Required, None).await?)?;
        let forked: Gist = Self::decode(&response)?;
        tracing::info!("Forked gist {} into {}", id, forked.id);
        Ok(forked)
    }

    /// Search gist file contents through the code search index.
    ///
    /// Hits are mapped back to gist ids, deduplicated in relevance order,
    /// capped at [`MAX_CONTENT_SEARCH_RESULTS`] and fetched concurrently.
    /// Ids that fail to resolve are dropped.
    pub async fn search_by_content(&self, query: &str) -> Result<Vec<Gist>> {
        let query = non_blank(query, "search query")?;
        let url = self.endpoint(
            &["search", "code"],
            &[("q", format!("{} in:file gist:yes", query))],
        )?;
        let response = self.send(HttpMethod::Get, url, Auth::Required, None).await?;

        let response = match response.status {
            403 => return Err(GistError::RateLimited),
            _ => Self::expect_success(response)?,
        };

        let results: CodeSearchResponse = Self::decode(&response)?;
        let ids = gist_ids_from_hits(&results);
        tracing::debug!("Code search for {:?} matched {} gists", query, ids.len());

        let mut tasks = JoinSet::new();
        for (index, id) in ids.into_iter().enumerate() {
            let client = self.clone();
            tasks.spawn(async move {
                let result = client.get_gist(&id).await;
                (index, id, result)
            });
        }

        let mut resolved: Vec<(usize, Gist)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(Some(gist)))) => resolved.push((index, gist)),
                Ok((_, id, Ok(None))) => tracing::debug!("Search hit {} no longer exists", id),
                Ok((_, id, Err(e))) => {
                    tracing::warn!("Failed to resolve search hit {}: {}", id, short_error_message(&e));
                }
                Err(e) => tracing::warn!("Search hit lookup task failed: {}", e),
            }
        }

        resolved.sort_by_key(|(index, _)| *index);
        Ok(resolved.into_iter().map(|(_, gist)| gist).collect())
    }

    /// Fetch the signed-in user's profile.
    pub async fn get_authenticated_user(&self) -> Result<AuthUser> {
        let url = self.endpoint(&["user"], &[])?;
        let response =
            Self::expect_success(self.send(HttpMethod::Get, url, Auth::Required, None).await?)?;
        Self::decode(&response)
    }

    /// Fetch the profile and cache it on the session.
    pub async fn refresh_current_user(&self) -> Result<AuthUser> {
        let user = self.get_authenticated_user().await?;
        self.session.set_user(user.clone());
        Ok(user)
    }
}

fn non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(GistError::validation(format!("{} cannot be empty", what)))
    } else {
        Ok(trimmed)
    }
}

/// Prefer the API's JSON `message` field over the raw body.
fn api_error_message(response: &HttpResponse) -> String {
    #[derive(serde::Deserialize)]
    struct ApiMessage {
        message: String,
    }

    match serde_json::from_slice::<ApiMessage>(&response.body) {
        Ok(body) => body.message,
        Err(_) => {
            let text = response.body_text();
            if text.trim().is_empty() {
                "Unknown error".to_string()
            } else {
                text
            }
        }
    }
}

fn gist_ids_from_hits(results: &CodeSearchResponse) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for item in &results.items {
        let Some(repo) = &item.repository else {
            continue;
        };
        let Some(id) = repo.name.strip_prefix(GIST_REPO_PREFIX) else {
            continue;
        };
        if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
        if ids.len() == MAX_CONTENT_SEARCH_RESULTS {
            break;
        }
    }
    ids
}

#[async_trait]
impl GistApi for GistClient {
    fn session(&self) -> &Session {
        &self.session
    }

    async fn list_public_gists(&self, page: u32, per_page: u32) -> Result<GistPage> {
        GistClient::list_public_gists(self, page, per_page).await
    }

    async fn list_user_gists(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<GistPage> {
        GistClient::list_user_gists(self, username, page, per_page).await
    }

    async fn list_authenticated_user_gists(&self, page: u32, per_page: u32) -> Result<GistPage> {
        GistClient::list_authenticated_user_gists(self, page, per_page).await
    }

    async fn get_gist(&self, id: &str) -> Result<Option<Gist>> {
        GistClient::get_gist(self, id).await
    }

    async fn create_gist(&self, gist: &NewGist) -> Result<Gist> {
        GistClient::create_gist(self, gist).await
    }

    async fn update_gist(&self, id: &str, update: &GistUpdate) -> Result<Gist> {
        GistClient::update_gist(self, id, update).await
    }

    async fn delete_gist(&self, id: &str) -> Result<()> {
        GistClient::delete_gist(self, id).await
    }

    async fn star_gist(&self, id: &str) -> Result<()> {
        GistClient::star_gist(self, id).await
    }

    async fn unstar_gist(&self, id: &str) -> Result<()> {
        GistClient::unstar_gist(self, id).await
    }

    async fn is_gist_starred(&self, id: &str) -> Result<bool> {
        GistClient::is_gist_starred(self, id).await
    }

    async fn fork_gist(&self, id: &str) -> Result<Gist> {
        GistClient::fork_gist(self, id).await
    }

    async fn search_by_content(&self, query: &str) -> Result<Vec<Gist>> {
        GistClient::search_by_content(self, query).await
    }

    async fn get_authenticated_user(&self) -> Result<AuthUser> {
        GistClient::get_authenticated_user(self).await
    }
}
