use std::sync::Arc;

use gistdeck::gist::{Gist, GistError, short_error_message};
use gistdeck::search::extract_gist_id;
use gistdeck::{ApiRateLimiter, FileSessionStore, GistClient, RetryConfig, Session, with_retry};

use crate::config::Config;

/// Everything a command needs to talk to the API.
pub(crate) struct Context {
    pub(crate) client: Arc<GistClient>,
    pub(crate) session: Session,
    pub(crate) store: Option<FileSessionStore>,
    pub(crate) retry: RetryConfig,
    /// Listing page size when `--per-page` is not given.
    pub(crate) per_page: u32,
}

impl Context {
    pub(crate) fn new(config: &Config) -> Result<Self, GistError> {
        let store = Config::session_path().map(FileSessionStore::new);
        let session = load_session(config, store.as_ref());

        let rate_limiter = (config.github.requests_per_second > 0)
            .then(|| ApiRateLimiter::new(config.github.requests_per_second));
        let client = GistClient::with_base_url(&config.github.api_url, session.clone(), rate_limiter)?;

        Ok(Self {
            client: Arc::new(client),
            session,
            store,
            retry: config.retry_config(),
            per_page: config.github.per_page,
        })
    }

    /// Fetch a gist by id or URL, retrying transient failures.
    pub(crate) async fn resolve_gist(&self, id_or_url: &str) -> Result<Gist, GistError> {
        let id = extract_gist_id(id_or_url);
        self.client
            .get_gist_with_retry(&id, &self.retry)
            .await?
            .ok_or(GistError::NotFound(id))
    }

    /// Retry a read with the configured policy.
    pub(crate) async fn read<T, F, Fut>(&self, label: &str, operation: F) -> Result<T, GistError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GistError>>,
    {
        with_retry(
            operation,
            &self.retry,
            GistError::is_retryable,
            short_error_message,
            label,
        )
        .await
    }

    /// Make sure the signed-in user's login is known, so ownership checks
    /// work. Failures are logged and ignored.
    pub(crate) async fn ensure_current_user(&self) {
        if !self.session.is_authenticated() || self.session.current_login().is_some() {
            return;
        }
        match self.client.refresh_current_user().await {
            Ok(user) => {
                tracing::debug!("Signed in as {}", user.login);
                self.save_session();
            }
            Err(e) => tracing::warn!("Could not fetch current user: {}", short_error_message(&e)),
        }
    }

    /// Persist the session if there is a store. Failures are logged.
    pub(crate) fn save_session(&self) {
        if let Some(store) = &self.store
            && let Err(e) = self.session.persist(store)
        {
            tracing::warn!("Failed to save session to {}: {}", store.path().display(), e);
        }
    }
}

/// Session from the store, with a configured token taking precedence.
///
/// The cached user is kept only when it belongs to the same token.
pub(crate) fn load_session(config: &Config, store: Option<&FileSessionStore>) -> Session {
    let restored = match store {
        Some(store) => Session::restore(store).unwrap_or_else(|e| {
            tracing::warn!("Ignoring saved session: {}", e);
            Session::anonymous()
        }),
        None => Session::anonymous(),
    };

    match config.github_token() {
        Some(token) => {
            let user = restored
                .current_user()
                .filter(|_| restored.token().as_deref() == Some(token.as_str()));
            Session::with_token(token, user)
        }
        None => restored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gistdeck::AuthUser;

    fn octocat() -> AuthUser {
        AuthUser {
            login: "octocat".into(),
            id: 1,
            avatar_url: String::new(),
            name: None,
            email: None,
        }
    }

    fn config_with_token(token: Option<&str>) -> Config {
        let mut config = Config::default();
        config.github.token = token.map(str::to_string);
        config
    }

    #[test]
    fn test_load_session_without_store_or_token_is_anonymous() {
        let session = load_session(&config_with_token(None), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_load_session_restores_saved_login() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileSessionStore::new(dir.path().join("session.json"));
        Session::with_token("saved", Some(octocat()))
            .persist(&store)
            .unwrap();

        let session = load_session(&config_with_token(None), Some(&store));
        assert_eq!(session.token().as_deref(), Some("saved"));
        assert_eq!(session.current_login().as_deref(), Some("octocat"));
    }

    #[test]
    fn test_configured_token_wins_and_drops_foreign_user() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileSessionStore::new(dir.path().join("session.json"));
        Session::with_token("saved", Some(octocat()))
            .persist(&store)
            .unwrap();

        let session = load_session(&config_with_token(Some("configured")), Some(&store));
        assert_eq!(session.token().as_deref(), Some("configured"));
        assert_eq!(session.current_user(), None);

        let same = load_session(&config_with_token(Some("saved")), Some(&store));
        assert_eq!(same.current_login().as_deref(), Some("octocat"));
    }

    #[test]
    fn test_corrupt_store_falls_back_to_anonymous() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{broken").unwrap();

        let session = load_session(&config_with_token(None), Some(&FileSessionStore::new(&path)));
        assert!(!session.is_authenticated());
    }
}
