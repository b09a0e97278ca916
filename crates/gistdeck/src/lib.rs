//! Gistdeck - browse, search, star and fork GitHub gists.
//!
//! This library wraps the gist REST API behind a typed client and layers
//! two pieces of client-side orchestration on top of it: an aggregated
//! search that understands ids, URLs and keywords, and a coordinator for
//! optimistic star/fork updates.
//!
//! # Features
//!
//! - `reqwest` (default) - Real HTTP transport. Without it, supply your own
//!   [`http::HttpTransport`] to [`GistClient::new_with_transport`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gistdeck::{GistClient, SearchOrchestrator, SearchOutcome, Session};
//!
//! let session = Session::with_token(token, None);
//! let client = Arc::new(GistClient::new(session)?);
//!
//! match SearchOrchestrator::new(client).search("tokio select").await? {
//!     SearchOutcome::Single(gist) => println!("{}", gist.html_url),
//!     SearchOutcome::Many(gists) => println!("{} matches", gists.len()),
//!     SearchOutcome::Cleared | SearchOutcome::Empty => println!("nothing"),
//! }
//! ```

pub mod gist;
pub mod http;
pub mod language;
pub mod mutation;
pub mod rate_limit;
pub mod relative_time;
pub mod retry;
pub mod search;
pub mod session;
pub mod validate;

pub use gist::{
    AuthUser, DEFAULT_API_URL, Gist, GistApi, GistClient, GistError, GistPage, GistUpdate,
    NewGist, PageCursor,
};
pub use mutation::{MutationCoordinator, MutationOutcome};
pub use rate_limit::ApiRateLimiter;
pub use retry::{RetryConfig, with_retry};
pub use search::{GistRef, SearchConfig, SearchOrchestrator, SearchOutcome};
pub use session::{FileSessionStore, Session, SessionStore};
