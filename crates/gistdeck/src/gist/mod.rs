//! Remote gist access layer.
//!
//! Everything that talks to the gist API goes through here. The rest of the
//! crate depends on the [`GistApi`] trait, never on the transport.
//!
//! # Module Structure
//!
//! - [`error`] - Error taxonomy shared by every operation
//! - [`types`] - Wire types (gists, files, owners, request bodies)
//! - [`pagination`] - `Link` header interpretation
//! - [`client`] - The HTTP-backed [`GistClient`]
//!
//! # Example
//!
//! ```ignore
//! use gistdeck::gist::GistClient;
//! use gistdeck::session::Session;
//!
//! let client = GistClient::new(Session::with_token(token, None))?;
//! let page = client.list_public_gists(1, 10).await?;
//! for gist in &page.gists {
//!     println!("{} {}", gist.id, gist.title());
//! }
//! ```

mod client;
mod error;
mod pagination;
mod types;

use async_trait::async_trait;

use crate::session::Session;

pub use client::{DEFAULT_API_URL, GistClient, MAX_CONTENT_SEARCH_RESULTS};
pub use error::{GistError, Result, short_error_message};
pub use pagination::{LinkPagination, PageCursor, parse_link_header};
pub use types::{
    AuthUser, DEFAULT_PER_PAGE, FileContent, Gist, GistFile, GistOwner, GistPage, GistUpdate,
    MAX_PER_PAGE, NewGist,
};

/// Operations offered by the gist API.
///
/// [`GistClient`] is the production implementation; the search orchestrator
/// and the mutation coordinator are written against this trait.
#[async_trait]
pub trait GistApi: Send + Sync {
    /// The session whose token authenticates requests.
    fn session(&self) -> &Session;

    async fn list_public_gists(&self, page: u32, per_page: u32) -> Result<GistPage>;

    async fn list_user_gists(&self, username: &str, page: u32, per_page: u32)
    -> Result<GistPage>;

    async fn list_authenticated_user_gists(&self, page: u32, per_page: u32) -> Result<GistPage>;

    /// `Ok(None)` when the gist does not exist (HTTP 404).
    async fn get_gist(&self, id: &str) -> Result<Option<Gist>>;

    async fn create_gist(&self, gist: &NewGist) -> Result<Gist>;

    async fn update_gist(&self, id: &str, update: &GistUpdate) -> Result<Gist>;

    async fn delete_gist(&self, id: &str) -> Result<()>;

    async fn star_gist(&self, id: &str) -> Result<()>;

    async fn unstar_gist(&self, id: &str) -> Result<()>;

    async fn is_gist_starred(&self, id: &str) -> Result<bool>;

    async fn fork_gist(&self, id: &str) -> Result<Gist>;

    /// Code search restricted to gist files, resolved back to gists.
    async fn search_by_content(&self, query: &str) -> Result<Vec<Gist>>;

    async fn get_authenticated_user(&self) -> Result<AuthUser>;
}
