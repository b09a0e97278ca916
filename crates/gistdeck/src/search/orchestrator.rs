//! Aggregated gist search.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use super::gist_ref::GistRef;
use crate::gist::{Gist, GistApi, GistError, MAX_PER_PAGE, Result, short_error_message};

/// Most results a single search returns.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Pages of the user's own gists crawled by the name search.
pub const DEFAULT_USER_PAGES: u32 = 5;

/// Pages of public gists crawled by the name search.
pub const DEFAULT_PUBLIC_PAGES: u32 = 1;

/// Crawl bounds for the name search and the result cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub user_pages: u32,
    pub public_pages: u32,
    pub per_page: u32,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            user_pages: DEFAULT_USER_PAGES,
            public_pages: DEFAULT_PUBLIC_PAGES,
            per_page: MAX_PER_PAGE,
            max_results: MAX_SEARCH_RESULTS,
        }
    }
}

/// Result of one search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query named a gist and it exists.
    Single(Gist),
    /// Keyword hits, deduplicated and ranked. Never empty.
    Many(Vec<Gist>),
    /// The caller cleared the query.
    Cleared,
    /// Nothing matched.
    Empty,
}

impl SearchOutcome {
    pub fn gists(&self) -> &[Gist] {
        match self {
            Self::Single(gist) => std::slice::from_ref(gist),
            Self::Many(gists) => gists,
            Self::Cleared | Self::Empty => &[],
        }
    }

    pub fn into_gists(self) -> Vec<Gist> {
        match self {
            Self::Single(gist) => vec![gist],
            Self::Many(gists) => gists,
            Self::Cleared | Self::Empty => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.gists().len()
    }

    pub fn is_empty(&self) -> bool {
        self.gists().is_empty()
    }
}

/// Turns a search box entry into a [`SearchOutcome`].
///
/// Identifier-shaped input is a direct lookup and works without a session.
/// Everything else runs a content search and a name search side by side and
/// merges them, name hits first.
#[derive(Clone)]
pub struct SearchOrchestrator {
    api: Arc<dyn GistApi>,
    config: SearchConfig,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("config", &self.config)
            .finish()
    }
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn GistApi>) -> Self {
        Self::with_config(api, SearchConfig::default())
    }

    /// `max_results` is capped at [`MAX_SEARCH_RESULTS`].
    pub fn with_config(api: Arc<dyn GistApi>, mut config: SearchConfig) -> Self {
        if config.max_results > MAX_SEARCH_RESULTS {
            tracing::debug!(
                "max_results {} capped at {}",
                config.max_results,
                MAX_SEARCH_RESULTS
            );
            config.max_results = MAX_SEARCH_RESULTS;
        }
        Self { api, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The outcome for an emptied search box.
    pub fn clear(&self) -> SearchOutcome {
        SearchOutcome::Cleared
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GistError::validation("Search query cannot be empty"));
        }

        let keywords = match GistRef::parse(query) {
            GistRef::Id(id) => {
                tracing::debug!("Query {:?} looks like gist id {}", query, id);
                return Ok(match self.api.get_gist(&id).await? {
                    Some(gist) => SearchOutcome::Single(gist),
                    None => SearchOutcome::Empty,
                });
            }
            GistRef::Keywords(keywords) => keywords,
        };

        if !self.api.session().is_authenticated() {
            return Err(GistError::AuthRequired);
        }

        let (by_content, by_name) = tokio::join!(
            self.api.search_by_content(&keywords),
            self.search_by_name(&keywords)
        );

        let by_content = match by_content {
            Ok(gists) => gists,
            Err(e) if e.is_systemic() => return Err(e),
            Err(e) => {
                tracing::warn!("Content search failed: {}", short_error_message(&e));
                Vec::new()
            }
        };
        let by_name = by_name.unwrap_or_else(|e| {
            tracing::warn!("Name search failed: {}", short_error_message(&e));
            Vec::new()
        });

        tracing::debug!(
            "Search {:?}: {} name hits, {} content hits",
            keywords,
            by_name.len(),
            by_content.len()
        );

        let merged = merge_results(by_name, by_content, self.config.max_results);
        Ok(if merged.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Many(merged)
        })
    }

    /// Match the query against descriptions and primary filenames of the
    /// user's recent gists and a page of public gists.
    ///
    /// Any failed page fails the whole branch.
    async fn search_by_name(&self, query: &str) -> Result<Vec<Gist>> {
        let mut candidates = Vec::new();

        for page in 1..=self.config.user_pages {
            let result = self
                .api
                .list_authenticated_user_gists(page, self.config.per_page)
                .await?;
            candidates.extend(result.gists);
            if !result.cursor.has_next {
                break;
            }
        }

        for page in 1..=self.config.public_pages {
            let result = self
                .api
                .list_public_gists(page, self.config.per_page)
                .await?;
            candidates.extend(result.gists);
            if !result.cursor.has_next {
                break;
            }
        }

        let needle = query.to_lowercase();
        let mut seen = HashSet::new();
        let mut matches: Vec<Gist> = candidates
            .into_iter()
            .filter(|gist| matches_name(gist, &needle))
            .filter(|gist| seen.insert(gist.id.clone()))
            .collect();

        rank_by_name(&mut matches, &needle);
        Ok(matches)
    }
}

fn matches_name(gist: &Gist, needle: &str) -> bool {
    let description = gist
        .description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(needle));
    let filename = gist
        .primary_file()
        .is_some_and(|f| f.filename.to_lowercase().contains(needle));
    description || filename
}

/// Exact description matches first, then prefix matches, then most
/// recently updated.
fn rank_by_name(gists: &mut [Gist], needle: &str) {
    gists.sort_by_cached_key(|gist| {
        let description = gist.description.as_deref().unwrap_or_default().to_lowercase();
        let tier = if description == needle {
            0u8
        } else if description.starts_with(needle) {
            1
        } else {
            2
        };
        (tier, Reverse(gist.updated_at))
    });
}

/// Concatenate `first` then `second`, dropping repeated ids, up to `limit`.
pub fn merge_results(first: Vec<Gist>, second: Vec<Gist>, limit: usize) -> Vec<Gist> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|gist| seen.insert(gist.id.clone()))
        .take(limit)
        .collect()
}
