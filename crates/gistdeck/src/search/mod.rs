//! Aggregated search.
//!
//! [`SearchOrchestrator::search`] accepts whatever the user typed. Gist ids
//! and gist URLs resolve to a direct lookup ([`SearchOutcome::Single`]);
//! anything else fans out to content search and a name crawl, merged into
//! at most [`MAX_SEARCH_RESULTS`] unique gists.

mod gist_ref;
mod orchestrator;

pub use gist_ref::{GistRef, MIN_BARE_ID_LEN, extract_gist_id};
pub use orchestrator::{
    DEFAULT_PUBLIC_PAGES, DEFAULT_USER_PAGES, MAX_SEARCH_RESULTS, SearchConfig, SearchOrchestrator,
    SearchOutcome, merge_results,
};
