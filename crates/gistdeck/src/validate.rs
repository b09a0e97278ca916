//! Input checks run before any request is built.
//!
//! Each function returns every problem it finds, in a fixed order, so a
//! form can show them all at once. An empty list means the input is fine.

use crate::gist::{MAX_PER_PAGE, NewGist};

/// Shortest keyword query worth sending.
pub const MIN_QUERY_LEN: usize = 2;

/// Longest keyword query accepted.
pub const MAX_QUERY_LEN: usize = 100;

pub fn validate_new_gist(gist: &NewGist) -> Vec<String> {
    let mut problems = Vec::new();

    if gist.files.is_empty() {
        problems.push("At least one file is required".to_string());
    }

    for (filename, file) in &gist.files {
        if filename.trim().is_empty() {
            problems.push("Filename cannot be empty".to_string());
        }
        if file.content.trim().is_empty() {
            problems.push(format!("File \"{}\" cannot be empty", filename));
        }
    }

    problems
}

/// Lengths are counted in characters after trimming.
pub fn validate_search_query(query: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let query = query.trim();
    let len = query.chars().count();

    if query.is_empty() {
        problems.push("Search query cannot be empty".to_string());
    } else if len < MIN_QUERY_LEN {
        problems.push(format!(
            "Search query must be at least {} characters long",
            MIN_QUERY_LEN
        ));
    }
    if len > MAX_QUERY_LEN {
        problems.push(format!(
            "Search query must not exceed {} characters",
            MAX_QUERY_LEN
        ));
    }

    problems
}

pub fn validate_pagination(page: u32, per_page: u32) -> Vec<String> {
    let mut problems = Vec::new();

    if page < 1 {
        problems.push("Page number must be at least 1".to_string());
    }
    if per_page < 1 || per_page > MAX_PER_PAGE {
        problems.push(format!(
            "Items per page must be between 1 and {}",
            MAX_PER_PAGE
        ));
    }

    problems
}
