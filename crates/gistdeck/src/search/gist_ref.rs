//! Recognizing gist identifiers in free-text input.

/// Shortest bare hex token treated as an id rather than a keyword.
///
/// Real gist ids are 20 or 32 hex characters. Shorter hex-only words such
/// as `cafe` or `deadbeef` are far more likely to be search terms.
pub const MIN_BARE_ID_LEN: usize = 20;

const GIST_HOST: &str = "gist.github.com/";
const API_GISTS: &str = "api.github.com/gists/";
const GISTS_PATH: &str = "gists/";

/// What a search box entry refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GistRef {
    /// A specific gist, by id.
    Id(String),
    /// Anything else: words to search for.
    Keywords(String),
}

impl GistRef {
    /// Classify trimmed input.
    ///
    /// Shapes are tried in order: a bare hex token, a gist page URL
    /// (`gist.github.com/<owner>/<id>`), an API URL
    /// (`api.github.com/gists/<id>`), any `gists/<id>` path, and finally any
    /// embedded hex run of at least [`MIN_BARE_ID_LEN`] characters. In the
    /// URL and path shapes the id must be the whole path segment; the
    /// `gists/<id>` shape also needs [`MIN_BARE_ID_LEN`] characters.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match find_gist_id(input) {
            Some(id) => Self::Id(id.to_string()),
            None => Self::Keywords(input.to_string()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Keywords(_) => None,
        }
    }

    /// The gist page URL for an id.
    pub fn html_url(owner: &str, id: &str) -> String {
        format!("https://{GIST_HOST}{owner}/{id}")
    }

    /// The REST API URL for an id.
    pub fn api_url(id: &str) -> String {
        format!("https://{API_GISTS}{id}")
    }
}

/// The gist id inside `input`, or the trimmed input unchanged.
pub fn extract_gist_id(input: &str) -> String {
    let input = input.trim();
    find_gist_id(input).unwrap_or(input).to_string()
}

fn find_gist_id(input: &str) -> Option<&str> {
    if input.len() >= MIN_BARE_ID_LEN && is_hex(input) {
        return Some(input);
    }

    after_marker(input, GIST_HOST, |rest| {
        let (owner, tail) = rest.split_once('/')?;
        if owner.is_empty() {
            return None;
        }
        hex_segment(tail)
    })
    .or_else(|| after_marker(input, API_GISTS, hex_segment))
    .or_else(|| {
        after_marker(input, GISTS_PATH, |rest| {
            hex_segment(rest).filter(|id| id.len() >= MIN_BARE_ID_LEN)
        })
    })
    .or_else(|| {
        input
            .split(|c: char| !c.is_ascii_hexdigit())
            .find(|run| run.len() >= MIN_BARE_ID_LEN)
    })
}

/// Try `extract` on the text after each case-insensitive occurrence of
/// `marker`, returning the first hit.
fn after_marker<'a>(
    input: &'a str,
    marker: &str,
    extract: impl Fn(&'a str) -> Option<&'a str>,
) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets valid for `input`.
    let lowered = input.to_ascii_lowercase();
    lowered
        .match_indices(marker)
        .find_map(|(start, _)| extract(&input[start + marker.len()..]))
}

/// The hex run at the start of `s`, if it fills the whole path segment.
fn hex_segment(s: &str) -> Option<&str> {
    let end = s
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(s.len());
    let ends_segment = s[end..]
        .chars()
        .next()
        .is_none_or(|c| matches!(c, '/' | '#' | '?' | '.') || c.is_whitespace());
    (end > 0 && ends_segment).then_some(&s[..end])
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}
