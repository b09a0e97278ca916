//! Link-header pagination.
//!
//! The gist API never reports a total item count. Whether another page
//! exists is read from the `Link` response header (`rel="next"`), and the
//! previous page is assumed to exist whenever `page > 1`. Both are
//! heuristics: a listing can grow or shrink between requests, so page
//! totals shown to users are estimates.

/// Pagination state for one fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    /// The page that was requested (1-based).
    pub current_page: u32,
    /// The server advertised a `rel="next"` link.
    pub has_next: bool,
    /// `current_page > 1`.
    pub has_prev: bool,
    /// Page number from a `rel="last"` link, when the server sends one.
    pub last_page: Option<u32>,
}

impl PageCursor {
    /// Build a cursor for `page` from an optional `Link` header value.
    pub fn from_link_header(page: u32, link_header: Option<&str>) -> Self {
        let links = link_header.map(parse_link_header).unwrap_or_default();
        Self {
            current_page: page,
            has_next: links.has_next,
            has_prev: page > 1,
            last_page: links.last_page,
        }
    }

    /// Best guess at the page count: one past the current page while more
    /// pages exist, otherwise the current page.
    pub fn estimated_total_pages(&self) -> u32 {
        if self.has_next {
            self.current_page.saturating_add(1)
        } else {
            self.current_page
        }
    }

    /// The next page number, if the server says there is one.
    pub fn next_page(&self) -> Option<u32> {
        self.has_next.then(|| self.current_page.saturating_add(1))
    }
}

/// Relations parsed out of a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// A `rel="next"` link was present.
    pub has_next: bool,
    /// The page number of the `rel="next"` link.
    pub next_page: Option<u32>,
    /// The page number of the `rel="last"` link.
    pub last_page: Option<u32>,
}

/// Parse the Link header to extract pagination info.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/gists/public?per_page=10&page=2>; rel="next", <...&page=30>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        let Some(rel_type) = rel else {
            continue;
        };
        let page = url.and_then(extract_page_from_url);

        // A rel attribute may list several space-separated relation types.
        for rel_type in rel_type.split_whitespace() {
            match rel_type {
                "next" => {
                    info.has_next = true;
                    info.next_page = page;
                }
                "last" => info.last_page = page,
                _ => {}
            }
        }
    }

    info
}

/// Extract the page parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u32> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_link_header_full() {
        let header = r#"<https://api.github.com/gists/public?per_page=10&page=2>; rel="next", <https://api.github.com/gists/public?per_page=10&page=3000>; rel="last""#;

        let info = parse_link_header(header);
        assert!(info.has_next);
        assert_eq!(info.next_page, Some(2));
        assert_eq!(info.last_page, Some(3000));
    }

    #[test]
    fn test_parse_link_header_only_prev() {
        let header = r#"<https://api.github.com/gists?page=1>; rel="prev", <https://api.github.com/gists?page=1>; rel="first""#;

        let info = parse_link_header(header);
        assert!(!info.has_next);
        assert_eq!(info.next_page, None);
        assert_eq!(info.last_page, None);
    }

    #[test]
    fn test_parse_link_header_next_without_page_param() {
        let header = r#"<https://api.github.com/gists?cursor=abc>; rel="next""#;
        let info = parse_link_header(header);
        assert!(info.has_next);
        assert_eq!(info.next_page, None);
    }

    #[test]
    fn test_parse_link_header_empty() {
        let info = parse_link_header("");
        assert_eq!(info, LinkPagination::default());
    }

    #[test]
    fn test_extract_page_from_url() {
        assert_eq!(
            extract_page_from_url("https://api.github.com/gists?page=5"),
            Some(5)
        );
        assert_eq!(
            extract_page_from_url("https://api.github.com/gists?per_page=100&page=3"),
            Some(3)
        );
        assert_eq!(
            extract_page_from_url("https://api.github.com/gists?per_page=100"),
            None
        );
        assert_eq!(extract_page_from_url("https://api.github.com/gists"), None);
    }

    #[test]
    fn test_cursor_first_page_with_next() {
        let cursor = PageCursor::from_link_header(
            1,
            Some(r#"<https://api.github.com/gists/public?page=2>; rel="next""#),
        );
        assert!(cursor.has_next);
        assert!(!cursor.has_prev);
        assert_eq!(cursor.estimated_total_pages(), 2);
        assert_eq!(cursor.next_page(), Some(2));
    }

    #[test]
    fn test_cursor_last_page_without_header() {
        let cursor = PageCursor::from_link_header(4, None);
        assert!(!cursor.has_next);
        assert!(cursor.has_prev);
        assert_eq!(cursor.estimated_total_pages(), 4);
        assert_eq!(cursor.next_page(), None);
    }
}
