use serde::Serialize;
use url::Url;

use super::types::PageRequest;

/// Limit/offset page envelope returned by list endpoints
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Build a page for `results`, linking neighbours relative to `uri`
    /// (path plus original query string).
    pub fn new(results: Vec<T>, count: i64, request: &PageRequest, uri: &str) -> Self {
        let (next, previous) = match request.limit {
            Some(limit) if limit > 0 => {
                // No next link once the window end would overflow
                let next = request
                    .offset
                    .checked_add(limit)
                    .filter(|end| *end < count)
                    .map(|end| page_link(uri, limit, end));
                let previous = (request.offset > 0)
                    .then(|| page_link(uri, limit, (request.offset - limit).max(0)));
                (next, previous)
            }
            _ => (None, None),
        };

        Self { count, next, previous, results }
    }
}

fn page_link(uri: &str, limit: i64, offset: i64) -> String {
    // Only used to parse the relative URI; the host never leaves this function
    let mut url = match Url::parse("http://localhost/").and_then(|base| base.join(uri)) {
        Ok(url) => url,
        Err(_) => return format!("?limit={}&offset={}", limit, offset),
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "limit" && k != "offset")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("limit", &limit.to_string());
        if offset > 0 {
            pairs.append_pair("offset", &offset.to_string());
        }
    }

    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}
