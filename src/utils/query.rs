//! `application/x-www-form-urlencoded` parsing for query strings and form bodies.

use rustc_hash::FxHashMap;

/// Decode `a=1&b=two+words` into a map. Later keys win.
pub fn parse_query(query: &str) -> FxHashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

/// Split a request URL into path and query map.
pub fn split_url(url: &str) -> (&str, FxHashMap<String, String>) {
    match url.split_once('?') {
        Some((path, query)) => (path, parse_query(query)),
        None => (url, FxHashMap::default()),
    }
}

fn decode(text: &str) -> String {
    let text = text.replace('+', " ");
    urlencoding::decode(&text)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or(text)
}

/// Only allow redirects back into this site. Control characters never reach a header.
pub fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}
