//! Query-string helpers

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Extract the query parameters of a URL or bare query string
///
/// Everything after the first `?` and before any `#` is parsed; `+` decodes
/// to a space. Undecodable pairs are skipped. Later duplicates win.
pub fn extract_query_params(url: &str) -> BTreeMap<String, String> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let query = match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None if !without_fragment.contains('/') && without_fragment.contains('=') => {
            without_fragment
        }
        None => return BTreeMap::new(),
    };

    let mut params = BTreeMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match (decode_component(key), decode_component(value)) {
            (Some(key), Some(value)) => {
                params.insert(key, value);
            }
            _ => tracing::debug!(pair, "Skipping undecodable query pair"),
        }
    }
    params
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Build a query string from parameters
///
/// `null` and empty-string values are dropped. The leading `?` is only
/// present when at least one parameter remains.
pub fn build_query_string(params: &Map<String, Value>) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::String(s) if s.is_empty() => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(format!("{}={}", urlencoding::encode(key), urlencoding::encode(&rendered)))
        })
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_url() {
        let params = extract_query_params("https://app.example/profile?userId=123&q=hello+world#top");
        assert_eq!(params.get("userId").map(String::as_str), Some("123"));
        assert_eq!(params.get("q").map(String::as_str), Some("hello world"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_extract_edge_cases() {
        assert!(extract_query_params("/profile").is_empty());
        assert!(extract_query_params("").is_empty());

        let params = extract_query_params("?flag&name=%E2%9C%93&name=last");
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
        assert_eq!(params.get("name").map(String::as_str), Some("last"));

        let bare = extract_query_params("a=1&b=2");
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn test_build_drops_empty_values() {
        let params = match json!({"a": "1", "b": null, "c": "", "d": 2, "e": true}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(build_query_string(&params), "?a=1&d=2&e=true");
    }

    #[test]
    fn test_build_empty() {
        assert_eq!(build_query_string(&Map::new()), "");

        let mut only_null = Map::new();
        only_null.insert("x".to_string(), Value::Null);
        assert_eq!(build_query_string(&only_null), "");
    }

    #[test]
    fn test_build_encodes() {
        let mut params = Map::new();
        params.insert("q".to_string(), Value::from("a b&c"));
        let query = build_query_string(&params);
        assert_eq!(query, "?q=a%20b%26c");
        assert_eq!(extract_query_params(&query).get("q").map(String::as_str), Some("a b&c"));
    }
}
