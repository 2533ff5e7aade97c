use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap, Uri,
};

pub fn append_header(header_map: &mut HeaderMap, key: &str, value: &str) -> Result<(), Error> {
    let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
    let header_value = HeaderValue::from_str(value.trim())?;
    header_map.append(header_name, header_value);

    Ok(())
}

/// Decodes a raw query string into ordered key/value pairs. Parameters
/// without '=' decode to an empty value, matching common server behavior.
pub fn parse_query(raw_query: &str) -> Vec<(String, String)> {
    raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key, value),
                None => (pair, ""),
            };
            (
                urlencoding::decode(key).map(String::from).unwrap_or_else(|_| key.into()),
                urlencoding::decode(value).map(String::from).unwrap_or_else(|_| value.into()),
            )
        })
        .collect()
}

/// Encodes key/value pairs back into a query string, sorted by key so the
/// result is deterministic regardless of the original parameter order.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    sorted
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Rebuilds a URI with its query string replaced (or dropped when `None`).
pub fn with_query(uri: &Uri, query: Option<&str>) -> Result<Uri, Error> {
    let mut parts = uri.clone().into_parts();
    let path = uri.path();
    let path_and_query = match query {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    };
    parts.path_and_query = Some(path_and_query.parse()?);

    Uri::from_parts(parts).map_err(|_| Error::ParseUriError)
}
