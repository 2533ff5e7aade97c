use crate::{data::RequestData, error::Error, util};
use hyper::header::{HeaderName, HeaderValue};
use std::fmt::Debug;

/// Value that replaces redacted header and query-parameter values in stored
/// fixtures. Validators treat a recorded `SANITIZED` value as matching
/// anything.
pub const SANITIZED: &str = "SANITIZED";

/// Rewrites sensitive fields of a request snapshot before it is persisted.
/// Sanitizers always receive a private copy, so mutating in place is fine;
/// the bytes sent over the network are never touched.
pub trait RequestSanitizer: Debug {
    fn sanitize(&self, data: &mut RequestData);
}

#[derive(Debug)]
pub struct NoopSanitizer;

impl RequestSanitizer for NoopSanitizer {
    fn sanitize(&self, _data: &mut RequestData) {}
}

/// Runs the given sanitizers in order.
#[derive(Debug)]
pub struct ComposedSanitizer {
    sanitizers: Vec<Box<dyn RequestSanitizer + Send + Sync>>,
}

impl ComposedSanitizer {
    pub fn new(sanitizers: Vec<Box<dyn RequestSanitizer + Send + Sync>>) -> Self {
        Self { sanitizers }
    }
}

impl RequestSanitizer for ComposedSanitizer {
    fn sanitize(&self, data: &mut RequestData) {
        for sanitizer in &self.sanitizers {
            sanitizer.sanitize(data);
        }
    }
}

/// Sets the listed headers to `SANITIZED` when present. The header stays in
/// the stored fixture, only its value is redacted.
#[derive(Debug)]
pub struct HeadersSanitizer {
    headers: Vec<String>,
}

impl HeadersSanitizer {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(headers: I) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.into().to_lowercase()).collect(),
        }
    }
}

impl RequestSanitizer for HeadersSanitizer {
    fn sanitize(&self, data: &mut RequestData) {
        for header in &self.headers {
            let name = match HeaderName::from_lowercase(header.as_bytes()) {
                Ok(name) => name,
                Err(_) => continue,
            };
            if data.headers.contains_key(&name) {
                data.headers.insert(name, HeaderValue::from_static(SANITIZED));
            }
        }
    }
}

/// Sets the listed query parameters to `SANITIZED` and re-encodes the query
/// string deterministically (key-sorted), so recorded URLs are stable across
/// runs regardless of the caller's parameter order.
#[derive(Debug)]
pub struct QueryParamsSanitizer {
    params: Vec<String>,
}

impl QueryParamsSanitizer {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(params: I) -> Self {
        Self {
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    fn sanitized_url(&self, data: &RequestData) -> Result<hyper::Uri, Error> {
        let raw_query = match data.url.query() {
            Some(raw_query) => raw_query,
            None => return Ok(data.url.clone()),
        };

        let mut pairs = util::parse_query(raw_query);
        for (key, value) in &mut pairs {
            if self.params.iter().any(|param| param == key) {
                *value = SANITIZED.to_string();
            }
        }

        util::with_query(&data.url, Some(&util::encode_query(&pairs)))
    }
}

impl RequestSanitizer for QueryParamsSanitizer {
    fn sanitize(&self, data: &mut RequestData) {
        if let Ok(url) = self.sanitized_url(data) {
            data.url = url;
        }
    }
}

/// Header sanitizer preloaded with the names that carry credentials in most
/// APIs.
pub fn default_headers_sanitizer() -> HeadersSanitizer {
    HeadersSanitizer::new([
        "Authorization",
        "Cookie",
        "X-Auth-Token",
        "X-API-Key",
        "Proxy-Authorization",
        "X-Forwarded-For",
        "Referrer",
        "X-Secret",
        "X-Access-Token",
        "X-Client-Secret",
        "X-Client-ID",
        "X-Auth",
    ])
}

/// Query-parameter sanitizer preloaded with the most common secret-bearing
/// parameter names.
pub fn default_query_params_sanitizer() -> QueryParamsSanitizer {
    QueryParamsSanitizer::new([
        "access_token",
        "api_key",
        "auth",
        "key",
        "auth_token",
        "password",
        "secret",
        "token",
        "client_secret",
        "client_id",
        "signature",
        "sig",
        "session",
    ])
}

/// Default pipeline: headers first, then query parameters.
pub fn default_request_sanitizer() -> ComposedSanitizer {
    ComposedSanitizer::new(vec![
        Box::new(default_headers_sanitizer()),
        Box::new(default_query_params_sanitizer()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{HeaderMap, Method, Uri};

    fn sample_data(url: &str) -> RequestData {
        RequestData {
            method: Method::GET,
            url: url.parse::<Uri>().unwrap(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn headers_sanitizer_redacts_present_headers_only() {
        let mut data = sample_data("https://example.com/");
        data.headers.insert("authorization", "Bearer z".parse().unwrap());
        data.headers.insert("accept", "application/json".parse().unwrap());

        default_headers_sanitizer().sanitize(&mut data);

        assert_eq!(data.headers.get("authorization").unwrap(), SANITIZED);
        assert_eq!(data.headers.get("accept").unwrap(), "application/json");
        assert!(!data.headers.contains_key("cookie"));
    }

    #[test]
    fn query_params_sanitizer_redacts_and_sorts() {
        let mut data = sample_data("https://example.com/x?token=abc&b=2&a=1");

        default_query_params_sanitizer().sanitize(&mut data);

        assert_eq!(data.url.query().unwrap(), "a=1&b=2&token=SANITIZED");
    }

    #[test]
    fn query_params_sanitizer_ignores_urls_without_query() {
        let mut data = sample_data("https://example.com/x");
        default_query_params_sanitizer().sanitize(&mut data);
        assert_eq!(data.url.to_string(), "https://example.com/x");
    }

    #[test]
    fn default_pipeline_covers_headers_and_query() {
        let mut data = sample_data("https://example.com/x?api_key=shh");
        data.headers.insert("cookie", "session=1".parse().unwrap());

        default_request_sanitizer().sanitize(&mut data);

        assert_eq!(data.headers.get("cookie").unwrap(), SANITIZED);
        assert_eq!(data.url.query().unwrap(), "api_key=SANITIZED");
    }
}
