use crate::{data::RequestData, error::Error, reporter::Reporter, sanitizer::SANITIZED};
use hyper::header::{HeaderMap, HeaderValue};
use std::{collections::HashMap, fmt::Debug};

/// Compares a replayed request against the recorded one, reporting each
/// field-level mismatch through the reporter. Mismatches never abort the
/// replay; an `Err` is reserved for internal processing failures.
pub trait RequestValidator: Debug {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error>;
}

/// Runs the given validators in order. All of them run even when earlier
/// ones report mismatches; only an internal error short-circuits.
#[derive(Debug)]
pub struct ComposedValidator {
    validators: Vec<Box<dyn RequestValidator + Send + Sync>>,
}

impl ComposedValidator {
    pub fn new(validators: Vec<Box<dyn RequestValidator + Send + Sync>>) -> Self {
        Self { validators }
    }
}

impl RequestValidator for ComposedValidator {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error> {
        for validator in &self.validators {
            validator.validate(reporter, recorded, got)?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct NoopValidator;

impl RequestValidator for NoopValidator {
    fn validate(
        &self,
        _reporter: &dyn Reporter,
        _recorded: &RequestData,
        _got: &RequestData,
    ) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct MethodValidator;

impl RequestValidator for MethodValidator {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error> {
        if recorded.method != got.method {
            reporter.error(&format!(
                "expected method '{}', got '{}'",
                recorded.method, got.method
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct SchemeValidator;

impl RequestValidator for SchemeValidator {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error> {
        let recorded_scheme = recorded.url.scheme_str().unwrap_or("");
        let got_scheme = got.url.scheme_str().unwrap_or("");
        if recorded_scheme != got_scheme {
            reporter.error(&format!(
                "expected scheme '{}', got '{}'",
                recorded_scheme, got_scheme
            ));
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct PathValidator;

impl RequestValidator for PathValidator {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error> {
        if recorded.url.path() != got.url.path() {
            reporter.error(&format!(
                "expected path '{}', got '{}'",
                recorded.url.path(),
                got.url.path()
            ));
        }

        Ok(())
    }
}

fn first_values(raw_query: Option<&str>) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for (key, value) in crate::util::parse_query(raw_query.unwrap_or("")) {
        values.entry(key).or_insert(value);
    }

    values
}

/// Order-insensitive comparison of query parameters. Compares the first
/// value per key and reports parameters present on only one side.
#[derive(Debug)]
pub struct QueryParamsValidator;

impl RequestValidator for QueryParamsValidator {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error> {
        let recorded_params = first_values(recorded.url.query());
        let mut got_params = first_values(got.url.query());

        let mut keys: Vec<&String> = recorded_params.keys().collect();
        keys.sort();
        for key in keys {
            let recorded_value = &recorded_params[key];
            let got_value = got_params.remove(key).unwrap_or_default();
            if *recorded_value != got_value {
                reporter.error(&format!(
                    "expected query parameter '{}' to be '{}', got '{}'",
                    key, recorded_value, got_value
                ));
            }
        }

        let mut leftover: Vec<(String, String)> = got_params.into_iter().collect();
        leftover.sort();
        for (key, value) in leftover {
            reporter.error(&format!(
                "unexpected query parameter '{}' with value '{}'",
                key, value
            ));
        }

        Ok(())
    }
}

// generated by the client stack rather than by the caller, so comparing
// them only produces noise
const IGNORED_HEADERS: [&str; 2] = ["user-agent", "content-length"];

fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

/// Order-insensitive comparison of headers. A recorded value equal to the
/// sanitizer's `SANITIZED` sentinel matches anything. Each header is checked
/// exactly once against a materialized key list, and matched keys are
/// removed from a private copy of the got-headers so leftovers can be
/// reported as unexpected.
#[derive(Debug)]
pub struct HeadersValidator;

impl RequestValidator for HeadersValidator {
    fn validate(
        &self,
        reporter: &dyn Reporter,
        recorded: &RequestData,
        got: &RequestData,
    ) -> Result<(), Error> {
        let mut got_remaining: HeaderMap = got.headers.clone();
        for ignored in IGNORED_HEADERS {
            got_remaining.remove(ignored);
        }

        let mut recorded_keys: Vec<&hyper::header::HeaderName> = recorded
            .headers
            .keys()
            .filter(|key| !IGNORED_HEADERS.contains(&key.as_str()))
            .collect();
        recorded_keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        for key in recorded_keys {
            let recorded_value = recorded
                .headers
                .get(key)
                .map(header_text)
                .unwrap_or_default();

            if recorded_value == SANITIZED {
                got_remaining.remove(key);
                continue;
            }

            let got_value = got.headers.get(key).map(header_text).unwrap_or_default();
            if recorded_value != got_value {
                reporter.error(&format!(
                    "expected header '{}' to be '{}', got '{}'",
                    key, recorded_value, got_value
                ));
            }
            got_remaining.remove(key);
        }

        let mut leftover: Vec<(String, String)> = got_remaining
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), header_text(value)))
            .collect();
        leftover.sort();
        leftover.dedup_by(|a, b| a.0 == b.0);
        for (key, value) in leftover {
            reporter.error(&format!(
                "unexpected header '{}' with value '{}'",
                key, value
            ));
        }

        Ok(())
    }
}

/// Default pipeline in a fixed evaluation order: path, method, query
/// parameters, headers, scheme.
pub fn default_request_validator() -> ComposedValidator {
    ComposedValidator::new(vec![
        Box::new(PathValidator),
        Box::new(MethodValidator),
        Box::new(QueryParamsValidator),
        Box::new(HeadersValidator),
        Box::new(SchemeValidator),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::CollectingReporter;
    use hyper::{HeaderMap, Method, Uri};

    fn sample_data(method: Method, url: &str) -> RequestData {
        RequestData {
            method,
            url: url.parse::<Uri>().unwrap(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn method_validator_reports_difference() {
        let reporter = CollectingReporter::new();
        let recorded = sample_data(Method::GET, "https://example.com/");
        let got = sample_data(Method::PUT, "https://example.com/");

        MethodValidator.validate(&reporter, &recorded, &got).unwrap();

        assert_eq!(reporter.errors(), vec!["expected method 'GET', got 'PUT'"]);
    }

    #[test]
    fn path_and_scheme_validators_pass_on_match() {
        let reporter = CollectingReporter::new();
        let recorded = sample_data(Method::GET, "https://example.com/foo");
        let got = sample_data(Method::GET, "https://example.com/foo");

        PathValidator.validate(&reporter, &recorded, &got).unwrap();
        SchemeValidator.validate(&reporter, &recorded, &got).unwrap();

        assert!(reporter.is_clean());
    }

    #[test]
    fn query_validator_is_order_insensitive() {
        let reporter = CollectingReporter::new();
        let recorded = sample_data(Method::GET, "https://example.com/?a=1&b=2");
        let got = sample_data(Method::GET, "https://example.com/?b=2&a=1");

        QueryParamsValidator.validate(&reporter, &recorded, &got).unwrap();

        assert!(reporter.is_clean());
    }

    #[test]
    fn query_validator_reports_missing_and_unexpected() {
        let reporter = CollectingReporter::new();
        let recorded = sample_data(Method::GET, "https://example.com/?a=1");
        let got = sample_data(Method::GET, "https://example.com/?a=2&extra=x");

        QueryParamsValidator.validate(&reporter, &recorded, &got).unwrap();

        assert_eq!(
            reporter.errors(),
            vec![
                "expected query parameter 'a' to be '1', got '2'",
                "unexpected query parameter 'extra' with value 'x'",
            ]
        );
    }

    #[test]
    fn headers_validator_skips_generated_headers() {
        let reporter = CollectingReporter::new();
        let mut recorded = sample_data(Method::GET, "https://example.com/");
        recorded.headers.insert("user-agent", "recorded-agent".parse().unwrap());
        recorded.headers.insert("content-length", "10".parse().unwrap());
        let mut got = sample_data(Method::GET, "https://example.com/");
        got.headers.insert("user-agent", "live-agent".parse().unwrap());

        HeadersValidator.validate(&reporter, &recorded, &got).unwrap();

        assert!(reporter.is_clean());
    }

    #[test]
    fn headers_validator_treats_sanitized_as_wildcard() {
        let reporter = CollectingReporter::new();
        let mut recorded = sample_data(Method::GET, "https://example.com/");
        recorded.headers.insert("authorization", SANITIZED.parse().unwrap());
        let mut got = sample_data(Method::GET, "https://example.com/");
        got.headers.insert("authorization", "Bearer live-token".parse().unwrap());

        HeadersValidator.validate(&reporter, &recorded, &got).unwrap();

        assert!(reporter.is_clean());
    }

    #[test]
    fn headers_validator_reports_mismatch_missing_and_unexpected() {
        let reporter = CollectingReporter::new();
        let mut recorded = sample_data(Method::GET, "https://example.com/");
        recorded.headers.insert("sample", "sample-value".parse().unwrap());
        recorded.headers.insert("accept", "text/plain".parse().unwrap());
        let mut got = sample_data(Method::GET, "https://example.com/");
        got.headers.insert("accept", "application/json".parse().unwrap());
        got.headers.insert("x-extra", "surprise".parse().unwrap());

        HeadersValidator.validate(&reporter, &recorded, &got).unwrap();

        assert_eq!(
            reporter.errors(),
            vec![
                "expected header 'accept' to be 'text/plain', got 'application/json'",
                "expected header 'sample' to be 'sample-value', got ''",
                "unexpected header 'x-extra' with value 'surprise'",
            ]
        );
    }

    #[test]
    fn default_pipeline_reports_all_mismatches_in_one_pass() {
        let reporter = CollectingReporter::new();
        let recorded = sample_data(Method::GET, "https://example.com/foo?a=1");
        let got = sample_data(Method::POST, "http://example.com/bar?a=2");

        default_request_validator()
            .validate(&reporter, &recorded, &got)
            .unwrap();

        // path, method, query and scheme all mismatch, all surfaced at once
        assert_eq!(reporter.errors().len(), 4);
    }

    #[test]
    fn validation_is_idempotent() {
        let recorded = sample_data(Method::GET, "https://example.com/foo?a=1");
        let got = sample_data(Method::PUT, "https://example.com/foo?a=2");

        let first = CollectingReporter::new();
        let second = CollectingReporter::new();
        let validator = default_request_validator();
        validator.validate(&first, &recorded, &got).unwrap();
        validator.validate(&second, &recorded, &got).unwrap();

        assert_eq!(first.errors(), second.errors());
    }
}
