use crate::{
    data::RequestData,
    error::Error,
    http_client::Transport,
    naming_scheme::NamingScheme,
    reporter::Reporter,
    sanitizer::RequestSanitizer,
    transform::{ResponseTransform, TransformMode},
    validator::RequestValidator,
    wire::FixtureStore,
};
use async_trait::async_trait;
use hyper::{Body, Request, Response};
use std::sync::Arc;

/// Transport that serves responses from fixture files instead of the
/// network. The live request is sanitized first so it is comparable to the
/// sanitized recording (no secrets are at stake here, nothing leaves the
/// process), then validated against the recorded request. Validation
/// mismatches go through the reporter and never abort the replay; a missing
/// fixture does, with a hint to re-record.
#[derive(Debug)]
pub struct ReplayTransport {
    naming_scheme: Arc<dyn NamingScheme + Send + Sync>,
    sanitizer: Arc<dyn RequestSanitizer + Send + Sync>,
    validator: Arc<dyn RequestValidator + Send + Sync>,
    reporter: Arc<dyn Reporter + Send + Sync>,
    transform: Option<Arc<dyn ResponseTransform + Send + Sync>>,
    transform_mode: TransformMode,
}

impl ReplayTransport {
    pub fn new(
        naming_scheme: Arc<dyn NamingScheme + Send + Sync>,
        sanitizer: Arc<dyn RequestSanitizer + Send + Sync>,
        validator: Arc<dyn RequestValidator + Send + Sync>,
        reporter: Arc<dyn Reporter + Send + Sync>,
        transform: Option<Arc<dyn ResponseTransform + Send + Sync>>,
        transform_mode: TransformMode,
    ) -> Self {
        Self {
            naming_scheme,
            sanitizer,
            validator,
            reporter,
            transform,
            transform_mode,
        }
    }

    fn fatal_on_missing(&self, error: Error) -> Error {
        if let Error::FixtureMissing(_) = &error {
            self.reporter.fatal(&error.to_string());
        }

        error
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        let (mut data, _request) = RequestData::from_request(request).await?;
        self.sanitizer.sanitize(&mut data);

        let (request_file, response_file) = self.naming_scheme.file_names(&data)?;
        tracing::debug!(request = %data, fixture = %request_file.display(), "replaying");

        let recorded =
            FixtureStore::load_request(&request_file).map_err(|e| self.fatal_on_missing(e))?;

        self.validator
            .validate(self.reporter.as_ref(), &recorded, &data)?;

        let mut response_data =
            FixtureStore::load_response(&response_file).map_err(|e| self.fatal_on_missing(e))?;

        if self.transform_mode.applies_on_replay() {
            if let Some(transform) = &self.transform {
                transform.transform(&mut response_data);
            }
        }

        response_data.into_response()
    }
}
