use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    http_client::Transport,
    naming_scheme::NamingScheme,
    sanitizer::RequestSanitizer,
    transform::{ResponseTransform, TransformMode},
    wire::FixtureStore,
};
use async_trait::async_trait;
use hyper::{Body, Request, Response};
use std::sync::Arc;

/// Transport that sends the real request, persists the sanitized request and
/// the response as a fixture pair, and hands the (possibly transformed)
/// response back to the caller.
///
/// Failures are never retried: recording runs against live systems where a
/// retry could duplicate side effects.
#[derive(Debug)]
pub struct RecordTransport {
    http_transport: Arc<dyn Transport + Send + Sync>,
    naming_scheme: Arc<dyn NamingScheme + Send + Sync>,
    sanitizer: Arc<dyn RequestSanitizer + Send + Sync>,
    transform: Option<Arc<dyn ResponseTransform + Send + Sync>>,
    transform_mode: TransformMode,
}

impl RecordTransport {
    pub fn new(
        http_transport: Arc<dyn Transport + Send + Sync>,
        naming_scheme: Arc<dyn NamingScheme + Send + Sync>,
        sanitizer: Arc<dyn RequestSanitizer + Send + Sync>,
        transform: Option<Arc<dyn ResponseTransform + Send + Sync>>,
        transform_mode: TransformMode,
    ) -> Self {
        Self {
            http_transport,
            naming_scheme,
            sanitizer,
            transform,
            transform_mode,
        }
    }

    fn apply_transform(&self, data: &mut ResponseData) {
        if let Some(transform) = &self.transform {
            transform.transform(data);
        }
    }
}

#[async_trait]
impl Transport for RecordTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        let (data, request) = RequestData::from_request(request).await?;
        let (request_file, response_file) = self.naming_scheme.file_names(&data)?;

        // only the persisted copy is sanitized, never the outgoing request
        let mut sanitized = data.clone();
        self.sanitizer.sanitize(&mut sanitized);
        FixtureStore::save_request(&request_file, &sanitized)?;
        tracing::debug!(request = %data, fixture = %request_file.display(), "recorded request");

        let response = self.http_transport.send(request).await?;
        let mut response_data = ResponseData::from_response(response).await?;

        if self.transform_mode.applies_before_record_store() {
            self.apply_transform(&mut response_data);
        }
        FixtureStore::save_response(&response_file, &response_data)?;
        tracing::debug!(fixture = %response_file.display(), "recorded response");

        if self.transform_mode.applies_after_record_store() {
            self.apply_transform(&mut response_data);
        }

        response_data.into_response()
    }
}
