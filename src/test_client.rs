use crate::{
    configuration::{TapeConfiguration, TapeMode},
    error::Error,
    http_client::Transport,
    record_transport::RecordTransport,
    replay_transport::ReplayTransport,
};
use hyper::{Body, Request, Response};
use std::{
    env,
    path::PathBuf,
    sync::Arc,
};

/// Client facade over the record or replay transport, chosen once at
/// construction. One instance can serve concurrent calls.
#[derive(Debug)]
pub struct TestClient {
    transport: Arc<dyn Transport + Send + Sync>,
}

impl TestClient {
    pub fn new(configuration: TapeConfiguration) -> Self {
        let transport: Arc<dyn Transport + Send + Sync> = match configuration.mode() {
            TapeMode::Record => {
                tracing::info!("record mode is on - all requests will be recorded");
                Arc::new(RecordTransport::new(
                    configuration.http_transport(),
                    configuration.naming_scheme(),
                    configuration.sanitizer(),
                    configuration.transform(),
                    configuration.transform_mode(),
                ))
            }
            TapeMode::Replay => {
                tracing::info!(
                    "record mode is off - requests will be served from fixtures if available, \
                     otherwise they will fail"
                );
                Arc::new(ReplayTransport::new(
                    configuration.naming_scheme(),
                    configuration.sanitizer(),
                    configuration.validator(),
                    configuration.reporter(),
                    configuration.transform(),
                    configuration.transform_mode(),
                ))
            }
        };

        Self { transport }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        self.transport.send(request).await
    }

    /// The transport itself, for callers that plug it into their own client.
    pub fn transport(&self) -> Arc<dyn Transport + Send + Sync> {
        self.transport.clone()
    }
}

/// Conventional fixture location for a test:
/// `$CARGO_MANIFEST_DIR/testdata/{test_name}`. Cargo sets the manifest dir
/// for test binaries; outside cargo the path is relative to the working
/// directory.
pub fn default_fixture_dir<S: AsRef<str>>(test_name: S) -> PathBuf {
    let root = env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    PathBuf::from(root).join("testdata").join(test_name.as_ref())
}
