use crate::{
    http_client::{HyperTransport, Transport},
    naming_scheme::NamingScheme,
    reporter::{PanicReporter, Reporter},
    sanitizer::{default_request_sanitizer, RequestSanitizer},
    transform::{ResponseTransform, TransformMode},
    validator::{default_request_validator, RequestValidator},
};
use std::{env, sync::Arc};

/// Environment variable that switches tests into record mode when set to any
/// non-empty value.
pub const RECORD_MODE_ENV: &str = "HTTPTAPE_RECORD_MODE";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TapeMode {
    Record,
    Replay,
}

impl TapeMode {
    /// Record when `HTTPTAPE_RECORD_MODE` is set and non-empty, replay
    /// otherwise.
    pub fn from_env() -> Self {
        match env::var(RECORD_MODE_ENV) {
            Ok(value) if !value.is_empty() => TapeMode::Record,
            _ => TapeMode::Replay,
        }
    }
}

/// Everything a [`crate::TestClient`] needs: the mode, the naming scheme and
/// the pluggable pipelines. Defaults cover the common case; setters override
/// each piece independently.
#[derive(Debug)]
pub struct TapeConfiguration {
    mode: TapeMode,
    naming_scheme: Arc<dyn NamingScheme + Send + Sync>,
    sanitizer: Arc<dyn RequestSanitizer + Send + Sync>,
    validator: Arc<dyn RequestValidator + Send + Sync>,
    reporter: Arc<dyn Reporter + Send + Sync>,
    transform: Option<Arc<dyn ResponseTransform + Send + Sync>>,
    transform_mode: TransformMode,
    http_transport: Option<Arc<dyn Transport + Send + Sync>>,
}

impl TapeConfiguration {
    pub fn new(mode: TapeMode, naming_scheme: Box<dyn NamingScheme + Send + Sync>) -> Self {
        Self {
            mode,
            naming_scheme: naming_scheme.into(),
            sanitizer: Arc::new(default_request_sanitizer()),
            validator: Arc::new(default_request_validator()),
            reporter: Arc::new(PanicReporter::new()),
            transform: None,
            transform_mode: TransformMode::None,
            http_transport: None,
        }
    }

    pub fn mode(&self) -> TapeMode {
        self.mode
    }

    pub fn naming_scheme(&self) -> Arc<dyn NamingScheme + Send + Sync> {
        self.naming_scheme.clone()
    }

    pub fn set_sanitizer(&mut self, sanitizer: Arc<dyn RequestSanitizer + Send + Sync>) {
        self.sanitizer = sanitizer;
    }

    pub fn sanitizer(&self) -> Arc<dyn RequestSanitizer + Send + Sync> {
        self.sanitizer.clone()
    }

    pub fn set_validator(&mut self, validator: Arc<dyn RequestValidator + Send + Sync>) {
        self.validator = validator;
    }

    pub fn validator(&self) -> Arc<dyn RequestValidator + Send + Sync> {
        self.validator.clone()
    }

    pub fn set_reporter(&mut self, reporter: Arc<dyn Reporter + Send + Sync>) {
        self.reporter = reporter;
    }

    pub fn reporter(&self) -> Arc<dyn Reporter + Send + Sync> {
        self.reporter.clone()
    }

    pub fn set_transform(&mut self, transform: Arc<dyn ResponseTransform + Send + Sync>) {
        self.transform = Some(transform);
    }

    pub fn transform(&self) -> Option<Arc<dyn ResponseTransform + Send + Sync>> {
        self.transform.clone()
    }

    pub fn set_transform_mode(&mut self, transform_mode: TransformMode) {
        self.transform_mode = transform_mode;
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.transform_mode
    }

    pub fn set_http_transport(&mut self, http_transport: Arc<dyn Transport + Send + Sync>) {
        self.http_transport = Some(http_transport);
    }

    /// The underlying transport used in record mode; defaults to the hyper
    /// TLS client.
    pub fn http_transport(&self) -> Arc<dyn Transport + Send + Sync> {
        self.http_transport
            .clone()
            .unwrap_or_else(|| Arc::new(HyperTransport::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming_scheme::SequentialNamingScheme;

    #[test]
    fn from_env_defaults_to_replay() {
        // the variable is unset in the test environment
        assert_eq!(TapeMode::from_env(), TapeMode::Replay);
    }

    #[test]
    fn configuration_carries_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TapeConfiguration::new(
            TapeMode::Replay,
            Box::new(SequentialNamingScheme::new(dir.path()).unwrap()),
        );

        assert_eq!(config.mode(), TapeMode::Replay);
        assert_eq!(config.transform_mode(), TransformMode::None);
        assert!(config.transform().is_none());
    }
}
