//! Record and replay HTTP traffic as wire-format fixtures in tests.
//!
//! In record mode every request made through the [`TestClient`] goes out to
//! the real service and the request/response pair is written to a fixture
//! directory; in replay mode the response is served from those fixtures
//! without any network access, and the incoming request is validated against
//! the recorded one.

mod configuration;
mod data;
mod error;
mod http_client;
mod naming_scheme;
mod record_transport;
mod replay_transport;
mod reporter;
mod sanitizer;
mod test_client;
mod transform;
mod util;
mod validator;
mod wire;

pub use configuration::{TapeConfiguration, TapeMode, RECORD_MODE_ENV};
pub use data::{RequestData, ResponseData};
pub use error::{Error, HELP_MSG_REPLAY_FILE_DOESNT_EXIST};
pub use http_client::{HyperTransport, Transport};
pub use naming_scheme::{
    ContentHashNamingScheme, NamingScheme, PathBasedNamingScheme, SequentialNamingScheme,
    NORMALIZED_BOUNDARY,
};
pub use record_transport::RecordTransport;
pub use replay_transport::ReplayTransport;
pub use reporter::{CollectingReporter, PanicReporter, Reporter};
pub use sanitizer::{
    default_headers_sanitizer, default_query_params_sanitizer, default_request_sanitizer,
    ComposedSanitizer, HeadersSanitizer, NoopSanitizer, QueryParamsSanitizer, RequestSanitizer,
    SANITIZED,
};
pub use test_client::{default_fixture_dir, TestClient};
pub use transform::{
    ComposedTransform, JsonPrettyPrintTransform, ResponseTransform, TransformMode,
};
pub use validator::{
    default_request_validator, ComposedValidator, HeadersValidator, MethodValidator,
    NoopValidator, PathValidator, QueryParamsValidator, RequestValidator, SchemeValidator,
};
pub use wire::FixtureStore;
