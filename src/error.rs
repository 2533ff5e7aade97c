use hyper::http;
use std::{fmt::Display, io, path::PathBuf, sync};

/// Hint appended to missing-fixture failures so the user knows how to
/// produce the recording.
pub const HELP_MSG_REPLAY_FILE_DOESNT_EXIST: &str =
    "replay fixture doesn't exist; re-run the test in record mode \
     (set HTTPTAPE_RECORD_MODE=1) to create it";

#[derive(Debug)]
pub enum Error {
    IoError(io::Error),
    PoisonedLock,
    CreateDirError(PathBuf, io::Error),
    FixtureMissing(PathBuf),
    FixtureMalformed(PathBuf, String),
    HyperError(hyper::Error),
    HttpError(http::Error),
    InvalidHeaderName,
    InvalidHeaderValue,
    ParseUriError,
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IoError: {}", e),
            Error::PoisonedLock => write!(f, "The lock was poisoned"),
            Error::CreateDirError(path, e) => {
                write!(f, "Couldn't create fixture directory {}: {}", path.display(), e)
            }
            Error::FixtureMissing(path) => write!(
                f,
                "Fixture file {} not found: {}",
                path.display(),
                HELP_MSG_REPLAY_FILE_DOESNT_EXIST
            ),
            Error::FixtureMalformed(path, detail) => write!(
                f,
                "Fixture file {} exists but couldn't be parsed as HTTP wire format: {}",
                path.display(),
                detail
            ),
            Error::HyperError(e) => write!(f, "Hyper error: {}", e),
            Error::HttpError(e) => write!(f, "Http Error: {}", e),
            Error::InvalidHeaderName => write!(f, "Invalid header name"),
            Error::InvalidHeaderValue => write!(f, "Invalid header value"),
            Error::ParseUriError => write!(f, "Parse URI Error"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e)
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Error::HyperError(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::HttpError(e)
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(_: http::uri::InvalidUri) -> Self {
        Error::ParseUriError
    }
}
