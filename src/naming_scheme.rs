use crate::{data::RequestData, error::Error};
use hyper::header::CONTENT_TYPE;
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

/// Boundary tokens in multipart bodies are rewritten to this sentinel before
/// hashing, so two otherwise-identical uploads with random boundaries map to
/// the same fixture pair.
pub const NORMALIZED_BOUNDARY: &str = "NORMALIZED_BOUNDARY";

const HASH_PREFIX_LEN: usize = 16;

lazy_static! {
    static ref MULTIPART_BOUNDARY_REGEX: Regex =
        Regex::new(r#"(?i)^multipart/[a-z0-9.+-]+\s*;.*?boundary="?([^";,\s]+)"?"#).unwrap();
}

/// Maps a request snapshot to the pair of fixture files (request, response)
/// backing one logical call.
pub trait NamingScheme: Debug {
    fn file_names(&self, data: &RequestData) -> Result<(PathBuf, PathBuf), Error>;
}

fn create_fixture_dir(dir: &Path) -> Result<(), Error> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder
        .create(dir)
        .map_err(|e| Error::CreateDirError(dir.to_path_buf(), e))
}

fn fixture_pair(dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{}.req.http", stem)),
        dir.join(format!("{}.resp.http", stem)),
    )
}

fn short_hash(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    let mut encoded = hex::encode(digest);
    encoded.truncate(HASH_PREFIX_LEN);
    encoded
}

/// Numbers fixture pairs 0, 1, 2, ... in the order calls acquire the
/// internal lock. Concurrent calls may therefore be recorded out of the
/// order they were issued.
#[derive(Debug)]
pub struct SequentialNamingScheme {
    dir: PathBuf,
    request_index: Mutex<u64>,
}

impl SequentialNamingScheme {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        create_fixture_dir(dir.as_ref())?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            request_index: Mutex::new(0),
        })
    }
}

impl NamingScheme for SequentialNamingScheme {
    fn file_names(&self, _data: &RequestData) -> Result<(PathBuf, PathBuf), Error> {
        let index = {
            // lock covers only the read-increment, never file I/O
            let mut request_index = self.request_index.lock()?;
            let index = *request_index;
            *request_index += 1;
            index
        };

        Ok(fixture_pair(&self.dir, &index.to_string()))
    }
}

/// Derives fixture names from a hash of the full URL (query included).
/// Repeat calls to the same URL get a `-1`, `-2`, ... suffix; the first
/// occurrence has none. Occurrence counters live for the scheme's lifetime.
#[derive(Debug)]
pub struct PathBasedNamingScheme {
    dir: PathBuf,
    occurrences: Mutex<HashMap<String, u64>>,
}

impl PathBasedNamingScheme {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        create_fixture_dir(dir.as_ref())?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            occurrences: Mutex::new(HashMap::new()),
        })
    }
}

impl NamingScheme for PathBasedNamingScheme {
    fn file_names(&self, data: &RequestData) -> Result<(PathBuf, PathBuf), Error> {
        let url = data.url.to_string();
        let url_hash = short_hash(url.as_bytes());

        let occurrence = {
            let mut occurrences = self.occurrences.lock()?;
            let counter = occurrences.entry(url).or_insert(0);
            let occurrence = *counter;
            *counter += 1;
            occurrence
        };

        let stem = if occurrence == 0 {
            url_hash
        } else {
            format!("{}-{}", url_hash, occurrence)
        };

        Ok(fixture_pair(&self.dir, &stem))
    }
}

/// Derives fixture names from a hash of the URL path plus the (normalized)
/// body, so identical calls map to the same fixture pair. Pure: no counter,
/// no lock.
#[derive(Debug)]
pub struct ContentHashNamingScheme {
    dir: PathBuf,
}

impl ContentHashNamingScheme {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        create_fixture_dir(dir.as_ref())?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }
}

impl NamingScheme for ContentHashNamingScheme {
    fn file_names(&self, data: &RequestData) -> Result<(PathBuf, PathBuf), Error> {
        let path = match data.url.path() {
            "" => "/",
            path => path,
        };

        let content_type = data
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        let body = normalize_multipart_body(&data.body, content_type);

        let mut hashed = Vec::with_capacity(path.len() + body.len());
        hashed.extend_from_slice(path.as_bytes());
        hashed.extend_from_slice(&body);

        Ok(fixture_pair(&self.dir, &short_hash(&hashed)))
    }
}

/// Replaces the multipart boundary token with a fixed sentinel everywhere it
/// occurs in the body. Non-multipart content types (or multipart without a
/// boundary parameter) leave the body untouched.
pub(crate) fn normalize_multipart_body(body: &[u8], content_type: &str) -> Vec<u8> {
    let boundary = match MULTIPART_BOUNDARY_REGEX
        .captures(content_type)
        .and_then(|captures| captures.get(1))
    {
        Some(boundary) => boundary.as_str().to_string(),
        None => return body.to_vec(),
    };

    // byte-level replace, the body may carry binary file parts
    let pattern = match regex::bytes::Regex::new(&regex::escape(&boundary)) {
        Ok(pattern) => pattern,
        Err(_) => return body.to_vec(),
    };

    pattern
        .replace_all(body, NORMALIZED_BOUNDARY.as_bytes())
        .into_owned()
}
