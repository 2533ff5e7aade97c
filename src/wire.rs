use crate::{
    data::{RequestData, ResponseData},
    error::Error,
    util,
};
use hyper::{HeaderMap, Method, StatusCode, Uri};
use lazy_static::lazy_static;
use regex::Regex;
use std::{fs, io, path::Path};

lazy_static! {
    static ref REQUEST_LINE_REGEX: Regex =
        Regex::new(r"^(?P<method>[A-Z]+) (?P<target>\S+) HTTP/1\.[01]$").unwrap();
    static ref STATUS_LINE_REGEX: Regex =
        Regex::new(r"^HTTP/1\.[01] (?P<status>[0-9]{3})( .*)?$").unwrap();
    static ref HEADER_LINE_REGEX: Regex =
        Regex::new(r"^(?P<header_key>[\w\-]+):\s?(?P<header_value>.*)$").unwrap();
}

/// Loads and saves fixture files in canonical HTTP/1.1 wire text: a start
/// line, header lines, a blank line, then the raw body bytes. Requests use
/// the absolute-URI (proxy) form so the full URL round-trips.
pub struct FixtureStore;

impl FixtureStore {
    pub fn load_request<P: AsRef<Path>>(path: P) -> Result<RequestData, Error> {
        let contents = read_fixture(path.as_ref())?;
        parse_request(&contents)
            .map_err(|detail| Error::FixtureMalformed(path.as_ref().to_path_buf(), detail))
    }

    pub fn load_response<P: AsRef<Path>>(path: P) -> Result<ResponseData, Error> {
        let contents = read_fixture(path.as_ref())?;
        parse_response(&contents)
            .map_err(|detail| Error::FixtureMalformed(path.as_ref().to_path_buf(), detail))
    }

    pub fn save_request<P: AsRef<Path>>(path: P, data: &RequestData) -> Result<(), Error> {
        Ok(fs::write(path, serialize_request(data))?)
    }

    pub fn save_response<P: AsRef<Path>>(path: P, data: &ResponseData) -> Result<(), Error> {
        Ok(fs::write(path, serialize_response(data))?)
    }
}

fn read_fixture(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FixtureMissing(path.to_path_buf()),
        _ => Error::IoError(e),
    })
}

fn serialize_headers(out: &mut Vec<u8>, headers: &HeaderMap) {
    for (key, value) in headers {
        // it currently ignores header values with opaque characters
        match value.to_str() {
            Ok(value) => out.extend_from_slice(format!("{}: {}\r\n", key, value).as_bytes()),
            Err(_) => {
                tracing::warn!(header = %key, "skipping header with non-ASCII value in fixture")
            }
        }
    }
}

fn serialize_request(data: &RequestData) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.body.len() + 256);
    out.extend_from_slice(format!("{} {} HTTP/1.1\r\n", data.method, data.url).as_bytes());
    serialize_headers(&mut out, &data.headers);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&data.body);

    out
}

fn serialize_response(data: &ResponseData) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.body.len() + 256);
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            data.status.as_u16(),
            data.status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );
    serialize_headers(&mut out, &data.headers);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&data.body);

    out
}

/// Splits wire text into head lines and raw body at the first blank line.
fn split_head_and_body(contents: &[u8]) -> Result<(Vec<&str>, Vec<u8>), String> {
    let separator = contents
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .ok_or_else(|| String::from("missing blank line between headers and body"))?;

    let head = std::str::from_utf8(&contents[..separator])
        .map_err(|_| String::from("start line and headers are not valid UTF-8"))?;
    let body = contents[separator + 4..].to_vec();

    Ok((head.split("\r\n").collect(), body))
}

fn parse_headers(lines: &[&str]) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let captures = HEADER_LINE_REGEX
            .captures(line)
            .ok_or_else(|| format!("malformed header line: {:?}", line))?;
        util::append_header(&mut headers, &captures["header_key"], &captures["header_value"])
            .map_err(|_| format!("invalid header line: {:?}", line))?;
    }

    Ok(headers)
}

fn parse_request(contents: &[u8]) -> Result<RequestData, String> {
    let (lines, body) = split_head_and_body(contents)?;
    let request_line = lines.first().copied().unwrap_or("");
    let captures = REQUEST_LINE_REGEX
        .captures(request_line)
        .ok_or_else(|| format!("malformed request line: {:?}", request_line))?;

    let method = Method::from_bytes(captures["method"].as_bytes())
        .map_err(|_| format!("unknown method in request line: {:?}", request_line))?;
    let url = captures["target"]
        .parse::<Uri>()
        .map_err(|_| format!("malformed request target: {:?}", &captures["target"]))?;
    let headers = parse_headers(&lines[1..])?;

    Ok(RequestData {
        method,
        url,
        headers,
        body,
    })
}

fn parse_response(contents: &[u8]) -> Result<ResponseData, String> {
    let (lines, body) = split_head_and_body(contents)?;
    let status_line = lines.first().copied().unwrap_or("");
    let captures = STATUS_LINE_REGEX
        .captures(status_line)
        .ok_or_else(|| format!("malformed status line: {:?}", status_line))?;

    let status = captures["status"]
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| format!("invalid status code in: {:?}", status_line))?;
    let headers = parse_headers(&lines[1..])?;

    Ok(ResponseData {
        status,
        headers,
        body,
    })
}
