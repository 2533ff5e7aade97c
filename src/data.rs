use crate::error::Error;
use hyper::{body, Body, HeaderMap, Method, Request, Response, StatusCode, Uri};
use std::fmt::Display;

/// Immutable snapshot of a request taken at the moment it was intercepted.
///
/// All fields are deep copies: mutating a snapshot (e.g. in a sanitizer)
/// never affects the request that goes over the wire, and vice versa.
#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: Method,
    pub url: Uri,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RequestData {
    /// Buffers the request body and returns the snapshot together with a
    /// rebuilt request that is still sendable afterward.
    pub async fn from_request(request: Request<Body>) -> Result<(Self, Request<Body>), Error> {
        let (parts, request_body) = request.into_parts();
        let body_bytes = body::to_bytes(request_body).await?;

        let data = RequestData {
            method: parts.method.clone(),
            url: parts.uri.clone(),
            headers: parts.headers.clone(),
            body: body_bytes.to_vec(),
        };
        let rebuilt = Request::from_parts(parts, Body::from(body_bytes));

        Ok((data, rebuilt))
    }
}

impl Display for RequestData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Buffered view of a response, used for fixture serialization and for
/// response transforms.
#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ResponseData {
    pub async fn from_response(response: Response<Body>) -> Result<Self, Error> {
        let (parts, response_body) = response.into_parts();
        let body_bytes = body::to_bytes(response_body).await?;

        Ok(ResponseData {
            status: parts.status,
            headers: parts.headers,
            body: body_bytes.to_vec(),
        })
    }

    pub fn into_response(self) -> Result<Response<Body>, Error> {
        let mut builder = Response::builder().status(self.status);
        if let Some(headers_mut) = builder.headers_mut() {
            *headers_mut = self.headers;
        }

        Ok(builder.body(Body::from(self.body))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_snapshot_keeps_request_sendable() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("https://example.com/things?q=1")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"a":1}"#))
            .unwrap();

        let (data, rebuilt) = RequestData::from_request(request).await.unwrap();
        assert_eq!(data.method, Method::POST);
        assert_eq!(data.url.path(), "/things");
        assert_eq!(data.body, br#"{"a":1}"#.to_vec());

        // the rebuilt request still carries the full body
        let replayed = body::to_bytes(rebuilt.into_body()).await.unwrap();
        assert_eq!(&replayed[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn snapshot_mutation_doesnt_touch_rebuilt_request() {
        let request = Request::builder()
            .uri("https://example.com/")
            .header("Authorization", "Bearer z")
            .body(Body::empty())
            .unwrap();

        let (mut data, rebuilt) = RequestData::from_request(request).await.unwrap();
        data.headers.remove("authorization");

        assert!(rebuilt.headers().contains_key("authorization"));
    }

    #[tokio::test]
    async fn response_data_round_trips_through_hyper_response() {
        let response = Response::builder()
            .status(StatusCode::CREATED)
            .header("X-Sample", "value")
            .body(Body::from("created"))
            .unwrap();

        let data = ResponseData::from_response(response).await.unwrap();
        assert_eq!(data.status, StatusCode::CREATED);

        let rebuilt = data.into_response().unwrap();
        assert_eq!(rebuilt.status(), StatusCode::CREATED);
        assert_eq!(rebuilt.headers().get("x-sample").unwrap(), "value");
        let body_bytes = body::to_bytes(rebuilt.into_body()).await.unwrap();
        assert_eq!(&body_bytes[..], b"created");
    }
}
