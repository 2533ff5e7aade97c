use crate::error::Error;
use async_trait::async_trait;
use hyper::{client::HttpConnector, Body, Client, Request, Response};
use hyper_tls::HttpsConnector;
use std::fmt::Debug;

/// The transport capability: send a request, get a response or an error.
/// The record and replay transports implement this same contract, so a
/// transport can substitute for the client it wraps.
#[async_trait]
pub trait Transport: Debug {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error>;
}

/// Default underlying transport used in record mode: a hyper client with
/// TLS support.
#[derive(Debug)]
pub struct HyperTransport {
    client: Client<HttpsConnector<HttpConnector>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder().build(HttpsConnector::new()),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        Ok(self.client.request(request).await?)
    }
}
