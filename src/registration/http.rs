//! HTTPS client shared by the Firebase REST clients

use crate::registration::error::RegistrationError;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use serde::Serialize;

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

pub fn build_client() -> Result<HttpsClient, RegistrationError> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| {
            RegistrationError::ConfigError(format!("Failed to load native TLS roots: {}", e))
        })?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    Ok(Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector))
}

pub async fn post_json<T: Serialize>(
    client: &HttpsClient,
    url: &str,
    payload: &T,
) -> Result<HttpResponse, RegistrationError> {
    let body = serde_json::to_vec(payload)?;
    let request = Request::builder()
        .method(Method::POST)
        .uri(url)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| RegistrationError::Http(format!("Invalid request to {}: {}", url, e)))?;

    send(client, request).await
}

pub async fn post_bytes(
    client: &HttpsClient,
    url: &str,
    content_type: &str,
    authorization: &str,
    data: Vec<u8>,
) -> Result<HttpResponse, RegistrationError> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(url)
        .header("content-type", content_type)
        .header("authorization", authorization)
        .body(Full::new(Bytes::from(data)))
        .map_err(|e| RegistrationError::Http(format!("Invalid request to {}: {}", url, e)))?;

    send(client, request).await
}

pub async fn get(
    client: &HttpsClient,
    url: &str,
    authorization: &str,
) -> Result<HttpResponse, RegistrationError> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(url)
        .header("authorization", authorization)
        .body(Full::new(Bytes::new()))
        .map_err(|e| RegistrationError::Http(format!("Invalid request to {}: {}", url, e)))?;

    send(client, request).await
}

async fn send(
    client: &HttpsClient,
    request: Request<Full<Bytes>>,
) -> Result<HttpResponse, RegistrationError> {
    let response = client
        .request(request)
        .await
        .map_err(|e| RegistrationError::Http(format!("Request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| RegistrationError::Http(format!("Failed to read response body: {}", e)))?
        .to_bytes();

    Ok(HttpResponse { status, body })
}
