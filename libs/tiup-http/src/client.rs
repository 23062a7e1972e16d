use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue, USER_AGENT};
use http::{Method, Request, Uri};
use http_body_util::Full;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::{HttpError, InvalidUriKind};
use crate::response::HttpResponse;

type Connector = HttpsConnector<HttpConnector>;

/// HTTP client shared by the mirror and playground clients
///
/// `HttpClient` is `Clone + Send + Sync`; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client<Connector, Full<Bytes>>,
    user_agent: HeaderValue,
}

impl HttpClient {
    /// Create a client sending `user_agent` with every request.
    ///
    /// # Errors
    /// Returns an error if the user agent is not a valid header value or TLS
    /// initialization fails.
    pub fn new(user_agent: &str) -> Result<Self, HttpError> {
        let user_agent = HeaderValue::from_str(user_agent)?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(crypto_provider())
            .map_err(|e| HttpError::Tls(Box::new(e)))?
            .https_or_http()
            .enable_http1()
            .build();

        let inner = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(connector);

        Ok(Self { inner, user_agent })
    }

    /// Send a GET request.
    ///
    /// # Errors
    /// Returns an error on invalid URL or transport failure. HTTP error
    /// statuses are not errors here.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(Method::GET, url, None).await
    }

    /// GET `url` and decode a successful JSON response.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or malformed JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        self.get(url).await?.error_for_status().await?.json().await
    }

    /// GET `url` and buffer a successful response body.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes, HttpError> {
        self.get(url).await?.error_for_status().await?.bytes().await
    }

    /// POST `body` encoded as JSON.
    ///
    /// # Errors
    /// Returns an error on encoding failure, invalid URL, or transport failure.
    pub async fn post_json<T>(&self, url: &str, body: &T) -> Result<HttpResponse, HttpError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(body)?;
        self.send(Method::POST, url, Some(data)).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, HttpError> {
        let uri = parse_uri(url)?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone());
        let body = match body {
            Some(data) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(data))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder.body(body)?;

        tracing::debug!(%method, url, "sending HTTP request");
        let response = self.inner.request(request).await?;
        tracing::debug!(%method, url, status = %response.status(), "received HTTP response");

        Ok(HttpResponse::new(response))
    }
}

/// Use the process-wide rustls provider if one is installed, aws-lc-rs otherwise.
fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn parse_uri(url: &str) -> Result<Uri, HttpError> {
    let invalid = |kind, reason: String| HttpError::InvalidUri {
        url: url.to_owned(),
        kind,
        reason,
    };

    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| invalid(InvalidUriKind::ParseError, e.to_string()))?;
    if uri.scheme().is_none() {
        return Err(invalid(
            InvalidUriKind::MissingScheme,
            "URL must start with http:// or https://".to_owned(),
        ));
    }
    if uri.authority().is_none() {
        return Err(invalid(
            InvalidUriKind::MissingAuthority,
            "URL must include a host".to_owned(),
        ));
    }
    Ok(uri)
}
