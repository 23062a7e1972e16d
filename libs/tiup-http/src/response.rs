use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::HttpError;

/// Maximum number of body bytes kept in a status error preview
const BODY_PREVIEW_LIMIT: usize = 256;

/// HTTP response with body-reading helpers.
///
/// Any status is returned as-is; use [`HttpResponse::error_for_status`] to
/// turn non-2xx responses into errors.
#[derive(Debug)]
pub struct HttpResponse {
    inner: Response<Incoming>,
}

impl HttpResponse {
    pub(crate) const fn new(inner: Response<Incoming>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Buffer the whole body.
    ///
    /// # Errors
    /// Returns an error if reading the body fails.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let collected = self.inner.into_body().collect().await?;
        Ok(collected.to_bytes())
    }

    /// Buffer the body and decode it as JSON.
    ///
    /// # Errors
    /// Returns an error if reading or decoding the body fails.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = self.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Convert a non-2xx response into [`HttpError::HttpStatus`].
    ///
    /// # Errors
    /// Returns an error if the status is not successful.
    pub async fn error_for_status(self) -> Result<Self, HttpError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let body = self.bytes().await.unwrap_or_default();
        let preview_len = body.len().min(BODY_PREVIEW_LIMIT);
        Err(HttpError::HttpStatus {
            status,
            body_preview: String::from_utf8_lossy(&body[..preview_len]).into_owned(),
        })
    }

    /// Stream the body into `out` frame by frame, without buffering it.
    ///
    /// # Errors
    /// Returns an error if reading a frame or writing to `out` fails.
    pub async fn copy_to<W>(self, out: &mut W) -> Result<(), HttpError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut body = self.inner.into_body();
        while let Some(frame) = body.frame().await {
            if let Ok(chunk) = frame?.into_data() {
                out.write_all(&chunk).await?;
            }
        }
        out.flush().await?;
        Ok(())
    }
}
