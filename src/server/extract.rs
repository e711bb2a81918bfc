use crate::Error;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use tracing::warn;

/// JSON body extractor that reads an empty body as `T::default()`.
///
/// Endpoints report their own "No ... provided" message for missing fields,
/// so a request without a body must reach the handler instead of being
/// rejected here. Content type is not checked.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            warn!("Rejected request body for {}: {}", path, e);
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                Error::payload_too_large(format!("Request body too large: {}", e))
            } else {
                Error::validation(format!("Failed to read request body: {}", e))
            }
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            warn!("Rejected malformed JSON body for {}: {}", path, e);
            Error::validation(format!("Invalid JSON body: {}", e))
        })
    }
}
