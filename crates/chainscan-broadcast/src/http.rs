//! HTTP sink: POSTs each event as JSON, optionally HMAC-signed.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{BroadcastError, BroadcastResult};
use crate::event::ScannedEvent;
use crate::sink::EventSink;

/// Header carrying the hex-encoded HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "x-chainscan-signature";

type HmacSha256 = Hmac<Sha256>;

/// HTTP delivery sink. When a shared secret is configured, each request body
/// is signed and the signature sent in [`SIGNATURE_HEADER`] so receivers can
/// authenticate the sender.
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    shared_secret: Option<String>,
}

impl HttpSink {
    /// Construct a sink delivering to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(endpoint: String, shared_secret: Option<String>) -> BroadcastResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|source| BroadcastError::HttpClient { source })?;
        Ok(Self {
            client,
            endpoint,
            shared_secret,
        })
    }

    /// Whether deliveries from this sink are signed.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.shared_secret.is_some()
    }
}

/// Hex-encoded HMAC-SHA256 of `body` under `secret`.
fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[async_trait]
impl EventSink for HttpSink {
    async fn broadcast(&self, event: &ScannedEvent) -> BroadcastResult<()> {
        let body =
            serde_json::to_vec(event).map_err(|source| BroadcastError::Serialize { source })?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.shared_secret {
            request = request.header(SIGNATURE_HEADER, sign(secret, &body));
        }

        let response = request.body(body).send().await.map_err(|source| {
            BroadcastError::HttpDelivery {
                endpoint: self.endpoint.clone(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BroadcastError::HttpStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_per_secret() {
        let body = br#"{"eventType":"A.1234.Market.Listed"}"#;
        let first = sign("secret", body);
        let second = sign("secret", body);
        let other = sign("other-secret", body);

        assert_eq!(first, second);
        assert_ne!(first, other);
        // Hex-encoded SHA-256 output.
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sink_reports_signing_status() -> anyhow::Result<()> {
        let unsigned = HttpSink::new("https://hooks.example/events".to_string(), None)?;
        assert!(!unsigned.is_signed());
        let signed = HttpSink::new(
            "https://hooks.example/events".to_string(),
            Some("secret".to_string()),
        )?;
        assert!(signed.is_signed());
        Ok(())
    }
}
