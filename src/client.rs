//! OCR service client.
//!
//! [`OcrService`] is the seam between the pipeline and the network: the
//! pipeline only ever sees `Result<OcrResponse, OcrError>`, so tests can swap
//! in an in-process implementation. [`MistralClient`] is the real one, a
//! single `POST /v1/ocr` call per source with bearer-token auth.

use crate::config::OcrConfig;
use crate::error::{OcrAppError, OcrError};
use crate::pipeline::descriptor::DocumentDescriptor;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Body of an OCR request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrRequest {
    pub model: String,
    pub document: DocumentDescriptor,
    pub include_image_base64: bool,
}

/// The subset of the OCR response this crate uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage_info: Option<UsageInfo>,
}

/// One page of OCR output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub images: Vec<OcrImage>,
}

/// An image the service cut out of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrImage {
    pub id: String,
    /// Base64 payload, either bare or as a `data:` URI.
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl OcrImage {
    /// Decoded image bytes, or `None` if the service sent no payload.
    pub fn decode(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        let raw = self.image_base64.as_deref()?;
        let payload = raw.split_once(";base64,").map_or(raw, |(_, p)| p);
        Some(STANDARD.decode(payload.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: u64,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}

/// Anything that can perform one OCR call.
#[async_trait]
pub trait OcrService: Send + Sync {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, OcrError>;
}

/// reqwest-backed client for the Mistral OCR endpoint.
pub struct MistralClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl MistralClient {
    /// Construct a client from the run configuration.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrAppError> {
        if config.api_key.trim().is_empty() {
            return Err(OcrAppError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .user_agent(concat!("mistral-ocr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OcrAppError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            timeout_secs: config.api_timeout_secs,
        })
    }

    fn map_transport(&self, e: reqwest::Error) -> OcrError {
        if e.is_timeout() {
            OcrError::Timeout {
                secs: self.timeout_secs,
            }
        } else if e.is_decode() {
            OcrError::Decode(e.to_string())
        } else {
            OcrError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl OcrService for MistralClient {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse, OcrError> {
        debug!("POST {} (model {})", self.endpoint, request.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        parse_response(&body)
    }
}

/// Decode a successful response body.
pub fn parse_response(body: &str) -> Result<OcrResponse, OcrError> {
    serde_json::from_str(body).map_err(|e| OcrError::Decode(e.to_string()))
}

/// Map a non-success status and its body to an [`OcrError`].
///
/// Mistral error bodies carry a `message` (or `detail`) field; fall back to
/// the raw body, then the status text.
pub fn status_error(status: u16, body: &str) -> OcrError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("detail"))
                .map(|m| match m.as_str() {
                    Some(s) => s.to_string(),
                    None => m.to_string(),
                })
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });

    match status {
        401 | 403 => OcrError::Auth { status, message },
        _ => OcrError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileType, SourceType};

    #[test]
    fn request_serialises_to_wire_shape() {
        let req = OcrRequest {
            model: "mistral-ocr-latest".into(),
            document: DocumentDescriptor::ImageUrl {
                image_url: "data:image/png;base64,AAAA".into(),
            },
            include_image_base64: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "mistral-ocr-latest",
                "document": {"type": "image_url", "image_url": "data:image/png;base64,AAAA"},
                "include_image_base64": true
            })
        );
    }

    #[test]
    fn parse_full_response() {
        let body = r##"{
            "pages": [
                {"index": 0, "markdown": "# Title", "images": [{"id": "img-0.jpeg", "image_base64": "data:image/jpeg;base64,AAA"}],
                 "dimensions": {"dpi": 200, "height": 2200, "width": 1700}},
                {"index": 1, "markdown": "body", "images": []}
            ],
            "model": "mistral-ocr-2505",
            "usage_info": {"pages_processed": 2, "doc_size_bytes": 1234}
        }"##;
        let resp = parse_response(body).unwrap();
        assert_eq!(resp.pages.len(), 2);
        assert_eq!(resp.pages[0].markdown, "# Title");
        assert_eq!(resp.pages[0].images[0].id, "img-0.jpeg");
        assert_eq!(resp.usage_info.unwrap().pages_processed, 2);
    }

    #[test]
    fn parse_response_without_pages() {
        let resp = parse_response("{}").unwrap();
        assert!(resp.pages.is_empty());
    }

    #[test]
    fn parse_garbage_is_decode_error() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Err(OcrError::Decode(_))
        ));
    }

    #[test]
    fn image_decode_accepts_data_uri_and_bare() {
        let uri = OcrImage {
            id: "img-0.jpeg".into(),
            image_base64: Some("data:image/jpeg;base64,AQID".into()),
        };
        assert_eq!(uri.decode().unwrap().unwrap(), vec![1, 2, 3]);

        let bare = OcrImage {
            id: "img-1.png".into(),
            image_base64: Some("AQID".into()),
        };
        assert_eq!(bare.decode().unwrap().unwrap(), vec![1, 2, 3]);

        let none = OcrImage {
            id: "img-2.png".into(),
            image_base64: None,
        };
        assert!(none.decode().is_none());
    }

    #[test]
    fn status_401_is_auth() {
        let e = status_error(401, r#"{"message":"Unauthorized"}"#);
        assert_eq!(
            e,
            OcrError::Auth {
                status: 401,
                message: "Unauthorized".into()
            }
        );
    }

    #[test]
    fn status_422_uses_detail() {
        let e = status_error(422, r#"{"detail":[{"msg":"bad url"}]}"#);
        match e {
            OcrError::Api { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("bad url"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn status_with_empty_body_uses_reason() {
        let e = status_error(500, "");
        assert_eq!(
            e,
            OcrError::Api {
                status: 500,
                message: "Internal Server Error".into()
            }
        );
    }

    #[test]
    fn client_builds_from_config() {
        let config = OcrConfig::builder()
            .api_key("sk-test")
            .file_type(FileType::Pdf)
            .source_type(SourceType::Url)
            .build()
            .unwrap();
        let client = MistralClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.mistral.ai/v1/ocr");
        assert!(!format!("{client:?}").contains("sk-test"));
    }
}
