//! Document descriptors: map a source to the payload the OCR service expects.
//!
//! URL sources pass through verbatim. Uploads are inlined as base64 data URIs
//! so no separate file transfer is needed; the same URI doubles as the
//! preview reference.

use crate::config::FileType;
use crate::pipeline::source::Source;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The `document` field of an OCR request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentDescriptor {
    DocumentUrl { document_url: String },
    ImageUrl { image_url: String },
}

impl DocumentDescriptor {
    /// The URL or data URI the service will read from.
    pub fn location(&self) -> &str {
        match self {
            DocumentDescriptor::DocumentUrl { document_url } => document_url,
            DocumentDescriptor::ImageUrl { image_url } => image_url,
        }
    }

    fn new(file_type: FileType, location: String) -> Self {
        match file_type {
            FileType::Pdf => DocumentDescriptor::DocumentUrl {
                document_url: location,
            },
            FileType::Image => DocumentDescriptor::ImageUrl {
                image_url: location,
            },
        }
    }
}

/// A source ready to send: descriptor, preview reference and, for uploaded
/// images, the raw bytes for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSource {
    pub descriptor: DocumentDescriptor,
    pub preview_reference: String,
    pub raw_image_bytes: Option<Vec<u8>>,
}

/// Build the descriptor and preview reference for one source.
pub fn build_descriptor(file_type: FileType, source: &Source) -> PreparedSource {
    match source {
        Source::Url(url) => {
            let location = url.trim().to_string();
            PreparedSource {
                descriptor: DocumentDescriptor::new(file_type, location.clone()),
                preview_reference: location,
                raw_image_bytes: None,
            }
        }
        Source::Upload(file) => {
            let media = match file_type {
                FileType::Pdf => "application/pdf",
                FileType::Image => file.media_type.as_str(),
            };
            let uri = data_uri(media, &file.bytes);
            debug!("Encoded '{}' → {} bytes data URI", file.name, uri.len());
            PreparedSource {
                descriptor: DocumentDescriptor::new(file_type, uri.clone()),
                preview_reference: uri,
                raw_image_bytes: match file_type {
                    FileType::Image => Some(file.bytes.clone()),
                    FileType::Pdf => None,
                },
            }
        }
    }
}

/// `data:<media>;base64,<payload>`
pub fn data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}
