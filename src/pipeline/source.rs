//! Source collection: normalise user input into an ordered list of [`Source`]s.
//!
//! URL mode takes newline-separated text; upload mode takes local file paths
//! which are read fully into memory. Nothing here checks that a URL is
//! reachable or that a file really is a PDF or image; bad input surfaces
//! later as a per-source OCR failure.

use crate::config::{FileType, SourceType};
use crate::error::OcrAppError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One input to the OCR pipeline. Immutable once collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A remote document or image URL.
    Url(String),
    /// A local file read into memory.
    Upload(UploadedFile),
}

impl Source {
    /// The source type this source belongs to.
    pub fn kind(&self) -> SourceType {
        match self {
            Source::Url(_) => SourceType::Url,
            Source::Upload(_) => SourceType::Upload,
        }
    }

    /// Human-readable label: the trimmed URL or the upload's file name.
    pub fn label(&self) -> &str {
        match self {
            Source::Url(url) => url.trim(),
            Source::Upload(file) => &file.name,
        }
    }
}

/// An uploaded binary with its declared media type and name.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub name: String,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            name: name.into(),
        }
    }

    /// Read a local file, deriving its media type from the file type and extension.
    pub fn from_path(path: impl AsRef<Path>, file_type: FileType) -> Result<Self, OcrAppError> {
        let path = path.as_ref();
        let bytes = read_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for(path, file_type);
        debug!(
            "Read upload '{}' ({} bytes, {})",
            name,
            bytes.len(),
            media_type
        );
        Ok(Self::new(bytes, media_type, name))
    }
}

/// Split newline-separated URL text into URL sources.
///
/// Lines are trimmed and blank lines are dropped, so empty text yields no
/// sources.
pub fn sources_from_url_text(text: &str) -> Vec<Source> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Source::Url(line.to_string()))
        .collect()
}

/// Interpret raw CLI-style inputs according to the source type.
///
/// * [`SourceType::Url`] — each input is URL text (may itself contain newlines).
/// * [`SourceType::Upload`] — each input is a local file path.
pub fn collect_sources<S: AsRef<str>>(
    source_type: SourceType,
    file_type: FileType,
    inputs: &[S],
) -> Result<Vec<Source>, OcrAppError> {
    let sources: Vec<Source> = match source_type {
        SourceType::Url => inputs
            .iter()
            .flat_map(|i| sources_from_url_text(i.as_ref()))
            .collect(),
        SourceType::Upload => inputs
            .iter()
            .map(|i| i.as_ref().trim())
            .filter(|i| !i.is_empty())
            .map(|p| UploadedFile::from_path(p, file_type).map(Source::Upload))
            .collect::<Result<Vec<_>, _>>()?,
    };
    debug!("Collected {} {} sources", sources.len(), source_type);
    Ok(sources)
}

/// Media type for an upload: always `application/pdf` in PDF mode, otherwise
/// guessed from the extension.
fn media_type_for(path: &Path, file_type: FileType) -> String {
    match file_type {
        FileType::Pdf => "application/pdf".to_string(),
        FileType::Image => image::ImageFormat::from_path(path)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string()),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, OcrAppError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => OcrAppError::PermissionDenied {
            path: PathBuf::from(path),
        },
        _ => OcrAppError::FileNotFound {
            path: PathBuf::from(path),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn url_text_splits_and_drops_blanks() {
        let sources = sources_from_url_text("https://a/1.pdf\n\n  https://b/2.pdf  \n");
        assert_eq!(
            sources,
            vec![
                Source::Url("https://a/1.pdf".into()),
                Source::Url("https://b/2.pdf".into()),
            ]
        );
    }

    #[test]
    fn empty_url_text_has_no_sources() {
        assert!(sources_from_url_text("").is_empty());
        assert!(sources_from_url_text("\n  \n").is_empty());
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(
            media_type_for(Path::new("scan.png"), FileType::Image),
            "image/png"
        );
        assert_eq!(
            media_type_for(Path::new("scan.JPG"), FileType::Image),
            "image/jpeg"
        );
        assert_eq!(
            media_type_for(Path::new("doc.bin"), FileType::Pdf),
            "application/pdf"
        );
        assert_eq!(
            media_type_for(Path::new("notes.xyz"), FileType::Image),
            "application/octet-stream"
        );
    }

    #[test]
    fn upload_from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4 fake")
            .unwrap();

        let file = UploadedFile::from_path(&path, FileType::Pdf).unwrap();
        assert_eq!(file.name, "doc.pdf");
        assert_eq!(file.media_type, "application/pdf");
        assert_eq!(file.bytes, b"%PDF-1.4 fake");
    }

    #[test]
    fn missing_upload_is_fatal() {
        let err = collect_sources(SourceType::Upload, FileType::Pdf, &["/no/such/file.pdf"])
            .unwrap_err();
        assert!(matches!(err, OcrAppError::FileNotFound { .. }));
    }

    #[test]
    fn collect_url_inputs_preserves_order() {
        let sources =
            collect_sources(SourceType::Url, FileType::Image, &["u1\nu2", "u3"]).unwrap();
        let labels: Vec<&str> = sources.iter().map(Source::label).collect();
        assert_eq!(labels, vec!["u1", "u2", "u3"]);
    }
}
