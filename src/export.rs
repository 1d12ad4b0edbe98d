//! Export formatting: render one result's text as a downloadable artifact.
//!
//! Four encodings are supported. Plain text and Markdown are the same bytes
//! under a different suffix; JSON wraps the text in `{"ocr_result": ...}`;
//! PDF draws the text onto a single A4 page. Error text from a failed source
//! is exported like any other text.

use crate::error::ExportError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A4 in PostScript points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
/// Baseline of the first line.
const TEXT_ORIGIN: (i64, i64) = (40, 800);
const FONT_NAME: &str = "Courier";
const FONT_SIZE: i64 = 10;
const LEADING: i64 = 12;

/// Output encoding for an exported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Txt,
    Markdown,
    Json,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Txt,
        ExportFormat::Markdown,
        ExportFormat::Json,
        ExportFormat::Pdf,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// `OCR_Result_<position>.<ext>`, with `position` 1-based.
    pub fn file_name(self, position: usize) -> String {
        format!("OCR_Result_{}.{}", position, self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Txt => f.write_str("TXT"),
            ExportFormat::Markdown => f.write_str("Markdown"),
            ExportFormat::Json => f.write_str("JSON"),
            ExportFormat::Pdf => f.write_str("PDF"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!(
                "unknown export format '{other}' (expected txt, md, json or pdf)"
            )),
        }
    }
}

/// A rendered file ready to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `text` as `format` for the result at 1-based `position`.
pub fn export(text: &str, format: ExportFormat, position: usize) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Txt | ExportFormat::Markdown => text.as_bytes().to_vec(),
        ExportFormat::Json => to_json(text)?.into_bytes(),
        ExportFormat::Pdf => to_pdf(text)?,
    };
    Ok(ExportArtifact {
        file_name: format.file_name(position),
        mime_type: format.mime_type(),
        bytes,
    })
}

/// `{"ocr_result": <text>}`, two-space indent, non-ASCII left as is.
pub fn to_json(text: &str) -> Result<String, ExportError> {
    #[derive(Serialize)]
    struct Payload<'a> {
        ocr_result: &'a str,
    }
    Ok(serde_json::to_string_pretty(&Payload { ocr_result: text })?)
}

/// Draw `text` onto a single A4 page, one input line per output line.
///
/// Lines below the bottom margin are clipped by the page, not wrapped.
pub fn to_pdf(text: &str) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => FONT_NAME,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![TEXT_ORIGIN.0.into(), TEXT_ORIGIN.1.into()]),
    ];
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_latin1(line))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buf)
}

/// Standard Type1 fonts only cover a single-byte encoding; anything outside
/// Latin-1 becomes `?`.
fn to_latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match u32::from(c) {
            0x09 => b' ',
            cp @ 0x20..=0x7E | cp @ 0xA0..=0xFF => cp as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_and_markdown_identical_bytes() {
        let text = "# Heading\n\nÜnïcode ✓";
        let txt = export(text, ExportFormat::Txt, 1).unwrap();
        let md = export(text, ExportFormat::Markdown, 1).unwrap();
        assert_eq!(txt.bytes, md.bytes);
        assert_eq!(txt.bytes, text.as_bytes());
        assert_eq!(txt.file_name, "OCR_Result_1.txt");
        assert_eq!(md.file_name, "OCR_Result_1.md");
    }

    #[test]
    fn json_is_pretty_and_round_trips() {
        let artifact = export("hello\nworld", ExportFormat::Json, 2).unwrap();
        let s = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(s, "{\n  \"ocr_result\": \"hello\\nworld\"\n}");
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["ocr_result"], "hello\nworld");
        assert_eq!(artifact.file_name, "OCR_Result_2.json");
        assert_eq!(artifact.mime_type, "application/json");
    }

    #[test]
    fn json_keeps_non_ascii() {
        let s = to_json("café ❌").unwrap();
        assert!(s.contains("café ❌"), "got: {s}");
    }

    #[test]
    fn error_text_exported_verbatim() {
        let text = "❌ Error extracting result: request failed: boom";
        let artifact = export(text, ExportFormat::Txt, 3).unwrap();
        assert_eq!(artifact.bytes, text.as_bytes());
    }

    #[test]
    fn pdf_is_single_a4_page() {
        let artifact = export("line one\nline two", ExportFormat::Pdf, 1).unwrap();
        assert_eq!(artifact.mime_type, "application/pdf");
        assert_eq!(artifact.file_name, "OCR_Result_1.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&artifact.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn long_text_still_one_page() {
        let text = (0..500).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let bytes = to_pdf(&text).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn pdf_content_has_one_show_per_line() {
        let bytes = to_pdf("a\nb\nc").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_and_decode_page_content(page_id).unwrap();
        let shows = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .count();
        assert_eq!(shows, 3);
    }

    #[test]
    fn latin1_fallback() {
        assert_eq!(to_latin1("aé✓\t"), vec![b'a', 0xE9, b'?', b' ']);
    }

    #[test]
    fn parse_format_names() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("Json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
