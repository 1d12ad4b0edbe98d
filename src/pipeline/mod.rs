//! Pipeline stages for one OCR run.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ descriptor ──▶ ocr
//! (URL/file)  (data URI)    (service call, normalise)
//! ```
//!
//! 1. [`source`]     — turn URL text or file paths into ordered [`source::Source`]s
//! 2. [`descriptor`] — build the request payload and preview reference;
//!    uploads are base64-inlined as data URIs
//! 3. [`ocr`]        — call the service, join page markdown, turn failures into
//!    inline error text; the only stage with network I/O

pub mod descriptor;
pub mod ocr;
pub mod source;
