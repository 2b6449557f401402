#![forbid(unsafe_code)]
//! JSON ↔ ResX localized-resource converter.
//!
//! Converts flat JSON key/value maps to .NET ResX resource documents and back,
//! preserving keys, values, comments, and embedded placeholder tokens across
//! the round trip. All conversion happens through the [`ResourceDocument`]
//! model, which keeps everything it does not rewrite (schema boilerplate,
//! typed entries, comments) intact.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resxcodec::convert_auto;
//!
//! // Direction is inferred from the extension pair.
//! convert_auto("strings.json", "Strings.resx")?;
//! convert_auto("Strings.resx", "strings.json")?;
//! # Ok::<(), resxcodec::Error>(())
//! ```
//!
//! Or work with the document model directly:
//!
//! ```rust
//! use resxcodec::converter::json_to_document;
//!
//! let document = json_to_document(r#"{"app.greeting": "Hello {{name}}"}"#)?;
//! assert_eq!(document.get("app_greeting"), Some("Hello ${name}"));
//! # Ok::<(), resxcodec::Error>(())
//! ```

pub mod converter;
pub mod document;
pub mod error;
pub mod placeholder;
pub mod traits;

// Re-export most used types for easy consumption
pub use crate::{
    converter::{Conversion, convert_auto, document_to_json, infer_conversion, json_to_document},
    document::{ResourceDocument, ResourceEntry},
    error::Error,
    traits::Parser,
};
