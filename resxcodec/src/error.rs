//! All error types for the resxcodec crate.
//!
//! Every fallible operation (loading, mutation, conversion) returns one of
//! these variants; none are silently swallowed or retried, and no partial
//! output is produced on failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("invalid resource document: {0}")]
    InvalidDocument(String),

    #[error("invalid resource document: entry with empty or whitespace-only name")]
    EmptyKey,

    #[error("duplicate keys: {}", .0.iter().map(|k| format!("\"{k}\"")).collect::<Vec<_>>().join(", "))]
    DuplicateKeys(Vec<String>),

    #[error(
        "unsupported conversion from '{input}' to '{output}'; supported conversions are .json to .resx and .resx to .json"
    )]
    UnsupportedConversion { input: String, output: String },
}
