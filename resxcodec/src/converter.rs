//! Conversion between JSON resource maps and ResX documents.
//!
//! The JSON side is a single flat object mapping string keys to string (or
//! null) values. Conversion applies the key mapping (`.` ↔ `_`) and the
//! placeholder translation in the chosen direction, then hands the target
//! representation back for serialization.
//!
//! The key mapping is best-effort, not bijective: a JSON key containing a
//! literal underscore, or a ResX key containing a literal dot, will not
//! round-trip losslessly.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::Path;

use crate::{
    document::ResourceDocument,
    error::Error,
    placeholder::{to_json_placeholders, to_resx_placeholders},
    traits::Parser,
};

/// The two supported conversion directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    JsonToResx,
    ResxToJson,
}

impl Display for Conversion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversion::JsonToResx => write!(f, "JSON to ResX"),
            Conversion::ResxToJson => write!(f, "ResX to JSON"),
        }
    }
}

/// Builds a ResX document from a JSON resource map.
///
/// Every key has its dots replaced with underscores and every value has its
/// `{{name}}` tokens rewritten to `${name}`; the results populate a document
/// seeded from the empty template. Nested or non-string JSON values fail
/// deserialization.
///
/// # Example
///
/// ```rust
/// use resxcodec::converter::json_to_document;
///
/// let document = json_to_document(r#"{"app.title": "My Application"}"#)?;
/// assert_eq!(document.get("app_title"), Some("My Application"));
/// # Ok::<(), resxcodec::Error>(())
/// ```
pub fn json_to_document(json: &str) -> Result<ResourceDocument, Error> {
    let map: BTreeMap<String, Option<String>> = serde_json::from_str(json)?;

    let mut document = ResourceDocument::empty();
    for (key, value) in &map {
        let value = value.as_deref().map(to_resx_placeholders);
        document.set(&key.replace('.', "_"), value.as_deref())?;
    }
    Ok(document)
}

/// Renders a ResX document as an indented JSON resource map.
///
/// Every entry key has its underscores replaced with dots and every text has
/// its `${name}` tokens rewritten to `{{name}}`. Output is pretty-printed
/// with non-ASCII characters emitted unescaped to keep diffs readable.
///
/// Distinct entry keys can map to the same JSON key (`a_b` and `a.b` both
/// become `a.b`); such a collision is reported as a duplicate-key error
/// rather than one value silently shadowing the other.
pub fn document_to_json(document: &ResourceDocument) -> Result<String, Error> {
    let mut map = BTreeMap::new();
    let mut collisions = BTreeSet::new();
    for entry in document.entries() {
        let key = entry.key.replace('_', ".");
        if map
            .insert(key.clone(), to_json_placeholders(&entry.text))
            .is_some()
        {
            collisions.insert(key);
        }
    }
    if !collisions.is_empty() {
        return Err(Error::DuplicateKeys(collisions.into_iter().collect()));
    }

    Ok(serde_json::to_string_pretty(&map)?)
}

/// Infers the conversion direction from the case-insensitive extension pair.
///
/// # Example
///
/// ```rust
/// use resxcodec::converter::{Conversion, infer_conversion};
/// use std::path::Path;
///
/// assert_eq!(
///     infer_conversion(Path::new("strings.json"), Path::new("Strings.resx")),
///     Some(Conversion::JsonToResx)
/// );
/// assert_eq!(
///     infer_conversion(Path::new("Strings.RESX"), Path::new("strings.Json")),
///     Some(Conversion::ResxToJson)
/// );
/// assert_eq!(
///     infer_conversion(Path::new("notes.txt"), Path::new("Strings.resx")),
///     None
/// );
/// ```
pub fn infer_conversion(input: &Path, output: &Path) -> Option<Conversion> {
    let input = extension_of(input)?;
    let output = extension_of(output)?;
    match (input.as_str(), output.as_str()) {
        ("json", "resx") => Some(Conversion::JsonToResx),
        ("resx", "json") => Some(Conversion::ResxToJson),
        _ => None,
    }
}

/// Converts a file to the other representation, inferring the direction from
/// the extension pair.
///
/// Performs a single read before and a single write after the pure
/// transform; on any error nothing is written.
///
/// # Example
///
/// ```rust,no_run
/// use resxcodec::convert_auto;
/// convert_auto("strings.json", "Strings.resx")?;
/// # Ok::<(), resxcodec::Error>(())
/// ```
pub fn convert_auto<P: AsRef<Path>>(input: P, output: P) -> Result<Conversion, Error> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input file not found: {}", input.display()),
        )));
    }

    let conversion =
        infer_conversion(input, output).ok_or_else(|| Error::UnsupportedConversion {
            input: display_extension(input),
            output: display_extension(output),
        })?;

    match conversion {
        Conversion::JsonToResx => {
            let json = fs::read_to_string(input)?;
            json_to_document(&json)?.write_to(output)?;
        }
        Conversion::ResxToJson => {
            let document = ResourceDocument::read_from(input)?;
            fs::write(output, document_to_json(&document)?)?;
        }
    }
    Ok(conversion)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn display_extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| format!(".{s}"))
        .unwrap_or_default()
}
