//! Binary package manifest reading.
//!
//! A package (`.app`) is a ZIP archive, optionally preceded by a `NAVX`
//! header, that carries an XML manifest named `NavxManifest.xml`:
//!
//! ```text
//! +------+------------+---------- ... ----------+
//! | NAVX | header len | ZIP archive             |
//! +------+------------+---------- ... ----------+
//!   4 B     u32 LE       starts at header len
//! ```
//!
//! Only the `<App>` element and the `<Dependency>` elements are read.

use crate::error::ParseError;
use depset_schema::{AppFileManifest, ManifestDependency};
use regex::Regex;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::LazyLock;

/// Magic bytes of the optional package header.
pub const NAVX_MAGIC: [u8; 4] = *b"NAVX";

/// Archive entry holding the manifest.
pub const MANIFEST_ENTRY: &str = "NavxManifest.xml";

static APP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<App\s([^>]*)>").expect("valid App pattern"));
static DEPENDENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Dependency\s([^>]*)>").expect("valid Dependency pattern"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w.:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute pattern")
});

/// Turns raw package bytes into the metadata the engine analyzes.
pub trait ManifestParser: Send + Sync {
    /// Parse the manifest embedded in `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the bytes are not a package or its
    /// manifest lacks the required metadata.
    fn parse(&self, bytes: &[u8]) -> Result<AppFileManifest, ParseError>;
}

/// Reads `NavxManifest.xml` out of a package archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavxManifestParser;

impl ManifestParser for NavxManifestParser {
    fn parse(&self, bytes: &[u8]) -> Result<AppFileManifest, ParseError> {
        let payload = archive_payload(bytes)?;
        let mut archive = zip::ZipArchive::new(Cursor::new(payload))
            .map_err(|e| ParseError::Archive(e.to_string()))?;
        let mut entry = archive
            .by_name(MANIFEST_ENTRY)
            .map_err(|_| ParseError::MissingManifest(MANIFEST_ENTRY))?;

        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| ParseError::Archive(e.to_string()))?;

        parse_manifest_xml(&xml)
    }
}

/// Skip the `NAVX` header, if any, and return the ZIP payload.
fn archive_payload(bytes: &[u8]) -> Result<&[u8], ParseError> {
    if !bytes.starts_with(&NAVX_MAGIC) {
        return Ok(bytes);
    }
    let len_bytes: [u8; 4] = bytes
        .get(4..8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ParseError::Archive("truncated NAVX header".to_string()))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    bytes
        .get(header_len..)
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| ParseError::Archive("NAVX header overruns package".to_string()))
}

/// Extract app identity and dependencies from manifest XML.
///
/// # Errors
///
/// Returns [`ParseError::MissingApp`] if no `<App>` element exists and
/// [`ParseError::MissingAttribute`] if it lacks `Publisher` or `Version`.
pub fn parse_manifest_xml(xml: &str) -> Result<AppFileManifest, ParseError> {
    let app = APP_RE
        .captures(xml)
        .and_then(|c| c.get(1))
        .map(|m| attributes(m.as_str()))
        .ok_or(ParseError::MissingApp)?;

    let publisher = app
        .get("Publisher")
        .cloned()
        .ok_or(ParseError::MissingAttribute("Publisher"))?;
    let version = app
        .get("Version")
        .cloned()
        .ok_or(ParseError::MissingAttribute("Version"))?;

    let dependencies = DEPENDENCY_RE
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .map(|m| attributes(m.as_str()))
        .filter_map(|attrs| {
            let name = attrs.get("Name")?.clone();
            Some(ManifestDependency {
                name,
                publisher: attrs.get("Publisher").cloned().unwrap_or_default(),
                min_version: attrs
                    .get("MinVersion")
                    .or_else(|| attrs.get("Version"))
                    .cloned()
                    .unwrap_or_default(),
            })
        })
        .collect();

    Ok(AppFileManifest {
        name: app.get("Name").cloned().unwrap_or_default(),
        publisher,
        version,
        dependencies,
    })
}

fn attributes(tag_body: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(tag_body)
        .filter_map(|c| {
            let key = c.get(1)?.as_str().to_string();
            let value = c.get(2).or_else(|| c.get(3))?.as_str();
            Some((key, unescape(value)))
        })
        .collect()
}

fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
