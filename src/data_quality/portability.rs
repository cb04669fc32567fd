//! Static format classification.

use serde::{Deserialize, Serialize};

/// `(format, machine readable, open format)`. Keys are lowercase extensions.
const FORMATS: &[(&str, bool, bool)] = &[
    ("csv", true, true),
    ("tsv", true, true),
    ("json", true, true),
    ("jsonld", true, true),
    ("geojson", true, true),
    ("xml", true, true),
    ("rdf", true, true),
    ("ttl", true, true),
    ("nt", true, true),
    ("n3", true, true),
    ("kml", true, true),
    ("gml", true, true),
    ("gpx", true, true),
    ("parquet", true, true),
    ("ods", true, true),
    ("xlsx", true, false),
    ("xls", true, false),
    ("shp", true, false),
    ("mdb", true, false),
    ("pdf", false, true),
    ("html", false, true),
    ("txt", false, true),
    ("odt", false, true),
    ("zip", false, true),
    ("docx", false, false),
    ("doc", false, false),
    ("ppt", false, false),
    ("jpg", false, true),
    ("png", false, true),
];

/// Media types mapped to the format keys above.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("text/csv", "csv"),
    ("text/tab-separated-values", "tsv"),
    ("application/json", "json"),
    ("application/ld+json", "jsonld"),
    ("application/geo+json", "geojson"),
    ("application/xml", "xml"),
    ("text/xml", "xml"),
    ("application/rdf+xml", "rdf"),
    ("text/turtle", "ttl"),
    ("application/n-triples", "nt"),
    ("application/vnd.google-earth.kml+xml", "kml"),
    ("application/vnd.oasis.opendocument.spreadsheet", "ods"),
    ("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", "xlsx"),
    ("application/vnd.ms-excel", "xls"),
    ("application/pdf", "pdf"),
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("application/zip", "zip"),
];

const ALIASES: &[(&str, &str)] = &[
    ("json-ld", "jsonld"),
    ("json_ld", "jsonld"),
    ("turtle", "ttl"),
    ("rdf_turtle", "ttl"),
    ("rdf_xml", "rdf"),
    ("n_triples", "nt"),
    ("htm", "html"),
    ("shapefile", "shp"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portability {
    /// Normalized format key, `None` when it could not be determined.
    pub format: Option<String>,
    pub machine_readable: bool,
    pub open_format: bool,
}

impl Portability {
    /// Classify a declared format (extension, name or media type), falling
    /// back to the extension of `url`.
    pub fn detect(format: Option<&str>, url: Option<&str>) -> Self {
        let key = format
            .and_then(normalize_format)
            .or_else(|| url.and_then(extension_of).and_then(|e| normalize_format(&e)));
        Self::classify(key)
    }

    fn classify(key: Option<String>) -> Self {
        let flags = key
            .as_deref()
            .and_then(|k| FORMATS.iter().find(|(f, _, _)| *f == k))
            .map(|(_, machine, open)| (*machine, *open));
        let (machine_readable, open_format) = flags.unwrap_or((false, false));
        Self {
            format: key,
            machine_readable,
            open_format,
        }
    }

    /// Share of the two flags that hold, or `None` for an unknown format.
    pub fn value(&self) -> Option<f64> {
        self.format.as_ref()?;
        Some((u8::from(self.machine_readable) + u8::from(self.open_format)) as f64 / 2.0)
    }
}

/// Lowercase format key for an extension, name, media type or authority IRI.
pub fn normalize_format(raw: &str) -> Option<String> {
    let raw = raw.trim().to_lowercase();
    if raw.is_empty() {
        return None;
    }
    // Media type parameters are irrelevant.
    let raw = raw.split(';').next().unwrap_or_default().trim();
    if let Some((_, key)) = MEDIA_TYPES.iter().find(|(mt, _)| *mt == raw) {
        return Some((*key).to_string());
    }
    // Authority IRIs end in the format code.
    let raw = raw.rsplit(['/', '#']).next().unwrap_or(raw);
    let raw = raw.trim_start_matches('.');
    if raw.is_empty() {
        return None;
    }
    let key = ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map_or(raw, |(_, key)| *key);
    Some(key.to_string())
}

fn extension_of(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_string())
}
