//! Controlled vocabularies used by vocabulary metrics.
//!
//! The evaluator only sees the [`VocabularyLookup`] trait. [`VocabularySet`]
//! is the in-memory implementation: it starts from a built-in subset of the
//! EU authority tables and can be extended with `*.jsonl` / `*.json` files
//! in the format written by the vocabulary conversion tooling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::CollaboratorError;

/// Membership test against a named vocabulary.
pub trait VocabularyLookup: Send + Sync {
    /// `Ok(true)` when `value` matches an entry of `vocabulary`.
    fn lookup(&self, vocabulary: &str, value: &str) -> Result<bool, CollaboratorError>;
}

/// Normalize a value for comparison: trimmed, lowercased, without a trailing
/// `/` or `#`.
pub fn normalize(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(['/', '#'])
        .to_lowercase()
}

/// One vocabulary row. Which fields are set depends on the vocabulary type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalent_uri: Option<String>,
}

impl VocabularyEntry {
    fn keys(&self) -> impl Iterator<Item = String> + '_ {
        [
            &self.uri,
            &self.label,
            &self.code,
            &self.url,
            &self.equivalent_uri,
        ]
        .into_iter()
        .flatten()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
    }
}

/// Header line of a vocabulary file.
#[derive(Debug, Clone, Deserialize)]
struct VocabularyMeta {
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct VocabularyDocument {
    #[serde(flatten)]
    meta: VocabularyMeta,
    #[serde(default)]
    entries: Vec<VocabularyEntry>,
}

/// A named list of entries with a normalized match index.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    name: String,
    kind: String,
    entries: Vec<VocabularyEntry>,
    keys: BTreeSet<String>,
}

impl Vocabulary {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        entries: Vec<VocabularyEntry>,
    ) -> Self {
        let keys = entries.iter().flat_map(VocabularyEntry::keys).collect();
        Self {
            name: name.into(),
            kind: kind.into(),
            entries,
            keys,
        }
    }

    /// Parse the JSONL form: a metadata line followed by one entry per line.
    /// `fallback_name` is used when the metadata has no name.
    pub fn from_jsonl(content: &str, fallback_name: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let meta: VocabularyMeta = match lines.next() {
            Some((_, line)) => {
                serde_json::from_str(line).context("Invalid vocabulary metadata line")?
            }
            None => anyhow::bail!("Vocabulary '{}' is empty", fallback_name),
        };

        let mut entries = Vec::new();
        for (n, line) in lines {
            let entry: VocabularyEntry = serde_json::from_str(line)
                .with_context(|| format!("Invalid vocabulary entry on line {}", n + 1))?;
            entries.push(entry);
        }

        Ok(Self::from_parts(meta, entries, fallback_name))
    }

    /// Parse the JSON form: the metadata object with an `entries` array.
    pub fn from_json(content: &str, fallback_name: &str) -> Result<Self> {
        let doc: VocabularyDocument =
            serde_json::from_str(content).context("Invalid vocabulary document")?;
        Ok(Self::from_parts(doc.meta, doc.entries, fallback_name))
    }

    /// Read a vocabulary file, choosing the parser from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary {}", path.display()))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let vocabulary = match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") => Self::from_jsonl(&content, stem),
            _ => Self::from_json(&content, stem),
        }
        .with_context(|| format!("Failed to parse vocabulary {}", path.display()))?;
        Ok(vocabulary)
    }

    fn from_parts(
        meta: VocabularyMeta,
        entries: Vec<VocabularyEntry>,
        fallback_name: &str,
    ) -> Self {
        if let Some(expected) = meta.count {
            if expected != entries.len() {
                tracing::warn!(
                    vocabulary = fallback_name,
                    expected,
                    actual = entries.len(),
                    "vocabulary entry count does not match its header"
                );
            }
        }
        let name = meta.name.unwrap_or_else(|| fallback_name.to_string());
        let kind = meta.kind.unwrap_or_else(|| "uri_label".to_string());
        Self::new(name, kind, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        let key = normalize(value);
        !key.is_empty() && self.keys.contains(&key)
    }
}

/// Vocabularies keyed by name.
#[derive(Debug, Clone, Default)]
pub struct VocabularySet {
    vocabularies: BTreeMap<String, Vocabulary>,
}

impl VocabularySet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in authority subset for the six standard vocabularies.
    pub fn builtin() -> Self {
        let mut set = Self::empty();
        set.insert(authority_table("access_rights", ACCESS_RIGHT_NS, ACCESS_RIGHTS));
        set.insert(authority_table("file_types", FILE_TYPE_NS, FILE_TYPES));
        set.insert(authority_table("machine_readable", FILE_TYPE_NS, MACHINE_READABLE));
        set.insert(authority_table("non_proprietary", FILE_TYPE_NS, NON_PROPRIETARY));
        set.insert(media_type_table());
        set.insert(license_table());
        set
    }

    /// Replace any vocabulary with the same name.
    pub fn insert(&mut self, vocabulary: Vocabulary) {
        self.vocabularies
            .insert(vocabulary.name.clone(), vocabulary);
    }

    /// Load every `*.jsonl` and `*.json` file in `dir`, replacing built-ins
    /// of the same name. Files are read in path order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut paths = Vec::new();
        for ext in ["jsonl", "json"] {
            let pattern = dir.join(format!("*.{}", ext));
            let pattern = pattern.to_string_lossy();
            for entry in glob::glob(&pattern)
                .with_context(|| format!("Invalid vocabulary pattern {}", pattern))?
            {
                paths.push(entry.context("Failed to read vocabulary directory entry")?);
            }
        }
        paths.sort();

        for path in &paths {
            let vocabulary = Vocabulary::from_path(path)?;
            tracing::debug!(
                name = vocabulary.name(),
                entries = vocabulary.len(),
                "loaded vocabulary"
            );
            self.insert(vocabulary);
        }
        Ok(paths.len())
    }

    pub fn get(&self, name: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.vocabularies.keys().map(String::as_str).collect()
    }
}

impl VocabularyLookup for VocabularySet {
    fn lookup(&self, vocabulary: &str, value: &str) -> Result<bool, CollaboratorError> {
        self.get(vocabulary)
            .map(|v| v.contains(value))
            .ok_or_else(|| CollaboratorError::UnknownVocabulary(vocabulary.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

const ACCESS_RIGHT_NS: &str = "http://publications.europa.eu/resource/authority/access-right/";
const FILE_TYPE_NS: &str = "http://publications.europa.eu/resource/authority/file-type/";
const LICENCE_NS: &str = "http://publications.europa.eu/resource/authority/licence/";
const IANA_MEDIA_TYPES: &str = "http://www.iana.org/assignments/media-types/";

const ACCESS_RIGHTS: &[&str] = &["PUBLIC", "RESTRICTED", "NON_PUBLIC"];

const FILE_TYPES: &[&str] = &[
    "CSV", "DOCX", "GEOJSON", "GML", "HTML", "JSON", "JSON_LD", "KML", "KMZ", "N3", "N_TRIPLES",
    "ODS", "ODT", "PARQUET", "PDF", "RDF", "RDF_TURTLE", "RDF_XML", "SHP", "TSV", "TXT", "XLS",
    "XLSX", "XML", "ZIP",
];

const MACHINE_READABLE: &[&str] = &[
    "CSV", "GEOJSON", "GML", "JSON", "JSON_LD", "KML", "N3", "N_TRIPLES", "ODS", "PARQUET",
    "RDF", "RDF_TURTLE", "RDF_XML", "SHP", "TSV", "XLS", "XLSX", "XML",
];

const NON_PROPRIETARY: &[&str] = &[
    "CSV", "GEOJSON", "GML", "HTML", "JSON", "JSON_LD", "KML", "N3", "N_TRIPLES", "ODS", "ODT",
    "PARQUET", "PDF", "RDF", "RDF_TURTLE", "RDF_XML", "TSV", "TXT", "XML",
];

const MEDIA_TYPES: &[&str] = &[
    "application/geo+json",
    "application/json",
    "application/ld+json",
    "application/n-triples",
    "application/pdf",
    "application/rdf+xml",
    "application/vnd.ms-excel",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/xml",
    "application/zip",
    "text/csv",
    "text/html",
    "text/plain",
    "text/tab-separated-values",
    "text/turtle",
];

/// (authority code, SPDX-style code, canonical URL)
const LICENCES: &[(&str, &str, &str)] = &[
    ("CC0", "CC0-1.0", "https://creativecommons.org/publicdomain/zero/1.0/"),
    ("CC_BY_4_0", "CC-BY-4.0", "https://creativecommons.org/licenses/by/4.0/"),
    ("CC_BYSA_4_0", "CC-BY-SA-4.0", "https://creativecommons.org/licenses/by-sa/4.0/"),
    ("CC_BY_3_0", "CC-BY-3.0", "https://creativecommons.org/licenses/by/3.0/"),
    ("ODC_BY", "ODC-BY-1.0", "https://opendatacommons.org/licenses/by/1-0/"),
    ("ODC_ODBL", "ODbL-1.0", "https://opendatacommons.org/licenses/odbl/1-0/"),
    ("ODC_PDDL", "PDDL-1.0", "https://opendatacommons.org/licenses/pddl/1-0/"),
    (
        "OGL_3_0",
        "OGL-UK-3.0",
        "https://www.nationalarchives.gov.uk/doc/open-government-licence/version/3/",
    ),
];

fn authority_table(name: &str, ns: &str, codes: &[&str]) -> Vocabulary {
    let entries = codes
        .iter()
        .map(|code| VocabularyEntry {
            uri: Some(format!("{}{}", ns, code)),
            label: Some(code.replace('_', " ")),
            code: Some((*code).to_string()),
            ..Default::default()
        })
        .collect();
    Vocabulary::new(name, "uri_label", entries)
}

fn media_type_table() -> Vocabulary {
    let entries = MEDIA_TYPES
        .iter()
        .map(|mt| VocabularyEntry {
            uri: Some(format!("{}{}", IANA_MEDIA_TYPES, mt)),
            label: Some((*mt).to_string()),
            // Same registry, https scheme.
            equivalent_uri: Some(format!(
                "{}{}",
                IANA_MEDIA_TYPES.replacen("http:", "https:", 1),
                mt
            )),
            ..Default::default()
        })
        .collect();
    Vocabulary::new("media_types", "uri_label", entries)
}

fn license_table() -> Vocabulary {
    let entries = LICENCES
        .iter()
        .map(|(authority, code, url)| VocabularyEntry {
            uri: Some(format!("{}{}", LICENCE_NS, authority)),
            label: Some((*code).to_string()),
            code: Some((*code).to_string()),
            url: Some((*url).to_string()),
            equivalent_uri: None,
        })
        .collect();
    Vocabulary::new("licenses", "licenses", entries)
}
