//! IRI constants for the vocabularies the assessment reads, plus CURIE expansion.

/// RDF syntax vocabulary.
pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const VALUE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#value";
}

/// RDF Schema.
pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// Data Catalog Vocabulary.
pub mod dcat {
    pub const NS: &str = "http://www.w3.org/ns/dcat#";
    pub const CATALOG: &str = "http://www.w3.org/ns/dcat#Catalog";
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const DISTRIBUTION: &str = "http://www.w3.org/ns/dcat#Distribution";
    pub const DATA_SERVICE: &str = "http://www.w3.org/ns/dcat#DataService";
    pub const DISTRIBUTION_PROP: &str = "http://www.w3.org/ns/dcat#distribution";
    pub const ACCESS_URL: &str = "http://www.w3.org/ns/dcat#accessURL";
    pub const DOWNLOAD_URL: &str = "http://www.w3.org/ns/dcat#downloadURL";
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
}

/// Dublin Core terms.
pub mod dct {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
    pub const ISSUED: &str = "http://purl.org/dc/terms/issued";
}

pub mod foaf {
    pub const NS: &str = "http://xmlns.com/foaf/0.1/";
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}

pub mod skos {
    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";
    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
}

pub mod vcard {
    pub const NS: &str = "http://www.w3.org/2006/vcard/ns#";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
}

/// SHACL, used when reading validation reports expressed as RDF.
pub mod sh {
    pub const NS: &str = "http://www.w3.org/ns/shacl#";
    pub const VALIDATION_REPORT: &str = "http://www.w3.org/ns/shacl#ValidationReport";
    pub const VALIDATION_RESULT: &str = "http://www.w3.org/ns/shacl#ValidationResult";
    pub const CONFORMS: &str = "http://www.w3.org/ns/shacl#conforms";
    pub const RESULT: &str = "http://www.w3.org/ns/shacl#result";
    pub const FOCUS_NODE: &str = "http://www.w3.org/ns/shacl#focusNode";
    pub const RESULT_PATH: &str = "http://www.w3.org/ns/shacl#resultPath";
    pub const VALUE: &str = "http://www.w3.org/ns/shacl#value";
    pub const RESULT_MESSAGE: &str = "http://www.w3.org/ns/shacl#resultMessage";
    pub const RESULT_SEVERITY: &str = "http://www.w3.org/ns/shacl#resultSeverity";
    pub const SOURCE_CONSTRAINT_COMPONENT: &str =
        "http://www.w3.org/ns/shacl#sourceConstraintComponent";
    pub const SOURCE_SHAPE: &str = "http://www.w3.org/ns/shacl#sourceShape";
    pub const VIOLATION: &str = "http://www.w3.org/ns/shacl#Violation";
    pub const WARNING: &str = "http://www.w3.org/ns/shacl#Warning";
    pub const INFO: &str = "http://www.w3.org/ns/shacl#Info";
}

/// Prefixes recognised in metric property paths.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", rdf::NS),
    ("rdfs", rdfs::NS),
    ("dcat", dcat::NS),
    ("dct", dct::NS),
    ("dcterms", dct::NS),
    ("foaf", foaf::NS),
    ("skos", skos::NS),
    ("vcard", vcard::NS),
    ("xsd", xsd::NS),
    ("sh", sh::NS),
    ("adms", "http://www.w3.org/ns/adms#"),
    ("spdx", "http://spdx.org/rdf/terms#"),
    ("odrl", "http://www.w3.org/ns/odrl/2/"),
    ("schema", "http://schema.org/"),
    ("locn", "http://www.w3.org/ns/locn#"),
    ("prov", "http://www.w3.org/ns/prov#"),
];

/// Expand a `prefix:local` CURIE against [`PREFIXES`].
///
/// Returns `None` when the prefix is unknown or the input has no colon.
pub fn expand_curie(curie: &str) -> Option<String> {
    let (prefix, local) = curie.split_once(':')?;
    PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| format!("{}{}", ns, local))
}

/// Compact an IRI to a CURIE when a known prefix matches, for display.
pub fn compact_iri(iri: &str) -> String {
    // dct and dcterms share a namespace; the first entry wins.
    for (prefix, ns) in PREFIXES {
        if let Some(local) = iri.strip_prefix(ns) {
            if !local.is_empty() {
                return format!("{}:{}", prefix, local);
            }
        }
    }
    iri.to_string()
}
