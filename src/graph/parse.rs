//! Decoding serialized RDF into a [`Graph`].
//!
//! Turtle and N-Triples go through `sophia_turtle`; a JSON array of
//! [`Triple`] values is accepted for callers that already hold decoded
//! triples.

use anyhow::{Context, Result};
use sophia_api::source::TripleSource;
use sophia_api::term::{Term as RdfTerm, TermKind};
use sophia_api::triple::Triple as RdfTriple;
use sophia_turtle::parser::{nt, turtle};
use std::fs;
use std::path::Path;

use super::{Graph, Literal, Term, Triple};
use crate::error::AssessmentError;

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// Serialization of an RDF input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphFormat {
    Turtle,
    #[value(name = "ntriples")]
    NTriples,
    #[value(name = "json")]
    JsonTriples,
}

impl GraphFormat {
    /// Guess the format from a file extension. Unknown extensions are read as Turtle,
    /// which also accepts N-Triples content.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("nt") => GraphFormat::NTriples,
            Some("json") => GraphFormat::JsonTriples,
            _ => GraphFormat::Turtle,
        }
    }
}

/// Parse serialized RDF. Any syntax error fails the whole input.
pub fn parse_graph(content: &str, format: GraphFormat) -> Result<Graph, AssessmentError> {
    match format {
        GraphFormat::Turtle => {
            let mut triples = Vec::new();
            turtle::parse_str(content)
                .for_each_triple(|t| {
                    if let Some(triple) = convert_triple(&t) {
                        triples.push(triple);
                    }
                })
                .map_err(|e| AssessmentError::InvalidInput(format!("Turtle syntax error: {}", e)))?;
            Ok(Graph::new(triples))
        }
        GraphFormat::NTriples => {
            let mut triples = Vec::new();
            nt::parse_str(content)
                .for_each_triple(|t| {
                    if let Some(triple) = convert_triple(&t) {
                        triples.push(triple);
                    }
                })
                .map_err(|e| {
                    AssessmentError::InvalidInput(format!("N-Triples syntax error: {}", e))
                })?;
            Ok(Graph::new(triples))
        }
        GraphFormat::JsonTriples => serde_json::from_str(content)
            .map_err(|e| AssessmentError::InvalidInput(format!("Invalid JSON triples: {}", e))),
    }
}

/// Read and parse an RDF file. Without an explicit `format` it is picked
/// from the file extension.
pub fn load_graph(path: &Path, format: Option<GraphFormat>) -> Result<Graph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read RDF input from {}", path.display()))?;
    let format = format.unwrap_or_else(|| GraphFormat::from_path(path));
    let graph = parse_graph(&content, format)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?format, triples = graph.len(), "loaded graph");
    Ok(graph)
}

fn convert_triple<T: RdfTriple>(t: &T) -> Option<Triple> {
    let subject = convert_term(t.s())?;
    let predicate = match convert_term(t.p())? {
        Term::Iri(iri) => iri,
        _ => return None,
    };
    let object = convert_term(t.o())?;
    Some(Triple::new(subject, predicate, object))
}

fn convert_term<T: RdfTerm>(term: T) -> Option<Term> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Term::Iri(iri.as_str().to_string())),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Term::BlankNode(id.as_str().to_string())),
        TermKind::Literal => {
            let lexical = term.lexical_form()?.to_string();
            let language = term.language_tag().map(|tag| tag.as_str().to_string());
            let datatype = term
                .datatype()
                .map(|dt| dt.as_str().to_string())
                .filter(|dt| dt != XSD_STRING && dt != RDF_LANG_STRING);
            Some(Term::Literal(Literal {
                lexical,
                datatype,
                language,
            }))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::{dcat, dct, rdf};

    const TTL: &str = r#"
@prefix dcat: <http://www.w3.org/ns/dcat#> .
@prefix dct: <http://purl.org/dc/terms/> .

<http://ex.org/ds1> a dcat:Dataset ;
    dct:title "Budget"@en ;
    dct:format [ <http://www.w3.org/1999/02/22-rdf-syntax-ns#value> "CSV" ] .
"#;

    #[test]
    fn test_parse_turtle() {
        let graph = parse_graph(TTL, GraphFormat::Turtle).unwrap();
        assert_eq!(graph.len(), 4);
        let index = graph.index();
        assert_eq!(index.instances_of(dcat::DATASET).len(), 1);

        let titles = index.objects(&Term::iri("http://ex.org/ds1"), dct::TITLE);
        match &titles[0] {
            Term::Literal(lit) => {
                assert_eq!(lit.lexical, "Budget");
                assert_eq!(lit.language.as_deref(), Some("en"));
                assert_eq!(lit.datatype, None);
            }
            other => panic!("expected literal, got {:?}", other),
        }

        let format_property = format!("{}format", dct::NS);
        let formats = index.objects(&Term::iri("http://ex.org/ds1"), &format_property);
        assert!(formats[0].is_blank());
    }

    #[test]
    fn test_parse_ntriples() {
        let nt = format!(
            "<http://ex.org/d> <{}> <{}> .\n",
            rdf::TYPE,
            dcat::DISTRIBUTION
        );
        let graph = parse_graph(&nt, GraphFormat::NTriples).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_invalid_input() {
        let err =
            parse_graph("<http://ex.org/a> <http://p> .", GraphFormat::Turtle).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_json_triples() {
        let json = r#"[{"subject":{"type":"iri","value":"http://ex.org/a"},
                        "predicate":"http://purl.org/dc/terms/title",
                        "object":{"type":"literal","value":{"lexical":"A"}}}]"#;
        let graph = parse_graph(json, GraphFormat::JsonTriples).unwrap();
        assert_eq!(graph.triples()[0].object, Term::literal("A"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(GraphFormat::from_path(Path::new("a.nt")), GraphFormat::NTriples);
        assert_eq!(GraphFormat::from_path(Path::new("a.TTL")), GraphFormat::Turtle);
        assert_eq!(GraphFormat::from_path(Path::new("a.json")), GraphFormat::JsonTriples);
        assert_eq!(GraphFormat::from_path(Path::new("a.rdf")), GraphFormat::Turtle);
    }

    #[test]
    fn test_load_graph_format_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("catalog.txt");
        let nt = format!("<http://ex.org/d> <{}> <{}> .\n", rdf::TYPE, dcat::DISTRIBUTION);
        fs::write(&path, nt).unwrap();

        let graph = load_graph(&path, Some(GraphFormat::NTriples)).unwrap();
        assert_eq!(graph.len(), 1);
        // Unknown extensions fall back to Turtle, which reads N-Triples too.
        assert_eq!(load_graph(&path, None).unwrap().len(), 1);
    }

    #[test]
    fn test_load_graph_errors_name_the_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("missing.ttl");
        let err = load_graph(&missing, None).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.ttl"));

        let broken = tmp.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        let err = load_graph(&broken, None).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
        assert!(err.downcast_ref::<AssessmentError>().is_some());
    }
}
