//! In-memory RDF graph model.
//!
//! The graph is an ordered sequence of triples with blank-node identity
//! preserved. [`GraphIndex`] gives subject/predicate lookups in canonical
//! order (term, then predicate IRI, then lexical value) so downstream
//! evaluation does not depend on serialization order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::namespaces::rdf;

pub mod parse;

pub use parse::{load_graph, parse_graph, GraphFormat};

/// An RDF literal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }
}

/// An RDF term in subject or object position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Term {
    Iri(String),
    #[serde(rename = "bnode")]
    BlankNode(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn bnode(id: impl Into<String>) -> Self {
        Term::BlankNode(id.into())
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(lexical))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Identifier used in reports: the IRI, `_:id` for blank nodes, or the
    /// lexical form for literals.
    pub fn key(&self) -> String {
        match self {
            Term::Iri(iri) => iri.clone(),
            Term::BlankNode(id) => format!("_:{}", id),
            Term::Literal(lit) => lit.lexical.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(id) => write!(f, "_:{}", id),
            Term::Literal(lit) => match (&lit.language, &lit.datatype) {
                (Some(lang), _) => write!(f, "\"{}\"@{}", lit.lexical, lang),
                (None, Some(dt)) => write!(f, "\"{}\"^^<{}>", lit.lexical, dt),
                (None, None) => write!(f, "\"{}\"", lit.lexical),
            },
        }
    }
}

/// A subject–predicate–object statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// An ordered sequence of triples, as decoded from a serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    pub fn new(triples: Vec<Triple>) -> Self {
        Self { triples }
    }

    pub fn push(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Build the canonical lookup index for this graph.
    pub fn index(&self) -> GraphIndex {
        GraphIndex::build(self)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Subject → predicate → objects lookup with sorted, de-duplicated objects.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    subjects: BTreeMap<Term, BTreeMap<String, Vec<Term>>>,
}

impl GraphIndex {
    pub fn build(graph: &Graph) -> Self {
        let mut subjects: BTreeMap<Term, BTreeMap<String, Vec<Term>>> = BTreeMap::new();
        for triple in graph.triples() {
            subjects
                .entry(triple.subject.clone())
                .or_default()
                .entry(triple.predicate.clone())
                .or_default()
                .push(triple.object.clone());
        }

        // RDF graphs are sets: sort and drop repeated statements.
        for predicates in subjects.values_mut() {
            for objects in predicates.values_mut() {
                objects.sort();
                objects.dedup();
            }
        }

        Self { subjects }
    }

    /// All predicates and objects of a subject, in canonical order.
    pub fn properties(&self, subject: &Term) -> Option<&BTreeMap<String, Vec<Term>>> {
        self.subjects.get(subject)
    }

    /// Objects for `subject predicate ?o`, in canonical order.
    pub fn objects(&self, subject: &Term, predicate: &str) -> &[Term] {
        self.subjects
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Subjects declaring `rdf:type <class>`, in canonical order.
    pub fn instances_of(&self, class: &str) -> Vec<&Term> {
        let class = Term::Iri(class.to_string());
        self.subjects
            .iter()
            .filter(|(_, preds)| {
                preds
                    .get(rdf::TYPE)
                    .is_some_and(|types| types.binary_search(&class).is_ok())
            })
            .map(|(subject, _)| subject)
            .collect()
    }
}
