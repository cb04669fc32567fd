//! Entity extraction: turns a graph into typed entity bindings.
//!
//! Membership comes from `rdf:type` against the four DCAT classes. Entities
//! and their values are kept in canonical order (entity term, predicate IRI,
//! value) so that the result does not depend on how the input was
//! serialized. Blank-node objects are flattened one level deep into a text
//! value; a blank node with nothing usable stays opaque.

use std::collections::BTreeMap;

use crate::graph::{Graph, GraphIndex, Term};
use crate::metric::{EntityType, PropertyPath};
use crate::namespaces::{dct, foaf, rdf, rdfs, skos};

/// Predicates consulted, in order, when flattening a blank-node value.
const FLATTEN_PREDICATES: [&str; 6] = [
    rdf::VALUE,
    rdfs::LABEL,
    skos::PREF_LABEL,
    dct::TITLE,
    foaf::NAME,
    dct::IDENTIFIER,
];

/// One property value handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoundValue {
    Iri(String),
    Literal {
        lexical: String,
        language: Option<String>,
        datatype: Option<String>,
    },
    /// A blank node flattened to the text of one of its describing properties.
    Resolved { node: String, text: String },
    /// A blank node with no flattenable property. Present, never matches.
    Opaque(String),
}

impl BoundValue {
    /// Convert an object term, flattening blank nodes through `index`.
    pub fn from_term(term: &Term, index: &GraphIndex) -> Self {
        match term {
            Term::Iri(iri) => BoundValue::Iri(iri.clone()),
            Term::Literal(lit) => BoundValue::Literal {
                lexical: lit.lexical.clone(),
                language: lit.language.clone(),
                datatype: lit.datatype.clone(),
            },
            Term::BlankNode(_) => match flatten(term, index) {
                Some(text) => BoundValue::Resolved {
                    node: term.key(),
                    text,
                },
                None => BoundValue::Opaque(term.key()),
            },
        }
    }

    /// Text used for vocabulary matching and URL checks. Opaque values have none.
    pub fn match_text(&self) -> Option<&str> {
        match self {
            BoundValue::Iri(iri) => Some(iri),
            BoundValue::Literal { lexical, .. } => Some(lexical),
            BoundValue::Resolved { text, .. } => Some(text),
            BoundValue::Opaque(_) => None,
        }
    }

    /// Whether the value counts for presence. Blank literals do not.
    pub fn is_present(&self) -> bool {
        match self {
            BoundValue::Literal { lexical, .. } => !lexical.trim().is_empty(),
            BoundValue::Resolved { .. } | BoundValue::Opaque(_) => true,
            BoundValue::Iri(iri) => !iri.is_empty(),
        }
    }
}

fn flatten(node: &Term, index: &GraphIndex) -> Option<String> {
    FLATTEN_PREDICATES.iter().find_map(|predicate| {
        index
            .objects(node, predicate)
            .iter()
            .find_map(|object| match object {
                Term::Iri(iri) => Some(iri.clone()),
                Term::Literal(lit) if !lit.lexical.trim().is_empty() => Some(lit.lexical.clone()),
                _ => None,
            })
    })
}

/// A resource of a recognized type with its direct property values.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBinding {
    /// IRI, or `_:id` for blank-node entities.
    pub entity_id: String,
    pub entity_type: EntityType,
    pub term: Term,
    pub properties: BTreeMap<String, Vec<BoundValue>>,
}

impl EntityBinding {
    pub fn values(&self, predicate: &str) -> &[BoundValue] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Entities grouped by type, plus the index used to follow longer paths.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    entities: BTreeMap<EntityType, Vec<EntityBinding>>,
    index: GraphIndex,
}

impl Extraction {
    pub fn from_graph(graph: &Graph) -> Self {
        Self::from_index(graph.index())
    }

    pub fn from_index(index: GraphIndex) -> Self {
        let mut entities = BTreeMap::new();

        for entity_type in EntityType::EXTRACTED {
            let Some(class) = entity_type.class_iri() else {
                continue;
            };
            // instances_of is already in canonical subject order.
            let bindings: Vec<EntityBinding> = index
                .instances_of(class)
                .into_iter()
                .map(|term| bind(term, entity_type, &index))
                .collect();
            entities.insert(entity_type, bindings);
        }

        Self { entities, index }
    }

    /// Entities of one concrete type. `Multi` has no entities of its own.
    pub fn entities(&self, entity_type: EntityType) -> &[EntityBinding] {
        self.entities
            .get(&entity_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, entity_type: EntityType) -> usize {
        self.entities(entity_type).len()
    }

    /// Entity counts for every extracted type, including zeros.
    pub fn counts(&self) -> BTreeMap<EntityType, usize> {
        EntityType::EXTRACTED
            .iter()
            .map(|t| (*t, self.count(*t)))
            .collect()
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    /// Values reached from an entity by a property path, sorted and unique.
    ///
    /// Intermediate steps follow IRI and blank-node objects; literals end a
    /// branch.
    pub fn resolve(&self, binding: &EntityBinding, path: &PropertyPath) -> Vec<BoundValue> {
        let steps = path.steps();
        let Some((last, intermediate)) = steps.split_last() else {
            return Vec::new();
        };

        if intermediate.is_empty() {
            return binding.values(last).to_vec();
        }

        let mut frontier: Vec<&Term> = vec![&binding.term];
        for step in intermediate {
            let mut next: Vec<&Term> = frontier
                .iter()
                .flat_map(|node| self.index.objects(node, step))
                .filter(|term| !matches!(term, Term::Literal(_)))
                .collect();
            next.sort();
            next.dedup();
            frontier = next;
        }

        let mut values: Vec<BoundValue> = frontier
            .iter()
            .flat_map(|node| self.index.objects(node, last))
            .map(|object| BoundValue::from_term(object, &self.index))
            .collect();
        values.sort();
        values.dedup();
        values
    }
}

fn bind(term: &Term, entity_type: EntityType, index: &GraphIndex) -> EntityBinding {
    let properties = index
        .properties(term)
        .map(|predicates| {
            predicates
                .iter()
                .map(|(predicate, objects)| {
                    let mut values: Vec<BoundValue> = objects
                        .iter()
                        .map(|object| BoundValue::from_term(object, index))
                        .collect();
                    values.sort();
                    values.dedup();
                    (predicate.clone(), values)
                })
                .collect()
        })
        .unwrap_or_default();

    EntityBinding {
        entity_id: term.key(),
        entity_type,
        term: term.clone(),
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Triple;
    use crate::namespaces::dcat;

    fn iri(s: &str) -> Term {
        Term::iri(s)
    }

    fn catalog_graph(reverse: bool) -> Graph {
        let mut triples = vec![
            Triple::new(iri("http://ex.org/ds"), rdf::TYPE, iri(dcat::DATASET)),
            Triple::new(iri("http://ex.org/ds"), dcat::DISTRIBUTION_PROP, iri("http://ex.org/d1")),
            Triple::new(iri("http://ex.org/ds"), dct::TITLE, Term::literal("b")),
            Triple::new(iri("http://ex.org/ds"), dct::TITLE, Term::literal("a")),
            Triple::new(iri("http://ex.org/d1"), rdf::TYPE, iri(dcat::DISTRIBUTION)),
            Triple::new(iri("http://ex.org/d1"), dct::FORMAT, Term::bnode("f")),
            Triple::new(Term::bnode("f"), rdfs::LABEL, Term::literal("CSV")),
            Triple::new(iri("http://ex.org/d1"), dct::LICENSE, Term::bnode("empty")),
            Triple::new(iri("http://ex.org/svc"), rdf::TYPE, iri(dcat::DATA_SERVICE)),
            Triple::new(iri("http://ex.org/svc"), rdf::TYPE, iri(dcat::DATASET)),
        ];
        if reverse {
            triples.reverse();
        }
        triples.into_iter().collect()
    }

    #[test]
    fn test_entities_grouped_by_type() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        assert_eq!(extraction.count(EntityType::Dataset), 2);
        assert_eq!(extraction.count(EntityType::Distribution), 1);
        assert_eq!(extraction.count(EntityType::DataService), 1);
        assert_eq!(extraction.count(EntityType::Catalog), 0);
        assert!(extraction.entities(EntityType::Multi).is_empty());
    }

    #[test]
    fn test_multi_typed_entity_appears_under_each_type() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        let datasets: Vec<&str> = extraction
            .entities(EntityType::Dataset)
            .iter()
            .map(|b| b.entity_id.as_str())
            .collect();
        assert_eq!(datasets, vec!["http://ex.org/ds", "http://ex.org/svc"]);
        assert_eq!(
            extraction.entities(EntityType::DataService)[0].entity_id,
            "http://ex.org/svc"
        );
    }

    #[test]
    fn test_values_canonically_ordered() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        let ds = &extraction.entities(EntityType::Dataset)[0];
        let titles: Vec<_> = ds.values(dct::TITLE).iter().filter_map(|v| v.match_text()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_independent_of_input_order() {
        let forward = Extraction::from_graph(&catalog_graph(false));
        let backward = Extraction::from_graph(&catalog_graph(true));
        for t in EntityType::EXTRACTED {
            assert_eq!(forward.entities(t), backward.entities(t));
        }
    }

    #[test]
    fn test_blank_node_flattened_one_level() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        let dist = &extraction.entities(EntityType::Distribution)[0];
        assert_eq!(
            dist.values(dct::FORMAT),
            &[BoundValue::Resolved {
                node: "_:f".to_string(),
                text: "CSV".to_string()
            }]
        );
    }

    #[test]
    fn test_unresolved_blank_node_is_opaque() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        let dist = &extraction.entities(EntityType::Distribution)[0];
        let license = &dist.values(dct::LICENSE)[0];
        assert_eq!(license, &BoundValue::Opaque("_:empty".to_string()));
        assert!(license.is_present());
        assert_eq!(license.match_text(), None);
    }

    #[test]
    fn test_flatten_prefers_rdf_value() {
        let graph: Graph = vec![
            Triple::new(Term::bnode("x"), rdfs::LABEL, Term::literal("label")),
            Triple::new(Term::bnode("x"), rdf::VALUE, Term::literal("value")),
        ]
        .into_iter()
        .collect();
        let index = graph.index();
        let value = BoundValue::from_term(&Term::bnode("x"), &index);
        assert_eq!(value.match_text(), Some("value"));
    }

    #[test]
    fn test_blank_literal_is_not_present() {
        let value = BoundValue::Literal {
            lexical: "  ".to_string(),
            language: None,
            datatype: None,
        };
        assert!(!value.is_present());
    }

    #[test]
    fn test_resolve_sequence_path() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        let ds = &extraction.entities(EntityType::Dataset)[0];
        let path = PropertyPath::parse("dcat:distribution/dct:format").unwrap();
        let values = extraction.resolve(ds, &path);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].match_text(), Some("CSV"));
    }

    #[test]
    fn test_resolve_single_step_uses_binding() {
        let extraction = Extraction::from_graph(&catalog_graph(false));
        let ds = &extraction.entities(EntityType::Dataset)[1];
        let path = PropertyPath::parse("dct:title").unwrap();
        assert!(extraction.resolve(ds, &path).is_empty());
    }
}
