mod builder;

pub use builder::{BuildResult, GraphBuilder, MainConceptRegistry};

use oxrdf::{NamedNode, NamedNodeRef, Subject, Term, Triple};
use std::collections::HashSet;

use crate::types::{Concept, ConceptKind};

pub mod vocab {
    use oxrdf::NamedNodeRef;

    pub const RDF_TYPE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    pub const CONCEPT_SCHEME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#ConceptScheme");
    pub const CONCEPT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#Concept");
    pub const PREF_LABEL: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#prefLabel");
    pub const DEFINITION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#definition");
    pub const NOTE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#note");
    pub const IN_SCHEME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#inScheme");
    pub const HAS_TOP_CONCEPT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#hasTopConcept");
    pub const NARROWER: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#narrower");
}

/// An insertion-ordered set of triples, plus the concepts created for it.
#[derive(Debug, Clone, Default)]
pub struct SkosGraph {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    concepts: Vec<Concept>,
}

impl SkosGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from already-asserted triples, e.g. a re-parsed file.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut graph = Self::new();
        for triple in triples {
            graph.insert(triple);
        }
        graph
    }

    /// Add a triple; returns false when it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub(crate) fn record_concept(&mut self, concept: Concept) {
        self.concepts.push(concept);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Concepts created by this run, in creation order.
    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn concepts_of_kind(&self, kind: ConceptKind) -> impl Iterator<Item = &Concept> {
        self.concepts.iter().filter(move |c| c.kind == kind)
    }

    fn objects_of<'a, 'b>(
        &'a self,
        subject: &'b NamedNode,
        predicate: NamedNodeRef<'static>,
    ) -> impl Iterator<Item = &'a Term> + 'b
    where
        'a: 'b,
    {
        self.triples.iter().filter_map(move |t| match &t.subject {
            Subject::NamedNode(s) if s == subject && t.predicate.as_ref() == predicate => {
                Some(&t.object)
            }
            _ => None,
        })
    }

    /// Subjects typed with the given class.
    pub fn instances_of(&self, class: NamedNodeRef<'static>) -> Vec<&NamedNode> {
        self.triples
            .iter()
            .filter(|t| {
                t.predicate.as_ref() == vocab::RDF_TYPE
                    && matches!(&t.object, Term::NamedNode(o) if o.as_ref() == class)
            })
            .filter_map(|t| match &t.subject {
                Subject::NamedNode(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn top_concepts(&self, scheme: &NamedNode) -> Vec<&NamedNode> {
        self.objects_of(scheme, vocab::HAS_TOP_CONCEPT)
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn narrower_of(&self, parent: &NamedNode) -> Vec<&NamedNode> {
        self.objects_of(parent, vocab::NARROWER)
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn narrower_link_count(&self) -> usize {
        self.triples
            .iter()
            .filter(|t| t.predicate.as_ref() == vocab::NARROWER)
            .count()
    }

    pub fn label_of(&self, subject: &NamedNode) -> Option<&str> {
        self.objects_of(subject, vocab::PREF_LABEL)
            .find_map(|o| match o {
                Term::Literal(l) => Some(l.value()),
                _ => None,
            })
    }

    /// The first subject typed as a concept scheme.
    pub fn scheme(&self) -> Option<&NamedNode> {
        self.instances_of(vocab::CONCEPT_SCHEME).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::Literal;

    fn node(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    #[test]
    fn test_insert_is_set_like() {
        let mut graph = SkosGraph::new();
        let triple = Triple::new(
            node("http://example.org/a"),
            vocab::RDF_TYPE.into_owned(),
            vocab::CONCEPT.into_owned(),
        );
        assert!(graph.insert(triple.clone()));
        assert!(!graph.insert(triple));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_queries() {
        let scheme = node("http://example.org/scheme");
        let parent = node("http://example.org/parent");
        let child = node("http://example.org/child");
        let graph = SkosGraph::from_triples(vec![
            Triple::new(
                scheme.clone(),
                vocab::RDF_TYPE.into_owned(),
                vocab::CONCEPT_SCHEME.into_owned(),
            ),
            Triple::new(
                scheme.clone(),
                vocab::HAS_TOP_CONCEPT.into_owned(),
                parent.clone(),
            ),
            Triple::new(parent.clone(), vocab::NARROWER.into_owned(), child.clone()),
            Triple::new(
                child.clone(),
                vocab::PREF_LABEL.into_owned(),
                Literal::new_language_tagged_literal_unchecked("Enfant", "fr"),
            ),
        ]);

        assert_eq!(graph.scheme(), Some(&scheme));
        assert_eq!(graph.top_concepts(&scheme), vec![&parent]);
        assert_eq!(graph.narrower_of(&parent), vec![&child]);
        assert_eq!(graph.narrower_link_count(), 1);
        assert_eq!(graph.label_of(&child), Some("Enfant"));
        assert_eq!(graph.label_of(&parent), None);
    }
}
