use oxrdf::{Literal, NamedNode, Triple};
use uuid::Uuid;

use crate::error::SkosError;
use crate::graph::{vocab, SkosGraph};
use crate::types::{Concept, ConceptKind, ConceptSchemeConfig, LITERAL_LANGUAGE};

/// Source of fresh concept identifiers.
pub trait UriAllocator {
    fn new_uri(&mut self, namespace: &str) -> Result<NamedNode, SkosError>;
}

/// Allocates `namespace + <random v4 UUID>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl UriAllocator for UuidAllocator {
    fn new_uri(&mut self, namespace: &str) -> Result<NamedNode, SkosError> {
        namespaced_uri(namespace, &Uuid::new_v4().to_string())
    }
}

pub fn namespaced_uri(namespace: &str, local: &str) -> Result<NamedNode, SkosError> {
    let iri = format!("{}{}", namespace, local);
    NamedNode::new(&iri).map_err(|e| SkosError::InvalidIri(format!("{}: {}", iri, e)))
}

fn french(value: &str) -> Literal {
    Literal::new_language_tagged_literal_unchecked(value, LITERAL_LANGUAGE)
}

/// Everything needed to mint one concept.
#[derive(Debug, Clone)]
pub struct ConceptDraft<'a> {
    pub kind: ConceptKind,
    pub label: &'a str,
    pub definition: &'a str,
    pub notes: &'a str,
    pub is_top_concept: bool,
    pub narrower_of: Option<&'a NamedNode>,
}

/// Assert the scheme's type, label and definition.
pub fn define_scheme(scheme: &ConceptSchemeConfig, graph: &mut SkosGraph) {
    let uri = &scheme.scheme_uri;
    graph.insert(Triple::new(
        uri.clone(),
        vocab::RDF_TYPE.into_owned(),
        vocab::CONCEPT_SCHEME.into_owned(),
    ));
    graph.insert(Triple::new(
        uri.clone(),
        vocab::PREF_LABEL.into_owned(),
        french(&scheme.label),
    ));
    graph.insert(Triple::new(
        uri.clone(),
        vocab::DEFINITION.into_owned(),
        french(&scheme.description),
    ));
}

/// Mint a concept, assert its triples and link it into the scheme.
///
/// Label and definition are asserted even when empty.
pub fn create_concept(
    draft: ConceptDraft<'_>,
    graph: &mut SkosGraph,
    scheme: &ConceptSchemeConfig,
    allocator: &mut dyn UriAllocator,
) -> Result<NamedNode, SkosError> {
    let uri = allocator.new_uri(&scheme.namespace)?;

    graph.insert(Triple::new(
        uri.clone(),
        vocab::RDF_TYPE.into_owned(),
        vocab::CONCEPT.into_owned(),
    ));
    graph.insert(Triple::new(
        uri.clone(),
        vocab::IN_SCHEME.into_owned(),
        scheme.scheme_uri.clone(),
    ));
    graph.insert(Triple::new(
        uri.clone(),
        vocab::PREF_LABEL.into_owned(),
        french(draft.label),
    ));
    graph.insert(Triple::new(
        uri.clone(),
        vocab::DEFINITION.into_owned(),
        french(draft.definition),
    ));

    if !draft.notes.is_empty() {
        graph.insert(Triple::new(
            uri.clone(),
            vocab::NOTE.into_owned(),
            french(draft.notes),
        ));
    }

    if draft.is_top_concept {
        graph.insert(Triple::new(
            scheme.scheme_uri.clone(),
            vocab::HAS_TOP_CONCEPT.into_owned(),
            uri.clone(),
        ));
    }

    if let Some(parent) = draft.narrower_of {
        graph.insert(Triple::new(
            parent.clone(),
            vocab::NARROWER.into_owned(),
            uri.clone(),
        ));
    }

    tracing::debug!(
        "Created {:?} concept {} ({:?})",
        draft.kind,
        uri,
        draft.label
    );

    graph.record_concept(Concept {
        uri: uri.clone(),
        kind: draft.kind,
        label: draft.label.to_string(),
        definition: draft.definition.to_string(),
        note: (!draft.notes.is_empty()).then(|| draft.notes.to_string()),
        is_top_concept: draft.is_top_concept,
        parent: draft.narrower_of.cloned(),
    });

    Ok(uri)
}
