use oxrdf::NamedNode;
use std::collections::HashMap;

use super::SkosGraph;
use crate::columns::clean;
use crate::concept::{create_concept, define_scheme, ConceptDraft, UriAllocator, UuidAllocator};
use crate::error::{ProcessingOutcome, ProcessingState, SkosError};
use crate::table::{Row, Table};
use crate::types::{ConceptKind, ConceptSchemeConfig, FieldMapping, Hierarchy, RowMapping};

/// Main concepts already created in grouped mode, keyed by cleaned label.
#[derive(Debug, Clone, Default)]
pub struct MainConceptRegistry {
    concepts: HashMap<String, NamedNode>,
    hits: usize,
}

impl MainConceptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a label up, counting the hit when it is already registered.
    pub fn lookup(&mut self, label: &str) -> Option<NamedNode> {
        let found = self.concepts.get(label).cloned();
        if found.is_some() {
            self.hits += 1;
        }
        found
    }

    pub fn register(&mut self, label: String, uri: NamedNode) {
        self.concepts.insert(label, uri);
    }

    pub fn get(&self, label: &str) -> Option<&NamedNode> {
        self.concepts.get(label)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// The concepts one data row was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLinks {
    pub row: usize,
    pub main: NamedNode,
    pub main_reused: bool,
    pub narrower: Option<NamedNode>,
    pub item: Option<NamedNode>,
}

#[derive(Debug)]
pub struct BuildResult {
    pub graph: SkosGraph,
    pub registry: MainConceptRegistry,
    pub rows: Vec<RowLinks>,
    pub outcome: ProcessingOutcome,
}

/// Cleaned values of one concept's fields for one row.
struct CleanedFields {
    label: String,
    definition: String,
    notes: String,
}

impl CleanedFields {
    fn from_row(mapping: &FieldMapping, row: &Row) -> Result<Self, SkosError> {
        Ok(Self {
            label: clean(mapping.pref_label.as_ref(), row)?,
            definition: clean(mapping.definition.as_ref(), row)?,
            notes: clean(mapping.notes.as_ref(), row)?,
        })
    }

    fn is_blank(&self) -> bool {
        self.label.is_empty() && self.definition.is_empty() && self.notes.is_empty()
    }
}

pub struct GraphBuilder<'a> {
    scheme: &'a ConceptSchemeConfig,
    mapping: &'a RowMapping,
    allocator: Box<dyn UriAllocator + 'a>,
    graph: SkosGraph,
    state: ProcessingState,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(scheme: &'a ConceptSchemeConfig, mapping: &'a RowMapping) -> Self {
        Self {
            scheme,
            mapping,
            allocator: Box::new(UuidAllocator),
            graph: SkosGraph::new(),
            state: ProcessingState::new(),
        }
    }

    pub fn with_allocator(mut self, allocator: Box<dyn UriAllocator + 'a>) -> Self {
        self.allocator = allocator;
        self
    }

    /// Assert the scheme, then every concept the rows call for.
    pub fn build(mut self, hierarchy: &Hierarchy, table: &Table) -> Result<BuildResult, SkosError> {
        tracing::info!(
            "Building SKOS graph from {} rows ({} mode)",
            table.len(),
            if hierarchy.is_grouped() {
                "grouped"
            } else {
                "flat"
            }
        );
        define_scheme(self.scheme, &mut self.graph);

        let (registry, rows) = match hierarchy {
            Hierarchy::Flat { main, narrower } => {
                let main_uri = self.concept(ConceptDraft {
                    kind: ConceptKind::Main,
                    label: &main.name,
                    definition: &main.definition,
                    notes: "",
                    is_top_concept: true,
                    narrower_of: None,
                })?;
                let narrower_uri = match narrower {
                    Some(narrower) => Some(self.concept(ConceptDraft {
                        kind: ConceptKind::Narrower,
                        label: &narrower.name,
                        definition: &narrower.definition,
                        notes: "",
                        is_top_concept: false,
                        narrower_of: Some(&main_uri),
                    })?),
                    None => None,
                };
                let rows = self.build_flat(table, main_uri, narrower_uri)?;
                (MainConceptRegistry::new(), rows)
            }
            Hierarchy::Grouped => self.build_grouped(table)?,
        };

        tracing::info!(
            "Graph built: {} triples, {} concepts",
            self.graph.len(),
            self.graph.concepts().len()
        );

        Ok(BuildResult {
            graph: self.graph,
            registry,
            rows,
            outcome: ProcessingOutcome::from_state(self.state),
        })
    }

    fn concept(&mut self, draft: ConceptDraft<'_>) -> Result<NamedNode, SkosError> {
        create_concept(draft, &mut self.graph, self.scheme, self.allocator.as_mut())
    }

    fn warn_on_empty_label(&mut self, kind: ConceptKind, label: &str, row: usize) {
        if label.is_empty() {
            self.state.add_warning(
                format!(
                    "Row {}: {:?} concept has an empty prefLabel; asserting an empty literal",
                    row, kind
                ),
                Some("empty_label".to_string()),
            );
        }
    }

    fn warn_on_item(&mut self, item: &CleanedFields, row: usize) {
        if item.is_blank() {
            self.state.add_warning(
                format!(
                    "Row {}: every item column is blank; asserting an empty item concept",
                    row
                ),
                Some("blank_item".to_string()),
            );
        } else {
            self.warn_on_empty_label(ConceptKind::Item, &item.label, row);
        }
    }

    fn build_flat(
        &mut self,
        table: &Table,
        main_uri: NamedNode,
        narrower_uri: Option<NamedNode>,
    ) -> Result<Vec<RowLinks>, SkosError> {
        let parent = narrower_uri.clone().unwrap_or_else(|| main_uri.clone());
        let mut links = Vec::with_capacity(table.len());

        for row in table.rows() {
            let item = CleanedFields::from_row(&self.mapping.items, &row)?;
            self.warn_on_item(&item, row.number());

            let item_uri = self.concept(ConceptDraft {
                kind: ConceptKind::Item,
                label: &item.label,
                definition: &item.definition,
                notes: &item.notes,
                is_top_concept: false,
                narrower_of: Some(&parent),
            })?;

            links.push(RowLinks {
                row: row.number(),
                main: main_uri.clone(),
                main_reused: true,
                narrower: narrower_uri.clone(),
                item: Some(item_uri),
            });
        }

        Ok(links)
    }

    fn build_grouped(
        &mut self,
        table: &Table,
    ) -> Result<(MainConceptRegistry, Vec<RowLinks>), SkosError> {
        let mut registry = MainConceptRegistry::new();
        let mut links = Vec::with_capacity(table.len());
        let with_items = self.mapping.items.has_pref_label();

        for row in table.rows() {
            let main = CleanedFields::from_row(&self.mapping.main, &row)?;
            let narrower = CleanedFields::from_row(&self.mapping.narrower, &row)?;

            let (main_uri, main_reused) = match registry.lookup(&main.label) {
                Some(uri) => {
                    tracing::debug!("Row {}: reusing main concept {:?}", row.number(), main.label);
                    (uri, true)
                }
                None => {
                    self.warn_on_empty_label(ConceptKind::Main, &main.label, row.number());
                    let uri = self.concept(ConceptDraft {
                        kind: ConceptKind::Main,
                        label: &main.label,
                        definition: &main.definition,
                        notes: "",
                        is_top_concept: true,
                        narrower_of: None,
                    })?;
                    registry.register(main.label.clone(), uri.clone());
                    (uri, false)
                }
            };

            let narrower_uri = if narrower.label.is_empty() {
                None
            } else {
                Some(self.concept(ConceptDraft {
                    kind: ConceptKind::Narrower,
                    label: &narrower.label,
                    definition: &narrower.definition,
                    notes: "",
                    is_top_concept: false,
                    narrower_of: Some(&main_uri),
                })?)
            };

            let item_uri = if with_items {
                let item = CleanedFields::from_row(&self.mapping.items, &row)?;
                self.warn_on_item(&item, row.number());
                let parent = narrower_uri.as_ref().unwrap_or(&main_uri);
                Some(self.concept(ConceptDraft {
                    kind: ConceptKind::Item,
                    label: &item.label,
                    definition: &item.definition,
                    notes: &item.notes,
                    is_top_concept: false,
                    narrower_of: Some(parent),
                })?)
            } else {
                None
            };

            links.push(RowLinks {
                row: row.number(),
                main: main_uri,
                main_reused,
                narrower: narrower_uri,
                item: item_uri,
            });
        }

        tracing::info!(
            "Grouped {} rows under {} main concepts ({} repeated headers merged)",
            table.len(),
            registry.len(),
            registry.hits()
        );

        Ok((registry, links))
    }
}
