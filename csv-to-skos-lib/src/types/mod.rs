use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};

pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Language tag carried by every literal written to the thesaurus.
pub const LITERAL_LANGUAGE: &str = "fr";

/// A column selection as written by a user: either `"a, b,c"` or `["a", "b", "c"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ColumnSpec {
    fn from(value: &str) -> Self {
        ColumnSpec::Text(value.to_string())
    }
}

impl From<Vec<&str>> for ColumnSpec {
    fn from(value: Vec<&str>) -> Self {
        ColumnSpec::List(value.into_iter().map(String::from).collect())
    }
}

/// Ordered column names after normalization.
///
/// `[""]` is the "no columns" sentinel produced by an empty `ColumnSpec::Text`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Columns(Vec<String>);

impl Columns {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_empty() || (self.0.len() == 1 && self.0[0].is_empty())
    }

    /// Columns named here that the header row does not contain.
    pub fn missing_from(&self, headers: &[String]) -> Vec<String> {
        if self.is_unset() {
            return Vec::new();
        }
        self.0
            .iter()
            .filter(|name| !headers.contains(name))
            .cloned()
            .collect()
    }
}

/// Which CSV columns feed the fields of one class of concept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pub pref_label: Option<Columns>,
    pub definition: Option<Columns>,
    pub notes: Option<Columns>,
}

impl FieldMapping {
    /// `[""]` and an empty list count as unset, so no item concepts are made.
    pub fn has_pref_label(&self) -> bool {
        self.pref_label.as_ref().is_some_and(|c| !c.is_unset())
    }

    pub fn all_columns(&self) -> impl Iterator<Item = &Columns> {
        [&self.pref_label, &self.definition, &self.notes]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMapping {
    pub items: FieldMapping,
    pub main: FieldMapping,
    pub narrower: FieldMapping,
}

impl RowMapping {
    pub fn all_columns(&self) -> impl Iterator<Item = &Columns> {
        self.items
            .all_columns()
            .chain(self.main.all_columns())
            .chain(self.narrower.all_columns())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptSchemeConfig {
    pub namespace: String,
    pub scheme_uri: NamedNode,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConceptKind {
    Main,
    Narrower,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub uri: NamedNode,
    pub kind: ConceptKind,
    pub label: String,
    pub definition: String,
    pub note: Option<String>,
    pub is_top_concept: bool,
    pub parent: Option<NamedNode>,
}

/// A concept whose label and definition come from configuration, not rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedConcept {
    pub name: String,
    pub definition: String,
}

/// How concepts are arranged under the scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hierarchy {
    /// One configured main concept (and optional narrower) shared by every row.
    Flat {
        main: FixedConcept,
        narrower: Option<FixedConcept>,
    },
    /// Main and narrower concepts derived per row; main concepts merged by label.
    Grouped,
}

impl Hierarchy {
    pub fn is_grouped(&self) -> bool {
        matches!(self, Hierarchy::Grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_pref_label() {
        let mapping = |columns: Option<Vec<&str>>| FieldMapping {
            pref_label: columns
                .map(|names| Columns::new(names.into_iter().map(String::from).collect())),
            ..Default::default()
        };

        assert!(!mapping(None).has_pref_label());
        assert!(!mapping(Some(vec![])).has_pref_label());
        assert!(!mapping(Some(vec![""])).has_pref_label());
        assert!(mapping(Some(vec!["label"])).has_pref_label());
    }
}
