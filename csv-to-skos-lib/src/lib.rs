//! CSV to SKOS Thesaurus Library
//!
//! This library turns a CSV authority list into a SKOS concept scheme
//! serialized as RDF/XML, based on a set of run parameters.

mod columns;
mod concept;
mod error;
mod excel;
mod graph;
mod params;
mod processor;
mod serializer;
mod table;
mod types;

pub use columns::{clean, VALUE_SEPARATOR};
pub use concept::{
    create_concept, define_scheme, namespaced_uri, ConceptDraft, UriAllocator, UuidAllocator,
};
pub use error::{ProcessingMessage, ProcessingOutcome, ProcessingState, SkosError};
pub use excel::{is_spreadsheet, SpreadsheetReader};
pub use graph::{vocab, BuildResult, GraphBuilder, MainConceptRegistry, SkosGraph};
pub use params::{OutputTarget, ParamSet, RunParameters, PARAMS_TEMPLATE};
pub use processor::{Processor, RunReport};
pub use serializer::{
    output_file_path, read_rdf_xml, render, to_bytes, write_graph, OutputEncoding, OutputFormat,
};
pub use table::{is_missing, Row, Table, NULL_MARKERS};
pub use types::{
    ColumnSpec, Columns, Concept, ConceptKind, ConceptSchemeConfig, FieldMapping, FixedConcept,
    Hierarchy, RowMapping, LITERAL_LANGUAGE, RDF_NS, SKOS_NS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;
    use tracing::info;

    static INIT: Once = Once::new();

    /// Initialize logging exactly once for all tests
    fn init_logging() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(tracing::Level::DEBUG)
                .init();
        });
    }

    #[test]
    fn test_params_file_loading() {
        init_logging();

        info!("Testing parameter file loading");
        let params = ParamSet::from_file("../test-data/params.jsonc").unwrap();
        assert_eq!(params.csv_path.as_deref(), Some("test-data/concepts.csv"));

        info!("Resolving parameters");
        let resolved = RunParameters::resolve(params).unwrap();
        assert!(!resolved.hierarchy.is_grouped());
        assert_eq!(resolved.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_sample_build() {
        init_logging();

        let table = Table::from_path(std::path::Path::new("../test-data/concepts.csv"), b',', None)
            .unwrap();
        let params = RunParameters::resolve(
            ParamSet::from_file("../test-data/params.jsonc").unwrap(),
        )
        .unwrap();

        let result = GraphBuilder::new(&params.scheme, &params.mapping)
            .build(&params.hierarchy, &table)
            .unwrap();
        info!("Built {} triples", result.graph.len());

        assert_eq!(result.graph.concepts_of_kind(ConceptKind::Item).count(), table.len());
        assert_eq!(result.outcome, ProcessingOutcome::Success);
    }
}
