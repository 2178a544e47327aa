use crate::error::{ProcessingOutcome, SkosError};
use crate::graph::{BuildResult, GraphBuilder};
use crate::params::RunParameters;
use crate::serializer::write_graph;
use crate::table::Table;
use crate::types::ConceptKind;
use std::path::PathBuf;

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub triple_count: usize,
    pub main_concepts: usize,
    pub narrower_concepts: usize,
    pub item_concepts: usize,
    /// Rows whose main concept was found in the registry instead of created.
    pub registry_hits: usize,
    pub outcome: ProcessingOutcome,
}

impl RunReport {
    fn from_build(build: &BuildResult, output_path: PathBuf) -> Self {
        let count = |kind| build.graph.concepts_of_kind(kind).count();
        Self {
            output_path,
            triple_count: build.graph.len(),
            main_concepts: count(ConceptKind::Main),
            narrower_concepts: count(ConceptKind::Narrower),
            item_concepts: count(ConceptKind::Item),
            registry_hits: build.registry.hits(),
            outcome: build.outcome.clone(),
        }
    }
}

pub struct Processor {
    params: RunParameters,
}

impl Processor {
    pub fn new(params: RunParameters) -> Self {
        tracing::info!(
            "Creating processor for {} (namespace {})",
            params.csv_path.display(),
            params.scheme.namespace
        );
        Self { params }
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Check that every configured column exists in the header row.
    ///
    /// Reads nothing past the headers and writes nothing.
    pub fn validate(&self) -> Result<(), SkosError> {
        tracing::info!("Validating columns of {}", self.params.csv_path.display());
        let headers = Table::headers_from_path(
            &self.params.csv_path,
            self.params.csv_separator,
            self.params.sheet_name.as_deref(),
        )?;

        for columns in self.params.mapping.all_columns() {
            if let Some(column) = columns.missing_from(&headers).into_iter().next() {
                tracing::error!("Column '{}' missing from headers {:?}", column, headers);
                return Err(SkosError::MissingColumn { column, row: 0 });
            }
        }

        tracing::info!("All configured columns present");
        Ok(())
    }

    /// Read the table and build the graph without writing anything.
    pub fn build(&self) -> Result<BuildResult, SkosError> {
        let table = Table::from_path(
            &self.params.csv_path,
            self.params.csv_separator,
            self.params.sheet_name.as_deref(),
        )?;
        tracing::info!("Loaded {} rows", table.len());

        GraphBuilder::new(&self.params.scheme, &self.params.mapping)
            .build(&self.params.hierarchy, &table)
    }

    pub async fn process(&self) -> Result<RunReport, SkosError> {
        tracing::info!("Starting SKOS generation");

        let build = self.build()?;
        write_graph(&build.graph, &self.params.output).await?;

        let report = RunReport::from_build(&build, self.params.output.path.clone());
        if let ProcessingOutcome::SuccessWithWarnings(warnings) = &report.outcome {
            tracing::warn!("Completed with {} warnings", warnings.len());
        }
        tracing::info!(
            "Processing completed: {} main, {} narrower, {} item concepts",
            report.main_concepts,
            report.narrower_concepts,
            report.item_concepts
        );
        Ok(report)
    }
}
