use csv_to_skos::{
    read_rdf_xml, vocab, ColumnSpec, ConceptKind, OutputEncoding, OutputFormat, ParamSet, ProcessingOutcome,
    Processor, RunParameters,
};
use std::sync::Once;
use tempfile::TempDir;
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

fn load(file: &str, csv: &str, output: &TempDir) -> RunParameters {
    let overrides = ParamSet {
        csv_path: Some(format!("../test-data/{}", csv)),
        main_project_root: Some(output.path().display().to_string()),
        ..Default::default()
    };
    let from_file = ParamSet::from_file(format!("../test-data/{}", file)).unwrap();
    RunParameters::from_sources(overrides, from_file).unwrap()
}

#[tokio::test]
async fn test_flat_thesaurus() {
    init_logging();
    let output = TempDir::new().unwrap();
    let params = load("params.jsonc", "concepts.csv", &output);
    let scheme = params.scheme.scheme_uri.clone();

    let processor = Processor::new(params);
    processor.validate().unwrap();
    let report = processor.process().await.unwrap();
    info!("Flat report: {:?}", report);

    assert_eq!(
        report.output_path,
        output.path().join("mcc-skos-generator").join("fichier_skos.xml")
    );
    assert_eq!(report.item_concepts, 2);
    assert_eq!(report.outcome, ProcessingOutcome::Success);

    let graph = read_rdf_xml(&report.output_path).unwrap();
    let top = graph.top_concepts(&scheme);
    assert_eq!(top.len(), 1);
    assert_eq!(graph.label_of(top[0]), Some("Concept Principal"));

    let items = graph.narrower_of(top[0]);
    assert_eq!(items.len(), 2);
    assert_eq!(
        graph.label_of(items[0]),
        Some("Concept 1 - Concept 1 - Concept 1")
    );
    // main concept plus one per row
    assert_eq!(graph.instances_of(vocab::CONCEPT).len(), 3);
}

#[tokio::test]
async fn test_grouped_thesaurus() {
    init_logging();
    let output = TempDir::new().unwrap();
    let params = load("regions.jsonc", "regions.csv", &output);
    assert!(params.hierarchy.is_grouped());
    assert_eq!(params.csv_separator, b';');
    assert_eq!(params.output.format, OutputFormat::Xml);
    assert_eq!(params.output.encoding, OutputEncoding::Iso88591);
    let scheme = params.scheme.scheme_uri.clone();

    let processor = Processor::new(params);
    let build = processor.build().unwrap();
    assert_eq!(build.registry.len(), 2);
    assert_eq!(build.registry.hits(), 3);
    assert_eq!(build.graph.concepts_of_kind(ConceptKind::Narrower).count(), 4);

    // The last row has no MRC, so its municipality hangs off the region.
    let last = build.rows.last().unwrap();
    assert!(last.main_reused);
    assert!(last.narrower.is_none());
    let gaspesie = build.registry.get("Gaspésie").unwrap();
    assert!(build
        .graph
        .narrower_of(gaspesie)
        .contains(&last.item.as_ref().unwrap()));

    let report = processor.process().await.unwrap();
    let graph = read_rdf_xml(&report.output_path).unwrap();
    assert_eq!(graph.len(), report.triple_count);

    let mut regions: Vec<_> = graph
        .top_concepts(&scheme)
        .into_iter()
        .filter_map(|uri| graph.label_of(uri))
        .collect();
    regions.sort();
    assert_eq!(regions, vec!["Côte-Nord", "Gaspésie"]);
}

#[tokio::test]
async fn test_grouped_thesaurus_from_workbook() {
    init_logging();
    let output = TempDir::new().unwrap();

    // The "Regions" sheet has no description columns of its own.
    let overrides = ParamSet {
        csv_path: Some("../test-data/municipalites.xlsx".to_string()),
        sheet_name: Some("Regions".to_string()),
        main_project_root: Some(output.path().display().to_string()),
        skos_main_concept_description_columns: Some(ColumnSpec::from("region")),
        skos_definition_columns: Some(ColumnSpec::from("munnom")),
        output_file_name: Some("classeur".to_string()),
        ..Default::default()
    };
    let from_file = ParamSet::from_file("../test-data/regions.jsonc").unwrap();
    let params = RunParameters::from_sources(overrides, from_file).unwrap();
    let scheme = params.scheme.scheme_uri.clone();

    let processor = Processor::new(params);
    processor.validate().unwrap();
    let report = processor.process().await.unwrap();
    info!("Workbook report: {:?}", report);

    assert_eq!(
        report.output_path,
        output.path().join("skos").join("classeur.xml")
    );
    assert_eq!(report.item_concepts, 3);
    assert_eq!(report.narrower_concepts, 3);
    assert_eq!(report.registry_hits, 1);
    assert_eq!(report.outcome, ProcessingOutcome::Success);

    let graph = read_rdf_xml(&report.output_path).unwrap();
    let mut regions: Vec<_> = graph
        .top_concepts(&scheme)
        .into_iter()
        .filter_map(|uri| graph.label_of(uri))
        .collect();
    regions.sort();
    assert_eq!(regions, vec!["Côte-Nord", "Gaspésie"]);
}

#[tokio::test]
async fn test_environment_defaults_fill_gaps() {
    init_logging();
    let output = TempDir::new().unwrap();

    let env = ParamSet::from_lookup(|key| match key {
        "NAMESPACE" => Some("http://example.org/env/".to_string()),
        "NESTED" => Some("false".to_string()),
        "CONCEPT_MAIN_NAME" => Some("Depuis l'environnement".to_string()),
        "SKOS_PREFLABEL_COLUMNS" => Some("label".to_string()),
        _ => None,
    })
    .unwrap();
    let explicit = ParamSet {
        csv_path: Some("../test-data/concepts.csv".to_string()),
        main_project_root: Some(output.path().display().to_string()),
        output_file_path: Some("out".to_string()),
        output_file_name: Some("env".to_string()),
        ..Default::default()
    };

    let params = RunParameters::from_sources(explicit, env).unwrap();
    assert_eq!(params.scheme.namespace, "http://example.org/env/");

    let report = Processor::new(params).process().await.unwrap();
    assert_eq!(report.output_path, output.path().join("out").join("env.xml"));
    assert_eq!(report.item_concepts, 2);
}
