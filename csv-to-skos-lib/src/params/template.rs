pub const PARAMS_TEMPLATE: &str = r#"{
  // Input table - CSV (or .xlsx/.ods workbook) with a header row
  "csv_path": "fichiers/MUN.csv",
  // Single-character delimiter (use "\\t" for tabs)
  "csv_separator": ",",

  // Base IRI for every generated identifier
  "namespace": "http://example.org/thesaurus/",
  // Optional - a fresh UUID is used when omitted
  "scheme_id": "municipalites",
  "scheme_name": "Liste autorité des municipalités",
  "scheme_definition": "Renseignements sur les municipalités du Québec.",

  // false: one fixed main concept shared by every row
  // true: main and narrower concepts taken from the columns below
  "nested": false,

  // Flat mode - the fixed main concept (required) and optional narrower concept
  "concept_main_name": "Liste des municipalités",
  "concept_main_definition": "Renseignements sur les municipalités du Québec.",
  // "concept_narrower_name": "Municipalités locales",
  // "concept_narrower_definition": "Municipalités de niveau local.",

  // One concept per row - columns as "a, b" or ["a", "b"], joined with " - "
  "skos_prefLabel_columns": "munnom",
  "skos_definition_columns": ["munnom", "mdes", "regadm", "mrc"],
  "skos_notes_columns": "",

  // Grouped mode - repeated main labels collapse into one concept
  // "skos_main_concept_preflabel_columns": "regadm",
  // "skos_main_concept_description_columns": "regadm",
  // "skos_narrow_concept_preflabel_columns": "mrc",
  // "skos_narrow_concept_description_columns": "mrc",

  // Output goes to <main_project_root>/<output_file_path>/<output_file_name>.xml
  "main_project_root": "/workspaces",
  "output_file_path": "skos",
  "output_file_name": "municipalites",
  // "pretty" (typed nodes) or "xml" (rdf:Description)
  "output_format": "pretty",
  // "utf-8" or "iso-8859-1"
  "output_encoding": "utf-8"
}
"#;
