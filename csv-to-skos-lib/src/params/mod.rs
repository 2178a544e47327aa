mod template;

pub use template::PARAMS_TEMPLATE;

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::concept::{namespaced_uri, UriAllocator, UuidAllocator};
use crate::error::SkosError;
use crate::serializer::{output_file_path, OutputEncoding, OutputFormat};
use crate::types::{
    ColumnSpec, Columns, ConceptSchemeConfig, FieldMapping, FixedConcept, Hierarchy, RowMapping,
};

pub const DEFAULT_PROJECT_ROOT: &str = "/workspaces";
pub const DEFAULT_OUTPUT_PATH: &str = "/";
pub const DEFAULT_CSV_SEPARATOR: u8 = b',';

/// Every configuration key, optional, as supplied by one source.
///
/// Keys match the parameter file; the environment uses the same keys
/// upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSet {
    pub main_project_root: Option<String>,
    pub csv_path: Option<String>,
    pub csv_separator: Option<String>,
    pub sheet_name: Option<String>,
    pub namespace: Option<String>,
    pub scheme_id: Option<String>,
    pub scheme_name: Option<String>,
    pub scheme_definition: Option<String>,
    pub concept_main_name: Option<String>,
    pub concept_main_definition: Option<String>,
    pub concept_narrower_name: Option<String>,
    pub concept_narrower_definition: Option<String>,
    #[serde(rename = "skos_prefLabel_columns", alias = "skos_preflabel_columns")]
    pub skos_pref_label_columns: Option<ColumnSpec>,
    pub skos_definition_columns: Option<ColumnSpec>,
    pub skos_notes_columns: Option<ColumnSpec>,
    pub skos_main_concept_preflabel_columns: Option<ColumnSpec>,
    pub skos_main_concept_description_columns: Option<ColumnSpec>,
    pub skos_narrow_concept_preflabel_columns: Option<ColumnSpec>,
    pub skos_narrow_concept_description_columns: Option<ColumnSpec>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub nested: Option<bool>,
    pub output_file_name: Option<String>,
    pub output_file_path: Option<String>,
    pub output_format: Option<String>,
    pub output_encoding: Option<String>,
}

macro_rules! merge_fields {
    ($explicit:expr, $defaults:expr, [$($field:ident),* $(,)?]) => {
        ParamSet {
            $($field: $explicit.$field.or($defaults.$field),)*
        }
    };
}

impl ParamSet {
    pub const KEYS: [&'static str; 24] = [
        "main_project_root",
        "csv_path",
        "csv_separator",
        "sheet_name",
        "namespace",
        "scheme_id",
        "scheme_name",
        "scheme_definition",
        "concept_main_name",
        "concept_main_definition",
        "concept_narrower_name",
        "concept_narrower_definition",
        "skos_prefLabel_columns",
        "skos_definition_columns",
        "skos_notes_columns",
        "skos_main_concept_preflabel_columns",
        "skos_main_concept_description_columns",
        "skos_narrow_concept_preflabel_columns",
        "skos_narrow_concept_description_columns",
        "nested",
        "output_file_name",
        "output_file_path",
        "output_format",
        "output_encoding",
    ];

    /// Load a JSON parameter file; `//` and `/* */` comments are allowed.
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self, SkosError> {
        let path = path.into();
        tracing::info!("Loading parameters from {:?}", path);
        let file = std::fs::File::open(&path)?;
        let stripped = json_comments::StripComments::new(file);
        let params = serde_json::from_reader(stripped)?;
        tracing::info!("Successfully loaded parameters: {}", path.display());
        Ok(params)
    }

    /// Read defaults from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, SkosError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a set by looking every key up, upper-cased, in `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SkosError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut map = serde_json::Map::new();
        for key in Self::KEYS {
            if let Some(value) = lookup(&key.to_uppercase()) {
                map.insert(key.to_string(), serde_json::Value::String(value));
            }
        }
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }

    /// Keep every value of `explicit`, filling gaps from `defaults`.
    pub fn merge(explicit: ParamSet, defaults: ParamSet) -> ParamSet {
        merge_fields!(
            explicit,
            defaults,
            [
                main_project_root,
                csv_path,
                csv_separator,
                sheet_name,
                namespace,
                scheme_id,
                scheme_name,
                scheme_definition,
                concept_main_name,
                concept_main_definition,
                concept_narrower_name,
                concept_narrower_definition,
                skos_pref_label_columns,
                skos_definition_columns,
                skos_notes_columns,
                skos_main_concept_preflabel_columns,
                skos_main_concept_description_columns,
                skos_narrow_concept_preflabel_columns,
                skos_narrow_concept_description_columns,
                nested,
                output_file_name,
                output_file_path,
                output_format,
                output_encoding,
            ]
        )
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Text(text)) => parse_flag(&text).map_err(serde::de::Error::custom),
    }
}

/// Empty text counts as unset.
fn parse_flag(text: &str) -> Result<Option<bool>, String> {
    match text.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        other => Err(format!(
            "Invalid boolean value for 'nested': {:?} [Expected: true, false, 1, 0, yes, no]",
            other
        )),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_separator(text: &str) -> Result<u8, SkosError> {
    match text {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    let bytes = text.as_bytes();
    if bytes.len() == 1 && bytes[0].is_ascii() {
        Ok(bytes[0])
    } else {
        Err(SkosError::Configuration(format!(
            "'csv_separator' must be a single ASCII character, got {:?}",
            text
        )))
    }
}

fn normalized(spec: Option<ColumnSpec>) -> Option<Columns> {
    spec.map(|spec| spec.normalize())
}

/// Where and how the thesaurus is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub encoding: OutputEncoding,
}

/// Fully resolved, validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParameters {
    pub csv_path: PathBuf,
    pub csv_separator: u8,
    pub sheet_name: Option<String>,
    pub scheme: ConceptSchemeConfig,
    pub hierarchy: Hierarchy,
    pub mapping: RowMapping,
    pub output: OutputTarget,
}

impl RunParameters {
    /// Apply literal defaults to a merged set and validate it.
    pub fn resolve(params: ParamSet) -> Result<Self, SkosError> {
        tracing::info!("Resolving run parameters...");

        let csv_path = non_empty(params.csv_path).ok_or_else(|| {
            SkosError::Configuration("Invalid CSV file path: '' ('csv_path' is required)".into())
        })?;

        let namespace = non_empty(params.namespace).ok_or_else(|| {
            SkosError::Configuration("'namespace' is required to build concept URIs".into())
        })?;

        let nested = params.nested.unwrap_or(false);

        let mapping = RowMapping {
            items: FieldMapping {
                pref_label: normalized(params.skos_pref_label_columns),
                definition: normalized(params.skos_definition_columns),
                notes: normalized(params.skos_notes_columns),
            },
            main: FieldMapping {
                pref_label: normalized(params.skos_main_concept_preflabel_columns),
                definition: normalized(params.skos_main_concept_description_columns),
                notes: None,
            },
            narrower: FieldMapping {
                pref_label: normalized(params.skos_narrow_concept_preflabel_columns),
                definition: normalized(params.skos_narrow_concept_description_columns),
                notes: None,
            },
        };

        let hierarchy = if nested {
            if !mapping.main.has_pref_label() {
                return Err(SkosError::Configuration(
                    "When 'nested=true', 'skos_main_concept_preflabel_columns' is required and must not be empty".into(),
                ));
            }
            Hierarchy::Grouped
        } else {
            let name = non_empty(params.concept_main_name).ok_or_else(|| {
                SkosError::Configuration(
                    "When 'nested=false', 'concept_main_name' is required".into(),
                )
            })?;
            let main = FixedConcept {
                name,
                definition: params.concept_main_definition.unwrap_or_default(),
            };
            let narrower = match (
                non_empty(params.concept_narrower_name),
                non_empty(params.concept_narrower_definition),
            ) {
                (Some(name), Some(definition)) => Some(FixedConcept { name, definition }),
                (Some(name), None) => {
                    tracing::warn!(
                        "Ignoring 'concept_narrower_name' {:?}: 'concept_narrower_definition' is not set",
                        name
                    );
                    None
                }
                _ => None,
            };
            Hierarchy::Flat { main, narrower }
        };

        let scheme_uri = match non_empty(params.scheme_id) {
            Some(id) => namespaced_uri(&namespace, &id)?,
            None => UuidAllocator.new_uri(&namespace)?,
        };
        let scheme = ConceptSchemeConfig {
            namespace,
            scheme_uri,
            label: params.scheme_name.unwrap_or_default(),
            description: params.scheme_definition.unwrap_or_default(),
        };

        let csv_separator = match non_empty(params.csv_separator) {
            Some(text) => parse_separator(&text)?,
            None => DEFAULT_CSV_SEPARATOR,
        };

        let format = match non_empty(params.output_format) {
            Some(text) => text.parse()?,
            None if nested => OutputFormat::Xml,
            None => OutputFormat::Pretty,
        };
        let encoding = match non_empty(params.output_encoding) {
            Some(text) => text.parse()?,
            None if nested => OutputEncoding::Iso88591,
            None => OutputEncoding::Utf8,
        };

        let output_name =
            non_empty(params.output_file_name).unwrap_or_else(|| Uuid::new_v4().to_string());
        let output_dir =
            non_empty(params.output_file_path).unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());
        let project_root = non_empty(params.main_project_root)
            .unwrap_or_else(|| DEFAULT_PROJECT_ROOT.to_string());
        let path = output_file_path(
            Path::new(&project_root),
            Path::new(&output_dir),
            &output_name,
        );

        let resolved = Self {
            csv_path: PathBuf::from(csv_path),
            csv_separator,
            sheet_name: non_empty(params.sheet_name),
            scheme,
            hierarchy,
            mapping,
            output: OutputTarget {
                path,
                format,
                encoding,
            },
        };

        tracing::info!(
            "Parameters resolved: {} -> {} ({} mode)",
            resolved.csv_path.display(),
            resolved.output.path.display(),
            if nested { "grouped" } else { "flat" }
        );
        Ok(resolved)
    }

    /// Merge explicit values over environment defaults, then resolve.
    pub fn from_sources(explicit: ParamSet, defaults: ParamSet) -> Result<Self, SkosError> {
        Self::resolve(ParamSet::merge(explicit, defaults))
    }
}
