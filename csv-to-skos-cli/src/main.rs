use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use csv_to_skos::{
    read_rdf_xml, vocab, ColumnSpec, ParamSet, ProcessingOutcome, Processor, RunParameters,
    PARAMS_TEMPLATE,
};
use std::{fs, path::PathBuf};
use tracing::{info, warn, Level};

/// CSV to SKOS Thesaurus Generator
/// Converts a CSV authority list into a SKOS concept scheme serialized as RDF/XML
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output for detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a SKOS thesaurus from a CSV file
    Generate(ParamArgs),
    /// Resolve the parameters and check the CSV headers without writing output
    Validate(ParamArgs),
    /// Write a commented parameter file template
    Init {
        /// Output path for the template (a directory receives params.jsonc)
        #[arg(
            short,
            long,
            default_value = "params.jsonc",
            value_name = "OUTPUT PATH"
        )]
        output: PathBuf,
    },
    /// Summarize an existing RDF/XML thesaurus
    Inspect {
        /// Path to the RDF/XML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Run parameters. Flags win over the parameter file, which wins over the
/// environment (and `.env`).
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// JSON parameter file; comments are allowed
    #[arg(short, long, value_name = "PATH TO PARAMS")]
    params: Option<PathBuf>,

    #[arg(long)]
    main_project_root: Option<String>,
    /// CSV (or .xlsx/.ods) input file
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long)]
    csv_separator: Option<String>,
    /// Sheet to read when the input is a workbook
    #[arg(long)]
    sheet_name: Option<String>,
    #[arg(long)]
    namespace: Option<String>,
    #[arg(long)]
    scheme_id: Option<String>,
    #[arg(long)]
    scheme_name: Option<String>,
    #[arg(long)]
    scheme_definition: Option<String>,
    #[arg(long)]
    concept_main_name: Option<String>,
    #[arg(long)]
    concept_main_definition: Option<String>,
    #[arg(long)]
    concept_narrower_name: Option<String>,
    #[arg(long)]
    concept_narrower_definition: Option<String>,
    /// Comma-separated item label columns
    #[arg(long = "skos-preflabel-columns")]
    skos_pref_label_columns: Option<String>,
    #[arg(long)]
    skos_definition_columns: Option<String>,
    #[arg(long)]
    skos_notes_columns: Option<String>,
    #[arg(long)]
    skos_main_concept_preflabel_columns: Option<String>,
    #[arg(long)]
    skos_main_concept_description_columns: Option<String>,
    #[arg(long)]
    skos_narrow_concept_preflabel_columns: Option<String>,
    #[arg(long)]
    skos_narrow_concept_description_columns: Option<String>,
    /// Group rows under main/narrower concepts taken from columns
    #[arg(long, value_parser = clap::builder::BoolishValueParser::new())]
    nested: Option<bool>,
    #[arg(long)]
    output_file_name: Option<String>,
    #[arg(long)]
    output_file_path: Option<String>,
    /// pretty | xml
    #[arg(long)]
    output_format: Option<String>,
    /// utf-8 | iso-8859-1
    #[arg(long)]
    output_encoding: Option<String>,
}

impl ParamArgs {
    fn flags(&self) -> ParamSet {
        let columns = |value: &Option<String>| value.as_deref().map(ColumnSpec::from);
        ParamSet {
            main_project_root: self.main_project_root.clone(),
            csv_path: self.csv_path.clone(),
            csv_separator: self.csv_separator.clone(),
            sheet_name: self.sheet_name.clone(),
            namespace: self.namespace.clone(),
            scheme_id: self.scheme_id.clone(),
            scheme_name: self.scheme_name.clone(),
            scheme_definition: self.scheme_definition.clone(),
            concept_main_name: self.concept_main_name.clone(),
            concept_main_definition: self.concept_main_definition.clone(),
            concept_narrower_name: self.concept_narrower_name.clone(),
            concept_narrower_definition: self.concept_narrower_definition.clone(),
            skos_pref_label_columns: columns(&self.skos_pref_label_columns),
            skos_definition_columns: columns(&self.skos_definition_columns),
            skos_notes_columns: columns(&self.skos_notes_columns),
            skos_main_concept_preflabel_columns: columns(&self.skos_main_concept_preflabel_columns),
            skos_main_concept_description_columns: columns(
                &self.skos_main_concept_description_columns,
            ),
            skos_narrow_concept_preflabel_columns: columns(
                &self.skos_narrow_concept_preflabel_columns,
            ),
            skos_narrow_concept_description_columns: columns(
                &self.skos_narrow_concept_description_columns,
            ),
            nested: self.nested,
            output_file_name: self.output_file_name.clone(),
            output_file_path: self.output_file_path.clone(),
            output_format: self.output_format.clone(),
            output_encoding: self.output_encoding.clone(),
        }
    }

    /// Merge flags, parameter file and environment, then resolve.
    fn resolve(&self) -> Result<RunParameters> {
        let mut explicit = self.flags();

        if let Some(path) = &self.params {
            if !path.exists() {
                anyhow::bail!("Parameter file not found: {}", path.display());
            }
            let from_file = ParamSet::from_file(path)
                .context("Failed to load parameters. See errors for additional details:")?;
            explicit = ParamSet::merge(explicit, from_file);
        }

        let environment =
            ParamSet::from_env().context("Failed to read parameters from the environment")?;

        RunParameters::from_sources(explicit, environment).context("Failed to resolve parameters")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with appropriate level
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    info!("CSV to SKOS generator starting up...");

    match &cli.command {
        Commands::Generate(args) => generate_command(args).await,
        Commands::Validate(args) => validate_command(args),
        Commands::Init { output } => init_command(output),
        Commands::Inspect { file } => inspect_command(file),
    }
}

async fn generate_command(args: &ParamArgs) -> Result<()> {
    let params = args.resolve()?;

    info!("Initializing processor...");
    let processor = Processor::new(params);

    info!("Beginning CSV processing...");
    let report = processor
        .process()
        .await
        .context("Failed to generate the SKOS thesaurus")?;

    if let ProcessingOutcome::SuccessWithWarnings(warnings) = &report.outcome {
        for warning in warnings {
            warn!("{}", warning);
        }
    }

    info!(
        "{} triples: {} main, {} narrower, {} item concepts",
        report.triple_count,
        report.main_concepts,
        report.narrower_concepts,
        report.item_concepts
    );
    // stdout carries only the output path, for scripting
    println!("{}", report.output_path.display());
    Ok(())
}

fn validate_command(args: &ParamArgs) -> Result<()> {
    info!("Validating parameters...");
    let params = args.resolve()?;

    Processor::new(params)
        .validate()
        .context("Failed to validate CSV columns")?;

    info!("Parameter validation successful");
    Ok(())
}

fn init_command(output: &PathBuf) -> Result<()> {
    info!("Generating parameter file template...");

    // if output is a directory, append the default file name
    let full_file_output_path = if output.is_dir() {
        output.join("params.jsonc")
    } else {
        output.into()
    };

    fs::write(&full_file_output_path, PARAMS_TEMPLATE).context(format!(
        "Failed to write parameter template to: {}",
        output.display()
    ))?;

    info!(
        "Successfully generated parameter template at: {}",
        full_file_output_path.display()
    );
    Ok(())
}

fn inspect_command(file: &PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let graph = read_rdf_xml(file).context("Failed to read RDF/XML")?;
    let schemes = graph.instances_of(vocab::CONCEPT_SCHEME);
    let top_concepts: usize = schemes.iter().map(|s| graph.top_concepts(s).len()).sum();

    println!("triples: {}", graph.len());
    println!("schemes: {}", schemes.len());
    println!("concepts: {}", graph.instances_of(vocab::CONCEPT).len());
    println!("top concepts: {}", top_concepts);
    println!("narrower links: {}", graph.narrower_link_count());
    Ok(())
}
