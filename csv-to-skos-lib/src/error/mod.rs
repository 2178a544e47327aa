use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkosError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Column '{column}' not found in CSV headers (row {row})")]
    MissingColumn { column: String, row: usize },
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("RDF/XML parse error: {0}")]
    Parse(String),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingMessage {
    pub message: String,
    pub source: Option<String>,
}

impl ProcessingMessage {
    pub fn new(message: impl Into<String>, source: Option<String>) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }
}

impl std::fmt::Display for ProcessingMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "[{}] {}", source, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Non-fatal observations collected while building a graph.
#[derive(Debug, Default, Clone)]
pub struct ProcessingState {
    warnings: Vec<ProcessingMessage>,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>, source: Option<String>) {
        let message = ProcessingMessage::new(message, source);
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn get_warnings(&self) -> &[ProcessingMessage] {
        &self.warnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Success,
    SuccessWithWarnings(Vec<ProcessingMessage>),
}

impl ProcessingOutcome {
    pub fn from_state(state: ProcessingState) -> Self {
        if state.has_warnings() {
            ProcessingOutcome::SuccessWithWarnings(state.warnings)
        } else {
            ProcessingOutcome::Success
        }
    }

    pub fn warnings(&self) -> &[ProcessingMessage] {
        match self {
            ProcessingOutcome::Success => &[],
            ProcessingOutcome::SuccessWithWarnings(warnings) => warnings,
        }
    }
}
