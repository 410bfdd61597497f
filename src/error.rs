use thiserror::Error;
use uuid::Uuid;

// Main stage error type

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Protocol Error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Ledger Error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Settings Error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Failed to write result sink: {0}")]
    Sink(#[from] std::io::Error),
    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Coordinator build error: {0}")]
    Build(&'static str),
}

// Violations of the inter-stage message contract
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Message received after the stage stopped")]
    MessageAfterStop,
    #[error("Sub-result shape {got} does not match task type {task}")]
    ResultShape {
        task: &'static str,
        got: &'static str,
    },
    #[error("Downstream channel closed before the stop signal was sent")]
    DownstreamClosed,
}

// Violations of the per-image counting contract
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Image {0} declared zero sub-results")]
    EmptyDeclaration(Uuid),
    #[error("Image {0} delivered {1} results on first sight but declared only {2}")]
    OverDeclared(Uuid, usize, usize),
    #[error("Image {0} outstanding count would go negative ({1} remaining, {2} delivered)")]
    NegativeOutstanding(Uuid, usize, usize),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Unsupported task type: {0}")]
    UnsupportedTaskType(String),
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}
