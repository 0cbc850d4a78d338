//! Error taxonomy for a single analysis run.

use thiserror::Error;

/// Errors surfaced by the analyzer and the CLI entry point.
///
/// Every variant renders to the message that ends up in the `error` field of
/// the JSON response.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Fewer than two positional arguments were supplied.
    #[error("Missing arguments")]
    MissingArguments,

    /// The image could not be read or decoded.
    #[error("{0}")]
    ImageLoad(String),

    /// Classification or landmark extraction failed.
    #[error("{0}")]
    Analysis(String),

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Short machine-readable name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::MissingArguments => "missing_arguments",
            AnalysisError::ImageLoad(_) => "image_load",
            AnalysisError::Analysis(_) => "analysis",
            AnalysisError::Config(_) => "config",
        }
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        AnalysisError::Analysis(format!("{:#}", err))
    }
}
