//! CLI-specific error types and exit code mapping

use logweave_core::error::LogweaveError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings or manifest loading failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during report rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file write, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from the compiler.
    #[error("{0}")]
    Core(#[from] LogweaveError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Settings or manifest loading error        |
    /// | 3    | Manifest rejected by validation / compile |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::Core(e) => match e {
                LogweaveError::Config(_) => 2,
                LogweaveError::Io(_) => 10,
                LogweaveError::Validation(_)
                | LogweaveError::Conversion(_)
                | LogweaveError::Secret(_)
                | LogweaveError::DuplicateLabel(_)
                | LogweaveError::Render(_) => 3,
            },
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}
