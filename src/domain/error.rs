//! Domain error types.

/// Top-level error type for tipdash.
#[derive(Debug, thiserror::Error)]
pub enum TipdashError {
    #[error("failed to load data: {reason}")]
    DataLoad { reason: String },

    #[error("data schema mismatch: missing column '{column}'")]
    Schema { column: String },

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("invalid value for {field}: '{value}'")]
    InvalidArgument { field: String, value: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TipdashError {
    pub fn invalid_argument(field: &str, value: impl Into<String>) -> Self {
        TipdashError::InvalidArgument {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

impl From<&TipdashError> for std::process::ExitCode {
    fn from(err: &TipdashError) -> Self {
        let code: u8 = match err {
            TipdashError::Io(_) => 1,
            TipdashError::ConfigParse { .. }
            | TipdashError::ConfigMissing { .. }
            | TipdashError::ConfigInvalid { .. } => 2,
            TipdashError::DataLoad { .. }
            | TipdashError::Schema { .. }
            | TipdashError::MalformedRow { .. } => 3,
            TipdashError::InvalidArgument { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
