//! Domain error types.

/// A row-level coercion failure (number or timestamp).
///
/// Never propagated out of the pipeline: callers absorb it by substituting
/// a default (zero or absent) and logging at debug level.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot parse {kind} from {token:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub token: String,
}

impl ParseError {
    pub fn number(token: &str) -> Self {
        Self {
            kind: "number",
            token: token.to_string(),
        }
    }

    pub fn datetime(token: &str) -> Self {
        Self {
            kind: "datetime",
            token: token.to_string(),
        }
    }
}

/// Top-level error type for perfscope.
#[derive(Debug, thiserror::Error)]
pub enum PerfscopeError {
    #[error("unsupported or unreadable input: {reason}")]
    Format { reason: String },

    #[error("no usable data: {reason}")]
    EmptyData { reason: String },

    #[error("profit/PnL column not found; available columns: {}", available.join(", "))]
    ColumnNotFound { available: Vec<String> },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PerfscopeError {
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }

    pub fn empty(reason: impl Into<String>) -> Self {
        Self::EmptyData {
            reason: reason.into(),
        }
    }
}

impl From<&PerfscopeError> for std::process::ExitCode {
    fn from(err: &PerfscopeError) -> Self {
        let code: u8 = match err {
            PerfscopeError::Io(_) => 1,
            PerfscopeError::ConfigParse { .. } | PerfscopeError::ConfigInvalid { .. } => 2,
            PerfscopeError::Format { .. } => 3,
            PerfscopeError::EmptyData { .. } => 4,
            PerfscopeError::ColumnNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
