//! Load-time errors raised while compiling content.

use thiserror::Error;

/// A defect in authored content, detected while compiling it.
///
/// Evaluation never produces these: once content has compiled, faults during
/// evaluation degrade to neutral values and are reported through `tracing`.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No catalog knows this condition key
    #[error("Unknown condition '{0}'")]
    UnknownCondition(String),

    /// A parameterized condition was written as a bare string
    #[error("Condition '{0}' requires arguments")]
    MissingArguments(String),

    /// More than one condition key in a single object
    #[error("Conflicting condition keys: {0}")]
    ConflictingConditions(String),

    /// A required member is absent
    #[error("Missing member '{0}'")]
    MissingMember(String),

    /// A member has the wrong shape
    #[error("Invalid value for '{member}': {reason}")]
    InvalidValue { member: String, reason: String },

    #[error("Unknown comparison operator '{0}'")]
    UnknownOperator(String),

    #[error("Invalid duration for '{member}': {source}")]
    Duration {
        member: String,
        #[source]
        source: game_rules::DurationParseError,
    },

    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML document: {0}")]
    Toml(#[from] toml::de::Error),

    /// A named entry of a content document failed to compile
    #[error("In '{name}': {source}")]
    Entry {
        name: String,
        #[source]
        source: Box<LoadError>,
    },

    /// Several entries of one document failed; each is an [`LoadError::Entry`]
    #[error("{} entries failed to load: {}", .0.len(), entry_names(.0))]
    Entries(Vec<LoadError>),
}

fn entry_names(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(|e| match e {
            LoadError::Entry { name, .. } => name.as_str(),
            _ => "?",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl LoadError {
    /// Create an invalid value error.
    pub fn invalid(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            member: member.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(member: impl Into<String>) -> Self {
        Self::MissingMember(member.into())
    }
}

/// Common result type for content loading.
pub type LoadResult<T> = Result<T, LoadError>;
