use thiserror::Error;

/// Renders a list of permitted values the way validation messages show them.
fn join_allowed(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum PostvizError {
    #[error("'{field}' has no value '{value}'. The allowed values are: {}.", join_allowed(.allowed))]
    DisallowedValues {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("'{field}' has no value '{value}'. The allowed range is: [{min}, {max}].")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} value {value} is not number.")]
    NotNumeric { field: String, value: String },

    #[error("{0}")]
    State(String),

    #[error("Value '{value}' at {path} is not allowed. The allowed values are: {}.", join_allowed(.allowed))]
    InvalidValue {
        path: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{path} has no child named '{name}'")]
    UnknownChild { path: String, name: String },

    #[error("create() got an unexpected keyword argument '{0}'.")]
    UnexpectedArgument(String),

    #[error("{0} is read only.")]
    ReadOnly(String),

    #[error("Iso surface definition is incomplete.")]
    IncompleteIsoSurface,

    #[error("Surface creation is unsuccessful.")]
    SurfaceCreation,

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PostvizError>;
