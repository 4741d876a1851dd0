use thiserror::Error;

/// Main error type for the AWJ optimizer
#[derive(Error, Debug)]
pub enum AwjError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AwjError {
    /// True for errors raised by input validation, before any search begins.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Input validation errors, raised before any search begins
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid bounds for {parameter} [{low}, {high}]: {reason}")]
    InvalidBounds {
        parameter: String,
        low: f64,
        high: f64,
        reason: String,
    },

    #[error("Desired depth must be finite and positive, got {depth}")]
    NonPositiveDepth { depth: f64 },

    #[error("Fixed input count mismatch: model expects {expected}, got {actual}")]
    FixedInputCount { expected: usize, actual: usize },

    #[error("Invalid fixed input {name}: {message}")]
    InvalidFixedInput { name: String, message: String },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Missing range for parameter: {name}")]
    MissingParameter { name: String },

    #[error("Parameter specified more than once: {name}")]
    DuplicateParameter { name: String },

    #[error("Parameter space is empty")]
    EmptySpace,

    #[error("{0}")]
    Other(String),
}

/// Depth model failures; fatal for the run that hit them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model produced a non-finite prediction (depth {depth}, cost {secondary_cost}) for {genes:?}")]
    NonFinite {
        depth: f64,
        secondary_cost: f64,
        genes: Vec<f64>,
    },

    #[error("Model produced a negative secondary cost {secondary_cost} for {genes:?}")]
    NegativeCost { secondary_cost: f64, genes: Vec<f64> },

    #[error("Model expects {expected} parameters, got {actual}")]
    Dimension { expected: usize, actual: usize },
}

/// Result type alias for optimizer operations
pub type AwjResult<T> = Result<T, AwjError>;

/// Macro for creating free-form validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::AwjError::Validation($crate::ValidationError::Other(format!($($arg)*)))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::AwjError::Config(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::AwjError::Internal(format!($($arg)*))
    };
}
