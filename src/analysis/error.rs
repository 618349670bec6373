//! Error type shared by the structure and complexity analyses

/// Errors surfaced by sequence validation, structure scoring and parameter loading.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ThermoError {
    /// A character outside `A|C|G|T` was found.
    #[error("invalid base '{base}' at position {position}, only A, C, G, T are allowed")]
    InvalidBase { base: char, position: usize },

    /// The sequence (or overlap window) is shorter than the structure requires.
    #[error("sequence too short: need at least {required} bases, got {actual}")]
    SequenceTooShort { required: usize, actual: usize },

    /// A structure without any comparable stem position reached the scorer.
    #[error("structure has no comparable stem region")]
    StructureTooShort,

    /// A nearest-neighbor lookup key is absent from the parameter table.
    #[error("nearest-neighbor parameter missing for key '{0}'")]
    MissingParameter(String),

    /// The aggregate entropy is zero (or nothing in the stem pairs).
    #[error("melting temperature undefined (total entropy {entropy} kcal/mol/K)")]
    UndefinedMeltingTemperature { entropy: f64 },

    /// The two overlap windows of a dimer differ in length.
    #[error("dimer overlap lengths differ: {first} vs {second}")]
    OverlapMismatch { first: usize, second: usize },

    /// A parameter set could not be deserialized.
    #[error("invalid parameter set: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, ThermoError>;

impl From<serde_json::Error> for ThermoError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidParameters(err.to_string())
    }
}
