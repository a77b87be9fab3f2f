use seaforge_schemas::{region::IngestionMode, region::RegionKey, time::TimeKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeaweedError {
    #[error("{quantity} has the value {value}, expected {min} <= {quantity} <= {max}")]
    OutOfRange {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Factor '{name}' has the value {value}, expected 0 <= factor <= 1")]
    FactorOutOfRange { name: &'static str, value: f64 },

    #[error("Section {region} is {actual}, but this step requires {required}")]
    Precondition {
        region: RegionKey,
        required: &'static str,
        actual: &'static str,
    },

    #[error("Model already holds {0} data; a model accepts exactly one ingestion")]
    AlreadyIngested(IngestionMode),

    #[error("Column '{column}' has {found} values, expected {expected} to match the time index")]
    MisalignedSeries {
        column: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Time index contains '{0}' more than once")]
    DuplicateTimeKey(TimeKey),

    #[error("No data for section {0}")]
    RegionNotFound(RegionKey),

    #[error("Section {region} has no row for '{key}'")]
    TimeKeyNotFound { region: RegionKey, key: String },

    #[error("Section {region} has no column '{column}'")]
    ColumnNotFound { region: RegionKey, column: String },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Model has no sections")]
    EmptyModel,

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to write JSON: {0}")]
    JsonWriting(#[from] serde_json::Error),

    #[error("Invalid data in '{path}': {reason}")]
    InvalidData { path: String, reason: String },

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}

pub type SeaweedResult<T> = Result<T, SeaweedError>;
