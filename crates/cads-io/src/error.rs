use cads_dataset::{DataFormat, DataType, DatasetError};
use cads_types::Logger;

/// Errors from entry readers and writers.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The structure has no schema to derive a scan mode from.
    #[error("schema required for {0}")]
    MissingSchema(&'static str),

    /// The schema root type is neither `array` nor `object`.
    #[error("unsupported schema root type {0:?}")]
    UnsupportedRootType(String),

    /// No codec exists for the structure's format.
    #[error("no entry codec for data format '{0}'")]
    UnsupportedFormat(DataFormat),

    /// The format has no keyed representation.
    #[error("{0} data cannot be read or written in object mode")]
    ObjectModeUnsupported(DataFormat),

    /// The first token did not open the container the scan mode expects.
    #[error("expected opening '{expected}' for JSON {container}, found {found}")]
    UnexpectedOpening {
        expected: char,
        container: &'static str,
        found: String,
    },

    /// Input ended inside a container.
    #[error("did not find closing '{0}'")]
    Unterminated(char),

    /// Malformed JSON.
    #[error("invalid JSON at byte {offset}: {reason}")]
    Syntax { offset: u64, reason: String },

    /// An object-mode entry had no key.
    #[error("entry key cannot be empty")]
    EmptyKey,

    /// An object-mode entry reused a key already written.
    #[error("key already written: {0:?}")]
    DuplicateKey(String),

    /// The writer was used after `close`.
    #[error("write after close")]
    Closed,

    /// A row's cell count disagrees with the schema.
    #[error("row {row}: expected {expected} columns, got {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A cell or value does not fit its column type.
    #[error("row {row}, column {column}: cannot convert {value} to {data_type}")]
    Coerce {
        row: usize,
        column: usize,
        data_type: DataType,
        value: String,
    },

    /// A CSV entry whose value is not an array.
    #[error("entry {0}: CSV rows must be arrays")]
    NotARow(usize),

    /// Structure detection could not make sense of the sample.
    #[error("cannot detect structure: {0}")]
    Detect(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for codec operations.
pub type IoResult<T> = Result<T, IoError>;

/// Emit a debug event for a failed operation through `logger`.
pub(crate) fn traced<T>(logger: &Logger, op: &'static str, result: IoResult<T>) -> IoResult<T> {
    if let Err(e) = &result {
        logger.scope(|| tracing::debug!(op, error = %e, "entry codec error"));
    }
    result
}
