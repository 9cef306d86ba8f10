//! Error types for the dataset crate.

/// Errors from decoding, validating or opening dataset components.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// JSON decoding failed.
    #[error("error decoding {component}: {source}")]
    Decode {
        component: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// JSON encoding failed.
    #[error("error encoding {component}: {source}")]
    Encode {
        component: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A kind tag did not have the `<type>:<version>` shape.
    #[error("invalid kind {0:?}")]
    InvalidKind(String),

    /// A data format name was not recognized.
    #[error("unknown data format {0:?}")]
    UnknownFormat(String),

    /// Format options did not match the declared format.
    #[error("invalid {format} format config: {reason}")]
    InvalidFormatConfig { format: String, reason: String },

    /// More than one of url, file or inline data was set.
    #[error("only one of url, file, or data can be set")]
    AmbiguousDataSource,

    /// A data source was set without a format.
    #[error("format is required for data source")]
    MissingFormat,

    /// No url, file or inline data was set.
    #[error("data source doesn't contain a url, file, or data field to read from")]
    NoDataSource,

    /// URL sources need an external fetcher.
    #[error("url data source {0} must be fetched by the caller")]
    UrlNotFetchable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for dataset results.
pub type DatasetResult<T> = Result<T, DatasetError>;
