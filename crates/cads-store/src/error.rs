use cads_types::Address;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Errors from filestore and package operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is stored at the requested path.
    #[error("path not found: {0}")]
    NotFound(Address),

    /// A package file could not be fetched or decoded.
    #[error("error loading {kind} file: {source}")]
    Load {
        kind: &'static str,
        #[source]
        source: Cause,
    },

    /// A component could not be encoded or written.
    #[error("error saving json {kind} file: {source}")]
    Save {
        kind: &'static str,
        #[source]
        source: Cause,
    },

    /// A `previous_path` link does not resolve to a dataset.
    #[error("previous path {path} does not resolve: {source}")]
    BrokenHistory {
        path: Address,
        #[source]
        source: Box<StoreError>,
    },

    /// The dataset has no data path to load from.
    #[error("dataset has no data path")]
    NoDataPath,

    /// Package configuration could not be parsed.
    #[error("invalid package config: {0}")]
    Config(#[from] toml::de::Error),

    /// A component could not be hashed.
    #[error(transparent)]
    Hash(#[from] cads_hash::HashError),
}

impl StoreError {
    pub(crate) fn load(kind: &'static str, source: impl Into<Cause>) -> Self {
        Self::Load {
            kind,
            source: source.into(),
        }
    }

    pub(crate) fn save(kind: &'static str, source: impl Into<Cause>) -> Self {
        Self::Save {
            kind,
            source: source.into(),
        }
    }

    /// Returns `true` if this error, or the load failure it wraps, is a
    /// missing path.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Load { source, .. } => source
                .downcast_ref::<StoreError>()
                .is_some_and(StoreError::is_not_found),
            Self::BrokenHistory { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
