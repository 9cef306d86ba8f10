use cads_types::Address;

use crate::error::StoreResult;

/// A named blob handed to a [`Filestore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct File {
    pub name: String,
    pub data: Vec<u8>,
}

impl File {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Content-addressable file storage.
///
/// Implementations must satisfy these invariants:
/// - Content is immutable once written. Putting the same file twice returns
///   the same address.
/// - Concurrent reads are always safe.
/// - The store never interprets file contents.
pub trait Filestore: Send + Sync {
    /// Store a file and return its content address. `pin` asks the store to
    /// keep the file from garbage collection.
    fn put(&self, file: &File, pin: bool) -> StoreResult<Address>;

    /// Fetch the bytes stored at `path`.
    ///
    /// Returns `StoreError::NotFound` if nothing is stored there.
    fn get(&self, path: &Address) -> StoreResult<Vec<u8>>;

    /// Check whether anything is stored at `path`.
    fn has(&self, path: &Address) -> StoreResult<bool> {
        match self.get(path) {
            Ok(_) => Ok(true),
            Err(crate::StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Addressing scheme identifier, such as `ipfs`, or empty for stores
    /// whose addresses are used verbatim.
    fn path_prefix(&self) -> &str;
}
