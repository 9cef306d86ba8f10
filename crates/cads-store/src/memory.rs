use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use cads_hash::ContentHasher;
use cads_types::Address;

use crate::error::{StoreError, StoreResult};
use crate::filestore::{File, Filestore};

/// In-memory, HashMap-based filestore.
///
/// Intended for tests and embedding. Without a path prefix every file is
/// stored flat at `/map/<hash>`. With a prefix each file is wrapped in a
/// one-entry directory: `put` returns `/<prefix>/<dir-hash>` and the bytes
/// live at `/<prefix>/<dir-hash>/<name>`, the layout package paths expect.
pub struct InMemoryFilestore {
    prefix: String,
    hasher: ContentHasher,
    files: RwLock<HashMap<Address, Vec<u8>>>,
    pinned: RwLock<HashSet<Address>>,
}

impl InMemoryFilestore {
    /// Create an empty, unprefixed store.
    pub fn new() -> Self {
        Self::with_prefix("")
    }

    /// Create an empty store using the given path prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            hasher: ContentHasher::default(),
            files: RwLock::new(HashMap::new()),
            pinned: RwLock::new(HashSet::new()),
        }
    }

    /// Use `hasher` for addresses instead of the default SHA2-256.
    pub fn hasher(mut self, hasher: ContentHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the file put at `path` was pinned.
    pub fn is_pinned(&self, path: &Address) -> bool {
        self.pinned
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<Address> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<Address> = files.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for InMemoryFilestore {
    fn default() -> Self {
        Self::new()
    }
}

impl Filestore for InMemoryFilestore {
    fn put(&self, file: &File, pin: bool) -> StoreResult<Address> {
        let content = self.hasher.hash_bytes(&file.data);
        let (address, key) = if self.prefix.is_empty() {
            let address = Address::new(format!("/map/{content}"));
            (address.clone(), address)
        } else {
            let dir = self
                .hasher
                .hash_bytes(format!("{}\n{content}", file.name).as_bytes());
            let address = Address::new(format!("/{}/{dir}", self.prefix));
            let key = address.join(&file.name);
            (address, key)
        };

        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| file.data.clone());
        if pin {
            self.pinned
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(address.clone());
        }
        tracing::debug!(%address, bytes = file.data.len(), pin, "put file");
        Ok(address)
    }

    fn get(&self, path: &Address) -> StoreResult<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    fn path_prefix(&self) -> &str {
        &self.prefix
    }
}

impl std::fmt::Debug for InMemoryFilestore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryFilestore")
            .field("prefix", &self.prefix)
            .field("file_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Unprefixed
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = InMemoryFilestore::new();
        let path = store.put(&File::new("a.txt", "hello"), false).unwrap();
        assert!(path.as_str().starts_with("/map/Qm"));
        assert_eq!(store.get(&path).unwrap(), b"hello");
        assert!(store.has(&path).unwrap());
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryFilestore::new();
        let a = store.put(&File::new("a", "same"), false).unwrap();
        let b = store.put(&File::new("b", "same"), false).unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_path_is_not_found() {
        let store = InMemoryFilestore::new();
        let err = store.get(&Address::new("/map/QmNope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!store.has(&Address::new("/map/QmNope")).unwrap());
    }

    #[test]
    fn pin_is_recorded() {
        let store = InMemoryFilestore::new();
        let pinned = store.put(&File::new("a", "x"), true).unwrap();
        let loose = store.put(&File::new("b", "y"), false).unwrap();
        assert!(store.is_pinned(&pinned));
        assert!(!store.is_pinned(&loose));
    }

    // -----------------------------------------------------------------------
    // Prefixed
    // -----------------------------------------------------------------------

    #[test]
    fn prefixed_put_wraps_in_directory() {
        let store = InMemoryFilestore::with_prefix("ipfs");
        let dir = store
            .put(&File::new("structure.json", "{}"), false)
            .unwrap();
        assert!(dir.as_str().starts_with("/ipfs/Qm"));
        assert!(matches!(store.get(&dir), Err(StoreError::NotFound(_))));
        assert_eq!(store.get(&dir.join("structure.json")).unwrap(), b"{}");
    }

    #[test]
    fn prefixed_directory_depends_on_name() {
        let store = InMemoryFilestore::with_prefix("ipfs");
        let a = store.put(&File::new("a.json", "{}"), false).unwrap();
        let b = store.put(&File::new("b.json", "{}"), false).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn blake3_hasher_changes_addresses() {
        let sha = InMemoryFilestore::new();
        let b3 = InMemoryFilestore::new().hasher(ContentHasher::BLAKE3);
        let file = File::new("a", "data");
        assert_ne!(sha.put(&file, false).unwrap(), b3.put(&file, false).unwrap());
    }
}
