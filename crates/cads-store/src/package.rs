use std::fmt;

use cads_types::Address;

use crate::filestore::Filestore;

/// The files a dataset package is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackageFile {
    /// `dataset.json`, the only file required to constitute a dataset.
    Dataset,
    Structure,
    /// Abstract version of the dataset.
    Abstract,
    /// Directory of input datasets.
    Resources,
    Commit,
    Transform,
    AbstractTransform,
    Meta,
    VisConfig,
}

impl PackageFile {
    pub const ALL: [PackageFile; 9] = [
        Self::Dataset,
        Self::Structure,
        Self::Abstract,
        Self::Resources,
        Self::Commit,
        Self::Transform,
        Self::AbstractTransform,
        Self::Meta,
        Self::VisConfig,
    ];

    /// Canonical filename. These names are part of the storage format and
    /// never change.
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Dataset => "dataset.json",
            Self::Structure => "structure.json",
            Self::Abstract => "abstract.json",
            Self::Resources => "resources",
            Self::Commit => "commit.json",
            Self::Transform => "transform.json",
            Self::AbstractTransform => "abstract_transform.json",
            Self::Meta => "meta.json",
            Self::VisConfig => "vis_config.json",
        }
    }

    /// Reverse of [`PackageFile::filename`].
    pub fn from_filename(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pf| pf.filename() == name)
    }
}

impl fmt::Display for PackageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename())
    }
}

/// Path of a package file beneath `root` in `store`.
///
/// Prefixed stores address package files as `/<prefix>/<hash>/<filename>`,
/// where `<hash>` is the bare hash segment of `root`. Unprefixed stores use
/// `root` verbatim.
pub fn package_filepath<S: Filestore + ?Sized>(
    store: &S,
    root: &Address,
    file: PackageFile,
) -> Address {
    let prefix = store.path_prefix();
    if prefix.is_empty() {
        return root.clone();
    }
    Address::new(format!(
        "/{prefix}/{}/{}",
        root.hash_segment(prefix),
        file.filename()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryFilestore;

    #[test]
    fn filenames_are_fixed() {
        let expect = [
            (PackageFile::Dataset, "dataset.json"),
            (PackageFile::Structure, "structure.json"),
            (PackageFile::Commit, "commit.json"),
            (PackageFile::Meta, "meta.json"),
            (PackageFile::Transform, "transform.json"),
            (PackageFile::AbstractTransform, "abstract_transform.json"),
            (PackageFile::Abstract, "abstract.json"),
            (PackageFile::VisConfig, "vis_config.json"),
            (PackageFile::Resources, "resources"),
        ];
        for (pf, name) in expect {
            assert_eq!(pf.filename(), name);
            assert_eq!(PackageFile::from_filename(name), Some(pf));
        }
        assert_eq!(PackageFile::from_filename("data.csv"), None);
    }

    #[test]
    fn prefixed_paths_strip_to_hash() {
        let store = InMemoryFilestore::with_prefix("ipfs");
        let cases = [
            "/ipfs/QmHash",
            "ipfs/QmHash",
            "/ipfs/QmHash/dataset.json",
            "QmHash",
            "/QmHash/structure.json",
        ];
        for root in cases {
            assert_eq!(
                package_filepath(&store, &Address::new(root), PackageFile::Structure).as_str(),
                "/ipfs/QmHash/structure.json",
                "root {root}"
            );
        }
    }

    #[test]
    fn unprefixed_paths_are_verbatim() {
        let store = InMemoryFilestore::new();
        let root = Address::new("/map/QmHash");
        assert_eq!(package_filepath(&store, &root, PackageFile::Commit), root);
    }
}
