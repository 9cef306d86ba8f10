use cads_dataset::{
    Commit, Component, ComponentBody, Dataset, Meta, Structure, Transform, VisConfig,
};
use cads_hash::ContentHasher;
use cads_types::{Address, Logger};

use crate::config::PackageConfig;
use crate::error::{StoreError, StoreResult};
use crate::filestore::{File, Filestore};
use crate::package::{package_filepath, PackageFile};

/// A component stored in its own package file.
pub trait PackageComponent: ComponentBody {
    const FILE: PackageFile;
}

impl PackageComponent for Dataset {
    const FILE: PackageFile = PackageFile::Dataset;
}

impl PackageComponent for Structure {
    const FILE: PackageFile = PackageFile::Structure;
}

impl PackageComponent for Commit {
    const FILE: PackageFile = PackageFile::Commit;
}

impl PackageComponent for Meta {
    const FILE: PackageFile = PackageFile::Meta;
}

impl PackageComponent for Transform {
    const FILE: PackageFile = PackageFile::Transform;
}

impl PackageComponent for VisConfig {
    const FILE: PackageFile = PackageFile::VisConfig;
}

/// Saves and loads dataset components as package files in a [`Filestore`].
///
/// Every component is written in its JSON object form and addressed by
/// content. Loading derives the package file path from the address and the
/// store's path prefix.
pub struct PackageStore<'s, S: Filestore + ?Sized> {
    store: &'s S,
    config: PackageConfig,
    hasher: ContentHasher,
    logger: Logger,
}

impl<'s, S: Filestore + ?Sized> PackageStore<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            config: PackageConfig::default(),
            hasher: ContentHasher::default(),
            logger: Logger::default(),
        }
    }

    pub fn with_config(mut self, config: PackageConfig) -> Self {
        self.config = config;
        self
    }

    /// Hash component content with `hasher`. It should match the
    /// filestore's own hash function.
    pub fn with_hasher(mut self, hasher: ContentHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn filestore(&self) -> &S {
        self.store
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    fn logged<T>(
        &self,
        op: &'static str,
        path: &Address,
        f: impl FnOnce() -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.logger.scope(|| {
            let result = f();
            if let Err(e) = &result {
                tracing::debug!(op, %path, error = %e, "package operation failed");
            }
            result
        })
    }

    /// Save a component to its canonical package file.
    pub fn save<T: PackageComponent>(&self, value: &T) -> StoreResult<Address> {
        self.save_file(T::FILE, value)
    }

    /// Save a component under an explicit package file, such as a
    /// transform saved as [`PackageFile::AbstractTransform`].
    pub fn save_file<T: ComponentBody>(&self, file: PackageFile, value: &T) -> StoreResult<Address> {
        let empty = Address::default();
        self.logged("save", value.path().unwrap_or(&empty), || {
            let data = serde_json::to_vec(value).map_err(|e| StoreError::save(T::NAME, e))?;
            let content = value.content_address(&self.hasher)?;
            let address = self
                .store
                .put(&File::new(file.filename(), data), self.config.pin)?;
            tracing::debug!(component = T::NAME, %address, %content, "saved package file");
            Ok(address)
        })
    }

    /// Load a component from its canonical package file beneath `path`.
    pub fn load<T: PackageComponent>(&self, path: &Address) -> StoreResult<T> {
        self.load_file(T::FILE, path)
    }

    /// Load a component from an explicit package file beneath `path`. The
    /// loaded value carries `path`.
    pub fn load_file<T: ComponentBody>(&self, file: PackageFile, path: &Address) -> StoreResult<T> {
        self.logged("load", path, || {
            let key = package_filepath(self.store, path, file);
            let data = self
                .store
                .get(&key)
                .map_err(|e| StoreError::load(T::NAME, e))?;
            let mut value = Component::<T>::from_json(&data)
                .map_err(|e| StoreError::load(T::NAME, e))?
                .into_object();
            value.set_path(Some(path.clone()));
            Ok(value)
        })
    }

    /// Save a dataset and every component it holds as an object.
    ///
    /// Populated components are written to their own package files and
    /// replaced by references; empty ones are dropped. An abstract copy is
    /// derived from the structure when none is set. With
    /// `check_previous`, a `previous_path` that does not load is an error.
    pub fn save_dataset(&self, ds: &Dataset) -> StoreResult<Address> {
        let empty = Address::default();
        self.logged("save_dataset", ds.path().unwrap_or(&empty), || {
            if self.config.check_previous && !ds.previous_path.is_empty() {
                self.load_dataset_refs(&ds.previous_path)
                    .map_err(|e| StoreError::BrokenHistory {
                        path: ds.previous_path.clone(),
                        source: Box::new(e),
                    })?;
            }

            let mut out = ds.clone();
            out.path = None;
            if out.r#abstract.is_none() && ds.structure().is_some() {
                out.r#abstract = Some(Box::new(Component::Object(ds.abstract_copy())));
            }

            out.structure = self.save_component(PackageFile::Structure, out.structure.take())?;
            out.commit = self.save_component(PackageFile::Commit, out.commit.take())?;
            out.meta = self.save_component(PackageFile::Meta, out.meta.take())?;
            out.transform = self.save_component(PackageFile::Transform, out.transform.take())?;
            out.abstract_transform = self.save_component(
                PackageFile::AbstractTransform,
                out.abstract_transform.take(),
            )?;
            out.vis_config = self.save_component(PackageFile::VisConfig, out.vis_config.take())?;
            out.r#abstract = self
                .save_component(PackageFile::Abstract, out.r#abstract.take().map(|b| *b))?
                .map(Box::new);

            let address = self.save(&out)?;
            tracing::debug!(%address, "saved dataset");
            Ok(address)
        })
    }

    fn save_component<T: ComponentBody>(
        &self,
        file: PackageFile,
        component: Option<Component<T>>,
    ) -> StoreResult<Option<Component<T>>> {
        match component {
            Some(Component::Object(value)) if value.is_empty() => Ok(None),
            Some(Component::Object(value)) => {
                let address = self.save_file(file, &value)?;
                Ok(Some(Component::Reference(address)))
            }
            other => Ok(other),
        }
    }

    /// Load a dataset, leaving its components as references.
    pub fn load_dataset_refs(&self, path: &Address) -> StoreResult<Dataset> {
        self.load(path)
    }

    /// Load a dataset and dereference every component reference it holds.
    pub fn load_dataset(&self, path: &Address) -> StoreResult<Dataset> {
        let mut ds = self.load_dataset_refs(path)?;
        ds.structure = self.deref(PackageFile::Structure, ds.structure.take())?;
        ds.commit = self.deref(PackageFile::Commit, ds.commit.take())?;
        ds.meta = self.deref(PackageFile::Meta, ds.meta.take())?;
        ds.transform = self.deref(PackageFile::Transform, ds.transform.take())?;
        ds.abstract_transform =
            self.deref(PackageFile::AbstractTransform, ds.abstract_transform.take())?;
        ds.vis_config = self.deref(PackageFile::VisConfig, ds.vis_config.take())?;
        ds.r#abstract = self
            .deref(PackageFile::Abstract, ds.r#abstract.take().map(|b| *b))?
            .map(Box::new);
        Ok(ds)
    }

    fn deref<T: ComponentBody>(
        &self,
        file: PackageFile,
        component: Option<Component<T>>,
    ) -> StoreResult<Option<Component<T>>> {
        match component {
            Some(Component::Reference(path)) => {
                Ok(Some(Component::Object(self.load_file(file, &path)?)))
            }
            other => Ok(other),
        }
    }

    /// Walk the history chain starting at `path`, newest first, returning at
    /// most `max_history` versions with components left as references.
    pub fn load_history(&self, path: &Address) -> StoreResult<Vec<Dataset>> {
        let mut history = Vec::new();
        let mut next = path.clone();
        while !next.is_empty() && history.len() < self.config.max_history {
            let ds = if history.is_empty() {
                self.load_dataset_refs(&next)?
            } else {
                self.load_dataset_refs(&next)
                    .map_err(|e| StoreError::BrokenHistory {
                        path: next.clone(),
                        source: Box::new(e),
                    })?
            };
            next = ds.previous_path.clone();
            history.push(ds);
        }
        Ok(history)
    }

    /// Store a dataset's raw data. The returned address is a suitable
    /// `data_path`.
    pub fn save_data(&self, file: &File) -> StoreResult<Address> {
        let address = self.store.put(file, self.config.pin)?;
        if self.store.path_prefix().is_empty() {
            Ok(address)
        } else {
            Ok(address.join(&file.name))
        }
    }

    /// Fetch the raw data a dataset's `data_path` points at.
    pub fn load_data(&self, ds: &Dataset) -> StoreResult<Vec<u8>> {
        if ds.data_path.is_empty() {
            return Err(StoreError::NoDataPath);
        }
        self.logged("load_data", &ds.data_path, || {
            self.store
                .get(&ds.data_path)
                .map_err(|e| StoreError::load("data", e))
        })
    }
}
