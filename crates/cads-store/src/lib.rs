//! Package storage for content-addressed datasets.
//!
//! A dataset is persisted as a set of package files, one per component,
//! each written to a content-addressable [`Filestore`] and referenced from
//! `dataset.json` by address. Versions link to their predecessor through
//! `previous_path`, forming an immutable history.
//!
//! # Key Types
//!
//! - [`Filestore`] -- the consumed put/get/path-prefix contract
//! - [`InMemoryFilestore`] -- `HashMap`-based store for tests and embedding
//! - [`PackageFile`] -- canonical package filenames
//! - [`PackageStore`] -- per-component save/load, dataset history and raw data
//! - [`PackageConfig`] -- pinning, history checks and walk limits
//!
//! # Design Rules
//!
//! 1. Components are always saved in their object form.
//! 2. Package filenames are part of the storage format and never change.
//! 3. Load failures name the component and wrap the underlying cause.

pub mod config;
pub mod error;
pub mod filestore;
pub mod memory;
pub mod package;
pub mod store;

pub use config::PackageConfig;
pub use error::{StoreError, StoreResult};
pub use filestore::{File, Filestore};
pub use memory::InMemoryFilestore;
pub use package::{package_filepath, PackageFile};
pub use store::{PackageComponent, PackageStore};
