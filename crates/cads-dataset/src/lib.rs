//! Dataset component model.
//!
//! A dataset is split into named components (structure, commit, meta,
//! transform and vis config), each of which is stored as its own
//! content-addressed object. Every component has two JSON forms: a bare
//! string holding its address ([`Component::Reference`]) or the full object
//! ([`Component::Object`]).
//!
//! # Key Types
//!
//! - [`Dataset`] -- The aggregate, linked to its history by `previous_path`
//! - [`Structure`] -- Format, format config and schema of the raw data
//! - [`Commit`] -- Change record with a signable byte string
//! - [`Component`] -- Reference/object dual form
//! - [`Assign`] -- Field-by-field merge, last non-empty value wins
//! - [`Mismatch`] -- First differing field found by the `compare_*` functions

pub mod assign;
pub mod commit;
pub mod compare;
pub mod component;
pub mod dataset;
pub mod error;
pub mod format;
pub mod kind;
pub mod meta;
pub mod schema;
pub mod source;
pub mod structure;
pub mod transform;
pub mod vis_config;

pub use assign::Assign;
pub use commit::{Commit, User};
pub use compare::{
    compare_commits, compare_datasets, compare_metas, compare_string_slices, compare_structures,
    compare_transforms, compare_vis_configs, CompareResult, Mismatch,
};
pub use component::{Component, ComponentBody};
pub use dataset::Dataset;
pub use error::{DatasetError, DatasetResult};
pub use format::{CsvOptions, DataFormat, FormatConfig};
pub use kind::Kind;
pub use meta::{Citation, License, Meta};
pub use schema::{DataType, Field, Schema};
pub use source::DataSource;
pub use structure::Structure;
pub use transform::Transform;
pub use vis_config::VisConfig;

pub use cads_types::Address;
