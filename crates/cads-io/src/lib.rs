//! Streaming entry codecs for dataset bodies.
//!
//! A body is read or written one top-level entry at a time, driven by the
//! [`Structure`](cads_dataset::Structure) that describes it. The schema's
//! root type picks the scan mode; the structure's format picks the codec.
//!
//! # Key Types
//!
//! - [`Entry`] -- one keyed or indexed value
//! - [`EntryReader`] / [`EntryWriter`] -- the pull and push halves of a codec
//! - [`JsonReader`] / [`JsonWriter`] -- incremental JSON arrays and objects
//! - [`CsvReader`] / [`CsvWriter`] -- typed CSV rows
//! - [`CrNormalizer`] -- stray carriage-return rewriting ahead of CSV parsing
//!
//! # Design Rules
//!
//! 1. End of a stream is `Ok(None)`, never an error.
//! 2. A writer's output is complete only after `close`.
//! 3. Codec errors carry the row or entry index they occurred at.
//! 4. JSON nested deeper than 128 containers is a syntax error.

pub mod delimited;
pub mod detect;
pub mod entry;
pub mod error;
pub mod json;
pub mod stream;

pub use delimited::{CrNormalizer, CsvReader, CsvWriter};
pub use detect::detect_structure;
pub use entry::{Direction, Entry, EntryReader, EntryWriter, ScanMode};
pub use error::{IoError, IoResult};
pub use json::{JsonReader, JsonWriter};
pub use stream::{copy_entries, each_entry, new_entry_reader, new_entry_writer};
