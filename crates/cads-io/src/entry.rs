use cads_dataset::{DataFormat, Structure};
use serde_json::Value;

use crate::error::{IoError, IoResult};

/// One top-level element of a dataset body.
///
/// Array-mode entries carry an `index`, object-mode entries a `key`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry {
    pub key: Option<String>,
    pub index: Option<usize>,
    pub value: Value,
}

impl Entry {
    /// An array-mode entry at position `index`.
    pub fn indexed(index: usize, value: Value) -> Self {
        Self {
            key: None,
            index: Some(index),
            value,
        }
    }

    /// An object-mode entry under `key`.
    pub fn keyed(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: Some(key.into()),
            index: None,
            value,
        }
    }
}

/// Whether a codec decodes or encodes entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// How the top level of a body is scanned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanMode {
    Array,
    Object,
}

impl ScanMode {
    /// Derive the scan mode from the root type of the structure's schema.
    pub fn from_structure(structure: &Structure, direction: Direction) -> IoResult<Self> {
        let schema = structure
            .schema
            .as_ref()
            .ok_or(IoError::MissingSchema(codec_name(structure.format, direction)))?;
        match schema.root_type() {
            Some("array") => Ok(Self::Array),
            Some("object") => Ok(Self::Object),
            other => Err(IoError::UnsupportedRootType(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub(crate) fn open(self) -> char {
        match self {
            Self::Array => '[',
            Self::Object => '{',
        }
    }

    pub(crate) fn close(self) -> char {
        match self {
            Self::Array => ']',
            Self::Object => '}',
        }
    }

    pub(crate) fn container(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

fn codec_name(format: DataFormat, direction: Direction) -> &'static str {
    match (format, direction) {
        (DataFormat::Csv, Direction::Read) => "CSV reader",
        (DataFormat::Csv, Direction::Write) => "CSV writer",
        (_, Direction::Read) => "JSON reader",
        (_, Direction::Write) => "JSON writer",
    }
}

/// A stream of entries decoded from a byte source.
pub trait EntryReader {
    /// The structure this reader decodes against.
    fn structure(&self) -> &Structure;

    /// Decode the next entry. `Ok(None)` marks the end of the sequence.
    fn read_entry(&mut self) -> IoResult<Option<Entry>>;
}

/// A sink encoding entries into a byte stream.
pub trait EntryWriter {
    fn structure(&self) -> &Structure;

    fn write_entry(&mut self, entry: &Entry) -> IoResult<()>;

    /// Finish the encoding and flush the sink. Further writes fail.
    fn close(&mut self) -> IoResult<()>;
}

impl<R: EntryReader + ?Sized> EntryReader for Box<R> {
    fn structure(&self) -> &Structure {
        (**self).structure()
    }

    fn read_entry(&mut self) -> IoResult<Option<Entry>> {
        (**self).read_entry()
    }
}

impl<W: EntryWriter + ?Sized> EntryWriter for Box<W> {
    fn structure(&self) -> &Structure {
        (**self).structure()
    }

    fn write_entry(&mut self, entry: &Entry) -> IoResult<()> {
        (**self).write_entry(entry)
    }

    fn close(&mut self) -> IoResult<()> {
        (**self).close()
    }
}
