//! CSV entry codec.
//!
//! Rows are array-mode entries. Cells are coerced to and from the column
//! types of a tabular schema.

use std::io::{self, Read, Write};
use std::str::FromStr;

use cads_dataset::{CsvOptions, DataFormat, DataType, Field, Structure};
use cads_types::Logger;
use serde_json::{Number, Value};

use crate::entry::{Direction, Entry, EntryReader, EntryWriter, ScanMode};
use crate::error::{traced, IoError, IoResult};

const CHUNK: usize = 8 * 1024;

/// Rewrites lone `\r` line endings to `\r\n`.
///
/// `\r\n` pairs pass through untouched, including pairs split across reads
/// of the inner source.
pub struct CrNormalizer<R> {
    inner: R,
    out: Vec<u8>,
    pos: usize,
    after_cr: bool,
    eof: bool,
}

impl<R: Read> CrNormalizer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            out: Vec::new(),
            pos: 0,
            after_cr: false,
            eof: false,
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.pos = 0;
        let mut chunk = [0u8; CHUNK];
        let n = self.inner.read(&mut chunk)?;
        if n == 0 {
            self.eof = true;
            if self.after_cr {
                self.out.push(b'\n');
                self.after_cr = false;
            }
            return Ok(());
        }
        for &b in &chunk[..n] {
            if self.after_cr {
                self.after_cr = false;
                self.out.push(b'\n');
                if b == b'\n' {
                    continue;
                }
            }
            self.out.push(b);
            self.after_cr = b == b'\r';
        }
        Ok(())
    }
}

impl<R: Read> Read for CrNormalizer<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.out.len() {
            if self.eof {
                return Ok(0);
            }
            self.refill()?;
        }
        let n = buf.len().min(self.out.len() - self.pos);
        buf[..n].copy_from_slice(&self.out[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn array_mode(structure: &Structure, direction: Direction) -> IoResult<()> {
    match ScanMode::from_structure(structure, direction)? {
        ScanMode::Array => Ok(()),
        ScanMode::Object => Err(IoError::ObjectModeUnsupported(DataFormat::Csv)),
    }
}

/// Convert one cell to its column type. Empty cells of non-string
/// columns become `null`.
fn coerce(cell: &str, data_type: DataType) -> Option<Value> {
    if cell.is_empty() && !matches!(data_type, DataType::String | DataType::Any) {
        return Some(Value::Null);
    }
    match data_type {
        DataType::String | DataType::Any => Some(Value::String(cell.to_string())),
        DataType::Integer => {
            let cell = cell.trim();
            cell.parse::<i64>()
                .map(Value::from)
                .or_else(|_| cell.parse::<u64>().map(Value::from))
                .ok()
        }
        DataType::Number => {
            let cell = cell.trim();
            Number::from_str(cell)
                .ok()
                .or_else(|| cell.parse::<f64>().ok().and_then(Number::from_f64))
                .map(Value::Number)
        }
        DataType::Boolean => parse_bool(cell.trim()).map(Value::Bool),
        DataType::Object => serde_json::from_str::<Value>(cell)
            .ok()
            .filter(Value::is_object),
        DataType::Array => serde_json::from_str::<Value>(cell)
            .ok()
            .filter(Value::is_array),
        DataType::Null => (cell == "null").then_some(Value::Null),
    }
}

/// Render one value as a cell of the given column type.
///
/// `null` renders as an empty cell in every column. String columns read an
/// empty cell back as `""`, so a `null` there does not survive a round trip.
fn render(value: &Value, data_type: DataType) -> Option<String> {
    match (data_type, value) {
        (_, Value::Null) => Some(String::new()),
        (DataType::String | DataType::Any, Value::String(s)) => Some(s.clone()),
        (DataType::String | DataType::Any, other) => Some(other.to_string()),
        (DataType::Integer, Value::Number(n)) => integer_cell(n),
        (DataType::Number, Value::Number(n)) => Some(n.to_string()),
        (DataType::Boolean, Value::Bool(b)) => Some(b.to_string()),
        (DataType::Object, Value::Object(_)) | (DataType::Array, Value::Array(_)) => {
            Some(value.to_string())
        }
        _ => None,
    }
}

/// Integral floats within `i64` range are written without a fraction.
fn integer_cell(n: &Number) -> Option<String> {
    if n.is_i64() || n.is_u64() {
        return Some(n.to_string());
    }
    // 2^63
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let f = n.as_f64()?;
    (f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then(|| (f as i64).to_string())
}

/// Boolean spellings accepted in cells.
pub(crate) fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ if cell.eq_ignore_ascii_case("true") => Some(true),
        _ if cell.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Reads rows of a CSV body as array-mode entries.
pub struct CsvReader<R: Read> {
    structure: Structure,
    fields: Vec<Field>,
    options: CsvOptions,
    rows: csv::Reader<CrNormalizer<R>>,
    record: csv::StringRecord,
    count: usize,
    logger: Logger,
}

impl<R: Read> CsvReader<R> {
    pub fn new(structure: Structure, reader: R) -> IoResult<Self> {
        array_mode(&structure, Direction::Read)?;
        let options = CsvOptions::from_config(structure.format_config.as_ref())?;
        let fields = structure
            .schema
            .as_ref()
            .map(|schema| schema.fields())
            .unwrap_or_default();
        let rows = csv::ReaderBuilder::new()
            .has_headers(options.header_row)
            .flexible(true)
            .from_reader(CrNormalizer::new(reader));
        Ok(Self {
            structure,
            fields,
            options,
            rows,
            record: csv::StringRecord::new(),
            count: 0,
            logger: Logger::default(),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Number of rows read so far, excluding any header row.
    pub fn count(&self) -> usize {
        self.count
    }

    fn next_row(&mut self) -> IoResult<Option<Entry>> {
        if !self.rows.read_record(&mut self.record)? {
            return Ok(None);
        }
        let row = self.count;
        let expected = self.fields.len();
        let actual = self.record.len();
        if expected > 0 && actual != expected && !self.options.variadic_fields {
            return Err(IoError::ColumnCount {
                row,
                expected,
                actual,
            });
        }

        let mut values = Vec::with_capacity(actual.max(expected));
        for (column, cell) in self.record.iter().enumerate() {
            let data_type = self
                .fields
                .get(column)
                .map(|f| f.data_type)
                .unwrap_or(DataType::Any);
            let value = coerce(cell, data_type).ok_or_else(|| IoError::Coerce {
                row,
                column,
                data_type,
                value: format!("{cell:?}"),
            })?;
            values.push(value);
        }
        values.resize(values.len().max(expected), Value::Null);

        self.count += 1;
        Ok(Some(Entry::indexed(row, Value::Array(values))))
    }
}

impl<R: Read> EntryReader for CsvReader<R> {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn read_entry(&mut self) -> IoResult<Option<Entry>> {
        let result = self.next_row();
        traced(&self.logger, "read csv row", result)
    }
}

/// Writes array-mode entries as CRLF-terminated CSV rows.
pub struct CsvWriter<W: Write> {
    structure: Structure,
    fields: Vec<Field>,
    options: CsvOptions,
    rows: csv::Writer<W>,
    count: usize,
    closed: bool,
    logger: Logger,
}

impl<W: Write> CsvWriter<W> {
    /// Create a writer, emitting the header row first when configured.
    pub fn new(structure: Structure, out: W) -> IoResult<Self> {
        array_mode(&structure, Direction::Write)?;
        let options = CsvOptions::from_config(structure.format_config.as_ref())?;
        let fields = structure
            .schema
            .as_ref()
            .map(|schema| schema.fields())
            .unwrap_or_default();
        let mut rows = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .flexible(options.variadic_fields)
            .from_writer(out);
        if options.header_row {
            rows.write_record(fields.iter().map(|f| f.title.as_str()))?;
        }
        Ok(Self {
            structure,
            fields,
            options,
            rows,
            count: 0,
            closed: false,
            logger: Logger::default(),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Number of rows written so far, excluding any header row.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Flush and give back the underlying sink.
    pub fn into_inner(self) -> IoResult<W> {
        self.rows
            .into_inner()
            .map_err(|e| IoError::Io(e.into_error()))
    }

    fn encode(&mut self, entry: &Entry) -> IoResult<()> {
        if self.closed {
            return Err(IoError::Closed);
        }
        let row = self.count;
        let Value::Array(items) = &entry.value else {
            return Err(IoError::NotARow(row));
        };
        let expected = self.fields.len();
        if expected > 0 && items.len() != expected && !self.options.variadic_fields {
            return Err(IoError::ColumnCount {
                row,
                expected,
                actual: items.len(),
            });
        }

        let mut cells = Vec::with_capacity(items.len());
        for (column, value) in items.iter().enumerate() {
            let data_type = self
                .fields
                .get(column)
                .map(|f| f.data_type)
                .unwrap_or(DataType::Any);
            let cell = render(value, data_type).ok_or_else(|| IoError::Coerce {
                row,
                column,
                data_type,
                value: value.to_string(),
            })?;
            cells.push(cell);
        }
        self.rows.write_record(&cells)?;
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> IoResult<()> {
        self.rows.flush()?;
        self.closed = true;
        Ok(())
    }
}

impl<W: Write> EntryWriter for CsvWriter<W> {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn write_entry(&mut self, entry: &Entry) -> IoResult<()> {
        let result = self.encode(entry);
        traced(&self.logger, "write csv row", result)
    }

    fn close(&mut self) -> IoResult<()> {
        let result = self.finish();
        traced(&self.logger, "close csv writer", result)
    }
}
