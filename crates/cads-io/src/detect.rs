use std::io::{BufRead, BufReader, Read};

use cads_dataset::{CsvOptions, DataFormat, DataType, Field, FormatConfig, Kind, Schema, Structure};

use crate::delimited::CrNormalizer;
use crate::error::{IoError, IoResult};

/// Rows inspected when inferring CSV column types.
const SAMPLE_ROWS: usize = 500;

/// Derive a structure for raw data in `format`.
///
/// JSON is classified by its opening delimiter. CSV is sampled to infer
/// column types, titles and whether the first row is a header.
pub fn detect_structure(format: DataFormat, reader: impl Read) -> IoResult<Structure> {
    let mut structure = match format {
        DataFormat::Json => detect_json(reader)?,
        DataFormat::Csv => detect_csv(reader)?,
        other => return Err(IoError::UnsupportedFormat(other)),
    };
    structure.format = format;
    structure.kind = Kind::structure();
    Ok(structure)
}

fn detect_json(reader: impl Read) -> IoResult<Structure> {
    let mut reader = BufReader::new(reader);
    loop {
        let buf = reader.fill_buf()?;
        let Some(pos) = buf.iter().position(|b| !b.is_ascii_whitespace()) else {
            if buf.is_empty() {
                return Err(IoError::Detect("empty JSON input".into()));
            }
            let n = buf.len();
            reader.consume(n);
            continue;
        };
        let schema = match buf[pos] {
            b'[' => Schema::array(),
            b'{' => Schema::object(),
            other => {
                return Err(IoError::Detect(format!(
                    "JSON data must start with '[' or '{{', found {:?}",
                    other as char
                )))
            }
        };
        return Ok(Structure {
            schema: Some(schema),
            ..Default::default()
        });
    }
}

fn detect_csv(reader: impl Read) -> IoResult<Structure> {
    let mut rows = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(CrNormalizer::new(reader));
    let mut sample: Vec<Vec<String>> = Vec::new();
    for record in rows.records().take(SAMPLE_ROWS) {
        sample.push(record?.iter().map(str::to_string).collect());
    }
    let Some(first) = sample.first() else {
        return Err(IoError::Detect("no CSV rows to sample".into()));
    };

    let header_row = sample.len() > 1 && looks_like_header(first, &sample[1..]);
    let body = if header_row { &sample[1..] } else { &sample[..] };
    let width = sample.iter().map(Vec::len).max().unwrap_or_default();

    let fields: Vec<Field> = (0..width)
        .map(|column| {
            let title = if header_row {
                first
                    .get(column)
                    .map(|t| column_title(t))
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| default_title(column))
            } else {
                default_title(column)
            };
            Field::new(title, column_type(body.iter().filter_map(|row| row.get(column))))
        })
        .collect();

    let format_config = header_row.then(|| {
        FormatConfig::from(CsvOptions {
            header_row: true,
            ..Default::default()
        })
    });
    Ok(Structure {
        format_config,
        schema: Some(Schema::tabular(&fields)),
        ..Default::default()
    })
}

/// A first row is a header when every cell is a non-empty plain string and
/// either some column holds typed data below it, or none of its titles
/// reappear in their column.
fn looks_like_header(first: &[String], rest: &[Vec<String>]) -> bool {
    if first
        .iter()
        .any(|cell| cell.trim().is_empty() || cell_type(cell) != DataType::String)
    {
        return false;
    }
    let typed_below = (0..first.len()).any(|column| {
        column_type(rest.iter().filter_map(|row| row.get(column))) != DataType::String
    });
    let repeated = first.iter().enumerate().any(|(column, title)| {
        rest.iter()
            .any(|row| row.get(column).is_some_and(|cell| cell == title))
    });
    typed_below || !repeated
}

fn cell_type(cell: &str) -> DataType {
    let cell = cell.trim();
    if cell.parse::<i64>().is_ok() {
        DataType::Integer
    } else if cell.parse::<f64>().is_ok_and(f64::is_finite) {
        DataType::Number
    } else if cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false") {
        DataType::Boolean
    } else if cell.starts_with('{') && serde_json::from_str::<serde_json::Value>(cell).is_ok() {
        DataType::Object
    } else if cell.starts_with('[') && serde_json::from_str::<serde_json::Value>(cell).is_ok() {
        DataType::Array
    } else {
        DataType::String
    }
}

/// The single type shared by all non-empty cells. Integers widen to numbers;
/// anything else mixed, or nothing at all, is a string.
fn column_type<'a>(cells: impl Iterator<Item = &'a String>) -> DataType {
    let mut found: Option<DataType> = None;
    for cell in cells.filter(|c| !c.trim().is_empty()) {
        let t = cell_type(cell);
        found = Some(match (found, t) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Integer), DataType::Number)
            | (Some(DataType::Number), DataType::Integer) => DataType::Number,
            _ => return DataType::String,
        });
    }
    found.unwrap_or(DataType::String)
}

/// Lowercase, runs of whitespace and dashes to `_`, other symbols dropped.
fn column_title(raw: &str) -> String {
    let mut title = String::with_capacity(raw.len());
    let mut gap = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() || c == '-' {
            gap = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if gap && !title.is_empty() {
            title.push('_');
        }
        gap = false;
        title.push(c.to_ascii_lowercase());
    }
    title
}

fn default_title(column: usize) -> String {
    format!("field_{}", column + 1)
}
