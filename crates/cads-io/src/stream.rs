use std::io::{Read, Write};

use cads_dataset::{DataFormat, Structure};
use cads_types::Logger;

use crate::delimited::{CsvReader, CsvWriter};
use crate::entry::{Entry, EntryReader, EntryWriter};
use crate::error::{IoError, IoResult};
use crate::json::{JsonReader, JsonWriter};

/// Build the reader for `structure.format` over `reader`.
pub fn new_entry_reader<'a, R: Read + 'a>(
    structure: &Structure,
    reader: R,
    logger: &Logger,
) -> IoResult<Box<dyn EntryReader + 'a>> {
    let structure = structure.clone();
    Ok(match structure.format {
        DataFormat::Json => Box::new(JsonReader::new(structure, reader)?.with_logger(logger.clone())),
        DataFormat::Csv => Box::new(CsvReader::new(structure, reader)?.with_logger(logger.clone())),
        other => return Err(IoError::UnsupportedFormat(other)),
    })
}

/// Build the writer for `structure.format` over `out`.
pub fn new_entry_writer<'a, W: Write + 'a>(
    structure: &Structure,
    out: W,
    logger: &Logger,
) -> IoResult<Box<dyn EntryWriter + 'a>> {
    let structure = structure.clone();
    Ok(match structure.format {
        DataFormat::Json => Box::new(JsonWriter::new(structure, out)?.with_logger(logger.clone())),
        DataFormat::Csv => Box::new(CsvWriter::new(structure, out)?.with_logger(logger.clone())),
        other => return Err(IoError::UnsupportedFormat(other)),
    })
}

/// Visit every entry with its ordinal. Stops at the first error from the
/// reader or from `f`. Returns the number of entries visited.
pub fn each_entry<R, F>(reader: &mut R, mut f: F) -> IoResult<usize>
where
    R: EntryReader + ?Sized,
    F: FnMut(usize, Entry) -> IoResult<()>,
{
    let mut n = 0;
    while let Some(entry) = reader.read_entry()? {
        f(n, entry)?;
        n += 1;
    }
    Ok(n)
}

/// Pipe every entry of `reader` into `writer`. The writer is left open.
pub fn copy_entries<R, W>(reader: &mut R, writer: &mut W) -> IoResult<usize>
where
    R: EntryReader + ?Sized,
    W: EntryWriter + ?Sized,
{
    each_entry(reader, |_, entry| writer.write_entry(&entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cads_dataset::{CsvOptions, DataType, Field, FormatConfig, Schema};
    use serde_json::json;

    fn tabular(format: DataFormat) -> Structure {
        Structure {
            format,
            schema: Some(Schema::tabular(&[
                Field::new("city", DataType::String),
                Field::new("pop", DataType::Integer),
            ])),
            ..Default::default()
        }
    }

    #[test]
    fn copies_csv_into_json() {
        let input = "toronto,2800000\r\nnew york,8500000\r\n";
        let mut reader = new_entry_reader(&tabular(DataFormat::Csv), input.as_bytes(), &Logger::default()).unwrap();
        let mut out = Vec::new();
        {
            let mut writer = new_entry_writer(&tabular(DataFormat::Json), &mut out, &Logger::default()).unwrap();
            assert_eq!(copy_entries(&mut reader, &mut writer).unwrap(), 2);
            writer.close().unwrap();
        }
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&out).unwrap(),
            json!([["toronto", 2800000], ["new york", 8500000]])
        );
    }

    #[test]
    fn copies_json_into_csv_with_header() {
        let mut csv = tabular(DataFormat::Csv);
        csv.format_config = Some(FormatConfig::from(CsvOptions {
            header_row: true,
            ..Default::default()
        }));
        let input = r#"[["a", 1], ["b", 2]]"#;
        let mut reader = new_entry_reader(&tabular(DataFormat::Json), input.as_bytes(), &Logger::default()).unwrap();
        let mut out = Vec::new();
        {
            let mut writer = new_entry_writer(&csv, &mut out, &Logger::default()).unwrap();
            copy_entries(&mut reader, &mut writer).unwrap();
            writer.close().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "city,pop\r\na,1\r\nb,2\r\n");
    }

    #[test]
    fn each_entry_passes_ordinals() {
        let mut reader = new_entry_reader(
            &Structure {
                format: DataFormat::Json,
                schema: Some(Schema::object()),
                ..Default::default()
            },
            &br#"{"x": 1, "y": 2}"#[..],
            &Logger::default(),
        )
        .unwrap();
        let mut seen = Vec::new();
        let n = each_entry(&mut reader, |i, entry| {
            seen.push((i, entry.key.unwrap_or_default()));
            Ok(())
        })
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(seen, vec![(0, "x".to_string()), (1, "y".to_string())]);
    }

    #[test]
    fn callback_errors_stop_iteration() {
        let mut reader =
            new_entry_reader(&tabular(DataFormat::Json), &b"[1,2,3]"[..], &Logger::default()).unwrap();
        let mut calls = 0;
        let err = each_entry(&mut reader, |_, _| {
            calls += 1;
            Err(IoError::Closed)
        })
        .unwrap_err();
        assert!(matches!(err, IoError::Closed));
        assert_eq!(calls, 1);
    }

    #[test]
    fn unsupported_format() {
        assert!(matches!(
            new_entry_reader(&tabular(DataFormat::Cbor), &b""[..], &Logger::default()),
            Err(IoError::UnsupportedFormat(DataFormat::Cbor))
        ));
        assert!(matches!(
            new_entry_writer(&tabular(DataFormat::Xls), Vec::new(), &Logger::default()),
            Err(IoError::UnsupportedFormat(DataFormat::Xls))
        ));
    }
}
