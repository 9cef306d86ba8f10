use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use cads_dataset::{CsvOptions, DataFormat, DataType, Field, FormatConfig, Schema, Structure};
use cads_io::{
    each_entry, new_entry_reader, new_entry_writer, CsvReader, Entry, EntryReader, EntryWriter, IoError,
    JsonReader,
};
use cads_types::Logger;
use proptest::prelude::*;
use serde_json::{json, Value};

fn write_all(structure: &Structure, entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = new_entry_writer(structure, &mut out, &Logger::default()).unwrap();
        for entry in entries {
            writer.write_entry(entry).unwrap();
        }
        writer.close().unwrap();
    }
    out
}

fn read_all(structure: &Structure, bytes: &[u8]) -> Vec<Entry> {
    let mut reader = new_entry_reader(structure, bytes, &Logger::default()).unwrap();
    let mut entries = Vec::new();
    each_entry(&mut reader, |_, entry| {
        entries.push(entry);
        Ok(())
    })
    .unwrap();
    entries
}

fn json_structure(schema: Schema) -> Structure {
    Structure {
        format: DataFormat::Json,
        schema: Some(schema),
        ..Default::default()
    }
}

fn csv_structure(header_row: bool) -> Structure {
    Structure {
        format: DataFormat::Csv,
        format_config: header_row.then(|| {
            FormatConfig::from(CsvOptions {
                header_row,
                ..Default::default()
            })
        }),
        schema: Some(Schema::tabular(&[
            Field::new("name", DataType::String),
            Field::new("score", DataType::Number),
            Field::new("rank", DataType::Integer),
            Field::new("active", DataType::Boolean),
        ])),
        ..Default::default()
    }
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// An integer cell given either as an integer or as an integral float.
fn rank() -> impl Strategy<Value = (Value, Value)> {
    prop_oneof![
        any::<i64>().prop_map(|n| (json!(n), json!(n))),
        (-(1i64 << 53)..(1i64 << 53)).prop_map(|n| (json!(n as f64), json!(n))),
    ]
}

/// A row as written and as it reads back.
fn csv_row() -> impl Strategy<Value = (Value, Value)> {
    (
        "[a-zA-Z0-9 ,\"\n]{0,12}",
        prop::option::of(-1.0e6f64..1.0e6),
        prop::option::of(rank()),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(name, score, rank, active)| {
            let (written, read) = rank.unwrap_or((Value::Null, Value::Null));
            (
                json!([name, score, written, active]),
                json!([name, score, read, active]),
            )
        })
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn csv_row_decodes_and_reencodes() {
    let st = csv_structure(false);
    let entries = read_all(&st, b"a,1.23,4,false");
    assert_eq!(entries, vec![Entry::indexed(0, json!(["a", 1.23, 4, false]))]);
    assert_eq!(write_all(&st, &entries), b"a,1.23,4,false\r\n");
}

#[test]
fn json_array_scenario() {
    let entries = read_all(&json_structure(Schema::array()), b"[1,2,3]");
    let indices: Vec<Option<usize>> = entries.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
    let values: Vec<Value> = entries.into_iter().map(|e| e.value).collect();
    assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn readers_own_their_source() {
    let st = json_structure(Schema::array());
    let bytes = b"[\"a\"]".to_vec();
    let mut reader = JsonReader::new(st, std::io::Cursor::new(bytes)).unwrap();
    assert_eq!(reader.read_entry().unwrap().unwrap().value, json!("a"));
    assert!(reader.read_entry().unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn codec_errors_reach_injected_logger() {
    let buf = Buffer::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let logger = Logger::new(tracing::Dispatch::new(subscriber));

    let mut reader = CsvReader::new(csv_structure(false), &b"a,1\n"[..])
        .unwrap()
        .with_logger(logger);
    assert!(matches!(
        reader.read_entry(),
        Err(IoError::ColumnCount { row: 0, .. })
    ));

    let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    assert!(out.contains("entry codec error"));
    assert!(out.contains("read csv row"));
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn json_array_roundtrip(values in prop::collection::vec(json_value(), 0..8)) {
        let st = json_structure(Schema::array());
        let entries: Vec<Entry> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Entry::indexed(i, v))
            .collect();
        prop_assert_eq!(read_all(&st, &write_all(&st, &entries)), entries);
    }

    #[test]
    fn json_object_roundtrip(map in prop::collection::btree_map("\\PC{1,8}", json_value(), 0..8)) {
        let st = json_structure(Schema::object());
        let entries: Vec<Entry> = map.into_iter().map(|(k, v)| Entry::keyed(k, v)).collect();
        let read: BTreeMap<String, Value> = read_all(&st, &write_all(&st, &entries))
            .into_iter()
            .map(|e| (e.key.unwrap_or_default(), e.value))
            .collect();
        let written: BTreeMap<String, Value> = entries
            .into_iter()
            .map(|e| (e.key.unwrap_or_default(), e.value))
            .collect();
        prop_assert_eq!(read, written);
    }

    #[test]
    fn csv_roundtrip(rows in prop::collection::vec(csv_row(), 0..8), header_row in any::<bool>()) {
        let st = csv_structure(header_row);
        let (written, expected): (Vec<Entry>, Vec<Entry>) = rows
            .into_iter()
            .enumerate()
            .map(|(i, (w, r))| (Entry::indexed(i, w), Entry::indexed(i, r)))
            .unzip();
        prop_assert_eq!(read_all(&st, &write_all(&st, &written)), expected);
    }
}
