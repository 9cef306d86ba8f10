use cads_types::Address;
use serde::{Deserialize, Serialize};

use crate::assign::{self, Assign};
use crate::component::ComponentBody;
use crate::format::{DataFormat, FormatConfig};
use crate::kind::{self, Kind};
use crate::schema::Schema;

/// How to interpret a dataset's raw bytes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    #[serde(skip)]
    pub path: Option<Address>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encoding: String,
    /// Number of top-level entries.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub entries: u64,
    /// Number of entries that failed validation.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub err_count: u64,
    #[serde(default, skip_serializing_if = "DataFormat::is_unknown")]
    pub format: DataFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_config: Option<FormatConfig>,
    #[serde(default, serialize_with = "kind::ser_structure")]
    pub kind: Kind,
    /// Length of the raw data in bytes.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub length: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Structure {
    /// Copy reduced to what describes the shape of the data: kind, format,
    /// format config and a schema with abstract column titles.
    pub fn abstract_copy(&self) -> Self {
        Self {
            kind: if self.kind.is_empty() {
                Kind::structure()
            } else {
                self.kind.clone()
            },
            format: self.format,
            format_config: self.format_config.clone(),
            schema: self.schema.as_ref().map(Schema::abstract_copy),
            ..Default::default()
        }
    }
}

impl ComponentBody for Structure {
    const NAME: &'static str = "structure";

    fn path(&self) -> Option<&Address> {
        self.path.as_ref()
    }

    fn set_path(&mut self, path: Option<Address>) {
        self.path = path;
    }

    fn is_empty(&self) -> bool {
        self.checksum.is_empty()
            && self.encoding.is_empty()
            && self.entries == 0
            && self.err_count == 0
            && self.format.is_unknown()
            && self.format_config.is_none()
            && self.length == 0
            && self.schema.is_none()
    }
}

impl Assign for Structure {
    fn assign_from(&mut self, other: &Self) {
        assign::option(&mut self.path, &other.path);
        assign::string(&mut self.checksum, &other.checksum);
        assign::string(&mut self.encoding, &other.encoding);
        assign::number(&mut self.entries, other.entries);
        assign::number(&mut self.err_count, other.err_count);
        if !other.format.is_unknown() {
            self.format = other.format;
        }
        match (&mut self.format_config, &other.format_config) {
            (Some(base), Some(over)) => base.extend(over),
            (base, over) => assign::option(base, over),
        }
        if !other.kind.is_empty() {
            self.kind = other.kind.clone();
        }
        assign::number(&mut self.length, other.length);
        assign::option(&mut self.schema, &other.schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::CsvOptions;
    use crate::schema::{DataType, Field};

    fn airport_codes() -> Structure {
        Structure {
            err_count: 5,
            format: DataFormat::Csv,
            kind: Kind::structure(),
            format_config: Some(
                CsvOptions {
                    header_row: true,
                    ..Default::default()
                }
                .into(),
            ),
            schema: Some(Schema::tabular(&[
                Field::new("ident", DataType::String),
                Field::new("latitude_deg", DataType::Number),
            ])),
            ..Default::default()
        }
    }

    #[test]
    fn encodes_camel_case_and_omits_zero_fields() {
        let json = serde_json::to_string(&airport_codes()).unwrap();
        assert!(json.starts_with(r#"{"errCount":5,"format":"csv","formatConfig":{"headerRow":true},"kind":"st:0","schema":"#));
        assert!(!json.contains("length"));
        assert!(!json.contains("checksum"));
    }

    #[test]
    fn decode_roundtrip() {
        let st = airport_codes();
        let back: Structure = serde_json::from_str(&serde_json::to_string(&st).unwrap()).unwrap();
        assert_eq!(back, st);
    }

    #[test]
    fn abstract_copy_strips_descriptive_fields() {
        let abs = airport_codes().abstract_copy();
        assert_eq!(abs.err_count, 0);
        assert_eq!(abs.format, DataFormat::Csv);
        assert!(abs.format_config.is_some());
        let titles: Vec<String> = abs
            .schema
            .unwrap()
            .fields()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn format_configs_merge_by_key() {
        let mut base = Structure {
            format_config: Some(
                CsvOptions {
                    header_row: true,
                    ..Default::default()
                }
                .into(),
            ),
            ..Default::default()
        };
        let over = Structure {
            format_config: Some(
                CsvOptions {
                    variadic_fields: true,
                    ..Default::default()
                }
                .into(),
            ),
            ..Default::default()
        };
        base.assign_from(&over);
        let opts = CsvOptions::from_config(base.format_config.as_ref()).unwrap();
        assert!(opts.header_row && opts.variadic_fields);
    }

    #[test]
    fn empty_structure() {
        assert!(Structure::default().is_empty());
        assert!(!airport_codes().is_empty());
    }
}
