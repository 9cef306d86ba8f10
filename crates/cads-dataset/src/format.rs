use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DatasetError;

/// Encoding of a dataset's raw bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    #[default]
    #[serde(rename = "")]
    Unknown,
    Csv,
    Json,
    Cbor,
    Xml,
    Xls,
}

impl DataFormat {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Lowercase name, empty for [`DataFormat::Unknown`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Cbor => "cbor",
            Self::Xml => "xml",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Unknown),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "cbor" => Ok(Self::Cbor),
            "xml" => Ok(Self::Xml),
            "xls" => Ok(Self::Xls),
            _ => Err(DatasetError::UnknownFormat(s.to_string())),
        }
    }
}

/// Format-specific options, kept as the JSON map they are stored as.
///
/// Typed views such as [`CsvOptions`] are read out of the map on demand, so
/// options for formats this crate does not model survive a round trip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatConfig(Map<String, Value>);

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Merge `other` into `self`, key by key.
    pub fn extend(&mut self, other: &FormatConfig) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl fmt::Display for FormatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// CSV options read from a structure's format config.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// The first row holds column titles rather than data.
    pub header_row: bool,
    /// Rows may have a different cell count than the schema declares.
    pub variadic_fields: bool,
}

impl CsvOptions {
    const HEADER_ROW: &'static str = "headerRow";
    const VARIADIC_FIELDS: &'static str = "variadicFields";

    /// Read CSV options out of a format config. Absent keys default to `false`.
    pub fn from_config(config: Option<&FormatConfig>) -> Result<Self, DatasetError> {
        let Some(config) = config else {
            return Ok(Self::default());
        };
        Ok(Self {
            header_row: flag(config, Self::HEADER_ROW)?,
            variadic_fields: flag(config, Self::VARIADIC_FIELDS)?,
        })
    }
}

impl From<CsvOptions> for FormatConfig {
    fn from(opts: CsvOptions) -> Self {
        let mut config = FormatConfig::new();
        if opts.header_row {
            config.set(CsvOptions::HEADER_ROW, Value::Bool(true));
        }
        if opts.variadic_fields {
            config.set(CsvOptions::VARIADIC_FIELDS, Value::Bool(true));
        }
        config
    }
}

fn flag(config: &FormatConfig, key: &str) -> Result<bool, DatasetError> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(DatasetError::InvalidFormatConfig {
            format: DataFormat::Csv.to_string(),
            reason: format!("{key} must be a boolean, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&DataFormat::Csv).unwrap(), "\"csv\"");
        assert_eq!(serde_json::to_string(&DataFormat::Unknown).unwrap(), "\"\"");
        let parsed: DataFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(parsed, DataFormat::Json);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("CSV".parse::<DataFormat>().unwrap(), DataFormat::Csv);
        assert!("parquet".parse::<DataFormat>().is_err());
    }

    #[test]
    fn csv_options_through_format_config() {
        let opts = CsvOptions {
            header_row: true,
            variadic_fields: false,
        };
        let config = FormatConfig::from(opts);
        assert_eq!(config.to_string(), r#"{"headerRow":true}"#);
        assert_eq!(CsvOptions::from_config(Some(&config)).unwrap(), opts);
    }

    #[test]
    fn csv_options_default_when_absent() {
        assert_eq!(CsvOptions::from_config(None).unwrap(), CsvOptions::default());
    }

    #[test]
    fn csv_options_reject_non_boolean() {
        let mut config = FormatConfig::new();
        config.set("headerRow", Value::String("yes".into()));
        assert!(matches!(
            CsvOptions::from_config(Some(&config)),
            Err(DatasetError::InvalidFormatConfig { .. })
        ));
    }

    #[test]
    fn unknown_options_survive_roundtrip() {
        let config: FormatConfig = serde_json::from_str(r#"{"sheet":"A1"}"#).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"sheet":"A1"}"#);
    }
}
