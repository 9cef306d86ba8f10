use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{DatasetError, DatasetResult};

/// JSON-Schema-like document describing a dataset's entries.
///
/// Only the root `type` and, for tabular data, the per-column
/// `items.items[*]` titles and types are interpreted here. Everything else
/// is carried verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(Value);

impl Schema {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(s: &str) -> DatasetResult<Self> {
        serde_json::from_str(s)
            .map(Self)
            .map_err(|source| DatasetError::Decode {
                component: "schema",
                source,
            })
    }

    /// An array-of-rows schema with one column per field.
    pub fn tabular(fields: &[Field]) -> Self {
        let items: Vec<Value> = fields
            .iter()
            .map(|f| json!({ "title": f.title, "type": f.data_type.as_str() }))
            .collect();
        Self(json!({
            "type": "array",
            "items": { "type": "array", "items": items },
        }))
    }

    /// A schema whose root is an object of arbitrary values.
    pub fn object() -> Self {
        Self(json!({ "type": "object" }))
    }

    /// A schema whose root is an array of arbitrary values.
    pub fn array() -> Self {
        Self(json!({ "type": "array" }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The declared root `type`, if it is a string.
    pub fn root_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Column definitions from `items.items`. Empty when none are declared.
    pub fn fields(&self) -> Vec<Field> {
        let Some(columns) = self
            .0
            .get("items")
            .and_then(|items| items.get("items"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };
        columns
            .iter()
            .map(|col| Field {
                title: col
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                data_type: col
                    .get("type")
                    .and_then(Value::as_str)
                    .map(DataType::from_name)
                    .unwrap_or(DataType::Any),
            })
            .collect()
    }

    /// Copy of this schema with column titles replaced by `a`, `b`, … `z`,
    /// `aa`, `ab`, …
    pub fn abstract_copy(&self) -> Self {
        let mut value = self.0.clone();
        if let Some(columns) = value
            .get_mut("items")
            .and_then(|items| items.get_mut("items"))
            .and_then(Value::as_array_mut)
        {
            for (i, col) in columns.iter_mut().enumerate() {
                if let Some(obj) = col.as_object_mut() {
                    obj.insert("title".into(), Value::String(abstract_column_name(i)));
                }
            }
        }
        Self(value)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spreadsheet-style column name for a zero-based index.
pub fn abstract_column_name(mut i: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'a' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// One column of a tabular schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub title: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(title: impl Into<String>, data_type: DataType) -> Self {
        Self {
            title: title.into(),
            data_type,
        }
    }
}

/// JSON-Schema primitive type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    /// No type, or one this crate does not model. Cells stay strings.
    Any,
}

impl DataType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            "null" => Self::Null,
            _ => Self::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_type_and_fields() {
        let schema = Schema::tabular(&[
            Field::new("name", DataType::String),
            Field::new("score", DataType::Number),
        ]);
        assert_eq!(schema.root_type(), Some("array"));
        let fields = schema.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1], Field::new("score", DataType::Number));
    }

    #[test]
    fn fields_missing_type_are_any() {
        let schema =
            Schema::parse(r#"{"type":"array","items":{"items":[{"title":"x"}]}}"#).unwrap();
        assert_eq!(schema.fields(), vec![Field::new("x", DataType::Any)]);
    }

    #[test]
    fn object_schema_has_no_fields() {
        assert_eq!(Schema::object().root_type(), Some("object"));
        assert!(Schema::object().fields().is_empty());
    }

    #[test]
    fn abstract_column_names() {
        assert_eq!(abstract_column_name(0), "a");
        assert_eq!(abstract_column_name(25), "z");
        assert_eq!(abstract_column_name(26), "aa");
        assert_eq!(abstract_column_name(27), "ab");
        assert_eq!(abstract_column_name(701), "zz");
        assert_eq!(abstract_column_name(702), "aaa");
    }

    #[test]
    fn abstract_copy_renames_titles_only() {
        let schema = Schema::tabular(&[
            Field::new("ident", DataType::String),
            Field::new("elevation_ft", DataType::Integer),
        ]);
        let fields = schema.abstract_copy().fields();
        assert_eq!(fields[0], Field::new("a", DataType::String));
        assert_eq!(fields[1], Field::new("b", DataType::Integer));
    }

    #[test]
    fn parse_error_names_schema() {
        let err = Schema::parse("{").unwrap_err();
        assert!(err.to_string().starts_with("error decoding schema"));
    }
}
