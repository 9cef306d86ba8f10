use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DatasetError, DatasetResult};

pub const KIND_DATASET: &str = "ds:0";
pub const KIND_STRUCTURE: &str = "st:0";
pub const KIND_COMMIT: &str = "cm:0";
pub const KIND_META: &str = "md:0";
pub const KIND_TRANSFORM: &str = "tf:0";
pub const KIND_VIS_CONFIG: &str = "vc:0";

/// Component type tag of the form `<type>:<version>`, e.g. `cm:0`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(String);

impl Kind {
    /// Parse and validate a kind tag.
    pub fn parse(s: &str) -> DatasetResult<Self> {
        let (ty, version) = s
            .split_once(':')
            .ok_or_else(|| DatasetError::InvalidKind(s.to_string()))?;
        if ty.is_empty() || version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
            return Err(DatasetError::InvalidKind(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn dataset() -> Self {
        Self(KIND_DATASET.into())
    }

    pub fn structure() -> Self {
        Self(KIND_STRUCTURE.into())
    }

    pub fn commit() -> Self {
        Self(KIND_COMMIT.into())
    }

    pub fn meta() -> Self {
        Self(KIND_META.into())
    }

    pub fn transform() -> Self {
        Self(KIND_TRANSFORM.into())
    }

    pub fn vis_config() -> Self {
        Self(KIND_VIS_CONFIG.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type segment, e.g. `cm` for `cm:0`.
    pub fn type_code(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({})", self.0)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn serialize_or<S: Serializer>(kind: &Kind, fallback: &str, s: S) -> Result<S::Ok, S::Error> {
    if kind.is_empty() {
        s.serialize_str(fallback)
    } else {
        s.serialize_str(kind.as_str())
    }
}

// Object-form encoders fill in the component's own kind when none is set.

pub(crate) fn ser_dataset<S: Serializer>(kind: &Kind, s: S) -> Result<S::Ok, S::Error> {
    serialize_or(kind, KIND_DATASET, s)
}

pub(crate) fn ser_structure<S: Serializer>(kind: &Kind, s: S) -> Result<S::Ok, S::Error> {
    serialize_or(kind, KIND_STRUCTURE, s)
}

pub(crate) fn ser_commit<S: Serializer>(kind: &Kind, s: S) -> Result<S::Ok, S::Error> {
    serialize_or(kind, KIND_COMMIT, s)
}

pub(crate) fn ser_meta<S: Serializer>(kind: &Kind, s: S) -> Result<S::Ok, S::Error> {
    serialize_or(kind, KIND_META, s)
}

pub(crate) fn ser_transform<S: Serializer>(kind: &Kind, s: S) -> Result<S::Ok, S::Error> {
    serialize_or(kind, KIND_TRANSFORM, s)
}

pub(crate) fn ser_vis_config<S: Serializer>(kind: &Kind, s: S) -> Result<S::Ok, S::Error> {
    serialize_or(kind, KIND_VIS_CONFIG, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_type_and_version() {
        let kind = Kind::parse("cm:0").unwrap();
        assert_eq!(kind, Kind::commit());
        assert_eq!(kind.type_code(), "cm");
    }

    #[test]
    fn parse_rejects_malformed_tags() {
        for bad in ["", "cm", ":0", "cm:", "cm:x"] {
            assert!(Kind::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn serde_is_a_bare_string() {
        let json = serde_json::to_string(&Kind::dataset()).unwrap();
        assert_eq!(json, "\"ds:0\"");
    }
}
