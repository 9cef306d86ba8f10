use cads_types::Address;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::assign::{self, Assign};
use crate::component::ComponentBody;
use crate::kind::{self, Kind};

/// A change record in a dataset's history, analogous to a git commit
/// message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Address this commit was loaded from. Never encoded.
    #[serde(skip)]
    pub path: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, serialize_with = "kind::ser_commit")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Base58 signature over [`Commit::signable_bytes`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,
    /// Time this commit was created. Required.
    #[serde(default, with = "timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Required.
    #[serde(default)]
    pub title: String,
}

impl Commit {
    /// The exact bytes a commit signature covers: RFC 3339 timestamp at
    /// second precision, a newline, then the title.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let ts = match &self.timestamp {
            Some(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
            None => timestamp::ZERO.to_string(),
        };
        format!("{ts}\n{}", self.title).into_bytes()
    }
}

impl ComponentBody for Commit {
    const NAME: &'static str = "commit";

    fn path(&self) -> Option<&Address> {
        self.path.as_ref()
    }

    fn set_path(&mut self, path: Option<Address>) {
        self.path = path;
    }

    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.signature.is_empty()
            && self.message.is_empty()
            && self.author.is_none()
            && self.timestamp.is_none()
    }
}

impl Assign for Commit {
    fn assign_from(&mut self, other: &Self) {
        assign::option(&mut self.path, &other.path);
        assign::option(&mut self.author, &other.author);
        assign::string(&mut self.title, &other.title);
        assign::option(&mut self.timestamp, &other.timestamp);
        assign::string(&mut self.message, &other.message);
        assign::string(&mut self.signature, &other.signature);
        if !other.kind.is_empty() {
            self.kind = other.kind.clone();
        }
    }
}

/// Author of a commit or contributor to a dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, rename = "fullName", skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl User {
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.full_name.is_empty() && self.id.is_empty()
    }
}

/// Timestamps encode as RFC 3339. A missing timestamp encodes as the zero
/// time `0001-01-01T00:00:00Z` and decodes back to `None`.
pub(crate) mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) const ZERO: &str = "0001-01-01T00:00:00Z";

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => s.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => s.serialize_str(ZERO),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        if raw.is_empty() || raw == ZERO {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(de::Error::custom)
    }

    /// Display form used in comparison messages.
    pub(crate) fn display(value: &Option<DateTime<Utc>>) -> String {
        match value {
            Some(t) => t.to_string(),
            None => "0001-01-01 00:00:00 UTC".to_string(),
        }
    }
}
