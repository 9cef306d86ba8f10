use std::fmt;
use std::marker::PhantomData;

use cads_hash::{ContentHasher, HashError};
use cads_types::Address;
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DatasetError, DatasetResult};

/// Behaviour shared by every dataset component body.
pub trait ComponentBody: Clone + Default + Serialize + DeserializeOwned {
    /// Lowercase component name used in errors and logs.
    const NAME: &'static str;

    /// Address this value was loaded from or saved to, if any.
    fn path(&self) -> Option<&Address>;

    fn set_path(&mut self, path: Option<Address>);

    /// Returns `true` if every semantic field is at its zero value.
    ///
    /// The path is not a semantic field.
    fn is_empty(&self) -> bool;

    /// Content address of this value's JSON object form.
    fn content_address(&self, hasher: &ContentHasher) -> Result<Address, HashError> {
        hasher.hash_json(self)
    }
}

/// A component in one of its two JSON forms.
///
/// A `Reference` encodes as the bare address string; an `Object` encodes as
/// the full JSON object, never carrying its address.
#[derive(Clone, Debug, PartialEq)]
pub enum Component<T> {
    Reference(Address),
    Object(T),
}

impl<T: ComponentBody> Component<T> {
    pub fn reference(path: impl Into<Address>) -> Self {
        Self::Reference(path.into())
    }

    /// Wrap a value, collapsing an empty value that has a path into a
    /// pure reference.
    pub fn object(value: T) -> Self {
        match value.path() {
            Some(path) if value.is_empty() => Self::Reference(path.clone()),
            _ => Self::Object(value),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// The address of a reference, or the path of a loaded object.
    pub fn path(&self) -> Option<&Address> {
        match self {
            Self::Reference(path) => Some(path),
            Self::Object(value) => value.path(),
        }
    }

    pub fn as_object(&self) -> Option<&T> {
        match self {
            Self::Object(value) => Some(value),
            Self::Reference(_) => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Object(value) => Some(value),
            Self::Reference(_) => None,
        }
    }

    /// The object body, or an empty body pointing at the referenced address.
    pub fn into_object(self) -> T {
        match self {
            Self::Object(value) => value,
            Self::Reference(path) => {
                let mut value = T::default();
                value.set_path(Some(path));
                value
            }
        }
    }

    /// Returns `true` for references and for objects with no populated field.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Reference(_) => true,
            Self::Object(value) => value.is_empty(),
        }
    }

    /// Decode either JSON form.
    pub fn from_json(data: &[u8]) -> DatasetResult<Self> {
        serde_json::from_slice(data).map_err(|source| DatasetError::Decode {
            component: T::NAME,
            source,
        })
    }

    /// Encode in the form this value is in.
    pub fn to_json(&self) -> DatasetResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|source| DatasetError::Encode {
            component: T::NAME,
            source,
        })
    }
}

impl<T: ComponentBody> From<T> for Component<T> {
    fn from(value: T) -> Self {
        Self::object(value)
    }
}

impl<T: Serialize> Serialize for Component<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Reference(path) => serializer.serialize_str(path.as_str()),
            Self::Object(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Component<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ComponentVisitor(PhantomData))
    }
}

struct ComponentVisitor<T>(PhantomData<T>);

impl<'de, T: DeserializeOwned> Visitor<'de> for ComponentVisitor<T> {
    type Value = Component<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a path string or a component object")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Component::Reference(Address::new(v)))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Component::Reference(Address::new(v)))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        T::deserialize(de::value::MapAccessDeserializer::new(map)).map(Component::Object)
    }
}
