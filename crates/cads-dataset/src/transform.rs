use std::collections::BTreeMap;

use cads_types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assign::{self, Assign};
use crate::component::{Component, ComponentBody};
use crate::dataset::Dataset;
use crate::kind::{self, Kind};
use crate::structure::Structure;

/// The script that produced a dataset and the inputs it read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(skip)]
    pub path: Option<Address>,
    /// Version of the application that ran the script.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_version: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, Value>,
    /// Script source or a path to it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, serialize_with = "kind::ser_transform")]
    pub kind: Kind,
    /// Input datasets by the name the script refers to them with.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Component<Dataset>>,
    /// Shape of the script's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Component<Structure>>,
    /// Script language, for example `sql` or `starlark`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub syntax: String,
}

impl ComponentBody for Transform {
    const NAME: &'static str = "transform";

    fn path(&self) -> Option<&Address> {
        self.path.as_ref()
    }

    fn set_path(&mut self, path: Option<Address>) {
        self.path = path;
    }

    fn is_empty(&self) -> bool {
        self.app_version.is_empty()
            && self.config.is_empty()
            && self.data.is_empty()
            && self.resources.is_empty()
            && self.structure.is_none()
            && self.syntax.is_empty()
    }
}

impl Assign for Transform {
    fn assign_from(&mut self, other: &Self) {
        assign::option(&mut self.path, &other.path);
        assign::string(&mut self.app_version, &other.app_version);
        for (key, value) in &other.config {
            self.config.insert(key.clone(), value.clone());
        }
        assign::string(&mut self.data, &other.data);
        if !other.kind.is_empty() {
            self.kind = other.kind.clone();
        }
        for (name, over) in &other.resources {
            match (self.resources.get_mut(name), over) {
                (Some(Component::Object(base)), Component::Object(value)) => {
                    base.assign_from(value)
                }
                _ => {
                    self.resources.insert(name.clone(), over.clone());
                }
            }
        }
        assign::component(&mut self.structure, &other.structure);
        assign::string(&mut self.syntax, &other.syntax);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resources_decode_both_forms() {
        let tf: Transform = serde_json::from_str(
            r#"{"syntax":"sql","resources":{"a":"/map/QmA","b":{"previousPath":"/map/QmB"}}}"#,
        )
        .unwrap();
        assert_eq!(tf.resources["a"], Component::reference("/map/QmA"));
        let b = tf.resources["b"].as_object().unwrap();
        assert_eq!(b.previous_path.as_str(), "/map/QmB");
    }

    #[test]
    fn encodes_resources_as_references() {
        let mut tf = Transform {
            syntax: "sql".into(),
            ..Default::default()
        };
        tf.resources
            .insert("airports".into(), Component::reference("/map/QmA"));
        assert_eq!(
            serde_json::to_string(&tf).unwrap(),
            r#"{"kind":"tf:0","resources":{"airports":"/map/QmA"},"syntax":"sql"}"#
        );
    }

    #[test]
    fn assign_merges_config_and_resources() {
        let mut base = Transform::default();
        base.config.insert("limit".into(), json!(10));
        base.resources
            .insert("a".into(), Component::reference("/map/QmA"));

        let mut over = Transform::default();
        over.config.insert("offset".into(), json!(5));
        over.resources
            .insert("b".into(), Component::reference("/map/QmB"));

        base.assign_from(&over);
        assert_eq!(base.config.len(), 2);
        assert_eq!(base.resources.len(), 2);
    }
}
