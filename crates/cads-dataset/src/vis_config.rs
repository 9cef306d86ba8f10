use cads_types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assign::{self, Assign};
use crate::component::ComponentBody;
use crate::kind::{self, Kind};

/// Rendering configuration for a dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisConfig {
    #[serde(skip)]
    pub path: Option<Address>,
    /// Template language of `visualizations`, for example `html`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(default, serialize_with = "kind::ser_vis_config")]
    pub kind: Kind,
    /// Opaque to this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualizations: Option<Value>,
}

impl ComponentBody for VisConfig {
    const NAME: &'static str = "vis_config";

    fn path(&self) -> Option<&Address> {
        self.path.as_ref()
    }

    fn set_path(&mut self, path: Option<Address>) {
        self.path = path;
    }

    fn is_empty(&self) -> bool {
        self.format.is_empty() && self.visualizations.is_none()
    }
}

impl Assign for VisConfig {
    fn assign_from(&mut self, other: &Self) {
        assign::option(&mut self.path, &other.path);
        assign::string(&mut self.format, &other.format);
        if !other.kind.is_empty() {
            self.kind = other.kind.clone();
        }
        assign::option(&mut self.visualizations, &other.visualizations);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_with_default_kind() {
        let vc = VisConfig {
            format: "html".into(),
            visualizations: Some(json!({ "colors": ["red"] })),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&vc).unwrap(),
            r#"{"format":"html","kind":"vc:0","visualizations":{"colors":["red"]}}"#
        );
    }

    #[test]
    fn assign_keeps_unset_fields() {
        let mut vc = VisConfig {
            format: "html".into(),
            ..Default::default()
        };
        vc.assign_from(&VisConfig {
            visualizations: Some(json!("<p/>")),
            ..Default::default()
        });
        assert_eq!(vc.format, "html");
        assert_eq!(vc.visualizations, Some(json!("<p/>")));
    }
}
