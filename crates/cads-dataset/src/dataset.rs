use cads_types::Address;
use serde::{Deserialize, Serialize};

use crate::assign::{self, Assign};
use crate::commit::Commit;
use crate::component::{Component, ComponentBody};
use crate::kind::{self, Kind};
use crate::meta::Meta;
use crate::structure::Structure;
use crate::transform::Transform;
use crate::vis_config::VisConfig;

/// A dataset version: its components plus pointers to the raw data and to
/// the previous version.
///
/// Every component field may be a pure reference or a full object.
/// `previous_path` links versions into a history chain that is never
/// rewritten.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip)]
    pub path: Option<Address>,
    /// This dataset with descriptive fields stripped and column titles
    /// anonymised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<Box<Component<Dataset>>>,
    /// The transform rewritten to run against abstract inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstract_transform: Option<Component<Transform>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<Component<Commit>>,
    #[serde(default, skip_serializing_if = "Address::is_empty")]
    pub data_path: Address,
    #[serde(default, serialize_with = "kind::ser_dataset")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Component<Meta>>,
    #[serde(default, skip_serializing_if = "Address::is_empty")]
    pub previous_path: Address,
    /// Required. Encodes as `null` when unset.
    #[serde(default)]
    pub structure: Option<Component<Structure>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Component<Transform>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vis_config: Option<Component<VisConfig>>,
}

impl Dataset {
    /// Copy keeping only the kind and the abstract form of the structure.
    ///
    /// A structure held as a reference cannot be abstracted and is dropped.
    pub fn abstract_copy(&self) -> Self {
        Self {
            kind: Kind::dataset(),
            structure: self
                .structure
                .as_ref()
                .and_then(Component::as_object)
                .map(|st| Component::Object(st.abstract_copy())),
            ..Default::default()
        }
    }

    pub fn structure(&self) -> Option<&Structure> {
        self.structure.as_ref().and_then(Component::as_object)
    }

    pub fn commit(&self) -> Option<&Commit> {
        self.commit.as_ref().and_then(Component::as_object)
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref().and_then(Component::as_object)
    }
}

impl ComponentBody for Dataset {
    const NAME: &'static str = "dataset";

    fn path(&self) -> Option<&Address> {
        self.path.as_ref()
    }

    fn set_path(&mut self, path: Option<Address>) {
        self.path = path;
    }

    fn is_empty(&self) -> bool {
        self.r#abstract.is_none()
            && self.abstract_transform.is_none()
            && self.commit.is_none()
            && self.data_path.is_empty()
            && self.meta.is_none()
            && self.previous_path.is_empty()
            && self.structure.is_none()
            && self.transform.is_none()
            && self.vis_config.is_none()
    }
}

impl Assign for Dataset {
    fn assign_from(&mut self, other: &Self) {
        assign::option(&mut self.path, &other.path);
        if !other.kind.is_empty() {
            self.kind = other.kind.clone();
        }
        assign::address(&mut self.previous_path, &other.previous_path);
        assign::address(&mut self.data_path, &other.data_path);
        assign::component(&mut self.meta, &other.meta);
        assign::component(&mut self.structure, &other.structure);
        assign::component(&mut self.transform, &other.transform);
        assign::component(&mut self.abstract_transform, &other.abstract_transform);
        assign::component(&mut self.commit, &other.commit);
        assign::component(&mut self.vis_config, &other.vis_config);
        assign::boxed_component(&mut self.r#abstract, &other.r#abstract);
    }
}
