use cads_types::Address;
use serde::{Deserialize, Serialize};

use crate::assign::{self, Assign};
use crate::commit::User;
use crate::component::ComponentBody;
use crate::kind::{self, Kind};

/// Human-oriented descriptive metadata for a dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip)]
    pub path: Option<Address>,
    /// Landing page for the dataset.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub accrual_periodicity: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<User>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Direct download location of the raw data.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub download_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub home_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, serialize_with = "kind::ser_meta")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub readme_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub theme: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

impl ComponentBody for Meta {
    const NAME: &'static str = "meta";

    fn path(&self) -> Option<&Address> {
        self.path.as_ref()
    }

    fn set_path(&mut self, path: Option<Address>) {
        self.path = path;
    }

    fn is_empty(&self) -> bool {
        self.access_path.is_empty()
            && self.accrual_periodicity.is_empty()
            && self.citations.is_empty()
            && self.contributors.is_empty()
            && self.description.is_empty()
            && self.download_path.is_empty()
            && self.home_path.is_empty()
            && self.identifier.is_empty()
            && self.keywords.is_empty()
            && self.language.is_empty()
            && self.license.is_none()
            && self.readme_path.is_empty()
            && self.theme.is_empty()
            && self.title.is_empty()
            && self.version.is_empty()
    }
}

impl Assign for Meta {
    fn assign_from(&mut self, other: &Self) {
        assign::option(&mut self.path, &other.path);
        assign::string(&mut self.access_path, &other.access_path);
        assign::string(&mut self.accrual_periodicity, &other.accrual_periodicity);
        assign::vec(&mut self.citations, &other.citations);
        assign::vec(&mut self.contributors, &other.contributors);
        assign::string(&mut self.description, &other.description);
        assign::string(&mut self.download_path, &other.download_path);
        assign::string(&mut self.home_path, &other.home_path);
        assign::string(&mut self.identifier, &other.identifier);
        assign::vec(&mut self.keywords, &other.keywords);
        if !other.kind.is_empty() {
            self.kind = other.kind.clone();
        }
        assign::vec(&mut self.language, &other.language);
        assign::option(&mut self.license, &other.license);
        assign::string(&mut self.readme_path, &other.readme_path);
        assign::vec(&mut self.theme, &other.theme);
        assign::string(&mut self.title, &other.title);
        assign::string(&mut self.version, &other.version);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub license_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// A source this dataset draws on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}
