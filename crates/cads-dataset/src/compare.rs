//! Structural comparison of components.
//!
//! Each `compare_*` function returns the first differing field as a
//! [`Mismatch`]. Paths are never compared; two values loaded from different
//! addresses but holding the same fields are equal.

use std::collections::BTreeSet;
use std::fmt;

use crate::commit::{timestamp, Commit, User};
use crate::component::{Component, ComponentBody};
use crate::dataset::Dataset;
use crate::meta::{Citation, License, Meta};
use crate::structure::Structure;
use crate::transform::Transform;
use crate::vis_config::VisConfig;

/// The first difference found between two values.
///
/// Renders as the field path joined by `": "` followed by the detail, for
/// example `Structure: Length: 0 != 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    path: Vec<String>,
    detail: String,
}

pub type CompareResult = Result<(), Mismatch>;

impl Mismatch {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            detail: detail.into(),
        }
    }

    /// `<name>: <a> != <b>`
    pub fn field(name: &str, a: impl fmt::Display, b: impl fmt::Display) -> Self {
        Self::new(format!("{a} != {b}")).within(name)
    }

    /// One side is absent and the other is not.
    pub fn nil(a_is_nil: bool) -> Self {
        if a_is_nil {
            Self::new("nil: <nil> != <not nil>")
        } else {
            Self::new("nil: <not nil> != <nil>")
        }
    }

    /// Prefix the path with an enclosing field name.
    pub fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.path {
            write!(f, "{segment}: ")?;
        }
        f.write_str(&self.detail)
    }
}

impl std::error::Error for Mismatch {}

fn eq<V: PartialEq + fmt::Display + ?Sized>(name: &str, a: &V, b: &V) -> CompareResult {
    if a == b {
        Ok(())
    } else {
        Err(Mismatch::field(name, a, b))
    }
}

/// Both present, both absent, or a nil mismatch.
fn both<'a, T>(a: Option<&'a T>, b: Option<&'a T>) -> Result<Option<(&'a T, &'a T)>, Mismatch> {
    match (a, b) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(Mismatch::nil(true)),
        (Some(_), None) => Err(Mismatch::nil(false)),
        (Some(a), Some(b)) => Ok(Some((a, b))),
    }
}

fn nested<T, F>(name: &str, a: Option<&T>, b: Option<&T>, compare: F) -> CompareResult
where
    F: FnOnce(Option<&T>, Option<&T>) -> CompareResult,
{
    compare(a, b).map_err(|m| m.within(name))
}

/// Compare two components in either form. References are equal when their
/// addresses are; a reference never equals an object.
fn component<T, F>(a: Option<&Component<T>>, b: Option<&Component<T>>, compare: F) -> CompareResult
where
    T: ComponentBody,
    F: FnOnce(Option<&T>, Option<&T>) -> CompareResult,
{
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    match (a, b) {
        (Component::Reference(pa), Component::Reference(pb)) => {
            eq("path", pa.as_str(), pb.as_str())
        }
        (Component::Reference(pa), Component::Object(_)) => {
            Err(Mismatch::new(format!("reference {pa} != <object>")))
        }
        (Component::Object(_), Component::Reference(pb)) => {
            Err(Mismatch::new(format!("<object> != reference {pb}")))
        }
        (Component::Object(a), Component::Object(b)) => compare(Some(a), Some(b)),
    }
}

/// Element-wise comparison of two string lists.
pub fn compare_string_slices(a: &[String], b: &[String]) -> CompareResult {
    if a.len() != b.len() {
        return Err(Mismatch::field("length", a.len(), b.len()));
    }
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        eq(&format!("element {i}"), x.as_str(), y.as_str())?;
    }
    Ok(())
}

fn slices<T>(
    a: &[T],
    b: &[T],
    compare: impl Fn(&T, &T) -> CompareResult,
) -> CompareResult {
    if a.len() != b.len() {
        return Err(Mismatch::field("length", a.len(), b.len()));
    }
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        compare(x, y).map_err(|m| m.within(format!("element {i}")))?;
    }
    Ok(())
}

fn compare_users(a: Option<&User>, b: Option<&User>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("ID", a.id.as_str(), b.id.as_str())?;
    eq("FullName", a.full_name.as_str(), b.full_name.as_str())?;
    eq("Email", a.email.as_str(), b.email.as_str())
}

fn compare_licenses(a: Option<&License>, b: Option<&License>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Type", a.license_type.as_str(), b.license_type.as_str())?;
    eq("Url", a.url.as_str(), b.url.as_str())
}

fn compare_citations(a: &Citation, b: &Citation) -> CompareResult {
    eq("Name", a.name.as_str(), b.name.as_str())?;
    eq("Url", a.url.as_str(), b.url.as_str())?;
    eq("Email", a.email.as_str(), b.email.as_str())
}

pub fn compare_commits(a: Option<&Commit>, b: Option<&Commit>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Kind", &a.kind, &b.kind)?;
    eq("Title", a.title.as_str(), b.title.as_str())?;
    if a.timestamp != b.timestamp {
        return Err(Mismatch::field(
            "Timestamp",
            timestamp::display(&a.timestamp),
            timestamp::display(&b.timestamp),
        ));
    }
    eq("Message", a.message.as_str(), b.message.as_str())?;
    eq("Signature", a.signature.as_str(), b.signature.as_str())?;
    nested("Author", a.author.as_ref(), b.author.as_ref(), compare_users)
}

pub fn compare_structures(a: Option<&Structure>, b: Option<&Structure>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Kind", &a.kind, &b.kind)?;
    eq("Length", &a.length, &b.length)?;
    eq("Entries", &a.entries, &b.entries)?;
    eq("ErrCount", &a.err_count, &b.err_count)?;
    eq("Checksum", a.checksum.as_str(), b.checksum.as_str())?;
    eq("Format", &a.format, &b.format)?;
    eq("Encoding", a.encoding.as_str(), b.encoding.as_str())?;
    nested(
        "FormatConfig",
        a.format_config.as_ref(),
        b.format_config.as_ref(),
        |a, b| match both(a, b)? {
            Some((a, b)) if a != b => Err(Mismatch::new(format!("{a} != {b}"))),
            _ => Ok(()),
        },
    )?;
    nested("Schema", a.schema.as_ref(), b.schema.as_ref(), |a, b| {
        match both(a, b)? {
            Some((a, b)) if a != b => Err(Mismatch::new(format!("{a} != {b}"))),
            _ => Ok(()),
        }
    })
}

pub fn compare_metas(a: Option<&Meta>, b: Option<&Meta>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Kind", &a.kind, &b.kind)?;
    eq("Title", a.title.as_str(), b.title.as_str())?;
    eq("AccessPath", a.access_path.as_str(), b.access_path.as_str())?;
    eq("DownloadPath", a.download_path.as_str(), b.download_path.as_str())?;
    eq(
        "AccrualPeriodicity",
        a.accrual_periodicity.as_str(),
        b.accrual_periodicity.as_str(),
    )?;
    eq("ReadmePath", a.readme_path.as_str(), b.readme_path.as_str())?;
    eq("Description", a.description.as_str(), b.description.as_str())?;
    eq("HomePath", a.home_path.as_str(), b.home_path.as_str())?;
    eq("Identifier", a.identifier.as_str(), b.identifier.as_str())?;
    nested("License", a.license.as_ref(), b.license.as_ref(), compare_licenses)?;
    eq("Version", a.version.as_str(), b.version.as_str())?;
    compare_string_slices(&a.keywords, &b.keywords).map_err(|m| m.within("Keywords"))?;
    compare_string_slices(&a.language, &b.language).map_err(|m| m.within("Language"))?;
    compare_string_slices(&a.theme, &b.theme).map_err(|m| m.within("Theme"))?;
    slices(&a.citations, &b.citations, compare_citations).map_err(|m| m.within("Citations"))?;
    slices(&a.contributors, &b.contributors, |x, y| {
        compare_users(Some(x), Some(y))
    })
    .map_err(|m| m.within("Contributors"))
}

pub fn compare_transforms(a: Option<&Transform>, b: Option<&Transform>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Kind", &a.kind, &b.kind)?;
    eq("Syntax", a.syntax.as_str(), b.syntax.as_str())?;
    eq("AppVersion", a.app_version.as_str(), b.app_version.as_str())?;
    eq("Data", a.data.as_str(), b.data.as_str())?;
    if a.config != b.config {
        let render = |m: &std::collections::BTreeMap<String, serde_json::Value>| {
            serde_json::to_string(m).unwrap_or_default()
        };
        return Err(Mismatch::field("Config", render(&a.config), render(&b.config)));
    }
    component(a.structure.as_ref(), b.structure.as_ref(), compare_structures)
        .map_err(|m| m.within("Structure"))?;

    let names: BTreeSet<&String> = a.resources.keys().chain(b.resources.keys()).collect();
    for name in names {
        component(a.resources.get(name.as_str()), b.resources.get(name.as_str()), compare_datasets)
            .map_err(|m| m.within(format!("Resource '{name}'")))?;
    }
    Ok(())
}

pub fn compare_vis_configs(a: Option<&VisConfig>, b: Option<&VisConfig>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Kind", &a.kind, &b.kind)?;
    eq("Format", a.format.as_str(), b.format.as_str())?;
    if a.visualizations != b.visualizations {
        return Err(Mismatch::new("Visualizations not equal"));
    }
    Ok(())
}

pub fn compare_datasets(a: Option<&Dataset>, b: Option<&Dataset>) -> CompareResult {
    let Some((a, b)) = both(a, b)? else {
        return Ok(());
    };
    eq("Kind", &a.kind, &b.kind)?;
    eq("PreviousPath", a.previous_path.as_str(), b.previous_path.as_str())?;
    eq("DataPath", a.data_path.as_str(), b.data_path.as_str())?;
    component(a.meta.as_ref(), b.meta.as_ref(), compare_metas).map_err(|m| m.within("Meta"))?;
    component(a.structure.as_ref(), b.structure.as_ref(), compare_structures)
        .map_err(|m| m.within("Structure"))?;
    component(a.transform.as_ref(), b.transform.as_ref(), compare_transforms)
        .map_err(|m| m.within("Transform"))?;
    component(
        a.abstract_transform.as_ref(),
        b.abstract_transform.as_ref(),
        compare_transforms,
    )
    .map_err(|m| m.within("AbstractTransform"))?;
    component(a.commit.as_ref(), b.commit.as_ref(), compare_commits)
        .map_err(|m| m.within("Commit"))?;
    component(a.vis_config.as_ref(), b.vis_config.as_ref(), compare_vis_configs)
        .map_err(|m| m.within("VisConfig"))?;
    component(
        a.r#abstract.as_deref(),
        b.r#abstract.as_deref(),
        compare_datasets,
    )
    .map_err(|m| m.within("Abstract"))
}
