//! Field-by-field merge of components.
//!
//! Later arguments win on every field they populate. Component-valued
//! fields merge recursively when both sides hold objects; otherwise the
//! override replaces the base value outright.

use cads_types::Address;

use crate::component::{Component, ComponentBody};

/// Collapse overrides onto `self`, left to right.
pub trait Assign {
    /// Apply one override.
    fn assign_from(&mut self, other: &Self);

    /// Apply every present override in order, skipping `None`.
    fn assign<'a, I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = Option<&'a Self>>,
        Self: 'a,
    {
        for other in overrides.into_iter().flatten() {
            self.assign_from(other);
        }
    }
}

pub(crate) fn string(dst: &mut String, src: &str) {
    if !src.is_empty() {
        *dst = src.to_string();
    }
}

pub(crate) fn address(dst: &mut Address, src: &Address) {
    if !src.is_empty() {
        *dst = src.clone();
    }
}

pub(crate) fn option<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        dst.clone_from(src);
    }
}

pub(crate) fn vec<T: Clone>(dst: &mut Vec<T>, src: &[T]) {
    if !src.is_empty() {
        *dst = src.to_vec();
    }
}

pub(crate) fn number(dst: &mut u64, src: u64) {
    if src != 0 {
        *dst = src;
    }
}

pub(crate) fn component<T>(dst: &mut Option<Component<T>>, src: &Option<Component<T>>)
where
    T: ComponentBody + Assign,
{
    let Some(over) = src else { return };
    if let (Some(Component::Object(base)), Component::Object(value)) = (dst.as_mut(), over) {
        base.assign_from(value);
        return;
    }
    *dst = Some(over.clone());
}

pub(crate) fn boxed_component<T>(
    dst: &mut Option<Box<Component<T>>>,
    src: &Option<Box<Component<T>>>,
) where
    T: ComponentBody + Assign,
{
    let Some(over) = src else { return };
    if let (Some(base), Component::Object(value)) = (dst.as_mut(), over.as_ref()) {
        if let Component::Object(base) = base.as_mut() {
            base.assign_from(value);
            return;
        }
    }
    *dst = Some(over.clone());
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::commit::{Commit, User};
    use crate::compare::compare_commits;
    use crate::dataset::Dataset;
    use crate::kind::Kind;
    use crate::structure::Structure;

    #[test]
    fn last_non_empty_value_wins() {
        let t1 = Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap();
        let doug = User {
            id: "doug_id".into(),
            email: "doug@example.com".into(),
            ..Default::default()
        };
        let mut expect = Commit {
            kind: Kind::commit(),
            author: Some(doug.clone()),
            timestamp: Some(t1),
            title: "expect title".into(),
            message: "expect message".into(),
            ..Default::default()
        };
        expect.set_path(Some(Address::new("a")));

        let mut got = Commit {
            author: Some(User {
                id: "maha_id".into(),
                email: "maha@example.com".into(),
                ..Default::default()
            }),
            title: "title".into(),
            message: "message".into(),
            ..Default::default()
        };
        let first = Commit {
            author: Some(doug),
            kind: Kind::commit(),
            title: "expect title".into(),
            ..Default::default()
        };
        let mut second = Commit {
            timestamp: Some(t1),
            message: "expect message".into(),
            ..Default::default()
        };
        second.set_path(Some(Address::new("a")));

        got.assign([Some(&first), Some(&second)]);
        compare_commits(Some(&expect), Some(&got)).unwrap();
        assert_eq!(got.path(), expect.path());

        got.assign([None, None]);
        compare_commits(Some(&expect), Some(&got)).unwrap();

        let mut empty = Commit::default();
        empty.assign([Some(&expect)]);
        compare_commits(Some(&expect), Some(&empty)).unwrap();
    }

    #[test]
    fn nested_objects_merge_instead_of_replace() {
        let mut base = Dataset {
            structure: Some(Component::Object(Structure {
                encoding: "utf-8".into(),
                ..Default::default()
            })),
            ..Default::default()
        };
        let over = Dataset {
            structure: Some(Component::Object(Structure {
                length: 42,
                ..Default::default()
            })),
            ..Default::default()
        };
        base.assign_from(&over);
        let st = base.structure.as_ref().and_then(Component::as_object).unwrap();
        assert_eq!(st.encoding, "utf-8");
        assert_eq!(st.length, 42);
    }

    #[test]
    fn reference_override_replaces_object() {
        let mut base = Dataset {
            commit: Some(Component::Object(Commit {
                title: "t".into(),
                ..Default::default()
            })),
            ..Default::default()
        };
        let over = Dataset {
            commit: Some(Component::reference("/map/Qmc")),
            ..Default::default()
        };
        base.assign_from(&over);
        assert_eq!(base.commit, Some(Component::reference("/map/Qmc")));
    }

    #[test]
    fn object_override_replaces_reference() {
        let mut base = Dataset {
            commit: Some(Component::reference("/map/Qmc")),
            ..Default::default()
        };
        let commit = Commit {
            title: "t".into(),
            ..Default::default()
        };
        let over = Dataset {
            commit: Some(Component::Object(commit.clone())),
            ..Default::default()
        };
        base.assign_from(&over);
        assert_eq!(base.commit, Some(Component::Object(commit)));
    }

    #[test]
    fn scalar_helpers_skip_zero_values() {
        let mut s = "keep".to_string();
        string(&mut s, "");
        assert_eq!(s, "keep");
        let mut n = 3;
        number(&mut n, 0);
        assert_eq!(n, 3);
        let mut v = vec![1];
        vec(&mut v, &[]);
        assert_eq!(v, vec![1]);
    }
}
