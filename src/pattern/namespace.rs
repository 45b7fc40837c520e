// Tue Jan 13 2026 - Alex

//! Engine-level capture group naming.
//!
//! Every sub-pattern `i` ends with an empty marker group keyed `_i`. Every
//! user-visible group (token letters and raw named groups) is keyed
//! `name_i`. Splitting a key at its last `_` recovers both parts.

use crate::pattern::error::PatternError;
use ahash::AHashSet;
use serde::Serialize;

pub const SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    Marker(usize),
    User { name: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserGroup {
    pub name: String,
    pub key: String,
    pub index: usize,
}

pub fn marker_key(index: usize) -> String {
    format!("{}{}", SEPARATOR, index)
}

pub fn marker_group(index: usize) -> String {
    format!("(?P<{}>)", marker_key(index))
}

pub fn user_key(name: &str, index: usize) -> String {
    format!("{}{}{}", name, SEPARATOR, index)
}

pub fn decode_key(key: &str) -> Option<GroupKey> {
    let split = key.rfind(SEPARATOR)?;
    let (name, suffix) = (&key[..split], &key[split + 1..]);

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = suffix.parse().ok()?;

    if name.is_empty() {
        Some(GroupKey::Marker(index))
    } else {
        Some(GroupKey::User {
            name: name.to_string(),
            index,
        })
    }
}

pub fn user_groups<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<UserGroup> {
    keys.into_iter()
        .filter_map(|key| match decode_key(key)? {
            GroupKey::User { name, index } => Some(UserGroup {
                name,
                key: key.to_string(),
                index,
            }),
            GroupKey::Marker(_) => None,
        })
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct GroupNamespace {
    known: AHashSet<String>,
}

impl GroupNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    // the separator rule is only enforced when `strict`
    pub fn check(&self, names: &[String], strict: bool) -> Result<(), PatternError> {
        let mut local = AHashSet::with_capacity(names.len());

        for name in names {
            if strict && name.contains(SEPARATOR) {
                return Err(PatternError::conflict(
                    name,
                    format!("group names cannot include {:?}", SEPARATOR),
                ));
            }
            if !local.insert(name.as_str()) {
                return Err(PatternError::conflict(name, "declared twice in one pattern"));
            }
            if self.known.contains(name) {
                return Err(PatternError::conflict(name, "already declared by an earlier pattern"));
            }
        }

        Ok(())
    }

    pub fn record(&mut self, names: &[String]) {
        self.known.extend(names.iter().cloned());
    }
}
