// Tue Jan 13 2026 - Alex

use crate::pattern::error::PatternError;
use crate::pattern::namespace::{self, UserGroup};
use crate::pattern::parser::{ByteEquality, Fragment, Syntax};
use itertools::Itertools;
use once_cell::unsync::OnceCell;
use regex::bytes::{Regex, RegexBuilder};

/// Byte-oriented engine: `.` and escapes match single bytes, never UTF-8
/// sequences.
pub fn build_regex(expr: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(expr)
        .unicode(false)
        .size_limit(size_limit)
        .build()
}

#[derive(Debug, Clone)]
pub struct SubPattern {
    index: usize,
    name: String,
    source: String,
    fragment: Fragment,
}

impl SubPattern {
    pub fn new(index: usize, name: &str, source: &str, fragment: Fragment) -> Self {
        Self {
            index,
            name: name.to_string(),
            source: source.to_string(),
            fragment,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn syntax(&self) -> Syntax {
        self.fragment.syntax
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn constraints(&self) -> &[ByteEquality] {
        &self.fragment.constraints
    }

    /// The fragment followed by this sub-pattern's marker group. The
    /// fragment is grouped so a top-level `|` cannot split the marker off.
    pub fn alternative(&self) -> String {
        format!(
            "(?:{}){}",
            self.fragment.expr,
            namespace::marker_group(self.index)
        )
    }
}

pub struct CompositePattern {
    regex: Regex,
    alternatives: Vec<String>,
    tails: Vec<OnceCell<Regex>>,
    groups: Vec<Vec<UserGroup>>,
    size_limit: usize,
}

impl CompositePattern {
    pub fn compile(sub_patterns: &[SubPattern], size_limit: usize) -> Result<Self, PatternError> {
        if sub_patterns.is_empty() {
            return Err(PatternError::CompositeCompile(
                "no patterns have been added".to_string(),
            ));
        }

        let alternatives: Vec<String> = sub_patterns.iter().map(SubPattern::alternative).collect();
        let expr = alternatives.iter().join("|");

        let regex = build_regex(&expr, size_limit)
            .map_err(|e| PatternError::CompositeCompile(e.to_string()))?;

        let mut groups = vec![Vec::new(); sub_patterns.len()];
        for group in namespace::user_groups(regex.capture_names().flatten()) {
            match groups.get_mut(group.index) {
                Some(slot) => slot.push(group),
                None => {
                    return Err(PatternError::Internal(format!(
                        "group {:?} refers to missing sub-pattern {}",
                        group.key, group.index
                    )))
                }
            }
        }

        log::debug!(
            "compiled {} sub-patterns into a {} byte expression",
            sub_patterns.len(),
            expr.len()
        );

        Ok(Self {
            regex,
            tails: (0..alternatives.len()).map(|_| OnceCell::new()).collect(),
            alternatives,
            groups,
            size_limit,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn group_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.regex.capture_names().flatten()
    }

    pub fn user_groups(&self) -> Vec<UserGroup> {
        self.groups.iter().flatten().cloned().collect()
    }

    pub fn groups_of(&self, index: usize) -> &[UserGroup] {
        self.groups.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tail(&self, from: usize) -> Result<Option<&Regex>, PatternError> {
        let Some(cell) = self.tails.get(from) else {
            return Ok(None);
        };

        cell.get_or_try_init(|| {
            let expr = self.alternatives[from..].iter().join("|");
            build_regex(&expr, self.size_limit)
                .map_err(|e| PatternError::CompositeCompile(e.to_string()))
        })
        .map(Some)
    }
}
