// Tue Jan 13 2026 - Alex

use crate::pattern::compiler::{CompositePattern, SubPattern};
use crate::pattern::error::PatternError;
use crate::pattern::namespace::{self, GroupKey};
use indexmap::IndexMap;
use regex::bytes::{Captures, Regex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMatch {
    pub start: usize,
    pub end: usize,
    pub match_name: String,
    #[serde(skip)]
    pub index: usize,
    pub vars: IndexMap<String, Vec<u8>>,
}

impl ScanMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn var(&self, name: &str) -> Option<&[u8]> {
        self.vars.get(name).map(Vec::as_slice)
    }
}

pub struct Matches<'p, 'h> {
    composite: &'p CompositePattern,
    sub_patterns: &'p [SubPattern],
    haystack: &'h [u8],
    pos: usize,
    done: bool,
}

impl<'p, 'h> Matches<'p, 'h> {
    pub fn new(
        composite: &'p CompositePattern,
        sub_patterns: &'p [SubPattern],
        haystack: &'h [u8],
    ) -> Self {
        Self {
            composite,
            sub_patterns,
            haystack,
            pos: 0,
            done: false,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn search(&mut self) -> Result<Option<ScanMatch>, PatternError> {
        while self.pos <= self.haystack.len() {
            let regex = self.composite.regex();
            let Some(caps) = regex.captures_at(self.haystack, self.pos) else {
                return Ok(None);
            };

            let (start, _) = span(&caps)?;
            let index = fired_index(regex, &caps)?;

            if self.constraints_hold(index, start) {
                return self.build(index, &caps).map(Some);
            }

            log::debug!(
                "backreference of sub-pattern {} rejected candidate at {:#x}",
                index,
                start
            );
            if let Some(found) = self.resume_at(start, index + 1)? {
                return Ok(Some(found));
            }
            self.pos = start + 1;
        }

        Ok(None)
    }

    // Tails search the whole haystack so assertions see the bytes before
    // `start`; only a match beginning exactly at `start` counts.
    fn resume_at(&self, start: usize, mut next: usize) -> Result<Option<ScanMatch>, PatternError> {
        while let Some(tail) = self.composite.tail(next)? {
            let Some(caps) = tail.captures_at(self.haystack, start) else {
                return Ok(None);
            };
            if span(&caps)?.0 != start {
                return Ok(None);
            }

            let index = fired_index(tail, &caps)?;
            if self.constraints_hold(index, start) {
                return self.build(index, &caps).map(Some);
            }
            next = index + 1;
        }

        Ok(None)
    }

    fn constraints_hold(&self, index: usize, start: usize) -> bool {
        let Some(sub) = self.sub_patterns.get(index) else {
            return false;
        };

        sub.constraints().iter().all(|eq| {
            match (self.haystack.get(start + eq.first), self.haystack.get(start + eq.second)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        })
    }

    fn build(&self, index: usize, caps: &Captures<'_>) -> Result<ScanMatch, PatternError> {
        let (start, end) = span(caps)?;
        let sub = self.sub_patterns.get(index).ok_or_else(|| {
            PatternError::Internal(format!("marker refers to missing sub-pattern {}", index))
        })?;

        let mut vars = IndexMap::new();
        for group in self.composite.groups_of(index) {
            if let Some(value) = caps.name(&group.key) {
                vars.insert(group.name.clone(), value.as_bytes().to_vec());
            }
        }

        Ok(ScanMatch {
            start,
            end,
            match_name: sub.name().to_string(),
            index,
            vars,
        })
    }
}

impl<'p, 'h> Iterator for Matches<'p, 'h> {
    type Item = Result<ScanMatch, PatternError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.search() {
            Ok(Some(found)) => {
                self.pos = if found.is_empty() { found.end + 1 } else { found.end };
                log::trace!("{} matched at {:#x}..{:#x}", found.match_name, found.start, found.end);
                Some(Ok(found))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn span(caps: &Captures<'_>) -> Result<(usize, usize), PatternError> {
    caps.get(0)
        .map(|m| (m.start(), m.end()))
        .ok_or_else(|| PatternError::Internal("match without an overall span".to_string()))
}

// Every group of the matching alternative precedes its marker, and later
// alternatives never participate.
pub fn fired_index(regex: &Regex, caps: &Captures<'_>) -> Result<usize, PatternError> {
    let last = regex
        .capture_names()
        .enumerate()
        .filter_map(|(slot, name)| name.filter(|_| caps.get(slot).is_some()))
        .last();

    match last.and_then(namespace::decode_key) {
        Some(GroupKey::Marker(index)) => Ok(index),
        _ => Err(PatternError::Internal(format!(
            "no marker group took part in the match (last named group: {:?})",
            last
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::namespace::GroupNamespace;
    use crate::pattern::parser::PatternParser;

    fn compile(texts: &[&str]) -> (CompositePattern, Vec<SubPattern>) {
        let parser = PatternParser::new();
        let mut ns = GroupNamespace::new();
        let subs: Vec<SubPattern> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let fragment = parser.parse(text, i, &mut ns).unwrap();
                SubPattern::new(i, &format!("p{}", i), text, fragment)
            })
            .collect();
        (CompositePattern::compile(&subs, 1 << 20).unwrap(), subs)
    }

    fn run(texts: &[&str], haystack: &[u8]) -> Vec<ScanMatch> {
        let (composite, subs) = compile(texts);
        Matches::new(&composite, &subs, haystack)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_fired_index_requires_marker() {
        let regex = Regex::new("(?P<x_0>a)").unwrap();
        let caps = regex.captures(b"a").unwrap();
        assert!(matches!(fired_index(&regex, &caps), Err(PatternError::Internal(_))));
    }

    #[test]
    fn test_iteration_is_non_overlapping() {
        let found = run(&["aa aa"], &[0xaa, 0xaa, 0xaa, 0xaa, 0xaa]);
        assert_eq!(found.len(), 2);
        assert_eq!((found[0].start, found[0].end), (0, 2));
        assert_eq!((found[1].start, found[1].end), (2, 4));
    }

    #[test]
    fn test_earlier_alternative_wins_at_same_start() {
        let found = run(&["01", "0102"], &[0x01, 0x02]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].match_name, "p0");
        assert_eq!(found[0].end, 1);
    }

    #[test]
    fn test_failed_backreference_falls_through_to_later_alternative() {
        let found = run(&["GG??GG", "01"], &[0x01, 0x00, 0x02, 0x05, 0x00, 0x05]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].match_name, "p1");
        assert_eq!((found[0].start, found[0].end), (0, 1));
        assert_eq!(found[1].match_name, "p0");
        assert_eq!((found[1].start, found[1].end), (3, 6));
        assert_eq!(found[1].var("G"), Some(&[0x05][..]));
    }

    #[test]
    fn test_retried_alternative_keeps_left_context() {
        let found = run(&["GG??GG", r"+^\x01"], &[0xff, 0x01, 0x02, 0x03]);
        assert!(found.is_empty());

        let found = run(&["GG??GG", r"+\\bA"], b"xAqz");
        assert!(found.is_empty());
    }

    #[test]
    fn test_retried_alternative_must_start_at_rejected_position() {
        let found = run(&["GG??GG", r"+\\bA"], b" Aqz");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].match_name, "p1");
        assert_eq!((found[0].start, found[0].end), (1, 2));
    }

    #[test]
    fn test_resume_skips_several_rejected_alternatives() {
        let found = run(&["HH??HH", "HHHH", "+(?s:...)"], &[0x01, 0x02, 0x03]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].match_name, "p2");
        assert!(found[0].vars.is_empty());
    }

    #[test]
    fn test_vars_come_only_from_fired_sub_pattern() {
        let found = run(&["GG\\x01", "GG\\x02"], &[0x07, 0x02]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].match_name, "p1");
        assert_eq!(found[0].vars.len(), 1);
        assert_eq!(found[0].var("G"), Some(&[0x07][..]));
    }

    #[test]
    fn test_empty_matches_advance() {
        let found = run(&["+x*"], b"ab");
        let spans: Vec<_> = found.iter().map(|m| (m.start, m.end)).collect();
        assert_eq!(spans, vec![(0, 0), (1, 1), (2, 2)]);
    }
}
