// Tue Jan 13 2026 - Alex

use crate::config::Config;
use crate::pattern::compiler::{CompositePattern, SubPattern};
use crate::pattern::error::PatternError;
use crate::pattern::matcher::{Matches, ScanMatch};
use crate::pattern::namespace::{GroupNamespace, UserGroup};
use crate::pattern::parser::{PatternParser, DEFAULT_SIZE_LIMIT};
use crate::utils::logging::scoped_timer;

/// Patterns are only ever appended. Any addition drops the compiled
/// composite; the next query rebuilds it.
pub struct MultiPattern {
    sub_patterns: Vec<SubPattern>,
    parser: PatternParser,
    namespace: GroupNamespace,
    size_limit: usize,
    compiled: Option<CompositePattern>,
}

impl MultiPattern {
    pub fn new() -> Self {
        Self::with_validation(true)
    }

    pub fn with_validation(validate: bool) -> Self {
        Self {
            sub_patterns: Vec::new(),
            parser: PatternParser::new().with_validation(validate),
            namespace: GroupNamespace::new(),
            size_limit: DEFAULT_SIZE_LIMIT,
            compiled: None,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        let mut multi = Self::with_validation(config.validate_patterns);
        multi.size_limit = config.size_limit;
        multi.parser = PatternParser::new()
            .with_validation(config.validate_patterns)
            .with_size_limit(config.size_limit);
        multi
    }

    pub fn add_pattern(&mut self, pattern: &str, name: &str) -> Result<usize, PatternError> {
        let index = self.sub_patterns.len();
        let fragment = self.parser.parse(pattern, index, &mut self.namespace)?;

        log::debug!(
            "added {} pattern #{} {:?} as {:?}",
            fragment.syntax,
            index,
            pattern,
            name
        );

        self.sub_patterns.push(SubPattern::new(index, name, pattern, fragment));
        self.compiled = None;
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.sub_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_patterns.is_empty()
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn validates(&self) -> bool {
        self.parser.validates()
    }

    pub fn sub_patterns(&self) -> &[SubPattern] {
        &self.sub_patterns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sub_patterns.iter().map(SubPattern::name)
    }

    pub fn namespace(&self) -> &GroupNamespace {
        &self.namespace
    }

    pub fn compile(&mut self) -> Result<&CompositePattern, PatternError> {
        let _timer = scoped_timer("compile");
        let composite = CompositePattern::compile(&self.sub_patterns, self.size_limit)?;
        let composite = self.compiled.insert(composite);
        Ok(&*composite)
    }

    fn ensure_compiled(&mut self) -> Result<(), PatternError> {
        if self.compiled.is_none() {
            self.compile()?;
        }
        Ok(())
    }

    pub fn user_groups(&mut self) -> Result<Vec<UserGroup>, PatternError> {
        self.ensure_compiled()?;
        Ok(self
            .compiled
            .as_ref()
            .map(CompositePattern::user_groups)
            .unwrap_or_default())
    }

    pub fn match_all<'s, 'h>(&'s mut self, haystack: &'h [u8]) -> Result<Matches<'s, 'h>, PatternError> {
        self.ensure_compiled()?;
        let composite = self
            .compiled
            .as_ref()
            .ok_or_else(|| PatternError::Internal("composite missing after compile".to_string()))?;
        Ok(Matches::new(composite, &self.sub_patterns, haystack))
    }

    pub fn find_first(&mut self, haystack: &[u8]) -> Result<Option<ScanMatch>, PatternError> {
        self.match_all(haystack)?.next().transpose()
    }

    pub fn count_matches(&mut self, haystack: &[u8]) -> Result<usize, PatternError> {
        let mut count = 0;
        for found in self.match_all(haystack)? {
            found?;
            count += 1;
        }
        Ok(count)
    }
}

impl Default for MultiPattern {
    fn default() -> Self {
        Self::new()
    }
}
