// Tue Jan 13 2026 - Alex

use crate::config::Config;
use crate::pattern::error::PatternError;
use crate::pattern::multi::MultiPattern;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub pattern: String,
    pub name: String,
}

/// Either `{"pattern": "name", ...}` or `["pattern", ...]` named by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternFile {
    entries: Vec<PatternEntry>,
}

impl PatternFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, PatternError> {
        let entries = match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(pattern, name)| match name {
                    Value::String(name) => Ok(PatternEntry { pattern, name }),
                    other => Err(PatternError::InputFormat(format!(
                        "name of pattern {:?} must be a string, got {}",
                        pattern, other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::String(pattern) => Ok(PatternEntry {
                        pattern,
                        name: i.to_string(),
                    }),
                    other => Err(PatternError::InputFormat(format!(
                        "pattern #{} must be a string, got {}",
                        i, other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(PatternError::InputFormat(format!(
                    "patterns file must be either a list or a mapping, got {}",
                    kind_of(&other)
                )))
            }
        };

        Ok(Self { entries })
    }

    pub fn from_json(text: &str) -> Result<Self, PatternError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PatternError> {
        Self::from_value(serde_json::from_reader(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PatternError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn push(&mut self, pattern: &str, name: &str) {
        self.entries.push(PatternEntry {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds every entry to a fresh builder, in document order. The first
    /// rejected pattern aborts the load.
    pub fn to_multi_pattern(&self, config: &Config) -> Result<MultiPattern, PatternError> {
        let mut multi = MultiPattern::with_config(config);
        for entry in &self.entries {
            multi.add_pattern(&entry.pattern, &entry.name)?;
        }
        Ok(multi)
    }

    pub fn to_value(&self) -> Value {
        let positional = self
            .entries
            .iter()
            .enumerate()
            .all(|(i, e)| e.name == i.to_string());

        if positional {
            Value::Array(
                self.entries
                    .iter()
                    .map(|e| Value::String(e.pattern.clone()))
                    .collect(),
            )
        } else {
            let mut map = Map::new();
            for e in &self.entries {
                map.insert(e.pattern.clone(), Value::String(e.name.clone()));
            }
            Value::Object(map)
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, PatternError> {
        let value = self.to_value();
        let text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }
}

impl FromIterator<PatternEntry> for PatternFile {
    fn from_iter<I: IntoIterator<Item = PatternEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
