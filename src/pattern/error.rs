// Tue Jan 13 2026 - Alex

use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("cannot parse pattern {pattern:?}:\n{}", .reasons.iter().join("\n"))]
    Syntax {
        pattern: String,
        reasons: Vec<String>,
    },
    #[error("group name conflict for {name:?}: {reason}")]
    GroupNameConflict { name: String, reason: String },
    #[error("composite pattern compilation failed: {0}")]
    CompositeCompile(String),
    #[error("invalid pattern document: {0}")]
    InputFormat(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PatternError {
    pub fn syntax(pattern: &str, reasons: Vec<String>) -> Self {
        PatternError::Syntax {
            pattern: pattern.to_string(),
            reasons,
        }
    }

    pub fn conflict(name: &str, reason: impl Into<String>) -> Self {
        PatternError::GroupNameConflict {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, PatternError::Syntax { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PatternError::GroupNameConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_lists_every_reason() {
        let err = PatternError::syntax("zz", vec!["not plain".into(), "not token".into()]);
        let text = err.to_string();
        assert!(text.contains("\"zz\""));
        assert!(text.contains("not plain\nnot token"));
        assert!(err.is_syntax());
    }

    #[test]
    fn test_conflict_error_display() {
        let err = PatternError::conflict("val", "already declared");
        assert_eq!(err.to_string(), "group name conflict for \"val\": already declared");
        assert!(err.is_conflict());
    }
}
