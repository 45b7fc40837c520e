// Tue Jan 13 2026 - Alex

use crate::pattern::compiler::build_regex;
use crate::pattern::error::PatternError;
use crate::pattern::escape;
use crate::pattern::namespace::{self, GroupNamespace};
use regex_syntax::ast::{self, print::Printer, Ast, GroupKind};
use serde::Serialize;
use std::fmt;

pub const RAW_PREFIX: char = '+';
pub const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

const ANY_BYTE: &str = "(?s:.)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    Plain,
    Token,
    Raw,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Plain => write!(f, "plain"),
            Syntax::Token => write!(f, "token"),
            Syntax::Raw => write!(f, "raw"),
        }
    }
}

// offsets relative to the match start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteEquality {
    pub first: usize,
    pub second: usize,
}

/// Engine text for one pattern, with every group key already suffixed by
/// the sub-pattern index. Does not include the marker group.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub syntax: Syntax,
    pub expr: String,
    pub width: Option<usize>,
    pub constraints: Vec<ByteEquality>,
    pub group_names: Vec<String>,
}

enum Rejection {
    Reason(String),
    Fatal(PatternError),
}

impl From<String> for Rejection {
    fn from(reason: String) -> Self {
        Rejection::Reason(reason)
    }
}

pub struct PatternParser {
    validate: bool,
    size_limit: usize,
}

impl PatternParser {
    pub fn new() -> Self {
        Self {
            validate: true,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn validates(&self) -> bool {
        self.validate
    }

    /// Parses `text` as sub-pattern `index`. Grammars are tried in order and
    /// each must accept the whole string.
    pub fn parse(
        &self,
        text: &str,
        index: usize,
        namespace: &mut GroupNamespace,
    ) -> Result<Fragment, PatternError> {
        let mut reasons = Vec::with_capacity(3);

        for syntax in [Syntax::Plain, Syntax::Token, Syntax::Raw] {
            let attempt = match syntax {
                Syntax::Plain => parse_plain(text),
                Syntax::Token => parse_token(text, index),
                Syntax::Raw => self.parse_raw(text, index, namespace),
            };

            match attempt {
                Ok(fragment) => return Ok(fragment),
                Err(Rejection::Fatal(err)) => return Err(err),
                Err(Rejection::Reason(reason)) => {
                    log::trace!("pattern {:?} is not {}: {}", text, syntax, reason);
                    reasons.push(format!("{}: {}", syntax, reason));
                }
            }
        }

        if !self.validate {
            reasons = vec!["matches none of the plain, token or raw syntaxes".to_string()];
        }
        Err(PatternError::syntax(text, reasons))
    }

    fn parse_raw(
        &self,
        text: &str,
        index: usize,
        namespace: &mut GroupNamespace,
    ) -> Result<Fragment, Rejection> {
        let body = text
            .strip_prefix(RAW_PREFIX)
            .ok_or_else(|| format!("raw patterns must start with {:?}", RAW_PREFIX))?;

        let expr = escape::render(&escape::decode(body)?);
        let (expr, group_names) = suffix_group_names(&expr, index)?;

        if self.validate {
            build_regex(&expr, self.size_limit).map_err(|e| e.to_string())?;
        }
        namespace
            .check(&group_names, self.validate)
            .map_err(Rejection::Fatal)?;
        namespace.record(&group_names);

        Ok(Fragment {
            syntax: Syntax::Raw,
            expr,
            width: None,
            constraints: Vec::new(),
            group_names,
        })
    }
}

impl Default for PatternParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_plain(text: &str) -> Result<Fragment, Rejection> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_hexdigit() || c.is_whitespace()) {
        return Err("string is not made of hex digits and whitespace".to_string().into());
    }

    let digits: Vec<u8> = text.bytes().filter(u8::is_ascii_hexdigit).collect();
    if digits.is_empty() {
        return Err("no hex digits".to_string().into());
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()).into());
    }

    let bytes = digits
        .chunks(2)
        .map(|pair| (escape::hex_value(pair[0]) << 4) | escape::hex_value(pair[1]))
        .collect::<Vec<u8>>();

    Ok(Fragment {
        syntax: Syntax::Plain,
        expr: escape::literal_bytes(&bytes),
        width: Some(bytes.len()),
        constraints: Vec::new(),
        group_names: Vec::new(),
    })
}

fn parse_token(text: &str, index: usize) -> Result<Fragment, Rejection> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err("empty pattern".to_string().into());
    }

    let mut expr = String::new();
    let mut first_seen: [Option<usize>; 26] = [None; 26];
    let mut group_names = Vec::new();
    let mut constraints = Vec::new();
    let mut width = 0;
    let mut i = 0;

    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1).copied()) {
            (b'\\', Some(b'x')) => {
                let hex = bytes.get(i + 2..i + 4).filter(|h| h.iter().all(is_lower_hex));
                let Some(hex) = hex else {
                    return Err(format!("bad \\x escape at offset {}", i).into());
                };
                let byte = (escape::hex_value(hex[0]) << 4) | escape::hex_value(hex[1]);
                escape::push_literal(&mut expr, byte);
                i += 4;
            }
            (b'?', Some(b'?')) => {
                expr.push_str(ANY_BYTE);
                i += 2;
            }
            (letter, Some(next)) if letter.is_ascii_uppercase() && next == letter => {
                let slot = (letter - b'A') as usize;
                match first_seen[slot] {
                    Some(first) => {
                        expr.push_str(ANY_BYTE);
                        constraints.push(ByteEquality { first, second: width });
                    }
                    None => {
                        let name = (letter as char).to_string();
                        expr.push_str(&format!(
                            "(?P<{}>{})",
                            namespace::user_key(&name, index),
                            ANY_BYTE
                        ));
                        group_names.push(name);
                        first_seen[slot] = Some(width);
                    }
                }
                i += 2;
            }
            (c, _) => {
                return Err(format!("unexpected {:?} at offset {}", c as char, i).into());
            }
        }
        width += 1;
    }

    Ok(Fragment {
        syntax: Syntax::Token,
        expr,
        width: Some(width),
        constraints,
        group_names,
    })
}

// Printing from the tree drops verbose-mode comments, so the text can be
// wrapped safely.
fn suffix_group_names(expr: &str, index: usize) -> Result<(String, Vec<String>), String> {
    let mut parsed = ast::parse::Parser::new()
        .parse(expr)
        .map_err(|e| e.to_string())?;

    let mut names = Vec::new();
    rename_captures(&mut parsed, index, &mut names);

    let mut out = String::with_capacity(expr.len() + names.len() * 4);
    Printer::new()
        .print(&parsed, &mut out)
        .map_err(|e| e.to_string())?;

    Ok((out, names))
}

fn rename_captures(node: &mut Ast, index: usize, names: &mut Vec<String>) {
    match node {
        Ast::Group(group) => {
            if let GroupKind::CaptureName { name, .. } = &mut group.kind {
                names.push(name.name.clone());
                name.name = namespace::user_key(&name.name, index);
            }
            rename_captures(&mut group.ast, index, names);
        }
        Ast::Repetition(rep) => rename_captures(&mut rep.ast, index, names),
        Ast::Alternation(alt) => {
            for child in alt.asts.iter_mut() {
                rename_captures(child, index, names);
            }
        }
        Ast::Concat(concat) => {
            for child in concat.asts.iter_mut() {
                rename_captures(child, index, names);
            }
        }
        _ => {}
    }
}

fn is_lower_hex(b: &u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Fragment, PatternError> {
        PatternParser::new().parse(text, 0, &mut GroupNamespace::new())
    }

    #[test]
    fn test_plain_pattern() {
        let frag = parse("ab cd\tEF").unwrap();
        assert_eq!(frag.syntax, Syntax::Plain);
        assert_eq!(frag.expr, "\\xab\\xcd\\xef");
        assert_eq!(frag.width, Some(3));
        assert!(frag.group_names.is_empty());
    }

    #[test]
    fn test_plain_rejects_odd_digits() {
        let err = parse("abc").unwrap_err();
        assert!(err.to_string().contains("odd number of hex digits"));
    }

    #[test]
    fn test_hex_only_string_is_plain() {
        assert_eq!(parse("AABB").unwrap().syntax, Syntax::Plain);
    }

    #[test]
    fn test_token_pattern() {
        let frag = PatternParser::new()
            .parse("AA??BB\\x90AA", 4, &mut GroupNamespace::new())
            .unwrap();
        assert_eq!(frag.syntax, Syntax::Token);
        assert_eq!(
            frag.expr,
            "(?P<A_4>(?s:.))(?s:.)(?P<B_4>(?s:.))\\x90(?s:.)"
        );
        assert_eq!(frag.width, Some(5));
        assert_eq!(frag.group_names, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(frag.constraints, vec![ByteEquality { first: 0, second: 4 }]);
    }

    #[test]
    fn test_token_rejects_single_letter_and_uppercase_escape() {
        assert!(parse("A?").is_err());
        assert!(parse("GG\\xAB").is_err());
        assert!(parse("GH").is_err());
    }

    #[test]
    fn test_raw_pattern_is_decoded_and_suffixed() {
        let mut ns = GroupNamespace::new();
        let frag = PatternParser::new()
            .parse(r"+\x41(?P<x>.)(?<y>\d)", 2, &mut ns)
            .unwrap();
        assert_eq!(frag.syntax, Syntax::Raw);
        assert_eq!(frag.expr, r"A(?P<x_2>.)(?<y_2>\d)");
        assert_eq!(frag.group_names, vec!["x".to_string(), "y".to_string()]);
        assert!(ns.contains("x") && ns.contains("y"));
    }

    #[test]
    fn test_raw_nested_groups_are_suffixed() {
        let frag = parse(r"+(?P<outer>a(?P<inner>b)|c)*").unwrap();
        assert_eq!(frag.expr, r"(?P<outer_0>a(?P<inner_0>b)|c)*");
    }

    #[test]
    fn test_raw_verbose_comments_are_dropped() {
        let frag = parse("+(?x) (?P<v> . ) # trailing").unwrap();
        assert_eq!(frag.expr, "(?x)(?P<v_0>.)");
        assert_eq!(frag.group_names, vec!["v".to_string()]);
    }

    #[test]
    fn test_raw_group_reuse_is_a_conflict() {
        let parser = PatternParser::new();
        let mut ns = GroupNamespace::new();
        parser.parse("+(?P<v>.)", 0, &mut ns).unwrap();
        let err = parser.parse("+(?P<v>..)", 1, &mut ns).unwrap_err();
        assert!(err.is_conflict());

        let lenient = PatternParser::new().with_validation(false);
        assert!(lenient.parse("+(?P<v>...)", 2, &mut ns).unwrap_err().is_conflict());
    }

    #[test]
    fn test_raw_separator_only_checked_when_validating() {
        let err = parse("+(?P<a_b>.)").unwrap_err();
        assert!(err.is_conflict());

        let frag = PatternParser::new()
            .with_validation(false)
            .parse("+(?P<a_b>.)", 1, &mut GroupNamespace::new())
            .unwrap();
        assert_eq!(frag.expr, "(?P<a_b_1>.)");
    }

    #[test]
    fn test_raw_must_compile_when_validating() {
        // Unicode classes are refused by the byte-oriented engine
        let err = parse(r"+\pL").unwrap_err();
        assert!(err.is_syntax());

        let frag = PatternParser::new()
            .with_validation(false)
            .parse(r"+\pL", 0, &mut GroupNamespace::new());
        assert!(frag.is_ok());
    }

    #[test]
    fn test_failure_aggregates_reasons_only_when_validating() {
        match parse("zz").unwrap_err() {
            PatternError::Syntax { reasons, .. } => {
                assert_eq!(reasons.len(), 3);
                assert!(reasons[0].starts_with("plain"));
                assert!(reasons[1].starts_with("token"));
                assert!(reasons[2].starts_with("raw"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let lenient = PatternParser::new().with_validation(false);
        match lenient.parse("zz", 0, &mut GroupNamespace::new()).unwrap_err() {
            PatternError::Syntax { reasons, .. } => assert_eq!(reasons.len(), 1),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
