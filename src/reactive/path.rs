use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::constants::MODEL_ROOT;
use crate::DigestError;

/// One step of a model path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.name` or `['name']`
    Key(String),
    /// `[3]`
    Index(usize),
}

/// Parsed model path expression such as `model.address['zip']` or `model.items[0]`.
///
/// Every path starts at the `model` root. Missing members resolve to `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPath {
    source: String,
    segments: Vec<PathSegment>,
}

impl ModelPath {
    pub fn parse(expression: &str) -> Result<Self, DigestError> {
        let fail = |reason: &str| DigestError::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let source = expression.trim();
        let rest = source
            .strip_prefix(MODEL_ROOT)
            .ok_or_else(|| fail("path must start with `model`"))?;

        let chars: Vec<char> = rest.chars().collect();
        if chars.first().is_some_and(|c| is_ident_char(*c)) {
            return Err(fail("path must start with `model`"));
        }

        let mut segments = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            match chars[pos] {
                '.' => {
                    pos += 1;
                    let start = pos;
                    while pos < chars.len() && is_ident_char(chars[pos]) {
                        pos += 1;
                    }
                    if start == pos {
                        return Err(fail("expected a member name after `.`"));
                    }
                    segments.push(PathSegment::Key(chars[start..pos].iter().collect()));
                }
                '[' => {
                    pos = skip_whitespace(&chars, pos + 1);
                    let segment = match chars.get(pos) {
                        Some(quote @ ('\'' | '"')) => {
                            let (name, next) = read_quoted(&chars, pos + 1, *quote)
                                .ok_or_else(|| fail("unterminated string in `[...]`"))?;
                            pos = next;
                            PathSegment::Key(name)
                        }
                        Some(c) if c.is_ascii_digit() => {
                            let start = pos;
                            while pos < chars.len() && chars[pos].is_ascii_digit() {
                                pos += 1;
                            }
                            let digits: String = chars[start..pos].iter().collect();
                            let index = digits.parse().map_err(|_| fail("index out of range"))?;
                            PathSegment::Index(index)
                        }
                        _ => return Err(fail("expected a quoted name or an index in `[...]`")),
                    };
                    pos = skip_whitespace(&chars, pos);
                    if chars.get(pos) != Some(&']') {
                        return Err(fail("missing `]`"));
                    }
                    pos += 1;
                    segments.push(segment);
                }
                c if c.is_whitespace() && skip_whitespace(&chars, pos) == chars.len() => break,
                _ => return Err(fail("unexpected character")),
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Builds the default path of a field key: `model['{key}']`
    pub fn for_key(key: &str) -> String {
        let escaped = key.replace('\\', "\\\\").replace('\'', "\\'");
        format!("{MODEL_ROOT}['{escaped}']")
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Looks the path up in `root`; anything missing yields `null`.
    pub fn resolve(
        &self,
        root: &Value,
    ) -> Value {
        let mut current = root;
        for segment in &self.segments {
            let next = match (segment, current) {
                (PathSegment::Key(name), Value::Object(map)) => map.get(name),
                (PathSegment::Key(name), Value::Array(items)) => {
                    name.parse::<usize>().ok().and_then(|index| items.get(index))
                }
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
                (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }
}

impl FromStr for ModelPath {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelPath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn skip_whitespace(
    chars: &[char],
    mut pos: usize,
) -> usize {
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

/// Reads up to the closing `quote`, honoring backslash escapes.
/// Returns the unescaped text and the position after the quote.
fn read_quoted(
    chars: &[char],
    mut pos: usize,
    quote: char,
) -> Option<(String, usize)> {
    let mut out = String::new();
    while pos < chars.len() {
        match chars[pos] {
            '\\' => {
                out.push(*chars.get(pos + 1)?);
                pos += 2;
            }
            c if c == quote => return Some((out, pos + 1)),
            c => {
                out.push(c);
                pos += 1;
            }
        }
    }
    None
}
