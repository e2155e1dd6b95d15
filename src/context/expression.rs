//! Expression resolution
//!
//! A string that starts with `$` is an expression: a dotted path into the data
//! store, the outputs store, the process environment or a plugin namespace,
//! e.g. `$HomePage.Search[0]`. `$$` escapes a literal dollar sign. Anything
//! else is a literal and passes through untouched.
//!
//! A path resolves in the first namespace where the whole path exists, in the
//! order data, outputs, environment (single-segment paths only), plugins. A
//! value that is itself an expression is resolved again, up to
//! [`MAX_DEPTH`] levels. Nothing is cached; every lookup sees the stores as
//! they are at that moment.

use serde_json::{Map, Value};

use crate::common::{Error, Result};
use crate::registry::Registry;

/// Marks a string as an expression
pub const SIGIL: char = '$';

/// Nesting limit for expressions that resolve to other expressions
pub const MAX_DEPTH: usize = 16;

/// One step of an expression path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Whether `text` is an expression rather than a literal
pub fn is_expression(text: &str) -> bool {
    text.starts_with(SIGIL) && !text.starts_with("$$")
}

/// Split a path (without the sigil) into segments.
/// The first segment is always a field.
pub fn parse_path(path: &str) -> std::result::Result<Vec<Segment>, String> {
    if path.is_empty() {
        return Err("empty path".to_string());
    }

    let mut segments = Vec::new();
    let mut field = String::new();
    let mut after_index = false;
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if field.is_empty() && !after_index {
                    return Err("empty path segment".to_string());
                }
                if !field.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut field)));
                }
                after_index = false;
                if matches!(chars.peek(), None | Some('.') | Some('[')) {
                    return Err("empty path segment".to_string());
                }
            }
            '[' => {
                if !field.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut field)));
                } else if segments.is_empty() {
                    return Err("path must start with a name".to_string());
                }
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        Some(other) => return Err(format!("unexpected '{other}' in index")),
                        None => return Err("unterminated '['".to_string()),
                    }
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| format!("invalid index '[{digits}]'"))?;
                segments.push(Segment::Index(index));
                after_index = true;
            }
            ']' => return Err("unexpected ']'".to_string()),
            c if c.is_whitespace() => return Err("whitespace in path".to_string()),
            c => {
                if after_index {
                    return Err(format!("expected '.' or '[' after index, found '{c}'"));
                }
                field.push(c);
            }
        }
    }

    if !field.is_empty() {
        segments.push(Segment::Field(field));
    }
    Ok(segments)
}

/// Follow `rest` down from `value`. Numeric fields index into arrays.
fn walk<'v>(mut value: &'v Value, rest: &[Segment]) -> Option<&'v Value> {
    for segment in rest {
        value = match (value, segment) {
            (Value::Object(map), Segment::Field(name)) => map.get(name)?,
            (Value::Array(items), Segment::Index(index)) => items.get(*index)?,
            (Value::Array(items), Segment::Field(name)) => items.get(name.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn lookup<'v>(namespace: &'v Map<String, Value>, segments: &[Segment]) -> Option<&'v Value> {
    let (Segment::Field(root), rest) = segments.split_first()? else {
        return None;
    };
    walk(namespace.get(root)?, rest)
}

/// Resolves expressions against a snapshot of the context's stores
pub struct Resolver<'a> {
    pub data: &'a Map<String, Value>,
    pub outputs: &'a Map<String, Value>,
    pub registry: &'a Registry,
}

impl Resolver<'_> {
    /// Resolve a string: expressions to their value, literals to themselves
    pub fn resolve(&self, text: &str) -> Result<Value> {
        self.resolve_at(text, text, 0)
    }

    fn resolve_at(&self, original: &str, text: &str, depth: usize) -> Result<Value> {
        if let Some(literal) = text.strip_prefix("$$") {
            return Ok(Value::String(format!("{SIGIL}{literal}")));
        }
        let Some(path) = text.strip_prefix(SIGIL) else {
            return Ok(Value::String(text.to_string()));
        };
        if depth >= MAX_DEPTH {
            return Err(Error::unresolved(
                original,
                format!("more than {MAX_DEPTH} nested expressions"),
            ));
        }

        let segments = parse_path(path).map_err(|reason| Error::unresolved(original, reason))?;
        let value = self.find(&segments).ok_or_else(|| {
            Error::unresolved(
                original,
                format!("'{path}' is not defined in data, outputs, environment or any plugin"),
            )
        })?;

        match value {
            Value::String(next) if next.starts_with(SIGIL) => {
                tracing::trace!(expression = %text, next = %next, depth, "Expression resolved to another expression");
                self.resolve_at(original, &next, depth + 1)
            }
            other => Ok(other),
        }
    }

    fn find(&self, segments: &[Segment]) -> Option<Value> {
        for namespace in [self.data, self.outputs] {
            if let Some(value) = lookup(namespace, segments) {
                return Some(value.clone());
            }
        }

        let (Segment::Field(root), rest) = segments.split_first()? else {
            return None;
        };
        if rest.is_empty() {
            if let Ok(value) = std::env::var(root) {
                return Some(Value::String(value));
            }
        }
        self.registry.resolve_expression_root(root, rest)
    }

    /// Resolve every string inside `value`, descending into arrays and objects
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        match value {
            Value::String(text) => self.resolve(text),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => self.resolve_map(map).map(Value::Object),
            other => Ok(other.clone()),
        }
    }

    pub fn resolve_map(&self, map: &Map<String, Value>) -> Result<Map<String, Value>> {
        map.iter()
            .map(|(key, value)| Ok((key.clone(), self.resolve_value(value)?)))
            .collect()
    }
}

/// Render a resolved value the way comparisons and browser commands see it
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
