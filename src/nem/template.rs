//! Command templates.
//!
//! A template is a shell command with brace placeholders:
//!
//! - `{1}`, `{2}`: positional, filled by the n-th invocation argument
//! - `{name}`, `{name=default}`: named, filled in order of appearance by the
//!   invocation arguments, falling back to the default
//!
//! `{{` and `}}` stand for literal braces. Arguments no placeholder consumed are
//! appended to the end of the command, so `echo` invoked with `hello` runs
//! `echo hello`.

use crate::error::{NemError, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Positional(usize),
    Named {
        name: String,
        default: Option<String>,
    },
}

impl Placeholder {
    fn parse(field: &str) -> Self {
        if let Ok(n) = field.parse::<usize>() {
            if n > 0 {
                return Placeholder::Positional(n);
            }
        }
        match field.split_once('=') {
            Some((name, default)) => Placeholder::Named {
                name: name.to_string(),
                default: Some(default.to_string()),
            },
            None => Placeholder::Named {
                name: field.to_string(),
                default: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Raw field text between the braces, plus its parsed form.
    Field(String, Placeholder),
}

/// Splits a template into literal text and placeholders.
///
/// An unterminated `{` is kept as literal text.
pub fn parse(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for f in chars.by_ref() {
                    if f == '}' {
                        closed = true;
                        break;
                    }
                    field.push(f);
                }
                if closed {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let placeholder = Placeholder::parse(&field);
                    segments.push(Segment::Field(field, placeholder));
                } else {
                    literal.push('{');
                    literal.push_str(&field);
                }
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Raw text of the named placeholders, in order of appearance.
pub fn named_placeholders(template: &str) -> Vec<String> {
    parse(template)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Field(raw, Placeholder::Named { .. }) => Some(raw),
            _ => None,
        })
        .collect()
}

/// Substitutes invocation arguments into a template.
pub fn fill<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String> {
    let mut out = String::new();
    let mut used = BTreeSet::new();
    let mut named_seen = 0;

    for segment in parse(template) {
        match segment {
            Segment::Literal(text) => out.push_str(&text),
            Segment::Field(_, Placeholder::Positional(n)) => {
                let arg = args.get(n - 1).ok_or_else(|| {
                    NemError::Template(format!("missing argument {{{}}} for `{}`", n, template))
                })?;
                used.insert(n - 1);
                out.push_str(arg.as_ref());
            }
            Segment::Field(_, Placeholder::Named { name, default }) => {
                let position = named_seen;
                named_seen += 1;
                match (args.get(position), default) {
                    (Some(arg), _) => {
                        used.insert(position);
                        out.push_str(arg.as_ref());
                    }
                    (None, Some(default)) => out.push_str(&default),
                    (None, None) => {
                        return Err(NemError::Template(format!(
                            "missing value for {{{}}} in `{}`",
                            name, template
                        )))
                    }
                }
            }
        }
    }

    for (i, arg) in args.iter().enumerate() {
        if !used.contains(&i) {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(arg.as_ref());
        }
    }

    Ok(out)
}
