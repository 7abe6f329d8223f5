//! Runtime message templates.
//!
//! Templates use a subset of `format!` syntax:
//!
//! | Placeholder | Substitutes |
//! |-------------|-------------|
//! | `{}` / `{N}` | next / N-th argument via `Display` |
//! | `{:?}` / `{N:?}` | next / N-th argument via `Debug` |
//! | `{:w}` / `{N:w}` | next / N-th argument via `Display`, and marks it as the cause |
//! | `{{` / `}}` | literal braces |
//!
//! Construction runs in two phases. [`Template::parse`] validates the
//! template against the arguments and decides which argument (if any) is the
//! cause; [`Template::substitute`] then produces the message text. The cause
//! is stored on the node, never re-derived from the template later.

use core::fmt::Write as _;

use crate::arg::Arg;
use crate::error::ErfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Display,
    Debug,
    Wrap,
}

#[derive(Debug)]
enum Piece<'t> {
    Lit(&'t str),
    Brace(char),
    Arg { index: usize, style: Style },
}

/// A parsed template, validated against a concrete argument list.
#[derive(Debug)]
pub(crate) struct Template<'t> {
    pieces: Vec<Piece<'t>>,
    wrap: Option<usize>,
}

fn invalid(offset: usize, reason: &'static str) -> ErfError {
    ErfError::Template { offset, reason }
}

impl<'t> Template<'t> {
    /// Parse `template` and check every placeholder against `args`.
    pub(crate) fn parse(template: &'t str, args: &[Arg]) -> Result<Self, ErfError> {
        let bytes = template.as_bytes();
        let mut pieces = Vec::new();
        let mut used = vec![false; args.len()];
        let mut wrap = None;
        let mut next_implicit = 0usize;
        let mut lit_start = 0usize;
        let mut i = 0usize;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    push_lit(&mut pieces, &template[lit_start..i]);
                    pieces.push(Piece::Brace('{'));
                    i += 2;
                    lit_start = i;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    push_lit(&mut pieces, &template[lit_start..i]);
                    pieces.push(Piece::Brace('}'));
                    i += 2;
                    lit_start = i;
                }
                b'}' => return Err(invalid(i, "unmatched '}'")),
                b'{' => {
                    push_lit(&mut pieces, &template[lit_start..i]);
                    let close = template[i..]
                        .find('}')
                        .map(|rel| i + rel)
                        .ok_or(invalid(i, "unclosed '{'"))?;
                    let inner = &template[i + 1..close];
                    let (position, spec) = match inner.split_once(':') {
                        Some((p, s)) => (p, s),
                        None => (inner, ""),
                    };
                    let style = match spec {
                        "" => Style::Display,
                        "?" => Style::Debug,
                        "w" => Style::Wrap,
                        _ => return Err(invalid(i, "unknown format spec")),
                    };
                    let index = if position.is_empty() {
                        let index = next_implicit;
                        next_implicit += 1;
                        index
                    } else {
                        position
                            .parse::<usize>()
                            .map_err(|_| invalid(i, "invalid argument index"))?
                    };
                    let Some(arg) = args.get(index) else {
                        return Err(invalid(i, "missing argument"));
                    };
                    if style == Style::Wrap {
                        if !arg.is_error() {
                            return Err(invalid(i, "wrap placeholder needs an error argument"));
                        }
                        match wrap {
                            Some(existing) if existing != index => {
                                return Err(invalid(i, "multiple wrap placeholders"));
                            }
                            _ => wrap = Some(index),
                        }
                    }
                    used[index] = true;
                    pieces.push(Piece::Arg { index, style });
                    i = close + 1;
                    lit_start = i;
                }
                _ => i += 1,
            }
        }
        push_lit(&mut pieces, &template[lit_start..]);

        if used.iter().any(|u| !u) {
            return Err(invalid(template.len(), "argument never used"));
        }
        Ok(Self { pieces, wrap })
    }

    /// Index of the argument designated as the cause.
    pub(crate) fn wrap_index(&self) -> Option<usize> {
        self.wrap
    }

    /// Render the message text.
    pub(crate) fn substitute(&self, args: &[Arg]) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match *piece {
                Piece::Lit(s) => out.push_str(s),
                Piece::Brace(c) => out.push(c),
                Piece::Arg { index, style } => {
                    let arg = &args[index];
                    // Writing into a String cannot fail.
                    let _ = match style {
                        Style::Display | Style::Wrap => write!(out, "{}", arg.display()),
                        Style::Debug => write!(out, "{:?}", arg),
                    };
                }
            }
        }
        out
    }
}

fn push_lit<'t>(pieces: &mut Vec<Piece<'t>>, s: &'t str) {
    if !s.is_empty() {
        pieces.push(Piece::Lit(s));
    }
}
