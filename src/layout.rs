//! Directive parsing.
//!
//! A format directive (`{:+#4.2x}`, `{:-X}`, `{:+}` ...) is parsed once into
//! an immutable [`Layout`]; every render function takes that record as plain
//! input. Parsing is stateless: each `fmt` call builds its own layout.
//!
//! ## Error directives
//!
//! | Directive | Mode |
//! |-----------|------|
//! | `{}` | message of the first node only, no decoration |
//! | `{:x}` | every node of the chain, with stacks |
//! | `{:X}` | first node only, with stack |
//! | `{:?}` | same as `{:x}` |
//!
//! | Flag | Effect |
//! |------|--------|
//! | `+` | append `"name"="value"` tag lines |
//! | `#` | base file names instead of source-root-relative paths |
//! | `-` | omit messages, stacks only |
//! | `0` | compact stacks: `function(entry)` without file/line lines |
//! | fill + align | pad with the fill character (space unless given) |
//! | width | padding repeated before every line (default 0) |
//! | precision | indent repeated after padding (default 1, 2 with fill) |
//!
//! | Marker | Written when |
//! |--------|--------------|
//! | `{pad}*` | a traced node has no captured frames |
//! | `{pad}-` | a foreign link is rendered with messages suppressed |
//!
//! Both markers take the padding so they line up with the stack lines they
//! stand in for.
//!
//! ## Stack and call-site directives
//!
//! `{}` prints `function(entry)` lines; `+` adds `file:line +offset` lines;
//! `#`, fill/align, width and precision behave as above.

use core::fmt;

/// Which part of a chain a layout renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Just the first node's message.
    Message,
    /// Every node of the chain, fully decorated.
    Chain,
    /// Only the first node, fully decorated.
    First,
}

/// Parsed rendering configuration.
///
/// Built from a formatter by the `Display`/`LowerHex`/`UpperHex`/`Debug`
/// impls, or by hand with [`Layout::builder()`] for use with
/// [`Erf::render`](crate::Erf::render):
///
/// ```rust
/// use erf::{Layout, Mode};
///
/// const SPACED: Layout = Layout::builder()
///     .mode(Mode::First)
///     .pad(' ')
///     .width(2)
///     .tags(true)
///     .build();
///
/// assert_eq!(SPACED.indent(), 2);
/// assert_eq!(SPACED.padding(), "  ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    mode: Mode,
    pad: char,
    width: usize,
    indent: usize,
    detail: bool,
    short_paths: bool,
    tags: bool,
    messages: bool,
}

impl Layout {
    /// Default error layout for `{:x}`.
    pub const CHAIN: Layout = Layout::builder().build();

    /// Start building a layout. Defaults match `{:x}`.
    pub const fn builder() -> LayoutBuilder {
        LayoutBuilder::new()
    }

    /// Parse an error directive for the given mode.
    pub fn error(f: &fmt::Formatter<'_>, mode: Mode) -> Self {
        let (pad, default_indent) = pad_and_indent(f);
        Self {
            mode,
            pad,
            width: f.width().unwrap_or(0),
            indent: f.precision().unwrap_or(default_indent),
            detail: !f.sign_aware_zero_pad(),
            short_paths: f.alternate(),
            tags: f.sign_plus(),
            messages: !f.sign_minus(),
        }
    }

    /// Parse a stack-trace or call-site directive.
    pub fn stack(f: &fmt::Formatter<'_>) -> Self {
        let (pad, default_indent) = pad_and_indent(f);
        Self {
            mode: Mode::First,
            pad,
            width: f.width().unwrap_or(0),
            indent: f.precision().unwrap_or(default_indent),
            detail: f.sign_plus(),
            short_paths: f.alternate(),
            tags: false,
            messages: true,
        }
    }

    /// Which part of the chain is rendered.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Padding character.
    pub const fn pad(&self) -> char {
        self.pad
    }

    /// Number of padding characters before every line.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of padding characters nesting detail and message lines.
    pub const fn indent(&self) -> usize {
        self.indent
    }

    /// Whether call sites include a `file:line +offset` line.
    pub const fn detail(&self) -> bool {
        self.detail
    }

    /// Whether file paths are reduced to their base name.
    pub const fn short_paths(&self) -> bool {
        self.short_paths
    }

    /// Whether tag lines are shown.
    pub const fn tags(&self) -> bool {
        self.tags
    }

    /// Whether error messages are shown.
    pub const fn messages(&self) -> bool {
        self.messages
    }

    /// Whether rendering continues past the first node.
    pub const fn recurses(&self) -> bool {
        matches!(self.mode, Mode::Chain)
    }

    /// The padding string (`pad` repeated `width` times).
    pub fn padding(&self) -> String {
        repeat(self.pad, self.width)
    }

    /// The indent string (`pad` repeated `indent` times).
    pub fn indentation(&self) -> String {
        repeat(self.pad, self.indent)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::CHAIN
    }
}

fn pad_and_indent(f: &fmt::Formatter<'_>) -> (char, usize) {
    match f.align() {
        Some(_) => (f.fill(), 2),
        None => ('\t', 1),
    }
}

fn repeat(c: char, n: usize) -> String {
    core::iter::repeat_n(c, n).collect()
}

// ============================================================================
// LayoutBuilder
// ============================================================================

/// Builder for [`Layout`]. All methods are `const fn`.
#[derive(Debug, Clone, Copy)]
pub struct LayoutBuilder {
    layout: Layout,
    indent_set: bool,
}

impl LayoutBuilder {
    /// Defaults of `{:x}`: tab padding, width 0, indent 1, detailed stacks,
    /// full paths, no tags, messages shown.
    pub const fn new() -> Self {
        Self {
            layout: Layout {
                mode: Mode::Chain,
                pad: '\t',
                width: 0,
                indent: 1,
                detail: true,
                short_paths: false,
                tags: false,
                messages: true,
            },
            indent_set: false,
        }
    }

    /// Set the mode.
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.layout.mode = mode;
        self
    }

    /// Set the padding character. A non-tab character defaults the indent to 2.
    pub const fn pad(mut self, pad: char) -> Self {
        self.layout.pad = pad;
        if !self.indent_set {
            self.layout.indent = if pad == '\t' { 1 } else { 2 };
        }
        self
    }

    /// Set the padding width.
    pub const fn width(mut self, width: usize) -> Self {
        self.layout.width = width;
        self
    }

    /// Set the indent depth.
    pub const fn indent(mut self, indent: usize) -> Self {
        self.layout.indent = indent;
        self.indent_set = true;
        self
    }

    /// Show or hide `file:line +offset` lines.
    pub const fn detail(mut self, detail: bool) -> Self {
        self.layout.detail = detail;
        self
    }

    /// Reduce file paths to base names.
    pub const fn short_paths(mut self, short_paths: bool) -> Self {
        self.layout.short_paths = short_paths;
        self
    }

    /// Show or hide tag lines.
    pub const fn tags(mut self, tags: bool) -> Self {
        self.layout.tags = tags;
        self
    }

    /// Show or hide error messages.
    pub const fn messages(mut self, messages: bool) -> Self {
        self.layout.messages = messages;
        self
    }

    /// Finish building.
    pub const fn build(self) -> Layout {
        self.layout
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}
