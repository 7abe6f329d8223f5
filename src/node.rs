//! The [`Erf`] error node.
//!
//! An `Erf` holds the message of one error, the error it wraps (if any), the
//! template and arguments it was built from, optional tags naming those
//! arguments, and the stack captured at construction. Everything except the
//! one-time tag attachment is fixed once the node exists.

use core::fmt;
use std::error::Error;
use std::sync::Arc;

use crate::arg::Arg;
use crate::capture::CaptureConfig;
use crate::chain::{Chain, Link, Traced};
use crate::error::ErfError;
use crate::layout::{Layout, Mode};
use crate::render::write_chain;
use crate::stack::StackTrace;
use crate::template::Template;

/// Boxed, thread-safe error, the slot type used by [`Erf::wrap_in_place`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Template recorded on nodes built by the `wrap` family.
pub const WRAP_TEMPLATE: &str = "{:w}";

// ============================================================================
// Cause
// ============================================================================

/// The error a node wraps.
///
/// Nodes are kept as [`Cause::Erf`] so the chain keeps their stacks and
/// tags; everything else is [`Cause::Foreign`]. The distinction is made
/// once, when the cause is stored.
#[derive(Clone)]
pub enum Cause {
    /// Another node.
    Erf(Arc<Erf>),
    /// Any other error.
    Foreign(Arc<dyn Error + Send + Sync + 'static>),
}

impl Cause {
    /// Store `err` as a cause.
    pub fn new<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::from_boxed(Box::new(err))
    }

    /// Store an already boxed error as a cause.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<Erf>() {
            Ok(node) => Cause::Erf(Arc::new(*node)),
            Err(other) => Cause::Foreign(Arc::from(other)),
        }
    }

    /// View as a plain error.
    pub fn as_error(&self) -> &(dyn Error + 'static) {
        match self {
            Cause::Erf(node) => &**node,
            Cause::Foreign(err) => &**err,
        }
    }

    /// The wrapped node, if the cause is one.
    pub fn as_erf(&self) -> Option<&Erf> {
        match self {
            Cause::Erf(node) => Some(node),
            Cause::Foreign(_) => None,
        }
    }

    /// This cause as a chain link.
    pub fn link(&self) -> Link<'_> {
        match self {
            Cause::Erf(node) => Link::Traced(&**node),
            Cause::Foreign(err) => Link::Foreign(&**err),
        }
    }
}

impl From<Erf> for Cause {
    fn from(node: Erf) -> Self {
        Cause::Erf(Arc::new(node))
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Erf(_) => f.debug_tuple("Erf").field(&self.as_error().to_string()).finish(),
            Cause::Foreign(err) => f.debug_tuple("Foreign").field(err).finish(),
        }
    }
}

// ============================================================================
// Erf
// ============================================================================

/// An error with a captured stack, positional arguments and tags.
///
/// ## Rendering
///
/// | Directive | Output |
/// |-----------|--------|
/// | `{}` | this node's message |
/// | `{:x}` | every node of the chain with its stack |
/// | `{:X}` | this node with its stack |
/// | `{:?}` | same as `{:x}` |
///
/// Flags: `+` tags, `#` base file names, `-` no messages, `0` no
/// `file:line` lines, fill/align for space (or custom) padding, width for
/// padding, precision for indent. See [`Layout`].
///
/// ## Example
///
/// ```rust
/// use erf::{Erf, erf};
///
/// let root = Erf::new("disk full");
/// let err = erf!("saving {}: {:w}", "report.txt", erf::Arg::from(root))
///     .unwrap()
///     .with_tags(&["file"])
///     .unwrap();
///
/// assert_eq!(err.to_string(), "saving report.txt: disk full");
/// assert_eq!(err.chain().len(), 2);
/// assert_eq!(err.tag_value("file").unwrap().display().to_string(), "report.txt");
///
/// let full = format!("{:+x}", err);
/// assert!(full.starts_with("\tsaving report.txt: disk full\n"));
/// assert!(full.contains("+ \"file\"=\"report.txt\""));
/// ```
#[derive(Clone)]
pub struct Erf {
    message: String,
    cause: Option<Cause>,
    template: String,
    args: Option<Vec<Arg>>,
    tags: Option<Vec<(String, usize)>>,
    stack: StackTrace,
}

/// Validated pieces of a formatted node, waiting for their stack.
struct Prepared {
    message: String,
    cause: Option<Cause>,
    template: String,
    args: Vec<Arg>,
}

impl Prepared {
    fn new(template: &str, args: Vec<Option<Arg>>) -> Result<Self, ErfError> {
        let mut present = Vec::with_capacity(args.len());
        for (index, arg) in args.into_iter().enumerate() {
            match arg {
                Some(arg) => present.push(arg),
                None => return Err(ErfError::NilArg { index }),
            }
        }
        let parsed = Template::parse(template, &present)?;
        let cause = parsed
            .wrap_index()
            .and_then(|i| present[i].as_cause().cloned());
        Ok(Self {
            message: parsed.substitute(&present),
            cause,
            template: template.to_owned(),
            args: present,
        })
    }

    fn wrapping(cause: Cause) -> Self {
        Self {
            message: cause.as_error().to_string(),
            template: WRAP_TEMPLATE.to_owned(),
            args: vec![Arg::Error(cause.clone())],
            cause: Some(cause),
        }
    }

    fn finish(self, stack: StackTrace) -> Erf {
        Erf {
            message: self.message,
            cause: self.cause,
            template: self.template,
            args: Some(self.args),
            tags: None,
            stack,
        }
    }
}

fn message_node(text: String, stack: StackTrace) -> Erf {
    Erf {
        message: text,
        cause: None,
        template: String::new(),
        args: None,
        tags: None,
        stack,
    }
}

fn some_args<I: IntoIterator<Item = Arg>>(args: I) -> Vec<Option<Arg>> {
    args.into_iter().map(Some).collect()
}

// Every public constructor captures its stack itself, skipping exactly one
// extra frame (its own), so constructors must not call each other.
impl Erf {
    /// Create a leaf error from plain text.
    ///
    /// ```rust
    /// let err = erf::Erf::new("boom");
    /// assert_eq!(format!("{err}"), "boom");
    /// assert!(err.args().is_none());
    /// ```
    #[inline(never)]
    pub fn new(text: impl Into<String>) -> Self {
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        message_node(text.into(), stack)
    }

    /// Create an error from a template and arguments.
    ///
    /// See the [`template`](crate#templates) syntax. Fails when the template
    /// does not match the arguments.
    #[inline(never)]
    pub fn newf<I: IntoIterator<Item = Arg>>(template: &str, args: I) -> Result<Self, ErfError> {
        let prepared = Prepared::new(template, some_args(args))?;
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        Ok(prepared.finish(stack))
    }

    /// Like [`newf`](Self::newf), but arguments may be absent; any `None`
    /// fails with [`ErfError::NilArg`].
    ///
    /// ```rust
    /// use erf::{Arg, Erf, ErfError};
    ///
    /// let err = Erf::try_newf("{} {}", [Some(Arg::value(1)), None]).unwrap_err();
    /// assert_eq!(err, ErfError::NilArg { index: 1 });
    /// ```
    #[inline(never)]
    pub fn try_newf<I: IntoIterator<Item = Option<Arg>>>(
        template: &str,
        args: I,
    ) -> Result<Self, ErfError> {
        let prepared = Prepared::new(template, args.into_iter().collect())?;
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        Ok(prepared.finish(stack))
    }

    /// Wrap an error. Wrapping nothing yields nothing.
    ///
    /// ```rust
    /// use erf::Erf;
    ///
    /// assert!(Erf::wrap(None::<std::io::Error>).is_none());
    /// let err = Erf::wrap(Some(std::io::Error::other("io"))).unwrap();
    /// assert_eq!(err.to_string(), "io");
    /// assert!(err.cause().is_some());
    /// ```
    #[inline(never)]
    pub fn wrap<E: Error + Send + Sync + 'static>(err: Option<E>) -> Option<Self> {
        let err = err?;
        let prepared = Prepared::wrapping(Cause::new(err));
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        Some(prepared.finish(stack))
    }

    /// Wrap an error that is known to be present.
    #[inline(never)]
    pub fn wrap_err<E: Error + Send + Sync + 'static>(err: E) -> Self {
        let prepared = Prepared::wrapping(Cause::new(err));
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        prepared.finish(stack)
    }

    /// Wrap a boxed error.
    #[inline(never)]
    pub fn wrap_boxed(err: BoxError) -> Self {
        let prepared = Prepared::wrapping(Cause::from_boxed(err));
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        prepared.finish(stack)
    }

    /// Replace the error in `slot` with a node wrapping it.
    ///
    /// Does nothing when the slot or the error in it is absent.
    ///
    /// ```rust
    /// use erf::{BoxError, Erf};
    ///
    /// let mut slot: Option<BoxError> = Some("bad input".into());
    /// Erf::wrap_in_place(Some(&mut slot));
    /// let node = slot.unwrap().downcast::<Erf>().unwrap();
    /// assert_eq!(node.to_string(), "bad input");
    ///
    /// let mut empty: Option<BoxError> = None;
    /// Erf::wrap_in_place(Some(&mut empty));
    /// assert!(empty.is_none());
    /// Erf::wrap_in_place(None);
    /// ```
    #[inline(never)]
    pub fn wrap_in_place(slot: Option<&mut Option<BoxError>>) {
        let Some(slot) = slot else {
            return;
        };
        let Some(err) = slot.take() else {
            return;
        };
        let prepared = Prepared::wrapping(Cause::from_boxed(err));
        let config = CaptureConfig::DEFAULT;
        let stack = StackTrace::capture(config.skip(config.skipped() + 1));
        *slot = Some(Box::new(prepared.finish(stack)));
    }

    /// Configure stack capture before constructing.
    ///
    /// ```rust
    /// let err = erf::Erf::builder().max_depth(0).message("no frames");
    /// assert!(err.stack_trace().is_empty());
    /// ```
    pub const fn builder() -> ErfBuilder {
        ErfBuilder::new()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// This node's message, without any chain traversal.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped error, if any.
    pub fn cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(Cause::as_error)
    }

    /// The wrapped error as stored.
    pub fn cause_ref(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Iterate the chain as links, starting with this node.
    pub fn links(&self) -> Chain<'_> {
        Chain::new(Link::Traced(self))
    }

    /// Every error of the chain, outermost (this node) first.
    ///
    /// ```rust
    /// use erf::Erf;
    ///
    /// let c = Erf::new("c");
    /// let b = Erf::wrap_err(c);
    /// let a = Erf::wrap_err(b);
    /// assert_eq!(a.chain().len(), 3);
    /// ```
    pub fn chain(&self) -> Vec<&(dyn Error + 'static)> {
        self.links().map(Link::as_error).collect()
    }

    /// Template the node was built from; empty for plain messages.
    pub fn fmt_template(&self) -> &str {
        &self.template
    }

    /// Number of arguments (0 when built without any).
    pub fn arg_count(&self) -> usize {
        self.args.as_ref().map_or(0, Vec::len)
    }

    /// Argument at `index`.
    pub fn arg(&self, index: usize) -> Result<&Arg, ErfError> {
        let args = self.args.as_deref().unwrap_or(&[]);
        args.get(index).ok_or(ErfError::IndexOutOfRange {
            index,
            len: args.len(),
        })
    }

    /// Copy of the arguments; `None` if the node was not built from a template.
    pub fn args(&self) -> Option<Vec<Arg>> {
        self.args.clone()
    }

    /// Stack captured at construction.
    pub fn stack_trace(&self) -> &StackTrace {
        &self.stack
    }

    /// Program counters captured at construction, innermost first.
    pub fn program_counters(&self) -> &[usize] {
        self.stack.program_counters()
    }

    /// Replace the stack trace.
    ///
    /// Fixture hook for tests that need deterministic call sites. Nodes are
    /// otherwise immutable after construction apart from the one-time tag
    /// attachment; code that re-raises on behalf of a caller should use
    /// [`copy_dropping_top_frames`](Self::copy_dropping_top_frames) or
    /// [`ErfBuilder::skip`] instead.
    #[doc(hidden)]
    pub fn set_stack_trace(&mut self, stack: StackTrace) {
        self.stack = stack;
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// Name arguments by position. An empty name skips its argument.
    ///
    /// Fails without touching the node if it has no arguments, already has
    /// tags, gets more names than arguments, or gets a name twice.
    ///
    /// ```rust
    /// use erf::{erf, ErfError};
    ///
    /// let mut err = erf!("{} {} {}", 1, "x", 3.5).unwrap();
    /// assert!(matches!(err.attach(&["a", "b", "c", "d"]), Err(ErfError::TooManyTags { .. })));
    /// err.attach(&["", "name", "reason"]).unwrap();
    /// assert_eq!(err.tag_names(), ["name", "reason"]);
    /// assert_eq!(err.attach(&["again"]).unwrap_err(), ErfError::TagsAttached);
    /// ```
    pub fn attach(&mut self, tags: &[&str]) -> Result<&mut Self, ErfError> {
        let Some(args) = &self.args else {
            return Err(ErfError::NoArgs);
        };
        if self.tags.is_some() {
            return Err(ErfError::TagsAttached);
        }
        if tags.len() > args.len() {
            return Err(ErfError::TooManyTags {
                tags: tags.len(),
                args: args.len(),
            });
        }
        let mut table: Vec<(String, usize)> = Vec::with_capacity(tags.len());
        for (index, &tag) in tags.iter().enumerate() {
            if tag.is_empty() {
                continue;
            }
            if table.iter().any(|(name, _)| name == tag) {
                return Err(ErfError::DuplicateTag(tag.to_owned()));
            }
            table.push((tag.to_owned(), index));
        }
        self.tags = Some(table);
        Ok(self)
    }

    /// Consuming form of [`attach`](Self::attach).
    pub fn with_tags(mut self, tags: &[&str]) -> Result<Self, ErfError> {
        self.attach(tags)?;
        Ok(self)
    }

    /// Argument bound to `tag`.
    pub fn tag_value(&self, tag: &str) -> Option<&Arg> {
        let (_, index) = self.tags.as_ref()?.iter().find(|(name, _)| name == tag)?;
        self.args.as_ref()?.get(*index)
    }

    /// Tag names in attachment order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of tags.
    pub fn tag_count(&self) -> usize {
        self.tags.as_ref().map_or(0, Vec::len)
    }

    /// Whether tags were attached (possibly an empty set).
    pub fn has_tags(&self) -> bool {
        self.tags.is_some()
    }

    /// Tag names with their arguments, in attachment order.
    pub fn tags(&self) -> impl Iterator<Item = (&str, &Arg)> + '_ {
        let args = self.args.as_deref().unwrap_or(&[]);
        self.tags
            .iter()
            .flatten()
            .filter_map(move |(name, index)| Some((name.as_str(), args.get(*index)?)))
    }

    // ========================================================================
    // Copies
    // ========================================================================

    /// Independent copy of this node; the cause is shared, everything else
    /// is copied.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy without the `n` innermost frames, for re-raising from a caller.
    ///
    /// ```rust
    /// use erf::{Erf, ErfError};
    ///
    /// let err = Erf::new("boom");
    /// let frames = err.stack_trace().len();
    /// let moved = err.copy_dropping_top_frames(1).unwrap();
    /// assert_eq!(moved.stack_trace().len(), frames - 1);
    /// assert!(matches!(
    ///     err.copy_dropping_top_frames(frames + 1),
    ///     Err(ErfError::FrameRange { .. })
    /// ));
    /// ```
    pub fn copy_dropping_top_frames(&self, n: usize) -> Result<Self, ErfError> {
        let stack = self.stack.drop_top(n)?;
        Ok(Self {
            stack,
            ..self.clone()
        })
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render with an explicit layout.
    pub fn render(&self, layout: &Layout) -> String {
        let mut out = String::new();
        let _ = write_chain(&mut out, Link::Traced(self), layout);
        out
    }
}

// ============================================================================
// ErfBuilder
// ============================================================================

/// Constructors with an explicit [`CaptureConfig`].
///
/// ```rust
/// use erf::{CaptureConfig, Erf};
///
/// let config = CaptureConfig::DEFAULT.max_depth(4);
/// let err = Erf::builder().config(config).message("shallow");
/// assert!(err.stack_trace().len() <= 4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErfBuilder {
    config: CaptureConfig,
}

impl ErfBuilder {
    /// Builder with [`CaptureConfig::DEFAULT`].
    pub const fn new() -> Self {
        Self {
            config: CaptureConfig::DEFAULT,
        }
    }

    /// Replace the whole capture config.
    pub const fn config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of captured frames.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.config = self.config.max_depth(max_depth);
        self
    }

    /// Skip additional caller frames.
    pub const fn skip(mut self, skip: usize) -> Self {
        self.config = self.config.skip(skip);
        self
    }

    /// The capture config in use.
    pub const fn capture_config(&self) -> CaptureConfig {
        self.config
    }

    fn stack_config(&self) -> CaptureConfig {
        self.config.skip(self.config.skipped() + 1)
    }

    /// See [`Erf::new`].
    #[inline(never)]
    pub fn message(self, text: impl Into<String>) -> Erf {
        let stack = StackTrace::capture(self.stack_config());
        message_node(text.into(), stack)
    }

    /// See [`Erf::newf`].
    #[inline(never)]
    pub fn format<I: IntoIterator<Item = Arg>>(self, template: &str, args: I) -> Result<Erf, ErfError> {
        let prepared = Prepared::new(template, some_args(args))?;
        let stack = StackTrace::capture(self.stack_config());
        Ok(prepared.finish(stack))
    }

    /// See [`Erf::try_newf`].
    #[inline(never)]
    pub fn try_format<I: IntoIterator<Item = Option<Arg>>>(
        self,
        template: &str,
        args: I,
    ) -> Result<Erf, ErfError> {
        let prepared = Prepared::new(template, args.into_iter().collect())?;
        let stack = StackTrace::capture(self.stack_config());
        Ok(prepared.finish(stack))
    }

    /// See [`Erf::wrap`].
    #[inline(never)]
    pub fn wrap<E: Error + Send + Sync + 'static>(self, err: Option<E>) -> Option<Erf> {
        let err = err?;
        let prepared = Prepared::wrapping(Cause::new(err));
        let stack = StackTrace::capture(self.stack_config());
        Some(prepared.finish(stack))
    }

    /// See [`Erf::wrap_err`].
    #[inline(never)]
    pub fn wrap_err<E: Error + Send + Sync + 'static>(self, err: E) -> Erf {
        let prepared = Prepared::wrapping(Cause::new(err));
        let stack = StackTrace::capture(self.stack_config());
        prepared.finish(stack)
    }

    /// See [`Erf::wrap_boxed`].
    #[inline(never)]
    pub fn wrap_boxed(self, err: BoxError) -> Erf {
        let prepared = Prepared::wrapping(Cause::from_boxed(err));
        let stack = StackTrace::capture(self.stack_config());
        prepared.finish(stack)
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl Traced for Erf {
    fn as_error(&self) -> &(dyn Error + 'static) {
        self
    }

    fn stack_trace(&self) -> &StackTrace {
        &self.stack
    }

    fn tag_pairs(&self) -> Vec<(&str, &Arg)> {
        self.tags().collect()
    }

    fn next_link(&self) -> Option<Link<'_>> {
        self.cause.as_ref().map(Cause::link)
    }
}

impl Error for Erf {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause()
    }
}

impl fmt::Display for Erf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::LowerHex for Erf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = Layout::error(f, Mode::Chain);
        write_chain(f, Link::Traced(self), &layout)
    }
}

impl fmt::UpperHex for Erf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = Layout::error(f, Mode::First);
        write_chain(f, Link::Traced(self), &layout)
    }
}

impl fmt::Debug for Erf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = Layout::error(f, Mode::Chain);
        write_chain(f, Link::Traced(self), &layout)
    }
}

impl From<Erf> for Arg {
    fn from(node: Erf) -> Self {
        Arg::Error(Cause::from(node))
    }
}
