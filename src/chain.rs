//! Chain traversal.
//!
//! A chain is what you get by following an error's cause until there is
//! none. Nodes that can render a message, a stack trace and tags implement
//! [`Traced`]; every other error is a foreign link that advances through
//! [`Error::source`](std::error::Error::source). Rendering branches on this
//! capability, never on concrete types.

use std::error::Error;

use crate::arg::Arg;
use crate::layout::Layout;
use crate::node::Erf;
use crate::stack::StackTrace;

/// Upper bound on links visited in one traversal.
///
/// Chains built by this crate cannot contain cycles, but a foreign
/// `source()` implementation could.
pub const MAX_CHAIN_DEPTH: usize = 4096;

// ============================================================================
// Traced - rich-render capability
// ============================================================================

/// Capability of an error that carries its own stack trace and tags.
///
/// [`Erf`](crate::Erf) implements it. Other error types may implement it to
/// render like a node when a chain starts at them.
pub trait Traced: Send + Sync {
    /// View as a plain error (message via `Display`).
    fn as_error(&self) -> &(dyn Error + 'static);

    /// Stack captured when the error was built.
    fn stack_trace(&self) -> &StackTrace;

    /// Attached tags, in attachment order.
    fn tag_pairs(&self) -> Vec<(&str, &Arg)>;

    /// The next link of the chain, if any.
    fn next_link(&self) -> Option<Link<'_>>;
}

// ============================================================================
// Link
// ============================================================================

/// One position of a chain.
#[derive(Clone, Copy)]
pub enum Link<'a> {
    /// An error with rich-render capability.
    Traced(&'a dyn Traced),
    /// Any other error.
    Foreign(&'a (dyn Error + 'static)),
}

impl<'a> Link<'a> {
    /// Classify an arbitrary error: nodes are traced, everything else foreign.
    pub fn of(err: &'a (dyn Error + 'static)) -> Self {
        match err.downcast_ref::<Erf>() {
            Some(node) => Link::Traced(node),
            None => Link::Foreign(err),
        }
    }

    /// View as a plain error.
    pub fn as_error(self) -> &'a (dyn Error + 'static) {
        match self {
            Link::Traced(t) => t.as_error(),
            Link::Foreign(e) => e,
        }
    }

    /// The rich-render capability, if this link has it.
    pub fn as_traced(self) -> Option<&'a dyn Traced> {
        match self {
            Link::Traced(t) => Some(t),
            Link::Foreign(_) => None,
        }
    }

    /// The link after this one.
    pub fn next(self) -> Option<Link<'a>> {
        match self {
            Link::Traced(t) => t.next_link(),
            Link::Foreign(e) => e.source().map(Link::of),
        }
    }

    /// Iterate the chain starting at this link.
    pub fn chain(self) -> Chain<'a> {
        Chain::new(self)
    }

    /// Render the chain starting at this link.
    pub fn render(self, layout: &Layout) -> String {
        let mut out = String::new();
        let _ = crate::render::write_chain(&mut out, self, layout);
        out
    }
}

impl core::fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Link::Traced(t) => f.debug_tuple("Traced").field(&t.as_error().to_string()).finish(),
            Link::Foreign(e) => f.debug_tuple("Foreign").field(&e.to_string()).finish(),
        }
    }
}

// ============================================================================
// Chain iterator
// ============================================================================

/// Iterator over a chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<Link<'a>>,
    visited: usize,
}

impl<'a> Chain<'a> {
    /// Start at `head`.
    pub fn new(head: Link<'a>) -> Self {
        Self {
            next: Some(head),
            visited: 0,
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = Link<'a>;

    fn next(&mut self) -> Option<Link<'a>> {
        if self.visited >= MAX_CHAIN_DEPTH {
            return None;
        }
        let current = self.next.take()?;
        self.visited += 1;
        self.next = current.next();
        Some(current)
    }
}

/// Walk any error through `source()`, outermost first.
///
/// Nodes met along the way are yielded as [`Link::Traced`].
///
/// ```rust
/// let io = std::io::Error::other("inner");
/// let chain: Vec<_> = erf::chain_of(&io).map(|l| l.as_error().to_string()).collect();
/// assert_eq!(chain, ["inner"]);
/// ```
pub fn chain_of<'a>(err: &'a (dyn Error + 'static)) -> Chain<'a> {
    Chain::new(Link::of(err))
}
