//! Failures reported by construction, tag attachment and indexed access.
//!
//! Every variant is a programmer error surfaced to the caller at the call
//! that broke the invariant. Degraded data (unknown function names,
//! unresolved files, foreign errors without a source) is never an error; it
//! renders as a placeholder instead.

use thiserror::Error;

/// Error returned when an [`Erf`](crate::Erf) operation rejects its input.
///
/// ## Example
///
/// ```rust
/// use erf::{Erf, ErfError};
///
/// let mut err = Erf::new("plain message");
/// assert_eq!(err.attach(&["id"]).unwrap_err(), ErfError::NoArgs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErfError {
    /// A formatted constructor received an absent argument.
    #[error("argument {index} is nil")]
    NilArg {
        /// Position of the absent argument.
        index: usize,
    },

    /// The format template could not be applied to the arguments.
    #[error("invalid template at byte {offset}: {reason}")]
    Template {
        /// Byte offset inside the template where the problem was found.
        offset: usize,
        /// What went wrong.
        reason: &'static str,
    },

    /// Tags were attached to a node that was not built from a template.
    #[error("args are not used")]
    NoArgs,

    /// Tags were already attached to this node.
    #[error("tags are already attached")]
    TagsAttached,

    /// More tag names than arguments.
    #[error("number of tags ({tags}) is more than args ({args})")]
    TooManyTags {
        /// Number of tag names supplied.
        tags: usize,
        /// Number of arguments on the node.
        args: usize,
    },

    /// The same non-empty tag name was given twice.
    #[error("tag {0:?} already defined")]
    DuplicateTag(String),

    /// An argument or call site index is outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the indexed sequence.
        len: usize,
    },

    /// More frames were asked to be dropped than were captured.
    #[error("cannot drop {requested} frames from a trace of {available}")]
    FrameRange {
        /// Frames the caller asked to drop.
        requested: usize,
        /// Frames actually captured.
        available: usize,
    },
}
