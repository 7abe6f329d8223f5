//! # erf - errors with stack traces, tagged arguments and chain rendering
//!
//! An [`Erf`] is an error node that remembers where it was built, what it was
//! built from, and which error (if any) it wraps:
//!
//! ```text
//! 	saving report.txt: disk full
//! app::save(0x55d0c2a41f30)
//! 	src/save.rs:42 +0x5c
//! app::main(0x55d0c2a40a10)
//! 	src/main.rs:7 +0x1d
//! + "file"="report.txt"
//!
//! 	disk full
//! app::write(0x55d0c2a42100)
//! 	src/save.rs:18 +0x31
//! ```
//!
//! ## Try It Now
//!
//! ```rust
//! use erf::{erf, Arg, Erf, ErfError};
//!
//! fn write() -> Erf {
//!     Erf::new("disk full")
//! }
//!
//! fn save(file: &str) -> Result<(), Erf> {
//!     let cause = write();
//!     let err = erf!("saving {}: {:w}", file.to_owned(), Arg::from(cause))
//!         .and_then(|e| e.with_tags(&["file"]))
//!         .unwrap_or_else(|e: ErfError| Erf::new(e.to_string()));
//!     Err(err)
//! }
//!
//! let err = save("report.txt").unwrap_err();
//! println!("{err}");      // saving report.txt: disk full
//! println!("{err:+x}");   // every node, stacks and tags
//! ```
//!
//! ## Constructing
//!
//! | Constructor | Result |
//! |-------------|--------|
//! | [`Erf::new(text)`](Erf::new) | leaf node, no args |
//! | [`Erf::newf(template, args)`](Erf::newf) | formatted node; `{:w}` links a cause |
//! | [`Erf::try_newf(template, args)`](Erf::try_newf) | same, rejecting absent args |
//! | [`Erf::wrap(Some(err))`](Erf::wrap) | wrapper whose message is the cause's |
//! | [`Erf::wrap_in_place(slot)`](Erf::wrap_in_place) | replaces a boxed error in place |
//! | [`erf!`] | `new` for one literal, `newf` otherwise |
//! | [`err.erf()`](ErrorErfExt::erf) / [`res.wrap_erf()`](ResultErfExt::wrap_erf) | wrap from a call chain |
//!
//! Every constructor captures the stack starting at its caller. Use
//! [`Erf::builder()`] to bound the depth or skip helper frames.
//!
//! ## Templates
//!
//! A template is a runtime string with `format!`-like placeholders:
//! `{}` and `{N}` (Display), `{:?}` and `{N:?}` (Debug), `{:w}` and `{N:w}`
//! (Display, and the argument becomes the cause), `{{` and `}}` (braces).
//! Templates are validated against the arguments before anything is
//! captured; an unused argument, a missing argument, or a `{:w}` on a
//! non-error are all [`ErfError::Template`].
//!
//! ## Tags
//!
//! [`Erf::attach`] names the arguments by position, once per node. Names can
//! be looked up with [`Erf::tag_value`] and are printed by the `+` flag.
//!
//! ## Rendering
//!
//! | Directive | Output |
//! |-----------|--------|
//! | `{}` | this node's message |
//! | `{:x}` / `{:?}` | every node of the chain, with stacks |
//! | `{:X}` | this node only, with its stack |
//!
//! Flags `+` (tags), `#` (base file names), `-` (no messages), `0` (no
//! `file:line` lines), fill/align, width (padding) and precision (indent)
//! are described in [`layout`](Layout). [`StackTrace`] and [`CallSite`]
//! accept `+` (detail) and `#` (base names).
//!
//! ## Feature Flags
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `tinyvec-256-bytes` | program counters stored inline via tinyvec |
//! | `smallvec-256-bytes` | program counters stored inline via smallvec |
//! | `tracing` | `Erf::emit` and `ResultErfLogExt` record errors as events |

#![deny(unsafe_code)]

mod arg;
mod capture;
mod chain;
mod error;
mod ext;
mod layout;
mod node;
pub mod prelude;
mod render;
mod stack;
mod template;
#[cfg(feature = "tracing")]
mod tracing_ext;

pub use arg::{Arg, ArgDisplay, ArgValue, IntoArg};
pub use capture::{
    CaptureConfig, DEFAULT_MAX_DEPTH, DEFAULT_PAGE_SIZE, MAX_DEPTH_ENV, capture,
};
pub use chain::{Chain, Link, MAX_CHAIN_DEPTH, Traced, chain_of};
pub use error::ErfError;
pub use ext::{ErrorErfExt, ResultErfExt};
pub use layout::{Layout, LayoutBuilder, Mode};
pub use node::{BoxError, Cause, Erf, ErfBuilder, WRAP_TEMPLATE};
pub use render::{EMPTY_STACK, FOREIGN_LINK};
pub use stack::{CallSite, StackTrace, UNKNOWN, UNKNOWN_LINE};
#[cfg(feature = "tracing")]
pub use tracing_ext::ResultErfLogExt;

/// Build an [`Erf`] in place.
///
/// With a single literal this is [`Erf::new`] and yields an `Erf`. With
/// arguments it is [`Erf::newf`] and yields `Result<Erf, ErfError>`; each
/// argument goes through [`IntoArg`], so plain values are taken as-is and
/// errors are passed as [`Arg`]s.
///
/// ```rust
/// use erf::{erf, Arg};
///
/// let plain = erf!("not found");
/// assert_eq!(plain.to_string(), "not found");
///
/// let formatted = erf!("user {} not found in {:?}", 42, "eu-west").unwrap();
/// assert_eq!(formatted.to_string(), "user 42 not found in \"eu-west\"");
///
/// let wrapped = erf!("lookup: {:w}", Arg::from(plain)).unwrap();
/// assert_eq!(wrapped.to_string(), "lookup: not found");
/// ```
#[macro_export]
macro_rules! erf {
    ($text:literal $(,)?) => {
        $crate::Erf::new($text)
    };
    ($template:expr, $($arg:expr),+ $(,)?) => {
        $crate::Erf::newf($template, [$($crate::IntoArg::into_arg($arg)),+])
    };
}

#[cfg(test)]
mod tests;
