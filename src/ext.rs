//! Extension traits for wrapping errors without `map_err` boilerplate.
//!
//! - [`ErrorErfExt`]: call `.erf()` on any error to wrap it in an [`Erf`]
//! - [`ResultErfExt`]: call `.wrap_erf()` on a `Result` to wrap its error
//!
//! Both capture the stack of the code calling them, not of this module.

use std::error::Error;

use crate::node::Erf;

// ============================================================================
// ErrorErfExt Trait - for calling .erf() directly on error values
// ============================================================================

/// Extension trait that allows calling `.erf()` on error types.
///
/// ```rust
/// use erf::ErrorErfExt;
///
/// let err = std::io::Error::other("connection reset").erf();
/// assert_eq!(err.to_string(), "connection reset");
/// assert_eq!(err.chain().len(), 2);
/// ```
pub trait ErrorErfExt: Sized {
    /// Wrap this error in a node whose stack starts at the caller.
    fn erf(self) -> Erf;
}

impl<E: Error + Send + Sync + 'static> ErrorErfExt for E {
    #[inline(never)]
    fn erf(self) -> Erf {
        Erf::builder().skip(1).wrap_err(self)
    }
}

// ============================================================================
// ResultErfExt Trait - for calling .wrap_erf() on Results
// ============================================================================

/// Extension trait for wrapping the error of a `Result`.
///
/// ## Example
///
/// ```rust
/// use erf::{Erf, ResultErfExt};
///
/// fn parse(s: &str) -> Result<u16, Erf> {
///     s.parse::<u16>().wrap_erf()
/// }
///
/// assert_eq!(parse("80").unwrap(), 80);
/// let err = parse("http").unwrap_err();
/// assert_eq!(err.to_string(), "invalid digit found in string");
/// ```
pub trait ResultErfExt<T> {
    /// Wrap the error, if any, in a node whose stack starts at the caller.
    fn wrap_erf(self) -> Result<T, Erf>;
}

impl<T, E: Error + Send + Sync + 'static> ResultErfExt<T> for Result<T, E> {
    #[inline(never)]
    fn wrap_erf(self) -> Result<T, Erf> {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err(Erf::builder().skip(1).wrap_err(err)),
        }
    }
}
