//! Convenient re-exports for common usage.
//!
//! ## Usage
//!
//! ```rust
//! use erf::prelude::*;
//!
//! fn open(path: &str) -> Result<std::fs::File, Erf> {
//!     std::fs::File::open(path).wrap_erf()
//! }
//!
//! let err = open("/definitely/not/here").unwrap_err();
//! assert!(err.cause().is_some());
//! ```

pub use crate::Arg;
pub use crate::Erf;
pub use crate::ErfError;
pub use crate::ErrorErfExt;
pub use crate::ResultErfExt;
pub use crate::erf;
#[cfg(feature = "tracing")]
pub use crate::ResultErfLogExt;
