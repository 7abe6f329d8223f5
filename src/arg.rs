//! Type-erased construction arguments.
//!
//! Every value passed to a formatted constructor is kept on the node as an
//! [`Arg`], so it can be looked up later by position or by tag name. Plain
//! values are stored through [`ArgValue`]; errors are stored as a [`Cause`]
//! so that the `{:w}` placeholder can link one of them as the node's cause.

use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::node::Cause;

// ============================================================================
// ArgValue Trait - combines Any + Display + Debug in a single trait object
// ============================================================================

/// Trait combining `Any`, `Display` and `Debug` for type-erased argument values.
///
/// Implemented for every `'static` type that is `Display + Debug + Send + Sync`.
pub trait ArgValue: Any + fmt::Display + fmt::Debug + Send + Sync {
    /// Get a reference to self as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get the type name for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Display + fmt::Debug + Send + Sync> ArgValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }
}

// ============================================================================
// Arg
// ============================================================================

/// One positional argument of a formatted error.
///
/// Cloning is cheap: the payload is shared behind an `Arc` and never mutated.
///
/// ```rust
/// use erf::Arg;
///
/// let arg = Arg::value(42u32);
/// assert_eq!(arg.downcast_ref::<u32>(), Some(&42));
/// assert_eq!(arg.display().to_string(), "42");
/// ```
#[derive(Clone)]
pub enum Arg {
    /// A plain value, substituted through `Display` or `Debug`.
    Value(Arc<dyn ArgValue>),
    /// An error, which a `{:w}` placeholder may designate as the cause.
    Error(Cause),
}

impl Arg {
    /// Store a plain value.
    pub fn value<T: ArgValue>(value: T) -> Self {
        Arg::Value(Arc::new(value))
    }

    /// Store an error so it can be referenced by a `{:w}` placeholder.
    pub fn error<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Arg::Error(Cause::new(err))
    }

    /// Returns true if this argument holds an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Arg::Error(_))
    }

    /// The stored error, if this argument is one.
    pub fn as_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Arg::Error(cause) => Some(cause.as_error()),
            Arg::Value(_) => None,
        }
    }

    /// The stored cause, if this argument is an error.
    pub fn as_cause(&self) -> Option<&Cause> {
        match self {
            Arg::Error(cause) => Some(cause),
            Arg::Value(_) => None,
        }
    }

    /// Downcast a plain value to its concrete type.
    ///
    /// Returns `None` for error arguments; use [`as_error`](Self::as_error)
    /// and `downcast_ref` on the error instead.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Arg::Value(v) => v.as_any().downcast_ref::<T>(),
            Arg::Error(_) => None,
        }
    }

    /// Name of the stored type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Arg::Value(v) => v.type_name(),
            Arg::Error(Cause::Erf(_)) => core::any::type_name::<crate::Erf>(),
            Arg::Error(Cause::Foreign(_)) => "dyn core::error::Error",
        }
    }

    /// Format the argument the way `{}` substitutes it.
    pub fn display(&self) -> ArgDisplay<'_> {
        ArgDisplay { arg: self }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => fmt::Debug::fmt(&**v, f),
            Arg::Error(cause) => write!(f, "{:?}", cause.as_error().to_string()),
        }
    }
}

/// `Display` adapter returned by [`Arg::display`].
pub struct ArgDisplay<'a> {
    arg: &'a Arg,
}

impl fmt::Display for ArgDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            Arg::Value(v) => fmt::Display::fmt(&**v, f),
            Arg::Error(cause) => fmt::Display::fmt(cause.as_error(), f),
        }
    }
}

// ============================================================================
// IntoArg - conversion used by the erf!() macro
// ============================================================================

/// Conversion into an [`Arg`].
///
/// Any `Display + Debug` value converts into [`Arg::Value`]; an [`Arg`] passes
/// through unchanged, which is how errors reach a `{:w}` placeholder:
///
/// ```rust
/// use erf::{erf, Arg};
///
/// let io = std::io::Error::other("disk on fire");
/// let err = erf!("saving {}: {:w}", "report.txt", Arg::error(io)).unwrap();
/// assert_eq!(err.to_string(), "saving report.txt: disk on fire");
/// assert!(err.cause().is_some());
/// ```
pub trait IntoArg {
    /// Convert into an argument.
    fn into_arg(self) -> Arg;
}

impl<T: ArgValue> IntoArg for T {
    fn into_arg(self) -> Arg {
        Arg::value(self)
    }
}

impl IntoArg for Arg {
    fn into_arg(self) -> Arg {
        self
    }
}
