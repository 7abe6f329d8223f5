//! Tracing integration.
//!
//! Records an [`Erf`] as a structured `tracing` event.
//!
//! # Feature Flag
//!
//! Requires the `tracing` feature:
//!
//! ```toml
//! [dependencies]
//! erf = { version = "0.1", features = ["tracing"] }
//! ```
//!
//! Event fields:
//!
//! | Field | Value |
//! |-------|-------|
//! | `message` | the node's message |
//! | `chain_depth` | number of errors in the chain |
//! | `frames` | number of captured frames |
//! | `tags` | `"name"="value"` pairs, space separated |
//! | `stack` | compact stack text, one `function(entry)` per line |

use core::fmt::Write as _;

use tracing::Level;

use crate::node::Erf;

impl Erf {
    /// Record this node as an event at `level`.
    ///
    /// ```rust,ignore
    /// use erf::Erf;
    /// use tracing::Level;
    ///
    /// Erf::new("cache miss").emit(Level::WARN);
    /// ```
    pub fn emit(&self, level: Level) {
        let depth = self.links().count();
        let frames = self.stack_trace().len();
        let tags = tag_field(self);
        let stack = self.stack_trace().to_string();

        macro_rules! record {
            ($lvl:expr) => {
                tracing::event!(
                    $lvl,
                    chain_depth = depth,
                    frames,
                    tags = %tags,
                    stack = %stack,
                    "{}",
                    self
                )
            };
        }

        if level == Level::ERROR {
            record!(Level::ERROR);
        } else if level == Level::WARN {
            record!(Level::WARN);
        } else if level == Level::INFO {
            record!(Level::INFO);
        } else if level == Level::DEBUG {
            record!(Level::DEBUG);
        } else {
            record!(Level::TRACE);
        }
    }
}

fn tag_field(node: &Erf) -> String {
    let mut out = String::new();
    for (i, (name, value)) in node.tags().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:?}={:?}", name, value.display().to_string());
    }
    out
}

/// Extension trait that records the error of a `Result` before returning it.
pub trait ResultErfLogExt<T> {
    /// Emit the error, if any, at `ERROR` level and pass the result through.
    fn log_erf(self) -> Result<T, Erf>;

    /// Emit the error, if any, at `level` and pass the result through.
    fn log_erf_at(self, level: Level) -> Result<T, Erf>;
}

impl<T> ResultErfLogExt<T> for Result<T, Erf> {
    fn log_erf(self) -> Result<T, Erf> {
        self.log_erf_at(Level::ERROR)
    }

    fn log_erf_at(self, level: Level) -> Result<T, Erf> {
        if let Err(err) = &self {
            err.emit(level);
        }
        self
    }
}
