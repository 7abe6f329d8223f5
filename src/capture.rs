//! Call stack capture.
//!
//! [`capture()`] records the program counters of the active call stack using
//! the `backtrace` crate. How the platform unwinds is not this crate's
//! concern; this module only decides which frames to keep.
//!
//! [`CaptureConfig`] carries the depth bound and skip count. It is passed
//! explicitly (see [`Erf::builder()`](crate::Erf::builder)) rather than stored
//! in process-wide mutable state.

use core::mem::size_of;

// ============================================================================
// Defaults
// ============================================================================

/// Page size assumed when sizing the default capture buffer.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default maximum number of frames captured per error: one page of
/// program counters (512 frames on 64-bit targets).
pub const DEFAULT_MAX_DEPTH: usize = DEFAULT_PAGE_SIZE / size_of::<usize>();

/// Environment variable read by [`CaptureConfig::from_env()`].
pub const MAX_DEPTH_ENV: &str = "ERF_MAX_DEPTH";

// ============================================================================
// CaptureConfig
// ============================================================================

/// Depth bound and skip count used when an error captures its stack.
///
/// All methods are `const fn`, so a config can live in a `static`:
///
/// ```rust
/// use erf::CaptureConfig;
///
/// static SHALLOW: CaptureConfig = CaptureConfig::DEFAULT.max_depth(16);
///
/// assert_eq!(SHALLOW.depth(), 16);
/// assert_eq!(SHALLOW.skipped(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureConfig {
    max_depth: usize,
    skip: usize,
}

impl CaptureConfig {
    /// [`DEFAULT_MAX_DEPTH`] frames, nothing skipped beyond the constructor.
    pub const DEFAULT: Self = Self {
        max_depth: DEFAULT_MAX_DEPTH,
        skip: 0,
    };

    /// Same as [`CaptureConfig::DEFAULT`].
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the maximum number of frames to keep.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set how many additional caller frames to discard.
    ///
    /// Helpers that construct errors on behalf of their caller use this to
    /// keep their own frame out of the trace.
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Maximum number of frames kept.
    pub const fn depth(&self) -> usize {
        self.max_depth
    }

    /// Number of additional caller frames discarded.
    pub const fn skipped(&self) -> usize {
        self.skip
    }

    /// Read the depth bound from `ERF_MAX_DEPTH`, falling back to the default
    /// when the variable is unset or not a number.
    ///
    /// Intended to be called once at startup and the result passed around.
    pub fn from_env() -> Self {
        let depth = std::env::var(MAX_DEPTH_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok());
        match depth {
            Some(d) => Self::DEFAULT.max_depth(d),
            None => Self::DEFAULT,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// capture()
// ============================================================================

/// One captured frame: its program counter and the runtime start address of
/// the function it belongs to (0 when the platform cannot tell).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct Frame {
    pub(crate) pc: usize,
    pub(crate) entry: usize,
}

/// Capture up to `max_depth` program counters, innermost first.
///
/// Frames inside the unwinder and this function are never returned. The
/// first element is the caller of `capture`, unless `skip` drops it and
/// further callers.
///
/// ```rust
/// let here = erf::capture(8, 0);
/// let above = erf::capture(8, 1);
/// assert!(here.len() <= 8);
/// assert!(above.len() <= 8);
/// ```
#[inline(never)]
pub fn capture(max_depth: usize, skip: usize) -> Vec<usize> {
    let frames = capture_frames(max_depth, skip + 1);
    frames.into_iter().map(|f| f.pc).collect()
}

/// Like [`capture()`], keeping each frame's function entry address.
///
/// The first element is the caller of `capture_frames`, unless `skip` drops
/// it and further callers.
#[inline(never)]
pub(crate) fn capture_frames(max_depth: usize, skip: usize) -> Vec<Frame> {
    let anchor = capture_frames as fn(usize, usize) -> Vec<Frame> as usize;
    let mut frames = Vec::new();
    if max_depth == 0 {
        return frames;
    }

    // Frames above the anchor belong to the unwinder. If the platform cannot
    // report symbol addresses the anchor is never seen and we fall back to
    // keeping everything.
    let mut anchored = false;
    let mut raw = Vec::new();
    let mut remaining = skip;
    backtrace::trace(|frame| {
        let captured = Frame {
            pc: frame.ip() as usize,
            entry: frame.symbol_address() as usize,
        };
        if !anchored {
            raw.push(captured);
            if captured.entry == anchor {
                anchored = true;
            }
            return true;
        }
        if remaining > 0 {
            remaining -= 1;
            return true;
        }
        frames.push(captured);
        frames.len() < max_depth
    });

    if !anchored {
        frames = raw.into_iter().skip(skip).take(max_depth).collect();
    }
    frames
}
