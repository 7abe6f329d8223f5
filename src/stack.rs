//! Stack traces and call sites.
//!
//! A [`StackTrace`] owns the raw program counters captured when an error was
//! built, together with the runtime entry address of each frame's function,
//! and resolves them to [`CallSite`]s on first use. Resolution happens at
//! most once per trace; after it the sequences have equal length.

use core::ffi::c_void;
use core::fmt;
use std::sync::OnceLock;

use crate::capture::{CaptureConfig, Frame, capture_frames};
use crate::error::ErfError;
use crate::layout::Layout;

// ============================================================================
// PcVec - configurable storage for program counters
// ============================================================================
//
// Most traces are short enough to live inline when one of the inline-storage
// features is enabled; longer ones spill to the heap.

/// Inline program counter storage using smallvec.
#[cfg(feature = "smallvec-256-bytes")]
type PcVec = smallvec::SmallVec<[usize; 32]>;

/// Inline program counter storage using tinyvec.
#[cfg(all(feature = "tinyvec-256-bytes", not(feature = "smallvec-256-bytes")))]
type PcVec = tinyvec::TinyVec<[usize; 32]>;

/// Heap-allocated program counter storage (default).
#[cfg(not(any(feature = "tinyvec-256-bytes", feature = "smallvec-256-bytes")))]
type PcVec = Vec<usize>;

/// Placeholder for an unknown function or file.
pub const UNKNOWN: &str = "???";

/// Placeholder for an unknown line number.
pub const UNKNOWN_LINE: &str = "?";

// ============================================================================
// CallSite
// ============================================================================

/// One resolved stack frame.
///
/// Empty `function`/`file` and a zero `line` mean "unknown"; they render as
/// [`UNKNOWN`] and [`UNKNOWN_LINE`] so rendered traces stay line-aligned.
///
/// ```rust
/// use erf::CallSite;
///
/// let site = CallSite::new("app::run", "/src/app/main.rs", 12, 0x1000, 0x1024);
/// assert_eq!(site.offset(), 0x24);
/// assert_eq!(format!("{site}"), "app::run(0x1000)");
/// assert_eq!(format!("{site:+#}"), "app::run(0x1000)\n\tmain.rs:12 +0x24");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallSite {
    function: String,
    file: String,
    line: u32,
    entry: usize,
    pc: usize,
}

impl CallSite {
    /// Build a call site from already-known parts.
    pub fn new(
        function: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        entry: usize,
        pc: usize,
    ) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
            entry,
            pc,
        }
    }

    /// Resolve a program counter through the platform's symbol information.
    ///
    /// `entry` is the runtime start address of the enclosing function as
    /// reported by the unwinder, or 0 if unknown. Symbol tables hold
    /// unrelocated addresses, so the entry is never taken from them.
    ///
    /// Only the first symbol reported for the address is kept, so inlined
    /// frames collapse into their innermost function.
    pub fn resolve(pc: usize, entry: usize) -> Self {
        let mut site = Self {
            pc,
            entry,
            ..Self::default()
        };
        // Return addresses point just past the call; look up the call itself.
        let lookup = pc.saturating_sub(1);
        let mut seen = false;
        backtrace::resolve(lookup as *mut c_void, |symbol| {
            if seen {
                return;
            }
            seen = true;
            if let Some(name) = symbol.name() {
                site.function = format!("{:#}", name);
            }
            if let Some(file) = symbol.filename() {
                site.file = file.to_string_lossy().into_owned();
            }
            site.line = symbol.lineno().unwrap_or(0);
        });
        site
    }

    /// Function name, empty if unknown.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Source file path, empty if unknown.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number, 0 if unknown.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Start address of the function.
    pub fn entry(&self) -> usize {
        self.entry
    }

    /// Program counter of the frame.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Distance from the function entry to the program counter, 0 when the
    /// entry is unknown.
    pub fn offset(&self) -> usize {
        if self.entry == 0 {
            0
        } else {
            self.pc.saturating_sub(self.entry)
        }
    }

    /// Render with an explicit layout.
    pub fn render(&self, layout: &Layout) -> String {
        let mut out = String::new();
        let _ = write_call_site(&mut out, self, layout);
        out
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = Layout::stack(f);
        write_call_site(f, self, &layout)
    }
}

// ============================================================================
// StackTrace
// ============================================================================

/// Program counters captured at one point, resolved lazily to call sites.
///
/// Innermost frame first. Cloning (or [`duplicate`](Self::duplicate)) copies
/// both the counters and any resolved call sites into fresh storage.
#[derive(Clone, Default)]
pub struct StackTrace {
    pcs: PcVec,
    // Same length as `pcs`; 0 where the entry is unknown.
    entries: PcVec,
    sites: OnceLock<Vec<CallSite>>,
}

impl StackTrace {
    /// An empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current stack, starting at the caller of this function.
    #[inline(never)]
    pub fn capture(config: CaptureConfig) -> Self {
        Self::from_frames(&capture_frames(config.depth(), config.skipped() + 1))
    }

    fn from_frames(frames: &[Frame]) -> Self {
        let pcs: Vec<usize> = frames.iter().map(|f| f.pc).collect();
        let entries: Vec<usize> = frames.iter().map(|f| f.entry).collect();
        Self {
            pcs: PcVec::from(&pcs[..]),
            entries: PcVec::from(&entries[..]),
            sites: OnceLock::new(),
        }
    }

    /// Build a trace from raw program counters. Resolution is deferred.
    ///
    /// Function entry addresses are not known for bare counters, so the
    /// resolved call sites report an entry of 0 and no offset.
    pub fn from_pcs(pcs: &[usize]) -> Self {
        Self {
            pcs: PcVec::from(pcs),
            entries: PcVec::from(&vec![0; pcs.len()][..]),
            sites: OnceLock::new(),
        }
    }

    /// Build an already-resolved trace from call sites.
    pub fn from_call_sites(sites: Vec<CallSite>) -> Self {
        let pcs: Vec<usize> = sites.iter().map(CallSite::pc).collect();
        let entries: Vec<usize> = sites.iter().map(CallSite::entry).collect();
        Self {
            pcs: PcVec::from(&pcs[..]),
            entries: PcVec::from(&entries[..]),
            sites: OnceLock::from(sites),
        }
    }

    /// Resolve every program counter. Idempotent.
    pub fn resolve(&self) -> &[CallSite] {
        self.sites.get_or_init(|| {
            self.pcs
                .iter()
                .zip(self.entries.iter())
                .map(|(&pc, &entry)| CallSite::resolve(pc, entry))
                .collect()
        })
    }

    /// Whether resolution already happened.
    pub fn is_resolved(&self) -> bool {
        self.sites.get().is_some()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.pcs.len()
    }

    /// Whether no frames were captured.
    pub fn is_empty(&self) -> bool {
        self.pcs.is_empty()
    }

    /// Call site at `index`, resolving the trace if needed.
    pub fn call_site(&self, index: usize) -> Result<&CallSite, ErfError> {
        self.resolve().get(index).ok_or(ErfError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// All call sites, innermost first.
    pub fn call_sites(&self) -> &[CallSite] {
        self.resolve()
    }

    /// Raw program counters, innermost first.
    pub fn program_counters(&self) -> &[usize] {
        &self.pcs
    }

    /// Deep copy with independent storage.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Copy without the `n` innermost frames.
    pub fn drop_top(&self, n: usize) -> Result<Self, ErfError> {
        if n > self.len() {
            return Err(ErfError::FrameRange {
                requested: n,
                available: self.len(),
            });
        }
        let sites = OnceLock::new();
        if let Some(resolved) = self.sites.get() {
            let _ = sites.set(resolved[n..].to_vec());
        }
        Ok(Self {
            pcs: PcVec::from(&self.pcs[n..]),
            entries: PcVec::from(&self.entries[n..]),
            sites,
        })
    }

    /// Render with an explicit layout; call sites are newline-joined.
    pub fn render(&self, layout: &Layout) -> String {
        let mut out = String::new();
        let _ = write_stack(&mut out, self, layout);
        out
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = Layout::stack(f);
        write_stack(f, self, &layout)
    }
}

impl fmt::Debug for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.call_sites()).finish()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Write `function(entry)` and, with detail, `file:line +offset` below it.
pub(crate) fn write_call_site<W: fmt::Write + ?Sized>(
    w: &mut W,
    site: &CallSite,
    layout: &Layout,
) -> fmt::Result {
    let padding = layout.padding();
    let function = if site.function.is_empty() {
        UNKNOWN
    } else {
        site.function.as_str()
    };
    write!(w, "{}{}({:#x})", padding, function, site.entry)?;
    if layout.detail() {
        let file = if site.file.is_empty() {
            UNKNOWN
        } else if layout.short_paths() {
            base_name(&site.file)
        } else {
            trim_src_path(&site.file)
        };
        write!(w, "\n{}{}{}:", padding, layout.indentation(), file)?;
        if site.line == 0 {
            w.write_str(UNKNOWN_LINE)?;
        } else {
            write!(w, "{}", site.line)?;
        }
        write!(w, " +{:#x}", site.offset())?;
    }
    Ok(())
}

/// Write every call site of `trace`, newline-joined, no trailing newline.
pub(crate) fn write_stack<W: fmt::Write + ?Sized>(
    w: &mut W,
    trace: &StackTrace,
    layout: &Layout,
) -> fmt::Result {
    for (i, site) in trace.call_sites().iter().enumerate() {
        if i > 0 {
            w.write_char('\n')?;
        }
        write_call_site(w, site, layout)?;
    }
    Ok(())
}

// ============================================================================
// Path helpers
// ============================================================================

/// Strip the toolchain or cargo cache prefix from a source path.
///
/// - `/rustc/<hash>/library/std/src/rt.rs` → `library/std/src/rt.rs`
/// - `~/.cargo/registry/src/<index>/serde-1.0.0/src/de.rs` → `serde-1.0.0/src/de.rs`
/// - `~/.cargo/git/checkouts/<repo>/<rev>/src/lib.rs` → `src/lib.rs`
pub(crate) fn trim_src_path(path: &str) -> &str {
    if let Some(rest) = path.strip_prefix("/rustc/") {
        if let Some(slash) = rest.find('/') {
            return &rest[slash + 1..];
        }
    }
    if let Some(rest) = after(path, "registry/src/") {
        // Skip the registry index directory.
        if let Some(slash) = rest.find(['/', '\\']) {
            return &rest[slash + 1..];
        }
    }
    if let Some(rest) = after(path, "git/checkouts/") {
        // Skip the checkout and revision directories.
        let mut parts = rest.splitn(3, ['/', '\\']);
        if let (Some(_), Some(_), Some(tail)) = (parts.next(), parts.next(), parts.next()) {
            return tail;
        }
        return rest;
    }
    path
}

fn after<'a>(path: &'a str, marker: &str) -> Option<&'a str> {
    let normalized = marker.replace('/', "\\");
    path.find(marker)
        .map(|pos| &path[pos + marker.len()..])
        .or_else(|| {
            path.find(normalized.as_str())
                .map(|pos| &path[pos + normalized.len()..])
        })
}

/// Last path component.
pub(crate) fn base_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(pos) if pos + 1 < path.len() => &path[pos + 1..],
        _ => path,
    }
}
