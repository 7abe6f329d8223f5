//! Tests for frame surgery APIs: capture skip, copy_dropping_top_frames,
//! set_stack_trace and duplicate.
//!
//! These APIs let helpers that build errors on behalf of their caller keep
//! their own frames out of the trace.

use erf::{CallSite, CaptureConfig, Erf, ErfError, StackTrace, capture};

#[derive(Debug)]
struct TestError;

impl core::fmt::Display for TestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "test error")
    }
}

impl std::error::Error for TestError {}

fn function_names(err: &Erf) -> Vec<String> {
    err.stack_trace()
        .call_sites()
        .iter()
        .map(|s| s.function().to_owned())
        .collect()
}

// ============================================================================
// Helpers that construct on behalf of their caller
// ============================================================================

#[inline(never)]
fn fail_with(msg: &str) -> Erf {
    Erf::builder().skip(1).message(msg.to_owned())
}

#[inline(never)]
fn validating_caller() -> Erf {
    fail_with("invalid")
}

#[inline(never)]
fn plain_helper() -> Erf {
    Erf::new("from helper")
}

#[inline(never)]
fn reraise_from_caller() -> Erf {
    plain_helper().copy_dropping_top_frames(1).unwrap()
}

#[test]
fn builder_skip_hides_helper_frame() {
    let err = validating_caller();
    let names = function_names(&err);
    assert!(
        names[0].contains("validating_caller"),
        "helper frame should be skipped, got {:?}",
        names
    );
    assert!(!names.iter().any(|n| n.contains("fail_with")));
}

#[test]
fn dropping_top_frames_matches_skip() {
    let err = reraise_from_caller();
    let names = function_names(&err);
    assert!(
        names[0].contains("reraise_from_caller"),
        "got {:?}",
        names
    );
}

#[test]
fn dropping_keeps_everything_else() {
    let err = plain_helper().with_tags(&[]).unwrap_err();
    assert_eq!(err, ErfError::NoArgs);

    let err = Erf::newf("{}", [erf::Arg::value(5)]).unwrap();
    let dropped = err.copy_dropping_top_frames(1).unwrap();
    assert_eq!(dropped.to_string(), err.to_string());
    assert_eq!(dropped.arg_count(), 1);
    assert_eq!(
        dropped.program_counters(),
        &err.program_counters()[1..]
    );
}

#[test]
fn dropping_all_frames_renders_empty_trace() {
    let err = Erf::wrap_err(TestError);
    let n = err.stack_trace().len();
    let bare = err.copy_dropping_top_frames(n).unwrap();
    assert!(bare.stack_trace().is_empty());
    assert_eq!(bare.stack_trace().to_string(), "");
    assert!(matches!(
        err.copy_dropping_top_frames(n + 1),
        Err(ErfError::FrameRange { requested, available }) if requested == n + 1 && available == n
    ));
}

// ============================================================================
// Capture
// ============================================================================

#[inline(never)]
fn capture_both() -> (Vec<usize>, Vec<usize>) {
    let mut out = Vec::new();
    for skip in 0..2 {
        out.push(capture_at(skip));
    }
    let b = out.pop().unwrap();
    let a = out.pop().unwrap();
    (a, b)
}

#[inline(never)]
fn capture_at(skip: usize) -> Vec<usize> {
    capture(64, skip)
}

#[test]
fn skip_yields_a_suffix() {
    let (a, b) = capture_both();
    assert_eq!(a.len(), b.len() + 1);
    assert_eq!(&a[1..], &b[..]);
}

#[test]
fn depth_bounds_capture() {
    for depth in [1, 3, 8] {
        let err = Erf::builder().max_depth(depth).message("bounded");
        assert!(err.stack_trace().len() <= depth);
    }
    let config = CaptureConfig::DEFAULT.max_depth(1);
    assert!(StackTrace::capture(config).len() <= 1);
}

// ============================================================================
// Replacing and duplicating traces
// ============================================================================

#[test]
fn set_stack_trace_carries_frames_over() {
    let donor = Erf::new("donor");
    let mut err = Erf::wrap_err(TestError);
    err.set_stack_trace(donor.stack_trace().duplicate());
    assert_eq!(err.program_counters(), donor.program_counters());
}

#[test]
fn duplicate_is_structurally_independent() {
    let original = StackTrace::from_call_sites(vec![
        CallSite::new("a::f", "src/a.rs", 1, 0x10, 0x11),
        CallSite::new("a::g", "src/a.rs", 2, 0x20, 0x22),
    ]);
    let copy = original.duplicate();
    let before = format!("{:+}", copy);
    drop(original);
    assert_eq!(format!("{:+}", copy), before);
    assert_eq!(copy.call_site(1).unwrap().function(), "a::g");
}

#[test]
fn lazily_resolved_duplicates_resolve_alike() {
    let err = Erf::new("lazy");
    let copy = err.stack_trace().duplicate();
    assert_eq!(
        copy.call_sites(),
        err.stack_trace().call_sites(),
    );
}
