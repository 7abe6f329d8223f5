//! Unit tests for erf.
//!
//! These tests are in a separate file for organization but remain in the `src/`
//! directory to retain access to `pub(crate)` items like `write_chain`.

use crate::render::write_chain;
use crate::{
    Arg, BoxError, CallSite, CaptureConfig, Cause, Erf, ErfError, ErrorErfExt, Layout, Link, Mode,
    StackTrace, erf,
};
use core::fmt;
use std::error::Error;

#[derive(Debug, PartialEq, Eq, Hash)]
enum TestError {
    NotFound,
    InvalidInput,
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::NotFound => write!(f, "not found"),
            TestError::InvalidInput => write!(f, "invalid input"),
        }
    }
}

impl Error for TestError {}

static_assertions::assert_impl_all!(Erf: Send, Sync, Clone, Error);
static_assertions::assert_impl_all!(StackTrace: Send, Sync, Clone);
static_assertions::assert_impl_all!(Arg: Send, Sync, Clone);
static_assertions::assert_impl_all!(Cause: Send, Sync, Clone);
static_assertions::assert_impl_all!(ErfError: Send, Sync, Error);

fn fixture_stack() -> StackTrace {
    StackTrace::from_call_sites(vec![
        CallSite::new("app::run", "src/run.rs", 10, 0x1000, 0x1010),
        CallSite::new("app::main", "src/main.rs", 3, 0x900, 0x904),
    ])
}

fn with_fixture(mut err: Erf) -> Erf {
    err.set_stack_trace(fixture_stack());
    err
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_single_mode_is_bare_message() {
    let err = Erf::new("boom");
    assert_eq!(format!("{err}"), "boom");
    assert_eq!(err.message(), "boom");
}

#[test]
fn test_full_mode_lists_frames_after_message() {
    let err = with_fixture(Erf::new("boom"));
    assert_eq!(
        format!("{err:0x}"),
        "\tboom\napp::run(0x1000)\napp::main(0x900)\n"
    );
}

#[inline(never)]
fn boom_here() -> Erf {
    Erf::new("boom")
}

#[test]
fn test_capture_excludes_construction_frames() {
    let err = boom_here();
    let sites = err.stack_trace().call_sites();
    assert!(!sites.is_empty());
    assert!(
        sites[0].function().contains("boom_here"),
        "innermost frame should be the caller of Erf::new, got {:?}",
        sites[0]
    );
    let rendered = format!("{err:0x}");
    let mut lines = rendered.lines();
    assert_eq!(lines.next(), Some("\tboom"));
    assert_eq!(lines.count(), sites.len());
}

#[test]
fn test_recursion_selects_blocks() {
    let a = with_fixture(Erf::new("root cause"));
    let b = with_fixture(Erf::wrap_err(a));

    let full = format!("{b:0x}");
    let blocks: Vec<&str> = full.split("\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].starts_with("\troot cause\napp::run"));
    assert!(blocks[1].starts_with("\troot cause\napp::run"));

    let first = format!("{b:0X}");
    assert_eq!(first, "\troot cause\napp::run(0x1000)\napp::main(0x900)\n");
}

#[test]
fn test_tag_names_skip_empty() {
    let mut err = erf!("{} {} {}", 1, "alice", TestError::InvalidInput.to_string()).unwrap();
    err.attach(&["", "name", "reason"]).unwrap();
    assert_eq!(err.tag_names(), ["name", "reason"]);
    assert_eq!(err.tag_count(), 2);
    let name = err.tag_value("name").unwrap();
    assert_eq!(name.downcast_ref::<&str>(), Some(&"alice"));
    assert!(err.tag_value("missing").is_none());
    assert!(err.tag_value("").is_none());
}

#[test]
fn test_three_level_chain() {
    let c = Erf::new("c");
    let b = Erf::wrap_err(c);
    let a = Erf::wrap_err(b);
    let texts: Vec<String> = a.chain().iter().map(ToString::to_string).collect();
    assert_eq!(texts, ["c", "c", "c"]);
    assert_eq!(a.links().filter(|l| l.as_traced().is_some()).count(), 3);

    let c = Erf::new("leaf");
    let b = erf!("middle: {:w}", Arg::from(c)).unwrap();
    let a = erf!("top: {:w}", Arg::from(b)).unwrap();
    let texts: Vec<String> = a.chain().iter().map(ToString::to_string).collect();
    assert_eq!(texts, ["top: middle: leaf", "middle: leaf", "leaf"]);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_wrap_absent() {
    assert!(Erf::wrap(None::<TestError>).is_none());

    let mut slot: Option<BoxError> = None;
    Erf::wrap_in_place(Some(&mut slot));
    assert!(slot.is_none());
    Erf::wrap_in_place(None);
}

#[test]
fn test_wrap_shape() {
    let err = Erf::wrap(Some(TestError::NotFound)).unwrap();
    assert_eq!(err.to_string(), "not found");
    assert_eq!(err.fmt_template(), crate::WRAP_TEMPLATE);
    assert_eq!(err.arg_count(), 1);
    assert!(err.arg(0).unwrap().is_error());
    let cause = err.cause().unwrap();
    assert_eq!(cause.downcast_ref::<TestError>(), Some(&TestError::NotFound));
    assert!(matches!(err.cause_ref(), Some(Cause::Foreign(_))));
}

#[test]
fn test_wrapping_a_node_keeps_it_traced() {
    let inner = Erf::new("inner");
    let outer = inner.erf();
    assert!(matches!(outer.cause_ref(), Some(Cause::Erf(_))));
    assert_eq!(outer.cause_ref().and_then(Cause::as_erf).map(Erf::message), Some("inner"));

    let boxed: BoxError = Box::new(Erf::new("boxed"));
    let outer = Erf::wrap_boxed(boxed);
    assert!(matches!(outer.cause_ref(), Some(Cause::Erf(_))));
}

#[test]
fn test_wrap_in_place_replaces_value() {
    let mut slot: Option<BoxError> = Some(Box::new(TestError::InvalidInput));
    Erf::wrap_in_place(Some(&mut slot));
    let node = slot.take().unwrap().downcast::<Erf>().unwrap();
    assert_eq!(node.to_string(), "invalid input");
    let source = node.source().unwrap();
    assert!(source.is::<TestError>());
}

#[test]
fn test_nil_arg_rejected() {
    let res = Erf::try_newf("{} {} {}", [Some(Arg::value(1)), Some(Arg::value(2)), None]);
    assert_eq!(res.unwrap_err(), ErfError::NilArg { index: 2 });

    let ok = Erf::try_newf("{}-{}", [Some(Arg::value(1)), Some(Arg::value(2))]).unwrap();
    assert_eq!(ok.to_string(), "1-2");
}

#[test]
fn test_template_errors_surface() {
    assert!(matches!(
        erf!("{} {}", 1),
        Err(ErfError::Template { .. })
    ));
    assert!(matches!(
        erf!("{}", 1, 2),
        Err(ErfError::Template { .. })
    ));
    assert!(matches!(
        erf!("{:w}", 1),
        Err(ErfError::Template { .. })
    ));
}

#[test]
fn test_zero_args_versus_none() {
    let plain = Erf::new("plain");
    assert!(plain.args().is_none());
    assert_eq!(plain.fmt_template(), "");

    let mut formatted = Erf::newf("literal {{braces}}", Vec::<Arg>::new()).unwrap();
    assert_eq!(formatted.to_string(), "literal {braces}");
    assert_eq!(formatted.arg_count(), 0);
    assert!(formatted.args().is_some_and(|a| a.is_empty()));
    assert_eq!(formatted.attach(&[]).map(|_| ()), Ok(()));
}

#[test]
fn test_arg_access() {
    let err = erf!("{} and {:?}", 7u16, "x").unwrap();
    assert_eq!(err.arg(0).unwrap().downcast_ref::<u16>(), Some(&7));
    assert_eq!(err.arg(1).unwrap().display().to_string(), "x");
    assert_eq!(
        err.arg(2).unwrap_err(),
        ErfError::IndexOutOfRange { index: 2, len: 2 }
    );
    assert_eq!(err.to_string(), "7 and \"x\"");
}

#[test]
fn test_builder_depth_and_skip() {
    let none = Erf::builder().max_depth(0).message("shallow");
    assert!(none.stack_trace().is_empty());
    assert_eq!(format!("{none:x}"), "\tshallow\n*\n");

    let config = CaptureConfig::DEFAULT.max_depth(2);
    let two = Erf::builder().config(config).message("two");
    assert!(two.stack_trace().len() <= 2);
    assert_eq!(Erf::builder().skip(3).capture_config().skipped(), 3);
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_attach_failures_leave_node_unchanged() {
    let mut err = erf!("{} {}", 1, 2).unwrap();
    assert_eq!(
        err.attach(&["a", "b", "c"]).unwrap_err(),
        ErfError::TooManyTags { tags: 3, args: 2 }
    );
    assert!(!err.has_tags());
    assert_eq!(
        err.attach(&["a", "a"]).unwrap_err(),
        ErfError::DuplicateTag("a".into())
    );
    assert!(!err.has_tags());

    err.attach(&["a", "b"]).unwrap();
    assert_eq!(err.attach(&["c"]).unwrap_err(), ErfError::TagsAttached);
    assert_eq!(err.tag_names(), ["a", "b"]);

    let mut plain = Erf::new("plain");
    assert_eq!(plain.attach(&["x"]).unwrap_err(), ErfError::NoArgs);
}

#[test]
fn test_tags_iterate_in_attachment_order() {
    let err = erf!("{} {} {}", "x", 2, 3.5)
        .unwrap()
        .with_tags(&["first", "", "third"])
        .unwrap();
    let pairs: Vec<(String, String)> = err
        .tags()
        .map(|(n, v)| (n.to_owned(), v.display().to_string()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("first".to_owned(), "x".to_owned()),
            ("third".to_owned(), "3.5".to_owned())
        ]
    );
}

// ============================================================================
// Copies and frames
// ============================================================================

#[test]
fn test_copy_is_independent() {
    let original = erf!("{}", 1).unwrap();
    let mut copy = original.copy();
    copy.attach(&["n"]).unwrap();
    assert!(!original.has_tags());
    assert!(copy.has_tags());
    assert_eq!(copy.program_counters(), original.program_counters());
}

#[test]
fn test_drop_all_frames_renders_empty_trace() {
    let err = with_fixture(Erf::new("boom"));
    let stripped = err.copy_dropping_top_frames(2).unwrap();
    assert!(stripped.stack_trace().is_empty());
    assert_eq!(format!("{}", stripped.stack_trace()), "");
    assert_eq!(format!("{stripped:x}"), "\tboom\n*\n");

    assert_eq!(
        err.copy_dropping_top_frames(3).unwrap_err(),
        ErfError::FrameRange {
            requested: 3,
            available: 2
        }
    );

    let one = err.copy_dropping_top_frames(1).unwrap();
    assert_eq!(format!("{}", one.stack_trace()), "app::main(0x900)");
}

// ============================================================================
// Rendering internals
// ============================================================================

#[test]
fn test_write_chain_message_mode() {
    let err = with_fixture(erf!("a {}", 1).unwrap());
    let layout = Layout::builder().mode(Mode::Message).build();
    let mut out = String::new();
    write_chain(&mut out, Link::Traced(&err), &layout).unwrap();
    assert_eq!(out, "a 1");
    assert_eq!(err.render(&layout), "a 1");
}

#[test]
fn test_multiline_messages_are_indented() {
    let err = with_fixture(Erf::new("first\nsecond"));
    assert_eq!(
        format!("{err:0X}"),
        "\tfirst\n\tsecond\napp::run(0x1000)\napp::main(0x900)\n"
    );
}

#[test]
fn test_debug_matches_lower_hex() {
    let err = with_fixture(Erf::wrap_err(TestError::NotFound));
    assert_eq!(format!("{err:?}"), format!("{err:x}"));
    assert_eq!(format!("{err:+#?}"), format!("{err:+#x}"));
}
