//! Chain rendering.
//!
//! Emits the text for a chain according to a parsed [`Layout`]. Message
//! mode writes the head's message verbatim. Chain and first-node modes write
//! one block per link:
//!
//! ```text
//! {pad}{indent}message line
//! {pad}function(0xentry)
//! {pad}{indent}file:line +0xoffset
//! {pad}+ "name"="value" ...
//! ```
//!
//! Blocks are separated by an empty line. Links without the [`Traced`]
//! capability still get a block (their message, or `-` when messages are
//! suppressed) so the number of blocks always equals the chain depth.

use core::fmt;

use crate::chain::{Chain, Link, MAX_CHAIN_DEPTH, Traced};
use crate::layout::{Layout, Mode};
use crate::stack::write_stack;

/// Marker written for a traced node without any captured frames.
pub const EMPTY_STACK: &str = "*";

/// Marker written for a foreign link when messages are suppressed.
pub const FOREIGN_LINK: &str = "-";

/// Write the chain starting at `head`.
pub(crate) fn write_chain<W: fmt::Write + ?Sized>(
    w: &mut W,
    head: Link<'_>,
    layout: &Layout,
) -> fmt::Result {
    if layout.mode() == Mode::Message {
        return write!(w, "{}", head.as_error());
    }

    let padding = layout.padding();
    let indent = layout.indentation();
    let limit = if layout.recurses() { MAX_CHAIN_DEPTH } else { 1 };

    for (idx, link) in Chain::new(head).take(limit).enumerate() {
        if idx > 0 {
            w.write_char('\n')?;
        }
        match link {
            Link::Traced(node) => write_traced(w, node, layout, &padding, &indent)?,
            Link::Foreign(err) => {
                if layout.messages() {
                    write_message(w, &err.to_string(), &padding, &indent)?;
                } else {
                    writeln!(w, "{}{}", padding, FOREIGN_LINK)?;
                }
            }
        }
    }
    Ok(())
}

fn write_traced<W: fmt::Write + ?Sized>(
    w: &mut W,
    node: &dyn Traced,
    layout: &Layout,
    padding: &str,
    indent: &str,
) -> fmt::Result {
    if layout.messages() {
        write_message(w, &node.as_error().to_string(), padding, indent)?;
    }

    let stack = node.stack_trace();
    if stack.is_empty() {
        writeln!(w, "{}{}", padding, EMPTY_STACK)?;
    } else {
        write_stack(w, stack, layout)?;
        w.write_char('\n')?;
    }

    if layout.tags() {
        let tags = node.tag_pairs();
        if !tags.is_empty() {
            write!(w, "{}+ ", padding)?;
            for (i, (name, value)) in tags.iter().enumerate() {
                if i > 0 {
                    w.write_char(' ')?;
                }
                write!(w, "{:?}={:?}", name, value.display().to_string())?;
            }
            w.write_char('\n')?;
        }
    }
    Ok(())
}

fn write_message<W: fmt::Write + ?Sized>(
    w: &mut W,
    message: &str,
    padding: &str,
    indent: &str,
) -> fmt::Result {
    for line in message.split('\n') {
        writeln!(w, "{}{}{}", padding, indent, line)?;
    }
    Ok(())
}
