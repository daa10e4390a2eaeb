//! Rendering of snapshot mismatches.
//!
//! Diffs are line-based `difference` changesets written into a `termcolor` buffer, so the
//! same code produces plain text for logs and ANSI colours for terminals.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

/// Render a `-want +got` line diff between `expected` and `actual`.
pub fn render_diff(expected: &str, actual: &str, color: bool) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut buffer = if color {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    write_diff(&mut buffer, &changeset.diffs);
    String::from_utf8_lossy(buffer.as_slice()).into_owned()
}

// Writes into an in-memory buffer cannot fail.
fn write_diff(out: &mut Buffer, diffs: &[Difference]) {
    for diff in diffs {
        let (sign, color, text) = match diff {
            Difference::Same(text) => (' ', None, text),
            Difference::Add(text) => ('+', Some(Color::Green), text),
            Difference::Rem(text) => ('-', Some(Color::Red), text),
        };
        let _ = match color {
            Some(color) => out.set_color(ColorSpec::new().set_fg(Some(color))),
            None => out.reset(),
        };
        for line in text.split('\n') {
            let _ = writeln!(out, "{sign}{line}");
        }
    }
    let _ = out.reset();
}
