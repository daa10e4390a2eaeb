//! # Marker Preservation
//!
//! When a snapshot that contains [`IGNORE_MARKER`] is updated, the new value would wipe the
//! markers out. [`merge`] carries them over line by line.
//!
//! Each old line holding a marker is reduced to an *anchor*: the text up to and including the
//! first `:` before the marker (a field name such as `  "age":`), or all text before the
//! marker when no `:` precedes it. New lines are matched against the anchors in order. A
//! matched new line keeps its anchor and its tail; only the value the old marker covered is
//! replaced by the marker again. Every other line comes from the new value unchanged.
//!
//! When the new line no longer lines up with the old one (a quoted value became a number,
//! say), the old marker line is reused with the new line's trailing comma.
//!
//! A single-line old value has no line structure to anchor against. In that case the merge
//! degrades to truncation: the new value is cut right after the anchor and the marker is
//! appended. This is a known limitation, not a semantic merge.

use crate::IGNORE_MARKER;

/// Reinstate the ignore markers of `old_value` into `new_value`.
pub fn merge(new_value: &str, old_value: &str) -> String {
    if !old_value.contains(IGNORE_MARKER) {
        return new_value.to_string();
    }
    if !old_value.contains('\n') {
        return truncate_at_anchor(new_value, old_value);
    }

    let pending: Vec<(&str, &str)> = old_value
        .split('\n')
        .filter_map(|line| anchor(line).map(|anchor| (anchor, line)))
        .collect();

    let lines: Vec<&str> = new_value.split('\n').collect();
    let mut next = 0;
    let mut merged = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let hit = pending[next..]
            .iter()
            .position(|(anchor, _)| line.starts_with(anchor));
        match hit {
            Some(offset) => {
                let (anchor, old_line) = pending[next + offset];
                let is_last = i + 1 == lines.len();
                merged.push(
                    reinstate(line, anchor, old_line, is_last)
                        .unwrap_or_else(|| reuse_old_line(line, old_line)),
                );
                next += offset + 1;
            }
            None => merged.push(line.to_string()),
        }
    }
    merged.join("\n")
}

/// Put the marker back over the value of `new_line`, keeping the new line's tail.
///
/// `None` when the fixed text around the old marker cannot be found in the new line.
fn reinstate(new_line: &str, anchor: &str, old_line: &str, is_last: bool) -> Option<String> {
    let (infix, old_tail) = old_line[anchor.len()..].split_once(IGNORE_MARKER)?;
    let value = new_line[anchor.len()..].strip_prefix(infix)?;
    let closing = match old_tail.split_once(IGNORE_MARKER) {
        Some((closing, _)) => closing,
        None => old_tail,
    };

    // The covered span must stay non-empty, so the closing text is searched from the
    // second character on.
    let first = value.chars().next()?;
    let end = if closing.is_empty() {
        // A marker closing the whole snapshot would be rejected on the next comparison.
        if is_last {
            return None;
        }
        value.len()
    } else {
        let from = first.len_utf8();
        from + value[from..].find(closing)?
    };

    Some(format!("{anchor}{infix}{IGNORE_MARKER}{}", &value[end..]))
}

fn reuse_old_line(new_line: &str, old_line: &str) -> String {
    let old_body = old_line.trim_end().strip_suffix(',').unwrap_or(old_line.trim_end());
    if new_line.trim_end().ends_with(',') {
        format!("{old_body},")
    } else {
        old_body.to_string()
    }
}

fn truncate_at_anchor(new_value: &str, old_value: &str) -> String {
    let Some(anchor) = anchor(old_value) else {
        return new_value.to_string();
    };
    match new_value.find(anchor) {
        Some(at) => format!("{}{}", &new_value[..at + anchor.len()], IGNORE_MARKER),
        None => new_value.to_string(),
    }
}

/// Fixed text that identifies the marker's field on `line`, if it has a marker.
fn anchor(line: &str) -> Option<&str> {
    let (before, _) = line.split_once(IGNORE_MARKER)?;
    let anchor = match before.find(':') {
        Some(colon) => &before[..=colon],
        None => before,
    };
    (!anchor.trim().is_empty()).then_some(anchor)
}
