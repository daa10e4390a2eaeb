//! Marker-aware comparison of an actual value against an expected snapshot.
//!
//! The expected text is split on [`IGNORE_MARKER`]. Fixed text between markers acts as an
//! anchor: everything in the actual value up to the next anchor is the ignored span. An
//! ignored span must be non-empty and must stay on a single line.

use crate::errors::MarkerMisuse;
use crate::IGNORE_MARKER;

const ADJACENT_MARKERS: &str = "<snap:ignore><snap:ignore>";

/// Compare `actual` against `expected`, treating marker-covered spans as wildcards.
///
/// # Panics
/// Panics when the marker is used as a prefix, as a suffix, or directly next to another
/// marker. Those snapshots cannot be anchored and would otherwise fail in confusing ways.
#[track_caller]
pub fn matches(actual: &str, expected: &str) -> bool {
    match try_matches(actual, expected) {
        Ok(equal) => equal,
        Err(misuse) => panic!("snap: {misuse}"),
    }
}

/// Same as [`matches`], but surfaces marker misuse as an error instead of panicking.
pub fn try_matches(actual: &str, expected: &str) -> Result<bool, MarkerMisuse> {
    if expected.starts_with(IGNORE_MARKER) {
        return Err(MarkerMisuse::Prefix);
    }
    if expected.ends_with(IGNORE_MARKER) {
        return Err(MarkerMisuse::Suffix);
    }
    if expected.contains(ADJACENT_MARKERS) {
        return Err(MarkerMisuse::Adjacent);
    }

    let mut actual_rest = actual;
    let mut expected_rest = expected;

    while let Some((prefix, after_marker)) = expected_rest.split_once(IGNORE_MARKER) {
        let Some(after_prefix) = actual_rest.strip_prefix(prefix) else {
            return Ok(false);
        };

        // Never empty: suffix and adjacent markers were rejected above.
        let anchor = match after_marker.split_once(IGNORE_MARKER) {
            Some((anchor, _)) => anchor,
            None => after_marker,
        };

        let Some(found) = after_prefix.find(anchor) else {
            return Ok(false);
        };
        let ignored = &after_prefix[..found];
        if ignored.is_empty() || ignored.contains('\n') {
            return Ok(false);
        }

        actual_rest = &after_prefix[found + anchor.len()..];
        expected_rest = &after_marker[anchor.len()..];
    }

    Ok(actual_rest == expected_rest)
}
