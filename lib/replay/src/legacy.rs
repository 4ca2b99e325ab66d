//! Legacy preamble sanitization (spec §6, §8 scenario 1).
//!
//! Out of scope for the core proper — a format parser is expected to have
//! already discarded the three-frame preamble before frames reach
//! `TimeMachine`/`advance` — but the literal transformation spec §8 gives
//! is small and testable enough to keep as a standalone helper.

use crate::frame::ReplayFrame;

/// Number of legacy metadata frames at the start of a raw osu!-format
/// replay stream, before real input begins.
const LEGACY_PREAMBLE_LEN: usize = 3;

/// A raw, not-yet-sanitized frame as the on-disk legacy format encodes it:
/// `time` is a delta from the previous frame, not an absolute timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLegacyFrame {
    pub time_delta_ms: i32,
    pub x: f32,
    pub y: f32,
    pub buttons: u8,
}

/// Converts delta-encoded raw frames into absolute-time [`ReplayFrame`]s,
/// discarding the three-frame legacy preamble.
///
/// The preamble's deltas still count toward the cumulative time sum — the
/// fourth raw frame's absolute time is the running total of all four
/// deltas, not just its own.
#[must_use]
pub fn sanitize_legacy_frames(raw: &[RawLegacyFrame]) -> Vec<ReplayFrame> {
    let mut cumulative_ms: i64 = 0;
    let mut out = Vec::with_capacity(raw.len().saturating_sub(LEGACY_PREAMBLE_LEN));

    for (index, frame) in raw.iter().enumerate() {
        cumulative_ms += i64::from(frame.time_delta_ms);
        if index < LEGACY_PREAMBLE_LEN {
            continue;
        }
        out.push(ReplayFrame::new(cumulative_ms as i32, frame.x, frame.y, frame.buttons));
    }

    out
}
