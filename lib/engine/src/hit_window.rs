//! Hit Window Table (spec §4.2): overall difficulty → judgement windows.

use serde::{Deserialize, Serialize};

/// Which rule dialect's formula and note-lock policy apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitWindowStyle {
    Stable,
    Lazer,
}

/// The four judgement windows in milliseconds, indexable by [`crate::Verdict::index`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitWindowTable {
    pub great_ms: f64,
    pub ok_ms: f64,
    pub meh_ms: f64,
    pub miss_ms: f64,
}

impl HitWindowTable {
    /// Looks up the window for `verdict` (`Miss` has no meaningful window
    /// and returns the miss cutoff).
    #[must_use]
    pub fn window_for(&self, verdict: crate::Verdict) -> f64 {
        match verdict {
            crate::Verdict::Great => self.great_ms,
            crate::Verdict::Ok => self.ok_ms,
            crate::Verdict::Meh => self.meh_ms,
            crate::Verdict::Miss => self.miss_ms,
        }
    }

    /// Computes the hit window table for an overall-difficulty scalar and dialect.
    ///
    /// `od` is expected in `[0, 10]`; values outside that range extrapolate
    /// along the same linear segment rather than panicking, since a
    /// malformed map is the beatmap builder's problem, not this table's.
    #[must_use]
    pub fn compute(od: f64, style: HitWindowStyle) -> Self {
        match style {
            HitWindowStyle::Stable => Self {
                great_ms: difficulty_range(od, 80.0, 50.0, 20.0),
                ok_ms: difficulty_range(od, 140.0, 100.0, 60.0),
                meh_ms: difficulty_range(od, 200.0, 150.0, 100.0),
                miss_ms: 400.0,
            },
            // Lazer widens the three hit-result windows slightly and fixes
            // the miss cutoff independently of OD. The exact constants are
            // a judgement call — see DESIGN.md.
            HitWindowStyle::Lazer => Self {
                great_ms: difficulty_range(od, 85.0, 55.0, 25.0),
                ok_ms: difficulty_range(od, 145.0, 105.0, 65.0),
                meh_ms: difficulty_range(od, 205.0, 155.0, 105.0),
                miss_ms: 400.0,
            },
        }
    }
}

/// osu!'s standard three-anchor piecewise-linear interpolation:
/// `min` at difficulty 0, `mid` at difficulty 5, `max` at difficulty 10.
fn difficulty_range(difficulty: f64, min: f64, mid: f64, max: f64) -> f64 {
    if difficulty > 5.0 {
        mid + (max - mid) * (difficulty - 5.0) / 5.0
    } else if difficulty < 5.0 {
        mid - (mid - min) * (5.0 - difficulty) / 5.0
    } else {
        mid
    }
}
