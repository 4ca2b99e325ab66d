//! Judgement verdicts.

use serde::{Deserialize, Serialize};

/// The outcome of judging a hit circle, slider, or spinner.
///
/// Ordered `Great < Ok < Meh < Miss` so window tables and histograms can
/// index by verdict directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub enum Verdict {
    Great,
    Ok,
    Meh,
    Miss,
}

impl Verdict {
    /// Index into a 4-element `[great, ok, meh, miss]` table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Great => 0,
            Self::Ok => 1,
            Self::Meh => 2,
            Self::Miss => 3,
        }
    }
}

/// Why a hit circle was judged `Miss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// The circle's meh window plus one millisecond elapsed with no hit.
    TimeExpired,
    /// A click landed before the circle's earliest miss window.
    HitTooEarly,
    /// Note lock forced this circle to miss to let a later one be judged (lazer).
    ForceMissNoteLock,
    /// The circle is a slider head that never got a result before the slider finished.
    SliderFinishedFaster,
}

/// The result recorded for a judged hit circle (including a slider's head).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitCircleResult {
    /// A non-miss verdict: `Great`, `Ok`, or `Meh`.
    Hit(Verdict),
    Miss(MissReason),
}

impl HitCircleResult {
    #[must_use]
    pub const fn verdict(self) -> Verdict {
        match self {
            Self::Hit(v) => v,
            Self::Miss(_) => Verdict::Miss,
        }
    }

    #[must_use]
    pub const fn is_miss(self) -> bool {
        matches!(self, Self::Miss(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_ordering_matches_leniency() {
        assert!(Verdict::Great < Verdict::Ok);
        assert!(Verdict::Ok < Verdict::Meh);
        assert!(Verdict::Meh < Verdict::Miss);
    }

    #[test]
    fn hit_circle_result_verdict_maps_miss_reasons_to_miss() {
        let r = HitCircleResult::Miss(MissReason::HitTooEarly);
        assert_eq!(r.verdict(), Verdict::Miss);
        assert!(r.is_miss());
    }
}
