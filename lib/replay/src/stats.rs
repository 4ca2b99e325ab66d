//! Derived Statistics (spec §4.6): pure functions over a `GameState`.

use engine::Verdict;

use crate::state::{GameState, JudgedId};

/// A single judgement, for rendering e.g. a hit-error graph.
///
/// Supplements spec §4.6: not itself a derived statistic, but the history
/// a caller needs to build one incrementally instead of re-deriving it from
/// `judged_objects` on every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgementLog {
    pub id: JudgedId,
    pub verdict: Verdict,
}

/// Running combo, max combo, the four-verdict histogram, and accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub combo: u32,
    pub max_combo: u32,
    /// Indexed by [`Verdict::index`]: `[great, ok, meh, miss]`.
    pub histogram: [u32; 4],
    pub accuracy: f64,
}

impl DerivedStats {
    /// Computes the stats implied by `state`'s judgement history so far.
    #[must_use]
    pub fn compute(state: &GameState) -> Self {
        let mut combo = 0u32;
        let mut max_combo = 0u32;
        let mut histogram = [0u32; 4];

        for &judged in &state.judged_objects {
            let verdict = match judged {
                JudgedId::Circle(id) => state.hit_circle_state.get(&id).map(|s| s.result.verdict()),
                JudgedId::Slider(id) => state.slider_verdict.get(&id).copied(),
                JudgedId::Spinner(_) => None,
                // Checkpoints don't contribute to combo or the histogram.
                JudgedId::Checkpoint(_) => continue,
            };
            let Some(verdict) = verdict else { continue };

            histogram[verdict.index()] += 1;
            if verdict == Verdict::Miss {
                combo = 0;
            } else {
                combo += 1;
                max_combo = max_combo.max(combo);
            }
        }

        let accuracy = standard_accuracy(histogram);

        Self { combo, max_combo, histogram, accuracy }
    }

    /// A judgement-by-judgement log, in the order decisions were recorded.
    #[must_use]
    pub fn judgement_log(state: &GameState) -> Vec<JudgementLog> {
        state
            .judged_objects
            .iter()
            .filter_map(|&judged| {
                let verdict = match judged {
                    JudgedId::Circle(id) => state.hit_circle_state.get(&id).map(|s| s.result.verdict()),
                    JudgedId::Slider(id) => state.slider_verdict.get(&id).copied(),
                    JudgedId::Spinner(_) | JudgedId::Checkpoint(_) => None,
                };
                verdict.map(|verdict| JudgementLog { id: judged, verdict })
            })
            .collect()
    }
}

/// `(300*great + 100*ok + 50*meh) / (300 * total)`, 0 when nothing is judged yet.
fn standard_accuracy(histogram: [u32; 4]) -> f64 {
    let [great, ok, meh, miss] = histogram;
    let total = great + ok + meh + miss;
    if total == 0 {
        return 0.0;
    }
    let weighted = 300 * great + 100 * ok + 50 * meh;
    f64::from(weighted) / (300.0 * f64::from(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::HitObjectId;

    #[test]
    fn empty_state_has_zero_stats() {
        let state = GameState::new();
        let stats = DerivedStats::compute(&state);
        assert_eq!(stats.combo, 0);
        assert_eq!(stats.accuracy, 0.0);
    }

    #[test]
    fn a_miss_resets_combo_but_not_max_combo() {
        use engine::{HitCircleResult, MissReason};

        use crate::state::HitCircleState;

        let mut state = GameState::new();
        state.hit_circle_state.insert(
            HitObjectId(0),
            HitCircleState { judgement_time: 1000.0, result: HitCircleResult::Hit(Verdict::Great) },
        );
        state.hit_circle_state.insert(
            HitObjectId(1),
            HitCircleState { judgement_time: 1200.0, result: HitCircleResult::Miss(MissReason::HitTooEarly) },
        );
        state.hit_circle_state.insert(
            HitObjectId(2),
            HitCircleState { judgement_time: 1400.0, result: HitCircleResult::Hit(Verdict::Ok) },
        );
        state.judged_objects = vec![
            JudgedId::Circle(HitObjectId(0)),
            JudgedId::Circle(HitObjectId(1)),
            JudgedId::Circle(HitObjectId(2)),
        ];

        let stats = DerivedStats::compute(&state);
        assert_eq!(stats.combo, 1);
        assert_eq!(stats.max_combo, 1);
        assert_eq!(stats.histogram, [1, 1, 0, 1]);
    }

    #[test]
    fn checkpoints_do_not_affect_combo() {
        use engine::CheckpointId;

        let mut state = GameState::new();
        state.judged_objects = vec![JudgedId::Checkpoint(CheckpointId {
            slider: HitObjectId(0),
            index: 0,
        })];
        let stats = DerivedStats::compute(&state);
        assert_eq!(stats.combo, 0);
        assert_eq!(stats.histogram, [0, 0, 0, 0]);
    }
}
