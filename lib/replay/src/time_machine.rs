//! Time Machine (spec §4.5): bucketed scrubbing over a full replay.

use engine::{Beatmap, HitWindowTable, JudgementConfig};

use crate::errors::EvaluatorError;
use crate::evaluator::advance;
use crate::frame::ReplayFrame;
use crate::state::GameState;

/// How often a full `GameState` snapshot is taken, in replay milliseconds.
const BUCKET_INTERVAL_MS: f64 = 1000.0;

/// A scrubbable index over a full replay: periodic `GameState` snapshots
/// plus the frame list needed to replay forward from the nearest one.
pub struct TimeMachine {
    beatmap: Beatmap,
    windows: HitWindowTable,
    config: JudgementConfig,
    frames: Vec<ReplayFrame>,
    /// `(frames consumed to reach this snapshot, the snapshot itself)`.
    buckets: Vec<(usize, GameState)>,
    tail_state: GameState,
    next_bucket_time: f64,
}

impl TimeMachine {
    /// Walks `frames` once, building the bucket index.
    ///
    /// # Errors
    ///
    /// Propagates any [`EvaluatorError`] the underlying `advance` calls raise.
    pub fn build(
        beatmap: Beatmap,
        windows: HitWindowTable,
        config: JudgementConfig,
        frames: Vec<ReplayFrame>,
    ) -> Result<Self, EvaluatorError> {
        let mut machine = Self {
            beatmap,
            windows,
            config,
            frames: Vec::new(),
            buckets: vec![(0, GameState::new())],
            tail_state: GameState::new(),
            next_bucket_time: BUCKET_INTERVAL_MS,
        };
        machine.rebuild_from(&frames)?;
        Ok(machine)
    }

    /// Appends newly-arrived frames and extends the bucket index, without
    /// touching any earlier snapshot — the natural incremental counterpart
    /// to [`Self::build`], for a replay that streams in live.
    ///
    /// # Errors
    ///
    /// Propagates any [`EvaluatorError`] the underlying `advance` calls raise.
    pub fn rebuild_from(&mut self, new_frames: &[ReplayFrame]) -> Result<(), EvaluatorError> {
        log::debug!(
            "time machine rebuild: advancing {} frames from t={}",
            new_frames.len(),
            self.tail_state.current_time
        );
        for &frame in new_frames {
            advance(&mut self.tail_state, &self.beatmap, &self.windows, &self.config, frame)?;
            self.frames.push(frame);
            if self.tail_state.current_time >= self.next_bucket_time {
                log::debug!(
                    "time machine: snapshot bucket at t={} ({} frames in)",
                    self.tail_state.current_time,
                    self.frames.len()
                );
                self.buckets.push((self.frames.len(), self.tail_state.clone()));
                self.next_bucket_time = self.tail_state.current_time + BUCKET_INTERVAL_MS;
            }
        }
        Ok(())
    }

    /// Reconstructs the game state at time `t` by cloning the latest
    /// snapshot at or before `t` and replaying the frames since.
    ///
    /// # Errors
    ///
    /// Propagates any [`EvaluatorError`] the underlying `advance` calls raise.
    pub fn state_at(&self, t: f64) -> Result<GameState, EvaluatorError> {
        let (frame_index, snapshot) = self
            .buckets
            .iter()
            .rev()
            .find(|(_, s)| s.current_time <= t)
            .expect("the initial bucket at current_time = -inf always matches");

        let mut state = snapshot.clone();
        for &frame in &self.frames[*frame_index..] {
            if f64::from(frame.time_ms) > t {
                break;
            }
            advance(&mut state, &self.beatmap, &self.windows, &self.config, frame)?;
        }
        Ok(state)
    }

    /// The final state after every recorded frame.
    #[must_use]
    pub fn final_state(&self) -> &GameState {
        &self.tail_state
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
