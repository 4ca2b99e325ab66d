//! The gameplay judgement core's replay side: the Frame Evaluator, the
//! Tracking Predicate it relies on, the Time Machine that makes scrubbing a
//! long replay cheap, Derived Statistics, and storage for recorded frames.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use engine::{Beatmap, HitWindowStyle, HitWindowTable, JudgementConfig};
//! use replay::{ReplayFrame, TimeMachine};
//!
//! # fn example(beatmap: Beatmap, frames: Vec<ReplayFrame>) -> Result<(), replay::EvaluatorError> {
//! let windows = HitWindowTable::compute(8.0, HitWindowStyle::Stable);
//! let config = JudgementConfig::stable();
//! let machine = TimeMachine::build(beatmap, windows, config, frames)?;
//! let state = machine.state_at(12_345.0)?;
//! let stats = replay::DerivedStats::compute(&state);
//! println!("{} combo, {:.2}% accuracy", stats.combo, stats.accuracy * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod evaluator;
pub mod frame;
pub mod legacy;
pub mod state;
pub mod stats;
pub mod storage;
pub mod time_machine;
pub mod tracking;

pub use errors::EvaluatorError;
pub use evaluator::advance;
pub use frame::ReplayFrame;
pub use legacy::{RawLegacyFrame, sanitize_legacy_frames};
pub use state::{
    CheckpointState, GameState, HitCircleState, JudgedId, SliderBodyState, SpinnerState,
};
pub use stats::{DerivedStats, JudgementLog};
pub use storage::{compress, decompress};
pub use time_machine::TimeMachine;
pub use tracking::is_tracking;
