//! Errors the Frame Evaluator can raise.

use engine::HitObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EvaluatorError {
    /// `frame.time < state.current_time`. The evaluator left `state` untouched.
    #[error("frame arrived out of order")]
    FrameOutOfOrder,

    /// An id lookup against the beatmap failed: state/beatmap desynchronization.
    #[error("hit object {0:?} is not present in the beatmap")]
    UnknownHitObjectId(HitObjectId),

    /// A consistency assumption the evaluator relies on didn't hold, e.g. a
    /// slider finalized with a head that was never judged.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolated(&'static str),
}
