//! Errors the Beatmap Builder can raise.

use engine::{HitObjectId, SliderPathError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeatmapError {
    #[error("hit object {0:?}'s slider path could not be built: {1}")]
    PathUnsamplable(HitObjectId, SliderPathError),

    #[error("hit objects are not sorted by time at index {0}")]
    NonMonotonicTimes(usize),

    #[error("checkpoint {checkpoint_index} of slider {slider:?} falls outside its span")]
    CheckpointOutsideSliderSpan {
        slider: HitObjectId,
        checkpoint_index: usize,
    },
}
