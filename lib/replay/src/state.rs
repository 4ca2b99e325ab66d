//! `GameState`: the central mutable entity the Frame Evaluator advances.

use std::collections::{BTreeMap, BTreeSet};

use engine::{CheckpointId, HitCircleResult, HitObjectId, Position, Verdict};

/// Index of the left/right button slots in [`GameState::pressing_since`].
pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// Recorded outcome of a finalized hit circle (standalone, or a slider's head).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCircleState {
    /// Replay time the decision was recorded at; not necessarily `hit_time`.
    pub judgement_time: f64,
    pub result: HitCircleResult,
}

/// Recomputed every frame from cursor, buttons, head status, and the
/// previous frame's tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliderBodyState {
    pub is_tracking: bool,
}

/// Recorded once, the frame the simulation crosses a checkpoint's time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointState {
    pub hit: bool,
}

/// Stubbed per spec §9: RPM/required-rotations logic is future work, so
/// this only records that the spinner was reached and released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpinnerState {
    pub whole_spin_count: u32,
}

/// An entry in [`GameState::judged_objects`].
///
/// A slider's head and the slider's own verdict share a `HitObjectId`
/// (the head is owned by the slider, not addressed separately — see
/// `engine::hit_object`) but are still two distinct judged events, so they
/// get distinct variants here rather than colliding on one id, matching
/// spec §3's carve-out that "slider checkpoints and the slider itself are
/// distinct ids".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JudgedId {
    Circle(HitObjectId),
    Slider(HitObjectId),
    Spinner(HitObjectId),
    Checkpoint(CheckpointId),
}

/// The full, clonable simulation state at a point in replay time.
///
/// Every container here is owned (`BTreeMap`/`BTreeSet`/`Vec`, no `Rc`), so
/// `#[derive(Clone)]` already satisfies the Time Machine's deep-copy
/// requirement: there is nothing to alias.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub current_time: f64,
    pub cursor_position: Position,

    pub hit_circle_state: BTreeMap<HitObjectId, HitCircleState>,
    pub slider_body_state: BTreeMap<HitObjectId, SliderBodyState>,
    pub checkpoint_state: BTreeMap<CheckpointId, CheckpointState>,
    pub spinner_state: BTreeMap<HitObjectId, SpinnerState>,
    pub slider_verdict: BTreeMap<HitObjectId, Verdict>,

    pub alive_hit_circles: BTreeSet<HitObjectId>,
    pub alive_sliders: BTreeSet<HitObjectId>,
    pub alive_spinners: BTreeSet<HitObjectId>,

    pub next_checkpoint_index: BTreeMap<HitObjectId, usize>,
    pub latest_hit_object_index: u32,
    pub judged_objects: Vec<JudgedId>,

    /// `pressing_since[LEFT]`/`pressing_since[RIGHT]`: `None` is the
    /// `NOT_PRESSING` sentinel from spec §3.
    pub pressing_since: [Option<f64>; 2],

    /// Per-frame scratch flag: did a click already consume this frame?
    pub(crate) click_was_useful: bool,
}

impl GameState {
    /// An empty state positioned before the start of time, ready for the
    /// first call to `advance`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_time: f64::NEG_INFINITY,
            cursor_position: Position::default(),
            hit_circle_state: BTreeMap::new(),
            slider_body_state: BTreeMap::new(),
            checkpoint_state: BTreeMap::new(),
            spinner_state: BTreeMap::new(),
            slider_verdict: BTreeMap::new(),
            alive_hit_circles: BTreeSet::new(),
            alive_sliders: BTreeSet::new(),
            alive_spinners: BTreeSet::new(),
            next_checkpoint_index: BTreeMap::new(),
            latest_hit_object_index: 0,
            judged_objects: Vec::new(),
            pressing_since: [None, None],
            click_was_useful: false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
