//! The hit object model (spec §3) and the materialized beatmap it lives in.

use crate::geometry::Position;
use crate::slider_path::SliderPath;

/// Stable index of a hit object into [`Beatmap::objects`].
///
/// String ids are acceptable per spec §9 but the implementer may substitute
/// integer indices for speed; this crate does, and gets deterministic,
/// spawn-order iteration of `BTreeSet<HitObjectId>` alive-sets for free as
/// a side benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HitObjectId(pub u32);

/// Identifies a single checkpoint, distinct from its owning slider's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckpointId {
    pub slider: HitObjectId,
    pub index: usize,
}

/// A standalone hit circle, or a slider's head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCircle {
    pub id: HitObjectId,
    pub position: Position,
    pub radius: f32,
    /// The exact moment the player is supposed to click.
    pub hit_time: f64,
    /// Earliest moment judgement starts tracking this circle.
    pub spawn_time: f64,
}

/// What kind of sub-position a slider checkpoint represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind {
    Tick,
    Repeat,
    Tail,
}

/// A sub-position along a slider, evaluated independently for tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub kind: CheckpointKind,
    pub hit_time: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub id: HitObjectId,
    pub head: HitCircle,
    pub checkpoints: Vec<Checkpoint>,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub radius: f32,
    pub spawn_time: f64,
    pub path: SliderPath,
}

impl Slider {
    /// The ball's position at `progress ∈ [0, 1]` along the path, with
    /// back-and-forth repeats folded in (progress 0..1 is span 1 forward,
    /// 1..2 is span 1 backward, etc., normalized back into the path's own
    /// `[0, 1]` parametrization).
    #[must_use]
    pub fn ball_position_at(&self, progress: f64) -> Position {
        self.path.position_at(fold_progress(progress) as f32)
    }

    /// Position of the ball at absolute time `t`, accounting for repeats.
    #[must_use]
    pub fn ball_position_at_time(&self, t: f64) -> Position {
        let span_count = self.span_count() as f64;
        let span_duration = self.duration / span_count;
        let elapsed = (t - self.start_time).clamp(0.0, self.duration);
        self.ball_position_at(elapsed / span_duration)
    }

    #[must_use]
    pub fn span_count(&self) -> usize {
        self.checkpoints
            .iter()
            .filter(|c| c.kind == CheckpointKind::Repeat)
            .count()
            + 1
    }
}

/// Folds an unbounded span-relative progress value into `[0, 1]`,
/// reversing direction on odd spans (osu!'s back-and-forth slider motion).
fn fold_progress(progress: f64) -> f64 {
    let span = progress.floor();
    let within_span = progress - span;
    if (span as i64) % 2 == 0 {
        within_span
    } else {
        1.0 - within_span
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spinner {
    pub id: HitObjectId,
    pub start_time: f64,
    pub end_time: f64,
    pub spawn_time: f64,
}

/// A single authored gameplay unit.
///
/// Re-expressed as a tagged variant per spec §9's Design Notes: every
/// phase's dispatch on object kind is one exhaustive match, so adding a
/// fourth case is a compile error everywhere that matters.
#[derive(Debug, Clone, PartialEq)]
pub enum HitObject {
    Circle(HitCircle),
    Slider(Slider),
    Spinner(Spinner),
}

impl HitObject {
    #[must_use]
    pub const fn id(&self) -> HitObjectId {
        match self {
            Self::Circle(c) => c.id,
            Self::Slider(s) => s.id,
            Self::Spinner(s) => s.id,
        }
    }

    #[must_use]
    pub const fn spawn_time(&self) -> f64 {
        match self {
            Self::Circle(c) => c.spawn_time,
            Self::Slider(s) => s.spawn_time,
            Self::Spinner(s) => s.spawn_time,
        }
    }
}

/// The fully materialized beatmap the Frame Evaluator consumes.
///
/// Immutable once built, totally ordered by `spawn_time` (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Beatmap {
    /// Indexed by [`HitObjectId`].
    objects: Vec<HitObject>,
}

impl Beatmap {
    /// Builds a beatmap from objects already sorted by spawn time.
    ///
    /// Exposed for the chart crate's builder; callers outside `chart`
    /// should not need this directly.
    #[must_use]
    pub fn from_sorted_objects(objects: Vec<HitObject>) -> Self {
        debug_assert!(
            objects
                .windows(2)
                .all(|w| w[0].spawn_time() <= w[1].spawn_time()),
            "beatmap objects must be sorted by spawn_time"
        );
        Self { objects }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: HitObjectId) -> Option<&HitObject> {
        self.objects.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitObject> {
        self.objects.iter()
    }
}
