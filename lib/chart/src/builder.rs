//! Beatmap Builder: `Blueprint` + `ModSet` → `engine::Beatmap`.

use engine::{
    Beatmap, Checkpoint, CheckpointId, CheckpointKind, GameMod, HitCircle, HitObject, HitObjectId,
    ModSet, Position, Slider, SliderPath, Spinner,
};

use crate::blueprint::{
    Blueprint, BlueprintObject, BlueprintSlider, DifficultyParameters,
};
use crate::error::BeatmapError;

/// osu!'s playfield height in osu!-pixels; used by the HardRock flip.
const PLAYFIELD_HEIGHT: f32 = 384.0;

/// `circle_radius(cs)`: the standard osu! circle-size-to-pixel-radius formula.
#[must_use]
pub fn circle_radius(circle_size: f32) -> f32 {
    54.4 - 4.48 * circle_size
}

/// `preempt_ms(ar)`: the standard osu! approach-rate-to-lead-time formula.
#[must_use]
pub fn preempt_ms(approach_rate: f32) -> f64 {
    let ar = f64::from(approach_rate);
    if ar < 5.0 {
        1200.0 + 600.0 * (5.0 - ar) / 5.0
    } else {
        1200.0 - 750.0 * (ar - 5.0) / 5.0
    }
}

/// Applies HardRock/Easy's difficulty-scalar adjustments.
///
/// `HardRock` multiplies CS by 1.3 and AR/OD by 1.4, each clamped to 10;
/// `Easy` halves all three.
/// Both mods are mutually exclusive in practice; if both are present
/// (a malformed combination upstream should already reject), HardRock wins.
#[must_use]
pub fn effective_difficulty(difficulty: DifficultyParameters, mods: &ModSet) -> DifficultyParameters {
    if mods.has_hard_rock() {
        DifficultyParameters {
            circle_size: (difficulty.circle_size * 1.3).min(10.0),
            overall_difficulty: (difficulty.overall_difficulty * 1.4).min(10.0),
            approach_rate: (difficulty.approach_rate * 1.4).min(10.0),
            ..difficulty
        }
    } else if mods.contains(GameMod::Easy) {
        DifficultyParameters {
            circle_size: difficulty.circle_size * 0.5,
            overall_difficulty: difficulty.overall_difficulty * 0.5,
            approach_rate: difficulty.approach_rate * 0.5,
            ..difficulty
        }
    } else {
        difficulty
    }
}

fn flip_vertical(position: Position) -> Position {
    Position::new(position.x, PLAYFIELD_HEIGHT - position.y)
}

/// Objects whose (flip-adjusted) reference positions are closer than this
/// are treated as authored on top of one another for stacking purposes.
const STACK_DISTANCE: f32 = 3.0;

/// Fraction of `stack_leniency * preempt` within which two objects are
/// still considered part of the same stack, osu!'s own terminology.
const STACK_LENIENCY: f64 = 0.7;

/// How far each additional stack level nudges a circle, as a fraction of
/// its radius. Real osu! scales this from the circle's on-screen hitbox;
/// this crate doesn't model stable-vs-lazer stacking parity (see
/// `DESIGN.md`), so a single constant fraction stands in for it.
const STACK_OFFSET_FACTOR: f32 = 0.1;

/// A (position, time) pair objects are stacked against; `None` for objects
/// that don't participate in stacking (spinners have no position).
fn stack_reference(obj: &BlueprintObject, flip: bool, clock_rate: f64) -> Option<(Position, f64)> {
    match obj {
        BlueprintObject::Circle(c) => {
            let position = if flip { flip_vertical(c.position) } else { c.position };
            Some((position, c.time / clock_rate))
        }
        BlueprintObject::Slider(s) => {
            let raw = *s.control_points.first()?;
            let position = if flip { flip_vertical(raw) } else { raw };
            Some((position, s.start_time / clock_rate))
        }
        BlueprintObject::Spinner(_) => None,
    }
}

/// Simplified stacking pass (spec §4.1's "authored-visual rule"): each
/// object that lands within `STACK_DISTANCE` of its immediate predecessor,
/// within `threshold_ms` of it in time, inherits and extends that
/// predecessor's stack height. Returns one height per entry of `objects`,
/// aligned by index.
///
/// This is deliberately not full osu!-stable/lazer stacking parity (which
/// re-stacks slider ends and walks clusters in both directions) — see
/// `DESIGN.md`.
fn compute_stack_heights(
    objects: &[BlueprintObject],
    flip: bool,
    clock_rate: f64,
    threshold_ms: f64,
) -> Vec<i32> {
    let refs: Vec<Option<(Position, f64)>> = objects
        .iter()
        .map(|obj| stack_reference(obj, flip, clock_rate))
        .collect();

    let mut heights = vec![0i32; objects.len()];
    for i in 1..objects.len() {
        let Some((pos_i, time_i)) = refs[i] else { continue };
        for j in (0..i).rev() {
            let Some((pos_j, time_j)) = refs[j] else { continue };
            if time_i - time_j > threshold_ms {
                break;
            }
            if pos_i.distance(pos_j) < STACK_DISTANCE {
                heights[i] = heights[j] + 1;
            }
            break;
        }
    }
    heights
}

/// The positional nudge a circle at `stack_height` receives.
fn stack_offset(radius: f32, stack_height: i32) -> Position {
    let magnitude = stack_height as f32 * radius * STACK_OFFSET_FACTOR;
    Position::new(-magnitude, -magnitude)
}

/// Builds a judgeable beatmap from a blueprint and the mods active for the play.
///
/// # Errors
///
/// Returns [`BeatmapError`] if a slider's geometry can't be sampled, if
/// objects aren't monotonically ordered in time, or a checkpoint would fall
/// outside its slider's span.
pub fn build(blueprint: &Blueprint, mods: &ModSet) -> Result<Beatmap, BeatmapError> {
    let difficulty = effective_difficulty(blueprint.difficulty, mods);
    let clock_rate = mods.clock_rate();
    let flip = mods.has_hard_rock();
    let radius = circle_radius(difficulty.circle_size);
    let preempt = preempt_ms(difficulty.approach_rate);

    let mut indexed: Vec<(usize, f64, BlueprintObject)> = blueprint
        .objects
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, obj)| (i, obj.time(), obj))
        .collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));

    let sorted_objects: Vec<BlueprintObject> = indexed.iter().map(|(_, _, obj)| obj.clone()).collect();
    let stack_heights = compute_stack_heights(&sorted_objects, flip, clock_rate, preempt * STACK_LENIENCY);

    let mut objects = Vec::with_capacity(indexed.len());
    for ((_, _, obj), &height) in indexed.into_iter().zip(&stack_heights) {
        let id = HitObjectId(objects.len() as u32);
        let offset = stack_offset(radius, height);
        let hit_object = build_object(id, obj, &difficulty, radius, preempt, flip, clock_rate, offset)?;
        objects.push(hit_object);
    }

    if let Some(bad) = objects
        .windows(2)
        .position(|w| w[0].spawn_time() > w[1].spawn_time())
    {
        log::warn!("beatmap rejected: spawn_time goes backwards at object index {}", bad + 1);
        return Err(BeatmapError::NonMonotonicTimes(bad + 1));
    }

    Ok(Beatmap::from_sorted_objects(objects))
}

#[allow(clippy::too_many_arguments)]
fn build_object(
    id: HitObjectId,
    obj: BlueprintObject,
    difficulty: &DifficultyParameters,
    radius: f32,
    preempt: f64,
    flip: bool,
    clock_rate: f64,
    stack_offset: Position,
) -> Result<HitObject, BeatmapError> {
    match obj {
        BlueprintObject::Circle(c) => {
            let hit_time = c.time / clock_rate;
            let position = if flip { flip_vertical(c.position) } else { c.position };
            Ok(HitObject::Circle(HitCircle {
                id,
                position: position + stack_offset,
                radius,
                hit_time,
                spawn_time: hit_time - preempt,
            }))
        }
        BlueprintObject::Slider(s) => {
            build_slider(id, s, difficulty, radius, preempt, flip, clock_rate, stack_offset)
        }
        BlueprintObject::Spinner(s) => {
            let start_time = s.start_time / clock_rate;
            let end_time = s.end_time / clock_rate;
            Ok(HitObject::Spinner(Spinner {
                id,
                start_time,
                end_time,
                spawn_time: start_time - preempt,
            }))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_slider(
    id: HitObjectId,
    s: BlueprintSlider,
    difficulty: &DifficultyParameters,
    radius: f32,
    preempt: f64,
    flip: bool,
    clock_rate: f64,
    stack_offset: Position,
) -> Result<HitObject, BeatmapError> {
    let control_points: Vec<Position> = s
        .control_points
        .iter()
        .map(|&p| (if flip { flip_vertical(p) } else { p }) + stack_offset)
        .collect();

    let path = SliderPath::build(&control_points, s.path_type, s.pixel_length).map_err(|e| {
        log::warn!("beatmap rejected: slider {id:?}'s path could not be sampled: {e}");
        BeatmapError::PathUnsamplable(id, e)
    })?;

    let start_time = s.start_time / clock_rate;
    let span_duration = s.span_duration_ms / clock_rate;
    let span_count = s.span_count.max(1);
    let duration = span_duration * f64::from(span_count);
    let end_time = start_time + duration;

    let head = HitCircle {
        id,
        position: control_points[0],
        radius,
        hit_time: start_time,
        spawn_time: start_time - preempt,
    };

    let checkpoints = build_checkpoints(id, span_count, span_duration, start_time, difficulty.slider_tick_rate)?;

    Ok(HitObject::Slider(Slider {
        id,
        head,
        checkpoints,
        start_time,
        end_time,
        duration,
        radius,
        spawn_time: start_time - preempt,
        path,
    }))
}

fn build_checkpoints(
    slider_id: HitObjectId,
    span_count: u32,
    span_duration: f64,
    start_time: f64,
    slider_tick_rate: f32,
) -> Result<Vec<Checkpoint>, BeatmapError> {
    let mut checkpoints = Vec::new();

    // `slider_tick_rate` here means ticks per second of travel; this crate
    // does not model timing points or BPM (see DESIGN.md), so tick spacing
    // is resolved directly in milliseconds rather than in beats.
    let tick_interval_ms = if slider_tick_rate > 0.0 {
        1000.0 / f64::from(slider_tick_rate)
    } else {
        f64::INFINITY
    };

    let mut index = 0usize;
    for span in 0..span_count {
        let span_start = start_time + f64::from(span) * span_duration;

        let mut t = tick_interval_ms;
        while t < span_duration - f64::EPSILON {
            checkpoints.push(Checkpoint {
                id: CheckpointId { slider: slider_id, index },
                kind: CheckpointKind::Tick,
                hit_time: span_start + t,
            });
            index += 1;
            t += tick_interval_ms;
        }

        let span_end = span_start + span_duration;
        if span + 1 < span_count {
            checkpoints.push(Checkpoint {
                id: CheckpointId { slider: slider_id, index },
                kind: CheckpointKind::Repeat,
                hit_time: span_end,
            });
            index += 1;
        }
    }

    let end_time = start_time + span_duration * f64::from(span_count);
    checkpoints.push(Checkpoint {
        id: CheckpointId { slider: slider_id, index },
        kind: CheckpointKind::Tail,
        hit_time: end_time,
    });

    for c in &checkpoints {
        if c.hit_time < start_time - f64::EPSILON || c.hit_time > end_time + f64::EPSILON {
            log::warn!(
                "beatmap rejected: checkpoint {} of slider {slider_id:?} falls outside its span",
                c.id.index
            );
            return Err(BeatmapError::CheckpointOutsideSliderSpan {
                slider: slider_id,
                checkpoint_index: c.id.index,
            });
        }
    }

    Ok(checkpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_radius_matches_published_endpoints() {
        assert!((circle_radius(0.0) - 54.4).abs() < 0.01);
        assert!((circle_radius(10.0) - 9.6).abs() < 0.01);
    }

    #[test]
    fn preempt_matches_published_endpoints() {
        assert!((preempt_ms(5.0) - 1200.0).abs() < 0.01);
        assert!((preempt_ms(10.0) - 450.0).abs() < 0.01);
        assert!((preempt_ms(0.0) - 1800.0).abs() < 0.01);
    }

    #[test]
    fn hard_rock_raises_and_clamps_difficulty() {
        let mods = ModSet::from_mods([GameMod::HardRock]);
        let d = effective_difficulty(
            DifficultyParameters {
                circle_size: 9.0,
                overall_difficulty: 9.0,
                approach_rate: 9.0,
                slider_multiplier: 1.0,
                slider_tick_rate: 1.0,
            },
            &mods,
        );
        assert_eq!(d.circle_size, 10.0);
        assert_eq!(d.overall_difficulty, 10.0);
    }

    #[test]
    fn build_rejects_an_empty_slider_path() {
        let blueprint = Blueprint {
            difficulty: DifficultyParameters {
                circle_size: 4.0,
                overall_difficulty: 5.0,
                approach_rate: 9.0,
                slider_multiplier: 1.0,
                slider_tick_rate: 1.0,
            },
            objects: vec![BlueprintObject::Slider(BlueprintSlider {
                control_points: vec![],
                path_type: engine::PathType::Linear,
                pixel_length: 100.0,
                start_time: 0.0,
                span_duration_ms: 500.0,
                span_count: 1,
            })],
        };
        let result = build(&blueprint, &ModSet::new());
        assert!(matches!(result, Err(BeatmapError::PathUnsamplable(_, _))));
    }

    #[test]
    fn build_sorts_objects_by_time() {
        use crate::blueprint::BlueprintCircle;

        let blueprint = Blueprint {
            difficulty: DifficultyParameters {
                circle_size: 4.0,
                overall_difficulty: 5.0,
                approach_rate: 9.0,
                slider_multiplier: 1.0,
                slider_tick_rate: 1.0,
            },
            objects: vec![
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(0.0, 0.0), time: 1000.0 }),
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(10.0, 0.0), time: 500.0 }),
            ],
        };
        let beatmap = build(&blueprint, &ModSet::new()).unwrap();
        let first = beatmap.get(HitObjectId(0)).unwrap();
        assert_eq!(first.spawn_time(), 500.0 - preempt_ms(9.0));
    }

    #[test]
    fn overlapping_circles_stack_with_a_growing_offset() {
        use crate::blueprint::BlueprintCircle;

        let difficulty = DifficultyParameters {
            circle_size: 4.0,
            overall_difficulty: 5.0,
            approach_rate: 9.0,
            slider_multiplier: 1.0,
            slider_tick_rate: 1.0,
        };
        let blueprint = Blueprint {
            difficulty,
            objects: vec![
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(100.0, 100.0), time: 0.0 }),
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(100.0, 100.0), time: 100.0 }),
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(100.0, 100.0), time: 200.0 }),
            ],
        };

        let beatmap = build(&blueprint, &ModSet::new()).unwrap();
        let radius = circle_radius(difficulty.circle_size);

        let HitObject::Circle(first) = beatmap.get(HitObjectId(0)).unwrap() else { panic!() };
        let HitObject::Circle(second) = beatmap.get(HitObjectId(1)).unwrap() else { panic!() };
        let HitObject::Circle(third) = beatmap.get(HitObjectId(2)).unwrap() else { panic!() };

        assert_eq!(first.position, Position::new(100.0, 100.0));
        assert_eq!(second.position, stack_offset(radius, 1) + Position::new(100.0, 100.0));
        assert_eq!(third.position, stack_offset(radius, 2) + Position::new(100.0, 100.0));
    }

    #[test]
    fn distant_circles_do_not_stack() {
        use crate::blueprint::BlueprintCircle;

        let blueprint = Blueprint {
            difficulty: DifficultyParameters {
                circle_size: 4.0,
                overall_difficulty: 5.0,
                approach_rate: 9.0,
                slider_multiplier: 1.0,
                slider_tick_rate: 1.0,
            },
            objects: vec![
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(0.0, 0.0), time: 0.0 }),
                BlueprintObject::Circle(BlueprintCircle { position: Position::new(200.0, 0.0), time: 100.0 }),
            ],
        };

        let beatmap = build(&blueprint, &ModSet::new()).unwrap();
        let HitObject::Circle(second) = beatmap.get(HitObjectId(1)).unwrap() else { panic!() };
        assert_eq!(second.position, Position::new(200.0, 0.0));
    }
}
