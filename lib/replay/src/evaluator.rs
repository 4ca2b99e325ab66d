//! Frame Evaluator (spec §4.3): `advance(state, beatmap, windows, config, frame)`.

use engine::{
    Beatmap, HitCircle, HitCircleResult, HitObject, HitObjectId, HitWindowTable, JudgementConfig,
    MissReason, NoteLockStyle, Verdict,
};

use crate::errors::EvaluatorError;
use crate::state::{CheckpointState, GameState, HitCircleState, JudgedId, SliderBodyState, SpinnerState};
use crate::tracking::is_tracking;
use crate::frame::ReplayFrame;

/// Epsilon subtracted from a checkpoint's `hit_time` before ceiling it, so a
/// checkpoint exactly on a frame boundary is still "crossed" by that frame.
const CHECKPOINT_EPSILON: f64 = 1e-10;

/// Looks up a hit object by id, logging before surfacing the desync error.
fn lookup(beatmap: &Beatmap, id: HitObjectId) -> Result<&HitObject, EvaluatorError> {
    beatmap.get(id).ok_or_else(|| {
        log::error!("hit object {id:?} referenced by state is missing from the beatmap");
        EvaluatorError::UnknownHitObjectId(id)
    })
}

/// Logs and wraps an internal consistency failure.
fn invariant_violated(message: &'static str) -> EvaluatorError {
    log::error!("internal invariant violated: {message}");
    EvaluatorError::InternalInvariantViolated(message)
}

/// Advances `state` one replay frame forward in place.
///
/// # Errors
///
/// Returns [`EvaluatorError::FrameOutOfOrder`] (state left unchanged) if
/// `frame` is earlier than `state.current_time`, or a desynchronization
/// error if an id the state references is missing from `beatmap`.
pub fn advance(
    state: &mut GameState,
    beatmap: &Beatmap,
    windows: &HitWindowTable,
    config: &JudgementConfig,
    frame: ReplayFrame,
) -> Result<(), EvaluatorError> {
    let frame_time = f64::from(frame.time_ms);
    if frame_time < state.current_time {
        return Err(EvaluatorError::FrameOutOfOrder);
    }

    // --- Phase 1: bind frame ---
    let previous_position = state.cursor_position;
    let previous_time = state.current_time;
    state.current_time = frame_time;
    state.cursor_position = frame.position();
    state.click_was_useful = false;
    let old_pressing_since = state.pressing_since;

    // --- Phase 2: update button timings ---
    let held = [frame.left_pressed(), frame.right_pressed()];
    for (slot, &is_held) in state.pressing_since.iter_mut().zip(held.iter()) {
        *slot = if is_held {
            Some(slot.map_or(frame_time, |since| since.min(frame_time)))
        } else {
            None
        };
    }
    let fresh_click = state.pressing_since.iter().any(|&p| p == Some(frame_time));

    // --- Phase 3: spawn ---
    while (state.latest_hit_object_index as usize) < beatmap.len() {
        let id = HitObjectId(state.latest_hit_object_index);
        let object = lookup(beatmap, id)?;
        if object.spawn_time() > state.current_time {
            break;
        }
        match object {
            HitObject::Circle(_) => {
                state.alive_hit_circles.insert(id);
            }
            HitObject::Slider(_) => {
                state.alive_sliders.insert(id);
                state.alive_hit_circles.insert(id);
                state.next_checkpoint_index.insert(id, 0);
            }
            HitObject::Spinner(_) => {
                state.alive_spinners.insert(id);
            }
        }
        state.latest_hit_object_index += 1;
    }

    // --- Phase 4: supposed-click times ---
    let mut t_supposed: Option<f64> = None;
    let mut t_next_supposed: Option<f64> = None;
    for &id in &state.alive_hit_circles {
        let hit_time = hit_circle_for(beatmap, id)
            .ok_or_else(|| {
                log::error!("alive hit circle {id:?} does not resolve to a circle or slider head");
                EvaluatorError::UnknownHitObjectId(id)
            })?
            .hit_time;
        t_supposed = Some(t_supposed.map_or(hit_time, |m| m.min(hit_time)));
        if hit_time >= state.current_time {
            t_next_supposed = Some(t_next_supposed.map_or(hit_time, |m| m.min(hit_time)));
        }
    }

    // --- Phase 5: resolve hit circles, ascending hit_time ---
    let mut ordered: Vec<HitObjectId> = state.alive_hit_circles.iter().copied().collect();
    ordered.sort_by(|&a, &b| {
        let ta = hit_circle_for(beatmap, a).map(|c| c.hit_time).unwrap_or(f64::INFINITY);
        let tb = hit_circle_for(beatmap, b).map(|c| c.hit_time).unwrap_or(f64::INFINITY);
        ta.partial_cmp(&tb).unwrap()
    });

    for id in ordered {
        if !state.alive_hit_circles.contains(&id) {
            // Force-missed as an earlier circle's blocker this same frame.
            continue;
        }
        let hc = *hit_circle_for(beatmap, id).ok_or_else(|| {
            log::error!("alive hit circle {id:?} does not resolve to a circle or slider head");
            EvaluatorError::UnknownHitObjectId(id)
        })?;

        if state.current_time >= hc.hit_time + windows.meh_ms + 1.0 {
            finalize_circle(
                state,
                id,
                HitCircleResult::Miss(MissReason::TimeExpired),
                hc.hit_time + windows.meh_ms + 1.0,
            );
            continue;
        }

        if !fresh_click || state.click_was_useful {
            continue;
        }

        if state.cursor_position.distance(hc.position) > hc.radius {
            continue;
        }

        let locked = match config.note_lock_style {
            NoteLockStyle::None => false,
            NoteLockStyle::Stable => t_supposed.is_some_and(|t| t < hc.hit_time),
            NoteLockStyle::Lazer => t_next_supposed.is_some_and(|t| t < hc.hit_time),
        };

        if locked {
            if config.note_lock_style == NoteLockStyle::Lazer {
                let blocker_hit_time = t_next_supposed.expect("lock implies a defined blocker");
                let blocker = state.alive_hit_circles.iter().copied().find(|&candidate| {
                    hit_circle_for(beatmap, candidate)
                        .is_some_and(|c| c.hit_time == blocker_hit_time)
                });
                if let Some(blocker_id) = blocker {
                    log::debug!(
                        "lazer note lock: force-missing {blocker_id:?} to let the click through to {id:?}"
                    );
                    finalize_circle(
                        state,
                        blocker_id,
                        HitCircleResult::Miss(MissReason::ForceMissNoteLock),
                        state.current_time,
                    );
                }
                // Fall through: the click still gets to judge `id`.
            } else {
                continue;
            }
        }

        let delta = state.current_time - hc.hit_time;
        if let Some(verdict) = [Verdict::Great, Verdict::Ok, Verdict::Meh]
            .into_iter()
            .find(|&v| delta.abs() <= windows.window_for(v))
        {
            finalize_circle(state, id, HitCircleResult::Hit(verdict), state.current_time);
            state.click_was_useful = true;
            continue;
        }

        if delta < 0.0 && delta.abs() <= windows.miss_ms {
            finalize_circle(
                state,
                id,
                HitCircleResult::Miss(MissReason::HitTooEarly),
                state.current_time,
            );
        }
        // Otherwise: spatially valid, temporally out of any window, not
        // early-missable. A shake; nothing to record.
    }

    // --- Phase 6: evaluate crossed checkpoints, using old_pressing_since ---
    //
    // Runs before slider finalization below: a checkpoint's hit_time can
    // coincide with its slider's end_time (a Tail), and only becomes
    // eligible once state.current_time has strictly passed it — the same
    // frame that then makes the slider eligible to finalize. Evaluating
    // checkpoints first lets that frame's tail tracking count.
    loop {
        let mut earliest: Option<(f64, HitObjectId, usize)> = None;
        for &sid in &state.alive_sliders {
            let Some(&idx) = state.next_checkpoint_index.get(&sid) else {
                continue;
            };
            let HitObject::Slider(slider) = lookup(beatmap, sid)? else {
                return Err(invariant_violated("next_checkpoint_index referenced a non-slider id"));
            };
            let Some(checkpoint) = slider.checkpoints.get(idx) else {
                continue;
            };
            if checkpoint.hit_time >= state.current_time {
                continue;
            }
            let better = match earliest {
                None => true,
                Some((t, other_sid, _)) => {
                    checkpoint.hit_time < t || (checkpoint.hit_time == t && sid < other_sid)
                }
            };
            if better {
                earliest = Some((checkpoint.hit_time, sid, idx));
            }
        }

        let Some((_, sid, idx)) = earliest else { break };
        let HitObject::Slider(slider) = lookup(beatmap, sid)? else {
            return Err(invariant_violated("checkpoint's slider vanished mid-phase"));
        };
        let checkpoint = slider.checkpoints[idx].clone();

        let time_to_check = (checkpoint.hit_time - CHECKPOINT_EPSILON).ceil();
        let denom = state.current_time - previous_time;
        let predicted = if denom.abs() > f64::EPSILON {
            let t = (time_to_check - previous_time) / denom;
            previous_position.lerp(state.cursor_position, t as f32)
        } else {
            state.cursor_position
        };

        let was_tracking = state
            .slider_body_state
            .get(&sid)
            .is_some_and(|b| b.is_tracking);
        let head_hit_time = state
            .hit_circle_state
            .get(&sid)
            .and_then(|hs| (!hs.result.is_miss()).then_some(hs.judgement_time));

        let tracking = is_tracking(
            was_tracking,
            slider,
            predicted,
            time_to_check,
            &old_pressing_since,
            head_hit_time,
        );

        state
            .checkpoint_state
            .insert(checkpoint.id, CheckpointState { hit: tracking });
        state.judged_objects.push(JudgedId::Checkpoint(checkpoint.id));

        let next_idx = idx + 1;
        if next_idx < slider.checkpoints.len() {
            state.next_checkpoint_index.insert(sid, next_idx);
        } else {
            state.next_checkpoint_index.remove(&sid);
        }
    }

    // --- Phase 7: finalize expired sliders ---
    let alive_sliders: Vec<HitObjectId> = state.alive_sliders.iter().copied().collect();
    for id in alive_sliders {
        let HitObject::Slider(slider) = lookup(beatmap, id)? else {
            return Err(invariant_violated("alive_sliders contained a non-slider id"));
        };
        if slider.end_time > state.current_time {
            continue;
        }

        if !state.hit_circle_state.contains_key(&id) {
            finalize_circle(
                state,
                id,
                HitCircleResult::Miss(MissReason::SliderFinishedFaster),
                slider.end_time,
            );
        }

        let total = slider.checkpoints.len() + 1;
        let head_hit = state
            .hit_circle_state
            .get(&id)
            .is_some_and(|hs| !hs.result.is_miss());
        let hit = usize::from(head_hit)
            + slider
                .checkpoints
                .iter()
                .filter(|c| state.checkpoint_state.get(&c.id).is_some_and(|cs| cs.hit))
                .count();

        let verdict = if hit == total {
            Verdict::Great
        } else if hit == 0 {
            Verdict::Miss
        } else if hit * 2 >= total {
            Verdict::Ok
        } else {
            Verdict::Meh
        };

        state.slider_verdict.insert(id, verdict);
        state.judged_objects.push(JudgedId::Slider(id));
        state.alive_sliders.remove(&id);
        state.next_checkpoint_index.remove(&id);
        state.slider_body_state.remove(&id);
    }

    // --- Phase 8: update slider body tracking ---
    let still_alive_sliders: Vec<HitObjectId> = state.alive_sliders.iter().copied().collect();
    for sid in still_alive_sliders {
        let HitObject::Slider(slider) = lookup(beatmap, sid)? else {
            return Err(invariant_violated("alive_sliders contained a non-slider id"));
        };
        let was_tracking = state
            .slider_body_state
            .get(&sid)
            .is_some_and(|b| b.is_tracking);
        let head_hit_time = state
            .hit_circle_state
            .get(&sid)
            .and_then(|hs| (!hs.result.is_miss()).then_some(hs.judgement_time));

        let tracking = is_tracking(
            was_tracking,
            slider,
            state.cursor_position,
            state.current_time,
            &state.pressing_since,
            head_hit_time,
        );
        state.slider_body_state.insert(sid, SliderBodyState { is_tracking: tracking });
    }

    // --- Phase 9: advance spinners ---
    let alive_spinners: Vec<HitObjectId> = state.alive_spinners.iter().copied().collect();
    for id in alive_spinners {
        let HitObject::Spinner(spinner) = lookup(beatmap, id)? else {
            return Err(invariant_violated("alive_spinners contained a non-spinner id"));
        };
        if spinner.end_time < state.current_time {
            state.alive_spinners.remove(&id);
            state.spinner_state.insert(id, SpinnerState::default());
            state.judged_objects.push(JudgedId::Spinner(id));
        }
    }

    Ok(())
}

fn finalize_circle(state: &mut GameState, id: HitObjectId, result: HitCircleResult, judgement_time: f64) {
    state
        .hit_circle_state
        .insert(id, HitCircleState { judgement_time, result });
    state.alive_hit_circles.remove(&id);
    state.judged_objects.push(JudgedId::Circle(id));
}

/// Looks up the `HitCircle` a bare circle or a slider's head presents to
/// phase 5/4, without the caller needing to match on `HitObject` itself.
fn hit_circle_for(beatmap: &Beatmap, id: HitObjectId) -> Option<&HitCircle> {
    match beatmap.get(id)? {
        HitObject::Circle(c) => Some(c),
        HitObject::Slider(s) => Some(&s.head),
        HitObject::Spinner(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{
        Beatmap, Checkpoint, CheckpointId, CheckpointKind, HitWindowStyle, JudgementConfig,
        PathType, Position, Slider, SliderPath,
    };

    fn single_circle_beatmap() -> Beatmap {
        let radius = 30.0;
        let hit_time = 1000.0;
        Beatmap::from_sorted_objects(vec![HitObject::Circle(HitCircle {
            id: HitObjectId(0),
            position: Position::new(100.0, 100.0),
            radius,
            hit_time,
            spawn_time: hit_time - 500.0,
        })])
    }

    fn stable_windows() -> HitWindowTable {
        HitWindowTable::compute(5.0, HitWindowStyle::Stable)
    }

    /// A flat slider from `(0, 0)` to `(100, 0)`, one span, with a single
    /// tick checkpoint at 70% of the span (strictly before `end_time`, so
    /// crossing it and finalizing the slider happen in separate frames).
    fn one_span_slider(start: f64, duration: f64) -> Slider {
        let path = SliderPath::build(
            &[Position::new(0.0, 0.0), Position::new(100.0, 0.0)],
            PathType::Linear,
            100.0,
        )
        .unwrap();
        let end_time = start + duration;
        Slider {
            id: HitObjectId(0),
            head: HitCircle {
                id: HitObjectId(0),
                position: Position::new(0.0, 0.0),
                radius: 30.0,
                hit_time: start,
                spawn_time: start - 500.0,
            },
            checkpoints: vec![Checkpoint {
                id: CheckpointId { slider: HitObjectId(0), index: 0 },
                kind: CheckpointKind::Tick,
                hit_time: start + duration * 0.7,
            }],
            start_time: start,
            end_time,
            duration,
            radius: 30.0,
            spawn_time: start - 500.0,
            path,
        }
    }

    #[test]
    fn a_click_inside_the_great_window_is_a_great() {
        let beatmap = single_circle_beatmap();
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(0, 100.0, 100.0, 0)).unwrap();
        advance(
            &mut state,
            &beatmap,
            &windows,
            &config,
            ReplayFrame::new(1005, 100.0, 100.0, 1),
        )
        .unwrap();

        let result = state.hit_circle_state.get(&HitObjectId(0)).unwrap();
        assert_eq!(result.judgement_time, 1005.0);
        assert_eq!(result.result, HitCircleResult::Hit(Verdict::Great));
    }

    #[test]
    fn an_early_click_is_a_miss() {
        let beatmap = single_circle_beatmap();
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(0, 100.0, 100.0, 0)).unwrap();
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(800, 100.0, 100.0, 1)).unwrap();

        let result = state.hit_circle_state.get(&HitObjectId(0)).unwrap();
        assert_eq!(result.result, HitCircleResult::Miss(MissReason::HitTooEarly));
    }

    #[test]
    fn a_spatial_miss_is_ignored_until_timeout() {
        let beatmap = single_circle_beatmap();
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(0, 200.0, 200.0, 0)).unwrap();
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1005, 200.0, 200.0, 1)).unwrap();
        assert!(!state.hit_circle_state.contains_key(&HitObjectId(0)));

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1101, 200.0, 200.0, 1)).unwrap();
        let result = state.hit_circle_state.get(&HitObjectId(0)).unwrap();
        assert_eq!(result.judgement_time, 1101.0);
        assert_eq!(result.result, HitCircleResult::Miss(MissReason::TimeExpired));
    }

    #[test]
    fn out_of_order_frames_are_rejected_and_state_is_untouched() {
        let beatmap = single_circle_beatmap();
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1000, 0.0, 0.0, 0)).unwrap();
        let before = state.clone();
        let err = advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(500, 0.0, 0.0, 0));
        assert_eq!(err, Err(EvaluatorError::FrameOutOfOrder));
        assert_eq!(state, before);
    }

    #[test]
    fn stable_lock_ignores_a_click_on_a_later_circle() {
        let radius = 30.0;
        let beatmap = Beatmap::from_sorted_objects(vec![
            HitObject::Circle(HitCircle {
                id: HitObjectId(0),
                position: Position::new(0.0, 0.0),
                radius,
                hit_time: 1000.0,
                spawn_time: 500.0,
            }),
            HitObject::Circle(HitCircle {
                id: HitObjectId(1),
                position: Position::new(100.0, 0.0),
                radius,
                hit_time: 1200.0,
                spawn_time: 700.0,
            }),
        ]);
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(0, 0.0, 0.0, 0)).unwrap();
        advance(
            &mut state,
            &beatmap,
            &windows,
            &config,
            ReplayFrame::new(1200, 100.0, 0.0, 1),
        )
        .unwrap();

        assert!(!state.hit_circle_state.contains_key(&HitObjectId(1)));
    }

    #[test]
    fn lazer_lock_force_misses_the_blocker_and_still_judges_the_click() {
        let radius = 30.0;
        let beatmap = Beatmap::from_sorted_objects(vec![
            HitObject::Circle(HitCircle {
                id: HitObjectId(0),
                position: Position::new(0.0, 0.0),
                radius,
                hit_time: 1000.0,
                spawn_time: 500.0,
            }),
            HitObject::Circle(HitCircle {
                id: HitObjectId(1),
                position: Position::new(100.0, 0.0),
                radius,
                hit_time: 1040.0,
                spawn_time: 540.0,
            }),
        ]);
        let windows = stable_windows();
        let config = JudgementConfig::lazer();
        let mut state = GameState::new();

        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(0, 0.0, 0.0, 0)).unwrap();
        advance(
            &mut state,
            &beatmap,
            &windows,
            &config,
            ReplayFrame::new(1000, 100.0, 0.0, 1),
        )
        .unwrap();

        let blocker = state.hit_circle_state.get(&HitObjectId(0)).unwrap();
        assert_eq!(blocker.result, HitCircleResult::Miss(MissReason::ForceMissNoteLock));
        let clicked = state.hit_circle_state.get(&HitObjectId(1)).unwrap();
        assert_eq!(clicked.result, HitCircleResult::Hit(Verdict::Great));
    }

    #[test]
    fn a_slider_tracked_through_its_checkpoint_is_judged_great() {
        let slider = one_span_slider(1000.0, 500.0);
        let beatmap = Beatmap::from_sorted_objects(vec![HitObject::Slider(slider)]);
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        // Head: fresh press exactly on the hit time, dead center.
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1000, 0.0, 0.0, 1)).unwrap();
        let head = state.hit_circle_state.get(&HitObjectId(0)).unwrap();
        assert_eq!(head.result, HitCircleResult::Hit(Verdict::Great));

        // Release, then re-press while following the ball.
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1200, 40.0, 0.0, 0)).unwrap();
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1300, 60.0, 0.0, 1)).unwrap();
        // This frame crosses the checkpoint at t=1350, interpolating the
        // cursor's position between the previous and current frames.
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1400, 80.0, 0.0, 1)).unwrap();
        let checkpoint_id = CheckpointId { slider: HitObjectId(0), index: 0 };
        assert!(state.checkpoint_state.get(&checkpoint_id).unwrap().hit);

        // Past end_time: the slider finalizes with both the head and the
        // checkpoint credited.
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1600, 100.0, 0.0, 0)).unwrap();
        assert_eq!(state.slider_verdict.get(&HitObjectId(0)), Some(&Verdict::Great));
    }

    #[test]
    fn a_slider_with_the_checkpoint_missed_is_judged_ok() {
        let slider = one_span_slider(1000.0, 500.0);
        let beatmap = Beatmap::from_sorted_objects(vec![HitObject::Slider(slider)]);
        let windows = stable_windows();
        let config = JudgementConfig::stable();
        let mut state = GameState::new();

        // Click the head, then let go entirely and never come back.
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1000, 0.0, 0.0, 1)).unwrap();
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1200, 0.0, 0.0, 0)).unwrap();
        // Crosses the checkpoint at t=1350 with no button held, missing it.
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1400, 0.0, 0.0, 0)).unwrap();
        advance(&mut state, &beatmap, &windows, &config, ReplayFrame::new(1600, 100.0, 0.0, 0)).unwrap();

        let checkpoint_id = CheckpointId { slider: HitObjectId(0), index: 0 };
        assert!(!state.checkpoint_state.get(&checkpoint_id).unwrap().hit);
        assert_eq!(state.slider_verdict.get(&HitObjectId(0)), Some(&Verdict::Ok));
    }
}
