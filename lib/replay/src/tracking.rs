//! Tracking Predicate (spec §4.4): is a slider currently being followed?

use engine::{Position, Slider};

/// Follow circle radius grows once tracking has already begun, so a cursor
/// that's briefly jittered off the ball doesn't immediately break contact.
const FOLLOW_RADIUS_TRACKING: f32 = 2.4;
const FOLLOW_RADIUS_NOT_TRACKING: f32 = 1.0;

/// Whether `slider` is being tracked at time `t`.
///
/// `pressing_since` should be the two-button array as it stood *before*
/// this frame's button-timing update when called from checkpoint
/// evaluation (spec §4.3 phase 7), and the current array when called from
/// slider body tracking (phase 8).
#[must_use]
pub fn is_tracking(
    was_tracking: bool,
    slider: &Slider,
    cursor: Position,
    t: f64,
    pressing_since: &[Option<f64>; 2],
    head_hit_time: Option<f64>,
) -> bool {
    if pressing_since.iter().all(Option::is_none) {
        return false;
    }

    if !(slider.start_time <= t && t < slider.end_time) {
        return false;
    }

    let span_duration = slider.duration / slider.span_count() as f64;
    let progress = (t - slider.start_time) / span_duration;
    let ball = slider.ball_position_at(progress);
    let follow_radius = slider.radius
        * if was_tracking {
            FOLLOW_RADIUS_TRACKING
        } else {
            FOLLOW_RADIUS_NOT_TRACKING
        };
    if ball.distance(cursor) > follow_radius {
        return false;
    }

    match head_hit_time {
        Some(head_time) => pressing_since
            .iter()
            .any(|&p| p.is_some_and(|p| p >= head_time)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{HitCircle, HitObjectId, PathType, SliderPath};

    fn flat_slider(start: f64, duration: f64) -> Slider {
        let path = SliderPath::build(
            &[Position::new(0.0, 0.0), Position::new(100.0, 0.0)],
            PathType::Linear,
            100.0,
        )
        .unwrap();
        Slider {
            id: HitObjectId(0),
            head: HitCircle {
                id: HitObjectId(0),
                position: Position::new(0.0, 0.0),
                radius: 30.0,
                hit_time: start,
                spawn_time: start - 1000.0,
            },
            checkpoints: vec![],
            start_time: start,
            end_time: start + duration,
            duration,
            radius: 30.0,
            spawn_time: start - 1000.0,
            path,
        }
    }

    #[test]
    fn no_buttons_held_never_tracks() {
        let slider = flat_slider(1000.0, 1000.0);
        let tracking = is_tracking(false, &slider, Position::new(0.0, 0.0), 1000.0, &[None, None], None);
        assert!(!tracking);
    }

    #[test]
    fn cursor_on_ball_with_button_held_tracks() {
        let slider = flat_slider(1000.0, 1000.0);
        let tracking = is_tracking(
            false,
            &slider,
            Position::new(0.0, 0.0),
            1000.0,
            &[Some(1000.0), None],
            None,
        );
        assert!(tracking);
    }

    #[test]
    fn press_before_head_hit_time_does_not_satisfy_fresh_press_requirement() {
        let slider = flat_slider(1000.0, 1000.0);
        let tracking = is_tracking(
            false,
            &slider,
            Position::new(0.0, 0.0),
            1000.0,
            &[Some(500.0), None],
            Some(1000.0),
        );
        assert!(!tracking);
    }
}
