//! Slider path sampling: control points → `ball_position_at(progress)`.
//!
//! The conversion from authored control points to a walkable path follows
//! the same family of algorithms osu!stable uses (linear segments, circular
//! arcs for 3-point "perfect" curves, De Casteljau bezier, Catmull-Rom),
//! resampled into a cumulative-arc-length table so evaluating a position is
//! a binary search plus a lerp instead of re-walking the curve every frame.

use crate::geometry::Position;

/// How a slider's control points should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Linear,
    PerfectCurve,
    Bezier,
    Catmull,
}

/// Number of points sampled per bezier/catmull segment before arc-length reduction.
const SEGMENT_SAMPLES: usize = 50;

/// A slider path resampled into an arc-length lookup table.
#[derive(Debug, Clone)]
pub struct SliderPath {
    /// Points along the path, in walking order.
    points: Vec<Position>,
    /// Cumulative distance from `points[0]` to `points[i]`.
    cumulative_length: Vec<f32>,
    /// Total path length in osu!-pixels, after clamping to `expected_length`.
    length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SliderPathError {
    #[error("slider has no control points")]
    NoControlPoints,
    #[error("slider path collapsed to zero length")]
    ZeroLength,
}

impl SliderPath {
    /// Builds a path from authored control points.
    ///
    /// `expected_length` is the osu! "pixel length" the authored slider
    /// should cover; the raw curve is clamped or extrapolated along its
    /// last segment to match it, the same way osu!stable does.
    pub fn build(
        control_points: &[Position],
        path_type: PathType,
        expected_length: f32,
    ) -> Result<Self, SliderPathError> {
        if control_points.is_empty() {
            return Err(SliderPathError::NoControlPoints);
        }

        let raw = match path_type {
            PathType::Linear => linear_points(control_points),
            PathType::PerfectCurve if control_points.len() == 3 => {
                perfect_curve_points(control_points)
            }
            PathType::PerfectCurve => bezier_points(control_points),
            PathType::Bezier => bezier_points(control_points),
            PathType::Catmull => catmull_points(control_points),
        };

        Self::from_walked_points(&raw, expected_length)
    }

    fn from_walked_points(raw: &[Position], expected_length: f32) -> Result<Self, SliderPathError> {
        let mut points = Vec::with_capacity(raw.len());
        let mut cumulative_length = Vec::with_capacity(raw.len());
        let mut total = 0.0f32;

        for (i, &p) in raw.iter().enumerate() {
            if i == 0 {
                points.push(p);
                cumulative_length.push(0.0);
                continue;
            }
            let seg = points[i - 1].distance(p);
            if seg <= f32::EPSILON {
                // Skip duplicate samples; they don't add path length.
                continue;
            }
            total += seg;
            points.push(p);
            cumulative_length.push(total);
        }

        if points.len() < 2 || total <= f32::EPSILON {
            return Err(SliderPathError::ZeroLength);
        }

        let length = if expected_length > 0.0 {
            expected_length
        } else {
            total
        };

        Ok(Self {
            points,
            cumulative_length,
            length,
        })
    }

    /// Total path length in osu!-pixels (the authored slider length).
    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// The position `progress` of the way along the path, `progress ∈ [0, 1]`.
    ///
    /// Scaled by the authored (pixel-length-clamped) `length`, not the raw
    /// sampled curve length: a slider authored shorter than its control
    /// points never reaches their tail, one authored longer than them
    /// extrapolates past the last point along the final segment's direction.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Position {
        let progress = progress.clamp(0.0, 1.0);
        let target = progress * self.length;
        let total = self.cumulative_length.last().copied().unwrap_or(0.0);

        if target >= total {
            let overshoot = target - total;
            let last = *self.points.last().unwrap();
            if overshoot <= f32::EPSILON || self.points.len() < 2 {
                return last;
            }
            let prev = self.points[self.points.len() - 2];
            let seg_len = prev.distance(last);
            if seg_len <= f32::EPSILON {
                return last;
            }
            let t = 1.0 + overshoot / seg_len;
            return prev.lerp(last, t);
        }

        match self
            .cumulative_length
            .binary_search_by(|d| d.partial_cmp(&target).unwrap())
        {
            Ok(i) => self.points[i],
            Err(0) => self.points[0],
            Err(i) if i >= self.points.len() => *self.points.last().unwrap(),
            Err(i) => {
                let lo = self.cumulative_length[i - 1];
                let hi = self.cumulative_length[i];
                let t = if hi > lo { (target - lo) / (hi - lo) } else { 0.0 };
                self.points[i - 1].lerp(self.points[i], t)
            }
        }
    }
}

fn linear_points(control_points: &[Position]) -> Vec<Position> {
    control_points.to_vec()
}

/// Circular arc through exactly 3 points (osu!'s "perfect curve").
fn perfect_curve_points(control_points: &[Position]) -> Vec<Position> {
    let [a, b, c] = [control_points[0], control_points[1], control_points[2]];

    let Some((center, radius, theta_start, theta_range)) = circle_through(a, b, c) else {
        // Degenerate (collinear) triple: fall back to a straight line.
        return vec![a, c];
    };

    let steps = SEGMENT_SAMPLES;
    (0..=steps)
        .map(|i| {
            let t = theta_start + theta_range * (i as f32 / steps as f32);
            Position::new(center.x + radius * t.cos(), center.y + radius * t.sin())
        })
        .collect()
}

fn circle_through(a: Position, b: Position, c: Position) -> Option<(Position, f32, f32, f32)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < f32::EPSILON {
        return None;
    }

    let a_sq = a.x * a.x + a.y * a.y;
    let b_sq = b.x * b.x + b.y * b.y;
    let c_sq = c.x * c.x + c.y * c.y;

    let center = Position::new(
        (a_sq * (b.y - c.y) + b_sq * (c.y - a.y) + c_sq * (a.y - b.y)) / d,
        (a_sq * (c.x - b.x) + b_sq * (a.x - c.x) + c_sq * (b.x - a.x)) / d,
    );

    let radius = center.distance(a);
    let theta_start = (a.y - center.y).atan2(a.x - center.x);
    let theta_mid = (b.y - center.y).atan2(b.x - center.x);
    let theta_end = (c.y - center.y).atan2(c.x - center.x);

    // Walk from start to end in whichever direction passes through mid.
    let mut theta_range = theta_end - theta_start;
    if theta_range < 0.0 {
        theta_range += std::f32::consts::TAU;
    }
    let mut mid_offset = theta_mid - theta_start;
    if mid_offset < 0.0 {
        mid_offset += std::f32::consts::TAU;
    }
    if mid_offset > theta_range {
        theta_range -= std::f32::consts::TAU;
    }

    Some((center, radius, theta_start, theta_range))
}

/// De Casteljau evaluation of one or more bezier segments.
///
/// Authored sliders pack multiple bezier segments into one control point
/// list by repeating a point (a "red anchor"); each repeated point starts a
/// new segment.
fn bezier_points(control_points: &[Position]) -> Vec<Position> {
    let mut out = Vec::new();
    let mut segment_start = 0;

    for i in 1..control_points.len() {
        if control_points[i] == control_points[i - 1] {
            out.extend(de_casteljau(&control_points[segment_start..i]));
            segment_start = i;
        }
    }
    out.extend(de_casteljau(&control_points[segment_start..]));
    out
}

fn de_casteljau(points: &[Position]) -> Vec<Position> {
    if points.len() < 2 {
        return points.to_vec();
    }

    (0..=SEGMENT_SAMPLES)
        .map(|i| {
            let t = i as f32 / SEGMENT_SAMPLES as f32;
            de_casteljau_at(points, t)
        })
        .collect()
}

fn de_casteljau_at(points: &[Position], t: f32) -> Position {
    let mut working = points.to_vec();
    let n = working.len();
    for level in 1..n {
        for i in 0..(n - level) {
            working[i] = working[i].lerp(working[i + 1], t);
        }
    }
    working[0]
}

fn catmull_points(control_points: &[Position]) -> Vec<Position> {
    if control_points.len() < 2 {
        return control_points.to_vec();
    }

    let mut out = Vec::new();
    for i in 0..control_points.len() - 1 {
        let p0 = if i == 0 { control_points[i] } else { control_points[i - 1] };
        let p1 = control_points[i];
        let p2 = control_points[i + 1];
        let p3 = control_points
            .get(i + 2)
            .copied()
            .unwrap_or_else(|| p2 + (p2 - p1));

        for step in 0..SEGMENT_SAMPLES {
            let t = step as f32 / SEGMENT_SAMPLES as f32;
            out.push(catmull_at(p0, p1, p2, p3, t));
        }
    }
    out.push(*control_points.last().unwrap());
    out
}

fn catmull_at(p0: Position, p1: Position, p2: Position, p3: Position, t: f32) -> Position {
    let t2 = t * t;
    let t3 = t2 * t;

    let x = 0.5
        * ((2.0 * p1.x)
            + (-p0.x + p2.x) * t
            + (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t2
            + (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t3);
    let y = 0.5
        * ((2.0 * p1.y)
            + (-p0.y + p2.y) * t
            + (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t2
            + (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t3);

    Position::new(x, y)
}
