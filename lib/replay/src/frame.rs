//! The wire-level replay frame (spec §6).

use engine::Position;
use serde::{Deserialize, Serialize};

/// Bit 0 of [`ReplayFrame::buttons`] is the left button, bit 1 the right.
const LEFT_BUTTON: u8 = 0b01;
const RIGHT_BUTTON: u8 = 0b10;

/// One sample from a replay, as delivered by a (format-specific,
/// out-of-scope) parser.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    rkyv::Archive,
    rkyv::Serialize,
    rkyv::Deserialize,
)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct ReplayFrame {
    pub time_ms: i32,
    pub x: f32,
    pub y: f32,
    pub buttons: u8,
}

impl ReplayFrame {
    #[must_use]
    pub const fn new(time_ms: i32, x: f32, y: f32, buttons: u8) -> Self {
        Self { time_ms, x, y, buttons }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    #[must_use]
    pub const fn left_pressed(&self) -> bool {
        self.buttons & LEFT_BUTTON != 0
    }

    #[must_use]
    pub const fn right_pressed(&self) -> bool {
        self.buttons & RIGHT_BUTTON != 0
    }
}
