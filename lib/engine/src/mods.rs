//! The enumerated mod set (spec §6).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single gameplay mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameMod {
    HardRock,
    Easy,
    DoubleTime,
    HalfTime,
    Hidden,
    Flashlight,
    Nightcore,
    NoFail,
    SuddenDeath,
    Perfect,
    SpunOut,
    Relax,
    Autopilot,
}

impl GameMod {
    /// Whether the Beatmap Builder needs to act on this mod.
    ///
    /// Cosmetic mods (`Hidden`, `Flashlight`, fail-condition mods, and the
    /// input-automation mods) never reach the builder: the evaluator is
    /// unaware of them per spec §6.
    #[must_use]
    pub const fn affects_geometry_or_timing(self) -> bool {
        matches!(
            self,
            Self::HardRock | Self::Easy | Self::DoubleTime | Self::HalfTime | Self::Nightcore
        )
    }
}

/// A set of active mods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModSet(BTreeSet<GameMod>);

impl ModSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_mods(mods: impl IntoIterator<Item = GameMod>) -> Self {
        Self(mods.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, m: GameMod) -> bool {
        self.0.contains(&m)
    }

    pub fn insert(&mut self, m: GameMod) {
        self.0.insert(m);
    }

    /// Clock-rate multiplier applied by the active time-scaling mod, if any.
    ///
    /// `DoubleTime`/`Nightcore` run the map at 1.5x, `HalfTime` at 0.75x.
    /// The two time mods are mutually exclusive in practice; if both are
    /// somehow present, `DoubleTime`/`Nightcore` wins.
    #[must_use]
    pub fn clock_rate(&self) -> f64 {
        if self.contains(GameMod::DoubleTime) || self.contains(GameMod::Nightcore) {
            1.5
        } else if self.contains(GameMod::HalfTime) {
            0.75
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn has_hard_rock(&self) -> bool {
        self.contains(GameMod::HardRock)
    }
}
