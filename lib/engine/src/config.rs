//! Frame Evaluator configuration (spec §6).

use serde::{Deserialize, Serialize};

use crate::hit_window::HitWindowStyle;

/// Note lock policy used in phase 5 of `advance` (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteLockStyle {
    /// Never locks: any alive circle can be judged out of order.
    None,
    /// Locked iff an earlier-supposed circle is still unjudged.
    Stable,
    /// Locked iff the next-in-time circle is still unjudged; the blocker
    /// is force-missed instead of the later click being swallowed.
    Lazer,
}

/// Runtime configuration the Frame Evaluator reads every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgementConfig {
    pub hit_window_style: HitWindowStyle,
    pub note_lock_style: NoteLockStyle,
}

impl JudgementConfig {
    #[must_use]
    pub const fn stable() -> Self {
        Self {
            hit_window_style: HitWindowStyle::Stable,
            note_lock_style: NoteLockStyle::Stable,
        }
    }

    #[must_use]
    pub const fn lazer() -> Self {
        Self {
            hit_window_style: HitWindowStyle::Lazer,
            note_lock_style: NoteLockStyle::Lazer,
        }
    }
}

impl Default for JudgementConfig {
    fn default() -> Self {
        Self::stable()
    }
}
