//! Overlay state machine for the interruption lifecycle.
//!
//! Owns the modal's phases once the policy triggers: shown, the 30-second
//! reflect countdown, reflection complete, and the exits (continue,
//! leave). The machine never touches a document itself; each transition
//! returns an [`OverlayEffect`] for the host to apply, which keeps the
//! logic synchronous and testable.
//!
//! Exactly one overlay may be visible per document: a trigger while the
//! overlay is already visible is a no-op, which guards against duplicate
//! overlays from near-simultaneous triggers (initial load plus an early
//! mutation batch).

use serde::{Deserialize, Serialize};

/// Length of the reflect countdown in seconds.
pub const REFLECT_SECS: u32 = 30;

/// Current phase of the overlay lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPhase {
    /// No overlay in the document.
    #[default]
    Hidden,
    /// Overlay visible, reflect button armed.
    Shown,
    /// Countdown running, reflect button disabled.
    Reflecting {
        /// Seconds remaining on the countdown.
        remaining_secs: u32,
    },
    /// Countdown finished; the user must close or continue explicitly.
    ReflectionComplete,
}

/// An instruction for the host environment to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum OverlayEffect {
    /// Insert and render the overlay node.
    Render,
    /// Start the countdown display and disable the reflect button.
    CountdownStarted {
        /// Initial countdown value.
        secs: u32,
    },
    /// Update the countdown display text.
    CountdownUpdated {
        /// Seconds remaining.
        secs: u32,
    },
    /// Re-enable the button with the "Reflection Complete" label.
    ReflectionComplete,
    /// Remove the overlay node from the document.
    Remove,
    /// Navigate the tab to the given destination.
    Navigate {
        /// Destination URL.
        url: String,
    },
}

/// The overlay state machine. One instance per document.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    phase: OverlayPhase,
}

impl Overlay {
    /// Create a new overlay in the hidden phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether any overlay node is currently in the document.
    pub fn is_visible(&self) -> bool {
        self.phase != OverlayPhase::Hidden
    }

    /// Trigger the overlay.
    ///
    /// Transitions hidden to shown and returns the render effect. A
    /// trigger in any other phase is a no-op and returns `None`.
    pub fn trigger(&mut self) -> Option<OverlayEffect> {
        if self.phase != OverlayPhase::Hidden {
            return None;
        }
        self.phase = OverlayPhase::Shown;
        Some(OverlayEffect::Render)
    }

    /// Start the reflect countdown ("Pause & Reflect").
    ///
    /// Only valid from the shown phase; `None` otherwise.
    pub fn begin_reflection(&mut self) -> Option<OverlayEffect> {
        if self.phase != OverlayPhase::Shown {
            return None;
        }
        self.phase = OverlayPhase::Reflecting {
            remaining_secs: REFLECT_SECS,
        };
        Some(OverlayEffect::CountdownStarted { secs: REFLECT_SECS })
    }

    /// Advance the countdown by one second.
    ///
    /// Decrements the remaining time and returns the display update; when
    /// the countdown reaches zero the phase becomes reflection-complete
    /// and the button re-enables. There is no automatic dismissal. Ticks
    /// outside the reflecting phase are stale timer callbacks and return
    /// `None`.
    pub fn tick(&mut self) -> Option<OverlayEffect> {
        let OverlayPhase::Reflecting { remaining_secs } = self.phase else {
            return None;
        };

        let remaining = remaining_secs.saturating_sub(1);
        if remaining == 0 {
            self.phase = OverlayPhase::ReflectionComplete;
            return Some(OverlayEffect::ReflectionComplete);
        }

        self.phase = OverlayPhase::Reflecting {
            remaining_secs: remaining,
        };
        Some(OverlayEffect::CountdownUpdated { secs: remaining })
    }

    /// Dismiss the overlay ("Continue Shopping" or the close control).
    ///
    /// Valid from any visible phase, including mid-countdown; the pending
    /// countdown is abandoned so no stale tick can touch a removed node.
    pub fn dismiss(&mut self) -> Option<OverlayEffect> {
        if self.phase == OverlayPhase::Hidden {
            return None;
        }
        self.phase = OverlayPhase::Hidden;
        Some(OverlayEffect::Remove)
    }

    /// Leave the site toward a neutral destination.
    ///
    /// Valid from any visible phase. The caller is responsible for
    /// emitting the leave-site report before the tab navigates.
    pub fn leave(&mut self, destination: &str) -> Option<OverlayEffect> {
        if self.phase == OverlayPhase::Hidden {
            return None;
        }
        self.phase = OverlayPhase::Hidden;
        Some(OverlayEffect::Navigate {
            url: destination.to_owned(),
        })
    }
}
