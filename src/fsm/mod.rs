//! Alert/display state machine.
//!
//! ```text
//!            proximity >= 5  |  bad air  |  hold > 0
//!   ┌─────┐ ─────────────────────────────────────────▶ ┌──────────────┐
//!   │ Off │                                            │ On(remaining)│
//!   └─────┘ ◀───────────────────────────────────────── └──────────────┘
//!              none of the above (hold decayed to 0)
//! ```
//!
//! A Mealy machine evaluated once per tick.  A proximity event arms a
//! five-second hold so the alert stays up briefly after someone walks
//! away; bad air keeps the screen on by itself but never arms the hold.
//!
//! The output is a [`DisplayAction`].  Redundant draws are suppressed: an
//! `Off` tick only switches the backlight off on the transition.

pub mod frame;

use log::info;

use crate::air_quality::AirQualityLevel;
use frame::ColorScheme;

/// Proximity count at or above which someone is considered present.
pub const PROXIMITY_TRIGGER: u32 = 5;
/// Seconds (ticks) the screen stays on after the last proximity event.
pub const HOLD_TICKS: u32 = 5;

/// Discrete state, for logging and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateId {
    Off,
    On,
}

/// Observable alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertState {
    pub screen_on: bool,
    pub timeout_remaining: u32,
}

/// Inputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertInput {
    pub proximity: u32,
    pub air_quality: AirQualityLevel,
}

/// What the display should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayAction {
    /// Draw the reading.  `wake` is set when the screen was off before.
    Render { scheme: ColorScheme, wake: bool },
    /// Switch the backlight off (only on the On → Off edge).
    BacklightOff,
    /// Screen already off; no display I/O.
    Idle,
}

pub struct AlertFsm {
    remaining: u32,
    screen_on: bool,
}

impl AlertFsm {
    /// `screen_on` reflects whatever the display shows at construction
    /// (the splash frame leaves it on).
    pub fn new(screen_on: bool) -> Self {
        Self {
            remaining: 0,
            screen_on,
        }
    }

    pub fn state(&self) -> AlertState {
        AlertState {
            screen_on: self.screen_on,
            timeout_remaining: self.remaining,
        }
    }

    pub fn state_id(&self) -> StateId {
        if self.screen_on { StateId::On } else { StateId::Off }
    }

    /// Advance one tick.
    pub fn step(&mut self, input: AlertInput) -> DisplayAction {
        let held = self.remaining > 0;
        let present = input.proximity >= PROXIMITY_TRIGGER;

        self.remaining = if present {
            HOLD_TICKS
        } else {
            self.remaining.saturating_sub(1)
        };

        let on = present || held || input.air_quality == AirQualityLevel::Bad;
        let was_on = self.screen_on;
        self.screen_on = on;

        if on != was_on {
            info!(
                "Alert transition: {:?} -> {:?} (proximity={}, air={})",
                if was_on { StateId::On } else { StateId::Off },
                self.state_id(),
                input.proximity,
                input.air_quality.as_str()
            );
        }

        match (on, was_on) {
            (true, _) => DisplayAction::Render {
                scheme: ColorScheme::for_level(input.air_quality),
                wake: !was_on,
            },
            (false, true) => DisplayAction::BacklightOff,
            (false, false) => DisplayAction::Idle,
        }
    }
}
