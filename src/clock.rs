//! # Simulation Clock
//!
//! Owns the two driving scalars of the simulator (lunar age and hour of day)
//! together with the playback state. All mutation goes through the methods
//! here; every write wraps the value into its periodic domain so direct reads
//! are always display-ready.
//!
//! ## Time Scale
//! At speed 1 one second of wall time is one simulated hour, and the lunar age
//! advances by 1/24 day for every simulated hour. 24 hours on the clock are
//! therefore exactly one day of lunar age.

use crate::geometry::{normalize_hour, normalize_lunar_age, HOURS_PER_DAY};
use crate::SkySnapshot;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Lunar age the simulator starts with (full moon).
pub const DEFAULT_LUNAR_AGE: f64 = 14.8;

/// Hour the simulator starts with (early night, full moon low in the east).
pub const DEFAULT_HOUR: f64 = 21.0;

/// Errors for user-selected clock settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpeedError {
    /// Playback speed outside the selectable set
    #[error("unsupported speed x{0} (expected 1, 2, 4 or 8)")]
    Unsupported(u32),
}

/// Errors for preset names given on the command line.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PresetError {
    #[error("unknown preset '{0}'")]
    Unknown(String),
}

/// Playback speed multiplier.
///
/// Only the four values offered by the speed buttons exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Speed {
    X1,
    #[default]
    X2,
    X4,
    X8,
}

impl Speed {
    pub const ALL: [Speed; 4] = [Speed::X1, Speed::X2, Speed::X4, Speed::X8];

    /// Simulated hours per second of wall time.
    pub fn multiplier(self) -> f64 {
        match self {
            Speed::X1 => 1.0,
            Speed::X2 => 2.0,
            Speed::X4 => 4.0,
            Speed::X8 => 8.0,
        }
    }
}

impl TryFrom<u32> for Speed {
    type Error = SpeedError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Speed::X1),
            2 => Ok(Speed::X2),
            4 => Ok(Speed::X4),
            8 => Ok(Speed::X8),
            other => Err(SpeedError::Unsupported(other)),
        }
    }
}

impl From<Speed> for u32 {
    fn from(speed: Speed) -> Self {
        speed.multiplier() as u32
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", u32::from(*self))
    }
}

/// Named starting points, each a fixed `(lunar_age, hour)` pair chosen so the
/// moon is in a typical viewing position for its phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    NewMoon,
    Crescent,
    FirstQuarter,
    FullMoon,
    LastQuarter,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::NewMoon,
        Preset::Crescent,
        Preset::FirstQuarter,
        Preset::FullMoon,
        Preset::LastQuarter,
    ];

    pub fn lunar_age(self) -> f64 {
        match self {
            Preset::NewMoon => 0.0,
            Preset::Crescent => 3.0,
            Preset::FirstQuarter => 7.4,
            Preset::FullMoon => 14.8,
            Preset::LastQuarter => 22.1,
        }
    }

    pub fn hour(self) -> f64 {
        match self {
            Preset::NewMoon => 12.0,
            Preset::Crescent => 19.0,
            Preset::FirstQuarter => 18.0,
            Preset::FullMoon => 0.0,
            Preset::LastQuarter => 6.0,
        }
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Preset::NewMoon => "新月",
            Preset::Crescent => "三日月",
            Preset::FirstQuarter => "上弦の月",
            Preset::FullMoon => "満月",
            Preset::LastQuarter => "下弦の月",
        }
    }

    /// Command line name.
    pub fn key(self) -> &'static str {
        match self {
            Preset::NewMoon => "new",
            Preset::Crescent => "crescent",
            Preset::FirstQuarter => "first-quarter",
            Preset::FullMoon => "full",
            Preset::LastQuarter => "last-quarter",
        }
    }
}

impl FromStr for Preset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Preset::ALL
            .iter()
            .copied()
            .find(|preset| preset.key().eq_ignore_ascii_case(wanted) || preset.label() == wanted)
            .ok_or_else(|| PresetError::Unknown(wanted.to_string()))
    }
}

/// The simulator state: two wrapped scalars plus playback settings.
///
/// # Example
/// ```
/// use moon_sky_lib::clock::{SimulationClock, Speed};
///
/// let mut clock = SimulationClock::new();
/// clock.set_speed(Speed::X4);
/// clock.play();
/// clock.tick(0.5); // two simulated hours
/// assert_eq!(clock.hour(), 23.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationClock {
    lunar_age: f64,
    hour: f64,
    speed: Speed,
    playing: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        SimulationClock {
            lunar_age: DEFAULT_LUNAR_AGE,
            hour: DEFAULT_HOUR,
            speed: Speed::default(),
            playing: false,
        }
    }
}

impl SimulationClock {
    /// Paused clock at the default full-moon evening.
    pub fn new() -> Self {
        Self::default()
    }

    /// Paused clock at an arbitrary starting point.
    pub fn with_state(lunar_age: f64, hour: f64, speed: Speed) -> Self {
        let mut clock = SimulationClock {
            speed,
            ..Self::default()
        };
        clock.set_lunar_age(lunar_age);
        clock.set_hour(hour);
        clock
    }

    pub fn lunar_age(&self) -> f64 {
        self.lunar_age
    }

    pub fn hour(&self) -> f64 {
        self.hour
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Overwrite the lunar age; any real is accepted and wrapped.
    pub fn set_lunar_age(&mut self, value: f64) {
        self.lunar_age = normalize_lunar_age(value);
    }

    /// Overwrite the hour; any real is accepted and wrapped.
    pub fn set_hour(&mut self, value: f64) {
        self.hour = normalize_hour(value);
    }

    /// Takes effect from the next tick.
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop ticking. The scalars keep their fractional progress.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip play/pause and return the new state.
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Jump to a preset. Playback stops so the preset view stays on screen.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.pause();
        self.set_lunar_age(preset.lunar_age());
        self.set_hour(preset.hour());
    }

    /// Move both scalars forward by `delta_seconds` of wall time.
    ///
    /// Hour and lunar age stay locked together: 24 simulated hours add exactly
    /// one day of lunar age. Works whether or not playback is running.
    pub fn advance(&mut self, delta_seconds: f64, speed_multiplier: f64) {
        let simulated_hours = delta_seconds * speed_multiplier;
        if simulated_hours == 0.0 {
            return;
        }
        self.set_hour(self.hour + simulated_hours);
        self.set_lunar_age(self.lunar_age + simulated_hours / HOURS_PER_DAY);
    }

    /// One animation frame: advance at the current speed while playing.
    pub fn tick(&mut self, delta_seconds: f64) {
        if self.playing {
            self.advance(delta_seconds, self.speed.multiplier());
        }
    }

    /// Derived view values for the current state.
    pub fn snapshot(&self) -> SkySnapshot {
        SkySnapshot::compute(self.lunar_age, self.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SYNODIC_PERIOD;
    use float_eq::assert_float_eq;

    #[test]
    fn test_default_clock() {
        let clock = SimulationClock::new();
        assert_eq!(clock.lunar_age(), 14.8);
        assert_eq!(clock.hour(), 21.0);
        assert_eq!(clock.speed(), Speed::X2);
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_setters_wrap_instead_of_clamping() {
        let mut clock = SimulationClock::new();

        clock.set_lunar_age(SYNODIC_PERIOD + 2.0);
        assert_float_eq!(clock.lunar_age(), 2.0, abs <= 1e-9);

        clock.set_lunar_age(-1.0);
        assert_float_eq!(clock.lunar_age(), SYNODIC_PERIOD - 1.0, abs <= 1e-9);

        clock.set_hour(25.5);
        assert_eq!(clock.hour(), 1.5);

        clock.set_hour(-3.0);
        assert_eq!(clock.hour(), 21.0);
    }

    #[test]
    fn test_advance_zero_is_a_no_op() {
        let mut clock = SimulationClock::with_state(3.3, 7.7, Speed::X1);
        let before = clock.clone();
        for speed in Speed::ALL {
            clock.advance(0.0, speed.multiplier());
        }
        assert_eq!(clock, before);
    }

    #[test]
    fn test_advance_keeps_hour_and_age_in_lockstep() {
        let mut clock = SimulationClock::with_state(10.0, 0.0, Speed::X1);

        // 12 seconds at x2 = 24 simulated hours = 1 lunar day
        for _ in 0..120 {
            clock.advance(0.1, 2.0);
        }
        assert_float_eq!(clock.lunar_age(), 11.0, abs <= 1e-9);
        let hour_drift = clock.hour().min(24.0 - clock.hour());
        assert!(hour_drift < 1e-9, "hour should be back at midnight, got {}", clock.hour());
    }

    #[test]
    fn test_advance_wraps_both_scalars() {
        let mut clock = SimulationClock::with_state(29.5, 23.5, Speed::X1);
        clock.advance(1.0, 1.0);
        assert_float_eq!(clock.hour(), 0.5, abs <= 1e-9);
        assert_float_eq!(clock.lunar_age(), 29.5 + 1.0 / 24.0 - SYNODIC_PERIOD, abs <= 1e-9);
    }

    #[test]
    fn test_tick_only_moves_while_playing() {
        let mut clock = SimulationClock::with_state(5.0, 12.0, Speed::X4);
        clock.tick(0.1);
        assert_eq!(clock.hour(), 12.0);

        clock.play();
        clock.tick(0.1);
        assert_float_eq!(clock.hour(), 12.4, abs <= 1e-9);

        clock.pause();
        let paused_hour = clock.hour();
        clock.tick(0.1);
        assert_eq!(clock.hour(), paused_hour);
    }

    #[test]
    fn test_speed_change_applies_to_next_tick() {
        let mut clock = SimulationClock::with_state(0.0, 0.0, Speed::X1);
        clock.play();
        clock.tick(0.1);
        assert_float_eq!(clock.hour(), 0.1, abs <= 1e-12);

        clock.set_speed(Speed::X8);
        clock.tick(0.1);
        assert_float_eq!(clock.hour(), 0.9, abs <= 1e-12);
    }

    #[test]
    fn test_toggle_play() {
        let mut clock = SimulationClock::new();
        assert!(clock.toggle_play());
        assert!(clock.is_playing());
        assert!(!clock.toggle_play());
        assert!(!clock.is_playing());
    }

    #[test]
    fn test_apply_preset_pauses_and_sets_state() {
        let mut clock = SimulationClock::new();
        clock.play();
        clock.apply_preset(Preset::FirstQuarter);

        assert!(!clock.is_playing());
        assert_eq!(clock.lunar_age(), 7.4);
        assert_eq!(clock.hour(), 18.0);
        assert_eq!(clock.snapshot().phase.label(), "上弦の月");
    }

    #[test]
    fn test_presets_show_their_own_phase() {
        for preset in Preset::ALL {
            let mut clock = SimulationClock::new();
            clock.apply_preset(preset);
            assert_eq!(clock.snapshot().phase.label(), preset.label(), "{preset:?}");
        }
    }

    #[test]
    fn test_speed_conversions() {
        assert_eq!(Speed::try_from(4), Ok(Speed::X4));
        assert_eq!(Speed::try_from(3), Err(SpeedError::Unsupported(3)));
        assert_eq!(u32::from(Speed::X8), 8);
        assert_eq!(Speed::X1.to_string(), "x1");
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("full".parse::<Preset>(), Ok(Preset::FullMoon));
        assert_eq!("First-Quarter".parse::<Preset>(), Ok(Preset::FirstQuarter));
        assert_eq!("三日月".parse::<Preset>(), Ok(Preset::Crescent));
        assert_eq!(
            "gibbous".parse::<Preset>(),
            Err(PresetError::Unknown("gibbous".to_string()))
        );
    }
}
