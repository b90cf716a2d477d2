//! # Moon Sky Core Library
//!
//! This library provides the geometry model, simulation clock and renderers for
//! the moon sky simulator: an educational view of lunar phases and where the
//! moon sits in the sky for a given lunar age and time of day.
//!
//! ## Design Philosophy
//!
//! ### Two Driving Scalars
//! Everything the simulator shows is derived from exactly two numbers:
//! - **Lunar age**: days since the last new moon, cyclic over 29.53 days
//! - **Hour of day**: local solar time, cyclic over 24 hours
//!
//! The [`clock::SimulationClock`] owns both. Every other value (angles,
//! visibility, phase, rise and set times) is recomputed from them on demand and
//! never stored.
//!
//! ### Data Flow
//! 1. **Input**: CLI flags, presets or a playback tick write the two scalars
//! 2. **Model**: [`geometry`] turns them into a [`SkySnapshot`]
//! 3. **Output**: [`renderer`] draws the snapshot to the terminal or a framebuffer
//!
//! ## Core Types
//!
//! - [`SkySnapshot`]: every derived value for one `(lunar_age, hour)` pair

use serde::{Deserialize, Serialize};

// Module declarations
pub mod clock;
pub mod config;
pub mod geometry;
pub mod renderer;
pub mod scheduler;

use geometry::LunarPhase;

/// Everything the views need for one moment of the simulation.
///
/// Built by [`SkySnapshot::compute`]; renderers read it and never derive
/// geometry themselves.
///
/// # Example
/// ```
/// use moon_sky_lib::SkySnapshot;
///
/// let full_moon_midnight = SkySnapshot::compute(14.8, 0.0);
/// assert!(full_moon_midnight.moon_visible);
/// assert_eq!(full_moon_midnight.phase.label(), "満月");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkySnapshot {
    /// Days since new moon, in `[0, 29.53)`
    pub lunar_age: f64,
    /// Local solar time, in `[0, 24)`
    pub hour: f64,
    /// Moon position on its orbit, radians `[0, 2π)`
    pub orbit_angle: f64,
    /// Observer meridian relative to the sun, radians `[0, 2π)`
    pub observer_angle: f64,
    /// Moon bearing from the meridian, radians `[-π, π]`, east positive
    pub sky_position: f64,
    /// Moon strictly above the horizon
    pub moon_visible: bool,
    /// Daylight brightness `[0, 1]`
    pub day_factor: f64,
    pub phase: LunarPhase,
    pub rise_hour: f64,
    pub meridian_hour: f64,
    pub set_hour: f64,
    /// Sun bearing from the meridian, radians `[-π, π]`
    pub sun_sky_position: f64,
    pub sun_visible: bool,
}

impl SkySnapshot {
    /// Derive all view values from the two driving scalars.
    ///
    /// Inputs may be out of range; they are wrapped, not clamped.
    pub fn compute(lunar_age: f64, hour: f64) -> Self {
        let lunar_age = geometry::normalize_lunar_age(lunar_age);
        let hour = geometry::normalize_hour(hour);

        let orbit_angle = geometry::moon_orbit_angle(lunar_age);
        let observer_angle = geometry::observer_angle(hour);
        let sky_position = geometry::moon_sky_position(orbit_angle, observer_angle);
        let sun_sky_position = geometry::sun_sky_position(observer_angle);

        SkySnapshot {
            lunar_age,
            hour,
            orbit_angle,
            observer_angle,
            sky_position,
            moon_visible: geometry::is_moon_visible(sky_position),
            day_factor: geometry::day_factor(observer_angle),
            phase: LunarPhase::from_age(lunar_age),
            rise_hour: geometry::rise_hour(lunar_age),
            meridian_hour: geometry::meridian_hour(lunar_age),
            set_hour: geometry::set_hour(lunar_age),
            sun_sky_position,
            sun_visible: geometry::is_sun_visible(sun_sky_position),
        }
    }

    /// Clock time formatted as `H:MM`.
    pub fn time_label(&self) -> String {
        geometry::format_hour(self.hour)
    }
}
