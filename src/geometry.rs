//! # Moon Geometry Model
//!
//! Simplified circular-orbit geometry for the moon, the sun and an observer on a
//! rotating Earth. Everything here is a pure function of two scalars: the lunar
//! age (days since new moon) and the local hour of day.
//!
//! ## Conventions
//! - **Orbit angle**: 0 = new moon (moon between Earth and Sun), π = full moon.
//! - **Observer angle**: 0 at local noon (observer facing the Sun), π at midnight.
//! - **Sky position**: moon bearing relative to the local meridian.
//!   0 = due south at culmination, +π/2 = east horizon, -π/2 = west horizon.
//!
//! ## Accuracy Trade-offs
//! - ✅ **Phase timing**: phase labels follow the 29.53-day synodic month
//! - ✅ **Relative motion**: moon and sun rise in the east and set in the west
//! - ❌ **No daily lag**: the moon circles the sky in exactly 24 hours
//! - ❌ **No inclination**: rise and set are always 6 hours from transit
//!
//! The constants below are tuned for the labelling thresholds and must not be
//! "corrected" towards real ephemerides.

use core::f64::consts::{FRAC_PI_2, PI, TAU};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean synodic month in days, new moon to new moon.
pub const SYNODIC_PERIOD: f64 = 29.53;

/// Length of the simulated day in hours.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Hours between rise and meridian transit (and between transit and set).
pub const RISE_TO_MERIDIAN_HOURS: f64 = 6.0;

/// Wrap `value` into `[0, period)`.
///
/// Values already in range come back unchanged, so the phase thresholds stay
/// exact. A tiny negative remainder can round up to `period` when shifted and
/// is folded to 0 instead.
pub fn wrap(value: f64, period: f64) -> f64 {
    let remainder = value % period;
    if remainder >= 0.0 {
        return remainder;
    }
    let shifted = remainder + period;
    if shifted < period {
        shifted
    } else {
        0.0
    }
}

/// Lunar age wrapped into `[0, SYNODIC_PERIOD)`.
pub fn normalize_lunar_age(lunar_age: f64) -> f64 {
    wrap(lunar_age, SYNODIC_PERIOD)
}

/// Hour of day wrapped into `[0, 24)`.
pub fn normalize_hour(hour: f64) -> f64 {
    wrap(hour, HOURS_PER_DAY)
}

/// Moon position along its orbit in radians `[0, 2π)`.
///
/// # Example
/// ```
/// use moon_sky_lib::geometry::{moon_orbit_angle, SYNODIC_PERIOD};
///
/// assert_eq!(moon_orbit_angle(0.0), 0.0);
/// assert!((moon_orbit_angle(SYNODIC_PERIOD / 2.0) - std::f64::consts::PI).abs() < 1e-12);
/// ```
pub fn moon_orbit_angle(lunar_age: f64) -> f64 {
    normalize_lunar_age(lunar_age) / SYNODIC_PERIOD * TAU
}

/// Observer meridian relative to the Sun-Earth line in radians `[0, 2π)`.
pub fn observer_angle(hour: f64) -> f64 {
    let angle = (normalize_hour(hour) - 12.0) / HOURS_PER_DAY * TAU;
    wrap(angle, TAU)
}

/// Shortest signed angle from the observer meridian to the moon, in `[-π, π]`.
///
/// A single `%` brings the difference into `(-2π, 2π)` so one correction is
/// enough, however large the inputs are. Swapping the arguments flips the sign
/// exactly.
pub fn moon_sky_position(orbit_angle: f64, observer_angle: f64) -> f64 {
    let diff = (orbit_angle - observer_angle) % TAU;
    if diff > PI {
        diff - TAU
    } else if diff < -PI {
        diff + TAU
    } else {
        diff
    }
}

/// True while the body is strictly above the horizon.
///
/// Exactly ±π/2 is on the horizon and counts as not visible.
pub fn is_moon_visible(sky_position: f64) -> bool {
    sky_position > -FRAC_PI_2 && sky_position < FRAC_PI_2
}

/// Daylight brightness in `[0, 1]`: 1 at noon, 0 at midnight.
pub fn day_factor(observer_angle: f64) -> f64 {
    (1.0 + observer_angle.cos()) / 2.0
}

/// The sun's bearing relative to the observer meridian, in `[-π, π]`.
///
/// The sun sits at orbit angle 0 by construction.
pub fn sun_sky_position(observer_angle: f64) -> f64 {
    moon_sky_position(0.0, observer_angle)
}

/// Same horizon rule as the moon.
pub fn is_sun_visible(sun_sky_position: f64) -> bool {
    is_moon_visible(sun_sky_position)
}

/// Waxing half of the cycle: the lit limb faces west (right, seen from the north).
pub fn is_waxing(orbit_angle: f64) -> bool {
    wrap(orbit_angle, TAU) < PI
}

/// Horizontal offset of the terminator as a fraction of the disc half-width.
///
/// 1 at new moon, 0 at the quarters, -1 at full moon.
pub fn terminator_ratio(orbit_angle: f64) -> f64 {
    orbit_angle.cos()
}

/// Named phases of the moon.
///
/// The labels are the traditional Japanese names shown by the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LunarPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl LunarPhase {
    /// Classify a lunar age (any real, wrapped first).
    ///
    /// Thresholds in days:
    /// `0.75 | 5.5 | 9.2 | 12.9 | 16.6 | 20.3 | 24 | 28.78`.
    /// Ages above 28.78 are new moon again; 28.78 itself is still a crescent.
    pub fn from_age(lunar_age: f64) -> Self {
        let age = normalize_lunar_age(lunar_age);
        if age < 0.75 || age > 28.78 {
            LunarPhase::NewMoon
        } else if age < 5.5 {
            LunarPhase::WaxingCrescent
        } else if age < 9.2 {
            LunarPhase::FirstQuarter
        } else if age < 12.9 {
            LunarPhase::WaxingGibbous
        } else if age < 16.6 {
            LunarPhase::FullMoon
        } else if age < 20.3 {
            LunarPhase::WaningGibbous
        } else if age < 24.0 {
            LunarPhase::LastQuarter
        } else {
            LunarPhase::WaningCrescent
        }
    }

    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            LunarPhase::NewMoon => "新月",
            LunarPhase::WaxingCrescent => "三日月",
            LunarPhase::FirstQuarter => "上弦の月",
            LunarPhase::WaxingGibbous => "十日夜月",
            LunarPhase::FullMoon => "満月",
            LunarPhase::WaningGibbous => "居待月",
            LunarPhase::LastQuarter => "下弦の月",
            LunarPhase::WaningCrescent => "有明月",
        }
    }

    /// ASCII name for logs and fonts without CJK glyphs.
    pub fn english_name(self) -> &'static str {
        match self {
            LunarPhase::NewMoon => "new moon",
            LunarPhase::WaxingCrescent => "waxing crescent",
            LunarPhase::FirstQuarter => "first quarter",
            LunarPhase::WaxingGibbous => "waxing gibbous",
            LunarPhase::FullMoon => "full moon",
            LunarPhase::WaningGibbous => "waning gibbous",
            LunarPhase::LastQuarter => "last quarter",
            LunarPhase::WaningCrescent => "waning crescent",
        }
    }
}

impl fmt::Display for LunarPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase label for a lunar age.
pub fn phase_name(lunar_age: f64) -> &'static str {
    LunarPhase::from_age(lunar_age).label()
}

/// Hour at which the moon crosses the meridian.
///
/// New moon transits at noon together with the sun, full moon at midnight.
pub fn meridian_hour(lunar_age: f64) -> f64 {
    (moon_orbit_angle(lunar_age) / TAU * HOURS_PER_DAY + 12.0) % HOURS_PER_DAY
}

/// Moonrise, a fixed six hours before transit.
pub fn rise_hour(lunar_age: f64) -> f64 {
    (meridian_hour(lunar_age) - RISE_TO_MERIDIAN_HOURS + HOURS_PER_DAY) % HOURS_PER_DAY
}

/// Moonset, a fixed six hours after transit.
pub fn set_hour(lunar_age: f64) -> f64 {
    (meridian_hour(lunar_age) + RISE_TO_MERIDIAN_HOURS) % HOURS_PER_DAY
}

/// Format an hour of day as `H:MM`.
///
/// Minutes are rounded; a rounded 60 carries into the hour, which then wraps,
/// so `23.999` formats as `0:00`.
///
/// # Example
/// ```
/// use moon_sky_lib::geometry::format_hour;
///
/// assert_eq!(format_hour(18.5), "18:30");
/// assert_eq!(format_hour(-0.25), "23:45");
/// ```
pub fn format_hour(hour: f64) -> String {
    let total_minutes = (normalize_hour(hour) * 60.0).round() as u32;
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("{}:{:02}", hours, minutes)
}
