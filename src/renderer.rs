//! # Moon Sky Visualization Rendering
//!
//! This module draws a [`SkySnapshot`] to an ASCII terminal view and to any
//! `embedded-graphics` RGB draw target. It only places and colours what the
//! geometry model already computed; no astronomy happens here.
//!
//! ## Views
//! - **Orbital view**: Earth, the moon's orbit and the observer seen from above
//!   the north pole, sunlight arriving from the right
//! - **Sky view**: the southern sky from the ground, east on the left and west
//!   on the right, with the moon and sun on a single arc through the zenith

use crate::config::DisplayConfig;
use crate::geometry::{format_hour, is_waxing, terminator_ratio};
use crate::SkySnapshot;
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::Text,
};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

const NIGHT: [u8; 3] = [12, 18, 60];
const TWILIGHT: [u8; 3] = [60, 70, 120];
const DAY: [u8; 3] = [110, 170, 230];

/// Day factor where the sky turns from twilight interpolation to day.
const TWILIGHT_KNEE: f64 = 0.35;

const MOON_LIT: Rgb888 = Rgb888::new(255, 232, 124);
const MOON_DARK: Rgb888 = Rgb888::new(42, 42, 42);
const SUN: Rgb888 = Rgb888::new(255, 200, 40);
const SPACE: Rgb888 = Rgb888::new(8, 10, 24);
const EARTH_DAY: Rgb888 = Rgb888::new(40, 110, 200);
const EARTH_NIGHT: Rgb888 = Rgb888::new(14, 30, 70);
const OBSERVER: Rgb888 = Rgb888::new(230, 60, 60);
const GROUND: Rgb888 = Rgb888::new(61, 43, 31);
const GRASS: Rgb888 = Rgb888::new(42, 90, 26);
const GUIDE: Rgb888 = Rgb888::new(90, 90, 110);

/// Fixed star field as fractions of the sky area.
const STARS: [(f64, f64); 16] = [
    (0.13, 0.14),
    (0.25, 0.28),
    (0.37, 0.10),
    (0.52, 0.19),
    (0.67, 0.09),
    (0.78, 0.24),
    (0.88, 0.14),
    (0.17, 0.52),
    (0.33, 0.41),
    (0.58, 0.48),
    (0.75, 0.38),
    (0.90, 0.55),
    (0.10, 0.69),
    (0.47, 0.62),
    (0.70, 0.69),
    (0.42, 0.31),
];

/// Interpolate two RGB stops; `t` is clamped to `[0, 1]`.
fn lerp_color(a: [u8; 3], b: [u8; 3], t: f64) -> Rgb888 {
    let t = t.clamp(0.0, 1.0);
    let channel = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * t).round() as u8;
    Rgb888::new(channel(0), channel(1), channel(2))
}

/// Sky background for a given day factor: night → twilight → day.
pub fn sky_color(day_factor: f64) -> Rgb888 {
    if day_factor < TWILIGHT_KNEE {
        lerp_color(NIGHT, TWILIGHT, day_factor / TWILIGHT_KNEE)
    } else {
        lerp_color(TWILIGHT, DAY, (day_factor - TWILIGHT_KNEE) / (1.0 - TWILIGHT_KNEE))
    }
}

/// Star brightness: full at night, gone once the day factor passes 0.4.
pub fn star_opacity(day_factor: f64) -> f64 {
    (1.0 - day_factor * 2.5).max(0.0)
}

/// Whether a point of the moon's disc is sunlit as seen from Earth.
///
/// `u` and `v` are disc coordinates in `[-1, 1]`, `u` to the right and `v` up.
/// Waxing moons are lit from the right, waning moons from the left.
pub fn is_lit(orbit_angle: f64, u: f64, v: f64) -> bool {
    let half_width = (1.0 - v * v).max(0.0).sqrt();
    let edge = terminator_ratio(orbit_angle) * half_width;
    if is_waxing(orbit_angle) {
        u > edge
    } else {
        -u > edge
    }
}

/// Position on a half-circle arc for a sky bearing.
///
/// +π/2 maps to the left end (east), 0 to the top, -π/2 to the right end (west).
fn arc_point(sky_position: f64, center_x: f64, ground_y: f64, radius_x: f64, radius_y: f64) -> (f64, f64) {
    let arc_angle = FRAC_PI_2 - sky_position;
    (
        center_x - radius_x * arc_angle.cos(),
        ground_y - radius_y * arc_angle.sin(),
    )
}

// -- ASCII output --

/// Narrowest ASCII view; both the sky grid and the orbit strip use it.
const MIN_ASCII_COLUMNS: usize = 11;

/// Above this bearing from the meridian the moon is drawn as a small `o`.
const LOW_MOON_BEARING: f64 = PI / 3.0;

/// Character layout of the ASCII sky view.
struct AsciiLayout {
    columns: usize,
    ground_row: usize,
    center_x: f64,
    radius_x: f64,
    radius_y: f64,
}

impl AsciiLayout {
    fn new(display: &DisplayConfig) -> Self {
        let columns = display.ascii_columns.max(MIN_ASCII_COLUMNS);
        let rows = display.ascii_rows.max(4);
        let center_x = (columns - 1) as f64 / 2.0;
        AsciiLayout {
            columns,
            ground_row: rows - 1,
            center_x,
            radius_x: center_x - 1.0,
            radius_y: (rows - 2) as f64,
        }
    }

    /// Grid cell for a body above the horizon. Rounding never lands it on
    /// the ground row.
    fn cell(&self, sky_position: f64) -> (usize, usize) {
        let (x, y) = arc_point(
            sky_position,
            self.center_x,
            self.ground_row as f64,
            self.radius_x,
            self.radius_y,
        );
        let row = (y.round().max(0.0) as usize).min(self.ground_row - 1);
        let column = (x.round().max(0.0) as usize).min(self.columns - 1);
        (row, column)
    }
}

/// Sky view as text rows: dotted arc, stars at night, `*` for the sun, `O`
/// for the moon (`o` when low), then the ground line and the E / S / W labels.
pub fn render_sky_grid(snapshot: &SkySnapshot, display: &DisplayConfig) -> Vec<String> {
    let layout = AsciiLayout::new(display);
    let mut grid = vec![vec![' '; layout.columns]; layout.ground_row + 1];

    if star_opacity(snapshot.day_factor) > 0.3 {
        for &(fx, fy) in STARS.iter() {
            let row = (fy * layout.ground_row as f64) as usize;
            let column = (fx * (layout.columns - 1) as f64).round() as usize;
            grid[row][column] = '+';
        }
    }

    let steps = layout.columns * 2;
    for step in 1..steps {
        let sky_position = FRAC_PI_2 - PI * step as f64 / steps as f64;
        let (row, column) = layout.cell(sky_position);
        grid[row][column] = '.';
    }

    if snapshot.sun_visible {
        let (row, column) = layout.cell(snapshot.sun_sky_position);
        grid[row][column] = '*';
    }
    if snapshot.moon_visible {
        let (row, column) = layout.cell(snapshot.sky_position);
        grid[row][column] = if snapshot.sky_position.abs() > LOW_MOON_BEARING {
            'o'
        } else {
            'O'
        };
    }

    for cell in grid[layout.ground_row].iter_mut() {
        *cell = '=';
    }

    let mut rows: Vec<String> = grid.into_iter().map(|row| row.into_iter().collect()).collect();

    let mut labels = vec![' '; layout.columns];
    labels[(layout.center_x - layout.radius_x).round() as usize] = 'E';
    labels[layout.center_x.round() as usize] = 'S';
    labels[(layout.center_x + layout.radius_x).round() as usize] = 'W';
    rows.push(labels.into_iter().collect());

    rows
}

/// One-line orbit strip: quarter marks along the cycle and `O` at the moon.
pub fn render_orbit_strip(snapshot: &SkySnapshot, columns: usize) -> [String; 2] {
    let columns = columns.max(MIN_ASCII_COLUMNS);
    let span = (columns - 1) as f64;
    let column_for = |fraction: f64| ((fraction * span).round() as usize).min(columns - 1);

    let mut strip = vec!['-'; columns];
    let mut labels = vec![' '; columns];
    for (quarter, name) in [(0.0, "new"), (0.25, "1st"), (0.5, "full"), (0.75, "3rd")] {
        let column = column_for(quarter);
        strip[column] = '|';
        for (offset, ch) in name.chars().enumerate() {
            if let Some(slot) = labels.get_mut(column + offset) {
                *slot = ch;
            }
        }
    }
    strip[column_for(snapshot.orbit_angle / TAU)] = 'O';

    [strip.into_iter().collect(), labels.into_iter().collect()]
}

/// Full terminal view: info panel, sky view and orbit strip.
pub fn render_ascii(snapshot: &SkySnapshot, display: &DisplayConfig) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "現在の月: {} ({})",
        snapshot.phase.label(),
        snapshot.phase.english_name()
    ));
    lines.push(format!(
        "月齢: {:.1}日   時刻: {}",
        snapshot.lunar_age,
        snapshot.time_label()
    ));
    lines.push(if snapshot.moon_visible {
        "● 月が見えます".to_string()
    } else {
        "○ 月は地平線の下".to_string()
    });
    lines.push(format!(
        "東の空に昇る: {}   南中する: {}   西の空に沈む: {}",
        format_hour(snapshot.rise_hour),
        format_hour(snapshot.meridian_hour),
        format_hour(snapshot.set_hour)
    ));
    lines.push(String::new());

    lines.extend(render_sky_grid(snapshot, display));
    lines.push(String::new());
    lines.extend(render_orbit_strip(snapshot, display.ascii_columns));

    lines.join("\n")
}

/// Single status line for playback output.
pub fn render_status_line(snapshot: &SkySnapshot) -> String {
    format!(
        "{:>5}  月齢 {:>4.1}日  {}  {}",
        snapshot.time_label(),
        snapshot.lunar_age,
        snapshot.phase.label(),
        if snapshot.moon_visible { "●" } else { "○" }
    )
}

/// Render the snapshot to the terminal.
pub fn draw_ascii(snapshot: &SkySnapshot, display: &DisplayConfig) {
    println!("{}", render_ascii(snapshot, display));
}

// -- Pixel output --

/// Fill the pixels of a disc for which `include(u, v)` holds.
fn fill_disc<D, F>(
    target: &mut D,
    center: Point,
    radius: i32,
    color: Rgb888,
    include: F,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
    F: Fn(f64, f64) -> bool,
{
    let r = radius.max(1);
    let scale = r as f64;
    let pixels = (-r..=r)
        .flat_map(move |dy| (-r..=r).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx * dx + dy * dy <= r * r)
        .filter(|&(dx, dy)| include(dx as f64 / scale, -(dy as f64) / scale))
        .map(|(dx, dy)| Pixel(center + Point::new(dx, dy), color));
    target.draw_iter(pixels)
}

/// Moon disc as seen from Earth, dark side included.
fn draw_phase_disc<D>(target: &mut D, center: Point, radius: i32, orbit_angle: f64) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    fill_disc(target, center, radius, MOON_DARK, |_, _| true)?;
    fill_disc(target, center, radius, MOON_LIT, |u, v| is_lit(orbit_angle, u, v))
}

fn to_point(x: f64, y: f64) -> Point {
    Point::new(x.round() as i32, y.round() as i32)
}

/// Orbital view: the system from above the north pole, sun to the right.
pub fn draw_orbital_view<D>(snapshot: &SkySnapshot, area: Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    area.into_styled(PrimitiveStyle::with_fill(SPACE)).draw(target)?;

    let width = area.size.width as i32;
    let height = area.size.height as i32;
    let center = area.center();
    let extent = width.min(height) as f64;
    let orbit_r = extent * 0.34;
    let earth_r = (extent * 0.08).max(3.0);
    let moon_r = (extent * 0.045).max(2.0);

    let polar = |angle: f64, radius: f64| {
        to_point(
            center.x as f64 + radius * angle.cos(),
            center.y as f64 - radius * angle.sin(),
        )
    };

    // Incoming sunlight
    let right = area.top_left.x + width - 3;
    for k in 1..=5 {
        let y = area.top_left.y + height * k / 6;
        Line::new(Point::new(right, y), Point::new(right - width / 8, y))
            .into_styled(PrimitiveStyle::with_stroke(SUN, 1))
            .draw(target)?;
    }

    Circle::with_center(center, (orbit_r * 2.0).round() as u32)
        .into_styled(PrimitiveStyle::with_stroke(GUIDE, 1))
        .draw(target)?;

    // Earth, night side away from the sun
    let earth_radius = earth_r.round() as i32;
    fill_disc(target, center, earth_radius, EARTH_DAY, |_, _| true)?;
    fill_disc(target, center, earth_radius, EARTH_NIGHT, |u, _| u < 0.0)?;

    let observer = polar(snapshot.observer_angle, earth_r);
    Circle::with_center(observer, 5)
        .into_styled(PrimitiveStyle::with_fill(OBSERVER))
        .draw(target)?;

    // From above, the sunward half of the moon is always lit
    let moon = polar(snapshot.orbit_angle, orbit_r);
    let moon_radius = moon_r.round() as i32;
    fill_disc(target, moon, moon_radius, MOON_DARK, |_, _| true)?;
    fill_disc(target, moon, moon_radius, MOON_LIT, |u, _| u > 0.0)?;

    // Phase as seen from Earth, bottom-left corner
    let icon_r = (extent * 0.07).max(3.0).round() as i32;
    let icon = Point::new(
        area.top_left.x + icon_r + 6,
        area.top_left.y + height - icon_r - 6,
    );
    draw_phase_disc(target, icon, icon_r, snapshot.orbit_angle)?;

    let text_style = MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE);
    Text::new(
        snapshot.phase.english_name(),
        area.top_left + Point::new(4, 12),
        text_style,
    )
    .draw(target)?;

    Ok(())
}

/// Sky view: the southern sky from the ground, east on the left.
pub fn draw_sky_view<D>(snapshot: &SkySnapshot, area: Rectangle, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let width = area.size.width as i32;
    let height = area.size.height as i32;
    let ground_y = area.top_left.y + height * 3 / 4;
    let sky_height = (ground_y - area.top_left.y).max(1) as u32;

    let sky = sky_color(snapshot.day_factor);
    Rectangle::new(area.top_left, Size::new(area.size.width, sky_height))
        .into_styled(PrimitiveStyle::with_fill(sky))
        .draw(target)?;
    Rectangle::new(
        Point::new(area.top_left.x, ground_y),
        Size::new(area.size.width, (height - sky_height as i32).max(0) as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(GROUND))
    .draw(target)?;

    let opacity = star_opacity(snapshot.day_factor);
    if opacity > 0.0 {
        let star = lerp_color(
            [sky.r(), sky.g(), sky.b()],
            [255, 255, 255],
            opacity * 0.8,
        );
        target.draw_iter(STARS.iter().map(|&(fx, fy)| {
            Pixel(
                to_point(
                    area.top_left.x as f64 + fx * width as f64,
                    area.top_left.y as f64 + fy * sky_height as f64,
                ),
                star,
            )
        }))?;
    }

    Line::new(
        Point::new(area.top_left.x, ground_y),
        Point::new(area.top_left.x + width - 1, ground_y),
    )
    .into_styled(PrimitiveStyle::with_stroke(GRASS, 3))
    .draw(target)?;

    let center_x = area.top_left.x as f64 + width as f64 / 2.0;
    let radius = (width as f64 / 2.0 - 16.0).min(sky_height as f64 - 12.0).max(4.0);
    let on_arc = |sky_position: f64| {
        let (x, y) = arc_point(sky_position, center_x, ground_y as f64, radius, radius);
        to_point(x, y)
    };

    // Dashed path of the moon
    target.draw_iter((0..=90).filter(|step| step % 3 != 2).map(|step| {
        let sky_position = FRAC_PI_2 - PI * step as f64 / 90.0;
        Pixel(on_arc(sky_position), GUIDE)
    }))?;

    let text_style = MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE);
    for (sky_position, label) in [(FRAC_PI_2, "E"), (0.0, "S"), (-FRAC_PI_2, "W")] {
        let x = on_arc(sky_position).x;
        Text::new(label, Point::new(x - 3, ground_y + 14), text_style).draw(target)?;
    }
    Text::new(
        &snapshot.time_label(),
        area.top_left + Point::new(4, 12),
        text_style,
    )
    .draw(target)?;

    let body_r = (radius * 0.1).max(2.0).round() as i32;
    if snapshot.sun_visible {
        fill_disc(target, on_arc(snapshot.sun_sky_position), body_r, SUN, |_, _| true)?;
    }
    if snapshot.moon_visible {
        draw_phase_disc(target, on_arc(snapshot.sky_position), body_r, snapshot.orbit_angle)?;
    }

    Ok(())
}

/// Draw both views side by side: orbital view on the left, sky view on the right.
pub fn draw_views<D>(snapshot: &SkySnapshot, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let bounds = target.bounding_box();
    let half = bounds.size.width / 2;
    let left = Rectangle::new(bounds.top_left, Size::new(half, bounds.size.height));
    let right = Rectangle::new(
        bounds.top_left + Point::new(half as i32, 0),
        Size::new(bounds.size.width - half, bounds.size.height),
    );

    draw_orbital_view(snapshot, left, target)?;
    draw_sky_view(snapshot, right, target)
}

/// In-memory RGB target for the pixel views, exportable as a binary PPM.
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![Rgb888::BLACK; (width as usize) * (height as usize)],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.width && y < self.height {
            self.pixels.get((y * self.width + x) as usize).copied()
        } else {
            None
        }
    }

    /// Binary PPM (P6) image of the buffer.
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut bytes = Vec::with_capacity(header.len() + self.pixels.len() * 3);
        bytes.extend_from_slice(header.as_bytes());
        for pixel in &self.pixels {
            bytes.extend_from_slice(&[pixel.r(), pixel.g(), pixel.b()]);
        }
        bytes
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.width && y < self.height {
                self.pixels[(y * self.width + x) as usize] = color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::moon_orbit_angle;

    fn display() -> DisplayConfig {
        DisplayConfig::default()
    }

    fn grid_contains(rows: &[String], ch: char) -> bool {
        // Last two rows are the ground and the direction labels
        rows[..rows.len() - 2].iter().any(|row| row.contains(ch))
    }

    #[test]
    fn test_sky_color_stops() {
        assert_eq!(sky_color(0.0), Rgb888::new(12, 18, 60));
        assert_eq!(sky_color(TWILIGHT_KNEE), Rgb888::new(60, 70, 120));
        assert_eq!(sky_color(1.0), Rgb888::new(110, 170, 230));
        // Out of range factors are clamped
        assert_eq!(sky_color(-0.5), sky_color(0.0));
    }

    #[test]
    fn test_star_opacity() {
        assert_eq!(star_opacity(0.0), 1.0);
        assert_eq!(star_opacity(0.4), 0.0);
        assert_eq!(star_opacity(1.0), 0.0);
    }

    #[test]
    fn test_is_lit_follows_phase() {
        // New moon: nothing lit
        assert!(!is_lit(0.0, 0.9, 0.0));
        assert!(!is_lit(0.0, -0.9, 0.0));
        // First quarter: right half
        let first_quarter = FRAC_PI_2;
        assert!(is_lit(first_quarter, 0.5, 0.0));
        assert!(!is_lit(first_quarter, -0.5, 0.0));
        // Full moon: everything
        assert!(is_lit(PI, -0.9, 0.0));
        assert!(is_lit(PI, 0.9, 0.0));
        // Last quarter: left half
        let last_quarter = moon_orbit_angle(22.1);
        assert!(is_lit(last_quarter, -0.5, 0.1));
        assert!(!is_lit(last_quarter, 0.5, 0.1));
    }

    #[test]
    fn test_sky_grid_shows_visible_moon() {
        let snapshot = SkySnapshot::compute(14.8, 0.0);
        let rows = render_sky_grid(&snapshot, &display());

        assert_eq!(rows.len(), display().ascii_rows + 1);
        assert!(grid_contains(&rows, 'O'));
        assert!(!grid_contains(&rows, '*'), "no sun at midnight");
        assert!(rows[rows.len() - 2].chars().all(|c| c == '='));
        let labels = rows.last().unwrap();
        assert!(labels.find('E') < labels.find('S'));
        assert!(labels.find('S') < labels.find('W'));
    }

    #[test]
    fn test_full_moon_culminates_at_the_top() {
        let snapshot = SkySnapshot::compute(14.8, 0.0);
        let rows = render_sky_grid(&snapshot, &display());
        let moon_row = rows.iter().position(|row| row.contains('O')).unwrap();
        assert_eq!(moon_row, 1);
        let moon_column = rows[moon_row].find('O').unwrap();
        assert_eq!(moon_column, display().ascii_columns / 2);
    }

    #[test]
    fn test_sky_grid_hides_moon_below_horizon() {
        // Full moon at noon is on the far side of the Earth
        let snapshot = SkySnapshot::compute(14.8, 12.0);
        let rows = render_sky_grid(&snapshot, &display());
        assert!(!grid_contains(&rows, 'O'));
        assert!(!grid_contains(&rows, 'o'));
        assert!(grid_contains(&rows, '*'));
    }

    #[test]
    fn test_rising_moon_is_in_the_east() {
        // Full moon in the early evening, low in the east
        let snapshot = SkySnapshot::compute(14.8, 19.0);
        assert!(snapshot.moon_visible);
        let rows = render_sky_grid(&snapshot, &display());
        let row = rows.iter().find(|row| row.contains('o')).unwrap();
        assert!(row.find('o').unwrap() < display().ascii_columns / 2);
    }

    #[test]
    fn test_low_moon_is_drawn_small() {
        let high = SkySnapshot::compute(14.8, 23.0);
        let low = SkySnapshot::compute(14.8, 4.5);
        assert!(high.sky_position.abs() < LOW_MOON_BEARING);
        assert!(low.moon_visible && low.sky_position.abs() > LOW_MOON_BEARING);

        let high_rows = render_sky_grid(&high, &display());
        assert!(grid_contains(&high_rows, 'O'));
        assert!(!grid_contains(&high_rows, 'o'));

        let low_rows = render_sky_grid(&low, &display());
        assert!(grid_contains(&low_rows, 'o'));
        assert!(!grid_contains(&low_rows, 'O'));
    }

    #[test]
    fn test_orbit_strip_marks_moon() {
        let full = SkySnapshot::compute(14.765, 0.0);
        let [strip, labels] = render_orbit_strip(&full, 41);
        assert_eq!(strip.chars().nth(20), Some('O'));
        assert!(labels.starts_with("new"));
        assert!(labels.contains("full"));
    }

    #[test]
    fn test_render_ascii_panel() {
        let snapshot = SkySnapshot::compute(14.8, 21.0);
        let text = render_ascii(&snapshot, &display());

        assert!(text.contains("満月"));
        assert!(text.contains("21:00"));
        assert!(text.contains("14.8日"));
        assert!(text.contains("月が見えます"));
        assert!(text.contains(&format_hour(snapshot.rise_hour)));
        assert!(text.contains(&format_hour(snapshot.set_hour)));
    }

    #[test]
    fn test_render_ascii_below_horizon_message() {
        let snapshot = SkySnapshot::compute(0.0, 0.0);
        let text = render_ascii(&snapshot, &display());
        assert!(text.contains("月は地平線の下"));
    }

    #[test]
    fn test_status_line() {
        let line = render_status_line(&SkySnapshot::compute(3.0, 19.0));
        assert!(line.starts_with("19:00"));
        assert!(line.contains("3.0日"));
        assert!(line.contains("三日月"));
        assert!(line.ends_with('●'));
    }

    #[test]
    fn test_tiny_display_config_does_not_panic() {
        let tiny = DisplayConfig {
            width: 10,
            height: 10,
            ascii_columns: 1,
            ascii_rows: 1,
        };
        for hour in [0.0, 6.0, 12.0, 18.0] {
            let snapshot = SkySnapshot::compute(7.4, hour);
            render_ascii(&snapshot, &tiny);
        }
    }

    #[test]
    fn test_narrow_strip_matches_sky_grid_width() {
        let narrow = DisplayConfig {
            ascii_columns: 5,
            ..DisplayConfig::default()
        };
        let snapshot = SkySnapshot::compute(7.4, 18.0);
        let rows = render_sky_grid(&snapshot, &narrow);
        let [strip, labels] = render_orbit_strip(&snapshot, narrow.ascii_columns);

        assert_eq!(rows[0].chars().count(), MIN_ASCII_COLUMNS);
        assert_eq!(strip.chars().count(), MIN_ASCII_COLUMNS);
        assert_eq!(labels.chars().count(), MIN_ASCII_COLUMNS);
    }

    #[test]
    fn test_draw_views_fills_framebuffer() {
        let snapshot = SkySnapshot::compute(14.8, 0.0);
        let mut framebuffer = Framebuffer::new(600, 300);
        draw_views(&snapshot, &mut framebuffer).unwrap();

        // Space on the left, night sky on the right
        assert_eq!(framebuffer.pixel(2, 150), Some(SPACE));
        assert_eq!(framebuffer.pixel(598, 20), Some(sky_color(snapshot.day_factor)));
        // Ground at the bottom of the sky view
        assert_eq!(framebuffer.pixel(598, 295), Some(GROUND));

        let lit = (0..300)
            .flat_map(|y| (0..600).map(move |x| (x, y)))
            .filter(|&(x, y)| framebuffer.pixel(x, y) == Some(MOON_LIT))
            .count();
        assert!(lit > 0, "moon should be drawn");
    }

    #[test]
    fn test_daytime_sky_color() {
        let snapshot = SkySnapshot::compute(0.0, 12.0);
        let mut framebuffer = Framebuffer::new(200, 100);
        draw_views(&snapshot, &mut framebuffer).unwrap();
        assert_eq!(framebuffer.pixel(198, 30), Some(sky_color(1.0)));
    }

    #[test]
    fn test_ppm_export() {
        let framebuffer = Framebuffer::new(4, 3);
        let ppm = framebuffer.to_ppm();
        let header = b"P6\n4 3\n255\n";
        assert!(ppm.starts_with(header));
        assert_eq!(ppm.len(), header.len() + 4 * 3 * 3);
        assert_eq!(framebuffer.pixel(4, 0), None);
    }
}
