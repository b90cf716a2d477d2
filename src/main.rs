//! # Moon Sky Application Entry Point
//!
//! This binary crate wires the simulator together: it loads the configuration,
//! applies command line overrides to the simulation clock, optionally plays the
//! animation for a while, and renders the result to the terminal, as JSON, or
//! to a PPM image.
//!
//! ## Usage
//! ```text
//! moon-sky [--config <path>] [--preset <name>] [--age <days>] [--hour <h> | --now]
//!          [--speed <1|2|4|8>] [--play <seconds>] [--json] [--frame <file.ppm>]
//! ```

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use chrono::{Local, Timelike};
use log::info;
use moon_sky_lib::{
    clock::{Preset, SimulationClock, Speed},
    config::Config,
    renderer::{draw_ascii, draw_views, render_status_line, Framebuffer},
    scheduler::playback,
};
use std::{env, fs, ops::ControlFlow, path::PathBuf, time::Duration};

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config_path: Option<PathBuf>,
    preset: Option<Preset>,
    lunar_age: Option<f64>,
    hour: Option<f64>,
    use_local_time: bool,
    speed: Option<Speed>,
    play_duration: Option<Duration>,
    json: bool,
    frame_path: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments, program name already skipped.
    fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .with_context(|| format!("{} needs a value", name))
            };

            match arg.as_str() {
                "--config" => parsed.config_path = Some(PathBuf::from(value("--config")?)),
                "--preset" => parsed.preset = Some(value("--preset")?.parse()?),
                "--age" => parsed.lunar_age = Some(parse_number("--age", &value("--age")?)?),
                "--hour" => parsed.hour = Some(parse_number("--hour", &value("--hour")?)?),
                "--now" => parsed.use_local_time = true,
                "--speed" => {
                    let raw = value("--speed")?;
                    let speed: u32 = raw
                        .trim_start_matches('x')
                        .parse()
                        .with_context(|| format!("--speed expects a number, got '{}'", raw))?;
                    parsed.speed = Some(Speed::try_from(speed)?);
                }
                "--play" => {
                    let seconds = parse_number("--play", &value("--play")?)?;
                    if seconds <= 0.0 {
                        bail!("--play needs a positive number of seconds");
                    }
                    let duration = Duration::try_from_secs_f64(seconds)
                        .with_context(|| format!("--play {} is out of range", seconds))?;
                    parsed.play_duration = Some(duration);
                }
                "--json" => parsed.json = true,
                "--frame" => parsed.frame_path = Some(PathBuf::from(value("--frame")?)),
                other => bail!("unknown argument '{}'", other),
            }
        }

        if parsed.use_local_time && parsed.hour.is_some() {
            bail!("--now and --hour cannot be combined");
        }

        Ok(parsed)
    }

    /// Apply presets and overrides on top of the configured starting point.
    fn apply(&self, clock: &mut SimulationClock) {
        if let Some(preset) = self.preset {
            clock.apply_preset(preset);
        }
        if let Some(lunar_age) = self.lunar_age {
            clock.set_lunar_age(lunar_age);
        }
        if let Some(hour) = self.hour {
            clock.set_hour(hour);
        }
        if let Some(speed) = self.speed {
            clock.set_speed(speed);
        }
    }
}

/// Finite decimal number for a flag.
fn parse_number(name: &str, raw: &str) -> anyhow::Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("{} expects a number, got '{}'", name, raw))?;
    if !value.is_finite() {
        bail!("{} must be a finite number", name);
    }
    Ok(value)
}

/// Current local wall-clock time as a fractional hour.
fn local_hour() -> f64 {
    let now = Local::now();
    now.hour() as f64 + now.minute() as f64 / 60.0 + now.second() as f64 / 3600.0
}

/// Play the animation for `duration` of wall time, printing one status line
/// each time the simulated clock enters a new hour.
fn run_playback(clock: &mut SimulationClock, frame_interval: Duration, duration: Duration) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start playback runtime")?;

    rt.block_on(async {
        let (mut playback, handle) = playback(frame_interval);
        let stop_after = async {
            tokio::time::sleep(duration).await;
            handle.cancel();
        };

        clock.play();
        println!("{}", render_status_line(&clock.snapshot()));
        let mut shown_hour = clock.hour().floor();

        let (frames, ()) = tokio::join!(
            playback.run(clock, |clock| {
                let hour = clock.hour().floor();
                if hour != shown_hour {
                    shown_hour = hour;
                    println!("{}", render_status_line(&clock.snapshot()));
                }
                ControlFlow::Continue(())
            }),
            stop_after
        );

        clock.pause();
        info!("Played {} frames", frames);
    });

    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse(env::args().skip(1))?;

    let config = match &args.config_path {
        Some(path) => Config::try_load_from_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => Config::load(),
    };

    let mut clock = config.simulation.build_clock();
    args.apply(&mut clock);
    if args.use_local_time {
        clock.set_hour(local_hour());
    }
    info!(
        "Starting at lunar age {:.2}, hour {:.2}, speed {}",
        clock.lunar_age(),
        clock.hour(),
        clock.speed()
    );

    if let Some(duration) = args.play_duration {
        run_playback(&mut clock, config.simulation.frame_interval(), duration)?;
    }

    let snapshot = clock.snapshot();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        draw_ascii(&snapshot, &config.display);
    }

    if let Some(path) = &args.frame_path {
        let mut framebuffer = Framebuffer::new(config.display.width, config.display.height);
        draw_views(&snapshot, &mut framebuffer).unwrap_or_else(|never| match never {});
        fs::write(path, framebuffer.to_ppm())
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote frame to {}", path.display());
    }

    Ok(())
}
