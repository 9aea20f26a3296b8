//! Sky Hopper - headless demo runner
//!
//! Usage: `sky-hopper [seed] [frames]`
//!
//! Plays up to three autopilot runs at the fixed timestep and logs a summary
//! of each. Set `RUST_LOG=debug` for per-entity spawn/retire traces.

use std::process::ExitCode;

use glam::Vec2;
use sky_hopper::consts::{MAX_SUBSTEPS, SIM_DT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use sky_hopper::sim::{EndCause, GameEvent};
use sky_hopper::{Autopilot, HeadlessWorld, RunSession};

const MAX_RUNS: u32 = 3;
const DEFAULT_SEED: u64 = 12345;
const DEFAULT_FRAMES: u64 = 60 * 60 * 5;

/// Outcome of one run, gathered from the event stream
#[derive(Debug, Default)]
struct RunSummary {
    score: u32,
    coins: u32,
    jumps: u32,
    platforms: u32,
    cause: Option<EndCause>,
}

impl RunSummary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::CoinCollected { .. } => self.coins += 1,
            GameEvent::JumpStarted => self.jumps += 1,
            GameEvent::PlatformSpawned(_) => self.platforms += 1,
            GameEvent::ScoreChanged { score } => self.score = *score,
            GameEvent::RunEnded { cause, score } => {
                self.cause = Some(*cause);
                self.score = *score;
            }
            _ => {}
        }
    }
}

fn parse_arg<T: std::str::FromStr>(arg: Option<String>, name: &str, default: T) -> Option<T> {
    match arg {
        None => Some(default),
        Some(raw) => match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                eprintln!("invalid {name}: {raw}");
                None
            }
        },
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(seed) = parse_arg(args.next(), "seed", DEFAULT_SEED) else {
        return ExitCode::FAILURE;
    };
    let Some(frames) = parse_arg(args.next(), "frames", DEFAULT_FRAMES) else {
        return ExitCode::FAILURE;
    };

    log::info!("Sky Hopper (headless) starting: seed={seed}, frame budget={frames}");

    let mut session = RunSession::new(seed, Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT));
    let mut world = HeadlessWorld::new(&session);
    let pilot = Autopilot::new();

    let mut summary = RunSummary::default();
    let mut best = 0;
    let mut accumulator = 0.0;
    let mut frame = 0;

    while frame < frames {
        // Fixed-step loop as a renderer would drive it, fed one frame at a time
        accumulator += SIM_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let controls = pilot.controls(&session);
            world.step(&mut session, controls, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }
        frame += 1;

        for event in session.drain_events() {
            summary.record(&event);
        }

        let Some(cause) = summary.cause else {
            continue;
        };
        best = best.max(summary.score);
        println!(
            "run {}: score {} ({} coins, {} jumps, {} platforms), {:?} at x={:.0}",
            session.run_count(),
            summary.score,
            summary.coins,
            summary.jumps,
            summary.platforms,
            cause,
            session.player().pos.x
        );

        if session.run_count() >= MAX_RUNS {
            break;
        }
        if let Err(err) = session.restart() {
            log::error!("Restart failed: {err}");
            return ExitCode::FAILURE;
        }
        world.reset(&session);
        accumulator = 0.0;
        summary = RunSummary::default();
        // Restart events (RunRestarted, ScoreChanged, initial spawns) belong to the new run
        for event in session.drain_events() {
            summary.record(&event);
        }
    }

    if summary.cause.is_none() && session.is_running() {
        best = best.max(session.score());
        println!(
            "run {}: still running after {frame} frames, score {}",
            session.run_count(),
            session.score()
        );
    }
    log::info!("Best score: {best}");
    ExitCode::SUCCESS
}
