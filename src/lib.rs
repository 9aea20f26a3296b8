//! Sky Hopper - endless-runner platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platform field, coins, enemies, player, run session)
//! - `tuning`: Data-driven game balance
//! - `headless`: Renderer-free physics collaborator used by the native runner and tests

pub mod headless;
pub mod sim;
pub mod tuning;

pub use headless::{Autopilot, HeadlessWorld};
pub use sim::{GameEvent, RunPhase, RunSession, TickInput};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Default viewport used by the headless runner
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 720.0;

    /// Arcade gravity applied to the player by the reference physics (pixels/s²)
    pub const GRAVITY: f32 = 800.0;
    /// Gravity while knocked out by an enemy (falls through the world quickly)
    pub const KNOCKOUT_GRAVITY: f32 = 2000.0;
}

/// Convert a frame delta in seconds to whole simulation microseconds
#[inline]
pub fn dt_to_micros(dt: f32) -> u64 {
    if dt <= 0.0 || !dt.is_finite() {
        return 0;
    }
    (f64::from(dt) * 1_000_000.0).round() as u64
}

/// Random integer range helper: `[center - spread, center + spread]` clamped to `[lo, hi]`.
///
/// Returns `None` when the clamp window is empty.
#[inline]
pub fn jitter_window(center: i32, spread: i32, lo: i32, hi: i32) -> Option<(i32, i32)> {
    let min = (center - spread).max(lo);
    let max = (center + spread).min(hi);
    (min <= max).then_some((min, max))
}
