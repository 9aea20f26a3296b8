//! Data-driven game balance
//!
//! Every empirically tuned constant of the runner lives here. Defaults
//! reproduce the shipped game; a JSON file may override any subset.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    /// The JSON document could not be parsed
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A range has its lower end above its upper end
    #[error("invalid range for {field}: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    /// A probability outside `[0, 1]`
    #[error("probability {field} = {value} is outside [0, 1]")]
    Probability { field: &'static str, value: f32 },

    /// A value that must be strictly positive
    #[error("{field} must be > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    /// Platforms could never fit vertically in this viewport
    #[error("viewport height {height} leaves no room between y={min_y} and height - {bottom_margin}")]
    EmptyVerticalBand {
        height: f32,
        min_y: i32,
        bottom_margin: i32,
    },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Platform field ===
    /// Seed platform x
    pub start_platform_x: f32,
    /// Seed platform scale
    pub start_platform_scale: f32,
    /// Horizontal gap between consecutive platforms (inclusive)
    pub min_gap: i32,
    pub max_gap: i32,
    /// Max vertical step between consecutive platforms
    pub max_rise: i32,
    /// Platforms never go above this y
    pub min_platform_y: i32,
    /// Platforms stay at least this far above the viewport bottom
    pub platform_bottom_margin: i32,
    /// Random platform scale range `[min, max)`
    pub min_platform_scale: f32,
    pub max_platform_scale: f32,
    /// Unscaled platform texture size
    pub platform_texture: Vec2,
    /// Generate once the viewport's right edge is within this distance of the last platform
    pub lookahead: f32,
    /// World width at session start
    pub initial_world_width: f32,
    /// Grow the world once a platform lands within this distance of its right bound
    pub world_expand_threshold: f32,
    /// World growth step
    pub world_expand_step: f32,
    /// Entities further than this behind the camera are retired
    pub retire_margin: f32,

    // === Coins ===
    pub coin_probability: f32,
    /// The n-th platform of a session (1-based) that always carries coins
    pub guaranteed_coin_platform: u32,
    pub min_coins: i32,
    pub max_coins: i32,
    /// Distance between the platform surface and the coin centers
    pub coin_lift: f32,
    pub coin_size: Vec2,

    // === Enemies ===
    pub enemy_probability: f32,
    pub enemy_speed: f32,
    /// Enemy body size (after sprite scale)
    pub enemy_size: Vec2,
    /// Patrol half-range as a fraction of the platform width
    pub patrol_fraction: f32,
    /// Enemy feet sit at `platform.y - platform.height / enemy_anchor_divisor`
    pub enemy_anchor_divisor: f32,
    /// Movement below this per tick counts as stuck
    pub stuck_epsilon: f32,
    /// Consecutive stuck ticks tolerated before a forced turn
    pub stuck_frames_limit: u32,

    // === Player ===
    pub player_start: Vec2,
    pub player_size: Vec2,
    pub run_speed: f32,
    /// Upward launch velocity (negative is up)
    pub jump_velocity: f32,
    /// Run ends once the player is this far below the camera bottom
    pub fall_margin: f32,
    /// Velocity applied when an enemy knocks the player out
    pub knockout_velocity: Vec2,
    /// Delay between enemy contact and the end-of-run signal
    pub contact_end_delay_ms: u64,

    /// Platforms created up front (in addition to the seed platform)
    pub initial_platforms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_platform_x: 400.0,
            start_platform_scale: 0.8,
            min_gap: 500,
            max_gap: 850,
            max_rise: 150,
            min_platform_y: 150,
            platform_bottom_margin: 100,
            min_platform_scale: 0.5,
            max_platform_scale: 0.9,
            platform_texture: Vec2::new(400.0, 64.0),
            lookahead: 1000.0,
            initial_world_width: 10_000.0,
            world_expand_threshold: 2000.0,
            world_expand_step: 5000.0,
            retire_margin: 200.0,

            coin_probability: 0.6,
            guaranteed_coin_platform: 2,
            min_coins: 1,
            max_coins: 3,
            coin_lift: 30.0,
            coin_size: Vec2::new(24.0, 24.0),

            enemy_probability: 0.8,
            enemy_speed: 50.0,
            enemy_size: Vec2::new(36.0, 30.0),
            patrol_fraction: 1.0 / 3.0,
            enemy_anchor_divisor: 3.3,
            stuck_epsilon: 1.0,
            stuck_frames_limit: 5,

            player_start: Vec2::new(150.0, 350.0),
            player_size: Vec2::new(40.0, 40.0),
            run_speed: 150.0,
            jump_velocity: -400.0,
            fall_margin: 200.0,
            knockout_velocity: Vec2::new(0.0, 500.0),
            contact_end_delay_ms: 500,

            initial_platforms: 8,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check internal consistency (viewport-independent)
    pub fn validate(&self) -> Result<(), TuningError> {
        check_range("gap", self.min_gap as f32, self.max_gap as f32)?;
        check_range("coins", self.min_coins as f32, self.max_coins as f32)?;
        check_range(
            "platform_scale",
            self.min_platform_scale,
            self.max_platform_scale,
        )?;
        check_probability("coin_probability", self.coin_probability)?;
        check_probability("enemy_probability", self.enemy_probability)?;
        check_positive("min_gap", self.min_gap as f32)?;
        check_positive("min_platform_scale", self.min_platform_scale)?;
        check_positive("enemy_speed", self.enemy_speed)?;
        check_positive("run_speed", self.run_speed)?;
        check_positive("patrol_fraction", self.patrol_fraction)?;
        check_positive("enemy_anchor_divisor", self.enemy_anchor_divisor)?;
        check_positive("world_expand_step", self.world_expand_step)?;
        check_positive("platform_texture.x", self.platform_texture.x)?;
        check_positive("platform_texture.y", self.platform_texture.y)?;
        if self.min_coins < 0 {
            return Err(TuningError::NonPositive {
                field: "min_coins",
                value: self.min_coins as f32,
            });
        }
        Ok(())
    }

    /// Check that platforms fit in a viewport of the given height
    pub fn validate_viewport(&self, height: f32) -> Result<(), TuningError> {
        let max_y = height as i32 - self.platform_bottom_margin;
        if max_y < self.min_platform_y {
            return Err(TuningError::EmptyVerticalBand {
                height,
                min_y: self.min_platform_y,
                bottom_margin: self.platform_bottom_margin,
            });
        }
        Ok(())
    }

    /// Lowest allowed platform y for a viewport height
    pub fn max_platform_y(&self, viewport_height: f32) -> i32 {
        viewport_height as i32 - self.platform_bottom_margin
    }

    /// Half-width of an enemy's patrol interval on a platform of the given width
    pub fn patrol_half_range(&self, platform_width: f32) -> f32 {
        platform_width * self.patrol_fraction - self.enemy_size.x / 2.0
    }
}

fn check_range(field: &'static str, min: f32, max: f32) -> Result<(), TuningError> {
    if min > max {
        return Err(TuningError::InvertedRange { field, min, max });
    }
    Ok(())
}

fn check_probability(field: &'static str, value: f32) -> Result<(), TuningError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TuningError::Probability { field, value });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_nan() || value <= 0.0 {
        return Err(TuningError::NonPositive { field, value });
    }
    Ok(())
}
