//! Procedural platform generation and retirement
//!
//! Platforms are generated ahead of the player with bounded-random gaps and
//! heights, and retired once they scroll far enough behind the camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::state::{EntityId, GameEvent, IdAllocator, Platform};
use crate::jitter_window;
use crate::tuning::Tuning;

/// Where generation resumes after a reset (before the seed platform is placed)
const RESET_LAST_X: f32 = 100.0;

/// Owns every live platform of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformField {
    /// Live platforms, ordered by x (and by id)
    platforms: Vec<Platform>,
    last_x: f32,
    last_y: f32,
    world_width: f32,
    viewport_height: f32,
    /// Player x of the last look-ahead spawn (guards double spawns)
    last_trigger_x: Option<f32>,
    /// Platforms created this session, retired ones included
    created: u32,
}

impl PlatformField {
    pub fn new(tuning: &Tuning, viewport_height: f32) -> Self {
        Self {
            platforms: Vec::new(),
            last_x: RESET_LAST_X,
            last_y: tuning.max_platform_y(viewport_height) as f32,
            world_width: tuning.initial_world_width,
            viewport_height,
            last_trigger_x: None,
            created: 0,
        }
    }

    /// Place the seed platform, then `count` more with the regular spawn rule.
    ///
    /// Returns every platform created, seed first.
    pub fn generate_initial(
        &mut self,
        count: u32,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> Vec<Platform> {
        let mut created = Vec::with_capacity(count as usize + 1);

        self.last_x = tuning.start_platform_x;
        self.last_y = tuning.max_platform_y(self.viewport_height) as f32;
        let seed = Platform::new(
            ids.next_id(),
            Vec2::new(self.last_x, self.last_y),
            tuning.start_platform_scale,
            tuning.platform_texture,
        );
        created.push(self.insert(seed, events));

        for _ in 0..count {
            created.push(self.spawn_next(tuning, ids, rng, events));
        }

        log::debug!(
            "Generated {} initial platforms, last x={}",
            created.len(),
            self.last_x
        );
        created
    }

    /// True when the viewport's right edge has come within look-ahead range
    pub fn should_generate(&self, player_x: f32, viewport_width: f32, tuning: &Tuning) -> bool {
        player_x + viewport_width / 2.0 > self.last_x - tuning.lookahead
    }

    /// Spawn one platform ahead if the player is close enough.
    ///
    /// Repeated calls with an unchanged player x spawn at most once.
    pub fn maybe_generate_next(
        &mut self,
        player_x: f32,
        viewport_width: f32,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> Option<Platform> {
        debug_assert!(self.created > 0, "look-ahead generation before the seed platform");
        if self.last_trigger_x == Some(player_x) {
            return None;
        }
        if !self.should_generate(player_x, viewport_width, tuning) {
            return None;
        }
        self.last_trigger_x = Some(player_x);
        Some(self.spawn_next(tuning, ids, rng, events))
    }

    /// Apply the spawn rule once: random gap, jittered height, random scale
    pub fn spawn_next(
        &mut self,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> Platform {
        let gap = rng.int_between(tuning.min_gap, tuning.max_gap);
        let new_x = self.last_x + gap as f32;

        if new_x > self.world_width - tuning.world_expand_threshold {
            self.world_width += tuning.world_expand_step;
            log::info!("World width expanded to {}", self.world_width);
            events.push(GameEvent::WorldWidthChanged {
                width: self.world_width,
            });
        }

        let max_y = tuning.max_platform_y(self.viewport_height);
        let new_y = match jitter_window(self.last_y as i32, tuning.max_rise, tuning.min_platform_y, max_y)
        {
            Some((lo, hi)) => rng.int_between(lo, hi),
            None => tuning.min_platform_y,
        };

        let scale = rng.float_between(tuning.min_platform_scale, tuning.max_platform_scale);
        let platform = Platform::new(
            ids.next_id(),
            Vec2::new(new_x, new_y as f32),
            scale,
            tuning.platform_texture,
        );

        self.last_x = new_x;
        self.last_y = new_y as f32;
        self.insert(platform, events)
    }

    fn insert(&mut self, platform: Platform, events: &mut Vec<GameEvent>) -> Platform {
        self.created += 1;
        log::debug!(
            "Platform {:?} at ({}, {}) scale {:.2}",
            platform.id,
            platform.pos.x,
            platform.pos.y,
            platform.scale
        );
        self.platforms.push(platform);
        events.push(GameEvent::PlatformSpawned(platform));
        platform
    }

    /// Retire platforms whose x is more than `margin` behind `camera_left`.
    ///
    /// Returns the retired ids so attached entities can follow.
    pub fn retire_behind(
        &mut self,
        camera_left: f32,
        margin: f32,
        events: &mut Vec<GameEvent>,
    ) -> Vec<EntityId> {
        let cutoff = camera_left - margin;
        let mut retired = Vec::new();
        self.platforms.retain(|p| {
            if p.pos.x < cutoff {
                retired.push(p.id);
                false
            } else {
                true
            }
        });
        for id in &retired {
            log::debug!("Platform {:?} retired", id);
            events.push(GameEvent::PlatformRetired(*id));
        }
        retired
    }

    /// Clear everything and restore the initial generation cursor and world width
    pub fn reset(&mut self, tuning: &Tuning) {
        self.platforms.clear();
        self.last_x = RESET_LAST_X;
        self.last_y = tuning.max_platform_y(self.viewport_height) as f32;
        self.world_width = tuning.initial_world_width;
        self.last_trigger_x = None;
        self.created = 0;
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn get(&self, id: EntityId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn last_x(&self) -> f32 {
        self.last_x
    }

    pub fn last_y(&self) -> f32 {
        self.last_y
    }

    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Platforms created this session, retired ones included
    pub fn created_count(&self) -> u32 {
        self.created
    }
}
