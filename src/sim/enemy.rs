//! Enemy spawning and patrol AI
//!
//! Enemies walk back and forth inside bounds derived from their platform,
//! turn around when wedged, and are retired once behind the camera.
//! Contact with any enemy is lethal, once per run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::state::{Enemy, EnemyState, EntityId, GameEvent, IdAllocator, Platform};
use crate::tuning::Tuning;

/// Owns the live enemies of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyField {
    enemies: Vec<Enemy>,
    /// Cleared by the first lethal contact; re-armed by `reset`
    contact_armed: bool,
}

impl Default for EnemyField {
    fn default() -> Self {
        Self {
            enemies: Vec::new(),
            contact_armed: true,
        }
    }
}

impl EnemyField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll for an enemy on a newly created platform
    pub fn on_platform_created(
        &mut self,
        platform: &Platform,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> Option<Enemy> {
        if !rng.chance(tuning.enemy_probability) {
            return None;
        }
        self.spawn_on(platform, tuning, ids, events)
    }

    /// Place an enemy at the platform's center, walking right.
    ///
    /// Returns `None` when the platform is too narrow to patrol on.
    pub fn spawn_on(
        &mut self,
        platform: &Platform,
        tuning: &Tuning,
        ids: &mut IdAllocator,
        events: &mut Vec<GameEvent>,
    ) -> Option<Enemy> {
        let half_range = tuning.patrol_half_range(platform.width());
        if half_range <= 0.0 {
            log::warn!(
                "Platform {:?} too narrow ({}) for an enemy patrol",
                platform.id,
                platform.width()
            );
            return None;
        }

        let x = platform.pos.x;
        let enemy = Enemy {
            id: ids.next_id(),
            pos: Vec2::new(x, platform.pos.y - platform.height() / tuning.enemy_anchor_divisor),
            direction: 1,
            velocity_x: tuning.enemy_speed,
            facing_left: false,
            left_bound: x - half_range,
            right_bound: x + half_range,
            platform: platform.id,
            last_x: x,
            stuck_frames: 0,
            state: EnemyState::Patrolling,
        };
        self.insert(enemy, events);
        Some(enemy)
    }

    /// Add a fully specified enemy (bounds must already be valid)
    pub fn insert(&mut self, enemy: Enemy, events: &mut Vec<GameEvent>) {
        assert!(
            enemy.left_bound < enemy.right_bound,
            "enemy {:?} has inverted patrol bounds [{}, {}]",
            enemy.id,
            enemy.left_bound,
            enemy.right_bound
        );
        log::debug!(
            "Enemy {:?} on platform {:?}, patrol [{:.1}, {:.1}]",
            enemy.id,
            enemy.platform,
            enemy.left_bound,
            enemy.right_bound
        );
        self.enemies.push(enemy);
        events.push(GameEvent::EnemySpawned(enemy));
    }

    /// Advance every enemy one tick.
    ///
    /// `blocked` lists enemies the physics collaborator held in place this tick.
    pub fn update(
        &mut self,
        dt: f32,
        camera_left: f32,
        blocked: &[EntityId],
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        let cutoff = camera_left - tuning.retire_margin;

        for enemy in self.enemies.iter_mut().filter(|e| e.is_active()) {
            if !blocked.contains(&enemy.id) {
                enemy.pos.x += enemy.velocity_x * dt;
            }

            // Stuck detection: no visible progress for too long forces a turn
            if (enemy.pos.x - enemy.last_x).abs() < tuning.stuck_epsilon {
                enemy.stuck_frames += 1;
                if enemy.stuck_frames > tuning.stuck_frames_limit {
                    log::debug!("Enemy {:?} stuck at x={:.1}, turning", enemy.id, enemy.pos.x);
                    reverse(enemy, tuning, events);
                    enemy.stuck_frames = 0;
                }
            } else {
                enemy.stuck_frames = 0;
                enemy.last_x = enemy.pos.x;
            }

            let at_right = enemy.pos.x >= enemy.right_bound && enemy.direction > 0;
            let at_left = enemy.pos.x <= enemy.left_bound && enemy.direction < 0;
            if at_right || at_left {
                reverse(enemy, tuning, events);
            }

            if enemy.pos.x < cutoff {
                enemy.state = EnemyState::Retired;
            }
        }

        self.sweep_retired(events);
    }

    /// Retire enemies standing on platforms that were just retired
    pub fn retire_on_platforms(&mut self, platforms: &[EntityId], events: &mut Vec<GameEvent>) {
        if platforms.is_empty() {
            return;
        }
        for enemy in &mut self.enemies {
            if platforms.contains(&enemy.platform) {
                enemy.state = EnemyState::Retired;
            }
        }
        self.sweep_retired(events);
    }

    fn sweep_retired(&mut self, events: &mut Vec<GameEvent>) {
        self.enemies.retain(|e| {
            if e.is_active() {
                true
            } else {
                log::debug!("Enemy {:?} retired", e.id);
                events.push(GameEvent::EnemyRetired(e.id));
                false
            }
        });
    }

    /// Player touched an enemy. Returns true only for the first contact of a run
    /// with a live enemy.
    pub fn on_player_contact(&mut self, id: EntityId) -> bool {
        if !self.contact_armed {
            return false;
        }
        if !self.enemies.iter().any(|e| e.id == id && e.is_active()) {
            log::debug!("Contact with unknown or retired enemy {:?} ignored", id);
            return false;
        }
        log::info!("Player touched enemy {:?}", id);
        self.contact_armed = false;
        true
    }

    /// Clear all enemies and re-arm the contact guard
    pub fn reset(&mut self) {
        self.enemies.clear();
        self.contact_armed = true;
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn get(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn contact_armed(&self) -> bool {
        self.contact_armed
    }
}

/// Flip direction, reset speed, flip facing
fn reverse(enemy: &mut Enemy, tuning: &Tuning, events: &mut Vec<GameEvent>) {
    enemy.direction = -enemy.direction;
    enemy.velocity_x = tuning.enemy_speed * f32::from(enemy.direction);
    enemy.facing_left = enemy.direction < 0;
    events.push(GameEvent::EnemyTurned {
        id: enemy.id,
        facing_left: enemy.facing_left,
    });
}
