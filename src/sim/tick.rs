//! Per-frame simulation tick
//!
//! Exactly one tick per rendered frame. Inbound physics events are applied
//! first, in order, so everything from frame N is settled before frame N+1.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::ControlInput;
use super::rng::RandomSource;
use super::session::RunSession;
use super::state::{EntityId, RunPhase};
use crate::dt_to_micros;

/// Camera geometry in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// World x of the camera's left edge (scroll position)
    pub left: f32,
    pub width: f32,
    pub height: f32,
    /// World y of the camera's bottom edge
    pub bottom: f32,
}

impl CameraView {
    pub fn new(left: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            width,
            height,
            bottom: height,
        }
    }
}

/// Player body state as resolved by physics this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerReport {
    pub pos: Vec2,
    pub vel: Vec2,
    pub touching_down: bool,
    pub blocked_down: bool,
}

/// Discrete collision events reported by physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    /// Player collided with a platform
    LandedOnPlatform(EntityId),
    /// Player overlapped a coin
    TouchedCoin(EntityId),
    /// Player overlapped an enemy
    TouchedEnemy(EntityId),
    /// Enemy was held in place this frame
    EnemyBlocked(EntityId),
}

/// Everything the simulation needs from its collaborators for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Frame delta in seconds
    pub dt: f32,
    pub controls: ControlInput,
    /// `None` while physics has nothing to report (setup/teardown)
    pub player: Option<PlayerReport>,
    pub camera: CameraView,
    pub events: Vec<TickEvent>,
}

impl TickInput {
    pub fn new(dt: f32, camera: CameraView) -> Self {
        Self {
            dt,
            controls: ControlInput::default(),
            player: None,
            camera,
            events: Vec::new(),
        }
    }
}

/// Advance the session by one frame.
///
/// While ENDED only the deferred-effect clock advances.
pub fn tick<R: RandomSource>(session: &mut RunSession<R>, input: &TickInput) {
    for effect in session.deferred.advance(dt_to_micros(input.dt)) {
        session.apply_deferred(effect);
    }
    if session.phase == RunPhase::Ended {
        return;
    }
    session.frame += 1;

    // 1. Sync player body from physics
    if let Some(report) = &input.player {
        session.player.pos = report.pos;
        session.player.vel = report.vel;
        session.player.grounded = report.touching_down || report.blocked_down;
    }

    // 2. Collision events, in arrival order
    let mut blocked = Vec::new();
    for event in &input.events {
        if session.phase == RunPhase::Ended {
            break;
        }
        match *event {
            TickEvent::LandedOnPlatform(id) => {
                if session.platforms.contains(id) {
                    session
                        .controller
                        .on_platform_collision(&mut session.player, &mut session.events);
                }
            }
            TickEvent::TouchedCoin(id) => {
                session.collect_coin(id);
            }
            TickEvent::TouchedEnemy(id) => {
                session.on_enemy_contact(id);
            }
            TickEvent::EnemyBlocked(id) => blocked.push(id),
        }
    }
    if session.phase == RunPhase::Ended {
        return;
    }

    // 3. Controls -> velocity
    session
        .controller
        .apply(&mut session.player, &input.controls, &mut session.events);

    let camera = &input.camera;

    // 4. Generation look-ahead (nothing to extend before the first platform)
    if session.platforms.created_count() > 0 {
        let spawned = session.platforms.maybe_generate_next(
            session.player.pos.x,
            camera.width,
            &session.tuning,
            &mut session.ids,
            &mut session.rng,
            &mut session.events,
        );
        if let Some(platform) = spawned {
            session.populate(&platform, false);
        }
    }

    // 5. Enemy patrol, then retire everything behind the camera
    session.enemies.update(
        input.dt,
        camera.left,
        &blocked,
        &session.tuning,
        &mut session.events,
    );
    let margin = session.tuning.retire_margin;
    let retired = session
        .platforms
        .retire_behind(camera.left, margin, &mut session.events);
    session
        .enemies
        .retire_on_platforms(&retired, &mut session.events);
    session
        .coins
        .retire_behind(camera.left, margin, &mut session.events);

    // 6. Terminal condition
    if session.player.pos.y > camera.bottom + session.tuning.fall_margin {
        session.fall_off();
    }
}

impl<R: RandomSource> RunSession<R> {
    /// Advance one frame (see [`tick`])
    pub fn tick(&mut self, input: &TickInput) {
        tick(self, input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::{EndCause, GameEvent};

    fn session() -> RunSession {
        RunSession::new(12345, Vec2::new(1280.0, 720.0))
    }

    fn camera() -> CameraView {
        CameraView::new(0.0, 1280.0, 720.0)
    }

    fn input_at(pos: Vec2) -> TickInput {
        TickInput {
            player: Some(PlayerReport {
                pos,
                vel: Vec2::ZERO,
                touching_down: true,
                blocked_down: false,
            }),
            ..TickInput::new(SIM_DT, camera())
        }
    }

    fn run_ended_count(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count()
    }

    #[test]
    fn test_fall_off_ends_run_once() {
        let mut s = session();
        s.drain_events();

        // Exactly at the margin: still running
        s.tick(&input_at(Vec2::new(300.0, 920.0)));
        assert_eq!(s.phase(), RunPhase::Running);

        s.tick(&input_at(Vec2::new(300.0, 921.0)));
        assert_eq!(s.phase(), RunPhase::Ended);
        assert!(!s.player().body_enabled);

        // Frozen: further ticks do nothing
        for _ in 0..10 {
            s.tick(&input_at(Vec2::new(300.0, 2000.0)));
        }
        let events = s.drain_events();
        assert_eq!(run_ended_count(&events), 1);
        assert!(events.contains(&GameEvent::RunEnded {
            cause: EndCause::FellOff,
            score: 0
        }));
    }

    #[test]
    fn test_controls_drive_player_velocity() {
        let mut s = session();
        let mut input = input_at(Vec2::new(400.0, 580.0));
        input.controls = ControlInput::right().with_jump();
        s.tick(&input);
        assert_eq!(s.player().vel, Vec2::new(150.0, -400.0));
        assert!(s.player().jumping);
    }

    #[test]
    fn test_landing_event_ends_jump() {
        let mut s = session();
        let seed = s.platforms().platforms()[0].id;
        let mut input = input_at(Vec2::new(400.0, 580.0));
        input.controls = ControlInput::default().with_jump();
        s.tick(&input);
        assert!(s.player().jumping);

        let mut input = input_at(Vec2::new(400.0, 580.0));
        input.events.push(TickEvent::LandedOnPlatform(seed));
        s.tick(&input);
        assert!(!s.player().jumping);
    }

    #[test]
    fn test_missing_player_report_is_tolerated() {
        let mut s = session();
        let before = s.player().pos;
        s.tick(&TickInput::new(SIM_DT, camera()));
        assert_eq!(s.player().pos, before);
        assert_eq!(s.phase(), RunPhase::Running);
    }

    #[test]
    fn test_generation_follows_player() {
        let mut s = session();
        let last = s.platforms().last_x();
        // viewport right edge within look-ahead of the last platform
        let x = last - 1000.0 - 640.0 + 1.0;
        s.tick(&input_at(Vec2::new(x, 500.0)));
        assert_eq!(s.platforms().created_count(), 10);
        // Same position again: no double spawn
        s.tick(&input_at(Vec2::new(x, 500.0)));
        assert_eq!(s.platforms().created_count(), 10);
    }

    #[test]
    fn test_retirement_cascades_to_enemies() {
        let mut s = session();
        let far = s.platforms().platforms()[5].pos.x;
        let mut input = input_at(Vec2::new(far, 500.0));
        input.camera.left = far - 300.0;
        s.tick(&input);

        let cutoff = far - 500.0;
        assert!(s.platforms().platforms().iter().all(|p| p.pos.x >= cutoff));
        for enemy in s.enemies().enemies() {
            assert!(s.platforms().contains(enemy.platform));
        }
        assert!(s.coins().coins().iter().all(|c| c.pos.x >= cutoff));
    }
}
