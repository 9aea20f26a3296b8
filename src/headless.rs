//! Renderer-free physics collaborator
//!
//! Stands in for the game engine: integrates the player body, resolves
//! one-way platform landings, detects coin and enemy overlaps and follows the
//! player with the camera. Whatever a physics step detects is reported to the
//! session on the following tick.

use glam::Vec2;

use crate::consts::{GRAVITY, KNOCKOUT_GRAVITY};
use crate::sim::collision::{Aabb, land_on};
use crate::sim::{
    CameraView, ControlInput, Platform, PlayerReport, RandomSource, RunSession, TickEvent,
    TickInput,
};

/// Player body as the physics engine sees it (`pos` is the center)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Body {
    pos: Vec2,
    vel: Vec2,
    touching_down: bool,
}

/// Minimal arcade physics world driving a [`RunSession`]
#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    body: Body,
    camera: CameraView,
    /// Collisions detected last step, delivered with the next tick
    pending: Vec<TickEvent>,
    gravity: f32,
    /// Knockout velocity already taken over from the session
    knocked_out: bool,
}

impl HeadlessWorld {
    pub fn new<R: RandomSource>(session: &RunSession<R>) -> Self {
        let viewport = session.viewport();
        let mut world = Self {
            body: Body {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                touching_down: false,
            },
            camera: CameraView::new(0.0, viewport.x, viewport.y),
            pending: Vec::new(),
            gravity: GRAVITY,
            knocked_out: false,
        };
        world.reset(session);
        world
    }

    /// Re-sync with a freshly started (or restarted) session
    pub fn reset<R: RandomSource>(&mut self, session: &RunSession<R>) {
        self.body = Body {
            pos: session.player().pos,
            vel: Vec2::ZERO,
            touching_down: false,
        };
        self.camera.left = 0.0;
        self.pending.clear();
        self.knocked_out = false;
    }

    /// One frame: tick the session with what physics saw, then step physics
    pub fn step<R: RandomSource>(
        &mut self,
        session: &mut RunSession<R>,
        controls: ControlInput,
        dt: f32,
    ) {
        let input = self.next_input(controls, dt);
        session.tick(&input);
        self.integrate(session, dt);
    }

    /// Build the tick input for the next frame, handing over pending collisions
    pub fn next_input(&mut self, controls: ControlInput, dt: f32) -> TickInput {
        TickInput {
            dt,
            controls,
            player: Some(PlayerReport {
                pos: self.body.pos,
                vel: self.body.vel,
                touching_down: self.body.touching_down,
                blocked_down: false,
            }),
            camera: self.camera,
            events: std::mem::take(&mut self.pending),
        }
    }

    /// Advance the body by `dt` using the velocity the session commanded
    pub fn integrate<R: RandomSource>(&mut self, session: &RunSession<R>, dt: f32) {
        let player = session.player();
        if !player.body_enabled {
            self.body.vel = Vec2::ZERO;
            self.body.touching_down = false;
            return;
        }

        let knocked_out = !player.collisions_enabled;
        let mut vel = if session.is_running() || (knocked_out && !self.knocked_out) {
            player.vel
        } else {
            self.body.vel
        };
        self.knocked_out = knocked_out;

        let size = session.tuning().player_size;
        let prev_bottom = self.body.pos.y + size.y / 2.0;
        let gravity = if knocked_out { KNOCKOUT_GRAVITY } else { self.gravity };
        vel.y += gravity * dt;
        self.body.pos += vel * dt;
        self.body.vel = vel;
        self.body.touching_down = false;

        if !knocked_out {
            self.resolve_platforms(session.platforms().platforms(), prev_bottom, size);
            self.detect_overlaps(session, size);
        }
        self.follow(session.world_width());
    }

    fn resolve_platforms(&mut self, platforms: &[Platform], prev_bottom: f32, size: Vec2) {
        let body = Aabb::from_center(self.body.pos, size);
        for platform in platforms {
            let surface = Aabb::of_platform(platform);
            if let Some(landing) = land_on(prev_bottom, &body, &surface, self.body.vel.y) {
                self.body.pos.y = landing.surface_y - size.y / 2.0;
                self.body.vel.y = 0.0;
                self.body.touching_down = true;
                self.pending.push(TickEvent::LandedOnPlatform(platform.id));
                break;
            }
        }
    }

    fn detect_overlaps<R: RandomSource>(&mut self, session: &RunSession<R>, size: Vec2) {
        let body = Aabb::from_center(self.body.pos, size);
        let tuning = session.tuning();
        for coin in session.coins().coins() {
            if coin.active && body.overlaps(&Aabb::of_coin(coin, tuning.coin_size)) {
                self.pending.push(TickEvent::TouchedCoin(coin.id));
            }
        }
        for enemy in session.enemies().enemies() {
            if enemy.is_active() && body.overlaps(&Aabb::of_enemy(enemy, tuning.enemy_size)) {
                self.pending.push(TickEvent::TouchedEnemy(enemy.id));
            }
        }
    }

    /// Center the camera on the player, clamped to the world bounds
    fn follow(&mut self, world_width: f32) {
        let max_left = (world_width - self.camera.width).max(0.0);
        self.camera.left = (self.body.pos.x - self.camera.width / 2.0).clamp(0.0, max_left);
    }

    pub fn camera(&self) -> CameraView {
        self.camera
    }

    pub fn body_pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn body_vel(&self) -> Vec2 {
        self.body.vel
    }

    pub fn touching_down(&self) -> bool {
        self.body.touching_down
    }
}

/// Scripted controls for demo runs: keep running right, hop off platform
/// edges and over enemies ahead.
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Distance before a platform's right edge at which to jump
    pub edge_lead: f32,
    /// Horizontal distance at which an enemy ahead triggers a jump
    pub enemy_lead: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            edge_lead: 24.0,
            enemy_lead: 90.0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls<R: RandomSource>(&self, session: &RunSession<R>) -> ControlInput {
        let run = ControlInput::right();
        let player = session.player();
        if !session.is_running() || !player.grounded || player.jumping {
            return run;
        }

        let x = player.pos.x;
        let half = session.tuning().player_size / 2.0;
        let feet = player.pos.y + half.y;

        let near_edge = session.platforms().platforms().iter().any(|p| {
            x + half.x >= p.left()
                && x - half.x <= p.right()
                && (feet - p.top()).abs() < 2.0
                && x >= p.right() - self.edge_lead
        });
        let enemy_ahead = session.enemies().enemies().iter().any(|e| {
            let dx = e.pos.x - x;
            dx > 0.0 && dx < self.enemy_lead && (e.pos.y - feet).abs() < 60.0
        });

        if near_edge || enemy_ahead {
            run.with_jump()
        } else {
            run
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{EndCause, GameEvent, RunPhase};

    fn setup() -> (RunSession, HeadlessWorld) {
        let session = RunSession::new(99, Vec2::new(1280.0, 720.0));
        let world = HeadlessWorld::new(&session);
        (session, world)
    }

    #[test]
    fn test_running_right_lands_on_seed_platform() {
        let (mut session, mut world) = setup();
        let seed = session.platforms().platforms()[0];

        for _ in 0..90 {
            world.step(&mut session, ControlInput::right(), SIM_DT);
        }
        assert_eq!(session.phase(), RunPhase::Running);
        assert!(world.touching_down());
        assert!((world.body_pos().y + 20.0 - seed.top()).abs() < 1e-3);
        assert!(session.player().grounded);
    }

    #[test]
    fn test_standing_still_falls_off() {
        let (mut session, mut world) = setup();
        session.drain_events();

        for _ in 0..200 {
            world.step(&mut session, ControlInput::default(), SIM_DT);
        }
        assert_eq!(session.phase(), RunPhase::Ended);
        assert!(!session.player().body_enabled);
        let frozen = world.body_pos();
        world.step(&mut session, ControlInput::default(), SIM_DT);
        assert_eq!(world.body_pos(), frozen);

        let events = session.drain_events();
        let ends: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .collect();
        assert_eq!(
            ends,
            vec![&GameEvent::RunEnded {
                cause: EndCause::FellOff,
                score: 0
            }]
        );
    }

    #[test]
    fn test_knockout_falls_through_and_ends_after_delay() {
        let (mut session, mut world) = setup();
        let enemy = session.enemies().enemies()[0].id;
        session.drain_events();

        world.pending.push(TickEvent::TouchedEnemy(enemy));
        world.step(&mut session, ControlInput::default(), SIM_DT);
        assert_eq!(session.phase(), RunPhase::Ended);
        assert!(!session.player().collisions_enabled);
        assert!((world.body_vel().y - (500.0 + KNOCKOUT_GRAVITY * SIM_DT)).abs() < 1e-3);

        for _ in 0..29 {
            world.step(&mut session, ControlInput::default(), SIM_DT);
            assert!(world.pending.is_empty());
        }
        let ended = |events: &[GameEvent]| {
            events
                .iter()
                .any(|e| matches!(e, GameEvent::RunEnded { .. }))
        };
        assert!(!ended(&session.drain_events()));

        world.step(&mut session, ControlInput::default(), SIM_DT);
        assert!(ended(&session.drain_events()));
        // Gravity kept accumulating during the fall
        assert!(world.body_vel().y > 500.0 + 25.0 * KNOCKOUT_GRAVITY * SIM_DT);
    }

    #[test]
    fn test_camera_follow_is_clamped() {
        let (session, mut world) = setup();
        let width = session.world_width();

        world.body.pos.x = 300.0;
        world.follow(width);
        assert_eq!(world.camera().left, 0.0);

        world.body.pos.x = 5000.0;
        world.follow(width);
        assert_eq!(world.camera().left, 4360.0);

        world.body.pos.x = width + 500.0;
        world.follow(width);
        assert_eq!(world.camera().left, width - 1280.0);
    }

    #[test]
    fn test_reset_resyncs_with_restarted_session() {
        let (mut session, mut world) = setup();
        for _ in 0..200 {
            world.step(&mut session, ControlInput::default(), SIM_DT);
        }
        session.restart().unwrap();
        world.reset(&session);
        assert_eq!(world.body_pos(), Vec2::new(150.0, 350.0));
        assert_eq!(world.body_vel(), Vec2::ZERO);
        assert_eq!(world.camera().left, 0.0);
    }

    #[test]
    fn test_autopilot_jumps_at_platform_edge() {
        let (mut session, _) = setup();
        let seed = session.platforms().platforms()[0];
        let pilot = Autopilot::new();

        session.player.grounded = true;
        session.player.pos = Vec2::new(seed.pos.x, seed.top() - 20.0);
        assert!(!pilot.controls(&session).jump_pressed);

        session.player.pos.x = seed.right() - 10.0;
        let controls = pilot.controls(&session);
        assert!(controls.jump_pressed);
        assert!(controls.right_held);
    }
}
