//! Player input handling and the jump state machine
//!
//! GROUNDED ⇄ AIRBORNE: a successful jump enters AIRBORNE, a landing
//! collision reported by physics leaves it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, PlayerState};
use crate::tuning::Tuning;

/// Logical control signals for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub left_held: bool,
    pub right_held: bool,
    /// Rising edge of the jump button this tick
    pub jump_pressed: bool,
}

impl ControlInput {
    pub fn right() -> Self {
        Self {
            right_held: true,
            ..Default::default()
        }
    }

    pub fn left() -> Self {
        Self {
            left_held: true,
            ..Default::default()
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self
    }
}

/// Jump state derived from the player's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpState {
    Grounded,
    Airborne,
}

/// Converts controls into player velocity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerController {
    run_speed: f32,
    jump_velocity: f32,
}

impl PlayerController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            run_speed: tuning.run_speed,
            jump_velocity: tuning.jump_velocity,
        }
    }

    /// Apply one tick of controls. Left wins when both directions are held.
    ///
    /// Returns true if a jump started.
    pub fn apply(
        &self,
        player: &mut PlayerState,
        controls: &ControlInput,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let was_facing_left = player.facing_left;
        if controls.left_held {
            player.vel.x = -self.run_speed;
            player.facing_left = true;
        } else if controls.right_held {
            player.vel.x = self.run_speed;
            player.facing_left = false;
        } else {
            player.vel.x = 0.0;
        }
        if player.facing_left != was_facing_left {
            events.push(GameEvent::PlayerTurned {
                facing_left: player.facing_left,
            });
        }

        if controls.jump_pressed && player.grounded {
            player.vel.y = self.jump_velocity;
            player.jumping = true;
            player.grounded = false;
            events.push(GameEvent::JumpStarted);
            return true;
        }
        false
    }

    /// Physics reported contact with a platform. Ends a jump if one is in progress.
    pub fn on_platform_collision(&self, player: &mut PlayerState, events: &mut Vec<GameEvent>) -> bool {
        if !player.jumping {
            return false;
        }
        player.jumping = false;
        events.push(GameEvent::Landed);
        true
    }

    pub fn jump_state(player: &PlayerState) -> JumpState {
        if player.jumping {
            JumpState::Airborne
        } else {
            JumpState::Grounded
        }
    }

    /// Velocity for the knocked-out fall after an enemy contact
    pub fn knock_out(player: &mut PlayerState, velocity: Vec2, events: &mut Vec<GameEvent>) {
        player.vel = velocity;
        player.collisions_enabled = false;
        player.grounded = false;
        events.push(GameEvent::PlayerKnockedOut);
    }

    /// Freeze the body in place after falling off the world
    pub fn freeze(player: &mut PlayerState) {
        player.vel = Vec2::ZERO;
        player.body_enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PlayerController, PlayerState, Vec<GameEvent>) {
        let tuning = Tuning::default();
        (
            PlayerController::new(&tuning),
            PlayerState::new(tuning.player_start),
            Vec::new(),
        )
    }

    #[test]
    fn test_horizontal_velocity() {
        let (ctl, mut player, mut events) = setup();

        ctl.apply(&mut player, &ControlInput::right(), &mut events);
        assert_eq!(player.vel.x, 150.0);
        assert!(!player.facing_left);

        ctl.apply(&mut player, &ControlInput::left(), &mut events);
        assert_eq!(player.vel.x, -150.0);
        assert!(player.facing_left);

        ctl.apply(&mut player, &ControlInput::default(), &mut events);
        assert_eq!(player.vel.x, 0.0);
        // Facing is kept when idle
        assert!(player.facing_left);
        assert_eq!(events, vec![GameEvent::PlayerTurned { facing_left: true }]);
    }

    #[test]
    fn test_left_wins_when_both_held() {
        let (ctl, mut player, mut events) = setup();
        let both = ControlInput {
            left_held: true,
            right_held: true,
            jump_pressed: false,
        };
        ctl.apply(&mut player, &both, &mut events);
        assert_eq!(player.vel.x, -150.0);
    }

    #[test]
    fn test_jump_requires_ground() {
        let (ctl, mut player, mut events) = setup();

        player.grounded = false;
        assert!(!ctl.apply(&mut player, &ControlInput::default().with_jump(), &mut events));
        assert_eq!(player.vel.y, 0.0);
        assert_eq!(PlayerController::jump_state(&player), JumpState::Grounded);

        player.grounded = true;
        assert!(ctl.apply(&mut player, &ControlInput::default().with_jump(), &mut events));
        assert_eq!(player.vel.y, -400.0);
        assert_eq!(PlayerController::jump_state(&player), JumpState::Airborne);
        assert!(events.contains(&GameEvent::JumpStarted));
    }

    #[test]
    fn test_holding_jump_does_not_rejump() {
        let (ctl, mut player, mut events) = setup();
        player.grounded = true;
        ctl.apply(&mut player, &ControlInput::default().with_jump(), &mut events);
        // Still airborne next tick, no new edge
        player.vel.y = -300.0;
        ctl.apply(&mut player, &ControlInput::default(), &mut events);
        assert_eq!(player.vel.y, -300.0);
    }

    #[test]
    fn test_landing_clears_jump() {
        let (ctl, mut player, mut events) = setup();
        assert!(!ctl.on_platform_collision(&mut player, &mut events));

        player.grounded = true;
        ctl.apply(&mut player, &ControlInput::default().with_jump(), &mut events);
        assert!(ctl.on_platform_collision(&mut player, &mut events));
        assert_eq!(PlayerController::jump_state(&player), JumpState::Grounded);
        assert_eq!(events.last(), Some(&GameEvent::Landed));
    }

    #[test]
    fn test_knock_out_disables_collisions() {
        let (_, mut player, mut events) = setup();
        PlayerController::knock_out(&mut player, Vec2::new(0.0, 500.0), &mut events);
        assert_eq!(player.vel, Vec2::new(0.0, 500.0));
        assert!(!player.collisions_enabled);
        assert_eq!(events, vec![GameEvent::PlayerKnockedOut]);
    }
}
