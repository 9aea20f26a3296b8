//! Simulation entities and shared types
//!
//! Entities carry only simulation data. Sprites, physics bodies and
//! animation handles belong to the rendering collaborator, keyed by [`EntityId`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Session-scoped entity identifier (never reused within a session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Allocates entity ids for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Simulation advancing every tick
    Running,
    /// Terminal condition reached; frozen until restart
    Ended,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Dropped below the camera bottom
    FellOff,
    /// Touched an enemy
    EnemyContact,
}

/// A platform in world coordinates (`pos` is the center)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: EntityId,
    pub pos: Vec2,
    pub scale: f32,
    /// Scaled footprint, used for placement math only
    pub size: Vec2,
}

impl Platform {
    pub fn new(id: EntityId, pos: Vec2, scale: f32, texture: Vec2) -> Self {
        Self {
            id,
            pos,
            scale,
            size: texture * scale,
        }
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn left(&self) -> f32 {
        self.pos.x - self.size.x / 2.0
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    pub fn top(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }
}

/// A collectible coin. Never moves after placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: EntityId,
    pub pos: Vec2,
    pub active: bool,
}

/// Enemy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Patrolling,
    Retired,
}

/// A patrolling enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    /// Feet position (bottom-center anchor)
    pub pos: Vec2,
    /// -1 (left) or +1 (right)
    pub direction: i8,
    pub velocity_x: f32,
    pub facing_left: bool,
    pub left_bound: f32,
    pub right_bound: f32,
    /// Owning platform (bounds were derived from it at spawn)
    pub platform: EntityId,
    /// Last x at which the enemy was seen moving
    pub last_x: f32,
    pub stuck_frames: u32,
    pub state: EnemyState,
}

impl Enemy {
    pub fn is_active(&self) -> bool {
        self.state == EnemyState::Patrolling
    }
}

/// The one player of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Airborne after a jump, until a landing is reported
    pub jumping: bool,
    /// Touching-down or blocked-down this frame (physics reported)
    pub grounded: bool,
    pub facing_left: bool,
    /// Collision response with platforms/enemies/coins
    pub collisions_enabled: bool,
    /// Body simulated at all (false once frozen after falling off)
    pub body_enabled: bool,
}

impl PlayerState {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            jumping: false,
            grounded: false,
            facing_left: false,
            collisions_enabled: true,
            body_enabled: true,
        }
    }

    /// Back to the start position with zero velocity and all flags cleared
    pub fn reset(&mut self, pos: Vec2) {
        *self = Self::new(pos);
    }
}

/// Outbound notifications for the rendering/UI collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlatformSpawned(Platform),
    PlatformRetired(EntityId),
    CoinSpawned(Coin),
    /// Coin picked up; `pos` anchors the floating "+1"
    CoinCollected { id: EntityId, pos: Vec2 },
    CoinRetired(EntityId),
    EnemySpawned(Enemy),
    EnemyTurned { id: EntityId, facing_left: bool },
    EnemyRetired(EntityId),
    /// Player left the ground; play squash/stretch
    JumpStarted,
    /// Jump finished on a platform
    Landed,
    /// Player facing flipped
    PlayerTurned { facing_left: bool },
    /// Camera/background bound grew
    WorldWidthChanged { width: f32 },
    /// Enemy contact: collision response off, player falls through the world
    PlayerKnockedOut,
    ScoreChanged { score: u32 },
    RunEnded { cause: EndCause, score: u32 },
    RunRestarted,
}
