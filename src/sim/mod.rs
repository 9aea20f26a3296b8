//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or physics engine dependencies

pub mod coin;
pub mod collision;
pub mod enemy;
pub mod platform;
pub mod player;
pub mod rng;
pub mod session;
pub mod state;
pub mod tick;
pub mod timer;

pub use coin::{CoinSpawner, Pickup};
pub use collision::{Aabb, Landing, land_on, standing_on};
pub use enemy::EnemyField;
pub use platform::PlatformField;
pub use player::{ControlInput, JumpState, PlayerController};
pub use rng::{GameRng, RandomSource};
pub use session::{RunSession, SessionError};
pub use state::{
    Coin, EndCause, Enemy, EnemyState, EntityId, GameEvent, IdAllocator, Platform, PlayerState,
    RunPhase,
};
pub use tick::{CameraView, PlayerReport, TickEvent, TickInput, tick};
pub use timer::{DeferredQueue, TimerHandle};
