//! Run session: owns every component and the RUNNING ⇄ ENDED state machine
//!
//! All state that belongs to one play-through lives here. Nothing is global;
//! `restart` is the only way back to a fresh run.

use glam::Vec2;
use thiserror::Error;

use super::coin::CoinSpawner;
use super::enemy::EnemyField;
use super::platform::PlatformField;
use super::player::PlayerController;
use super::rng::{GameRng, RandomSource};
use super::state::{EndCause, EntityId, GameEvent, IdAllocator, Platform, PlayerState, RunPhase};
use super::timer::DeferredQueue;
use crate::tuning::{Tuning, TuningError};

/// Misuse of the session API
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// `restart` is only valid once the run has ended
    #[error("restart requested while the run is still in progress")]
    NotEnded,
}

/// Effects that surface after a delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Deferred {
    RunEnded { cause: EndCause, score: u32 },
}

/// One play-through from start to terminal condition, reusable via `restart`
pub struct RunSession<R: RandomSource = GameRng> {
    pub(crate) tuning: Tuning,
    pub(crate) viewport: Vec2,
    pub(crate) rng: R,
    pub(crate) ids: IdAllocator,
    pub(crate) platforms: PlatformField,
    pub(crate) coins: CoinSpawner,
    pub(crate) enemies: EnemyField,
    pub(crate) controller: PlayerController,
    pub(crate) player: PlayerState,
    pub(crate) score: u32,
    pub(crate) phase: RunPhase,
    pub(crate) deferred: DeferredQueue<Deferred>,
    pub(crate) events: Vec<GameEvent>,
    /// Ticks simulated this run (frozen ticks excluded)
    pub(crate) frame: u64,
    /// Runs started by this session, the first included
    pub(crate) run_count: u32,
}

impl RunSession<GameRng> {
    /// Session with default tuning and a seeded PCG generator
    pub fn new(seed: u64, viewport: Vec2) -> Self {
        Self::build(GameRng::new(seed), Tuning::default(), viewport)
    }
}

impl<R: RandomSource> RunSession<R> {
    /// Session with custom tuning and random source
    pub fn with_rng(rng: R, tuning: Tuning, viewport: Vec2) -> Result<Self, TuningError> {
        tuning.validate()?;
        tuning.validate_viewport(viewport.y)?;
        Ok(Self::build(rng, tuning, viewport))
    }

    fn build(rng: R, tuning: Tuning, viewport: Vec2) -> Self {
        let mut session = Self {
            platforms: PlatformField::new(&tuning, viewport.y),
            coins: CoinSpawner::new(),
            enemies: EnemyField::new(),
            controller: PlayerController::new(&tuning),
            player: PlayerState::new(tuning.player_start),
            tuning,
            viewport,
            rng,
            ids: IdAllocator::default(),
            score: 0,
            phase: RunPhase::Running,
            deferred: DeferredQueue::new(),
            events: Vec::new(),
            frame: 0,
            run_count: 0,
        };
        session.start_run();
        session
    }

    /// Lay out the initial platforms and enter RUNNING
    fn start_run(&mut self) {
        let initial = self.platforms.generate_initial(
            self.tuning.initial_platforms,
            &self.tuning,
            &mut self.ids,
            &mut self.rng,
            &mut self.events,
        );
        for (i, platform) in initial.iter().enumerate() {
            self.populate(platform, i == 0);
        }
        self.phase = RunPhase::Running;
        self.frame = 0;
        self.run_count += 1;
        log::info!(
            "Run {} started: {} platforms, world width {}",
            self.run_count,
            initial.len(),
            self.platforms.world_width()
        );
    }

    /// Offer a new platform to the coin and enemy spawners.
    ///
    /// The seed platform is the player's landing zone and never gets an enemy.
    pub(crate) fn populate(&mut self, platform: &Platform, is_seed: bool) {
        self.coins.on_platform_created(
            platform,
            &self.tuning,
            &mut self.ids,
            &mut self.rng,
            &mut self.events,
        );
        if !is_seed {
            self.enemies.on_platform_created(
                platform,
                &self.tuning,
                &mut self.ids,
                &mut self.rng,
                &mut self.events,
            );
        }
    }

    /// Collect a coin the player touched. Repeated or unknown pickups are ignored.
    pub fn collect_coin(&mut self, id: EntityId) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        let Some(pickup) = self.coins.on_pickup(id) else {
            log::debug!("Pickup of missing coin {:?} ignored", id);
            return false;
        };
        self.score += pickup.score_delta;
        self.events.push(GameEvent::CoinCollected { id, pos: pickup.pos });
        self.events.push(GameEvent::ScoreChanged { score: self.score });
        true
    }

    /// Enemy contact: end the run now, let the player fall through the world,
    /// and surface the end signal after the configured delay.
    pub fn on_enemy_contact(&mut self, id: EntityId) -> bool {
        if self.phase != RunPhase::Running || !self.enemies.on_player_contact(id) {
            return false;
        }
        self.phase = RunPhase::Ended;
        PlayerController::knock_out(&mut self.player, self.tuning.knockout_velocity, &mut self.events);
        self.deferred.schedule(
            self.tuning.contact_end_delay_ms,
            Deferred::RunEnded {
                cause: EndCause::EnemyContact,
                score: self.score,
            },
        );
        log::info!(
            "Knocked out by enemy {:?} at x={:.0}; run ends in {} ms",
            id,
            self.player.pos.x,
            self.tuning.contact_end_delay_ms
        );
        true
    }

    /// Fall-off: end the run and signal immediately
    pub(crate) fn fall_off(&mut self) {
        self.phase = RunPhase::Ended;
        PlayerController::freeze(&mut self.player);
        self.surface_end(EndCause::FellOff, self.score);
    }

    pub(crate) fn apply_deferred(&mut self, effect: Deferred) {
        match effect {
            Deferred::RunEnded { cause, score } => self.surface_end(cause, score),
        }
    }

    fn surface_end(&mut self, cause: EndCause, score: u32) {
        log::info!(
            "Run {} ended ({:?}) with score {} after {} ticks",
            self.run_count,
            cause,
            score,
            self.frame
        );
        self.events.push(GameEvent::RunEnded { cause, score });
    }

    /// Start a new run. Only valid once the current run has ended.
    ///
    /// A pending end signal from the previous run is cancelled.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        if self.phase != RunPhase::Ended {
            log::warn!("Restart ignored: run {} still in progress", self.run_count);
            return Err(SessionError::NotEnded);
        }
        if !self.deferred.is_empty() {
            log::debug!("Cancelling {} pending effects", self.deferred.len());
        }
        self.deferred.clear();
        self.platforms.reset(&self.tuning);
        self.coins.reset();
        self.enemies.reset();
        self.score = 0;
        self.player.reset(self.tuning.player_start);
        self.events.push(GameEvent::RunRestarted);
        self.events.push(GameEvent::ScoreChanged { score: 0 });
        self.start_run();
        Ok(())
    }

    /// Take all queued outbound events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn platforms(&self) -> &PlatformField {
        &self.platforms
    }

    pub fn coins(&self) -> &CoinSpawner {
        &self.coins
    }

    pub fn enemies(&self) -> &EnemyField {
        &self.enemies
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn world_width(&self) -> f32 {
        self.platforms.world_width()
    }

    /// An end-of-run signal is scheduled but has not surfaced yet
    pub fn end_pending(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn run_count(&self) -> u32 {
        self.run_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RunSession {
        RunSession::new(7, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn test_new_session_has_initial_world() {
        let mut s = session();
        assert_eq!(s.phase(), RunPhase::Running);
        assert_eq!(s.platforms().platforms().len(), 9);
        assert_eq!(s.platforms().platforms()[0].pos, Vec2::new(400.0, 620.0));
        assert_eq!(s.player().pos, Vec2::new(150.0, 350.0));
        assert_eq!(s.score(), 0);
        // The seed platform never carries an enemy
        let seed = s.platforms().platforms()[0].id;
        assert!(s.enemies().enemies().iter().all(|e| e.platform != seed));
        // The second platform always carries coins
        let second = s.platforms().platforms()[1];
        assert!(
            s.coins()
                .coins()
                .iter()
                .any(|c| c.pos.x > second.left() && c.pos.x < second.right())
        );
        let events = s.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::PlatformSpawned(_)))
                .count(),
            9
        );
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_restart_rejected_while_running() {
        let mut s = session();
        assert_eq!(s.restart(), Err(SessionError::NotEnded));
        assert_eq!(s.run_count(), 1);
    }

    #[test]
    fn test_collect_coin_scores_once() {
        let mut s = session();
        let coin = s.coins().coins()[0].id;
        assert!(s.collect_coin(coin));
        assert!(!s.collect_coin(coin));
        assert_eq!(s.score(), 1);
        let score_events: Vec<_> = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ScoreChanged { .. }))
            .collect();
        assert_eq!(score_events, vec![GameEvent::ScoreChanged { score: 1 }]);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            min_gap: 900,
            ..Tuning::default()
        };
        assert!(RunSession::with_rng(GameRng::new(1), tuning, Vec2::new(1280.0, 720.0)).is_err());
        assert!(
            RunSession::with_rng(GameRng::new(1), Tuning::default(), Vec2::new(1280.0, 100.0))
                .is_err()
        );
    }
}
