//! One-shot deferred effects on the simulation clock
//!
//! Nothing here blocks: effects are queued with a due time and handed back
//! from `advance` once the clock passes it. Cancelled effects never come back.

use serde::{Deserialize, Serialize};

/// Identifies a scheduled effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending<E> {
    handle: TimerHandle,
    due_us: u64,
    effect: E,
}

/// Queue of one-shot effects keyed by simulation time (microseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredQueue<E> {
    now_us: u64,
    next_handle: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for DeferredQueue<E> {
    fn default() -> Self {
        Self {
            now_us: 0,
            next_handle: 1,
            pending: Vec::new(),
        }
    }
}

impl<E> DeferredQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `effect` once `delay_ms` of simulation time has passed
    pub fn schedule(&mut self, delay_ms: u64, effect: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            due_us: self.now_us + delay_ms * 1000,
            effect,
        });
        handle
    }

    /// Drop a pending effect. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Drop every pending effect
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move the clock forward and return effects now due, earliest first
    pub fn advance(&mut self, dt_us: u64) -> Vec<E> {
        self.now_us += dt_us;
        let now = self.now_us;
        if !self.pending.iter().any(|p| p.due_us <= now) {
            return Vec::new();
        }

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_us <= now);
        self.pending = waiting;
        due.sort_by_key(|p| (p.due_us, p.handle.0));
        due.into_iter().map(|p| p.effect).collect()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Simulation time in microseconds
    pub fn now_us(&self) -> u64 {
        self.now_us
    }
}
