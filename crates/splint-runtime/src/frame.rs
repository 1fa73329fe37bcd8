//! Frame loop queues
//!
//! Two parking queues, one per scheduling phase. Draining takes a snapshot
//! of the queue: a routine that re-parks while its phase runs waits for the
//! next occurrence of that phase rather than being stepped twice.

use std::collections::VecDeque;

use crate::routine::{RoutineId, Wait};

/// Parking queues for the host's two scheduling phases
#[derive(Debug, Default)]
pub struct FrameLoop {
    next_tick: VecDeque<RoutineId>,
    fixed_step: VecDeque<RoutineId>,
}

impl FrameLoop {
    /// Create empty queues
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a routine until its wake condition fires
    pub fn park(&mut self, id: RoutineId, wait: Wait) {
        match wait {
            Wait::NextTick => self.next_tick.push_back(id),
            Wait::FixedStep => self.fixed_step.push_back(id),
        }
    }

    /// Take every routine waiting on the frame tick
    pub fn take_tick(&mut self) -> Vec<RoutineId> {
        self.next_tick.drain(..).collect()
    }

    /// Take every routine waiting on the fixed-step tick
    pub fn take_fixed(&mut self) -> Vec<RoutineId> {
        self.fixed_step.drain(..).collect()
    }

    /// Number of routines waiting on the frame tick
    pub fn waiting_on_tick(&self) -> usize {
        self.next_tick.len()
    }

    /// Number of routines waiting on the fixed-step tick
    pub fn waiting_on_fixed(&self) -> usize {
        self.fixed_step.len()
    }
}
