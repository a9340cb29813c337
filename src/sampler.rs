// Copyright (c) 2017-2021 Fabian Schuiki

//! The sampling state machine
//!
//! A sample is taken once per cycle of the sampling clock. The sampler waits
//! for the active edge of the clock, then for the opposite edge, and samples
//! there, such that data launched by the active edge has settled. Stop
//! requests are honored only while waiting for the active edge, so a cycle is
//! either sampled completely or not at all.

use crate::{error::Result, signal::Edge};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Drives the host simulation forward.
///
/// Hosts that deliver clock edges as events call
/// [`Waveform::on_edge`](crate::Waveform::on_edge) directly instead.
pub trait Scheduler {
    /// Advance the simulation to the next point in time at which signal values
    /// may have changed. Returns `false` once the simulation has ended.
    fn advance(&mut self) -> Result<bool>;
}

/// The state the sampler is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Not started yet; edges are ignored.
    Idle,
    /// Waiting for the active edge that opens a cycle.
    WaitPrimaryEdge,
    /// Waiting for the opposite edge at which the cycle is sampled.
    WaitSecondaryEdge,
    /// Stopped for good.
    Stopped,
}

/// A handle to stop a sampler from outside the context that drives it.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Ask the sampler to stop before its next cycle.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tracks the phase of the sampling clock.
#[derive(Debug)]
pub struct Sampler {
    edge: Edge,
    state: SamplerState,
    stop: StopHandle,
    cycles: usize,
}

impl Sampler {
    /// Create a sampler that opens a cycle on `edge`. The sampler starts out
    /// idle.
    pub fn new(edge: Edge) -> Sampler {
        Sampler {
            edge,
            state: SamplerState::Idle,
            stop: Default::default(),
            cycles: 0,
        }
    }

    /// Begin waiting for cycles. Returns `false` if the sampler was already
    /// started or has been stopped.
    pub fn start(&mut self) -> bool {
        if self.state == SamplerState::Idle && !self.poll_stop() {
            self.state = SamplerState::WaitPrimaryEdge;
            true
        } else {
            false
        }
    }

    /// A handle that can stop the sampler from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Apply a pending stop request if the sampler is between cycles. Returns
    /// whether the sampler is stopped.
    pub fn poll_stop(&mut self) -> bool {
        match self.state {
            SamplerState::Idle | SamplerState::WaitPrimaryEdge if self.stop.is_stop_requested() => {
                debug!("Sampler stopped after {} cycles", self.cycles);
                self.state = SamplerState::Stopped;
            }
            _ => (),
        }
        self.state == SamplerState::Stopped
    }

    /// Stop right away. A cycle in flight is abandoned; nothing of it has been
    /// recorded yet.
    pub fn halt(&mut self) {
        self.stop.stop();
        if self.state != SamplerState::Stopped {
            debug!("Sampler halted after {} cycles", self.cycles);
            self.state = SamplerState::Stopped;
        }
    }

    /// Feed a clock transition to the sampler. Returns `true` if the
    /// transition completes a cycle and the signals should be sampled now.
    pub fn on_edge(&mut self, edge: Edge) -> bool {
        if self.poll_stop() {
            return false;
        }
        match self.state {
            SamplerState::WaitPrimaryEdge if edge == self.edge => {
                self.state = SamplerState::WaitSecondaryEdge;
                false
            }
            SamplerState::WaitSecondaryEdge if edge == self.edge.opposite() => {
                self.state = SamplerState::WaitPrimaryEdge;
                self.cycles += 1;
                true
            }
            _ => false,
        }
    }

    /// The edge that opens a cycle.
    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// The current state.
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// The number of complete cycles seen, whether or not they were recorded.
    pub fn cycles(&self) -> usize {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_started() {
        let mut s = Sampler::new(Edge::Rising);
        assert!(!s.on_edge(Edge::Rising));
        assert!(!s.on_edge(Edge::Falling));
        assert!(s.start());
        assert!(!s.start());
        assert!(!s.on_edge(Edge::Rising));
        assert!(s.on_edge(Edge::Falling));
        assert_eq!(s.cycles(), 1);
    }

    #[test]
    fn samples_on_opposite_edge() {
        let mut s = Sampler::new(Edge::Falling);
        s.start();
        assert!(!s.on_edge(Edge::Rising));
        assert_eq!(s.state(), SamplerState::WaitPrimaryEdge);
        assert!(!s.on_edge(Edge::Falling));
        assert_eq!(s.state(), SamplerState::WaitSecondaryEdge);
        assert!(s.on_edge(Edge::Rising));
        assert_eq!(s.state(), SamplerState::WaitPrimaryEdge);
    }

    #[test]
    fn stop_takes_effect_between_cycles() {
        let mut s = Sampler::new(Edge::Rising);
        let handle = s.stop_handle();
        s.start();
        assert!(!s.on_edge(Edge::Rising));
        handle.stop();
        // The cycle in flight still completes.
        assert!(!s.poll_stop());
        assert!(s.on_edge(Edge::Falling));
        assert!(s.poll_stop());
        assert!(!s.on_edge(Edge::Rising));
        assert!(!s.on_edge(Edge::Falling));
        assert_eq!(s.state(), SamplerState::Stopped);
        assert!(!s.start());
        assert_eq!(s.cycles(), 1);
    }

    #[test]
    fn halt_abandons_cycle_in_flight() {
        let mut s = Sampler::new(Edge::Rising);
        s.start();
        s.on_edge(Edge::Rising);
        s.halt();
        assert!(!s.on_edge(Edge::Falling));
        assert_eq!(s.cycles(), 0);
        assert!(s.stop_handle().is_stop_requested());
    }

    #[test]
    fn stop_from_another_thread() {
        let mut s = Sampler::new(Edge::Rising);
        let handle = s.stop_handle();
        s.start();
        std::thread::spawn(move || handle.stop()).join().unwrap();
        assert!(!s.on_edge(Edge::Rising));
        assert_eq!(s.state(), SamplerState::Stopped);
    }
}
