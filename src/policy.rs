//! Headless control sources standing in for a keyboard.

use crate::types::{KeyState, VehicleState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the key states for the next tick.
pub trait Policy {
    fn name(&self) -> &'static str;

    fn keys(&mut self, state: &VehicleState, tick: u64) -> KeyState;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PolicyKind {
    /// Hold the accelerator, never steer
    #[default]
    Cruise,
    /// Hold the accelerator and alternate steering direction
    Weave,
    /// Press each key at random
    Random,
}

impl PolicyKind {
    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Cruise => Box::new(Cruise),
            PolicyKind::Weave => Box::new(Weave::new(WEAVE_PERIOD)),
            PolicyKind::Random => Box::new(RandomKeys::new(seed)),
        }
    }
}

const WEAVE_PERIOD: u64 = 15; // Ticks per steering direction

#[derive(Debug, Clone, Copy)]
pub struct Cruise;

impl Policy for Cruise {
    fn name(&self) -> &'static str {
        "cruise"
    }

    fn keys(&mut self, _state: &VehicleState, _tick: u64) -> KeyState {
        KeyState {
            up: true,
            ..KeyState::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Weave {
    period: u64,
}

impl Weave {
    pub fn new(period: u64) -> Self {
        Weave {
            period: period.max(1),
        }
    }
}

impl Policy for Weave {
    fn name(&self) -> &'static str {
        "weave"
    }

    fn keys(&mut self, _state: &VehicleState, tick: u64) -> KeyState {
        let right = (tick / self.period) % 2 == 0;
        KeyState {
            up: true,
            down: false,
            left: !right,
            right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomKeys {
    rng: StdRng,
}

impl RandomKeys {
    pub fn new(seed: u64) -> Self {
        RandomKeys {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomKeys {
    fn name(&self) -> &'static str {
        "random"
    }

    fn keys(&mut self, _state: &VehicleState, _tick: u64) -> KeyState {
        // Biased towards the accelerator so episodes make progress
        KeyState {
            up: self.rng.gen_bool(0.7),
            down: self.rng.gen_bool(0.1),
            left: self.rng.gen_bool(0.3),
            right: self.rng.gen_bool(0.3),
        }
    }
}
