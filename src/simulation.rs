use crate::config;
use crate::environment::{EnvironmentModel, EnvironmentParams, RoadRam};
use crate::error::{SimError, SimResult};
use crate::types::{ControlInput, Point, Rect, VehicleState};
use crate::utils::is_positive_finite;
use crate::vehicle::{AckermannSteer, Vehicle, VehicleModel, VehicleParameters};
use log::info;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Episode state machine. Both `Done*` states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeStatus {
    #[default]
    Running,
    DoneGoal,
    DoneCollision,
}

impl EpisodeStatus {
    pub fn is_done(self) -> bool {
        !matches!(self, EpisodeStatus::Running)
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub reward: f64,
    pub done: bool,
    pub status: EpisodeStatus,
}

/// Read-only snapshot for a front end to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub vehicle: Rect,
    pub obstacles: Vec<Rect>,
}

/// Assembles a [`Simulation`]. Both a vehicle and an environment must be supplied.
pub struct SimulationBuilder {
    vehicle: Option<Box<dyn VehicleModel>>,
    environment: Option<Box<dyn EnvironmentModel>>,
    initial_state: VehicleState,
    max_reward: f64,
    rng: Option<Box<dyn RngCore>>,
    episode: u32,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        SimulationBuilder {
            vehicle: None,
            environment: None,
            initial_state: VehicleState::default(),
            max_reward: config::MAX_REWARD,
            rng: None,
            episode: 1,
        }
    }
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicle(mut self, model: Box<dyn VehicleModel>) -> Self {
        self.vehicle = Some(model);
        self
    }

    pub fn environment(mut self, environment: Box<dyn EnvironmentModel>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn initial_state(mut self, state: VehicleState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn max_reward(mut self, max_reward: f64) -> Self {
        self.max_reward = max_reward;
        self
    }

    /// Injects the random source driving obstacle spawns.
    pub fn rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn seed(self, seed: u64) -> Self {
        self.rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Episode number used in log context.
    pub fn episode(mut self, episode: u32) -> Self {
        self.episode = episode;
        self
    }

    pub fn build(self) -> SimResult<Simulation> {
        let model = self.vehicle.ok_or_else(|| {
            SimError::Configuration("a vehicle is required to build a simulation".into())
        })?;
        let environment = self.environment.ok_or_else(|| {
            SimError::Configuration("an environment is required to build a simulation".into())
        })?;

        model.params().validate()?;
        model.params().validate_state(&self.initial_state)?;
        environment.params().validate()?;
        if !is_positive_finite(self.max_reward) {
            return Err(SimError::Configuration(format!(
                "max_reward must be positive and finite, got {}",
                self.max_reward
            )));
        }
        let vehicle_dt = model.params().dt;
        let environment_dt = environment.params().dt;
        if (vehicle_dt - environment_dt).abs() > f64::EPSILON {
            return Err(SimError::Configuration(format!(
                "vehicle dt ({}) and environment dt ({}) differ",
                vehicle_dt, environment_dt
            )));
        }

        let anchor = environment
            .params()
            .vehicle_anchor(model.params().height);
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::seed_from_u64(config::DEFAULT_SEED)));

        info!(
            "Episode {} initialised: vehicle={}, environment={}, max_reward={:.1}",
            self.episode,
            model.name(),
            environment.name(),
            self.max_reward
        );

        Ok(Simulation {
            vehicle: Vehicle::new(model, self.initial_state),
            environment,
            rng,
            anchor,
            max_reward: self.max_reward,
            reward: 0.0,
            status: EpisodeStatus::Running,
            episode: self.episode,
            tick: 0,
        })
    }
}

/// Builds the default Ackermann vehicle on a `RoadRam` road, sharing one `dt`.
pub fn initialize(
    vehicle_params: VehicleParameters,
    environment_params: EnvironmentParams,
    dt: f64,
) -> SimResult<Simulation> {
    let vehicle_params = VehicleParameters {
        dt,
        ..vehicle_params
    };
    let environment_params = EnvironmentParams {
        dt,
        ..environment_params
    };
    SimulationBuilder::new()
        .vehicle(Box::new(AckermannSteer::new(vehicle_params)))
        .environment(Box::new(RoadRam::new(environment_params)?))
        .build()
}

/// One episode: a vehicle driving through an obstacle field, one tick per `step`.
pub struct Simulation {
    vehicle: Vehicle,
    environment: Box<dyn EnvironmentModel>,
    rng: Box<dyn RngCore>,
    anchor: Point,
    max_reward: f64,
    reward: f64,
    status: EpisodeStatus,
    episode: u32,
    tick: u64,
}

impl Simulation {
    /// Runs one tick: vehicle, reward, goal check, environment, collision check.
    ///
    /// Returns [`SimError::EpisodeOver`] once the episode has reached a terminal state.
    /// If the environment update fails, the vehicle, reward and tick are left as they were.
    pub fn step(&mut self, control: ControlInput) -> SimResult<StepOutcome> {
        if self.status.is_done() {
            return Err(SimError::EpisodeOver(self.status));
        }

        let state = self.vehicle.preview(&control);
        let reward = self.vehicle.distance_after(&state) / config::DISTANCE_PER_REWARD;

        if reward > self.max_reward {
            self.commit(state, reward);
            return Ok(self.finish(EpisodeStatus::DoneGoal));
        }

        self.environment.observe(state);
        let report = self.environment.update(reward, self.rng.as_mut())?;
        self.commit(state, reward);
        crate::debug_episode!(
            episode = self.episode, tick = self.tick;
            "reward {:.3}, v {:.2}, yaw {:.2}, obstacles {} (+{}, -{})",
            self.reward,
            state.v,
            state.yaw,
            self.environment.obstacles().len(),
            report.spawned as u8,
            report.retired
        );

        if self.collides() {
            return Ok(self.finish(EpisodeStatus::DoneCollision));
        }

        Ok(self.outcome())
    }

    fn commit(&mut self, state: VehicleState, reward: f64) {
        self.vehicle.commit(state);
        self.reward = reward;
        self.tick += 1;
    }

    fn finish(&mut self, status: EpisodeStatus) -> StepOutcome {
        self.status = status;
        info!(
            "Episode {} ended with {:?} at tick {}, reward {:.2}",
            self.episode, status, self.tick, self.reward
        );
        self.outcome()
    }

    fn outcome(&self) -> StepOutcome {
        StepOutcome {
            reward: self.reward,
            done: self.status.is_done(),
            status: self.status,
        }
    }

    /// The vehicle's footprint on screen.
    pub fn vehicle_rect(&self) -> Rect {
        self.vehicle.rect_at(self.anchor)
    }

    pub fn collides(&self) -> bool {
        self.environment.collides(&self.vehicle_rect())
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            vehicle: self.vehicle_rect(),
            obstacles: self
                .environment
                .obstacles()
                .iter()
                .map(|o| o.rect())
                .collect(),
        }
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn vehicle_state(&self) -> VehicleState {
        self.vehicle.state()
    }

    pub fn distance_traveled(&self) -> f64 {
        self.vehicle.distance_traveled()
    }

    pub fn environment(&self) -> &dyn EnvironmentModel {
        self.environment.as_ref()
    }
}
