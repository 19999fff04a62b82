use crate::config;
use crate::error::{SimError, SimResult};
use crate::types::{ControlInput, Rect, VehicleState};
use crate::utils::{clamp_symmetric, is_positive_finite};
use std::fmt;

/// Static per-vehicle constants. These bound every tick of the dynamics model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleParameters {
    pub accel_max: f64,  // Units/s^2 at full effort
    pub vel_max: f64,    // Units/s
    pub steer_max: f64,  // Degrees, bounds deflection and yaw
    pub steer_rate: f64, // Degrees/s at full effort
    pub wheel_base: f64,
    pub friction: f64, // Drag coefficient, 0 disables
    pub dt: f64,       // Seconds per tick
    pub width: f64,    // Footprint on screen
    pub height: f64,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        VehicleParameters {
            accel_max: config::ACCEL_MAX,
            vel_max: config::VEL_MAX,
            steer_max: config::STEER_MAX,
            steer_rate: config::STEER_RATE,
            wheel_base: config::WHEEL_BASE,
            friction: config::FRICTION,
            dt: config::DT,
            width: config::VEHICLE_WIDTH,
            height: config::VEHICLE_HEIGHT,
        }
    }
}

impl VehicleParameters {
    /// Rejects parameter sets the dynamics cannot integrate.
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("dt", self.dt),
            ("wheel_base", self.wheel_base),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in positive {
            if !is_positive_finite(value) {
                return Err(SimError::Configuration(format!(
                    "vehicle parameter `{}` must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("accel_max", self.accel_max),
            ("vel_max", self.vel_max),
            ("steer_max", self.steer_max),
            ("steer_rate", self.steer_rate),
            ("friction", self.friction),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::Configuration(format!(
                    "vehicle parameter `{}` must be non-negative and finite, got {}",
                    name, value
                )));
            }
        }

        // tan(delta) diverges at a right angle
        if self.steer_max >= config::STEER_MAX_LIMIT {
            return Err(SimError::Configuration(format!(
                "vehicle parameter `steer_max` must be below {} degrees, got {}",
                config::STEER_MAX_LIMIT,
                self.steer_max
            )));
        }
        Ok(())
    }

    /// Rejects a starting state outside the speed and heading bounds.
    pub fn validate_state(&self, state: &VehicleState) -> SimResult<()> {
        let finite = [state.x, state.y, state.v, state.yaw]
            .iter()
            .all(|value| value.is_finite());
        if !finite {
            return Err(SimError::Configuration(format!(
                "initial vehicle state must be finite, got {:?}",
                state
            )));
        }
        if state.v < 0.0 || state.v > self.vel_max {
            return Err(SimError::Configuration(format!(
                "initial speed {} outside [0, {}]",
                state.v, self.vel_max
            )));
        }
        if state.yaw.abs() > self.steer_max {
            return Err(SimError::Configuration(format!(
                "initial yaw {} outside [-{}, {}]",
                state.yaw, self.steer_max, self.steer_max
            )));
        }
        Ok(())
    }
}

/// A kinematic model mapping a prior state and control effort to the next state.
pub trait VehicleModel: fmt::Debug {
    fn name(&self) -> &'static str;

    fn params(&self) -> &VehicleParameters;

    /// Advances `state` by one tick. Never fails; out-of-range inputs are clamped.
    fn advance(&self, state: &VehicleState, control: &ControlInput) -> VehicleState;
}

/// Selects a vehicle model at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum VehicleKind {
    #[default]
    Ackermann,
    Parked,
}

impl VehicleKind {
    pub fn build(self, params: VehicleParameters) -> Box<dyn VehicleModel> {
        match self {
            VehicleKind::Ackermann => Box::new(AckermannSteer::new(params)),
            VehicleKind::Parked => Box::new(Parked::new(params)),
        }
    }
}

// Non-finite efforts count as released controls
fn sanitize_effort(effort: f64) -> f64 {
    if effort.is_finite() {
        effort.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Front-steered bicycle model.
///
/// The steering effort sets an instantaneous wheel deflection for the tick,
/// and the heading integrates the resulting yaw rate `v * tan(delta) / L`.
#[derive(Debug, Clone)]
pub struct AckermannSteer {
    params: VehicleParameters,
}

impl AckermannSteer {
    pub fn new(params: VehicleParameters) -> Self {
        AckermannSteer { params }
    }

    /// Wheel deflection in degrees for the given steering effort.
    pub fn steering_deflection(&self, steer_effort: f64) -> f64 {
        let p = &self.params;
        clamp_symmetric(
            p.steer_rate * sanitize_effort(steer_effort) * p.dt,
            p.steer_max,
        )
    }
}

impl VehicleModel for AckermannSteer {
    fn name(&self) -> &'static str {
        "ackermann"
    }

    fn params(&self) -> &VehicleParameters {
        &self.params
    }

    fn advance(&self, state: &VehicleState, control: &ControlInput) -> VehicleState {
        let p = &self.params;

        // 1. Longitudinal: bounded acceleration minus drag, speed kept in [0, vel_max]
        let accel = p.accel_max * sanitize_effort(control.accel_effort) - p.friction * state.v;
        let new_v = (state.v + accel * p.dt).clamp(0.0, p.vel_max);

        // 2. Steering deflection for this tick
        let delta = self.steering_deflection(control.steer_effort);

        // 3. Heading integrates the bicycle yaw rate
        let yaw_rate = (new_v * delta.to_radians().tan() / p.wheel_base).to_degrees();
        let new_yaw = clamp_symmetric(state.yaw + yaw_rate * p.dt, p.steer_max);

        // 4. Position follows the new speed and heading
        let next = VehicleState::new(state.x, state.y, new_v, new_yaw);
        let (dx, dy) = next.displacement(p.dt);

        crate::debug_vehicle!(
            "v {:.2} -> {:.2}, delta {:.3}, yaw {:.2} -> {:.2}",
            state.v,
            new_v,
            delta,
            state.yaw,
            new_yaw
        );

        VehicleState {
            x: state.x + dx,
            y: state.y + dy,
            ..next
        }
    }
}

/// Stationary demonstration vehicle. Ignores control and never moves.
#[derive(Debug, Clone)]
pub struct Parked {
    params: VehicleParameters,
}

impl Parked {
    pub fn new(params: VehicleParameters) -> Self {
        Parked { params }
    }
}

impl VehicleModel for Parked {
    fn name(&self) -> &'static str {
        "parked"
    }

    fn params(&self) -> &VehicleParameters {
        &self.params
    }

    fn advance(&self, state: &VehicleState, _control: &ControlInput) -> VehicleState {
        VehicleState { v: 0.0, ..*state }
    }
}

/// The vehicle entity: a model plus the state it owns.
#[derive(Debug)]
pub struct Vehicle {
    model: Box<dyn VehicleModel>,
    state: VehicleState,
    distance_traveled: f64,
}

impl Vehicle {
    pub fn new(model: Box<dyn VehicleModel>, initial: VehicleState) -> Self {
        Vehicle {
            model,
            state: initial,
            distance_traveled: 0.0,
        }
    }

    /// Applies one tick of control and accumulates the distance covered.
    pub fn sim(&mut self, control: &ControlInput) -> VehicleState {
        let next = self.preview(control);
        self.commit(next);
        self.state
    }

    /// The state one tick of `control` would produce, without applying it.
    pub fn preview(&self, control: &ControlInput) -> VehicleState {
        self.model.advance(&self.state, control)
    }

    /// Distance covered once `next` is committed.
    pub fn distance_after(&self, next: &VehicleState) -> f64 {
        self.distance_traveled + next.v * self.model.params().dt
    }

    pub fn commit(&mut self, next: VehicleState) {
        self.distance_traveled = self.distance_after(&next);
        self.state = next;
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn distance_traveled(&self) -> f64 {
        self.distance_traveled
    }

    pub fn params(&self) -> &VehicleParameters {
        self.model.params()
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    /// Footprint centred on a screen anchor.
    pub fn rect_at(&self, anchor: crate::types::Point) -> Rect {
        let p = self.model.params();
        Rect::from_center(anchor, p.width, p.height)
    }
}
