use crate::config;
use crate::error::{SimError, SimResult};
use crate::types::{Point, Rect, VehicleState};
use crate::utils::is_positive_finite;
use rand::{Rng, RngCore};
use std::fmt;

// Represents an obstacle on the road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Point, // Centre in screen units
    pub width: f64,
    pub height: f64,
}

impl Obstacle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Obstacle {
            position,
            width,
            height,
        }
    }

    /// Random obstacle just above the visible pane, somewhere across the track.
    pub fn random_offscreen(rng: &mut dyn RngCore, track_width: f64) -> Self {
        let width = rng.gen_range(config::OBSTACLE_MIN_WIDTH..=config::OBSTACLE_MAX_WIDTH) as f64;
        let height =
            rng.gen_range(config::OBSTACLE_MIN_HEIGHT..=config::OBSTACLE_MAX_HEIGHT) as f64;
        let x = rng.gen_range(0.0..=track_width);
        let y = rng.gen_range(config::SPAWN_MIN_Y..=config::SPAWN_MAX_Y) as f64;
        Obstacle::new(Point::new(x, y), width, height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.width, self.height)
    }
}

/// Geometry and capacity of the obstacle field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentParams {
    pub width: f64,  // Track width
    pub height: f64, // Visible pane height
    pub max_objs: usize,
    pub dt: f64,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        EnvironmentParams {
            width: config::TRACK_WIDTH,
            height: config::TRACK_HEIGHT,
            max_objs: config::MAX_OBJS,
            dt: config::DT,
        }
    }
}

impl EnvironmentParams {
    pub fn validate(&self) -> SimResult<()> {
        for (name, value) in [("width", self.width), ("height", self.height), ("dt", self.dt)] {
            if !is_positive_finite(value) {
                return Err(SimError::Configuration(format!(
                    "environment parameter `{}` must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// The visible track pane.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Band just below the visible pane, spanning the track width.
    pub fn deletion_boundary(&self) -> Rect {
        Rect::new(0.0, self.height, self.width, config::DELETION_BAND_HEIGHT)
    }

    /// Screen anchor of the vehicle: bottom-centre of the track.
    pub fn vehicle_anchor(&self, vehicle_height: f64) -> Point {
        Point::new(
            self.width / 2.0,
            self.height - config::VEHICLE_BOTTOM_MARGIN - vehicle_height / 2.0,
        )
    }
}

// Crossed when touching the band or already past its top edge
fn has_crossed(rect: &Rect, boundary: &Rect) -> bool {
    rect.intersects(boundary) || rect.top() >= boundary.top()
}

/// What a single environment update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateReport {
    pub retired: usize,
    pub spawned: bool,
}

/// An obstacle field that moves relative to the vehicle.
pub trait EnvironmentModel: fmt::Debug {
    fn name(&self) -> &'static str;

    fn params(&self) -> &EnvironmentParams;

    /// Records the vehicle state the next update works from.
    fn observe(&mut self, state: VehicleState);

    /// Advances, retires and spawns obstacles for one tick.
    fn update(&mut self, reward: f64, rng: &mut dyn RngCore) -> SimResult<UpdateReport>;

    /// True iff any live obstacle overlaps `rect`.
    fn collides(&self, rect: &Rect) -> bool;

    fn obstacles(&self) -> &[Obstacle];

    /// Obstacles overlapping the visible pane.
    fn in_bounds(&self) -> Vec<&Obstacle> {
        let bounds = self.params().bounds();
        self.obstacles()
            .iter()
            .filter(|o| o.rect().intersects(&bounds))
            .collect()
    }
}

/// Endless road: obstacles scroll past the vehicle and are spawned more
/// often the further the vehicle has travelled.
#[derive(Debug, Clone)]
pub struct RoadRam {
    params: EnvironmentParams,
    deletion_boundary: Rect,
    obstacles: Vec<Obstacle>,
    vehicle_state: Option<VehicleState>,
    last_reward_since_obs: f64,
}

impl RoadRam {
    pub fn new(params: EnvironmentParams) -> SimResult<Self> {
        params.validate()?;
        Ok(RoadRam {
            params,
            deletion_boundary: params.deletion_boundary(),
            obstacles: Vec::with_capacity(params.max_objs),
            vehicle_state: None,
            last_reward_since_obs: 0.0,
        })
    }

    /// Adds an obstacle if there is capacity left. Returns whether it was added.
    pub fn insert(&mut self, obstacle: Obstacle) -> bool {
        if self.obstacles.len() >= self.params.max_objs {
            return false;
        }
        self.obstacles.push(obstacle);
        true
    }

    pub fn deletion_boundary(&self) -> Rect {
        self.deletion_boundary
    }

    pub fn last_reward_since_obs(&self) -> f64 {
        self.last_reward_since_obs
    }

    pub fn vehicle_state(&self) -> Option<VehicleState> {
        self.vehicle_state
    }

    // Scrolls every obstacle opposite to the vehicle's displacement
    fn advance(&mut self, state: &VehicleState) {
        let (dx, dy) = state.displacement(self.params.dt);
        for obstacle in self.obstacles.iter_mut() {
            obstacle.position.x -= dx;
            obstacle.position.y -= dy;
        }
    }

    fn retire(&mut self) -> usize {
        let before = self.obstacles.len();
        let boundary = self.deletion_boundary;
        self.obstacles.retain(|o| !has_crossed(&o.rect(), &boundary));
        before - self.obstacles.len()
    }

    fn try_spawn(&mut self, reward: f64, rng: &mut dyn RngCore) -> bool {
        if self.obstacles.len() >= self.params.max_objs {
            return false;
        }
        let draw = rng.gen_range(0..=config::SPAWN_DRAW_MAX) as f64;
        if draw < reward && reward - self.last_reward_since_obs > config::SPAWN_REWARD_GAP {
            let obstacle = Obstacle::random_offscreen(rng, self.params.width);
            crate::debug_environment!(
                "Spawned {:.0}x{:.0} obstacle at ({:.1}, {:.1}), reward {:.2}",
                obstacle.width,
                obstacle.height,
                obstacle.position.x,
                obstacle.position.y,
                reward
            );
            self.obstacles.push(obstacle);
            self.last_reward_since_obs = reward;
            return true;
        }
        false
    }
}

impl EnvironmentModel for RoadRam {
    fn name(&self) -> &'static str {
        "road_ram"
    }

    fn params(&self) -> &EnvironmentParams {
        &self.params
    }

    fn observe(&mut self, state: VehicleState) {
        self.vehicle_state = Some(state);
    }

    fn update(&mut self, reward: f64, rng: &mut dyn RngCore) -> SimResult<UpdateReport> {
        let state = self.vehicle_state.ok_or_else(|| {
            SimError::InvalidState("environment updated before any vehicle state was observed".into())
        })?;

        self.advance(&state);
        let retired = self.retire();
        if retired > 0 {
            crate::debug_environment!(
                "Retired {} obstacle(s), {} live",
                retired,
                self.obstacles.len()
            );
        }
        let spawned = self.try_spawn(reward, rng);

        Ok(UpdateReport { retired, spawned })
    }

    fn collides(&self, rect: &Rect) -> bool {
        self.obstacles.iter().any(|o| o.rect().intersects(rect))
    }

    fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Rng stub that always yields the same word, so range draws are pinned low
    struct ConstRng(u64);

    impl RngCore for ConstRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0 as u8);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn road() -> RoadRam {
        RoadRam::new(EnvironmentParams::default()).unwrap()
    }

    fn moving_state(v: f64) -> VehicleState {
        VehicleState::new(0.0, 0.0, v, 0.0)
    }

    #[test]
    fn test_update_before_observe_is_invalid() {
        let mut env = road();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            env.update(10.0, &mut rng),
            Err(SimError::InvalidState(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = EnvironmentParams {
            width: 0.0,
            ..EnvironmentParams::default()
        };
        assert!(matches!(
            RoadRam::new(params),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_obstacles_scroll_opposite_to_vehicle() {
        let mut env = road();
        env.insert(Obstacle::new(Point::new(200.0, 100.0), 20.0, 10.0));
        env.observe(moving_state(100.0));
        let mut rng = StdRng::seed_from_u64(1);
        env.update(0.0, &mut rng).unwrap();

        // Vehicle moved 10 units up the screen, the obstacle moves 10 down
        let obstacle = env.obstacles()[0];
        assert!((obstacle.position.x - 200.0).abs() < 1e-9);
        assert!((obstacle.position.y - 110.0).abs() < 1e-9);

        // Heading right slides obstacles left
        env.observe(VehicleState::new(0.0, 0.0, 100.0, 90.0));
        env.update(0.0, &mut rng).unwrap();
        let obstacle = env.obstacles()[0];
        assert!((obstacle.position.x - 190.0).abs() < 1e-9);
        assert!((obstacle.position.y - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_crossing_deletion_boundary_is_retired() {
        let mut env = road();
        // Bottom edge at 448, boundary starts at 450
        env.insert(Obstacle::new(Point::new(200.0, 443.0), 20.0, 10.0));
        env.insert(Obstacle::new(Point::new(200.0, 100.0), 20.0, 10.0));
        env.observe(moving_state(50.0));

        let mut rng = StdRng::seed_from_u64(7);
        let report = env.update(0.0, &mut rng).unwrap();
        assert_eq!(report.retired, 1);
        assert_eq!(env.obstacles().len(), 1);
        assert!(!env.obstacles()[0].rect().intersects(&env.deletion_boundary()));

        // Never comes back
        for _ in 0..5 {
            env.update(0.0, &mut rng).unwrap();
            assert!(env.obstacles().iter().all(|o| o.position.y < 450.0));
        }
    }

    #[test]
    fn test_obstacle_past_boundary_off_track_is_retired() {
        let mut env = road();
        env.insert(Obstacle::new(Point::new(-500.0, 600.0), 20.0, 10.0));
        env.observe(moving_state(0.0));
        let mut rng = StdRng::seed_from_u64(3);
        let report = env.update(0.0, &mut rng).unwrap();
        assert_eq!(report.retired, 1);
        assert!(env.obstacles().is_empty());
    }

    #[test]
    fn test_no_spawn_at_zero_reward() {
        let mut env = road();
        let mut rng = StdRng::seed_from_u64(42);
        env.observe(moving_state(0.0));
        for _ in 0..500 {
            let report = env.update(0.0, &mut rng).unwrap();
            assert!(!report.spawned);
        }
        assert!(env.obstacles().is_empty());
    }

    #[test]
    fn test_spawn_gated_by_reward_gap() {
        let mut env = road();
        // Draw always 0, so only the reward gap decides
        let mut rng = ConstRng(0);
        env.observe(moving_state(0.0));

        assert!(!env.update(1.0, &mut rng).unwrap().spawned);
        assert!(env.update(1.5, &mut rng).unwrap().spawned);
        assert!((env.last_reward_since_obs() - 1.5).abs() < 1e-9);

        // Gap of exactly 1 is not enough
        assert!(!env.update(2.5, &mut rng).unwrap().spawned);
        assert!(env.update(2.6, &mut rng).unwrap().spawned);
        assert_eq!(env.obstacles().len(), 2);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let params = EnvironmentParams {
            max_objs: 3,
            ..EnvironmentParams::default()
        };
        let mut env = RoadRam::new(params).unwrap();
        let mut rng = ConstRng(0);
        env.observe(moving_state(0.0));

        let mut reward = 0.0;
        for _ in 0..50 {
            reward += 2.0;
            env.update(reward, &mut rng).unwrap();
            assert!(env.obstacles().len() <= 3);
        }
        assert_eq!(env.obstacles().len(), 3);
        assert!(!env.insert(Obstacle::new(Point::new(0.0, 0.0), 10.0, 10.0)));
    }

    #[test]
    fn test_spawned_obstacles_start_offscreen() {
        let mut env = road();
        let mut rng = StdRng::seed_from_u64(99);
        env.observe(moving_state(0.0));

        let mut reward: f64 = 0.0;
        for _ in 0..2000 {
            reward += 0.5;
            env.update(reward.min(100.0), &mut rng).unwrap();
        }
        assert!(!env.obstacles().is_empty());
        for obstacle in env.obstacles() {
            assert!(obstacle.rect().bottom() <= 0.0);
            assert!(obstacle.position.x >= 0.0 && obstacle.position.x <= 400.0);
            assert!(obstacle.width >= 10.0 && obstacle.width <= 40.0);
            assert!(obstacle.height >= 10.0 && obstacle.height <= 20.0);
        }
        assert!(env.in_bounds().is_empty());
    }

    #[test]
    fn test_collides() {
        let mut env = road();
        let vehicle = Rect::new(190.0, 390.0, 20.0, 40.0);
        assert!(!env.collides(&vehicle));

        env.insert(Obstacle::new(Point::new(100.0, 100.0), 10.0, 10.0));
        assert!(!env.collides(&vehicle));

        env.insert(Obstacle::new(Point::new(205.0, 392.0), 10.0, 10.0));
        assert!(env.collides(&vehicle));
    }

    #[test]
    fn test_in_bounds() {
        let mut env = road();
        env.insert(Obstacle::new(Point::new(100.0, 100.0), 10.0, 10.0));
        env.insert(Obstacle::new(Point::new(100.0, -30.0), 10.0, 10.0));
        assert_eq!(env.in_bounds().len(), 1);
    }
}
