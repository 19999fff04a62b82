//! Default constants for the road simulation.

// Vehicle dynamics
pub const ACCEL_MAX: f64 = 100.0; // Units/s^2 at full accelerator effort
pub const VEL_MAX: f64 = 200.0; // Units/s
pub const STEER_MAX: f64 = 45.0; // Degrees, bounds both steering deflection and yaw
pub const STEER_MAX_LIMIT: f64 = 90.0; // Exclusive upper bound accepted for steer_max
pub const STEER_RATE: f64 = 4.0; // Degrees/s at full steering effort
pub const WHEEL_BASE: f64 = 0.48;
pub const FRICTION: f64 = 0.0; // Velocity-proportional drag coefficient
pub const DT: f64 = 0.1; // Seconds per tick

// Vehicle footprint (screen units)
pub const VEHICLE_WIDTH: f64 = 20.0;
pub const VEHICLE_HEIGHT: f64 = 40.0;
pub const VEHICLE_BOTTOM_MARGIN: f64 = 20.0; // Gap between the vehicle and the bottom edge

// Track / environment pane
pub const TRACK_WIDTH: f64 = 400.0;
pub const TRACK_HEIGHT: f64 = 450.0;
pub const DELETION_BAND_HEIGHT: f64 = 20.0; // Height of the retirement band below the track

// Obstacle spawning
pub const MAX_OBJS: usize = 10;
pub const OBSTACLE_MIN_WIDTH: u32 = 10;
pub const OBSTACLE_MAX_WIDTH: u32 = 40;
pub const OBSTACLE_MIN_HEIGHT: u32 = 10;
pub const OBSTACLE_MAX_HEIGHT: u32 = 20;
pub const SPAWN_MIN_Y: i32 = -40; // Spawn centres sit above the visible bound
pub const SPAWN_MAX_Y: i32 = -20;
pub const SPAWN_DRAW_MAX: u32 = 100; // Spawn draw is uniform over [0, SPAWN_DRAW_MAX]
pub const SPAWN_REWARD_GAP: f64 = 1.0; // Minimum reward gained since the last spawn

// Episode rules
pub const MAX_REWARD: f64 = 100.0;
pub const DISTANCE_PER_REWARD: f64 = 100.0; // reward = distance_traveled / DISTANCE_PER_REWARD

// Headless runner
pub const DEFAULT_EPISODES: u32 = 1;
pub const DEFAULT_SEED: u64 = 0;
pub const MAX_TICKS: u64 = 10_000; // Safety cap on ticks per episode
