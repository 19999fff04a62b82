// Plain geometric and kinematic records shared by the vehicle, environment and controller.
//
// Screen axes throughout: x grows to the right, y grows downward.

use crate::utils::key_axis;

// Represents a point in track coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle, stored as top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    /// Builds a rectangle of the given size centred on `center`.
    pub fn from_center(center: Point, w: f64, h: f64) -> Self {
        Rect {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// AABB overlap test. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// Physical vehicle state: position, forward speed and heading in degrees.
///
/// Heading is measured clockwise from screen-up, so a positive yaw drifts
/// the vehicle to the right.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    pub v: f64,
    pub yaw: f64,
}

impl VehicleState {
    pub fn new(x: f64, y: f64, v: f64, yaw: f64) -> Self {
        VehicleState { x, y, v, yaw }
    }

    /// World displacement covered in one tick of length `dt` at the current
    /// speed and heading.
    pub fn displacement(&self, dt: f64) -> (f64, f64) {
        let yaw_rad = self.yaw.to_radians();
        (
            yaw_rad.sin() * self.v * dt,
            -yaw_rad.cos() * self.v * dt,
        )
    }
}

/// Normalised control effort, each component nominally in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlInput {
    pub accel_effort: f64,
    pub steer_effort: f64,
}

impl ControlInput {
    pub fn new(accel_effort: f64, steer_effort: f64) -> Self {
        ControlInput {
            accel_effort,
            steer_effort,
        }
    }

    pub fn from_keys(keys: KeyState) -> Self {
        ControlInput {
            accel_effort: key_axis(keys.up, keys.down),
            steer_effort: key_axis(keys.right, keys.left),
        }
    }
}

impl From<KeyState> for ControlInput {
    fn from(keys: KeyState) -> Self {
        ControlInput::from_keys(keys)
    }
}

// Four directional key states as polled by a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}
