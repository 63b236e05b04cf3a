use serde::{Deserialize, Serialize};
use std::fmt;

/// Isocenter coordinates in the phantom frame, in cm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Isocenter {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Isocenter {
    /// Creates a new Isocenter
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Isocenter {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Isocenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}) cm", self.x, self.y, self.z)
    }
}
