use crate::prelude::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rover [DynamicModel], defines the dimension of the Kalman state
/// (per axis: position, then velocity, then acceleration).
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DynamicModel {
    /// Static rover: position only.
    #[cfg_attr(feature = "serde", serde(alias = "static"))]
    Static,
    /// Constant velocity: position and velocity.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "constant-velocity"))]
    ConstantVelocity,
    /// Constant acceleration: position, velocity and acceleration.
    #[cfg_attr(feature = "serde", serde(alias = "constant-acceleration"))]
    ConstantAcceleration,
}

impl DynamicModel {
    /// Number of states per axis
    pub fn order(&self) -> usize {
        match self {
            Self::Static => 1,
            Self::ConstantVelocity => 2,
            Self::ConstantAcceleration => 3,
        }
    }

    /// Total Kalman state dimension
    pub fn dimension(&self) -> usize {
        3 * self.order()
    }

    /// True if velocity is part of the state
    pub fn has_velocity(&self) -> bool {
        self.order() > 1
    }
}

impl std::fmt::Display for DynamicModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::ConstantVelocity => write!(f, "constant-velocity"),
            Self::ConstantAcceleration => write!(f, "constant-acceleration"),
        }
    }
}

impl std::str::FromStr for DynamicModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" | "1" => Ok(Self::Static),
            "constant-velocity" | "velocity" | "2" => Ok(Self::ConstantVelocity),
            "constant-acceleration" | "acceleration" | "3" => Ok(Self::ConstantAcceleration),
            _ => Err(Error::UnknownDynamicModel),
        }
    }
}
