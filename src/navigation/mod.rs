//! Navigation: double difference measurement and Kalman filter
use crate::{
    geometry::SatelliteGeometry,
    prelude::{Epoch, Error, Matrix3, Observable, Observation, SatelliteSet, Vector3},
};

mod dop;
mod dynamics;
mod kalman;

pub use dop::DilutionOfPrecision;

pub(crate) use dynamics::Dynamics;
pub(crate) use kalman::{KfEstimate, Kalman};

/// [DoubleDifferenceInput] proposed to the [DoubleDifferenceSolver]
#[derive(Debug, Clone)]
pub struct DoubleDifferenceInput<'a> {
    /// Sampling [Epoch]
    pub t: Epoch,
    /// Approximate rover position, ECEF (m)
    pub approx_rover_ecef_m: Vector3<f64>,
    /// Master station position, ECEF (m)
    pub master_ecef_m: Vector3<f64>,
    /// Code [Observable] in use
    pub observable: Observable,
    /// All [Observation]s of this epoch (rover and master ranges and SNR)
    pub observations: &'a [Observation],
    /// [SatelliteGeometry] of each active vehicle, sorted by PRN
    pub geometry: &'a [SatelliteGeometry],
    /// Active vehicles (pivot included)
    pub active: SatelliteSet,
    /// Pivot PRN
    pub pivot: u8,
}

impl DoubleDifferenceInput<'_> {
    /// Returns [Observation] for this active PRN
    pub fn observation(&self, prn: u8) -> Option<&Observation> {
        self.observations.iter().find(|ob| ob.sv.prn == prn)
    }

    /// Returns [SatelliteGeometry] for this active PRN
    pub fn satellite(&self, prn: u8) -> Option<&SatelliteGeometry> {
        self.geometry.iter().find(|sat| sat.sv.prn == prn)
    }
}

/// Rover position measured by the [DoubleDifferenceSolver]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleDifferenceSolution {
    /// Rover position, ECEF (m)
    pub position_ecef_m: Vector3<f64>,
    /// Position covariance, ECEF (m²). None when the geometry
    /// did not allow forming it.
    pub covariance: Option<Matrix3<f64>>,
    /// Geometric [DilutionOfPrecision]
    pub dop: DilutionOfPrecision,
}

/// [DoubleDifferenceSolver] measures the rover position from code
/// double differences, formed against the pivot vehicle.
pub trait DoubleDifferenceSolver {
    fn solve(&self, input: &DoubleDifferenceInput) -> Result<DoubleDifferenceSolution, Error>;
}
