//! Epoch solutions
use crate::{
    navigation::DilutionOfPrecision,
    position::Position,
    prelude::{DMatrix, DVector, Epoch, SatelliteSet, Transitions, Vector3},
};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum SolutionType {
    /// Kalman state was corrected with a double difference
    /// position measurement.
    #[default]
    Measurement,
    /// Not enough vehicles (or numerical failure): the state was
    /// propagated using the dynamic model only.
    Propagation,
}

impl std::fmt::Display for SolutionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Measurement => write!(f, "FIX"),
            Self::Propagation => write!(f, "PROPAGATED"),
        }
    }
}

/// [EpochSolution] reported for each processed epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSolution {
    /// [Epoch] of resolution
    pub t: Epoch,
    /// [SolutionType]
    pub solution_type: SolutionType,
    /// Rover [Position]
    pub position: Position,
    /// Rover velocity, ECEF (m.s⁻¹), when part of the state.
    pub velocity_ecef_m_s: Option<Vector3<f64>>,
    /// Updated Kalman state
    pub state: DVector<f64>,
    /// Updated Kalman state covariance
    pub covariance: DMatrix<f64>,
    /// State predicted for next epoch
    pub prediction: DVector<f64>,
    /// Active vehicles
    pub active: SatelliteSet,
    /// Pivot, None when no fix was possible
    pub pivot: Option<u8>,
    /// Satellite [Transitions]
    pub transitions: Transitions,
    /// Geometric [DilutionOfPrecision], measurement epochs only.
    pub dop: Option<DilutionOfPrecision>,
    /// [DilutionOfPrecision] derived from the filter covariance.
    pub kalman_dop: DilutionOfPrecision,
}

impl EpochSolution {
    /// True if this solution was corrected by a measurement
    pub fn is_fix(&self) -> bool {
        self.solution_type == SolutionType::Measurement
    }
}

impl std::fmt::Display for EpochSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} active={} pivot={:?} kalman({})",
            self.t, self.solution_type, self.position, self.active, self.pivot, self.kalman_dop
        )?;
        if let Some(dop) = &self.dop {
            write!(f, " geometry({})", dop)?;
        }
        Ok(())
    }
}
