#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod bancroft;
mod cfg;
mod constants;
mod context;
mod error;
mod frame;
mod geometry;
mod navigation;
mod observation;
mod position;
mod satellite;
mod selection;
mod solutions;
mod solver;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::bancroft::Bancroft;
    pub use crate::cfg::{Config, DynamicModel, Observable};
    pub use crate::constants::{EARTH_ANGULAR_VEL_RAD, MAX_SAT, SPEED_OF_LIGHT_M_S};
    pub use crate::context::FilterContext;
    pub use crate::error::Error;
    pub use crate::frame::{covariance_global_to_local, covariance_local_to_global};
    pub use crate::geometry::{CorrectedSatellite, GeometryProvider, SatelliteGeometry, Topocentric};
    pub use crate::navigation::{
        DilutionOfPrecision, DoubleDifferenceInput, DoubleDifferenceSolution,
        DoubleDifferenceSolver,
    };
    pub use crate::observation::{Carrier, Observation, ObservationEpoch, Ranging};
    pub use crate::position::Position;
    pub use crate::satellite::{SatelliteConfiguration, SatelliteSet, Transitions};
    pub use crate::selection::{SatelliteSetManager, Selection};
    pub use crate::solutions::{EpochSolution, SolutionType};
    pub use crate::solver::Solver;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::{DMatrix, DVector, Matrix3, Vector3, Vector4};
}

// pub export
pub use error::Error;
