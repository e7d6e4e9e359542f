//! Cross-epoch filter state
use crate::{
    navigation::{Dynamics, KfEstimate},
    prelude::{Config, DMatrix, DVector, Epoch, Matrix3, SatelliteConfiguration, Vector3},
};

/// [FilterContext] owns everything that persists from one epoch to the next:
/// Kalman state and covariance, predicted state and [SatelliteConfiguration].
/// Each rover (or processing run) needs its own [FilterContext].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterContext {
    /// Last committed [Epoch]
    pub(crate) t: Epoch,
    /// States per axis
    pub(crate) order: usize,
    /// Latest [KfEstimate]
    pub(crate) estimate: KfEstimate,
    /// Latest [SatelliteConfiguration]
    pub(crate) satellites: SatelliteConfiguration,
}

impl FilterContext {
    /// Creates a new [FilterContext] at this position, with null
    /// derivatives. The state covariance is formed from this position
    /// covariance and [Config::initial_derivative_variance].
    pub fn new(
        cfg: &Config,
        t: Epoch,
        position_ecef_m: &Vector3<f64>,
        position_covariance: &Matrix3<f64>,
    ) -> Self {
        let dynamics = Dynamics::new(cfg);
        Self::from_dynamics(&dynamics, cfg, t, position_ecef_m, position_covariance)
    }

    pub(crate) fn from_dynamics(
        dynamics: &Dynamics,
        cfg: &Config,
        t: Epoch,
        position_ecef_m: &Vector3<f64>,
        position_covariance: &Matrix3<f64>,
    ) -> Self {
        let x = dynamics.state(position_ecef_m);
        let x_k1 = dynamics.transition() * &x;
        let p = dynamics.initial_covariance(position_covariance, cfg.initial_derivative_variance);

        Self {
            t,
            order: cfg.dynamics.order(),
            estimate: KfEstimate { p, x, x_k1 },
            satellites: Default::default(),
        }
    }

    /// Copies and returns [FilterContext] with this [SatelliteConfiguration]
    pub fn with_satellites(&self, satellites: SatelliteConfiguration) -> Self {
        let mut s = self.clone();
        s.satellites = satellites;
        s
    }

    /// Copies and returns [FilterContext] with this state covariance.
    /// A covariance that does not match the state dimension is later
    /// rejected by the [Solver](crate::prelude::Solver) with [Error::StateDimension](crate::prelude::Error::StateDimension).
    pub fn with_covariance(&self, covariance: DMatrix<f64>) -> Self {
        let mut s = self.clone();
        s.estimate.p = covariance;
        s
    }

    /// Last committed [Epoch]
    pub fn epoch(&self) -> Epoch {
        self.t
    }

    /// State dimension
    pub fn dimension(&self) -> usize {
        self.estimate.x.len()
    }

    /// Latest state estimate
    pub fn state(&self) -> &DVector<f64> {
        &self.estimate.x
    }

    /// Latest state covariance
    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.estimate.p
    }

    /// State predicted for next epoch
    pub fn prediction(&self) -> &DVector<f64> {
        &self.estimate.x_k1
    }

    /// Latest [SatelliteConfiguration]
    pub fn satellites(&self) -> &SatelliteConfiguration {
        &self.satellites
    }

    /// Latest position estimate, ECEF (m)
    pub fn position_ecef_m(&self) -> Vector3<f64> {
        Vector3::from_fn(|axis, _| self.estimate.x[axis * self.order])
    }

    /// Position predicted for next epoch, ECEF (m)
    pub fn predicted_position_ecef_m(&self) -> Vector3<f64> {
        Vector3::from_fn(|axis, _| self.estimate.x_k1[axis * self.order])
    }
}
