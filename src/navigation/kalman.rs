use log::debug;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use crate::{navigation::Dynamics, prelude::Error};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct KfEstimate {
    /// P Matrix
    pub p: DMatrix<f64>,

    /// x Vector
    pub x: DVector<f64>,

    /// Predicted x Vector, for next epoch
    pub x_k1: DVector<f64>,
}

/// Position [Kalman] filter
#[derive(Clone, Debug)]
pub(crate) struct Kalman {
    dynamics: Dynamics,
}

impl Kalman {
    /// Create a new [Kalman] filter
    pub fn new(dynamics: Dynamics) -> Self {
        Self { dynamics }
    }

    pub fn dynamics(&self) -> &Dynamics {
        &self.dynamics
    }

    /// Measurement update, returning new [KfEstimate].
    ///
    /// ## Input
    /// - x_k: predicted state
    /// - p_k: previous (updated) state covariance
    /// - q_k: process noise
    /// - y_k: position measurement
    /// - r_k: position measurement covariance
    pub fn update(
        &self,
        x_k: &DVector<f64>,
        p_k: &DMatrix<f64>,
        q_k: &DMatrix<f64>,
        y_k: &Vector3<f64>,
        r_k: &Matrix3<f64>,
    ) -> Result<KfEstimate, Error> {
        let f_k = self.dynamics.transition();
        let n = self.dynamics.dimension();

        let k = f_k * p_k * f_k.transpose() + q_k;

        let h = self.dynamics.measurement_matrix();
        let ht = h.transpose();

        let r_k = DMatrix::<f64>::from_fn(3, 3, |i, j| r_k[(i, j)]);

        let s_inv = (&h * &k * &ht + r_k)
            .try_inverse()
            .ok_or(Error::MatrixInversion)?;

        let g = &k * &ht * s_inv;
        let i_gh = DMatrix::<f64>::identity(n, n) - &g * &h;

        let y_k = DVector::<f64>::from_column_slice(y_k.as_slice());

        let x = &i_gh * x_k + &g * y_k;
        let x_k1 = f_k * &x;

        let p = &i_gh * &k;
        let p = (&p + p.transpose()) * 0.5;

        debug!("kf update: x={} gain={}", x.transpose(), g);

        Ok(KfEstimate { p, x, x_k1 })
    }

    /// Propagation only: no measurement, no process noise.
    pub fn propagate(&self, x_k: &DVector<f64>, p_k: &DMatrix<f64>) -> KfEstimate {
        let f_k = self.dynamics.transition();
        let x = x_k.clone();
        let x_k1 = f_k * &x;
        let p = f_k * p_k * f_k.transpose();
        KfEstimate { p, x, x_k1 }
    }
}
