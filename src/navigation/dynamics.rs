use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

use crate::{frame::covariance_local_to_global, prelude::Config};

/// Rover [Dynamics]: state layout, transition and process noise.
/// The state is made of 3 axis blocks (x, y, z), each block holding
/// position, then velocity and acceleration depending on model order.
#[derive(Debug, Clone)]
pub(crate) struct Dynamics {
    /// States per axis
    order: usize,
    /// Transition matrix
    transition: DMatrix<f64>,
    /// Diagonal velocity noise, local frame
    velocity_noise_enu: Matrix3<f64>,
}

impl Dynamics {
    pub fn new(cfg: &Config) -> Self {
        let order = cfg.dynamics.order();
        let dt = cfg.interval_s;

        let mut block = DMatrix::<f64>::identity(order, order);
        for i in 0..order {
            for j in i + 1..order {
                let n = j - i;
                let factorial = (1..=n).product::<usize>() as f64;
                block[(i, j)] = dt.powi(n as i32) / factorial;
            }
        }

        let mut transition = DMatrix::<f64>::zeros(3 * order, 3 * order);
        for axis in 0..3 {
            let offset = axis * order;
            transition
                .view_mut((offset, offset), (order, order))
                .copy_from(&block);
        }

        let (east, north, up) = cfg.velocity_noise_enu_m2_s2;

        Self {
            order,
            transition,
            velocity_noise_enu: Matrix3::from_diagonal(&Vector3::new(east, north, up)),
        }
    }

    /// State dimension
    pub fn dimension(&self) -> usize {
        3 * self.order
    }

    /// Index of the position term of this axis
    pub fn position_index(&self, axis: usize) -> usize {
        axis * self.order
    }

    pub fn transition(&self) -> &DMatrix<f64> {
        &self.transition
    }

    /// Builds a state vector at this position, null derivatives.
    pub fn state(&self, position_ecef_m: &Vector3<f64>) -> DVector<f64> {
        let mut x = DVector::<f64>::zeros(self.dimension());
        for axis in 0..3 {
            x[self.position_index(axis)] = position_ecef_m[axis];
        }
        x
    }

    /// Extracts position from state vector
    pub fn position(&self, x: &DVector<f64>) -> Vector3<f64> {
        Vector3::from_fn(|axis, _| x[self.position_index(axis)])
    }

    /// Extracts velocity from state vector, when estimated.
    pub fn velocity(&self, x: &DVector<f64>) -> Option<Vector3<f64>> {
        if self.order > 1 {
            Some(Vector3::from_fn(|axis, _| x[self.position_index(axis) + 1]))
        } else {
            None
        }
    }

    /// Extracts the position block of a state covariance matrix
    pub fn position_covariance(&self, p: &DMatrix<f64>) -> Matrix3<f64> {
        Matrix3::from_fn(|i, j| p[(self.position_index(i), self.position_index(j))])
    }

    /// Measurement matrix: maps state to position
    pub fn measurement_matrix(&self) -> DMatrix<f64> {
        let mut h = DMatrix::<f64>::zeros(3, self.dimension());
        for axis in 0..3 {
            h[(axis, self.position_index(axis))] = 1.0;
        }
        h
    }

    /// Process noise, null unless velocity is estimated.
    /// Velocity noise is rotated from local frame to global frame at
    /// this reference position.
    pub fn process_noise(&self, reference_ecef_m: &Vector3<f64>) -> DMatrix<f64> {
        let mut q = DMatrix::<f64>::zeros(self.dimension(), self.dimension());

        if self.order > 1 {
            let q_vel = covariance_local_to_global(&self.velocity_noise_enu, reference_ecef_m);
            for i in 0..3 {
                for j in 0..3 {
                    q[(self.position_index(i) + 1, self.position_index(j) + 1)] = q_vel[(i, j)];
                }
            }
        }

        q
    }

    /// Initial state covariance: this position block,
    /// derivatives are uncorrelated with given variance.
    pub fn initial_covariance(
        &self,
        position_covariance: &Matrix3<f64>,
        derivative_variance: f64,
    ) -> DMatrix<f64> {
        let mut p = DMatrix::<f64>::zeros(self.dimension(), self.dimension());

        for i in 0..3 {
            for j in 0..3 {
                p[(self.position_index(i), self.position_index(j))] = position_covariance[(i, j)];
            }
            for k in 1..self.order {
                let index = self.position_index(i) + k;
                p[(index, index)] = derivative_variance;
            }
        }

        p
    }
}

#[cfg(test)]
mod test {
    use super::Dynamics;
    use crate::prelude::{Config, DynamicModel, Vector3};
    use nalgebra::DMatrix;

    #[test]
    fn static_dynamics() {
        let cfg = Config::default().with_dynamics(DynamicModel::Static);
        let dynamics = Dynamics::new(&cfg);
        assert_eq!(dynamics.dimension(), 3);
        assert_eq!(*dynamics.transition(), DMatrix::<f64>::identity(3, 3));

        let q = dynamics.process_noise(&Vector3::new(6378137.0, 0.0, 0.0));
        assert_eq!(q, DMatrix::<f64>::zeros(3, 3));
    }

    #[test]
    fn constant_acceleration_transition() {
        let cfg = Config::default()
            .with_dynamics(DynamicModel::ConstantAcceleration)
            .with_interval(2.0);

        let dynamics = Dynamics::new(&cfg);
        let t = dynamics.transition();

        assert_eq!(t.nrows(), 9);
        for axis in 0..3 {
            let i = dynamics.position_index(axis);
            assert_eq!(t[(i, i)], 1.0);
            assert_eq!(t[(i, i + 1)], 2.0);
            assert_eq!(t[(i, i + 2)], 2.0);
            assert_eq!(t[(i + 1, i + 2)], 2.0);
            assert_eq!(t[(i + 2, i)], 0.0);
        }
        assert_eq!(t[(0, 3)], 0.0);
    }

    #[test]
    fn velocity_process_noise() {
        let cfg = Config::default()
            .with_dynamics(DynamicModel::ConstantVelocity)
            .with_velocity_noise(0.1, 0.2, 0.3);

        let dynamics = Dynamics::new(&cfg);
        let q = dynamics.process_noise(&Vector3::new(3582105.291, 532589.7313, 5232754.8054));

        assert!((q.clone() - q.transpose()).norm() < 1.0E-12);
        assert!((q.trace() - 0.6).abs() < 1.0E-12);

        for axis in 0..3 {
            let i = dynamics.position_index(axis);
            assert_eq!(q[(i, i)], 0.0, "position noise should be null");
        }
    }

    #[test]
    fn state_layout() {
        let cfg = Config::default().with_dynamics(DynamicModel::ConstantVelocity);
        let dynamics = Dynamics::new(&cfg);

        let position = Vector3::new(1.0, 2.0, 3.0);
        let x = dynamics.state(&position);
        assert_eq!(x.len(), 6);
        assert_eq!(x[2], 2.0);
        assert_eq!(dynamics.position(&x), position);
        assert_eq!(dynamics.velocity(&x), Some(Vector3::zeros()));

        let h = dynamics.measurement_matrix();
        assert_eq!(h.clone() * x, position_dvector(&position));
    }

    fn position_dvector(p: &Vector3<f64>) -> nalgebra::DVector<f64> {
        nalgebra::DVector::from_column_slice(p.as_slice())
    }
}
