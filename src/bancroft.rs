//! Bancroft solver
use log::debug;
use nalgebra::{DVector, Matrix4xX, MatrixXx4, Vector4};

use crate::{
    constants::{BANCROFT_TRAVEL_TIME_S, EARTH_ANGULAR_VEL_RAD, SPEED_OF_LIGHT_M_S},
    prelude::Error,
};

/// Smallest to largest singular value ratio, below which
/// the Bancroft matrix is considered singular.
const SINGULARITY_RATIO: f64 = 1.0E-12;

/// Lorentz inner product
fn lorentz(a: &Vector4<f64>, b: &Vector4<f64>) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] - a[3] * b[3]
}

fn row(b: &MatrixXx4<f64>, i: usize) -> Vector4<f64> {
    Vector4::new(b[(i, 0)], b[(i, 1)], b[(i, 2)], b[(i, 3)])
}

/// Least squares generalized inverse. Reduces to the exact inverse
/// when the system is square.
fn pseudo_inverse(b: &MatrixXx4<f64>) -> Result<Matrix4xX<f64>, Error> {
    let svd = b.clone().svd(true, true);

    let (min, max) = svd
        .singular_values
        .iter()
        .fold((f64::MAX, 0.0_f64), |(min, max), s| (min.min(*s), max.max(*s)));

    if max <= 0.0 || min <= max * SINGULARITY_RATIO {
        return Err(Error::BancroftSingular);
    }

    svd.pseudo_inverse(0.0).map_err(|_| Error::BancroftSingular)
}

/// One of the two roots of the Bancroft quadratic
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BancroftCandidate {
    /// (x, y, z, c.dt) in meters
    pub solution: Vector4<f64>,
    /// Sum of absolute pseudo range residuals (m)
    pub residual: f64,
}

/// [Bancroft] closed form solver, resolves (x, y, z, c.dt)
/// without a priori knowledge.
#[derive(Debug, Clone)]
pub struct Bancroft {
    /// One row per vehicle: (x, y, z, pr + c.dt_sv) in meters
    b: MatrixXx4<f64>,
}

impl Bancroft {
    /// Builds a new [Bancroft] solver. Each row is
    /// (x_sv, y_sv, z_sv, pseudo range + c * dt_sv), in meters.
    /// At least 4 rows are required.
    pub fn new(rows: &[Vector4<f64>]) -> Result<Self, Error> {
        if rows.len() < 4 {
            return Err(Error::NotEnoughCandidates);
        }

        let mut b = MatrixXx4::<f64>::zeros(rows.len());

        for (i, r) in rows.iter().enumerate() {
            for j in 0..4 {
                b[(i, j)] = r[j];
            }
        }

        Ok(Self { b })
    }

    /// Number of vehicles
    pub fn len(&self) -> usize {
        self.b.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.b.nrows() == 0
    }

    /// Applies the Earth rotation during signal travel.
    /// Travel time is guessed on first iteration, then derived from
    /// the previous position estimate.
    fn rotated(&self, estimate: Option<&Vector4<f64>>) -> MatrixXx4<f64> {
        let mut b = self.b.clone();

        for i in 0..b.nrows() {
            let (x, y, z) = (self.b[(i, 0)], self.b[(i, 1)], self.b[(i, 2)]);

            let travel_time_s = match estimate {
                Some(pos) => {
                    ((x - pos[0]).powi(2) + (y - pos[1]).powi(2) + (z - pos[2]).powi(2)).sqrt()
                        / SPEED_OF_LIGHT_M_S
                },
                None => BANCROFT_TRAVEL_TIME_S,
            };

            let (sin, cos) = (travel_time_s * EARTH_ANGULAR_VEL_RAD).sin_cos();

            b[(i, 0)] = cos * x + sin * y;
            b[(i, 1)] = -sin * x + cos * y;
        }

        b
    }

    /// Sum of absolute pseudo range residuals for this solution.
    fn residual(b: &MatrixXx4<f64>, solution: &Vector4<f64>) -> f64 {
        (0..b.nrows())
            .map(|i| {
                let rho = ((b[(i, 0)] - solution[0]).powi(2)
                    + (b[(i, 1)] - solution[1]).powi(2)
                    + (b[(i, 2)] - solution[2]).powi(2))
                .sqrt();
                (b[(i, 3)] - (rho + solution[3])).abs()
            })
            .sum()
    }

    /// Forms both roots of one Bancroft iteration.
    pub(crate) fn candidates(
        &self,
        estimate: Option<&Vector4<f64>>,
    ) -> Result<[BancroftCandidate; 2], Error> {
        let b = self.rotated(estimate);
        let b_inv = pseudo_inverse(&b)?;

        let size = b.nrows();

        let e = DVector::<f64>::from_element(size, 1.0);

        let alpha = DVector::<f64>::from_fn(size, |i, _| {
            let r = row(&b, i);
            lorentz(&r, &r) / 2.0
        });

        let b_e: Vector4<f64> = &b_inv * e;
        let b_alpha: Vector4<f64> = &b_inv * alpha;

        let a = lorentz(&b_e, &b_e);
        let beta = lorentz(&b_e, &b_alpha) - 1.0;
        let c = lorentz(&b_alpha, &b_alpha);

        let discriminant = beta * beta - a * c;

        if discriminant < 0.0 || a == 0.0 || !discriminant.is_finite() {
            return Err(Error::BancroftImaginarySolution);
        }

        let root = discriminant.sqrt();

        Ok([-root, root].map(|root| {
            let lambda = (-beta + root) / a;
            let mut solution = b_e * lambda + b_alpha;
            solution[3] = -solution[3];
            BancroftCandidate {
                solution,
                residual: Self::residual(&b, &solution),
            }
        }))
    }

    /// Resolves (x, y, z, c.dt) in meters, where dt is the receiver clock bias.
    pub fn resolve(&self) -> Result<Vector4<f64>, Error> {
        let mut estimate = Option::<Vector4<f64>>::None;

        for iteration in 0..2 {
            let best = self
                .candidates(estimate.as_ref())?
                .into_iter()
                .min_by(|a, b| a.residual.total_cmp(&b.residual))
                .ok_or(Error::BancroftImaginarySolution)?;

            debug!(
                "bancroft iter={} x={:.3} y={:.3} z={:.3} c.dt={:.3} residual={:.3E}",
                iteration,
                best.solution[0],
                best.solution[1],
                best.solution[2],
                best.solution[3],
                best.residual
            );

            estimate = Some(best.solution);
        }

        estimate.ok_or(Error::BancroftImaginarySolution)
    }
}
