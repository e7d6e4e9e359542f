use nalgebra::{Matrix3, Vector3};

use crate::frame::covariance_global_to_local;

/// [DilutionOfPrecision]
#[derive(Clone, Default, Copy, Debug, PartialEq)]
pub struct DilutionOfPrecision {
    /// Position DOP
    pub pdop: f64,

    /// Horizontal DOP
    pub hdop: f64,

    /// Vertical DOP
    pub vdop: f64,
}

impl DilutionOfPrecision {
    /// Creates new [DilutionOfPrecision] from a position covariance
    /// (or cofactor) matrix expressed in ECEF, rotated to local frame
    /// at this reference position.
    pub fn from_covariance(q_ecef: &Matrix3<f64>, reference_ecef_m: &Vector3<f64>) -> Self {
        let q_enu = covariance_global_to_local(q_ecef, reference_ecef_m);
        Self {
            pdop: q_ecef.trace().sqrt(),
            hdop: (q_enu[(0, 0)] + q_enu[(1, 1)]).sqrt(),
            vdop: q_enu[(2, 2)].sqrt(),
        }
    }
}

impl std::fmt::Display for DilutionOfPrecision {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "pdop={:.3} hdop={:.3} vdop={:.3}",
            self.pdop, self.hdop, self.vdop
        )
    }
}

#[cfg(test)]
mod test {
    use super::DilutionOfPrecision;
    use nalgebra::{Matrix3, Vector3};

    #[test]
    fn isotropic_dop() {
        let reference = Vector3::new(3582105.291, 532589.7313, 5232754.8054);
        let dop = DilutionOfPrecision::from_covariance(&(Matrix3::identity() * 4.0), &reference);
        assert!((dop.pdop - 12.0_f64.sqrt()).abs() < 1.0E-9);
        assert!((dop.hdop - 8.0_f64.sqrt()).abs() < 1.0E-9);
        assert!((dop.vdop - 2.0).abs() < 1.0E-9);
    }
}
