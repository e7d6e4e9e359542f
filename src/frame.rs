//! Local (East, North, Up) and global (ECEF) frames
use map_3d::{ecef2geodetic, Ellipsoid};
use nalgebra::{Matrix3, Vector3};

/// Rotation matrix from global (ECEF) to local (ENU) frame,
/// centered on this reference ECEF position.
pub(crate) fn global_to_local_rotation(reference_ecef_m: &Vector3<f64>) -> Matrix3<f64> {
    let (lat, lon, _) = ecef2geodetic(
        reference_ecef_m[0],
        reference_ecef_m[1],
        reference_ecef_m[2],
        Ellipsoid::WGS84,
    );

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}

/// Expresses the `target - reference` ECEF vector in local frame.
pub(crate) fn enu(reference_ecef_m: &Vector3<f64>, target_ecef_m: &Vector3<f64>) -> Vector3<f64> {
    global_to_local_rotation(reference_ecef_m) * (target_ecef_m - reference_ecef_m)
}

/// Rotates a 3x3 covariance matrix from local (ENU) frame
/// to global (ECEF) frame, at this reference position.
pub fn covariance_local_to_global(
    covariance: &Matrix3<f64>,
    reference_ecef_m: &Vector3<f64>,
) -> Matrix3<f64> {
    let r = global_to_local_rotation(reference_ecef_m);
    r.transpose() * covariance * r
}

/// Rotates a 3x3 covariance matrix from global (ECEF) frame
/// to local (ENU) frame, at this reference position.
pub fn covariance_global_to_local(
    covariance: &Matrix3<f64>,
    reference_ecef_m: &Vector3<f64>,
) -> Matrix3<f64> {
    let r = global_to_local_rotation(reference_ecef_m);
    r * covariance * r.transpose()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn local_frame_at_null_island() {
        let reference = Vector3::new(6378137.0, 0.0, 0.0);
        let target = Vector3::new(6378137.0 + 10.0, 20.0, 30.0);
        let local = enu(&reference, &target);
        assert!((local[0] - 20.0).abs() < 1.0E-9, "east: {}", local[0]);
        assert!((local[1] - 30.0).abs() < 1.0E-9, "north: {}", local[1]);
        assert!((local[2] - 10.0).abs() < 1.0E-9, "up: {}", local[2]);
    }

    #[test]
    fn covariance_rotations() {
        let reference = Vector3::new(3582105.291, 532589.7313, 5232754.8054);
        let local = Matrix3::new(4.0, 0.5, 0.0, 0.5, 2.0, 0.1, 0.0, 0.1, 9.0);

        let global = covariance_local_to_global(&local, &reference);
        assert!((global - global.transpose()).norm() < 1.0E-12);
        assert!((global.trace() - local.trace()).abs() < 1.0E-9);

        let back = covariance_global_to_local(&global, &reference);
        assert!((back - local).norm() < 1.0E-9);
    }
}
