//! Antenna coordinates
use map_3d::{ecef2geodetic, geodetic2ecef, Ellipsoid};

use crate::{frame::enu, prelude::Vector3};

/// Antenna [Position], expressed both in ECEF and on the WGS84 ellipsoid.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// ECEF (m)
    ecef_m: Vector3<f64>,
    /// latitude (rad), longitude (rad), ellipsoidal height (m)
    lat_lon_alt: (f64, f64, f64),
}

impl Position {
    pub fn from_ecef(ecef_m: Vector3<f64>) -> Self {
        Self {
            ecef_m,
            lat_lon_alt: ecef2geodetic(ecef_m[0], ecef_m[1], ecef_m[2], Ellipsoid::WGS84),
        }
    }

    pub fn from_lat_lon_alt_rad_rad_m(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        let (x, y, z) = geodetic2ecef(lat_rad, lon_rad, alt_m, Ellipsoid::WGS84);
        Self {
            ecef_m: Vector3::new(x, y, z),
            lat_lon_alt: (lat_rad, lon_rad, alt_m),
        }
    }

    /// ECEF coordinates (m)
    pub fn ecef_m(&self) -> Vector3<f64> {
        self.ecef_m
    }

    /// Returns (latitude (°), longitude (°), altitude (m))
    pub fn lat_lon_alt_deg_deg_m(&self) -> (f64, f64, f64) {
        let (lat, lon, alt) = self.lat_lon_alt;
        (lat.to_degrees(), lon.to_degrees(), alt)
    }

    /// (East, North, Up) coordinates of this [Position], relative to `reference`.
    pub fn enu_from(&self, reference: &Self) -> Vector3<f64> {
        enu(&reference.ecef_m, &self.ecef_m)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (lat, lon, alt) = self.lat_lon_alt_deg_deg_m();
        write!(
            f,
            "x={:.3}m y={:.3}m z={:.3}m (lat={:.8}° lon={:.8}° alt={:.3}m)",
            self.ecef_m[0], self.ecef_m[1], self.ecef_m[2], lat, lon, alt
        )
    }
}
