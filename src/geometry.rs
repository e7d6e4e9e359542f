//! Satellite geometry
use crate::{
    frame::enu,
    prelude::{Epoch, Vector3, SV},
};

/// Satellite state, corrected for signal transmission.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorrectedSatellite {
    /// ECEF position (m)
    pub position_ecef_m: Vector3<f64>,
    /// Satellite clock offset (s)
    pub clock_offset_s: f64,
}

/// [Topocentric] coordinates of a vehicle, seen from a site.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Topocentric {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    /// Slant range (m)
    pub distance_m: f64,
}

/// Everything we know about one vehicle, at one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteGeometry {
    pub sv: SV,
    /// Corrected ECEF position (m)
    pub position_ecef_m: Vector3<f64>,
    /// Satellite clock offset (s)
    pub clock_offset_s: f64,
    /// Azimuth from rover (°)
    pub azimuth_deg: f64,
    /// Elevation from rover (°)
    pub elevation_deg: f64,
    /// Rover to vehicle distance (m)
    pub rover_distance_m: f64,
    /// Master to vehicle distance (m)
    pub master_distance_m: f64,
}

/// Computes [Topocentric] coordinates of `sv_ecef_m` seen from `rx_ecef_m`.
pub fn topocentric(rx_ecef_m: &Vector3<f64>, sv_ecef_m: &Vector3<f64>) -> Topocentric {
    let local = enu(rx_ecef_m, sv_ecef_m);
    let distance_m = local.norm();

    let mut azimuth_deg = local[0].atan2(local[1]).to_degrees();
    if azimuth_deg < 0.0 {
        azimuth_deg += 360.0;
    }

    let elevation_deg = if distance_m > 0.0 {
        (local[2] / distance_m).asin().to_degrees()
    } else {
        0.0
    };

    Topocentric {
        azimuth_deg,
        elevation_deg,
        distance_m,
    }
}

/// [GeometryProvider] gives access to the satellite orbits and clocks
/// (ephemeris and their correction models).
pub trait GeometryProvider {
    /// Returns the [CorrectedSatellite] state at signal transmission,
    /// for this signal reception [Epoch] and pseudo range.
    /// Returns None when no ephemeris is available.
    fn correct_satellite(&self, sv: SV, t: Epoch, pseudo_range_m: f64)
        -> Option<CorrectedSatellite>;

    /// Returns [Topocentric] coordinates of a vehicle seen from a site.
    fn topocentric(&self, rx_ecef_m: &Vector3<f64>, sv_ecef_m: &Vector3<f64>) -> Topocentric {
        topocentric(rx_ecef_m, sv_ecef_m)
    }
}
