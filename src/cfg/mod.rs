#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::prelude::{Constellation, Error, SV};

mod dynamics;
mod observable;

pub use dynamics::DynamicModel;
pub use observable::Observable;

fn default_constellation() -> Constellation {
    Constellation::GPS
}

fn default_interval() -> f64 {
    1.0
}

fn default_min_elevation() -> f64 {
    10.0
}

fn default_min_snr() -> f64 {
    0.0
}

fn default_velocity_noise() -> (f64, f64, f64) {
    (0.1, 0.1, 0.1)
}

fn default_fallback_variance() -> f64 {
    1.0
}

fn default_initial_derivative_variance() -> f64 {
    1.0
}

/// Processing [Config]uration
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// [Constellation] we're working with.
    /// Vehicles from other constellations are disregarded.
    #[cfg_attr(feature = "serde", serde(default = "default_constellation"))]
    pub constellation: Constellation,

    /// Code [Observable] (single or dual frequency)
    #[cfg_attr(feature = "serde", serde(default))]
    pub observable: Observable,

    /// Rover [DynamicModel]
    #[cfg_attr(feature = "serde", serde(default))]
    pub dynamics: DynamicModel,

    /// Sampling interval (s), used in the state transition.
    #[cfg_attr(feature = "serde", serde(default = "default_interval"))]
    pub interval_s: f64,

    /// Elevation cutoff angle (°). Vehicles strictly below
    /// this angle are rejected.
    #[cfg_attr(feature = "serde", serde(default = "default_min_elevation"))]
    pub min_elevation_deg: f64,

    /// Rover SNR threshold (dB.Hz). Vehicles strictly below
    /// this value are rejected.
    #[cfg_attr(feature = "serde", serde(default = "default_min_snr"))]
    pub min_snr_dbhz: f64,

    /// East, North, Up velocity process noise (m².s⁻²).
    /// Only applies to [DynamicModel]s that estimate velocity.
    #[cfg_attr(feature = "serde", serde(default = "default_velocity_noise"))]
    pub velocity_noise_enu_m2_s2: (f64, f64, f64),

    /// Isotropic position variance (m²) used when the double difference
    /// solver could not provide a measurement covariance.
    #[cfg_attr(feature = "serde", serde(default = "default_fallback_variance"))]
    pub fallback_variance_m2: f64,

    /// Variance of velocity and acceleration states at initialization.
    #[cfg_attr(feature = "serde", serde(default = "default_initial_derivative_variance"))]
    pub initial_derivative_variance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            constellation: default_constellation(),
            observable: Observable::default(),
            dynamics: DynamicModel::default(),
            interval_s: default_interval(),
            min_elevation_deg: default_min_elevation(),
            min_snr_dbhz: default_min_snr(),
            velocity_noise_enu_m2_s2: default_velocity_noise(),
            fallback_variance_m2: default_fallback_variance(),
            initial_derivative_variance: default_initial_derivative_variance(),
        }
    }
}

impl Config {
    /// Copies and returns [Config] with updated [Observable]
    pub fn with_observable(&self, observable: Observable) -> Self {
        let mut s = self.clone();
        s.observable = observable;
        s
    }

    /// Copies and returns [Config] with updated [DynamicModel]
    pub fn with_dynamics(&self, dynamics: DynamicModel) -> Self {
        let mut s = self.clone();
        s.dynamics = dynamics;
        s
    }

    /// Copies and returns [Config] with updated sampling interval
    pub fn with_interval(&self, interval_s: f64) -> Self {
        let mut s = self.clone();
        s.interval_s = interval_s;
        s
    }

    /// Copies and returns [Config] with updated elevation cutoff
    pub fn with_min_elevation(&self, min_elevation_deg: f64) -> Self {
        let mut s = self.clone();
        s.min_elevation_deg = min_elevation_deg;
        s
    }

    /// Copies and returns [Config] with updated SNR threshold
    pub fn with_min_snr(&self, min_snr_dbhz: f64) -> Self {
        let mut s = self.clone();
        s.min_snr_dbhz = min_snr_dbhz;
        s
    }

    /// Copies and returns [Config] with updated velocity process noise
    pub fn with_velocity_noise(&self, east: f64, north: f64, up: f64) -> Self {
        let mut s = self.clone();
        s.velocity_noise_enu_m2_s2 = (east, north, up);
        s
    }

    /// Copies and returns [Config] with updated measurement fallback variance
    pub fn with_fallback_variance(&self, variance_m2: f64) -> Self {
        let mut s = self.clone();
        s.fallback_variance_m2 = variance_m2;
        s
    }

    /// Copies and returns [Config] with updated initial derivative variance
    pub fn with_initial_derivative_variance(&self, variance: f64) -> Self {
        let mut s = self.clone();
        s.initial_derivative_variance = variance;
        s
    }

    /// Returns the constellation slot of this [SV], if it fits.
    pub(crate) fn slot(&self, sv: SV) -> Result<u8, Error> {
        if sv.constellation != self.constellation
            || sv.prn == 0
            || sv.prn as usize > crate::constants::MAX_SAT
        {
            Err(Error::InvalidSatellite(sv))
        } else {
            Ok(sv.prn)
        }
    }
}
