//! Code observations
use crate::prelude::{Epoch, Observable, Vector3, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Code carrier signals
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Carrier {
    #[default]
    L1,
    L2,
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
        }
    }
}

/// [Ranging] sampled by one site (rover or master) for one vehicle.
/// Null pseudo ranges are considered missing.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ranging {
    /// L1 pseudo range (m)
    pub l1_m: Option<f64>,
    /// L2 pseudo range (m)
    pub l2_m: Option<f64>,
    /// Signal to noise ratio (dB.Hz)
    pub snr_dbhz: Option<f64>,
}

impl Ranging {
    /// Builds single frequency [Ranging]
    pub fn l1(pseudo_range_m: f64, snr_dbhz: Option<f64>) -> Self {
        Self {
            l1_m: Some(pseudo_range_m),
            l2_m: None,
            snr_dbhz,
        }
    }

    /// Builds dual frequency [Ranging]
    pub fn l1l2(l1_m: f64, l2_m: f64, snr_dbhz: Option<f64>) -> Self {
        Self {
            l1_m: Some(l1_m),
            l2_m: Some(l2_m),
            snr_dbhz,
        }
    }

    /// Returns pseudo range on this [Carrier], if it was sampled.
    pub fn pseudo_range(&self, carrier: Carrier) -> Option<f64> {
        let pr = match carrier {
            Carrier::L1 => self.l1_m,
            Carrier::L2 => self.l2_m,
        };
        pr.filter(|pr| *pr != 0.0)
    }

    /// True if all [Carrier]s required by this [Observable] were sampled.
    pub fn is_usable(&self, observable: Observable) -> bool {
        observable
            .carriers()
            .iter()
            .all(|carrier| self.pseudo_range(*carrier).is_some())
    }

    /// SNR, null when not reported.
    pub fn snr(&self) -> f64 {
        self.snr_dbhz.unwrap_or_default()
    }
}

/// [Observation] of one vehicle on both sites.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// [SV] identity
    pub sv: SV,
    /// Rover [Ranging]
    pub rover: Ranging,
    /// Master (reference site) [Ranging]
    pub master: Ranging,
}

impl Observation {
    pub fn new(sv: SV, rover: Ranging, master: Ranging) -> Self {
        Self { sv, rover, master }
    }

    /// True if this vehicle may be proposed to the selection process.
    pub fn is_candidate(&self, observable: Observable) -> bool {
        self.rover.is_usable(observable) && self.master.is_usable(observable)
    }
}

/// [ObservationEpoch] gathers everything sampled at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationEpoch {
    /// Sampling instant
    pub t: Epoch,
    /// Master station position, ECEF (m)
    pub master_ecef_m: Vector3<f64>,
    /// Per vehicle [Observation]s
    pub observations: Vec<Observation>,
}

impl ObservationEpoch {
    pub fn new(t: Epoch, master_ecef_m: Vector3<f64>, observations: Vec<Observation>) -> Self {
        Self {
            t,
            master_ecef_m,
            observations,
        }
    }

    /// Returns [Observation] of this [SV], if any.
    pub fn observation(&self, sv: SV) -> Option<&Observation> {
        self.observations.iter().find(|ob| ob.sv == sv)
    }
}
