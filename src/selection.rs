//! Satellite set manager: visibility, pivot election and transitions
use log::{debug, info};

use crate::{
    geometry::{CorrectedSatellite, GeometryProvider, SatelliteGeometry},
    prelude::{
        Config, ObservationEpoch, SatelliteConfiguration, SatelliteSet, Transitions, Vector3, SV,
    },
};

/// [Selection] resulting from one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Vehicles passing all criteria
    pub active: SatelliteSet,
    /// Highest elevation vehicle, None when no vehicle passed.
    pub pivot: Option<u8>,
    /// [SatelliteGeometry] of each active vehicle, sorted by PRN.
    pub geometry: Vec<SatelliteGeometry>,
    /// [Transitions] with respect to previous epoch
    pub transitions: Transitions,
}

impl Selection {
    /// Number of active vehicles
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// [SatelliteSetManager] filters the vehicles in sight and elects the pivot.
pub struct SatelliteSetManager<'a, G: GeometryProvider> {
    cfg: &'a Config,
    geometry: &'a G,
}

impl<'a, G: GeometryProvider> SatelliteSetManager<'a, G> {
    pub fn new(cfg: &'a Config, geometry: &'a G) -> Self {
        Self { cfg, geometry }
    }

    /// Corrects the orbit of every candidate vehicle. A candidate was sampled
    /// on all required frequencies, on both sites, and its orbit could be corrected.
    /// Returns (SV, rover pseudo range, corrected state), sorted by PRN.
    pub fn corrected(&self, epoch: &ObservationEpoch) -> Vec<(SV, f64, CorrectedSatellite)> {
        let t = epoch.t;
        let carrier = self.cfg.observable.primary();

        let mut corrected = epoch
            .observations
            .iter()
            .filter_map(|ob| {
                if let Err(e) = self.cfg.slot(ob.sv) {
                    debug!("{} - {}: dropped", t, e);
                    return None;
                }

                if !ob.is_candidate(self.cfg.observable) {
                    debug!("{} ({}) missing {} observation", t, ob.sv, self.cfg.observable);
                    return None;
                }

                let pr = ob.rover.pseudo_range(carrier)?;

                match self.geometry.correct_satellite(ob.sv, t, pr) {
                    Some(state) => Some((ob.sv, pr, state)),
                    None => {
                        debug!("{} ({}) unresolved orbit", t, ob.sv);
                        None
                    },
                }
            })
            .collect::<Vec<_>>();

        corrected.sort_by_key(|(sv, _, _)| sv.prn);
        corrected
    }

    /// Resolves the [SatelliteGeometry] of every candidate vehicle,
    /// seen from this rover position. No angle nor SNR criteria applied.
    pub fn candidates(
        &self,
        epoch: &ObservationEpoch,
        rover_ecef_m: &Vector3<f64>,
    ) -> Vec<SatelliteGeometry> {
        self.corrected(epoch)
            .into_iter()
            .map(|(sv, _, corrected)| {
                let rover = self
                    .geometry
                    .topocentric(rover_ecef_m, &corrected.position_ecef_m);

                let master = self
                    .geometry
                    .topocentric(&epoch.master_ecef_m, &corrected.position_ecef_m);

                SatelliteGeometry {
                    sv,
                    position_ecef_m: corrected.position_ecef_m,
                    clock_offset_s: corrected.clock_offset_s,
                    azimuth_deg: rover.azimuth_deg,
                    elevation_deg: rover.elevation_deg,
                    rover_distance_m: rover.distance_m,
                    master_distance_m: master.distance_m,
                }
            })
            .collect()
    }

    /// Selects the active vehicles at this epoch, using this approximate
    /// rover position, and compares them to the `previous` configuration.
    pub fn select(
        &self,
        epoch: &ObservationEpoch,
        rover_ecef_m: &Vector3<f64>,
        previous: &SatelliteConfiguration,
    ) -> Selection {
        let t = epoch.t;

        let geometry = self
            .candidates(epoch, rover_ecef_m)
            .into_iter()
            .filter(|sat| {
                if sat.elevation_deg < self.cfg.min_elevation_deg {
                    debug!(
                        "{} ({}) below elevation mask ({:.2}°)",
                        t, sat.sv, sat.elevation_deg
                    );
                    return false;
                }

                let snr = epoch
                    .observation(sat.sv)
                    .map(|ob| ob.rover.snr())
                    .unwrap_or_default();

                if snr < self.cfg.min_snr_dbhz {
                    debug!("{} ({}) snr too low ({:.1} dB.Hz)", t, sat.sv, snr);
                    return false;
                }

                true
            })
            .collect::<Vec<_>>();

        let active = geometry.iter().map(|sat| sat.sv.prn).collect::<SatelliteSet>();

        // first max wins: lowest PRN on equal elevations
        let pivot = geometry
            .iter()
            .fold(None::<&SatelliteGeometry>, |best, sat| match best {
                Some(best) if best.elevation_deg >= sat.elevation_deg => Some(best),
                _ => Some(sat),
            })
            .map(|sat| sat.sv.prn);

        let transitions = previous.transitions(&active, pivot);

        if transitions.added {
            info!("{} - new vehicle(s) in sight {}", t, active);
        }
        if transitions.lost {
            info!("{} - vehicle(s) lost {}", t, active);
        }
        if transitions.pivot_changed {
            info!("{} - pivot changed {:?} -> {:?}", t, previous.pivot, pivot);
        }

        debug!("{} - active={} pivot={:?}", t, active, pivot);

        Selection {
            active,
            pivot,
            geometry,
            transitions,
        }
    }
}
