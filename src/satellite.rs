//! Satellite bookkeeping
use itertools::Itertools;

use crate::constants::MAX_SAT;

/// Fixed size set of constellation slots (PRN within [1, MAX_SAT]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SatelliteSet(u32);

impl SatelliteSet {
    /// Builds an empty [SatelliteSet]
    pub fn new() -> Self {
        Self(0)
    }

    fn mask(prn: u8) -> Option<u32> {
        if prn == 0 || prn as usize > MAX_SAT {
            None
        } else {
            Some(1 << (prn - 1))
        }
    }

    /// Inserts this PRN. Returns false if it does not fit [1, MAX_SAT].
    pub fn insert(&mut self, prn: u8) -> bool {
        match Self::mask(prn) {
            Some(mask) => {
                self.0 |= mask;
                true
            },
            None => false,
        }
    }

    /// Removes this PRN
    pub fn remove(&mut self, prn: u8) {
        if let Some(mask) = Self::mask(prn) {
            self.0 &= !mask;
        }
    }

    pub fn contains(&self, prn: u8) -> bool {
        Self::mask(prn).is_some_and(|mask| self.0 & mask != 0)
    }

    /// Number of satellites in this set
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates PRNs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=MAX_SAT as u8).filter(|prn| self.contains(*prn))
    }
}

impl FromIterator<u8> for SatelliteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        for prn in iter {
            set.insert(prn);
        }
        set
    }
}

impl std::fmt::Display for SatelliteSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}]", self.iter().join(","))
    }
}

/// Epoch to epoch [Transitions]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transitions {
    /// Active set grew
    pub added: bool,
    /// Active set shrank
    pub lost: bool,
    /// Pivot differs from previous pivot
    pub pivot_changed: bool,
    /// Always false with code observables
    pub cycle_slip: bool,
}

impl Transitions {
    /// True if any transition occurred
    pub fn any(&self) -> bool {
        self.added || self.lost || self.pivot_changed || self.cycle_slip
    }
}

impl std::fmt::Display for Transitions {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "added={} lost={} pivot={} slip={}",
            self.added, self.lost, self.pivot_changed, self.cycle_slip
        )
    }
}

/// [SatelliteConfiguration] of the last committed epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SatelliteConfiguration {
    /// Active vehicles
    pub active: SatelliteSet,
    /// Latest non null pivot. A pivot-less epoch does
    /// not erase this history.
    pub pivot: Option<u8>,
    /// Cycle slip flags, never raised by code observables.
    pub cycle_slips: SatelliteSet,
}

impl SatelliteConfiguration {
    /// Compares a new active set and pivot to this configuration.
    /// Additions and losses are detected on set sizes: simultaneous
    /// gain and loss of different vehicles go unnoticed.
    pub fn transitions(&self, active: &SatelliteSet, pivot: Option<u8>) -> Transitions {
        let (prev_size, size) = (self.active.len(), active.len());
        Transitions {
            added: size > prev_size,
            lost: size < prev_size,
            pivot_changed: pivot != self.pivot,
            cycle_slip: !self.cycle_slips.is_empty(),
        }
    }

    /// Records new active set and pivot, for next epoch.
    pub fn commit(&mut self, active: SatelliteSet, pivot: Option<u8>) {
        self.active = active;
        if pivot.is_some() {
            self.pivot = pivot;
        }
        self.cycle_slips = SatelliteSet::new();
    }
}

#[cfg(test)]
mod test {
    use super::{SatelliteConfiguration, SatelliteSet};

    #[test]
    fn satellite_set() {
        let mut set = SatelliteSet::from_iter([1, 5, 32]);
        assert_eq!(set.len(), 3);
        assert!(set.contains(32));
        assert!(!set.contains(2));

        assert!(!set.insert(0));
        assert!(!set.insert(33));
        assert_eq!(set.len(), 3);

        set.remove(5);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 32]);
        assert_eq!(set.to_string(), "[1,32]");
    }

    #[test]
    fn pivot_history() {
        let mut cfg = SatelliteConfiguration::default();
        cfg.commit(SatelliteSet::from_iter([1, 2, 3, 4]), Some(2));
        assert_eq!(cfg.pivot, Some(2));

        cfg.commit(SatelliteSet::new(), None);
        assert!(cfg.active.is_empty());
        assert_eq!(cfg.pivot, Some(2), "pivot history erased");

        let transitions = cfg.transitions(&SatelliteSet::from_iter([1, 2]), Some(2));
        assert!(transitions.added);
        assert!(!transitions.lost);
        assert!(!transitions.pivot_changed);
        assert!(!transitions.cycle_slip);
    }
}
