use crate::{observation::Carrier, prelude::Error};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Code observable(s) used by the whole process.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Observable {
    /// L1 pseudo range only.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "l1"))]
    L1,
    /// L2 pseudo range only.
    #[cfg_attr(feature = "serde", serde(alias = "l2"))]
    L2,
    /// Dual frequency: a vehicle is only usable when both
    /// L1 and L2 were sampled on both sites.
    #[cfg_attr(feature = "serde", serde(alias = "l1l2", alias = "L1+L2"))]
    L1L2,
}

impl Observable {
    /// [Carrier]s that must be observed
    pub fn carriers(&self) -> &'static [Carrier] {
        match self {
            Self::L1 => &[Carrier::L1],
            Self::L2 => &[Carrier::L2],
            Self::L1L2 => &[Carrier::L1, Carrier::L2],
        }
    }

    /// [Carrier] used for orbital correction and ranging
    pub fn primary(&self) -> Carrier {
        match self {
            Self::L2 => Carrier::L2,
            _ => Carrier::L1,
        }
    }

    /// True if this is a dual frequency [Observable]
    pub fn is_dual_frequency(&self) -> bool {
        *self == Self::L1L2
    }
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::L1 => write!(f, "L1"),
            Self::L2 => write!(f, "L2"),
            Self::L1L2 => write!(f, "L1+L2"),
        }
    }
}

impl std::str::FromStr for Observable {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l1" => Ok(Self::L1),
            "l2" => Ok(Self::L2),
            "l1l2" | "l1+l2" => Ok(Self::L1L2),
            _ => Err(Error::UnknownObservable),
        }
    }
}
