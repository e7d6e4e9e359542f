use thiserror::Error;

use crate::prelude::{Epoch, SV};

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// The Bancroft solver requires at least 4 vehicles to be proposed.
    #[error("bancroft requires at least 4 candidates")]
    NotEnoughCandidates,

    /// Initialization requires at least 4 vehicles in sight,
    /// that pass the cutoff and SNR criteria.
    #[error("initialization requires at least 4 SV passing selection criteria")]
    NotEnoughInitializationCandidates,

    /// Degenerate geometry (aligned or duplicated vehicles) will wind up here.
    #[error("bancroft solver error: singular matrix")]
    BancroftSingular,

    /// Unrealistic pseudo range observations or orbital states
    /// lead to an imaginary root.
    #[error("bancroft solver error: invalid input (imaginary solution)")]
    BancroftImaginarySolution,

    /// Kalman gain could not be formed.
    #[error("failed to invert matrix")]
    MatrixInversion,

    /// Double difference position solver did not converge.
    #[error("double difference solver error: {0}")]
    DoubleDifference(String),

    #[error("unknown observable")]
    UnknownObservable,

    #[error("unknown dynamic model")]
    UnknownDynamicModel,

    /// [FilterContext](crate::prelude::FilterContext) was created for
    /// another [DynamicModel](crate::prelude::DynamicModel).
    #[error("filter context does not match the dynamic model")]
    StateDimension,

    /// [SV] does not fit the constellation slots we're working with.
    #[error("invalid satellite {0}")]
    InvalidSatellite(SV),

    /// Numerical failure of an epoch, with diagnostic context.
    /// The [FilterContext](crate::prelude::FilterContext) was left untouched.
    #[error("{t} - epoch failure (active={active}, pivot={pivot:?}): {cause}")]
    Epoch {
        t: Epoch,
        active: usize,
        pivot: Option<u8>,
        cause: Box<Error>,
    },
}

impl Error {
    /// Returns the numerical cause of this [Error], unwrapping
    /// the epoch context if need be.
    pub fn cause(&self) -> &Error {
        match self {
            Self::Epoch { cause, .. } => cause.cause(),
            e => e,
        }
    }
}
