//! Epoch solver
use log::{error, info, warn};

use crate::{
    bancroft::Bancroft,
    constants::{MIN_SATELLITES, SPEED_OF_LIGHT_M_S},
    navigation::{
        DilutionOfPrecision, DoubleDifferenceInput, DoubleDifferenceSolver, Dynamics, Kalman,
        KfEstimate,
    },
    position::Position,
    prelude::{
        Config, Epoch, EpochSolution, Error, FilterContext, GeometryProvider, Matrix3,
        ObservationEpoch, SatelliteConfiguration, SatelliteSet, SolutionType, Transitions,
        Vector3, Vector4,
    },
    selection::{SatelliteSetManager, Selection},
};

/// Wraps a numerical failure with the epoch context.
fn epoch_failure(t: Epoch, active: usize, pivot: Option<u8>, cause: Error) -> Error {
    error!(
        "{} - epoch failure (active={}, pivot={:?}): {}",
        t, active, pivot, cause
    );
    Error::Epoch {
        t,
        active,
        pivot,
        cause: Box::new(cause),
    }
}

/// [Solver] processes [ObservationEpoch]s one at a time.
/// It does not own any cross-epoch state: that is the role of the
/// [FilterContext], which is only modified by epochs that fully succeed.
pub struct Solver<G: GeometryProvider, D: DoubleDifferenceSolver> {
    /// Solver parametrization
    cfg: Config,
    /// [GeometryProvider]
    geometry: G,
    /// [DoubleDifferenceSolver]
    dd: D,
    /// [Kalman] filter
    kalman: Kalman,
}

impl<G: GeometryProvider, D: DoubleDifferenceSolver> Solver<G, D> {
    /// Creates a new [Solver]
    pub fn new(cfg: Config, geometry: G, dd: D) -> Self {
        let kalman = Kalman::new(Dynamics::new(&cfg));
        Self {
            cfg,
            geometry,
            dd,
            kalman,
        }
    }

    /// [Config] in use
    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    fn manager(&self) -> SatelliteSetManager<'_, G> {
        SatelliteSetManager::new(&self.cfg, &self.geometry)
    }

    fn dynamics(&self) -> &Dynamics {
        self.kalman.dynamics()
    }

    /// Isotropic measurement covariance, when the double difference
    /// solver could not provide one.
    fn fallback_covariance(&self) -> Matrix3<f64> {
        Matrix3::identity() * self.cfg.fallback_variance_m2
    }

    fn double_difference_input<'e>(
        &self,
        epoch: &'e ObservationEpoch,
        selection: &'e Selection,
        rover_ecef_m: Vector3<f64>,
        pivot: u8,
    ) -> DoubleDifferenceInput<'e> {
        DoubleDifferenceInput {
            t: epoch.t,
            approx_rover_ecef_m: rover_ecef_m,
            master_ecef_m: epoch.master_ecef_m,
            observable: self.cfg.observable,
            observations: &epoch.observations,
            geometry: &selection.geometry,
            active: selection.active,
            pivot,
        }
    }

    /// (x, y, z, pr + c.dt_sv) of every candidate vehicle
    fn bancroft_rows(&self, epoch: &ObservationEpoch) -> Vec<Vector4<f64>> {
        self.manager()
            .corrected(epoch)
            .iter()
            .map(|(_, pr, state)| {
                let (x, y, z) = (
                    state.position_ecef_m[0],
                    state.position_ecef_m[1],
                    state.position_ecef_m[2],
                );
                Vector4::new(x, y, z, pr + SPEED_OF_LIGHT_M_S * state.clock_offset_s)
            })
            .collect()
    }

    /// Rejects a [FilterContext] whose state, prediction or covariance
    /// does not match our [DynamicModel](crate::prelude::DynamicModel).
    fn check_dimensions(&self, ctx: &FilterContext) -> Result<(), Error> {
        let n = self.dynamics().dimension();
        if ctx.dimension() != n
            || ctx.prediction().len() != n
            || ctx.covariance().shape() != (n, n)
        {
            return Err(Error::StateDimension);
        }
        Ok(())
    }

    /// Coarse rover position, using the [Bancroft] solver
    /// on all candidate vehicles.
    pub fn coarse_position(&self, epoch: &ObservationEpoch) -> Result<Vector4<f64>, Error> {
        Bancroft::new(&self.bancroft_rows(epoch))?.resolve()
    }

    /// Initializes a new [FilterContext] from this first epoch.
    /// The rover position is first estimated with the [Bancroft] solver,
    /// then measured by the [DoubleDifferenceSolver]. Requires at least
    /// 4 vehicles passing the selection criteria. No [Transitions] are
    /// reported at initialization. Coarse positioning failures are
    /// reported as [Error::Epoch].
    pub fn initialize(
        &self,
        epoch: &ObservationEpoch,
    ) -> Result<(FilterContext, EpochSolution), Error> {
        let t = epoch.t;

        let rows = self.bancroft_rows(epoch);

        let coarse = Bancroft::new(&rows)
            .and_then(|bancroft| bancroft.resolve())
            .map_err(|e| epoch_failure(t, rows.len(), None, e))?;

        let coarse_ecef_m = Vector3::new(coarse[0], coarse[1], coarse[2]);

        info!(
            "{} - coarse position {} (c.dt={:.3}m)",
            t,
            Position::from_ecef(coarse_ecef_m),
            coarse[3]
        );

        let selection =
            self.manager()
                .select(epoch, &coarse_ecef_m, &SatelliteConfiguration::default());

        let active = selection.len();

        let pivot = match selection.pivot {
            Some(pivot) if active >= MIN_SATELLITES => pivot,
            _ => {
                error!("{} - only {} vehicle(s) in sight", t, active);
                return Err(Error::NotEnoughInitializationCandidates);
            },
        };

        let input = self.double_difference_input(epoch, &selection, coarse_ecef_m, pivot);

        let measurement = self
            .dd
            .solve(&input)
            .map_err(|e| epoch_failure(t, active, Some(pivot), e))?;

        let covariance = measurement
            .covariance
            .unwrap_or_else(|| self.fallback_covariance());

        let mut ctx = FilterContext::from_dynamics(
            self.dynamics(),
            &self.cfg,
            t,
            &measurement.position_ecef_m,
            &covariance,
        );

        ctx.satellites.commit(selection.active, Some(pivot));

        let solution = self.solution(
            &ctx,
            selection.active,
            Some(pivot),
            Transitions::default(),
            SolutionType::Measurement,
            Some(measurement.dop),
        );

        info!("{}", solution);
        Ok((ctx, solution))
    }

    /// Processes this new epoch. On success, the [FilterContext] is updated
    /// and the [EpochSolution] returned. With less than 4 vehicles in sight,
    /// the state is propagated (not an error). On numerical failure,
    /// [Error::Epoch] is returned and the [FilterContext] is left untouched:
    /// you may then [Solver::propagate] for this epoch.
    pub fn resolve(
        &self,
        ctx: &mut FilterContext,
        epoch: &ObservationEpoch,
    ) -> Result<EpochSolution, Error> {
        let t = epoch.t;
        let dynamics = self.dynamics();

        self.check_dimensions(ctx)?;

        let rover_ecef_m = ctx.predicted_position_ecef_m();

        let selection = self.manager().select(epoch, &rover_ecef_m, &ctx.satellites);
        let active = selection.len();

        let (estimate, pivot, solution_type, dop) = match selection.pivot {
            Some(pivot) if active >= MIN_SATELLITES => {
                let input = self.double_difference_input(epoch, &selection, rover_ecef_m, pivot);

                let measurement = self
                    .dd
                    .solve(&input)
                    .map_err(|e| epoch_failure(t, active, Some(pivot), e))?;

                let r_k = measurement.covariance.unwrap_or_else(|| {
                    warn!("{} - missing measurement covariance: using fallback", t);
                    self.fallback_covariance()
                });

                let q_k = dynamics.process_noise(&rover_ecef_m);

                let estimate = self
                    .kalman
                    .update(
                        &ctx.estimate.x_k1,
                        &ctx.estimate.p,
                        &q_k,
                        &measurement.position_ecef_m,
                        &r_k,
                    )
                    .map_err(|e| epoch_failure(t, active, Some(pivot), e))?;

                (
                    estimate,
                    Some(pivot),
                    SolutionType::Measurement,
                    Some(measurement.dop),
                )
            },
            _ => {
                warn!("{} - {} vehicle(s) in sight: propagating", t, active);
                let estimate = self.kalman.propagate(&ctx.estimate.x_k1, &ctx.estimate.p);
                (estimate, None, SolutionType::Propagation, None)
            },
        };

        self.commit(ctx, t, estimate);
        ctx.satellites.commit(selection.active, pivot);

        let solution = self.solution(
            ctx,
            selection.active,
            pivot,
            selection.transitions,
            solution_type,
            dop,
        );

        info!("{}", solution);
        Ok(solution)
    }

    /// Propagates the state to this [Epoch], without any measurement.
    /// The [SatelliteConfiguration] is preserved. Use this when
    /// [Solver::resolve] failed numerically for this epoch.
    pub fn propagate(&self, ctx: &mut FilterContext, t: Epoch) -> Result<EpochSolution, Error> {
        self.check_dimensions(ctx)?;

        warn!("{} - propagating", t);

        let estimate = self.kalman.propagate(&ctx.estimate.x_k1, &ctx.estimate.p);
        self.commit(ctx, t, estimate);

        Ok(self.solution(
            ctx,
            SatelliteSet::new(),
            None,
            Transitions::default(),
            SolutionType::Propagation,
            None,
        ))
    }

    fn commit(&self, ctx: &mut FilterContext, t: Epoch, estimate: KfEstimate) {
        ctx.t = t;
        ctx.estimate = estimate;
    }

    fn solution(
        &self,
        ctx: &FilterContext,
        active: SatelliteSet,
        pivot: Option<u8>,
        transitions: Transitions,
        solution_type: SolutionType,
        dop: Option<DilutionOfPrecision>,
    ) -> EpochSolution {
        let dynamics = self.dynamics();

        let position_ecef_m = dynamics.position(&ctx.estimate.x);
        let q_ecef = dynamics.position_covariance(&ctx.estimate.p);

        EpochSolution {
            t: ctx.t,
            solution_type,
            position: Position::from_ecef(position_ecef_m),
            velocity_ecef_m_s: dynamics.velocity(&ctx.estimate.x),
            state: ctx.estimate.x.clone(),
            covariance: ctx.estimate.p.clone(),
            prediction: ctx.estimate.x_k1.clone(),
            active,
            pivot,
            transitions,
            dop,
            kalman_dop: DilutionOfPrecision::from_covariance(&q_ecef, &position_ecef_m),
        }
    }
}
