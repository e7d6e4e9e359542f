use rstest::*;

use crate::{
    prelude::{
        Config, DynamicModel, Error, SatelliteSet, SolutionType, Solver, Transitions,
    },
    tests::{init_logger, rover, sampling_epoch, LeastSquaresDoubleDifference, SyntheticConstellation},
};

/// (active vehicles, expected added, expected lost) for each epoch
const SCENARIO: [(&[u8], bool, bool); 5] = [
    (&[1, 2, 3, 4, 5], false, false),
    (&[1, 2, 3, 5], false, true),
    (&[1, 2, 3, 5], false, false),
    (&[1, 2, 3, 5, 6], true, false),
    (&[1, 2, 3, 5, 6], false, false),
];

#[rstest]
#[case(DynamicModel::Static)]
#[case(DynamicModel::ConstantVelocity)]
#[case(DynamicModel::ConstantAcceleration)]
fn static_rover(#[case] dynamics: DynamicModel) {
    init_logger();

    let cfg = Config::default().with_dynamics(dynamics);
    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg, sky.clone(), LeastSquaresDoubleDifference::default());

    let (prns, _, _) = SCENARIO[0];
    let (mut ctx, solution) = solver
        .initialize(&sky.observation_epoch(sampling_epoch(0), prns))
        .unwrap();

    assert_eq!(solution.solution_type, SolutionType::Measurement);
    assert_eq!(solution.transitions, Transitions::default());
    assert_eq!(solution.pivot, Some(2));
    assert_eq!(solution.active, SatelliteSet::from_iter(prns.iter().copied()));
    assert_eq!(ctx.dimension(), 3 * dynamics.order());

    let err = (ctx.position_ecef_m() - rover()).norm();
    assert!(err < 1.0E-3, "initial position error {:.3E}m", err);

    let mut trace = ctx.covariance().trace();

    for (k, (prns, added, lost)) in SCENARIO.iter().enumerate().skip(1) {
        let epoch = sky.observation_epoch(sampling_epoch(k), prns);
        let solution = solver.resolve(&mut ctx, &epoch).unwrap();

        assert!(solution.is_fix(), "epoch #{} was not resolved", k);
        assert_eq!(solution.t, sampling_epoch(k));
        assert_eq!(solution.pivot, Some(2), "epoch #{}: pivot", k);
        assert_eq!(
            solution.active,
            SatelliteSet::from_iter(prns.iter().copied()),
            "epoch #{}: active set",
            k
        );

        assert_eq!(solution.transitions.added, *added, "epoch #{}: added", k);
        assert_eq!(solution.transitions.lost, *lost, "epoch #{}: lost", k);
        assert!(!solution.transitions.pivot_changed, "epoch #{}: pivot", k);
        assert!(!solution.transitions.cycle_slip);

        let err = (solution.position.ecef_m() - rover()).norm();
        assert!(err < 1.0E-3, "epoch #{}: position error {:.3E}m", k, err);

        if let Some(velocity) = solution.velocity_ecef_m_s {
            assert!(velocity.norm() < 1.0E-3, "epoch #{}: velocity {}", k, velocity);
        }

        assert!(solution.dop.is_some());
        assert!(solution.kalman_dop.pdop > 0.0);

        if dynamics == DynamicModel::Static {
            // no process noise: each measurement improves the estimate
            let tr = ctx.covariance().trace();
            assert!(tr < trace, "epoch #{}: covariance should shrink", k);
            trace = tr;
        }

        assert_eq!(ctx.satellites().active, solution.active);
        assert_eq!(ctx.satellites().pivot, Some(2));
    }
}

#[test]
fn initialization_requires_four_vehicles() {
    init_logger();

    let cfg = Config::default().with_min_elevation(30.0);
    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg, sky.clone(), LeastSquaresDoubleDifference::default());

    // #4 and #7 below the cutoff: 3 vehicles remaining
    let epoch = sky.observation_epoch(sampling_epoch(0), &[1, 2, 4, 7, 8]);

    match solver.initialize(&epoch) {
        Err(Error::NotEnoughInitializationCandidates) => {},
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("initialization should have failed"),
    }

    // not even enough vehicles for the coarse solution
    let epoch = sky.observation_epoch(sampling_epoch(0), &[1, 2, 3]);
    assert_eq!(solver.coarse_position(&epoch), Err(Error::NotEnoughCandidates));

    match solver.initialize(&epoch) {
        Err(Error::Epoch {
            t,
            active,
            pivot,
            cause,
        }) => {
            assert_eq!(t, sampling_epoch(0));
            assert_eq!(active, 3);
            assert_eq!(pivot, None);
            assert_eq!(*cause, Error::NotEnoughCandidates);
        },
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("initialization should have failed"),
    }
}

#[test]
fn coarse_position() {
    let cfg = Config::default();
    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg, sky.clone(), LeastSquaresDoubleDifference::default());

    let epoch = sky.observation_epoch(sampling_epoch(0), &[1, 2, 3, 4, 5, 6, 7, 8]);
    let coarse = solver.coarse_position(&epoch).unwrap();

    // pseudo ranges are not affected by the Earth rotation here:
    // the coarse position is off by a few hundred meters
    let err = (coarse.xyz() - rover()).norm();
    assert!(err < 1.0E3, "coarse position error {:.3E}m", err);
}
