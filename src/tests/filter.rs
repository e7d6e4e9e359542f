use crate::{
    prelude::{
        Config, DMatrix, DynamicModel, Error, FilterContext, Matrix3, SatelliteConfiguration,
        SatelliteSet, SolutionType, Solver, Vector3,
    },
    tests::{
        init_logger, rover, sampling_epoch, DivergingSolver, FixedMeasurement,
        LeastSquaresDoubleDifference, SyntheticConstellation, TableGeometry,
    },
};

/// [FilterContext] at the reference rover,
/// previously tracking PRN #1 to #5.
fn tracking_context(cfg: &Config) -> FilterContext {
    let ctx = FilterContext::new(
        cfg,
        sampling_epoch(0),
        &rover(),
        &(Matrix3::identity() * 4.0),
    );

    let mut satellites = SatelliteConfiguration::default();
    satellites.commit(SatelliteSet::from_iter([1, 2, 3, 4, 5]), Some(2));

    ctx.with_satellites(satellites)
}

#[test]
fn propagation_below_four_vehicles() {
    init_logger();

    let cfg = Config::default()
        .with_dynamics(DynamicModel::ConstantVelocity)
        .with_velocity_noise(0.5, 0.5, 0.5);

    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg.clone(), sky.clone(), LeastSquaresDoubleDifference::default());

    let mut ctx = tracking_context(&cfg);
    let prior = ctx.clone();

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3]);
    let solution = solver.resolve(&mut ctx, &epoch).unwrap();

    assert_eq!(solution.solution_type, SolutionType::Propagation);
    assert!(!solution.is_fix());
    assert_eq!(solution.pivot, None);
    assert_eq!(solution.dop, None);
    assert_eq!(solution.active, SatelliteSet::from_iter([1, 2, 3]));

    // state is exactly the prior prediction
    assert_eq!(ctx.state(), prior.prediction());
    assert_eq!(ctx.position_ecef_m(), prior.predicted_position_ecef_m());
    assert_eq!(ctx.epoch(), sampling_epoch(1));

    // uncertainty grows
    assert!(ctx.covariance().trace() > prior.covariance().trace());

    assert!(solution.transitions.lost);
    assert!(!solution.transitions.pivot_changed);

    assert_eq!(ctx.satellites().active, SatelliteSet::from_iter([1, 2, 3]));
    assert_eq!(ctx.satellites().pivot, Some(2));
}

#[test]
fn pivot_history_across_propagation() {
    init_logger();

    let cfg = Config::default().with_dynamics(DynamicModel::Static);
    let geometry = TableGeometry::new(&[(1, 20.0), (2, 50.0), (3, 70.0), (4, 30.0), (5, 25.0)]);

    let solver = Solver::new(
        cfg.clone(),
        geometry.clone(),
        FixedMeasurement {
            position_ecef_m: rover(),
            covariance: Some(Matrix3::identity()),
        },
    );

    let mut satellites = SatelliteConfiguration::default();
    satellites.commit(SatelliteSet::from_iter([1, 2, 4, 5]), Some(2));

    let mut ctx = FilterContext::new(&cfg, sampling_epoch(0), &rover(), &Matrix3::identity())
        .with_satellites(satellites);

    // #3 is the highest vehicle, but no fix is possible
    let epoch = geometry.observation_epoch(sampling_epoch(1), &[1, 3, 4]);
    let solution = solver.resolve(&mut ctx, &epoch).unwrap();

    assert_eq!(solution.solution_type, SolutionType::Propagation);
    assert_eq!(solution.pivot, None);
    assert_eq!(ctx.satellites().active, SatelliteSet::from_iter([1, 3, 4]));
    assert_eq!(ctx.satellites().pivot, Some(2), "pivot history overwritten");

    let epoch = geometry.observation_epoch(sampling_epoch(2), &[1, 2, 4, 5]);
    let solution = solver.resolve(&mut ctx, &epoch).unwrap();

    assert!(solution.is_fix());
    assert_eq!(solution.pivot, Some(2));
    assert!(solution.transitions.added);
    assert!(!solution.transitions.pivot_changed);
    assert_eq!(ctx.satellites().pivot, Some(2));
}

#[test]
fn perfect_measurement() {
    init_logger();

    let cfg = Config::default().with_dynamics(DynamicModel::ConstantVelocity);
    let sky = SyntheticConstellation::default();

    let measured = rover() + Vector3::new(3.0, -2.0, 5.0);

    let solver = Solver::new(
        cfg.clone(),
        sky.clone(),
        FixedMeasurement {
            position_ecef_m: measured,
            covariance: Some(Matrix3::zeros()),
        },
    );

    let mut ctx = tracking_context(&cfg);

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3, 4, 5]);
    let solution = solver.resolve(&mut ctx, &epoch).unwrap();

    assert!(solution.is_fix());
    assert_eq!(solution.pivot, Some(2));
    assert!(!solution.transitions.any());

    let err = (ctx.position_ecef_m() - measured).norm();
    assert!(err < 1.0E-4, "position error {:.3E}m", err);

    let err = (solution.position.ecef_m() - measured).norm();
    assert!(err < 1.0E-4, "reported position error {:.3E}m", err);
}

#[test]
fn missing_measurement_covariance() {
    init_logger();

    let cfg = Config::default()
        .with_dynamics(DynamicModel::Static)
        .with_fallback_variance(9.0);

    let sky = SyntheticConstellation::default();

    let measured = rover() + Vector3::new(10.0, 20.0, -30.0);

    let solver = Solver::new(
        cfg.clone(),
        sky.clone(),
        FixedMeasurement {
            position_ecef_m: measured,
            covariance: None,
        },
    );

    // same confidence as the fallback: lands in the middle
    let mut ctx = FilterContext::new(
        &cfg,
        sampling_epoch(0),
        &rover(),
        &(Matrix3::identity() * 9.0),
    );

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3, 4]);
    let solution = solver.resolve(&mut ctx, &epoch).unwrap();

    assert!(solution.is_fix());

    let expected = (rover() + measured) / 2.0;
    let err = (ctx.position_ecef_m() - expected).norm();
    assert!(err < 1.0E-6, "position error {:.3E}m", err);

    for i in 0..3 {
        assert!((ctx.covariance()[(i, i)] - 4.5).abs() < 1.0E-9);
    }
}

#[test]
fn singular_gain() {
    init_logger();

    let cfg = Config::default().with_dynamics(DynamicModel::Static);
    let sky = SyntheticConstellation::default();

    let solver = Solver::new(
        cfg.clone(),
        sky.clone(),
        FixedMeasurement {
            position_ecef_m: rover(),
            covariance: Some(Matrix3::zeros()),
        },
    );

    let mut ctx = FilterContext::new(&cfg, sampling_epoch(0), &rover(), &Matrix3::zeros())
        .with_covariance(DMatrix::zeros(3, 3));

    let prior = ctx.clone();

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3, 4, 5]);

    match solver.resolve(&mut ctx, &epoch) {
        Err(Error::Epoch {
            t,
            active,
            pivot,
            cause,
        }) => {
            assert_eq!(t, sampling_epoch(1));
            assert_eq!(active, 5);
            assert_eq!(pivot, Some(2));
            assert_eq!(*cause, Error::MatrixInversion);
        },
        other => panic!("expecting epoch failure, got {:?}", other),
    }

    assert_eq!(ctx, prior, "context should be left untouched");

    // caller's choice: propagate this epoch
    let solution = solver.propagate(&mut ctx, sampling_epoch(1)).unwrap();
    assert_eq!(solution.solution_type, SolutionType::Propagation);
    assert_eq!(ctx.epoch(), sampling_epoch(1));
    assert_eq!(ctx.satellites(), prior.satellites());
}

#[test]
fn measurement_failure() {
    init_logger();

    let cfg = Config::default();
    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg.clone(), sky.clone(), DivergingSolver::default());

    let mut ctx = tracking_context(&cfg);
    let prior = ctx.clone();

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3, 4, 5, 6]);
    let err = solver.resolve(&mut ctx, &epoch).unwrap_err();

    assert!(matches!(err.cause(), Error::DoubleDifference(_)));
    assert_eq!(ctx, prior);
}

#[test]
fn propagation_keeps_satellites() {
    let cfg = Config::default().with_dynamics(DynamicModel::ConstantAcceleration);
    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg.clone(), sky, LeastSquaresDoubleDifference::default());

    let mut ctx = tracking_context(&cfg);
    let prior = ctx.clone();

    let solution = solver.propagate(&mut ctx, sampling_epoch(1)).unwrap();

    assert_eq!(ctx.state(), prior.prediction());
    assert_eq!(ctx.satellites(), prior.satellites());
    assert!(solution.active.is_empty());
    assert_eq!(solution.pivot, None);
    assert_eq!(solution.dop, None);
    assert!(solution.velocity_ecef_m_s.is_some());
}

#[test]
fn dimension_mismatch() {
    let sky = SyntheticConstellation::default();

    let solver = Solver::new(
        Config::default().with_dynamics(DynamicModel::ConstantVelocity),
        sky.clone(),
        LeastSquaresDoubleDifference::default(),
    );

    let mut ctx = FilterContext::new(
        &Config::default().with_dynamics(DynamicModel::Static),
        sampling_epoch(0),
        &rover(),
        &Matrix3::identity(),
    );

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3, 4, 5]);
    assert_eq!(
        solver.resolve(&mut ctx, &epoch).unwrap_err(),
        Error::StateDimension
    );
    assert_eq!(
        solver.propagate(&mut ctx, sampling_epoch(1)).unwrap_err(),
        Error::StateDimension
    );
}

#[test]
fn covariance_dimension_mismatch() {
    let cfg = Config::default().with_dynamics(DynamicModel::Static);
    let sky = SyntheticConstellation::default();
    let solver = Solver::new(cfg.clone(), sky.clone(), LeastSquaresDoubleDifference::default());

    let mut ctx = FilterContext::new(&cfg, sampling_epoch(0), &rover(), &Matrix3::identity())
        .with_covariance(DMatrix::identity(2, 2));

    let prior = ctx.clone();

    let epoch = sky.observation_epoch(sampling_epoch(1), &[1, 2, 3, 4, 5]);
    assert_eq!(
        solver.resolve(&mut ctx, &epoch).unwrap_err(),
        Error::StateDimension
    );
    assert_eq!(
        solver.propagate(&mut ctx, sampling_epoch(1)).unwrap_err(),
        Error::StateDimension
    );
    assert_eq!(ctx, prior);
}
