//! Integration tests for batch generation
//!
//! These tests run the full propose-thin-accept loop:
//! - accepted sequences are time ordered and never exceeded the bound
//! - the batch is shaped by its longest sequence and zero padded
//! - thinning visits proposals in time order with one uniform draw each
//! - an attempt that overshoots the bound is discarded and redrawn
//! - unreachable acceptance criteria terminate under a retry limit

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use stppg::kernel::{GaussianDiffusionKernel, GaussianShape, StdDiffusionKernel};
use stppg::{
    HawkesIntensity, Intensity, Interval, SamplerConfig, SpatialTemporalPointProcess, StppError,
};

fn unit() -> Interval {
    Interval::new(0.0, 1.0).unwrap()
}

#[test]
fn test_accepted_sequences_respect_order_and_bound() {
    let kernel = GaussianDiffusionKernel::new(
        GaussianShape { sigma_x: 0.2, sigma_y: 0.3, rho: 0.4, ..GaussianShape::default() },
        2.0,
        0.5,
    )
    .unwrap();
    let lam = HawkesIntensity::new(3.0, kernel, 60.0).unwrap();
    let pp = SpatialTemporalPointProcess::with_config(lam, SamplerConfig { max_attempts: Some(1000) });

    let time = Interval::new(0.0, 5.0).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(12345);
    let batch = pp.generate(time, &[unit(), unit()], 6, 3, false, &mut rng).unwrap();

    for i in 0..batch.batch_size() {
        let events = batch.events(i);
        assert!(events.len() >= 3);
        assert!(events.windows(2).all(|w| w[0].t <= w[1].t));
        assert!(events.iter().all(|e| time.contains(e.t)));

        // Re-evaluate every acceptance with the history it was judged against
        let mut his_t = Vec::new();
        let mut his_s = Vec::new();
        for event in &events {
            let value = pp.intensity().value(event.t, &his_t, event.s, &his_s).unwrap();
            assert!(value <= pp.intensity().upper_bound(), "intensity {} above bound", value);
            his_t.push(event.t);
            his_s.push(event.s);
        }
    }
}

#[test]
fn test_batch_shape_and_padding() {
    let kernel = StdDiffusionKernel::new(0.5, 1.0, 0.1, 0.1).unwrap();
    let lam = HawkesIntensity::new(8.0, kernel, 200.0).unwrap();
    let pp = SpatialTemporalPointProcess::with_config(lam, SamplerConfig { max_attempts: Some(1000) });

    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let batch = pp.generate(unit(), &[unit(), unit()], 5, 1, false, &mut rng).unwrap();

    let max_len = *batch.lengths().iter().max().unwrap();
    assert_eq!(batch.data().shape(), &[5, max_len, 3]);
    for (i, &len) in batch.lengths().iter().enumerate() {
        for j in len..max_len {
            for d in 0..3 {
                assert_eq!(batch.data()[[i, j, d]], 0.0);
            }
        }
        assert_eq!(batch.sequence(i).nrows(), len);
    }

    let (data, lengths) = batch.into_parts();
    assert_eq!(data.shape()[0], lengths.len());
}

#[test]
fn test_first_retained_event_is_first_passing_proposal() {
    let mu = 4.0;
    let bound = 10.0;
    let kernel = StdDiffusionKernel::new(0.1, 1.0, 1.0, 1.0).unwrap();
    let pp = SpatialTemporalPointProcess::new(HawkesIntensity::new(mu, kernel, bound).unwrap());

    // With empty history the intensity is the background rate, so the first
    // acceptance is the first draw with mu >= D * bound
    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let proposals = pp.homogeneous_poisson_sampling(unit(), &[unit(), unit()], &mut rng).unwrap();
        assert!(proposals.windows(2).all(|w| w[0].t <= w[1].t));

        let mut replay = rng.clone();
        let first = proposals.iter().position(|_| {
            let d: f64 = replay.gen();
            mu >= d * bound
        });
        let Some(first) = first else { continue };

        match pp.inhomogeneous_poisson_thinning(&proposals, false, &mut rng) {
            Ok(retained) => {
                assert_eq!(retained[0], proposals[first]);
                assert!(retained.iter().all(|e| e.t >= retained[0].t));
            }
            Err(StppError::BoundViolation { time, .. }) => assert!(time > proposals[first].t),
            Err(e) => panic!("unexpected error: {}", e),
        }
        return;
    }
    panic!("no seed produced an accepted proposal");
}

#[test]
fn test_bound_violation_is_redrawn() {
    // Bound only half again above the background: a proposal landing close
    // after an accepted event overshoots it
    let mu = 5.0;
    let bound = 7.5;
    let kernel = StdDiffusionKernel::new(0.5, 1.0, 0.1, 0.1).unwrap();
    let lam = HawkesIntensity::new(mu, kernel, bound).unwrap();
    let single = SpatialTemporalPointProcess::with_config(lam.clone(), SamplerConfig { max_attempts: Some(1) });
    let pp = SpatialTemporalPointProcess::with_config(lam, SamplerConfig { max_attempts: Some(10_000) });
    let space = [unit(), unit()];

    for seed in 0..256 {
        // Replay the first attempt to find a seed whose first draw overshoots
        let mut replay = ChaCha8Rng::seed_from_u64(seed);
        let proposals = pp.homogeneous_poisson_sampling(unit(), &space, &mut replay).unwrap();
        match pp.inhomogeneous_poisson_thinning(&proposals, false, &mut replay) {
            Err(StppError::BoundViolation { .. }) => {}
            Ok(_) => continue,
            Err(e) => panic!("unexpected error: {}", e),
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let result = single.generate(unit(), &space, 1, 1, false, &mut rng);
        assert!(matches!(result, Err(StppError::RetriesExhausted { slot: 0, attempts: 1 })));

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let batch = pp.generate(unit(), &space, 1, 1, false, &mut rng).unwrap();
        let events = batch.events(0);
        assert!(!events.is_empty());

        let mut his_t = Vec::new();
        let mut his_s = Vec::new();
        for event in &events {
            let value = pp.intensity().value(event.t, &his_t, event.s, &his_s).unwrap();
            assert!(value <= bound, "intensity {} above bound", value);
            his_t.push(event.t);
            his_s.push(event.s);
        }
        return;
    }
    panic!("no seed overshot the bound on its first attempt");
}

#[test]
fn test_same_seed_same_batch() {
    let kernel = StdDiffusionKernel::new(0.5, 1.0, 0.2, 0.2).unwrap();
    let lam = HawkesIntensity::new(5.0, kernel, 100.0).unwrap();
    let pp = SpatialTemporalPointProcess::with_config(lam, SamplerConfig { max_attempts: Some(1000) });

    let mut a = ChaCha8Rng::seed_from_u64(7);
    let mut b = ChaCha8Rng::seed_from_u64(7);
    let first = pp.generate(unit(), &[unit(), unit()], 3, 1, false, &mut a).unwrap();
    let second = pp.generate(unit(), &[unit(), unit()], 3, 1, false, &mut b).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_no_background_never_starts() {
    // Without a background rate nothing can trigger the first event
    let kernel = StdDiffusionKernel::new(1.0, 1.0, 1.0, 1.0).unwrap();
    let lam = HawkesIntensity::new(0.0, kernel, 1e4).unwrap();
    let pp = SpatialTemporalPointProcess::with_config(lam, SamplerConfig { max_attempts: Some(3) });

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let result = pp.generate(unit(), &[unit(), unit()], 1, 1, false, &mut rng);
    assert!(matches!(result, Err(StppError::RetriesExhausted { slot: 0, attempts: 3 })));
}

#[test]
fn test_unreachable_min_points_terminates() {
    let kernel = StdDiffusionKernel::new(0.1, 1.0, 0.5, 0.5).unwrap();
    let lam = HawkesIntensity::new(1.0, kernel, 5.0).unwrap();
    let pp = SpatialTemporalPointProcess::with_config(lam, SamplerConfig { max_attempts: Some(20) });

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let result = pp.generate(unit(), &[unit(), unit()], 2, 1000, true, &mut rng);
    assert!(matches!(result, Err(StppError::RetriesExhausted { attempts: 20, .. })));
}

#[test]
fn test_kernel_errors_are_not_retried() {
    use stppg::kernel::{SpatialField, SpatialShape, SpatialVariantGaussianDiffusionKernel};

    // Correlation leaves its domain on the right half of the square
    let shape = SpatialShape { rho: SpatialField::linear(0.0, 2.0, 0.0), ..SpatialShape::default() };
    let kernel = SpatialVariantGaussianDiffusionKernel::new(shape, 1.0, 1.0).unwrap();
    let lam = HawkesIntensity::new(50.0, kernel, 1e3).unwrap();
    let pp = SpatialTemporalPointProcess::new(lam);

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let result = pp.generate(unit(), &[unit(), unit()], 1, 1, false, &mut rng);
    assert!(matches!(result, Err(StppError::InvalidFieldValue { field: "rho", .. })));
}
