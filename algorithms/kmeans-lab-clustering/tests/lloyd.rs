use approx::assert_abs_diff_eq;
use kmeans_lab_clustering::{KMeansEngine, KMeansInit, DEFAULT_MAX_N_ITERATIONS};
use kmeans_lab_datasets::PointDistribution;
use ndarray::{array, aview1, Array2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

const AUTOMATIC: [KMeansInit; 3] = [
    KMeansInit::Random,
    KMeansInit::FarthestFirst,
    KMeansInit::KMeansPlusPlus,
];

fn dataset(distribution: PointDistribution, n_points: usize, seed: u64) -> Array2<f64> {
    distribution
        .generate(n_points, &mut Xoshiro256Plus::seed_from_u64(seed))
        .expect("valid distribution")
}

// Runs until convergence or the cap, returning the number of iterations performed.
fn run_capped(engine: &mut KMeansEngine<f64, Xoshiro256Plus>, cap: u64) -> (u64, bool) {
    for n_iter in 1..=cap {
        if engine.iterate() {
            return (n_iter, true);
        }
    }
    (cap, false)
}

#[test]
fn every_automatic_method_recovers_the_gaussian_blobs() {
    let observations = dataset(PointDistribution::Gaussian, 300, 42);
    for init in AUTOMATIC.iter() {
        let mut engine = KMeansEngine::params_with_rng(3, Xoshiro256Plus::seed_from_u64(1))
            .init_method(*init)
            .build(observations.clone())
            .unwrap();
        engine.initialize_centroids().unwrap();
        assert_eq!(engine.n_clusters(), 3);

        let (_, converged) = run_capped(&mut engine, DEFAULT_MAX_N_ITERATIONS);
        assert!(converged, "{} did not converge", init);
        assert!(engine
            .memberships()
            .iter()
            .all(|m| matches!(m, Some(c) if *c < 3)));
    }
}

#[test]
fn farthest_first_finds_each_blob() {
    let observations = dataset(PointDistribution::Gaussian, 300, 7);
    let mut engine = KMeansEngine::params_with_rng(3, Xoshiro256Plus::seed_from_u64(3))
        .init_method(KMeansInit::FarthestFirst)
        .build(observations)
        .unwrap();
    engine.initialize_centroids().unwrap();
    run_capped(&mut engine, DEFAULT_MAX_N_ITERATIONS);

    // blobs are dealt round-robin, so each holds a third of the points
    for size in engine.cluster_sizes() {
        assert!((95..=105).contains(&size), "unbalanced cluster of {} points", size);
    }
}

#[test]
fn capped_runs_always_terminate() {
    let observations = dataset(PointDistribution::Uniform, 200, 11);
    for init in AUTOMATIC.iter() {
        let mut engine = KMeansEngine::params_with_rng(8, Xoshiro256Plus::seed_from_u64(5))
            .init_method(*init)
            .tolerance(f64::MIN_POSITIVE)
            .build(observations.clone())
            .unwrap();
        engine.initialize_centroids().unwrap();
        let (n_iter, _) = run_capped(&mut engine, 100);
        assert!(n_iter <= 100);
    }
}

#[test]
fn objective_is_non_increasing_on_uniform_data() {
    let observations = dataset(PointDistribution::Uniform, 250, 13);
    for init in AUTOMATIC.iter() {
        let mut engine = KMeansEngine::params_with_rng(5, Xoshiro256Plus::seed_from_u64(17))
            .init_method(*init)
            .build(observations.clone())
            .unwrap();
        engine.initialize_centroids().unwrap();
        engine.assign_points_to_clusters();
        let mut previous = engine.inertia();
        for _ in 0..DEFAULT_MAX_N_ITERATIONS {
            let converged = engine.iterate();
            engine.assign_points_to_clusters();
            let current = engine.inertia();
            assert!(current <= previous + 1e-9, "{} increased the objective", init);
            previous = current;
            if converged {
                break;
            }
        }
    }
}

#[test]
fn manual_placement_grows_one_centroid_at_a_time() {
    let observations = array![[0., 0.], [0., 0.1], [1., 1.], [1., 0.9]];
    let mut engine = KMeansEngine::params_with_rng(0, Xoshiro256Plus::seed_from_u64(0))
        .init_method(KMeansInit::Manual)
        .build(observations)
        .unwrap();

    for (n, seed) in [[0.1, 0.1], [0.9, 0.9], [0.5, 0.5]].iter().enumerate() {
        engine.add_centroid(aview1(seed)).unwrap();
        assert_eq!(engine.n_clusters(), n + 1);
        assert!(engine.memberships().iter().all(Option::is_none));
    }

    engine.iterate();
    assert_eq!(engine.cluster_sizes(), vec![2, 2, 0]);
    let centroids = engine.centroids();
    assert_abs_diff_eq!(centroids.row(2), array![0.5, 0.5]);
}
