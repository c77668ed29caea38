use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion,
    PlotConfiguration,
};
use kmeans_lab_clustering::{KMeansEngine, KMeansInit};
use kmeans_lab_datasets::PointDistribution;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;

fn k_means_bench(c: &mut Criterion) {
    let mut rng = Isaac64Rng::seed_from_u64(40);
    let dataset_sizes = vec![(100, 3), (300, 5), (1000, 8)];

    let mut benchmark = c.benchmark_group("lloyd_k_means");
    benchmark.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));
    for (n_points, n_clusters) in dataset_sizes {
        let observations = PointDistribution::Gaussian
            .generate(n_points, &mut rng)
            .unwrap();
        for init in &[
            KMeansInit::Random,
            KMeansInit::FarthestFirst,
            KMeansInit::KMeansPlusPlus,
        ] {
            let id = BenchmarkId::new(init.to_string(), n_points);
            benchmark.bench_function(id, |bencher| {
                bencher.iter(|| {
                    let mut engine =
                        KMeansEngine::params_with_rng(black_box(n_clusters), rng.clone())
                            .init_method(*init)
                            .build(observations.clone())
                            .unwrap();
                    engine.initialize_centroids().unwrap();
                    for _ in 0..100 {
                        if engine.iterate() {
                            break;
                        }
                    }
                    engine
                });
            });
        }
    }

    benchmark.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = k_means_bench
}
criterion_main!(benches);
