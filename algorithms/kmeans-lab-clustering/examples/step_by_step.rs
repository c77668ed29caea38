use kmeans_lab_clustering::{KMeansEngine, KMeansInit};
use kmeans_lab_datasets::PointDistribution;
use ndarray_rand::rand::SeedableRng;
use rand_isaac::Isaac64Rng;

// Watch Lloyd's algorithm at work: generate three gaussian blobs, seed the centroids with
// farthest-first traversal and print the objective after every iteration.
fn main() {
    // Our random number generator, seeded for reproducibility
    let mut rng = Isaac64Rng::seed_from_u64(42);

    let observations = PointDistribution::Gaussian
        .generate(300, &mut rng)
        .expect("valid distribution");

    let mut engine = KMeansEngine::params_with_rng(3, rng)
        .init_method(KMeansInit::FarthestFirst)
        .tolerance(1e-5)
        .build(observations)
        .expect("valid parameters");
    engine
        .initialize_centroids()
        .expect("enough points for three centroids");

    let max_n_iterations = engine.hyperparams().max_n_iterations();
    for iteration in 1..=max_n_iterations {
        let converged = engine.iterate();
        println!(
            "iteration {:>3}: inertia {:.5}, cluster sizes {:?}",
            iteration,
            engine.inertia(),
            engine.cluster_sizes()
        );
        if converged {
            println!("converged");
            break;
        }
    }

    for (idx, centroid) in engine.centroids().rows().into_iter().enumerate() {
        println!("centroid {}: ({:.3}, {:.3})", idx, centroid[0], centroid[1]);
    }
}
