use crate::k_means::{KMeansParams, KMeansValidParams};
use crate::{KMeansError, KMeansInit};
use kmeans_lab::distance::{Distance, L2Dist};
use kmeans_lab::error::Error as LabError;
use kmeans_lab::{ensure_finite, Float, ParamGuard};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Data, Ix1, Ix2, Zip};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;

/// K-means clustering partitions a set of points into clusters, where each point belongs to
/// the cluster with the nearest mean.
///
/// The mean of the points within a cluster is called *centroid*.
///
/// `KMeansEngine` runs the _standard algorithm_ (also known as Lloyd's Algorithm) one
/// iteration at a time, so that a caller can watch, pause and resume the clustering:
///
/// - initialisation step: select initial centroids using one of the [`KMeansInit`]
///   strategies, or place them by hand with [`KMeansInit::Manual`];
/// - assignment step: assign each point to the nearest centroid;
/// - update step: move each centroid to the mean of its assigned points.
///
/// A centroid whose cluster ends up empty stays where it is, so it can win points back in a
/// later iteration.
///
/// [`iterate`](KMeansEngine::iterate) performs one assignment step followed by one update
/// step and reports whether no centroid moved by more than `tolerance`. The engine never
/// limits the number of iterations: callers looping until convergence should stop after
/// [`max_n_iterations`](KMeansValidParams::max_n_iterations).
///
/// ## Tutorial
///
/// ```
/// use kmeans_lab_clustering::{KMeansEngine, KMeansInit};
/// use ndarray::array;
/// use ndarray_rand::rand::SeedableRng;
/// use rand_isaac::Isaac64Rng;
///
/// let observations = array![[0., 0.], [0., 0.1], [1., 1.], [1., 0.9]];
/// let rng = Isaac64Rng::seed_from_u64(42);
/// let mut engine = KMeansEngine::params_with_rng(2, rng)
///     .init_method(KMeansInit::FarthestFirst)
///     .build(observations)
///     .expect("valid parameters");
///
/// engine.initialize_centroids().expect("enough points");
/// let mut iterations = 1;
/// while !engine.iterate() {
///     iterations += 1;
/// }
/// assert_eq!(iterations, 2);
/// assert_eq!(engine.cluster_sizes(), vec![2, 2]);
/// ```
pub struct KMeansEngine<F: Float, R: Rng = Isaac64Rng, D: Distance<F> = L2Dist> {
    params: KMeansValidParams<F, R, D>,
    // (n_points, n_features)
    observations: Array2<F>,
    // (n_points,), `None` until the first assignment step
    memberships: Vec<Option<usize>>,
    // (n_centroids, n_features)
    centroids: Array2<F>,
}

impl<F: Float> KMeansEngine<F, Isaac64Rng, L2Dist> {
    /// Parameters for an engine seeded from system entropy.
    pub fn params(n_clusters: usize) -> KMeansParams<F, Isaac64Rng, L2Dist> {
        KMeansParams::new(n_clusters, Isaac64Rng::from_entropy(), L2Dist)
    }

    pub fn params_with_rng<R: Rng>(n_clusters: usize, rng: R) -> KMeansParams<F, R, L2Dist> {
        KMeansParams::new(n_clusters, rng, L2Dist)
    }
}

impl<F: Float, R: Rng, D: Distance<F>> KMeansParams<F, R, D> {
    /// Checks the hyperparameters and builds an engine over `observations`, with shape
    /// `(n_points, n_features)`. No centroid is chosen yet.
    pub fn build(self, observations: Array2<F>) -> Result<KMeansEngine<F, R, D>, KMeansError> {
        KMeansEngine::new(self.check()?, observations)
    }
}

impl<F: Float, R: Rng, D: Distance<F>> KMeansEngine<F, R, D> {
    pub fn params_with(n_clusters: usize, rng: R, dist_fn: D) -> KMeansParams<F, R, D> {
        KMeansParams::new(n_clusters, rng, dist_fn)
    }

    /// Creates an engine over `observations` without any centroid.
    pub fn new(
        params: KMeansValidParams<F, R, D>,
        observations: Array2<F>,
    ) -> Result<Self, KMeansError> {
        ensure_finite(&observations, "observations")?;
        let n_features = observations.ncols();
        Ok(KMeansEngine {
            params,
            memberships: vec![None; observations.nrows()],
            observations,
            centroids: Array2::zeros((0, n_features)),
        })
    }

    /// Chooses the initial centroids with the configured strategy and forgets every
    /// membership. Does nothing for [`KMeansInit::Manual`].
    pub fn initialize_centroids(&mut self) -> Result<(), KMeansError> {
        let init = self.params.init_method();
        if init.is_manual() {
            return Ok(());
        }

        let n_points = self.observations.nrows();
        let n_clusters = self.params.n_clusters();
        if n_points == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        if n_clusters > n_points {
            return Err(KMeansError::TooManyClusters {
                n_clusters,
                n_points,
            });
        }

        let dist_fn = self.params.dist_fn().clone();
        if let Some(centroids) = init.run(
            &dist_fn,
            n_clusters,
            self.observations.view(),
            self.params.rng_mut(),
        ) {
            self.centroids = centroids;
        }
        self.reset_memberships();
        tracing::debug!(method = %init, n_clusters, n_points, "initialized centroids");
        Ok(())
    }

    /// Assigns every point to its closest centroid, the lowest index winning ties.
    /// Memberships are left untouched while there is no centroid.
    pub fn assign_points_to_clusters(&mut self) {
        if self.centroids.nrows() == 0 {
            return;
        }
        let dist_fn = self.params.dist_fn();
        for (observation, membership) in self
            .observations
            .rows()
            .into_iter()
            .zip(self.memberships.iter_mut())
        {
            *membership = Some(closest_centroid(dist_fn, &self.centroids, &observation).0);
        }
    }

    /// Moves every centroid to the mean of the points assigned to it. Centroids without
    /// points keep their position.
    pub fn update_centroids(&mut self) {
        let centroids = compute_centroids(&self.centroids, &self.observations, &self.memberships);
        self.centroids = centroids;
    }

    /// One assignment step followed by one update step. Returns `true` if no centroid moved
    /// by more than `tolerance`.
    pub fn iterate(&mut self) -> bool {
        let old_centroids = self.centroids.clone();
        self.assign_points_to_clusters();
        self.update_centroids();

        let shift = max_centroid_shift(
            self.params.dist_fn(),
            &old_centroids.view(),
            &self.centroids.view(),
        );
        let converged = shift <= self.params.tolerance();
        tracing::trace!(%shift, converged, "k-means iteration");
        converged
    }

    /// Appends a centroid placed by hand. The number of clusters grows by one, memberships
    /// stay as they are until the next assignment step.
    pub fn add_centroid(&mut self, centroid: ArrayView1<F>) -> Result<(), KMeansError> {
        if !self.params.init_method().is_manual() {
            return Err(KMeansError::NotManual);
        }
        self.check_features(centroid.len())?;
        ensure_finite(&centroid, "centroid")?;
        self.centroids
            .push_row(centroid)
            .map_err(LabError::from)?;
        Ok(())
    }

    /// Replaces every centroid with the rows of `centroids` and forgets every membership.
    pub fn set_centroids(&mut self, centroids: Array2<F>) -> Result<(), KMeansError> {
        if !self.params.init_method().is_manual() {
            return Err(KMeansError::NotManual);
        }
        self.check_features(centroids.ncols())?;
        ensure_finite(&centroids, "centroids")?;
        self.centroids = centroids;
        self.reset_memberships();
        Ok(())
    }

    /// Drops every centroid and membership.
    pub fn clear_centroids(&mut self) {
        self.centroids = Array2::zeros((0, self.observations.ncols()));
        self.reset_memberships();
    }

    /// Replaces the point set. Centroids are kept, memberships are forgotten.
    pub fn set_observations(&mut self, observations: Array2<F>) -> Result<(), KMeansError> {
        ensure_finite(&observations, "observations")?;
        if self.centroids.nrows() > 0 && observations.ncols() != self.centroids.ncols() {
            return Err(LabError::FeatureMismatch {
                expected: self.centroids.ncols(),
                found: observations.ncols(),
            }
            .into());
        }
        if self.centroids.nrows() == 0 {
            self.centroids = Array2::zeros((0, observations.ncols()));
        }
        self.memberships = vec![None; observations.nrows()];
        self.observations = observations;
        Ok(())
    }

    /// Marks every point as unassigned.
    pub fn reset_memberships(&mut self) {
        self.memberships.iter_mut().for_each(|m| *m = None);
    }

    /// Return the set of points as a 2-dimensional matrix with shape
    /// `(n_points, n_features)`.
    pub fn observations(&self) -> ArrayView2<F> {
        self.observations.view()
    }

    /// The cluster of every point, `None` before its first assignment.
    pub fn memberships(&self) -> &[Option<usize>] {
        &self.memberships
    }

    /// Return the set of centroids as a 2-dimensional matrix with shape
    /// `(n_centroids, n_features)`.
    pub fn centroids(&self) -> ArrayView2<F> {
        self.centroids.view()
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn n_points(&self) -> usize {
        self.observations.nrows()
    }

    pub fn init_method(&self) -> KMeansInit {
        self.params.init_method()
    }

    /// The checked hyperparameters the engine was built with
    pub fn hyperparams(&self) -> &KMeansValidParams<F, R, D> {
        &self.params
    }

    /// Return the sum of squared distances between each assigned point and its centroid.
    pub fn inertia(&self) -> F {
        let dist_fn = self.params.dist_fn();
        self.observations
            .rows()
            .into_iter()
            .zip(self.memberships.iter())
            .filter_map(|(observation, membership)| {
                membership.map(|c| {
                    let dist = dist_fn.distance(observation, self.centroids.row(c));
                    dist * dist
                })
            })
            .sum()
    }

    /// Return the number of points assigned to each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.nrows()];
        self.memberships.iter().flatten().for_each(|&c| sizes[c] += 1);
        sizes
    }

    /// Index of the centroid closest to `observation`, `None` while there are no centroids.
    pub fn predict(&self, observation: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Option<usize> {
        if self.centroids.nrows() == 0 {
            return None;
        }
        Some(closest_centroid(self.params.dist_fn(), &self.centroids, observation).0)
    }

    fn check_features(&self, found: usize) -> Result<(), KMeansError> {
        let expected = self.observations.ncols();
        if found == expected {
            Ok(())
        } else {
            Err(LabError::FeatureMismatch { expected, found }.into())
        }
    }
}

/// `compute_centroids` returns a 2-dimensional array,
/// where the i-th row is the mean of the observations assigned to the i-th cluster,
/// or the i-th old centroid if none is.
fn compute_centroids<F: Float>(
    // (n_centroids, n_features)
    old_centroids: &Array2<F>,
    // (n_observations, n_features)
    observations: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_observations,)
    memberships: &[Option<usize>],
) -> Array2<F> {
    let n_clusters = old_centroids.nrows();
    let mut counts: Array1<usize> = Array1::zeros(n_clusters);
    let mut sums: Array2<F> = Array2::zeros(old_centroids.dim());

    for (observation, membership) in observations.rows().into_iter().zip(memberships) {
        if let Some(c) = *membership {
            let mut sum = sums.row_mut(c);
            sum += &observation;
            counts[c] += 1;
        }
    }

    let mut centroids = old_centroids.clone();
    Zip::from(centroids.rows_mut())
        .and(sums.rows())
        .and(&counts)
        .for_each(|mut centroid, sum, &cnt| {
            if cnt > 0 {
                centroid.assign(&(&sum / F::cast(cnt)));
            }
        });
    centroids
}

// Largest distance travelled by a centroid between `old` and `new`.
fn max_centroid_shift<F: Float, D: Distance<F>>(
    dist_fn: &D,
    old: &ArrayView2<F>,
    new: &ArrayView2<F>,
) -> F {
    old.rows()
        .into_iter()
        .zip(new.rows())
        .map(|(a, b)| dist_fn.distance(a, b))
        .fold(F::zero(), |acc, d| if d > acc { d } else { acc })
}

/// Given a matrix of centroids with shape (n_centroids, n_features) and an observation,
/// return the index of the closest centroid (the index of the corresponding row in `centroids`)
/// and its reduced distance. The first of several equally close centroids wins.
pub(crate) fn closest_centroid<F: Float, D: Distance<F>>(
    dist_fn: &D,
    // (n_centroids, n_features)
    centroids: &ArrayBase<impl Data<Elem = F>, Ix2>,
    // (n_features)
    observation: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> (usize, F) {
    let mut iterator = centroids.rows().into_iter().enumerate();

    let (mut closest_index, mut minimum_distance) = match iterator.next() {
        Some((idx, first)) => (idx, dist_fn.rdistance(first, observation.view())),
        None => return (0, F::infinity()),
    };

    for (centroid_index, centroid) in iterator {
        let distance = dist_fn.rdistance(centroid, observation.view());
        if distance < minimum_distance {
            closest_index = centroid_index;
            minimum_distance = distance;
        }
    }
    (closest_index, minimum_distance)
}
