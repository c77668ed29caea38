//! Utility functions for randomly generating point sets

use ndarray::{array, Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Distribution, Normal, Uniform},
    RandomExt,
};

use crate::DatasetError;

/// Standard deviation of the jitter around each gaussian blob center.
pub const BLOB_STD_DEV: f64 = 0.05;

/// The three blob centers the playground draws its gaussian datasets around.
pub fn blob_centers() -> Array2<f64> {
    array![[0.3, 0.3], [0.7, 0.3], [0.5, 0.7]]
}

/// Generate `n_points` points in the unit square, each coordinate drawn independently from
/// `U[0, 1)`.
pub fn uniform(n_points: usize, rng: &mut impl Rng) -> Array2<f64> {
    Array::random_using((n_points, 2), Uniform::new(0., 1.), rng)
}

/// Given an input matrix `blob_centers`, with shape `(n_blobs, n_features)`,
/// generate `n_points` data points dealt round-robin to the blob centers.
///
/// Point `i` is sampled from a normal distribution with standard deviation `std_dev`
/// centered in blob `i % n_blobs`, then clamped into the unit hypercube.
pub fn gaussian_blobs(
    n_points: usize,
    blob_centers: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    std_dev: f64,
    rng: &mut impl Rng,
) -> Result<Array2<f64>, DatasetError> {
    let (n_blobs, n_features) = blob_centers.dim();
    if n_blobs == 0 {
        return Err(DatasetError::NoBlobCenters);
    }
    if !(std_dev.is_finite() && std_dev >= 0.) {
        return Err(DatasetError::StdDev(std_dev));
    }
    let jitter = Normal::new(0., std_dev).map_err(|_| DatasetError::StdDev(std_dev))?;

    let mut points = Array2::zeros((n_points, n_features));
    for (idx, mut point) in points.rows_mut().into_iter().enumerate() {
        let center = blob_centers.row(idx % n_blobs);
        point.zip_mut_with(&center, |coord, &c| {
            *coord = (c + jitter.sample(rng)).max(0.).min(1.);
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray_rand::rand::SeedableRng;
    use rand_isaac::Isaac64Rng;

    #[test]
    fn uniform_points_stay_in_unit_square() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let points = uniform(500, &mut rng);
        assert_eq!(points.dim(), (500, 2));
        assert!(points.iter().all(|&v| (0. ..1.).contains(&v)));
    }

    #[test]
    fn blobs_are_dealt_round_robin() {
        let mut rng = Isaac64Rng::seed_from_u64(42);
        let centers = blob_centers();
        let points = gaussian_blobs(300, &centers, BLOB_STD_DEV, &mut rng).unwrap();
        assert_eq!(points.dim(), (300, 2));

        for blob in 0..3 {
            let members: Vec<_> = points.rows().into_iter().skip(blob).step_by(3).collect();
            assert_eq!(members.len(), 100);
            let mean_x = members.iter().map(|p| p[0]).sum::<f64>() / 100.;
            let mean_y = members.iter().map(|p| p[1]).sum::<f64>() / 100.;
            assert_abs_diff_eq!(mean_x, centers[[blob, 0]], epsilon = 0.03);
            assert_abs_diff_eq!(mean_y, centers[[blob, 1]], epsilon = 0.03);
        }
    }

    #[test]
    fn blobs_are_clamped() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        let centers = array![[0.0, 1.0]];
        let points = gaussian_blobs(200, &centers, 0.5, &mut rng).unwrap();
        assert!(points.iter().all(|&v| (0. ..=1.).contains(&v)));
    }

    #[test]
    fn invalid_std_dev_is_rejected() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        let res = gaussian_blobs(10, &blob_centers(), -1., &mut rng);
        assert!(matches!(res, Err(DatasetError::StdDev(_))));
    }

    #[test]
    fn non_finite_std_dev_is_rejected() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        for std_dev in &[f64::NAN, f64::INFINITY] {
            let res = gaussian_blobs(10, &blob_centers(), *std_dev, &mut rng);
            assert!(matches!(res, Err(DatasetError::StdDev(_))));
        }
    }

    #[test]
    fn zero_std_dev_puts_points_on_the_centers() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        let centers = blob_centers();
        let points = gaussian_blobs(6, &centers, 0., &mut rng).unwrap();
        assert_abs_diff_eq!(points.row(4), centers.row(1));
    }

    #[test]
    fn blobs_need_a_center() {
        let mut rng = Isaac64Rng::seed_from_u64(3);
        let res = gaussian_blobs(10, &Array2::zeros((0, 2)), BLOB_STD_DEV, &mut rng);
        assert!(matches!(res, Err(DatasetError::NoBlobCenters)));
    }
}
