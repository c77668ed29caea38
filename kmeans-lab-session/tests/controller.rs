use std::sync::Arc;
use std::time::Duration;

use kmeans_lab_clustering::KMeansInit;
use kmeans_lab_datasets::PointDistribution;
use kmeans_lab_session::{
    Notification, Observer, PlayOutcome, RunState, SessionConfig, SessionController,
    SessionError, Snapshot, StepOutcome,
};
use ndarray::{array, Array2};
use parking_lot::Mutex;

#[derive(Default)]
struct Recorder {
    notifications: Mutex<Vec<Notification>>,
    snapshots: Mutex<Vec<Snapshot>>,
}

impl Observer for Recorder {
    fn render(&self, snapshot: &Snapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }

    fn notify(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
    }
}

const PERIOD: Duration = Duration::from_millis(500);

fn pairs() -> Array2<f64> {
    array![[0., 0.], [0., 0.1], [1., 1.], [1., 0.9]]
}

// Two tight pairs of points; farthest-first splits them on the first iteration and the
// second one converges.
fn pairs_controller() -> (SessionController, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let config = SessionConfig::default()
        .with_n_clusters(2)
        .with_init(KMeansInit::FarthestFirst)
        .with_play_interval(PERIOD)
        .with_seed(3);
    let mut controller = SessionController::new(config, recorder.clone()).unwrap();
    controller.replace_points(pairs()).unwrap();
    (controller, recorder)
}

#[tokio::test(start_paused = true)]
async fn auto_play_stops_at_convergence() {
    let (mut controller, recorder) = pairs_controller();
    assert_eq!(controller.play().unwrap(), PlayOutcome::Started);
    assert!(controller.is_playing());

    controller.join().await;
    let state = controller.state();
    assert_eq!(
        state,
        RunState {
            iteration: 2,
            converged: true,
            playing: false
        }
    );
    assert!(recorder
        .notifications
        .lock()
        .contains(&Notification::Converged { iterations: 2 }));
    // the snapshot announcing convergence is already marked as stopped
    let snapshots = recorder.snapshots.lock();
    let converged = snapshots.iter().find(|s| s.state.converged).unwrap();
    assert!(!converged.state.playing);
}

#[tokio::test(start_paused = true)]
async fn first_step_comes_one_interval_after_play() {
    let (mut controller, _) = pairs_controller();
    controller.play().unwrap();

    tokio::time::sleep(PERIOD / 2).await;
    assert_eq!(controller.state().iteration, 0);

    tokio::time::sleep(PERIOD / 2 + Duration::from_millis(10)).await;
    assert_eq!(controller.state().iteration, 1);
    assert!(controller.is_playing());
}

#[tokio::test(start_paused = true)]
async fn pause_stops_the_ticks() {
    let (mut controller, _) = pairs_controller();
    controller.play().unwrap();
    tokio::time::sleep(PERIOD + Duration::from_millis(10)).await;
    assert_eq!(controller.state().iteration, 1);

    controller.pause();
    controller.pause();
    tokio::time::sleep(PERIOD * 4).await;
    let state = controller.state();
    assert_eq!(state.iteration, 1);
    assert!(!state.playing);

    // resuming picks up where the run stopped
    assert_eq!(controller.play().unwrap(), PlayOutcome::Started);
    controller.join().await;
    assert_eq!(controller.state().iteration, 2);
}

#[tokio::test(start_paused = true)]
async fn play_twice_keeps_one_task() {
    let (mut controller, _) = pairs_controller();
    assert_eq!(controller.play().unwrap(), PlayOutcome::Started);
    assert_eq!(controller.play().unwrap(), PlayOutcome::AlreadyPlaying);

    tokio::time::sleep(PERIOD + Duration::from_millis(10)).await;
    assert_eq!(controller.state().iteration, 1);
}

#[tokio::test(start_paused = true)]
async fn play_after_convergence_is_a_no_op() {
    let (mut controller, recorder) = pairs_controller();
    controller.run_to_convergence(None).unwrap();
    assert_eq!(controller.play().unwrap(), PlayOutcome::AlreadyConverged);
    assert!(!controller.is_playing());
    assert_eq!(
        recorder.notifications.lock().last(),
        Some(&Notification::AlreadyConverged)
    );
}

#[tokio::test(start_paused = true)]
async fn reset_while_playing_stops_auto_play() {
    let (mut controller, _) = pairs_controller();
    controller.play().unwrap();
    tokio::time::sleep(PERIOD + Duration::from_millis(10)).await;

    controller.reset().unwrap();
    controller.reset().unwrap();
    tokio::time::sleep(PERIOD * 4).await;
    assert_eq!(controller.state(), RunState::default());
    assert_eq!(controller.snapshot().centroids.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn new_dataset_while_playing_stops_auto_play() {
    let (mut controller, _) = pairs_controller();
    controller.play().unwrap();
    controller
        .new_dataset(60, PointDistribution::Gaussian)
        .unwrap();
    tokio::time::sleep(PERIOD * 3).await;
    assert_eq!(controller.state(), RunState::default());
}

#[tokio::test(start_paused = true)]
async fn failed_operations_keep_auto_play_running() {
    let (mut controller, _) = pairs_controller();
    controller.play().unwrap();
    assert!(matches!(
        controller.set_n_clusters(5),
        Err(SessionError::KMeans(_))
    ));
    assert!(controller.is_playing());
    controller.join().await;
    assert!(controller.state().converged);
}

#[tokio::test]
async fn play_needs_centroids() {
    let recorder = Arc::new(Recorder::default());
    let config = SessionConfig::default().with_init(KMeansInit::Manual);
    let mut controller = SessionController::new(config, recorder.clone()).unwrap();
    assert!(matches!(controller.play(), Err(SessionError::NoDataset)));

    controller.replace_points(pairs()).unwrap();
    assert!(matches!(controller.play(), Err(SessionError::NoCentroids)));
    assert!(matches!(
        recorder.notifications.lock().last(),
        Some(Notification::Error(_))
    ));
}

#[test]
fn manual_centroids_only_move_on_step() {
    let config = SessionConfig::default().with_init(KMeansInit::Manual);
    let recorder = Arc::new(Recorder::default());
    let mut controller = SessionController::new(config, recorder).unwrap();
    controller
        .new_dataset(100, PointDistribution::Uniform)
        .unwrap();

    for (x, y) in &[(0.2, 0.2), (0.8, 0.2), (0.5, 0.8)] {
        controller.add_manual_centroid(*x, *y).unwrap();
    }
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.centroids.len(), 3);
    assert!(snapshot.points.iter().all(|p| p.cluster.is_none()));

    assert!(matches!(
        controller.step().unwrap(),
        StepOutcome::Advanced { iteration: 1, .. }
    ));
    let snapshot = controller.snapshot();
    assert!(snapshot
        .points
        .iter()
        .all(|p| matches!(p.cluster, Some(c) if c < 3)));
    assert_eq!(snapshot.cluster_sizes().iter().sum::<usize>(), 100);
}

#[test]
fn run_to_convergence_always_terminates() {
    let config = SessionConfig::default()
        .with_n_clusters(10)
        .with_tolerance(f64::MIN_POSITIVE)
        .with_seed(8);
    let mut controller = SessionController::new(config, Arc::new(Recorder::default())).unwrap();
    controller
        .new_dataset(300, PointDistribution::Uniform)
        .unwrap();
    controller.run_to_convergence(Some(100)).unwrap();
    assert!(controller.state().iteration <= 100);
}
