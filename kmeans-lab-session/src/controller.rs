use std::sync::Arc;
use std::time::Duration;

use kmeans_lab_clustering::KMeansInit;
use kmeans_lab_datasets::PointDistribution;
use ndarray::Array2;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{
    Observer, PlayOutcome, Result, RunOutcome, RunState, Session, SessionConfig, SessionError,
    Snapshot, StepOutcome,
};

// `tokio::time::interval` panics on a zero period
const MIN_PLAY_INTERVAL: Duration = Duration::from_millis(1);

/// Drives a [`Session`] from a control panel, running auto-play as a tokio task.
///
/// Every operation locks the session for its whole duration, and so does every auto-play
/// tick, so a tick is never observed half done. Operations that restart the run also stop
/// auto-play; a tick already waiting for the lock notices through its epoch and does
/// nothing.
///
/// ```
/// use std::sync::Arc;
/// use kmeans_lab_datasets::PointDistribution;
/// use kmeans_lab_session::{RunOutcome, SessionConfig, SessionController, TracingObserver};
///
/// let config = SessionConfig::default().with_seed(42);
/// let mut controller = SessionController::new(config, Arc::new(TracingObserver)).unwrap();
/// controller.new_dataset(200, PointDistribution::Gaussian).unwrap();
///
/// match controller.run_to_convergence(None).unwrap() {
///     RunOutcome::Converged { iterations } => assert!(iterations <= 100),
///     outcome => panic!("unexpected outcome {:?}", outcome),
/// }
/// assert_eq!(controller.cluster_sizes().iter().sum::<usize>(), 200);
/// ```
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    player: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(config: SessionConfig, observer: Arc<dyn Observer>) -> Result<Self> {
        Ok(Self::from_session(Session::new(config, observer)?))
    }

    pub fn from_session(session: Session) -> Self {
        SessionController {
            session: Arc::new(Mutex::new(session)),
            player: None,
        }
    }

    pub fn new_dataset(&mut self, n_points: usize, distribution: PointDistribution) -> Result<()> {
        let result = self.session.lock().new_dataset(n_points, distribution);
        self.sync_player();
        result
    }

    pub fn new_default_dataset(&mut self) -> Result<()> {
        let result = self.session.lock().new_default_dataset();
        self.sync_player();
        result
    }

    pub fn replace_points(&mut self, points: Array2<f64>) -> Result<()> {
        let result = self.session.lock().replace_points(points);
        self.sync_player();
        result
    }

    pub fn step(&mut self) -> Result<StepOutcome> {
        let result = self.session.lock().step();
        self.sync_player();
        result
    }

    /// Stops auto-play, then iterates until convergence or `max_n_iterations`.
    pub fn run_to_convergence(&mut self, max_n_iterations: Option<u64>) -> Result<RunOutcome> {
        self.pause();
        self.session.lock().run_to_convergence(max_n_iterations)
    }

    /// Starts stepping once per `play_interval`, the first step one interval from now.
    /// Auto-play stops by itself on convergence.
    ///
    /// Must be called from within a tokio runtime.
    pub fn play(&mut self) -> Result<PlayOutcome> {
        let mut session = self.session.lock();
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => return session.report(Err(SessionError::NoRuntime)),
        };

        let outcome = session.begin_play()?;
        if outcome == PlayOutcome::Started {
            let epoch = session.epoch();
            let period = session.config().play_interval.max(MIN_PLAY_INTERVAL);
            drop(session);
            self.spawn_player(&runtime, epoch, period);
        }
        Ok(outcome)
    }

    /// Stops auto-play. Does nothing when not playing.
    pub fn pause(&mut self) {
        self.session.lock().pause();
        self.stop_player();
    }

    pub fn reset(&mut self) -> Result<()> {
        let result = self.session.lock().reset();
        self.sync_player();
        result
    }

    pub fn add_manual_centroid(&mut self, x: f64, y: f64) -> Result<()> {
        let result = self.session.lock().add_manual_centroid(x, y);
        self.sync_player();
        result
    }

    pub fn set_init_method(&mut self, init: KMeansInit) -> Result<()> {
        let result = self.session.lock().set_init_method(init);
        self.sync_player();
        result
    }

    pub fn set_n_clusters(&mut self, n_clusters: usize) -> Result<()> {
        let result = self.session.lock().set_n_clusters(n_clusters);
        self.sync_player();
        result
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.lock().snapshot()
    }

    pub fn state(&self) -> RunState {
        self.session.lock().state()
    }

    pub fn is_playing(&self) -> bool {
        self.session.lock().is_playing()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.session.lock().cluster_sizes()
    }

    pub fn config(&self) -> SessionConfig {
        self.session.lock().config().clone()
    }

    /// Waits until the running auto-play stops by itself. Returns at once when not playing.
    pub async fn join(&mut self) {
        if let Some(player) = self.player.take() {
            if let Err(err) = player.await {
                if err.is_panic() {
                    tracing::error!(error = %err, "auto-play task panicked");
                }
            }
        }
    }

    fn spawn_player(&mut self, runtime: &Handle, epoch: u64, period: Duration) {
        let session = Arc::clone(&self.session);
        let player = runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let keep_playing = session.lock().tick(epoch);
                if !keep_playing {
                    break;
                }
            }
            tracing::debug!(epoch, "auto-play stopped");
        });

        if let Some(previous) = self.player.replace(player) {
            previous.abort();
        }
        tracing::info!(
            epoch,
            interval_ms = period.as_millis() as u64,
            "auto-play started"
        );
    }

    // Drops the auto-play task once the session stopped playing.
    fn sync_player(&mut self) {
        let playing = self.session.lock().is_playing();
        if !playing {
            self.stop_player();
        }
    }

    fn stop_player(&mut self) {
        if let Some(player) = self.player.take() {
            player.abort();
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop_player();
    }
}
