use std::sync::Arc;

use kmeans_lab::error::Error as LabError;
use kmeans_lab::ParamGuard;
use kmeans_lab_clustering::{KMeansEngine, KMeansError, KMeansInit, KMeansParamsError};
use kmeans_lab_datasets::PointDistribution;
use ndarray::{aview1, Array2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;

use crate::{
    Notification, Observer, Result, RunState, SessionConfig, SessionError, Snapshot,
    DEFAULT_N_CLUSTERS,
};

/// Result of a single [`Session::step`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// One iteration was performed; `iteration` is the new iteration count.
    Advanced { iteration: u64, converged: bool },
    /// Nothing to do, the current run has already converged.
    AlreadyConverged,
}

/// Result of [`Session::run_to_convergence`]. `iterations` counts the iterations performed by
/// that call only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Converged { iterations: u64 },
    MaxIterationsReached { iterations: u64 },
    AlreadyConverged,
}

/// Result of starting auto-play
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Started,
    AlreadyPlaying,
    AlreadyConverged,
}

/// The state behind an interactive K-means playground.
///
/// A `Session` owns the current dataset and its [`KMeansEngine`], the [`RunState`] of the
/// current run and the random generator new datasets and engines are drawn from. Every
/// operation either succeeds and renders a fresh [`Snapshot`], or fails with a
/// [`SessionError`], leaves the session untouched and emits [`Notification::Error`].
///
/// `Session` is synchronous. Auto-play is driven from outside through
/// [`begin_play`](Session::begin_play), [`tick`](Session::tick) and
/// [`pause`](Session::pause); [`SessionController`](crate::SessionController) does this
/// with a tokio task.
pub struct Session {
    config: SessionConfig,
    engine: Option<KMeansEngine<f64>>,
    state: RunState,
    rng: Isaac64Rng,
    observer: Arc<dyn Observer>,
    // bumped whenever a running auto-play has to stop
    epoch: u64,
}

impl Session {
    /// Creates a session without any dataset. Fails if `config` holds an invalid
    /// hyperparameter.
    pub fn new(config: SessionConfig, observer: Arc<dyn Observer>) -> Result<Self> {
        check_params(&config, config.init, config.n_clusters)?;
        let rng = match config.seed {
            Some(seed) => Isaac64Rng::seed_from_u64(seed),
            None => Isaac64Rng::from_entropy(),
        };
        Ok(Session {
            config,
            engine: None,
            state: RunState::default(),
            rng,
            observer,
            epoch: 0,
        })
    }

    /// Replaces the dataset with `n_points` points drawn from `distribution`.
    ///
    /// Automatic methods pick fresh centroids, `Manual` keeps the placed ones. The run
    /// starts over and auto-play stops.
    pub fn new_dataset(&mut self, n_points: usize, distribution: PointDistribution) -> Result<()> {
        let result = self.try_new_dataset(n_points, distribution);
        self.report(result)
    }

    /// [`new_dataset`](Session::new_dataset) with the configured size and distribution.
    pub fn new_default_dataset(&mut self) -> Result<()> {
        self.new_dataset(self.config.n_points, self.config.distribution)
    }

    /// Replaces the dataset with `points`, a `(n_points, 2)` matrix, with the same effects as
    /// [`new_dataset`](Session::new_dataset).
    pub fn replace_points(&mut self, points: Array2<f64>) -> Result<()> {
        let result = self.install_points(points).map(|()| self.render());
        self.report(result)
    }

    /// Performs one iteration of the current run.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let result = self.try_step();
        self.report(result)
    }

    /// Iterates until convergence or until `max_n_iterations` iterations were performed,
    /// `None` falling back to the configured cap.
    pub fn run_to_convergence(&mut self, max_n_iterations: Option<u64>) -> Result<RunOutcome> {
        let result = self.try_run_to_convergence(max_n_iterations);
        self.report(result)
    }

    /// Starts the run over: automatic methods pick fresh centroids, `Manual` drops the placed
    /// ones. Valid at any time.
    pub fn reset(&mut self) -> Result<()> {
        let result = self.try_reset();
        self.report(result)
    }

    /// Places a centroid at `(x, y)`. Only valid with [`KMeansInit::Manual`] once a dataset
    /// exists. Memberships are kept until the next step.
    pub fn add_manual_centroid(&mut self, x: f64, y: f64) -> Result<()> {
        let result = self.try_add_manual_centroid(x, y);
        self.report(result)
    }

    /// Switches the initialization method. Switching to `Manual` drops every centroid,
    /// switching to an automatic method picks `n_clusters` fresh ones, falling back to
    /// [`DEFAULT_N_CLUSTERS`] when no cluster count was set.
    pub fn set_init_method(&mut self, init: KMeansInit) -> Result<()> {
        let n_clusters = match self.config.n_clusters {
            0 if !init.is_manual() => DEFAULT_N_CLUSTERS,
            n_clusters => n_clusters,
        };
        let result = self.rebuild(init, n_clusters);
        self.report(result)
    }

    /// Changes the number of clusters of the automatic methods and picks fresh centroids.
    pub fn set_n_clusters(&mut self, n_clusters: usize) -> Result<()> {
        let result = if self.config.init.is_manual() {
            Err(SessionError::ManualClusterCount)
        } else {
            self.rebuild(self.config.init, n_clusters)
        };
        self.report(result)
    }

    /// Marks the run as playing. Every following [`tick`](Session::tick) carrying the
    /// returned [`epoch`](Session::epoch) performs one step.
    pub fn begin_play(&mut self) -> Result<PlayOutcome> {
        let result = self.try_begin_play();
        self.report(result)
    }

    /// One auto-play step. Ticks of an older epoch, or arriving while paused, do nothing.
    /// Returns whether auto-play goes on.
    pub fn tick(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch || !self.state.playing {
            return false;
        }
        match self.step() {
            Ok(StepOutcome::Advanced { converged, .. }) => !converged,
            Ok(StepOutcome::AlreadyConverged) | Err(_) => {
                self.state.playing = false;
                self.render();
                false
            }
        }
    }

    /// Stops auto-play. Does nothing when not playing.
    pub fn pause(&mut self) {
        if self.state.playing {
            self.state.playing = false;
            self.epoch += 1;
            tracing::debug!(iteration = self.state.iteration, "paused");
            self.render();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.engine.as_ref(), self.state, self.config.init)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    /// The current auto-play epoch
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The engine of the current dataset, `None` before the first one
    pub fn engine(&self) -> Option<&KMeansEngine<f64>> {
        self.engine.as_ref()
    }

    /// Number of points assigned to each centroid
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.engine
            .as_ref()
            .map(KMeansEngine::cluster_sizes)
            .unwrap_or_default()
    }

    pub(crate) fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::debug!(error = %err, "operation rejected");
            self.observer.notify(&Notification::Error(err.to_string()));
        }
        result
    }

    fn render(&self) {
        self.observer.render(&self.snapshot());
    }

    fn notify(&self, notification: Notification) {
        self.observer.notify(&notification);
    }

    fn try_new_dataset(&mut self, n_points: usize, distribution: PointDistribution) -> Result<()> {
        if n_points == 0 {
            return Err(KMeansError::EmptyDataset.into());
        }
        let points = distribution.generate(n_points, &mut self.rng)?;
        self.install_points(points)?;
        tracing::debug!(n_points, %distribution, "generated dataset");
        self.notify(Notification::DatasetGenerated { n_points });
        self.render();
        Ok(())
    }

    fn install_points(&mut self, points: Array2<f64>) -> Result<()> {
        if points.nrows() == 0 {
            return Err(KMeansError::EmptyDataset.into());
        }
        if points.ncols() != 2 {
            let mismatch = LabError::FeatureMismatch {
                expected: 2,
                found: points.ncols(),
            };
            return Err(KMeansError::from(mismatch).into());
        }

        match self.engine.as_mut() {
            Some(engine) if engine.init_method().is_manual() => engine.set_observations(points)?,
            _ => {
                let engine = self.build_engine(self.config.init, self.config.n_clusters, points)?;
                self.engine = Some(engine);
            }
        }
        self.restart();
        Ok(())
    }

    fn try_step(&mut self) -> Result<StepOutcome> {
        self.ensure_ready()?;
        if self.state.converged {
            self.notify(Notification::AlreadyConverged);
            return Ok(StepOutcome::AlreadyConverged);
        }

        let converged = self.iterate_once();
        if converged {
            self.notify(Notification::Converged {
                iterations: self.state.iteration,
            });
        }
        self.render();
        Ok(StepOutcome::Advanced {
            iteration: self.state.iteration,
            converged,
        })
    }

    fn try_run_to_convergence(&mut self, max_n_iterations: Option<u64>) -> Result<RunOutcome> {
        let max_n_iterations = max_n_iterations.unwrap_or(self.config.max_n_iterations);
        if max_n_iterations == 0 {
            return Err(KMeansParamsError::MaxIterations.into());
        }
        self.ensure_ready()?;
        if self.state.converged {
            self.notify(Notification::AlreadyConverged);
            return Ok(RunOutcome::AlreadyConverged);
        }

        let mut iterations = 0;
        let mut converged = false;
        while !converged && iterations < max_n_iterations {
            converged = self.iterate_once();
            iterations += 1;
        }

        let outcome = if converged {
            self.notify(Notification::Converged { iterations });
            RunOutcome::Converged { iterations }
        } else {
            self.notify(Notification::MaxIterationsReached { iterations });
            RunOutcome::MaxIterationsReached { iterations }
        };
        self.render();
        Ok(outcome)
    }

    fn try_reset(&mut self) -> Result<()> {
        if let Some(engine) = self.engine.as_mut() {
            if engine.init_method().is_manual() {
                engine.clear_centroids();
            } else {
                engine.initialize_centroids()?;
            }
        }
        self.restart();
        self.notify(Notification::Reset);
        self.render();
        Ok(())
    }

    fn try_add_manual_centroid(&mut self, x: f64, y: f64) -> Result<()> {
        if !self.config.init.is_manual() {
            return Err(SessionError::NotManual);
        }
        let engine = self.engine.as_mut().ok_or(SessionError::NoDataset)?;
        engine.add_centroid(aview1(&[x, y]))?;
        tracing::debug!(x, y, n_clusters = engine.n_clusters(), "placed centroid");

        self.state.iteration = 0;
        self.state.converged = false;
        self.render();
        Ok(())
    }

    fn try_begin_play(&mut self) -> Result<PlayOutcome> {
        self.ensure_ready()?;
        if self.state.playing {
            return Ok(PlayOutcome::AlreadyPlaying);
        }
        if self.state.converged {
            self.notify(Notification::AlreadyConverged);
            return Ok(PlayOutcome::AlreadyConverged);
        }
        self.epoch += 1;
        self.state.playing = true;
        self.render();
        Ok(PlayOutcome::Started)
    }

    // Swaps in a freshly initialized engine over the current points, then commits the
    // new settings.
    fn rebuild(&mut self, init: KMeansInit, n_clusters: usize) -> Result<()> {
        check_params(&self.config, init, n_clusters)?;
        let observations = self.engine.as_ref().map(|e| e.observations().to_owned());
        if let Some(observations) = observations {
            let engine = self.build_engine(init, n_clusters, observations)?;
            self.engine = Some(engine);
        }
        self.config.init = init;
        self.config.n_clusters = n_clusters;
        self.restart();
        self.render();
        Ok(())
    }

    fn build_engine(
        &mut self,
        init: KMeansInit,
        n_clusters: usize,
        observations: Array2<f64>,
    ) -> Result<KMeansEngine<f64>> {
        let rng = Isaac64Rng::seed_from_u64(self.rng.gen());
        let mut engine = KMeansEngine::params_with_rng(n_clusters, rng)
            .init_method(init)
            .tolerance(self.config.tolerance)
            .max_n_iterations(self.config.max_n_iterations)
            .build(observations)?;
        engine.initialize_centroids()?;
        Ok(engine)
    }

    fn ensure_ready(&self) -> Result<()> {
        match &self.engine {
            None => Err(SessionError::NoDataset),
            Some(engine) if engine.n_clusters() == 0 => Err(SessionError::NoCentroids),
            Some(_) => Ok(()),
        }
    }

    fn iterate_once(&mut self) -> bool {
        let converged = match self.engine.as_mut() {
            Some(engine) => engine.iterate(),
            None => return true,
        };
        self.state.iteration += 1;
        self.state.converged = converged;
        if converged {
            self.state.playing = false;
            tracing::debug!(iterations = self.state.iteration, "converged");
        }
        converged
    }

    fn restart(&mut self) {
        self.state = RunState::default();
        self.epoch += 1;
    }
}

fn check_params(config: &SessionConfig, init: KMeansInit, n_clusters: usize) -> Result<()> {
    KMeansEngine::params_with_rng(n_clusters, Isaac64Rng::seed_from_u64(0))
        .init_method(init)
        .tolerance(config.tolerance)
        .max_n_iterations(config.max_n_iterations)
        .check_ref()?;
    Ok(())
}
