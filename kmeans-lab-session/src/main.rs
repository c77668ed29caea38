use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use kmeans_lab_clustering::{KMeansInit, DEFAULT_MAX_N_ITERATIONS, DEFAULT_TOLERANCE};
use kmeans_lab_datasets::PointDistribution;
use kmeans_lab_session::{
    PlayOutcome, SessionConfig, SessionController, StepOutcome, TracingObserver,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Perform `--steps` single iterations
    Step,
    /// Iterate until convergence or `--max-iterations`
    Converge,
    /// Auto-play every `--interval-ms` until convergence
    Play,
}

#[derive(Parser, Debug)]
#[command(name = "kmeans-lab")]
#[command(about = "Cluster a synthetic 2-D dataset with K-means, one iteration at a time")]
#[command(version)]
struct Cli {
    /// Number of points to generate
    #[arg(long, default_value_t = 200)]
    points: usize,

    /// Point distribution: uniform or gaussian
    #[arg(long, default_value_t = PointDistribution::Uniform)]
    distribution: PointDistribution,

    /// Number of clusters for the automatic initialization methods
    #[arg(short = 'k', long, default_value_t = 3)]
    clusters: usize,

    /// Initialization method: random, farthest-first, kmeans++ or manual
    #[arg(long, default_value_t = KMeansInit::Random)]
    init: KMeansInit,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_MAX_N_ITERATIONS)]
    max_iterations: u64,

    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Delay between two auto-play steps
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    #[arg(long, value_enum, default_value_t = Mode::Converge)]
    mode: Mode,

    /// Number of iterations in step mode
    #[arg(long, default_value_t = 1)]
    steps: u64,

    /// Centroid placed by hand as `x,y`, repeatable (manual initialization only)
    #[arg(long = "manual", value_parser = parse_point)]
    manual: Vec<(f64, f64)>,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{}`", s))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid coordinate `{}`: {}", v, err))
    };
    Ok((coord(x)?, coord(y)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if !cli.manual.is_empty() && !cli.init.is_manual() {
        bail!("--manual centroids need `--init manual`");
    }

    let mut config = SessionConfig::default()
        .with_n_clusters(cli.clusters)
        .with_init(cli.init)
        .with_n_points(cli.points)
        .with_distribution(cli.distribution)
        .with_tolerance(cli.tolerance)
        .with_max_n_iterations(cli.max_iterations)
        .with_play_interval(Duration::from_millis(cli.interval_ms));
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let mut controller = SessionController::new(config, Arc::new(TracingObserver))
        .context("invalid session settings")?;
    controller
        .new_default_dataset()
        .context("failed to generate the dataset")?;
    for (x, y) in cli.manual.iter().copied() {
        controller
            .add_manual_centroid(x, y)
            .with_context(|| format!("failed to place a centroid at ({}, {})", x, y))?;
    }

    match cli.mode {
        Mode::Step => {
            for _ in 0..cli.steps {
                if controller.step()? == StepOutcome::AlreadyConverged {
                    break;
                }
            }
        }
        Mode::Converge => {
            controller.run_to_convergence(None)?;
        }
        Mode::Play => {
            if controller.play()? == PlayOutcome::Started {
                controller.join().await;
            }
        }
    }

    let snapshot = controller.snapshot();
    println!(
        "{} after {} iterations ({})",
        snapshot.method,
        snapshot.state.iteration,
        if snapshot.state.converged {
            "converged"
        } else {
            "not converged"
        }
    );
    for (idx, (centroid, size)) in snapshot
        .centroids
        .iter()
        .zip(snapshot.cluster_sizes())
        .enumerate()
    {
        println!(
            "  cluster {}: ({:.4}, {:.4}) with {} points",
            idx, centroid.x, centroid.y, size
        );
    }
    Ok(())
}
