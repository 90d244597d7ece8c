use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fuzzythresh::{solve, Algorithm, Histogram, RunSettings};

/// multi-level thresholding of a 256-bin gray-level histogram
#[derive(Debug, Parser)]
#[command(name = "fuzzythresh", version, about)]
struct Cli {
    /// JSON array of 256 non-negative numbers (counts or probabilities)
    #[arg(long)]
    histogram: PathBuf,

    /// ga, pso, woa, mfwoa or otsu
    #[arg(long, default_value = "mfwoa")]
    algorithm: String,

    /// comma-separated threshold counts
    #[arg(long, value_delimiter = ',', default_value = "2")]
    ks: Vec<usize>,

    /// overrides every optimizer seed
    #[arg(long)]
    seed: Option<u64>,

    /// settings JSON; missing fields use defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// iteration count for every optimizer
    #[arg(long)]
    iters: Option<usize>,

    /// population size for every optimizer
    #[arg(long)]
    pop: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // configure Rayon's global thread pool once at startup so worker threads get nice names like "rayon-0".
    let _ = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{i}"))
        .build_global();

    let cli = Cli::parse();
    let algorithm: Algorithm = cli.algorithm.parse()?;

    let mut settings = match &cli.settings {
        Some(path) => RunSettings::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => RunSettings::default(),
    };
    if let Some(seed) = cli.seed {
        settings = settings.with_seed(seed);
    }
    if let Some(iters) = cli.iters {
        settings.ga.iters = iters;
        settings.pso.iters = iters;
        settings.woa.iters = iters;
        settings.mfwoa.iters = iters;
    }
    if let Some(pop) = cli.pop {
        settings.ga.pop = pop;
        settings.pso.pop = pop;
        settings.woa.pop = pop;
        settings.mfwoa.pop = pop;
    }

    let raw = std::fs::read_to_string(&cli.histogram)
        .with_context(|| format!("reading {}", cli.histogram.display()))?;
    let bins: Vec<f64> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", cli.histogram.display()))?;
    let histogram = Histogram::new(&bins)?;

    if cli.ks.is_empty() {
        bail!("--ks needs at least one threshold count");
    }

    let outcomes = solve(algorithm, &histogram, &cli.ks, &settings)?;
    for o in &outcomes {
        tracing::info!(algorithm = %o.algorithm, k = o.k, fitness = o.fitness, thresholds = ?o.thresholds, "done");
    }
    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
