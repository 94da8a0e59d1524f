use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

use vortexbench::config::Config;
use vortexbench::solver::diagnostics;
use vortexbench::{ComparativeRun, RelaxationRun, SimResult, VelocityField};

struct Defaults;

impl Defaults {
    const CONFIG_PATH: &'static str = "vortexbench.yaml";
}

#[derive(Parser, Debug)]
#[command(name = "vortexbench", about = "Baseline vs. regularized velocity-field integration")]
struct Cli {
    /// YAML configuration file (defaults are used when it is missing).
    #[arg(long, global = true, default_value = Defaults::CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Relax a seeded random field toward the spiral attractor.
    Relax {
        /// Override the configured frame count.
        #[arg(long)]
        steps: Option<usize>,
        /// Override the configured seed.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the baseline and augmented integrators side by side from the vortex field.
    Compare {
        /// Override the configured iteration count.
        #[arg(long)]
        steps: Option<usize>,
        /// Write the comparison report as JSON.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn init_logging() {
    let level = std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()).unwrap_or(LevelFilter::Info);
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();
}

fn run_relax(cfg: &Config, steps: Option<usize>, seed: Option<u64>) -> SimResult<()> {
    let rc = &cfg.relaxation;
    let grid = rc.grid()?;
    let field = VelocityField::random_uniform(&grid, seed.unwrap_or(rc.seed));
    let mut run = RelaxationRun::new(&grid, rc.params()?, field)?;
    run.run(steps.unwrap_or(rc.frames));

    let state = run.state();
    let curl = diagnostics::curl(&state.field, &grid);
    let peak_curl = curl.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    info!(
        "relax: energy {:.6}, peak vorticity {:.6}, max speed {:.6}",
        diagnostics::energy(&state.field),
        peak_curl,
        diagnostics::max_finite_speed(&state.field).unwrap_or(f64::NAN)
    );
    Ok(())
}

fn run_compare(cfg: &Config, steps: Option<usize>, report_path: Option<PathBuf>) -> SimResult<()> {
    let cc = &cfg.comparative;
    let grid = cc.grid()?;
    let field = VelocityField::vortex(&grid, cc.amplitude);
    let mut run = ComparativeRun::new(&grid, cc.params()?, field)?;
    run.run(steps.unwrap_or(cc.iterations));

    let report = run.report();
    info!("compare: verdict {:?}", report.verdict);
    if let Some(at) = report.baseline.diverged_at {
        info!("compare: baseline diverged at step {}", at);
    }
    if let Some(ratio) = report.augmented.energy_ratio {
        info!("compare: augmented energy ratio {:.3}", ratio);
    }
    match report_path {
        Some(path) => {
            report.write_json(&path)?;
            info!("compare: report written to {}", path.display());
        }
        None => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = Config::load(&cli.config).and_then(|cfg| match cli.command {
        Command::Relax { steps, seed } => run_relax(&cfg, steps, seed),
        Command::Compare { steps, report } => run_compare(&cfg, steps, report),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
