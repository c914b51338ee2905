use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::{error, info};

use rs_barnes_hut::particles::{compute_forces, random_disk, ErrorTester, ParticleSystem};
use rs_barnes_hut::utils::{BarnesHutConfig, PhysicsError, DEFAULT_BARNES_HUT_CONFIG};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Computes the force on every particle of a file and saves the result.
    Run {
        /// Particle file with `x y mass` per line.
        input: PathBuf,

        /// Where to write `x y mass fx fy` per line.
        output: PathBuf,

        /// Opening angle. 0 sums every pair exactly.
        #[arg(short, long, default_value_t = DEFAULT_BARNES_HUT_CONFIG.opening_angle)]
        tau: f64,

        /// Worker threads. 0 evaluates on the main thread.
        #[arg(short, long, default_value_t = DEFAULT_BARNES_HUT_CONFIG.workers)]
        workers: usize,

        /// Coupling constant G.
        #[arg(short, long, default_value_t = DEFAULT_BARNES_HUT_CONFIG.gravitational_constant)]
        gravity: f64,

        /// Lower bound applied to pair separations.
        #[arg(short, long, default_value_t = DEFAULT_BARNES_HUT_CONFIG.min_separation)]
        softening: f64,

        /// Input lines carry five fields (a previously saved result).
        #[arg(long, default_value_t = false)]
        has_forces: bool,
    },

    /// Measures the force error over a range of opening angles.
    ErrorTest {
        /// Particle file with `x y mass` per line.
        input: PathBuf,

        #[arg(long, default_value_t = 0.0)]
        min_tau: f64,

        #[arg(long, default_value_t = 0.5)]
        max_tau: f64,

        #[arg(long, default_value_t = 0.0001)]
        tau_delta: f64,

        /// Worker threads. 0 evaluates on the main thread.
        #[arg(short, long, default_value_t = DEFAULT_BARNES_HUT_CONFIG.workers)]
        workers: usize,

        /// RMSE table path. Defaults to `<input>_<min>_<max>_<delta>`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Writes a random particle field.
    Generate {
        output: PathBuf,

        /// Number of particles to generate.
        #[arg(short, long, default_value_t = 10_000)]
        count: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Radius of the disk the particles are spread over.
        #[arg(short, long, default_value_t = 100.0)]
        radius: f64,

        /// Give half of the particles negative mass.
        #[arg(long, default_value_t = false)]
        signed: bool,
    },
}

fn run(
    input: PathBuf,
    output: PathBuf,
    config: BarnesHutConfig,
    has_forces: bool,
) -> Result<(), PhysicsError> {
    config.validate()?;

    let start = Instant::now();
    let mut system = ParticleSystem::from_file(&input, has_forces)?;
    info!("Loaded {} particles in {:?}", system.len(), start.elapsed());
    system.print_dimensions();

    if system.is_empty() {
        info!("Nothing to do");
        return system.save(&output);
    }

    let start = Instant::now();
    let evaluated = compute_forces(&mut system, &config)?;
    info!(
        "Evaluated {} particles at tau {} on {} workers in {:?}",
        evaluated, config.opening_angle, config.workers, start.elapsed()
    );

    let start = Instant::now();
    system.save(&output)?;
    info!("Saved {} in {:?}", output.display(), start.elapsed());
    Ok(())
}

fn error_test(
    input: PathBuf,
    tester: ErrorTester,
    output: Option<PathBuf>,
) -> Result<(), PhysicsError> {
    tester.config.validate()?;
    let system = ParticleSystem::from_file(&input, false)?;
    system.print_dimensions();

    let start = Instant::now();
    let samples = tester.run(&system)?;
    info!("Error sweep finished in {:?}", start.elapsed());

    let output = output.unwrap_or_else(|| tester.default_output_path(&input));
    ErrorTester::save(&samples, output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = match args.command {
        Command::Run { input, output, tau, workers, gravity, softening, has_forces } => {
            let config = BarnesHutConfig::new(Some(gravity), Some(tau), None, Some(softening), None, Some(workers));
            run(input, output, config, has_forces)
        }
        Command::ErrorTest { input, min_tau, max_tau, tau_delta, workers, output } => {
            let tester = ErrorTester {
                min_tau,
                max_tau,
                tau_delta,
                config: BarnesHutConfig::default().with_workers(workers),
            };
            error_test(input, tester, output)
        }
        Command::Generate { output, count, seed, radius, signed } => {
            info!("Generating {} particles over a disk of radius {}", count, radius);
            random_disk(count, radius, signed, seed).save(output)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
