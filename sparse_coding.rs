// sparse_coding.rs
// Learns 8x8 image-patch basis functions from grayscale images stored as CSV.
// Expected files:
//   ./images/image0.csv ... ./images/image9.csv (512 rows of 512 comma-separated values)
//
// Usage:
//   sparse_coding [config.json]
//
// Output:
//   - basisfunctions.png (tiled basis functions, 350x350, 8-bit grayscale)
//   - snapshots/snapshot_NNNNN.png when output.snapshot_every is set
//
// Set RUST_LOG=debug for per-iteration statistics.

use sparse_coding::config::{load_config, RunConfig};
use sparse_coding::data::load_image_collection;
use sparse_coding::trainer::{DictionaryTrainer, TrainingObserver};
use sparse_coding::utils::SimpleRng;
use sparse_coding::visualize::{save_dictionary_png, Observers, ProgressLogger, SnapshotWriter};
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Read the run configuration from the first argument, if any.
///
/// Uses the defaults only when no path is given; a path that cannot be read,
/// parsed or validated is an error.
fn config_from_args(args: &[String]) -> sparse_coding::Result<RunConfig> {
    match args.get(1) {
        Some(path) => load_config(path),
        None => Ok(RunConfig::default()),
    }
}

/// Seeded RNG when the config fixes a seed, clock-seeded otherwise.
fn rng_from_config(config: &RunConfig) -> SimpleRng {
    match config.training.seed {
        Some(seed) => SimpleRng::new(seed),
        None => SimpleRng::from_time(),
    }
}

/// Load images, train and write the mosaic. Returns the output path.
fn run(config: &RunConfig) -> sparse_coding::Result<PathBuf> {
    let data = &config.data;
    println!(
        "Loading {} images from {}...",
        data.image_count,
        data.folder.display()
    );
    let images = load_image_collection(
        &data.folder,
        &data.image_prefix,
        data.image_count,
        data.image_rows,
        data.image_cols,
    )?;

    let training = &config.training;
    let mut trainer = DictionaryTrainer::new(images, training, rng_from_config(config))?;

    let output = &config.output;
    let mut progress = ProgressLogger::new(output.log_every);
    let mut snapshots = match output.snapshot_every {
        Some(every) => Some(SnapshotWriter::new(
            &output.snapshot_dir,
            every,
            output.border,
            output.display_size,
        )?),
        None => None,
    };

    let mut observers: Vec<&mut dyn TrainingObserver> = vec![&mut progress];
    if let Some(writer) = snapshots.as_mut() {
        observers.push(writer);
    }

    println!(
        "Training: basis_functions={} patch={}x{} samples={} iterations={}",
        training.basis_function_count,
        training.patch_size,
        training.patch_size,
        training.sample_count,
        training.iteration_count
    );
    let start_time = Instant::now();
    let dictionary = trainer.train(training.iteration_count, &mut Observers(observers))?;
    println!("Training done in {:.3}s", start_time.elapsed().as_secs_f32());

    save_dictionary_png(
        &dictionary,
        &output.image_path,
        output.border,
        output.display_size,
    )?;
    Ok(output.image_path.clone())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    let config = match config_from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not load config: {}", e);
            process::exit(1);
        }
    };

    match run(&config) {
        Ok(path) => println!("Saved basis functions to {}", path.display()),
        Err(e) => {
            eprintln!("sparse_coding failed: {}", e);
            process::exit(1);
        }
    }
}
