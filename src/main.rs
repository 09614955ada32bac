//! Voronoi painting CLI - Evolve a painting from a JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use voronoi_evolve::{
    compute::{Genome, ImageSimilarity},
    compute::evolution::EvolutionEngine,
    persistence::{FileCheckpointStore, read_progress_log},
    schema::EvolutionConfig,
};

/// Set by SIGINT; the run loop forwards it to the engine's cancel handle.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_sigint(_sig: i32) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
unsafe extern "C" {
    fn signal(signum: i32, handler: extern "C" fn(i32)) -> usize;
}

fn install_signal_handler() {
    #[cfg(unix)]
    unsafe {
        signal(2 /* SIGINT */, handle_sigint);
    }
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--example") => print_example_config(),
        Some("render") if args.len() >= 4 => {
            render_best(Path::new(&args[2]), Path::new(&args[3]));
        }
        Some(path) if path != "render" => run(Path::new(path)),
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.json>", program);
    eprintln!("       {} render <config.json> <output.png>", program);
    eprintln!();
    eprintln!("Evolve a Voronoi painting toward the configured target image.");
    eprintln!("Runs resume from the configured checkpoint when it exists.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  <config.json>  Run or resume evolution");
    eprintln!("  render         Render the best genome of the last progress record");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn load_config(path: &Path) -> EvolutionConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }
    config
}

fn load_target(path: &PathBuf) -> ImageSimilarity {
    let target = image::open(path).unwrap_or_else(|e| {
        eprintln!("Error loading target image {:?}: {}", path, e);
        std::process::exit(1);
    });
    ImageSimilarity::new(target.to_rgba8())
}

fn run(config_path: &Path) {
    let config = load_config(config_path);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel_workers)
        .thread_name(|i| format!("evolve-{}", i))
        .build_global();
    if let Err(e) = pool {
        eprintln!("Error building thread pool: {}", e);
        std::process::exit(1);
    }

    let evaluator = load_target(&config.target_image);
    let canvas = evaluator.canvas();
    let store = FileCheckpointStore::new(&config.storage, canvas, config.background.into());

    println!("Voronoi Painting Evolution");
    println!("==========================");
    println!("Target: {:?} ({}x{})", config.target_image, canvas.width, canvas.height);
    println!(
        "Population: {} genomes x {} genes",
        config.population.size, config.population.gene_count
    );
    println!("Generations: {}", config.population.max_generations);
    println!("Checkpoint: {:?}", config.storage.checkpoint_path);
    println!("Workers: {}", rayon::current_num_threads());
    println!();

    let interval = config.checkpoint_interval;
    let mut engine = EvolutionEngine::new(config, canvas, evaluator, store).unwrap_or_else(|e| {
        eprintln!("Error creating engine: {}", e);
        std::process::exit(1);
    });

    // Ctrl-C stops at the end of the current generation, after a checkpoint.
    install_signal_handler();
    let cancel = engine.cancel_handle();

    let start = Instant::now();
    let result = engine.run_with_callback(|report| {
        if INTERRUPTED.load(Ordering::Relaxed) {
            cancel.store(true, Ordering::Relaxed);
        }
        if report.generation % interval == 0 {
            let elapsed = start.elapsed().as_secs_f32();
            println!(
                "  Generation {}: mean={:.4}, best={:.4}, genes={}, {:.1}s",
                report.generation,
                report.mean_fitness,
                report.best_fitness,
                report.gene_count,
                elapsed
            );
        }
    });

    match result {
        Ok(summary) => {
            println!();
            println!(
                "Stopped at generation {} ({:?})",
                summary.last_generation, summary.stop_reason
            );
            println!(
                "Generations run: {} (resumed from {})",
                summary.generations_run, summary.resumed_from
            );
            if let Some(report) = summary.last_report {
                println!("Best fitness: {:.4}", report.best_fitness);
            }
            println!(
                "Time: {:.2}s ({:.2} generations/s)",
                summary.elapsed_seconds,
                summary.generations_run as f64 / summary.elapsed_seconds.max(f64::EPSILON)
            );
        }
        Err(e) => {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn render_best(config_path: &Path, output: &Path) {
    let config = load_config(config_path);
    let canvas = load_target(&config.target_image).canvas();

    let records = read_progress_log(&config.storage.progress_log).unwrap_or_else(|e| {
        eprintln!("Error reading progress log: {}", e);
        std::process::exit(1);
    });
    let Some(record) = records.last() else {
        eprintln!(
            "Progress log {:?} has no records yet",
            config.storage.progress_log
        );
        std::process::exit(1);
    };

    let genome = Genome::decode(&record.best_genome, canvas, config.background.into())
        .unwrap_or_else(|e| {
            eprintln!("Error decoding best genome: {}", e);
            std::process::exit(1);
        });

    genome.render().save(output).unwrap_or_else(|e| {
        eprintln!("Error writing {:?}: {}", output, e);
        std::process::exit(1);
    });
    println!(
        "Rendered generation {} (best fitness {:.4}, {} genes) to {:?}",
        record.generation,
        record.best_fitness,
        genome.len(),
        output
    );
}

fn print_example_config() {
    let config = EvolutionConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
