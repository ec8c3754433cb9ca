use circlet::{
    constants::*, evolve, random::run_rng, EvolutionHooks, Metric, PixelBuffer, RunConfig,
    Stats, Termination,
};
use clap::Parser;
use core::{error::Error, ops::ControlFlow};
use env_logger::Env;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Approximate an image with semi-transparent circles
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Target image
    image: PathBuf,

    /// Where the final best render is written
    #[arg(short, long, default_value = "result.png")]
    output: PathBuf,

    /// JSON run configuration. Flags below are ignored when given
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value_t = CIRCLET_POPULATION_SIZE)]
    population: usize,

    #[arg(long, default_value_t = CIRCLET_CROSSOVER_RATE)]
    crossover_rate: f64,

    #[arg(long, default_value_t = CIRCLET_MUTATION_RATE)]
    mutation_rate: f64,

    #[arg(short = 'n', long, default_value_t = CIRCLET_TOTAL_CIRCLE)]
    circles: usize,

    #[arg(short, long, default_value_t = CIRCLET_MAX_GENERATIONS)]
    generations: usize,

    #[arg(long)]
    grayscale: bool,

    /// Draw every circle fully opaque
    #[arg(long)]
    opaque: bool,

    #[arg(long, default_value_t = CIRCLET_SAMPLE_STRIDE)]
    sample_stride: usize,

    #[arg(long, value_enum, default_value = "sampled-l1")]
    metric: Metric,

    #[arg(long)]
    seed: Option<u64>,

    /// Write the best render every `frame_interval` generations into this directory
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 100)]
    frame_interval: usize,

    /// Log progress every this many generations
    #[arg(long, default_value_t = 1000)]
    log_interval: usize,

    /// Save the render left of the target
    #[arg(long)]
    side_by_side: bool,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig, Box<dyn Error>> {
        if let Some(path) = &self.config {
            return RunConfig::from_file(path);
        }
        Ok(RunConfig {
            population_size: self.population,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
            total_circle: self.circles,
            max_generations: self.generations,
            grayscale: self.grayscale,
            transparent: !self.opaque,
            sample_stride: self.sample_stride,
            metric: self.metric,
            seed: self.seed,
        })
    }
}

fn load_target(path: &Path) -> Result<PixelBuffer, Box<dyn Error>> {
    let image = image::open(path)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(PixelBuffer::from_raw(width, height, image.into_raw())?)
}

fn save(
    rendered: &PixelBuffer,
    target: Option<&PixelBuffer>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let surface = match target {
        Some(target) => rendered.beside(target, CIRCLET_BACKGROUND),
        None => rendered.clone(),
    };
    let (width, height) = surface.dims();
    let image = image::RgbaImage::from_raw(width, height, surface.into_raw())
        .ok_or("render does not fit its dimensions")?;
    image.save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn setup_interrupt_handler(cancel: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        if cancel.swap(true, Ordering::SeqCst) {
            log::warn!("second interrupt, exiting");
            std::process::exit(130);
        }
        log::warn!("interrupt received, stopping after this generation");
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = args.run_config()?;
    let target = load_target(&args.image)?;
    let rng = run_rng(config.seed)?;
    log::info!("configuration: {}", config.to_string()?);

    let cancel = Arc::new(AtomicBool::new(false));
    setup_interrupt_handler(cancel.clone())?;

    if let Some(dir) = &args.frames_dir {
        fs::create_dir_all(dir)?;
    }
    let side = args.side_by_side.then_some(&target);
    let log_interval = args.log_interval.max(1);
    let frame_interval = args.frame_interval.max(1);

    let mut hooks = EvolutionHooks::new(vec![Box::new(move |stats: &mut Stats<'_>| {
        if stats.generation % log_interval == 0 {
            if let Some(best) = stats.fittest() {
                log::info!("generation {}: best {}", stats.generation, best.fitness());
            }
        }
        ControlFlow::Continue(())
    })]);
    if let Some(dir) = args.frames_dir.clone() {
        hooks.push(Box::new(move |stats: &mut Stats<'_>| {
            if stats.generation % frame_interval != 0 {
                return ControlFlow::Continue(());
            }
            let Some(best) = stats.fittest() else {
                return ControlFlow::Continue(());
            };
            let path = dir.join(format!("gen-{:06}.png", stats.generation));
            match save(best.rendered(), side, &path) {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    log::error!("could not write frame {}: {e}", path.display());
                    ControlFlow::Break(())
                }
            }
        }));
    }

    let outcome = evolve(config, &target, rng, &mut hooks, Some(cancel))?;
    let path = match outcome.termination {
        Termination::Cancelled => args
            .output
            .with_file_name(format!("interrupt-gen{}.png", outcome.generation)),
        Termination::Completed | Termination::Halted => args.output.clone(),
    };
    save(outcome.best.rendered(), side, &path)?;
    log::info!(
        "best fitness {} after {} generations",
        outcome.best.fitness(),
        outcome.generation
    );
    Ok(())
}
