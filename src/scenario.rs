//! The generational loop: crossover, mutation, then truncation back to the population size.

use crate::{
    canvas::PixelBuffer,
    config::RunConfig,
    error::{EvolveError, Result},
    genome::GeneBounds,
    individual::{Evaluator, IdGen, Individual},
    population::Population,
    random::WyRng,
};
use core::ops::ControlFlow;
use rand::Rng;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `max_generations` was reached
    Completed,
    /// The cancellation flag was raised
    Cancelled,
    /// A hook broke out of the loop
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Terminated(Termination),
}

/// Counts from the most recent generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub crossed: usize,
    pub mutated: usize,
    pub peak: usize,
    pub evicted: usize,
}

/// What hooks get to see after every generation
#[derive(Debug)]
pub struct Stats<'a> {
    pub generation: usize,
    pub population: &'a Population,
    pub report: GenerationReport,
    pub history: &'a [f64],
}

impl Stats<'_> {
    pub fn fittest(&self) -> Option<&Individual> {
        self.population.best().ok()
    }
}

pub type Hook<'h> = Box<dyn FnMut(&mut Stats<'_>) -> ControlFlow<()> + 'h>;

/// Callbacks fired after every generation. All hooks run, and the loop halts if any of them
/// breaks.
#[derive(Default)]
pub struct EvolutionHooks<'h> {
    hooks: Vec<Hook<'h>>,
}

impl<'h> EvolutionHooks<'h> {
    pub fn new(hooks: Vec<Hook<'h>>) -> Self {
        Self { hooks }
    }

    pub fn push(&mut self, hook: Hook<'h>) {
        self.hooks.push(hook);
    }

    pub fn fire(&mut self, stats: &mut Stats<'_>) -> ControlFlow<()> {
        self.hooks
            .iter_mut()
            .fold(ControlFlow::Continue(()), |flow, hook| {
                if hook(stats).is_break() {
                    ControlFlow::Break(())
                } else {
                    flow
                }
            })
    }
}

/// The end of a run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub best: Individual,
    pub generation: usize,
    pub termination: Termination,
    /// Best fitness after each generation, starting with the initial population
    pub history: Vec<f64>,
}

/// Drives a population through generations until it is terminated. The population is only
/// touched between phases, and each phase finishes scoring every new individual before the next
/// one starts.
pub struct Evolution<'t, R: Rng> {
    config: RunConfig,
    evaluator: Evaluator<'t>,
    bounds: GeneBounds,
    population: Population,
    ids: IdGen,
    rng: R,
    generation: usize,
    state: State,
    report: GenerationReport,
    history: Vec<f64>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'t> Evolution<'t, WyRng> {
    /// Like [Evolution::new], with the run rng built from `config.seed`. An unset seed is drawn
    /// from the thread rng.
    pub fn from_config(config: RunConfig, target: &'t PixelBuffer) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self::init(config, target, WyRng::seeded(seed))
    }
}

impl<'t, R: Rng> Evolution<'t, R> {
    /// Validate `config` and seed a random population against `target`, drawing from `rng`.
    /// A `config.seed` is rejected here since it would be ignored, see [Evolution::from_config]
    pub fn new(config: RunConfig, target: &'t PixelBuffer, rng: R) -> Result<Self> {
        if let Some(seed) = config.seed {
            return Err(EvolveError::InvalidConfiguration(format!(
                "seed {seed} conflicts with a caller supplied rng"
            )));
        }
        Self::init(config, target, rng)
    }

    fn init(config: RunConfig, target: &'t PixelBuffer, mut rng: R) -> Result<Self> {
        config.validate(target)?;
        let evaluator = config.evaluator(target);
        let bounds = config.bounds(target);
        let mut ids = IdGen::default();

        log::info!(
            "evolving {}x{} target: population {}, {} circles, {} generations",
            target.width(),
            target.height(),
            config.population_size,
            config.total_circle,
            config.max_generations
        );

        let population = Population::random(
            config.population_size,
            config.total_circle,
            &bounds,
            &evaluator,
            &mut ids,
            &mut rng,
        )?;
        let history = vec![population.best()?.fitness()];
        let state = if config.max_generations == 0 {
            State::Terminated(Termination::Completed)
        } else {
            State::Running
        };

        Ok(Self {
            config,
            evaluator,
            bounds,
            population,
            ids,
            rng,
            generation: 0,
            state,
            report: GenerationReport::default(),
            history,
            cancel: None,
        })
    }

    /// Stop between generations once `flag` is raised
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[inline]
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn best(&self) -> Result<&Individual> {
        self.population.best()
    }

    pub fn stats(&self) -> Stats<'_> {
        Stats {
            generation: self.generation,
            population: &self.population,
            report: self.report,
            history: &self.history,
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn terminate(&mut self, termination: Termination) {
        if self.state == State::Running {
            log::info!(
                "terminated ({termination:?}) at generation {}, best fitness {}",
                self.generation,
                self.history.last().copied().unwrap_or(f64::NAN)
            );
            self.state = State::Terminated(termination);
        }
    }

    fn advance(&mut self) -> Result<()> {
        let crossed = self.population.crossover(
            self.config.crossover_rate,
            &self.evaluator,
            &mut self.ids,
            &mut self.rng,
        )?;
        let mutated = self.population.mutation(
            self.config.mutation_rate,
            &self.bounds,
            &self.evaluator,
            &mut self.ids,
            &mut self.rng,
        )?;
        let peak = self.population.len();
        let evicted = self.population.select()?;
        let best = self.population.best()?.fitness();

        self.generation += 1;
        self.history.push(best);
        self.report = GenerationReport {
            crossed,
            mutated,
            peak,
            evicted,
        };
        log::debug!(
            "generation {}: +{crossed} crossed, +{mutated} mutated, {peak} -> {}, best {best}",
            self.generation,
            self.population.len()
        );
        Ok(())
    }

    /// Run one generation, unless cancelled or already terminated
    pub fn tick(&mut self) -> Result<State> {
        if self.state != State::Running {
            return Ok(self.state);
        }
        if self.cancelled() {
            self.terminate(Termination::Cancelled);
            return Ok(self.state);
        }

        self.advance()?;
        if self.generation >= self.config.max_generations {
            self.terminate(Termination::Completed);
        }
        Ok(self.state)
    }

    /// Tick until terminated, firing `hooks` after every generation
    pub fn run(mut self, hooks: &mut EvolutionHooks<'_>) -> Result<Outcome> {
        while self.state == State::Running {
            let before = self.generation;
            self.tick()?;
            if self.generation > before && hooks.fire(&mut self.stats()).is_break() {
                self.terminate(Termination::Halted);
            }
        }
        self.into_outcome()
    }

    pub fn into_outcome(self) -> Result<Outcome> {
        let termination = match self.state {
            State::Terminated(termination) => termination,
            State::Running => Termination::Halted,
        };
        Ok(Outcome {
            best: self.population.best()?.clone(),
            generation: self.generation,
            termination,
            history: self.history,
        })
    }
}

/// Evolve a fresh population against `target` until `config.max_generations`, `cancel`, or a
/// hook stops it. A `config.seed` takes precedence over `rng`, so seeded configs always replay
/// the same run.
pub fn evolve<R: Rng>(
    config: RunConfig,
    target: &PixelBuffer,
    rng: R,
    hooks: &mut EvolutionHooks<'_>,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Outcome> {
    fn drive<R: Rng>(
        evolution: Evolution<'_, R>,
        hooks: &mut EvolutionHooks<'_>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Outcome> {
        match cancel {
            Some(flag) => evolution.with_cancel(flag),
            None => evolution,
        }
        .run(hooks)
    }

    match config.seed {
        Some(_) => drive(Evolution::from_config(config, target)?, hooks, cancel),
        None => drive(Evolution::new(config, target, rng)?, hooks, cancel),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[
                    (x * 255 / width.max(1)) as u8,
                    (y * 255 / height.max(1)) as u8,
                    128,
                    255,
                ]);
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    fn small_config(population_size: usize, total_circle: usize, max_generations: usize) -> RunConfig {
        RunConfig {
            population_size,
            total_circle,
            max_generations,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let target = gradient(8, 8);
        let result = Evolution::new(small_config(1, 4, 10), &target, WyRng::seeded(0));
        assert!(matches!(
            result,
            Err(EvolveError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_generations() {
        let target = gradient(8, 8);
        let outcome = evolve(
            small_config(4, 4, 0),
            &target,
            WyRng::seeded(1),
            &mut EvolutionHooks::default(),
            None,
        )
        .unwrap();

        assert_eq!(0, outcome.generation);
        assert_eq!(Termination::Completed, outcome.termination);
        assert_eq!(vec![outcome.best.fitness()], outcome.history);
    }

    #[test]
    fn test_runs_max_generations() {
        let target = gradient(12, 12);
        let seen = Rc::new(RefCell::new(vec![]));
        let seen_hook = seen.clone();
        let mut hooks = EvolutionHooks::new(vec![Box::new(move |stats: &mut Stats<'_>| {
            assert_eq!(5, stats.population.len());
            seen_hook.borrow_mut().push(stats.generation);
            ControlFlow::Continue(())
        })]);

        let outcome = evolve(
            small_config(5, 6, 10),
            &target,
            WyRng::seeded(2),
            &mut hooks,
            None,
        )
        .unwrap();

        assert_eq!(10, outcome.generation);
        assert_eq!(Termination::Completed, outcome.termination);
        assert_eq!(11, outcome.history.len());
        assert_eq!((1..=10).collect::<Vec<_>>(), *seen.borrow());
    }

    #[test]
    fn test_elitism() {
        let target = gradient(16, 16);
        let outcome = evolve(
            small_config(4, 8, 50),
            &target,
            WyRng::seeded(16),
            &mut EvolutionHooks::default(),
            None,
        )
        .unwrap();

        assert_eq!(51, outcome.history.len());
        assert!(outcome.history.windows(2).all(|w| w[1] <= w[0]));
        assert!(outcome.history[50] <= outcome.history[1]);
        assert_eq!(outcome.history[50], outcome.best.fitness());
    }

    // 4 circles of radius at most 2 cover at most 52 of the 64 pixels, so at least 12 stay white.
    // That floors mean green and blue near 48 and the distance from pure red near 68, while an
    // all white render sits 360 away.
    #[test]
    fn test_red_square() {
        let target = PixelBuffer::filled(8, 8, [255, 0, 0, 255]);
        let config = RunConfig {
            crossover_rate: 1.,
            mutation_rate: 1.,
            ..small_config(6, 4, 200)
        };
        let outcome = evolve(
            config,
            &target,
            WyRng::seeded(2024),
            &mut EvolutionHooks::default(),
            None,
        )
        .unwrap();

        let initial = outcome.history[0];
        let last = outcome.best.fitness();
        assert!(last <= initial * 0.8, "{last} !<= 0.8 * {initial}");

        let [r, g, b, a] = outcome.best.rendered().mean_color();
        assert!(r >= 200., "mean red {r}");
        assert!(g <= 190. && b <= 190., "mean green {g}, blue {b}");
        let off_red = ((255. - r).powi(2) + g.powi(2) + b.powi(2)).sqrt();
        assert!(off_red <= 250., "mean color {r} {g} {b} is {off_red} from red");
        assert_eq!(255., a);
    }

    #[test]
    fn test_reproducible() {
        let target = gradient(10, 10);
        let run = || {
            evolve(
                small_config(5, 6, 30),
                &target,
                WyRng::seeded(77),
                &mut EvolutionHooks::default(),
                None,
            )
            .unwrap()
        };
        let (l, r) = (run(), run());
        assert_eq!(l.history, r.history);
        assert_eq!(l.best.chromosome(), r.best.chromosome());
        assert_eq!(l.best.rendered(), r.best.rendered());
    }

    #[test]
    fn test_cancel_before_start() {
        let target = gradient(8, 8);
        let flag = Arc::new(AtomicBool::new(true));
        let outcome = evolve(
            small_config(4, 4, 100),
            &target,
            WyRng::seeded(3),
            &mut EvolutionHooks::default(),
            Some(flag),
        )
        .unwrap();

        assert_eq!(0, outcome.generation);
        assert_eq!(Termination::Cancelled, outcome.termination);
    }

    #[test]
    fn test_cancel_between_generations() {
        let target = gradient(8, 8);
        let flag = Arc::new(AtomicBool::new(false));
        let raise = flag.clone();
        let mut hooks = EvolutionHooks::new(vec![Box::new(move |stats: &mut Stats<'_>| {
            if stats.generation == 3 {
                raise.store(true, Ordering::SeqCst);
            }
            ControlFlow::Continue(())
        })]);

        let outcome = evolve(
            small_config(4, 4, 100),
            &target,
            WyRng::seeded(4),
            &mut hooks,
            Some(flag),
        )
        .unwrap();

        assert_eq!(3, outcome.generation);
        assert_eq!(Termination::Cancelled, outcome.termination);
        assert_eq!(4, outcome.history.len());
    }

    #[test]
    fn test_hook_halts() {
        let target = gradient(8, 8);
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let mut hooks = EvolutionHooks::new(vec![
            Box::new(|stats: &mut Stats<'_>| {
                if stats.generation == 7 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }),
            Box::new(move |_: &mut Stats<'_>| {
                *counter.borrow_mut() += 1;
                ControlFlow::Continue(())
            }),
        ]);

        let outcome = evolve(
            small_config(4, 4, 100),
            &target,
            WyRng::seeded(5),
            &mut hooks,
            None,
        )
        .unwrap();

        assert_eq!(7, outcome.generation);
        assert_eq!(Termination::Halted, outcome.termination);
        // every hook still sees the halting generation
        assert_eq!(7, *calls.borrow());
    }

    #[test]
    fn test_tick_after_termination() {
        let target = gradient(8, 8);
        let mut evolution = Evolution::new(small_config(3, 3, 2), &target, WyRng::seeded(6)).unwrap();
        assert_eq!(State::Running, evolution.tick().unwrap());
        assert_eq!(
            State::Terminated(Termination::Completed),
            evolution.tick().unwrap()
        );
        assert_eq!(
            State::Terminated(Termination::Completed),
            evolution.tick().unwrap()
        );
        assert_eq!(2, evolution.generation());
        assert_eq!(3, evolution.population().len());
        assert_eq!(3, evolution.history().len());
    }

    #[test]
    fn test_stats_fittest() {
        let target = gradient(8, 8);
        let evolution = Evolution::new(small_config(4, 4, 1), &target, WyRng::seeded(9)).unwrap();
        let stats = evolution.stats();
        let best = stats.fittest().unwrap().fitness();
        assert_eq!(best, evolution.best().unwrap().fitness());
        assert_eq!(0, stats.generation);
        assert_eq!(&[best], stats.history);
    }

    #[test]
    fn test_config_seed_overrides_rng() {
        let target = gradient(10, 10);
        let seeded = RunConfig {
            seed: Some(7),
            ..small_config(4, 5, 20)
        };
        let run = |config: RunConfig, rng: WyRng| {
            evolve(config, &target, rng, &mut EvolutionHooks::default(), None).unwrap()
        };

        let l = run(seeded.clone(), WyRng::seeded(1));
        let r = run(seeded, WyRng::seeded(2));
        assert_eq!(l.history, r.history);
        assert_eq!(l.best.chromosome(), r.best.chromosome());

        // the same run as handing WyRng::seeded(7) to an unseeded config
        let unseeded = run(small_config(4, 5, 20), WyRng::seeded(7));
        assert_eq!(l.history, unseeded.history);
    }

    #[test]
    fn test_config_seed_with_rng_rejected() {
        let target = gradient(8, 8);
        let config = RunConfig {
            seed: Some(3),
            ..small_config(4, 4, 5)
        };
        assert!(matches!(
            Evolution::new(config.clone(), &target, WyRng::seeded(3)),
            Err(EvolveError::InvalidConfiguration(_))
        ));

        let evolution = Evolution::from_config(config, &target).unwrap();
        let replay = Evolution::new(small_config(4, 4, 5), &target, WyRng::seeded(3)).unwrap();
        assert_eq!(evolution.history(), replay.history());
    }
}
