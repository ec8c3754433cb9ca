pub mod canvas;
pub mod config;
pub mod constants;
pub mod crossover;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod individual;
pub mod population;
pub mod random;
pub mod render;
pub mod reproduce;
pub mod scenario;

#[macro_use]
mod macros;

pub use canvas::PixelBuffer;
pub use config::RunConfig;
pub use error::{EvolveError, Result};
pub use fitness::{Distance, Metric};
pub use genome::{Chromosome, Gene, GeneBounds};
pub use individual::{Evaluator, Individual};
pub use population::Population;
pub use random::WyRng;
pub use render::render;
pub use scenario::{evolve, Evolution, EvolutionHooks, Hook, Outcome, Stats, Termination};
