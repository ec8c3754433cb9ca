//! Run configuration, with defaults from [crate::constants].

use crate::{
    canvas::PixelBuffer,
    constants::*,
    error::{EvolveError, Result},
    fitness::Metric,
    genome::GeneBounds,
    individual::Evaluator,
};
use core::error::Error;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub population_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub total_circle: usize,
    pub max_generations: usize,
    pub grayscale: bool,
    pub transparent: bool,
    pub sample_stride: usize,
    pub metric: Metric,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: CIRCLET_POPULATION_SIZE,
            crossover_rate: CIRCLET_CROSSOVER_RATE,
            mutation_rate: CIRCLET_MUTATION_RATE,
            total_circle: CIRCLET_TOTAL_CIRCLE,
            max_generations: CIRCLET_MAX_GENERATIONS,
            grayscale: false,
            transparent: true,
            sample_stride: CIRCLET_SAMPLE_STRIDE,
            metric: Metric::default(),
            seed: None,
        }
    }
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(EvolveError::InvalidConfiguration(msg))
}

impl RunConfig {
    /// Reject a configuration before any population is created
    pub fn validate(&self, target: &PixelBuffer) -> Result<()> {
        if self.population_size < 2 {
            return invalid(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            ));
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0. ..=1.).contains(&rate) {
                return invalid(format!("{name} must be within [0, 1], got {rate}"));
            }
        }
        if self.total_circle < 1 {
            return invalid("total_circle must be at least 1".into());
        }
        if self.sample_stride < 1 {
            return invalid("sample_stride must be at least 1".into());
        }
        if target.width() == 0 || target.height() == 0 {
            return invalid(format!(
                "target image must not be empty, got {}x{}",
                target.width(),
                target.height()
            ));
        }
        Ok(())
    }

    pub fn bounds(&self, target: &PixelBuffer) -> GeneBounds {
        GeneBounds::new(target.width(), target.height(), self.grayscale)
    }

    pub fn evaluator<'t>(&self, target: &'t PixelBuffer) -> Evaluator<'t> {
        Evaluator {
            target,
            metric: self.metric,
            sample_stride: self.sample_stride,
            grayscale: self.grayscale,
            transparent: self.transparent,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> core::result::Result<Self, Box<dyn Error>> {
        serde_json::from_str(s).map_err(|op| op.into())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> core::result::Result<Self, Box<dyn Error>> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> core::result::Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
