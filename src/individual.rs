//! A [Chromosome] bound to its render and fitness.

use crate::{
    canvas::PixelBuffer,
    error::Result,
    fitness::Metric,
    genome::Chromosome,
    render::render,
};

/// Hands out individual ids for a single run. Ids are only for tracing, they take no part in
/// ordering or equality.
#[derive(Debug, Default)]
pub struct IdGen {
    pub head: u64,
}

impl IdGen {
    pub fn new(head: u64) -> Self {
        Self { head }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.head;
        self.head += 1;
        id
    }
}

/// Everything needed to turn a chromosome into a scored render. Borrows the target, which is
/// shared read-only by every evaluation of a run.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'t> {
    pub target: &'t PixelBuffer,
    pub metric: Metric,
    pub sample_stride: usize,
    pub grayscale: bool,
    pub transparent: bool,
}

impl<'t> Evaluator<'t> {
    pub fn new(target: &'t PixelBuffer) -> Self {
        Self {
            target,
            metric: Metric::default(),
            sample_stride: crate::constants::CIRCLET_SAMPLE_STRIDE,
            grayscale: false,
            transparent: true,
        }
    }

    pub fn render(&self, chromosome: &Chromosome) -> PixelBuffer {
        render(
            chromosome,
            self.target.width(),
            self.target.height(),
            self.transparent,
        )
    }

    pub fn fitness(&self, rendered: &PixelBuffer) -> Result<f64> {
        self.metric
            .distance(self.sample_stride, rendered, self.target, self.grayscale)
    }

    /// Render and score a batch of chromosomes, assigning ids in input order. Output order matches
    /// input order whether or not the work is spread across threads.
    pub fn materialize(&self, chromosomes: Vec<Chromosome>, ids: &mut IdGen) -> Result<Vec<Individual>> {
        let tagged = chromosomes
            .into_iter()
            .map(|chromosome| (ids.next_id(), chromosome))
            .collect::<Vec<_>>();

        evaluate_tagged(self, tagged)
    }
}

#[cfg(feature = "parallel")]
fn evaluate_tagged(evaluator: &Evaluator<'_>, tagged: Vec<(u64, Chromosome)>) -> Result<Vec<Individual>> {
    use rayon::prelude::*;
    tagged
        .into_par_iter()
        .map(|(id, chromosome)| Individual::new(id, chromosome, evaluator))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_tagged(evaluator: &Evaluator<'_>, tagged: Vec<(u64, Chromosome)>) -> Result<Vec<Individual>> {
    tagged
        .into_iter()
        .map(|(id, chromosome)| Individual::new(id, chromosome, evaluator))
        .collect()
}

/// Owns its chromosome. The render and fitness are derived from it once, at construction, and
/// never recomputed since the chromosome can't change.
#[derive(Debug, Clone)]
pub struct Individual {
    id: u64,
    chromosome: Chromosome,
    rendered: PixelBuffer,
    fitness: f64,
}

impl Individual {
    pub fn new(id: u64, chromosome: Chromosome, evaluator: &Evaluator<'_>) -> Result<Self> {
        let rendered = evaluator.render(&chromosome);
        let fitness = evaluator.fitness(&rendered)?;
        log::trace!("individual {id}: fitness {fitness}");
        Ok(Self {
            id,
            chromosome,
            rendered,
            fitness,
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    #[inline]
    pub fn rendered(&self) -> &PixelBuffer {
        &self.rendered
    }

    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}
