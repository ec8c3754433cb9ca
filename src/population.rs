//! Functions and structs related to managing individuals at the population scale.

use crate::{
    error::{EvolveError, Result},
    genome::{random_chromosome, GeneBounds},
    individual::{Evaluator, IdGen, Individual},
    reproduce::{breed, mutants},
};
use rand::Rng;

/// An ordered collection of [Individual]s. It grows while offspring are added during a
/// generation, and [Population::select] shrinks it back to `size`.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Individual>,
    size: usize,
}

impl Population {
    pub fn new(members: Vec<Individual>, size: usize) -> Self {
        Self { members, size }
    }

    /// `size` individuals, each with `total_circle` random genes
    pub fn random(
        size: usize,
        total_circle: usize,
        bounds: &GeneBounds,
        evaluator: &Evaluator<'_>,
        ids: &mut IdGen,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        let chromosomes = (0..size)
            .map(|_| random_chromosome(bounds, total_circle, rng))
            .collect();
        Ok(Self::new(evaluator.materialize(chromosomes, ids)?, size))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The size [Population::select] truncates to
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn extend(&mut self, offspring: impl IntoIterator<Item = Individual>) {
        self.members.extend(offspring);
    }

    /// Cross over a fitness-proportionate pool of `rate * size` candidates, and add the children.
    /// Returns how many children were added.
    pub fn crossover(
        &mut self,
        rate: f64,
        evaluator: &Evaluator<'_>,
        ids: &mut IdGen,
        rng: &mut impl Rng,
    ) -> Result<usize> {
        let children = breed(&self.members, rate, self.size, evaluator, ids, rng)?;
        let added = children.len();
        self.extend(children);
        Ok(added)
    }

    /// Mutate a fitness-proportionate pool of `rate * size` candidates, and add the mutants.
    /// Returns how many mutants were added.
    pub fn mutation(
        &mut self,
        rate: f64,
        bounds: &GeneBounds,
        evaluator: &Evaluator<'_>,
        ids: &mut IdGen,
        rng: &mut impl Rng,
    ) -> Result<usize> {
        let children = mutants(&self.members, rate, self.size, bounds, evaluator, ids, rng)?;
        let added = children.len();
        self.extend(children);
        Ok(added)
    }

    /// Sort best first and evict the worst until at most `size` remain. Returns how many were
    /// evicted.
    pub fn select(&mut self) -> Result<usize> {
        if self.members.is_empty() {
            return Err(EvolveError::EmptyPopulation);
        }

        self.members
            .sort_by(|l, r| l.fitness().total_cmp(&r.fitness()));
        let evicted = self.members.len().saturating_sub(self.size);
        self.members.truncate(self.size);
        if self.members.is_empty() {
            return Err(EvolveError::EmptyPopulation);
        }
        Ok(evicted)
    }

    /// The member with the lowest fitness. Ties go to the earliest member
    pub fn best(&self) -> Result<&Individual> {
        self.members
            .iter()
            .reduce(|best, member| {
                if member.fitness() < best.fitness() {
                    member
                } else {
                    best
                }
            })
            .ok_or(EvolveError::EmptyPopulation)
    }
}
