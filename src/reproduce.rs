//! Picking candidates for reproduction and producing offspring from them.
//!
//! Candidates are drawn by fitness-proportionate sampling. Fitness is a distance where lower is
//! better, so each individual is weighted by `1 / (fitness + CIRCLET_SELECTION_EPSILON)`, giving
//! closer matches a larger slice. Crossover and mutation both use this weighting.

use crate::{
    constants::CIRCLET_SELECTION_EPSILON,
    crossover::crossover,
    error::Result,
    genome::{mutate, Chromosome, GeneBounds},
    individual::{Evaluator, IdGen, Individual},
};
use rand::Rng;

#[inline]
pub fn selection_weight(fitness: f64) -> f64 {
    1. / (fitness.max(0.) + CIRCLET_SELECTION_EPSILON)
}

/// Cumulative selection probabilities, ascending and ending at 1
pub fn cumulative_probabilities(members: &[Individual]) -> Vec<f64> {
    let weights = members
        .iter()
        .map(|member| selection_weight(member.fitness()))
        .collect::<Vec<_>>();
    let total = weights.iter().sum::<f64>();

    let mut acc = 0.;
    let mut table = weights
        .into_iter()
        .map(|w| {
            acc += w / total;
            acc
        })
        .collect::<Vec<_>>();
    // float drift could otherwise leave a draw past the last slot
    if let Some(last) = table.last_mut() {
        *last = 1.;
    }
    table
}

/// Number of candidates to draw for a pool at `rate`
#[inline]
pub fn pool_size(rate: f64, population_size: usize) -> usize {
    (rate * population_size as f64).round() as usize
}

/// Draw `count` candidates from `members`, with replacement, weighted by [selection_weight]
pub fn candidate_pool<'a>(
    members: &'a [Individual],
    count: usize,
    rng: &mut impl Rng,
) -> Vec<&'a Individual> {
    if members.is_empty() {
        return vec![];
    }

    let table = cumulative_probabilities(members);
    (0..count)
        .map(|_| {
            let roll = rng.random::<f64>();
            let idx = table
                .partition_point(|&p| p <= roll)
                .min(members.len() - 1);
            &members[idx]
        })
        .collect()
}

/// Pair up a crossover pool in draw order and cross each pair, two children per pair. A trailing
/// unpaired candidate is dropped.
pub fn breed(
    members: &[Individual],
    rate: f64,
    population_size: usize,
    evaluator: &Evaluator<'_>,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> Result<Vec<Individual>> {
    let pool = candidate_pool(members, pool_size(rate, population_size), rng);
    let pairs = pool.chunks_exact(2);
    if let [leftover] = pairs.remainder() {
        log::trace!("dropping unpaired crossover candidate {}", leftover.id());
    }

    let children = pairs
        .flat_map(|pair| {
            let (first, second) = crossover(pair[0].chromosome(), pair[1].chromosome(), rng);
            [first, second]
        })
        .collect::<Vec<Chromosome>>();

    evaluator.materialize(children, ids)
}

/// One mutant per candidate in a mutation pool
pub fn mutants(
    members: &[Individual],
    rate: f64,
    population_size: usize,
    bounds: &GeneBounds,
    evaluator: &Evaluator<'_>,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> Result<Vec<Individual>> {
    let pool = candidate_pool(members, pool_size(rate, population_size), rng);
    let children = pool
        .into_iter()
        .map(|parent| mutate(parent.chromosome(), bounds, rng))
        .collect::<Vec<_>>();

    evaluator.materialize(children, ids)
}
