use super::gene::{random_gene, Gene, GeneBounds};
use core::ops::Index;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A fixed-length, immutable sequence of [Gene]s. Operators build new chromosomes instead of
/// editing existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome(Vec<Gene>);

impl Chromosome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self(genes)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn genes(&self) -> &[Gene] {
        &self.0
    }

    /// A copy of this chromosome where the gene at `idx` is `gene`
    pub fn with_gene(&self, idx: usize, gene: Gene) -> Self {
        let mut genes = self.0.clone();
        genes[idx] = gene;
        Self(genes)
    }

    /// Gene positions where `self` and `other` differ
    pub fn diff_positions(&self, other: &Self) -> Vec<usize> {
        self.0
            .iter()
            .zip(other.0.iter())
            .enumerate()
            .filter_map(|(idx, (l, r))| (l != r).then_some(idx))
            .collect()
    }
}

impl Index<usize> for Chromosome {
    type Output = Gene;

    fn index(&self, idx: usize) -> &Gene {
        &self.0[idx]
    }
}

impl FromIterator<Gene> for Chromosome {
    fn from_iter<I: IntoIterator<Item = Gene>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn random_chromosome(bounds: &GeneBounds, total_circle: usize, rng: &mut impl Rng) -> Chromosome {
    (0..total_circle).map(|_| random_gene(bounds, rng)).collect()
}

/// Replace one uniformly chosen gene with a fresh random one
pub fn mutate(parent: &Chromosome, bounds: &GeneBounds, rng: &mut impl Rng) -> Chromosome {
    let idx = rng.random_range(0..parent.len());
    parent.with_gene(idx, random_gene(bounds, rng))
}
