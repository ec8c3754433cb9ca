use crate::genome::Chromosome;
use rand::Rng;

/// Single point crossover. The first child takes `l` before `point` and `r` from `point` on, the
/// second child is the complement. Both parents must have the same length.
pub fn crossover_at(l: &Chromosome, r: &Chromosome, point: usize) -> (Chromosome, Chromosome) {
    debug_assert_eq!(l.len(), r.len(), "crossover between unequal chromosomes");
    let (l, r) = (l.genes(), r.genes());
    let point = point.min(l.len());

    let mut first = Vec::with_capacity(l.len());
    first.extend_from_slice(&l[..point]);
    first.extend_from_slice(&r[point..]);

    let mut second = Vec::with_capacity(r.len());
    second.extend_from_slice(&r[..point]);
    second.extend_from_slice(&l[point..]);

    (Chromosome::new(first), Chromosome::new(second))
}

/// [crossover_at] a point drawn uniformly from `[0, len)`
pub fn crossover(l: &Chromosome, r: &Chromosome, rng: &mut impl Rng) -> (Chromosome, Chromosome) {
    let point = rng.random_range(0..l.len().max(1));
    crossover_at(l, r, point)
}
