pub mod chromosome;
pub mod gene;

pub use chromosome::{mutate, random_chromosome, Chromosome};
pub use gene::{random_gene, Gene, GeneBounds};
