//! Centralized constants for circlet run parameters.
//!
//! All defaults are defined here with the `CIRCLET_` prefix, and are what a [RunConfig] falls
//! back to when a field is omitted.
//!
//! [RunConfig]: crate::config::RunConfig

// ============================================================================
// Population Parameters
// ============================================================================

/// Number of individuals kept after every selection
pub const CIRCLET_POPULATION_SIZE: usize = 5;

/// Number of circles in every chromosome
pub const CIRCLET_TOTAL_CIRCLE: usize = 128;

/// Generations to run before terminating
pub const CIRCLET_MAX_GENERATIONS: usize = 150_000;

// ============================================================================
// Operator Parameters
// ============================================================================

/// Fraction of the population size drawn into the crossover candidate pool
pub const CIRCLET_CROSSOVER_RATE: f64 = 0.5;

/// Fraction of the population size drawn into the mutation candidate pool
pub const CIRCLET_MUTATION_RATE: f64 = 0.5;

/// Added to fitness before inverting it into a selection weight, so a perfect match
/// does not divide by zero
pub const CIRCLET_SELECTION_EPSILON: f64 = 1.0;

// ============================================================================
// Rendering Parameters
// ============================================================================

/// Canvas color before any circle is composited, opaque white
pub const CIRCLET_BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// The largest radius is the smaller canvas side divided by this
pub const CIRCLET_RADIUS_DIVISOR: u32 = 4;

// ============================================================================
// Fitness Parameters
// ============================================================================

/// Pixel stride of the sampled distance, 2 compares every other pixel
pub const CIRCLET_SAMPLE_STRIDE: usize = 2;

/// Luminance weights (per mille) used when comparing against a grayscale target
pub const CIRCLET_LUMA_WEIGHTS: [u32; 3] = [299, 587, 114];
