use crate::constants::CIRCLET_RADIUS_DIVISOR;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One translucent circle. `z` only orders circles when drawing, it is not a depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub x: u32,
    pub y: u32,
    pub radius: u32,
    pub z: f64,
}

impl Gene {
    #[inline]
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// The valid range of every [Gene] field for one canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneBounds {
    pub width: u32,
    pub height: u32,
    pub max_radius: u32,
    pub grayscale: bool,
}

impl GeneBounds {
    pub fn new(width: u32, height: u32, grayscale: bool) -> Self {
        Self {
            width,
            height,
            max_radius: width.min(height) / CIRCLET_RADIUS_DIVISOR,
            grayscale,
        }
    }
}

/// Draw every field uniformly from its range. A grayscale gene draws one shade for all 3 color
/// channels.
pub fn random_gene(bounds: &GeneBounds, rng: &mut impl Rng) -> Gene {
    let (r, g, b) = if bounds.grayscale {
        let shade = rng.random::<u8>();
        (shade, shade, shade)
    } else {
        (rng.random(), rng.random(), rng.random())
    };

    Gene {
        r,
        g,
        b,
        a: rng.random(),
        x: rng.random_range(0..bounds.width),
        y: rng.random_range(0..bounds.height),
        radius: rng.random_range(0..=bounds.max_radius),
        z: rng.random::<f64>(),
    }
}
