//! Pixel distances between a candidate render and the target. Lower is better, 0 is a perfect
//! match on every compared pixel.

use crate::{
    canvas::PixelBuffer,
    constants::{CIRCLET_LUMA_WEIGHTS, CIRCLET_SAMPLE_STRIDE},
    error::Result,
};
use serde::{Deserialize, Serialize};

#[inline]
pub fn luma(px: &[u8]) -> u8 {
    let [wr, wg, wb] = CIRCLET_LUMA_WEIGHTS;
    ((u32::from(px[0]) * wr + u32::from(px[1]) * wg + u32::from(px[2]) * wb) / 1000) as u8
}

pub trait Distance {
    /// Distance between two raw RGBA buffers of equal length
    fn distance_raw(&self, candidate: &[u8], target: &[u8], grayscale: bool) -> f64;

    /// Distance between two buffers, failing if their dimensions differ
    fn distance(&self, candidate: &PixelBuffer, target: &PixelBuffer, grayscale: bool) -> Result<f64> {
        target.ensure_same_dims(candidate)?;
        Ok(self.distance_raw(candidate.as_raw(), target.as_raw(), grayscale))
    }
}

/// Sum of absolute channel differences over every `stride`th pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledL1 {
    pub stride: usize,
}

impl Default for SampledL1 {
    fn default() -> Self {
        Self {
            stride: CIRCLET_SAMPLE_STRIDE,
        }
    }
}

impl Distance for SampledL1 {
    fn distance_raw(&self, candidate: &[u8], target: &[u8], grayscale: bool) -> f64 {
        let sum = candidate
            .chunks_exact(4)
            .zip(target.chunks_exact(4))
            .step_by(self.stride.max(1))
            .map(|(c, t)| {
                if grayscale {
                    u64::from(c[0].abs_diff(luma(t)))
                } else {
                    c.iter()
                        .zip(t)
                        .map(|(c, t)| u64::from(c.abs_diff(*t)))
                        .sum::<u64>()
                }
            })
            .sum::<u64>();
        sum as f64
    }
}

/// Euclidean distance over every channel of every pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullL2;

impl Distance for FullL2 {
    fn distance_raw(&self, candidate: &[u8], target: &[u8], grayscale: bool) -> f64 {
        let sum = candidate
            .chunks_exact(4)
            .zip(target.chunks_exact(4))
            .map(|(c, t)| {
                if grayscale {
                    u64::from(c[0].abs_diff(luma(t))).pow(2)
                } else {
                    c.iter()
                        .zip(t)
                        .map(|(c, t)| u64::from(c.abs_diff(*t)).pow(2))
                        .sum::<u64>()
                }
            })
            .sum::<u64>();
        (sum as f64).sqrt()
    }
}

/// Which [Distance] a run scores with. A run never mixes metrics, since their values aren't
/// comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    SampledL1,
    FullL2,
}

impl Metric {
    pub fn distance(
        &self,
        stride: usize,
        candidate: &PixelBuffer,
        target: &PixelBuffer,
        grayscale: bool,
    ) -> Result<f64> {
        match self {
            Metric::SampledL1 => SampledL1 { stride }.distance(candidate, target, grayscale),
            Metric::FullL2 => FullL2.distance(candidate, target, grayscale),
        }
    }
}
