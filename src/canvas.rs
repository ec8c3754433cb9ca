//! RGBA8 pixel buffers shared between the renderer, the fitness functions and the outside world.

use crate::error::{EvolveError, Result};

/// A row-major RGBA buffer, 8 bits per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A buffer where every pixel is `fill`
    pub fn filled(width: u32, height: u32, fill: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA bytes, which must hold exactly `width * height` pixels
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(EvolveError::DimensionMismatch {
                expected: (width, height),
                found: (width, (data.len() / 4 / width.max(1) as usize) as u32),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGBA of the pixel at (x, y). Panics when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Overwrite every pixel with `fill`, keeping the allocation
    pub fn fill(&mut self, fill: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
    }

    /// Per-channel mean over every pixel
    pub fn mean_color(&self) -> [f64; 4] {
        let n = self.pixel_count();
        if n == 0 {
            return [0.; 4];
        }

        let mut sums = [0u64; 4];
        for px in self.data.chunks_exact(4) {
            for (sum, channel) in sums.iter_mut().zip(px) {
                *sum += u64::from(*channel);
            }
        }
        sums.map(|s| s as f64 / n as f64)
    }

    /// Fail unless `other` has the same dimensions as this buffer
    pub fn ensure_same_dims(&self, other: &PixelBuffer) -> Result<()> {
        if self.dims() == other.dims() && self.data.len() == other.data.len() {
            Ok(())
        } else {
            Err(EvolveError::DimensionMismatch {
                expected: self.dims(),
                found: other.dims(),
            })
        }
    }

    /// A new buffer with `self` on the left and `right` on the right, padded with `fill` where
    /// heights differ
    pub fn beside(&self, right: &PixelBuffer, fill: [u8; 4]) -> PixelBuffer {
        let width = self.width + right.width;
        let height = self.height.max(right.height);
        let mut out = PixelBuffer::filled(width, height, fill);
        for (src, x_off) in [(self, 0), (right, self.width)] {
            let row_len = src.width as usize * 4;
            for y in 0..src.height as usize {
                let from = y * row_len;
                let to = (y * width as usize + x_off as usize) * 4;
                out.data[to..to + row_len].copy_from_slice(&src.data[from..from + row_len]);
            }
        }
        out
    }
}
