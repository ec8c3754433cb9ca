//! Rasterizes a [Chromosome] onto a white canvas.
//!
//! Circles are composited one after another into a single buffer with alpha-over, in ascending
//! `z` order. Genes sharing a `z` keep their chromosome order, so every gene is drawn exactly once.

use crate::{
    canvas::PixelBuffer,
    constants::CIRCLET_BACKGROUND,
    genome::{Chromosome, Gene},
};
use core::cmp::Ordering;

/// Indices of `genes` in the order they're drawn: ascending z, ties broken by index
pub fn draw_order(genes: &[Gene]) -> Vec<usize> {
    let mut order = (0..genes.len()).collect::<Vec<_>>();
    // sort_by is stable, so equal z keeps ascending index
    order.sort_by(|&l, &r| {
        genes[l]
            .z
            .partial_cmp(&genes[r].z)
            .unwrap_or(Ordering::Equal)
    });
    order
}

#[inline]
fn blend(src: u8, dst: u8, alpha: u32) -> u8 {
    ((u32::from(src) * alpha + u32::from(dst) * (255 - alpha) + 127) / 255) as u8
}

/// Composite one filled circle onto `canvas`, clipped to its bounds. A zero radius draws nothing
pub fn draw_circle(canvas: &mut PixelBuffer, gene: &Gene, transparent: bool) {
    if gene.radius == 0 {
        return;
    }

    let (width, height) = canvas.dims();
    let alpha = if transparent { u32::from(gene.a) } else { 255 };
    let rgb = gene.rgb();
    let r = i64::from(gene.radius);
    let (cx, cy) = (i64::from(gene.x), i64::from(gene.y));

    let y_lo = (cy - r).max(0);
    let y_hi = (cy + r).min(i64::from(height) - 1);
    let x_lo = (cx - r).max(0);
    let x_hi = (cx + r).min(i64::from(width) - 1);

    let stride = width as usize * 4;
    let data = canvas.as_raw_mut();
    for y in y_lo..=y_hi {
        let dy = y - cy;
        let row = y as usize * stride;
        for x in x_lo..=x_hi {
            let dx = x - cx;
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let idx = row + x as usize * 4;
            for (channel, src) in rgb.iter().enumerate() {
                data[idx + channel] = blend(*src, data[idx + channel], alpha);
            }
            data[idx + 3] = 255;
        }
    }
}

/// Render into an existing canvas, which is cleared first. Lets a caller reuse one allocation
/// across many renders.
pub fn render_into(canvas: &mut PixelBuffer, chromosome: &Chromosome, transparent: bool) {
    canvas.fill(CIRCLET_BACKGROUND);
    let genes = chromosome.genes();
    for idx in draw_order(genes) {
        draw_circle(canvas, &genes[idx], transparent);
    }
}

/// Render `chromosome` onto a fresh `width` x `height` canvas
pub fn render(chromosome: &Chromosome, width: u32, height: u32, transparent: bool) -> PixelBuffer {
    let mut canvas = PixelBuffer::filled(width, height, CIRCLET_BACKGROUND);
    render_into(&mut canvas, chromosome, transparent);
    canvas
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        genome::{random_chromosome, GeneBounds},
        random::WyRng,
    };

    fn gene(rgba: [u8; 4], x: u32, y: u32, radius: u32, z: f64) -> Gene {
        Gene {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
            a: rgba[3],
            x,
            y,
            radius,
            z,
        }
    }

    #[test]
    fn test_empty_is_white() {
        let out = render(&Chromosome::new(vec![]), 3, 2, true);
        assert_eq!(PixelBuffer::filled(3, 2, [255; 4]), out);
    }

    #[test]
    fn test_render_deterministic() {
        let mut rng = WyRng::seeded(3);
        let bounds = GeneBounds::new(24, 16, false);
        let chromosome = random_chromosome(&bounds, 32, &mut rng);
        let first = render(&chromosome, 24, 16, true);
        for _ in 0..5 {
            assert_eq!(first, render(&chromosome, 24, 16, true));
        }

        let mut reused = PixelBuffer::filled(24, 16, [0; 4]);
        render_into(&mut reused, &chromosome, true);
        assert_eq!(first, reused);
    }

    #[test]
    fn test_opaque_circle_shape() {
        let chromosome = Chromosome::new(vec![gene([255, 0, 0, 255], 4, 4, 2, 0.5)]);
        let out = render(&chromosome, 9, 9, true);

        let red = (0..9)
            .flat_map(|y| (0..9).map(move |x| (x, y)))
            .filter(|&(x, y)| out.pixel(x, y) == [255, 0, 0, 255])
            .count();
        // 13 lattice points within distance 2
        assert_eq!(13, red);
        assert_eq!([255, 0, 0, 255], out.pixel(4, 2));
        assert_eq!([255; 4], out.pixel(2, 2));
    }

    #[test]
    fn test_zero_radius_draws_nothing() {
        let chromosome = Chromosome::new(vec![gene([0, 0, 0, 255], 1, 1, 0, 0.1)]);
        assert_eq!(
            PixelBuffer::filled(3, 3, [255; 4]),
            render(&chromosome, 3, 3, true)
        );
    }

    #[test]
    fn test_clipped_at_edges() {
        let chromosome = Chromosome::new(vec![gene([0, 0, 255, 255], 0, 0, 3, 0.2)]);
        let out = render(&chromosome, 4, 4, true);
        assert_eq!([0, 0, 255, 255], out.pixel(0, 0));
        assert_eq!([0, 0, 255, 255], out.pixel(3, 0));
        assert_eq!([255; 4], out.pixel(3, 3));
    }

    #[test]
    fn test_alpha_over() {
        let chromosome = Chromosome::new(vec![gene([0, 0, 0, 128], 1, 1, 1, 0.3)]);
        let out = render(&chromosome, 3, 3, true);
        // (0 * 128 + 255 * 127 + 127) / 255
        assert_eq!([127, 127, 127, 255], out.pixel(1, 1));

        let opaque = render(&chromosome, 3, 3, false);
        assert_eq!([0, 0, 0, 255], opaque.pixel(1, 1));
    }

    #[test]
    fn test_z_order() {
        let under = gene([255, 0, 0, 255], 2, 2, 2, 0.1);
        let over = gene([0, 255, 0, 255], 2, 2, 2, 0.9);
        let l = render(&Chromosome::new(vec![under, over]), 5, 5, true);
        let r = render(&Chromosome::new(vec![over, under]), 5, 5, true);
        assert_eq!([0, 255, 0, 255], l.pixel(2, 2));
        assert_eq!(l, r);
    }

    #[test]
    fn test_z_collision_keeps_every_gene() {
        let first = gene([255, 0, 0, 255], 1, 1, 1, 0.5);
        let second = gene([0, 0, 255, 255], 5, 5, 1, 0.5);
        let third = gene([0, 255, 0, 255], 5, 5, 1, 0.5);
        let out = render(&Chromosome::new(vec![first, second, third]), 7, 7, true);

        assert_eq!([255, 0, 0, 255], out.pixel(1, 1));
        // same z, later index draws last
        assert_eq!([0, 255, 0, 255], out.pixel(5, 5));
        assert_eq!(vec![0, 1, 2], draw_order(&[first, second, third]));
    }

    #[test]
    fn test_draw_order_total() {
        let genes = [
            gene([0; 4], 0, 0, 0, 0.7),
            gene([0; 4], 0, 0, 0, 0.2),
            gene([0; 4], 0, 0, 0, 0.7),
            gene([0; 4], 0, 0, 0, 0.0),
        ];
        assert_eq!(vec![3, 1, 0, 2], draw_order(&genes));
    }
}
