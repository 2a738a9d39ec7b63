//! RGBA rasters and alpha masks
//!
//! Every sprite the simulation touches is a [`Raster`]: its bytes double as the
//! per-pixel collision mask (alpha channel at offset 3 of each pixel). Ship art
//! itself comes from an external generator behind [`ShipGenerator`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// An RGBA image, row-major, 4 bytes per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Fully transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// Wrap an existing RGBA buffer
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "RGBA buffer does not match {width}x{height}"
        );
        Self { width, height, data }
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut raster = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                raster.set_pixel(x, y, f(x, y));
            }
        }
        raster
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as a float vector, handy for centring
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Raw RGBA bytes (the alpha mask)
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let o = self.offset(x, y);
        [self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let o = self.offset(x, y);
        self.data[o..o + 4].copy_from_slice(&rgba);
    }

    #[inline]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[self.offset(x, y) + 3]
    }

    #[inline]
    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.alpha_at(x, y) > 0
    }

    /// Number of pixels with non-zero alpha
    pub fn opaque_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    /// Mirror top to bottom (generated ships face up, enemies face down)
    pub fn flip_vertical(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.pixel(x, self.height - 1 - y)
        })
    }

    /// Crop to the bounding box of opaque pixels
    ///
    /// A raster with no opaque pixel trims to a single transparent pixel.
    pub fn trim(&self) -> Self {
        let mut min = (u32::MAX, u32::MAX);
        let mut max = (0, 0);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_opaque(x, y) {
                    min = (min.0.min(x), min.1.min(y));
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        if min.0 == u32::MAX {
            return Self::new(1, 1);
        }
        Self::from_fn(max.0 - min.0 + 1, max.1 - min.1 + 1, |x, y| {
            self.pixel(x + min.0, y + min.1)
        })
    }

    /// Inverted sepia copy used as the flash overlay when an enemy is hit
    pub fn hit_tint(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            let [r, g, b, a] = self.pixel(x, y);
            let (r, g, b) = (r as f32, g as f32, b as f32);
            [
                (255.0 - (0.39 * r + 0.77 * g + 0.19 * b)).clamp(0.0, 255.0) as u8,
                (255.0 - (0.35 * r + 0.69 * g + 0.17 * b)).clamp(0.0, 255.0) as u8,
                (255.0 - (0.27 * r + 0.53 * g + 0.13 * b)).clamp(0.0, 255.0) as u8,
                a,
            ]
        })
    }

    /// Round glowing bullet: yellow core fading to red past `inner_stop`
    pub fn glow_disc(radius: u32, inner_stop: f32) -> Self {
        let r = radius as f32;
        Self::from_fn(radius * 2, radius * 2, |x, y| {
            let d = Vec2::new(x as f32 + 0.5 - r, y as f32 + 0.5 - r).length() / r;
            if d > 1.0 {
                return [0; 4];
            }
            let t = if d <= inner_stop {
                0.0
            } else {
                (d - inner_stop) / (1.0 - inner_stop).max(f32::EPSILON)
            };
            [255, (255.0 * (1.0 - t)) as u8, 0, 255]
        })
    }

    /// Player bullet: a rounded head with a tail `factor` radii long, leaning by `lean` radians
    pub fn flame(radius: u32, lean: f32, factor: f32) -> Self {
        let r = radius as f32;
        let side = radius * 9;
        let origin = Vec2::splat(r * 4.0);
        let (sin, cos) = (-lean).sin_cos();
        let tip = Vec2::new(r, r * factor);
        let raster = Self::from_fn(side, side, |x, y| {
            // Undo the lean to test against the upright shape
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - origin;
            let local = Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos);
            let head = local.y <= r && local.distance(Vec2::splat(r)) <= r;
            let tail = local.y > r && local.y <= tip.y && {
                let half_width = r * (tip.y - local.y) / (tip.y - r);
                (local.x - r).abs() <= half_width
            };
            if !(head || tail) {
                return [0; 4];
            }
            let rim = local.distance(Vec2::splat(r)) > r * 0.75 || local.y > r * (factor - 1.0);
            if rim { [0, 255, 255, 255] } else { [255, 255, 0, 255] }
        });
        raster.trim()
    }
}

/// Source of ship art
///
/// The real generator is a procedural ship painter living outside the
/// simulation; only its output raster matters here.
pub trait ShipGenerator {
    fn generate_ship(&self, color_seed: u32, ship_seed: u32, layout_seed: u32, size: u32) -> Raster;
}

/// Deterministic mirrored block silhouettes
///
/// Good enough to drive collisions and shattering without the real painter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilhouetteGenerator;

impl SilhouetteGenerator {
    const CELL: u32 = 4;
}

impl ShipGenerator for SilhouetteGenerator {
    fn generate_ship(&self, color_seed: u32, ship_seed: u32, layout_seed: u32, size: u32) -> Raster {
        let side = (24 + size / 2).div_ceil(Self::CELL) * Self::CELL;
        let cells = side / Self::CELL;
        let half = cells.div_ceil(2);
        let seed = (u64::from(ship_seed) << 32) | u64::from(layout_seed);
        let mut rng = Pcg32::seed_from_u64(seed);

        // Fill the left half and mirror it; the spine column is always solid
        let mut grid = vec![false; (cells * cells) as usize];
        for cy in 0..cells {
            for cx in 0..half {
                let spine = cx == half - 1;
                let filled = spine || rng.random_bool(0.55);
                grid[(cy * cells + cx) as usize] = filled;
                grid[(cy * cells + (cells - 1 - cx)) as usize] = filled;
            }
        }

        let hue = color_seed.wrapping_mul(2654435761);
        let base = [(hue >> 24) as u8 | 0x40, (hue >> 16) as u8 | 0x40, (hue >> 8) as u8 | 0x40];
        Raster::from_fn(side, side, |x, y| {
            let (cx, cy) = (x / Self::CELL, y / Self::CELL);
            if grid[(cy * cells + cx) as usize] {
                [base[0], base[1], base[2], 255]
            } else {
                [0; 4]
            }
        })
    }
}
