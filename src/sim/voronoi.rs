//! Ship shattering by nearest-centre (approximate Voronoi) partitioning
//!
//! Runs once per ship image at load time. Every opaque pixel goes to the
//! closest of a staggered grid of jittered collector centres; each non-empty
//! collector becomes one shard raster.

use std::rc::Rc;

use glam::Vec2;
use rand::Rng;

use crate::raster::Raster;

/// Smallest collector cell edge in pixels
const MIN_CELL_SIZE: u32 = 12;
/// Roughly this many cells along the shorter raster edge
const CELLS_PER_EDGE: u32 = 12;

/// One piece of a shattered raster
#[derive(Debug, Clone)]
pub struct Shard {
    /// Collector centre in source raster coordinates
    pub center: Vec2,
    /// Shard top-left relative to `center`
    pub offset: Vec2,
    pub sprite: Rc<Raster>,
}

impl Shard {
    /// Top-left corner of the shard inside the source raster
    pub fn origin(&self) -> Vec2 {
        self.center + self.offset
    }

    /// Randomised outward flight for one detonation
    ///
    /// The shard travels away from the centre of the `width`×`height` source
    /// by its own distance scaled by a factor in [0.5, 2.0], spinning a little.
    pub fn launch(&self, width: f32, height: f32, rng: &mut impl Rng) -> ShardFlight {
        let from_center = self.center - Vec2::new(width, height) / 2.0;
        let distance = from_center.length();
        let final_distance = distance * (0.5 + 1.5 * rng.random::<f32>());
        let translate = if distance > 0.0 {
            from_center / distance * final_distance
        } else {
            Vec2::ZERO
        };
        ShardFlight {
            shard: self.clone(),
            translate,
            spin: (rng.random::<f32>() - 0.5) * 3.0,
        }
    }
}

/// A shard plus the ballistic end state of one explosion
#[derive(Debug, Clone)]
pub struct ShardFlight {
    pub shard: Shard,
    pub translate: Vec2,
    /// Total rotation reached at the end of the flight (radians)
    pub spin: f32,
}

struct Collector {
    center: Vec2,
    min: (u32, u32),
    max: (u32, u32),
    pixels: Vec<(u32, u32, [u8; 4])>,
}

/// Split `raster` into shards, most detailed first
pub fn create_shards(raster: &Raster, rng: &mut impl Rng) -> Vec<Shard> {
    let width = raster.width();
    let height = raster.height();
    let target = MIN_CELL_SIZE.max(width.min(height) / CELLS_PER_EDGE);
    let x_points = (width / target).max(1);
    let y_points = (height / target).max(1);
    let cell_w = width as f32 / x_points as f32;
    let cell_h = height as f32 / y_points as f32;
    let y_offset = (height / y_points / 2) as f32;

    // Odd rows carry one fewer centre, shifted half a cell: a brick pattern
    let mut collectors = Vec::new();
    for row in 0..y_points {
        let odd = row % 2;
        let x_offset = (width / ((2 - odd) * x_points)) as f32;
        for col in 0..x_points - odd {
            let jitter_x = rng.random::<f32>() - 0.5;
            let jitter_y = rng.random::<f32>() - 0.5;
            collectors.push(Collector {
                center: Vec2::new(
                    x_offset + (col as f32 + jitter_x) * cell_w,
                    y_offset + (row as f32 + jitter_y) * cell_h,
                ),
                min: (u32::MAX, u32::MAX),
                max: (0, 0),
                pixels: Vec::new(),
            });
        }
    }
    assert!(!collectors.is_empty(), "raster {width}x{height} produced no collectors");

    for y in 0..height {
        for x in 0..width {
            if !raster.is_opaque(x, y) {
                continue;
            }
            let p = Vec2::new(x as f32, y as f32);
            let mut nearest = 0;
            let mut best = f32::INFINITY;
            for (i, c) in collectors.iter().enumerate() {
                let d = c.center.distance(p);
                // Strict: the first collector wins ties
                if d < best {
                    best = d;
                    nearest = i;
                }
            }
            let c = &mut collectors[nearest];
            c.min = (c.min.0.min(x), c.min.1.min(y));
            c.max = (c.max.0.max(x), c.max.1.max(y));
            c.pixels.push((x, y, raster.pixel(x, y)));
        }
    }

    // Stable sort keeps collector order among equally sized shards
    collectors.sort_by(|a, b| b.pixels.len().cmp(&a.pixels.len()));

    collectors
        .into_iter()
        .filter(|c| !c.pixels.is_empty())
        .map(|c| {
            let mut sprite = Raster::new(c.max.0 - c.min.0 + 1, c.max.1 - c.min.1 + 1);
            for &(x, y, rgba) in &c.pixels {
                sprite.set_pixel(x - c.min.0, y - c.min.1, rgba);
            }
            Shard {
                center: c.center,
                offset: Vec2::new(c.min.0 as f32, c.min.1 as f32) - c.center,
                sprite: Rc::new(sprite),
            }
        })
        .collect()
}
