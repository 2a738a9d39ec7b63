//! Pixel-accurate collision between masked boxes
//!
//! A cheap bounding-box rejection first, then a scan of the overlapping
//! rectangle looking for a pixel that is solid in both alpha masks.

use std::rc::Rc;

use glam::Vec2;

use crate::raster::Raster;

/// A centred rectangle carrying the alpha mask of the sprite inside it
///
/// Rebuilt every frame by whoever wants to stay collidable.
#[derive(Debug, Clone)]
pub struct HitBox {
    pub center: Vec2,
    pub mask: Rc<Raster>,
}

impl HitBox {
    pub fn new(center: Vec2, mask: Rc<Raster>) -> Self {
        Self { center, mask }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.mask.width() as i32
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.mask.height() as i32
    }

    /// Integer left/top edge: the centre is rounded after subtracting half the size
    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (
            round_half_up(self.center.x - self.width() as f32 / 2.0),
            round_half_up(self.center.y - self.height() as f32 / 2.0),
        )
    }
}

/// Round with halves going toward +∞, the way canvas pixel snapping does
#[inline]
fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// True when the two boxes share at least one pixel opaque in both masks
pub fn collide(a: &HitBox, b: &HitBox) -> bool {
    let (a_left, a_top) = a.origin();
    let (b_left, b_top) = b.origin();
    let (aw, ah) = (a.width(), a.height());
    let (bw, bh) = (b.width(), b.height());

    let overlaps = a_left < b_left + bw
        && a_left + aw > b_left
        && a_top < b_top + bh
        && a_top + ah > b_top;
    if !overlaps {
        return false;
    }

    let start_x = a_left.max(b_left);
    let start_y = a_top.max(b_top);
    let end_x = (a_left + aw).min(b_left + bw);
    let end_y = (a_top + ah).min(b_top + bh);

    for y in start_y..end_y {
        for x in start_x..end_x {
            if a.mask.is_opaque((x - a_left) as u32, (y - a_top) as u32)
                && b.mask.is_opaque((x - b_left) as u32, (y - b_top) as u32)
            {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solid(w: u32, h: u32) -> Rc<Raster> {
        Rc::new(Raster::from_fn(w, h, |_, _| [255, 255, 255, 255]))
    }

    fn ring(side: u32) -> Rc<Raster> {
        // Opaque border, transparent inside
        Rc::new(Raster::from_fn(side, side, |x, y| {
            let edge = x == 0 || y == 0 || x == side - 1 || y == side - 1;
            if edge { [255; 4] } else { [0; 4] }
        }))
    }

    #[test]
    fn test_solid_overlap_collides() {
        let a = HitBox::new(Vec2::new(10.0, 10.0), solid(10, 10));
        let b = HitBox::new(Vec2::new(18.0, 12.0), solid(10, 10));
        assert!(collide(&a, &b));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = HitBox::new(Vec2::new(5.0, 5.0), solid(10, 10));
        let b = HitBox::new(Vec2::new(15.0, 5.0), solid(10, 10));
        assert!(!collide(&a, &b));
    }

    #[test]
    fn test_transparent_pixels_never_collide() {
        // A small box sitting in the hollow middle of a ring
        let a = HitBox::new(Vec2::new(20.0, 20.0), ring(20));
        let b = HitBox::new(Vec2::new(20.0, 20.0), solid(4, 4));
        assert!(!collide(&a, &b));

        let c = HitBox::new(Vec2::new(11.0, 20.0), solid(4, 4));
        assert!(collide(&a, &c));
    }

    #[test]
    fn test_fractional_centres_round_before_overlap() {
        // 9.5 - 5 rounds to 5, so the boxes end up adjacent rather than overlapping
        let a = HitBox::new(Vec2::new(4.6, 5.0), solid(10, 10));
        let b = HitBox::new(Vec2::new(14.5, 5.0), solid(10, 10));
        assert_eq!(a.origin().0 + 10, b.origin().0);
        assert!(!collide(&a, &b));

        let b = HitBox::new(Vec2::new(14.4, 5.0), solid(10, 10));
        assert!(collide(&a, &b));
    }

    fn arb_box() -> impl Strategy<Value = HitBox> {
        (1u32..12, 1u32..12, -20.0f32..40.0, -20.0f32..40.0, any::<u64>()).prop_map(
            |(w, h, x, y, bits)| {
                let mask = Raster::from_fn(w, h, |px, py| {
                    let bit = (px + py * w) % 64;
                    if bits >> bit & 1 == 1 { [255; 4] } else { [0; 4] }
                });
                HitBox::new(Vec2::new(x, y), Rc::new(mask))
            },
        )
    }

    proptest! {
        #[test]
        fn prop_collision_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(collide(&a, &b), collide(&b, &a));
        }

        #[test]
        fn prop_disjoint_rectangles_never_collide(a in arb_box(), b in arb_box()) {
            let (al, at) = a.origin();
            let (bl, bt) = b.origin();
            let disjoint = al + a.width() <= bl
                || bl + b.width() <= al
                || at + a.height() <= bt
                || bt + b.height() <= at;
            if disjoint {
                prop_assert!(!collide(&a, &b));
            }
        }
    }
}
