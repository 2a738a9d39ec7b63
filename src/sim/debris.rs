//! Destruction debris: flying shards, pickup coins and glow particles

use std::f32::consts::PI;
use std::rc::Rc;

use glam::Vec2;
use rand::Rng;

use super::assets::ShipArt;
use super::collision::{HitBox, collide};
use super::draw::BlendMode;
use super::entity::{Entity, FrameContext, Spawner, StepOutcome};
use super::voronoi::ShardFlight;
use crate::consts::*;
use crate::raster::Raster;

const EXPLOSION_COLORS: [[u8; 3]; 5] = [
    [0x77, 0x11, 0x00],
    [0xaa, 0x22, 0x11],
    [0xdd, 0x44, 0x22],
    [0xee, 0x99, 0x33],
    [0xff, 0xaa, 0x55],
];

/// Ship area covered by one particle
const PARTICLE_AREA: f32 = 500.0;

#[derive(Debug, Clone)]
enum Motion {
    /// Cosmetic: flies out along the flight, fading and spinning
    Explosion { duration: f64 },
    /// Coin the player can collect
    Pickup {
        pos: Vec2,
        /// Drift direction in screen angle (atan2(y, x))
        drift: f32,
        highlight: Rc<Raster>,
    },
}

/// One shard of a destroyed ship
#[derive(Debug, Clone)]
pub struct ShipFragment {
    flight: ShardFlight,
    /// Top-left corner of the destroyed ship
    origin: Vec2,
    created: f64,
    last_time: f64,
    motion: Motion,
}

impl ShipFragment {
    /// A zero `duration` makes the shard a pickup coin
    pub fn new(flight: ShardFlight, origin: Vec2, now: f64, duration: f64) -> Self {
        if duration > 0.0 {
            Self::explosion(flight, origin, now, duration)
        } else {
            Self::pickup(flight, origin, now)
        }
    }

    pub fn explosion(flight: ShardFlight, origin: Vec2, now: f64, duration: f64) -> Self {
        Self {
            flight,
            origin,
            created: now,
            last_time: now,
            motion: Motion::Explosion { duration },
        }
    }

    pub fn pickup(flight: ShardFlight, origin: Vec2, now: f64) -> Self {
        let sprite = &flight.shard.sprite;
        let pos = origin + flight.shard.origin() + sprite.size() / 2.0;
        let drift = flight.translate.y.atan2(flight.translate.x);
        let highlight = Rc::new(sprite.hit_tint());
        Self {
            flight,
            origin,
            created: now,
            last_time: now,
            motion: Motion::Pickup {
                pos,
                drift,
                highlight,
            },
        }
    }

    pub fn is_pickup(&self) -> bool {
        matches!(self.motion, Motion::Pickup { .. })
    }

    /// Centre of a pickup coin
    pub fn pos(&self) -> Option<Vec2> {
        match self.motion {
            Motion::Pickup { pos, .. } => Some(pos),
            Motion::Explosion { .. } => None,
        }
    }
}

impl Entity for ShipFragment {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, _spawn: &mut Spawner) -> StepOutcome {
        let shard = &self.flight.shard;
        match &mut self.motion {
            Motion::Explosion { duration } => {
                let progress = ((now - self.created) / *duration) as f32;
                if progress >= 1.0 {
                    return StepOutcome::DEAD;
                }
                let pivot = self.origin + shard.center + self.flight.translate * progress;
                frame.draw.image_rotated(
                    &shard.sprite,
                    pivot,
                    shard.offset,
                    self.flight.spin * progress,
                    1.0 - progress * progress,
                );
                StepOutcome::alive()
            }
            Motion::Pickup {
                pos,
                drift,
                highlight,
            } => {
                let state = &mut *frame.state;
                let progress = ((now - self.created) / ENEMY_EXPLOSION_DURATION) as f32;
                let elapsed = (now - self.last_time) as f32;
                let size = shard.sprite.size();

                let magnet = state.magnet_level();
                let to_ship = state.ship.pos - *pos;
                let distance = to_ship.length();
                if !state.ship_destroyed
                    && distance < MAGNET_RADIUS_PER_LEVEL * f32::from(magnet)
                {
                    let speed = BASE_MAGNET_SPEED + ADDITIONAL_MAGNET_SPEED * f32::from(magnet);
                    // Never overshoot the ship centre
                    let step = (speed * elapsed).min(distance);
                    *pos += to_ship.normalize_or_zero() * step;
                } else {
                    if progress < 1.0 {
                        let frames = elapsed / REFERENCE_FRAME_MS;
                        let dir = Vec2::new(drift.cos(), drift.sin());
                        *pos += dir * COIN_SLOWDOWN_SPEED * (1.0 - progress) * frames;
                        let outward = (pos.x < 0.0 && dir.x < 0.0)
                            || (pos.x > CANVAS_WIDTH - size.x && dir.x > 0.0);
                        if outward {
                            *drift += PI;
                        }
                    }
                    pos.y += COIN_CREEPING_SPEED * elapsed;
                }

                let coin = HitBox::new(*pos, Rc::clone(&shard.sprite));
                let collected = !state.ship_destroyed
                    && state.ship.hitbox.as_ref().is_some_and(|ship| collide(ship, &coin));
                if collected {
                    state.collect_star();
                    return StepOutcome::DEAD;
                }
                if pos.y >= CANVAS_HEIGHT {
                    return StepOutcome::DEAD;
                }

                self.last_time = now;
                let top_left = *pos - size / 2.0;
                frame.draw.image(&shard.sprite, top_left);
                let glow = 0.5 + ((now / 100.0).sin() / 2.0) as f32;
                frame.draw.image_alpha(highlight, top_left, glow);
                StepOutcome::alive()
            }
        }
    }
}

/// Fragments for every shard of `art`, centred on `center`
///
/// `duration_of(i)` picks the lifetime of shard `i`; zero turns it into a coin.
pub fn shatter(
    art: &ShipArt,
    center: Vec2,
    now: f64,
    rng: &mut impl Rng,
    mut duration_of: impl FnMut(usize) -> f64,
) -> Vec<ShipFragment> {
    let size = art.sprite.size();
    let origin = center - size / 2.0;
    art.shards
        .iter()
        .enumerate()
        .map(|(i, shard)| {
            let flight = shard.launch(size.x, size.y, rng);
            ShipFragment::new(flight, origin, now, duration_of(i))
        })
        .collect()
}

/// A shrinking additive glow disc
#[derive(Debug, Clone)]
pub struct Particle {
    pos: Vec2,
    radius: f32,
    color: [u8; 3],
    created: f64,
}

impl Particle {
    /// Random particle somewhere over a `size` ship centred at `center`
    pub fn new(center: Vec2, size: Vec2, now: f64, rng: &mut impl Rng) -> Self {
        let half_w = (size.x / 2.0) as i32;
        let half_h = (size.y / 2.0) as i32;
        let offset = Vec2::new(
            rng.random_range(-half_w..=half_w) as f32,
            rng.random_range(-half_h..=half_h) as f32,
        );
        Self {
            pos: center + offset,
            radius: rng.random_range(10.0..50.0),
            color: EXPLOSION_COLORS[rng.random_range(0..EXPLOSION_COLORS.len())],
            created: now,
        }
    }

    /// One particle per 500 px² of ship area, rounded up
    pub fn burst(spawn: &mut Spawner, center: Vec2, size: Vec2, now: f64, rng: &mut impl Rng) {
        let count = (size.x * size.y / PARTICLE_AREA).ceil() as usize;
        for _ in 0..count {
            spawn.spawn(Particle::new(center, size, now, rng));
        }
    }

    pub fn radius_at(&self, now: f64) -> f32 {
        let progress = ((now - self.created) / PARTICLE_DURATION) as f32;
        self.radius * (1.0 - progress).max(0.0)
    }
}

impl Entity for Particle {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, _spawn: &mut Spawner) -> StepOutcome {
        if now - self.created >= PARTICLE_DURATION {
            return StepOutcome::DEAD;
        }
        frame
            .draw
            .circle(self.pos, self.radius_at(now), self.color, BlendMode::Additive);
        StepOutcome::alive()
    }
}
