//! Player and enemy bullets

use std::rc::Rc;

use glam::Vec2;

use super::blueprint::BulletSize;
use super::collision::{HitBox, collide};
use super::entity::{Entity, FrameContext, Spawner, StepOutcome};
use crate::consts::*;
use crate::{angle_between, heading};

/// Player bullet direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Left,
    Straight,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Straight, Lane::Right];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Horizontal drift as a multiple of a quarter of the bullet speed
    #[inline]
    fn drift(self) -> f32 {
        self.index() as f32 - 1.0
    }
}

/// Player bullet sprite and damage class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caliber {
    Small,
    Large,
}

impl Caliber {
    /// Large rounds from upgrade level 3 on
    pub fn for_upgrade(level: u8) -> Self {
        if level > 2 { Caliber::Large } else { Caliber::Small }
    }

    pub fn power(self) -> f32 {
        match self {
            Caliber::Small => SMALL_BULLET_POWER,
            Caliber::Large => LARGE_BULLET_POWER,
        }
    }

    pub fn radius(self) -> u32 {
        match self {
            Caliber::Small => 5,
            Caliber::Large => 8,
        }
    }
}

/// A player round flying up the screen
#[derive(Debug, Clone)]
pub struct Bullet {
    pos: Vec2,
    lane: Lane,
    caliber: Caliber,
    last_time: f64,
}

impl Bullet {
    pub fn new(pos: Vec2, lane: Lane, caliber: Caliber, now: f64) -> Self {
        Self {
            pos,
            lane,
            caliber,
            last_time: now,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }
}

impl Entity for Bullet {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, _spawn: &mut Spawner) -> StepOutcome {
        let elapsed = (now - self.last_time) as f32;
        self.pos.y -= BULLET_SPEED * elapsed;
        self.pos.x += self.lane.drift() * BULLET_SPEED * elapsed / 4.0;

        let sprite = frame.assets.player_bullet(self.caliber, self.lane);
        let hitbox = HitBox::new(self.pos, Rc::clone(sprite));

        // First target hit takes the bullet
        let hitables = frame.hitables;
        for target in hitables {
            if target.check_hit(&hitbox, self.caliber.power(), now, frame.state) {
                return StepOutcome::DEAD;
            }
        }

        if self.pos.y + sprite.size().y / 2.0 <= 0.0 {
            return StepOutcome::DEAD;
        }
        self.last_time = now;
        frame.draw.image(sprite, self.pos - sprite.size() / 2.0);
        StepOutcome::alive()
    }
}

/// An animated glowing enemy round
///
/// Only collides with the player ship. Drawn in the foreground layer.
#[derive(Debug, Clone)]
pub struct EnemyBullet {
    size: BulletSize,
    pos: Vec2,
    velocity: Vec2,
    last_time: f64,
}

impl EnemyBullet {
    /// `angle` follows the playfield convention: zero fires straight down
    pub fn new(size: BulletSize, pos: Vec2, angle: f32, speed: f32, now: f64) -> Self {
        Self {
            size,
            pos,
            velocity: heading(angle) * speed,
            last_time: now,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

impl Entity for EnemyBullet {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, spawn: &mut Spawner) -> StepOutcome {
        // Bombs wipe every bullet on screen
        if frame.state.bomb_active(now) {
            return StepOutcome::DEAD;
        }
        let elapsed = (now - self.last_time) as f32;
        self.pos += self.velocity * elapsed;

        let art = frame.assets.enemy_bullet(self.size);
        let half = art.mask.size() / 2.0;
        let hitbox = HitBox::new(self.pos, Rc::clone(&art.mask));

        let hit = frame
            .state
            .ship
            .hitbox
            .as_ref()
            .is_some_and(|ship| collide(ship, &hitbox));
        if hit {
            frame.state.hit_ship(now, spawn);
            if !frame.state.ship_destroyed {
                return StepOutcome::DEAD;
            }
        }

        let gone = self.pos.y - half.y > CANVAS_HEIGHT
            || self.pos.y + half.y < 0.0
            || self.pos.x - half.x > CANVAS_WIDTH
            || self.pos.x + half.x < 0.0;
        if gone {
            return StepOutcome::DEAD;
        }

        self.last_time = now;
        let sprite = &art.frames[(now as u64 % art.frames.len() as u64) as usize];
        frame.draw.image(sprite, self.pos - half);
        StepOutcome::foreground()
    }
}

/// `count` bullets evenly spaced around a full circle, starting at `angle`
pub fn fire_circle_bullets(
    spawn: &mut Spawner,
    size: BulletSize,
    count: u32,
    origin: Vec2,
    angle: f32,
    speed: f32,
    now: f64,
) {
    for c in 0..count {
        let a = angle + 2.0 * c as f32 * std::f32::consts::PI / count as f32;
        spawn.spawn(EnemyBullet::new(size, origin, a, speed, now));
    }
}

/// Firing helpers handed to an enemy's fire pattern for one volley
pub struct Volley<'a> {
    pub origin: Vec2,
    /// Where aimed shots go (the player ship)
    pub target: Vec2,
    pub now: f64,
    spawn: &'a mut Spawner,
}

impl<'a> Volley<'a> {
    pub fn new(origin: Vec2, target: Vec2, now: f64, spawn: &'a mut Spawner) -> Self {
        Self {
            origin,
            target,
            now,
            spawn,
        }
    }

    /// One bullet straight at the target
    pub fn aimed(&mut self, size: BulletSize, speed: f32) {
        self.aimed_spread(size, speed, 0, 0.0);
    }

    /// An aimed bullet flanked by `extra` pairs fanned out `extra_angle` apart
    pub fn aimed_spread(&mut self, size: BulletSize, speed: f32, extra: u32, extra_angle: f32) {
        let angle = angle_between(self.origin, self.target);
        self.single(size, angle, speed);
        for c in 1..=extra {
            let offset = c as f32 * extra_angle;
            self.single(size, angle + offset, speed);
            self.single(size, angle - offset, speed);
        }
    }

    pub fn circle(&mut self, size: BulletSize, count: u32, angle: f32, speed: f32) {
        fire_circle_bullets(self.spawn, size, count, self.origin, angle, speed, self.now);
    }

    pub fn single(&mut self, size: BulletSize, angle: f32, speed: f32) {
        self.spawn
            .spawn(EnemyBullet::new(size, self.origin, angle, speed, self.now));
    }
}
