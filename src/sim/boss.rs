//! Boss fights
//!
//! A boss flies in while immune, then fights with its own movement and a
//! scripted bullet schedule. Every archetype keeps a volley counter; the
//! counter picks what to fire and how long to wait, and wraps back to zero at
//! the end of the cycle. The final boss changes form once at half health.

use std::f32::consts::PI;
use std::rc::Rc;

use glam::Vec2;

use super::assets::{Assets, ShipArt};
use super::blueprint::{BossKind, BulletSize, Level};
use super::collision::{HitBox, collide};
use super::debris::{Particle, shatter};
use super::enemy::{Vitals, draw_ship};
use super::entity::{Entity, FrameContext, Hitable, Spawner, StepOutcome};
use super::projectile::{EnemyBullet, fire_circle_bullets};
use super::schedule::{SpawnAction, TimeSpacer};
use super::state::{GameEvent, GameState};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::{angle_between, heading};

/// Health while flying in; nothing can realistically drain it
const IMMUNE_HEALTH: f32 = 1e9;
const ENTRY_Y: f32 = -800.0;
const ENTRY_SPEED: f32 = 0.2;
/// Height at which the fight starts
const FIGHT_Y: f32 = 150.0;
const BOSS_SPEED: f32 = 0.1;
/// Distance of the aimed muzzle from the centre
const MUZZLE_RADIUS: f32 = 70.0;
/// Pause before the new form opens fire
const FORM_CHANGE_PAUSE: f64 = 1000.0;
/// Delay before the next Endgame boss shows up
const NEXT_BOSS_DELAY: f64 = 3000.0;

/// Side emitters of the Borealis boss, one pair per two volleys
const BOREALIS_EMITTERS: [[f32; 2]; 4] = [[61.0, 75.0], [78.0, 66.0], [99.0, 76.0], [115.0, 65.0]];
/// Side emitters of the final boss, walked out and back
const FINAL_EMITTERS: [[f32; 2]; 6] = [
    [48.0, 113.0],
    [79.0, 107.0],
    [99.0, 108.0],
    [123.0, 102.0],
    [156.0, 86.0],
    [166.0, 59.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BossPhase {
    Coming,
    Fighting,
}

#[derive(Debug)]
pub struct Boss {
    kind: BossKind,
    art: ShipArt,
    pos: Vec2,
    vitals: Rc<Vitals>,
    phase: BossPhase,
    last_time: f64,
    /// Patrol direction per axis: -1, 0 or 1 (x: right is 1, y: down is 1)
    dir: Vec2,
    bullet_count: u32,
    next_bullet: f64,
}

impl Boss {
    pub fn new(kind: BossKind, art: ShipArt, now: f64) -> Self {
        let dir_y = if kind == BossKind::Draco { 1.0 } else { 0.0 };
        Self {
            kind,
            art,
            pos: Vec2::new(HALF_CANVAS_WIDTH, ENTRY_Y),
            vitals: Rc::new(Vitals::with_boss_bar(IMMUNE_HEALTH)),
            phase: BossPhase::Coming,
            last_time: now,
            dir: Vec2::new(1.0, dir_y),
            bullet_count: 0,
            next_bullet: now,
        }
    }

    /// The boss of the current level, or the next one of the Endgame chain
    ///
    /// Returns `None` when the level has no boss of that rank.
    pub fn for_current_level(state: &mut GameState, assets: &Assets, now: f64) -> Option<Self> {
        let rank = if state.level == Level::Endgame {
            state.difficulty as usize
        } else {
            state.level.index()
        };
        let kind = BossKind::from_index(rank).filter(|&kind| assets.has_boss(kind))?;
        state.events.push(GameEvent::BossHealth(Some(1.0)));
        log::info!("Boss {kind:?} incoming at {now:.0} ms");
        Some(Self::new(kind, assets.boss(kind).clone(), now))
    }

    pub fn kind(&self) -> BossKind {
        self.kind
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn vitals(&self) -> &Rc<Vitals> {
        &self.vitals
    }

    pub fn is_fighting(&self) -> bool {
        self.phase == BossPhase::Fighting
    }

    fn arrive(&mut self, now: f64) {
        self.pos.y = FIGHT_Y;
        self.vitals
            .reset_pool(self.kind.health(), self.kind.next_phase().is_some());
        self.phase = BossPhase::Fighting;
        self.next_bullet = now;
        log::info!("Boss {:?} engaged", self.kind);
    }

    fn travel(&mut self, elapsed: f32, now: f64, state: &GameState) {
        if self.phase == BossPhase::Coming {
            self.pos.y += elapsed * ENTRY_SPEED;
            if self.pos.y > FIGHT_Y {
                self.arrive(now);
            }
            return;
        }

        match self.kind {
            BossKind::Andromeda => {}
            BossKind::EndgameSecond => {
                if !state.ship_destroyed {
                    let angle = angle_between(self.pos, state.ship.pos);
                    self.pos += heading(angle) * BOSS_SPEED * elapsed;
                }
            }
            _ => self.patrol(elapsed),
        }
    }

    /// Bounce off the canvas edges; Cygnus instead turns clockwise at each edge
    fn patrol(&mut self, elapsed: f32) {
        let half = self.art.sprite.size() / 2.0;
        let step = elapsed * BOSS_SPEED;
        let clockwise = self.kind == BossKind::Cygnus;

        if self.dir.x > 0.0 {
            self.pos.x += step;
            if self.pos.x + half.x > CANVAS_WIDTH {
                self.pos.x = CANVAS_WIDTH - half.x;
                self.dir = if clockwise { Vec2::Y } else { Vec2::new(-1.0, self.dir.y) };
            }
        } else if self.dir.x < 0.0 {
            self.pos.x -= step;
            if self.pos.x - half.x < 0.0 {
                self.pos.x = half.x;
                self.dir = if clockwise { Vec2::NEG_Y } else { Vec2::new(1.0, self.dir.y) };
            }
        }

        if self.dir.y > 0.0 {
            self.pos.y += step;
            if self.pos.y + half.y > CANVAS_HEIGHT {
                self.pos.y = CANVAS_HEIGHT - half.y;
                self.dir = if clockwise { Vec2::NEG_X } else { Vec2::new(self.dir.x, -1.0) };
            }
        } else if self.dir.y < 0.0 {
            self.pos.y -= step;
            if self.pos.y - half.y < 0.0 {
                self.pos.y = half.y;
                self.dir = if clockwise { Vec2::X } else { Vec2::new(self.dir.x, 1.0) };
            }
        }
    }

    /// Shed the current hull and continue as the next form
    fn change_form(&mut self, now: f64, assets: &Assets, state: &mut GameState, spawn: &mut Spawner) {
        let Some(next) = self.kind.next_phase() else {
            return;
        };
        for fragment in shatter(&self.art, self.pos, now, &mut state.rng, |_| BOSS_EXPLOSION_DURATION) {
            spawn.spawn_on_top(fragment);
        }
        log::info!("Boss {:?} changes form to {next:?}", self.kind);

        self.kind = next;
        self.art = assets.boss(next).clone();
        self.vitals.reset_pool(next.health(), next.next_phase().is_some());
        self.next_bullet = now + FORM_CHANGE_PAUSE;
        self.bullet_count = 0;
        state.events.push(GameEvent::BossHealth(Some(1.0)));
    }

    fn explode(&self, now: f64, state: &mut GameState, spawn: &mut Spawner) {
        state.events.push(GameEvent::BossHealth(None));
        state.sound(SoundCue::BossExplosion);
        state.add_score(self.kind.kill_points());

        for fragment in shatter(&self.art, self.pos, now, &mut state.rng, |_| BOSS_EXPLOSION_DURATION) {
            spawn.spawn(fragment);
        }
        Particle::burst(spawn, self.pos, self.art.sprite.size(), now, &mut state.rng);
        log::info!("Boss {:?} defeated at {now:.0} ms", self.kind);

        if state.level != Level::Endgame || state.difficulty as usize == BossKind::EndgameFirst.index() {
            state.victory(now);
        } else {
            state.difficulty += 1;
            spawn.spawn(TimeSpacer::new(now + NEXT_BOSS_DELAY, SpawnAction::Boss));
        }
    }

    /// Fire one volley and return the delay until the next one
    fn volley(&mut self, now: f64, state: &GameState, spawn: &mut Spawner) -> f64 {
        let Vec2 { x, y } = self.pos;
        let ship = state.ship.pos;
        let c = self.bullet_count;
        let mut shot = |size: BulletSize, from: Vec2, angle: f32, speed: f32| {
            spawn.spawn(EnemyBullet::new(size, from, angle, speed, now));
        };

        match self.kind {
            BossKind::Andromeda => {
                if c < 5 {
                    let from = Vec2::new(x, y + 125.0);
                    shot(BulletSize::S, from, angle_between(from, ship), 0.3);
                } else {
                    let angle = if c == 5 { PI / 12.0 } else { 0.0 };
                    fire_circle_bullets(spawn, BulletSize::M, 12, self.pos, angle, 0.5, now);
                }
            }
            BossKind::Borealis => {
                if c < 8 {
                    let [ox, oy] = BOREALIS_EMITTERS[(c / 2) as usize];
                    shot(BulletSize::M, Vec2::new(x - ox, y + oy), 0.0, 0.6);
                    shot(BulletSize::M, Vec2::new(x + ox, y + oy), 0.0, 0.6);
                } else {
                    let from = Vec2::new(x, y + 77.0);
                    let speed = 0.35 + (c - 8) as f32 * 0.1;
                    shot(BulletSize::XL, from, angle_between(from, ship), speed);
                }
            }
            BossKind::Cygnus => {
                if c < 8 {
                    let angle = angle_between(self.pos, ship);
                    shot(BulletSize::L, self.pos + heading(angle) * MUZZLE_RADIUS, angle, 0.4);
                } else {
                    let angle = c as f32 * PI / 10.0;
                    fire_circle_bullets(spawn, BulletSize::M, 3, self.pos, angle, 0.35, now);
                }
            }
            BossKind::Draco => {
                if c < 20 {
                    let angle = PI / 20.0 + c as f32 * PI / 10.0;
                    fire_circle_bullets(spawn, BulletSize::L, 2, self.pos, angle, 0.35, now);
                    fire_circle_bullets(spawn, BulletSize::L, 2, self.pos, -angle, 0.35, now);
                } else {
                    let angle = angle_between(self.pos, ship);
                    let from = self.pos + heading(angle) * MUZZLE_RADIUS;
                    shot(BulletSize::M, from, angle - PI / 8.0, 0.5);
                    shot(BulletSize::M, from, angle + PI / 8.0, 0.5);
                    shot(BulletSize::XL, from, angle, 0.5);
                }
            }
            BossKind::EndgameFirst => {
                if c < 12 {
                    let row = if c > 5 { 11 - c } else { c };
                    let [ox, oy] = FINAL_EMITTERS[row as usize];
                    shot(BulletSize::L, Vec2::new(x - ox, y + oy), 0.0, 0.6);
                    shot(BulletSize::L, Vec2::new(x + ox, y + oy), 0.0, 0.6);
                } else {
                    let side = if c % 2 != 0 { 21.0 } else { -21.0 };
                    let from = Vec2::new(x + side, y + 112.0);
                    let angle = angle_between(from, ship);
                    shot(BulletSize::XL, from, angle, 0.4);
                    shot(BulletSize::L, from, angle - PI / 8.0, 0.4);
                    shot(BulletSize::L, from, angle + PI / 8.0, 0.4);
                    shot(BulletSize::M, from, angle - PI / 4.0, 0.4);
                    shot(BulletSize::M, from, angle + PI / 4.0, 0.4);
                }
            }
            BossKind::EndgameSecond => {
                let angle = if c % 2 != 0 { 0.0 } else { PI / 8.0 };
                fire_circle_bullets(spawn, BulletSize::XL, 8, self.pos, angle, 0.4, now);
            }
        }

        self.bullet_count += 1;
        let c = self.bullet_count;
        let (cycle, delay) = match self.kind {
            BossKind::Andromeda => match c {
                7.. => (true, 800.0),
                5.. => (false, 100.0),
                _ => (false, 200.0),
            },
            BossKind::Borealis => match c {
                17.. => (true, 800.0),
                9.. => (false, 100.0),
                8 => (false, 500.0),
                _ if c % 2 != 0 => (false, 100.0),
                _ => (false, 200.0),
            },
            BossKind::Cygnus => match c {
                31.. => (true, 800.0),
                ..9 => (false, 300.0),
                _ => (false, 50.0),
            },
            BossKind::Draco => match c {
                20 => (false, 1500.0),
                26.. => (true, 1500.0),
                21.. => (false, 150.0),
                _ => (false, 60.0),
            },
            BossKind::EndgameFirst => match c {
                17.. => (true, 800.0),
                13.. => (false, 150.0),
                _ => (false, 100.0),
            },
            BossKind::EndgameSecond => match c {
                2.. => (true, 800.0),
                _ => (false, 200.0),
            },
        };
        if cycle {
            self.bullet_count = 0;
        }
        delay
    }
}

impl Entity for Boss {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, spawn: &mut Spawner) -> StepOutcome {
        let state = &mut *frame.state;
        if self.vitals.health() <= 0.0 {
            self.explode(now, state, spawn);
            return StepOutcome::DEAD;
        }

        // The frame of a form change skips movement
        if self.vitals.take_split() {
            self.change_form(now, frame.assets, state, spawn);
        } else {
            self.travel((now - self.last_time) as f32, now, state);
        }

        let hitbox = HitBox::new(self.pos, Rc::clone(&self.art.sprite));
        let rammed = state
            .ship
            .hitbox
            .as_ref()
            .is_some_and(|ship| collide(ship, &hitbox));
        self.vitals.set_hitbox(hitbox);
        if rammed {
            state.game_over(now, spawn);
        }

        self.last_time = now;
        draw_ship(frame.draw, &self.art, self.pos, now, self.vitals.hit_time(), &mut state.rng);

        if !state.ship_destroyed && self.phase == BossPhase::Fighting && self.next_bullet < now {
            state.sound(SoundCue::EnemyFire);
            self.next_bullet = now + self.volley(now, state, spawn);
        }

        StepOutcome::hitable(Rc::clone(&self.vitals) as Rc<dyn Hitable>)
    }
}
