//! Regular enemies
//!
//! An enemy flies down (or homes in on the player), fires on the schedule of
//! its [`FirePattern`](super::blueprint::FirePattern) and shatters into debris,
//! coins and particles when it dies. Enemies leaving the bottom edge just
//! vanish.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use rand::Rng;

use super::assets::ShipArt;
use super::blueprint::{EnemyBlueprint, Level};
use super::collision::{HitBox, collide};
use super::debris::{Particle, shatter};
use super::draw::DrawList;
use super::entity::{Entity, FrameContext, Hitable, Spawner, StepOutcome};
use super::projectile::{Volley, fire_circle_bullets};
use super::state::{GameEvent, GameState};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::{angle_between, heading, shortest_turn};

/// Muzzle distance ahead of the ship centre, per unit of speed
const MUZZLE_LEAD: f32 = 17.0;
/// Ship width that plays the explosion at full volume
const EXPLOSION_VOLUME_WIDTH: f32 = 275.0;

/// Health and collision box of a damageable ship
///
/// Shared between the ship entity and the hit-test list, so projectiles can
/// damage it before the ship's own step runs.
#[derive(Debug)]
pub struct Vitals {
    health: Cell<f32>,
    max_health: Cell<f32>,
    hit_time: Cell<f64>,
    hitbox: RefCell<Option<HitBox>>,
    /// Health below which the ship changes form
    split_below: Cell<Option<f32>>,
    split_pending: Cell<bool>,
    /// Report health changes for the boss bar
    boss_bar: bool,
}

impl Vitals {
    pub fn new(health: f32) -> Self {
        Self {
            health: Cell::new(health),
            max_health: Cell::new(health),
            hit_time: Cell::new(f64::NEG_INFINITY),
            hitbox: RefCell::new(None),
            split_below: Cell::new(None),
            split_pending: Cell::new(false),
            boss_bar: false,
        }
    }

    pub fn with_boss_bar(health: f32) -> Self {
        Self {
            boss_bar: true,
            ..Self::new(health)
        }
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health.get()
    }

    pub fn fraction(&self) -> f32 {
        self.health.get() / self.max_health.get()
    }

    pub fn hit_time(&self) -> f64 {
        self.hit_time.get()
    }

    /// Start a fresh health pool; `split` arms a form change at half of it
    pub fn reset_pool(&self, health: f32, split: bool) {
        self.health.set(health);
        self.max_health.set(health);
        self.split_below.set(split.then_some(health / 2.0));
        self.split_pending.set(false);
    }

    /// True once after a hit crossed the split threshold
    pub fn take_split(&self) -> bool {
        if self.split_pending.get() {
            self.split_pending.set(false);
            self.split_below.set(None);
            true
        } else {
            false
        }
    }

    pub fn set_hitbox(&self, hitbox: HitBox) {
        *self.hitbox.borrow_mut() = Some(hitbox);
    }
}

impl Hitable for Vitals {
    fn check_hit(&self, other: &HitBox, power: f32, now: f64, state: &mut GameState) -> bool {
        let hit = self
            .hitbox
            .borrow()
            .as_ref()
            .is_some_and(|own| collide(other, own));
        if !hit {
            return false;
        }

        let health = self.health.get();
        if let Some(threshold) = self.split_below.get()
            && health >= threshold
            && health - power < threshold
        {
            self.split_pending.set(true);
        }
        self.hit_time.set(now);
        self.health.set(health - power);

        if self.boss_bar {
            state.events.push(GameEvent::BossHealth(Some(self.fraction().max(0.0))));
        }
        if self.health.get() > 0.0 {
            state.sound(SoundCue::EnemyHit);
        }
        true
    }
}

/// Draw a ship, shaking and flashing for a moment after a hit
pub(super) fn draw_ship(
    draw: &mut DrawList,
    art: &ShipArt,
    center: Vec2,
    now: f64,
    hit_time: f64,
    rng: &mut impl Rng,
) {
    let tint = HIT_FLASH_DURATION - (now - hit_time);
    let mut top_left = center - art.sprite.size() / 2.0;
    if tint > 0.0 {
        top_left += Vec2::new(
            rng.random_range(-1..=1) as f32,
            rng.random_range(-1..=1) as f32,
        );
    }
    draw.image(&art.sprite, top_left);
    if tint > 0.0 {
        draw.image_alpha(&art.hit, top_left, (tint / HIT_FLASH_DURATION) as f32);
    }
}

/// A regular enemy ship
#[derive(Debug)]
pub struct Enemy {
    blueprint: Rc<EnemyBlueprint>,
    pos: Vec2,
    vitals: Rc<Vitals>,
    kill_points: u64,
    last_time: f64,
    next_trigger: Option<f64>,
    fire_seq: u32,
    /// Flight direction of homing enemies
    heading: f32,
}

impl Enemy {
    /// Enter just above the top edge at `x`
    pub fn new(blueprint: Rc<EnemyBlueprint>, x: f32, kill_points: u64, now: f64, state: &GameState) -> Self {
        let pos = Vec2::new(x, -blueprint.art.sprite.size().y / 2.0);
        let heading = if state.ship_destroyed {
            0.0
        } else {
            angle_between(pos, state.ship.pos)
        };
        Self {
            vitals: Rc::new(Vitals::new(blueprint.def.health)),
            next_trigger: blueprint.def.trigger.map(|t| now + t.delay),
            blueprint,
            pos,
            kill_points,
            last_time: now,
            fire_seq: 0,
            heading,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn vitals(&self) -> &Rc<Vitals> {
        &self.vitals
    }

    fn fly(&mut self, elapsed: f32, state: &GameState) {
        let def = self.blueprint.def;
        match def.homing {
            Some(rate) => {
                if !state.ship_destroyed && self.pos.y < state.ship.pos.y {
                    let turn = shortest_turn(angle_between(self.pos, state.ship.pos) - self.heading);
                    let limit = rate * elapsed;
                    self.heading += if turn < 0.0 { turn.max(-limit) } else { turn.min(limit) };
                }
                self.pos += heading(self.heading) * def.speed * elapsed;
            }
            None => self.pos.y += def.speed * elapsed,
        }
        if !state.ship_destroyed
            && let Some(stop) = def.stop_at
        {
            self.pos.y = self.pos.y.min(stop);
        }
    }

    fn explode(&self, now: f64, state: &mut GameState, spawn: &mut Spawner) {
        let def = self.blueprint.def;
        let art = &self.blueprint.art;
        let size = art.sprite.size();
        state.sound(SoundCue::Explosion(size.x / EXPLOSION_VOLUME_WIDTH));

        if let Some(burst) = def.death_burst {
            let muzzle = self.pos + Vec2::new(0.0, MUZZLE_LEAD * def.speed);
            let angle = std::f32::consts::TAU / burst.speed;
            fire_circle_bullets(spawn, burst.size, burst.count, muzzle, angle, burst.speed, now);
        }

        // Some of the bigger shards turn into coins
        let per_kill = if state.level == Level::Survival {
            0
        } else {
            state.int_between(1, state.level.index() as i32 + 1)
        };
        let coins = if def.death_burst.is_some() { 2 } else { 1 } * per_kill;
        let half = (art.shards.len() / 2) as i32;
        let mut coin_shards = Vec::new();
        for _ in 0..coins {
            coin_shards.push(state.int_between(0, half) as usize);
        }
        for fragment in shatter(art, self.pos, now, &mut state.rng, |i| {
            if coin_shards.contains(&i) { 0.0 } else { ENEMY_EXPLOSION_DURATION }
        }) {
            spawn.spawn(fragment);
        }

        Particle::burst(spawn, self.pos, size, now, &mut state.rng);
        state.add_score(self.kill_points);
    }

    fn fire(&mut self, now: f64, state: &mut GameState, spawn: &mut Spawner) {
        let Some(trigger) = self.blueprint.def.trigger else {
            return;
        };
        let Some(due) = self.next_trigger else {
            return;
        };
        state.sound(SoundCue::EnemyFire);
        let muzzle = self.pos + Vec2::new(0.0, MUZZLE_LEAD * self.blueprint.def.speed);
        let mut volley = Volley::new(muzzle, state.ship.pos, now, spawn);
        self.fire_seq += 1;
        self.next_trigger = trigger
            .pattern
            .fire(self.fire_seq, &mut volley)
            .map(|delay| due + delay);
    }
}

impl Entity for Enemy {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, spawn: &mut Spawner) -> StepOutcome {
        let elapsed = (now - self.last_time) as f32;
        let state = &mut *frame.state;

        let mut dead = self.vitals.health() <= 0.0 || state.bomb_active(now);
        if !dead {
            self.fly(elapsed, state);
            let hitbox = HitBox::new(self.pos, Rc::clone(&self.blueprint.art.sprite));
            let rammed = state
                .ship
                .hitbox
                .as_ref()
                .is_some_and(|ship| collide(ship, &hitbox));
            self.vitals.set_hitbox(hitbox);
            if rammed {
                state.hit_ship(now, spawn);
                dead = !state.ship_destroyed;
            }
        }

        if dead {
            self.explode(now, state, spawn);
            return StepOutcome::DEAD;
        }

        let art = &self.blueprint.art;
        // Escaped past the bottom edge
        if self.pos.y - art.sprite.size().y / 2.0 > CANVAS_HEIGHT {
            return StepOutcome::DEAD;
        }

        draw_ship(frame.draw, art, self.pos, now, self.vitals.hit_time(), &mut state.rng);

        if !state.ship_destroyed && self.next_trigger.is_some_and(|due| due < now) {
            self.fire(now, state, spawn);
        }

        self.last_time = now;
        StepOutcome::hitable(Rc::clone(&self.vitals) as Rc<dyn Hitable>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::sim::blueprint::{BulletSize, EnemyDef, FirePattern};
    use crate::sim::entity::Liveness;
    use crate::sim::testing::{fixture, step_entity};

    static TOUGH: EnemyDef = EnemyDef::new(34, 213, 40, 20.0, 0.2);
    static GUNNER: EnemyDef = EnemyDef::new(34, 9, 40, 30.0, 0.1).firing(
        100.0,
        FirePattern::Burst {
            size: BulletSize::S,
            speed: 0.3,
            every: 3,
            short: 250.0,
            long: 1000.0,
        },
    );
    static BOMBER: EnemyDef = EnemyDef::new(34, 73, 60, 10.0, 0.15).death_burst(BulletSize::M, 8, 0.45);
    static HOMER: EnemyDef = EnemyDef::new(109, 203, 40, 80.0, 0.5).homing(0.002);

    fn blueprint(def: &'static EnemyDef, state: &GameState) -> Rc<EnemyBlueprint> {
        let art = state.ship.art.clone();
        Rc::new(EnemyBlueprint { def, art })
    }

    fn solid_box(center: Vec2) -> HitBox {
        HitBox::new(center, Rc::new(Raster::from_fn(200, 200, |_, _| [255; 4])))
    }

    fn score_events(state: &GameState) -> usize {
        state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::ScoreChanged(_)))
            .count()
    }

    #[test]
    fn test_enters_above_top_edge() {
        let (state, _) = fixture(Level::Andromeda);
        let bp = blueprint(&TOUGH, &state);
        let enemy = Enemy::new(Rc::clone(&bp), 120.0, 50, 0.0, &state);
        assert_eq!(enemy.pos(), Vec2::new(120.0, -bp.art.sprite.size().y / 2.0));
    }

    #[test]
    fn test_killed_in_one_frame_scores_once() {
        let (mut state, assets) = fixture(Level::Borealis);
        let bp = blueprint(&TOUGH, &state);
        let mut enemy = Enemy::new(bp, 200.0, 150, 0.0, &state);
        enemy.pos.y = 200.0;
        let (outcome, _, _) = step_entity(&mut enemy, 16.0, &mut state, &assets, &[]);
        let target = outcome.hitable.expect("enemy registers a hit target");
        state.take_events();

        // Two 10-power hits in the same frame drive 20 health to exactly 0
        let probe = solid_box(enemy.pos());
        assert!(target.check_hit(&probe, 10.0, 20.0, &mut state));
        assert!(target.check_hit(&probe, 10.0, 21.0, &mut state));
        assert_eq!(enemy.vitals().health(), 0.0);
        assert_eq!(state.score, 0);

        let (outcome, spawn, _) = step_entity(&mut enemy, 32.0, &mut state, &assets, &[]);
        assert_eq!(outcome.liveness, Liveness::Dead);
        assert_eq!(state.score, 150);
        assert_eq!(score_events(&state), 1);
        assert!(spawn.len() >= state.ship.art.shards.len());
        // Only the first hit left it alive enough to groan
        let groans = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::Sound(SoundCue::EnemyHit))
            .count();
        assert_eq!(groans, 1);
    }

    #[test]
    fn test_escape_gives_nothing() {
        let (mut state, assets) = fixture(Level::Andromeda);
        let bp = blueprint(&TOUGH, &state);
        let mut enemy = Enemy::new(bp, 200.0, 50, 0.0, &state);
        enemy.pos.y = CANVAS_HEIGHT + 100.0;
        let (outcome, spawn, draw) = step_entity(&mut enemy, 16.0, &mut state, &assets, &[]);
        assert_eq!(outcome.liveness, Liveness::Dead);
        assert!(spawn.is_empty());
        assert!(draw.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_bomb_destroys_with_burst() {
        let (mut state, assets) = fixture(Level::Cygnus);
        let bp = blueprint(&BOMBER, &state);
        let mut enemy = Enemy::new(bp, 200.0, 100, 0.0, &state);
        enemy.pos.y = 200.0;
        state.bomb_effect = 1000.0;
        let (outcome, spawn, _) = step_entity(&mut enemy, 16.0, &mut state, &assets, &[]);
        assert_eq!(outcome.liveness, Liveness::Dead);
        assert_eq!(state.score, 100);
        let shards = state.ship.art.shards.len();
        let area = state.ship.art.sprite.size();
        let particles = (area.x * area.y / 500.0).ceil() as usize;
        assert_eq!(spawn.len(), 8 + shards + particles);
    }

    #[test]
    fn test_fires_on_schedule() {
        let (mut state, assets) = fixture(Level::Andromeda);
        state.ship.pos = Vec2::new(240.0, 600.0);
        let bp = blueprint(&GUNNER, &state);
        let mut enemy = Enemy::new(bp, 200.0, 50, 0.0, &state);
        enemy.pos.y = 100.0;

        let (_, spawn, _) = step_entity(&mut enemy, 50.0, &mut state, &assets, &[]);
        assert!(spawn.is_empty());
        let (_, spawn, _) = step_entity(&mut enemy, 120.0, &mut state, &assets, &[]);
        assert_eq!(spawn.len(), 1);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::EnemyFire)));
        // Next volley is due 250 ms after the previous due time
        assert_eq!(enemy.next_trigger, Some(350.0));
        let (_, spawn, _) = step_entity(&mut enemy, 340.0, &mut state, &assets, &[]);
        assert!(spawn.is_empty());
    }

    #[test]
    fn test_silent_when_ship_destroyed() {
        let (mut state, assets) = fixture(Level::Andromeda);
        let bp = blueprint(&GUNNER, &state);
        let mut enemy = Enemy::new(bp, 200.0, 50, 0.0, &state);
        enemy.pos.y = 100.0;
        state.ship_destroyed = true;
        let (_, spawn, _) = step_entity(&mut enemy, 500.0, &mut state, &assets, &[]);
        assert!(spawn.is_empty());
    }

    #[test]
    fn test_homing_turn_is_capped() {
        let (mut state, assets) = fixture(Level::Borealis);
        state.ship.pos = Vec2::new(400.0, 600.0);
        let bp = blueprint(&HOMER, &state);
        let mut enemy = Enemy::new(bp, 100.0, 50, 0.0, &state);
        enemy.pos = Vec2::new(100.0, 100.0);
        enemy.heading = 0.0;

        step_entity(&mut enemy, 10.0, &mut state, &assets, &[]);
        // 0.002 rad/ms over 10 ms
        assert!((enemy.heading - 0.02).abs() < 1e-6);
        let moved = enemy.pos() - Vec2::new(100.0, 100.0);
        assert!((moved.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ramming_spends_shield_and_kills_enemy() {
        let (mut state, assets) = fixture(Level::Andromeda);
        state.ship.pos = Vec2::new(240.0, 400.0);
        state.ship.refresh_hitbox();
        state.shield_level = 2;
        let bp = blueprint(&TOUGH, &state);
        let mut enemy = Enemy::new(bp, 240.0, 50, 0.0, &state);
        enemy.pos.y = 400.0;
        let (outcome, _, _) = step_entity(&mut enemy, 1.0, &mut state, &assets, &[]);
        assert_eq!(outcome.liveness, Liveness::Dead);
        assert_eq!(state.shield_level, 1);
        assert_eq!(state.score, 50);
    }

    #[test]
    fn test_split_fires_once() {
        let (mut state, _) = fixture(Level::Andromeda);
        let vitals = Vitals::with_boss_bar(1.0);
        vitals.reset_pool(100.0, true);
        vitals.set_hitbox(solid_box(Vec2::new(100.0, 100.0)));
        let probe = solid_box(Vec2::new(100.0, 100.0));

        vitals.check_hit(&probe, 40.0, 0.0, &mut state);
        assert!(!vitals.take_split());
        vitals.check_hit(&probe, 20.0, 0.0, &mut state);
        vitals.check_hit(&probe, 20.0, 0.0, &mut state);
        assert!(vitals.take_split());
        assert!(!vitals.take_split());
        assert!(state.events.contains(&GameEvent::BossHealth(Some(0.2))));
    }
}
