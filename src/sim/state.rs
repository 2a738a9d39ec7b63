//! Game state shared by every entity
//!
//! One struct holds everything entities read or write during a frame: the
//! player ship, score, shields, the bomb window and run flags. Entities get it
//! by `&mut` through the frame context, so there is a single writer at a time.

use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::assets::ShipArt;
use super::blueprint::Level;
use super::collision::HitBox;
use super::debris::ShipFragment;
use super::entity::Spawner;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::settings::{Settings, Upgrade};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Ship flying in from the bottom edge
    Intro,
    /// Active gameplay
    Playing,
    /// Game over or victory sequence finished; waiting for the menu
    Ended,
}

/// Things the host reacts to (audio, HUD)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundCue),
    ScoreChanged(u64),
    StarsChanged(u64),
    BombsChanged(u8),
    ShieldChanged(u8),
    /// Boss life bar fraction, `None` hides the bar
    BossHealth(Option<f32>),
    /// Large transition text
    Banner(&'static str),
    LevelUnlocked(usize),
    RunEnded { victory: bool },
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    /// Pointer steering target
    pub target: Vec2,
    pub art: ShipArt,
    /// Collision box, refreshed every frame the player is in control
    pub hitbox: Option<HitBox>,
}

impl Ship {
    pub fn new(art: ShipArt) -> Self {
        Self {
            pos: Vec2::ZERO,
            target: Vec2::ZERO,
            art,
            hitbox: None,
        }
    }

    /// Half size rounded down to whole pixels
    pub fn half_size(&self) -> Vec2 {
        Vec2::new(
            (self.art.sprite.width() / 2) as f32,
            (self.art.sprite.height() / 2) as f32,
        )
    }

    pub fn refresh_hitbox(&mut self) {
        self.hitbox = Some(HitBox::new(self.pos, Rc::clone(&self.art.sprite)));
    }
}

/// Complete mutable state of one run
#[derive(Debug)]
pub struct GameState {
    pub level: Level,
    pub phase: GamePhase,
    /// Player configuration; coins, unlocks and best scores are written back here
    pub settings: Settings,
    pub ship: Ship,
    pub score: u64,
    pub shield_level: u8,
    pub bombs: u8,
    /// Game time until which the bomb effect lasts
    pub bomb_effect: f64,
    pub ship_destroyed: bool,
    pub ship_victory: bool,
    /// Game time at which the run ends (set by game over or victory)
    pub game_over_time: Option<f64>,
    pub has_highscore: bool,
    /// Escalates every 10 s; in Endgame it indexes the current boss
    pub difficulty: u32,
    /// No regular enemies while a boss fight is on
    pub boss_time: bool,
    pub next_enemy: f64,
    pub next_difficulty: f64,
    pub last_bullet: f64,
    /// Position in the 4-volley side cannon cycle
    pub bullet_round: u8,
    /// Effects randomness (particles, shard flights, jitter)
    pub rng: Pcg32,
    /// Enemy layout randomness, seeded per level
    pub enemy_rng: Pcg32,
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(level: Level, settings: Settings, ship_art: ShipArt, seed: u64) -> Self {
        Self {
            level,
            phase: GamePhase::Intro,
            settings,
            ship: Ship::new(ship_art),
            score: 0,
            shield_level: 0,
            bombs: 0,
            bomb_effect: 0.0,
            ship_destroyed: false,
            ship_victory: false,
            game_over_time: None,
            has_highscore: false,
            difficulty: 0,
            boss_time: false,
            next_enemy: 0.0,
            next_difficulty: 0.0,
            last_bullet: 0.0,
            bullet_round: 0,
            rng: Pcg32::seed_from_u64(seed),
            enemy_rng: Pcg32::seed_from_u64(level.spawn_seed()),
            events: Vec::new(),
        }
    }

    /// Reset run state for a fresh start at game time zero
    pub fn reset(&mut self) {
        self.phase = GamePhase::Intro;
        self.score = 0;
        self.shield_level = self.settings.upgrade_level(Upgrade::Shield);
        self.bombs = self.settings.upgrade_level(Upgrade::Bombs);
        self.bomb_effect = 0.0;
        self.ship_destroyed = false;
        self.ship_victory = false;
        self.game_over_time = None;
        self.has_highscore = false;
        self.difficulty = if self.level == Level::Survival { 3 } else { 0 };
        self.boss_time = self.level == Level::Endgame;
        self.next_enemy = GAME_INTRO_DURATION + 1000.0;
        self.next_difficulty = GAME_INTRO_DURATION + 5000.0;
        self.last_bullet = 0.0;
        self.bullet_round = 0;
        self.enemy_rng = Pcg32::seed_from_u64(self.level.spawn_seed());

        let half = self.ship.half_size();
        self.ship.pos = Vec2::new(HALF_CANVAS_WIDTH, CANVAS_HEIGHT + half.y);
        self.ship.target = self.ship.pos;
        self.ship.hitbox = None;

        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::BombsChanged(self.bombs));
        self.events.push(GameEvent::ShieldChanged(self.shield_level));
    }

    #[inline]
    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    #[inline]
    pub fn bomb_active(&self, now: f64) -> bool {
        self.bomb_effect > now
    }

    pub fn magnet_level(&self) -> u8 {
        self.settings.upgrade_level(Upgrade::Magnet)
    }

    /// Random integer in `min..=max` from the effects stream
    pub fn int_between(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::ScoreChanged(self.score));
        if self.settings.top_scores.record(self.level.index(), self.score) {
            self.has_highscore = true;
        }
    }

    pub fn collect_star(&mut self) {
        self.settings.stars += 1;
        self.sound(SoundCue::Coin);
        self.events.push(GameEvent::StarsChanged(self.settings.stars));
    }

    /// Something hit the player: a shield charge absorbs it, otherwise game over
    pub fn hit_ship(&mut self, now: f64, spawn: &mut Spawner) {
        if self.shield_level > 0 {
            self.shield_level -= 1;
            self.sound(SoundCue::ShieldHit);
            self.events.push(GameEvent::ShieldChanged(self.shield_level));
        } else {
            self.game_over(now, spawn);
        }
    }

    /// Destroy the player ship; no-op once the run is already decided
    pub fn game_over(&mut self, now: f64, spawn: &mut Spawner) {
        if self.ship_destroyed || self.ship_victory {
            return;
        }
        self.ship_destroyed = true;
        self.sound(SoundCue::Explosion(1.0));
        self.game_over_time = Some(now + GAME_OVER_DURATION);

        let size = self.ship.art.sprite.size();
        let origin = self.ship.pos - self.ship.half_size();
        for shard in self.ship.art.shards.iter() {
            let flight = shard.launch(size.x, size.y, &mut self.rng);
            spawn.spawn_on_top(ShipFragment::explosion(
                flight,
                origin,
                now,
                PLAYER_EXPLOSION_DURATION,
            ));
        }
        self.events.push(GameEvent::Banner("Signal Lost"));
        log::info!("Ship destroyed at {:.0} ms, score {}", now, self.score);
    }

    /// Level cleared; ignored if the ship already died
    pub fn victory(&mut self, now: f64) {
        if self.ship_destroyed {
            return;
        }
        self.ship_victory = true;
        let next = self.level.index() + 1;
        if self.settings.unlock(next) {
            self.events.push(GameEvent::LevelUnlocked(next));
        }
        self.game_over_time = Some(now + GAME_OVER_DURATION);
        self.bomb_effect = now + BOMB_DURATION;
        self.events.push(GameEvent::Banner("Well Done"));
        log::info!("Level {:?} cleared with score {}", self.level, self.score);
    }

    /// Start a bomb if one is available and none is running
    pub fn launch_bomb(&mut self, now: f64) -> bool {
        if self.bombs == 0 || self.bomb_active(now) {
            return false;
        }
        self.bombs -= 1;
        self.events.push(GameEvent::BombsChanged(self.bombs));
        self.sound(SoundCue::Explosion(1.5));
        self.bomb_effect = now + BOMB_DURATION;
        self.next_enemy += 1500.0;
        self.next_difficulty += 1500.0;
        log::debug!("Bomb launched at {:.0} ms, {} left", now, self.bombs);
        true
    }

    /// Schedule the next regular enemy
    pub fn update_next_enemy(&mut self) {
        let base = (1000.0 - f64::from(self.difficulty) * 50.0).max(0.0);
        self.next_enemy += base + (self.enemy_rng.random::<f64>() * 400.0).round();
    }

    /// Drain events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::fixture;

    #[test]
    fn test_reset_applies_upgrades() {
        let (mut state, _) = fixture(Level::Borealis);
        state.settings.upgrades.raise(Upgrade::Shield);
        state.settings.upgrades.raise(Upgrade::Bombs);
        state.settings.upgrades.raise(Upgrade::Bombs);
        state.reset();
        assert_eq!(state.shield_level, 1);
        assert_eq!(state.bombs, 2);
        assert_eq!(state.difficulty, 0);
        assert!(!state.boss_time);
        assert!(state.ship.pos.y > CANVAS_HEIGHT);
    }

    #[test]
    fn test_reset_per_level() {
        let (mut state, _) = fixture(Level::Survival);
        state.reset();
        assert_eq!(state.difficulty, 3);

        let (mut state, _) = fixture(Level::Endgame);
        state.reset();
        assert!(state.boss_time);
    }

    #[test]
    fn test_shield_absorbs_before_game_over() {
        let (mut state, _) = fixture(Level::Andromeda);
        state.shield_level = 1;
        let mut spawn = Spawner::default();
        state.hit_ship(100.0, &mut spawn);
        assert_eq!(state.shield_level, 0);
        assert!(!state.ship_destroyed);
        assert!(spawn.is_empty());

        state.hit_ship(200.0, &mut spawn);
        assert!(state.ship_destroyed);
        assert_eq!(state.game_over_time, Some(200.0 + GAME_OVER_DURATION));
        assert_eq!(spawn.on_top_len(), state.ship.art.shards.len());
    }

    #[test]
    fn test_game_over_happens_once() {
        let (mut state, _) = fixture(Level::Andromeda);
        let mut spawn = Spawner::default();
        state.game_over(10.0, &mut spawn);
        let first = spawn.on_top_len();
        state.game_over(20.0, &mut spawn);
        assert_eq!(spawn.on_top_len(), first);
        assert_eq!(state.game_over_time, Some(10.0 + GAME_OVER_DURATION));
    }

    #[test]
    fn test_victory_unlocks_next_level_and_bombs_screen() {
        let (mut state, _) = fixture(Level::Cygnus);
        state.victory(1000.0);
        assert!(state.ship_victory);
        assert_eq!(state.settings.unlocked_level, 3);
        assert!(state.bomb_active(1500.0));
        assert!(state.events.contains(&GameEvent::LevelUnlocked(3)));

        // A destroyed ship cannot win
        let (mut state, _) = fixture(Level::Cygnus);
        state.ship_destroyed = true;
        state.victory(1000.0);
        assert!(!state.ship_victory);
    }

    #[test]
    fn test_bomb_needs_stock_and_no_active_window() {
        let (mut state, _) = fixture(Level::Andromeda);
        state.bombs = 2;
        state.next_enemy = 100.0;
        assert!(state.launch_bomb(0.0));
        assert_eq!(state.bombs, 1);
        assert_eq!(state.next_enemy, 1600.0);
        assert!(!state.launch_bomb(500.0));
        assert!(state.launch_bomb(1001.0));
        assert!(!state.launch_bomb(5000.0));
    }

    #[test]
    fn test_add_score_tracks_best() {
        let (mut state, _) = fixture(Level::Draco);
        state.add_score(150);
        state.add_score(50);
        assert_eq!(state.score, 200);
        assert!(state.has_highscore);
        assert_eq!(state.settings.top_scores.best(Level::Draco.index()), 200);
    }
}
