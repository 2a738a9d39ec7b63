//! Frame driver
//!
//! The host calls [`Game::render`] once per animation frame with its wall
//! clock. The game turns that into game time, moves the player, runs the
//! entity pass and then does the level bookkeeping: auto-fire, difficulty
//! ramp, enemy spawning and the end of the run.

use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::assets::Assets;
use super::blueprint::Level;
use super::boss::Boss;
use super::draw::DrawList;
use super::enemy::Enemy;
use super::entity::Scene;
use super::projectile::{Bullet, Caliber, Lane};
use super::schedule::{SpawnAction, TimeSpacer};
use super::state::{GameEvent, GamePhase, GameState};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::raster::ShipGenerator;
use crate::settings::{Settings, Upgrade};

/// Difficulty steps between level bosses
const BOSS_EVERY: u32 = 6;
const DIFFICULTY_INTERVAL: f64 = 10_000.0;
/// Followers of a wave enemy, spaced this far apart
const WAVE_FOLLOWERS: u32 = 3;
const WAVE_SPACING: f64 = 300.0;
const SPAWN_MARGIN: i32 = 30;
/// Time before the run ends during which a winning ship flies off
const VICTORY_DRIFT: f64 = 2500.0;

/// Player intent for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keyboard/gamepad direction, each axis in -1..=1
    pub axis: Vec2,
    /// Latest pointer position in canvas pixels, if it moved
    pub pointer: Option<Vec2>,
    /// Bomb trigger held
    pub action: bool,
}

/// Game time derived from the host's wall clock
///
/// A long gap between frames (tab hidden, debugger) is not simulated: it
/// counts as one short step and the rest is absorbed into the offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameClock {
    offset: f64,
    last: f64,
}

/// One advance of the [`GameClock`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTick {
    /// Game time in ms since the run started
    pub now: f64,
    /// Time since the previous frame as the simulation perceives it
    pub elapsed: f64,
    /// A pause was detected; held inputs must be released
    pub resumed: bool,
}

impl GameClock {
    pub fn start(wall: f64) -> Self {
        Self {
            offset: wall,
            last: wall,
        }
    }

    pub fn tick(&mut self, wall: f64) -> ClockTick {
        let mut elapsed = wall - self.last;
        self.last = wall;
        let resumed = elapsed > PAUSE_THRESHOLD;
        if resumed {
            self.offset += elapsed - PAUSE_STEP;
            elapsed = PAUSE_STEP;
        }
        ClockTick {
            now: wall - self.offset,
            elapsed,
            resumed,
        }
    }
}

/// Output of one frame
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Game time of the frame
    pub now: f64,
    pub draw: DrawList,
    pub events: Vec<GameEvent>,
}

/// One loaded level and the run being played on it
pub struct Game {
    state: GameState,
    assets: Assets,
    scene: Scene,
    clock: GameClock,
    /// Action trigger seen held last frame
    action_latch: bool,
}

impl Game {
    /// Load a level with a random seed for effects
    pub fn new_game(level: Level, settings: Settings, generator: &dyn ShipGenerator) -> Self {
        Self::with_seed(level, settings, generator, rand::random())
    }

    /// Load a level; the same seed and inputs replay the same run
    pub fn with_seed(level: Level, settings: Settings, generator: &dyn ShipGenerator, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let assets = Assets::load(level, &settings, generator, &mut rng);
        let state = GameState::new(level, settings, assets.player_ship.clone(), seed);
        Self {
            state,
            assets,
            scene: Scene::new(),
            clock: GameClock::default(),
            action_latch: false,
        }
    }

    /// Start (or restart) the run at wall time `wall`
    pub fn new_game_start(&mut self, wall: f64) {
        self.state.reset();
        self.scene.clear();
        self.clock = GameClock::start(wall);
        self.action_latch = false;
        self.state.events.push(GameEvent::Banner("Good Luck"));
        log::info!(
            "Starting {} with {} shields, {} bombs",
            self.state.level.name(),
            self.state.shield_level,
            self.state.bombs
        );
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Settings with this run's coins, unlocks and best scores, for saving
    pub fn into_settings(self) -> Settings {
        self.state.settings
    }

    /// Live entities
    pub fn entity_count(&self) -> usize {
        self.scene.len()
    }

    /// Simulate and draw one frame
    pub fn render(&mut self, wall: f64, input: &TickInput) -> FrameReport {
        let clock = self.clock.tick(wall);
        let now = clock.now;
        let mut draw = DrawList::new();
        if self.state.phase == GamePhase::Ended {
            return FrameReport {
                now,
                draw,
                events: self.state.take_events(),
            };
        }

        let released = TickInput::default();
        let input = if clock.resumed { &released } else { input };
        let elapsed = clock.elapsed as f32;

        if self.state.phase == GamePhase::Playing && !self.state.ship_destroyed && !self.state.ship_victory {
            self.pilot(now, elapsed, input);
        }
        if self.state.ship_victory
            && let Some(end) = self.state.game_over_time
            && end < now + VICTORY_DRIFT
        {
            // Accelerates upward as the end approaches
            self.state.ship.pos.y += SHIP_SPEED * elapsed * (end - 3000.0 - now) as f32 / 2000.0;
        }
        if self.state.phase == GamePhase::Intro {
            let ship = &mut self.state.ship;
            let rise = (2.0 * now / GAME_INTRO_DURATION).min(1.0) as f32;
            ship.pos.y = CANVAS_HEIGHT + ship.half_size().y - rise * (ship.art.sprite.size().y + SHIP_INITIAL_BOTTOM_MARGIN);
            ship.target.y = ship.pos.y;
        }

        self.scene.advance(now, &mut self.state, &self.assets, &mut draw);

        if !self.state.ship_destroyed {
            self.draw_ship(&mut draw);
        }
        if self.state.bomb_active(now) {
            draw.flash(((self.state.bomb_effect - now) / BOMB_DURATION) as f32);
        }

        if self.state.phase == GamePhase::Playing
            && !self.state.ship_destroyed
            && !self.state.ship_victory
            && self.state.last_bullet + FIRE_INTERVAL < now
        {
            self.fire(now);
        }

        self.ramp_difficulty(now);
        self.spawn_enemies(now);

        if let Some(end) = self.state.game_over_time
            && end < now
        {
            let victory = self.state.ship_victory;
            self.state.events.push(GameEvent::BossHealth(None));
            self.state.events.push(GameEvent::RunEnded { victory });
            self.state.phase = GamePhase::Ended;
            log::info!("Run ended (victory: {victory}), score {}", self.state.score);
        }

        if self.state.phase == GamePhase::Intro && now > GAME_INTRO_DURATION {
            self.state.phase = GamePhase::Playing;
            if self.state.level == Level::Endgame {
                self.push_boss(now);
            }
        }

        FrameReport {
            now,
            draw,
            events: self.state.take_events(),
        }
    }

    /// Bomb trigger and ship steering
    fn pilot(&mut self, now: f64, elapsed: f32, input: &TickInput) {
        if input.action {
            if !self.action_latch {
                self.state.launch_bomb(now);
                self.action_latch = true;
            }
        } else {
            self.action_latch = false;
        }

        let ship = &mut self.state.ship;
        let travel = SHIP_SPEED * elapsed;
        if input.axis != Vec2::ZERO {
            let divider = input.axis.length().max(1.0);
            ship.pos += travel * input.axis / divider;
            // The pointer only steers again once it moves
            ship.target = ship.pos;
        } else {
            if let Some(pointer) = input.pointer {
                ship.target = pointer;
            }
            let to_target = ship.target - ship.pos;
            let distance = to_target.length();
            if distance > travel {
                ship.pos += to_target / distance * travel;
            } else {
                ship.pos = ship.target;
            }
        }

        let half = ship.half_size();
        ship.pos = ship
            .pos
            .clamp(half, Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT) - half);
        ship.refresh_hitbox();
    }

    fn draw_ship(&mut self, draw: &mut DrawList) {
        let ship = &self.state.ship;
        let half = ship.half_size();
        let thruster = self.assets.thruster(self.state.rng.random_range(0..2));
        let nozzle = Vec2::new(ship.pos.x - thruster.size().x / 2.0, ship.pos.y + half.y - 1.0);
        draw.image(thruster, nozzle);
        draw.image(&ship.art.sprite, ship.pos - half);
    }

    /// One round of the player's guns
    fn fire(&mut self, now: f64) {
        let side = self.state.settings.upgrade_level(Upgrade::Side);
        let gun = self.state.settings.upgrade_level(Upgrade::Gun);
        let round = self.state.bullet_round;
        let pos = self.state.ship.pos;
        let top = pos.y - self.state.ship.half_size().y;

        if (side > 0 && round == 0) || (side > 1 && round == 1) || side > 3 {
            let caliber = Caliber::for_upgrade(side);
            self.scene.push(Bullet::new(Vec2::new(pos.x - 25.0, top), Lane::Left, caliber, now));
            self.scene.push(Bullet::new(Vec2::new(pos.x + 25.0, top), Lane::Right, caliber, now));
        }

        let caliber = Caliber::for_upgrade(gun);
        if gun > 0 {
            for dx in [-13.0, 13.0] {
                self.scene.push(Bullet::new(Vec2::new(pos.x + dx, top + 7.0), Lane::Straight, caliber, now));
            }
        }
        if gun % 2 == 0 {
            self.scene.push(Bullet::new(Vec2::new(pos.x, top - 8.0), Lane::Straight, caliber, now));
        }

        self.state.last_bullet = now;
        self.state.sound(SoundCue::Bullet);
        self.state.bullet_round = (round + 1) % 4;
    }

    fn ramp_difficulty(&mut self, now: f64) {
        let state = &mut self.state;
        if state.next_difficulty >= now || state.boss_time {
            return;
        }
        state.difficulty += 1;
        // Survival has no boss: its deadline stays passed and the next frame takes another step
        if state.difficulty % BOSS_EVERY != 0 {
            state.next_difficulty = now + DIFFICULTY_INTERVAL;
        } else if state.level != Level::Survival {
            state.boss_time = true;
            self.push_boss(now);
        }
        log::debug!("Difficulty {} at {now:.0} ms", self.state.difficulty);
    }

    fn push_boss(&mut self, now: f64) {
        if let Some(boss) = Boss::for_current_level(&mut self.state, &self.assets, now) {
            self.scene.push(boss);
        }
    }

    fn spawn_enemies(&mut self, now: f64) {
        let state = &mut self.state;
        let blueprints = &self.assets.blueprints;
        if state.boss_time || state.next_enemy >= now || blueprints.is_empty() {
            return;
        }

        let top = (state.difficulty as usize).min(blueprints.len() - 1);
        let index = state.enemy_rng.random_range(0..=top);
        let x = state
            .enemy_rng
            .random_range(SPAWN_MARGIN..=CANVAS_WIDTH as i32 - SPAWN_MARGIN) as f32;
        let points = (index as u64 + 1) * 50;

        let blueprint = &blueprints[index];
        if blueprint.def.wave {
            for c in 1..=WAVE_FOLLOWERS {
                let action = SpawnAction::Enemy { blueprint: index, x, points };
                self.scene.push(TimeSpacer::new(now + f64::from(c) * WAVE_SPACING, action));
            }
        }
        self.scene.push(Enemy::new(Rc::clone(blueprint), x, points, now, state));
        state.update_next_enemy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::SilhouetteGenerator;
    use crate::sim::draw::DrawCommand;

    const FRAME: f64 = 16.0;

    fn game(level: Level, settings: Settings) -> Game {
        let mut game = Game::with_seed(level, settings, &SilhouetteGenerator, 42);
        game.new_game_start(0.0);
        game
    }

    /// Run 16 ms frames after `from` up to wall time `until`, collecting every event
    fn run(game: &mut Game, from: f64, until: f64, input: &TickInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut wall = from;
        while wall + FRAME <= until {
            wall += FRAME;
            events.extend(game.render(wall, input).events);
        }
        events
    }

    fn count(events: &[GameEvent], event: &GameEvent) -> usize {
        events.iter().filter(|e| *e == event).count()
    }

    #[test]
    fn test_clock_skips_pauses() {
        let mut clock = GameClock::start(1000.0);
        let tick = clock.tick(1016.0);
        assert_eq!((tick.now, tick.elapsed, tick.resumed), (16.0, 16.0, false));
        let tick = clock.tick(3016.0);
        assert_eq!((tick.now, tick.elapsed, tick.resumed), (56.0, 40.0, true));
        let tick = clock.tick(3032.0);
        assert_eq!(tick.now, 72.0);
    }

    #[test]
    fn test_start_resets_run() {
        let mut game = game(Level::Borealis, Settings::default());
        let report = game.render(FRAME, &TickInput::default());
        assert!(report.events.contains(&GameEvent::Banner("Good Luck")));
        assert!(report.events.contains(&GameEvent::ScoreChanged(0)));
        assert_eq!(game.phase(), GamePhase::Intro);
        assert_eq!(game.state().next_enemy, GAME_INTRO_DURATION + 1000.0);
    }

    #[test]
    fn test_intro_rises_ship_then_plays() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 1312.0, &TickInput::default());
        let ship = &game.state().ship;
        let settled = CANVAS_HEIGHT + ship.half_size().y - (ship.art.sprite.size().y + SHIP_INITIAL_BOTTOM_MARGIN);
        assert!((ship.pos.y - settled).abs() < 1e-3);
        assert_eq!(ship.pos.x, HALF_CANVAS_WIDTH);
        assert_eq!(game.phase(), GamePhase::Intro);

        run(&mut game, 1312.0, 2608.0, &TickInput::default());
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_endgame_boss_arrives_after_intro() {
        let mut game = game(Level::Endgame, Settings::default());
        let events = run(&mut game, 0.0, 2608.0, &TickInput::default());
        assert!(events.contains(&GameEvent::BossHealth(Some(1.0))));
        // Boss plus the first gun round
        assert!(game.entity_count() >= 1);
        assert!(game.state().boss_time);
    }

    #[test]
    fn test_auto_fire_rate() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 2512.0, &TickInput::default());
        let events = run(&mut game, 2512.0, 3504.0, &TickInput::default());
        let volleys = count(&events, &GameEvent::Sound(SoundCue::Bullet));
        assert!((4..=5).contains(&volleys), "{volleys} volleys in one second");
    }

    #[test]
    fn test_gun_layout_by_upgrade() {
        let mut settings = Settings::default();
        settings.upgrades.raise(Upgrade::Gun);
        settings.upgrades.raise(Upgrade::Side);
        let mut game = game(Level::Andromeda, settings);
        run(&mut game, 0.0, 2512.0, &TickInput::default());
        game.scene.clear();

        // Round 0: side pair plus twin guns, no centre gun on odd levels
        game.state.last_bullet = 0.0;
        game.fire(3000.0);
        assert_eq!(game.entity_count(), 4);
        // Round 1: a level-1 side cannon sits out
        game.fire(3200.0);
        assert_eq!(game.entity_count(), 6);
        assert_eq!(game.state().bullet_round, 2);
    }

    #[test]
    fn test_bomb_on_rising_edge() {
        let mut settings = Settings::default();
        settings.upgrades.raise(Upgrade::Bombs);
        settings.upgrades.raise(Upgrade::Bombs);
        let mut game = game(Level::Andromeda, settings);
        run(&mut game, 0.0, 2608.0, &TickInput::default());

        let held = TickInput {
            action: true,
            ..TickInput::default()
        };
        let events = run(&mut game, 2608.0, 3008.0, &held);
        assert_eq!(game.state().bombs, 1);
        assert!(events.contains(&GameEvent::BombsChanged(1)));
        assert_eq!(game.state().next_enemy, GAME_INTRO_DURATION + 1000.0 + 1500.0);

        let report = game.render(3024.0, &held);
        assert!(report
            .draw
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Flash { .. })));
    }

    #[test]
    fn test_axis_moves_and_clamps_ship() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 2608.0, &TickInput::default());
        let start = game.state().ship.pos;

        let left = TickInput {
            axis: Vec2::new(-1.0, 0.0),
            ..TickInput::default()
        };
        game.render(2624.0, &left);
        assert!((game.state().ship.pos.x - (start.x - SHIP_SPEED * 16.0)).abs() < 1e-3);
        assert!(game.state().ship.hitbox.is_some());

        run(&mut game, 2624.0, 3616.0, &left);
        assert_eq!(game.state().ship.pos.x, game.state().ship.half_size().x);
    }

    #[test]
    fn test_pointer_steering() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 2608.0, &TickInput::default());
        let target = Vec2::new(200.0, 500.0);
        let aim = TickInput {
            pointer: Some(target),
            ..TickInput::default()
        };
        run(&mut game, 2608.0, 3008.0, &aim);
        assert_eq!(game.state().ship.pos, target);
    }

    #[test]
    fn test_enemies_spawn_after_intro() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 3520.0, &TickInput::default());
        assert!(game.state().next_enemy > GAME_INTRO_DURATION + 1000.0);
        assert!(game.scene.hitable_count() >= 1);
    }

    #[test]
    fn test_difficulty_ramps() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 7600.0, &TickInput::default());
        assert_eq!(game.state().difficulty, 1);
        assert!(game.state().next_difficulty > 17_000.0);
    }

    #[test]
    fn test_boss_time_on_sixth_step() {
        let mut game = game(Level::Draco, Settings::default());
        game.state.difficulty = 5;
        game.state.next_difficulty = 0.0;
        game.ramp_difficulty(100.0);
        assert!(game.state().boss_time);
        assert_eq!(game.entity_count(), 1);
    }

    #[test]
    fn test_game_over_ends_run() {
        let mut game = game(Level::Andromeda, Settings::default());
        run(&mut game, 0.0, 2608.0, &TickInput::default());
        let mut spawn = crate::sim::entity::Spawner::default();
        game.state.game_over(2608.0, &mut spawn);

        let events = run(&mut game, 2608.0, 6208.0, &TickInput::default());
        assert_eq!(count(&events, &GameEvent::RunEnded { victory: false }), 1);
        assert_eq!(game.phase(), GamePhase::Ended);
        let report = game.render(6224.0, &TickInput::default());
        assert!(report.draw.is_empty());
    }
}
