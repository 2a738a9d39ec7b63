//! Levels, enemy archetypes and boss archetypes
//!
//! All tables are static. Loaded art is attached at level start by
//! [`super::assets::Assets::load`]; the numbers here never change at runtime.

use std::f32::consts::PI;

use super::assets::ShipArt;
use super::projectile::Volley;

/// Playable levels, in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Andromeda,
    Borealis,
    Cygnus,
    Draco,
    /// Boss rush: every boss in sequence, no regular enemies
    Endgame,
    /// Endless: every regular enemy, no boss
    Survival,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Andromeda,
        Level::Borealis,
        Level::Cygnus,
        Level::Draco,
        Level::Endgame,
        Level::Survival,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Level> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Andromeda => "Andromeda",
            Level::Borealis => "Borealis",
            Level::Cygnus => "Cygnus",
            Level::Draco => "Draco",
            Level::Endgame => "Endgame",
            Level::Survival => "Survival",
        }
    }

    /// Seed of the enemy layout stream
    pub fn spawn_seed(self) -> u64 {
        [1, 2000, 3000, 4000, 0, 6000][self.index()]
    }

    /// Colour seed handed to the ship generator for enemies and bosses
    pub fn color(self) -> u32 {
        [12, 255, 552, 589, 308, 8][self.index()]
    }

    /// Enemy tables loaded for this level
    pub fn enemy_tables(self) -> Vec<&'static [EnemyDef]> {
        match self {
            Level::Andromeda => vec![&ANDROMEDA_ENEMIES[..]],
            Level::Borealis => vec![&BOREALIS_ENEMIES[..]],
            Level::Cygnus => vec![&CYGNUS_ENEMIES[..]],
            Level::Draco => vec![&DRACO_ENEMIES[..]],
            Level::Endgame => Vec::new(),
            Level::Survival => vec![
                &ANDROMEDA_ENEMIES[..],
                &BOREALIS_ENEMIES[..],
                &CYGNUS_ENEMIES[..],
                &DRACO_ENEMIES[..],
            ],
        }
    }

    /// Boss art loaded for this level
    pub fn boss_kinds(self) -> &'static [BossKind] {
        match self {
            Level::Andromeda => &BossKind::ALL[0..1],
            Level::Borealis => &BossKind::ALL[1..2],
            Level::Cygnus => &BossKind::ALL[2..3],
            Level::Draco => &BossKind::ALL[3..4],
            Level::Endgame => &BossKind::ALL,
            Level::Survival => &[],
        }
    }
}

/// Enemy bullet size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletSize {
    S,
    M,
    L,
    XL,
}

impl BulletSize {
    pub const ALL: [BulletSize; 4] = [BulletSize::S, BulletSize::M, BulletSize::L, BulletSize::XL];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Glow radius in pixels
    pub fn radius(self) -> u32 {
        match self {
            BulletSize::S => 4,
            BulletSize::M => 7,
            BulletSize::L => 10,
            BulletSize::XL => 14,
        }
    }
}

/// Scripted firing behaviour of a regular enemy
///
/// Invoked with a 1-based sequence number; returns the delay until the next
/// volley, or `None` to stop firing for good.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirePattern {
    /// One aimed shot
    Single { size: BulletSize, speed: f32 },
    /// Aimed shots in groups of `every`, `short` apart, `long` between groups
    Burst {
        size: BulletSize,
        speed: f32,
        every: u32,
        short: f64,
        long: f64,
    },
    /// A few rings 200 ms apart
    RingVolley {
        size: BulletSize,
        count: u32,
        angle: f32,
        speed: f32,
        volleys: u32,
    },
    /// A few aimed fans 200 ms apart
    Spread {
        size: BulletSize,
        speed: f32,
        extra: u32,
        extra_angle: f32,
        volleys: u32,
    },
    /// Four quick aimed shots, each faster than the last
    RampBurst,
    /// Three aimed shots then a ring
    BurstThenRing,
    /// Four large aimed shots then six rotating five-way rings
    Storm,
    /// Five rings of twelve, alternately offset and speeding up
    AlternatingRings,
}

impl FirePattern {
    pub fn fire(&self, seq: u32, volley: &mut Volley<'_>) -> Option<f64> {
        match *self {
            FirePattern::Single { size, speed } => {
                volley.aimed(size, speed);
                None
            }
            FirePattern::Burst {
                size,
                speed,
                every,
                short,
                long,
            } => {
                volley.aimed(size, speed);
                Some(if seq % every != 0 { short } else { long })
            }
            FirePattern::RingVolley {
                size,
                count,
                angle,
                speed,
                volleys,
            } => {
                volley.circle(size, count, angle, speed);
                (seq < volleys).then_some(200.0)
            }
            FirePattern::Spread {
                size,
                speed,
                extra,
                extra_angle,
                volleys,
            } => {
                volley.aimed_spread(size, speed, extra, extra_angle);
                (seq < volleys).then_some(200.0)
            }
            FirePattern::RampBurst => {
                let step = seq.wrapping_sub(1) % 4;
                volley.aimed(BulletSize::M, 0.3 + 0.05 * step as f32);
                Some(if seq % 4 != 0 { 50.0 } else { 800.0 })
            }
            FirePattern::BurstThenRing => {
                let turret = seq % 4 != 0;
                if turret {
                    volley.aimed(BulletSize::S, 0.3);
                } else {
                    volley.circle(BulletSize::S, 8, 0.0, 0.3);
                }
                Some(if turret { 250.0 } else { 1000.0 })
            }
            FirePattern::Storm => {
                let s = seq % 10;
                if s < 4 {
                    volley.aimed(BulletSize::L, 0.4);
                } else {
                    volley.circle(BulletSize::S, 5, s as f32 * PI / 12.0, 0.3);
                }
                Some(match s {
                    0..3 => 200.0,
                    3 => 500.0,
                    4..9 => 100.0,
                    _ => 800.0,
                })
            }
            FirePattern::AlternatingRings => {
                let angle = if seq % 2 != 0 { 0.0 } else { PI / 12.0 };
                volley.circle(BulletSize::S, 12, angle, 0.3 + seq as f32 * 0.1);
                (seq < 4).then_some(100.0)
            }
        }
    }
}

/// Ring of bullets released when an enemy dies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathBurst {
    pub size: BulletSize,
    pub count: u32,
    pub speed: f32,
}

/// Timed firing behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    /// Delay after spawn before the first volley
    pub delay: f64,
    pub pattern: FirePattern,
}

/// Static description of a regular enemy archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDef {
    pub ship_seed: u32,
    pub layout_seed: u32,
    pub size: u32,
    pub health: f32,
    /// px/ms
    pub speed: f32,
    pub trigger: Option<Trigger>,
    /// Y at which the enemy parks while the player lives
    pub stop_at: Option<f32>,
    pub death_burst: Option<DeathBurst>,
    /// Maximum turn rate toward the player (rad/ms)
    pub homing: Option<f32>,
    /// Spawns three followers 300 ms apart
    pub wave: bool,
}

impl EnemyDef {
    pub const fn new(ship_seed: u32, layout_seed: u32, size: u32, health: f32, speed: f32) -> Self {
        Self {
            ship_seed,
            layout_seed,
            size,
            health,
            speed,
            trigger: None,
            stop_at: None,
            death_burst: None,
            homing: None,
            wave: false,
        }
    }

    pub const fn firing(mut self, delay: f64, pattern: FirePattern) -> Self {
        self.trigger = Some(Trigger { delay, pattern });
        self
    }

    pub const fn stop_at(mut self, y: f32) -> Self {
        self.stop_at = Some(y);
        self
    }

    pub const fn death_burst(mut self, size: BulletSize, count: u32, speed: f32) -> Self {
        self.death_burst = Some(DeathBurst { size, count, speed });
        self
    }

    pub const fn homing(mut self, rate: f32) -> Self {
        self.homing = Some(rate);
        self
    }

    pub const fn wave(mut self) -> Self {
        self.wave = true;
        self
    }
}

static ANDROMEDA_ENEMIES: [EnemyDef; 4] = [
    EnemyDef::new(34, 213, 0, 15.0, 0.35),
    EnemyDef::new(34, 9, 80, 30.0, 0.35).firing(
        1000.0,
        FirePattern::Single {
            size: BulletSize::S,
            speed: 0.3,
        },
    ),
    EnemyDef::new(34, 18, 100, 50.0, 0.25)
        .firing(
            1000.0,
            FirePattern::Burst {
                size: BulletSize::S,
                speed: 0.3,
                every: 3,
                short: 250.0,
                long: 1000.0,
            },
        )
        .stop_at(150.0),
    EnemyDef::new(34, 73, 310, 100.0, 0.15).death_burst(BulletSize::M, 8, 0.45),
];

static BOREALIS_ENEMIES: [EnemyDef; 4] = [
    EnemyDef::new(20, 18, 40, 30.0, 0.35).firing(
        700.0,
        FirePattern::Single {
            size: BulletSize::S,
            speed: 0.3,
        },
    ),
    EnemyDef::new(20, 91, 80, 60.0, 0.3).firing(
        550.0,
        FirePattern::RingVolley {
            size: BulletSize::S,
            count: 8,
            angle: PI / 8.0,
            speed: 0.3,
            volleys: 3,
        },
    ),
    EnemyDef::new(20, 9, 120, 140.0, 0.15).firing(
        800.0,
        FirePattern::Burst {
            size: BulletSize::M,
            speed: 0.3,
            every: 3,
            short: 250.0,
            long: 1000.0,
        },
    ),
    EnemyDef::new(109, 203, 40, 80.0, 0.55).homing(0.002),
];

static CYGNUS_ENEMIES: [EnemyDef; 4] = [
    EnemyDef::new(51, 91, 120, 120.0, 0.15).death_burst(BulletSize::M, 11, 0.45),
    EnemyDef::new(51, 9, 60, 30.0, 0.4)
        .firing(
            800.0,
            FirePattern::Single {
                size: BulletSize::S,
                speed: 0.3,
            },
        )
        .wave(),
    EnemyDef::new(51, 156, 100, 120.0, 0.35).firing(800.0, FirePattern::RampBurst),
    EnemyDef::new(51, 11, 100, 80.0, 0.35)
        .firing(800.0, FirePattern::BurstThenRing)
        .stop_at(150.0),
];

static DRACO_ENEMIES: [EnemyDef; 4] = [
    EnemyDef::new(89, 218, 60, 40.0, 0.4).firing(
        600.0,
        FirePattern::Spread {
            size: BulletSize::S,
            speed: 0.3,
            extra: 1,
            extra_angle: PI / 24.0,
            volleys: 3,
        },
    ),
    EnemyDef::new(89, 50, 100, 120.0, 0.4)
        .firing(800.0, FirePattern::Storm)
        .stop_at(150.0),
    EnemyDef::new(1492, 43, 40, 40.0, 0.55).homing(0.002).wave(),
    EnemyDef::new(320, 397, 120, 200.0, 0.15).firing(1400.0, FirePattern::AlternatingRings),
];

/// A regular enemy archetype with its art loaded
#[derive(Debug)]
pub struct EnemyBlueprint {
    pub def: &'static EnemyDef,
    pub art: ShipArt,
}

/// Boss archetypes, in Endgame order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossKind {
    Andromeda,
    Borealis,
    Cygnus,
    Draco,
    /// First form of the final boss; splits at half health
    EndgameFirst,
    /// Second form of the final boss
    EndgameSecond,
}

impl BossKind {
    pub const ALL: [BossKind; 6] = [
        BossKind::Andromeda,
        BossKind::Borealis,
        BossKind::Cygnus,
        BossKind::Draco,
        BossKind::EndgameFirst,
        BossKind::EndgameSecond,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<BossKind> {
        Self::ALL.get(index).copied()
    }

    /// Generator seeds: ship, layout, size
    pub fn ship_params(self) -> (u32, u32, u32) {
        match self {
            BossKind::Andromeda => (34, 145, 300),
            BossKind::Borealis => (141, 50, 200),
            BossKind::Cygnus => (1905, 111, 220),
            BossKind::Draco => (2514, 491, 220),
            BossKind::EndgameFirst => (2066, 334, 300),
            BossKind::EndgameSecond => (269, 101, 250),
        }
    }

    /// Health once the fight begins
    pub fn health(self) -> f32 {
        match self {
            BossKind::Andromeda => 800.0,
            BossKind::Borealis | BossKind::Cygnus => 2000.0,
            BossKind::Draco => 3000.0,
            BossKind::EndgameFirst => 4000.0,
            BossKind::EndgameSecond => 2000.0,
        }
    }

    /// Form this boss turns into at half health
    pub fn next_phase(self) -> Option<BossKind> {
        match self {
            BossKind::EndgameFirst => Some(BossKind::EndgameSecond),
            _ => None,
        }
    }

    /// Score for the kill
    pub fn kill_points(self) -> u64 {
        (self.index() as u64 + 1) * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Spawner;
    use glam::Vec2;

    fn fire_sequence(pattern: FirePattern, volleys: u32) -> (Vec<Option<f64>>, usize) {
        let mut spawn = Spawner::default();
        let mut delays = Vec::new();
        for seq in 1..=volleys {
            let mut volley = Volley::new(Vec2::new(100.0, 100.0), Vec2::new(100.0, 600.0), 0.0, &mut spawn);
            delays.push(pattern.fire(seq, &mut volley));
        }
        (delays, spawn.len())
    }

    #[test]
    fn test_level_tables() {
        assert_eq!(Level::Andromeda.enemy_tables().len(), 1);
        assert_eq!(Level::Survival.enemy_tables().len(), 4);
        assert!(Level::Endgame.enemy_tables().is_empty());
        assert_eq!(Level::Endgame.boss_kinds().len(), 6);
        assert!(Level::Survival.boss_kinds().is_empty());
        assert_eq!(Level::Draco.boss_kinds(), &[BossKind::Draco]);
        assert_eq!(Level::from_index(6), None);
    }

    #[test]
    fn test_single_shot_stops() {
        let pattern = ANDROMEDA_ENEMIES[1].trigger.unwrap().pattern;
        let (delays, spawned) = fire_sequence(pattern, 1);
        assert_eq!(delays, vec![None]);
        assert_eq!(spawned, 1);
    }

    #[test]
    fn test_turret_burst_cycle() {
        let pattern = ANDROMEDA_ENEMIES[2].trigger.unwrap().pattern;
        let (delays, _) = fire_sequence(pattern, 6);
        assert_eq!(
            delays,
            vec![Some(250.0), Some(250.0), Some(1000.0), Some(250.0), Some(250.0), Some(1000.0)]
        );
    }

    #[test]
    fn test_ring_volley_fires_three_rings() {
        let pattern = BOREALIS_ENEMIES[1].trigger.unwrap().pattern;
        let (delays, spawned) = fire_sequence(pattern, 3);
        assert_eq!(delays, vec![Some(200.0), Some(200.0), None]);
        assert_eq!(spawned, 24);
    }

    #[test]
    fn test_storm_schedule() {
        let (delays, spawned) = fire_sequence(FirePattern::Storm, 10);
        // seq runs 1..=10, so s = 1, 2, .., 9, 0
        let expected: Vec<_> = [200.0, 200.0, 500.0, 100.0, 100.0, 100.0, 100.0, 100.0, 800.0, 200.0]
            .into_iter()
            .map(Some)
            .collect();
        assert_eq!(delays, expected);
        // s = 1, 2, 3 and 0 aim a single bullet, the rest fire rings of five
        assert_eq!(spawned, 4 + 6 * 5);
    }

    #[test]
    fn test_spread_fires_fans() {
        let pattern = DRACO_ENEMIES[0].trigger.unwrap().pattern;
        let (delays, spawned) = fire_sequence(pattern, 3);
        assert_eq!(delays, vec![Some(200.0), Some(200.0), None]);
        assert_eq!(spawned, 9);
    }

    #[test]
    fn test_endgame_split() {
        assert_eq!(BossKind::EndgameFirst.next_phase(), Some(BossKind::EndgameSecond));
        assert_eq!(BossKind::EndgameSecond.next_phase(), None);
        assert_eq!(BossKind::EndgameSecond.health(), 2000.0);
        assert_eq!(BossKind::Draco.kill_points(), 4000);
    }

    #[test]
    fn test_wave_archetypes() {
        let waves: Vec<_> = Level::Survival
            .enemy_tables()
            .into_iter()
            .flatten()
            .filter(|def| def.wave)
            .map(|def| def.ship_seed)
            .collect();
        assert_eq!(waves, vec![51, 1492]);
    }
}
