//! Level assets: ship art, shards and bullet sprites
//!
//! Everything is generated once when a level is loaded and shared read-only
//! by every entity afterwards.

use std::rc::Rc;

use rand::Rng;

use super::blueprint::{BossKind, BulletSize, EnemyBlueprint, Level};
use super::projectile::{Caliber, Lane};
use super::voronoi::{Shard, create_shards};
use crate::raster::{Raster, ShipGenerator};
use crate::settings::Settings;

/// Player ship generator seeds: ship, layout, size
const PLAYER_SHIP_PARAMS: (u32, u32, u32) = (5, 114, 40);
/// Lean of the angled player bullet lanes (radians)
const LANE_LEAN: f32 = 0.245;
/// Tail length of player bullets, in radii
const BULLET_FLAME_FACTOR: f32 = 6.0;
/// Colour stops of one half of the enemy bullet pulse
const BULLET_PULSE_STOPS: u32 = 9;

/// A ship image with its hit overlay and shatter pieces
#[derive(Debug, Clone)]
pub struct ShipArt {
    pub sprite: Rc<Raster>,
    /// Tinted copy blended over the sprite right after a hit
    pub hit: Rc<Raster>,
    /// Shatter pieces, largest first
    pub shards: Rc<[Shard]>,
}

impl ShipArt {
    pub fn new(raster: Raster, rng: &mut impl Rng) -> Self {
        let shards = create_shards(&raster, rng);
        Self {
            hit: Rc::new(raster.hit_tint()),
            sprite: Rc::new(raster),
            shards: shards.into(),
        }
    }
}

/// Animation frames of one enemy bullet size
#[derive(Debug, Clone)]
pub struct BulletArt {
    /// Pulse cycle, one frame per millisecond of game time
    pub frames: Vec<Rc<Raster>>,
    pub mask: Rc<Raster>,
}

impl BulletArt {
    fn new(size: BulletSize) -> Self {
        // Core grows then shrinks back: stops 0..=8 followed by 8..=0
        let rising = (0..BULLET_PULSE_STOPS).map(|stop| stop as f32 / 10.0);
        let falling = rising.clone().rev();
        let frames: Vec<_> = rising
            .chain(falling)
            .map(|stop| Rc::new(Raster::glow_disc(size.radius(), stop)))
            .collect();
        Self {
            mask: Rc::clone(&frames[0]),
            frames,
        }
    }
}

/// Everything a level needs to draw and collide
#[derive(Debug)]
pub struct Assets {
    player_bullets: [[Rc<Raster>; 3]; 2],
    enemy_bullets: Vec<BulletArt>,
    thrusters: [Rc<Raster>; 2],
    pub player_ship: ShipArt,
    pub blueprints: Vec<Rc<EnemyBlueprint>>,
    bosses: Vec<(BossKind, ShipArt)>,
}

impl Assets {
    pub fn load(
        level: Level,
        settings: &Settings,
        generator: &dyn ShipGenerator,
        rng: &mut impl Rng,
    ) -> Self {
        let (ship_seed, layout_seed, size) = PLAYER_SHIP_PARAMS;
        let player = generator
            .generate_ship(settings.ship_color, ship_seed, layout_seed, size)
            .trim();
        let player_ship = ShipArt::new(player, rng);

        let player_bullets = [Caliber::Small, Caliber::Large].map(|caliber| {
            Lane::ALL.map(|lane| {
                let lean = lane.index() as f32 - 1.0;
                Rc::new(Raster::flame(
                    caliber.radius(),
                    lean * LANE_LEAN,
                    BULLET_FLAME_FACTOR,
                ))
            })
        });
        let enemy_bullets = BulletSize::ALL.iter().map(|&size| BulletArt::new(size)).collect();
        let thrusters = [5, 4].map(|radius| Rc::new(Raster::flame(radius, 0.0, 4.0)));

        let color = level.color();
        let enemy_art = |seed: u32, layout: u32, size: u32, rng: &mut _| {
            let raster = generator.generate_ship(color, seed, layout, size);
            ShipArt::new(raster.flip_vertical().trim(), rng)
        };

        let mut blueprints = Vec::new();
        for table in level.enemy_tables() {
            for def in table {
                let art = enemy_art(def.ship_seed, def.layout_seed, def.size, &mut *rng);
                blueprints.push(Rc::new(EnemyBlueprint { def, art }));
            }
        }

        let bosses: Vec<_> = level
            .boss_kinds()
            .iter()
            .map(|&kind| {
                let (seed, layout, size) = kind.ship_params();
                (kind, enemy_art(seed, layout, size, &mut *rng))
            })
            .collect();

        log::info!(
            "Loaded {} assets: {} enemy blueprints, {} boss forms, {} ship shards",
            level.name(),
            blueprints.len(),
            bosses.len(),
            player_ship.shards.len()
        );

        Self {
            player_bullets,
            enemy_bullets,
            thrusters,
            player_ship,
            blueprints,
            bosses,
        }
    }

    #[inline]
    pub fn player_bullet(&self, caliber: Caliber, lane: Lane) -> &Rc<Raster> {
        &self.player_bullets[caliber as usize][lane.index()]
    }

    #[inline]
    pub fn enemy_bullet(&self, size: BulletSize) -> &BulletArt {
        &self.enemy_bullets[size.index()]
    }

    pub fn thruster(&self, index: usize) -> &Rc<Raster> {
        &self.thrusters[index % self.thrusters.len()]
    }

    /// Art of a boss form; loading a level without it is a programmer error
    pub fn boss(&self, kind: BossKind) -> &ShipArt {
        match self.bosses.iter().find(|(k, _)| *k == kind) {
            Some((_, art)) => art,
            None => panic!("boss {kind:?} not loaded for this level"),
        }
    }

    pub fn has_boss(&self, kind: BossKind) -> bool {
        self.bosses.iter().any(|(k, _)| *k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::SilhouetteGenerator;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn load(level: Level) -> Assets {
        let mut rng = Pcg32::seed_from_u64(7);
        Assets::load(level, &Settings::default(), &SilhouetteGenerator, &mut rng)
    }

    #[test]
    fn test_bullet_pulse_frames() {
        let art = BulletArt::new(BulletSize::L);
        assert_eq!(art.frames.len(), 18);
        assert_eq!(art.frames[0], art.frames[17]);
        assert_eq!(art.frames[8], art.frames[9]);
        assert_eq!(art.mask.width(), 20);
    }

    #[test]
    fn test_level_loads() {
        let assets = load(Level::Cygnus);
        assert_eq!(assets.blueprints.len(), 4);
        assert!(assets.has_boss(BossKind::Cygnus));
        assert!(!assets.has_boss(BossKind::Andromeda));
        assert!(!assets.player_ship.shards.is_empty());

        let assets = load(Level::Survival);
        assert_eq!(assets.blueprints.len(), 16);
        assert!(BossKind::ALL.iter().all(|&k| !assets.has_boss(k)));

        let assets = load(Level::Endgame);
        assert!(assets.blueprints.is_empty());
        assert!(BossKind::ALL.iter().all(|&k| assets.has_boss(k)));
    }

    #[test]
    fn test_shards_cover_sprite() {
        let assets = load(Level::Andromeda);
        let art = &assets.blueprints[0].art;
        let total: usize = art.shards.iter().map(|s| s.sprite.opaque_count()).sum();
        assert_eq!(total, art.sprite.opaque_count());
    }
}
