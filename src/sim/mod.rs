//! Simulation module
//!
//! All gameplay logic lives here. This module is pure:
//! - Time comes in from the host as milliseconds
//! - Randomness comes from seeded generators in [`GameState`]
//! - Output is a draw list and an event list, no rendering or platform calls

pub mod assets;
pub mod blueprint;
pub mod boss;
pub mod collision;
pub mod debris;
pub mod draw;
pub mod enemy;
pub mod entity;
pub mod projectile;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod voronoi;

pub use assets::{Assets, BulletArt, ShipArt};
pub use blueprint::{BossKind, BulletSize, EnemyBlueprint, EnemyDef, FirePattern, Level};
pub use boss::Boss;
pub use collision::{HitBox, collide};
pub use debris::{Particle, ShipFragment, shatter};
pub use draw::{BlendMode, DrawCommand, DrawList};
pub use enemy::{Enemy, Vitals};
pub use entity::{Entity, FrameContext, Hitable, Liveness, Scene, Spawner, StepOutcome};
pub use projectile::{Bullet, Caliber, EnemyBullet, Lane, fire_circle_bullets};
pub use schedule::{SpawnAction, TimeSpacer};
pub use state::{GameEvent, GamePhase, GameState, Ship};
pub use tick::{FrameReport, Game, GameClock, TickInput};
pub use voronoi::{Shard, create_shards};

#[cfg(test)]
pub(crate) mod testing {
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::raster::SilhouetteGenerator;
    use crate::settings::Settings;

    const SEED: u64 = 0x5eed;

    /// Fresh state and assets for a level; the ship has no hitbox yet
    pub fn fixture(level: Level) -> (GameState, Assets) {
        let mut rng = Pcg32::seed_from_u64(SEED);
        let assets = Assets::load(level, &Settings::default(), &SilhouetteGenerator, &mut rng);
        let state = GameState::new(level, Settings::default(), assets.player_ship.clone(), SEED);
        (state, assets)
    }

    /// Step one entity outside of a scene
    pub fn step_entity(
        entity: &mut impl Entity,
        now: f64,
        state: &mut GameState,
        assets: &Assets,
        hitables: &[Rc<dyn Hitable>],
    ) -> (StepOutcome, Spawner, DrawList) {
        let mut draw = DrawList::new();
        let mut spawn = Spawner::default();
        let mut frame = FrameContext {
            state,
            assets,
            hitables,
            draw: &mut draw,
        };
        let outcome = entity.step(now, &mut frame, &mut spawn);
        (outcome, spawn, draw)
    }
}
