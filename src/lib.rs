//! Galaxy Raid - simulation core of a vertical arcade shoot-'em-up
//!
//! Core modules:
//! - `sim`: Entity protocol, frame driver, collisions, enemies, bosses and debris
//! - `raster`: RGBA images, alpha masks and the ship generator seam
//! - `audio`: Sound cue sink
//! - `settings` / `highscores`: Serializable player configuration

pub mod audio;
pub mod highscores;
pub mod raster;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{Settings, Upgrade};

use glam::Vec2;

/// Game configuration constants
///
/// Distances are canvas pixels, times are milliseconds of game clock.
pub mod consts {
    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 480.0;
    pub const CANVAS_HEIGHT: f32 = 700.0;
    pub const HALF_CANVAS_WIDTH: f32 = 240.0;

    /// Player ship speed (px/ms)
    pub const SHIP_SPEED: f32 = 0.6;
    /// Distance below the canvas bottom the ship settles at after the intro
    pub const SHIP_INITIAL_BOTTOM_MARGIN: f32 = 20.0;

    /// Player bullets
    pub const BULLET_SPEED: f32 = 5.0 / 8.0;
    pub const SMALL_BULLET_POWER: f32 = 10.0;
    pub const LARGE_BULLET_POWER: f32 = 20.0;
    pub const FIRE_INTERVAL: f64 = 200.0;

    /// Explosion fragment lifetimes
    pub const ENEMY_EXPLOSION_DURATION: f64 = 500.0;
    pub const BOSS_EXPLOSION_DURATION: f64 = 500.0;
    pub const PLAYER_EXPLOSION_DURATION: f64 = 1500.0;
    pub const PARTICLE_DURATION: f64 = 500.0;

    /// Pickup coins
    pub const COIN_SLOWDOWN_SPEED: f32 = 3.0;
    pub const COIN_CREEPING_SPEED: f32 = 0.1;
    pub const BASE_MAGNET_SPEED: f32 = 0.2;
    pub const ADDITIONAL_MAGNET_SPEED: f32 = 0.1;
    pub const MAGNET_RADIUS_PER_LEVEL: f32 = 60.0;
    /// Coin drift constants were tuned per 60 Hz frame
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

    /// Timed windows
    pub const BOMB_DURATION: f64 = 1000.0;
    pub const GAME_OVER_DURATION: f64 = 3500.0;
    pub const GAME_INTRO_DURATION: f64 = 2500.0;
    pub const HIT_FLASH_DURATION: f64 = 400.0;

    /// Frame clock: gaps above this are treated as a pause
    pub const PAUSE_THRESHOLD: f64 = 200.0;
    /// Step the simulation perceives after a detected pause
    pub const PAUSE_STEP: f64 = 40.0;

    /// Upper bound on entities spawned while draining one frame's work queue
    pub const MAX_SPAWNS_PER_FRAME: usize = 4096;

    pub const MAX_UPGRADE: u8 = 4;
    pub const TOTAL_SHIELDS: u8 = 5;
}

/// Angle from `from` toward `to` in the playfield convention.
///
/// Zero points down the screen (+y) and the sine drives x, so
/// `heading(angle_between(a, b))` is the unit vector from `a` to `b`.
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.x - from.x).atan2(to.y - from.y)
}

/// Unit direction for a playfield angle (see [`angle_between`])
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), angle.cos())
}

/// Wrap an angle difference to [-π, π]
#[inline]
pub fn shortest_turn(delta: f32) -> f32 {
    delta.sin().atan2(delta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_heading_points_at_target() {
        let from = Vec2::new(100.0, 100.0);
        let to = Vec2::new(100.0, 300.0);
        let dir = heading(angle_between(from, to));
        assert!((dir - Vec2::new(0.0, 1.0)).length() < 1e-5);

        let to = Vec2::new(0.0, 100.0);
        let dir = heading(angle_between(from, to));
        assert!((dir - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_shortest_turn_wraps() {
        assert!((shortest_turn(1.5 * PI) - (-0.5 * PI)).abs() < 1e-5);
        assert!((shortest_turn(-1.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((shortest_turn(0.25) - 0.25).abs() < 1e-6);
    }
}
