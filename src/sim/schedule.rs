//! Time-gated spawns
//!
//! A [`TimeSpacer`] sits invisibly in the scene until its trigger time, then
//! creates its entity in the same frame and goes away.

use std::rc::Rc;

use super::boss::Boss;
use super::enemy::Enemy;
use super::entity::{Entity, FrameContext, Spawner, StepOutcome};

/// What a spacer creates when it fires
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnAction {
    /// An enemy of the given blueprint index
    Enemy { blueprint: usize, x: f32, points: u64 },
    /// The boss of the current level (or the next Endgame boss)
    Boss,
}

#[derive(Debug, Clone)]
pub struct TimeSpacer {
    trigger: f64,
    action: SpawnAction,
}

impl TimeSpacer {
    pub fn new(trigger: f64, action: SpawnAction) -> Self {
        Self { trigger, action }
    }
}

impl Entity for TimeSpacer {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, spawn: &mut Spawner) -> StepOutcome {
        if now < self.trigger {
            return StepOutcome::alive();
        }

        match self.action {
            SpawnAction::Enemy { blueprint, x, points } => match frame.assets.blueprints.get(blueprint) {
                Some(bp) => spawn.spawn(Enemy::new(Rc::clone(bp), x, points, now, frame.state)),
                None => log::warn!("No enemy blueprint {blueprint} in this level"),
            },
            SpawnAction::Boss => match Boss::for_current_level(frame.state, frame.assets, now) {
                Some(boss) => spawn.spawn(boss),
                None => log::warn!("No boss to spawn for {:?}", frame.state.level),
            },
        }
        StepOutcome::DEAD
    }
}
