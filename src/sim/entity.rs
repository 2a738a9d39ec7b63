//! Entity protocol and per-frame driver
//!
//! Every moving thing is an [`Entity`]: a small state machine stepped once per
//! frame. A step reports whether the entity lives on (and on which layer), may
//! register a [`Hitable`] for next frame's projectiles, and may spawn children.
//! Children are simulated in the same frame through a FIFO work queue.

use std::collections::VecDeque;
use std::rc::Rc;

use super::assets::Assets;
use super::collision::HitBox;
use super::draw::DrawList;
use super::state::GameState;
use crate::consts::MAX_SPAWNS_PER_FRAME;

/// What an entity reports after its step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Drop it
    Dead,
    /// Keep it in the normal layer
    Alive,
    /// Keep it, composited above the normal layer
    Foreground,
}

/// Collision target registered by a live entity for one frame
///
/// Projectiles probe every registered target; a hit mutates the owner's shared
/// health immediately, even before the owner's own step this frame.
pub trait Hitable {
    /// Test `other` against the target, applying `power` damage on contact
    fn check_hit(&self, other: &HitBox, power: f32, now: f64, state: &mut GameState) -> bool;
}

/// Result of one step
pub struct StepOutcome {
    pub liveness: Liveness,
    pub hitable: Option<Rc<dyn Hitable>>,
}

impl StepOutcome {
    pub const DEAD: StepOutcome = StepOutcome {
        liveness: Liveness::Dead,
        hitable: None,
    };

    pub fn alive() -> Self {
        Self {
            liveness: Liveness::Alive,
            hitable: None,
        }
    }

    pub fn foreground() -> Self {
        Self {
            liveness: Liveness::Foreground,
            hitable: None,
        }
    }

    pub fn hitable(target: Rc<dyn Hitable>) -> Self {
        Self {
            liveness: Liveness::Alive,
            hitable: Some(target),
        }
    }
}

/// Everything an entity may touch during its step
pub struct FrameContext<'a> {
    pub state: &'a mut GameState,
    pub assets: &'a Assets,
    /// Targets registered during the previous frame
    pub hitables: &'a [Rc<dyn Hitable>],
    pub draw: &'a mut DrawList,
}

/// Output buffers for entities created during a step
#[derive(Default)]
pub struct Spawner {
    spawned: Vec<Box<dyn Entity>>,
    on_top: Vec<Box<dyn Entity>>,
}

impl Spawner {
    /// Queue an entity; it runs later in this same frame
    pub fn spawn(&mut self, entity: impl Entity + 'static) {
        self.spawned.push(Box::new(entity));
    }

    /// Place an entity directly in the foreground layer; it first runs next frame
    pub fn spawn_on_top(&mut self, entity: impl Entity + 'static) {
        self.on_top.push(Box::new(entity));
    }

    pub fn len(&self) -> usize {
        self.spawned.len()
    }

    pub fn on_top_len(&self) -> usize {
        self.on_top.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.on_top.is_empty()
    }

    /// Take the queued entities (used by tests and the driver)
    pub fn drain(&mut self) -> Vec<Box<dyn Entity>> {
        std::mem::take(&mut self.spawned)
    }
}

/// A unit of simulation
pub trait Entity {
    fn step(&mut self, now: f64, frame: &mut FrameContext<'_>, spawn: &mut Spawner) -> StepOutcome;
}

/// The live entity list and the hit-test list, rebuilt every frame
#[derive(Default)]
pub struct Scene {
    entities: Vec<Box<dyn Entity>>,
    hitables: Vec<Rc<dyn Hitable>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity outside of a frame pass; it first runs next frame
    pub fn push(&mut self, entity: impl Entity + 'static) {
        self.entities.push(Box::new(entity));
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn hitable_count(&self) -> usize {
        self.hitables.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.hitables.clear();
    }

    /// Step every entity once, then swap in the new live and hit-test lists
    ///
    /// Foreground entities end up after all normal ones.
    pub fn advance(&mut self, now: f64, state: &mut GameState, assets: &Assets, draw: &mut DrawList) {
        let previous_hitables = std::mem::take(&mut self.hitables);
        let mut frame = FrameContext {
            state,
            assets,
            hitables: &previous_hitables,
            draw,
        };

        let mut next = Vec::with_capacity(self.entities.len());
        let mut on_top = Vec::new();
        let mut next_hitables = Vec::new();
        let mut queue = VecDeque::new();
        let mut spawned = 0usize;

        for entity in std::mem::take(&mut self.entities) {
            queue.push_back(entity);
            while let Some(mut entity) = queue.pop_front() {
                let mut spawn = Spawner::default();
                let outcome = entity.step(now, &mut frame, &mut spawn);

                on_top.append(&mut spawn.on_top);
                match outcome.liveness {
                    Liveness::Dead => {}
                    Liveness::Alive => next.push(entity),
                    Liveness::Foreground => on_top.push(entity),
                }
                if outcome.liveness != Liveness::Dead {
                    next_hitables.extend(outcome.hitable);
                }

                spawned += spawn.spawned.len();
                assert!(
                    spawned <= MAX_SPAWNS_PER_FRAME,
                    "more than {MAX_SPAWNS_PER_FRAME} entities spawned in one frame"
                );
                queue.extend(spawn.spawned);
            }
        }

        next.append(&mut on_top);
        self.entities = next;
        self.hitables = next_hitables;
    }
}
