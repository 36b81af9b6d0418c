use serde::{Deserialize, Serialize};

use crate::{FieldConfig, PipeId, Rect};

/// A single simulated agent.
///
/// A bird only moves vertically; the pipes scroll past it. Once dead it stays
/// dead, and its fitness and age are frozen at the moment of death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    x: f32,
    y: f32,
    vy: f32,
    alive: bool,
    fitness: u32,
    age: u32,
    /// First pipe this bird has not been credited for yet.
    next_unscored: PipeId,
}

impl Bird {
    /// Creates a bird at the field's start position with zero velocity.
    #[must_use]
    pub fn new(field: &FieldConfig) -> Self {
        Self::at(field.bird_x, field.bird_start_y())
    }

    /// Creates a live bird at an arbitrary position.
    #[must_use]
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vy: 0.0,
            alive: true,
            fitness: 0,
            age: 0,
            next_unscored: PipeId(0),
        }
    }

    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.vy
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Number of pipes passed.
    #[must_use]
    pub fn fitness(&self) -> u32 {
        self.fitness
    }

    /// Number of ticks survived.
    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Square bounding box used for collision tests.
    #[must_use]
    pub fn bounds(&self, field: &FieldConfig) -> Rect {
        let r = field.bird_radius;
        Rect {
            left: self.x - r,
            top: self.y - r,
            right: self.x + r,
            bottom: self.y + r,
        }
    }

    /// Sets the vertical velocity to the flap velocity.
    pub fn flap(&mut self, field: &FieldConfig) {
        self.vy = field.flap_velocity;
    }

    /// Advances the bird by exactly one tick.
    ///
    /// Flaps first if `flap` is set, then integrates gravity. Dead birds do
    /// not move.
    pub fn step(&mut self, flap: bool, field: &FieldConfig) {
        if !self.alive {
            return;
        }
        if flap {
            self.flap(field);
        }
        self.vy += field.gravity;
        self.y += self.vy;
        self.age += 1;
    }

    /// Marks the bird permanently dead.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub(crate) fn next_unscored(&self) -> PipeId {
        self.next_unscored
    }

    pub(crate) fn credit(&mut self, pipe: PipeId) {
        self.fitness += 1;
        self.next_unscored = self.next_unscored.max(pipe.next());
    }

    pub(crate) fn credit_shared(&mut self) {
        self.fitness += 1;
    }
}
