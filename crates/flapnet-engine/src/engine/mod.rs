//! Per-tick behaviour of the simulation.
//!
//! - [`PipeStream`] - The shared, seeded obstacle stream
//! - [`Seed`] - 128-bit seed for deterministic streams and training runs
//! - [`sense`], [`collides`], [`score_passed_pipes`] - Per-bird queries and updates
//! - [`SoloGame`] - A single bird playing against its own stream
//!
//! # Tick Order
//!
//! Every tick follows the same order, whether one bird or a whole population
//! is simulated:
//!
//! 1. Advance the stream once (spawn, move, prune)
//! 2. For each live bird: sense, decide, step, test collision
//! 3. Credit live birds for pipes they have passed

pub use self::{pipe_stream::*, seed::*, solo_game::*, world::*};

mod pipe_stream;
mod seed;
mod solo_game;
mod world;
