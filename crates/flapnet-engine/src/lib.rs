//! Simulation engine for the flapnet side-scroller.
//!
//! The engine advances a bird (the agent) and a stream of pipes (the obstacles)
//! in discrete ticks. It knows nothing about neural networks or training: a
//! caller decides each tick whether a bird flaps, and the engine integrates
//! physics, detects collisions and counts passed pipes.
//!
//! - [`core`] - Plain data: field configuration, [`Bird`], [`Pipe`]
//! - [`engine`] - Behaviour: the shared [`PipeStream`], sensing, collision,
//!   scoring and the single-agent [`SoloGame`]
//!
//! # Example
//!
//! ```
//! use flapnet_engine::{Bird, FieldConfig, PipeStream, Seed};
//!
//! let field = FieldConfig::default();
//! let mut stream = PipeStream::with_seed(Seed::from_u128(7));
//! let mut bird = Bird::new(&field);
//!
//! for _ in 0..10 {
//!     stream.advance(&field);
//!     bird.step(false, &field);
//! }
//! assert_eq!(bird.age(), 10);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
