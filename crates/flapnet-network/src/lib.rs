//! Fixed-shape feed-forward controller for flapnet birds.
//!
//! A [`Controller`] maps the three sensor readings of a bird to a flap decision
//! through a single hidden `tanh` layer and a sigmoid output:
//!
//! ```text
//! sensors (3) ──w1,b1──▶ hidden (tanh) ──w2,b2──▶ output (sigmoid) ──▶ flap if > 0.5
//! ```
//!
//! Controllers never learn during simulation. Their weights only change
//! through the genetic operators used by the training crate:
//!
//! - [`Controller::mutate`] - Per-parameter Bernoulli-gated uniform noise
//! - [`Controller::crossover`] - Parameter-wise mean of two parents
//!
//! Controllers serialize through [`ControllerModel`], which also accepts the
//! older unversioned layout.
//!
//! # Example
//!
//! ```
//! use flapnet_network::Controller;
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
//! let mut controller = Controller::random(8, &mut rng);
//! let before = controller.predict(&[0.5, -0.1, 0.3]);
//! assert!((0.0..=1.0).contains(&before));
//!
//! controller.mutate(0.0, 1.0, &mut rng);
//! assert_eq!(controller.predict(&[0.5, -0.1, 0.3]), before);
//! ```

pub use self::{controller::*, model::*};

pub mod activation;
mod controller;
mod model;
