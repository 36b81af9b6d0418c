use flapnet_engine::{Pilot, SENSOR_COUNT, Sensors};
use rand::Rng;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use crate::{
    ControllerModel, ShapeError,
    activation::{dot, sigmoid},
};

/// Output threshold above which a controller flaps.
pub const FLAP_THRESHOLD: f32 = 0.5;

/// A feed-forward network with one hidden layer.
///
/// The shape (three inputs, `hidden_size` hidden units, one output) is fixed
/// at construction. Cloning performs a deep copy of every parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ControllerModel", into = "ControllerModel")]
pub struct Controller {
    w1: Vec<[f32; SENSOR_COUNT]>,
    b1: Vec<f32>,
    w2: Vec<f32>,
    b2: f32,
}

impl Controller {
    /// Creates a controller with weights drawn uniformly from `[-1, 1]` and
    /// zero biases.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_size` is zero.
    pub fn random<R>(hidden_size: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(hidden_size > 0, "hidden layer must not be empty");
        let w1: Vec<[f32; SENSOR_COUNT]> = (0..hidden_size)
            .map(|_| std::array::from_fn(|_| rng.random_range(-1.0..=1.0)))
            .collect();
        let w2: Vec<f32> = (0..hidden_size)
            .map(|_| rng.random_range(-1.0..=1.0))
            .collect();
        Self {
            w1,
            b1: vec![0.0; hidden_size],
            w2,
            b2: 0.0,
        }
    }

    /// Builds a controller from explicit parameters.
    ///
    /// All vectors must have one entry per hidden unit and every value must be
    /// finite.
    pub fn from_parts(
        w1: Vec<[f32; SENSOR_COUNT]>,
        b1: Vec<f32>,
        w2: Vec<f32>,
        b2: f32,
    ) -> Result<Self, ShapeError> {
        let hidden_size = w1.len();
        if hidden_size == 0 {
            return Err(ShapeError::EmptyHiddenLayer);
        }
        for (name, len) in [("b1", b1.len()), ("w2", w2.len())] {
            if len != hidden_size {
                return Err(ShapeError::LengthMismatch {
                    name,
                    expected: hidden_size,
                    actual: len,
                });
            }
        }
        let this = Self { w1, b1, w2, b2 };
        if this.parameters().any(|p| !p.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        Ok(this)
    }

    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.w1.len()
    }

    /// Input-to-hidden weights, one row per hidden unit.
    #[must_use]
    pub fn w1(&self) -> &[[f32; SENSOR_COUNT]] {
        &self.w1
    }

    /// Hidden biases.
    #[must_use]
    pub fn b1(&self) -> &[f32] {
        &self.b1
    }

    /// Hidden-to-output weights.
    #[must_use]
    pub fn w2(&self) -> &[f32] {
        &self.w2
    }

    /// Output bias.
    #[must_use]
    pub fn b2(&self) -> f32 {
        self.b2
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.hidden_size() * (SENSOR_COUNT + 2) + 1
    }

    /// Iterates over every parameter in mutation order: for each hidden unit
    /// its input weights then its bias, then the output weights, then the
    /// output bias.
    pub fn parameters(&self) -> impl Iterator<Item = f32> + '_ {
        self.w1
            .iter()
            .zip(&self.b1)
            .flat_map(|(row, b)| row.iter().chain(std::iter::once(b)))
            .chain(&self.w2)
            .chain(std::iter::once(&self.b2))
            .copied()
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.w1
            .iter_mut()
            .zip(&mut self.b1)
            .flat_map(|(row, b)| row.iter_mut().chain(std::iter::once(b)))
            .chain(&mut self.w2)
            .chain(std::iter::once(&mut self.b2))
    }

    /// Computes the network output, a value in `[0, 1]`.
    ///
    /// Pure: the same inputs always give the same output.
    #[must_use]
    pub fn predict(&self, inputs: &Sensors) -> f32 {
        let hidden = self
            .w1
            .iter()
            .zip(&self.b1)
            .map(|(row, b)| (dot(row, inputs) + b).tanh());
        let output = self
            .w2
            .iter()
            .zip(hidden)
            .map(|(w, h)| w * h)
            .sum::<f32>()
            + self.b2;
        sigmoid(output)
    }

    /// Returns `true` if the controller wants to flap.
    #[must_use]
    pub fn decide(&self, inputs: &Sensors) -> bool {
        self.predict(inputs) > FLAP_THRESHOLD
    }

    /// Mutates parameters in place.
    ///
    /// Each parameter independently, with probability `rate`, receives an
    /// additive perturbation drawn uniformly from `[-scale, scale]`.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is outside `[0, 1]` or `scale` is negative or not
    /// finite.
    pub fn mutate<R>(&mut self, rate: f32, scale: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let perturbation = Uniform::new_inclusive(-scale, scale)
            .expect("mutation scale must be finite and non-negative");
        for param in self.parameters_mut() {
            if rng.random_bool(rate.into()) {
                *param += rng.sample(perturbation);
            }
        }
    }

    /// Creates a child whose every parameter is the mean of its parents'.
    ///
    /// # Panics
    ///
    /// Panics if the parents have different hidden sizes.
    ///
    /// # Example
    ///
    /// ```
    /// use flapnet_network::Controller;
    ///
    /// let a = Controller::from_parts(vec![[1.0, 2.0, 3.0]], vec![0.0], vec![1.0], 0.5).unwrap();
    /// let b = Controller::from_parts(vec![[3.0, 2.0, 1.0]], vec![1.0], vec![-1.0], 0.5).unwrap();
    /// let child = Controller::crossover(&a, &b);
    /// assert_eq!(child.w1(), &[[2.0, 2.0, 2.0]]);
    /// assert_eq!(child.b1(), &[0.5]);
    /// assert_eq!(child.w2(), &[0.0]);
    /// assert_eq!(child.b2(), 0.5);
    /// ```
    #[must_use]
    pub fn crossover(a: &Controller, b: &Controller) -> Controller {
        assert_eq!(
            a.hidden_size(),
            b.hidden_size(),
            "crossover requires equal hidden sizes"
        );
        let mut child = a.clone();
        for (c, p) in child.parameters_mut().zip(b.parameters()) {
            *c = (*c + p) / 2.0;
        }
        child
    }
}

impl Pilot for Controller {
    fn wants_flap(&self, sensors: &Sensors) -> bool {
        self.decide(sensors)
    }
}

impl TryFrom<ControllerModel> for Controller {
    type Error = ShapeError;

    fn try_from(model: ControllerModel) -> Result<Self, Self::Error> {
        model.into_controller()
    }
}

impl From<Controller> for ControllerModel {
    fn from(controller: Controller) -> Self {
        ControllerModel::from_controller(&controller)
    }
}
