use flapnet_engine::SENSOR_COUNT;
use serde::{Deserialize, Serialize};

use crate::Controller;

/// Layout version written by [`ControllerModel::from_controller`].
pub const MODEL_VERSION: u32 = 1;

/// Serialized form of a [`Controller`].
///
/// ```json
/// {"version": 1, "hidden": 2, "w1": [[..], [..]], "b1": [..], "w2": [..], "b2": 0.0}
/// ```
///
/// Files written before the layout was versioned omit `version`, and may omit
/// `hidden`; both are accepted. A missing `hidden` is taken from the number
/// of `w1` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<usize>,
    pub w1: Vec<Vec<f32>>,
    pub b1: Vec<f32>,
    pub w2: Vec<f32>,
    pub b2: f32,
}

/// Reasons a set of parameters does not form a valid [`Controller`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("unsupported model version {_0}")]
    UnsupportedVersion(#[error(not(source))] u32),
    #[display("hidden layer must not be empty")]
    EmptyHiddenLayer,
    #[display("{name} has {actual} entries, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("w1 row {row} has {width} inputs, expected {}", SENSOR_COUNT)]
    InputWidth { row: usize, width: usize },
    #[display("parameters must be finite")]
    NonFinite,
}

impl ControllerModel {
    #[must_use]
    pub fn from_controller(controller: &Controller) -> Self {
        Self {
            version: Some(MODEL_VERSION),
            hidden: Some(controller.hidden_size()),
            w1: controller.w1().iter().map(|row| row.to_vec()).collect(),
            b1: controller.b1().to_vec(),
            w2: controller.w2().to_vec(),
            b2: controller.b2(),
        }
    }

    /// Validates the layout and converts it into a [`Controller`].
    pub fn into_controller(self) -> Result<Controller, ShapeError> {
        if let Some(version) = self.version
            && version > MODEL_VERSION
        {
            return Err(ShapeError::UnsupportedVersion(version));
        }
        if let Some(hidden) = self.hidden
            && hidden != self.w1.len()
        {
            return Err(ShapeError::LengthMismatch {
                name: "w1",
                expected: hidden,
                actual: self.w1.len(),
            });
        }
        let w1 = self
            .w1
            .into_iter()
            .enumerate()
            .map(|(row, weights)| {
                <[f32; SENSOR_COUNT]>::try_from(weights.as_slice()).map_err(|_| {
                    ShapeError::InputWidth {
                        row,
                        width: weights.len(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Controller::from_parts(w1, self.b1, self.w2, self.b2)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_writes_versioned_layout() {
        let c = Controller::from_parts(vec![[1.0, 2.0, 3.0]], vec![0.5], vec![-1.0], 0.25).unwrap();
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "version": 1,
                "hidden": 1,
                "w1": [[1.0, 2.0, 3.0]],
                "b1": [0.5],
                "w2": [-1.0],
                "b2": 0.25,
            })
        );
    }

    #[test]
    fn test_reads_legacy_layout() {
        let json = r#"{"w1": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]], "b1": [0.0, 0.0],
                       "w2": [1.0, -1.0], "b2": 0.0, "hidden": 2}"#;
        let c: Controller = serde_json::from_str(json).unwrap();
        assert_eq!(c.hidden_size(), 2);
        assert_eq!(c.w1()[1], [0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_reads_legacy_layout_without_hidden() {
        let json = r#"{"w1": [[0.1, 0.2, 0.3]], "b1": [0.0], "w2": [1.0], "b2": 0.0}"#;
        let c: Controller = serde_json::from_str(json).unwrap();
        assert_eq!(c.hidden_size(), 1);
    }

    #[test]
    fn test_rejects_hidden_mismatch() {
        let model = ControllerModel {
            version: None,
            hidden: Some(6),
            w1: vec![vec![0.0; 3]; 2],
            b1: vec![0.0; 2],
            w2: vec![0.0; 2],
            b2: 0.0,
        };
        assert_eq!(
            model.into_controller(),
            Err(ShapeError::LengthMismatch {
                name: "w1",
                expected: 6,
                actual: 2
            })
        );
    }

    #[test]
    fn test_rejects_wrong_input_width() {
        let json = r#"{"w1": [[0.1, 0.2, 0.3], [0.1, 0.2]], "b1": [0.0, 0.0], "w2": [1.0, 1.0], "b2": 0.0}"#;
        let err = serde_json::from_str::<Controller>(json).unwrap_err();
        assert!(err.to_string().contains("w1 row 1 has 2 inputs"), "{err}");
    }

    #[test]
    fn test_rejects_future_version() {
        let mut model = ControllerModel::from_controller(&Controller::random(
            3,
            &mut Pcg32::seed_from_u64(1),
        ));
        model.version = Some(MODEL_VERSION + 1);
        assert_eq!(
            model.into_controller(),
            Err(ShapeError::UnsupportedVersion(MODEL_VERSION + 1))
        );
    }

    #[test]
    fn test_model_roundtrip_is_exact() {
        let c = Controller::random(8, &mut Pcg32::seed_from_u64(7));
        let restored = ControllerModel::from_controller(&c)
            .into_controller()
            .unwrap();
        assert_eq!(restored, c);
    }
}
