use serde::{Deserialize, Serialize};

/// Geometry and physics constants of the playing field.
///
/// All distances are in pixels and all velocities in pixels per tick. The
/// origin is the top-left corner; `y` grows downwards, so a negative
/// [`flap_velocity`](Self::flap_velocity) moves the bird up.
///
/// A configuration is treated as immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Field width; pipes spawn at this x coordinate.
    pub width: f32,
    /// Field height; touching either vertical edge is fatal.
    pub height: f32,
    /// Fixed horizontal position of every bird.
    ///
    /// Must exceed [`pipe_speed`](Self::pipe_speed): a pipe counts as passed
    /// only while its trailing edge lies in `(0, bird_x)`, and a slower bird
    /// column would let pipes skip that window entirely.
    pub bird_x: f32,
    /// Half side length of the bird's square bounding box.
    pub bird_radius: f32,
    /// Downward acceleration applied every tick.
    pub gravity: f32,
    /// Vertical velocity set by a flap.
    pub flap_velocity: f32,
    /// Horizontal extent of a pipe.
    pub pipe_width: f32,
    /// Vertical size of the opening between the top and bottom blockers.
    pub pipe_gap: f32,
    /// Distance every pipe moves left per tick.
    pub pipe_speed: f32,
    /// Number of ticks between two pipe spawns.
    pub spawn_interval_ticks: u32,
    /// Smallest gap center a spawned pipe may get (inclusive).
    pub gap_center_min: u32,
    /// Largest gap center a spawned pipe may get (inclusive).
    pub gap_center_max: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            bird_x: 80.0,
            bird_radius: 10.0,
            gravity: 0.5,
            flap_velocity: -8.0,
            pipe_width: 70.0,
            pipe_gap: 150.0,
            pipe_speed: 3.0,
            spawn_interval_ticks: 90,
            gap_center_min: 100,
            gap_center_max: 400,
        }
    }
}

/// Reasons a [`FieldConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum FieldConfigError {
    #[display("field dimensions must be positive (got {width}x{height})")]
    NonPositiveDimensions { width: f32, height: f32 },
    #[display("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[display("spawn interval must be at least one tick")]
    ZeroSpawnInterval,
    #[display("gap center range {min}..={max} is empty")]
    EmptyGapRange { min: u32, max: u32 },
    #[display("bird x {bird_x} lies outside the field width {width}")]
    BirdOutsideField { bird_x: f32, width: f32 },
    #[display("bird x {bird_x} must exceed the pipe speed {pipe_speed}")]
    BirdBehindPipeStep { bird_x: f32, pipe_speed: f32 },
}

impl FieldConfig {
    /// Checks that the configuration describes a playable field.
    pub fn validate(&self) -> Result<(), FieldConfigError> {
        if !(is_positive(self.width) && is_positive(self.height)) {
            return Err(FieldConfigError::NonPositiveDimensions {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("bird radius", self.bird_radius),
            ("pipe width", self.pipe_width),
            ("pipe gap", self.pipe_gap),
            ("pipe speed", self.pipe_speed),
        ] {
            if !is_positive(value) {
                return Err(FieldConfigError::NonPositive { name, value });
            }
        }
        if self.spawn_interval_ticks == 0 {
            return Err(FieldConfigError::ZeroSpawnInterval);
        }
        if self.gap_center_min > self.gap_center_max {
            return Err(FieldConfigError::EmptyGapRange {
                min: self.gap_center_min,
                max: self.gap_center_max,
            });
        }
        if !(0.0..self.width).contains(&self.bird_x) {
            return Err(FieldConfigError::BirdOutsideField {
                bird_x: self.bird_x,
                width: self.width,
            });
        }
        if self.bird_x <= self.pipe_speed {
            return Err(FieldConfigError::BirdBehindPipeStep {
                bird_x: self.bird_x,
                pipe_speed: self.pipe_speed,
            });
        }
        Ok(())
    }

    /// Vertical spawn position of a fresh bird.
    #[must_use]
    pub fn bird_start_y(&self) -> f32 {
        (self.height / 2.0).floor()
    }
}

// NaN counts as non-positive.
fn is_positive(value: f32) -> bool {
    value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(FieldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_gap_range() {
        let config = FieldConfig {
            gap_center_min: 300,
            gap_center_max: 200,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::EmptyGapRange { min: 300, max: 200 })
        );
    }

    #[test]
    fn test_rejects_zero_speed() {
        let config = FieldConfig {
            pipe_speed: 0.0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FieldConfigError::NonPositive {
                name: "pipe speed",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bird_within_one_pipe_step() {
        let config = FieldConfig {
            bird_x: 2.0,
            pipe_speed: 3.0,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::BirdBehindPipeStep {
                bird_x: 2.0,
                pipe_speed: 3.0
            })
        );
        let config = FieldConfig {
            bird_x: 3.0,
            pipe_speed: 3.0,
            ..FieldConfig::default()
        };
        assert!(config.validate().is_err());
        let config = FieldConfig {
            bird_x: 3.5,
            pipe_speed: 3.0,
            ..FieldConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FieldConfig = serde_json::from_str(r#"{"pipe_gap": 180.0}"#).unwrap();
        assert_eq!(config.pipe_gap, 180.0);
        assert_eq!(config.width, 400.0);
        assert_eq!(config.bird_start_y(), 300.0);
    }
}
