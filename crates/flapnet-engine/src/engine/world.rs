use serde::{Deserialize, Serialize};

use crate::{Bird, FieldConfig, Pipe, PipeStream};

/// Number of values produced by [`sense`].
pub const SENSOR_COUNT: usize = 3;

/// Normalized sensor readings of one bird.
///
/// 0. Bird height (`y / height`)
/// 1. Vertical offset from the bird to the next gap center (`(gap_y - y) / height`)
/// 2. Horizontal distance to the next pipe (`(pipe.x - bird.x) / width`)
pub type Sensors = [f32; SENSOR_COUNT];

/// How passed pipes are credited when several birds share one stream.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// Every bird is credited once for every pipe it passes.
    #[default]
    PerAgent,
    /// A pipe carries a single shared `passed` flag: only the first live bird
    /// (in population order) to pass it is credited.
    SharedFirstCrossing,
}

/// Returns the next pipe ahead of the bird.
///
/// A pipe is ahead while its trailing edge is right of the bird. Among those,
/// the leftmost one wins.
#[must_use]
pub fn next_pipe<'a>(bird: &Bird, pipes: &'a [Pipe], field: &FieldConfig) -> Option<&'a Pipe> {
    pipes
        .iter()
        .filter(|pipe| pipe.trailing_x(field) > bird.x())
        .min_by(|a, b| a.x().total_cmp(&b.x()))
}

/// Computes the sensor readings the controller of `bird` sees.
///
/// Without a pipe ahead, both pipe-related readings are zero.
///
/// # Example
///
/// ```
/// use flapnet_engine::{Bird, FieldConfig, Pipe, PipeId, sense};
///
/// let field = FieldConfig::default();
/// let bird = Bird::at(80.0, 300.0);
/// assert_eq!(sense(&bird, &[], &field), [0.5, 0.0, 0.0]);
///
/// let pipe = Pipe::new(PipeId(0), 120.0, 240.0);
/// assert_eq!(sense(&bird, &[pipe], &field), [0.5, -0.1, 0.1]);
/// ```
#[must_use]
pub fn sense(bird: &Bird, pipes: &[Pipe], field: &FieldConfig) -> Sensors {
    let height = bird.y() / field.height;
    match next_pipe(bird, pipes, field) {
        None => [height, 0.0, 0.0],
        Some(pipe) => [
            height,
            (pipe.gap_y() - bird.y()) / field.height,
            (pipe.x() - bird.x()) / field.width,
        ],
    }
}

/// Returns `true` if the bird touches a field edge or overlaps any blocker.
#[must_use]
pub fn collides(bird: &Bird, pipes: &[Pipe], field: &FieldConfig) -> bool {
    let r = field.bird_radius;
    if bird.y() - r <= 0.0 || bird.y() + r >= field.height {
        return true;
    }
    let bounds = bird.bounds(field);
    pipes.iter().any(|pipe| {
        bounds.overlaps(&pipe.top_blocker(field)) || bounds.overlaps(&pipe.bottom_blocker(field))
    })
}

/// Returns `true` once the pipe's trailing edge is strictly left of the bird.
fn has_passed(bird: &Bird, pipe: &Pipe, field: &FieldConfig) -> bool {
    pipe.trailing_x(field) < bird.x()
}

/// Credits a single bird for every pipe it passed and was not credited for yet.
///
/// Dead birds are never credited. Returns the number of pipes credited.
pub fn score_bird(bird: &mut Bird, pipes: &[Pipe], field: &FieldConfig) -> u32 {
    if !bird.is_alive() {
        return 0;
    }
    let mut credited = 0;
    for pipe in pipes {
        if pipe.id() >= bird.next_unscored() && has_passed(bird, pipe, field) {
            bird.credit(pipe.id());
            credited += 1;
        }
    }
    credited
}

/// Credits every live bird for the pipes it passed this tick.
pub fn score_passed_pipes(
    birds: &mut [Bird],
    stream: &mut PipeStream,
    field: &FieldConfig,
    mode: ScoringMode,
) {
    match mode {
        ScoringMode::PerAgent => {
            for bird in birds {
                score_bird(bird, stream.pipes(), field);
            }
        }
        ScoringMode::SharedFirstCrossing => {
            let pipes = stream.pipes_mut();
            for bird in birds.iter_mut().filter(|bird| bird.is_alive()) {
                for pipe in pipes.iter_mut() {
                    if !pipe.passed() && has_passed(bird, pipe, field) {
                        pipe.mark_passed();
                        bird.credit_shared();
                    }
                }
            }
        }
    }
}
