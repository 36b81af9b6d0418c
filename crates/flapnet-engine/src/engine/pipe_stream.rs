use rand::Rng as _;
use rand_pcg::Pcg32;

use crate::{FieldConfig, Pipe, PipeId, Seed};

/// The obstacle stream shared by every bird of a run.
///
/// Pipes spawn at the right edge of the field every
/// [`spawn_interval_ticks`](FieldConfig::spawn_interval_ticks) ticks (the first
/// one after a full interval has elapsed), scroll left at constant speed and
/// are pruned once fully off screen.
///
/// The stream is driven by its own [`Seed`], so two streams created from the
/// same seed and advanced with the same configuration produce identical pipes.
/// The stream is advanced exactly once per tick, independently of how many
/// birds are still alive.
///
/// # Example
///
/// ```
/// use flapnet_engine::{FieldConfig, PipeStream, Seed};
///
/// let field = FieldConfig::default();
/// let mut stream = PipeStream::with_seed(Seed::from_u128(1));
/// for _ in 0..field.spawn_interval_ticks {
///     stream.advance(&field);
/// }
/// assert_eq!(stream.pipes().len(), 1);
/// assert_eq!(stream.pipes()[0].x(), field.width - field.pipe_speed);
/// ```
#[derive(Debug, Clone)]
pub struct PipeStream {
    seed: Seed,
    rng: Pcg32,
    pipes: Vec<Pipe>,
    tick: u64,
    next_id: PipeId,
}

impl PipeStream {
    #[must_use]
    pub fn with_seed(seed: Seed) -> Self {
        Self {
            seed,
            rng: seed.rng(),
            pipes: vec![],
            tick: 0,
            next_id: PipeId(0),
        }
    }

    /// Seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Live pipes, ordered by spawn time (leftmost first).
    #[must_use]
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub(crate) fn pipes_mut(&mut self) -> &mut [Pipe] {
        &mut self.pipes
    }

    /// Number of ticks the stream has been advanced.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Total number of pipes spawned so far.
    #[must_use]
    pub fn spawned(&self) -> u64 {
        self.next_id.0
    }

    /// Advances the stream by one tick: spawn if due, move, prune.
    ///
    /// # Panics
    ///
    /// Panics if `field.spawn_interval_ticks` is zero or the gap center range
    /// is empty; [`FieldConfig::validate`] rejects both.
    pub fn advance(&mut self, field: &FieldConfig) {
        self.tick += 1;
        if self.tick % u64::from(field.spawn_interval_ticks) == 0 {
            self.spawn(field);
        }
        for pipe in &mut self.pipes {
            pipe.advance(field);
        }
        self.pipes.retain(|pipe| !pipe.is_off_screen(field));
    }

    #[expect(clippy::cast_precision_loss)]
    fn spawn(&mut self, field: &FieldConfig) {
        let gap_y = self
            .rng
            .random_range(field.gap_center_min..=field.gap_center_max);
        let pipe = Pipe::new(self.next_id, field.width, gap_y as f32);
        self.next_id = self.next_id.next();
        self.pipes.push(pipe);
    }
}
