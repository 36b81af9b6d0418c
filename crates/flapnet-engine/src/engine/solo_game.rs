use crate::{Bird, FieldConfig, PipeStream, Seed, Sensors, collides, score_bird, sense};

/// Something that decides, from a bird's sensor readings, whether to flap.
pub trait Pilot {
    fn wants_flap(&self, sensors: &Sensors) -> bool;
}

impl<F> Pilot for F
where
    F: Fn(&Sensors) -> bool,
{
    fn wants_flap(&self, sensors: &Sensors) -> bool {
        self(sensors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameState {
    Playing,
    GameOver,
}

/// One bird playing against its own pipe stream.
///
/// Flaps come either from a queued external trigger ([`Self::flap`], e.g. a
/// key press) or from a [`Pilot`] passed to [`Self::tick_with`].
///
/// # Example
///
/// ```
/// use flapnet_engine::{FieldConfig, Seed, Sensors, SoloGame};
///
/// let mut game = SoloGame::new(FieldConfig::default(), Seed::from_u128(0));
/// // never flapping falls to the floor
/// let never = |_: &Sensors| false;
/// while game.state().is_playing() {
///     game.tick_with(&never);
/// }
/// assert_eq!(game.score(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SoloGame {
    field: FieldConfig,
    bird: Bird,
    stream: PipeStream,
    state: GameState,
    flap_requested: bool,
}

impl SoloGame {
    /// Creates a game whose pipe stream is driven by `seed`.
    ///
    /// # Panics
    ///
    /// `field` must pass [`FieldConfig::validate`]. Debug builds check this
    /// here; otherwise a zero spawn interval panics on the first tick.
    #[must_use]
    pub fn new(field: FieldConfig, seed: Seed) -> Self {
        debug_assert!(field.validate().is_ok(), "invalid field configuration");
        Self {
            bird: Bird::new(&field),
            stream: PipeStream::with_seed(seed),
            field,
            state: GameState::Playing,
            flap_requested: false,
        }
    }

    #[must_use]
    pub fn field(&self) -> &FieldConfig {
        &self.field
    }

    #[must_use]
    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    #[must_use]
    pub fn stream(&self) -> &PipeStream {
        &self.stream
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.bird.fitness()
    }

    /// Requests a flap on the next tick.
    pub fn flap(&mut self) {
        self.flap_requested = true;
    }

    /// Starts over with a fresh bird and a new stream.
    pub fn reset(&mut self, seed: Seed) {
        *self = Self::new(self.field.clone(), seed);
    }

    /// Advances one tick, flapping only if a flap was requested.
    pub fn tick(&mut self) {
        let flap = std::mem::take(&mut self.flap_requested);
        self.step(|_| flap);
    }

    /// Advances one tick, letting `pilot` decide whether to flap.
    ///
    /// A queued external flap is honoured as well.
    pub fn tick_with<P>(&mut self, pilot: &P)
    where
        P: Pilot + ?Sized,
    {
        let requested = std::mem::take(&mut self.flap_requested);
        self.step(|sensors| requested || pilot.wants_flap(sensors));
    }

    fn step<F>(&mut self, decide: F)
    where
        F: FnOnce(&Sensors) -> bool,
    {
        if self.state.is_game_over() {
            return;
        }
        self.stream.advance(&self.field);
        let sensors = sense(&self.bird, self.stream.pipes(), &self.field);
        self.bird.step(decide(&sensors), &self.field);
        if collides(&self.bird, self.stream.pipes(), &self.field) {
            self.bird.kill();
            self.state = GameState::GameOver;
            return;
        }
        score_bird(&mut self.bird, self.stream.pipes(), &self.field);
    }
}
