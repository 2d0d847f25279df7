use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform choices. Used for both pool picks and fire-time draws
/// so tests can swap in a deterministic source.
pub trait Chooser: Send {
    /// Index in `0..len`. `len` is always positive.
    fn choose(&mut self, len: usize) -> usize;
}

/// Non-cryptographic uniform randomness.
pub struct RandomChooser(StdRng);

impl RandomChooser {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for RandomChooser {
    fn choose(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Always takes the first option.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstAvailable;

impl Chooser for FirstAvailable {
    fn choose(&mut self, _len: usize) -> usize {
        0
    }
}

/// Always takes the last option.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastAvailable;

impl Chooser for LastAvailable {
    fn choose(&mut self, len: usize) -> usize {
        len - 1
    }
}
