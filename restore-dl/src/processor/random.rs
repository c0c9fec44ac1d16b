//! Injectable sources of randomness.

use crate::common::*;

/// The randomness the pipeline draws its crop and augmentation choices from.
pub trait RandomSource
where
    Self: Debug + Send,
{
    /// Draw an integer uniformly from `low..=high`.
    fn uniform_int(&mut self, low: usize, high: usize) -> usize;

    /// Draw a float uniformly from `[0, 1)`.
    fn uniform_unit(&mut self) -> f64;
}

/// The production random source backed by [StdRng].
#[derive(Debug, Clone)]
pub struct EntropySource {
    rng: StdRng,
}

impl EntropySource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropySource {
    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    fn uniform_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays fixed scripts of draws, cycling when a script runs out.
///
/// Integer draws outside the requested range are clamped into it. An empty
/// script yields the lower bound and `0.0` respectively.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    ints: Vec<usize>,
    units: Vec<f64>,
    int_cursor: usize,
    unit_cursor: usize,
}

impl ScriptedSource {
    pub fn new(ints: Vec<usize>, units: Vec<f64>) -> Self {
        Self {
            ints,
            units,
            int_cursor: 0,
            unit_cursor: 0,
        }
    }

    /// Rewind both scripts to their beginning.
    pub fn rewind(&mut self) {
        self.int_cursor = 0;
        self.unit_cursor = 0;
    }
}

impl RandomSource for ScriptedSource {
    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        if self.ints.is_empty() {
            return low;
        }
        let value = self.ints[self.int_cursor % self.ints.len()];
        self.int_cursor += 1;
        value.max(low).min(high)
    }

    fn uniform_unit(&mut self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        let value = self.units[self.unit_cursor % self.units.len()];
        self.unit_cursor += 1;
        value
    }
}
