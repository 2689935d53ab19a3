//! Live random source

use chorus_application::ports::random::RandomSource;
use rand::Rng;

/// Thread-local RNG behind the `RandomSource` port
#[derive(Debug, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn roll(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }

    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}
