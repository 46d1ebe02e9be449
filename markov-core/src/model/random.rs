use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Source of uniform random integers used to pick suffixes.
///
/// Generation takes the source explicitly so callers can seed it, or swap
/// it for a scripted sequence in tests.
pub trait RandomSource {
	/// Returns a uniformly distributed integer in `[0, bound)`.
	///
	/// `bound` is always strictly positive.
	fn below(&mut self, bound: u64) -> u64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
	fn below(&mut self, bound: u64) -> u64 {
		(**self).below(bound)
	}
}

/// Adapts any `rand` generator to a `RandomSource`.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
	/// Reproducible source: the same seed always yields the same sequence.
	pub fn seeded(seed: u64) -> Self {
		Self(StdRng::seed_from_u64(seed))
	}
}

impl RngSource<ThreadRng> {
	/// Source backed by the thread-local generator.
	pub fn thread() -> Self {
		Self(rand::rng())
	}
}

impl<R: Rng> RandomSource for RngSource<R> {
	fn below(&mut self, bound: u64) -> u64 {
		self.0.random_range(0..bound)
	}
}
