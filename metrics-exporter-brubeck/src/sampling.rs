//! Sampling decisions and count rescaling.

use std::cell::RefCell;

use rand::{Rng as _, SeedableRng as _};
use rand_xoshiro::Xoshiro256StarStar;

thread_local! {
    static FAST_RNG: RefCell<Xoshiro256StarStar> =
        RefCell::new(Xoshiro256StarStar::from_rng(&mut rand::rng()));
}

/// A source of uniformly distributed random values.
///
/// The client draws from this source both to decide whether a sampled metric should be emitted and to pick between the
/// floor and ceiling of a rescaled count. Implementations must be safe to share across threads, since a single client
/// is typically shared by the whole application.
pub trait RandomSource: Send + Sync {
    /// Returns the next uniformly distributed value in `[0, 1)`.
    fn next_f64(&self) -> f64;
}

/// The default random source.
///
/// Each thread lazily seeds its own `Xoshiro256**` generator from the thread RNG, so draws never contend on a lock
/// while still behaving as a single process-wide source.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadLocalRandom;

impl RandomSource for ThreadLocalRandom {
    fn next_f64(&self) -> f64 {
        FAST_RNG.with(|rng| rng.borrow_mut().random::<f64>())
    }
}

/// Returns `true` if a metric observed at the given sample rate should be emitted.
///
/// Rates of `1.0` or greater always emit, and negative rates never do.
pub fn sampled(random: &dyn RandomSource, sample_rate: f64) -> bool {
    random.next_f64() <= sample_rate
}

/// Rescales a sampled count so that its expected value matches the unsampled count.
///
/// Dividing by the sample rate rarely yields a whole number, and always truncating would bias the metric low. Instead,
/// the ceiling is chosen with a probability equal to the fractional part, and the truncated value otherwise, which keeps
/// the long-run average equal to `count / sample_rate` exactly.
///
/// This performs its own random draw, independent of the one used by [`sampled`].
pub fn rescale_count(random: &dyn RandomSource, count: i64, sample_rate: f64) -> i64 {
    // A non-positive rate only passes `sampled` on an exact-zero draw; the count is then sent unscaled.
    if sample_rate >= 1.0 || sample_rate <= 0.0 {
        return count;
    }

    let ideal = count as f64 / sample_rate;
    let split_threshold = ideal % 1.0;
    if random.next_f64() >= split_threshold {
        ideal as i64
    } else {
        ideal.ceil() as i64
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use rand::{Rng as _, SeedableRng as _};
    use rand_xoshiro::Xoshiro256StarStar;

    use super::RandomSource;

    /// Replays a fixed sequence of draws, wrapping around when exhausted.
    pub struct ScriptedRandom {
        values: Vec<f64>,
        idx: AtomicUsize,
    }

    impl ScriptedRandom {
        pub fn new(values: &[f64]) -> Self {
            assert!(!values.is_empty(), "scripted random source needs at least one value");
            Self { values: values.to_vec(), idx: AtomicUsize::new(0) }
        }

        pub fn draws(&self) -> usize {
            self.idx.load(Ordering::Relaxed)
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_f64(&self) -> f64 {
            let idx = self.idx.fetch_add(1, Ordering::Relaxed);
            self.values[idx % self.values.len()]
        }
    }

    /// A deterministic, seeded random source.
    pub struct SeededRandom(Mutex<Xoshiro256StarStar>);

    impl SeededRandom {
        pub fn new(seed: u64) -> Self {
            Self(Mutex::new(Xoshiro256StarStar::seed_from_u64(seed)))
        }
    }

    impl RandomSource for SeededRandom {
        fn next_f64(&self) -> f64 {
            self.0.lock().unwrap().random::<f64>()
        }
    }
}
