//! Uniform draws and per-trial random streams.

use tinyrand::{Rand, Seeded, Wyrand};

/// A uniformly distributed value in `[0, 1]`.
#[inline]
pub fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

/// A weighted coin that lands `true` with probability `p`.
#[inline]
pub fn coin(p: f64, rand: &mut impl Rand) -> bool {
    random_f64(rand) < p
}

/// An independent random stream for the given trial. Streams depend only on `(seed, trial)`,
/// never on which worker runs the trial.
pub fn trial_rand(seed: u64, trial: u64) -> Wyrand {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    Wyrand::seed(seed ^ trial.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA))
}
