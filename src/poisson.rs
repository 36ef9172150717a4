//! Poisson goal model: mass function and sampling.

use tinyrand::Rand;

use crate::factorial::Factorial;
use crate::random;

/// Upper bound on the goal counts enumerated by [`pmf`]-based calculations.
pub const MAX_GOALS: u8 = 30;

/// Highest scoring rate for which the mass beyond [`MAX_GOALS`] stays below 1e-4.
pub const MAX_RATE: f64 = 14.0;

#[inline]
pub fn univariate(k: u8, lambda: f64, factorial: &impl Factorial) -> f64 {
    lambda.powi(k as i32) * f64::exp(-lambda) / factorial.get(k)
}

/// Probabilities of `0..=max` events under a Poisson distribution with mean `lambda`.
pub fn pmf(lambda: f64, max: u8, factorial: &impl Factorial) -> Vec<f64> {
    (0..=max).map(|k| univariate(k, lambda, factorial)).collect()
}

/// Draws an event count from a Poisson distribution with mean `lambda` by inverting the CDF.
/// The mass function is advanced by recurrence, so no factorials are evaluated per draw. The
/// search is unbounded; it stops early only once the remaining mass has underflowed.
#[inline]
pub fn sample(lambda: f64, rand: &mut impl Rand) -> u16 {
    debug_assert!(lambda >= 0.0, "invalid lambda {lambda}");
    let random = random::random_f64(rand);
    let mut prob = f64::exp(-lambda);
    let mut cumulative = prob;
    let mut k = 0;
    while cumulative < random {
        k += 1;
        prob *= lambda / k as f64;
        if prob == 0.0 {
            break;
        }
        cumulative += prob;
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factorial::{Calculator, Lookup};
    use assert_float_eq::*;
    use tinyrand::{Seeded, Wyrand};

    #[test]
    pub fn test_univariate() {
        assert_float_relative_eq!(
            0.36787944117144233,
            univariate(0, 1.0, &Calculator)
        );
        assert_float_relative_eq!(
            0.36787944117144233,
            univariate(1, 1.0, &Calculator)
        );
        assert_float_relative_eq!(
            0.18393972058572117,
            univariate(2, 1.0, &Calculator)
        );
        assert_float_relative_eq!(
            0.0820849986238988,
            univariate(0, 2.5, &Calculator)
        );
        assert_float_relative_eq!(
            0.205212496559747,
            univariate(1, 2.5, &Calculator)
        );
        assert_float_relative_eq!(
            0.25651562069968376,
            univariate(2, 2.5, &Calculator)
        );
    }

    #[test]
    pub fn pmf_sums_to_one() {
        let probs = pmf(3.245, MAX_GOALS, &Lookup::default());
        assert_eq!(MAX_GOALS as usize + 1, probs.len());
        assert_float_absolute_eq!(1.0, probs.iter().sum::<f64>(), 1e-9);
    }

    #[test]
    pub fn sample_zero_lambda() {
        let mut rand = Wyrand::default();
        for _ in 0..100 {
            assert_eq!(0, sample(0.0, &mut rand));
        }
    }

    #[test]
    pub fn sample_mean_and_distribution() {
        const DRAWS: usize = 200_000;
        const LAMBDA: f64 = 2.95;
        let mut rand = Wyrand::seed(7);
        let mut freqs = [0usize; MAX_GOALS as usize + 1];
        let mut total = 0;
        for _ in 0..DRAWS {
            let goals = sample(LAMBDA, &mut rand);
            freqs[goals as usize] += 1;
            total += goals as usize;
        }
        let mean = total as f64 / DRAWS as f64;
        assert_float_absolute_eq!(LAMBDA, mean, 0.02);

        let expected = pmf(LAMBDA, MAX_GOALS, &Lookup::default());
        for k in 0..=6 {
            let observed = freqs[k] as f64 / DRAWS as f64;
            assert_float_absolute_eq!(expected[k], observed, 0.005);
        }
    }

    #[test]
    pub fn sample_beyond_max_goals_is_unbiased() {
        const DRAWS: usize = 20_000;
        const LAMBDA: f64 = 36.0;
        let mut rand = Wyrand::seed(11);
        let total: u64 = (0..DRAWS).map(|_| sample(LAMBDA, &mut rand) as u64).sum();
        let mean = total as f64 / DRAWS as f64;
        assert_float_absolute_eq!(LAMBDA, mean, 0.3);
    }

    #[test]
    pub fn tail_beyond_max_goals_is_negligible_at_max_rate() {
        let probs = pmf(MAX_RATE, MAX_GOALS, &Lookup::default());
        assert!(1.0 - probs.iter().sum::<f64>() < 1e-4);
    }
}
