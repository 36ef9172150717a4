//! Factorials for evaluating the Poisson mass function over goal counts.

pub trait Factorial {
    fn get(&self, n: u8) -> f64;
}

#[derive(Default)]
pub struct Calculator;

impl Factorial for Calculator {
    #[inline]
    fn get(&self, n: u8) -> f64 {
        assert!(n as usize <= MAX_N, "{n}! overflows");
        (2..=n).fold(1.0, |product, i| product * i as f64)
    }
}

/// Largest `n` for which `n!` is finite in an `f64`.
pub const MAX_N: usize = 170;

/// Precomputed factorials in the range `0..=MAX_N`.
pub struct Lookup {
    entries: Box<[f64; MAX_N + 1]>,
}
impl Factorial for Lookup {
    #[inline]
    fn get(&self, n: u8) -> f64 {
        self.entries[n as usize]
    }
}

impl Default for Lookup {
    fn default() -> Self {
        let mut entries = Box::new([1.0; MAX_N + 1]);
        for i in 2..=MAX_N {
            entries[i] = i as f64 * entries[i - 1];
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    #[test]
    pub fn calculator() {
        test_impl(Calculator);
    }

    #[test]
    pub fn lookup() {
        test_impl(Lookup::default());
    }

    fn test_impl(f: impl Factorial) {
        assert_eq!(1.0, f.get(0));
        assert_eq!(1.0, f.get(1));
        assert_eq!(2.0, f.get(2));
        assert_eq!(6.0, f.get(3));
        assert_eq!(24.0, f.get(4));
        assert_eq!(3_628_800.0, f.get(10));
        assert_float_relative_eq!(2.432902008176640e18, f.get(20));
    }

    #[test]
    pub fn lookup_matches_calculator() {
        let lookup = Lookup::default();
        for n in [0, 5, 34, 100, 170] {
            assert_float_relative_eq!(Calculator.get(n), lookup.get(n));
        }
    }
}
