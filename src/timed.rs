//! Timing of computations.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub struct Timed<V> {
    pub value: V,
    pub elapsed: Duration,
}
impl<V> Timed<V> {
    pub fn result<E>(f: impl FnOnce() -> Result<V, E>) -> Result<Timed<V>, E> {
        let start_time = Instant::now();
        f().map(|value| Timed {
            value,
            elapsed: start_time.elapsed(),
        })
    }

    /// Throughput of `count` units of work over the elapsed time, per second.
    pub fn rate(&self, count: u64) -> f64 {
        count as f64 / self.elapsed.as_secs_f64().max(f64::MIN_POSITIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_errors() {
        let timed = Timed::<()>::result(|| Err("failed"));
        assert_eq!(Err("failed"), timed);
    }

    #[test]
    fn captures_value() {
        let timed = Timed::result(|| Ok::<_, ()>(42)).unwrap();
        assert_eq!(42, timed.value);
        assert!(timed.rate(1_000) > 0.0);
    }
}
