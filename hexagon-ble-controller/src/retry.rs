//! Connect retry policy

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `step * attempt`
    Linear(Duration),
    /// `initial * 2^(attempt - 1)`, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay after the given failed attempt (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(d) => d,
            Backoff::Linear(step) => step.saturating_mul(attempt),
            Backoff::Exponential { initial, max } => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                initial.saturating_mul(factor).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    /// Five attempts, 0.7s more wait after each failure
    fn default() -> Self {
        Self::new(4, Backoff::Linear(Duration::from_millis(700)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays() {
        let ms = Duration::from_millis;

        assert_eq!(Backoff::Fixed(ms(100)).delay(3), ms(100));
        assert_eq!(Backoff::Linear(ms(700)).delay(1), ms(700));
        assert_eq!(Backoff::Linear(ms(700)).delay(3), ms(2100));

        let exp = Backoff::Exponential {
            initial: ms(100),
            max: ms(1000),
        };
        assert_eq!(exp.delay(1), ms(100));
        assert_eq!(exp.delay(2), ms(200));
        assert_eq!(exp.delay(4), ms(800));
        assert_eq!(exp.delay(5), ms(1000));
        assert_eq!(exp.delay(40), ms(1000));
    }

    #[test]
    fn attempts_include_first_try() {
        assert_eq!(RetryPolicy::default().attempts(), 5);
        assert_eq!(RetryPolicy::new(2, Backoff::Fixed(Duration::ZERO)).attempts(), 3);
    }
}
