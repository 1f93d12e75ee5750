/*!
 * Random Source
 * Uniform integers for fork and overheat rolls, seeded for reproducible runs
 */

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Uniform integer source used by the scheduling policies
pub trait RandomSource: Send {
    /// Uniform integer in `low..=high`
    fn int_in(&mut self, low: u32, high: u32) -> u32;

    /// True with probability `percent`/100
    fn roll_percent(&mut self, percent: u32) -> bool {
        percent > 0 && self.int_in(1, 100) <= percent
    }

    /// True with probability `permille`/1000
    fn roll_permille(&mut self, permille: u32) -> bool {
        permille > 0 && self.int_in(1, 1000) <= permille
    }
}

/// ChaCha8-backed source; identical seeds give identical simulations
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn int_in(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Replays a fixed sequence, then repeats a fallback value.
/// Used to force specific fork/overheat outcomes.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = u32>, fallback: u32) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback,
        }
    }

    /// Every roll fails
    pub fn never() -> Self {
        Self::new([], u32::MAX)
    }

    /// Every roll succeeds
    pub fn always() -> Self {
        Self::new([], 0)
    }
}

impl RandomSource for ScriptedRandom {
    fn int_in(&mut self, low: u32, high: u32) -> u32 {
        self.values
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(low, high.max(low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        let xs: Vec<u32> = (0..32).map(|_| a.int_in(1, 100)).collect();
        let ys: Vec<u32> = (0..32).map(|_| b.int_in(1, 100)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|x| (1..=100).contains(x)));
    }

    #[test]
    fn test_scripted_rolls() {
        assert!(!ScriptedRandom::never().roll_percent(99));
        assert!(ScriptedRandom::always().roll_percent(1));
        assert!(!ScriptedRandom::always().roll_percent(0));

        let mut scripted = ScriptedRandom::new([50, 51], u32::MAX);
        assert!(scripted.roll_percent(50));
        assert!(!scripted.roll_percent(50));
    }
}
