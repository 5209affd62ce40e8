use rand::Rng;

/// The randomness an exercise generator is allowed to use.
pub trait RandomSource {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform integer in the closed range `min..=max`.
    fn int_in_range(&mut self, min: i64, max: i64) -> i64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn int_in_range(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        self.gen_range(min..=max)
    }
}

// Candidate lists are static and never empty, so an empty slice is a programming error.
pub fn select<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> &'a T {
    &items[rng.index(items.len())]
}

// Distinct picks in random order, partial Fisher-Yates over the indices.
pub fn select_many<'a, T>(rng: &mut dyn RandomSource, items: &'a [T], count: usize) -> Vec<&'a T> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    let count = count.min(items.len());

    for i in 0..count {
        let j = i + rng.index(indices.len() - i);
        indices.swap(i, j);
    }

    indices[..count].iter().map(|&i| &items[i]).collect()
}

pub fn round_to(value: i64, step: i64) -> i64 {
    if step <= 0 {
        return value;
    }
    (value / step) * step
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RandomSource;
    use std::collections::VecDeque;

    /// Replays a fixed script of picks. Indices wrap, ranges clamp.
    pub struct ScriptedRandom {
        picks: VecDeque<i64>,
    }

    impl ScriptedRandom {
        pub fn new(picks: &[i64]) -> Self {
            Self {
                picks: picks.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for ScriptedRandom {
        fn index(&mut self, len: usize) -> usize {
            let pick = self.picks.pop_front().unwrap_or(0);
            (pick.max(0) as usize) % len
        }

        fn int_in_range(&mut self, min: i64, max: i64) -> i64 {
            let pick = self.picks.pop_front().unwrap_or(min);
            pick.clamp(min, max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedRandom;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn int_in_range_is_inclusive() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..500 {
            let v = rng.int_in_range(1, 3);
            assert!((1..=3).contains(&v));
            seen_min |= v == 1;
            seen_max |= v == 3;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn int_in_range_degenerate() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(rng.int_in_range(5, 5), 5);
        assert_eq!(rng.int_in_range(9, 2), 9);
    }

    #[test]
    fn select_uses_index() {
        let mut rng = ScriptedRandom::new(&[2]);
        assert_eq!(*select(&mut rng, &["a", "b", "c"]), "c");
    }

    #[test]
    fn select_many_is_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = ["a", "b", "c", "d", "e"];
        for _ in 0..50 {
            let picked = select_many(&mut rng, &items, 3);
            assert_eq!(picked.len(), 3);
            let mut sorted = picked.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), 3);
        }
    }

    #[test]
    fn select_many_caps_at_len() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(select_many(&mut rng, &[1, 2], 5).len(), 2);
    }

    #[test]
    fn round_to_step() {
        assert_eq!(round_to(12345, 1000), 12000);
        assert_eq!(round_to(999, 0), 999);
    }
}
