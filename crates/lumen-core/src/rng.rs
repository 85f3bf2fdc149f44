//! Deterministic random sources
//!
//! The engine never owns a generator of its own choosing. It draws from
//! anything implementing [`RandomSource`] and, at phrase boundaries, asks a
//! [`SeededRandom`] type for a fresh stream keyed by a seed string.
//!
//! [`SeededRng`] is the reference implementation: xmur3 string hashing over
//! UTF-16 code units feeding a mulberry32 generator. Every step is 32-bit
//! wrapping arithmetic, so browser and native hosts given the same seed
//! string see the same stream.

use serde::{Deserialize, Serialize};

/// A stream of uniform values in [0, 1)
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// `true` with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Index into a list of `len` items: `floor(r * len) mod len`.
    ///
    /// `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        ((self.next_f64() * len as f64).floor() as usize) % len
    }
}

impl<F: FnMut() -> f64> RandomSource for F {
    fn next_f64(&mut self) -> f64 {
        self()
    }
}

/// A random source that can be (re)created from seed material
pub trait SeededRandom: RandomSource + Sized {
    fn from_seed(seed: &str) -> Self;
}

/// mulberry32 seeded through xmur3
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: &str) -> Self {
        Self { state: xmur3(seed) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

impl SeededRandom for SeededRng {
    fn from_seed(seed: &str) -> Self {
        Self::new(seed)
    }
}

/// xmur3 hash, first output only
fn xmur3(seed: &str) -> u32 {
    let units: Vec<u16> = seed.encode_utf16().collect();
    let mut h = 1_779_033_703u32 ^ units.len() as u32;
    for &unit in &units {
        h = (h ^ unit as u32).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// Time bucket used to derive shared seed material from the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedWindow {
    #[default]
    Hour,
    Day,
}

impl SeedWindow {
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Hour => 3_600.0,
            Self::Day => 86_400.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// Seed material for the bucket containing `unix_secs`, e.g. `"hour:493912"`
    pub fn material(&self, unix_secs: f64) -> String {
        let bucket = (unix_secs / self.seconds()).floor() as i64;
        format!("{}:{}", self.name(), bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SeededRng::new("test|phrase:7");
        let mut b = SeededRng::new("test|phrase:7");
        for _ in 0..500 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRng::new("test|phrase:7");
        let mut b = SeededRng::new("test|phrase:8");
        let va: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let vb: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        assert_ne!(va, vb);
    }

    #[test]
    fn values_in_unit_range() {
        let mut rng = SeededRng::new("range");
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn xmur3_counts_utf16_units() {
        // Same UTF-8 byte length, different UTF-16 lengths
        assert_ne!(xmur3("é"), xmur3("ab"));
        assert_eq!(xmur3(""), xmur3(""));
    }

    #[test]
    fn closures_are_sources() {
        let mut values = [0.25, 0.75].into_iter().cycle();
        let mut rng = move || values.next().unwrap();
        assert!(rng.chance(0.5));
        assert!(!rng.chance(0.5));
        assert_eq!(rng.pick_index(4), 1);
    }

    #[test]
    fn pick_index_never_overflows() {
        let mut almost_one = || 0.999_999_999_999;
        for len in 1..50 {
            assert!(almost_one.pick_index(len) < len);
        }
    }

    #[test]
    fn seed_window_buckets() {
        assert_eq!(SeedWindow::Hour.material(0.0), "hour:0");
        assert_eq!(SeedWindow::Hour.material(3_599.9), "hour:0");
        assert_eq!(SeedWindow::Hour.material(3_600.0), "hour:1");
        assert_eq!(SeedWindow::Day.material(86_400.0 * 3.5), "day:3");
    }
}
