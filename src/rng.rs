//! Deterministic random stream compatible with NumPy's legacy `RandomState`.
//!
//! The seeded branch is a port of the original 32-bit MT19937 variant
//! (Matsumoto & Nishimura 1998) as used by NumPy and therefore by
//! scikit-learn. Downstream tests assert exact sequence equality, so the
//! generator must not be swapped for a standard-library or ecosystem RNG.
//! The unseeded branch falls back to the system source, where
//! reproducibility is not required.

use crate::error::ClusterError;
use rand::rngs::ThreadRng;
use rand::Rng;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// 32-bit Mersenne Twister, bit-identical to NumPy's legacy generator.
pub struct Mt19937 {
    /// State vector of 624 32-bit words
    mt: [u32; N],
    /// Current index within the state vector
    index: usize,
}

impl Mt19937 {
    /// Seed the state with the standard linear-congruential recurrence.
    pub fn new(seed: u32) -> Self {
        let mut mt = [0u32; N];
        mt[0] = seed;
        for i in 1..N {
            let prev = mt[i - 1];
            mt[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self { mt, index: N }
    }

    /// Next 32-bit unsigned integer in `[0, 2^32)`.
    pub fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }

        let mut y = self.mt[self.index];
        self.index += 1;

        // Tempering, same shifts as NumPy's implementation
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;

        y
    }

    /// 53-bit precision float in `[0, 1)`, identical to NumPy's
    /// `random_sample`: upper 27 bits of one word, upper 26 of the next.
    pub fn next_f64(&mut self) -> f64 {
        let a = (self.next_u32() >> 5) as f64;
        let b = (self.next_u32() >> 6) as f64;
        (a * 67_108_864.0 + b) * (1.0 / 9_007_199_254_740_992.0)
    }

    /// Uniform integer in `[0, bound)` via rejection sampling against the
    /// threshold `(2^32 - bound) % bound`. A naive modulo would both bias
    /// the draw and desynchronize from the reference sequence after the
    /// first rejected word.
    fn next_bounded(&mut self, bound: u32) -> u32 {
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u32();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    fn twist(&mut self) {
        for i in 0..N {
            let x = (self.mt[i] & UPPER_MASK) | (self.mt[(i + 1) % N] & LOWER_MASK);
            let mut xa = x >> 1;
            if x & 1 != 0 {
                xa ^= MATRIX_A;
            }
            self.mt[i] = self.mt[(i + M) % N] ^ xa;
        }
        self.index = 0;
    }
}

enum Engine {
    Seeded(Mt19937),
    System(ThreadRng),
}

/// Deterministic random stream consumed by every stochastic routine.
///
/// Created per fit/restart; logically single-owner while in use. The
/// seeding strategy is chosen explicitly at creation time rather than
/// through process-wide mutable state, so independent fits stay
/// composable and testable in isolation.
///
/// # Example
///
/// ```
/// use spectral_kmeans_rs::RandomStream;
///
/// let mut a = RandomStream::new(Some(42));
/// let mut b = RandomStream::new(Some(42));
/// assert_eq!(a.next_f64(), b.next_f64());
/// ```
pub struct RandomStream {
    engine: Engine,
}

impl RandomStream {
    /// Create a stream. `Some(seed)` gives the reproducible MT19937
    /// sequence; `None` draws from the system source.
    pub fn new(seed: Option<u32>) -> Self {
        let engine = match seed {
            Some(s) => Engine::Seeded(Mt19937::new(s)),
            None => Engine::System(rand::thread_rng()),
        };
        Self { engine }
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        match &mut self.engine {
            Engine::Seeded(mt) => mt.next_f64(),
            Engine::System(rng) => rng.gen::<f64>(),
        }
    }

    /// Uniform integer in `[0, bound)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `bound` is zero.
    pub fn next_int(&mut self, bound: u32) -> Result<u32, ClusterError> {
        if bound == 0 {
            return Err(ClusterError::InvalidParameter(
                "bound must be a positive 32-bit integer".to_string(),
            ));
        }
        let value = match &mut self.engine {
            Engine::Seeded(mt) => mt.next_bounded(bound),
            Engine::System(rng) => rng.gen_range(0..bound),
        };
        Ok(value)
    }

    /// Whether this stream replays the reproducible MT19937 sequence.
    pub fn is_seeded(&self) -> bool {
        matches!(self.engine, Engine::Seeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mt19937_reference_words() {
        // First outputs of the reference C implementation seeded with 5489
        let mut mt = Mt19937::new(5489);
        let expected: [u32; 5] = [
            3_499_211_612,
            581_869_302,
            3_890_346_734,
            3_586_334_585,
            545_404_204,
        ];
        for &word in &expected {
            assert_eq!(mt.next_u32(), word);
        }
    }

    #[test]
    fn test_next_f64_matches_numpy_random_sample() {
        // np.random.RandomState(42).random_sample(3)
        let mut mt = Mt19937::new(42);
        assert_relative_eq!(mt.next_f64(), 0.3745401188473625, epsilon = 1e-15);
        assert_relative_eq!(mt.next_f64(), 0.9507143064099162, epsilon = 1e-15);
        assert_relative_eq!(mt.next_f64(), 0.7319939418114051, epsilon = 1e-15);
    }

    #[test]
    fn test_seeded_streams_replay() {
        let mut a = RandomStream::new(Some(1234));
        let mut b = RandomStream::new(Some(1234));

        for _ in 0..10 {
            assert_eq!(a.next_f64(), b.next_f64());
            assert_eq!(a.next_int(1000).unwrap(), b.next_int(1000).unwrap());
        }
    }

    #[test]
    fn test_distinct_seeds_diverge() {
        for &(s1, s2) in &[(0u32, 1u32), (42, 43), (7, 70_000), (1, u32::MAX)] {
            let mut a = RandomStream::new(Some(s1));
            let mut b = RandomStream::new(Some(s2));
            let draws_a: Vec<f64> = (0..3).map(|_| a.next_f64()).collect();
            let draws_b: Vec<f64> = (0..3).map(|_| b.next_f64()).collect();
            assert_ne!(draws_a, draws_b, "seeds {} and {} collided", s1, s2);
        }
    }

    #[test]
    fn test_next_int_stays_below_bound() {
        let mut stream = RandomStream::new(Some(99));
        for &bound in &[1u32, 2, 1000, 1 << 31] {
            for _ in 0..50 {
                assert!(stream.next_int(bound).unwrap() < bound);
            }
        }
    }

    #[test]
    fn test_next_int_bound_one_is_zero() {
        let mut stream = RandomStream::new(Some(3));
        for _ in 0..10 {
            assert_eq!(stream.next_int(1).unwrap(), 0);
        }
    }

    #[test]
    fn test_next_int_zero_bound_rejected() {
        let mut stream = RandomStream::new(Some(3));
        assert!(matches!(
            stream.next_int(0),
            Err(ClusterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unseeded_stream_in_range() {
        let mut stream = RandomStream::new(None);
        assert!(!stream.is_seeded());
        for _ in 0..20 {
            let f = stream.next_f64();
            assert!((0.0..1.0).contains(&f));
            assert!(stream.next_int(10).unwrap() < 10);
        }
    }
}
