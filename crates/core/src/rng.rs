//! RNG module - seeded deterministic randomness for board generation
//!
//! The same seed always yields the same board, which the tests and the
//! `new` CLI command rely on. The seed is scrambled with splitmix64 before
//! driving an xorshift64* stream, so nearby seeds still produce unrelated
//! boards.

/// Small xorshift64* generator.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
    seed: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        let mixed = splitmix64(seed);
        // xorshift never leaves the all-zero state
        let state = if mixed == 0 { 0x9E37_79B9_7F4A_7C15 } else { mixed };
        Self { state, seed }
    }

    /// Seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform-ish value in `[0, max)`. Returns 0 when `max` is 0.
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as usize
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
