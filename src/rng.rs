use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;
const WARMUP_ROUNDS: usize = 10;

/// 64-bit linear congruential generator used for terrain.
///
/// The exact sequence is part of the world format: the same seed must yield
/// the same map on every platform, so every step is wrapping `u64` arithmetic.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: i64) -> Self {
        let mut rng = Self { state: seed as u64 };
        for _ in 0..WARMUP_ROUNDS {
            rng.next_uint();
        }
        rng
    }

    pub fn next_uint(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    /// `lower + next mod (upper - lower)`. Returns `lower` for an empty span.
    pub fn int_in_range(&mut self, lower: i64, upper_exclusive: i64) -> i64 {
        let span = upper_exclusive.wrapping_sub(lower) as u64;
        if span == 0 {
            return lower;
        }
        lower.wrapping_add((self.next_uint() % span) as i64)
    }

    pub fn int_in_closed_range(&mut self, lower: i64, upper_inclusive: i64) -> i64 {
        let span = upper_inclusive.wrapping_sub(lower).wrapping_add(1) as u64;
        if span == 0 {
            return lower;
        }
        lower.wrapping_add((self.next_uint() % span) as i64)
    }

    pub fn double_in_range(&mut self, lower: f64, upper: f64) -> f64 {
        let unit = self.next_uint() as f64 / 18_446_744_073_709_551_616.0;
        lower + unit * (upper - lower)
    }
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        (self.next_uint() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_uint()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_uint().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

const TICK_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for streams continued at `tick`. Tick zero keeps the base seed, so a
/// fresh game and a game resumed at its start draw the same values.
pub fn seed_at_tick(base: u64, tick: u64) -> u64 {
    base ^ tick.wrapping_mul(TICK_MIX)
}

/// Named ChaCha streams derived from one master seed.
///
/// Each stream is created lazily on first use, so adding a new stream does
/// not perturb the draws of existing ones as long as names are requested in
/// the same order.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let master = &mut self.master;
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        });
        SystemRng { inner: entry }
    }
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
