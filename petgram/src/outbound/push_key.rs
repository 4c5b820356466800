//! Chronologically ordered child keys.
//!
//! A key is 20 characters: 8 encoding the millisecond timestamp followed by
//! 12 random characters, all drawn from a 64-character alphabet whose ASCII
//! order matches its numeric order. Keys minted in the same millisecond
//! reuse the random tail incremented by one, so one generator always hands
//! out strictly increasing keys.

use std::sync::{Arc, Mutex};

use mockable::Clock;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const PUSH_ALPHABET: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";
const TIMESTAMP_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;
const ALPHABET_MAX: u8 = 63;

/// Generates push keys from an injected clock.
pub struct PushKeyGenerator {
    clock: Arc<dyn Clock>,
    state: Mutex<PushKeyState>,
}

struct PushKeyState {
    last_millis: u64,
    tail: [u8; RANDOM_CHARS],
    rng: SmallRng,
}

impl PushKeyGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(clock, SmallRng::from_entropy())
    }

    /// Generator with a fixed random seed, for reproducible keys.
    pub fn seeded(clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(clock, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(clock: Arc<dyn Clock>, rng: SmallRng) -> Self {
        Self {
            clock,
            state: Mutex::new(PushKeyState {
                last_millis: 0,
                tail: [0; RANDOM_CHARS],
                rng,
            }),
        }
    }

    /// Mint the next key.
    pub fn next_key(&self) -> String {
        let now = u64::try_from(self.clock.utc().timestamp_millis()).unwrap_or(0);
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // A clock that steps backwards keeps the previous millisecond.
        if now > state.last_millis {
            state.last_millis = now;
            state.refill();
        } else if !state.increment_tail() {
            state.last_millis += 1;
            state.refill();
        }

        encode(state.last_millis, &state.tail)
    }
}

impl PushKeyState {
    fn refill(&mut self) {
        for digit in &mut self.tail {
            *digit = self.rng.gen_range(0..=ALPHABET_MAX);
        }
    }

    /// Add one to the tail. Returns `false` when every digit overflowed.
    fn increment_tail(&mut self) -> bool {
        for digit in self.tail.iter_mut().rev() {
            if *digit < ALPHABET_MAX {
                *digit += 1;
                return true;
            }
            *digit = 0;
        }
        false
    }
}

fn encode(millis: u64, tail: &[u8; RANDOM_CHARS]) -> String {
    let mut timestamp = [0_u8; TIMESTAMP_CHARS];
    let mut remaining = millis;
    for slot in timestamp.iter_mut().rev() {
        *slot = (remaining % 64) as u8;
        remaining /= 64;
    }

    timestamp
        .iter()
        .chain(tail.iter())
        .map(|digit| char::from(PUSH_ALPHABET[usize::from(*digit)]))
        .collect()
}
