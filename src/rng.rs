//! Process-wide source of cryptographically secure random bytes.
//!
//! Used for key and IV generation and for ISO 10126 padding. The generator
//! is a ChaCha20 stream seeded from the operating system on first use.

use std::sync::{Mutex, OnceLock};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

static GENERATOR: OnceLock<Mutex<ChaCha20Rng>> = OnceLock::new();

fn generator() -> &'static Mutex<ChaCha20Rng> {
    GENERATOR.get_or_init(|| {
        tracing::debug!("seeding process random generator");
        Mutex::new(ChaCha20Rng::from_entropy())
    })
}

/// Fills `dest` with random bytes.
pub fn fill_random(dest: &mut [u8]) {
    // fill_bytes cannot leave the generator half-updated; poisoning is harmless.
    let mut rng = match generator().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    rng.fill_bytes(dest);
}

/// Returns `len` fresh random bytes.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_differ() {
        let a = random_bytes(32);
        let b = random_bytes(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn usable_from_many_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| random_bytes(16)))
            .collect();
        let draws: Vec<Vec<u8>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for (i, a) in draws.iter().enumerate() {
            for b in &draws[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
