//! ETag generation.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of generated ETags.
pub const ETAG_LENGTH: usize = 20;

/// Generates random ETags of lowercase ASCII letters.
#[derive(Debug)]
pub struct EtagFactory {
    rng: Mutex<StdRng>,
}

impl Default for EtagFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EtagFactory {
    /// Creates a factory seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic factory.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Returns a fresh ETag.
    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock();
        (0..ETAG_LENGTH)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etags_are_lowercase_letters() {
        let factory = EtagFactory::new();
        let etag = factory.generate();
        assert_eq!(etag.len(), ETAG_LENGTH);
        assert!(etag.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn consecutive_etags_differ() {
        let factory = EtagFactory::new();
        assert_ne!(factory.generate(), factory.generate());
    }

    #[test]
    fn seeded_factories_repeat() {
        let a = EtagFactory::with_seed(7);
        let b = EtagFactory::with_seed(7);
        assert_eq!(a.generate(), b.generate());
    }
}
