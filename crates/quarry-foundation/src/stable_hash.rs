//! Process-independent hashing of expression digests.
//!
//! Digests are in-process keys. Plan caches that outlive the process need a
//! hash of them that does not depend on the platform or the std
//! `RandomState` seed, so [`DigestHasher`] implements 64-bit FNV-1a.
//!
//! NOTE: FNV-1a is **not** cryptographically secure.

const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0100_0000_01b3;

/// Incremental FNV-1a 64 hasher over digest text.
///
/// Feeding a digest in pieces gives the same key as feeding it whole, so a
/// composite key such as `<digest>:<type>` can be hashed without building
/// the joined string.
///
/// ```
/// # use quarry_foundation::DigestHasher;
/// let whole = DigestHasher::new().chain("$cor0.deptno").finish();
/// let parts = DigestHasher::new().chain("$cor0").chain(".").chain("deptno").finish();
/// assert_eq!(whole, parts);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestHasher {
    state: u64,
}

impl DigestHasher {
    pub const fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }

    /// Mix `text` into the hash.
    pub fn write_str(&mut self, text: &str) {
        for byte in text.bytes() {
            self.state = (self.state ^ u64::from(byte)).wrapping_mul(PRIME);
        }
    }

    /// Builder form of [`DigestHasher::write_str`].
    #[must_use]
    pub fn chain(mut self, text: &str) -> Self {
        self.write_str(text);
        self
    }

    pub const fn finish(&self) -> u64 {
        self.state
    }
}

impl Default for DigestHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable key of a single digest.
pub fn digest_hash(digest: &str) -> u64 {
    DigestHasher::new().chain(digest).finish()
}
