//! Approximate membership filter fronting the exact store.
//!
//! A bloom filter over fingerprint digests: `insert` then `contains` is
//! always true (no false negatives), while a bounded fraction of genuinely
//! new keys may report as seen (false positives). The false-positive rate is
//! the accepted cost of skipping fitness computation for duplicates.

use crate::compute::individual::Fingerprint;

/// Space-bounded probabilistic set of fingerprints.
///
/// Probe indices are derived from the digest itself by double hashing, so
/// membership checks involve no further hashing work.
#[derive(Debug, Clone)]
pub struct DedupFilter {
    bits: Vec<u8>,
    num_probes: u32,
}

impl DedupFilter {
    /// Create a filter backed by `num_bytes * 8` bits with `num_probes` bit
    /// probes per key.
    pub fn new(num_bytes: usize, num_probes: u32) -> Self {
        Self {
            bits: vec![0; num_bytes],
            num_probes,
        }
    }

    fn probe_indices(&self, key: &Fingerprint) -> impl Iterator<Item = usize> + '_ {
        let bytes = key.as_bytes();
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..8]);
        let h1 = u64::from_be_bytes(word);
        word.copy_from_slice(&bytes[8..16]);
        // Odd stride so successive probes do not collapse onto one bit.
        let h2 = u64::from_be_bytes(word) | 1;

        let num_bits = (self.bits.len() * 8) as u64;
        (0..self.num_probes as u64)
            .map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % num_bits) as usize)
    }

    /// Record a fingerprint as seen.
    pub fn insert(&mut self, key: &Fingerprint) {
        let indices: Vec<usize> = self.probe_indices(key).collect();
        for index in indices {
            self.bits[index / 8] |= 1 << (index % 8);
        }
    }

    /// Whether the fingerprint was probably inserted before.
    ///
    /// A `false` answer is definitive; a `true` answer may be a false
    /// positive.
    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.probe_indices(key)
            .all(|index| self.bits[index / 8] & (1 << (index % 8)) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprints(n: i64) -> Vec<Fingerprint> {
        (0..n).map(|i| Fingerprint::of(&[i, i + 1, i + 2])).collect()
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = DedupFilter::new(125, 14);
        let keys = fingerprints(200);

        for key in &keys {
            filter.insert(key);
        }
        for key in &keys {
            assert!(filter.contains(key));
        }
    }

    #[test]
    fn test_fresh_filter_contains_nothing() {
        let filter = DedupFilter::new(125, 14);
        for key in fingerprints(50) {
            assert!(!filter.contains(&key));
        }
    }

    #[test]
    fn test_mostly_rejects_unseen_when_lightly_loaded() {
        let mut filter = DedupFilter::new(1024, 7);
        for key in fingerprints(20) {
            filter.insert(&key);
        }

        // With 20 keys in 8192 bits the false-positive rate is tiny; a
        // disjoint batch of 100 keys should be almost entirely absent.
        let hits = (1000..1100)
            .map(|i| Fingerprint::of(&[i, i * 2]))
            .filter(|key| filter.contains(key))
            .count();
        assert!(hits <= 2, "unexpected false-positive count: {hits}");
    }
}
