//! Shard routing for distributed reification.
//!
//! The core engine is shard-agnostic: nothing in the population consults a
//! router. A distributed driver would wrap `reify` so each fingerprint is
//! admitted on the shard this module assigns it, with every shard owning a
//! disjoint fragment of the exact store plus its own approximate filter.

use std::collections::BTreeMap;

use sha2::{Digest, Sha224};

use crate::compute::individual::Fingerprint;

/// Maps fingerprints to shard identifiers.
pub trait ShardRouter {
    /// Shard owning the given fingerprint, or `None` when no shards exist.
    fn route(&self, key: &Fingerprint) -> Option<&str>;
}

/// Consistent-hash ring over named shards.
///
/// Each shard contributes `replicas` points on a ring of u64 hash values; a
/// key routes to the first point at or clockwise of its own hash. Adding or
/// removing a shard remaps only the keys on the affected arcs.
#[derive(Debug, Clone)]
pub struct HashRing {
    points: BTreeMap<u64, String>,
    replicas: u32,
}

impl HashRing {
    /// Create an empty ring with `replicas` points per shard.
    pub fn new(replicas: u32) -> Self {
        Self {
            points: BTreeMap::new(),
            replicas: replicas.max(1),
        }
    }

    /// Add a shard's replica points to the ring.
    pub fn add_shard(&mut self, id: &str) {
        for replica in 0..self.replicas {
            self.points.insert(ring_point(id, replica), id.to_string());
        }
    }

    /// Remove every point belonging to a shard.
    pub fn remove_shard(&mut self, id: &str) {
        self.points.retain(|_, shard| shard != id);
    }

    /// Whether the ring has any shards.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl ShardRouter for HashRing {
    fn route(&self, key: &Fingerprint) -> Option<&str> {
        let mut word = [0u8; 8];
        word.copy_from_slice(&key.as_bytes()[..8]);
        let hash = u64::from_be_bytes(word);

        self.points
            .range(hash..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, shard)| shard.as_str())
    }
}

/// Hash a shard replica onto the ring, with the same digest family used for
/// fingerprints so placement is stable across processes.
fn ring_point(id: &str, replica: u32) -> u64 {
    let digest = Sha224::digest(format!("{id}:{replica}").as_bytes());
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: i64) -> Vec<Fingerprint> {
        (0..n).map(|i| Fingerprint::of(&[i, i * 3, i * 7])).collect()
    }

    #[test]
    fn test_empty_ring_routes_nowhere() {
        let ring = HashRing::new(8);
        assert!(ring.is_empty());
        assert_eq!(ring.route(&Fingerprint::of(&[1, 2, 3])), None);
    }

    #[test]
    fn test_routing_is_deterministic() {
        let mut ring = HashRing::new(8);
        ring.add_shard("alpha");
        ring.add_shard("beta");
        ring.add_shard("gamma");

        for key in keys(50) {
            assert_eq!(ring.route(&key), ring.route(&key));
        }
    }

    #[test]
    fn test_all_shards_receive_keys() {
        let mut ring = HashRing::new(16);
        ring.add_shard("alpha");
        ring.add_shard("beta");

        let routed: std::collections::HashSet<String> = keys(200)
            .iter()
            .map(|key| ring.route(key).unwrap().to_string())
            .collect();
        assert_eq!(routed.len(), 2);
    }

    #[test]
    fn test_removal_only_remaps_the_lost_shard() {
        let mut ring = HashRing::new(8);
        ring.add_shard("alpha");
        ring.add_shard("beta");
        ring.add_shard("gamma");

        let keys = keys(200);
        let before: Vec<String> = keys
            .iter()
            .map(|key| ring.route(key).unwrap().to_string())
            .collect();

        ring.remove_shard("gamma");

        for (key, owner) in keys.iter().zip(&before) {
            if owner != "gamma" {
                assert_eq!(ring.route(key), Some(owner.as_str()));
            } else {
                assert!(ring.route(key).is_some());
            }
        }
    }
}
