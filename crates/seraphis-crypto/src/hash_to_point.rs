//! Hash to a prime-order curve point by try-and-increment.
//!
//! Each attempt hashes `domain || data || counter` with blake2b and tries to
//! decompress the digest as a y-coordinate; the first hit is multiplied by
//! the cofactor. Identity results are skipped so every output is usable as
//! an independent generator.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::traits::IsIdentity;

use crate::transcript::domain;

pub fn hash_to_point(domain_separator: &[u8], data: &[u8]) -> EdwardsPoint {
    let mut counter: u64 = 0;
    loop {
        let hash = blake2b_simd::Params::new()
            .hash_length(32)
            .to_state()
            .update(&(domain_separator.len() as u64).to_le_bytes())
            .update(domain_separator)
            .update(data)
            .update(&counter.to_le_bytes())
            .finalize();

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(hash.as_bytes());

        if let Some(point) = CompressedEdwardsY(bytes).decompress() {
            let cleared = point.mul_by_cofactor();
            if !cleared.is_identity() {
                return cleared;
            }
        }

        counter = counter.wrapping_add(1);
    }
}

/// Base point of a legacy key image: Hp(Ko).
pub fn legacy_key_image_base(onetime_address: &CompressedEdwardsY) -> EdwardsPoint {
    hash_to_point(domain::LEGACY_KEY_IMAGE_BASE.as_bytes(), onetime_address.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_to_point_deterministic() {
        let a = hash_to_point(b"test", b"input");
        let b = hash_to_point(b"test", b"input");
        assert_eq!(a, b);
        assert_ne!(a, hash_to_point(b"test", b"other"));
        assert_ne!(a, hash_to_point(b"test2", b"input"), "domain must separate outputs");
    }

    #[test]
    fn test_hash_to_point_prime_order() {
        for i in 0u8..16 {
            let p = hash_to_point(b"order", &[i]);
            assert!(p.is_torsion_free(), "point {i} has torsion");
            assert!(!p.is_identity());
        }
    }
}
