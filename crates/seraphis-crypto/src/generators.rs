//! Fixed generators and the generator factory.
//!
//! G is the ed25519 basepoint and H the fixed Pedersen amount generator.
//! U and X are hashed from fixed labels, so nobody knows their discrete logs
//! relative to G or each other. The factory hands out an unbounded sequence
//! of further independent generators (used by Grootle matrix commitments and
//! Bulletproofs+ vectors), computed lazily and cached.

use std::sync::{OnceLock, RwLock};

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};

use crate::hash_to_point::hash_to_point;
use crate::transcript::domain;
use crate::CryptoError;

/// Pedersen H: the fixed amount generator.
pub const H_POINT_BYTES: [u8; 32] = [
    0x8b, 0x65, 0x59, 0x70, 0x15, 0x37, 0x99, 0xaf, 0x2a, 0xea, 0xdc, 0x9f, 0xf1, 0xad, 0xd0, 0xea,
    0x6c, 0x72, 0x51, 0xd5, 0x41, 0x54, 0xcf, 0xa9, 0x2c, 0x17, 0x3a, 0x0d, 0xd3, 0x9c, 0x1f, 0x94,
];

pub fn g() -> EdwardsPoint {
    ED25519_BASEPOINT_POINT
}

pub fn h() -> EdwardsPoint {
    static H: OnceLock<EdwardsPoint> = OnceLock::new();
    *H.get_or_init(|| match CompressedEdwardsY(H_POINT_BYTES).decompress() {
        Some(p) => p,
        // unreachable: H_POINT_BYTES decompresses
        None => hash_to_point(b"pedersen_h", &H_POINT_BYTES),
    })
}

pub fn u() -> EdwardsPoint {
    static U: OnceLock<EdwardsPoint> = OnceLock::new();
    *U.get_or_init(|| hash_to_point(domain::GENERATOR_U.as_bytes(), b""))
}

pub fn x() -> EdwardsPoint {
    static X: OnceLock<EdwardsPoint> = OnceLock::new();
    *X.get_or_init(|| hash_to_point(domain::GENERATOR_X.as_bytes(), b""))
}

// ─── Generator factory ──────────────────────────────────────────────────────

static FACTORY: RwLock<Vec<EdwardsPoint>> = RwLock::new(Vec::new());

/// The first `count` factory generators.
pub fn factory_generators(count: usize) -> Result<Vec<EdwardsPoint>, CryptoError> {
    {
        let cache = FACTORY.read().map_err(|_| CryptoError::GeneratorCache)?;
        if cache.len() >= count {
            return Ok(cache[..count].to_vec());
        }
    }

    let mut cache = FACTORY.write().map_err(|_| CryptoError::GeneratorCache)?;
    while cache.len() < count {
        let index = cache.len() as u64;
        cache.push(hash_to_point(
            domain::GENERATOR_FACTORY.as_bytes(),
            &index.to_le_bytes(),
        ));
    }
    Ok(cache[..count].to_vec())
}

pub fn generator_at_index(index: usize) -> Result<EdwardsPoint, CryptoError> {
    Ok(factory_generators(index + 1)?[index])
}
