//! Crypto primitives for Seraphis transactions.
//!
//! Provides domain-separated hashing, the fixed generators G/H/U/X and the
//! generator factory, legacy CLSAG ring signatures, Seraphis composition
//! proofs, Grootle membership proofs, aggregated Bulletproofs+ range proofs,
//! and a multiexp builder that lets proof verification be batched.

pub mod bulletproofs_plus;
pub mod clsag;
pub mod composition_proof;
pub mod generators;
pub mod grootle;
pub mod hash_to_point;
pub mod math;
pub mod multiexp;
pub mod transcript;
pub mod x25519;

pub use bulletproofs_plus::BulletproofPlusProof;
pub use clsag::ClsagSignature;
pub use composition_proof::SpCompositionProof;
pub use grootle::GrootleProof;
pub use multiexp::{SpMultiexp, SpMultiexpBuilder};
pub use transcript::SpTranscript;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use rand::RngCore;
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

/// Key images travel in compressed form.
pub type KeyImage = CompressedEdwardsY;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("invalid scalar: {0}")]
    InvalidScalar(String),

    #[error("bad proof parameters: {0}")]
    BadParameters(String),

    #[error("proof construction failed: {0}")]
    Proving(String),

    #[error("generator cache unavailable")]
    GeneratorCache,
}

/// Keccak-256 (CryptoNote variant with 0x01 padding, not SHA3).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(data);
    keccak.finalize(&mut output);
    output
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Uniformly random scalar from 64 bytes of OS randomness.
pub fn random_scalar() -> Scalar {
    let mut bytes = [0u8; 64];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}

/// Random scalar that is neither zero nor one (usable as a mask).
pub fn random_mask() -> Scalar {
    loop {
        let s = random_scalar();
        if s != Scalar::ZERO && s != Scalar::ONE {
            return s;
        }
    }
}

/// Random point in the prime-order subgroup.
pub fn random_point() -> EdwardsPoint {
    EdwardsPoint::mul_base(&random_scalar())
}

/// 8^(-1) mod l
pub fn inv_eight() -> Scalar {
    Scalar::from(8u64).invert()
}

pub fn mul8(p: &EdwardsPoint) -> EdwardsPoint {
    p.mul_by_cofactor()
}

pub fn decompress(key: &CompressedEdwardsY) -> Result<EdwardsPoint, CryptoError> {
    key.decompress()
        .ok_or_else(|| CryptoError::InvalidPoint(hex::encode(key.as_bytes())))
}

/// True if the key decompresses to a non-identity point of prime order.
pub fn key_domain_is_prime_subgroup(key: &CompressedEdwardsY) -> bool {
    match key.decompress() {
        Some(p) => p.is_torsion_free() && !p.is_identity(),
        None => false,
    }
}

pub fn scalar_from_canonical(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_canonical_bytes(*bytes))
}

/// K' = mask G + K
pub fn mask_key(mask: &Scalar, key: &EdwardsPoint) -> EdwardsPoint {
    EdwardsPoint::mul_base(mask) + key
}

/// Pedersen commitment: C = blinding G + amount H
pub fn commit(amount: u64, blinding: &Scalar) -> EdwardsPoint {
    EdwardsPoint::mul_base(blinding) + Scalar::from(amount) * generators::h()
}

/// Commitment with unit blinding factor (coinbase amounts): C = G + amount H
pub fn zero_commit(amount: u64) -> EdwardsPoint {
    commit(amount, &Scalar::ONE)
}

/// Seraphis key image: KI = (z / y) U
pub fn make_seraphis_key_image(y: &Scalar, z: &Scalar) -> Result<KeyImage, CryptoError> {
    if *y == Scalar::ZERO {
        return Err(CryptoError::InvalidScalar("key image y must be nonzero".into()));
    }
    Ok((z * y.invert() * generators::u()).compress())
}

/// Core spend pubkey: K_s = k_vb X + k_m U
pub fn make_seraphis_spendkey(k_view_balance: &Scalar, k_master: &Scalar) -> EdwardsPoint {
    k_view_balance * generators::x() + k_master * generators::u()
}

/// K' = k_u U + K
pub fn extend_seraphis_spendkey_u(extension: &Scalar, key: &EdwardsPoint) -> EdwardsPoint {
    extension * generators::u() + key
}

/// K' = k_x X + K
pub fn extend_seraphis_spendkey_x(extension: &Scalar, key: &EdwardsPoint) -> EdwardsPoint {
    extension * generators::x() + key
}

/// Legacy key image: KI = k Hp(Ko)
pub fn make_legacy_key_image(
    onetime_privkey: &Scalar,
    onetime_address: &CompressedEdwardsY,
) -> KeyImage {
    (onetime_privkey * hash_to_point::legacy_key_image_base(onetime_address)).compress()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
