//! Seraphis composition proof.
//!
//! Proves knowledge of x, y, z such that K = x G + y X + z U, and that the
//! key image KI = (z / y) U was derived from the same opening, without
//! revealing x, y or z.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, VartimeMultiscalarMul};

use crate::transcript::{domain, SpTranscript, ToTranscript};
use crate::{decompress, generators, inv_eight, mul8, random_scalar, CryptoError, KeyImage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpCompositionProof {
    pub c: Scalar,
    pub r_t1: Scalar,
    pub r_t2: Scalar,
    pub r_ki: Scalar,
    /// (1/8) (1/y) K
    pub k_t1: CompressedEdwardsY,
}

impl SpCompositionProof {
    pub const SIZE_BYTES: usize = 32 * 5;
}

impl ToTranscript for SpCompositionProof {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.c.append_to(bytes);
        self.r_t1.append_to(bytes);
        self.r_t2.append_to(bytes);
        self.r_ki.append_to(bytes);
        self.k_t1.append_to(bytes);
    }
}

fn challenge_message(
    message: &[u8; 32],
    k: &CompressedEdwardsY,
    key_image: &KeyImage,
    k_t1: &CompressedEdwardsY,
) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::COMPOSITION_PROOF_CHALLENGE_MESSAGE, 6 * 32);
    transcript
        .append("X", &generators::x())
        .append("U", &generators::u())
        .append("message", message)
        .append("K", k)
        .append("KI", key_image)
        .append("K_t1", k_t1);
    transcript.hash_to_32()
}

fn challenge(
    challenge_message: &[u8; 32],
    alpha1_k: &EdwardsPoint,
    alpha2_g: &EdwardsPoint,
    alpha3_u: &EdwardsPoint,
) -> Scalar {
    let mut transcript = SpTranscript::new(domain::COMPOSITION_PROOF_CHALLENGE, 4 * 32);
    transcript
        .append("challenge_message", challenge_message)
        .append("alpha1_K", alpha1_k)
        .append("alpha2_G", alpha2_g)
        .append("alpha3_U", alpha3_u);
    transcript.hash_to_scalar()
}

/// Prove knowledge of the opening (x, y, z) of `k`.
pub fn make_sp_composition_proof(
    message: &[u8; 32],
    k: &CompressedEdwardsY,
    x: &Scalar,
    y: &Scalar,
    z: &Scalar,
) -> Result<SpCompositionProof, CryptoError> {
    let k_point = decompress(k)?;
    if k_point.is_identity() {
        return Err(CryptoError::Proving("proof key is the identity".into()));
    }
    if *x == Scalar::ZERO || *y == Scalar::ZERO || *z == Scalar::ZERO {
        return Err(CryptoError::Proving("opening scalars must be nonzero".into()));
    }
    let reconstructed = EdwardsPoint::mul_base(x) + y * generators::x() + z * generators::u();
    if reconstructed != k_point {
        return Err(CryptoError::Proving("opening does not reproduce the proof key".into()));
    }

    let y_inv = y.invert();
    let key_image_point = z * y_inv * generators::u();
    if key_image_point.is_identity() {
        return Err(CryptoError::Proving("key image is the identity".into()));
    }
    let key_image = key_image_point.compress();

    // K_t1 = (1/8) (1/y) K
    let k_t1 = (inv_eight() * y_inv * k_point).compress();
    let m = challenge_message(message, k, &key_image, &k_t1);

    let alpha1 = random_scalar();
    let alpha2 = random_scalar();
    let alpha3 = random_scalar();
    let c = challenge(
        &m,
        &(alpha1 * k_point),
        &EdwardsPoint::mul_base(&alpha2),
        &(alpha3 * generators::u()),
    );

    let c_over_y = c * y_inv;
    Ok(SpCompositionProof {
        c,
        r_t1: alpha1 - c_over_y,
        r_t2: alpha2 - c_over_y * x,
        r_ki: alpha3 - c_over_y * z,
        k_t1,
    })
}

pub fn verify_sp_composition_proof(
    proof: &SpCompositionProof,
    message: &[u8; 32],
    k: &CompressedEdwardsY,
    key_image: &KeyImage,
) -> bool {
    let (Ok(k_point), Ok(ki_point), Ok(k_t1_stored)) =
        (decompress(k), decompress(key_image), decompress(&proof.k_t1))
    else {
        return false;
    };
    if k_point.is_identity() || ki_point.is_identity() {
        return false;
    }

    let k_t1 = mul8(&k_t1_stored);
    let k_t2 = k_t1 - generators::x() - ki_point;

    let m = challenge_message(message, k, key_image, &proof.k_t1);

    let part_t1 = EdwardsPoint::vartime_multiscalar_mul(&[proof.r_t1, proof.c], &[k_point, k_t1]);
    let part_t2 =
        EdwardsPoint::vartime_multiscalar_mul(&[proof.r_t2, proof.c], &[generators::g(), k_t2]);
    let part_ki =
        EdwardsPoint::vartime_multiscalar_mul(&[proof.r_ki, proof.c], &[generators::u(), ki_point]);

    challenge(&m, &part_t1, &part_t2, &part_ki) == proof.c
}
