//! CLSAG ring signatures for legacy inputs.
//!
//! The signer proves knowledge of the spend key of one ring member and of
//! the difference between that member's amount commitment and a masked
//! (pseudo-output) commitment. Hashing follows the CryptoNote convention:
//! keccak over 32-byte zero-padded domain tags and raw keys.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;

use crate::hash_to_point::legacy_key_image_base;
use crate::transcript::ToTranscript;
use crate::{decompress, inv_eight, keccak256, mul8, random_scalar, CryptoError, KeyImage};

// ─── Domain separators (32-byte zero-padded) ────────────────────────────────

fn pad_domain(s: &[u8]) -> [u8; 32] {
    let mut buf = [0u8; 32];
    let len = s.len().min(32);
    buf[..len].copy_from_slice(&s[..len]);
    buf
}

fn clsag_agg_0() -> [u8; 32] { pad_domain(b"CLSAG_agg_0") }
fn clsag_agg_1() -> [u8; 32] { pad_domain(b"CLSAG_agg_1") }
fn clsag_round() -> [u8; 32] { pad_domain(b"CLSAG_round") }

/// keccak256(concat(data...)) reduced mod l
fn hash_to_scalar(data: &[&[u8]]) -> Scalar {
    let total: usize = data.iter().map(|d| d.len()).sum();
    let mut combined = Vec::with_capacity(total);
    for d in data {
        combined.extend_from_slice(d);
    }
    Scalar::from_bytes_mod_order(keccak256(&combined))
}

// ─── Signature structure ────────────────────────────────────────────────────

/// CLSAG signature: s[0..n], c1, I (key image), D (commitment key image / 8)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClsagSignature {
    pub s: Vec<Scalar>,
    pub c1: Scalar,
    pub key_image: KeyImage,
    pub commitment_image: CompressedEdwardsY,
}

impl ClsagSignature {
    pub fn size_bytes(ring_size: usize) -> usize {
        // s + c1 + D (the key image is stored with the enote image)
        32 * (ring_size + 2)
    }
}

impl ToTranscript for ClsagSignature {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.s.append_to(bytes);
        self.c1.append_to(bytes);
        self.commitment_image.append_to(bytes);
    }
}

struct RingContext {
    mu_p: Scalar,
    mu_c: Scalar,
    round_prefix: Vec<u8>,
}

fn ring_context(
    message: &[u8; 32],
    ring: &[CompressedEdwardsY],
    commitments: &[CompressedEdwardsY],
    key_image: &KeyImage,
    commitment_image: &CompressedEdwardsY,
    pseudo_output: &CompressedEdwardsY,
) -> RingContext {
    let agg0 = clsag_agg_0();
    let agg1 = clsag_agg_1();
    let mut agg_parts: Vec<&[u8]> = Vec::with_capacity(2 * ring.len() + 4);
    agg_parts.push(&agg0);
    for pk in ring {
        agg_parts.push(pk.as_bytes());
    }
    for c in commitments {
        agg_parts.push(c.as_bytes());
    }
    agg_parts.push(key_image.as_bytes());
    agg_parts.push(commitment_image.as_bytes());
    agg_parts.push(pseudo_output.as_bytes());
    let mu_p = hash_to_scalar(&agg_parts);
    agg_parts[0] = &agg1;
    let mu_c = hash_to_scalar(&agg_parts);

    // H_n(CLSAG_round, ring, commitments, pseudo_output, message, L, R)
    let mut round_prefix = Vec::with_capacity(32 * (2 * ring.len() + 3));
    round_prefix.extend_from_slice(&clsag_round());
    for pk in ring {
        round_prefix.extend_from_slice(pk.as_bytes());
    }
    for c in commitments {
        round_prefix.extend_from_slice(c.as_bytes());
    }
    round_prefix.extend_from_slice(pseudo_output.as_bytes());
    round_prefix.extend_from_slice(message);

    RingContext { mu_p, mu_c, round_prefix }
}

impl RingContext {
    fn challenge(&self, l: &EdwardsPoint, r: &EdwardsPoint) -> Scalar {
        let l_bytes = l.compress();
        let r_bytes = r.compress();
        hash_to_scalar(&[&self.round_prefix, l_bytes.as_bytes(), r_bytes.as_bytes()])
    }

    #[allow(clippy::too_many_arguments)]
    fn round(
        &self,
        c: Scalar,
        s_i: Scalar,
        member: &EdwardsPoint,
        member_base: &EdwardsPoint,
        c_diff: &EdwardsPoint,
        key_image: &EdwardsPoint,
        d_full: &EdwardsPoint,
    ) -> Scalar {
        let c_mu_p = c * self.mu_p;
        let c_mu_c = c * self.mu_c;

        // L = s[i]*G + c_mu_p*P[i] + c_mu_c*C[i]
        let l_pt = EdwardsPoint::vartime_multiscalar_mul(
            &[s_i, c_mu_p, c_mu_c],
            &[ED25519_BASEPOINT_POINT, *member, *c_diff],
        );
        // R = s[i]*H_p(P[i]) + c_mu_p*I + c_mu_c*D
        let r_pt = EdwardsPoint::vartime_multiscalar_mul(
            &[s_i, c_mu_p, c_mu_c],
            &[*member_base, *key_image, *d_full],
        );
        self.challenge(&l_pt, &r_pt)
    }
}

// ─── Sign ───────────────────────────────────────────────────────────────────

/// Sign with the spend key of `ring[secret_index]`.
///
/// `commitment_mask` is z where `commitments[secret_index] - pseudo_output = z G`.
pub fn clsag_sign(
    message: &[u8; 32],
    ring: &[CompressedEdwardsY],
    secret_key: &Scalar,
    commitments: &[CompressedEdwardsY],
    commitment_mask: &Scalar,
    pseudo_output: &CompressedEdwardsY,
    secret_index: usize,
) -> Result<ClsagSignature, CryptoError> {
    let n = ring.len();
    if n == 0 || n != commitments.len() {
        return Err(CryptoError::BadParameters("ring and commitments must match".into()));
    }
    if secret_index >= n {
        return Err(CryptoError::BadParameters("secret index outside the ring".into()));
    }

    let pseudo_pt = decompress(pseudo_output)?;
    let ring_pts = ring.iter().map(decompress).collect::<Result<Vec<_>, _>>()?;
    let c_diff = commitments
        .iter()
        .map(|c| Ok(decompress(c)? - pseudo_pt))
        .collect::<Result<Vec<_>, CryptoError>>()?;

    if EdwardsPoint::mul_base(secret_key) != ring_pts[secret_index] {
        return Err(CryptoError::Proving("secret key does not match ring member".into()));
    }
    if EdwardsPoint::mul_base(commitment_mask) != c_diff[secret_index] {
        return Err(CryptoError::Proving("commitment mask does not match pseudo output".into()));
    }

    // I = p * H_p(P_l), D = z * H_p(P_l)
    let h_p = legacy_key_image_base(&ring[secret_index]);
    let key_image_pt = secret_key * h_p;
    let key_image = key_image_pt.compress();
    let d_full_pt = commitment_mask * h_p;
    let d8 = (inv_eight() * d_full_pt).compress();

    let ctx = ring_context(message, ring, commitments, &key_image, &d8, pseudo_output);

    let alpha = random_scalar();
    let mut c = ctx.challenge(&EdwardsPoint::mul_base(&alpha), &(alpha * h_p));

    let mut s = vec![Scalar::ZERO; n];
    let mut c1 = None;
    let mut i = (secret_index + 1) % n;
    if i == 0 {
        c1 = Some(c);
    }

    while i != secret_index {
        let s_i = random_scalar();
        s[i] = s_i;
        let base_i = legacy_key_image_base(&ring[i]);
        c = ctx.round(c, s_i, &ring_pts[i], &base_i, &c_diff[i], &key_image_pt, &d_full_pt);

        i = (i + 1) % n;
        if i == 0 {
            c1 = Some(c);
        }
    }

    // close the ring: s[l] = alpha - c * (mu_P * p + mu_C * z)
    let s_l = alpha - c * (ctx.mu_p * secret_key + ctx.mu_c * commitment_mask);
    s[secret_index] = s_l;

    // single-member ring: c1 is the challenge after the real round
    let c1 = match c1 {
        Some(c1) => c1,
        None => ctx.round(
            c,
            s_l,
            &ring_pts[secret_index],
            &h_p,
            &c_diff[secret_index],
            &key_image_pt,
            &d_full_pt,
        ),
    };

    Ok(ClsagSignature {
        s,
        c1,
        key_image,
        commitment_image: d8,
    })
}

// ─── Verify ─────────────────────────────────────────────────────────────────

pub fn clsag_verify(
    message: &[u8; 32],
    sig: &ClsagSignature,
    ring: &[CompressedEdwardsY],
    commitments: &[CompressedEdwardsY],
    pseudo_output: &CompressedEdwardsY,
) -> bool {
    let n = ring.len();
    if n == 0 || n != commitments.len() || sig.s.len() != n {
        return false;
    }

    let Ok(pseudo_pt) = decompress(pseudo_output) else {
        return false;
    };
    let Ok(d8_pt) = decompress(&sig.commitment_image) else {
        return false;
    };
    let Ok(key_image_pt) = decompress(&sig.key_image) else {
        return false;
    };
    let d_full_pt = mul8(&d8_pt);

    let ctx = ring_context(message, ring, commitments, &sig.key_image, &sig.commitment_image, pseudo_output);

    let mut c = sig.c1;
    for i in 0..n {
        let Ok(member) = decompress(&ring[i]) else {
            return false;
        };
        let Ok(commitment) = decompress(&commitments[i]) else {
            return false;
        };
        let base_i = legacy_key_image_base(&ring[i]);
        c = ctx.round(c, sig.s[i], &member, &base_i, &(commitment - pseudo_pt), &key_image_pt, &d_full_pt);
    }

    c == sig.c1
}

// ─── Tests ──────────────────────────────────────────────────────────────────
