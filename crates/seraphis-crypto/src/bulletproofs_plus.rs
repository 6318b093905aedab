//! Aggregated Bulletproofs+ range proofs over 64-bit amounts.
//!
//! Proofs commit to `V = (1/8)(mask G + amount H)`. Verification does not
//! evaluate anything itself: each proof emits one randomly weighted
//! multiexp builder so range proofs can join the same batch as membership
//! proofs.
//!
//! Reference: https://eprint.iacr.org/2020/735.pdf

use std::sync::RwLock;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use seraphis_types::constants::proof_limits::{BPP_MAX_AGGREGATION, BPP_RANGE_BITS};
use seraphis_types::varint::encode_varint;

use crate::hash_to_point::hash_to_point;
use crate::math::{batch_invert, scalar_pow};
use crate::multiexp::SpMultiexpBuilder;
use crate::transcript::ToTranscript;
use crate::{decompress, generators, inv_eight, keccak256, mul8, random_scalar, CryptoError, SpMultiexp};

// ─── Constants ──────────────────────────────────────────────────────────────

const N: usize = BPP_RANGE_BITS;
const LOG_N: usize = 6;

/// Size of an aggregate proof over two amounts (the clawback reference).
const TWO_AMOUNT_PROOF_BYTES: usize = 32 * 20;

// ─── Generator computation ──────────────────────────────────────────────────

struct Generators {
    gi: Vec<EdwardsPoint>,
    hi: Vec<EdwardsPoint>,
}

static GENERATORS: RwLock<Generators> = RwLock::new(Generators { gi: Vec::new(), hi: Vec::new() });

fn generator_at(index: u64) -> EdwardsPoint {
    let mut data = Vec::with_capacity(42);
    data.extend_from_slice(&generators::H_POINT_BYTES);
    data.extend_from_slice(&encode_varint(index));
    hash_to_point(b"bulletproof_plus", &data)
}

/// The first `mn` Gi/Hi generators (Hi at even indices, Gi at odd ones).
fn bpp_generators(mn: usize) -> Result<(Vec<EdwardsPoint>, Vec<EdwardsPoint>), CryptoError> {
    {
        let cache = GENERATORS.read().map_err(|_| CryptoError::GeneratorCache)?;
        if cache.gi.len() >= mn {
            return Ok((cache.gi[..mn].to_vec(), cache.hi[..mn].to_vec()));
        }
    }

    let mut cache = GENERATORS.write().map_err(|_| CryptoError::GeneratorCache)?;
    for i in cache.gi.len()..mn {
        let hi = generator_at(2 * i as u64);
        let gi = generator_at(2 * i as u64 + 1);
        cache.hi.push(hi);
        cache.gi.push(gi);
    }
    Ok((cache.gi[..mn].to_vec(), cache.hi[..mn].to_vec()))
}

fn transcript_init() -> [u8; 32] {
    hash_to_point(b"bulletproof_plus_transcript", &[]).compress().to_bytes()
}

// ─── Transcript helpers ─────────────────────────────────────────────────────

fn bytes_to_scalar(bytes: &[u8; 32]) -> Scalar {
    Scalar::from_bytes_mod_order(*bytes)
}

/// hash_to_scalar(transcript || elements...) -> reduced scalar bytes
fn transcript_update(transcript: &[u8; 32], elements: &[&[u8; 32]]) -> [u8; 32] {
    let mut data = Vec::with_capacity(32 * (elements.len() + 1));
    data.extend_from_slice(transcript);
    for e in elements {
        data.extend_from_slice(*e);
    }
    Scalar::from_bytes_mod_order(keccak256(&data)).to_bytes()
}

fn hash_keys_to_scalar(keys: &[CompressedEdwardsY]) -> Scalar {
    let mut data = Vec::with_capacity(keys.len() * 32);
    for k in keys {
        data.extend_from_slice(k.as_bytes());
    }
    Scalar::from_bytes_mod_order(keccak256(&data))
}

fn nonzero_challenge(transcript: &[u8; 32], what: &str) -> Result<Scalar, CryptoError> {
    let challenge = bytes_to_scalar(transcript);
    if challenge == Scalar::ZERO {
        return Err(CryptoError::Proving(format!("zero bulletproof+ challenge ({what})")));
    }
    Ok(challenge)
}

/// (padded amount count, log2 of it)
fn padded_size(num_amounts: usize) -> (usize, usize) {
    let mut m_val = 1usize;
    let mut log_m = 0usize;
    while m_val < num_amounts {
        m_val *= 2;
        log_m += 1;
    }
    (m_val, log_m)
}

// ─── Proof structure ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletproofPlusProof {
    /// Commitments to the proved amounts, stored as (1/8) C.
    pub v: Vec<CompressedEdwardsY>,
    pub a: CompressedEdwardsY,
    pub a1: CompressedEdwardsY,
    pub b: CompressedEdwardsY,
    pub r1: Scalar,
    pub s1: Scalar,
    pub d1: Scalar,
    pub l: Vec<CompressedEdwardsY>,
    pub r: Vec<CompressedEdwardsY>,
}

impl ToTranscript for BulletproofPlusProof {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.v.append_to(bytes);
        self.a.append_to(bytes);
        self.a1.append_to(bytes);
        self.b.append_to(bytes);
        self.r1.append_to(bytes);
        self.s1.append_to(bytes);
        self.d1.append_to(bytes);
        self.l.append_to(bytes);
        self.r.append_to(bytes);
    }
}

/// Proof size: 32 * (2 * log2(64 * padded amounts) + 6), optionally plus V.
pub fn bpp_size_bytes(num_range_proofs: usize, include_commitments: bool) -> usize {
    if num_range_proofs == 0 {
        return 0;
    }
    let (_, log_m) = padded_size(num_range_proofs);
    let proof_size = 32 * (2 * (LOG_N + log_m) + 6);
    if include_commitments {
        proof_size + 32 * num_range_proofs
    } else {
        proof_size
    }
}

/// Proof size plus a clawback of 4/5 of the bytes saved by aggregating,
/// measured against splitting the (padded) proof into two-amount proofs.
pub fn bpp_weight(num_range_proofs: usize, include_commitments: bool) -> usize {
    if num_range_proofs == 0 {
        return 0;
    }
    let (padded, _) = padded_size(num_range_proofs);
    let proof_size = bpp_size_bytes(num_range_proofs, false);
    let split_size = TWO_AMOUNT_PROOF_BYTES * padded / 2;
    let clawback = split_size.saturating_sub(proof_size) * 4 / 5;
    let commitments = if include_commitments { 32 * num_range_proofs } else { 0 };
    proof_size + clawback + commitments
}

// ─── Prove ──────────────────────────────────────────────────────────────────

pub fn bulletproof_plus_prove(amounts: &[u64], masks: &[Scalar]) -> Result<BulletproofPlusProof, CryptoError> {
    if amounts.is_empty() || amounts.len() != masks.len() {
        return Err(CryptoError::BadParameters("amounts and masks must be nonempty and aligned".into()));
    }
    if amounts.len() > BPP_MAX_AGGREGATION {
        return Err(CryptoError::BadParameters(format!(
            "cannot aggregate more than {BPP_MAX_AGGREGATION} range proofs"
        )));
    }

    let (m_val, log_m) = padded_size(amounts.len());
    let mn = m_val * N;
    let log_mn = log_m + LOG_N;

    let inv8 = inv_eight();
    let g_pt = generators::g();
    let h_pt = generators::h();
    let (gi, hi) = bpp_generators(mn)?;

    let mut transcript = transcript_init();

    // Step 1: output commitments V
    let v: Vec<CompressedEdwardsY> = amounts
        .iter()
        .zip(masks)
        .map(|(amount, mask)| {
            EdwardsPoint::vartime_multiscalar_mul(&[mask * inv8, Scalar::from(*amount) * inv8], &[g_pt, h_pt])
                .compress()
        })
        .collect();
    transcript = transcript_update(&transcript, &[&hash_keys_to_scalar(&v).to_bytes()]);

    // Step 2: amount bits, padded with commitments to zero
    let minus_one = -Scalar::ONE;
    let mut a_l = vec![Scalar::ZERO; mn];
    let mut a_r = vec![minus_one; mn];
    for (j, amount) in amounts.iter().enumerate() {
        for i in 0..N {
            if (amount >> i) & 1 == 1 {
                a_l[j * N + i] = Scalar::ONE;
                a_r[j * N + i] = Scalar::ZERO;
            }
        }
    }

    // Step 3: initial commitment A
    let alpha = random_scalar();
    let mut a_scalars = Vec::with_capacity(2 * mn + 1);
    let mut a_points = Vec::with_capacity(2 * mn + 1);
    for i in 0..mn {
        a_scalars.push(a_l[i] * inv8);
        a_points.push(gi[i]);
        a_scalars.push(a_r[i] * inv8);
        a_points.push(hi[i]);
    }
    a_scalars.push(alpha * inv8);
    a_points.push(g_pt);
    let a_commit = EdwardsPoint::vartime_multiscalar_mul(&a_scalars, &a_points).compress();

    // Step 4: challenges y, z
    transcript = transcript_update(&transcript, &[&a_commit.to_bytes()]);
    let y = nonzero_challenge(&transcript, "y")?;
    let z = nonzero_challenge(&keccak256(&y.to_bytes()), "z")?;
    transcript = z.to_bytes();
    let z2 = z * z;

    // Step 5: windowed vector d
    let mut d = vec![Scalar::ZERO; mn];
    let mut z_pow = z2;
    for j in 0..m_val {
        let mut two_pow = Scalar::ONE;
        for i in 0..N {
            d[j * N + i] = z_pow * two_pow;
            two_pow += two_pow;
        }
        z_pow *= z2;
    }

    // Step 6: powers of y and 1/y
    let mut y_powers = Vec::with_capacity(mn + 2);
    y_powers.push(Scalar::ONE);
    for i in 1..=mn + 1 {
        y_powers.push(y_powers[i - 1] * y);
    }
    let y_inv = y.invert();
    let mut y_inv_powers = Vec::with_capacity(mn);
    y_inv_powers.push(Scalar::ONE);
    for i in 1..mn {
        y_inv_powers.push(y_inv_powers[i - 1] * y_inv);
    }

    // Step 7: inner product inputs
    let mut aprime: Vec<Scalar> = a_l.iter().map(|a| a - z).collect();
    let mut bprime: Vec<Scalar> = (0..mn).map(|i| a_r[i] + z + d[i] * y_powers[mn - i]).collect();

    let mut alpha1 = alpha;
    let mut temp = Scalar::ONE;
    for mask in masks {
        temp *= z2;
        alpha1 += temp * y_powers[mn + 1] * mask;
    }

    // Step 8: inner product argument
    let mut nprime = mn;
    let mut gprime = gi;
    let mut hprime = hi;
    let mut l_points = Vec::with_capacity(log_mn);
    let mut r_points = Vec::with_capacity(log_mn);

    while nprime > 1 {
        nprime /= 2;

        let mut c_l = Scalar::ZERO;
        let mut c_r = Scalar::ZERO;
        let mut y_pow_local = y;
        for i in 0..nprime {
            c_l += aprime[i] * bprime[nprime + i] * y_pow_local;
            c_r += aprime[nprime + i] * y_powers[nprime] * bprime[i] * y_pow_local;
            y_pow_local *= y;
        }

        let d_l = random_scalar();
        let d_r = random_scalar();

        let mut l_scalars = Vec::with_capacity(2 * nprime + 2);
        let mut l_pts = Vec::with_capacity(2 * nprime + 2);
        let mut r_scalars = Vec::with_capacity(2 * nprime + 2);
        let mut r_pts = Vec::with_capacity(2 * nprime + 2);
        for i in 0..nprime {
            l_scalars.push(aprime[i] * y_inv_powers[nprime] * inv8);
            l_pts.push(gprime[nprime + i]);
            l_scalars.push(bprime[nprime + i] * inv8);
            l_pts.push(hprime[i]);

            r_scalars.push(aprime[nprime + i] * y_powers[nprime] * inv8);
            r_pts.push(gprime[i]);
            r_scalars.push(bprime[i] * inv8);
            r_pts.push(hprime[nprime + i]);
        }
        l_scalars.extend([c_l * inv8, d_l * inv8]);
        l_pts.extend([h_pt, g_pt]);
        r_scalars.extend([c_r * inv8, d_r * inv8]);
        r_pts.extend([h_pt, g_pt]);

        let l_point = EdwardsPoint::vartime_multiscalar_mul(&l_scalars, &l_pts).compress();
        let r_point = EdwardsPoint::vartime_multiscalar_mul(&r_scalars, &r_pts).compress();
        l_points.push(l_point);
        r_points.push(r_point);

        transcript = transcript_update(&transcript, &[&l_point.to_bytes(), &r_point.to_bytes()]);
        let x = nonzero_challenge(&transcript, "x")?;
        let x_inv = x.invert();

        // fold generators and scalars
        let temp1 = y_inv_powers[nprime] * x;
        let temp2 = x_inv * y_powers[nprime];
        gprime = (0..nprime)
            .map(|i| EdwardsPoint::vartime_multiscalar_mul(&[x_inv, temp1], &[gprime[i], gprime[nprime + i]]))
            .collect();
        hprime = (0..nprime)
            .map(|i| EdwardsPoint::vartime_multiscalar_mul(&[x, x_inv], &[hprime[i], hprime[nprime + i]]))
            .collect();
        aprime = (0..nprime).map(|i| aprime[i] * x + aprime[nprime + i] * temp2).collect();
        bprime = (0..nprime).map(|i| bprime[i] * x_inv + bprime[nprime + i] * x).collect();

        alpha1 += d_l * x * x + d_r * x_inv * x_inv;
    }

    // Step 9: final round
    let r = random_scalar();
    let s = random_scalar();
    let d_ = random_scalar();
    let eta = random_scalar();

    let h_coeff = r * y * bprime[0] + s * y * aprime[0];
    let a1 = EdwardsPoint::vartime_multiscalar_mul(
        &[r * inv8, s * inv8, d_ * inv8, h_coeff * inv8],
        &[gprime[0], hprime[0], g_pt, h_pt],
    )
    .compress();
    let b = EdwardsPoint::vartime_multiscalar_mul(&[eta * inv8, r * y * s * inv8], &[g_pt, h_pt]).compress();

    transcript = transcript_update(&transcript, &[&a1.to_bytes(), &b.to_bytes()]);
    let e = nonzero_challenge(&transcript, "e")?;

    // Step 10: final scalars
    Ok(BulletproofPlusProof {
        v,
        a: a_commit,
        a1,
        b,
        r1: r + aprime[0] * e,
        s1: s + bprime[0] * e,
        d1: eta + d_ * e + alpha1 * e * e,
        l: l_points,
        r: r_points,
    })
}

// ─── Verify ─────────────────────────────────────────────────────────────────

fn build_challenge_cache(challenges: &[Scalar], challenge_inverses: &[Scalar], mn: usize) -> Vec<Scalar> {
    let mut cache = vec![Scalar::ZERO; mn];
    cache[0] = challenge_inverses[0];
    cache[1] = challenges[0];

    for j in 1..challenges.len() {
        let slots = 1usize << (j + 1);
        for s in (0..slots).rev() {
            cache[s] = if s % 2 == 1 {
                cache[s / 2] * challenges[j]
            } else {
                cache[s / 2] * challenge_inverses[j]
            };
        }
    }
    cache
}

fn proof_verification_builder(proof: &BulletproofPlusProof) -> Result<SpMultiexpBuilder, CryptoError> {
    let m = proof.v.len();
    if m == 0 || m > BPP_MAX_AGGREGATION {
        return Err(CryptoError::BadParameters("bulletproof+ commitment count out of range".into()));
    }
    let (m_val, log_m) = padded_size(m);
    let mn = m_val * N;
    let rounds = proof.l.len();
    if rounds != LOG_N + log_m || proof.r.len() != rounds {
        return Err(CryptoError::BadParameters("bulletproof+ has the wrong number of rounds".into()));
    }

    // challenges
    let mut transcript = transcript_init();
    transcript = transcript_update(&transcript, &[&hash_keys_to_scalar(&proof.v).to_bytes()]);
    transcript = transcript_update(&transcript, &[&proof.a.to_bytes()]);
    let y = nonzero_challenge(&transcript, "y")?;
    let z = nonzero_challenge(&keccak256(&y.to_bytes()), "z")?;
    transcript = z.to_bytes();

    let mut challenges = Vec::with_capacity(rounds);
    for j in 0..rounds {
        transcript = transcript_update(&transcript, &[&proof.l[j].to_bytes(), &proof.r[j].to_bytes()]);
        challenges.push(nonzero_challenge(&transcript, "x")?);
    }
    transcript = transcript_update(&transcript, &[&proof.a1.to_bytes(), &proof.b.to_bytes()]);
    let e = nonzero_challenge(&transcript, "e")?;

    let mut to_invert = challenges.clone();
    to_invert.push(y);
    let mut inverses = batch_invert(&to_invert)?;
    let y_inv = inverses.pop().ok_or_else(|| CryptoError::BadParameters("missing inverse".into()))?;
    let challenge_inverses = inverses;

    let (gi, hi) = bpp_generators(mn)?;
    let mut builder = SpMultiexpBuilder::with_random_weight(0, 2 * mn + m + 2 * rounds + 3);

    let e2 = e * e;
    let y_mn = scalar_pow(&y, mn);
    let y_mn_p1 = y_mn * y;

    let z2 = z * z;
    let mut z_powers = Vec::with_capacity(m_val);
    z_powers.push(z2);
    for j in 1..m_val {
        z_powers.push(z_powers[j - 1] * z2);
    }

    // sum_d = (2^64 - 1) * sum(z^2j)
    let sum_z = z_powers.iter().fold(Scalar::ZERO, |acc, zp| acc + zp);
    let sum_d = Scalar::from(u64::MAX) * sum_z;

    // sum_y = y + y^2 + ... + y^mn
    let mut sum_y = Scalar::ZERO;
    let mut yp = y;
    for _ in 0..mn {
        sum_y += yp;
        yp *= y;
    }

    for (j, v) in proof.v.iter().enumerate() {
        builder.add_element(-(e2 * z_powers[j] * y_mn_p1), mul8(&decompress(v)?));
    }
    builder.add_element(-e2, mul8(&decompress(&proof.a)?));
    builder.add_element(-e, mul8(&decompress(&proof.a1)?));
    builder.add_element(-Scalar::ONE, mul8(&decompress(&proof.b)?));

    builder.add_g_element(proof.d1);
    let h_term1 = proof.r1 * y * proof.s1;
    let h_term2 = y_mn_p1 * z * sum_d;
    let h_term3 = (z2 - z) * sum_y;
    builder.add_h_element(h_term1 + e2 * (h_term2 + h_term3));

    let challenge_cache = build_challenge_cache(&challenges, &challenge_inverses, mn);

    let mut e_r1 = e * proof.r1;
    let e_s1 = e * proof.s1;
    let e2_z = e2 * z;
    let mut minus_e2_y = -(e2 * y_mn);
    for i in 0..mn {
        let d_val = z_powers[i / N] * Scalar::from(1u64 << (i % N));
        let inv_index = (!i) & (mn - 1);

        builder.add_element(e_r1 * challenge_cache[i] + e2_z, gi[i]);
        builder.add_element(e_s1 * challenge_cache[inv_index] - e2_z + minus_e2_y * d_val, hi[i]);

        e_r1 *= y_inv;
        minus_e2_y *= y_inv;
    }

    for j in 0..rounds {
        let x2 = challenges[j] * challenges[j];
        let x_inv2 = challenge_inverses[j] * challenge_inverses[j];
        builder.add_element(-(e2 * x2), mul8(&decompress(&proof.l[j])?));
        builder.add_element(-(e2 * x_inv2), mul8(&decompress(&proof.r[j])?));
    }

    Ok(builder)
}

/// One multiexp builder per proof.
pub fn get_bulletproof_plus_verification_data(
    proofs: &[&BulletproofPlusProof],
) -> Result<Vec<SpMultiexpBuilder>, CryptoError> {
    proofs.iter().map(|proof| proof_verification_builder(proof)).collect()
}

pub fn bulletproof_plus_verify(proofs: &[&BulletproofPlusProof]) -> bool {
    match get_bulletproof_plus_verification_data(proofs).and_then(|builders| SpMultiexp::new(&builders)) {
        Ok(multiexp) => multiexp.evaluates_to_point_at_infinity(),
        Err(e) => {
            log::debug!(target: "seraphis::crypto", "bulletproof+ verification data rejected: {e}");
            false
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit;

    #[test]
    fn test_bp_plus_prove_verify_single() {
        let mask = random_scalar();
        let proof = bulletproof_plus_prove(&[1_000_000], &[mask]).unwrap();
        assert!(bulletproof_plus_verify(&[&proof]));
        assert_eq!(mul8(&decompress(&proof.v[0]).unwrap()), commit(1_000_000, &mask));
    }

    #[test]
    fn test_bp_plus_prove_verify_edge_amounts() {
        let proof = bulletproof_plus_prove(&[0, u64::MAX, 3], &[random_scalar(), random_scalar(), random_scalar()])
            .unwrap();
        assert_eq!(proof.l.len(), LOG_N + 2, "three amounts pad to four");
        assert!(bulletproof_plus_verify(&[&proof]));
    }

    #[test]
    fn test_bp_plus_batch_verify() {
        let proof1 = bulletproof_plus_prove(&[100], &[random_scalar()]).unwrap();
        let proof2 = bulletproof_plus_prove(&[200, 300], &[random_scalar(), random_scalar()]).unwrap();
        assert!(bulletproof_plus_verify(&[&proof1, &proof2]));

        let mut bad = proof2.clone();
        bad.v.swap(0, 1);
        assert!(!bulletproof_plus_verify(&[&proof1, &bad]), "swapped commitments must fail the batch");
    }

    #[test]
    fn test_bp_plus_rejects_bad_inputs() {
        assert!(bulletproof_plus_prove(&[], &[]).is_err());
        assert!(bulletproof_plus_prove(&[1, 2], &[random_scalar()]).is_err());
    }

    #[test]
    fn test_bp_plus_size_and_weight() {
        assert_eq!(bpp_size_bytes(2, false), TWO_AMOUNT_PROOF_BYTES);
        assert_eq!(bpp_size_bytes(2, true), TWO_AMOUNT_PROOF_BYTES + 64);
        assert_eq!(bpp_weight(2, false), TWO_AMOUNT_PROOF_BYTES, "no clawback for two amounts");
        assert_eq!(bpp_weight(1, false), bpp_size_bytes(1, false));

        // 16 amounts: 32 * (2 * 10 + 6) = 832 bytes vs 8 * 640 split
        assert_eq!(bpp_size_bytes(16, false), 832);
        assert_eq!(bpp_weight(16, false), 832 + (5120 - 832) * 4 / 5);

        let proof = bulletproof_plus_prove(&[5, 6], &[random_scalar(), random_scalar()]).unwrap();
        let serialized_len = 32 * (6 + proof.l.len() + proof.r.len());
        assert_eq!(serialized_len, bpp_size_bytes(2, false));
    }
}
