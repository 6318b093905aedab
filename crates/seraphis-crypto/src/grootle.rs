//! Grootle one-of-many membership proofs.
//!
//! Proves that one element of a reference set {S} minus a public offset is a
//! commitment to zero (`S[l] - offset = privkey G`) without revealing `l`.
//! The reference set size is `n^m`. Verification emits two multiexp builders
//! per proof so many proofs can be checked in one batch.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, MultiscalarMul};
use seraphis_types::constants::proof_limits::GROOTLE_MAX_MN;

use crate::math::{convolve, decompose, kronecker_delta, powers_of_scalar, uint_pow};
use crate::multiexp::SpMultiexpBuilder;
use crate::transcript::{domain, SpTranscript, ToTranscript};
use crate::{decompress, generators, inv_eight, mul8, random_scalar, CryptoError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrootleProof {
    pub a: CompressedEdwardsY,
    pub b: CompressedEdwardsY,
    /// m rows of n-1 entries; column 0 is implied
    pub f: Vec<Vec<Scalar>>,
    pub x: Vec<CompressedEdwardsY>,
    pub z_a: Scalar,
    pub z: Scalar,
}

impl GrootleProof {
    pub fn size_bytes(&self) -> usize {
        let n = self.f.first().map(|row| row.len() + 1).unwrap_or(0);
        grootle_size_bytes(n, self.x.len())
    }
}

impl ToTranscript for GrootleProof {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.a.append_to(bytes);
        self.b.append_to(bytes);
        self.f.append_to(bytes);
        self.x.append_to(bytes);
        self.z_a.append_to(bytes);
        self.z.append_to(bytes);
    }
}

/// X + f + {A, B, zA, z}
pub fn grootle_size_bytes(n: usize, m: usize) -> usize {
    if n == 0 || m == 0 {
        return 0;
    }
    32 * (m + m * (n - 1) + 4)
}

fn check_size_params(n: usize, m: usize) -> Result<usize, CryptoError> {
    if n <= 1 || m <= 1 {
        return Err(CryptoError::BadParameters(format!("grootle needs n > 1 and m > 1 (n={n}, m={m})")));
    }
    if n.saturating_mul(m) > GROOTLE_MAX_MN {
        return Err(CryptoError::BadParameters(format!("grootle n*m exceeds {GROOTLE_MAX_MN}")));
    }
    uint_pow(n as u64, m as u32)
        .map(|size| size as usize)
        .ok_or_else(|| CryptoError::BadParameters("reference set size overflows".into()))
}

// ─── Matrix commitment ──────────────────────────────────────────────────────

/// C = x G + {M_A} -> Hi_A + {M_B} -> Hi_B
///
/// Rows are concatenated; Hi_A and Hi_B alternate through the generator
/// factory (even indices for A, odd for B).
fn matrix_commitment(
    blinding: &Scalar,
    m_a: &[Vec<Scalar>],
    m_b: &[Vec<Scalar>],
    factory: &[EdwardsPoint],
) -> EdwardsPoint {
    let mut scalars = vec![*blinding];
    let mut points = vec![generators::g()];
    for (j, (row_a, row_b)) in m_a.iter().zip(m_b).enumerate() {
        let n = row_a.len();
        for i in 0..n {
            scalars.push(row_a[i]);
            points.push(factory[2 * (j * n + i)]);
            scalars.push(row_b[i]);
            points.push(factory[2 * (j * n + i) + 1]);
        }
    }
    EdwardsPoint::multiscalar_mul(&scalars, &points)
}

// ─── Fiat-Shamir ────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn compute_challenge(
    message: &[u8; 32],
    n: usize,
    m: usize,
    reference_set: &[EdwardsPoint],
    offset: &EdwardsPoint,
    a: &CompressedEdwardsY,
    b: &CompressedEdwardsY,
    x: &[CompressedEdwardsY],
) -> Result<Scalar, CryptoError> {
    let mut transcript =
        SpTranscript::new(domain::GROOTLE_CHALLENGE, 16 + (reference_set.len() + x.len() + 4) * 32);
    transcript
        .append("message", message)
        .append("n", &n)
        .append("m", &m)
        .append("S", reference_set)
        .append("C_offset", offset)
        .append("A", a)
        .append("B", b)
        .append("X", x);
    let challenge = transcript.hash_to_scalar();
    if challenge == Scalar::ZERO {
        return Err(CryptoError::Proving("grootle challenge is zero".into()));
    }
    Ok(challenge)
}

// ─── Prove ──────────────────────────────────────────────────────────────────

/// Prove that `reference_set[l] - offset = privkey G`.
pub fn make_grootle_proof(
    message: &[u8; 32],
    reference_set: &[EdwardsPoint],
    l: usize,
    offset: &EdwardsPoint,
    privkey: &Scalar,
    n: usize,
    m: usize,
) -> Result<GrootleProof, CryptoError> {
    let ref_set_size = check_size_params(n, m)?;
    if reference_set.len() != ref_set_size {
        return Err(CryptoError::BadParameters(format!(
            "reference set has {} elements, expected {ref_set_size}",
            reference_set.len()
        )));
    }
    if l >= ref_set_size {
        return Err(CryptoError::BadParameters("signing index out of bounds".into()));
    }
    if EdwardsPoint::mul_base(privkey) != reference_set[l] - offset {
        return Err(CryptoError::Proving("bad grootle signing key".into()));
    }

    let factory = generators::factory_generators(2 * m * n)?;
    let identity_err = |what: &str| CryptoError::Proving(format!("grootle {what} is the identity"));

    // A = dual_matrix_commit(rA, a, -a^2), rows of a sum to zero
    let r_a = random_scalar();
    let r_b = random_scalar();
    let mut a = vec![vec![Scalar::ZERO; n]; m];
    let mut a_sq = vec![vec![Scalar::ZERO; n]; m];
    for j in 0..m {
        let mut row_sum = Scalar::ZERO;
        for i in 1..n {
            a[j][i] = random_scalar();
            row_sum += a[j][i];
        }
        a[j][0] = -row_sum;
        for i in 0..n {
            a_sq[j][i] = -(a[j][i] * a[j][i]);
        }
    }
    let a_point = matrix_commitment(&r_a, &a, &a_sq, &factory);
    if a_point.is_identity() {
        return Err(identity_err("A"));
    }

    // B = dual_matrix_commit(rB, sigma, a(1 - 2 sigma))
    let decomp_l = decompose(l, n, m);
    let mut sigma = vec![vec![Scalar::ZERO; n]; m];
    let mut a_sigma = vec![vec![Scalar::ZERO; n]; m];
    for j in 0..m {
        for i in 0..n {
            sigma[j][i] = kronecker_delta(decomp_l[j], i);
            a_sigma[j][i] = (Scalar::ONE - Scalar::from(2u8) * sigma[j][i]) * a[j][i];
        }
    }
    let b_point = matrix_commitment(&r_b, &sigma, &a_sigma, &factory);
    if b_point.is_identity() {
        return Err(identity_err("B"));
    }

    let proof_a = (inv_eight() * a_point).compress();
    let proof_b = (inv_eight() * b_point).compress();

    // p[k]: coefficients of prod_j (a[j][d_k[j]] + delta(d_l[j], d_k[j]) xi)
    let mut p = Vec::with_capacity(ref_set_size);
    for k in 0..ref_set_size {
        let decomp_k = decompose(k, n, m);
        let mut coeffs = vec![Scalar::ZERO; m + 1];
        coeffs[0] = a[0][decomp_k[0]];
        coeffs[1] = kronecker_delta(decomp_l[0], decomp_k[0]);
        for j in 1..m {
            let factor = [a[j][decomp_k[j]], kronecker_delta(decomp_l[j], decomp_k[j])];
            coeffs = convolve(&coeffs, &factor, m);
        }
        p.push(coeffs);
    }

    // X[j] = sum_k p[k][j] (S[k] - offset) + rho[j] G
    let offset_diffs: Vec<EdwardsPoint> = reference_set.iter().map(|s| s - offset).collect();
    let rho: Vec<Scalar> = (0..m).map(|_| random_scalar()).collect();
    let mut proof_x = Vec::with_capacity(m);
    for j in 0..m {
        let coeffs = p.iter().map(|pk| pk[j]);
        let x_j = EdwardsPoint::multiscalar_mul(coeffs, &offset_diffs) + EdwardsPoint::mul_base(&rho[j]);
        if x_j.is_identity() {
            return Err(identity_err("X"));
        }
        proof_x.push((inv_eight() * x_j).compress());
    }

    let xi = compute_challenge(message, n, m, reference_set, offset, &proof_a, &proof_b, &proof_x)?;
    let xi_pow = powers_of_scalar(&xi, m + 1, false);

    // f[j][i-1] = sigma[j][i] xi + a[j][i]
    let mut f = vec![vec![Scalar::ZERO; n - 1]; m];
    for j in 0..m {
        for i in 1..n {
            f[j][i - 1] = sigma[j][i] * xi + a[j][i];
            if f[j][i - 1] == Scalar::ZERO {
                return Err(CryptoError::Proving("grootle f element is zero".into()));
            }
        }
    }

    let z_a = xi * r_b + r_a;
    if z_a == Scalar::ZERO {
        return Err(CryptoError::Proving("grootle zA is zero".into()));
    }

    let mut z = privkey * xi_pow[m];
    for j in 0..m {
        z -= rho[j] * xi_pow[j];
    }
    if z == Scalar::ZERO {
        return Err(CryptoError::Proving("grootle z is zero".into()));
    }

    Ok(GrootleProof {
        a: proof_a,
        b: proof_b,
        f,
        x: proof_x,
        z_a,
        z,
    })
}

// ─── Verify ─────────────────────────────────────────────────────────────────

fn check_proof_shape(proof: &GrootleProof, n: usize, m: usize) -> Result<(), CryptoError> {
    let bad = |what: &str| Err(CryptoError::BadParameters(format!("grootle proof: {what}")));
    if proof.x.len() != m {
        return bad("wrong X length");
    }
    if proof.f.len() != m || proof.f.iter().any(|row| row.len() != n - 1) {
        return bad("wrong f matrix shape");
    }
    if proof.f.iter().flatten().any(|f| *f == Scalar::ZERO) {
        return bad("zero f element");
    }
    if proof.z_a == Scalar::ZERO || proof.z == Scalar::ZERO {
        return bad("zero response scalar");
    }
    Ok(())
}

fn build_verification_builders(
    proof: &GrootleProof,
    message: &[u8; 32],
    reference_set: &[EdwardsPoint],
    offset: &EdwardsPoint,
    n: usize,
    m: usize,
) -> Result<[SpMultiexpBuilder; 2], CryptoError> {
    let ref_set_size = reference_set.len();
    let xi = compute_challenge(message, n, m, reference_set, offset, &proof.a, &proof.b, &proof.x)?;
    let minus_xi_pow = powers_of_scalar(&xi, m, true);

    let a_point = mul8(&decompress(&proof.a)?);
    let b_point = mul8(&decompress(&proof.b)?);
    let x_points = proof
        .x
        .iter()
        .map(|x| Ok(mul8(&decompress(x)?)))
        .collect::<Result<Vec<_>, CryptoError>>()?;

    // f[j][0] = xi - sum_i f[j][i]
    let mut f = vec![vec![Scalar::ZERO; n]; m];
    for j in 0..m {
        let mut implied = xi;
        for i in 1..n {
            f[j][i] = proof.f[j][i - 1];
            implied -= proof.f[j][i - 1];
        }
        f[j][0] = implied;
        if f[j][0] == Scalar::ZERO {
            return Err(CryptoError::BadParameters("grootle proof: implied f element is zero".into()));
        }
    }

    // builder 1: A + xi B == dual_matrix_commit(zA, f, f (xi - f))
    let mut builder1 = SpMultiexpBuilder::with_random_weight(2 * m * n, 2);
    builder1.add_g_element(proof.z_a);
    for j in 0..m {
        for i in 0..n {
            builder1.add_element_at_generator_index(f[j][i], 2 * (j * n + i));
            builder1.add_element_at_generator_index(f[j][i] * (xi - f[j][i]), 2 * (j * n + i) + 1);
        }
    }
    builder1.add_element(-Scalar::ONE, a_point);
    builder1.add_element(-xi, b_point);

    // builder 2: sum_k t_k (S[k] - offset) - sum_j xi^j X[j] - z G == 0
    let mut builder2 = SpMultiexpBuilder::with_random_weight(0, ref_set_size + m + 1);
    let mut sum_t = Scalar::ZERO;
    for (k, s_k) in reference_set.iter().enumerate() {
        let decomp_k = decompose(k, n, m);
        let mut t_k = Scalar::ONE;
        for j in 0..m {
            t_k *= f[j][decomp_k[j]];
        }
        sum_t += t_k;
        builder2.add_element(t_k, *s_k);
    }
    builder2.add_element(-sum_t, *offset);
    for j in 0..m {
        builder2.add_element(minus_xi_pow[j], x_points[j]);
    }
    builder2.add_g_element(-proof.z);

    Ok([builder1, builder2])
}

/// Multiexp builders for a batch of proofs sharing the decomposition `n^m`.
pub fn get_grootle_verification_data(
    proofs: &[&GrootleProof],
    messages: &[[u8; 32]],
    reference_sets: &[Vec<EdwardsPoint>],
    offsets: &[EdwardsPoint],
    n: usize,
    m: usize,
) -> Result<Vec<SpMultiexpBuilder>, CryptoError> {
    if proofs.is_empty() {
        return Err(CryptoError::BadParameters("no grootle proofs to verify".into()));
    }
    let ref_set_size = check_size_params(n, m)?;
    if messages.len() != proofs.len() || reference_sets.len() != proofs.len() || offsets.len() != proofs.len() {
        return Err(CryptoError::BadParameters("grootle verification inputs don't line up".into()));
    }
    if reference_sets.iter().any(|set| set.len() != ref_set_size) {
        return Err(CryptoError::BadParameters("grootle reference set has the wrong size".into()));
    }

    let mut builders = Vec::with_capacity(2 * proofs.len());
    for (i, proof) in proofs.iter().enumerate() {
        check_proof_shape(proof, n, m)?;
        builders.extend(build_verification_builders(
            proof,
            &messages[i],
            &reference_sets[i],
            &offsets[i],
            n,
            m,
        )?);
    }
    Ok(builders)
}

pub fn verify_grootle_proof(
    proof: &GrootleProof,
    message: &[u8; 32],
    reference_set: &[EdwardsPoint],
    offset: &EdwardsPoint,
    n: usize,
    m: usize,
) -> bool {
    let builders = match get_grootle_verification_data(
        &[proof],
        &[*message],
        &[reference_set.to_vec()],
        &[*offset],
        n,
        m,
    ) {
        Ok(builders) => builders,
        Err(e) => {
            log::debug!(target: "seraphis::crypto", "grootle verification data rejected: {e}");
            return false;
        }
    };
    crate::SpMultiexp::new(&builders)
        .map(|multiexp| multiexp.evaluates_to_point_at_infinity())
        .unwrap_or(false)
}
