//! Legacy (pre-seraphis) inputs: proposals, CLSAG ring signatures, and
//! finished legacy inputs.
//!
//! A legacy enote `Ko = (k_v_ext + k_s) G` is spent by masking its
//! commitment `C" = t_c G + C` and signing over a ring of `(Ko, C)` pairs
//! with pseudo-output `C"`.

use std::collections::BTreeSet;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::Rng;
use seraphis_crypto::clsag::{clsag_sign, clsag_verify};
use seraphis_crypto::transcript::domain;
use seraphis_crypto::{commit, make_legacy_key_image, mask_key, random_mask, random_scalar, KeyImage, SpTranscript};

use crate::components::LegacyRingSignature;
use crate::enote::{check_key_image, check_mask, compare_keys, point, LegacyEnoteImage, LegacyRingMember};
use crate::logging::BUILDER;
use crate::validation::TxValidationContext;
use crate::TxError;

// ─── Proposals ──────────────────────────────────────────────────────────────

/// Intent to spend one legacy enote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyInputProposal {
    pub onetime_address: CompressedEdwardsY,
    pub amount_commitment: CompressedEdwardsY,
    pub key_image: KeyImage,
    /// k_v_ext, with Ko = k_v_ext G + K_s
    pub enote_view_extension: Scalar,
    pub amount: u64,
    pub amount_blinding_factor: Scalar,
    /// t_c
    pub commitment_mask: Scalar,
}

impl LegacyInputProposal {
    pub fn enote_image(&self) -> Result<LegacyEnoteImage, TxError> {
        Ok(LegacyEnoteImage {
            masked_commitment: mask_key(&self.commitment_mask, &point(&self.amount_commitment)?).compress(),
            key_image: self.key_image,
        })
    }

    /// t_c + x
    pub fn masked_blinding_factor(&self) -> Scalar {
        self.commitment_mask + self.amount_blinding_factor
    }
}

pub fn sort_legacy_input_proposals(proposals: &mut [LegacyInputProposal]) {
    proposals.sort_by(|a, b| compare_keys(&a.key_image, &b.key_image));
}

/// Random legacy enote owned by `legacy_spend_privkey`, as a proposal.
pub fn gen_legacy_input_proposal(legacy_spend_privkey: &Scalar, amount: u64) -> LegacyInputProposal {
    let view_extension = random_scalar();
    let blinding = random_scalar();
    let onetime_privkey = view_extension + legacy_spend_privkey;
    let onetime_address = EdwardsPoint::mul_base(&onetime_privkey).compress();

    LegacyInputProposal {
        onetime_address,
        amount_commitment: commit(amount, &blinding).compress(),
        key_image: make_legacy_key_image(&onetime_privkey, &onetime_address),
        enote_view_extension: view_extension,
        amount,
        amount_blinding_factor: blinding,
        commitment_mask: random_mask(),
    }
}

pub fn check_legacy_input_proposal_semantics(
    proposal: &LegacyInputProposal,
    legacy_spend_pubkey: &EdwardsPoint,
) -> Result<(), TxError> {
    // 1. Ko = k_v_ext G + K_s
    let onetime_address = mask_key(&proposal.enote_view_extension, legacy_spend_pubkey).compress();
    if onetime_address != proposal.onetime_address {
        return Err(TxError::ProposalInconsistent("could not reproduce the legacy onetime address".into()));
    }

    // 2. KI must be usable; ownership of it is checked by the ring signature
    check_key_image(&proposal.key_image)?;

    // 3. C = x G + a H
    if commit(proposal.amount, &proposal.amount_blinding_factor).compress() != proposal.amount_commitment {
        return Err(TxError::ProposalInconsistent("could not reproduce the legacy amount commitment".into()));
    }

    check_mask(&proposal.commitment_mask)
}

// ─── Ring signatures ────────────────────────────────────────────────────────

/// H_32(tx proposal prefix, reference set)
pub fn make_legacy_ring_signature_message(tx_proposal_prefix: &[u8; 32], reference_set: &[u64]) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::LEGACY_RING_SIGNATURE_MESSAGE, 32 + 8 * reference_set.len());
    transcript
        .append("tx_proposal_prefix", tx_proposal_prefix)
        .append("reference_set", reference_set);
    transcript.hash_to_32()
}

pub(crate) fn reference_set_sorted_and_unique(reference_set: &[u64]) -> bool {
    reference_set.windows(2).all(|w| w[0] < w[1])
}

/// Ring members, the real one's position, and the secrets to sign with.
#[derive(Debug, Clone)]
pub struct LegacyRingSignaturePrep {
    pub tx_proposal_prefix: [u8; 32],
    /// Ledger indices, ascending.
    pub reference_set: Vec<u64>,
    pub referenced_enotes: Vec<LegacyRingMember>,
    pub real_reference_index: usize,
    pub reference_image: LegacyEnoteImage,
    pub reference_view_privkey: Scalar,
    pub reference_commitment_mask: Scalar,
}

/// Draw `ring_size - 1` decoys from `[0, num_ledger_enotes)` around the real
/// enote at `real_ledger_index` and fetch the ring from `context`.
pub fn make_legacy_ring_signature_prep(
    context: &dyn TxValidationContext,
    proposal: &LegacyInputProposal,
    tx_proposal_prefix: &[u8; 32],
    real_ledger_index: u64,
    num_ledger_enotes: u64,
    ring_size: usize,
) -> Result<LegacyRingSignaturePrep, TxError> {
    if ring_size == 0 || (ring_size as u64) > num_ledger_enotes || real_ledger_index >= num_ledger_enotes {
        return Err(TxError::OutOfRange(format!(
            "ring of {ring_size} with real index {real_ledger_index} over {num_ledger_enotes} legacy enotes"
        )));
    }

    let mut rng = rand::thread_rng();
    let mut indices = BTreeSet::from([real_ledger_index]);
    while indices.len() < ring_size {
        indices.insert(rng.gen_range(0..num_ledger_enotes));
    }
    let reference_set: Vec<u64> = indices.into_iter().collect();
    let real_reference_index = reference_set
        .iter()
        .position(|index| *index == real_ledger_index)
        .ok_or_else(|| TxError::AssemblyFailed("real index dropped from the ring".into()))?;

    let referenced_enotes = context.get_legacy_reference_elements(&reference_set)?;
    let real_member = referenced_enotes
        .get(real_reference_index)
        .ok_or_else(|| TxError::AssemblyFailed("ledger returned a short ring".into()))?;
    if real_member.onetime_address != proposal.onetime_address
        || real_member.amount_commitment != proposal.amount_commitment
    {
        return Err(TxError::ProposalInconsistent(format!(
            "legacy enote {real_ledger_index} is not the proposed enote"
        )));
    }

    Ok(LegacyRingSignaturePrep {
        tx_proposal_prefix: *tx_proposal_prefix,
        reference_set,
        referenced_enotes,
        real_reference_index,
        reference_image: proposal.enote_image()?,
        reference_view_privkey: proposal.enote_view_extension,
        reference_commitment_mask: proposal.commitment_mask,
    })
}

pub fn make_legacy_ring_signature(
    prep: &LegacyRingSignaturePrep,
    legacy_spend_privkey: &Scalar,
) -> Result<LegacyRingSignature, TxError> {
    if !reference_set_sorted_and_unique(&prep.reference_set) {
        return Err(TxError::SemanticsViolation("legacy reference set is not sorted and unique".into()));
    }
    if prep.reference_set.len() != prep.referenced_enotes.len() {
        return Err(TxError::AssemblyFailed("reference set and ring members differ in length".into()));
    }
    let real = prep
        .referenced_enotes
        .get(prep.real_reference_index)
        .ok_or_else(|| TxError::OutOfRange("real reference index outside the ring".into()))?;

    // 1. the real member must be ours: Ko = (k_v_ext + k_s) G
    let onetime_privkey = prep.reference_view_privkey + legacy_spend_privkey;
    if EdwardsPoint::mul_base(&onetime_privkey).compress() != real.onetime_address {
        return Err(TxError::ProposalInconsistent("legacy spend key does not own the real ring member".into()));
    }

    // 2. C" = t_c G + C
    let masked_commitment = mask_key(&prep.reference_commitment_mask, &point(&real.amount_commitment)?).compress();
    if masked_commitment != prep.reference_image.masked_commitment {
        return Err(TxError::ProposalInconsistent("masked commitment does not match the real ring member".into()));
    }

    // 3. C - C" = -t_c G
    let ring: Vec<CompressedEdwardsY> = prep.referenced_enotes.iter().map(|m| m.onetime_address).collect();
    let commitments: Vec<CompressedEdwardsY> = prep.referenced_enotes.iter().map(|m| m.amount_commitment).collect();
    let message = make_legacy_ring_signature_message(&prep.tx_proposal_prefix, &prep.reference_set);
    let clsag_proof = clsag_sign(
        &message,
        &ring,
        &onetime_privkey,
        &commitments,
        &(-prep.reference_commitment_mask),
        &masked_commitment,
        prep.real_reference_index,
    )
    .map_err(|e| BUILDER.fail("legacy ring signature", TxError::InvalidInputProof(e.to_string())))?;

    if clsag_proof.key_image != prep.reference_image.key_image {
        return Err(TxError::ProposalInconsistent("ring signature key image differs from the proposal's".into()));
    }

    Ok(LegacyRingSignature {
        clsag_proof,
        reference_set: prep.reference_set.clone(),
    })
}

/// Sign every prep; all must share one proposal prefix.
pub fn make_legacy_ring_signatures(
    mut preps: Vec<LegacyRingSignaturePrep>,
    legacy_spend_privkey: &Scalar,
) -> Result<Vec<LegacyRingSignature>, TxError> {
    if let Some(first) = preps.first() {
        let prefix = first.tx_proposal_prefix;
        if preps.iter().any(|prep| prep.tx_proposal_prefix != prefix) {
            return Err(TxError::ProposalInconsistent("ring signature preps sign different proposal prefixes".into()));
        }
    }
    preps.sort_by(|a, b| compare_keys(&a.reference_image.key_image, &b.reference_image.key_image));
    preps
        .iter()
        .map(|prep| make_legacy_ring_signature(prep, legacy_spend_privkey))
        .collect()
}

// ─── Legacy inputs ──────────────────────────────────────────────────────────

/// A fully signed legacy input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyInput {
    pub input_image: LegacyEnoteImage,
    pub ring_signature: LegacyRingSignature,
    pub input_amount: u64,
    /// t_c + x
    pub input_masked_commitment_blinding_factor: Scalar,
    pub ring_members: Vec<LegacyRingMember>,
    pub tx_proposal_prefix: [u8; 32],
}

impl LegacyInput {
    pub fn key_image(&self) -> &KeyImage {
        &self.input_image.key_image
    }
}

pub fn check_legacy_input_semantics(input: &LegacyInput) -> Result<(), TxError> {
    let masked_commitment =
        commit(input.input_amount, &input.input_masked_commitment_blinding_factor).compress();
    if masked_commitment != input.input_image.masked_commitment {
        return Err(TxError::ProposalInconsistent("legacy masked commitment does not open".into()));
    }
    if input.ring_signature.clsag_proof.key_image != input.input_image.key_image {
        return Err(TxError::ProposalInconsistent("legacy image and ring signature key images differ".into()));
    }

    let reference_set = &input.ring_signature.reference_set;
    if !reference_set_sorted_and_unique(reference_set) {
        return Err(TxError::SemanticsViolation("legacy reference set is not sorted and unique".into()));
    }
    if reference_set.len() != input.ring_members.len() {
        return Err(TxError::SemanticsViolation("legacy reference set and ring members differ in length".into()));
    }

    let ring: Vec<CompressedEdwardsY> = input.ring_members.iter().map(|m| m.onetime_address).collect();
    let commitments: Vec<CompressedEdwardsY> = input.ring_members.iter().map(|m| m.amount_commitment).collect();
    let message = make_legacy_ring_signature_message(&input.tx_proposal_prefix, reference_set);
    if !clsag_verify(&message, &input.ring_signature.clsag_proof, &ring, &commitments, &masked_commitment) {
        return Err(TxError::InvalidInputProof("legacy ring signature does not verify".into()));
    }
    Ok(())
}

pub fn make_legacy_input(
    proposal: &LegacyInputProposal,
    tx_proposal_prefix: &[u8; 32],
    ring_signature: LegacyRingSignature,
    ring_members: Vec<LegacyRingMember>,
    legacy_spend_pubkey: &EdwardsPoint,
) -> Result<LegacyInput, TxError> {
    check_legacy_input_proposal_semantics(proposal, legacy_spend_pubkey)?;

    let input = LegacyInput {
        input_image: proposal.enote_image()?,
        ring_signature,
        input_amount: proposal.amount,
        input_masked_commitment_blinding_factor: proposal.masked_blinding_factor(),
        ring_members,
        tx_proposal_prefix: *tx_proposal_prefix,
    };
    check_legacy_input_semantics(&input)?;
    Ok(input)
}

/// Pair each proposal with the ring signature over its key image.
pub fn make_legacy_inputs(
    proposals: &[LegacyInputProposal],
    tx_proposal_prefix: &[u8; 32],
    ring_signatures: Vec<LegacyRingSignature>,
    rings: Vec<Vec<LegacyRingMember>>,
    legacy_spend_pubkey: &EdwardsPoint,
) -> Result<Vec<LegacyInput>, TxError> {
    if proposals.len() != ring_signatures.len() || proposals.len() != rings.len() {
        return Err(TxError::AssemblyFailed(format!(
            "{} legacy proposals, {} ring signatures, {} rings",
            proposals.len(),
            ring_signatures.len(),
            rings.len()
        )));
    }

    let mut pending: Vec<Option<(LegacyRingSignature, Vec<LegacyRingMember>)>> =
        ring_signatures.into_iter().zip(rings).map(Some).collect();
    proposals
        .iter()
        .map(|proposal| {
            let (signature, ring) = pending
                .iter_mut()
                .find(|slot| {
                    slot.as_ref()
                        .is_some_and(|(signature, _)| signature.clsag_proof.key_image == proposal.key_image)
                })
                .and_then(Option::take)
                .ok_or_else(|| TxError::AssemblyFailed("a legacy proposal has no ring signature".into()))?;
            make_legacy_input(proposal, tx_proposal_prefix, signature, ring, legacy_spend_pubkey)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seraphis_crypto::random_point;

    fn ring_around(proposal: &LegacyInputProposal, size: usize, real: usize) -> Vec<LegacyRingMember> {
        (0..size)
            .map(|i| {
                if i == real {
                    LegacyRingMember {
                        onetime_address: proposal.onetime_address,
                        amount_commitment: proposal.amount_commitment,
                    }
                } else {
                    LegacyRingMember {
                        onetime_address: random_point().compress(),
                        amount_commitment: random_point().compress(),
                    }
                }
            })
            .collect()
    }

    fn prep_for(proposal: &LegacyInputProposal, prefix: [u8; 32]) -> LegacyRingSignaturePrep {
        LegacyRingSignaturePrep {
            tx_proposal_prefix: prefix,
            reference_set: vec![3, 8, 20, 21],
            referenced_enotes: ring_around(proposal, 4, 2),
            real_reference_index: 2,
            reference_image: proposal.enote_image().unwrap(),
            reference_view_privkey: proposal.enote_view_extension,
            reference_commitment_mask: proposal.commitment_mask,
        }
    }

    #[test]
    fn test_legacy_proposal_semantics() {
        let k_s = random_scalar();
        let proposal = gen_legacy_input_proposal(&k_s, 5);
        let spend_pubkey = EdwardsPoint::mul_base(&k_s);
        assert!(check_legacy_input_proposal_semantics(&proposal, &spend_pubkey).is_ok());
        assert!(matches!(
            check_legacy_input_proposal_semantics(&proposal, &random_point()),
            Err(TxError::ProposalInconsistent(_))
        ));

        let mut bad_mask = proposal;
        bad_mask.commitment_mask = Scalar::ZERO;
        assert!(matches!(
            check_legacy_input_proposal_semantics(&bad_mask, &spend_pubkey),
            Err(TxError::InvalidMask(_))
        ));
    }

    #[test]
    fn test_legacy_input_round_trip() {
        let k_s = random_scalar();
        let proposal = gen_legacy_input_proposal(&k_s, 1);
        let prefix = [4u8; 32];
        let prep = prep_for(&proposal, prefix);
        let ring = prep.referenced_enotes.clone();

        let signature = make_legacy_ring_signature(&prep, &k_s).unwrap();
        let input = make_legacy_input(&proposal, &prefix, signature, ring, &EdwardsPoint::mul_base(&k_s)).unwrap();
        assert_eq!(input.input_amount, 1);

        let mut wrong_prefix = input.clone();
        wrong_prefix.tx_proposal_prefix = [5u8; 32];
        assert!(matches!(check_legacy_input_semantics(&wrong_prefix), Err(TxError::InvalidInputProof(_))));

        let mut unsorted = input;
        unsorted.ring_signature.reference_set.swap(0, 1);
        assert!(matches!(check_legacy_input_semantics(&unsorted), Err(TxError::SemanticsViolation(_))));
    }

    #[test]
    fn test_ring_signature_rejects_foreign_key() {
        let proposal = gen_legacy_input_proposal(&random_scalar(), 2);
        let prep = prep_for(&proposal, [0u8; 32]);
        assert!(matches!(
            make_legacy_ring_signature(&prep, &random_scalar()),
            Err(TxError::ProposalInconsistent(_))
        ));
    }

    #[test]
    fn test_ring_signatures_share_prefix() {
        let k_s = random_scalar();
        let a = gen_legacy_input_proposal(&k_s, 1);
        let b = gen_legacy_input_proposal(&k_s, 1);
        let preps = vec![prep_for(&a, [1u8; 32]), prep_for(&b, [2u8; 32])];
        assert!(matches!(
            make_legacy_ring_signatures(preps, &k_s),
            Err(TxError::ProposalInconsistent(_))
        ));

        let preps = vec![prep_for(&a, [1u8; 32]), prep_for(&b, [1u8; 32])];
        let signatures = make_legacy_ring_signatures(preps, &k_s).unwrap();
        assert!(compare_keys(&signatures[0].clsag_proof.key_image, &signatures[1].clsag_proof.key_image).is_lt());
    }
}
