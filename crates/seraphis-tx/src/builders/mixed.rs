//! Transaction proposals and partial transactions mixing legacy and seraphis
//! inputs.
//!
//! A [`TxProposal`] fixes everything a tx commits to except its proofs. Its
//! proposal prefix is the message every ring signature and image proof
//! signs. A [`SpPartialTx`] is the proposal with signed inputs and a balance
//! proof attached; membership proofs are the last thing added.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use rand::Rng;
use seraphis_crypto::bulletproofs_plus::bulletproof_plus_prove;
use seraphis_crypto::transcript::domain;
use seraphis_crypto::{extend_seraphis_spendkey_x, random_point, KeyImage, SpTranscript};
use seraphis_types::{SemanticRulesVersion, TxVersion};

use crate::builders::inputs::{
    check_input_proposal_semantics, check_partial_input_semantics, make_alignable_membership_proof,
    make_membership_proof_prep_for_enote, make_standard_input_context, sort_input_proposals, SpInputProposal,
    SpPartialInput,
};
use crate::builders::legacy_inputs::{
    check_legacy_input_proposal_semantics, check_legacy_input_semantics, sort_legacy_input_proposals, LegacyInput,
    LegacyInputProposal,
};
use crate::builders::outputs::{
    check_output_proposal_set_semantics, check_selfsend_proposal_semantics, check_tx_supplement_semantics_v2,
    make_outputs, make_tx_supplement, sort_output_proposals, SpOutputProposal, SpOutputSet,
};
use crate::components::{
    ref_set_size, LegacyRingSignature, SpAlignableMembershipProof, SpBalanceProof, SpImageProof, SpTxSupplement,
};
use crate::discretized_fee::DiscretizedFee;
use crate::enote::{
    compare_keys, keys_sorted_and_unique, LegacyEnoteImage, LegacyRingMember, SpEnote, SpEnoteCoreVariant,
    SpEnoteImage,
};
use crate::index_mapper::FlatIndexMapper;
use crate::jamtis::{JamtisPaymentProposal, JamtisPaymentProposalSelfSend};
use crate::logging::BUILDER;
use crate::tx_extra::{make_tx_extra, try_get_extra_field_elements, ExtraFieldElement, TxExtra};
use crate::txtype::squashed_v1::{make_sp_tx_squashed_v1, SpTxParamPackV1};
use crate::validation::{SimpleValidationContext, TxValidatorRegistry};
use crate::TxError;

// ─── Proposal prefix ────────────────────────────────────────────────────────

/// H_32(version, legacy KIs, seraphis KIs, outputs, fee, supplement)
pub fn make_tx_proposal_prefix(
    tx_version: &TxVersion,
    legacy_key_images: &[KeyImage],
    sp_key_images: &[KeyImage],
    outputs: &[SpEnote],
    tx_fee: &DiscretizedFee,
    tx_supplement: &SpTxSupplement,
) -> [u8; 32] {
    let mut transcript = SpTranscript::new(
        domain::TX_PROPOSAL_MESSAGE,
        3 + 32 * (legacy_key_images.len() + sp_key_images.len())
            + outputs.len() * SpEnote::SIZE_BYTES
            + DiscretizedFee::size_bytes()
            + tx_supplement.size_bytes(),
    );
    transcript
        .append("tx_version", &tx_version.to_bytes())
        .append("legacy_input_key_images", legacy_key_images)
        .append("sp_input_key_images", sp_key_images)
        .append("output_enotes", outputs)
        .append("tx_fee", tx_fee)
        .append("tx_supplement", tx_supplement);
    transcript.hash_to_32()
}

// ─── Tx proposal ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TxProposal {
    /// Sorted by key image.
    pub legacy_input_proposals: Vec<LegacyInputProposal>,
    /// Sorted by key image.
    pub sp_input_proposals: Vec<SpInputProposal>,
    pub normal_payment_proposals: Vec<JamtisPaymentProposal>,
    pub selfsend_payment_proposals: Vec<JamtisPaymentProposalSelfSend>,
    pub tx_fee: DiscretizedFee,
    pub partial_memo: TxExtra,
}

impl TxProposal {
    pub fn new(
        mut legacy_input_proposals: Vec<LegacyInputProposal>,
        mut sp_input_proposals: Vec<SpInputProposal>,
        normal_payment_proposals: Vec<JamtisPaymentProposal>,
        selfsend_payment_proposals: Vec<JamtisPaymentProposalSelfSend>,
        tx_fee: DiscretizedFee,
        additional_memo_elements: Vec<ExtraFieldElement>,
    ) -> Result<Self, TxError> {
        sort_legacy_input_proposals(&mut legacy_input_proposals);
        sort_input_proposals(&mut sp_input_proposals);
        Ok(Self {
            legacy_input_proposals,
            sp_input_proposals,
            normal_payment_proposals,
            selfsend_payment_proposals,
            tx_fee,
            partial_memo: make_tx_extra(additional_memo_elements)?,
        })
    }

    pub fn legacy_key_images(&self) -> Vec<KeyImage> {
        self.legacy_input_proposals.iter().map(|p| p.key_image).collect()
    }

    pub fn sp_key_images(&self) -> Vec<KeyImage> {
        self.sp_input_proposals.iter().map(|p| p.key_image).collect()
    }

    pub fn input_context(&self) -> Result<[u8; 32], TxError> {
        make_standard_input_context(
            self.legacy_input_proposals.iter().map(|p| &p.key_image),
            self.sp_input_proposals.iter().map(|p| &p.key_image),
        )
    }

    /// Every payment as an output proposal, sorted by onetime address.
    pub fn output_proposals(&self, k_view_balance: &Scalar) -> Result<Vec<SpOutputProposal>, TxError> {
        let input_context = self.input_context()?;
        let mut proposals = Vec::with_capacity(
            self.normal_payment_proposals.len() + self.selfsend_payment_proposals.len(),
        );
        for payment in &self.normal_payment_proposals {
            proposals.push(payment.output_proposal(&input_context)?);
        }
        for payment in &self.selfsend_payment_proposals {
            proposals.push(payment.output_proposal(k_view_balance, &input_context)?);
        }
        sort_output_proposals(&mut proposals);
        Ok(proposals)
    }

    fn outputs_and_supplement(&self, k_view_balance: &Scalar) -> Result<(SpOutputSet, SpTxSupplement), TxError> {
        let proposals = self.output_proposals(k_view_balance)?;
        let outputs = make_outputs(&proposals)?;
        let supplement = make_tx_supplement(&self.partial_memo, &proposals, outputs.enote_ephemeral_pubkeys.clone())?;
        Ok((outputs, supplement))
    }

    pub fn total_input_amount(&self) -> u128 {
        self.legacy_input_proposals.iter().map(|p| p.amount as u128).sum::<u128>()
            + self.sp_input_proposals.iter().map(|p| p.amount as u128).sum::<u128>()
    }

    pub fn total_output_amount(&self) -> u128 {
        self.normal_payment_proposals.iter().map(|p| p.amount as u128).sum::<u128>()
            + self.selfsend_payment_proposals.iter().map(|p| p.amount as u128).sum::<u128>()
    }

    pub fn proposal_prefix(&self, tx_version: &TxVersion, k_view_balance: &Scalar) -> Result<[u8; 32], TxError> {
        let (outputs, supplement) = self.outputs_and_supplement(k_view_balance)?;
        Ok(make_tx_proposal_prefix(
            tx_version,
            &self.legacy_key_images(),
            &self.sp_key_images(),
            &outputs.enotes,
            &self.tx_fee,
            &supplement,
        ))
    }
}

/// Full consistency check of a proposal against the wallet's keys.
pub fn check_tx_proposal_semantics(
    proposal: &TxProposal,
    legacy_spend_pubkey: &EdwardsPoint,
    core_spend_pubkey: &EdwardsPoint,
    k_view_balance: &Scalar,
) -> Result<(), TxError> {
    // 1. inputs
    if proposal.legacy_input_proposals.is_empty() && proposal.sp_input_proposals.is_empty() {
        return Err(TxError::ProposalInconsistent("tx proposal has no inputs".into()));
    }
    for input in &proposal.legacy_input_proposals {
        check_legacy_input_proposal_semantics(input, legacy_spend_pubkey)?;
    }
    for input in &proposal.sp_input_proposals {
        check_input_proposal_semantics(input, core_spend_pubkey, k_view_balance)?;
    }
    let legacy_key_images = proposal.legacy_key_images();
    let sp_key_images = proposal.sp_key_images();
    if !keys_sorted_and_unique(&legacy_key_images) || !keys_sorted_and_unique(&sp_key_images) {
        return Err(TxError::ProposalInconsistent("input key images are not sorted and unique".into()));
    }
    if legacy_key_images
        .iter()
        .any(|legacy| sp_key_images.iter().any(|sp| compare_keys(legacy, sp).is_eq()))
    {
        return Err(TxError::ProposalInconsistent("a key image is spent as both legacy and seraphis".into()));
    }

    // 2. at least one self-send, each recoverable by this wallet
    if proposal.selfsend_payment_proposals.is_empty() {
        return Err(TxError::ProposalInconsistent("tx proposal has no self-send output".into()));
    }
    let input_context = proposal.input_context()?;
    let spend_pubkey = extend_seraphis_spendkey_x(k_view_balance, core_spend_pubkey);
    for selfsend in &proposal.selfsend_payment_proposals {
        check_selfsend_proposal_semantics(selfsend, &input_context, &spend_pubkey, k_view_balance)?;
    }

    // 3. outputs and memo
    check_output_proposal_set_semantics(&proposal.output_proposals(k_view_balance)?)?;
    try_get_extra_field_elements(&proposal.partial_memo)
        .map_err(|e| TxError::MalformedMemo(format!("tx partial memo: {e}")))?;

    // 4. in = out + fee
    let fee = proposal.tx_fee.fee_value()?;
    if proposal.total_input_amount() != proposal.total_output_amount() + fee as u128 {
        return Err(TxError::BalanceMismatch(format!(
            "inputs {} != outputs {} + fee {fee}",
            proposal.total_input_amount(),
            proposal.total_output_amount()
        )));
    }

    // 5. supplement
    let (outputs, supplement) = proposal.outputs_and_supplement(k_view_balance)?;
    check_tx_supplement_semantics_v2(&supplement, outputs.enotes.len())
}

// ─── Balance proof ──────────────────────────────────────────────────────────

/// Range proof over the seraphis input images' masked amounts and the
/// outputs, plus the remainder
/// `sum(input masked blinding factors) - sum(output blinding factors)`.
pub fn make_balance_proof(
    legacy_input_masked_blinding_factors: &[Scalar],
    sp_input_amounts: &[u64],
    sp_input_masked_blinding_factors: &[Scalar],
    output_amounts: &[u64],
    output_blinding_factors: &[Scalar],
) -> Result<SpBalanceProof, TxError> {
    if sp_input_amounts.len() != sp_input_masked_blinding_factors.len()
        || output_amounts.len() != output_blinding_factors.len()
    {
        return Err(BUILDER.fail(
            "balance proof",
            TxError::AssemblyFailed("amounts and blinding factors are not aligned".into()),
        ));
    }

    // seraphis input images first, then outputs; legacy images are not range proved
    let range_amounts: Vec<u64> = sp_input_amounts.iter().chain(output_amounts).copied().collect();
    let range_blinding_factors: Vec<Scalar> = sp_input_masked_blinding_factors
        .iter()
        .chain(output_blinding_factors)
        .copied()
        .collect();
    let bpp_proof = bulletproof_plus_prove(&range_amounts, &range_blinding_factors)
        .map_err(|e| BUILDER.fail("balance proof", TxError::AssemblyFailed(e.to_string())))?;

    let remainder_blinding_factor = legacy_input_masked_blinding_factors
        .iter()
        .chain(sp_input_masked_blinding_factors)
        .sum::<Scalar>()
        - output_blinding_factors.iter().sum::<Scalar>();
    Ok(SpBalanceProof {
        bpp_proof,
        remainder_blinding_factor,
    })
}

// ─── Partial tx ─────────────────────────────────────────────────────────────

/// Everything but the membership proofs, plus what the membership proofs
/// will need.
#[derive(Debug, Clone)]
pub struct SpPartialTx {
    pub legacy_input_images: Vec<LegacyEnoteImage>,
    pub sp_input_images: Vec<SpEnoteImage>,
    pub outputs: Vec<SpEnote>,
    pub balance_proof: SpBalanceProof,
    pub legacy_ring_signatures: Vec<LegacyRingSignature>,
    pub sp_image_proofs: Vec<SpImageProof>,
    pub tx_fee: DiscretizedFee,
    pub tx_supplement: SpTxSupplement,

    /// Ring members of each legacy input, aligned with its signature.
    pub legacy_ring_members: Vec<Vec<LegacyRingMember>>,
    /// Aligned with `sp_input_images`.
    pub sp_input_enotes: Vec<SpEnoteCoreVariant>,
    pub sp_address_masks: Vec<Scalar>,
    pub sp_commitment_masks: Vec<Scalar>,
}

fn check_prefix(what: &str, recorded: &[u8; 32], expected: &[u8; 32]) -> Result<(), TxError> {
    if recorded != expected {
        return Err(TxError::AssemblyFailed(format!("{what} signs a different tx proposal prefix")));
    }
    Ok(())
}

/// Join signed inputs with the proposal's outputs and a balance proof.
#[allow(clippy::too_many_arguments)]
pub fn make_partial_tx(
    proposal: &TxProposal,
    mut legacy_inputs: Vec<LegacyInput>,
    mut sp_partial_inputs: Vec<SpPartialInput>,
    tx_version: TxVersion,
    legacy_spend_pubkey: &EdwardsPoint,
    core_spend_pubkey: &EdwardsPoint,
    k_view_balance: &Scalar,
) -> Result<SpPartialTx, TxError> {
    // 1. the proposal itself
    check_tx_proposal_semantics(proposal, legacy_spend_pubkey, core_spend_pubkey, k_view_balance)?;
    let prefix = proposal.proposal_prefix(&tx_version, k_view_balance)?;

    // 2. inputs: sorted, signing this prefix, spending exactly the proposed enotes
    legacy_inputs.sort_by(|a, b| compare_keys(a.key_image(), b.key_image()));
    sp_partial_inputs.sort_by(|a, b| compare_keys(a.key_image(), b.key_image()));
    for input in &legacy_inputs {
        check_prefix("legacy input", &input.tx_proposal_prefix, &prefix)?;
        check_legacy_input_semantics(input)?;
    }
    for input in &sp_partial_inputs {
        check_prefix("seraphis input", &input.tx_proposal_prefix, &prefix)?;
        check_partial_input_semantics(input)?;
    }
    let legacy_key_images: Vec<KeyImage> = legacy_inputs.iter().map(|i| *i.key_image()).collect();
    let sp_key_images: Vec<KeyImage> = sp_partial_inputs.iter().map(|i| *i.key_image()).collect();
    if legacy_key_images != proposal.legacy_key_images() || sp_key_images != proposal.sp_key_images() {
        return Err(BUILDER.fail(
            "partial tx",
            TxError::AssemblyFailed("inputs don't spend the proposed enotes".into()),
        ));
    }

    // 3. outputs
    let (outputs, tx_supplement) = proposal.outputs_and_supplement(k_view_balance)?;

    // 4. balance proof
    let legacy_masked_blinding_factors: Vec<Scalar> = legacy_inputs
        .iter()
        .map(|input| input.input_masked_commitment_blinding_factor)
        .collect();
    let sp_input_amounts: Vec<u64> = sp_partial_inputs.iter().map(|input| input.input_amount).collect();
    let sp_masked_blinding_factors: Vec<Scalar> =
        sp_partial_inputs.iter().map(SpPartialInput::masked_blinding_factor).collect();
    let balance_proof = make_balance_proof(
        &legacy_masked_blinding_factors,
        &sp_input_amounts,
        &sp_masked_blinding_factors,
        &outputs.amounts,
        &outputs.blinding_factors,
    )?;

    BUILDER.debug(format_args!(
        "partial tx: {} legacy inputs, {} seraphis inputs, {} outputs",
        legacy_inputs.len(),
        sp_partial_inputs.len(),
        outputs.enotes.len()
    ));

    let mut partial_tx = SpPartialTx {
        legacy_input_images: Vec::with_capacity(legacy_inputs.len()),
        sp_input_images: Vec::with_capacity(sp_partial_inputs.len()),
        outputs: outputs.enotes,
        balance_proof,
        legacy_ring_signatures: Vec::with_capacity(legacy_inputs.len()),
        sp_image_proofs: Vec::with_capacity(sp_partial_inputs.len()),
        tx_fee: proposal.tx_fee,
        tx_supplement,
        legacy_ring_members: Vec::with_capacity(legacy_inputs.len()),
        sp_input_enotes: Vec::with_capacity(sp_partial_inputs.len()),
        sp_address_masks: Vec::with_capacity(sp_partial_inputs.len()),
        sp_commitment_masks: Vec::with_capacity(sp_partial_inputs.len()),
    };
    for input in legacy_inputs {
        partial_tx.legacy_input_images.push(input.input_image);
        partial_tx.legacy_ring_signatures.push(input.ring_signature);
        partial_tx.legacy_ring_members.push(input.ring_members);
    }
    for input in sp_partial_inputs {
        partial_tx.sp_input_images.push(input.input_image);
        partial_tx.sp_image_proofs.push(input.image_proof);
        partial_tx.sp_input_enotes.push(input.input_enote_core);
        partial_tx.sp_address_masks.push(input.address_mask);
        partial_tx.sp_commitment_masks.push(input.commitment_mask);
    }
    Ok(partial_tx)
}

/// Complete the partial tx with membership proofs over a throwaway ledger
/// and run full validation on the result.
///
/// Each seraphis input gets its own region of random squashed enotes with
/// the real enote at a random slot; legacy rings are placed at their
/// recorded ledger indices.
pub fn check_partial_tx_semantics(
    partial_tx: &SpPartialTx,
    params: &SpTxParamPackV1,
    semantic_rules_version: SemanticRulesVersion,
) -> Result<(), TxError> {
    let mut context = SimpleValidationContext::new();

    // 1. legacy rings
    if partial_tx.legacy_ring_members.len() != partial_tx.legacy_ring_signatures.len() {
        return Err(TxError::AssemblyFailed("legacy rings and ring signatures differ in number".into()));
    }
    for (signature, ring) in partial_tx.legacy_ring_signatures.iter().zip(&partial_tx.legacy_ring_members) {
        if signature.reference_set.len() != ring.len() {
            return Err(TxError::AssemblyFailed("legacy ring doesn't match its reference set".into()));
        }
        for (index, member) in signature.reference_set.iter().zip(ring) {
            context.insert_legacy_element(*index, *member);
        }
    }

    // 2. one region of mock squashed enotes per seraphis input
    let num_sp_inputs = partial_tx.sp_input_enotes.len();
    if partial_tx.sp_address_masks.len() != num_sp_inputs || partial_tx.sp_commitment_masks.len() != num_sp_inputs {
        return Err(TxError::AssemblyFailed("seraphis input masks don't line up with their enotes".into()));
    }
    let size = ref_set_size(params.ref_set_decomp_n, params.ref_set_decomp_m) as u64;
    let region_width = size + params.bin_config.bin_width();

    let mut rng = rand::thread_rng();
    let mut real_indices = Vec::with_capacity(num_sp_inputs);
    for (i, enote) in partial_tx.sp_input_enotes.iter().enumerate() {
        let region_start = i as u64 * region_width;
        let real_index = region_start + rng.gen_range(0..region_width);
        for index in region_start..region_start + region_width {
            let element = if index == real_index {
                enote.squashed_enote()?
            } else {
                random_point()
            };
            context.insert_sp_element(index, element);
        }
        real_indices.push((region_start, real_index));
    }

    // 3. membership proofs
    let mut membership_proofs: Vec<SpAlignableMembershipProof> = Vec::with_capacity(num_sp_inputs);
    for (i, (region_start, real_index)) in real_indices.into_iter().enumerate() {
        let mapper = FlatIndexMapper::new(region_start, region_start + region_width - 1)?;
        let prep = make_membership_proof_prep_for_enote(
            &context,
            &mapper,
            partial_tx.sp_input_enotes[i],
            &partial_tx.sp_address_masks[i],
            &partial_tx.sp_commitment_masks[i],
            real_index,
            params.bin_config,
            params.ref_set_decomp_n,
            params.ref_set_decomp_m,
        )?;
        membership_proofs.push(make_alignable_membership_proof(prep)?);
    }

    // 4. complete and validate with no spent key images
    let tx = make_sp_tx_squashed_v1(partial_tx.clone(), membership_proofs, semantic_rules_version)?;
    TxValidatorRegistry::default()
        .validate_tx((&tx).into(), &context)
        .map_err(|e| BUILDER.fail("partial tx simulation", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::inputs::{gen_input_proposal, make_partial_inputs};
    use crate::builders::outputs::finalize_output_proposal_set;
    use crate::jamtis::{gen_payment_proposal, JamtisMockKeys};
    use seraphis_crypto::{decompress, mul8, random_scalar};
    use seraphis_types::TxStructure;

    struct Fixture {
        keys: JamtisMockKeys,
        legacy_spend_pubkey: EdwardsPoint,
        proposal: TxProposal,
        version: TxVersion,
    }

    fn fixture(input_amounts: &[u64], payment_amounts: &[u64], fee: DiscretizedFee) -> Fixture {
        let keys = JamtisMockKeys::generate();
        let legacy_spend_pubkey = EdwardsPoint::mul_base(&random_scalar());
        let inputs: Vec<SpInputProposal> =
            input_amounts.iter().map(|&a| gen_input_proposal(&keys, a).unwrap()).collect();
        let normal: Vec<JamtisPaymentProposal> =
            payment_amounts.iter().map(|&a| gen_payment_proposal(a, 1).unwrap()).collect();
        let total_in: u128 = input_amounts.iter().map(|&a| a as u128).sum();

        let payments = finalize_output_proposal_set(
            total_in,
            fee.fee_value().unwrap(),
            &keys.random_address(),
            &keys.random_address(),
            &keys.k_vb,
            normal,
            Vec::new(),
        )
        .unwrap();
        let proposal =
            TxProposal::new(Vec::new(), inputs, payments.normal, payments.selfsend, fee, Vec::new()).unwrap();
        Fixture {
            keys,
            legacy_spend_pubkey,
            proposal,
            version: TxVersion::new(TxStructure::SquashedV1, SemanticRulesVersion::Mock),
        }
    }

    #[test]
    fn test_proposal_semantics() {
        let f = fixture(&[5, 7], &[3, 4], DiscretizedFee::new(1));
        assert!(check_tx_proposal_semantics(
            &f.proposal,
            &f.legacy_spend_pubkey,
            &f.keys.core_spend_pubkey(),
            &f.keys.k_vb
        )
        .is_ok());
        assert!(f.proposal.sp_key_images().windows(2).all(|w| compare_keys(&w[0], &w[1]).is_lt()));

        let mut no_selfsend = f.proposal.clone();
        no_selfsend.selfsend_payment_proposals.clear();
        assert!(matches!(
            check_tx_proposal_semantics(&no_selfsend, &f.legacy_spend_pubkey, &f.keys.core_spend_pubkey(), &f.keys.k_vb),
            Err(TxError::ProposalInconsistent(_))
        ));

        let mut unbalanced = f.proposal.clone();
        unbalanced.normal_payment_proposals[0].amount += 1;
        assert!(check_tx_proposal_semantics(
            &unbalanced,
            &f.legacy_spend_pubkey,
            &f.keys.core_spend_pubkey(),
            &f.keys.k_vb
        )
        .is_err());
    }

    #[test]
    fn test_prefix_commits_to_fee_and_version() {
        let f = fixture(&[20], &[3], DiscretizedFee::new(2));
        let prefix = f.proposal.proposal_prefix(&f.version, &f.keys.k_vb).unwrap();
        assert_eq!(prefix, f.proposal.proposal_prefix(&f.version, &f.keys.k_vb).unwrap());

        let other_version = TxVersion::new(TxStructure::SquashedV1, SemanticRulesVersion::One);
        assert_ne!(prefix, f.proposal.proposal_prefix(&other_version, &f.keys.k_vb).unwrap());

        let mut refee = f.proposal.clone();
        refee.tx_fee = DiscretizedFee::new(1_000);
        assert_ne!(prefix, refee.proposal_prefix(&f.version, &f.keys.k_vb).unwrap());
    }

    #[test]
    fn test_partial_tx_simulation() {
        let _ = env_logger::builder().is_test(true).try_init();
        let f = fixture(&[10, 12], &[6, 5], DiscretizedFee::new(3));
        let prefix = f.proposal.proposal_prefix(&f.version, &f.keys.k_vb).unwrap();
        let partial_inputs =
            make_partial_inputs(&f.proposal.sp_input_proposals, &prefix, &f.keys.k_m, &f.keys.k_vb).unwrap();

        let partial_tx = make_partial_tx(
            &f.proposal,
            Vec::new(),
            partial_inputs.clone(),
            f.version,
            &f.legacy_spend_pubkey,
            &f.keys.core_spend_pubkey(),
            &f.keys.k_vb,
        )
        .unwrap();
        assert_eq!(partial_tx.sp_input_images.len(), 2);
        assert!(partial_tx.outputs.windows(2).all(|w| compare_keys(w[0].onetime_address(), w[1].onetime_address()).is_lt()));

        // the range proof covers both input images and every output, inputs first
        let range_commitments = &partial_tx.balance_proof.bpp_proof.v;
        assert_eq!(range_commitments.len(), partial_tx.sp_input_images.len() + partial_tx.outputs.len());
        for (stored, image) in range_commitments.iter().zip(&partial_tx.sp_input_images) {
            assert_eq!(mul8(&decompress(stored).unwrap()).compress(), image.masked_commitment);
        }

        let params = SpTxParamPackV1::for_rules(SemanticRulesVersion::Mock);
        check_partial_tx_semantics(&partial_tx, &params, SemanticRulesVersion::Mock).unwrap();

        // inputs signed over another prefix are rejected
        let stale = make_partial_inputs(&f.proposal.sp_input_proposals, &[9u8; 32], &f.keys.k_m, &f.keys.k_vb).unwrap();
        assert!(matches!(
            make_partial_tx(
                &f.proposal,
                Vec::new(),
                stale,
                f.version,
                &f.legacy_spend_pubkey,
                &f.keys.core_spend_pubkey(),
                &f.keys.k_vb,
            ),
            Err(TxError::AssemblyFailed(_))
        ));

        // a tampered remainder fails the simulated balance check
        let mut tampered = partial_tx.clone();
        tampered.balance_proof.remainder_blinding_factor += Scalar::ONE;
        assert!(check_partial_tx_semantics(&tampered, &params, SemanticRulesVersion::Mock).is_err());
    }
}
