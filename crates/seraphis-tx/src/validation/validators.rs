//! Per-format validation stages.
//!
//! Stages run in a fixed order, each gating the next:
//! semantics, key images, amount balance, input proofs, batchable proofs.
//! The stage functions take individual tx fields so the builders can reuse
//! them on partially assembled data.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::IsIdentity;
use seraphis_crypto::bulletproofs_plus::get_bulletproof_plus_verification_data;
use seraphis_crypto::clsag::clsag_verify;
use seraphis_crypto::composition_proof::verify_sp_composition_proof;
use seraphis_crypto::grootle::get_grootle_verification_data;
use seraphis_crypto::{
    decompress, generators, key_domain_is_prime_subgroup, mul8, scalar_from_canonical, SpMultiexpBuilder,
};
use seraphis_types::config::{
    coinbase_component_counts_config, component_counts_config, legacy_ref_set_config, sp_ref_set_config,
    CoinbaseComponentCountsConfig, ComponentCountsConfig, LegacyRefSetConfig, SpRefSetConfig,
};
use seraphis_types::TxStructure;

use crate::builders::inputs::make_membership_proof_message;
use crate::builders::legacy_inputs::{make_legacy_ring_signature_message, reference_set_sorted_and_unique};
use crate::builders::outputs::{check_tx_supplement_semantics_v1, check_tx_supplement_semantics_v2};
use crate::components::{ref_set_size, LegacyRingSignature, SpBalanceProof, SpImageProof, SpMembershipProof};
use crate::discretized_fee::DiscretizedFee;
use crate::enote::{compare_keys, keys_sorted_and_unique, LegacyEnoteImage, SpCoinbaseEnote, SpEnote, SpEnoteImage};
use crate::tx_extra::try_get_extra_field_elements;
use crate::txtype::{SpTxCoinbaseV1, SpTxRef, SpTxSquashedV1};
use crate::validation::context::TxValidationContext;
use crate::TxError;

/// One method per validation stage, implemented once per tx format.
pub trait SpTxValidator: Send + Sync {
    fn structure(&self) -> TxStructure;

    fn validate_semantics(&self, tx: SpTxRef<'_>) -> Result<(), TxError>;

    fn validate_key_images(&self, tx: SpTxRef<'_>, context: &dyn TxValidationContext) -> Result<(), TxError>;

    fn validate_amount_balance(&self, tx: SpTxRef<'_>) -> Result<(), TxError>;

    fn validate_input_proofs(&self, tx: SpTxRef<'_>, context: &dyn TxValidationContext) -> Result<(), TxError>;

    /// Multiexp builders for every batchable proof; the tx is valid only if
    /// their sum (alone or pooled with other txs') is the identity.
    fn batchable_verification_data(
        &self,
        tx: SpTxRef<'_>,
        context: &dyn TxValidationContext,
    ) -> Result<BatchableProofData, TxError>;
}

/// Multiexp builders of batchable proofs, kept apart by proof kind so a
/// failed pool can be traced to the kind that broke it.
#[derive(Debug, Clone, Default)]
pub struct BatchableProofData {
    pub range_proofs: Vec<SpMultiexpBuilder>,
    pub membership_proofs: Vec<SpMultiexpBuilder>,
}

impl BatchableProofData {
    pub fn append(&mut self, other: BatchableProofData) {
        self.range_proofs.extend(other.range_proofs);
        self.membership_proofs.extend(other.membership_proofs);
    }

    pub fn len(&self) -> usize {
        self.range_proofs.len() + self.membership_proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn wrong_structure(expected: TxStructure, tx: SpTxRef<'_>) -> TxError {
    TxError::SemanticsViolation(format!("{expected} validator got a {} tx", tx.structure()))
}

fn semantics(reason: impl Into<String>) -> TxError {
    TxError::SemanticsViolation(reason.into())
}

fn count_in_range(what: &str, count: usize, min: usize, max: usize) -> Result<(), TxError> {
    if count < min || count > max {
        return Err(semantics(format!("{count} {what}, expected [{min}, {max}]")));
    }
    Ok(())
}

// ─── Squashed v1: semantics ─────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn validate_sp_semantics_component_counts_v1(
    config: &ComponentCountsConfig,
    num_legacy_input_images: usize,
    num_sp_input_images: usize,
    num_legacy_ring_signatures: usize,
    num_sp_image_proofs: usize,
    num_sp_membership_proofs: usize,
    num_outputs: usize,
    num_range_proof_commitments: usize,
) -> Result<(), TxError> {
    count_in_range(
        "inputs",
        num_legacy_input_images + num_sp_input_images,
        config.min_inputs,
        config.max_inputs,
    )?;
    if num_legacy_input_images != num_legacy_ring_signatures {
        return Err(semantics("legacy input images and ring signatures differ in number"));
    }
    if num_sp_input_images != num_sp_image_proofs || num_sp_input_images != num_sp_membership_proofs {
        return Err(semantics("seraphis input images and their proofs differ in number"));
    }
    count_in_range("outputs", num_outputs, config.min_outputs, config.max_outputs)?;
    // seraphis input images and outputs are range proved; legacy images are not
    if num_range_proof_commitments != num_sp_input_images + num_outputs {
        return Err(semantics(format!(
            "{num_range_proof_commitments} range proof commitments for {num_sp_input_images} seraphis inputs \
             and {num_outputs} outputs"
        )));
    }
    Ok(())
}

pub fn validate_sp_semantics_legacy_reference_sets_v1(
    config: &LegacyRefSetConfig,
    ring_signatures: &[LegacyRingSignature],
) -> Result<(), TxError> {
    for signature in ring_signatures {
        let ring_size = signature.reference_set.len();
        count_in_range("legacy ring members", ring_size, config.ring_size_min, config.ring_size_max)?;
        if signature.clsag_proof.s.len() != ring_size {
            return Err(semantics("ring signature responses don't match its ring size"));
        }
        if !reference_set_sorted_and_unique(&signature.reference_set) {
            return Err(semantics("legacy reference set is not sorted and unique"));
        }
    }
    Ok(())
}

pub fn validate_sp_semantics_sp_reference_sets_v1(
    config: &SpRefSetConfig,
    membership_proofs: &[SpMembershipProof],
) -> Result<(), TxError> {
    // one decomposition and bin config for every proof in the tx
    let shape = |proof: &SpMembershipProof| {
        (
            proof.ref_set_decomp_n,
            proof.ref_set_decomp_m,
            proof.binned_reference_set.bin_config,
        )
    };
    if let Some(first) = membership_proofs.first() {
        if membership_proofs.iter().any(|proof| shape(proof) != shape(first)) {
            return Err(semantics("membership proofs differ in decomposition or bin config"));
        }
    }

    for proof in membership_proofs {
        let (n, m) = (proof.ref_set_decomp_n, proof.ref_set_decomp_m);
        count_in_range("decomposition base", n, config.decomp_n_min, config.decomp_n_max)?;
        count_in_range("decomposition exponent", m, config.decomp_m_min, config.decomp_m_max)?;

        let bin_config = &proof.binned_reference_set.bin_config;
        let radius = bin_config.bin_radius as u64;
        let members = bin_config.num_bin_members as u64;
        if radius < config.bin_radius_min || radius > config.bin_radius_max {
            return Err(semantics(format!("bin radius {radius} out of bounds")));
        }
        if members < config.num_bin_members_min || members > config.num_bin_members_max {
            return Err(semantics(format!("{members} bin members out of bounds")));
        }

        // n^m must be exactly the binned set's size
        let size = ref_set_size(n, m);
        if size == 0 || proof.binned_reference_set.reference_set_size() != size as u64 {
            return Err(semantics(format!(
                "binned reference set of {} elements doesn't match decomposition {n}^{m}",
                proof.binned_reference_set.reference_set_size()
            )));
        }
        bin_config
            .validate(size as u64)
            .map_err(|e| semantics(e.to_string()))?;
        if !proof.binned_reference_set.bin_loci.windows(2).all(|w| w[0] <= w[1]) {
            return Err(semantics("bin loci are not sorted"));
        }
    }
    Ok(())
}

pub fn validate_sp_semantics_output_serialization_v1(outputs: &[SpEnote]) -> Result<(), TxError> {
    for output in outputs {
        decompress(&output.core.onetime_address).map_err(|e| semantics(format!("output onetime address: {e}")))?;
        decompress(&output.core.amount_commitment).map_err(|e| semantics(format!("output commitment: {e}")))?;
    }
    Ok(())
}

fn check_image_key(what: &str, key: &CompressedEdwardsY) -> Result<(), TxError> {
    let point = decompress(key).map_err(|e| semantics(format!("{what}: {e}")))?;
    if point.is_identity() {
        return Err(semantics(format!("{what} is the identity")));
    }
    Ok(())
}

pub fn validate_sp_semantics_input_images_v1(
    legacy_input_images: &[LegacyEnoteImage],
    sp_input_images: &[SpEnoteImage],
) -> Result<(), TxError> {
    for image in legacy_input_images {
        check_image_key("legacy masked commitment", &image.masked_commitment)?;
        if !key_domain_is_prime_subgroup(&image.key_image) {
            return Err(semantics("legacy key image is not in the prime subgroup"));
        }
    }
    for image in sp_input_images {
        check_image_key("masked address", &image.masked_address)?;
        check_image_key("masked commitment", &image.masked_commitment)?;
        if !key_domain_is_prime_subgroup(&image.key_image) {
            return Err(semantics("seraphis key image is not in the prime subgroup"));
        }
    }
    Ok(())
}

/// Canonical ordering of every sorted collection, plus a parseable memo.
pub fn validate_sp_semantics_layout_v1(
    legacy_input_images: &[LegacyEnoteImage],
    sp_input_images: &[SpEnoteImage],
    outputs: &[SpEnote],
    tx_extra: &[u8],
) -> Result<(), TxError> {
    if !keys_sorted_and_unique(legacy_input_images.iter().map(|image| &image.key_image)) {
        return Err(semantics("legacy key images are not sorted and unique"));
    }
    if !keys_sorted_and_unique(sp_input_images.iter().map(|image| &image.key_image)) {
        return Err(semantics("seraphis key images are not sorted and unique"));
    }
    let shared = legacy_input_images.iter().any(|legacy| {
        sp_input_images
            .iter()
            .any(|sp| compare_keys(&legacy.key_image, &sp.key_image).is_eq())
    });
    if shared {
        return Err(semantics("a key image appears among both legacy and seraphis inputs"));
    }
    if !keys_sorted_and_unique(outputs.iter().map(SpEnote::onetime_address)) {
        return Err(semantics("outputs are not sorted and unique by onetime address"));
    }
    try_get_extra_field_elements(tx_extra)
        .map(|_| ())
        .map_err(|e| semantics(format!("tx extra: {e}")))
}

pub fn validate_sp_semantics_fee_v1(tx_fee: &DiscretizedFee) -> Result<(), TxError> {
    tx_fee.fee_value().map(|_| ()).map_err(|e| semantics(e.to_string()))
}

// ─── Squashed v1: key images, balance, input proofs ─────────────────────────

pub fn validate_sp_key_images_v1(
    legacy_input_images: &[LegacyEnoteImage],
    sp_input_images: &[SpEnoteImage],
    context: &dyn TxValidationContext,
) -> Result<(), TxError> {
    for image in legacy_input_images {
        if context.legacy_key_image_exists(&image.key_image) {
            return Err(TxError::DoubleSpend(format!(
                "legacy key image {} already spent",
                hex::encode(image.key_image.as_bytes())
            )));
        }
    }
    for image in sp_input_images {
        if context.sp_key_image_exists(&image.key_image) {
            return Err(TxError::DoubleSpend(format!(
                "seraphis key image {} already spent",
                hex::encode(image.key_image.as_bytes())
            )));
        }
    }
    Ok(())
}

fn balance_point(key: &CompressedEdwardsY) -> Result<EdwardsPoint, TxError> {
    decompress(key).map_err(|e| TxError::BalanceMismatch(e.to_string()))
}

/// sum(C"_in) == sum(C_out) + fee H + remainder G, with every seraphis C"_in
/// and every C_out range proved.
pub fn validate_sp_amount_balance_v1(
    legacy_input_images: &[LegacyEnoteImage],
    sp_input_images: &[SpEnoteImage],
    outputs: &[SpEnote],
    tx_fee: &DiscretizedFee,
    balance_proof: &SpBalanceProof,
) -> Result<(), TxError> {
    // 1. remainder must be canonical
    let remainder = scalar_from_canonical(balance_proof.remainder_blinding_factor.as_bytes())
        .ok_or_else(|| TxError::BalanceMismatch("remainder blinding factor is not canonical".into()))?;

    // 2. the range proof covers the seraphis input images, then the outputs
    let range_commitments = &balance_proof.bpp_proof.v;
    if range_commitments.len() != sp_input_images.len() + outputs.len() {
        return Err(TxError::BalanceMismatch(
            "range proof doesn't cover every seraphis input and output".into(),
        ));
    }
    let proved_commitments = sp_input_images
        .iter()
        .map(|image| &image.masked_commitment)
        .chain(outputs.iter().map(|output| &output.core.amount_commitment));
    for (index, (stored, commitment)) in range_commitments.iter().zip(proved_commitments).enumerate() {
        if mul8(&balance_point(stored)?) != balance_point(commitment)? {
            return Err(TxError::BalanceMismatch(format!(
                "range proof commitment {index} differs from the commitment it proves"
            )));
        }
    }

    // 3. sum(C"_in) - sum(C_out) - fee H - remainder G
    let fee = tx_fee.fee_value().map_err(|e| TxError::BalanceMismatch(e.to_string()))?;
    let mut sum = EdwardsPoint::default();
    for image in legacy_input_images {
        sum += balance_point(&image.masked_commitment)?;
    }
    for image in sp_input_images {
        sum += balance_point(&image.masked_commitment)?;
    }
    for output in outputs {
        sum -= balance_point(&output.core.amount_commitment)?;
    }
    sum -= Scalar::from(fee) * generators::h();
    sum -= EdwardsPoint::mul_base(&remainder);

    if !sum.is_identity() {
        return Err(TxError::BalanceMismatch("input and output commitments don't balance".into()));
    }
    Ok(())
}

pub fn validate_sp_legacy_input_proofs_v1(
    ring_signatures: &[LegacyRingSignature],
    legacy_input_images: &[LegacyEnoteImage],
    tx_proposal_prefix: &[u8; 32],
    context: &dyn TxValidationContext,
) -> Result<(), TxError> {
    if ring_signatures.len() != legacy_input_images.len() {
        return Err(TxError::InvalidInputProof("ring signatures and legacy images differ in number".into()));
    }
    for (signature, image) in ring_signatures.iter().zip(legacy_input_images) {
        if signature.clsag_proof.key_image != image.key_image {
            return Err(TxError::InvalidInputProof("ring signature signs a different key image".into()));
        }
        let ring_members = context
            .get_legacy_reference_elements(&signature.reference_set)
            .map_err(|e| TxError::InvalidInputProof(e.to_string()))?;
        let ring: Vec<CompressedEdwardsY> = ring_members.iter().map(|m| m.onetime_address).collect();
        let commitments: Vec<CompressedEdwardsY> = ring_members.iter().map(|m| m.amount_commitment).collect();
        let message = make_legacy_ring_signature_message(tx_proposal_prefix, &signature.reference_set);

        if !clsag_verify(&message, &signature.clsag_proof, &ring, &commitments, &image.masked_commitment) {
            return Err(TxError::InvalidInputProof("legacy ring signature does not verify".into()));
        }
    }
    Ok(())
}

pub fn validate_sp_image_proofs_v1(
    image_proofs: &[SpImageProof],
    sp_input_images: &[SpEnoteImage],
    tx_proposal_prefix: &[u8; 32],
) -> Result<(), TxError> {
    if image_proofs.len() != sp_input_images.len() {
        return Err(TxError::InvalidInputProof("image proofs and seraphis images differ in number".into()));
    }
    for (proof, image) in image_proofs.iter().zip(sp_input_images) {
        if !verify_sp_composition_proof(
            &proof.composition_proof,
            tx_proposal_prefix,
            &image.masked_address,
            &image.key_image,
        ) {
            return Err(TxError::InvalidInputProof("seraphis image proof does not verify".into()));
        }
    }
    Ok(())
}

// ─── Squashed v1: batchable proofs ──────────────────────────────────────────

fn membership_error(e: impl std::fmt::Display) -> TxError {
    TxError::InvalidMembershipProof(e.to_string())
}

/// Grootle verification data for every membership proof, reading the
/// reference elements from `context`.
pub fn get_sp_membership_proof_verification_data_v1(
    membership_proofs: &[SpMembershipProof],
    sp_input_images: &[SpEnoteImage],
    context: &dyn TxValidationContext,
) -> Result<Vec<SpMultiexpBuilder>, TxError> {
    if membership_proofs.len() != sp_input_images.len() {
        return Err(membership_error("membership proofs and seraphis images differ in number"));
    }

    let mut builders = Vec::with_capacity(2 * membership_proofs.len());
    for (proof, image) in membership_proofs.iter().zip(sp_input_images) {
        let indices = proof
            .binned_reference_set
            .reference_indices()
            .map_err(membership_error)?;
        let reference_set = context.get_sp_reference_elements(&indices).map_err(membership_error)?;
        let offset = decompress(&image.masked_address).map_err(membership_error)?
            + decompress(&image.masked_commitment).map_err(membership_error)?;
        let message = make_membership_proof_message(&proof.binned_reference_set);

        builders.extend(
            get_grootle_verification_data(
                &[&proof.grootle_proof],
                &[message],
                &[reference_set],
                &[offset],
                proof.ref_set_decomp_n,
                proof.ref_set_decomp_m,
            )
            .map_err(membership_error)?,
        );
    }
    Ok(builders)
}

pub fn get_sp_range_proof_verification_data_v1(
    balance_proof: &SpBalanceProof,
) -> Result<Vec<SpMultiexpBuilder>, TxError> {
    get_bulletproof_plus_verification_data(&[&balance_proof.bpp_proof])
        .map_err(|e| TxError::BalanceMismatch(format!("range proof: {e}")))
}

// ─── Squashed v1 validator ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct SquashedV1Validator;

impl SquashedV1Validator {
    fn tx<'a>(tx: SpTxRef<'a>) -> Result<&'a SpTxSquashedV1, TxError> {
        match tx {
            SpTxRef::SquashedV1(tx) => Ok(tx),
            other => Err(wrong_structure(TxStructure::SquashedV1, other)),
        }
    }
}

impl SpTxValidator for SquashedV1Validator {
    fn structure(&self) -> TxStructure {
        TxStructure::SquashedV1
    }

    fn validate_semantics(&self, tx: SpTxRef<'_>) -> Result<(), TxError> {
        let tx = Self::tx(tx)?;
        let rules = tx.tx_semantic_rules_version;

        validate_sp_semantics_component_counts_v1(
            &component_counts_config(rules),
            tx.legacy_input_images.len(),
            tx.sp_input_images.len(),
            tx.legacy_ring_signatures.len(),
            tx.sp_image_proofs.len(),
            tx.sp_membership_proofs.len(),
            tx.outputs.len(),
            tx.balance_proof.bpp_proof.v.len(),
        )?;
        validate_sp_semantics_legacy_reference_sets_v1(&legacy_ref_set_config(rules), &tx.legacy_ring_signatures)?;
        validate_sp_semantics_sp_reference_sets_v1(&sp_ref_set_config(rules), &tx.sp_membership_proofs)?;
        validate_sp_semantics_output_serialization_v1(&tx.outputs)?;
        validate_sp_semantics_input_images_v1(&tx.legacy_input_images, &tx.sp_input_images)?;
        validate_sp_semantics_layout_v1(
            &tx.legacy_input_images,
            &tx.sp_input_images,
            &tx.outputs,
            &tx.tx_supplement.tx_extra,
        )?;
        validate_sp_semantics_fee_v1(&tx.tx_fee)?;
        check_tx_supplement_semantics_v2(&tx.tx_supplement, tx.outputs.len())
    }

    fn validate_key_images(&self, tx: SpTxRef<'_>, context: &dyn TxValidationContext) -> Result<(), TxError> {
        let tx = Self::tx(tx)?;
        validate_sp_key_images_v1(&tx.legacy_input_images, &tx.sp_input_images, context)
    }

    fn validate_amount_balance(&self, tx: SpTxRef<'_>) -> Result<(), TxError> {
        let tx = Self::tx(tx)?;
        validate_sp_amount_balance_v1(
            &tx.legacy_input_images,
            &tx.sp_input_images,
            &tx.outputs,
            &tx.tx_fee,
            &tx.balance_proof,
        )
    }

    fn validate_input_proofs(&self, tx: SpTxRef<'_>, context: &dyn TxValidationContext) -> Result<(), TxError> {
        let tx = Self::tx(tx)?;
        let prefix = tx.proposal_prefix();
        validate_sp_legacy_input_proofs_v1(&tx.legacy_ring_signatures, &tx.legacy_input_images, &prefix, context)?;
        validate_sp_image_proofs_v1(&tx.sp_image_proofs, &tx.sp_input_images, &prefix)
    }

    fn batchable_verification_data(
        &self,
        tx: SpTxRef<'_>,
        context: &dyn TxValidationContext,
    ) -> Result<BatchableProofData, TxError> {
        let tx = Self::tx(tx)?;
        Ok(BatchableProofData {
            range_proofs: get_sp_range_proof_verification_data_v1(&tx.balance_proof)?,
            membership_proofs: get_sp_membership_proof_verification_data_v1(
                &tx.sp_membership_proofs,
                &tx.sp_input_images,
                context,
            )?,
        })
    }
}

// ─── Coinbase v1 validator ──────────────────────────────────────────────────

pub fn validate_coinbase_semantics_component_counts_v1(
    config: &CoinbaseComponentCountsConfig,
    num_outputs: usize,
) -> Result<(), TxError> {
    count_in_range("coinbase outputs", num_outputs, config.min_outputs, config.max_outputs)
}

pub fn validate_coinbase_semantics_outputs_v1(outputs: &[SpCoinbaseEnote]) -> Result<(), TxError> {
    if !keys_sorted_and_unique(outputs.iter().map(SpCoinbaseEnote::onetime_address)) {
        return Err(semantics("coinbase outputs are not sorted and unique by onetime address"));
    }
    for output in outputs {
        decompress(output.onetime_address()).map_err(|e| semantics(format!("coinbase onetime address: {e}")))?;
    }
    Ok(())
}

/// The block reward must equal the sum of the output amounts.
pub fn validate_coinbase_amount_balance_v1(block_reward: u64, outputs: &[SpCoinbaseEnote]) -> Result<(), TxError> {
    let total: u128 = outputs.iter().map(|output| output.core.amount as u128).sum();
    if total != block_reward as u128 {
        return Err(TxError::BalanceMismatch(format!(
            "coinbase outputs pay {total}, block reward is {block_reward}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoinbaseV1Validator;

impl CoinbaseV1Validator {
    fn tx<'a>(tx: SpTxRef<'a>) -> Result<&'a SpTxCoinbaseV1, TxError> {
        match tx {
            SpTxRef::Coinbase(tx) => Ok(tx),
            other => Err(wrong_structure(TxStructure::Coinbase, other)),
        }
    }
}

impl SpTxValidator for CoinbaseV1Validator {
    fn structure(&self) -> TxStructure {
        TxStructure::Coinbase
    }

    fn validate_semantics(&self, tx: SpTxRef<'_>) -> Result<(), TxError> {
        let tx = Self::tx(tx)?;
        validate_coinbase_semantics_component_counts_v1(
            &coinbase_component_counts_config(tx.tx_semantic_rules_version),
            tx.outputs.len(),
        )?;
        validate_coinbase_semantics_outputs_v1(&tx.outputs)?;
        check_tx_supplement_semantics_v1(&tx.tx_supplement, tx.outputs.len())
    }

    fn validate_key_images(&self, tx: SpTxRef<'_>, _context: &dyn TxValidationContext) -> Result<(), TxError> {
        Self::tx(tx).map(|_| ())
    }

    fn validate_amount_balance(&self, tx: SpTxRef<'_>) -> Result<(), TxError> {
        let tx = Self::tx(tx)?;
        validate_coinbase_amount_balance_v1(tx.block_reward, &tx.outputs)
    }

    fn validate_input_proofs(&self, tx: SpTxRef<'_>, _context: &dyn TxValidationContext) -> Result<(), TxError> {
        Self::tx(tx).map(|_| ())
    }

    fn batchable_verification_data(
        &self,
        tx: SpTxRef<'_>,
        _context: &dyn TxValidationContext,
    ) -> Result<BatchableProofData, TxError> {
        Self::tx(tx).map(|_| BatchableProofData::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binned_reference_set::{SpBinnedReferenceSet, SpBinnedReferenceSetConfig};
    use crate::validation::context::SimpleValidationContext;
    use seraphis_crypto::bulletproofs_plus::bulletproof_plus_prove;
    use seraphis_crypto::grootle::GrootleProof;
    use seraphis_crypto::{commit, random_point, random_scalar};
    use seraphis_types::SemanticRulesVersion;

    fn output_with_commitment(amount: u64, blinding: &Scalar) -> SpEnote {
        SpEnote {
            core: crate::enote::SpEnoteCore::new(random_point().compress(), amount, blinding),
            encoded_amount: [0u8; 8],
            addr_tag_enc: [0u8; 18],
            view_tag: 0,
        }
    }

    #[test]
    fn test_component_counts() {
        let config = component_counts_config(SemanticRulesVersion::One);
        assert!(validate_sp_semantics_component_counts_v1(&config, 1, 1, 1, 1, 1, 2, 3).is_ok());
        assert!(validate_sp_semantics_component_counts_v1(&config, 1, 0, 1, 0, 0, 2, 2).is_ok());
        assert!(validate_sp_semantics_component_counts_v1(&config, 0, 0, 0, 0, 0, 2, 2).is_err());
        assert!(validate_sp_semantics_component_counts_v1(&config, 1, 0, 0, 0, 0, 2, 2).is_err());
        assert!(validate_sp_semantics_component_counts_v1(&config, 0, 2, 0, 2, 1, 2, 4).is_err());
        assert!(validate_sp_semantics_component_counts_v1(&config, 0, 1, 0, 1, 1, 1, 2).is_err(), "min 2 outputs");
        assert!(validate_sp_semantics_component_counts_v1(&config, 0, 1, 0, 1, 1, 17, 18).is_err());
        // seraphis inputs must be range proved alongside the outputs
        assert!(matches!(
            validate_sp_semantics_component_counts_v1(&config, 1, 1, 1, 1, 1, 2, 2),
            Err(TxError::SemanticsViolation(_))
        ));
    }

    #[test]
    fn test_reference_set_decomposition_must_match() {
        let config = sp_ref_set_config(SemanticRulesVersion::Mock);
        let proof = |loci: Vec<u64>| SpMembershipProof {
            grootle_proof: GrootleProof {
                a: CompressedEdwardsY::default(),
                b: CompressedEdwardsY::default(),
                f: Vec::new(),
                x: Vec::new(),
                z_a: Scalar::ZERO,
                z: Scalar::ZERO,
            },
            binned_reference_set: SpBinnedReferenceSet {
                bin_config: SpBinnedReferenceSetConfig {
                    bin_radius: 2,
                    num_bin_members: 2,
                },
                bin_generator_seed: [0u8; 32],
                bin_rotation_factor: 0,
                bin_loci: loci,
            },
            ref_set_decomp_n: 2,
            ref_set_decomp_m: 2,
        };

        assert!(validate_sp_semantics_sp_reference_sets_v1(&config, &[proof(vec![5, 9])]).is_ok());
        assert!(matches!(
            validate_sp_semantics_sp_reference_sets_v1(&config, &[proof(vec![5, 9, 12])]),
            Err(TxError::SemanticsViolation(_))
        ));
        assert!(validate_sp_semantics_sp_reference_sets_v1(&config, &[proof(vec![9, 5])]).is_err());
    }

    #[test]
    fn test_membership_proofs_share_one_shape() {
        let config = sp_ref_set_config(SemanticRulesVersion::Mock);
        let proof = |bin_radius: u16, n: usize| SpMembershipProof {
            grootle_proof: GrootleProof {
                a: CompressedEdwardsY::default(),
                b: CompressedEdwardsY::default(),
                f: Vec::new(),
                x: Vec::new(),
                z_a: Scalar::ZERO,
                z: Scalar::ZERO,
            },
            binned_reference_set: SpBinnedReferenceSet {
                bin_config: SpBinnedReferenceSetConfig {
                    bin_radius,
                    num_bin_members: 2,
                },
                bin_generator_seed: [0u8; 32],
                bin_rotation_factor: 0,
                bin_loci: vec![5, 9],
            },
            ref_set_decomp_n: n,
            ref_set_decomp_m: 2,
        };

        assert!(validate_sp_semantics_sp_reference_sets_v1(&config, &[proof(2, 2), proof(2, 2)]).is_ok());
        assert!(matches!(
            validate_sp_semantics_sp_reference_sets_v1(&config, &[proof(2, 2), proof(3, 2)]),
            Err(TxError::SemanticsViolation(_))
        ));
        assert!(matches!(
            validate_sp_semantics_sp_reference_sets_v1(&config, &[proof(2, 2), proof(2, 3)]),
            Err(TxError::SemanticsViolation(_))
        ));
    }

    #[test]
    fn test_amount_balance() {
        let (in_blind, out_blinds) = (random_scalar(), [random_scalar(), random_scalar()]);
        let input = SpEnoteImage {
            masked_address: random_point().compress(),
            masked_commitment: commit(10, &in_blind).compress(),
            key_image: random_point().compress(),
        };
        let fee = DiscretizedFee::new(1);
        let fee_value = fee.fee_value().unwrap();
        let amounts = [4, 10 - 4 - fee_value];
        let outputs = [
            output_with_commitment(amounts[0], &out_blinds[0]),
            output_with_commitment(amounts[1], &out_blinds[1]),
        ];
        let proof = SpBalanceProof {
            bpp_proof: bulletproof_plus_prove(&[10, amounts[0], amounts[1]], &[in_blind, out_blinds[0], out_blinds[1]])
                .unwrap(),
            remainder_blinding_factor: in_blind - out_blinds[0] - out_blinds[1],
        };
        assert!(validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &proof).is_ok());

        let bumped = [output_with_commitment(amounts[0] + 1, &out_blinds[0]), outputs[1].clone()];
        assert!(matches!(
            validate_sp_amount_balance_v1(&[], &[input], &bumped, &fee, &proof),
            Err(TxError::BalanceMismatch(_))
        ));

        let mut wrong_remainder = proof.clone();
        wrong_remainder.remainder_blinding_factor += Scalar::ONE;
        assert!(validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &wrong_remainder).is_err());
    }

    #[test]
    fn test_seraphis_inputs_must_be_range_proved() {
        let (in_blind, out_blinds) = (random_scalar(), [random_scalar(), random_scalar()]);
        let input = SpEnoteImage {
            masked_address: random_point().compress(),
            masked_commitment: commit(10, &in_blind).compress(),
            key_image: random_point().compress(),
        };
        let fee = DiscretizedFee::new(0);
        let outputs = [
            output_with_commitment(3, &out_blinds[0]),
            output_with_commitment(7, &out_blinds[1]),
        ];
        let remainder_blinding_factor = in_blind - out_blinds[0] - out_blinds[1];

        // outputs alone balance but leave the input amount unproved
        let outputs_only = SpBalanceProof {
            bpp_proof: bulletproof_plus_prove(&[3, 7], &out_blinds).unwrap(),
            remainder_blinding_factor,
        };
        assert!(matches!(
            validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &outputs_only),
            Err(TxError::BalanceMismatch(_))
        ));

        // an input-side range commitment that proves another amount
        let wrong_input_side = SpBalanceProof {
            bpp_proof: bulletproof_plus_prove(&[11, 3, 7], &[in_blind, out_blinds[0], out_blinds[1]]).unwrap(),
            remainder_blinding_factor,
        };
        assert!(matches!(
            validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &wrong_input_side),
            Err(TxError::BalanceMismatch(_))
        ));

        // inputs first, outputs after
        let reordered = SpBalanceProof {
            bpp_proof: bulletproof_plus_prove(&[3, 7, 10], &[out_blinds[0], out_blinds[1], in_blind]).unwrap(),
            remainder_blinding_factor,
        };
        assert!(validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &reordered).is_err());

        let proved = SpBalanceProof {
            bpp_proof: bulletproof_plus_prove(&[10, 3, 7], &[in_blind, out_blinds[0], out_blinds[1]]).unwrap(),
            remainder_blinding_factor,
        };
        assert!(validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &proved).is_ok());
    }

    #[test]
    fn test_key_images_against_context() {
        let image = SpEnoteImage {
            masked_address: random_point().compress(),
            masked_commitment: random_point().compress(),
            key_image: random_point().compress(),
        };
        let mut context = SimpleValidationContext::new();
        assert!(validate_sp_key_images_v1(&[], &[image], &context).is_ok());
        context.insert_sp_key_image(image.key_image);
        assert!(matches!(
            validate_sp_key_images_v1(&[], &[image], &context),
            Err(TxError::DoubleSpend(_))
        ));
    }

    #[test]
    fn test_coinbase_balance() {
        let output = |amount| SpCoinbaseEnote {
            core: crate::enote::SpCoinbaseEnoteCore {
                onetime_address: random_point().compress(),
                amount,
            },
            addr_tag_enc: [0u8; 18],
            view_tag: 0,
        };
        let outputs = [output(3), output(u64::MAX)];
        assert!(validate_coinbase_amount_balance_v1(u64::MAX, &outputs).is_err(), "sum overflows u64");
        assert!(validate_coinbase_amount_balance_v1(7, &[output(3), output(4)]).is_ok());
    }
}
