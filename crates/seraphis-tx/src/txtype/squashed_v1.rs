//! The squashed v1 transaction: legacy and seraphis inputs, full enotes out.

use seraphis_crypto::transcript::domain;
use seraphis_crypto::SpTranscript;
use seraphis_types::constants::sp_config;
use seraphis_types::{SemanticRulesVersion, TxStructure, TxVersion};

use crate::binned_reference_set::SpBinnedReferenceSetConfig;
use crate::builders::inputs::{align_membership_proofs, make_input_images_prefix};
use crate::builders::mixed::{make_tx_proposal_prefix, SpPartialTx};
use crate::components::{
    LegacyRingSignature, SpAlignableMembershipProof, SpBalanceProof, SpImageProof, SpMembershipProof,
    SpTxSupplement,
};
use crate::discretized_fee::DiscretizedFee;
use crate::enote::{LegacyEnoteImage, SpEnote, SpEnoteImage};
use crate::logging::BUILDER;
use crate::validation::validators::{SpTxValidator, SquashedV1Validator};
use crate::TxError;

/// Ring size, reference-set decomposition and bin shape used to build a tx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpTxParamPackV1 {
    pub legacy_ring_size: usize,
    pub ref_set_decomp_n: usize,
    pub ref_set_decomp_m: usize,
    pub bin_config: SpBinnedReferenceSetConfig,
}

impl SpTxParamPackV1 {
    /// Production parameters for `One`; small, fast ones for `Mock`.
    pub fn for_rules(rules: SemanticRulesVersion) -> Self {
        match rules {
            SemanticRulesVersion::Mock => Self {
                legacy_ring_size: 2,
                ref_set_decomp_n: 2,
                ref_set_decomp_m: 2,
                bin_config: SpBinnedReferenceSetConfig {
                    bin_radius: 2,
                    num_bin_members: 2,
                },
            },
            SemanticRulesVersion::One => Self {
                legacy_ring_size: sp_config::LEGACY_RING_SIZE_V1,
                ref_set_decomp_n: sp_config::REF_SET_DECOMP_N_V1,
                ref_set_decomp_m: sp_config::REF_SET_DECOMP_M_V1,
                bin_config: SpBinnedReferenceSetConfig {
                    bin_radius: sp_config::BIN_RADIUS_V1 as u16,
                    num_bin_members: sp_config::NUM_BIN_MEMBERS_V1 as u16,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpTxSquashedV1 {
    pub tx_semantic_rules_version: SemanticRulesVersion,
    /// Sorted by key image.
    pub legacy_input_images: Vec<LegacyEnoteImage>,
    /// Sorted by key image.
    pub sp_input_images: Vec<SpEnoteImage>,
    /// Sorted by onetime address.
    pub outputs: Vec<SpEnote>,
    pub balance_proof: SpBalanceProof,
    pub legacy_ring_signatures: Vec<LegacyRingSignature>,
    pub sp_image_proofs: Vec<SpImageProof>,
    pub sp_membership_proofs: Vec<SpMembershipProof>,
    pub tx_supplement: SpTxSupplement,
    pub tx_fee: DiscretizedFee,
}

impl SpTxSquashedV1 {
    pub fn version(&self) -> TxVersion {
        TxVersion::new(TxStructure::SquashedV1, self.tx_semantic_rules_version)
    }

    /// The message every input proof signs.
    pub fn proposal_prefix(&self) -> [u8; 32] {
        let legacy_key_images: Vec<_> = self.legacy_input_images.iter().map(|image| image.key_image).collect();
        let sp_key_images: Vec<_> = self.sp_input_images.iter().map(|image| image.key_image).collect();
        make_tx_proposal_prefix(
            &self.version(),
            &legacy_key_images,
            &sp_key_images,
            &self.outputs,
            &self.tx_fee,
            &self.tx_supplement,
        )
    }

    /// H_32(balance proof, ring signatures, image proofs, membership proofs)
    pub fn proofs_prefix(&self) -> [u8; 32] {
        let mut transcript = SpTranscript::new(domain::TX_PROOFS_PREFIX, self.size_bytes());
        transcript
            .append("balance_proof", &self.balance_proof)
            .append("legacy_ring_signatures", &self.legacy_ring_signatures)
            .append("sp_image_proofs", &self.sp_image_proofs)
            .append("sp_membership_proofs", &self.sp_membership_proofs);
        transcript.hash_to_32()
    }

    /// H_32(input images prefix, proofs prefix)
    pub fn artifacts_merkle_root(&self) -> [u8; 32] {
        let input_images_prefix = make_input_images_prefix(&self.legacy_input_images, &self.sp_input_images);
        let mut transcript = SpTranscript::new(domain::TX_ARTIFACTS_MERKLE_ROOT, 64);
        transcript
            .append("input_images_prefix", &input_images_prefix)
            .append("tx_proofs_prefix", &self.proofs_prefix());
        transcript.hash_to_32()
    }

    /// H_32(proposal prefix, artifacts merkle root)
    pub fn tx_id(&self) -> [u8; 32] {
        let mut transcript = SpTranscript::new(domain::TRANSACTION_ID, 64);
        transcript
            .append("tx_proposal_prefix", &self.proposal_prefix())
            .append("tx_artifacts_merkle_root", &self.artifacts_merkle_root());
        transcript.hash_to_32()
    }

    /// Expected serialized size. Range-proof commitments, bin configs,
    /// decompositions and bin seeds are implied by the rest of the tx.
    pub fn size_bytes_for(
        num_legacy_inputs: usize,
        num_sp_inputs: usize,
        num_outputs: usize,
        tx_extra_size: usize,
        params: &SpTxParamPackV1,
    ) -> usize {
        let legacy = num_legacy_inputs
            * (LegacyEnoteImage::SIZE_BYTES + LegacyRingSignature::size_bytes_for(params.legacy_ring_size));
        let membership = SpMembershipProof::size_bytes_compact_for(
            params.ref_set_decomp_n,
            params.ref_set_decomp_m,
            params.bin_config.num_bin_members as usize,
        );
        let sp = num_sp_inputs * (SpEnoteImage::SIZE_BYTES + SpImageProof::SIZE_BYTES + membership);

        legacy
            + sp
            + num_outputs * SpEnote::SIZE_BYTES
            + SpBalanceProof::size_bytes_compact_for(num_sp_inputs + num_outputs)
            + SpTxSupplement::size_bytes_for(num_outputs, tx_extra_size, true)
            + DiscretizedFee::size_bytes()
    }

    /// Size with the balance proof's aggregation savings partly clawed back.
    pub fn weight_for(
        num_legacy_inputs: usize,
        num_sp_inputs: usize,
        num_outputs: usize,
        tx_extra_size: usize,
        params: &SpTxParamPackV1,
    ) -> usize {
        Self::size_bytes_for(num_legacy_inputs, num_sp_inputs, num_outputs, tx_extra_size, params)
            - SpBalanceProof::size_bytes_compact_for(num_sp_inputs + num_outputs)
            + SpBalanceProof::weight_for(num_sp_inputs + num_outputs)
    }

    pub fn size_bytes(&self) -> usize {
        let legacy: usize = self.legacy_ring_signatures.iter().map(LegacyRingSignature::size_bytes).sum();
        let membership: usize = self.sp_membership_proofs.iter().map(SpMembershipProof::size_bytes_compact).sum();

        self.legacy_input_images.len() * LegacyEnoteImage::SIZE_BYTES
            + legacy
            + self.sp_input_images.len() * (SpEnoteImage::SIZE_BYTES + SpImageProof::SIZE_BYTES)
            + membership
            + self.outputs.len() * SpEnote::SIZE_BYTES
            + self.balance_proof.size_bytes_compact()
            + self.tx_supplement.size_bytes()
            + DiscretizedFee::size_bytes()
    }

    pub fn weight(&self) -> usize {
        self.size_bytes() - self.balance_proof.size_bytes_compact() + self.balance_proof.weight()
    }
}

/// Attach membership proofs to a partial tx and check the result's semantics.
pub fn make_sp_tx_squashed_v1(
    partial_tx: SpPartialTx,
    membership_proofs: Vec<SpAlignableMembershipProof>,
    semantic_rules_version: SemanticRulesVersion,
) -> Result<SpTxSquashedV1, TxError> {
    let sp_membership_proofs = align_membership_proofs(&partial_tx.sp_input_images, membership_proofs)?;

    let tx = SpTxSquashedV1 {
        tx_semantic_rules_version: semantic_rules_version,
        legacy_input_images: partial_tx.legacy_input_images,
        sp_input_images: partial_tx.sp_input_images,
        outputs: partial_tx.outputs,
        balance_proof: partial_tx.balance_proof,
        legacy_ring_signatures: partial_tx.legacy_ring_signatures,
        sp_image_proofs: partial_tx.sp_image_proofs,
        sp_membership_proofs,
        tx_supplement: partial_tx.tx_supplement,
        tx_fee: partial_tx.tx_fee,
    };

    SquashedV1Validator
        .validate_semantics((&tx).into())
        .map_err(|e| BUILDER.fail("squashed tx assembly", TxError::AssemblyFailed(e.to_string())))?;
    BUILDER.debug(format_args!(
        "assembled squashed tx: {} legacy inputs, {} seraphis inputs, {} outputs, {} bytes",
        tx.legacy_input_images.len(),
        tx.sp_input_images.len(),
        tx.outputs.len(),
        tx.size_bytes()
    ));
    Ok(tx)
}
