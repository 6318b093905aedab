//! Seraphis input proposals, image proofs, partial inputs and membership
//! proofs.
//!
//! An enote `Ko = k_g G + (k_x + k_vb) X + (k_u + k_m) U` with commitment
//! `C = x G + a H` is spent through its image:
//!
//! ```text
//! K" = t_k G + H_n(Ko,C) Ko       masked address
//! C" = t_c G + C                  masked commitment
//! KI = ((k_u + k_m) / (k_x + k_vb)) U
//! ```
//!
//! The composition proof shows knowledge of `K" = x' G + y' X + z' U` with
//! `KI = (z'/y') U`; the membership proof shows `Q" - Q_l` is a multiple of `G`
//! for one squashed enote `Q_l` in the reference set.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use seraphis_crypto::composition_proof::{make_sp_composition_proof, verify_sp_composition_proof};
use seraphis_crypto::grootle::make_grootle_proof;
use seraphis_crypto::transcript::domain;
use seraphis_crypto::{
    commit, extend_seraphis_spendkey_u, generators, make_seraphis_key_image, random_mask, random_scalar, KeyImage,
    SpTranscript,
};

use crate::binned_reference_set::{
    make_bin_generator_seed, make_binned_reference_set, SpBinnedReferenceSet, SpBinnedReferenceSetConfig,
};
use crate::components::{ref_set_size, SpAlignableMembershipProof, SpImageProof, SpMembershipProof};
use crate::enote::{
    check_key_image, check_mask, make_enote_image_masked_keys, make_onetime_address_from_extensions,
    make_squashed_address_key, make_squash_prefix, point, LegacyEnoteImage, SpEnoteCore, SpEnoteCoreVariant,
    SpEnoteImage,
};
use crate::index_mapper::RefSetIndexMapper;
use crate::jamtis::{make_input_context_standard, JamtisMockKeys};
use crate::logging::BUILDER;
use crate::validation::TxValidationContext;
use crate::TxError;

// ─── Input proposals ────────────────────────────────────────────────────────

/// Intent to spend one seraphis enote.
///
/// The masks must be fresh for every transaction the enote is proposed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpInputProposal {
    pub enote_core: SpEnoteCoreVariant,
    pub key_image: KeyImage,
    pub enote_view_extension_g: Scalar,
    pub enote_view_extension_x: Scalar,
    pub enote_view_extension_u: Scalar,
    pub amount_blinding_factor: Scalar,
    pub amount: u64,
    /// t_k
    pub address_mask: Scalar,
    /// t_c
    pub commitment_mask: Scalar,
}

impl SpInputProposal {
    /// Proposal with freshly drawn masks.
    pub fn new(
        enote_core: SpEnoteCoreVariant,
        key_image: KeyImage,
        enote_view_extensions: (Scalar, Scalar, Scalar),
        amount_blinding_factor: Scalar,
        amount: u64,
    ) -> Self {
        let (g, x, u) = enote_view_extensions;
        Self {
            enote_core,
            key_image,
            enote_view_extension_g: g,
            enote_view_extension_x: x,
            enote_view_extension_u: u,
            amount_blinding_factor,
            amount,
            address_mask: random_mask(),
            commitment_mask: random_mask(),
        }
    }

    pub fn onetime_address(&self) -> &CompressedEdwardsY {
        self.enote_core.onetime_address()
    }

    pub fn amount_commitment(&self) -> CompressedEdwardsY {
        self.enote_core.amount_commitment()
    }

    pub fn enote_image(&self) -> Result<SpEnoteImage, TxError> {
        let (masked_address, masked_commitment) = make_enote_image_masked_keys(
            self.onetime_address(),
            &self.amount_commitment(),
            &self.address_mask,
            &self.commitment_mask,
        )?;
        Ok(SpEnoteImage {
            masked_address,
            masked_commitment,
            key_image: self.key_image,
        })
    }

    /// Blinding factor of the masked commitment: t_c + x
    pub fn masked_blinding_factor(&self) -> Scalar {
        self.commitment_mask + self.amount_blinding_factor
    }
}

pub fn sort_input_proposals(proposals: &mut [SpInputProposal]) {
    proposals.sort_by(|a, b| a.key_image.as_bytes().cmp(b.key_image.as_bytes()));
}

/// Random input proposal for an enote owned by `keys`.
pub fn gen_input_proposal(keys: &JamtisMockKeys, amount: u64) -> Result<SpInputProposal, TxError> {
    let (k_g, k_x, k_u) = (random_scalar(), random_scalar(), random_scalar());
    let blinding = random_scalar();
    let onetime_address =
        make_onetime_address_from_extensions(&k_g, &k_x, &k_u, &keys.core_spend_pubkey(), &keys.k_vb);
    let key_image = make_seraphis_key_image(&(k_x + keys.k_vb), &(k_u + keys.k_m))
        .map_err(|e| TxError::ProposalInconsistent(e.to_string()))?;

    Ok(SpInputProposal::new(
        SpEnoteCoreVariant::Plain(SpEnoteCore::new(onetime_address, amount, &blinding)),
        key_image,
        (k_g, k_x, k_u),
        blinding,
        amount,
    ))
}

/// Recompute the onetime address, key image and commitment from the
/// proposal's secrets and check the masks.
pub fn check_input_proposal_semantics(
    proposal: &SpInputProposal,
    core_spend_pubkey: &EdwardsPoint,
    k_view_balance: &Scalar,
) -> Result<(), TxError> {
    // 1. Ko = k_g G + (k_x + k_vb) X + (k_u U + k_m U)
    let onetime_address = make_onetime_address_from_extensions(
        &proposal.enote_view_extension_g,
        &proposal.enote_view_extension_x,
        &proposal.enote_view_extension_u,
        core_spend_pubkey,
        k_view_balance,
    );
    if onetime_address != *proposal.onetime_address() {
        return Err(TxError::ProposalInconsistent("could not reproduce the onetime address".into()));
    }

    // 2. KI = (1 / (k_x + k_vb)) (k_u U + k_m U)
    let y = proposal.enote_view_extension_x + k_view_balance;
    if y == Scalar::ZERO {
        return Err(TxError::ProposalInconsistent("key image denominator is zero".into()));
    }
    let extended_spendkey = extend_seraphis_spendkey_u(&proposal.enote_view_extension_u, core_spend_pubkey);
    if (y.invert() * extended_spendkey).compress() != proposal.key_image {
        return Err(TxError::ProposalInconsistent("could not reproduce the key image".into()));
    }
    check_key_image(&proposal.key_image)?;

    // 3. C = x G + a H
    if commit(proposal.amount, &proposal.amount_blinding_factor).compress() != proposal.amount_commitment() {
        return Err(TxError::ProposalInconsistent("could not reproduce the amount commitment".into()));
    }

    check_mask(&proposal.address_mask)?;
    check_mask(&proposal.commitment_mask)
}

// ─── Prefixes and contexts ──────────────────────────────────────────────────

/// H_32(legacy images, seraphis images)
pub fn make_input_images_prefix(legacy_images: &[LegacyEnoteImage], sp_images: &[SpEnoteImage]) -> [u8; 32] {
    let mut transcript = SpTranscript::new(
        domain::INPUT_IMAGES_PREFIX,
        legacy_images.len() * LegacyEnoteImage::SIZE_BYTES + sp_images.len() * SpEnoteImage::SIZE_BYTES,
    );
    transcript
        .append("legacy_enote_images", legacy_images)
        .append("sp_enote_images", sp_images);
    transcript.hash_to_32()
}

/// Input context over the key images of every input, sorted per input type.
pub fn make_standard_input_context<'a>(
    legacy_key_images: impl IntoIterator<Item = &'a KeyImage>,
    sp_key_images: impl IntoIterator<Item = &'a KeyImage>,
) -> Result<[u8; 32], TxError> {
    let sorted = |keys: &mut Vec<KeyImage>| keys.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
    let mut legacy: Vec<KeyImage> = legacy_key_images.into_iter().copied().collect();
    let mut sp: Vec<KeyImage> = sp_key_images.into_iter().copied().collect();
    sorted(&mut legacy);
    sorted(&mut sp);
    make_input_context_standard(&legacy, &sp)
}

// ─── Image proofs and partial inputs ────────────────────────────────────────

/// Composition proof on K" with
/// x' = t_k + H_n(Ko,C) k_g, y' = H_n(Ko,C)(k_x + k_vb), z' = H_n(Ko,C)(k_u + k_m).
pub fn make_image_proof(
    proposal: &SpInputProposal,
    message: &[u8; 32],
    k_spend: &Scalar,
    k_view_balance: &Scalar,
) -> Result<SpImageProof, TxError> {
    let image = proposal.enote_image()?;
    let prefix = make_squash_prefix(proposal.onetime_address(), &proposal.amount_commitment());

    let x = proposal.address_mask + prefix * proposal.enote_view_extension_g;
    let y = prefix * (proposal.enote_view_extension_x + k_view_balance);
    let z = prefix * (proposal.enote_view_extension_u + k_spend);

    let composition_proof = make_sp_composition_proof(message, &image.masked_address, &x, &y, &z)
        .map_err(|e| BUILDER.fail("image proof", TxError::InvalidInputProof(e.to_string())))?;
    Ok(SpImageProof { composition_proof })
}

pub fn make_image_proofs(
    proposals: &[SpInputProposal],
    message: &[u8; 32],
    k_spend: &Scalar,
    k_view_balance: &Scalar,
) -> Result<Vec<SpImageProof>, TxError> {
    if proposals.is_empty() {
        return Err(TxError::ProposalInconsistent("no inputs to make image proofs for".into()));
    }
    proposals
        .iter()
        .map(|proposal| make_image_proof(proposal, message, k_spend, k_view_balance))
        .collect()
}

/// A seraphis input with everything but its membership proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpPartialInput {
    pub input_image: SpEnoteImage,
    pub image_proof: SpImageProof,
    pub address_mask: Scalar,
    pub commitment_mask: Scalar,
    /// Message the image proof signs.
    pub tx_proposal_prefix: [u8; 32],
    pub input_enote_core: SpEnoteCoreVariant,
    pub input_amount: u64,
    pub input_amount_blinding_factor: Scalar,
}

impl SpPartialInput {
    pub fn key_image(&self) -> &KeyImage {
        &self.input_image.key_image
    }

    pub fn masked_blinding_factor(&self) -> Scalar {
        self.commitment_mask + self.input_amount_blinding_factor
    }
}

pub fn check_partial_input_semantics(partial_input: &SpPartialInput) -> Result<(), TxError> {
    let commitment = commit(partial_input.input_amount, &partial_input.input_amount_blinding_factor).compress();
    if commitment != partial_input.input_enote_core.amount_commitment() {
        return Err(TxError::ProposalInconsistent("partial input amount commitment mismatch".into()));
    }

    let (masked_address, masked_commitment) = make_enote_image_masked_keys(
        partial_input.input_enote_core.onetime_address(),
        &commitment,
        &partial_input.address_mask,
        &partial_input.commitment_mask,
    )?;
    if masked_address != partial_input.input_image.masked_address
        || masked_commitment != partial_input.input_image.masked_commitment
    {
        return Err(TxError::ProposalInconsistent("partial input image does not match its masks".into()));
    }

    if !verify_sp_composition_proof(
        &partial_input.image_proof.composition_proof,
        &partial_input.tx_proposal_prefix,
        &masked_address,
        partial_input.key_image(),
    ) {
        return Err(TxError::InvalidInputProof("partial input image proof does not verify".into()));
    }
    Ok(())
}

pub fn make_partial_input(
    proposal: &SpInputProposal,
    tx_proposal_prefix: &[u8; 32],
    k_spend: &Scalar,
    k_view_balance: &Scalar,
) -> Result<SpPartialInput, TxError> {
    let core_spend_pubkey = k_spend * generators::u();
    check_input_proposal_semantics(proposal, &core_spend_pubkey, k_view_balance)?;

    let image_proof = make_image_proof(proposal, tx_proposal_prefix, k_spend, k_view_balance)?;
    let partial_input = SpPartialInput {
        input_image: proposal.enote_image()?,
        image_proof,
        address_mask: proposal.address_mask,
        commitment_mask: proposal.commitment_mask,
        tx_proposal_prefix: *tx_proposal_prefix,
        input_enote_core: proposal.enote_core,
        input_amount: proposal.amount,
        input_amount_blinding_factor: proposal.amount_blinding_factor,
    };
    check_partial_input_semantics(&partial_input)?;
    Ok(partial_input)
}

pub fn make_partial_inputs(
    proposals: &[SpInputProposal],
    tx_proposal_prefix: &[u8; 32],
    k_spend: &Scalar,
    k_view_balance: &Scalar,
) -> Result<Vec<SpPartialInput>, TxError> {
    proposals
        .iter()
        .map(|proposal| make_partial_input(proposal, tx_proposal_prefix, k_spend, k_view_balance))
        .collect()
}

// ─── Membership proofs ──────────────────────────────────────────────────────

/// H_32(binned reference set)
pub fn make_membership_proof_message(binned_reference_set: &SpBinnedReferenceSet) -> [u8; 32] {
    let mut transcript = SpTranscript::new(
        domain::MEMBERSHIP_PROOF_MESSAGE,
        binned_reference_set.size_bytes() + SpBinnedReferenceSetConfig::size_bytes(),
    );
    transcript.append("binned_reference_set", binned_reference_set);
    transcript.hash_to_32()
}

/// Everything needed to prove membership for one input.
#[derive(Debug, Clone)]
pub struct SpMembershipProofPrep {
    pub ref_set_decomp_n: usize,
    pub ref_set_decomp_m: usize,
    pub binned_reference_set: SpBinnedReferenceSet,
    /// Squashed enotes Q at the expanded reference indices.
    pub referenced_enotes_squashed: Vec<EdwardsPoint>,
    pub real_reference_enote: SpEnoteCoreVariant,
    pub address_mask: Scalar,
    pub commitment_mask: Scalar,
}

/// Bin the real enote among decoys from `context` and fetch the squashed
/// enotes of the whole reference set.
#[allow(clippy::too_many_arguments)]
pub fn make_membership_proof_prep_for_enote(
    context: &dyn TxValidationContext,
    mapper: &dyn RefSetIndexMapper,
    real_reference_enote: SpEnoteCoreVariant,
    address_mask: &Scalar,
    commitment_mask: &Scalar,
    real_reference_index: u64,
    bin_config: SpBinnedReferenceSetConfig,
    ref_set_decomp_n: usize,
    ref_set_decomp_m: usize,
) -> Result<SpMembershipProofPrep, TxError> {
    let size = ref_set_size(ref_set_decomp_n, ref_set_decomp_m);
    if size == 0 {
        return Err(TxError::InvalidBinConfig(format!(
            "reference set decomposition {ref_set_decomp_n}^{ref_set_decomp_m} is unusable"
        )));
    }

    let (masked_address, masked_commitment) = make_enote_image_masked_keys(
        real_reference_enote.onetime_address(),
        &real_reference_enote.amount_commitment(),
        address_mask,
        commitment_mask,
    )?;
    let seed = make_bin_generator_seed(&masked_address, &masked_commitment);
    let (binned_reference_set, _) =
        make_binned_reference_set(mapper, bin_config, seed, size as u64, real_reference_index)?;
    let referenced_enotes_squashed = context.get_sp_reference_elements(&binned_reference_set.reference_indices()?)?;

    Ok(SpMembershipProofPrep {
        ref_set_decomp_n,
        ref_set_decomp_m,
        binned_reference_set,
        referenced_enotes_squashed,
        real_reference_enote,
        address_mask: *address_mask,
        commitment_mask: *commitment_mask,
    })
}

pub fn make_membership_proof_prep(
    context: &dyn TxValidationContext,
    mapper: &dyn RefSetIndexMapper,
    proposal: &SpInputProposal,
    real_reference_index: u64,
    bin_config: SpBinnedReferenceSetConfig,
    ref_set_decomp_n: usize,
    ref_set_decomp_m: usize,
) -> Result<SpMembershipProofPrep, TxError> {
    make_membership_proof_prep_for_enote(
        context,
        mapper,
        proposal.enote_core,
        &proposal.address_mask,
        &proposal.commitment_mask,
        real_reference_index,
        bin_config,
        ref_set_decomp_n,
        ref_set_decomp_m,
    )
}

fn membership_error(e: impl std::fmt::Display) -> TxError {
    BUILDER.fail("membership proof", TxError::InvalidMembershipProof(e.to_string()))
}

pub fn make_membership_proof(prep: SpMembershipProofPrep) -> Result<SpMembershipProof, TxError> {
    let size = ref_set_size(prep.ref_set_decomp_n, prep.ref_set_decomp_m);
    if prep.referenced_enotes_squashed.len() != size {
        return Err(membership_error("reference set size doesn't match the referenced enotes"));
    }
    if prep.binned_reference_set.reference_set_size() != size as u64 {
        return Err(membership_error("reference set size doesn't match the binned reference set"));
    }

    // 1. real squashed enote and masked keys
    let onetime_address = prep.real_reference_enote.onetime_address();
    let amount_commitment = prep.real_reference_enote.amount_commitment();
    let squashed_address = make_squashed_address_key(onetime_address, &amount_commitment)?;
    let commitment_point = point(&amount_commitment)?;
    let real_q = squashed_address + commitment_point;
    let masked_address = (EdwardsPoint::mul_base(&prep.address_mask) + squashed_address).compress();
    let masked_commitment = (EdwardsPoint::mul_base(&prep.commitment_mask) + commitment_point).compress();

    if make_bin_generator_seed(&masked_address, &masked_commitment) != prep.binned_reference_set.bin_generator_seed {
        return Err(membership_error("could not reproduce the bin generator seed"));
    }

    // 2. locate the real enote
    let real_index = prep
        .referenced_enotes_squashed
        .iter()
        .position(|q| *q == real_q)
        .ok_or_else(|| membership_error("real enote is not in the reference set"))?;

    // 3. Q" = K" + C", privkey = -(t_k + t_c)
    let offset = point(&masked_address)? + point(&masked_commitment)?;
    let privkey = -(prep.address_mask + prep.commitment_mask);
    let message = make_membership_proof_message(&prep.binned_reference_set);

    let grootle_proof = make_grootle_proof(
        &message,
        &prep.referenced_enotes_squashed,
        real_index,
        &offset,
        &privkey,
        prep.ref_set_decomp_n,
        prep.ref_set_decomp_m,
    )
    .map_err(membership_error)?;

    Ok(SpMembershipProof {
        grootle_proof,
        binned_reference_set: prep.binned_reference_set,
        ref_set_decomp_n: prep.ref_set_decomp_n,
        ref_set_decomp_m: prep.ref_set_decomp_m,
    })
}

pub fn make_alignable_membership_proof(prep: SpMembershipProofPrep) -> Result<SpAlignableMembershipProof, TxError> {
    let squashed_address = make_squashed_address_key(
        prep.real_reference_enote.onetime_address(),
        &prep.real_reference_enote.amount_commitment(),
    )?;
    let masked_address = (EdwardsPoint::mul_base(&prep.address_mask) + squashed_address).compress();
    Ok(SpAlignableMembershipProof {
        masked_address,
        membership_proof: make_membership_proof(prep)?,
    })
}

pub fn make_alignable_membership_proofs(
    preps: Vec<SpMembershipProofPrep>,
) -> Result<Vec<SpAlignableMembershipProof>, TxError> {
    preps.into_iter().map(make_alignable_membership_proof).collect()
}

/// Order membership proofs to match `input_images`; each proof may be used once.
pub fn align_membership_proofs(
    input_images: &[SpEnoteImage],
    alignable_proofs: Vec<SpAlignableMembershipProof>,
) -> Result<Vec<SpMembershipProof>, TxError> {
    if input_images.len() != alignable_proofs.len() {
        return Err(TxError::AssemblyFailed(format!(
            "{} input images but {} membership proofs",
            input_images.len(),
            alignable_proofs.len()
        )));
    }

    let mut pending: Vec<Option<SpAlignableMembershipProof>> = alignable_proofs.into_iter().map(Some).collect();
    input_images
        .iter()
        .map(|image| {
            pending
                .iter_mut()
                .find(|slot| {
                    slot.as_ref()
                        .is_some_and(|proof| proof.masked_address == image.masked_address)
                })
                .and_then(Option::take)
                .map(|proof| proof.membership_proof)
                .ok_or_else(|| TxError::AssemblyFailed("an input image has no matching membership proof".into()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enote::make_squashed_enote_q;
    use seraphis_crypto::grootle::verify_grootle_proof;
    use seraphis_crypto::random_point;

    #[test]
    fn test_input_proposal_semantics() {
        let keys = JamtisMockKeys::generate();
        let proposal = gen_input_proposal(&keys, 10).unwrap();
        assert!(check_input_proposal_semantics(&proposal, &keys.core_spend_pubkey(), &keys.k_vb).is_ok());

        let other = JamtisMockKeys::generate();
        assert!(matches!(
            check_input_proposal_semantics(&proposal, &other.core_spend_pubkey(), &keys.k_vb),
            Err(TxError::ProposalInconsistent(_))
        ));

        let mut wrong_amount = proposal.clone();
        wrong_amount.amount += 1;
        assert!(check_input_proposal_semantics(&wrong_amount, &keys.core_spend_pubkey(), &keys.k_vb).is_err());

        let mut bad_mask = proposal;
        bad_mask.commitment_mask = Scalar::ONE;
        assert!(matches!(
            check_input_proposal_semantics(&bad_mask, &keys.core_spend_pubkey(), &keys.k_vb),
            Err(TxError::InvalidMask(_))
        ));
    }

    #[test]
    fn test_partial_input_round_trip() {
        let keys = JamtisMockKeys::generate();
        let proposal = gen_input_proposal(&keys, 7).unwrap();
        let prefix = [9u8; 32];
        let partial = make_partial_input(&proposal, &prefix, &keys.k_m, &keys.k_vb).unwrap();
        assert_eq!(partial.input_image, proposal.enote_image().unwrap());

        let mut tampered = partial.clone();
        tampered.tx_proposal_prefix = [8u8; 32];
        assert!(matches!(check_partial_input_semantics(&tampered), Err(TxError::InvalidInputProof(_))));

        let mut wrong_mask = partial;
        wrong_mask.address_mask = random_mask();
        assert!(matches!(
            check_partial_input_semantics(&wrong_mask),
            Err(TxError::ProposalInconsistent(_))
        ));
    }

    #[test]
    fn test_membership_proof_and_alignment() {
        let keys = JamtisMockKeys::generate();
        let (n, m) = (2, 3);
        let proposals: Vec<SpInputProposal> = (0..2).map(|_| gen_input_proposal(&keys, 1).unwrap()).collect();

        let mut alignable = Vec::new();
        for proposal in &proposals {
            let image = proposal.enote_image().unwrap();
            let seed = make_bin_generator_seed(&image.masked_address, &image.masked_commitment);
            let config = SpBinnedReferenceSetConfig { bin_radius: 3, num_bin_members: 2 };
            let mapper = crate::index_mapper::FlatIndexMapper::new(0, 99).unwrap();
            let (binned, real_position) = make_binned_reference_set(&mapper, config, seed, 8, 40).unwrap();

            let mut referenced: Vec<EdwardsPoint> = (0..8).map(|_| random_point()).collect();
            referenced[real_position] =
                make_squashed_enote_q(proposal.onetime_address(), &proposal.amount_commitment()).unwrap();

            let prep = SpMembershipProofPrep {
                ref_set_decomp_n: n,
                ref_set_decomp_m: m,
                binned_reference_set: binned,
                referenced_enotes_squashed: referenced.clone(),
                real_reference_enote: proposal.enote_core,
                address_mask: proposal.address_mask,
                commitment_mask: proposal.commitment_mask,
            };
            let proof = make_alignable_membership_proof(prep).unwrap();
            assert_eq!(proof.masked_address, image.masked_address);

            let offset = image.masked_address.decompress().unwrap() + image.masked_commitment.decompress().unwrap();
            let message = make_membership_proof_message(&proof.membership_proof.binned_reference_set);
            assert!(verify_grootle_proof(&proof.membership_proof.grootle_proof, &message, &referenced, &offset, n, m));
            alignable.push(proof);
        }

        let images: Vec<SpEnoteImage> = proposals.iter().rev().map(|p| p.enote_image().unwrap()).collect();
        let expected: Vec<SpMembershipProof> =
            alignable.iter().rev().map(|proof| proof.membership_proof.clone()).collect();
        assert_eq!(align_membership_proofs(&images, alignable.clone()).unwrap(), expected);

        let duplicate_images = vec![images[0], images[0]];
        assert!(matches!(
            align_membership_proofs(&duplicate_images, alignable),
            Err(TxError::AssemblyFailed(_))
        ));
    }

    #[test]
    fn test_input_context_ignores_order() {
        let kis: Vec<KeyImage> = (0..4).map(|_| random_point().compress()).collect();
        let reversed: Vec<KeyImage> = kis.iter().rev().copied().collect();
        assert_eq!(
            make_standard_input_context(&kis[..1], &kis[1..]).unwrap(),
            make_standard_input_context(&reversed[3..], &reversed[..3]).unwrap()
        );
    }
}
