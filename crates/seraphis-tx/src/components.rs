//! Proved transaction components and their size accounting.

use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::scalar::Scalar;
use seraphis_crypto::bulletproofs_plus::{bpp_size_bytes, bpp_weight, BulletproofPlusProof};
use seraphis_crypto::clsag::ClsagSignature;
use seraphis_crypto::composition_proof::SpCompositionProof;
use seraphis_crypto::grootle::{grootle_size_bytes, GrootleProof};
use seraphis_crypto::math::uint_pow;
use seraphis_crypto::transcript::ToTranscript;
use seraphis_crypto::x25519::X25519Pubkey;

use crate::binned_reference_set::SpBinnedReferenceSet;
use crate::tx_extra::TxExtra;

// ─── Balance proof ──────────────────────────────────────────────────────────

/// Aggregate range proof over every seraphis input's masked amount and every
/// output amount, plus the remainder blinding factor that closes the balance
/// equation. Legacy masked commitments are not range proved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpBalanceProof {
    pub bpp_proof: BulletproofPlusProof,
    pub remainder_blinding_factor: Scalar,
}

impl SpBalanceProof {
    pub fn size_bytes_for(num_range_proofs: usize) -> usize {
        bpp_size_bytes(num_range_proofs, true) + 32
    }

    /// The range-proof commitments duplicate the seraphis input images'
    /// masked commitments and the output commitments.
    pub fn size_bytes_compact_for(num_range_proofs: usize) -> usize {
        Self::size_bytes_for(num_range_proofs) - 32 * num_range_proofs
    }

    pub fn weight_for(num_range_proofs: usize) -> usize {
        bpp_weight(num_range_proofs, false) + 32
    }

    pub fn size_bytes(&self) -> usize {
        Self::size_bytes_for(self.bpp_proof.v.len())
    }

    pub fn size_bytes_compact(&self) -> usize {
        Self::size_bytes_compact_for(self.bpp_proof.v.len())
    }

    pub fn weight(&self) -> usize {
        Self::weight_for(self.bpp_proof.v.len())
    }
}

impl ToTranscript for SpBalanceProof {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.bpp_proof.append_to(bytes);
        self.remainder_blinding_factor.append_to(bytes);
    }
}

// ─── Legacy ring signature ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRingSignature {
    pub clsag_proof: ClsagSignature,
    /// Ledger indices of the ring members, ascending.
    pub reference_set: Vec<u64>,
}

impl LegacyRingSignature {
    pub fn size_bytes_for(ring_size: usize) -> usize {
        ClsagSignature::size_bytes(ring_size) + 8 * ring_size
    }

    pub fn size_bytes(&self) -> usize {
        Self::size_bytes_for(self.reference_set.len())
    }
}

impl ToTranscript for LegacyRingSignature {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.clsag_proof.append_to(bytes);
        self.reference_set.append_to(bytes);
    }
}

// ─── Seraphis input proofs ──────────────────────────────────────────────────

/// Ownership and key-image proof for one seraphis input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpImageProof {
    pub composition_proof: SpCompositionProof,
}

impl SpImageProof {
    pub const SIZE_BYTES: usize = SpCompositionProof::SIZE_BYTES;
}

impl ToTranscript for SpImageProof {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.composition_proof.append_to(bytes);
    }
}

/// n^m, or 0 when it overflows.
pub fn ref_set_size(n: usize, m: usize) -> usize {
    uint_pow(n as u64, m as u32).map_or(0, |size| size as usize)
}

/// Grootle proof over a binned reference set of `n^m` squashed enotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpMembershipProof {
    pub grootle_proof: GrootleProof,
    pub binned_reference_set: SpBinnedReferenceSet,
    pub ref_set_decomp_n: usize,
    pub ref_set_decomp_m: usize,
}

impl SpMembershipProof {
    pub fn size_bytes_for(n: usize, m: usize, num_bin_members: usize) -> usize {
        let size = ref_set_size(n, m);
        let bins = if num_bin_members > 0 {
            SpBinnedReferenceSet::size_bytes_for(size / num_bin_members)
        } else {
            0
        };
        // decomposition parameters take 4 bytes each
        grootle_size_bytes(n, m) + bins + 4 * 2
    }

    /// Size when decomposition, bin config and seed are implied by context.
    pub fn size_bytes_compact_for(n: usize, m: usize, num_bin_members: usize) -> usize {
        let size = ref_set_size(n, m);
        let bins = if num_bin_members > 0 {
            SpBinnedReferenceSet::size_bytes_compact_for(size / num_bin_members)
        } else {
            0
        };
        grootle_size_bytes(n, m) + bins
    }

    pub fn size_bytes(&self) -> usize {
        Self::size_bytes_for(
            self.ref_set_decomp_n,
            self.ref_set_decomp_m,
            self.binned_reference_set.bin_config.num_bin_members as usize,
        )
    }

    pub fn size_bytes_compact(&self) -> usize {
        Self::size_bytes_compact_for(
            self.ref_set_decomp_n,
            self.ref_set_decomp_m,
            self.binned_reference_set.bin_config.num_bin_members as usize,
        )
    }
}

impl ToTranscript for SpMembershipProof {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.grootle_proof.append_to(bytes);
        self.binned_reference_set.append_to(bytes);
        self.ref_set_decomp_n.append_to(bytes);
        self.ref_set_decomp_m.append_to(bytes);
    }
}

/// A membership proof tagged with the masked address of the image it
/// belongs to, so proofs made out of order can be matched to inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpAlignableMembershipProof {
    pub masked_address: CompressedEdwardsY,
    pub membership_proof: SpMembershipProof,
}

// ─── Supplement ─────────────────────────────────────────────────────────────

/// Data recipients need to scan outputs but that no proof commits to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpTxSupplement {
    pub output_enote_ephemeral_pubkeys: Vec<X25519Pubkey>,
    pub tx_extra: TxExtra,
}

impl SpTxSupplement {
    /// Expected size; with the shared-key assumption a 2-output tx carries one key.
    pub fn size_bytes_for(num_outputs: usize, tx_extra_size: usize, shared_ephemeral_key: bool) -> usize {
        let keys = if shared_ephemeral_key && num_outputs == 2 { 1 } else { num_outputs };
        32 * keys + tx_extra_size
    }

    pub fn size_bytes(&self) -> usize {
        32 * self.output_enote_ephemeral_pubkeys.len() + self.tx_extra.len()
    }
}

impl ToTranscript for SpTxSupplement {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.output_enote_ephemeral_pubkeys.append_to(bytes);
        self.tx_extra.append_to(bytes);
    }
}
