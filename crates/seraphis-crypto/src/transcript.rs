//! Domain-separated transcripts and the blake2b hash family.
//!
//! A transcript is `varint(len(domain)) || domain || elements...`, where each
//! element is preceded by its length-prefixed label. Variable-length element
//! lists carry their count so two transcripts with different layouts can
//! never produce the same bytes.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use seraphis_types::varint::write_varint;

/// Hash domain separators.
pub mod domain {
    pub const GENERATOR_U: &str = "seraphis U";
    pub const GENERATOR_X: &str = "seraphis X";
    pub const GENERATOR_FACTORY: &str = "sp_generator_factory";
    pub const LEGACY_KEY_IMAGE_BASE: &str = "legacy_key_image_base";

    pub const COMPOSITION_PROOF_CHALLENGE_MESSAGE: &str = "sp_composition_proof_challenge_message";
    pub const COMPOSITION_PROOF_CHALLENGE: &str = "sp_composition_proof_challenge";
    pub const GROOTLE_CHALLENGE: &str = "grootle_challenge";

    pub const SQUASHED_ENOTE_PREFIX: &str = "sp_squash_prefix";
    pub const BINNED_REF_SET_GENERATOR_SEED: &str = "binned_refset_generator_seed";
    pub const BINNED_REF_SET_MEMBER: &str = "binned_refset_member";

    pub const INPUT_CONTEXT: &str = "jamtis_input_context_standard";
    pub const INPUT_CONTEXT_COINBASE: &str = "jamtis_input_context_coinbase";
    pub const SENDER_RECEIVER_SECRET_PLAIN: &str = "jamtis_sender_receiver_secret_plain";
    pub const SENDER_RECEIVER_SECRET_SELF_SEND_DUMMY: &str = "jamtis_self_send_dummy";
    pub const SENDER_RECEIVER_SECRET_SELF_SEND_CHANGE: &str = "jamtis_self_send_change";
    pub const SENDER_RECEIVER_SECRET_SELF_SEND_SELF_SPEND: &str = "jamtis_self_send_self_spend";
    pub const AMOUNT_BAKED_KEY_PLAIN: &str = "jamtis_amount_baked_key_plain";
    pub const AMOUNT_BAKED_KEY_SELF_SEND: &str = "jamtis_amount_baked_key_self_send";
    pub const FIND_RECEIVED_KEY: &str = "jamtis_find_received_key";
    pub const AMOUNT_BLINDING_FACTOR: &str = "jamtis_amount_blinding_factor";
    pub const ENCODED_AMOUNT_MASK: &str = "jamtis_encoded_amount_mask";
    pub const ONETIME_EXTENSION_G: &str = "jamtis_onetime_extension_g";
    pub const ONETIME_EXTENSION_X: &str = "jamtis_onetime_extension_x";
    pub const ONETIME_EXTENSION_U: &str = "jamtis_onetime_extension_u";
    pub const ADDRESS_TAG_ENCRYPTION: &str = "jamtis_address_tag_encryption";
    pub const VIEW_TAG: &str = "jamtis_view_tag";

    pub const TX_PROPOSAL_MESSAGE: &str = "sp_tx_proposal_message";
    pub const LEGACY_RING_SIGNATURE_MESSAGE: &str = "sp_legacy_ring_signature_message";
    pub const MEMBERSHIP_PROOF_MESSAGE: &str = "sp_membership_proof_message";
    pub const INPUT_IMAGES_PREFIX: &str = "sp_input_images_prefix";
    pub const TX_PROOFS_PREFIX: &str = "sp_tx_proofs_prefix";
    pub const TX_ARTIFACTS_MERKLE_ROOT: &str = "sp_tx_artifacts_merkle_root";
    pub const TRANSACTION_ID: &str = "sp_transaction_id";
    pub const COINBASE_TRANSACTION_ID: &str = "sp_coinbase_transaction_id";
    pub const CONTEXTUAL_VALIDATION_ID: &str = "sp_contextual_validation_id";
}

/// Anything that can be written into a transcript.
pub trait ToTranscript {
    fn append_to(&self, bytes: &mut Vec<u8>);
}

impl<const N: usize> ToTranscript for [u8; N] {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(self);
    }
}

impl ToTranscript for u64 {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_le_bytes());
    }
}

impl ToTranscript for usize {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        (*self as u64).append_to(bytes);
    }
}

impl ToTranscript for u8 {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.push(*self);
    }
}

impl ToTranscript for Scalar {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(self.as_bytes());
    }
}

impl ToTranscript for CompressedEdwardsY {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(self.as_bytes());
    }
}

impl ToTranscript for EdwardsPoint {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(self.compress().as_bytes());
    }
}

impl ToTranscript for MontgomeryPoint {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(self.as_bytes());
    }
}

impl<T: ToTranscript> ToTranscript for Vec<T> {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.as_slice().append_to(bytes);
    }
}

impl<T: ToTranscript> ToTranscript for [T] {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        write_varint(bytes, self.len() as u64);
        for item in self {
            item.append_to(bytes);
        }
    }
}

impl<T: ToTranscript + ?Sized> ToTranscript for &T {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        (**self).append_to(bytes);
    }
}

/// Domain-separated transcript builder.
#[derive(Debug, Clone)]
pub struct SpTranscript {
    data: Vec<u8>,
}

impl SpTranscript {
    pub fn new(domain_separator: &str, estimated_data_size: usize) -> Self {
        let mut data = Vec::with_capacity(10 + domain_separator.len() + estimated_data_size);
        write_varint(&mut data, domain_separator.len() as u64);
        data.extend_from_slice(domain_separator.as_bytes());
        Self { data }
    }

    pub fn append<T: ToTranscript + ?Sized>(&mut self, label: &str, value: &T) -> &mut Self {
        write_varint(&mut self.data, label.len() as u64);
        self.data.extend_from_slice(label.as_bytes());
        value.append_to(&mut self.data);
        self
    }

    /// Raw bytes with no label or length prefix.
    pub fn append_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn hash_to_1(&self) -> u8 {
        sp_hash_to_1(&self.data)
    }

    pub fn hash_to_8(&self) -> [u8; 8] {
        sp_hash_to_8(&self.data)
    }

    pub fn hash_to_32(&self) -> [u8; 32] {
        sp_hash_to_32(&self.data)
    }

    pub fn hash_to_64(&self) -> [u8; 64] {
        sp_hash_to_64(&self.data)
    }

    pub fn hash_to_scalar(&self) -> Scalar {
        sp_hash_to_scalar(&self.data)
    }

    /// Hash with an output width chosen by the caller (1..=64 bytes).
    pub fn hash_to_bytes<const N: usize>(&self) -> [u8; N] {
        blake2b_n::<N>(&self.data)
    }

    /// Keyed 32-byte hash: H_32[key](transcript).
    pub fn derive_secret(&self, key: &[u8; 32]) -> [u8; 32] {
        sp_derive_secret(key, &self.data)
    }

    /// Keyed scalar: H_n[key](transcript).
    pub fn derive_scalar(&self, key: &[u8; 32]) -> Scalar {
        let mut out = [0u8; 64];
        let hash = blake2b_simd::Params::new().hash_length(64).key(key).hash(&self.data);
        out.copy_from_slice(hash.as_bytes());
        Scalar::from_bytes_mod_order_wide(&out)
    }
}

// ─── Hash family ────────────────────────────────────────────────────────────

fn blake2b_n<const N: usize>(data: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let hash = blake2b_simd::Params::new().hash_length(N).hash(data);
    out.copy_from_slice(hash.as_bytes());
    out
}

pub fn sp_hash_to_1(data: &[u8]) -> u8 {
    blake2b_n::<1>(data)[0]
}

pub fn sp_hash_to_8(data: &[u8]) -> [u8; 8] {
    blake2b_n::<8>(data)
}

pub fn sp_hash_to_32(data: &[u8]) -> [u8; 32] {
    blake2b_n::<32>(data)
}

pub fn sp_hash_to_64(data: &[u8]) -> [u8; 64] {
    blake2b_n::<64>(data)
}

/// Keyed blake2b with a 32-byte output, used for secrets bound to a private key.
pub fn sp_derive_secret(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let hash = blake2b_simd::Params::new().hash_length(32).key(key).hash(data);
    out.copy_from_slice(hash.as_bytes());
    out
}

/// H_n: 64-byte hash reduced mod l.
pub fn sp_hash_to_scalar(data: &[u8]) -> Scalar {
    Scalar::from_bytes_mod_order_wide(&sp_hash_to_64(data))
}
