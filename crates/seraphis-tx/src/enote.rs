//! Enotes, enote images, and the squashed-enote keys.
//!
//! A seraphis onetime address has the form `Ko = k_g G + k_x X + k_u U`. The
//! squash prefix `H_n(Ko, C)` folds address and commitment into one key
//! `Q = H_n(Ko, C) Ko + C`, which is what membership proofs reference. An
//! enote image carries the masked forms `K" = t_k G + H_n(Ko, C) Ko` and
//! `C" = t_c G + C`, plus the key image.

use std::cmp::Ordering;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use seraphis_crypto::transcript::{domain, ToTranscript};
use seraphis_crypto::{
    commit, decompress, extend_seraphis_spendkey_u, extend_seraphis_spendkey_x,
    key_domain_is_prime_subgroup, mask_key, scalar_from_canonical, zero_commit, KeyImage,
    SpTranscript,
};
use seraphis_types::constants::jamtis::{ADDRESS_TAG_BYTES, ENCODED_AMOUNT_BYTES, VIEW_TAG_BYTES};

use crate::TxError;

/// Encrypted address tag carried by every enote.
pub type EncryptedAddressTag = [u8; ADDRESS_TAG_BYTES];

// ─── Core enotes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpCoinbaseEnoteCore {
    pub onetime_address: CompressedEdwardsY,
    /// Plaintext amount.
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpEnoteCore {
    pub onetime_address: CompressedEdwardsY,
    pub amount_commitment: CompressedEdwardsY,
}

impl ToTranscript for SpCoinbaseEnoteCore {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.onetime_address.append_to(bytes);
        self.amount.append_to(bytes);
    }
}

impl ToTranscript for SpEnoteCore {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.onetime_address.append_to(bytes);
        self.amount_commitment.append_to(bytes);
    }
}

impl SpEnoteCore {
    /// C = x G + a H
    pub fn new(onetime_address: CompressedEdwardsY, amount: u64, blinding_factor: &Scalar) -> Self {
        Self {
            onetime_address,
            amount_commitment: commit(amount, blinding_factor).compress(),
        }
    }
}

/// Either kind of core enote, as referenced by membership proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpEnoteCoreVariant {
    Coinbase(SpCoinbaseEnoteCore),
    Plain(SpEnoteCore),
}

impl SpEnoteCoreVariant {
    pub fn onetime_address(&self) -> &CompressedEdwardsY {
        match self {
            Self::Coinbase(core) => &core.onetime_address,
            Self::Plain(core) => &core.onetime_address,
        }
    }

    /// Coinbase amounts are committed with a unit blinding factor.
    pub fn amount_commitment(&self) -> CompressedEdwardsY {
        match self {
            Self::Coinbase(core) => zero_commit(core.amount).compress(),
            Self::Plain(core) => core.amount_commitment,
        }
    }

    /// Q = H_n(Ko, C) Ko + C
    pub fn squashed_enote(&self) -> Result<EdwardsPoint, TxError> {
        make_squashed_enote_q(self.onetime_address(), &self.amount_commitment())
    }
}

// ─── Full enotes ────────────────────────────────────────────────────────────

/// Enote created by a normal transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpEnote {
    pub core: SpEnoteCore,
    pub encoded_amount: [u8; ENCODED_AMOUNT_BYTES],
    pub addr_tag_enc: EncryptedAddressTag,
    pub view_tag: u8,
}

impl SpEnote {
    pub const SIZE_BYTES: usize = 32 + 32 + ENCODED_AMOUNT_BYTES + ADDRESS_TAG_BYTES + VIEW_TAG_BYTES;

    pub fn onetime_address(&self) -> &CompressedEdwardsY {
        &self.core.onetime_address
    }
}

/// Enote created by a coinbase transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpCoinbaseEnote {
    pub core: SpCoinbaseEnoteCore,
    pub addr_tag_enc: EncryptedAddressTag,
    pub view_tag: u8,
}

impl SpCoinbaseEnote {
    pub const SIZE_BYTES: usize = 32 + 8 + ADDRESS_TAG_BYTES + VIEW_TAG_BYTES;

    pub fn onetime_address(&self) -> &CompressedEdwardsY {
        &self.core.onetime_address
    }
}

impl ToTranscript for SpEnote {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.core.append_to(bytes);
        self.encoded_amount.append_to(bytes);
        self.addr_tag_enc.append_to(bytes);
        self.view_tag.append_to(bytes);
    }
}

impl ToTranscript for SpCoinbaseEnote {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.core.append_to(bytes);
        self.addr_tag_enc.append_to(bytes);
        self.view_tag.append_to(bytes);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpEnoteVariant {
    Coinbase(SpCoinbaseEnote),
    Full(SpEnote),
}

impl SpEnoteVariant {
    pub fn core(&self) -> SpEnoteCoreVariant {
        match self {
            Self::Coinbase(enote) => SpEnoteCoreVariant::Coinbase(enote.core),
            Self::Full(enote) => SpEnoteCoreVariant::Plain(enote.core),
        }
    }

    pub fn onetime_address(&self) -> &CompressedEdwardsY {
        match self {
            Self::Coinbase(enote) => enote.onetime_address(),
            Self::Full(enote) => enote.onetime_address(),
        }
    }

    pub fn amount_commitment(&self) -> CompressedEdwardsY {
        self.core().amount_commitment()
    }

    pub fn addr_tag_enc(&self) -> &EncryptedAddressTag {
        match self {
            Self::Coinbase(enote) => &enote.addr_tag_enc,
            Self::Full(enote) => &enote.addr_tag_enc,
        }
    }

    pub fn view_tag(&self) -> u8 {
        match self {
            Self::Coinbase(enote) => enote.view_tag,
            Self::Full(enote) => enote.view_tag,
        }
    }
}

// ─── Images ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpEnoteImage {
    /// K" = t_k G + H_n(Ko, C) Ko
    pub masked_address: CompressedEdwardsY,
    /// C" = t_c G + C
    pub masked_commitment: CompressedEdwardsY,
    pub key_image: KeyImage,
}

impl SpEnoteImage {
    pub const SIZE_BYTES: usize = 32 * 3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyEnoteImage {
    pub masked_commitment: CompressedEdwardsY,
    pub key_image: KeyImage,
}

impl LegacyEnoteImage {
    pub const SIZE_BYTES: usize = 32 * 2;
}

/// A legacy enote as it appears in a ring: (Ko, C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyRingMember {
    pub onetime_address: CompressedEdwardsY,
    pub amount_commitment: CompressedEdwardsY,
}

impl ToTranscript for LegacyRingMember {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.onetime_address.append_to(bytes);
        self.amount_commitment.append_to(bytes);
    }
}

impl ToTranscript for SpEnoteImage {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.masked_address.append_to(bytes);
        self.masked_commitment.append_to(bytes);
        self.key_image.append_to(bytes);
    }
}

impl ToTranscript for LegacyEnoteImage {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.masked_commitment.append_to(bytes);
        self.key_image.append_to(bytes);
    }
}

// ─── Squashing and masking ──────────────────────────────────────────────────

/// H_n(Ko, C)
pub fn make_squash_prefix(onetime_address: &CompressedEdwardsY, amount_commitment: &CompressedEdwardsY) -> Scalar {
    let mut transcript = SpTranscript::new(domain::SQUASHED_ENOTE_PREFIX, 64);
    transcript
        .append("Ko", onetime_address)
        .append("C", amount_commitment);
    transcript.hash_to_scalar()
}

/// H_n(Ko, C) Ko
pub fn make_squashed_address_key(
    onetime_address: &CompressedEdwardsY,
    amount_commitment: &CompressedEdwardsY,
) -> Result<EdwardsPoint, TxError> {
    let prefix = make_squash_prefix(onetime_address, amount_commitment);
    Ok(prefix * point(onetime_address)?)
}

/// Q = H_n(Ko, C) Ko + C
pub fn make_squashed_enote_q(
    onetime_address: &CompressedEdwardsY,
    amount_commitment: &CompressedEdwardsY,
) -> Result<EdwardsPoint, TxError> {
    Ok(make_squashed_address_key(onetime_address, amount_commitment)? + point(amount_commitment)?)
}

/// (K", C") for an enote and its two masks.
pub fn make_enote_image_masked_keys(
    onetime_address: &CompressedEdwardsY,
    amount_commitment: &CompressedEdwardsY,
    address_mask: &Scalar,
    commitment_mask: &Scalar,
) -> Result<(CompressedEdwardsY, CompressedEdwardsY), TxError> {
    let squashed_address = make_squashed_address_key(onetime_address, amount_commitment)?;
    let masked_address = mask_key(address_mask, &squashed_address);
    let masked_commitment = mask_key(commitment_mask, &point(amount_commitment)?);
    Ok((masked_address.compress(), masked_commitment.compress()))
}

/// Ko = k_g G + k_x X + k_u U + (k_vb X + K_core)
pub fn make_onetime_address_from_extensions(
    extension_g: &Scalar,
    extension_x: &Scalar,
    extension_u: &Scalar,
    core_spend_pubkey: &EdwardsPoint,
    view_balance_privkey: &Scalar,
) -> CompressedEdwardsY {
    let spendkey = extend_seraphis_spendkey_x(view_balance_privkey, core_spend_pubkey);
    let extended = extend_seraphis_spendkey_u(extension_u, &spendkey);
    let extended = extend_seraphis_spendkey_x(extension_x, &extended);
    mask_key(extension_g, &extended).compress()
}

// ─── Checks ─────────────────────────────────────────────────────────────────

pub(crate) fn point(key: &CompressedEdwardsY) -> Result<EdwardsPoint, TxError> {
    decompress(key).map_err(|e| TxError::SemanticsViolation(e.to_string()))
}

/// Masks must be canonical, nonzero, and not one.
pub fn check_mask(mask: &Scalar) -> Result<(), TxError> {
    if scalar_from_canonical(mask.as_bytes()).is_none() {
        return Err(TxError::InvalidMask("mask is not canonical".into()));
    }
    if *mask == Scalar::ZERO || *mask == Scalar::ONE {
        return Err(TxError::InvalidMask("mask must not be zero or one".into()));
    }
    Ok(())
}

pub fn check_key_image(key_image: &KeyImage) -> Result<(), TxError> {
    if !key_domain_is_prime_subgroup(key_image) {
        return Err(TxError::InvalidKeyImage(hex::encode(key_image.as_bytes())));
    }
    Ok(())
}

// ─── Ordering ───────────────────────────────────────────────────────────────

pub fn compare_keys(a: &CompressedEdwardsY, b: &CompressedEdwardsY) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// True if the keys are strictly ascending by bytes.
pub fn keys_sorted_and_unique<'a, I>(keys: I) -> bool
where
    I: IntoIterator<Item = &'a CompressedEdwardsY>,
{
    let keys: Vec<&CompressedEdwardsY> = keys.into_iter().collect();
    keys.windows(2).all(|w| compare_keys(w[0], w[1]) == Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seraphis_crypto::{generators, random_mask, random_point, random_scalar};

    #[test]
    fn test_squashed_enote_relation() {
        let ko = random_point().compress();
        let c = random_point().compress();
        let prefix = make_squash_prefix(&ko, &c);
        let q = make_squashed_enote_q(&ko, &c).unwrap();
        assert_eq!(q, prefix * ko.decompress().unwrap() + c.decompress().unwrap());
        assert_eq!(prefix, make_squash_prefix(&ko, &c), "squash prefix must be stable");
    }

    #[test]
    fn test_masked_keys_offset_squashed_enote() {
        // K" + C" = Q + (t_k + t_c) G
        let ko = random_point().compress();
        let c = random_point().compress();
        let t_k = random_mask();
        let t_c = random_mask();
        let (k_masked, c_masked) = make_enote_image_masked_keys(&ko, &c, &t_k, &t_c).unwrap();

        let lhs = k_masked.decompress().unwrap() + c_masked.decompress().unwrap();
        let rhs = make_squashed_enote_q(&ko, &c).unwrap() + EdwardsPoint::mul_base(&(t_k + t_c));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_onetime_address_from_extensions() {
        let (k_g, k_x, k_u, k_vb, k_m) =
            (random_scalar(), random_scalar(), random_scalar(), random_scalar(), random_scalar());
        let core = k_m * generators::u();
        let ko = make_onetime_address_from_extensions(&k_g, &k_x, &k_u, &core, &k_vb);
        let expected = EdwardsPoint::mul_base(&k_g) + (k_x + k_vb) * generators::x() + (k_u + k_m) * generators::u();
        assert_eq!(ko, expected.compress());
    }

    #[test]
    fn test_mask_checks() {
        assert!(check_mask(&random_mask()).is_ok());
        assert!(matches!(check_mask(&Scalar::ZERO), Err(TxError::InvalidMask(_))));
        assert!(matches!(check_mask(&Scalar::ONE), Err(TxError::InvalidMask(_))));
    }

    #[test]
    fn test_key_image_checks() {
        assert!(check_key_image(&random_point().compress()).is_ok());
        let torsion = curve25519_dalek::constants::EIGHT_TORSION[1];
        let bad = (random_point() + torsion).compress();
        assert!(matches!(check_key_image(&bad), Err(TxError::InvalidKeyImage(_))));
    }

    #[test]
    fn test_coinbase_commitment_and_ordering() {
        let core = SpCoinbaseEnoteCore { onetime_address: random_point().compress(), amount: 77 };
        let variant = SpEnoteCoreVariant::Coinbase(core);
        assert_eq!(variant.amount_commitment(), commit(77, &Scalar::ONE).compress());

        let mut keys: Vec<CompressedEdwardsY> = (0..5).map(|_| random_point().compress()).collect();
        keys.sort_by(compare_keys);
        assert!(keys_sorted_and_unique(&keys));
        keys.push(keys[0]);
        assert!(!keys_sorted_and_unique(&keys));
    }
}
