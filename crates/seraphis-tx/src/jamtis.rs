//! Jamtis payment proposals and the enote derivations behind them.
//!
//! A payment proposal names a destination, an amount and an enote ephemeral
//! private key `xr`. Turning it into an output proposal derives:
//!
//! ```text
//! xK_e = xr xK_3                      enote ephemeral pubkey
//! xK_d = xr xK_2                      derived key
//! q    = H_32(xK_d, xK_e, ctx)        plain sender-receiver secret
//!        H_32[k_vb](xK_e, ctx)        self-send secret (one domain per type)
//! y    = H_n(q, baked_key)            amount blinding factor
//! Ko   = k_g G + k_x X + k_u U + K_1  with k_* = H_n(K_1, q, C)
//! ```
//!
//! Wallet-side address derivation is not modelled: `JamtisMockKeys` holds
//! just enough key material to build self-send outputs and spend mock enotes.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::Rng;
use seraphis_crypto::transcript::domain;
use seraphis_crypto::x25519::{x25519_pubkey, x25519_scmul, x25519_secret_key_gen, X25519Pubkey};
use seraphis_crypto::{
    commit, generators, make_seraphis_spendkey, random_point, random_scalar, KeyImage, SpTranscript,
};
use seraphis_types::constants::jamtis::{ADDRESS_TAG_BYTES, ENCODED_AMOUNT_BYTES};

use crate::builders::outputs::{SpCoinbaseOutputProposal, SpOutputProposal};
use crate::enote::{compare_keys, SpCoinbaseEnote, SpCoinbaseEnoteCore};
use crate::tx_extra::TxExtra;
use crate::TxError;

pub type AddressTag = [u8; ADDRESS_TAG_BYTES];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JamtisDestination {
    /// K_1: spend key of the address.
    pub addr_k1: EdwardsPoint,
    /// xK_2: DH base for the derived key.
    pub addr_k2: X25519Pubkey,
    /// xK_3: DH base for the enote ephemeral pubkey.
    pub addr_k3: X25519Pubkey,
    pub addr_tag: AddressTag,
}

impl JamtisDestination {
    /// Destination with random keys (for dummies and tests).
    pub fn random() -> Self {
        let mut addr_tag = [0u8; ADDRESS_TAG_BYTES];
        rand::thread_rng().fill(&mut addr_tag[..]);
        Self {
            addr_k1: random_point(),
            addr_k2: x25519_pubkey(&x25519_secret_key_gen()),
            addr_k3: x25519_pubkey(&x25519_secret_key_gen()),
            addr_tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JamtisSelfSendType {
    Dummy,
    Change,
    SelfSpend,
}

impl JamtisSelfSendType {
    fn secret_domain(self) -> &'static str {
        match self {
            Self::Dummy => domain::SENDER_RECEIVER_SECRET_SELF_SEND_DUMMY,
            Self::Change => domain::SENDER_RECEIVER_SECRET_SELF_SEND_CHANGE,
            Self::SelfSpend => domain::SENDER_RECEIVER_SECRET_SELF_SEND_SELF_SPEND,
        }
    }
}

/// Payment to someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JamtisPaymentProposal {
    pub destination: JamtisDestination,
    pub amount: u64,
    pub enote_ephemeral_privkey: Scalar,
    pub partial_memo: TxExtra,
}

/// Payment back to the sending wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JamtisPaymentProposalSelfSend {
    pub destination: JamtisDestination,
    pub amount: u64,
    pub send_type: JamtisSelfSendType,
    pub enote_ephemeral_privkey: Scalar,
    pub partial_memo: TxExtra,
}

fn check_ephemeral_privkey(xr: &Scalar) -> Result<(), TxError> {
    if *xr == Scalar::ZERO {
        return Err(TxError::ProposalInconsistent("enote ephemeral privkey is zero".into()));
    }
    Ok(())
}

// ─── Derivations ────────────────────────────────────────────────────────────

/// xK_e = xr xK_3
pub fn make_enote_ephemeral_pubkey(xr: &Scalar, addr_k3: &X25519Pubkey) -> X25519Pubkey {
    x25519_scmul(xr, addr_k3)
}

/// Input context of a normal tx: H_32(sorted legacy KIs, sorted seraphis KIs).
pub fn make_input_context_standard(
    legacy_key_images: &[KeyImage],
    sp_key_images: &[KeyImage],
) -> Result<[u8; 32], TxError> {
    let sorted = |keys: &[KeyImage]| keys.windows(2).all(|w| compare_keys(&w[0], &w[1]).is_le());
    if !sorted(legacy_key_images) || !sorted(sp_key_images) {
        return Err(TxError::ProposalInconsistent("input context key images are not sorted".into()));
    }

    let mut transcript = SpTranscript::new(domain::INPUT_CONTEXT, 32 * (legacy_key_images.len() + sp_key_images.len()));
    transcript
        .append("legacy_input_KI", legacy_key_images)
        .append("sp_input_KI", sp_key_images);
    Ok(transcript.hash_to_32())
}

/// Input context of a coinbase tx: H_32(block height).
pub fn make_input_context_coinbase(block_height: u64) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::INPUT_CONTEXT_COINBASE, 8);
    transcript.append("height", &block_height);
    transcript.hash_to_32()
}

/// q = H_32(xK_d, xK_e, input_context)
pub fn make_sender_receiver_secret_plain(
    xk_derived: &X25519Pubkey,
    xk_ephemeral: &X25519Pubkey,
    input_context: &[u8; 32],
) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::SENDER_RECEIVER_SECRET_PLAIN, 96);
    transcript
        .append("xK_d", xk_derived.as_bytes())
        .append("xK_e", xk_ephemeral.as_bytes())
        .append("input_context", input_context);
    transcript.hash_to_32()
}

/// q = H_32[k_vb](xK_e, input_context)
pub fn make_sender_receiver_secret_selfsend(
    k_view_balance: &Scalar,
    xk_ephemeral: &X25519Pubkey,
    input_context: &[u8; 32],
    send_type: JamtisSelfSendType,
) -> [u8; 32] {
    let mut transcript = SpTranscript::new(send_type.secret_domain(), 64);
    transcript
        .append("xK_e", xk_ephemeral.as_bytes())
        .append("input_context", input_context);
    transcript.derive_secret(k_view_balance.as_bytes())
}

/// Sender side of the plain baked key: H_32(xr xG)
pub fn make_amount_baked_key_plain(xr: &Scalar) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::AMOUNT_BAKED_KEY_PLAIN, 32);
    transcript.append("xR", x25519_pubkey(xr).as_bytes());
    transcript.hash_to_32()
}

/// H_32[k_vb](q)
pub fn make_amount_baked_key_selfsend(k_view_balance: &Scalar, q: &[u8; 32]) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::AMOUNT_BAKED_KEY_SELF_SEND, 32);
    transcript.append("q", q);
    transcript.derive_secret(k_view_balance.as_bytes())
}

/// y = H_n(q, baked_key)
pub fn make_amount_blinding_factor(q: &[u8; 32], baked_key: &[u8; 32]) -> Scalar {
    let mut transcript = SpTranscript::new(domain::AMOUNT_BLINDING_FACTOR, 64);
    transcript.append("q", q).append("baked_key", baked_key);
    transcript.hash_to_scalar()
}

fn amount_mask(q: &[u8; 32], baked_key: &[u8; 32]) -> [u8; ENCODED_AMOUNT_BYTES] {
    let mut transcript = SpTranscript::new(domain::ENCODED_AMOUNT_MASK, 64);
    transcript.append("q", q).append("baked_key", baked_key);
    transcript.hash_to_8()
}

/// enc_amount = a XOR H_8(q, baked_key)
pub fn encode_amount(amount: u64, q: &[u8; 32], baked_key: &[u8; 32]) -> [u8; ENCODED_AMOUNT_BYTES] {
    let mask = amount_mask(q, baked_key);
    let mut encoded = amount.to_le_bytes();
    encoded.iter_mut().zip(mask).for_each(|(byte, m)| *byte ^= m);
    encoded
}

pub fn decode_amount(encoded: &[u8; ENCODED_AMOUNT_BYTES], q: &[u8; 32], baked_key: &[u8; 32]) -> u64 {
    let mask = amount_mask(q, baked_key);
    let mut decoded = *encoded;
    decoded.iter_mut().zip(mask).for_each(|(byte, m)| *byte ^= m);
    u64::from_le_bytes(decoded)
}

fn onetime_extension(domain_separator: &str, addr_k1: &EdwardsPoint, q: &[u8; 32], commitment: &CompressedEdwardsY) -> Scalar {
    let mut transcript = SpTranscript::new(domain_separator, 96);
    transcript
        .append("K_1", addr_k1)
        .append("q", q)
        .append("C", commitment);
    transcript.hash_to_scalar()
}

/// The three onetime-address extensions (k_g, k_x, k_u) for an enote.
pub fn make_onetime_extensions(
    addr_k1: &EdwardsPoint,
    q: &[u8; 32],
    amount_commitment: &CompressedEdwardsY,
) -> (Scalar, Scalar, Scalar) {
    (
        onetime_extension(domain::ONETIME_EXTENSION_G, addr_k1, q, amount_commitment),
        onetime_extension(domain::ONETIME_EXTENSION_X, addr_k1, q, amount_commitment),
        onetime_extension(domain::ONETIME_EXTENSION_U, addr_k1, q, amount_commitment),
    )
}

/// Ko = k_g G + k_x X + k_u U + K_1
pub fn make_onetime_address(
    addr_k1: &EdwardsPoint,
    q: &[u8; 32],
    amount_commitment: &CompressedEdwardsY,
) -> CompressedEdwardsY {
    let (k_g, k_x, k_u) = make_onetime_extensions(addr_k1, q, amount_commitment);
    (EdwardsPoint::mul_base(&k_g) + k_x * generators::x() + k_u * generators::u() + addr_k1).compress()
}

/// addr_tag_enc = addr_tag XOR H_18(q, Ko)
pub fn encrypt_address_tag(q: &[u8; 32], onetime_address: &CompressedEdwardsY, addr_tag: &AddressTag) -> AddressTag {
    let mut transcript = SpTranscript::new(domain::ADDRESS_TAG_ENCRYPTION, 64);
    transcript.append("q", q).append("Ko", onetime_address);
    let mask: AddressTag = transcript.hash_to_bytes();
    let mut encrypted = *addr_tag;
    encrypted.iter_mut().zip(mask).for_each(|(byte, m)| *byte ^= m);
    encrypted
}

/// view_tag = H_1(xK_d, Ko)
pub fn make_view_tag(xk_derived: &X25519Pubkey, onetime_address: &CompressedEdwardsY) -> u8 {
    let mut transcript = SpTranscript::new(domain::VIEW_TAG, 64);
    transcript
        .append("xK_d", xk_derived.as_bytes())
        .append("Ko", onetime_address);
    transcript.hash_to_1()
}

// ─── Output proposals ───────────────────────────────────────────────────────

struct AddressParts {
    onetime_address: CompressedEdwardsY,
    addr_tag_enc: AddressTag,
    view_tag: u8,
}

fn make_address_parts(
    q: &[u8; 32],
    xk_derived: &X25519Pubkey,
    destination: &JamtisDestination,
    amount_commitment: &CompressedEdwardsY,
) -> AddressParts {
    let onetime_address = make_onetime_address(&destination.addr_k1, q, amount_commitment);
    AddressParts {
        addr_tag_enc: encrypt_address_tag(q, &onetime_address, &destination.addr_tag),
        view_tag: make_view_tag(xk_derived, &onetime_address),
        onetime_address,
    }
}

fn finish_output_proposal(
    q: [u8; 32],
    baked_key: [u8; 32],
    xk_derived: &X25519Pubkey,
    enote_ephemeral_pubkey: X25519Pubkey,
    destination: &JamtisDestination,
    amount: u64,
    partial_memo: &TxExtra,
) -> SpOutputProposal {
    // 1. amount parts
    let amount_blinding_factor = make_amount_blinding_factor(&q, &baked_key);
    let encoded_amount = encode_amount(amount, &q, &baked_key);

    // 2. address parts, bound to the amount commitment
    let commitment = commit(amount, &amount_blinding_factor).compress();
    let parts = make_address_parts(&q, xk_derived, destination, &commitment);

    SpOutputProposal {
        onetime_address: parts.onetime_address,
        amount_blinding_factor,
        amount,
        enote_ephemeral_pubkey,
        encoded_amount,
        addr_tag_enc: parts.addr_tag_enc,
        view_tag: parts.view_tag,
        partial_memo: partial_memo.clone(),
    }
}

impl JamtisPaymentProposal {
    pub fn enote_ephemeral_pubkey(&self) -> X25519Pubkey {
        make_enote_ephemeral_pubkey(&self.enote_ephemeral_privkey, &self.destination.addr_k3)
    }

    pub fn output_proposal(&self, input_context: &[u8; 32]) -> Result<SpOutputProposal, TxError> {
        check_ephemeral_privkey(&self.enote_ephemeral_privkey)?;
        let xr = &self.enote_ephemeral_privkey;

        let xk_e = self.enote_ephemeral_pubkey();
        let xk_d = x25519_scmul(xr, &self.destination.addr_k2);
        let q = make_sender_receiver_secret_plain(&xk_d, &xk_e, input_context);
        let baked_key = make_amount_baked_key_plain(xr);

        Ok(finish_output_proposal(q, baked_key, &xk_d, xk_e, &self.destination, self.amount, &self.partial_memo))
    }

    /// Coinbase amounts are public, so the commitment uses a unit blinding
    /// factor and no amount is encoded.
    pub fn coinbase_output_proposal(&self, block_height: u64) -> Result<SpCoinbaseOutputProposal, TxError> {
        check_ephemeral_privkey(&self.enote_ephemeral_privkey)?;
        let xr = &self.enote_ephemeral_privkey;

        let input_context = make_input_context_coinbase(block_height);
        let xk_e = self.enote_ephemeral_pubkey();
        let xk_d = x25519_scmul(xr, &self.destination.addr_k2);
        let q = make_sender_receiver_secret_plain(&xk_d, &xk_e, &input_context);

        let commitment = commit(self.amount, &Scalar::ONE).compress();
        let parts = make_address_parts(&q, &xk_d, &self.destination, &commitment);

        Ok(SpCoinbaseOutputProposal {
            enote: SpCoinbaseEnote {
                core: SpCoinbaseEnoteCore {
                    onetime_address: parts.onetime_address,
                    amount: self.amount,
                },
                addr_tag_enc: parts.addr_tag_enc,
                view_tag: parts.view_tag,
            },
            enote_ephemeral_pubkey: xk_e,
            partial_memo: self.partial_memo.clone(),
        })
    }
}

impl JamtisPaymentProposalSelfSend {
    pub fn enote_ephemeral_pubkey(&self) -> X25519Pubkey {
        make_enote_ephemeral_pubkey(&self.enote_ephemeral_privkey, &self.destination.addr_k3)
    }

    pub fn output_proposal(
        &self,
        k_view_balance: &Scalar,
        input_context: &[u8; 32],
    ) -> Result<SpOutputProposal, TxError> {
        check_ephemeral_privkey(&self.enote_ephemeral_privkey)?;
        if *k_view_balance == Scalar::ZERO {
            return Err(TxError::ProposalInconsistent("view-balance key is zero".into()));
        }
        let xr = &self.enote_ephemeral_privkey;

        let xk_e = self.enote_ephemeral_pubkey();
        let xk_d = x25519_scmul(xr, &self.destination.addr_k2);
        // self-sends key the secret on xK_e, not xK_d
        let q = make_sender_receiver_secret_selfsend(k_view_balance, &xk_e, input_context, self.send_type);
        let baked_key = make_amount_baked_key_selfsend(k_view_balance, &q);

        Ok(finish_output_proposal(q, baked_key, &xk_d, xk_e, &self.destination, self.amount, &self.partial_memo))
    }
}

/// Random normal payment proposal with `num_memo_elements` random memo elements.
pub fn gen_payment_proposal(amount: u64, num_memo_elements: usize) -> Result<JamtisPaymentProposal, TxError> {
    let elements = (0..num_memo_elements).map(|_| crate::tx_extra::gen_extra_field_element()).collect();
    Ok(JamtisPaymentProposal {
        destination: JamtisDestination::random(),
        amount,
        enote_ephemeral_privkey: x25519_secret_key_gen(),
        partial_memo: crate::tx_extra::make_tx_extra(elements)?,
    })
}

// ─── Mock wallet keys ───────────────────────────────────────────────────────

/// Key material of a mock wallet.
#[derive(Debug, Clone)]
pub struct JamtisMockKeys {
    /// k_m: master spend key.
    pub k_m: Scalar,
    /// k_vb: view-balance key.
    pub k_vb: Scalar,
    /// xk_ua: unlock-amounts key.
    pub xk_ua: Scalar,
    /// xk_fr: find-received key, derived from k_vb.
    pub xk_fr: Scalar,
    /// K_s = k_vb X + k_m U
    pub spend_pubkey: EdwardsPoint,
    /// xK_ua = xk_ua xG
    pub xk_ua_pub: X25519Pubkey,
    /// xK_fr = xk_fr xK_ua
    pub xk_fr_pub: X25519Pubkey,
}

/// xk_fr = H_n[k_vb]()
pub fn make_find_received_key(k_view_balance: &Scalar) -> Scalar {
    SpTranscript::new(domain::FIND_RECEIVED_KEY, 0).derive_scalar(k_view_balance.as_bytes())
}

impl JamtisMockKeys {
    pub fn generate() -> Self {
        let k_m = random_scalar();
        let k_vb = random_scalar();
        let xk_ua = x25519_secret_key_gen();
        let xk_fr = make_find_received_key(&k_vb);
        let xk_ua_pub = x25519_pubkey(&xk_ua);
        Self {
            spend_pubkey: make_seraphis_spendkey(&k_vb, &k_m),
            xk_fr_pub: x25519_scmul(&xk_fr, &xk_ua_pub),
            k_m,
            k_vb,
            xk_ua,
            xk_fr,
            xk_ua_pub,
        }
    }

    /// k_m U, the spend key without its view-balance component.
    pub fn core_spend_pubkey(&self) -> EdwardsPoint {
        self.k_m * generators::u()
    }

    /// A fresh address owned by this wallet.
    ///
    /// K_1 is the wallet spend key itself; the address privkey `xk_a` only
    /// scales the DH bases so the wallet can still find received enotes
    /// with `xk_fr`.
    pub fn random_address(&self) -> JamtisDestination {
        let xk_a = x25519_secret_key_gen();
        let mut addr_tag = [0u8; ADDRESS_TAG_BYTES];
        rand::thread_rng().fill(&mut addr_tag[..]);
        JamtisDestination {
            addr_k1: self.spend_pubkey,
            addr_k2: x25519_scmul(&xk_a, &self.xk_fr_pub),
            addr_k3: x25519_scmul(&xk_a, &self.xk_ua_pub),
            addr_tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_reproduces_plain_secret() {
        let keys = JamtisMockKeys::generate();
        let destination = keys.random_address();
        let proposal = JamtisPaymentProposal {
            destination,
            amount: 42,
            enote_ephemeral_privkey: x25519_secret_key_gen(),
            partial_memo: TxExtra::new(),
        };
        let input_context = make_input_context_coinbase(100);
        let output = proposal.output_proposal(&input_context).unwrap();

        // receiver: xK_d = xk_fr xK_e
        let xk_d = x25519_scmul(&keys.xk_fr, &output.enote_ephemeral_pubkey);
        assert_eq!(make_view_tag(&xk_d, &output.onetime_address), output.view_tag);

        let q = make_sender_receiver_secret_plain(&xk_d, &output.enote_ephemeral_pubkey, &input_context);
        let baked_key = make_amount_baked_key_plain(&proposal.enote_ephemeral_privkey);
        assert_eq!(decode_amount(&output.encoded_amount, &q, &baked_key), 42);
    }

    #[test]
    fn test_selfsend_secret_depends_on_type() {
        let keys = JamtisMockKeys::generate();
        let xk_e = x25519_pubkey(&x25519_secret_key_gen());
        let ctx = [7u8; 32];
        let change = make_sender_receiver_secret_selfsend(&keys.k_vb, &xk_e, &ctx, JamtisSelfSendType::Change);
        let dummy = make_sender_receiver_secret_selfsend(&keys.k_vb, &xk_e, &ctx, JamtisSelfSendType::Dummy);
        assert_ne!(change, dummy);

        let other_keys = JamtisMockKeys::generate();
        let other = make_sender_receiver_secret_selfsend(&other_keys.k_vb, &xk_e, &ctx, JamtisSelfSendType::Change);
        assert_ne!(change, other, "self-send secret must be keyed by k_vb");
    }

    #[test]
    fn test_onetime_address_commits_to_amount() {
        let destination = JamtisDestination::random();
        let q = [3u8; 32];
        let c1 = commit(1, &Scalar::ONE).compress();
        let c2 = commit(2, &Scalar::ONE).compress();
        assert_ne!(
            make_onetime_address(&destination.addr_k1, &q, &c1),
            make_onetime_address(&destination.addr_k1, &q, &c2)
        );
    }

    #[test]
    fn test_input_context_requires_sorted_images() {
        let mut images: Vec<KeyImage> = (0..3).map(|_| random_point().compress()).collect();
        images.sort_by(compare_keys);
        assert!(make_input_context_standard(&[], &images).is_ok());
        images.reverse();
        assert!(make_input_context_standard(&[], &images).is_err());
    }

    #[test]
    fn test_coinbase_output_uses_public_amount() {
        let proposal = gen_payment_proposal(500, 2).unwrap();
        let output = proposal.coinbase_output_proposal(10).unwrap();
        assert_eq!(output.enote.core.amount, 500);
        assert_eq!(output.enote_ephemeral_pubkey, proposal.enote_ephemeral_pubkey());

        let zero_key = JamtisPaymentProposal { enote_ephemeral_privkey: Scalar::ZERO, ..proposal };
        assert!(zero_key.coinbase_output_proposal(10).is_err());
    }
}
