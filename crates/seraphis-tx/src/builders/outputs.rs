//! Output proposals, output-set finalization, and the tx supplement.
//!
//! Every finalized output set carries at least one self-send output. When the
//! caller's payments don't already include one, finalization appends exactly
//! one additional output chosen from the table in
//! [`additional_output_type`]. Two-output sets share one enote ephemeral
//! pubkey; larger sets must use a distinct key per output.

use std::cmp::Ordering;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::montgomery::MontgomeryPoint;
use curve25519_dalek::scalar::Scalar;
use seraphis_crypto::x25519::{x25519_inv_eight, x25519_scmul, x25519_secret_key_gen, X25519Pubkey};
use seraphis_crypto::{commit, key_domain_is_prime_subgroup, scalar_from_canonical};
use seraphis_types::constants::jamtis::ENCODED_AMOUNT_BYTES;

use crate::components::SpTxSupplement;
use crate::enote::{compare_keys, EncryptedAddressTag, SpCoinbaseEnote, SpEnote, SpEnoteCore};
use crate::jamtis::{
    decode_amount, make_amount_baked_key_selfsend, make_amount_blinding_factor, make_find_received_key,
    make_onetime_address, make_sender_receiver_secret_selfsend, JamtisDestination, JamtisPaymentProposal,
    JamtisPaymentProposalSelfSend, JamtisSelfSendType,
};
use crate::logging::BUILDER;
use crate::tx_extra::{accumulate_extra_field_elements, make_tx_extra, try_get_extra_field_elements, TxExtra};
use crate::TxError;

// ─── Proposal types ─────────────────────────────────────────────────────────

/// Everything needed to emit one full enote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpOutputProposal {
    pub onetime_address: CompressedEdwardsY,
    pub amount_blinding_factor: Scalar,
    pub amount: u64,
    pub enote_ephemeral_pubkey: X25519Pubkey,
    pub encoded_amount: [u8; ENCODED_AMOUNT_BYTES],
    pub addr_tag_enc: EncryptedAddressTag,
    pub view_tag: u8,
    pub partial_memo: TxExtra,
}

impl SpOutputProposal {
    pub fn amount_commitment(&self) -> CompressedEdwardsY {
        commit(self.amount, &self.amount_blinding_factor).compress()
    }

    pub fn enote(&self) -> SpEnote {
        SpEnote {
            core: SpEnoteCore::new(self.onetime_address, self.amount, &self.amount_blinding_factor),
            encoded_amount: self.encoded_amount,
            addr_tag_enc: self.addr_tag_enc,
            view_tag: self.view_tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpCoinbaseOutputProposal {
    pub enote: SpCoinbaseEnote,
    pub enote_ephemeral_pubkey: X25519Pubkey,
    pub partial_memo: TxExtra,
}

pub fn sort_output_proposals(proposals: &mut [SpOutputProposal]) {
    proposals.sort_by(|a, b| compare_keys(&a.onetime_address, &b.onetime_address));
}

pub fn sort_coinbase_output_proposals(proposals: &mut [SpCoinbaseOutputProposal]) {
    proposals.sort_by(|a, b| compare_keys(a.enote.onetime_address(), b.enote.onetime_address()));
}

fn pubkeys_are_unique<'a>(keys: impl IntoIterator<Item = &'a X25519Pubkey>) -> bool {
    let mut seen: Vec<&X25519Pubkey> = Vec::new();
    for key in keys {
        if seen.contains(&key) {
            return false;
        }
        seen.push(key);
    }
    true
}

fn onetime_addresses_sorted_and_unique<'a>(keys: impl IntoIterator<Item = &'a CompressedEdwardsY>) -> bool {
    let keys: Vec<_> = keys.into_iter().collect();
    keys.windows(2).all(|w| compare_keys(w[0], w[1]) == Ordering::Less)
}

fn check_partial_memo(memo: &[u8]) -> Result<(), TxError> {
    try_get_extra_field_elements(memo)
        .map(|_| ())
        .map_err(|e| TxError::MalformedMemo(format!("output partial memo: {e}")))
}

// ─── Set semantics ──────────────────────────────────────────────────────────

pub fn check_output_proposal_set_semantics(proposals: &[SpOutputProposal]) -> Result<(), TxError> {
    if proposals.is_empty() {
        return Err(TxError::SemanticsViolation("output proposal set is empty".into()));
    }
    for proposal in proposals {
        check_partial_memo(&proposal.partial_memo)?;
    }

    // 1. ephemeral key sharing
    match proposals.len() {
        2 if proposals[0].enote_ephemeral_pubkey != proposals[1].enote_ephemeral_pubkey => {
            return Err(TxError::SemanticsViolation(
                "2 outputs must share an enote ephemeral pubkey".into(),
            ));
        }
        n if n > 2 && !pubkeys_are_unique(proposals.iter().map(|p| &p.enote_ephemeral_pubkey)) => {
            return Err(TxError::SemanticsViolation(
                "outputs in a >2-output set need unique enote ephemeral pubkeys".into(),
            ));
        }
        _ => {}
    }

    // 2. canonical layout
    if !onetime_addresses_sorted_and_unique(proposals.iter().map(|p| &p.onetime_address)) {
        return Err(TxError::SemanticsViolation("output onetime addresses are not sorted and unique".into()));
    }
    if !proposals.iter().all(|p| key_domain_is_prime_subgroup(&p.onetime_address)) {
        return Err(TxError::SemanticsViolation("an output onetime address is not in the prime subgroup".into()));
    }
    Ok(())
}

pub fn check_coinbase_output_proposal_set_semantics(proposals: &[SpCoinbaseOutputProposal]) -> Result<(), TxError> {
    if proposals.is_empty() {
        return Err(TxError::SemanticsViolation("coinbase output proposal set is empty".into()));
    }
    for proposal in proposals {
        check_partial_memo(&proposal.partial_memo)?;
    }
    if !pubkeys_are_unique(proposals.iter().map(|p| &p.enote_ephemeral_pubkey)) {
        return Err(TxError::SemanticsViolation("coinbase enote ephemeral pubkeys are not unique".into()));
    }
    if !onetime_addresses_sorted_and_unique(proposals.iter().map(|p| p.enote.onetime_address())) {
        return Err(TxError::SemanticsViolation("coinbase onetime addresses are not sorted and unique".into()));
    }
    if !proposals.iter().all(|p| key_domain_is_prime_subgroup(p.enote.onetime_address())) {
        return Err(TxError::SemanticsViolation(
            "a coinbase onetime address is not in the prime subgroup".into(),
        ));
    }
    Ok(())
}

/// Rebuild a self-send proposal from the owner's side and confirm the owner
/// recognizes the resulting enote and recovers its amount.
pub fn check_selfsend_proposal_semantics(
    proposal: &JamtisPaymentProposalSelfSend,
    input_context: &[u8; 32],
    spend_pubkey: &EdwardsPoint,
    k_view_balance: &Scalar,
) -> Result<(), TxError> {
    let output = proposal.output_proposal(k_view_balance, input_context)?;

    let q = make_sender_receiver_secret_selfsend(
        k_view_balance,
        &output.enote_ephemeral_pubkey,
        input_context,
        proposal.send_type,
    );
    let baked_key = make_amount_baked_key_selfsend(k_view_balance, &q);
    let amount = decode_amount(&output.encoded_amount, &q, &baked_key);
    let blinding = make_amount_blinding_factor(&q, &baked_key);
    let commitment = commit(amount, &blinding).compress();

    if amount != proposal.amount || commitment != output.amount_commitment() {
        return Err(TxError::ProposalInconsistent("self-send amount is not recoverable by its owner".into()));
    }
    if make_onetime_address(spend_pubkey, &q, &commitment) != output.onetime_address {
        return Err(TxError::ProposalInconsistent("self-send onetime address is not owned by the wallet".into()));
    }
    Ok(())
}

// ─── Outputs ────────────────────────────────────────────────────────────────

/// Finished outputs plus the per-output secrets the balance proof needs.
#[derive(Debug, Clone)]
pub struct SpOutputSet {
    pub enotes: Vec<SpEnote>,
    pub amounts: Vec<u64>,
    pub blinding_factors: Vec<Scalar>,
    /// Unique keys in output order.
    pub enote_ephemeral_pubkeys: Vec<X25519Pubkey>,
}

fn push_unique(keys: &mut Vec<X25519Pubkey>, key: X25519Pubkey) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}

pub fn make_outputs(proposals: &[SpOutputProposal]) -> Result<SpOutputSet, TxError> {
    check_output_proposal_set_semantics(proposals)?;

    let mut set = SpOutputSet {
        enotes: Vec::with_capacity(proposals.len()),
        amounts: Vec::with_capacity(proposals.len()),
        blinding_factors: Vec::with_capacity(proposals.len()),
        enote_ephemeral_pubkeys: Vec::with_capacity(proposals.len()),
    };
    for proposal in proposals {
        if scalar_from_canonical(proposal.amount_blinding_factor.as_bytes()).is_none() {
            return Err(TxError::SemanticsViolation("output amount blinding factor is not canonical".into()));
        }
        set.enotes.push(proposal.enote());
        set.amounts.push(proposal.amount);
        set.blinding_factors.push(proposal.amount_blinding_factor);
        push_unique(&mut set.enote_ephemeral_pubkeys, proposal.enote_ephemeral_pubkey);
    }
    Ok(set)
}

pub fn make_coinbase_outputs(
    proposals: &[SpCoinbaseOutputProposal],
) -> Result<(Vec<SpCoinbaseEnote>, Vec<X25519Pubkey>), TxError> {
    check_coinbase_output_proposal_set_semantics(proposals)?;

    let mut enotes = Vec::with_capacity(proposals.len());
    let mut ephemeral_pubkeys = Vec::with_capacity(proposals.len());
    for proposal in proposals {
        enotes.push(proposal.enote.clone());
        push_unique(&mut ephemeral_pubkeys, proposal.enote_ephemeral_pubkey);
    }
    Ok((enotes, ephemeral_pubkeys))
}

// ─── Additional output ──────────────────────────────────────────────────────

/// The extra output a payment set needs before it can become a tx.
///
/// `Special*` outputs reuse the first output's ephemeral key so a 1-output
/// set becomes a 2-output set with one shared key. `Normal*` outputs get a
/// fresh key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalOutputType {
    NormalDummy,
    NormalSelfSendDummy,
    NormalChange,
    SpecialDummy,
    SpecialSelfSendDummy,
    SpecialChange,
}

pub fn additional_output_type(
    num_outputs: usize,
    self_send_types: &[JamtisSelfSendType],
    ephemeral_pubkeys_unique: bool,
    change_amount: u64,
) -> Result<Option<AdditionalOutputType>, TxError> {
    use AdditionalOutputType::*;

    if num_outputs == 0 {
        return Err(TxError::ProposalInconsistent(
            "no outputs; send to a self-spend destination instead of relying on change".into(),
        ));
    }
    if self_send_types.len() > num_outputs {
        return Err(TxError::ProposalInconsistent("more self-send outputs than outputs".into()));
    }
    let has_self_send = !self_send_types.is_empty();

    let extra = match (num_outputs, ephemeral_pubkeys_unique) {
        (1, _) if change_amount == 0 => Some(if has_self_send { SpecialDummy } else { SpecialSelfSendDummy }),
        (1, _) if self_send_types == [JamtisSelfSendType::Change] => {
            return Err(TxError::ProposalInconsistent(
                "a lone change output plus nonzero change would make a tx of two change outputs".into(),
            ));
        }
        (1, _) => Some(SpecialChange),

        (2, true) if change_amount == 0 => Some(if has_self_send { NormalDummy } else { NormalSelfSendDummy }),
        (2, true) => Some(NormalChange),

        (2, false) if change_amount != 0 => {
            return Err(TxError::ProposalInconsistent(
                "2 outputs share an ephemeral key, so a change output can't be added".into(),
            ));
        }
        (2, false) if self_send_types.len() == 2 && self_send_types[0] == self_send_types[1] => {
            return Err(TxError::ProposalInconsistent(
                "2 self-sends of the same type must not share an ephemeral key".into(),
            ));
        }
        (2, false) if has_self_send => None,
        (2, false) => {
            return Err(TxError::ProposalInconsistent(
                "2 normal outputs share an ephemeral key and no self-send can be added".into(),
            ));
        }

        (_, false) => {
            return Err(TxError::ProposalInconsistent(
                "outputs in a >2-output set need unique ephemeral keys".into(),
            ));
        }
        (_, true) if change_amount != 0 => Some(NormalChange),
        (_, true) if has_self_send => None,
        (_, true) => Some(NormalSelfSendDummy),
    };
    Ok(extra)
}

fn special_dummy(first_ephemeral_pubkey: &X25519Pubkey) -> JamtisPaymentProposal {
    let mut destination = JamtisDestination::random();
    // xr = 8 and K_3 = (1/8) xK_e reproduces xK_e
    destination.addr_k3 = x25519_scmul(&x25519_inv_eight(), first_ephemeral_pubkey);
    JamtisPaymentProposal {
        destination,
        amount: 0,
        enote_ephemeral_privkey: Scalar::from(8u64),
        partial_memo: TxExtra::new(),
    }
}

fn normal_self_send(
    send_type: JamtisSelfSendType,
    destination: &JamtisDestination,
    amount: u64,
) -> JamtisPaymentProposalSelfSend {
    JamtisPaymentProposalSelfSend {
        destination: destination.clone(),
        amount,
        send_type,
        enote_ephemeral_privkey: x25519_secret_key_gen(),
        partial_memo: TxExtra::new(),
    }
}

fn special_self_send(
    send_type: JamtisSelfSendType,
    first_ephemeral_pubkey: &X25519Pubkey,
    destination: &JamtisDestination,
    k_view_balance: &Scalar,
    amount: u64,
) -> JamtisPaymentProposalSelfSend {
    let xk_fr = make_find_received_key(k_view_balance);
    let inv8 = x25519_inv_eight();

    let mut destination = destination.clone();
    destination.addr_k2 = x25519_scmul(&inv8, &x25519_scmul(&xk_fr, first_ephemeral_pubkey));
    destination.addr_k3 = x25519_scmul(&inv8, first_ephemeral_pubkey);
    JamtisPaymentProposalSelfSend {
        destination,
        amount,
        send_type,
        enote_ephemeral_privkey: Scalar::from(8u64),
        partial_memo: TxExtra::new(),
    }
}

/// Payment proposals after finalization.
#[derive(Debug, Clone)]
pub struct FinalizedPayments {
    pub normal: Vec<JamtisPaymentProposal>,
    pub selfsend: Vec<JamtisPaymentProposalSelfSend>,
}

/// Append the additional output (change or dummy) the payment set needs.
///
/// Change is `total_input_amount - (fee + sum of amounts)`, which must fit in
/// a u64.
pub fn finalize_output_proposal_set(
    total_input_amount: u128,
    fee: u64,
    change_destination: &JamtisDestination,
    dummy_destination: &JamtisDestination,
    k_view_balance: &Scalar,
    mut normal: Vec<JamtisPaymentProposal>,
    mut selfsend: Vec<JamtisPaymentProposalSelfSend>,
) -> Result<FinalizedPayments, TxError> {
    // 1. change amount
    let output_sum: u128 = fee as u128
        + normal.iter().map(|p| p.amount as u128).sum::<u128>()
        + selfsend.iter().map(|p| p.amount as u128).sum::<u128>();
    if total_input_amount < output_sum {
        return Err(TxError::ProposalInconsistent(format!(
            "input amount {total_input_amount} is less than outputs plus fee {output_sum}"
        )));
    }
    let change_amount = u64::try_from(total_input_amount - output_sum)
        .map_err(|_| TxError::ProposalInconsistent("change amount exceeds u64".into()))?;

    // 2. classify the set
    let first_ephemeral_pubkey = normal
        .first()
        .map(JamtisPaymentProposal::enote_ephemeral_pubkey)
        .or_else(|| selfsend.first().map(JamtisPaymentProposalSelfSend::enote_ephemeral_pubkey))
        .unwrap_or(MontgomeryPoint([0u8; 32]));
    let ephemeral_pubkeys: Vec<X25519Pubkey> = normal
        .iter()
        .map(JamtisPaymentProposal::enote_ephemeral_pubkey)
        .chain(selfsend.iter().map(JamtisPaymentProposalSelfSend::enote_ephemeral_pubkey))
        .collect();
    let self_send_types: Vec<JamtisSelfSendType> = selfsend.iter().map(|p| p.send_type).collect();

    let extra = additional_output_type(
        ephemeral_pubkeys.len(),
        &self_send_types,
        pubkeys_are_unique(&ephemeral_pubkeys),
        change_amount,
    )?;

    // 3. add it
    if let Some(extra) = extra {
        BUILDER.debug(format_args!("adding {extra:?} output (change {change_amount})"));
        match extra {
            AdditionalOutputType::NormalDummy => normal.push(JamtisPaymentProposal {
                destination: JamtisDestination::random(),
                amount: 0,
                enote_ephemeral_privkey: x25519_secret_key_gen(),
                partial_memo: TxExtra::new(),
            }),
            AdditionalOutputType::SpecialDummy => normal.push(special_dummy(&first_ephemeral_pubkey)),
            AdditionalOutputType::NormalSelfSendDummy => {
                selfsend.push(normal_self_send(JamtisSelfSendType::Dummy, dummy_destination, 0))
            }
            AdditionalOutputType::NormalChange => {
                selfsend.push(normal_self_send(JamtisSelfSendType::Change, change_destination, change_amount))
            }
            AdditionalOutputType::SpecialSelfSendDummy => selfsend.push(special_self_send(
                JamtisSelfSendType::Dummy,
                &first_ephemeral_pubkey,
                dummy_destination,
                k_view_balance,
                0,
            )),
            AdditionalOutputType::SpecialChange => selfsend.push(special_self_send(
                JamtisSelfSendType::Change,
                &first_ephemeral_pubkey,
                change_destination,
                k_view_balance,
                change_amount,
            )),
        }
    }

    Ok(FinalizedPayments { normal, selfsend })
}

// ─── Memo and supplement ────────────────────────────────────────────────────

/// Merge the tx-wide partial memo with every output's partial memo.
pub fn finalize_tx_extra<'a>(
    partial_memo: &[u8],
    output_memos: impl IntoIterator<Item = &'a TxExtra>,
) -> Result<TxExtra, TxError> {
    let mut elements = Vec::new();
    accumulate_extra_field_elements(partial_memo, &mut elements)?;
    for memo in output_memos {
        accumulate_extra_field_elements(memo, &mut elements)?;
    }
    make_tx_extra(elements)
}

pub fn make_tx_supplement(
    partial_memo: &[u8],
    output_proposals: &[SpOutputProposal],
    enote_ephemeral_pubkeys: Vec<X25519Pubkey>,
) -> Result<SpTxSupplement, TxError> {
    Ok(SpTxSupplement {
        output_enote_ephemeral_pubkeys: enote_ephemeral_pubkeys,
        tx_extra: finalize_tx_extra(partial_memo, output_proposals.iter().map(|p| &p.partial_memo))?,
    })
}

fn check_supplement_keys(supplement: &SpTxSupplement) -> Result<(), TxError> {
    let keys = &supplement.output_enote_ephemeral_pubkeys;
    if !pubkeys_are_unique(keys) {
        return Err(TxError::SemanticsViolation("supplement enote ephemeral pubkeys are not unique".into()));
    }
    if keys.iter().any(|key| key.as_bytes() == &[0u8; 32]) {
        return Err(TxError::SemanticsViolation("supplement has a zero enote ephemeral pubkey".into()));
    }
    try_get_extra_field_elements(&supplement.tx_extra)
        .map(|_| ())
        .map_err(|e| TxError::SemanticsViolation(format!("tx extra: {e}")))
}

/// One ephemeral key per output.
pub fn check_tx_supplement_semantics_v1(supplement: &SpTxSupplement, num_outputs: usize) -> Result<(), TxError> {
    if supplement.output_enote_ephemeral_pubkeys.len() != num_outputs {
        return Err(TxError::SemanticsViolation(format!(
            "supplement has {} enote ephemeral pubkeys for {num_outputs} outputs",
            supplement.output_enote_ephemeral_pubkeys.len()
        )));
    }
    check_supplement_keys(supplement)
}

/// One shared key for sets of at most two outputs, otherwise one per output.
pub fn check_tx_supplement_semantics_v2(supplement: &SpTxSupplement, num_outputs: usize) -> Result<(), TxError> {
    let expected = if num_outputs <= 2 { 1 } else { num_outputs };
    if supplement.output_enote_ephemeral_pubkeys.len() != expected {
        return Err(TxError::SemanticsViolation(format!(
            "supplement has {} enote ephemeral pubkeys, expected {expected} for {num_outputs} outputs",
            supplement.output_enote_ephemeral_pubkeys.len()
        )));
    }
    check_supplement_keys(supplement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jamtis::{gen_payment_proposal, JamtisMockKeys};
    use crate::tx_extra::{gen_extra_field_element, try_get_extra_field_elements};

    fn output_proposals(payments: &FinalizedPayments, keys: &JamtisMockKeys) -> Vec<SpOutputProposal> {
        let ctx = [7u8; 32];
        let mut proposals: Vec<SpOutputProposal> = payments
            .normal
            .iter()
            .map(|p| p.output_proposal(&ctx).unwrap())
            .chain(payments.selfsend.iter().map(|p| p.output_proposal(&keys.k_vb, &ctx).unwrap()))
            .collect();
        sort_output_proposals(&mut proposals);
        proposals
    }

    #[test]
    fn test_additional_output_table() {
        use AdditionalOutputType::*;
        use JamtisSelfSendType::*;

        assert_eq!(additional_output_type(1, &[], true, 0).unwrap(), Some(SpecialSelfSendDummy));
        assert_eq!(additional_output_type(1, &[SelfSpend], true, 0).unwrap(), Some(SpecialDummy));
        assert_eq!(additional_output_type(1, &[], true, 5).unwrap(), Some(SpecialChange));
        assert!(additional_output_type(1, &[Change], true, 5).is_err());

        assert_eq!(additional_output_type(2, &[], true, 0).unwrap(), Some(NormalSelfSendDummy));
        assert_eq!(additional_output_type(2, &[Change], true, 0).unwrap(), Some(NormalDummy));
        assert_eq!(additional_output_type(2, &[], true, 5).unwrap(), Some(NormalChange));
        assert_eq!(additional_output_type(2, &[Change, SelfSpend], false, 0).unwrap(), None);
        assert!(additional_output_type(2, &[Change, Change], false, 0).is_err());
        assert!(additional_output_type(2, &[], false, 0).is_err());
        assert!(additional_output_type(2, &[SelfSpend], false, 3).is_err());

        assert_eq!(additional_output_type(3, &[], true, 0).unwrap(), Some(NormalSelfSendDummy));
        assert_eq!(additional_output_type(3, &[Dummy], true, 0).unwrap(), None);
        assert_eq!(additional_output_type(3, &[Dummy], true, 1).unwrap(), Some(NormalChange));
        assert!(additional_output_type(3, &[], false, 0).is_err());
        assert!(additional_output_type(0, &[], true, 0).is_err());
    }

    #[test]
    fn test_finalize_adds_change() {
        let keys = JamtisMockKeys::generate();
        let normal = vec![gen_payment_proposal(10, 0).unwrap(), gen_payment_proposal(20, 0).unwrap()];
        let payments = finalize_output_proposal_set(
            100,
            5,
            &keys.random_address(),
            &keys.random_address(),
            &keys.k_vb,
            normal,
            Vec::new(),
        )
        .unwrap();

        assert_eq!(payments.normal.len(), 2);
        assert_eq!(payments.selfsend.len(), 1);
        assert_eq!(payments.selfsend[0].send_type, JamtisSelfSendType::Change);
        assert_eq!(payments.selfsend[0].amount, 65);
    }

    #[test]
    fn test_finalize_rejects_bad_amounts() {
        let keys = JamtisMockKeys::generate();
        let dest = keys.random_address();
        let normal = vec![gen_payment_proposal(10, 0).unwrap()];
        let err = finalize_output_proposal_set(10, 1, &dest, &dest, &keys.k_vb, normal, Vec::new());
        assert!(matches!(err, Err(TxError::ProposalInconsistent(_))));

        let normal = vec![gen_payment_proposal(1, 0).unwrap()];
        let too_much = u64::MAX as u128 + 10;
        let err = finalize_output_proposal_set(too_much, 0, &dest, &dest, &keys.k_vb, normal, Vec::new());
        assert!(matches!(err, Err(TxError::ProposalInconsistent(_))), "change must fit in u64");
    }

    #[test]
    fn test_special_outputs_share_ephemeral_key() {
        let keys = JamtisMockKeys::generate();
        for change in [0u128, 9] {
            let normal = vec![gen_payment_proposal(10, 1).unwrap()];
            let payments = finalize_output_proposal_set(
                10 + change,
                0,
                &keys.random_address(),
                &keys.random_address(),
                &keys.k_vb,
                normal,
                Vec::new(),
            )
            .unwrap();
            assert_eq!(payments.selfsend.len(), 1);

            let proposals = output_proposals(&payments, &keys);
            assert_eq!(proposals.len(), 2);
            assert_eq!(proposals[0].enote_ephemeral_pubkey, proposals[1].enote_ephemeral_pubkey);

            let outputs = make_outputs(&proposals).unwrap();
            assert_eq!(outputs.enote_ephemeral_pubkeys.len(), 1);
            assert_eq!(outputs.amounts.iter().sum::<u64>() as u128, 10 + change);
        }
    }

    #[test]
    fn test_output_set_semantics() {
        let keys = JamtisMockKeys::generate();
        let normal = (0..3).map(|_| gen_payment_proposal(1, 0).unwrap()).collect();
        let payments = finalize_output_proposal_set(
            3,
            0,
            &keys.random_address(),
            &keys.random_address(),
            &keys.k_vb,
            normal,
            Vec::new(),
        )
        .unwrap();
        let mut proposals = output_proposals(&payments, &keys);
        assert_eq!(proposals.len(), 4);
        assert!(check_output_proposal_set_semantics(&proposals).is_ok());

        proposals.swap(0, 1);
        assert!(matches!(
            check_output_proposal_set_semantics(&proposals),
            Err(TxError::SemanticsViolation(_))
        ));
        assert!(check_output_proposal_set_semantics(&[]).is_err());
    }

    #[test]
    fn test_selfsend_semantics() {
        let keys = JamtisMockKeys::generate();
        let proposal = normal_self_send(JamtisSelfSendType::SelfSpend, &keys.random_address(), 42);
        let ctx = [3u8; 32];
        assert!(check_selfsend_proposal_semantics(&proposal, &ctx, &keys.spend_pubkey, &keys.k_vb).is_ok());

        let stranger = JamtisMockKeys::generate();
        assert!(check_selfsend_proposal_semantics(&proposal, &ctx, &stranger.spend_pubkey, &keys.k_vb).is_err());
    }

    #[test]
    fn test_tx_extra_and_supplement() {
        let mut proposal = gen_payment_proposal(5, 2).unwrap();
        proposal.partial_memo = make_tx_extra(vec![gen_extra_field_element()]).unwrap();
        let output = proposal.output_proposal(&[1u8; 32]).unwrap();

        let partial_memo = make_tx_extra(vec![gen_extra_field_element()]).unwrap();
        let supplement =
            make_tx_supplement(&partial_memo, &[output.clone()], vec![output.enote_ephemeral_pubkey]).unwrap();
        assert_eq!(try_get_extra_field_elements(&supplement.tx_extra).unwrap().len(), 2);
        assert!(check_tx_supplement_semantics_v1(&supplement, 1).is_ok());
        assert!(check_tx_supplement_semantics_v2(&supplement, 2).is_ok());
        assert!(check_tx_supplement_semantics_v1(&supplement, 2).is_err());

        let mut zero_key = supplement.clone();
        zero_key.output_enote_ephemeral_pubkeys[0] = MontgomeryPoint([0u8; 32]);
        assert!(check_tx_supplement_semantics_v1(&zero_key, 1).is_err());
    }

    #[test]
    fn test_coinbase_outputs() {
        let mut proposals: Vec<SpCoinbaseOutputProposal> = (0..3)
            .map(|i| gen_payment_proposal(100 + i, 0).unwrap().coinbase_output_proposal(9).unwrap())
            .collect();
        sort_coinbase_output_proposals(&mut proposals);
        let (enotes, keys) = make_coinbase_outputs(&proposals).unwrap();
        assert_eq!(enotes.len(), 3);
        assert_eq!(keys.len(), 3);

        proposals[1].enote_ephemeral_pubkey = proposals[0].enote_ephemeral_pubkey;
        assert!(check_coinbase_output_proposal_set_semantics(&proposals).is_err());
    }
}
