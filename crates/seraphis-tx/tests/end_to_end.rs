//! End-to-end construction and validation against an in-memory ledger.
//!
//! Builds mixed legacy/seraphis transactions through every builder stage,
//! then runs them through the staged validator, the batch verifier, and the
//! mock ledger.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use seraphis_crypto::{commit, random_point, random_scalar, KeyImage};
use seraphis_types::{SemanticRulesVersion, TxStructure, TxVersion};

use seraphis_tx::builders::inputs::{
    gen_input_proposal, make_alignable_membership_proofs, make_membership_proof_prep, make_partial_inputs,
};
use seraphis_tx::builders::legacy_inputs::{
    gen_legacy_input_proposal, make_legacy_inputs, make_legacy_ring_signature, make_legacy_ring_signature_prep,
};
use seraphis_tx::builders::mixed::{check_partial_tx_semantics, make_balance_proof, make_partial_tx};
use seraphis_tx::builders::outputs::finalize_output_proposal_set;
use seraphis_tx::builders::TxProposal;
use seraphis_tx::enote::{LegacyRingMember, SpEnoteCore, SpEnoteCoreVariant};
use seraphis_tx::jamtis::{gen_payment_proposal, JamtisMockKeys};
use seraphis_tx::txtype::coinbase_v1::make_sp_tx_coinbase_v1;
use seraphis_tx::txtype::squashed_v1::make_sp_tx_squashed_v1;
use seraphis_tx::txtype::{SpTxParamPackV1, SpTxRef};
use seraphis_tx::validation::mock_ledger::gen_sp_enote_core;
use seraphis_tx::validation::validators::validate_sp_amount_balance_v1;
use seraphis_tx::validation::{contextual_validation_id, find_failing_txs};
use seraphis_tx::{
    validate_tx, validate_txs_batchable, DiscretizedFee, MockLedger, SpEnote, SpEnoteImage, SpTxSquashedV1,
    TxError, TxValidationContext,
};

const RULES: SemanticRulesVersion = SemanticRulesVersion::Mock;

struct Wallet {
    keys: JamtisMockKeys,
    legacy_spend_privkey: Scalar,
}

impl Wallet {
    fn new() -> Self {
        Self {
            keys: JamtisMockKeys::generate(),
            legacy_spend_privkey: random_scalar(),
        }
    }

    fn legacy_spend_pubkey(&self) -> EdwardsPoint {
        EdwardsPoint::mul_base(&self.legacy_spend_privkey)
    }
}

fn pad_ledger(ledger: &mut MockLedger, count: usize) {
    for _ in 0..count {
        ledger.add_legacy_enote(LegacyRingMember {
            onetime_address: random_point().compress(),
            amount_commitment: random_point().compress(),
        });
        ledger
            .add_sp_enote(SpEnoteCoreVariant::Plain(gen_sp_enote_core()))
            .unwrap();
    }
}

fn ledger_index(indices: &[(KeyImage, u64)], key_image: &KeyImage) -> u64 {
    indices
        .iter()
        .find(|(ki, _)| ki == key_image)
        .map(|(_, index)| *index)
        .unwrap()
}

/// A proposal whose inputs sit on the ledger at known indices.
struct PlannedTx {
    proposal: TxProposal,
    legacy_indices: Vec<(KeyImage, u64)>,
    sp_indices: Vec<(KeyImage, u64)>,
}

/// Add fresh enotes to `ledger` and propose a tx paying `payments` out of
/// them.
fn plan_tx(
    ledger: &mut MockLedger,
    wallet: &Wallet,
    legacy_amounts: &[u64],
    sp_amounts: &[u64],
    payments: &[u64],
    fee: DiscretizedFee,
) -> PlannedTx {
    // 1. put the enotes being spent on the ledger among decoys
    pad_ledger(ledger, 6);
    let mut legacy_indices = Vec::new();
    let legacy_proposals: Vec<_> = legacy_amounts
        .iter()
        .map(|&amount| {
            let proposal = gen_legacy_input_proposal(&wallet.legacy_spend_privkey, amount);
            let index = ledger.add_legacy_enote(LegacyRingMember {
                onetime_address: proposal.onetime_address,
                amount_commitment: proposal.amount_commitment,
            });
            legacy_indices.push((proposal.key_image, index));
            proposal
        })
        .collect();
    let mut sp_indices = Vec::new();
    let sp_proposals: Vec<_> = sp_amounts
        .iter()
        .map(|&amount| {
            let proposal = gen_input_proposal(&wallet.keys, amount).unwrap();
            sp_indices.push((proposal.key_image, ledger.add_sp_enote(proposal.enote_core).unwrap()));
            proposal
        })
        .collect();
    pad_ledger(ledger, 6);

    // 2. proposal
    let total_in: u128 = legacy_amounts.iter().chain(sp_amounts).map(|&a| a as u128).sum();
    let normal = payments.iter().map(|&a| gen_payment_proposal(a, 1).unwrap()).collect();
    let finalized = finalize_output_proposal_set(
        total_in,
        fee.fee_value().unwrap(),
        &wallet.keys.random_address(),
        &wallet.keys.random_address(),
        &wallet.keys.k_vb,
        normal,
        Vec::new(),
    )
    .unwrap();
    let proposal = TxProposal::new(
        legacy_proposals,
        sp_proposals,
        finalized.normal,
        finalized.selfsend,
        fee,
        Vec::new(),
    )
    .unwrap();
    PlannedTx {
        proposal,
        legacy_indices,
        sp_indices,
    }
}

/// Sign, prove and assemble a planned tx.
fn complete_tx(ledger: &MockLedger, wallet: &Wallet, planned: &PlannedTx) -> Result<SpTxSquashedV1, TxError> {
    let params = SpTxParamPackV1::for_rules(RULES);
    let PlannedTx {
        proposal,
        legacy_indices,
        sp_indices,
    } = planned;
    let version = TxVersion::new(TxStructure::SquashedV1, RULES);
    let prefix = proposal.proposal_prefix(&version, &wallet.keys.k_vb)?;

    // 3. legacy ring signatures
    let mut signatures = Vec::new();
    let mut rings = Vec::new();
    for input in &proposal.legacy_input_proposals {
        let prep = make_legacy_ring_signature_prep(
            ledger,
            input,
            &prefix,
            ledger_index(legacy_indices, &input.key_image),
            ledger.num_legacy_enotes(),
            params.legacy_ring_size,
        )
        .unwrap();
        rings.push(prep.referenced_enotes.clone());
        signatures.push(make_legacy_ring_signature(&prep, &wallet.legacy_spend_privkey).unwrap());
    }
    let legacy_inputs = make_legacy_inputs(
        &proposal.legacy_input_proposals,
        &prefix,
        signatures,
        rings,
        &wallet.legacy_spend_pubkey(),
    )
    .unwrap();

    // 4. seraphis image proofs
    let partial_inputs =
        make_partial_inputs(&proposal.sp_input_proposals, &prefix, &wallet.keys.k_m, &wallet.keys.k_vb).unwrap();

    // 5. partial tx, checked by simulation
    let partial_tx = make_partial_tx(
        proposal,
        legacy_inputs,
        partial_inputs,
        version,
        &wallet.legacy_spend_pubkey(),
        &wallet.keys.core_spend_pubkey(),
        &wallet.keys.k_vb,
    )?;
    check_partial_tx_semantics(&partial_tx, &params, RULES)?;

    // 6. membership proofs against the real ledger
    let mapper = ledger.sp_index_mapper().unwrap();
    let preps = proposal
        .sp_input_proposals
        .iter()
        .map(|input| {
            make_membership_proof_prep(
                ledger,
                &mapper,
                input,
                ledger_index(sp_indices, &input.key_image),
                params.bin_config,
                params.ref_set_decomp_n,
                params.ref_set_decomp_m,
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let membership_proofs = make_alignable_membership_proofs(preps).unwrap();

    make_sp_tx_squashed_v1(partial_tx, membership_proofs, RULES)
}

/// Run every builder stage for a tx paying `payments` out of fresh enotes
/// added to `ledger`.
fn build_tx(
    ledger: &mut MockLedger,
    wallet: &Wallet,
    legacy_amounts: &[u64],
    sp_amounts: &[u64],
    payments: &[u64],
    fee: DiscretizedFee,
) -> SpTxSquashedV1 {
    let planned = plan_tx(ledger, wallet, legacy_amounts, sp_amounts, payments, fee);
    complete_tx(ledger, wallet, &planned).unwrap()
}

#[test]
fn test_mixed_tx_validates_then_double_spends() {
    let _ = env_logger::builder().is_test(true).try_init();
    let wallet = Wallet::new();
    let mut ledger = MockLedger::new();

    let tx = build_tx(&mut ledger, &wallet, &[2, 3], &[4, 5, 6], &[3, 4], DiscretizedFee::new(5));
    assert_eq!(tx.legacy_input_images.len(), 2);
    assert_eq!(tx.sp_input_images.len(), 3);
    assert_eq!(tx.outputs.len(), 3, "two payments plus change");
    assert!(tx.weight() >= tx.size_bytes());

    validate_tx(&tx, &ledger).unwrap();
    let validation_id = contextual_validation_id(&tx, &ledger).unwrap();
    assert_eq!(validation_id, contextual_validation_id(&tx, &ledger).unwrap());

    let sp_enotes_before = ledger.num_sp_enotes();
    ledger.commit_sp_tx(&tx).unwrap();
    assert_eq!(ledger.num_sp_enotes(), sp_enotes_before + 3);

    assert!(matches!(validate_tx(&tx, &ledger), Err(TxError::DoubleSpend(_))));
    assert!(matches!(contextual_validation_id(&tx, &ledger), Err(TxError::DoubleSpend(_))));
    assert!(matches!(ledger.commit_sp_tx(&tx), Err(TxError::DoubleSpend(_))));
}

#[test]
fn test_twelve_input_tx_then_double_spend() {
    let _ = env_logger::builder().is_test(true).try_init();
    let wallet = Wallet::new();
    let mut ledger = MockLedger::new();

    let fee = DiscretizedFee::new(11);
    assert_eq!(fee.fee_value().unwrap(), 11);
    // 2·1 + 9·3 + 15 == 11·3 + 11, so change is zero
    let mut sp_amounts = vec![3; 9];
    sp_amounts.push(15);
    let tx = build_tx(&mut ledger, &wallet, &[1, 1], &sp_amounts, &[3; 11], fee);
    assert_eq!(tx.legacy_input_images.len(), 2);
    assert_eq!(tx.sp_input_images.len(), 10);
    assert_eq!(tx.outputs.len(), 12, "eleven payments plus a self-send dummy");
    assert_eq!(
        tx.balance_proof.bpp_proof.v.len(),
        tx.sp_input_images.len() + tx.outputs.len(),
        "seraphis inputs are range proved with the outputs"
    );

    validate_tx(&tx, &ledger).unwrap();
    ledger.commit_sp_tx(&tx).unwrap();
    assert!(matches!(validate_tx(&tx, &ledger), Err(TxError::DoubleSpend(_))));
}

#[test]
fn test_amount_off_by_one_breaks_balance() {
    let wallet = Wallet::new();
    let mut ledger = MockLedger::new();

    // proposals paying one unit too little or too much never assemble
    for delta in [-1i64, 1] {
        let mut planned = plan_tx(&mut ledger, &wallet, &[2], &[5, 6], &[4, 3], DiscretizedFee::new(1));
        let payment = &mut planned.proposal.normal_payment_proposals[0];
        payment.amount = payment.amount.checked_add_signed(delta).unwrap();
        assert!(
            matches!(complete_tx(&ledger, &wallet, &planned), Err(TxError::BalanceMismatch(_))),
            "payment perturbed by {delta}"
        );
    }

    // commitments to a perturbed output amount fail validation
    let fee = DiscretizedFee::new(2);
    let (input_blind, output_blinds) = (random_scalar(), [random_scalar(), random_scalar()]);
    let input = SpEnoteImage {
        masked_address: random_point().compress(),
        masked_commitment: commit(20, &input_blind).compress(),
        key_image: random_point().compress(),
    };
    let output = |amount: u64, blind: &Scalar| SpEnote {
        core: SpEnoteCore::new(random_point().compress(), amount, blind),
        encoded_amount: [0u8; 8],
        addr_tag_enc: [0u8; 18],
        view_tag: 0,
    };
    let amounts = [7, 20 - 7 - fee.fee_value().unwrap()];
    let outputs = [output(amounts[0], &output_blinds[0]), output(amounts[1], &output_blinds[1])];
    let proof = make_balance_proof(&[], &[20], &[input_blind], &amounts, &output_blinds).unwrap();
    validate_sp_amount_balance_v1(&[], &[input], &outputs, &fee, &proof).unwrap();

    for perturbed in [amounts[0] - 1, amounts[0] + 1] {
        let perturbed_amounts = [perturbed, amounts[1]];
        let perturbed_outputs = [output(perturbed, &output_blinds[0]), outputs[1].clone()];
        let perturbed_proof =
            make_balance_proof(&[], &[20], &[input_blind], &perturbed_amounts, &output_blinds).unwrap();
        assert!(matches!(
            validate_sp_amount_balance_v1(&[], &[input], &perturbed_outputs, &fee, &perturbed_proof),
            Err(TxError::BalanceMismatch(_))
        ));
    }
}

#[test]
fn test_input_range_commitment_tampered() {
    let wallet = Wallet::new();
    let mut ledger = MockLedger::new();
    let tx = build_tx(&mut ledger, &wallet, &[], &[6, 7], &[4], DiscretizedFee::new(1));
    validate_tx(&tx, &ledger).unwrap();

    let mut tampered = tx.clone();
    tampered.balance_proof.bpp_proof.v[0] = random_point().compress();
    assert!(matches!(validate_tx(&tampered, &ledger), Err(TxError::BalanceMismatch(_))));

    // dropping the input side leaves only output commitments
    let mut outputs_only = tx;
    let num_inputs = outputs_only.sp_input_images.len();
    let range_commitments = &mut outputs_only.balance_proof.bpp_proof.v;
    *range_commitments = range_commitments.split_off(num_inputs);
    assert!(matches!(validate_tx(&outputs_only, &ledger), Err(TxError::SemanticsViolation(_))));
}

#[test]
fn test_tampered_txs_fail_at_their_stage() {
    let wallet = Wallet::new();
    let mut ledger = MockLedger::new();
    let tx = build_tx(&mut ledger, &wallet, &[1], &[7, 8], &[2], DiscretizedFee::new(3));
    assert_eq!(tx.outputs.len(), 2, "payment plus change sharing one ephemeral key");
    validate_tx(&tx, &ledger).unwrap();

    // duplicated seraphis input
    let mut duplicated = tx.clone();
    duplicated.sp_input_images.push(duplicated.sp_input_images[0]);
    duplicated.sp_image_proofs.push(duplicated.sp_image_proofs[0].clone());
    duplicated.sp_membership_proofs.push(duplicated.sp_membership_proofs[0].clone());
    assert!(matches!(validate_tx(&duplicated, &ledger), Err(TxError::SemanticsViolation(_))));

    // output commitment no longer matches the range proof
    let mut recommitted = tx.clone();
    recommitted.outputs[0].core.amount_commitment = random_point().compress();
    assert!(matches!(validate_tx(&recommitted, &ledger), Err(TxError::BalanceMismatch(_))));

    // fee changed after signing: balance breaks first
    let mut refee = tx.clone();
    refee.tx_fee = DiscretizedFee::new(2);
    assert!(matches!(validate_tx(&refee, &ledger), Err(TxError::BalanceMismatch(_))));

    // image proofs swapped between inputs
    let mut swapped = tx.clone();
    swapped.sp_image_proofs.swap(0, 1);
    assert!(matches!(validate_tx(&swapped, &ledger), Err(TxError::InvalidInputProof(_))));

    // membership proof tampered
    let mut bad_membership = tx;
    bad_membership.sp_membership_proofs[0].grootle_proof.z += Scalar::ONE;
    assert!(matches!(validate_tx(&bad_membership, &ledger), Err(TxError::InvalidMembershipProof(_))));
}

#[test]
fn test_coinbase_tx_pays_block_reward() {
    let mut ledger = MockLedger::new();
    let payments: Vec<_> = [10, 20, 30].iter().map(|&a| gen_payment_proposal(a, 0).unwrap()).collect();
    let coinbase = make_sp_tx_coinbase_v1(RULES, 0, 60, &payments, Vec::new()).unwrap();

    validate_tx(&coinbase, &ledger).unwrap();
    ledger.commit_coinbase_tx(&coinbase).unwrap();
    assert_eq!(ledger.num_sp_enotes(), 3);
    assert!(ledger.commit_coinbase_tx(&coinbase).is_err(), "height already used");

    let mut overpaid = coinbase.clone();
    overpaid.block_reward = 59;
    assert!(matches!(validate_tx(&overpaid, &ledger), Err(TxError::BalanceMismatch(_))));
}

#[test]
fn test_batch_verification_and_isolation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let wallet = Wallet::new();
    let mut ledger = MockLedger::new();

    let first = build_tx(&mut ledger, &wallet, &[], &[9, 9], &[5], DiscretizedFee::new(2));
    let second = build_tx(&mut ledger, &wallet, &[4], &[6], &[1, 1, 1], DiscretizedFee::new(1));
    let payments = vec![gen_payment_proposal(50, 1).unwrap()];
    let coinbase = make_sp_tx_coinbase_v1(RULES, ledger.chain_height(), 50, &payments, Vec::new()).unwrap();

    let batch = [SpTxRef::from(&first), SpTxRef::from(&second), SpTxRef::from(&coinbase)];
    validate_txs_batchable(&batch, &ledger).unwrap();

    let mut broken = second.clone();
    broken.sp_membership_proofs[0].grootle_proof.z_a += Scalar::ONE;
    let batch = [SpTxRef::from(&first), SpTxRef::from(&broken), SpTxRef::from(&coinbase)];
    assert!(matches!(
        validate_txs_batchable(&batch, &ledger),
        Err(TxError::InvalidMembershipProof(_))
    ));

    let failures = find_failing_txs(&batch, &ledger);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 1);
    assert!(matches!(failures[0].1, TxError::InvalidMembershipProof(_)));

    // a broken range proof is reported as a balance failure, not a membership one
    let mut bad_range = first.clone();
    bad_range.balance_proof.bpp_proof.r1 += Scalar::ONE;
    let batch = [SpTxRef::from(&bad_range), SpTxRef::from(&second), SpTxRef::from(&coinbase)];
    assert!(matches!(validate_txs_batchable(&batch, &ledger), Err(TxError::BalanceMismatch(_))));
    let failures = find_failing_txs(&batch, &ledger);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 0);
    assert!(matches!(failures[0].1, TxError::BalanceMismatch(_)));
}
