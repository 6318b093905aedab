//! Staged transaction validation.
//!
//! A transaction passes through five stages, each gating the next:
//! semantics, key images, amount balance, input proofs, and finally the
//! batchable range and membership proofs. The last stage yields multiexp
//! builders so many transactions can be verified in one pooled
//! multiexponentiation.

pub mod context;
pub mod mock_ledger;
pub mod registry;
pub mod validators;

pub use context::{SimpleValidationContext, TxValidationContext};
pub use mock_ledger::MockLedger;
pub use registry::TxValidatorRegistry;
pub use validators::{BatchableProofData, CoinbaseV1Validator, SpTxValidator, SquashedV1Validator};

use seraphis_crypto::transcript::domain;
use seraphis_crypto::SpTranscript;

use crate::txtype::{SpTxRef, SpTxSquashedV1};
use crate::TxError;

/// Fully validate one tx with the default validators.
pub fn validate_tx<'a>(tx: impl Into<SpTxRef<'a>>, context: &dyn TxValidationContext) -> Result<(), TxError> {
    TxValidatorRegistry::default().validate_tx(tx.into(), context)
}

/// Validate many txs with one pooled proof verification.
pub fn validate_txs_batchable(txs: &[SpTxRef<'_>], context: &dyn TxValidationContext) -> Result<(), TxError> {
    TxValidatorRegistry::default().validate_txs_batchable(txs, context)
}

/// Index and error of every tx that fails on its own.
pub fn find_failing_txs(txs: &[SpTxRef<'_>], context: &dyn TxValidationContext) -> Vec<(usize, TxError)> {
    TxValidatorRegistry::default().find_failing_txs(txs, context)
}

/// Commits to a tx together with the ledger elements it references, so two
/// nodes can confirm they validated against the same ledger view.
///
/// Fails if any of the tx's key images is already spent in `context`.
pub fn contextual_validation_id(
    tx: &SpTxSquashedV1,
    context: &dyn TxValidationContext,
) -> Result<[u8; 32], TxError> {
    SquashedV1Validator.validate_key_images(tx.into(), context)?;

    let mut legacy_rings = Vec::with_capacity(tx.legacy_ring_signatures.len());
    for signature in &tx.legacy_ring_signatures {
        legacy_rings.push(context.get_legacy_reference_elements(&signature.reference_set)?);
    }
    let mut sp_reference_sets = Vec::with_capacity(tx.sp_membership_proofs.len());
    for proof in &tx.sp_membership_proofs {
        let indices = proof.binned_reference_set.reference_indices()?;
        sp_reference_sets.push(context.get_sp_reference_elements(&indices)?);
    }

    let mut transcript = SpTranscript::new(domain::CONTEXTUAL_VALIDATION_ID, 32);
    transcript
        .append("tx_id", &tx.tx_id())
        .append("legacy_ring_members", &legacy_rings)
        .append("sp_reference_sets", &sp_reference_sets);
    Ok(transcript.hash_to_32())
}
