//! Dispatch from a transaction's structure to its validator.

use std::collections::HashMap;

use seraphis_crypto::{SpMultiexp, SpMultiexpBuilder};
use seraphis_types::TxStructure;

use crate::logging::{Logger, VALIDATION};
use crate::txtype::SpTxRef;
use crate::validation::context::TxValidationContext;
use crate::validation::validators::{BatchableProofData, CoinbaseV1Validator, SpTxValidator, SquashedV1Validator};
use crate::TxError;

/// Validators keyed by transaction structure.
///
/// The default registry knows every format this crate defines; hosts can
/// replace a validator or add one for a new structure with [`register`].
///
/// [`register`]: TxValidatorRegistry::register
pub struct TxValidatorRegistry {
    validators: HashMap<TxStructure, Box<dyn SpTxValidator>>,
    logger: Logger,
}

impl Default for TxValidatorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty(VALIDATION);
        registry.register(Box::new(CoinbaseV1Validator));
        registry.register(Box::new(SquashedV1Validator));
        registry
    }
}

impl std::fmt::Debug for TxValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut structures: Vec<String> = self.validators.keys().map(ToString::to_string).collect();
        structures.sort();
        f.debug_struct("TxValidatorRegistry")
            .field("structures", &structures)
            .field("logger", &self.logger.target())
            .finish()
    }
}

impl TxValidatorRegistry {
    pub fn empty(logger: Logger) -> Self {
        Self {
            validators: HashMap::new(),
            logger,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Install `validator` for its structure, returning the one it replaces.
    pub fn register(&mut self, validator: Box<dyn SpTxValidator>) -> Option<Box<dyn SpTxValidator>> {
        self.validators.insert(validator.structure(), validator)
    }

    fn validator(&self, tx: SpTxRef<'_>) -> Result<&dyn SpTxValidator, TxError> {
        self.validators
            .get(&tx.structure())
            .map(Box::as_ref)
            .ok_or_else(|| TxError::SemanticsViolation(format!("no validator for {} txs", tx.structure())))
    }

    fn stage<T>(&self, tx: SpTxRef<'_>, stage: &str, result: Result<T, TxError>) -> Result<T, TxError> {
        result.map_err(|e| {
            self.logger.fail(
                &format!("{stage} of {} tx {}", tx.structure(), hex::encode(tx.tx_id())),
                e,
            )
        })
    }

    /// Every check except the batchable proofs.
    pub fn validate_tx_non_batchable(
        &self,
        tx: SpTxRef<'_>,
        context: &dyn TxValidationContext,
    ) -> Result<(), TxError> {
        let validator = self.validator(tx)?;
        // 1. semantics
        self.stage(tx, "semantics", validator.validate_semantics(tx))?;
        // 2. key images against the ledger
        self.stage(tx, "key images", validator.validate_key_images(tx, context))?;
        // 3. amount balance
        self.stage(tx, "amount balance", validator.validate_amount_balance(tx))?;
        // 4. input proofs
        self.stage(tx, "input proofs", validator.validate_input_proofs(tx, context))
    }

    /// Full validation of one transaction.
    pub fn validate_tx(&self, tx: SpTxRef<'_>, context: &dyn TxValidationContext) -> Result<(), TxError> {
        self.validate_tx_non_batchable(tx, context)?;
        let proof_data = self.stage(
            tx,
            "batchable proofs",
            self.validator(tx)?.batchable_verification_data(tx, context),
        )?;
        verify_batchable_proofs(proof_data)
            .map_err(|e| self.logger.fail(&format!("batchable proofs of tx {}", hex::encode(tx.tx_id())), e))
    }

    /// Validate every tx, pooling all range and membership proofs into one
    /// multiexponentiation. A failed pool names the proof kind that broke it
    /// but not the tx at fault; use
    /// [`find_failing_txs`](Self::find_failing_txs) for that.
    pub fn validate_txs_batchable(
        &self,
        txs: &[SpTxRef<'_>],
        context: &dyn TxValidationContext,
    ) -> Result<(), TxError> {
        let mut proof_data = BatchableProofData::default();
        for tx in txs {
            self.validate_tx_non_batchable(*tx, context)?;
            proof_data.append(self.stage(
                *tx,
                "batchable proofs",
                self.validator(*tx)?.batchable_verification_data(*tx, context),
            )?);
        }

        let num_builders = proof_data.len();
        if let Err(e) = verify_batchable_proofs(proof_data) {
            self.logger
                .warn(format_args!("batch of {} txs failed proof verification: {e}", txs.len()));
            return Err(e);
        }
        self.logger.debug(format_args!(
            "validated batch of {} txs with {num_builders} multiexp builders",
            txs.len()
        ));
        Ok(())
    }

    /// Validate each tx on its own and report the index and error of every
    /// failure.
    pub fn find_failing_txs(
        &self,
        txs: &[SpTxRef<'_>],
        context: &dyn TxValidationContext,
    ) -> Vec<(usize, TxError)> {
        txs.iter()
            .enumerate()
            .filter_map(|(index, tx)| self.validate_tx(*tx, context).err().map(|e| (index, e)))
            .collect()
    }
}

fn evaluates_to_identity(builders: &[SpMultiexpBuilder]) -> Result<bool, TxError> {
    if builders.is_empty() {
        return Ok(true);
    }
    SpMultiexp::new(builders)
        .map(|multiexp| multiexp.evaluates_to_point_at_infinity())
        .map_err(|e| TxError::InvalidMembershipProof(e.to_string()))
}

/// One pooled multiexp over every proof. Only a failed pool is split by
/// proof kind to name the error: range proofs are part of the balance proof.
fn verify_batchable_proofs(proof_data: BatchableProofData) -> Result<(), TxError> {
    let num_range_builders = proof_data.range_proofs.len();
    let mut builders = proof_data.range_proofs;
    builders.extend(proof_data.membership_proofs);
    if evaluates_to_identity(&builders)? {
        return Ok(());
    }

    if !evaluates_to_identity(&builders[..num_range_builders])? {
        return Err(TxError::BalanceMismatch("range proofs do not verify".into()));
    }
    Err(TxError::InvalidMembershipProof("membership proofs do not verify".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SpTxSupplement;
    use crate::txtype::SpTxCoinbaseV1;
    use crate::validation::context::SimpleValidationContext;
    use seraphis_types::SemanticRulesVersion;

    struct RejectAll;

    impl SpTxValidator for RejectAll {
        fn structure(&self) -> TxStructure {
            TxStructure::Coinbase
        }
        fn validate_semantics(&self, _tx: SpTxRef<'_>) -> Result<(), TxError> {
            Err(TxError::SemanticsViolation("rejected".into()))
        }
        fn validate_key_images(&self, _: SpTxRef<'_>, _: &dyn TxValidationContext) -> Result<(), TxError> {
            Ok(())
        }
        fn validate_amount_balance(&self, _: SpTxRef<'_>) -> Result<(), TxError> {
            Ok(())
        }
        fn validate_input_proofs(&self, _: SpTxRef<'_>, _: &dyn TxValidationContext) -> Result<(), TxError> {
            Ok(())
        }
        fn batchable_verification_data(
            &self,
            _: SpTxRef<'_>,
            _: &dyn TxValidationContext,
        ) -> Result<BatchableProofData, TxError> {
            Ok(BatchableProofData::default())
        }
    }

    fn empty_coinbase() -> SpTxCoinbaseV1 {
        SpTxCoinbaseV1 {
            tx_semantic_rules_version: SemanticRulesVersion::Mock,
            block_height: 0,
            block_reward: 0,
            outputs: Vec::new(),
            tx_supplement: SpTxSupplement::default(),
        }
    }

    #[test]
    fn test_unknown_structure_is_rejected() {
        let tx = empty_coinbase();
        let registry = TxValidatorRegistry::empty(VALIDATION);
        let err = registry.validate_tx((&tx).into(), &SimpleValidationContext::new()).unwrap_err();
        assert!(matches!(err, TxError::SemanticsViolation(_)));
    }

    #[test]
    fn test_register_replaces_validator() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut registry = TxValidatorRegistry::default();
        assert!(registry.register(Box::new(RejectAll)).is_some());

        let tx = empty_coinbase();
        let context = SimpleValidationContext::new();
        let failures = registry.find_failing_txs(&[(&tx).into(), (&tx).into()], &context);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[1].0, 1);
        assert!(format!("{registry:?}").contains("SQUASHED_V1"));
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let registry = TxValidatorRegistry::default();
        assert!(registry.validate_txs_batchable(&[], &SimpleValidationContext::new()).is_ok());
    }
}
