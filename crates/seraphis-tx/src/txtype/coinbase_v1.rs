//! The coinbase v1 transaction: a block reward paid out in plaintext-amount
//! enotes.

use seraphis_crypto::transcript::domain;
use seraphis_crypto::SpTranscript;
use seraphis_types::{SemanticRulesVersion, TxStructure, TxVersion};

use crate::builders::outputs::{
    finalize_tx_extra, make_coinbase_outputs, sort_coinbase_output_proposals, SpCoinbaseOutputProposal,
};
use crate::components::SpTxSupplement;
use crate::enote::SpCoinbaseEnote;
use crate::jamtis::JamtisPaymentProposal;
use crate::logging::BUILDER;
use crate::tx_extra::{make_tx_extra, ExtraFieldElement};
use crate::validation::validators::{CoinbaseV1Validator, SpTxValidator};
use crate::TxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpTxCoinbaseV1 {
    pub tx_semantic_rules_version: SemanticRulesVersion,
    pub block_height: u64,
    pub block_reward: u64,
    /// Sorted by onetime address.
    pub outputs: Vec<SpCoinbaseEnote>,
    pub tx_supplement: SpTxSupplement,
}

impl SpTxCoinbaseV1 {
    pub fn version(&self) -> TxVersion {
        TxVersion::new(TxStructure::Coinbase, self.tx_semantic_rules_version)
    }

    /// H_32(version, height, reward, outputs, supplement)
    pub fn tx_id(&self) -> [u8; 32] {
        let mut transcript = SpTranscript::new(domain::COINBASE_TRANSACTION_ID, self.size_bytes() + 3);
        transcript
            .append("tx_version", &self.version().to_bytes())
            .append("block_height", &self.block_height)
            .append("block_reward", &self.block_reward)
            .append("outputs", &self.outputs)
            .append("tx_supplement", &self.tx_supplement);
        transcript.hash_to_32()
    }

    pub fn size_bytes_for(num_outputs: usize, tx_extra_size: usize) -> usize {
        8 + 8 + num_outputs * SpCoinbaseEnote::SIZE_BYTES + SpTxSupplement::size_bytes_for(num_outputs, tx_extra_size, false)
    }

    pub fn size_bytes(&self) -> usize {
        8 + 8 + self.outputs.len() * SpCoinbaseEnote::SIZE_BYTES + self.tx_supplement.size_bytes()
    }

    /// Coinbase txs carry no range proofs, so weight is size.
    pub fn weight(&self) -> usize {
        self.size_bytes()
    }
}

/// Pay `block_reward` at `block_height` to the given payment proposals.
pub fn make_sp_tx_coinbase_v1(
    semantic_rules_version: SemanticRulesVersion,
    block_height: u64,
    block_reward: u64,
    payment_proposals: &[JamtisPaymentProposal],
    additional_memo_elements: Vec<ExtraFieldElement>,
) -> Result<SpTxCoinbaseV1, TxError> {
    let mut output_proposals = payment_proposals
        .iter()
        .map(|proposal| proposal.coinbase_output_proposal(block_height))
        .collect::<Result<Vec<SpCoinbaseOutputProposal>, TxError>>()?;
    sort_coinbase_output_proposals(&mut output_proposals);

    let (outputs, enote_ephemeral_pubkeys) = make_coinbase_outputs(&output_proposals)?;
    let partial_memo = make_tx_extra(additional_memo_elements)?;
    let tx_supplement = SpTxSupplement {
        output_enote_ephemeral_pubkeys: enote_ephemeral_pubkeys,
        tx_extra: finalize_tx_extra(&partial_memo, output_proposals.iter().map(|proposal| &proposal.partial_memo))?,
    };

    let tx = SpTxCoinbaseV1 {
        tx_semantic_rules_version: semantic_rules_version,
        block_height,
        block_reward,
        outputs,
        tx_supplement,
    };
    CoinbaseV1Validator
        .validate_semantics((&tx).into())
        .map_err(|e| BUILDER.fail("coinbase tx assembly", TxError::AssemblyFailed(e.to_string())))?;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jamtis::gen_payment_proposal;

    #[test]
    fn test_make_coinbase_tx() {
        let proposals: Vec<JamtisPaymentProposal> =
            (0..3).map(|i| gen_payment_proposal(10 + i, 1).unwrap()).collect();
        let tx = make_sp_tx_coinbase_v1(SemanticRulesVersion::One, 5, 33, &proposals, Vec::new()).unwrap();

        assert_eq!(tx.outputs.len(), 3);
        assert_eq!(tx.tx_supplement.output_enote_ephemeral_pubkeys.len(), 3);
        assert_eq!(tx.size_bytes(), SpTxCoinbaseV1::size_bytes_for(3, tx.tx_supplement.tx_extra.len()));
        assert_eq!(tx.weight(), tx.size_bytes());

        let mut other = tx.clone();
        other.block_height += 1;
        assert_ne!(tx.tx_id(), other.tx_id());
    }

    #[test]
    fn test_coinbase_rejects_empty_outputs() {
        assert!(make_sp_tx_coinbase_v1(SemanticRulesVersion::Mock, 0, 0, &[], Vec::new()).is_err());
    }
}
