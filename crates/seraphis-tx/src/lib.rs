//! Seraphis transaction construction, assembly, and validation.
//!
//! Turns spend intents into input and output proposals, partial inputs, a
//! partial transaction, and finally a fully-proved transaction; then checks
//! finished transactions through the staged validator against a read-only
//! ledger view. Proof primitives come from seraphis-crypto.

pub mod binned_reference_set;
pub mod builders;
pub mod components;
pub mod discretized_fee;
pub mod enote;
pub mod index_mapper;
pub mod jamtis;
pub mod logging;
pub mod tx_extra;
pub mod txtype;
pub mod validation;

pub use binned_reference_set::{SpBinnedReferenceSet, SpBinnedReferenceSetConfig};
pub use discretized_fee::DiscretizedFee;
pub use enote::{SpCoinbaseEnote, SpEnote, SpEnoteImage, SpEnoteVariant};
pub use tx_extra::{ExtraFieldElement, TxExtra};
pub use txtype::{SpTxCoinbaseV1, SpTxSquashedV1};
pub use validation::{
    validate_tx, validate_txs_batchable, MockLedger, TxValidationContext, TxValidatorRegistry,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("invalid mask: {0}")]
    InvalidMask(String),

    #[error("invalid key image: {0}")]
    InvalidKeyImage(String),

    #[error("proposal inconsistent: {0}")]
    ProposalInconsistent(String),

    #[error("invalid bin config: {0}")]
    InvalidBinConfig(String),

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("semantics violation: {0}")]
    SemanticsViolation(String),

    #[error("double spend: {0}")]
    DoubleSpend(String),

    #[error("balance mismatch: {0}")]
    BalanceMismatch(String),

    #[error("invalid input proof: {0}")]
    InvalidInputProof(String),

    #[error("invalid membership proof: {0}")]
    InvalidMembershipProof(String),

    #[error("malformed memo: {0}")]
    MalformedMemo(String),

    #[error("unknown fee encoding: {0}")]
    UnknownFeeEncoding(String),

    #[error("assembly failed: {0}")]
    AssemblyFailed(String),
}
