//! Concrete transaction formats.
//!
//! Each format is its own struct; [`SpTxRef`] borrows any of them so the
//! validator registry can dispatch on [`TxStructure`] at runtime.

pub mod coinbase_v1;
pub mod squashed_v1;

pub use coinbase_v1::SpTxCoinbaseV1;
pub use squashed_v1::{SpTxParamPackV1, SpTxSquashedV1};

use seraphis_types::{TxStructure, TxVersion};

/// A borrowed transaction of any supported format.
#[derive(Debug, Clone, Copy)]
pub enum SpTxRef<'a> {
    Coinbase(&'a SpTxCoinbaseV1),
    SquashedV1(&'a SpTxSquashedV1),
}

impl SpTxRef<'_> {
    pub fn structure(&self) -> TxStructure {
        match self {
            Self::Coinbase(_) => TxStructure::Coinbase,
            Self::SquashedV1(_) => TxStructure::SquashedV1,
        }
    }

    pub fn version(&self) -> TxVersion {
        match self {
            Self::Coinbase(tx) => tx.version(),
            Self::SquashedV1(tx) => tx.version(),
        }
    }

    pub fn tx_id(&self) -> [u8; 32] {
        match self {
            Self::Coinbase(tx) => tx.tx_id(),
            Self::SquashedV1(tx) => tx.tx_id(),
        }
    }
}

impl<'a> From<&'a SpTxCoinbaseV1> for SpTxRef<'a> {
    fn from(tx: &'a SpTxCoinbaseV1) -> Self {
        Self::Coinbase(tx)
    }
}

impl<'a> From<&'a SpTxSquashedV1> for SpTxRef<'a> {
    fn from(tx: &'a SpTxSquashedV1) -> Self {
        Self::SquashedV1(tx)
    }
}
