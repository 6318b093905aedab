//! In-memory ledger for tests and simulations.
//!
//! Tracks spent key images, the legacy `(Ko, C)` enotes, and the squashed
//! enotes `Q` that seraphis membership proofs reference. Enote indices are
//! assigned in insertion order, starting at zero.

use std::collections::HashSet;

use curve25519_dalek::edwards::EdwardsPoint;
use seraphis_crypto::KeyImage;

use crate::enote::{LegacyRingMember, SpEnoteCore, SpEnoteCoreVariant};
use crate::index_mapper::FlatIndexMapper;
use crate::logging::VALIDATION;
use crate::txtype::{SpTxCoinbaseV1, SpTxSquashedV1};
use crate::validation::context::TxValidationContext;
use crate::TxError;

#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    legacy_key_images: HashSet<KeyImage>,
    sp_key_images: HashSet<KeyImage>,
    legacy_enotes: Vec<LegacyRingMember>,
    sp_squashed_enotes: Vec<EdwardsPoint>,
    chain_height: u64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_legacy_enotes(&self) -> u64 {
        self.legacy_enotes.len() as u64
    }

    pub fn num_sp_enotes(&self) -> u64 {
        self.sp_squashed_enotes.len() as u64
    }

    /// Append a legacy enote and return its ledger index.
    pub fn add_legacy_enote(&mut self, member: LegacyRingMember) -> u64 {
        self.legacy_enotes.push(member);
        self.num_legacy_enotes() - 1
    }

    /// Append a seraphis enote and return its ledger index.
    pub fn add_sp_enote(&mut self, enote: SpEnoteCoreVariant) -> Result<u64, TxError> {
        self.sp_squashed_enotes.push(enote.squashed_enote()?);
        Ok(self.num_sp_enotes() - 1)
    }

    /// Index mapper over every seraphis enote currently on the ledger.
    pub fn sp_index_mapper(&self) -> Result<FlatIndexMapper, TxError> {
        if self.sp_squashed_enotes.is_empty() {
            return Err(TxError::OutOfRange("ledger holds no seraphis enotes".into()));
        }
        FlatIndexMapper::new(0, self.num_sp_enotes() - 1)
    }

    /// Record a validated tx: its key images become spent and its outputs
    /// become referenceable. Nothing is recorded if any key image is
    /// already spent.
    pub fn commit_sp_tx(&mut self, tx: &SpTxSquashedV1) -> Result<(), TxError> {
        // 1. reject double spends before touching anything
        let legacy_spent = tx
            .legacy_input_images
            .iter()
            .any(|image| self.legacy_key_images.contains(&image.key_image));
        let sp_spent = tx
            .sp_input_images
            .iter()
            .any(|image| self.sp_key_images.contains(&image.key_image));
        if legacy_spent || sp_spent {
            return Err(VALIDATION.fail(
                "ledger commit",
                TxError::DoubleSpend(format!("tx {} spends a spent key image", hex::encode(tx.tx_id()))),
            ));
        }

        // 2. squash outputs first so a bad output leaves the ledger untouched
        let squashed = tx
            .outputs
            .iter()
            .map(|output| SpEnoteCoreVariant::Plain(output.core).squashed_enote())
            .collect::<Result<Vec<_>, TxError>>()?;

        // 3. record
        self.legacy_key_images
            .extend(tx.legacy_input_images.iter().map(|image| image.key_image));
        self.sp_key_images
            .extend(tx.sp_input_images.iter().map(|image| image.key_image));
        self.sp_squashed_enotes.extend(squashed);
        self.chain_height += 1;

        VALIDATION.debug(format_args!(
            "committed tx {} at height {}",
            hex::encode(tx.tx_id()),
            self.chain_height - 1
        ));
        Ok(())
    }

    /// Record a coinbase tx, which must be for the next block.
    pub fn commit_coinbase_tx(&mut self, tx: &SpTxCoinbaseV1) -> Result<(), TxError> {
        if tx.block_height != self.chain_height {
            return Err(VALIDATION.fail(
                "ledger commit",
                TxError::OutOfRange(format!(
                    "coinbase tx for height {} but chain height is {}",
                    tx.block_height, self.chain_height
                )),
            ));
        }
        let squashed = tx
            .outputs
            .iter()
            .map(|output| SpEnoteCoreVariant::Coinbase(output.core).squashed_enote())
            .collect::<Result<Vec<_>, TxError>>()?;
        self.sp_squashed_enotes.extend(squashed);
        self.chain_height += 1;
        Ok(())
    }
}

impl TxValidationContext for MockLedger {
    fn legacy_key_image_exists(&self, key_image: &KeyImage) -> bool {
        self.legacy_key_images.contains(key_image)
    }

    fn sp_key_image_exists(&self, key_image: &KeyImage) -> bool {
        self.sp_key_images.contains(key_image)
    }

    fn get_legacy_reference_elements(&self, indices: &[u64]) -> Result<Vec<LegacyRingMember>, TxError> {
        indices
            .iter()
            .map(|&index| {
                self.legacy_enotes
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| TxError::OutOfRange(format!("no legacy enote at index {index}")))
            })
            .collect()
    }

    fn get_sp_reference_elements(&self, indices: &[u64]) -> Result<Vec<EdwardsPoint>, TxError> {
        indices
            .iter()
            .map(|&index| {
                self.sp_squashed_enotes
                    .get(index as usize)
                    .copied()
                    .ok_or_else(|| TxError::OutOfRange(format!("no seraphis enote at index {index}")))
            })
            .collect()
    }

    fn chain_height(&self) -> u64 {
        self.chain_height
    }
}

/// A random plain core enote; handy for padding a ledger with decoys.
pub fn gen_sp_enote_core() -> SpEnoteCore {
    SpEnoteCore::new(
        seraphis_crypto::random_point().compress(),
        rand::random::<u32>() as u64,
        &seraphis_crypto::random_scalar(),
    )
}
