//! Read-only ledger view consumed by the validator and the proof builders.

use std::collections::{HashMap, HashSet};

use curve25519_dalek::edwards::EdwardsPoint;
use seraphis_crypto::KeyImage;

use crate::enote::LegacyRingMember;
use crate::TxError;

/// What validation needs to know about the ledger.
///
/// Implementations never mutate the ledger through this trait.
pub trait TxValidationContext {
    fn legacy_key_image_exists(&self, key_image: &KeyImage) -> bool;
    fn sp_key_image_exists(&self, key_image: &KeyImage) -> bool;

    /// Legacy `(Ko, C)` pairs at `indices`, in order.
    fn get_legacy_reference_elements(&self, indices: &[u64]) -> Result<Vec<LegacyRingMember>, TxError>;

    /// Squashed enotes `Q` at `indices`, in order.
    fn get_sp_reference_elements(&self, indices: &[u64]) -> Result<Vec<EdwardsPoint>, TxError>;

    fn chain_height(&self) -> u64;
}

fn lookup<T: Copy>(elements: &HashMap<u64, T>, indices: &[u64], kind: &str) -> Result<Vec<T>, TxError> {
    indices
        .iter()
        .map(|index| {
            elements
                .get(index)
                .copied()
                .ok_or_else(|| TxError::OutOfRange(format!("no {kind} reference element at index {index}")))
        })
        .collect()
}

/// Fixed reference elements and key images; used to validate transactions
/// against a throwaway ledger while they are still being built.
#[derive(Debug, Clone, Default)]
pub struct SimpleValidationContext {
    legacy_key_images: HashSet<KeyImage>,
    sp_key_images: HashSet<KeyImage>,
    legacy_elements: HashMap<u64, LegacyRingMember>,
    sp_elements: HashMap<u64, EdwardsPoint>,
}

impl SimpleValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legacy_element(mut self, index: u64, member: LegacyRingMember) -> Self {
        self.legacy_elements.insert(index, member);
        self
    }

    pub fn with_sp_element(mut self, index: u64, squashed_enote: EdwardsPoint) -> Self {
        self.sp_elements.insert(index, squashed_enote);
        self
    }

    pub fn insert_legacy_element(&mut self, index: u64, member: LegacyRingMember) {
        self.legacy_elements.insert(index, member);
    }

    pub fn insert_sp_element(&mut self, index: u64, squashed_enote: EdwardsPoint) {
        self.sp_elements.insert(index, squashed_enote);
    }

    pub fn insert_legacy_key_image(&mut self, key_image: KeyImage) {
        self.legacy_key_images.insert(key_image);
    }

    pub fn insert_sp_key_image(&mut self, key_image: KeyImage) {
        self.sp_key_images.insert(key_image);
    }
}

impl TxValidationContext for SimpleValidationContext {
    fn legacy_key_image_exists(&self, key_image: &KeyImage) -> bool {
        self.legacy_key_images.contains(key_image)
    }

    fn sp_key_image_exists(&self, key_image: &KeyImage) -> bool {
        self.sp_key_images.contains(key_image)
    }

    fn get_legacy_reference_elements(&self, indices: &[u64]) -> Result<Vec<LegacyRingMember>, TxError> {
        lookup(&self.legacy_elements, indices, "legacy")
    }

    fn get_sp_reference_elements(&self, indices: &[u64]) -> Result<Vec<EdwardsPoint>, TxError> {
        lookup(&self.sp_elements, indices, "seraphis")
    }

    fn chain_height(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seraphis_crypto::random_point;

    #[test]
    fn test_simple_context_lookups() {
        let q = random_point();
        let member = LegacyRingMember {
            onetime_address: random_point().compress(),
            amount_commitment: random_point().compress(),
        };
        let mut context = SimpleValidationContext::new()
            .with_sp_element(5, q)
            .with_legacy_element(2, member);

        assert_eq!(context.get_sp_reference_elements(&[5, 5]).unwrap(), vec![q, q]);
        assert_eq!(context.get_legacy_reference_elements(&[2]).unwrap(), vec![member]);
        assert!(matches!(context.get_sp_reference_elements(&[6]), Err(TxError::OutOfRange(_))));

        let key_image = random_point().compress();
        assert!(!context.sp_key_image_exists(&key_image));
        context.insert_sp_key_image(key_image);
        assert!(context.sp_key_image_exists(&key_image));
        assert!(!context.legacy_key_image_exists(&key_image));
    }
}
