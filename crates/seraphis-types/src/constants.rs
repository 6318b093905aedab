//! Seraphis protocol constants and transaction version identifiers.

use serde::{Deserialize, Serialize};

use crate::TypesError;

// =============================================================================
// Protocol Constants
// =============================================================================

/// Transaction era for every Seraphis-structured transaction.
pub const SERAPHIS_TX_ERA: u8 = 2;

/// Bounds enforced by the strict (`One`) semantic rules.
pub mod sp_config {
    pub const MAX_INPUTS_V1: usize = 64;
    pub const MAX_OUTPUTS_V1: usize = 16;
    pub const MAX_COINBASE_OUTPUTS_V1: usize = 256;

    /// Legacy CLSAG ring size.
    pub const LEGACY_RING_SIZE_V1: usize = 16;

    /// Membership proof reference set decomposition: n^m members.
    pub const REF_SET_DECOMP_N_V1: usize = 2;
    pub const REF_SET_DECOMP_M_V1: usize = 7;

    pub const BIN_RADIUS_V1: u64 = 127;
    pub const NUM_BIN_MEMBERS_V1: u64 = 8;
}

/// Discretized fee level generation.
pub mod fee_config {
    /// Fee levels are powers of `NUMERATOR_X100 / 100`.
    pub const LEVEL_NUMERATOR_X100: u64 = 150;
    /// Significant decimal digits kept per level.
    pub const SIG_FIGS: u64 = 2;
}

/// Hard limits of the proof systems.
pub mod proof_limits {
    /// Maximum n*m for a Grootle proof.
    pub const GROOTLE_MAX_MN: usize = 128;
    /// Bit width of a Bulletproofs+ range proof.
    pub const BPP_RANGE_BITS: usize = 64;
    /// Maximum (padded) number of amounts aggregated in one range proof.
    pub const BPP_MAX_AGGREGATION: usize = 128;
}

/// Jamtis field widths.
pub mod jamtis {
    pub const ADDRESS_TAG_BYTES: usize = 18;
    pub const ENCODED_AMOUNT_BYTES: usize = 8;
    pub const VIEW_TAG_BYTES: usize = 1;
}

// =============================================================================
// Transaction Versions
// =============================================================================

/// Transaction structure (the concrete tx type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxStructure {
    Coinbase = 0,
    SquashedV1 = 1,
}

impl TxStructure {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Coinbase),
            1 => Some(Self::SquashedV1),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coinbase => write!(f, "COINBASE_V1"),
            Self::SquashedV1 => write!(f, "SQUASHED_V1"),
        }
    }
}

/// Semantic rules a transaction is validated under.
///
/// `Mock` carries permissive bounds for test fixtures; `One` is the strict
/// production rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SemanticRulesVersion {
    Mock = 0,
    One = 1,
}

impl SemanticRulesVersion {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Mock),
            1 => Some(Self::One),
            _ => None,
        }
    }
}

/// Three-byte transaction version: era, structure, semantic rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxVersion {
    pub era: u8,
    pub structure: TxStructure,
    pub semantic_rules: SemanticRulesVersion,
}

impl TxVersion {
    pub fn new(structure: TxStructure, semantic_rules: SemanticRulesVersion) -> Self {
        Self {
            era: SERAPHIS_TX_ERA,
            structure,
            semantic_rules,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.era, self.structure as u8, self.semantic_rules as u8]
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Result<Self, TypesError> {
        let structure =
            TxStructure::from_u8(bytes[1]).ok_or(TypesError::UnknownStructure(bytes[1]))?;
        let semantic_rules = SemanticRulesVersion::from_u8(bytes[2])
            .ok_or(TypesError::UnknownSemanticRules(bytes[2]))?;
        Ok(Self {
            era: bytes[0],
            structure,
            semantic_rules,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_version_bytes() {
        let version = TxVersion::new(TxStructure::SquashedV1, SemanticRulesVersion::One);
        let bytes = version.to_bytes();
        assert_eq!(bytes, [SERAPHIS_TX_ERA, 1, 1]);
        assert_eq!(TxVersion::from_bytes(bytes).unwrap(), version);
    }

    #[test]
    fn test_tx_version_rejects_unknown() {
        assert!(TxVersion::from_bytes([SERAPHIS_TX_ERA, 9, 0]).is_err());
        assert!(TxVersion::from_bytes([SERAPHIS_TX_ERA, 0, 7]).is_err());
    }

    #[test]
    fn test_strict_ref_set_fits_grootle() {
        let n = sp_config::REF_SET_DECOMP_N_V1;
        let m = sp_config::REF_SET_DECOMP_M_V1;
        assert!(n * m <= proof_limits::GROOTLE_MAX_MN);
        let ref_set_size = n.pow(m as u32) as u64;
        assert_eq!(ref_set_size % sp_config::NUM_BIN_MEMBERS_V1, 0, "bins must tile the ref set");
    }

    #[test]
    fn test_strict_aggregation_fits_bpp() {
        let max = sp_config::MAX_INPUTS_V1 + sp_config::MAX_OUTPUTS_V1;
        assert!(max.next_power_of_two() <= proof_limits::BPP_MAX_AGGREGATION);
    }
}
