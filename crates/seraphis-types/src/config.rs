//! Semantic validation bounds per rules version.
//!
//! Each config is plain data so deployments can load overrides from JSON;
//! the getters return the built-in bounds for `Mock` and `One`.

use serde::{Deserialize, Serialize};

use crate::constants::{sp_config, SemanticRulesVersion};
use crate::TypesError;

/// Input/output count bounds for squashed transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentCountsConfig {
    pub min_inputs: usize,
    pub max_inputs: usize,
    pub min_outputs: usize,
    pub max_outputs: usize,
}

/// Output count bounds for coinbase transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseComponentCountsConfig {
    pub min_outputs: usize,
    pub max_outputs: usize,
}

/// Legacy ring size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyRefSetConfig {
    pub ring_size_min: usize,
    pub ring_size_max: usize,
}

/// Seraphis membership proof reference set bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpRefSetConfig {
    pub decomp_n_min: usize,
    pub decomp_n_max: usize,
    pub decomp_m_min: usize,
    pub decomp_m_max: usize,
    pub bin_radius_min: u64,
    pub bin_radius_max: u64,
    pub num_bin_members_min: u64,
    pub num_bin_members_max: u64,
}

macro_rules! impl_from_json {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Parse a config override from JSON.
                pub fn from_json(json: &str) -> Result<Self, TypesError> {
                    serde_json::from_str(json).map_err(|e| TypesError::Config(e.to_string()))
                }

                pub fn to_json(&self) -> Result<String, TypesError> {
                    serde_json::to_string(self).map_err(|e| TypesError::Config(e.to_string()))
                }
            }
        )*
    };
}

impl_from_json!(
    ComponentCountsConfig,
    CoinbaseComponentCountsConfig,
    LegacyRefSetConfig,
    SpRefSetConfig
);

pub fn component_counts_config(rules: SemanticRulesVersion) -> ComponentCountsConfig {
    match rules {
        SemanticRulesVersion::Mock => ComponentCountsConfig {
            min_inputs: 1,
            max_inputs: 100_000,
            min_outputs: 1,
            max_outputs: 100_000,
        },
        SemanticRulesVersion::One => ComponentCountsConfig {
            min_inputs: 1,
            max_inputs: sp_config::MAX_INPUTS_V1,
            min_outputs: 2,
            max_outputs: sp_config::MAX_OUTPUTS_V1,
        },
    }
}

pub fn coinbase_component_counts_config(rules: SemanticRulesVersion) -> CoinbaseComponentCountsConfig {
    match rules {
        SemanticRulesVersion::Mock => CoinbaseComponentCountsConfig {
            min_outputs: 1,
            max_outputs: 100_000,
        },
        SemanticRulesVersion::One => CoinbaseComponentCountsConfig {
            min_outputs: 1,
            max_outputs: sp_config::MAX_COINBASE_OUTPUTS_V1,
        },
    }
}

pub fn legacy_ref_set_config(rules: SemanticRulesVersion) -> LegacyRefSetConfig {
    match rules {
        SemanticRulesVersion::Mock => LegacyRefSetConfig {
            ring_size_min: 1,
            ring_size_max: 1000,
        },
        SemanticRulesVersion::One => LegacyRefSetConfig {
            ring_size_min: sp_config::LEGACY_RING_SIZE_V1,
            ring_size_max: sp_config::LEGACY_RING_SIZE_V1,
        },
    }
}

pub fn sp_ref_set_config(rules: SemanticRulesVersion) -> SpRefSetConfig {
    match rules {
        SemanticRulesVersion::Mock => SpRefSetConfig {
            decomp_n_min: 2,
            decomp_n_max: 100_000,
            decomp_m_min: 2,
            decomp_m_max: 100_000,
            bin_radius_min: 0,
            bin_radius_max: 30_000,
            num_bin_members_min: 1,
            num_bin_members_max: 60_000,
        },
        SemanticRulesVersion::One => SpRefSetConfig {
            decomp_n_min: sp_config::REF_SET_DECOMP_N_V1,
            decomp_n_max: sp_config::REF_SET_DECOMP_N_V1,
            decomp_m_min: sp_config::REF_SET_DECOMP_M_V1,
            decomp_m_max: sp_config::REF_SET_DECOMP_M_V1,
            bin_radius_min: sp_config::BIN_RADIUS_V1,
            bin_radius_max: sp_config::BIN_RADIUS_V1,
            num_bin_members_min: sp_config::NUM_BIN_MEMBERS_V1,
            num_bin_members_max: sp_config::NUM_BIN_MEMBERS_V1,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
