//! Core types and constants for Seraphis transactions.
//!
//! This crate provides the foundational types shared by the crypto and
//! transaction crates: the transaction version triple, semantic rules
//! versions, per-version semantic bounds, protocol constants, and the
//! varint codec used by the memo field.

pub mod config;
pub mod constants;
pub mod varint;

pub use config::{
    CoinbaseComponentCountsConfig, ComponentCountsConfig, LegacyRefSetConfig, SpRefSetConfig,
};
pub use constants::{SemanticRulesVersion, TxStructure, TxVersion};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("unknown tx structure version: {0}")]
    UnknownStructure(u8),

    #[error("unknown semantic rules version: {0}")]
    UnknownSemanticRules(u8),

    #[error("config parse error: {0}")]
    Config(String),
}
