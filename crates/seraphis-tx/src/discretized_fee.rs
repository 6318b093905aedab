//! One-byte fee encoding.
//!
//! Fee levels are powers of 1.5 rounded to two significant digits. Encoding
//! `0` is a zero fee, the encoding after the last level is `u64::MAX`, and
//! every higher encoding is invalid. Discretizing a raw fee picks the
//! smallest level that is at least the raw value, so the fee never rounds
//! down.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use seraphis_crypto::transcript::ToTranscript;
use seraphis_types::constants::fee_config;

use crate::TxError;

/// Encoding -> value table, built once per process.
struct FeeTable {
    entries: Vec<(u8, u64)>,
}

fn round_to_sig_figs(mut value: f64, sig_figs: u64) -> f64 {
    let limit = 10f64.powi(sig_figs as i32);
    let mut scale = 0u32;
    while value >= limit {
        value /= 10.0;
        scale += 1;
    }
    value = value.round();
    for _ in 0..scale {
        value *= 10.0;
    }
    value
}

fn build_fee_table() -> FeeTable {
    let factor = fee_config::LEVEL_NUMERATOR_X100 as f64 / 100.0;
    let level_value = |level: u32| round_to_sig_figs(factor.powi(level as i32), fee_config::SIG_FIGS);

    let mut entries = vec![(0u8, 0u64)];
    let mut prev = None;
    let mut level = 0u32;

    // 1. powers of the level factor; a repeated value keeps its level slot unused
    loop {
        let value = level_value(level) as u64;
        if prev != Some(value) {
            entries.push((level as u8 + 1, value));
            prev = Some(value);
        }
        level += 1;
        if level_value(level) >= u64::MAX as f64 || level >= u8::MAX as u32 - 2 {
            break;
        }
    }

    // 2. the slot after the last level pins the maximum fee
    entries.push((level as u8 + 1, u64::MAX));
    FeeTable { entries }
}

fn fee_table() -> &'static FeeTable {
    static TABLE: OnceLock<FeeTable> = OnceLock::new();
    TABLE.get_or_init(build_fee_table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscretizedFee {
    encoding: u8,
}

impl DiscretizedFee {
    /// Round `raw_fee` up to the nearest representable fee.
    pub fn new(raw_fee: u64) -> Self {
        let mut best: Option<(u8, u64)> = None;
        for &(encoding, value) in &fee_table().entries {
            if value < raw_fee {
                continue;
            }
            if best.map_or(true, |(_, best_value)| value <= best_value) {
                best = Some((encoding, value));
            }
        }
        // u64::MAX is always encodable, so `best` is set for every raw value
        Self {
            encoding: best.map_or(u8::MAX, |(encoding, _)| encoding),
        }
    }

    pub fn from_encoding(encoding: u8) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> u8 {
        self.encoding
    }

    pub fn fee_value(&self) -> Result<u64, TxError> {
        fee_table()
            .entries
            .iter()
            .find(|(encoding, _)| *encoding == self.encoding)
            .map(|(_, value)| *value)
            .ok_or_else(|| TxError::UnknownFeeEncoding(format!("fee encoding {}", self.encoding)))
    }

    /// True if this fee decodes to exactly `value`.
    pub fn matches_value(&self, value: u64) -> bool {
        self.fee_value().map_or(false, |v| v == value)
    }

    pub const fn size_bytes() -> usize {
        1
    }
}

impl ToTranscript for DiscretizedFee {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.push(self.encoding);
    }
}
