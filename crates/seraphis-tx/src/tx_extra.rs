//! Memo field: a sorted list of type-length-value elements.
//!
//! Wire format: `varint(type) || varint(len) || value`, repeated. Elements
//! are strictly ascending by (type, length, value), so the encoding of a set
//! of elements is unique.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use seraphis_crypto::transcript::ToTranscript;
use seraphis_types::varint::{decode_varint, write_varint};

use crate::TxError;

/// Serialized memo bytes.
pub type TxExtra = Vec<u8>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtraFieldElement {
    pub field_type: u64,
    pub value: Vec<u8>,
}

impl ExtraFieldElement {
    pub fn new(field_type: u64, value: Vec<u8>) -> Self {
        Self { field_type, value }
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn write_to(&self, bytes: &mut Vec<u8>) {
        write_varint(bytes, self.field_type);
        write_varint(bytes, self.value.len() as u64);
        bytes.extend_from_slice(&self.value);
    }
}

impl Ord for ExtraFieldElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.field_type
            .cmp(&other.field_type)
            .then(self.value.len().cmp(&other.value.len()))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for ExtraFieldElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ToTranscript for ExtraFieldElement {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.field_type.append_to(bytes);
        self.value.append_to(bytes);
    }
}

/// Sort the elements and serialize them. Duplicate elements are rejected.
pub fn make_tx_extra(mut elements: Vec<ExtraFieldElement>) -> Result<TxExtra, TxError> {
    elements.sort();
    if elements.windows(2).any(|w| w[0] == w[1]) {
        return Err(TxError::MalformedMemo("duplicate memo element".into()));
    }

    let mut extra = Vec::with_capacity(elements.iter().map(|e| e.len() + 4).sum());
    for element in &elements {
        element.write_to(&mut extra);
    }
    Ok(extra)
}

fn parse_element(tx_extra: &[u8], position: &mut usize) -> Result<ExtraFieldElement, TxError> {
    let (field_type, read) = decode_varint(tx_extra, *position)
        .ok_or_else(|| TxError::MalformedMemo(format!("bad type varint at byte {position}")))?;
    *position += read;

    let (length, read) = decode_varint(tx_extra, *position)
        .ok_or_else(|| TxError::MalformedMemo(format!("bad length varint at byte {position}")))?;
    *position += read;

    let end = usize::try_from(length)
        .ok()
        .and_then(|len| position.checked_add(len))
        .filter(|end| *end <= tx_extra.len())
        .ok_or_else(|| TxError::MalformedMemo("element value runs past the end of the memo".into()))?;

    let value = tx_extra[*position..end].to_vec();
    *position = end;
    Ok(ExtraFieldElement { field_type, value })
}

/// Parse a memo back into its elements.
pub fn try_get_extra_field_elements(tx_extra: &[u8]) -> Result<Vec<ExtraFieldElement>, TxError> {
    let mut elements = Vec::new();
    let mut position = 0usize;
    while position < tx_extra.len() {
        elements.push(parse_element(tx_extra, &mut position)?);
    }

    if elements.windows(2).any(|w| w[0] >= w[1]) {
        return Err(TxError::MalformedMemo("memo elements are not strictly sorted".into()));
    }
    Ok(elements)
}

/// Append the elements of a serialized partial memo to `elements`.
pub fn accumulate_extra_field_elements(
    partial_memo: &[u8],
    elements: &mut Vec<ExtraFieldElement>,
) -> Result<(), TxError> {
    elements.extend(try_get_extra_field_elements(partial_memo)?);
    Ok(())
}

/// Random element for tests and mock memos (value length < 101).
pub fn gen_extra_field_element() -> ExtraFieldElement {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(0..101);
    let mut value = vec![0u8; len];
    rng.fill(value.as_mut_slice());
    ExtraFieldElement {
        field_type: rng.gen(),
        value,
    }
}
