//! Mapping between ledger element indices and the 64-bit uniform index space.
//!
//! Reference set bins are placed in uniform space, so decoy selection does
//! not depend on how many elements the ledger currently holds.

use crate::TxError;

/// Projects element indices into uniform space and back.
pub trait RefSetIndexMapper {
    fn distribution_min_index(&self) -> u64;
    fn distribution_max_index(&self) -> u64;
    fn element_index_to_uniform_index(&self, element_index: u64) -> Result<u64, TxError>;
    fn uniform_index_to_element_index(&self, uniform_index: u64) -> u64;
}

/// b = (a - a_min)(b_max - b_min + 1)/(a_max - a_min + 1) + b_min
fn project_between_ranges(a: u64, a_min: u64, a_max: u64, b_min: u64, b_max: u64) -> u64 {
    let numerator = (a - a_min) as u128 * (b_max as u128 - b_min as u128 + 1);
    let denominator = a_max as u128 - a_min as u128 + 1;
    (numerator / denominator) as u64 + b_min
}

/// Linear (flat) projection of `[min, max]` onto `[0, 2^64 - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatIndexMapper {
    min_index: u64,
    max_index: u64,
}

impl FlatIndexMapper {
    pub fn new(distribution_min_index: u64, distribution_max_index: u64) -> Result<Self, TxError> {
        if distribution_max_index < distribution_min_index {
            return Err(TxError::OutOfRange(format!(
                "index distribution [{distribution_min_index}, {distribution_max_index}] is inverted"
            )));
        }
        Ok(Self {
            min_index: distribution_min_index,
            max_index: distribution_max_index,
        })
    }
}

impl RefSetIndexMapper for FlatIndexMapper {
    fn distribution_min_index(&self) -> u64 {
        self.min_index
    }

    fn distribution_max_index(&self) -> u64 {
        self.max_index
    }

    fn element_index_to_uniform_index(&self, element_index: u64) -> Result<u64, TxError> {
        if element_index < self.min_index || element_index > self.max_index {
            return Err(TxError::OutOfRange(format!(
                "element index {element_index} outside [{}, {}]",
                self.min_index, self.max_index
            )));
        }
        Ok(project_between_ranges(element_index, self.min_index, self.max_index, 0, u64::MAX))
    }

    fn uniform_index_to_element_index(&self, uniform_index: u64) -> u64 {
        project_between_ranges(uniform_index, 0, u64::MAX, self.min_index, self.max_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_round_trip_and_monotonic() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let min = rng.gen_range(0..1_000_000u64);
            let max = min + rng.gen_range(0..1_000_000u64);
            let mapper = FlatIndexMapper::new(min, max).unwrap();

            let mut prev = 0u64;
            for offset in [0, (max - min) / 3, (max - min) / 2, max - min] {
                let a = min + offset;
                let uniform = mapper.element_index_to_uniform_index(a).unwrap();
                assert!(uniform >= prev, "projection must be non-decreasing");
                prev = uniform;
                // projection floors in both directions, so the trip may land one below
                let back = mapper.uniform_index_to_element_index(uniform);
                assert!(back == a || back + 1 == a, "round trip of {a} gave {back}");
            }
        }
    }

    #[test]
    fn test_full_range_endpoints() {
        let mapper = FlatIndexMapper::new(0, u64::MAX).unwrap();
        assert_eq!(mapper.element_index_to_uniform_index(u64::MAX).unwrap(), u64::MAX);
        assert_eq!(mapper.uniform_index_to_element_index(0), 0);

        let single = FlatIndexMapper::new(7, 7).unwrap();
        assert_eq!(single.uniform_index_to_element_index(u64::MAX), 7);
        assert_eq!(single.element_index_to_uniform_index(7).unwrap(), 0);
    }

    #[test]
    fn test_out_of_range() {
        assert!(FlatIndexMapper::new(10, 9).is_err());
        let mapper = FlatIndexMapper::new(10, 20).unwrap();
        assert!(matches!(mapper.element_index_to_uniform_index(9), Err(TxError::OutOfRange(_))));
        assert!(matches!(mapper.element_index_to_uniform_index(21), Err(TxError::OutOfRange(_))));
    }
}
