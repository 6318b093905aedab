//! Binned reference sets for membership proofs.
//!
//! A reference set is a list of bins. Each bin is a window of width
//! `2 * bin_radius + 1` around a locus, and its members are offsets within the
//! window derived from a generator seed. One rotation factor, shared by every
//! bin, is chosen so that one member of one bin lands on the real element.
//! The wire form is the seed, the config, the rotation factor and the sorted
//! loci.

use curve25519_dalek::edwards::CompressedEdwardsY;
use rand::Rng;
use serde::{Deserialize, Serialize};
use seraphis_crypto::math::{clamp, mod_add, mod_sub, saturating_add, saturating_sub};
use seraphis_crypto::transcript::{domain, ToTranscript};
use seraphis_crypto::SpTranscript;

use crate::index_mapper::RefSetIndexMapper;
use crate::TxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpBinnedReferenceSetConfig {
    pub bin_radius: u16,
    pub num_bin_members: u16,
}

impl SpBinnedReferenceSetConfig {
    pub fn bin_width(&self) -> u64 {
        2 * self.bin_radius as u64 + 1
    }

    pub const fn size_bytes() -> usize {
        4
    }

    /// Check that `reference_set_size` elements can be laid out in bins of
    /// this shape.
    pub fn validate(&self, reference_set_size: u64) -> Result<(), TxError> {
        let members = self.num_bin_members as u64;
        if self.bin_radius > (u16::MAX - 1) / 2 {
            return Err(TxError::InvalidBinConfig(format!("bin radius {} too large", self.bin_radius)));
        }
        if members < 1 {
            return Err(TxError::InvalidBinConfig("bins need at least one member".into()));
        }
        if members > self.bin_width() {
            return Err(TxError::InvalidBinConfig(format!(
                "{members} members do not fit in a bin of width {}",
                self.bin_width()
            )));
        }
        if reference_set_size % members != 0 {
            return Err(TxError::InvalidBinConfig(format!(
                "reference set size {reference_set_size} is not a multiple of {members} members"
            )));
        }
        Ok(())
    }
}

impl ToTranscript for SpBinnedReferenceSetConfig {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.bin_radius.to_le_bytes());
        bytes.extend_from_slice(&self.num_bin_members.to_le_bytes());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpBinnedReferenceSet {
    pub bin_config: SpBinnedReferenceSetConfig,
    pub bin_generator_seed: [u8; 32],
    /// Rotation applied to the normalized members of every bin.
    pub bin_rotation_factor: u16,
    /// Bin centers, ascending (duplicates allowed).
    pub bin_loci: Vec<u64>,
}

impl ToTranscript for SpBinnedReferenceSet {
    fn append_to(&self, bytes: &mut Vec<u8>) {
        self.bin_config.append_to(bytes);
        self.bin_generator_seed.append_to(bytes);
        bytes.extend_from_slice(&self.bin_rotation_factor.to_le_bytes());
        self.bin_loci.append_to(bytes);
    }
}

/// Seed for a membership proof's bins: H_32(K", C").
pub fn make_bin_generator_seed(
    masked_address: &CompressedEdwardsY,
    masked_commitment: &CompressedEdwardsY,
) -> [u8; 32] {
    let mut transcript = SpTranscript::new(domain::BINNED_REF_SET_GENERATOR_SEED, 64);
    transcript
        .append("K_masked", masked_address)
        .append("C_masked", masked_commitment);
    transcript.hash_to_32()
}

// ─── Bin members ────────────────────────────────────────────────────────────

/// Unique offsets within `[0, bin_width)` for one bin, not yet rotated.
fn make_normalized_bin_members(
    config: &SpBinnedReferenceSetConfig,
    generator_seed: &[u8; 32],
    bin_locus: u64,
    bin_index_in_set: u64,
) -> Vec<u64> {
    let width = config.bin_width();
    let count = config.num_bin_members as usize;
    if width == 1 {
        return vec![0; count];
    }

    // largest value below which every residue class mod `width` is equally likely
    let clip_allowed_max = u64::MAX - mod_add(u64::MAX % width, 1, width);

    let mut members: Vec<u64> = Vec::with_capacity(count);
    let mut generator = [0u8; 64];
    let mut block = 8usize;
    let mut refreshes = 0u64;

    while members.len() < count {
        // 1. pull the next in-range 8-byte block, refreshing the generator as needed
        let candidate_block = loop {
            if block == 8 {
                let mut transcript = SpTranscript::new(domain::BINNED_REF_SET_MEMBER, 56);
                transcript
                    .append("seed", generator_seed)
                    .append("length", &bin_locus)
                    .append("bin_index", &bin_index_in_set)
                    .append("num_generator_refreshes", &refreshes);
                generator = transcript.hash_to_64();
                refreshes += 1;
                block = 0;
            }
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&generator[block * 8..block * 8 + 8]);
            block += 1;
            let value = u64::from_le_bytes(chunk);
            if value <= clip_allowed_max {
                break value;
            }
        };

        // 2. keep the candidate if it is new to this bin
        let candidate = candidate_block % width;
        if !members.contains(&candidate) {
            members.push(candidate);
        }
    }
    members
}

// ─── Construction ───────────────────────────────────────────────────────────

/// Bin loci plus the index of the bin holding the real element.
fn generate_bin_loci<R: Rng + ?Sized>(
    rng: &mut R,
    mapper: &dyn RefSetIndexMapper,
    config: &SpBinnedReferenceSetConfig,
    reference_set_size: u64,
    real_reference_index: u64,
) -> Result<(Vec<u64>, usize), TxError> {
    let dist_min = mapper.distribution_min_index();
    let dist_max = mapper.distribution_max_index();
    let radius = config.bin_radius as u64;

    if real_reference_index < dist_min || real_reference_index > dist_max {
        return Err(TxError::InvalidBinConfig(format!(
            "real reference {real_reference_index} outside distribution [{dist_min}, {dist_max}]"
        )));
    }
    if reference_set_size < 1 {
        return Err(TxError::InvalidBinConfig("empty reference set".into()));
    }
    if dist_max - dist_min < config.bin_width() - 1 {
        return Err(TxError::InvalidBinConfig(format!(
            "bin width {} exceeds the distribution range",
            config.bin_width()
        )));
    }
    config.validate(reference_set_size)?;

    let num_bins = (reference_set_size / config.num_bin_members as u64) as usize;
    // distribution width, where 0 stands for the full 2^64 range
    let dist_width = (dist_max - dist_min).wrapping_add(1);

    // 1. random locus for the real bin, then its image in uniform space
    let real_locus_min = saturating_sub(real_reference_index, radius, dist_min);
    let real_locus_max = saturating_add(real_reference_index, radius, dist_max);
    let real_locus = rng.gen_range(real_locus_min..=real_locus_max);
    let real_locus_flat = mapper.element_index_to_uniform_index(real_locus)?;

    // 2. random loci in uniform space, rotated so a random one sits on the real locus
    let mut bin_loci: Vec<u64> = (0..num_bins).map(|_| rng.gen::<u64>()).collect();
    let designated = rng.gen_range(0..num_bins);
    let rotation = mod_sub(real_locus_flat, bin_loci[designated], 0);
    for locus in bin_loci.iter_mut() {
        *locus = mod_add(*locus, rotation, 0);
    }

    // 3. back to element space; the mapper may lose precision, so reset the closest locus
    for locus in bin_loci.iter_mut() {
        *locus = mapper.uniform_index_to_element_index(*locus);
    }
    let mut closest = 0usize;
    let mut closest_gap = dist_width.wrapping_sub(1);
    for (i, locus) in bin_loci.iter().enumerate() {
        let gap = mod_sub(real_locus, *locus, dist_width).min(mod_sub(*locus, real_locus, dist_width));
        if gap < closest_gap {
            closest_gap = gap;
            closest = i;
        }
    }
    bin_loci[closest] = real_locus;

    // 4. sort, then shift every bin fully inside the distribution
    bin_loci.sort_unstable();
    let lowest = dist_min + radius;
    let highest = dist_max - radius;
    for locus in bin_loci.iter_mut() {
        *locus = clamp(*locus, lowest, highest);
    }
    let real_locus_shifted = clamp(real_locus, lowest, highest);

    // 5. several bins may share the real locus; pick one of them
    let matching: Vec<usize> = bin_loci
        .iter()
        .enumerate()
        .filter(|(_, locus)| **locus == real_locus_shifted)
        .map(|(i, _)| i)
        .collect();
    if matching.is_empty() {
        return Err(TxError::InvalidBinConfig("real locus lost while placing bins".into()));
    }
    let real_bin = matching[rng.gen_range(0..matching.len())];

    Ok((bin_loci, real_bin))
}

/// Build a binned reference set hiding `real_reference_index`.
///
/// Returns the set and the position of the real element in the expanded
/// reference indices.
pub fn make_binned_reference_set(
    mapper: &dyn RefSetIndexMapper,
    bin_config: SpBinnedReferenceSetConfig,
    generator_seed: [u8; 32],
    reference_set_size: u64,
    real_reference_index: u64,
) -> Result<(SpBinnedReferenceSet, usize), TxError> {
    let mut rng = rand::thread_rng();
    let radius = bin_config.bin_radius as u64;
    let width = bin_config.bin_width();

    // 1. bin loci
    let (bin_loci, real_bin) =
        generate_bin_loci(&mut rng, mapper, &bin_config, reference_set_size, real_reference_index)?;

    let real_locus = bin_loci[real_bin];
    if real_reference_index < real_locus - radius || real_reference_index > real_locus + radius {
        return Err(TxError::InvalidBinConfig("real element falls outside its bin".into()));
    }

    // 2. rotate so a random member of the real bin lands on the real element
    let members = make_normalized_bin_members(&bin_config, &generator_seed, real_locus, real_bin as u64);
    let designated_member = rng.gen_range(0..members.len());
    let normalized_real = real_reference_index - (real_locus - radius);
    let rotation = mod_sub(normalized_real, members[designated_member], width);

    let set = SpBinnedReferenceSet {
        bin_config,
        bin_generator_seed: generator_seed,
        bin_rotation_factor: rotation as u16,
        bin_loci,
    };
    let real_position = real_bin * bin_config.num_bin_members as usize + designated_member;
    Ok((set, real_position))
}

impl SpBinnedReferenceSet {
    pub fn num_bins(&self) -> usize {
        self.bin_loci.len()
    }

    pub fn reference_set_size(&self) -> u64 {
        self.bin_config.num_bin_members as u64 * self.bin_loci.len() as u64
    }

    /// Expand into the full list of reference indices, bin by bin.
    pub fn reference_indices(&self) -> Result<Vec<u64>, TxError> {
        let config = &self.bin_config;
        let radius = config.bin_radius as u64;
        let width = config.bin_width();
        config.validate(self.reference_set_size())?;

        if self.bin_rotation_factor as u64 >= width {
            return Err(TxError::InvalidBinConfig(format!(
                "rotation factor {} outside bin width {width}",
                self.bin_rotation_factor
            )));
        }
        if self.bin_loci.iter().any(|locus| *locus < radius || *locus > u64::MAX - radius) {
            return Err(TxError::InvalidBinConfig("bin extends past the index range".into()));
        }

        let mut indices = Vec::with_capacity(self.reference_set_size() as usize);
        for (bin_index, locus) in self.bin_loci.iter().enumerate() {
            let bottom = locus - radius;
            let members = make_normalized_bin_members(config, &self.bin_generator_seed, *locus, bin_index as u64);
            indices.extend(
                members
                    .into_iter()
                    .map(|m| mod_add(m, self.bin_rotation_factor as u64, width) + bottom),
            );
        }
        Ok(indices)
    }

    pub fn size_bytes_for(num_bins: usize) -> usize {
        SpBinnedReferenceSetConfig::size_bytes() + 32 + 2 + num_bins * 8
    }

    /// Size without the config and seed, which a verifier can rebuild.
    pub fn size_bytes_compact_for(num_bins: usize) -> usize {
        2 + num_bins * 8
    }

    pub fn size_bytes(&self) -> usize {
        Self::size_bytes_for(self.num_bins())
    }

    pub fn size_bytes_compact(&self) -> usize {
        Self::size_bytes_compact_for(self.num_bins())
    }
}
