//! Fixed-length presence bit vectors.
//!
//! [`PresenceBits`] records, for one gene family, which genomes (by column
//! index) carry at least one member gene. Bits are packed into u64 blocks and
//! counted with `u64::count_ones()`.

use crate::{PanError, Result};

/// A packed, fixed-length bit vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresenceBits {
    blocks: Vec<u64>,
    len: usize,
}

impl PresenceBits {
    /// An all-zero vector of `len` bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            blocks: vec![0u64; (len + 63) / 64],
            len,
        }
    }

    /// Build a bit vector from a slice of booleans.
    pub fn build(bits: &[bool]) -> Self {
        let mut v = Self::zeros(bits.len());
        for (i, &b) in bits.iter().enumerate() {
            if b {
                v.blocks[i / 64] |= 1u64 << (i % 64);
            }
        }
        v
    }

    /// Set the bit at position `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `i >= len`.
    pub fn set(&mut self, i: usize) -> Result<()> {
        if i >= self.len {
            return Err(PanError::InvalidInput(format!(
                "bit index {} out of range for length {}",
                i, self.len
            )));
        }
        self.blocks[i / 64] |= 1u64 << (i % 64);
        Ok(())
    }

    /// Get the bit at position `i` (`false` when out of range).
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.blocks[i / 64] >> (i % 64)) & 1 == 1
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the vector has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of 1-bits.
    pub fn count_ones(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Total number of 0-bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// Number of positions set in both vectors.
    ///
    /// Vectors of different length are compared over the shorter prefix.
    pub fn intersection_count(&self, other: &PresenceBits) -> usize {
        self.blocks
            .iter()
            .zip(other.blocks.iter())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Indices of the set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().enumerate().flat_map(|(bi, &block)| {
            let mut word = block;
            std::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let tz = word.trailing_zeros() as usize;
                word &= word - 1; // clear lowest set bit
                Some(bi * 64 + tz)
            })
        })
    }
}
