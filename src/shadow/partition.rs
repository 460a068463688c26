//! Address decomposition.
//!
//! A [`Partition`] splits an address into fields, most-significant first. Every
//! field but the last selects a slot in one trie level; the last field is the
//! offset inside a leaf. All of it is shift-and-mask arithmetic, so it works
//! the same whether or not the nodes for an address exist.

use heapless::Vec;

use crate::shadow::error::PartitionError;

/// Maximum number of partition entries, the leaf entry included.
pub const MAX_LEVELS: usize = 16;

/// Maximum width of a single partition entry.
///
/// Keeps every node array and every leaf offset addressable with `usize`.
pub const MAX_DIMENSION_BITS: u32 = 32;

/// Ordered bit widths `[d0, .., dN]` fixing the shape of a shadow trie.
///
/// A single entry `[dN]` is valid: the map is then one leaf covering the
/// whole address space, with no levels above it.
///
/// # Example
/// ```
/// use shadow_trie::shadow::Partition;
///
/// // 8-bit addresses: high nibble picks the leaf, low nibble the offset.
/// let partition = Partition::new(8, &[4, 4]);
/// assert_eq!(partition.index(0, 0x3C), 0x3);
/// assert_eq!(partition.leaf_local_offset(0x3C), 0xC);
/// assert_eq!(partition.contiguous_run(0x3C), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    address_bits: u32,
    dimensions: Vec<u8, MAX_LEVELS>,
    // bits consumed by all entries below each level
    shifts: Vec<u8, MAX_LEVELS>,
}

impl Partition {
    /// Validates `dimensions` against an `address_bits` wide address.
    ///
    /// # Errors
    /// * [`PartitionError::AddressTooWide`] - `address_bits` exceeds 64
    /// * [`PartitionError::Empty`] - no entries at all
    /// * [`PartitionError::TooDeep`] - more than [`MAX_LEVELS`] entries
    /// * [`PartitionError::ZeroWidth`] - an entry is zero
    /// * [`PartitionError::TooWide`] - an entry exceeds [`MAX_DIMENSION_BITS`]
    /// * [`PartitionError::WidthMismatch`] - entries do not sum to `address_bits`
    pub fn try_new(address_bits: u32, dimensions: &[u32]) -> Result<Self, PartitionError> {
        if address_bits > u64::BITS {
            return Err(PartitionError::AddressTooWide { bits: address_bits });
        }
        if dimensions.is_empty() {
            return Err(PartitionError::Empty);
        }
        if dimensions.len() > MAX_LEVELS {
            return Err(PartitionError::TooDeep);
        }

        let mut sum = 0u32;
        for (level, &bits) in dimensions.iter().enumerate() {
            if bits == 0 {
                return Err(PartitionError::ZeroWidth { level });
            }
            if bits > MAX_DIMENSION_BITS {
                return Err(PartitionError::TooWide { level, bits });
            }
            sum += bits;
        }
        if sum != address_bits {
            return Err(PartitionError::WidthMismatch { address_bits, sum });
        }

        let mut widths = Vec::new();
        let mut shifts = Vec::new();
        let mut below = sum;
        for &bits in dimensions {
            below -= bits;
            widths
                .push(bits as u8)
                .map_err(|_| PartitionError::TooDeep)?;
            shifts
                .push(below as u8)
                .map_err(|_| PartitionError::TooDeep)?;
        }

        Ok(Self {
            address_bits,
            dimensions: widths,
            shifts,
        })
    }

    /// Like [`Self::try_new`], but treats a bad partition as the
    /// configuration bug it is.
    ///
    /// # Panics
    /// Panics with the [`PartitionError`] description if validation fails.
    pub fn new(address_bits: u32, dimensions: &[u32]) -> Self {
        match Self::try_new(address_bits, dimensions) {
            Ok(partition) => partition,
            Err(err) => panic!("invalid partition {:?}: {}", dimensions, err),
        }
    }

    /// Width of the addresses this partition splits.
    #[inline]
    pub fn address_bits(&self) -> u32 {
        self.address_bits
    }

    /// The entries `[d0, .., dN]`.
    #[inline]
    pub fn dimensions(&self) -> &[u8] {
        &self.dimensions
    }

    /// Number of entries; also the number of nodes visited per lookup.
    #[inline]
    pub fn depth(&self) -> usize {
        self.dimensions.len()
    }

    /// Number of trie levels above the leaves.
    #[inline]
    pub fn trie_levels(&self) -> usize {
        self.dimensions.len() - 1
    }

    /// Number of slots in a node of `level`.
    #[inline]
    pub fn slots(&self, level: usize) -> usize {
        1usize << self.dimensions[level]
    }

    /// Number of addresses covered by one slot of `level`.
    #[inline]
    pub fn slot_span(&self, level: usize) -> u64 {
        1u64 << self.shifts[level]
    }

    /// Slot index of `addr` inside a node of `level`.
    #[inline]
    pub fn index(&self, level: usize, addr: u64) -> usize {
        ((addr >> self.shifts[level]) & mask(self.dimensions[level])) as usize
    }

    /// Width of the leaf-local offset, `dN`.
    #[inline]
    pub fn leaf_bits(&self) -> u32 {
        u32::from(self.dimensions[self.trie_levels()])
    }

    /// Number of addresses covered by one leaf.
    #[inline]
    pub fn leaf_size(&self) -> u64 {
        1u64 << self.leaf_bits()
    }

    /// Offset of `addr` inside its leaf: the low `dN` bits.
    #[inline]
    pub fn leaf_local_offset(&self, addr: u64) -> usize {
        (addr & mask(self.dimensions[self.trie_levels()])) as usize
    }

    /// Addresses from `addr` (inclusive) up to the next leaf boundary.
    #[inline]
    pub fn contiguous_run(&self, addr: u64) -> u64 {
        self.leaf_size() - self.leaf_local_offset(addr) as u64
    }
}

#[inline]
fn mask(bits: u8) -> u64 {
    (1u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_partitions() {
        assert_eq!(Partition::try_new(0, &[]), Err(PartitionError::Empty));
        assert_eq!(
            Partition::try_new(96, &[32, 32, 32]),
            Err(PartitionError::AddressTooWide { bits: 96 })
        );
        assert_eq!(
            Partition::try_new(65, &[1, 32, 32]),
            Err(PartitionError::AddressTooWide { bits: 65 })
        );
        assert_eq!(
            Partition::try_new(17, &[1; 17]),
            Err(PartitionError::TooDeep)
        );
        assert_eq!(
            Partition::try_new(8, &[4, 0, 4]),
            Err(PartitionError::ZeroWidth { level: 1 })
        );
        assert_eq!(
            Partition::try_new(64, &[30, 34]),
            Err(PartitionError::TooWide { level: 1, bits: 34 })
        );
        assert_eq!(
            Partition::try_new(64, &[20, 20, 20]),
            Err(PartitionError::WidthMismatch {
                address_bits: 64,
                sum: 60
            })
        );
    }

    #[test]
    fn single_entry_is_one_leaf_wide() {
        let partition = Partition::new(8, &[8]);
        assert_eq!(partition.depth(), 1);
        assert_eq!(partition.trie_levels(), 0);
        assert_eq!(partition.leaf_size(), 256);
        assert_eq!(partition.leaf_local_offset(0xC3), 0xC3);
        assert_eq!(partition.contiguous_run(0xC3), 0x3D);
    }

    #[test]
    #[should_panic(expected = "96-bit addresses are wider than 64 bits")]
    fn new_panics_on_wide_address() {
        let _ = Partition::new(96, &[32, 32, 32]);
    }

    #[test]
    #[should_panic(expected = "partition covers 7 bits but the address is 8 bits wide")]
    fn new_panics_on_mismatch() {
        let _ = Partition::new(8, &[4, 3]);
    }

    #[test]
    fn decomposes_most_significant_first() {
        let partition = Partition::new(64, &[20, 20, 24]);
        let addr = 0xabcd_ef09_8765_4321u64;

        assert_eq!(partition.depth(), 3);
        assert_eq!(partition.trie_levels(), 2);
        assert_eq!(partition.index(0, addr), 0xabcde);
        assert_eq!(partition.index(1, addr), 0xf0987);
        assert_eq!(partition.leaf_local_offset(addr), 0x65_4321);

        // second address only differs in the middle field
        let other = 0xabcd_e559_8765_4321u64;
        assert_eq!(partition.index(0, other), 0xabcde);
        assert_eq!(partition.index(1, other), 0x55987);
        assert_eq!(partition.leaf_local_offset(other), 0x65_4321);
    }

    #[test]
    fn slot_geometry() {
        let partition = Partition::new(32, &[8, 12, 12]);
        assert_eq!(partition.slots(0), 256);
        assert_eq!(partition.slots(1), 4096);
        assert_eq!(partition.slot_span(0), 1 << 24);
        assert_eq!(partition.slot_span(1), 1 << 12);
        assert_eq!(partition.leaf_size(), 4096);
        assert_eq!(partition.leaf_bits(), 12);
    }

    #[test]
    fn contiguous_run_edge_cases() {
        let partition = Partition::new(8, &[4, 4]);

        // Leaf boundary: full leaf ahead
        assert_eq!(partition.contiguous_run(0x40), 16);

        // Last address of a leaf
        assert_eq!(partition.contiguous_run(0x4F), 1);

        // Mid leaf
        assert_eq!(partition.contiguous_run(0x3C), 4);

        // Highest address is valid and masked like any other
        assert_eq!(partition.index(0, 0xFF), 0xF);
        assert_eq!(partition.leaf_local_offset(0xFF), 0xF);
        assert_eq!(partition.contiguous_run(0xFF), 1);
    }

    #[test]
    fn offset_and_run_add_up_to_leaf_size() {
        let partition = Partition::new(16, &[3, 5, 8]);
        for addr in 0..=u16::MAX as u64 {
            assert_eq!(
                partition.leaf_local_offset(addr) as u64 + partition.contiguous_run(addr),
                partition.leaf_size()
            );
        }
    }

    #[test]
    fn full_width_addresses() {
        let partition = Partition::new(64, &[32, 32]);
        assert_eq!(partition.index(0, u64::MAX), 0xFFFF_FFFF);
        assert_eq!(partition.leaf_local_offset(u64::MAX), 0xFFFF_FFFF);
        assert_eq!(partition.contiguous_run(u64::MAX), 1);
        assert_eq!(partition.contiguous_run(0), 1 << 32);
    }
}
