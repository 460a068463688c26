/// Errors returned by range operations and byte views.
///
/// Single-address lookups never fail: every value of the address type is a
/// valid address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowError {
    /// The range runs past the highest address of the address type.
    OutOfBounds,
    /// Operation attempted with zero length.
    ZeroLength,
    /// The range does not fit inside a single leaf.
    CrossesLeaf,
}

impl core::fmt::Display for ShadowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ShadowError::OutOfBounds => write!(f, "range exceeds the address space"),
            ShadowError::ZeroLength => write!(f, "operation attempted with zero length"),
            ShadowError::CrossesLeaf => write!(f, "range crosses a leaf boundary"),
        }
    }
}

/// Reasons a partition is rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionError {
    /// Addresses wider than the 64 bits lookups are computed on.
    AddressTooWide { bits: u32 },
    /// No entries; even a single leaf needs one.
    Empty,
    /// More entries than [`MAX_LEVELS`](crate::shadow::partition::MAX_LEVELS).
    TooDeep,
    /// An entry of zero bits.
    ZeroWidth { level: usize },
    /// An entry wider than
    /// [`MAX_DIMENSION_BITS`](crate::shadow::partition::MAX_DIMENSION_BITS).
    TooWide { level: usize, bits: u32 },
    /// Entries do not add up to the address width.
    WidthMismatch { address_bits: u32, sum: u32 },
}

impl core::fmt::Display for PartitionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PartitionError::AddressTooWide { bits } => {
                write!(f, "{}-bit addresses are wider than 64 bits", bits)
            }
            PartitionError::Empty => write!(f, "partition has no entries"),
            PartitionError::TooDeep => write!(f, "partition has too many levels"),
            PartitionError::ZeroWidth { level } => {
                write!(f, "partition entry {} is zero bits wide", level)
            }
            PartitionError::TooWide { level, bits } => {
                write!(f, "partition entry {} is {} bits wide", level, bits)
            }
            PartitionError::WidthMismatch { address_bits, sum } => write!(
                f,
                "partition covers {} bits but the address is {} bits wide",
                sum, address_bits
            ),
        }
    }
}
