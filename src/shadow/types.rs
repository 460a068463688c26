/// Fixed-width unsigned integer used to express addresses.
///
/// All arithmetic inside the map happens on `u64`; the address type only fixes
/// the width that a [`Partition`](crate::shadow::Partition) must cover and the
/// highest valid address for range operations.
pub trait Address: Copy + Eq + Ord + core::fmt::Debug {
    /// Width of the address in bits.
    const BITS: u32;

    /// Highest representable address.
    const MAX: u64 = if Self::BITS >= 64 {
        u64::MAX
    } else {
        (1u64 << Self::BITS) - 1
    };

    /// Widens the address to `u64`.
    fn to_u64(self) -> u64;
}

macro_rules! impl_address {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Address for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_address!(u8, u16, u32, u64, usize);

/// Allocation counters of a [`ShadowMap`](crate::shadow::ShadowMap).
///
/// The map only grows, so these never decrease while the map is alive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapStats {
    /// Trie levels allocated, the root included.
    pub levels: usize,
    /// Leaf blocks allocated.
    pub leaves: usize,
    /// Bytes obtained from the allocator for levels and leaves.
    pub bytes: usize,
}

impl MapStats {
    /// Total number of nodes (levels and leaves) owned by the map.
    #[inline]
    pub fn nodes(&self) -> usize {
        self.levels + self.leaves
    }
}
