use core::marker::PhantomData;

use crate::shadow::{
    allocator::{AllocatorPort, HeapAllocator},
    error::PartitionError,
    leaf::ShadowLeaf,
    map::ShadowMap,
    partition::Partition,
    types::Address,
};

// Builder states
pub struct NeedAddress;

pub struct NeedPartition<A> {
    _address: PhantomData<fn(A)>,
}

pub struct NeedLeaf<A> {
    partition: Partition,
    _address: PhantomData<fn(A)>,
}

pub struct NeedAllocator<'d, A, L> {
    partition: Partition,
    distinguished: &'d L,
    _address: PhantomData<fn(A)>,
}

pub struct Ready<'d, A, L, P> {
    partition: Partition,
    distinguished: &'d L,
    port: P,
    _address: PhantomData<fn(A)>,
}

/// Step-by-step construction of a [`ShadowMap`].
///
/// Each step fixes one part of the configuration and checks it right away,
/// so a misconfigured map fails where it is declared rather than on the
/// first lookup.
///
/// # Example
/// ```
/// use shadow_trie::shadow::{ArrayLeaf, ShadowMapBuilder};
///
/// static UNWRITTEN: ArrayLeaf<u8, 256> = ArrayLeaf::filled(0);
///
/// let mut map = ShadowMapBuilder::new()
///     .address::<u32>()
///     .partition(&[12, 12, 8])
///     .distinguished(&UNWRITTEN)
///     .heap_allocator()
///     .build();
///
/// map.set(0xDEAD_BEEF, 1);
/// assert_eq!(map.get(0xDEAD_BEEF), 1);
/// ```
pub struct ShadowMapBuilder<State> {
    state: State,
}

// Start the builder
impl ShadowMapBuilder<NeedAddress> {
    pub fn new() -> Self {
        Self { state: NeedAddress }
    }

    /// Fixes the address type.
    pub fn address<A: Address>(self) -> ShadowMapBuilder<NeedPartition<A>> {
        ShadowMapBuilder {
            state: NeedPartition {
                _address: PhantomData,
            },
        }
    }
}

impl Default for ShadowMapBuilder<NeedAddress> {
    fn default() -> Self {
        Self::new()
    }
}

// Set partition
impl<A: Address> ShadowMapBuilder<NeedPartition<A>> {
    /// Splits `A`-wide addresses into `dimensions`, most significant first.
    ///
    /// # Panics
    /// Panics if the partition is invalid for `A`; see [`Partition::try_new`].
    pub fn partition(self, dimensions: &[u32]) -> ShadowMapBuilder<NeedLeaf<A>> {
        self.with_partition(Partition::new(A::BITS, dimensions))
    }

    /// Non-panicking variant of [`Self::partition`].
    ///
    /// # Errors
    /// The [`PartitionError`] describing why `dimensions` cannot split `A`.
    pub fn try_partition(
        self,
        dimensions: &[u32],
    ) -> Result<ShadowMapBuilder<NeedLeaf<A>>, PartitionError> {
        Ok(self.with_partition(Partition::try_new(A::BITS, dimensions)?))
    }

    /// Uses an already validated partition.
    ///
    /// # Panics
    /// Panics if `partition` does not cover `A::BITS` bits.
    pub fn with_partition(self, partition: Partition) -> ShadowMapBuilder<NeedLeaf<A>> {
        assert_eq!(
            partition.address_bits(),
            A::BITS,
            "partition splits {}-bit addresses but the address type is {} bits wide",
            partition.address_bits(),
            A::BITS
        );

        ShadowMapBuilder {
            state: NeedLeaf {
                partition,
                _address: PhantomData,
            },
        }
    }
}

// Set distinguished leaf
impl<A: Address> ShadowMapBuilder<NeedLeaf<A>> {
    /// Sets the leaf every never-written range reads as, which also fixes the
    /// leaf type.
    ///
    /// # Panics
    /// Panics if `L` does not cover exactly the last partition entry.
    pub fn distinguished<L: ShadowLeaf>(
        self,
        leaf: &L,
    ) -> ShadowMapBuilder<NeedAllocator<'_, A, L>> {
        let partition = self.state.partition;
        // Early validation - fail fast with clear error message
        assert_eq!(
            L::OFFSET_BITS,
            partition.leaf_bits(),
            "leaf covers {} offset bits but the partition reserves {}",
            L::OFFSET_BITS,
            partition.leaf_bits()
        );

        ShadowMapBuilder {
            state: NeedAllocator {
                partition,
                distinguished: leaf,
                _address: PhantomData,
            },
        }
    }
}

// Set allocator
impl<'d, A: Address, L: ShadowLeaf> ShadowMapBuilder<NeedAllocator<'d, A, L>> {
    pub fn allocator<P: AllocatorPort>(self, port: P) -> ShadowMapBuilder<Ready<'d, A, L, P>> {
        let NeedAllocator {
            partition,
            distinguished,
            ..
        } = self.state;

        ShadowMapBuilder {
            state: Ready {
                partition,
                distinguished,
                port,
                _address: PhantomData,
            },
        }
    }

    /// Backs the map with the global heap.
    pub fn heap_allocator(self) -> ShadowMapBuilder<Ready<'d, A, L, HeapAllocator>> {
        self.allocator(HeapAllocator)
    }
}

// Build the final map
impl<'d, A, L, P> ShadowMapBuilder<Ready<'d, A, L, P>>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    pub fn build(self) -> ShadowMap<'d, A, L, P> {
        let Ready {
            partition,
            distinguished,
            port,
            ..
        } = self.state;
        ShadowMap::new(partition, distinguished, port)
    }
}
