#![allow(unsafe_code)]

use core::{marker::PhantomData, ptr::NonNull};

use crate::shadow::{
    allocator::{AllocatorPort, HeapAllocator},
    leaf::ShadowLeaf,
    partition::Partition,
    trie::Trie,
    types::{Address, MapStats},
};

/// Sparse shadow memory: one `L` leaf per `2^dN` addresses, allocated on the
/// first write into its range.
///
/// Never-written ranges read as the distinguished leaf supplied at
/// construction. Reads hand out shared references and never allocate; only
/// the write path ([`Self::write_handle`], [`Self::set`] and the range writes)
/// creates nodes and hands out mutable access, so the distinguished leaf
/// cannot be modified through the map.
///
/// # Type Parameters
/// - `A`: address type; its width must match the partition
/// - `L`: leaf payload, see [`ShadowLeaf`]
/// - `P`: allocator backing levels and leaves
///
/// # Example
/// ```
/// use shadow_trie::shadow::{ArrayLeaf, HeapAllocator, Partition, ShadowMap};
///
/// static UNWRITTEN: ArrayLeaf<u8, 16> = ArrayLeaf::filled(b'u');
///
/// let mut map: ShadowMap<u8, _, _> =
///     ShadowMap::new(Partition::new(8, &[4, 4]), &UNWRITTEN, HeapAllocator);
///
/// map.set(0x3C, b'x');
/// assert_eq!(map.get(0x3C), b'x');
/// assert_eq!(map.get(0x30), b'u');
/// assert_eq!(map.contiguous_run(0x3C), 4);
/// ```
pub struct ShadowMap<'d, A, L, P = HeapAllocator>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    trie: Trie<L, P>,
    distinguished: &'d L,
    _address: PhantomData<fn(A)>,
}

// SAFETY: the map exclusively owns its nodes; the distinguished leaf is only
// ever read, hence the `Sync` requirement on `L` for sending.
unsafe impl<A, L, P> Send for ShadowMap<'_, A, L, P>
where
    A: Address,
    L: ShadowLeaf + Send + Sync,
    P: AllocatorPort + Send,
{
}

// SAFETY: `&ShadowMap` only exposes shared access to leaves and the port.
unsafe impl<A, L, P> Sync for ShadowMap<'_, A, L, P>
where
    A: Address,
    L: ShadowLeaf + Sync,
    P: AllocatorPort + Sync,
{
}

impl<'d, A, L, P> ShadowMap<'d, A, L, P>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    /// Creates a map and allocates its root level.
    ///
    /// With a single-entry partition the root is the map's only leaf, copied
    /// from `distinguished` right away.
    ///
    /// # Panics
    /// Panics if `A` is wider than 64 bits, if the partition does not split
    /// `A`-wide addresses, if `L::OFFSET_BITS` differs from the last partition
    /// entry, or if `L` is zero sized.
    pub fn new(partition: Partition, distinguished: &'d L, port: P) -> Self {
        assert!(
            A::BITS <= u64::BITS,
            "{}-bit addresses are wider than the 64 bits a shadow map supports",
            A::BITS
        );
        assert_eq!(
            partition.address_bits(),
            A::BITS,
            "partition splits {}-bit addresses but the address type is {} bits wide",
            partition.address_bits(),
            A::BITS
        );
        log::debug!(
            "creating shadow map: partition {:?}, {} byte leaves",
            partition.dimensions(),
            core::mem::size_of::<L>()
        );

        Self {
            trie: Trie::new(partition, port, distinguished),
            distinguished,
            _address: PhantomData,
        }
    }

    /// Leaf shadowing `addr`, or the distinguished leaf if its range has never
    /// been written. Never allocates.
    #[inline]
    pub fn read(&self, addr: A) -> &L {
        self.leaf_for_read(addr.to_u64())
    }

    /// Leaf shadowing `addr`, allocating it and any missing level on the way.
    ///
    /// A new leaf starts as a copy of the distinguished leaf. The returned
    /// storage keeps its address for the rest of the map's lifetime.
    #[inline]
    pub fn write_handle(&mut self, addr: A) -> &mut L {
        let leaf = self.leaf_ptr_for_write(addr.to_u64());
        // SAFETY: leaves are owned by the trie and `&mut self` is held
        unsafe { &mut *leaf.as_ptr() }
    }

    /// Leaf shadowing `addr` if its range has ever been written.
    #[inline]
    pub fn strict(&self, addr: A) -> Option<&L> {
        self.trie
            .lookup_strict(addr.to_u64())
            // SAFETY: leaves live as long as the trie
            .map(|leaf| unsafe { &*leaf.as_ptr().as_ptr() })
    }

    /// Mutable access to an already allocated leaf; never allocates.
    #[inline]
    pub fn strict_mut(&mut self, addr: A) -> Option<&mut L> {
        self.trie
            .lookup_strict(addr.to_u64())
            // SAFETY: leaves are owned by the trie and `&mut self` is held
            .map(|leaf| unsafe { &mut *leaf.as_ptr().as_ptr() })
    }

    /// True if the leaf covering `addr` has been allocated.
    #[inline]
    pub fn is_written(&self, addr: A) -> bool {
        self.trie.lookup_strict(addr.to_u64()).is_some()
    }

    /// Shadow value of `addr`. Never allocates.
    #[inline]
    pub fn get(&self, addr: A) -> L::Element {
        let addr = addr.to_u64();
        let offset = self.partition().leaf_local_offset(addr);
        self.leaf_for_read(addr).element(offset)
    }

    /// Sets the shadow value of `addr`, allocating its leaf if needed.
    #[inline]
    pub fn set(&mut self, addr: A, value: L::Element) {
        let offset = self.leaf_local_offset(addr);
        self.write_handle(addr).set_element(offset, value);
    }

    /// Position of `addr` inside its leaf. Does not touch the trie.
    #[inline]
    pub fn leaf_local_offset(&self, addr: A) -> usize {
        self.partition().leaf_local_offset(addr.to_u64())
    }

    /// Number of addresses from `addr` (inclusive) to the next leaf boundary.
    #[inline]
    pub fn contiguous_run(&self, addr: A) -> u64 {
        self.partition().contiguous_run(addr.to_u64())
    }

    /// Number of addresses covered by one leaf.
    #[inline]
    pub fn leaf_size(&self) -> u64 {
        self.partition().leaf_size()
    }

    #[inline]
    pub fn partition(&self) -> &Partition {
        self.trie.partition()
    }

    /// The leaf every never-written range reads as.
    #[inline]
    pub fn distinguished(&self) -> &'d L {
        self.distinguished
    }

    #[inline]
    pub fn allocator(&self) -> &P {
        self.trie.port()
    }

    /// Allocation counters.
    #[inline]
    pub fn stats(&self) -> MapStats {
        self.trie.stats()
    }

    pub(crate) fn leaf_for_read(&self, addr: u64) -> &L {
        match self.trie.lookup_strict(addr) {
            // SAFETY: leaves live as long as the trie
            Some(leaf) => unsafe { &*leaf.as_ptr().as_ptr() },
            None => self.distinguished,
        }
    }

    /// Raw pointer to the leaf for `addr` on the read path: either trie-owned
    /// storage or the distinguished leaf.
    pub(crate) fn leaf_ptr_for_read(&self, addr: u64) -> NonNull<L> {
        NonNull::from(self.leaf_for_read(addr))
    }

    pub(crate) fn leaf_ptr_for_write(&mut self, addr: u64) -> NonNull<L> {
        self.trie.lookup_for_write(addr, self.distinguished).as_ptr()
    }
}

impl<A, L, P> core::fmt::Debug for ShadowMap<'_, A, L, P>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShadowMap")
            .field("partition", &self.partition().dimensions())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
