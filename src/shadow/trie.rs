#![allow(unsafe_code)]

use core::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use crate::shadow::{
    allocator::AllocatorPort,
    leaf::ShadowLeaf,
    node::{LeafBlock, Slot, TrieLevel},
    partition::{MAX_LEVELS, Partition},
    types::MapStats,
};

/// Owner of the node tree: the eagerly allocated root and every node
/// reachable from it.
///
/// The root is a level, or the only leaf when the partition has a single
/// entry.
pub(crate) struct Trie<L: ShadowLeaf, P: AllocatorPort> {
    root: NonNull<u8>,
    partition: Partition,
    level_layouts: [Layout; MAX_LEVELS],
    port: P,
    stats: MapStats,
    _leaves: PhantomData<L>,
}

impl<L: ShadowLeaf, P: AllocatorPort> Trie<L, P> {
    /// Allocates the root. A root leaf starts as a copy of `template`.
    ///
    /// # Panics
    /// Panics if `L` does not cover exactly the last partition entry, if `L`
    /// is zero sized, or if a level array cannot be represented in memory.
    pub(crate) fn new(partition: Partition, port: P, template: &L) -> Self {
        assert_eq!(
            L::OFFSET_BITS,
            partition.leaf_bits(),
            "leaf covers {} offset bits but the partition reserves {}",
            L::OFFSET_BITS,
            partition.leaf_bits()
        );
        assert!(
            core::mem::size_of::<L>() != 0,
            "leaf payload must not be zero sized"
        );

        let mut level_layouts = [Layout::new::<Slot>(); MAX_LEVELS];
        for (level, layout) in level_layouts
            .iter_mut()
            .take(partition.trie_levels())
            .enumerate()
        {
            let bits = u32::from(partition.dimensions()[level]);
            assert!(
                bits < usize::BITS,
                "level {} is too wide for this target",
                level
            );
            *layout = match Layout::array::<Slot>(partition.slots(level)) {
                Ok(layout) => layout,
                Err(_) => panic!("level {} of {} bits does not fit in memory", level, bits),
            };
        }

        let mut stats = MapStats::default();
        let root = allocate_node(&port, &partition, &level_layouts, &mut stats, 0, template);

        Self {
            root,
            partition,
            level_layouts,
            port,
            stats,
            _leaves: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn partition(&self) -> &Partition {
        &self.partition
    }

    #[inline]
    pub(crate) fn port(&self) -> &P {
        &self.port
    }

    #[inline]
    pub(crate) fn stats(&self) -> MapStats {
        self.stats
    }

    /// Leaf covering `addr`, or `None` if any node on the path is missing.
    pub(crate) fn lookup_strict(&self, addr: u64) -> Option<LeafBlock<L>> {
        let mut node = self.root;
        for depth in 0..self.partition.trie_levels() {
            // SAFETY: nodes above the leaf depth are levels, and indices are
            // masked to the level's width
            let level = unsafe { TrieLevel::from_raw(node) };
            node = unsafe { level.get(self.partition.index(depth, addr)) }?;
        }
        Some(unsafe { LeafBlock::from_raw(node) })
    }

    /// Leaf covering `addr`, allocating every missing node on the path.
    ///
    /// New leaves start as a copy of `template`.
    pub(crate) fn lookup_for_write(&mut self, addr: u64, template: &L) -> LeafBlock<L> {
        let mut node = self.root;
        for depth in 0..self.partition.trie_levels() {
            let level = unsafe { TrieLevel::from_raw(node) };
            let index = self.partition.index(depth, addr);
            // SAFETY: indices are masked to the level's width, and children
            // are fully initialized before they are linked
            node = match unsafe { level.get(index) } {
                Some(child) => child,
                None => {
                    let child = self.allocate_node(depth + 1, template);
                    unsafe { level.link(index, child) };
                    child
                }
            };
        }
        unsafe { LeafBlock::from_raw(node) }
    }

    fn allocate_node(&mut self, depth: usize, template: &L) -> NonNull<u8> {
        allocate_node(
            &self.port,
            &self.partition,
            &self.level_layouts,
            &mut self.stats,
            depth,
            template,
        )
    }

    /// Post-order release of `node` and everything below it.
    ///
    /// # Safety
    /// `node` must be a live node at `depth` owned by this trie, and must
    /// not be used afterwards.
    unsafe fn release_node(&self, node: NonNull<u8>, depth: usize) {
        if depth == self.partition.trie_levels() {
            unsafe { LeafBlock::<L>::from_raw(node).release(&self.port) };
            return;
        }

        let level = unsafe { TrieLevel::from_raw(node) };
        for index in 0..self.partition.slots(depth) {
            if let Some(child) = unsafe { level.get(index) } {
                unsafe { self.release_node(child, depth + 1) };
            }
        }
        unsafe { level.release(&self.port, self.level_layouts[depth]) };
    }
}

/// Allocates the node living at `depth`: a level, or a leaf at the bottom.
fn allocate_node<L: ShadowLeaf, P: AllocatorPort>(
    port: &P,
    partition: &Partition,
    level_layouts: &[Layout; MAX_LEVELS],
    stats: &mut MapStats,
    depth: usize,
    template: &L,
) -> NonNull<u8> {
    if depth == partition.trie_levels() {
        let leaf = LeafBlock::allocate_from(port, template);
        let size = LeafBlock::<L>::layout().size();
        stats.leaves += 1;
        stats.bytes += size;
        log::trace!("allocated leaf #{} ({} bytes)", stats.leaves, size);
        leaf.as_raw()
    } else {
        let layout = level_layouts[depth];
        let level = TrieLevel::allocate(port, layout, partition.slots(depth));
        stats.levels += 1;
        stats.bytes += layout.size();
        log::trace!("allocated level {} ({} bytes)", depth, layout.size());
        level.as_raw()
    }
}

impl<L: ShadowLeaf, P: AllocatorPort> Drop for Trie<L, P> {
    fn drop(&mut self) {
        // SAFETY: the root owns the whole tree and is never touched again
        unsafe { self.release_node(self.root, 0) };
        log::debug!(
            "released shadow trie: {} levels, {} leaves, {} bytes",
            self.stats.levels,
            self.stats.leaves,
            self.stats.bytes
        );
    }
}
