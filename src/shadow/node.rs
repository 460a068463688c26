//! Raw trie nodes.
//!
//! Both node kinds are thin `Copy` handles over memory obtained from an
//! [`AllocatorPort`]. They do not free themselves: the owning
//! [`Trie`](crate::shadow::trie::Trie) walks the tree on drop and releases
//! every node exactly once.

#![allow(unsafe_code)]

use core::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use crate::shadow::{allocator::AllocatorPort, leaf::ShadowLeaf};

/// One slot of a trie level: null, or the owned child below it.
pub(crate) type Slot = Option<NonNull<u8>>;

/// Array of `2^d` slots for one level of the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrieLevel {
    slots: NonNull<Slot>,
}

impl TrieLevel {
    /// Allocates a level whose `len` slots are all null.
    pub(crate) fn allocate<P: AllocatorPort>(port: &P, layout: Layout, len: usize) -> Self {
        debug_assert_eq!(layout.size(), len * core::mem::size_of::<Slot>());
        let slots = port.allocate(layout).cast::<Slot>();
        for index in 0..len {
            // SAFETY: the block holds `len` slots
            unsafe { slots.add(index).write(None) };
        }
        Self { slots }
    }

    /// # Safety
    /// `ptr` must come from [`Self::as_raw`] of a live level.
    #[inline]
    pub(crate) unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        Self { slots: ptr.cast() }
    }

    #[inline]
    pub(crate) fn as_raw(self) -> NonNull<u8> {
        self.slots.cast()
    }

    /// # Safety
    /// `index` must be below the level's slot count.
    #[inline]
    pub(crate) unsafe fn get(self, index: usize) -> Slot {
        unsafe { self.slots.add(index).read() }
    }

    /// Hands ownership of a fully initialized `child` to the slot at `index`.
    ///
    /// # Safety
    /// `index` must be below the level's slot count and the slot must be null.
    #[inline]
    pub(crate) unsafe fn link(self, index: usize, child: NonNull<u8>) {
        unsafe {
            debug_assert!(self.get(index).is_none(), "slot {} already linked", index);
            self.slots.add(index).write(Some(child));
        }
    }

    /// # Safety
    /// `layout` must be the one the level was allocated with, and the level
    /// must not be used afterwards.
    #[inline]
    pub(crate) unsafe fn release<P: AllocatorPort>(self, port: &P, layout: Layout) {
        unsafe { port.release(self.as_raw(), layout) }
    }
}

/// Payload block at the bottom of the trie.
pub(crate) struct LeafBlock<L> {
    ptr: NonNull<L>,
    _leaf: PhantomData<L>,
}

impl<L> Clone for LeafBlock<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for LeafBlock<L> {}

impl<L: ShadowLeaf> LeafBlock<L> {
    #[inline]
    pub(crate) fn layout() -> Layout {
        Layout::new::<L>()
    }

    /// Allocates a leaf holding a bitwise copy of `template`.
    pub(crate) fn allocate_from<P: AllocatorPort>(port: &P, template: &L) -> Self {
        let layout = Self::layout();
        let ptr = port.allocate(layout);
        // SAFETY: fresh block of `size_of::<L>()` bytes, `template` lives
        // outside any block of this port, and `L: Copy` makes a byte copy a
        // valid value
        unsafe { port.bulk_copy(ptr, NonNull::from(template).cast(), layout.size()) };
        Self {
            ptr: ptr.cast(),
            _leaf: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must come from [`Self::as_raw`] of a live leaf of the same type.
    #[inline]
    pub(crate) unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        Self {
            ptr: ptr.cast(),
            _leaf: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn as_raw(self) -> NonNull<u8> {
        self.ptr.cast()
    }

    #[inline]
    pub(crate) fn as_ptr(self) -> NonNull<L> {
        self.ptr
    }

    /// # Safety
    /// The leaf must not be used afterwards.
    #[inline]
    pub(crate) unsafe fn release<P: AllocatorPort>(self, port: &P) {
        unsafe { port.release(self.as_raw(), Self::layout()) }
    }
}
