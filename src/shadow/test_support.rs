//! Test support utilities - only compiled in test builds.

#![allow(unsafe_code)]

use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use crate::shadow::{
    allocator::{AllocatorPort, HeapAllocator},
    leaf::{ArrayLeaf, ShadowLeaf},
    map::ShadowMap,
    partition::Partition,
};

/// Standard test leaf: 16 shadow bytes.
pub type ByteLeaf16 = ArrayLeaf<u8, 16>;

/// Distinguished leaf of the 8-bit scenario.
pub static UNWRITTEN: ByteLeaf16 = ArrayLeaf::filled(b'u');

/// 8-bit addresses split `[4, 4]`, reading `'u'` until written.
pub fn tiny_map<P: AllocatorPort>(port: P) -> ShadowMap<'static, u8, ByteLeaf16, P> {
    ShadowMap::new(Partition::new(8, &[4, 4]), &UNWRITTEN, port)
}

/// Heap port that counts what passes through it.
#[derive(Default)]
pub struct CountingAllocator {
    allocations: Cell<usize>,
    releases: Cell<usize>,
    copies: Cell<usize>,
    live_bytes: Cell<usize>,
}

impl CountingAllocator {
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    pub fn copies(&self) -> usize {
        self.copies.get()
    }

    pub fn live_blocks(&self) -> usize {
        self.allocations() - self.releases()
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }
}

unsafe impl AllocatorPort for CountingAllocator {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        self.allocations.set(self.allocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() + layout.size());
        HeapAllocator.allocate(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.releases.set(self.releases.get() + 1);
        self.live_bytes.set(self.live_bytes.get() - layout.size());
        unsafe { HeapAllocator.release(ptr, layout) }
    }

    unsafe fn bulk_copy(&self, dst: NonNull<u8>, src: NonNull<u8>, size: usize) {
        self.copies.set(self.copies.get() + 1);
        unsafe { HeapAllocator.bulk_copy(dst, src, size) }
    }
}

/// Structure-of-arrays leaf: a taint label and a definedness bit per address,
/// kept in separate arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaintLeaf {
    pub labels: [u16; 16],
    pub defined: [bool; 16],
}

impl TaintLeaf {
    pub const CLEAN: Self = Self {
        labels: [0; 16],
        defined: [false; 16],
    };
}

impl ShadowLeaf for TaintLeaf {
    const OFFSET_BITS: u32 = 4;

    type Element = (u16, bool);

    fn element(&self, offset: usize) -> (u16, bool) {
        (self.labels[offset], self.defined[offset])
    }

    fn set_element(&mut self, offset: usize, (label, defined): (u16, bool)) {
        self.labels[offset] = label;
        self.defined[offset] = defined;
    }
}
