#![allow(unsafe_code)]

use core::{alloc::GlobalAlloc, alloc::Layout, ptr::NonNull};

/// Memory backend used by a shadow map for its levels and leaves.
///
/// The trie never checks allocation results: `allocate` either returns usable
/// memory or does not return at all. This lets the same trie run on a plain
/// heap or inside a tool with its own restricted allocator.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `allocate` returns a block valid for reads and writes of `layout.size()`
///   bytes, aligned to `layout.align()`, and distinct from every other live
///   block; on exhaustion it must abort or diverge instead of returning.
/// - `release` accepts every block returned by `allocate` with the same layout.
/// - `bulk_copy` copies exactly `size` bytes from `src` to `dst`.
pub unsafe trait AllocatorPort {
    /// Obtains a block for `layout`. `layout.size()` is never zero.
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Returns a block to the backend.
    ///
    /// # Safety
    /// `ptr` must come from [`Self::allocate`] on this port with the same
    /// `layout` and must not have been released already.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);

    /// Copies `size` bytes from `src` to `dst`.
    ///
    /// # Safety
    /// Both regions must be valid for `size` bytes and must not overlap.
    #[inline]
    unsafe fn bulk_copy(&self, dst: NonNull<u8>, src: NonNull<u8>, size: usize) {
        unsafe { core::ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), size) }
    }
}

unsafe impl<P: AllocatorPort + ?Sized> AllocatorPort for &P {
    #[inline]
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { (**self).release(ptr, layout) }
    }

    #[inline]
    unsafe fn bulk_copy(&self, dst: NonNull<u8>, src: NonNull<u8>, size: usize) {
        unsafe { (**self).bulk_copy(dst, src, size) }
    }
}

/// Port backed by the global allocator.
///
/// Exhaustion is reported through [`alloc::alloc::handle_alloc_error`], which
/// aborts by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

unsafe impl AllocatorPort for HeapAllocator {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => {
                log::error!("shadow allocation of {} bytes failed", layout.size());
                alloc::alloc::handle_alloc_error(layout)
            }
        }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// Adapts any [`GlobalAlloc`] into a port.
///
/// Useful for instrumentation hosts that bring their own allocator and must
/// not touch the process heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalPort<G: GlobalAlloc>(pub G);

unsafe impl<G: GlobalAlloc> AllocatorPort for GlobalPort<G> {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        let ptr = unsafe { self.0.alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => {
                log::error!("shadow allocation of {} bytes failed", layout.size());
                alloc::alloc::handle_alloc_error(layout)
            }
        }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.0.dealloc(ptr.as_ptr(), layout) }
    }
}
