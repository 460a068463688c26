#![allow(unsafe_code)]

use alloc::boxed::Box;

/// Payload stored by one leaf: shadow state for `2^OFFSET_BITS` consecutive
/// addresses.
///
/// The map never looks inside a leaf. It creates leaves as bitwise copies of
/// the distinguished leaf and hands out references; how per-address state is
/// laid out (array of structures, structure of arrays, packed bits) is up to
/// the implementor. `element`/`set_element` are only used by the per-address
/// and range helpers on [`ShadowMap`](crate::shadow::ShadowMap).
///
/// `Copy` is required because leaves are initialized by a raw bulk copy and
/// released without running a destructor.
pub trait ShadowLeaf: Copy {
    /// Width of the leaf-local offset. Must equal the last partition entry.
    const OFFSET_BITS: u32;

    /// Shadow value of a single address.
    type Element: Copy;

    /// Shadow value at `offset`.
    ///
    /// # Panics
    /// May panic if `offset >= 2^OFFSET_BITS`.
    fn element(&self, offset: usize) -> Self::Element;

    /// Overwrites the shadow value at `offset`.
    ///
    /// # Panics
    /// May panic if `offset >= 2^OFFSET_BITS`.
    fn set_element(&mut self, offset: usize, value: Self::Element);
}

/// Array-of-structures leaf: one `T` per address.
///
/// `N` must be a power of two; this is checked when the leaf type is first
/// used with a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ArrayLeaf<T: Copy, const N: usize>(pub [T; N]);

impl<T: Copy, const N: usize> ArrayLeaf<T, N> {
    /// Leaf with every address set to `value`.
    ///
    /// Usable in `static` items, which is the natural home of a
    /// distinguished leaf.
    pub const fn filled(value: T) -> Self {
        Self([value; N])
    }

    /// Heap-allocated leaf with every address set to `value`.
    ///
    /// Builds the array in place, so leaves far larger than the stack (a
    /// 16 MiB byte leaf, say) can serve as distinguished leaves.
    pub fn boxed(value: T) -> Box<Self> {
        let elements: Box<[T]> = alloc::vec![value; N].into_boxed_slice();
        debug_assert_eq!(elements.len(), N);
        // SAFETY: the slice holds exactly N initialized elements and
        // `ArrayLeaf` is a transparent wrapper around `[T; N]`.
        unsafe { Box::from_raw(Box::into_raw(elements).cast::<Self>()) }
    }

    /// Number of addresses covered.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// True only for the degenerate zero-length array.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T: Copy, const N: usize> ShadowLeaf for ArrayLeaf<T, N> {
    const OFFSET_BITS: u32 = {
        assert!(N.is_power_of_two(), "ArrayLeaf length must be a power of two");
        N.trailing_zeros()
    };

    type Element = T;

    #[inline]
    fn element(&self, offset: usize) -> T {
        self.0[offset]
    }

    #[inline]
    fn set_element(&mut self, offset: usize, value: T) {
        self.0[offset] = value;
    }
}

impl<T: Copy, const N: usize> core::ops::Index<usize> for ArrayLeaf<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, offset: usize) -> &T {
        &self.0[offset]
    }
}

impl<T: Copy, const N: usize> core::ops::IndexMut<usize> for ArrayLeaf<T, N> {
    #[inline]
    fn index_mut(&mut self, offset: usize) -> &mut T {
        &mut self.0[offset]
    }
}
